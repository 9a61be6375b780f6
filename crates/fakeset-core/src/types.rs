use std::fmt;

use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use serde::{Deserialize, Serialize};

/// Column type tag selecting which value generator fills a field.
///
/// Tags outside the registered set deserialize to [`ColumnType::Unknown`] so
/// the failure surfaces as an unknown-type error during validation or
/// generation instead of as a decode error while loading a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    FullName,
    Job,
    Email,
    DomainName,
    CompanyName,
    Text,
    Integer,
    Address,
    Date,
    Unknown(String),
}

impl ColumnType {
    /// Every registered column type, in presentation order.
    pub const ALL: &'static [ColumnType] = &[
        ColumnType::FullName,
        ColumnType::Job,
        ColumnType::Email,
        ColumnType::DomainName,
        ColumnType::CompanyName,
        ColumnType::Text,
        ColumnType::Integer,
        ColumnType::Address,
        ColumnType::Date,
    ];

    pub fn parse(tag: &str) -> Self {
        match tag {
            "full_name" => Self::FullName,
            "job" => Self::Job,
            "email" => Self::Email,
            "domain_name" => Self::DomainName,
            "company_name" => Self::CompanyName,
            "text" => Self::Text,
            "integer" => Self::Integer,
            "address" => Self::Address,
            "date" => Self::Date,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::FullName => "full_name",
            Self::Job => "job",
            Self::Email => "email",
            Self::DomainName => "domain_name",
            Self::CompanyName => "company_name",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Address => "address",
            Self::Date => "date",
            Self::Unknown(tag) => tag,
        }
    }

    /// Human label, e.g. `Full Name` for `full_name`.
    pub fn label(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_registered(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Text-like types are wrapped with the schema quote character.
    pub fn is_quoted(&self) -> bool {
        matches!(
            self,
            Self::FullName | Self::Job | Self::CompanyName | Self::Address
        )
    }

    /// Whether a [`ValueRange`] is meaningful for this type.
    pub fn accepts_range(&self) -> bool {
        matches!(self, Self::Integer | Self::Text)
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonSchema for ColumnType {
    fn schema_name() -> String {
        "ColumnType".to_string()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        let tags = ColumnType::ALL
            .iter()
            .map(|column_type| serde_json::Value::String(column_type.as_str().to_string()))
            .collect();
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            enum_values: Some(tags),
            ..Default::default()
        }
        .into()
    }
}

/// Field separator used between values of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSeparator {
    #[default]
    Comma,
    Semicolon,
    Colon,
    Tab,
    Pipe,
}

impl ColumnSeparator {
    pub fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Semicolon => ';',
            Self::Colon => ':',
            Self::Tab => '\t',
            Self::Pipe => '|',
        }
    }
}

/// Character wrapped around text-like values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuoteCharacter {
    DoubleQuote,
    #[default]
    SingleQuote,
}

impl QuoteCharacter {
    pub fn as_char(self) -> char {
        match self {
            Self::DoubleQuote => '"',
            Self::SingleQuote => '\'',
        }
    }
}

/// Inclusive bounds for `integer` values or the sentence count of `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValueRange {
    pub from: i64,
    pub to: i64,
}

impl ValueRange {
    pub const fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }
}
