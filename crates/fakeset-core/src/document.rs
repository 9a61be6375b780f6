use chrono::Utc;
use jsonschema::JSONSchema;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ids::SchemaId;
use crate::schema::{Column, SchemaDefinition};
use crate::types::{ColumnSeparator, ColumnType, QuoteCharacter, ValueRange};

/// User-authored schema file, before ids and timestamps are assigned.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub name: String,
    #[serde(default)]
    pub column_separator: ColumnSeparator,
    #[serde(default)]
    pub quote_character: QuoteCharacter,
    pub columns: Vec<ColumnSpec>,
}

/// Column entry of a [`SchemaDocument`]; order defaults to list position.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ValueRange>,
}

impl SchemaDocument {
    pub fn into_definition(self, owner: Option<String>) -> SchemaDefinition {
        let now = Utc::now();
        let columns = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(position, spec)| Column {
                name: spec.name,
                column_type: spec.column_type,
                order: spec.order.unwrap_or(position as u32),
                range: spec.range,
            })
            .collect();

        SchemaDefinition {
            id: SchemaId::new(),
            owner,
            name: self.name,
            column_separator: self.column_separator,
            quote_character: self.quote_character,
            columns,
            created_at: now,
            updated_at: now,
        }
    }
}

/// JSON Schema describing [`SchemaDocument`] files.
pub fn document_json_schema() -> Result<Value> {
    Ok(serde_json::to_value(schema_for!(SchemaDocument))?)
}

/// Parse a schema document, checking it against [`document_json_schema`] first
/// so that every violation is reported rather than only the first decode error.
pub fn parse_schema_document(json: &str) -> Result<SchemaDocument> {
    let value: Value = serde_json::from_str(json)?;
    let schema = document_json_schema()?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| Error::InvalidDocument(err.to_string()))?;

    if let Err(errors) = compiled.validate(&value) {
        let messages: Vec<String> = errors
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{path}: {error}")
                }
            })
            .collect();
        return Err(Error::InvalidDocument(messages.join("; ")));
    }

    Ok(serde_json::from_value(value)?)
}
