use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::SchemaId;
use crate::types::{ColumnSeparator, ColumnType, QuoteCharacter, ValueRange};

/// A reusable column layout plus the formatting rules applied to every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaDefinition {
    pub id: SchemaId,
    /// Owner reference managed by the account layer.
    pub owner: Option<String>,
    pub name: String,
    pub column_separator: ColumnSeparator,
    pub quote_character: QuoteCharacter,
    pub columns: Vec<Column>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single typed column of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Position of the column in generated rows (0-based).
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ValueRange>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType, order: u32) -> Self {
        Self {
            name: name.into(),
            column_type,
            order,
            range: None,
        }
    }

    pub fn with_range(mut self, range: ValueRange) -> Self {
        self.range = Some(range);
        self
    }
}

impl SchemaDefinition {
    /// Build a schema whose column order follows the given sequence.
    pub fn new(
        name: impl Into<String>,
        column_separator: ColumnSeparator,
        quote_character: QuoteCharacter,
        columns: impl IntoIterator<Item = (String, ColumnType)>,
    ) -> Self {
        let now = Utc::now();
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(order, (name, column_type))| Column::new(name, column_type, order as u32))
            .collect();
        Self {
            id: SchemaId::new(),
            owner: None,
            name: name.into(),
            column_separator,
            quote_character,
            columns,
            created_at: now,
            updated_at: now,
        }
    }

    /// Columns sorted by their persisted order index.
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|column| column.order);
        columns
    }

    pub fn separator(&self) -> char {
        self.column_separator.as_char()
    }

    pub fn quote(&self) -> char {
        self.quote_character.as_char()
    }
}
