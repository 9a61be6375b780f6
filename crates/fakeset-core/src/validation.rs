use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::SchemaDefinition;
use crate::types::ColumnType;

/// Upper bound on the sentence count of a `text` column.
pub const MAX_TEXT_SENTENCES: i64 = 1_000;

/// Validate structural well-formedness of a schema before generation.
///
/// This checks:
/// - at least one column, each with a non-empty name
/// - order indices are unique and contiguous from 0
/// - every column type is registered
/// - ranges are ordered and only set on types that use them
/// - text ranges stay within `0..=MAX_TEXT_SENTENCES`
pub fn validate_schema(schema: &SchemaDefinition) -> Result<()> {
    if schema.columns.is_empty() {
        return Err(Error::InvalidSchema(format!(
            "schema '{}' has no columns",
            schema.name
        )));
    }

    let mut orders = BTreeSet::new();
    for column in &schema.columns {
        if column.name.trim().is_empty() {
            return Err(Error::InvalidSchema(format!(
                "column at order {} has an empty name",
                column.order
            )));
        }
        if !orders.insert(column.order) {
            return Err(Error::InvalidSchema(format!(
                "duplicate column order: {}",
                column.order
            )));
        }
        if !column.column_type.is_registered() {
            return Err(Error::UnknownColumnType(column.column_type.to_string()));
        }

        if let Some(range) = column.range {
            if !column.column_type.accepts_range() {
                return Err(Error::InvalidSchema(format!(
                    "column '{}' of type {} does not accept a range",
                    column.name, column.column_type
                )));
            }
            if range.from > range.to {
                return Err(Error::InvalidSchema(format!(
                    "column '{}' range from must be <= to",
                    column.name
                )));
            }
            if column.column_type == ColumnType::Text && range.from < 0 {
                return Err(Error::InvalidSchema(format!(
                    "column '{}' sentence count must not be negative",
                    column.name
                )));
            }
            if column.column_type == ColumnType::Text && range.to > MAX_TEXT_SENTENCES {
                return Err(Error::InvalidSchema(format!(
                    "column '{}' sentence count must not exceed {MAX_TEXT_SENTENCES}",
                    column.name
                )));
            }
        }
    }

    let expected = 0..schema.columns.len() as u32;
    if !orders.iter().copied().eq(expected) {
        return Err(Error::InvalidSchema(
            "column orders must be contiguous from 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use crate::types::{ColumnSeparator, QuoteCharacter, ValueRange};

    fn schema(columns: Vec<Column>) -> SchemaDefinition {
        let mut schema = SchemaDefinition::new(
            "fixture",
            ColumnSeparator::Comma,
            QuoteCharacter::SingleQuote,
            Vec::new(),
        );
        schema.columns = columns;
        schema
    }

    #[test]
    fn accepts_well_formed_schema() {
        let schema = schema(vec![
            Column::new("name", ColumnType::FullName, 0),
            Column::new("age", ColumnType::Integer, 1).with_range(ValueRange::new(18, 90)),
        ]);
        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn rejects_empty_columns() {
        let result = validate_schema(&schema(Vec::new()));
        assert!(matches!(result, Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn rejects_unknown_type() {
        let schema = schema(vec![Column::new(
            "phone",
            ColumnType::Unknown("phone_number".to_string()),
            0,
        )]);
        match validate_schema(&schema) {
            Err(Error::UnknownColumnType(tag)) => assert_eq!(tag, "phone_number"),
            other => panic!("expected unknown column type, got {other:?}"),
        }
    }

    #[test]
    fn rejects_gaps_and_duplicates_in_order() {
        let gap = schema(vec![
            Column::new("a", ColumnType::Job, 0),
            Column::new("b", ColumnType::Job, 2),
        ]);
        assert!(matches!(validate_schema(&gap), Err(Error::InvalidSchema(_))));

        let duplicate = schema(vec![
            Column::new("a", ColumnType::Job, 0),
            Column::new("b", ColumnType::Job, 0),
        ]);
        assert!(matches!(
            validate_schema(&duplicate),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn rejects_misplaced_or_inverted_ranges() {
        let misplaced = schema(vec![
            Column::new("d", ColumnType::Date, 0).with_range(ValueRange::new(0, 1)),
        ]);
        assert!(matches!(
            validate_schema(&misplaced),
            Err(Error::InvalidSchema(_))
        ));

        let inverted = schema(vec![
            Column::new("n", ColumnType::Integer, 0).with_range(ValueRange::new(5, 1)),
        ]);
        assert!(matches!(
            validate_schema(&inverted),
            Err(Error::InvalidSchema(_))
        ));

        let negative_text = schema(vec![
            Column::new("t", ColumnType::Text, 0).with_range(ValueRange::new(-1, 2)),
        ]);
        assert!(matches!(
            validate_schema(&negative_text),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn rejects_text_range_above_sentence_limit() {
        let at_limit = schema(vec![
            Column::new("bio", ColumnType::Text, 0)
                .with_range(ValueRange::new(1, MAX_TEXT_SENTENCES)),
        ]);
        assert!(validate_schema(&at_limit).is_ok());

        let huge = schema(vec![
            Column::new("bio", ColumnType::Text, 0).with_range(ValueRange::new(i64::MAX, i64::MAX)),
        ]);
        assert!(matches!(validate_schema(&huge), Err(Error::InvalidSchema(_))));
    }
}
