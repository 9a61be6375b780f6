use std::io::Write;

use rand::RngCore;

use fakeset_core::{Column, SchemaDefinition};

use crate::errors::GenerationError;
use crate::generators::GeneratorRegistry;
use crate::model::SinkSummary;
use crate::output::csv::write_lines;

/// Lazy producer of the lines of one dataset: a header followed by
/// `rows` data lines, each terminated by `\n`.
///
/// Rows are generated on demand, so the output never has to be held in
/// memory at once. The producer is consumed by iteration and stops after the
/// first error.
pub struct RowProducer<'a, R: RngCore> {
    columns: Vec<&'a Column>,
    registry: &'a GeneratorRegistry,
    rng: R,
    separator: char,
    quote: char,
    header_pending: bool,
    remaining: u64,
    failed: bool,
}

impl<'a, R: RngCore> RowProducer<'a, R> {
    pub fn new(
        schema: &'a SchemaDefinition,
        rows: u64,
        registry: &'a GeneratorRegistry,
        rng: R,
    ) -> Result<Self, GenerationError> {
        if schema.columns.is_empty() {
            return Err(GenerationError::InvalidSchema(format!(
                "schema '{}' has no columns",
                schema.name
            )));
        }

        Ok(Self {
            columns: schema.ordered_columns(),
            registry,
            rng,
            separator: schema.separator(),
            quote: schema.quote(),
            header_pending: true,
            remaining: rows,
            failed: false,
        })
    }

    /// Data lines not yet produced.
    pub fn remaining_rows(&self) -> u64 {
        self.remaining
    }

    /// Drain the producer into `writer`.
    pub fn write_to<W: Write>(self, writer: W) -> Result<SinkSummary, GenerationError> {
        write_lines(self, writer)
    }

    fn header(&self) -> String {
        let mut line = self
            .columns
            .iter()
            .map(|column| column.name.as_str())
            .collect::<Vec<_>>()
            .join(&self.separator.to_string());
        line.push('\n');
        line
    }

    fn row(&mut self) -> Result<String, GenerationError> {
        let mut line = String::new();
        for (index, column) in self.columns.iter().enumerate() {
            if index > 0 {
                line.push(self.separator);
            }
            let value = self.registry.generate(column, self.quote, &mut self.rng)?;
            line.push_str(&value);
        }
        line.push('\n');
        Ok(line)
    }
}

impl<R: RngCore> Iterator for RowProducer<'_, R> {
    type Item = Result<String, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.header_pending {
            self.header_pending = false;
            return Some(Ok(self.header()));
        }
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        let row = self.row();
        if row.is_err() {
            self.failed = true;
        }
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let pending = self.remaining + u64::from(self.header_pending);
        let pending = usize::try_from(pending).unwrap_or(usize::MAX);
        (0, Some(pending))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use fakeset_core::{ColumnSeparator, ColumnType, QuoteCharacter};

    use super::*;

    fn schema(columns: &[(&str, ColumnType)]) -> SchemaDefinition {
        SchemaDefinition::new(
            "fixture",
            ColumnSeparator::Semicolon,
            QuoteCharacter::DoubleQuote,
            columns
                .iter()
                .map(|(name, column_type)| (name.to_string(), column_type.clone())),
        )
    }

    #[test]
    fn zero_rows_yield_only_header() {
        let schema = schema(&[("a", ColumnType::Integer), ("b", ColumnType::Date)]);
        let registry = GeneratorRegistry::new();
        let lines: Vec<_> = RowProducer::new(&schema, 0, &registry, ChaCha8Rng::seed_from_u64(1))
            .expect("producer")
            .collect::<Result<_, _>>()
            .expect("lines");
        assert_eq!(lines, vec!["a;b\n".to_string()]);
    }

    #[test]
    fn produces_header_plus_rows() {
        let schema = schema(&[("n", ColumnType::Integer), ("d", ColumnType::Date)]);
        let registry = GeneratorRegistry::new();
        let lines: Vec<String> =
            RowProducer::new(&schema, 5, &registry, ChaCha8Rng::seed_from_u64(1))
                .expect("producer")
                .collect::<Result<_, _>>()
                .expect("lines");
        assert_eq!(lines.len(), 6);
        for line in &lines[1..] {
            assert!(line.ends_with('\n'));
            assert_eq!(line.trim_end_matches('\n').split(';').count(), 2);
        }
    }

    #[test]
    fn same_seed_gives_same_rows() {
        let schema = schema(&[("name", ColumnType::FullName), ("n", ColumnType::Integer)]);
        let registry = GeneratorRegistry::new();
        let run = |seed| {
            RowProducer::new(&schema, 3, &registry, ChaCha8Rng::seed_from_u64(seed))
                .expect("producer")
                .collect::<Result<Vec<_>, _>>()
                .expect("lines")
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn stops_after_unknown_type() {
        let schema = schema(&[
            ("n", ColumnType::Integer),
            ("x", ColumnType::Unknown("ssn".to_string())),
        ]);
        let registry = GeneratorRegistry::new();
        let mut producer =
            RowProducer::new(&schema, 10, &registry, ChaCha8Rng::seed_from_u64(1))
                .expect("producer");

        assert!(matches!(producer.next(), Some(Ok(_))));
        assert!(matches!(
            producer.next(),
            Some(Err(GenerationError::UnknownColumnType(_)))
        ));
        assert!(producer.next().is_none());
    }

    #[test]
    fn rejects_schema_without_columns() {
        let schema = schema(&[]);
        let registry = GeneratorRegistry::new();
        let result = RowProducer::new(&schema, 1, &registry, ChaCha8Rng::seed_from_u64(1));
        assert!(matches!(result, Err(GenerationError::InvalidSchema(_))));
    }
}
