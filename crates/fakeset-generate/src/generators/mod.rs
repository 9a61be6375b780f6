pub mod faker_rs;

use chrono::{Duration, NaiveDate, Utc};
use rand::{Rng, RngCore};

use fakeset_core::{Column, ColumnType, MAX_TEXT_SENTENCES, ValueRange};

use crate::errors::GenerationError;

/// Bounds used when an `integer` column has no explicit range.
pub const DEFAULT_INTEGER_RANGE: ValueRange = ValueRange::new(0, 10_000);
/// Sentence count used when a `text` column has no explicit range.
pub const DEFAULT_TEXT_RANGE: ValueRange = ValueRange::new(1, 3);

/// Generated value for a column, before formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Int(i64),
    Text(String),
    Date(NaiveDate),
}

impl GeneratedValue {
    /// Render the value as a field, wrapping it with `quote` when given.
    pub fn render(&self, quote: Option<char>) -> String {
        let raw = match self {
            GeneratedValue::Int(value) => value.to_string(),
            GeneratedValue::Text(value) => value.clone(),
            GeneratedValue::Date(value) => value.format("%Y-%m-%d").to_string(),
        };
        match quote {
            Some(quote) => format!("{quote}{raw}{quote}"),
            None => raw,
        }
    }
}

/// Maps column types to value generators.
///
/// Each call draws from the supplied randomness source; the registry itself
/// holds no per-call state.
#[derive(Debug, Clone)]
pub struct GeneratorRegistry {
    base_date: NaiveDate,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self {
            base_date: Utc::now().date_naive(),
        }
    }

    /// Upper bound for generated dates (inclusive).
    pub fn with_base_date(mut self, base_date: NaiveDate) -> Self {
        self.base_date = base_date;
        self
    }

    pub fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    /// Registered column types, in presentation order.
    pub fn column_types(&self) -> &'static [ColumnType] {
        ColumnType::ALL
    }

    /// Produce one unformatted value for a column type.
    pub fn value(
        &self,
        column_type: &ColumnType,
        range: Option<ValueRange>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let value = match column_type {
            ColumnType::FullName => GeneratedValue::Text(faker_rs::full_name(rng)),
            ColumnType::Job => GeneratedValue::Text(faker_rs::job(rng)),
            ColumnType::Email => GeneratedValue::Text(faker_rs::email(rng)),
            ColumnType::DomainName => GeneratedValue::Text(faker_rs::domain_name(rng)),
            ColumnType::CompanyName => GeneratedValue::Text(faker_rs::company_name(rng)),
            ColumnType::Address => {
                GeneratedValue::Text(flatten_lines(&faker_rs::address(rng)))
            }
            ColumnType::Text => {
                let count = sentence_count(range.unwrap_or(DEFAULT_TEXT_RANGE), rng)?;
                GeneratedValue::Text(faker_rs::sentences(count, rng))
            }
            ColumnType::Integer => {
                GeneratedValue::Int(pick_in_range(range.unwrap_or(DEFAULT_INTEGER_RANGE), rng))
            }
            ColumnType::Date => GeneratedValue::Date(self.random_date(rng)),
            ColumnType::Unknown(tag) => {
                return Err(GenerationError::UnknownColumnType(tag.clone()));
            }
        };
        Ok(value)
    }

    /// Produce one formatted field for a column.
    pub fn generate(
        &self,
        column: &Column,
        quote: char,
        rng: &mut dyn RngCore,
    ) -> Result<String, GenerationError> {
        let value = self.value(&column.column_type, column.range, rng)?;
        let quote = column.column_type.is_quoted().then_some(quote);
        Ok(value.render(quote))
    }

    fn random_date(&self, rng: &mut dyn RngCore) -> NaiveDate {
        let epoch = NaiveDate::default();
        let span = (self.base_date - epoch).num_days().max(0);
        epoch + Duration::days(rng.random_range(0..=span))
    }
}

fn pick_in_range(range: ValueRange, rng: &mut dyn RngCore) -> i64 {
    if range.from >= range.to {
        return range.from;
    }
    rng.random_range(range.from..=range.to)
}

fn sentence_count(range: ValueRange, rng: &mut dyn RngCore) -> Result<usize, GenerationError> {
    let count = pick_in_range(range, rng);
    usize::try_from(count)
        .ok()
        .filter(|_| count <= MAX_TEXT_SENTENCES)
        .ok_or_else(|| {
            GenerationError::InvalidSchema(format!(
                "sentence count {count} outside 0..={MAX_TEXT_SENTENCES}"
            ))
        })
}

/// Collapse line breaks into a single `, ` separator.
fn flatten_lines(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn text_like_values_are_wrapped() {
        let registry = GeneratorRegistry::new();
        let mut rng = rng();
        for column_type in [
            ColumnType::FullName,
            ColumnType::Job,
            ColumnType::CompanyName,
            ColumnType::Address,
        ] {
            let column = Column::new("c", column_type, 0);
            let value = registry.generate(&column, '\'', &mut rng).expect("generate");
            assert!(value.len() >= 2, "{value}");
            assert!(value.starts_with('\'') && value.ends_with('\''), "{value}");
        }
    }

    #[test]
    fn plain_values_are_not_wrapped() {
        let registry = GeneratorRegistry::new();
        let mut rng = rng();
        for column_type in [
            ColumnType::Email,
            ColumnType::DomainName,
            ColumnType::Integer,
            ColumnType::Date,
        ] {
            let column = Column::new("c", column_type, 0);
            let value = registry.generate(&column, '"', &mut rng).expect("generate");
            assert!(!value.starts_with('"'), "{value}");
        }
    }

    #[test]
    fn address_has_no_line_breaks() {
        let registry = GeneratorRegistry::new();
        let mut rng = rng();
        let column = Column::new("a", ColumnType::Address, 0);
        for _ in 0..20 {
            let value = registry.generate(&column, '"', &mut rng).expect("generate");
            assert!(!value.contains('\n'));
            assert!(value.contains(", "));
        }
    }

    #[test]
    fn integers_respect_range() {
        let registry = GeneratorRegistry::new();
        let mut rng = rng();
        let column = Column::new("n", ColumnType::Integer, 0).with_range(ValueRange::new(5, 7));
        for _ in 0..100 {
            let value: i64 = registry
                .generate(&column, '"', &mut rng)
                .expect("generate")
                .parse()
                .expect("integer");
            assert!((5..=7).contains(&value));
        }
    }

    #[test]
    fn dates_fall_between_epoch_and_base_date() {
        let base = NaiveDate::from_ymd_opt(2000, 6, 1).expect("valid date");
        let registry = GeneratorRegistry::new().with_base_date(base);
        let mut rng = rng();
        for _ in 0..100 {
            match registry.value(&ColumnType::Date, None, &mut rng).expect("generate") {
                GeneratedValue::Date(date) => {
                    assert!(date >= NaiveDate::default() && date <= base);
                }
                other => panic!("expected date, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = GeneratorRegistry::new();
        let mut rng = rng();
        let result = registry.value(&ColumnType::Unknown("ssn".to_string()), None, &mut rng);
        assert!(matches!(result, Err(GenerationError::UnknownColumnType(tag)) if tag == "ssn"));
    }

    #[test]
    fn oversized_sentence_count_is_an_error() {
        let registry = GeneratorRegistry::new();
        let mut rng = rng();
        for range in [
            ValueRange::new(i64::MAX, i64::MAX),
            ValueRange::new(-3, -3),
        ] {
            let result = registry.value(&ColumnType::Text, Some(range), &mut rng);
            assert!(matches!(result, Err(GenerationError::InvalidSchema(_))), "{range:?}");
        }
    }

    #[test]
    fn flatten_lines_joins_with_comma_space() {
        assert_eq!(flatten_lines("1 Main St\nSpringfield, IL 62701"), "1 Main St, Springfield, IL 62701");
    }
}
