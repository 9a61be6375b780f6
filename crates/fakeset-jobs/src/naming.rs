use serde::{Deserialize, Serialize};

use fakeset_core::{Dataset, SchemaDefinition};

/// Naming scheme for generated output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputNaming {
    /// Schema id, schema name and creation time, followed by the dataset id.
    #[default]
    Unique,
    /// Schema id, schema name and creation time only. Two datasets of the
    /// same schema created within the same second share a name, and the last
    /// write wins.
    Legacy,
}

const STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Output file name for `dataset` under `naming`.
pub fn output_name(schema: &SchemaDefinition, dataset: &Dataset, naming: OutputNaming) -> String {
    let stamp = dataset.created_at.format(STAMP_FORMAT);
    let slug = slugify(&schema.name);
    match naming {
        OutputNaming::Unique => format!("{}_{slug}_{stamp}_{}.csv", schema.id, dataset.id),
        OutputNaming::Legacy => format!("{}_{slug}_{stamp}.csv", schema.id),
    }
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("schema");
    }
    slug
}
