use std::env;
use std::path::PathBuf;

use fakeset_core::parse_schema_document;
use fakeset_generate::GenerationEngine;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut schema_path: Option<PathBuf> = None;
    let mut out_path: Option<PathBuf> = None;
    let mut rows = 10_u64;
    let mut seed = 0_u64;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" => schema_path = args.next().map(PathBuf::from),
            "--out" => out_path = args.next().map(PathBuf::from),
            "--rows" => rows = args.next().ok_or("missing --rows value")?.parse()?,
            "--seed" => seed = args.next().ok_or("missing --seed value")?.parse()?,
            _ => {
                if schema_path.is_none() {
                    schema_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let schema_path = schema_path.ok_or("missing --schema path")?;
    let out_path = out_path.unwrap_or_else(|| PathBuf::from("out.csv"));
    let document = parse_schema_document(&std::fs::read_to_string(&schema_path)?)?;
    let schema = document.into_definition(None);

    let engine = GenerationEngine::default();
    let summary =
        engine.generate_to_file(&schema, rows, &out_path, ChaCha8Rng::seed_from_u64(seed))?;

    println!("path={} bytes={} sha256={}", out_path.display(), summary.bytes, summary.sha256);
    Ok(())
}
