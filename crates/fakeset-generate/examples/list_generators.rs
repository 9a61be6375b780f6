use fakeset_generate::GeneratorRegistry;

fn main() {
    let registry = GeneratorRegistry::new();
    for column_type in registry.column_types() {
        let quoted = if column_type.is_quoted() { "quoted" } else { "plain" };
        println!("{}\t{}\t{quoted}", column_type.as_str(), column_type.label());
    }
}
