use anyhow::Result;
use depot::{Config, RegistryClient};

pub fn run(query: String) -> Result<()> {
    let config = Config::load()?;
    let cache_dir = std::env::temp_dir().join("depot-search-cache");
    let registry = RegistryClient::from_config(&config, &cache_dir)?;

    println!("Searching for '{}'...", query);
    println!();

    let results = registry.search(&query)?;

    if results.is_empty() {
        println!("No packages found matching '{}'", query);
        return Ok(());
    }

    println!("Found {} package(s):", results.len());
    for name in results {
        println!("  {}", name);
    }

    Ok(())
}
