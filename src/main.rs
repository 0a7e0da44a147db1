mod cli;

use anistream::{config, service::DiscoveryService};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag.
    // Logs go to stderr so stdout stays valid JSON.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "anistream=debug".to_string()
        } else {
            "anistream=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search { query, limit } => {
            let service = build_service(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            let results = rt.block_on(service.search(&query, limit))?;
            print_json(&results)
        }
        Commands::Browse {
            page,
            limit,
            genres,
        } => {
            let service = build_service(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            let listing = rt.block_on(service.browse(page, limit, &genres))?;
            print_json(&listing)
        }
        Commands::Popular { page, limit } => {
            let service = build_service(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            let listing = rt.block_on(service.popular(page, limit))?;
            print_json(&listing)
        }
        Commands::Info { identifier } => {
            let service = build_service(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            let detail = rt.block_on(service.info(&identifier))?;
            print_json(&detail)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("anistream {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn build_service(config_path: Option<&Path>) -> Result<DiscoveryService> {
    let config = config::load_config_or_default(config_path)?;
    tracing::debug!(catalog = %config.catalog.path.display(), "Configuration loaded");
    DiscoveryService::from_config(&config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json_str = serde_json::to_string_pretty(value)?;
    println!("{}", json_str);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let providers = &config.providers;
    println!("  Catalog: {}", config.catalog.path.display());
    println!(
        "  Search cache: {} entries, {}s TTL",
        config.cache.search_max_entries, config.cache.search_ttl_secs
    );
    println!(
        "  Browse cache: {} entries, {}s TTL",
        config.cache.browse_max_entries, config.cache.browse_ttl_secs
    );
    println!("  Enrichment concurrency: {}", config.enrichment.concurrency);
    println!(
        "  Providers: jikan={} anilist={} kitsu={}",
        providers.jikan.enabled, providers.anilist.enabled, providers.kitsu.enabled
    );

    Ok(())
}
