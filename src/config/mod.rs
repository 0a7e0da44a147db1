mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    // A relative catalog path is relative to the config file, not the cwd.
    if config.catalog.path.is_relative() {
        if let Some(dir) = path.parent() {
            config.catalog.path = dir.join(&config.catalog.path);
        }
    }

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./anistream.toml",
        "./config.toml",
        "~/.config/anistream/config.toml",
        "/etc/anistream/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let cache = &config.cache;
    if cache.search_max_entries == 0 || cache.browse_max_entries == 0 {
        anyhow::bail!("Cache sizes must be greater than 0");
    }
    if cache.search_ttl_secs == 0 || cache.browse_ttl_secs == 0 {
        tracing::warn!("A cache TTL of 0 disables catalog caching");
    }

    let enrichment = &config.enrichment;
    if enrichment.concurrency == 0 {
        anyhow::bail!("Enrichment concurrency must be greater than 0");
    }
    if enrichment.request_timeout_secs == 0 {
        anyhow::bail!("Provider request timeout must be greater than 0");
    }
    if enrichment.memo_max_entries == 0 {
        anyhow::bail!("Provider memo size must be greater than 0");
    }
    if enrichment.memo_miss_ttl_secs == 0 {
        anyhow::bail!("memo_miss_ttl_secs must be greater than 0");
    }

    let providers = &config.providers;
    if providers.jikan.enabled && providers.jikan.requests_per_second == 0 {
        anyhow::bail!("Jikan is enabled but requests_per_second is 0");
    }
    let endpoints = [
        ("jikan", providers.jikan.enabled, &providers.jikan.base_url),
        ("anilist", providers.anilist.enabled, &providers.anilist.base_url),
        ("kitsu", providers.kitsu.enabled, &providers.kitsu.base_url),
    ];
    for (name, enabled, base_url) in endpoints {
        if let Some(url) = base_url {
            if enabled && !anistream_common::is_absolute_url(url) {
                anyhow::bail!("Provider '{}' has an invalid base_url: {:?}", name, url);
            }
        }
    }

    Ok(())
}
