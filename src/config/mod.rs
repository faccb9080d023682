/// Configuration system for datachat.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::DatachatConfig::default()`]
/// 2. **User global config**: `~/.datachat/config.toml`
/// 3. **Project local config**: `.datachat.toml` in the current directory
/// 4. **Environment variables**: `DATACHAT_*` overrides (highest precedence)
///
/// Later layers override earlier ones at the key level: a project file that
/// only sets `[provider] kind` keeps every other value from the global file.
///
/// # Usage
///
/// ```rust,ignore
/// use datachat::config;
///
/// let cfg = config::load();
/// if cfg.logging.enabled {
///     // ...
/// }
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::{DatachatConfig, ProviderKind};

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved datachat configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. This is the primary entry point for all modules that need
/// configuration.
pub fn load() -> DatachatConfig {
    let mut layers = Vec::new();
    if let Some(global) = load_toml_value(global_config_path()) {
        layers.push(global);
    }
    if let Some(project) = load_toml_value(project_config_path()) {
        layers.push(project);
    }

    let mut config = merge_layers(&layers);
    apply_env_overrides(&mut config);
    config
}

/// Fold TOML layers over the serialized defaults and deserialize the result.
///
/// A layer whose merged result no longer fits the schema is skipped so a
/// single bad file never takes down the whole configuration.
fn merge_layers(layers: &[toml::Value]) -> DatachatConfig {
    let mut config = DatachatConfig::default();

    for layer in layers {
        let Ok(mut base) = toml::Value::try_from(&config) else {
            continue;
        };
        merge_values(&mut base, layer);
        if let Ok(merged) = base.try_into::<DatachatConfig>() {
            config = merged;
        }
    }

    config
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Load a TOML file as a raw value tree.
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. Malformed files are ignored so the chat keeps
/// working on defaults.
fn load_toml_value(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("[datachat] ignoring malformed config {}: {err}", path.display());
            None
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.datachat/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".datachat").join("config.toml"))
}

/// Path to the project local config: `.datachat.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".datachat.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `DATACHAT_PROVIDER`: provider kind (`openai`, `groq`, `ollama`, `webhook`, `simulated`)
/// - `DATACHAT_MODEL`: model name
/// - `DATACHAT_BASE_URL`: provider base URL
/// - `DATACHAT_API_KEY`: bearer token
/// - `DATACHAT_WEBHOOK_URL`: webhook endpoint
/// - `DATACHAT_TIMEOUT_SECS`: provider timeout
/// - `DATACHAT_DATASETS`: dataset registry file
/// - `DATACHAT_LOGGING`: interaction log on/off
fn apply_env_overrides(config: &mut DatachatConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary variable lookup.
fn apply_overrides_from(config: &mut DatachatConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("DATACHAT_PROVIDER")
        && let Some(kind) = parse_provider(&val)
    {
        config.provider.kind = kind;
    }
    if let Some(val) = lookup("DATACHAT_MODEL")
        && !val.is_empty()
    {
        config.provider.model = val;
    }
    if let Some(val) = lookup("DATACHAT_BASE_URL")
        && !val.is_empty()
    {
        config.provider.base_url = val;
    }
    if let Some(val) = lookup("DATACHAT_API_KEY")
        && !val.is_empty()
    {
        config.provider.api_key = val;
    }
    if let Some(val) = lookup("DATACHAT_WEBHOOK_URL")
        && !val.is_empty()
    {
        config.provider.webhook_url = val;
    }
    if let Some(val) = lookup("DATACHAT_TIMEOUT_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.provider.timeout_secs = secs;
    }
    if let Some(val) = lookup("DATACHAT_DATASETS")
        && !val.is_empty()
    {
        config.datasets.path = val;
    }
    if let Some(val) = lookup("DATACHAT_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a provider kind string.
pub fn parse_provider(val: &str) -> Option<ProviderKind> {
    match val.trim().to_ascii_lowercase().as_str() {
        "openai" => Some(ProviderKind::Openai),
        "groq" => Some(ProviderKind::Groq),
        "ollama" => Some(ProviderKind::Ollama),
        "webhook" | "make" => Some(ProviderKind::Webhook),
        "simulated" | "demo" | "none" => Some(ProviderKind::Simulated),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.datachat/config.toml`.
///
/// Creates the `~/.datachat/` directory if it doesn't exist. Returns an error
/// if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.datachat/ directory")?;
    }

    fs::write(&path, DatachatConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `provider.kind`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut value_table: toml::Value = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        toml::Value::try_from(DatachatConfig::default())
            .context("failed to serialize default config")?
    };

    set_toml_value(&mut value_table, key, value)?;

    // Reject values the schema can't hold before touching the file.
    let merged = {
        let mut base = toml::Value::try_from(DatachatConfig::default())
            .context("failed to serialize default config")?;
        merge_values(&mut base, &value_table);
        base
    };
    merged
        .try_into::<DatachatConfig>()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// Missing sections are created; the leaf type follows the existing value
/// when there is one and is inferred from the raw text otherwise.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    // Only keys that exist in the schema may be set.
    let defaults =
        toml::Value::try_from(DatachatConfig::default()).context("failed to serialize defaults")?;
    let mut schema_node = &defaults;
    for &part in &parts {
        schema_node = schema_node
            .get(part)
            .with_context(|| format!("unknown config key: '{key}'"))?;
    }

    let mut current = root;
    for &part in sections {
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table while resolving '{key}'"))?;
        current = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match schema_node {
        toml::Value::Boolean(_) => toml::Value::Boolean(is_truthy(raw_value)),
        toml::Value::Integer(_) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        toml::Value::Float(_) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        toml::Value::Array(_) => {
            let items: Vec<toml::Value> = raw_value
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| toml::Value::String(s.to_string()))
                .collect();
            toml::Value::Array(items)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML, with the API key masked.
pub fn show_effective_config() -> Result<String> {
    let mut config = load();
    if !config.provider.api_key.is_empty() {
        config.provider.api_key = "********".to_string();
    }
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
