//! Dataset registry: the read-only catalogue of datasets a user can chat with.
//!
//! The registry is sourced from three flat tables, each row keyed by
//! `dataset_id`:
//!
//! - `[[datasets]]`: one row per dataset (`id`, `name`, `summary`)
//! - `[[stats]]`: precomputed facts (`category`, `name`, `value`)
//! - `[[dashboards]]`: embeddable BI dashboards (`name`, `embed_url`)
//!
//! Rows are grouped under their dataset in source order. Stat and dashboard
//! rows that reference an unknown dataset are dropped.
//!
//! A sample registry is compiled into the binary (`data/datasets.toml`) and
//! used whenever no `[datasets] path` is configured.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Sample registry shipped with the binary.
const BUILTIN_REGISTRY: &str = include_str!("../../data/datasets.toml");

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// One precomputed fact about a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub category: String,
    pub name: String,
    pub value: String,
}

impl Stat {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An embeddable dashboard for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub name: String,
    pub embed_url: String,
}

/// A named dataset plus its summary statistics and dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub stats: Vec<Stat>,
    pub dashboards: Vec<Dashboard>,
}

impl Dataset {
    pub fn new(id: impl Into<String>, name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            summary: summary.into(),
            stats: Vec::new(),
            dashboards: Vec::new(),
        }
    }

    /// The dashboard shown for dashboard requests (first configured row).
    pub fn default_dashboard(&self) -> Option<&Dashboard> {
        self.dashboards.first()
    }
}

// ---------------------------------------------------------------------------
// Source tables
// ---------------------------------------------------------------------------

/// Raw table rows as they appear in the registry file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegistryTables {
    datasets: Vec<DatasetRow>,
    stats: Vec<StatRow>,
    dashboards: Vec<DashboardRow>,
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    id: String,
    name: String,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct StatRow {
    dataset_id: String,
    category: String,
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct DashboardRow {
    dataset_id: String,
    name: String,
    embed_url: String,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered, read-only collection of datasets.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    datasets: Vec<Dataset>,
}

impl Registry {
    /// Build a registry from already-constructed datasets.
    pub fn from_datasets(datasets: Vec<Dataset>) -> Self {
        Self { datasets }
    }

    /// The sample registry compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_REGISTRY).context("built-in dataset registry is malformed")
    }

    /// Parse a registry from TOML table text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let tables: RegistryTables =
            toml::from_str(text).context("failed to parse dataset registry TOML")?;
        Ok(Self::from_tables(tables))
    }

    /// Load a registry file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset registry {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("invalid dataset registry {}", path.display()))
    }

    /// Load the configured registry, or the built-in sample when no path is set.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) if !p.trim().is_empty() => Self::from_path(Path::new(p)),
            _ => Self::builtin(),
        }
    }

    fn from_tables(tables: RegistryTables) -> Self {
        let mut datasets: Vec<Dataset> = tables
            .datasets
            .into_iter()
            .map(|row| Dataset::new(row.id, row.name, row.summary))
            .collect();

        for row in tables.stats {
            if let Some(ds) = datasets.iter_mut().find(|d| d.id == row.dataset_id) {
                ds.stats.push(Stat::new(row.category, row.name, row.value));
            }
        }

        for row in tables.dashboards {
            if let Some(ds) = datasets.iter_mut().find(|d| d.id == row.dataset_id) {
                ds.dashboards.push(Dashboard {
                    name: row.name,
                    embed_url: row.embed_url,
                });
            }
        }

        Self { datasets }
    }

    /// Look up a dataset by id.
    pub fn get(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// All datasets in source order.
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    /// The dataset selected when a session starts.
    pub fn first(&self) -> Option<&Dataset> {
        self.datasets.first()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_parses() {
        let registry = Registry::builtin().unwrap();
        assert_eq!(registry.datasets().len(), 2);

        let hdb = registry.get("singapore_flat_resale").unwrap();
        assert_eq!(hdb.name, "Singapore Flat Resale Prices");
        assert!(!hdb.stats.is_empty());
        assert!(hdb.default_dashboard().is_some());
    }

    #[test]
    fn rows_are_grouped_in_source_order() {
        let text = r#"
[[datasets]]
id = "a"
name = "Alpha"

[[datasets]]
id = "b"
name = "Beta"

[[stats]]
dataset_id = "a"
category = "X"
name = "first"
value = "1"

[[stats]]
dataset_id = "b"
category = "Y"
name = "other"
value = "2"

[[stats]]
dataset_id = "a"
category = "X"
name = "second"
value = "3"
"#;
        let registry = Registry::from_toml_str(text).unwrap();
        let a = registry.get("a").unwrap();
        let names: Vec<&str> = a.stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(a.summary, "");
        assert!(a.dashboards.is_empty());
    }

    #[test]
    fn orphan_rows_are_dropped() {
        let text = r#"
[[datasets]]
id = "a"
name = "Alpha"

[[stats]]
dataset_id = "missing"
category = "X"
name = "n"
value = "v"

[[dashboards]]
dataset_id = "missing"
name = "D"
embed_url = "https://example.org/d"
"#;
        let registry = Registry::from_toml_str(text).unwrap();
        let a = registry.get("a").unwrap();
        assert!(a.stats.is_empty());
        assert!(a.dashboards.is_empty());
    }

    #[test]
    fn unknown_id_returns_none() {
        let registry = Registry::builtin().unwrap();
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn load_without_path_uses_builtin() {
        let registry = Registry::load(None).unwrap();
        assert!(registry.get("sample_sales").is_some());
        let registry = Registry::load(Some("  ")).unwrap();
        assert!(!registry.is_empty());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(Registry::load(Some("/definitely/not/here.toml")).is_err());
    }
}
