//! Configuration loading for shelfdex.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::analysis::AnalyzerConfig;
use crate::engine::EngineConfig;
use crate::index::{FieldSpec, Schema};
use crate::query::PlannerConfig;
use crate::search::DEFAULT_TOP_K;
use crate::search::highlight::HighlightConfig;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "SHELFDEX_CONFIG";

/// Top-level configuration loaded from config.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub query: PlannerConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Configuration for catalog locations.
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_paths")]
    pub paths: Vec<String>,
}

/// Indexed fields, in display order.
#[derive(Debug, Deserialize)]
pub struct SchemaConfig {
    #[serde(default = "default_schema_fields")]
    pub fields: Vec<FieldSpec>,
}

/// Defaults applied to searches that don't specify them.
#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Fields searched when none are given. Empty means every schema field.
    #[serde(default)]
    pub fields: Vec<String>,
}

fn default_catalog_paths() -> Vec<String> {
    vec![
        "~/.local/share/shelfdex".to_string(),
        "./catalog".to_string(),
    ]
}

fn default_schema_fields() -> Vec<FieldSpec> {
    Schema::books().fields().to_vec()
}

fn default_limit() -> usize {
    DEFAULT_TOP_K
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            paths: default_catalog_paths(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            fields: default_schema_fields(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            fields: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from `$SHELFDEX_CONFIG` or ~/.config/shelfdex/config.toml,
    /// or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::load_from(&path);
        }

        Ok(Config::default())
    }

    /// Load config from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        ProjectDirs::from("", "", "shelfdex").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    #[must_use]
    pub fn schema(&self) -> Schema {
        Schema::new(self.schema.fields.clone())
    }

    /// Fields to search when the caller names none.
    #[must_use]
    pub fn default_fields(&self) -> Vec<String> {
        if self.search.fields.is_empty() {
            self.schema().field_names()
        } else {
            self.search.fields.clone()
        }
    }

    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            schema: self.schema(),
            analyzer: self.analyzer.clone(),
            query: self.query.clone(),
            highlight: self.highlight.clone(),
        }
    }
}

/// Expand ~ to the user's home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.catalog.paths, default_catalog_paths());
        assert_eq!(config.search.limit, DEFAULT_TOP_K);
        assert_eq!(
            config.default_fields(),
            vec!["id", "author", "title", "genre", "description"]
        );
        assert!((config.query.exact_boost - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.query.fuzzy_min_length, 5);
    }

    #[test]
    fn sections_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            [catalog]
            paths = ["/srv/books"]

            [schema]
            fields = [{ name = "sku", required = true }, { name = "name" }]

            [query]
            exact_boost = 4.0

            [highlight]
            pre_tag = "<em>"
            post_tag = "</em>"

            [search]
            limit = 5
            fields = ["name"]
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.paths, vec!["/srv/books"]);
        assert_eq!(config.schema().field_names(), vec!["sku", "name"]);
        assert!(config.schema().fields()[0].required);
        assert!((config.query.exact_boost - 4.0).abs() < f32::EPSILON);
        assert_eq!(config.query.two_edit_length, 8);
        assert_eq!(config.highlight.pre_tag, "<em>");
        assert_eq!(config.default_fields(), vec!["name"]);
        assert_eq!(config.search.limit, 5);
    }

    #[test]
    fn wrong_value_type_fails_to_parse() {
        let result: Result<Config, _> = toml::from_str("[search]\nlimit = \"many\"");
        assert!(result.is_err());
    }

    #[test]
    fn expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("./catalog"), PathBuf::from("./catalog"));
        assert_eq!(expand_tilde("/srv/books"), PathBuf::from("/srv/books"));
    }
}
