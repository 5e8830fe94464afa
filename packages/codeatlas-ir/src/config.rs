//! Process-wide configuration (§6 "Configuration (process-wide)"). Loaded
//! once at startup from YAML (or defaults) and threaded read-only through
//! the pipeline; nothing here is mutated mid-build.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Local,
    Cloud,
    Dev,
    Prod,
}

impl Default for Profile {
    fn default() -> Self {
        Profile::Dev
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QdrantMode {
    Memory,
    Embedded,
    Remote,
}

impl Default for QdrantMode {
    fn default() -> Self {
        QdrantMode::Memory
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildBudget {
    pub timeout_ms: u64,
    pub max_nodes: usize,
    pub max_edges: usize,
}

impl Default for BuildBudget {
    fn default() -> Self {
        Self { timeout_ms: 30_000, max_nodes: 1_000_000, max_edges: 2_000_000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncrementalConfig {
    pub enabled: bool,
    pub cache_ttl_s: u64,
    pub max_entries: usize,
    /// Per-project soft quota for the Global L1 IR Cache (§5 "Shared
    /// resources"): default 300 KB.
    pub per_project_soft_limit_bytes: u64,
}

impl Default for IncrementalConfig {
    fn default() -> Self {
        Self { enabled: true, cache_ttl_s: 3_600, max_entries: 100_000, per_project_soft_limit_bytes: 300_000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModesConfig {
    /// Minutes of build-pipeline idleness before the Mode Controller
    /// drops from Fast/Deep back to Balanced (§4.8).
    pub balanced_idle_minutes: u64,
    pub startup_integrity_check: bool,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self { balanced_idle_minutes: 10, startup_integrity_check: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub qdrant_mode: QdrantMode,
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_parser_lazy_load")]
    pub parser_lazy_load: bool,
    #[serde(default = "default_parallel_workers")]
    pub parallel_workers: usize,
    #[serde(default)]
    pub build_budget: BuildBudget,
    #[serde(default)]
    pub incremental: IncrementalConfig,
    #[serde(default)]
    pub modes: ModesConfig,
    /// Runtime gate for SSA/dominator annotation (§4.4). Only takes effect
    /// on builds compiled with the `ssa` Cargo feature; ignored otherwise.
    #[serde(default)]
    pub enable_ssa: bool,
}

fn default_max_file_size_bytes() -> u64 {
    2 * 1024 * 1024
}

fn default_parser_lazy_load() -> bool {
    true
}

fn default_parallel_workers() -> usize {
    num_cpus::get()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            qdrant_mode: QdrantMode::default(),
            max_file_size_bytes: default_max_file_size_bytes(),
            parser_lazy_load: default_parser_lazy_load(),
            parallel_workers: default_parallel_workers(),
            build_budget: BuildBudget::default(),
            incremental: IncrementalConfig::default(),
            modes: ModesConfig::default(),
            enable_ssa: false,
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(ConfigError::Yaml)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Yaml)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
