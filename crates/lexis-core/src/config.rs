use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::view::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Directory holding the store, preferences and project config.
pub const LEXIS_DIR: &str = ".lexis";
pub const CONFIG_FILE: &str = "config.toml";
pub const STORE_FILE: &str = "store.sqlite3";
pub const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub offline: OfflineConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store database path; relative paths resolve against `.lexis/`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub admin_email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl ViewConfig {
    /// Configured page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineConfig {
    #[serde(default = "default_app")]
    pub app: String,
    #[serde(default = "default_cache_version")]
    pub version: u32,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            app: default_app(),
            version: default_cache_version(),
        }
    }
}

impl ProjectConfig {
    #[must_use]
    pub fn store_path(&self, project_root: &Path) -> PathBuf {
        let dir = project_root.join(LEXIS_DIR);
        self.store
            .path
            .as_ref()
            .map_or_else(|| dir.join(STORE_FILE), |p| dir.join(p))
    }

    #[must_use]
    pub fn prefs_path(project_root: &Path) -> PathBuf {
        project_root.join(LEXIS_DIR).join(PREFS_FILE)
    }

    #[must_use]
    pub fn export_dir(&self, project_root: &Path) -> PathBuf {
        self.export
            .dir
            .as_ref()
            .map_or_else(|| project_root.to_path_buf(), |d| project_root.join(d))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Load `.lexis/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(LEXIS_DIR).join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// # Errors
///
/// Returns an error if the user config exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("lexis/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge project and user config with the output mode chosen on the
/// command line (`Some("json")`, `Some("text")`, ...).
///
/// # Errors
///
/// Returns an error if either config file is unreadable.
pub fn resolve_config(project_root: &Path, cli_output: Option<&str>) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_output, user.output.as_deref(), env_format.as_deref());

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn resolve_output(
    cli_output: Option<&str>,
    user_output: Option<&str>,
    env_format: Option<&str>,
) -> String {
    for candidate in [cli_output, env_format, user_output].into_iter().flatten() {
        if let Some(mode) = normalize_output_mode(candidate) {
            return mode.to_string();
        }
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_app() -> String {
    "lexis".to_string()
}

const fn default_cache_version() -> u32 {
    1
}
