use crate::resource_audit::ResourceFilter;
use serde::{Deserialize, Serialize};
use std::{env, path::Path, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target_directory: PathBuf,
    pub ignore_patterns: Vec<String>,
    pub file_extensions: Vec<String>,
    pub max_file_size: usize,
    pub filters: FilterConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub provider: Option<String>,
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json: bool,
    pub warn_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_directory: PathBuf::from("."),
            ignore_patterns: vec![
                ".terraform".to_string(),
                ".terragrunt-cache".to_string(),
                "node_modules".to_string(),
            ],
            file_extensions: vec!["tf".to_string(), "hcl".to_string()],
            max_file_size: 4 * 1024 * 1024, // 4MB
            filters: FilterConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config file path (~/.tag-auditor.toml)
    pub fn default_config_path() -> crate::Result<PathBuf> {
        let home_dir = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(PathBuf::from(home_dir).join(".tag-auditor.toml"))
    }

    /// Load config from the default location, falling back to defaults if it doesn't exist
    pub fn load() -> crate::Result<Self> {
        let config_path = match Self::default_config_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!("{e}; using default configuration");
                return Ok(Self::default());
            }
        };

        if config_path.exists() {
            tracing::info!("Loading configuration from {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Load config from a specific file path
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a file
    pub fn to_file(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn resource_filter(&self) -> ResourceFilter {
        ResourceFilter::new(self.filters.provider.clone(), self.filters.resource_type.clone())
    }

    /// Create a config file with all available options documented
    pub fn create_documented_config() -> String {
        r#"# Tag Auditor Configuration File
# Controls which infrastructure-as-code files are scanned and how findings are reported.

# Directory to scan (defaults to current directory). Hidden directories are never scanned.
target_directory = "."

# Patterns to ignore during file discovery
ignore_patterns = [
    ".terraform",
    ".terragrunt-cache",
    "node_modules"
]

# File extensions to scan. Add "json" to also scan *.tf.json files.
file_extensions = ["tf", "hcl"]

# Maximum file size to parse (in bytes, default 4MB)
max_file_size = 4194304

[filters]
# Only audit resource types starting with this provider prefix
# provider = "aws"

# Only audit this exact resource type
# resource_type = "aws_s3_bucket"

[output]
# Emit findings as JSON instead of a table
json = false

# Exit 0 even when findings exist (findings are logged as warnings)
warn_only = false
"#
        .to_string()
    }
}
