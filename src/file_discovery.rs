use crate::config::Config;
use crate::parser::Syntax;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub syntax: Syntax,
}

pub struct FileDiscovery {
    config: Config,
    ignore_regexes: Vec<regex::Regex>,
}

impl FileDiscovery {
    pub fn new(config: Config) -> Self {
        // Wildcard patterns other than `*.ext` are matched as regexes.
        let ignore_regexes = config
            .ignore_patterns
            .iter()
            .filter(|p| p.contains('*') && !p.starts_with("*."))
            .filter_map(|p| match regex::Regex::new(&format!("^{}$", regex::escape(p).replace(r"\*", ".*"))) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Ignoring invalid ignore pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();

        Self { config, ignore_regexes }
    }

    /// Candidate configuration files under the target directory in
    /// directory-tree order, hidden entries excluded.
    pub fn discover_files(&self) -> crate::Result<Vec<FileInfo>> {
        let mut files = Vec::new();

        let mut walker_builder = WalkBuilder::new(&self.config.target_directory);
        walker_builder
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        for result in walker_builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if self.should_ignore_file(path) {
                tracing::debug!("Ignoring {}", path.display());
                continue;
            }

            if let Some(file_info) = self.process_file(path)? {
                files.push(file_info);
            }
        }

        Ok(files)
    }

    fn should_ignore_file(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.config.target_directory).unwrap_or(path);

        for pattern in &self.config.ignore_patterns {
            if let Some(ext) = pattern.strip_prefix("*.") {
                // Simple glob patterns (*.ext)
                if let Some(filename) = path.file_name() {
                    if filename.to_string_lossy().ends_with(&format!(".{}", ext)) {
                        return true;
                    }
                }
            } else if !pattern.contains('*') {
                // Exact directory or file names
                if relative
                    .components()
                    .any(|component| component.as_os_str().to_string_lossy() == *pattern)
                {
                    return true;
                }
            }
        }

        relative.components().any(|component| {
            let name = component.as_os_str().to_string_lossy();
            self.ignore_regexes.iter().any(|re| re.is_match(&name))
        })
    }

    fn process_file(&self, path: &Path) -> crate::Result<Option<FileInfo>> {
        let extension = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => return Ok(None),
        };

        if !self.config.file_extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
            return Ok(None);
        }

        let syntax = match Syntax::from_extension(&extension) {
            Some(syntax) => syntax,
            None => {
                tracing::debug!("No parser for .{} files, skipping {}", extension, path.display());
                return Ok(None);
            }
        };

        // Only `*.tf.json` is configuration; other JSON files are not.
        if syntax == Syntax::Json && !path.to_string_lossy().to_lowercase().ends_with(".tf.json") {
            return Ok(None);
        }

        let size = fs::metadata(path)?.len();
        if size > self.config.max_file_size as u64 {
            tracing::warn!(
                "Skipping {} ({} bytes exceeds max_file_size {})",
                path.display(),
                size,
                self.config.max_file_size
            );
            return Ok(None);
        }

        Ok(Some(FileInfo {
            path: path.to_path_buf(),
            size,
            syntax,
        }))
    }

    pub fn get_stats(&self, files: &[FileInfo]) -> FileStats {
        let mut stats = FileStats::default();

        for file in files {
            stats.total_files += 1;
            stats.total_size += file.size;
            *stats.syntaxes.entry(format!("{:?}", file.syntax)).or_insert(0) += 1;
        }

        stats
    }
}

#[derive(Debug, Default)]
pub struct FileStats {
    pub total_files: usize,
    pub total_size: u64,
    pub syntaxes: BTreeMap<String, usize>,
}

impl FileStats {
    pub fn log_summary(&self) {
        tracing::info!(
            "Discovered {} configuration file(s), {:.2} KB",
            self.total_files,
            self.total_size as f64 / 1024.0
        );
        for (syntax, count) in &self.syntaxes {
            tracing::debug!("  {}: {} file(s)", syntax, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{Builder, TempDir};

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# empty\n").unwrap();
    }

    fn discover(root: &Path, config: Config) -> Vec<String> {
        let config = Config {
            target_directory: root.to_path_buf(),
            ..config
        };
        FileDiscovery::new(config)
            .discover_files()
            .unwrap()
            .into_iter()
            .map(|f| f.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn scratch_dir() -> TempDir {
        Builder::new().prefix("tag-auditor").tempdir().unwrap()
    }

    #[test]
    fn finds_configured_extensions_in_tree_order() {
        let dir = scratch_dir();
        touch(dir.path(), "z.tf");
        touch(dir.path(), "a.tf");
        touch(dir.path(), "modules/net/main.tf");
        touch(dir.path(), "terragrunt.hcl");
        touch(dir.path(), "README.md");
        touch(dir.path(), "plan.tf.json");

        let files = discover(dir.path(), Config::default());
        assert_eq!(files, vec!["a.tf", "modules/net/main.tf", "terragrunt.hcl", "z.tf"]);
    }

    #[test]
    fn hidden_and_ignored_directories_are_skipped() {
        let dir = scratch_dir();
        touch(dir.path(), "main.tf");
        touch(dir.path(), ".terraform/modules/vpc/main.tf");
        touch(dir.path(), ".hidden/extra.tf");
        touch(dir.path(), "node_modules/pkg/x.tf");

        let files = discover(dir.path(), Config::default());
        assert_eq!(files, vec!["main.tf"]);
    }

    #[test]
    fn json_configuration_is_opt_in() {
        let dir = scratch_dir();
        touch(dir.path(), "main.tf.json");
        touch(dir.path(), "package.json");

        let mut config = Config::default();
        config.file_extensions.push("json".to_string());
        let files = discover(dir.path(), config);
        assert_eq!(files, vec!["main.tf.json"]);
    }

    #[test]
    fn wildcard_ignore_patterns_match_path_components() {
        let dir = scratch_dir();
        touch(dir.path(), "live/main.tf");
        touch(dir.path(), "test-fixtures/main.tf");
        touch(dir.path(), "override.tf");

        let mut config = Config::default();
        config.ignore_patterns = vec!["test-*".to_string(), "*.tfvars".to_string()];
        let files = discover(dir.path(), config);
        assert_eq!(files, vec!["live/main.tf", "override.tf"]);
    }

    #[test]
    fn oversized_files_are_skipped() {
        let dir = scratch_dir();
        fs::write(dir.path().join("big.tf"), "x".repeat(64)).unwrap();
        touch(dir.path(), "small.tf");

        let mut config = Config::default();
        config.max_file_size = 32;
        let files = discover(dir.path(), config);
        assert_eq!(files, vec!["small.tf"]);
    }
}
