use crate::config::Config;
use crate::document::Document;
use crate::file_discovery::{FileDiscovery, FileInfo};
use crate::parser;
use crate::provider_tags::{extract_provider_defaults, merge, ProviderTagSet};
use crate::resource_audit::{audit_resources, Finding, ResourceFilter};
use anyhow::{bail, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A successfully parsed configuration file.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub path: PathBuf,
    pub document: Document,
}

/// A candidate file the parser rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: PathBuf,
    pub files_scanned: usize,
    pub skipped: Vec<SkippedFile>,
    pub provider_defaults: ProviderTagSet,
    pub findings: Vec<Finding>,
}

impl ScanReport {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

pub struct Analyzer {
    config: Config,
    file_discovery: FileDiscovery,
}

impl Analyzer {
    pub fn new(config: Config) -> Result<Self> {
        if !config.target_directory.exists() {
            bail!("Path not found: {}", config.target_directory.display());
        }
        let file_discovery = FileDiscovery::new(config.clone());

        Ok(Self { config, file_discovery })
    }

    pub fn analyze_project(&self) -> Result<ScanReport> {
        tracing::info!("Scanning {}", self.config.target_directory.display());
        let files = self.file_discovery.discover_files()?;
        self.file_discovery.get_stats(&files).log_summary();

        let (documents, skipped) = Self::parse_files_parallel(&files);
        let (provider_defaults, findings) = scan_documents(&documents, &self.config.resource_filter());

        Ok(ScanReport {
            target: self.config.target_directory.clone(),
            files_scanned: documents.len(),
            skipped,
            provider_defaults,
            findings,
        })
    }

    /// Parses every file, keeping discovery order. Files that fail to parse
    /// are logged and set aside.
    fn parse_files_parallel(files: &[FileInfo]) -> (Vec<ParsedDocument>, Vec<SkippedFile>) {
        let results: Vec<_> = files
            .par_iter()
            .map(|file_info| (file_info, parser::parse_file(&file_info.path, file_info.syntax)))
            .collect();

        let mut documents = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for (file_info, result) in results {
            match result {
                Ok(document) => {
                    tracing::debug!("Parsed {}", file_info.path.display());
                    documents.push(ParsedDocument {
                        path: file_info.path.clone(),
                        document,
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unparsable file {}: {}", file_info.path.display(), e);
                    skipped.push(SkippedFile {
                        path: file_info.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (documents, skipped)
    }
}

/// Two-pass scan over parsed documents.
///
/// All provider defaults are merged in document order before any resource
/// is audited, so where a provider is declared relative to its resources
/// does not change the outcome. Findings keep document order, then
/// discovery order within a document.
pub fn scan_documents(documents: &[ParsedDocument], filter: &ResourceFilter) -> (ProviderTagSet, Vec<Finding>) {
    let provider_defaults = documents
        .iter()
        .map(|parsed| extract_provider_defaults(&parsed.document))
        .fold(ProviderTagSet::new(), merge);

    for (provider, tags) in provider_defaults.iter() {
        tracing::debug!("Provider {} supplies default tags: {:?}", provider, tags.keys().collect::<Vec<_>>());
    }

    let findings = documents
        .par_iter()
        .map(|parsed| {
            audit_resources(&parsed.document, &provider_defaults, filter)
                .into_iter()
                .map(|record| Finding::new(parsed.path.clone(), record))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    (provider_defaults, findings)
}
