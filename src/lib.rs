pub mod config;
pub mod logging;
pub mod file_discovery;
pub mod document;
pub mod parser;
pub mod provider_tags;
pub mod resource_audit;
pub mod analyzer;
pub mod reporter;

pub use config::Config;
pub use file_discovery::FileDiscovery;
pub use document::{Document, OneOrMany};
pub use provider_tags::{extract_provider_defaults, merge, ProviderTagSet};
pub use resource_audit::{audit_resources, Finding, ResourceFilter, ResourceRecord};
pub use analyzer::{Analyzer, ScanReport};
pub use reporter::Reporter;

pub type Result<T> = anyhow::Result<T>;
