use crate::document::{is_truthy, Document};
use crate::provider_tags::ProviderTagSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Optional predicates narrowing which resources are audited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilter {
    /// Only audit resource types starting with this prefix.
    pub provider: Option<String>,
    /// Only audit this exact resource type.
    pub resource_type: Option<String>,
}

impl ResourceFilter {
    pub fn new(provider: Option<String>, resource_type: Option<String>) -> Self {
        Self { provider, resource_type }
    }

    fn accepts_type(&self, resource_type: &str) -> bool {
        self.resource_type.as_deref().map_or(true, |wanted| wanted == resource_type)
    }

    fn accepts_provider(&self, resource_type: &str) -> bool {
        self.provider.as_deref().map_or(true, |prefix| resource_type.starts_with(prefix))
    }
}

/// One declared resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub resource_type: String,
    pub resource_name: String,
    pub has_explicit_tags: bool,
}

/// A resource judged to be missing required tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub file: PathBuf,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(rename = "name")]
    pub resource_name: String,
}

impl Finding {
    pub fn new(file: impl Into<PathBuf>, record: ResourceRecord) -> Self {
        Self {
            file: file.into(),
            resource_type: record.resource_type,
            resource_name: record.resource_name,
        }
    }
}

/// Whether `provider` is the provider governing `resource_type` by the
/// `<provider>_<kind>` naming convention.
pub fn provider_owns(provider: &str, resource_type: &str) -> bool {
    match resource_type.strip_prefix(provider) {
        Some(rest) => rest.is_empty() || rest.starts_with('_'),
        None => false,
    }
}

/// Whether a resource of `resource_type` receives default tags from its
/// governing provider. With a provider filter set, the filter names the
/// governing provider.
pub fn inherits_tags(resource_type: &str, defaults: &ProviderTagSet, filter: &ResourceFilter) -> bool {
    defaults.iter().any(|(provider, tags)| {
        let governs = match filter.provider.as_deref() {
            Some(wanted) => provider == wanted,
            None => provider_owns(provider, resource_type),
        };
        governs && !tags.is_empty()
    })
}

/// Returns the resources of `doc` that have neither explicit tags nor
/// inherited provider defaults, in discovery order.
pub fn audit_resources(doc: &Document, defaults: &ProviderTagSet, filter: &ResourceFilter) -> Vec<ResourceRecord> {
    let mut untagged = Vec::new();

    for resource_block in doc.blocks_of_kind("resource") {
        for (resource_type, instances) in resource_block {
            if !filter.accepts_type(resource_type) {
                continue;
            }
            let Some(instances) = instances.as_object() else {
                tracing::trace!(resource_type = %resource_type, "skipping malformed resource instances");
                continue;
            };

            for (resource_name, config) in instances {
                let Some(config) = config.as_object() else {
                    tracing::trace!(resource_type = %resource_type, resource_name = %resource_name, "skipping malformed resource body");
                    continue;
                };
                if !filter.accepts_provider(resource_type) {
                    continue;
                }

                let has_explicit_tags = config.get("tags").is_some_and(is_truthy);
                if has_explicit_tags || inherits_tags(resource_type, defaults, filter) {
                    continue;
                }

                untagged.push(ResourceRecord {
                    resource_type: resource_type.clone(),
                    resource_name: resource_name.clone(),
                    has_explicit_tags,
                });
            }
        }
    }

    untagged
}
