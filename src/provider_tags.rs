use crate::document::{is_truthy, Document, OneOrMany};
use crate::parser::UNEVALUATED;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Tag key to tag value.
pub type TagMap = BTreeMap<String, Value>;

/// Default tags injected by provider configurations, keyed by provider name.
///
/// Only non-empty tag maps are ever stored: a provider without an entry has
/// no defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderTagSet {
    providers: BTreeMap<String, TagMap>,
}

impl ProviderTagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `tags` for `provider`, replacing any earlier set.
    /// Returns false and records nothing when `tags` is empty.
    pub fn insert(&mut self, provider: impl Into<String>, tags: TagMap) -> bool {
        if tags.is_empty() {
            return false;
        }
        self.providers.insert(provider.into(), tags);
        true
    }

    pub fn get(&self, provider: &str) -> Option<&TagMap> {
        self.providers.get(provider)
    }

    pub fn has_defaults(&self, provider: &str) -> bool {
        self.providers.get(provider).is_some_and(|tags| !tags.is_empty())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TagMap)> {
        self.providers.iter()
    }

    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

/// Merges `new` over `existing`.
///
/// A provider present in `new` replaces its whole tag set in `existing`;
/// tag keys are never combined across the two.
pub fn merge(existing: ProviderTagSet, new: ProviderTagSet) -> ProviderTagSet {
    let mut merged = existing;
    for (provider, tags) in new.providers {
        merged.insert(provider, tags);
    }
    merged
}

/// Collects the default tags declared by every provider configuration in
/// `doc`. When a provider is configured more than once, the last
/// configuration with non-empty default tags wins.
pub fn extract_provider_defaults(doc: &Document) -> ProviderTagSet {
    let mut defaults = ProviderTagSet::new();

    for provider_block in doc.blocks_of_kind("provider") {
        for (provider_name, configs) in provider_block {
            for config in OneOrMany::objects(configs) {
                if let Some(tags) = default_tags(config) {
                    defaults.insert(provider_name.clone(), tags);
                }
            }
        }
    }

    defaults
}

fn default_tags(config: &Map<String, Value>) -> Option<TagMap> {
    let section = config.get("default_tags")?;
    OneOrMany::objects(section)
        .into_iter()
        .filter_map(|section| match section.get("tags") {
            Some(Value::Object(tags)) if !tags.is_empty() => {
                Some(tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<TagMap>())
            }
            // `tags = local.common` and the like: keys unknown until plan time.
            Some(other) if !other.is_object() && is_truthy(other) => {
                Some(TagMap::from([(UNEVALUATED.to_owned(), other.clone())]))
            }
            _ => None,
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs.iter().map(|(k, v)| (k.to_string(), json!(v))).collect()
    }

    #[test]
    fn extracts_non_empty_default_tags() {
        let doc = Document::new(vec![json!({"provider": {"aws": {
            "region": "us-east-1",
            "default_tags": {"tags": {"Owner": "x"}}
        }}})]);

        let defaults = extract_provider_defaults(&doc);
        assert_eq!(defaults.get("aws"), Some(&tags(&[("Owner", "x")])));
    }

    #[test]
    fn empty_or_missing_default_tags_are_not_recorded() {
        let doc = Document::new(vec![
            json!({"provider": {"aws": {"default_tags": {"tags": {}}}}}),
            json!({"provider": {"google": {"default_tags": {}}}}),
            json!({"provider": {"azurerm": {"features": {}}}}),
        ]);

        let defaults = extract_provider_defaults(&doc);
        assert!(defaults.is_empty());
        assert!(defaults.get("aws").is_none());
    }

    #[test]
    fn handles_single_and_sequence_configurations() {
        let doc = Document::new(vec![json!({"provider": {
            "aws": [
                {"alias": "east", "default_tags": {"tags": {"Owner": "east"}}},
                {"alias": "west", "default_tags": {"tags": {"Owner": "west"}}},
                {"alias": "bare"}
            ],
            "google": {"default_tags": [{"tags": {"team": "data"}}]}
        }})]);

        let defaults = extract_provider_defaults(&doc);
        assert_eq!(defaults.get("aws"), Some(&tags(&[("Owner", "west")])));
        assert_eq!(defaults.get("google"), Some(&tags(&[("team", "data")])));
    }

    #[test]
    fn malformed_entries_are_skipped_without_losing_siblings() {
        let doc = Document::new(vec![
            json!({"provider": ["not", "a", "map"]}),
            json!({"provider": {
                "broken": "string-config",
                "weird": {"default_tags": "nope"},
                "odd": {"default_tags": {"tags": []}},
                "aws": {"default_tags": {"tags": {"Owner": "x"}}}
            }}),
        ]);

        let defaults = extract_provider_defaults(&doc);
        assert_eq!(defaults.provider_names().collect::<Vec<_>>(), vec!["aws"]);
    }

    #[test]
    fn computed_default_tags_register_a_placeholder_set() {
        let doc = Document::new(vec![
            json!({"provider": {"aws": {"default_tags": {"tags": UNEVALUATED}}}}),
            json!({"provider": {"google": {"default_tags": {"tags": ""}}}}),
        ]);

        let defaults = extract_provider_defaults(&doc);
        assert_eq!(defaults.get("aws"), Some(&tags(&[(UNEVALUATED, UNEVALUATED)])));
        assert!(!defaults.has_defaults("google"));
    }

    #[test]
    fn later_block_in_document_wins() {
        let doc = Document::new(vec![
            json!({"provider": {"aws": {"default_tags": {"tags": {"Owner": "first"}}}}}),
            json!({"provider": {"aws": {"default_tags": {"tags": {"Team": "second"}}}}}),
        ]);

        let defaults = extract_provider_defaults(&doc);
        assert_eq!(defaults.get("aws"), Some(&tags(&[("Team", "second")])));
    }

    #[test]
    fn merge_replaces_whole_provider_sets() {
        let mut existing = ProviderTagSet::new();
        existing.insert("aws", tags(&[("Owner", "x"), ("Env", "prod")]));
        existing.insert("google", tags(&[("team", "data")]));

        let mut new = ProviderTagSet::new();
        new.insert("aws", tags(&[("CostCenter", "42")]));
        new.insert("azurerm", tags(&[("Owner", "y")]));

        let merged = merge(existing, new);
        assert_eq!(merged.get("aws"), Some(&tags(&[("CostCenter", "42")])));
        assert_eq!(merged.get("google"), Some(&tags(&[("team", "data")])));
        assert!(merged.has_defaults("azurerm"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn insert_refuses_empty_tag_maps() {
        let mut set = ProviderTagSet::new();
        assert!(!set.insert("aws", TagMap::new()));
        assert!(!set.has_defaults("aws"));
        assert!(set.is_empty());
    }
}
