//! # Parser Configuration
//!
//! Caller-supplied settings for a parse call: the ignore set, the limit cap
//! and the names of the reserved option keys. A [`Configuration`] is
//! validated when it is built and is read-only afterwards, so one instance
//! can be shared by any number of concurrent parse calls.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::errors::{ConfigError, ConfigResult};

/// Option keys intercepted before they reach the criteria document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedKey {
    Skip,
    Limit,
    Fields,
    Sort,
}

impl ReservedKey {
    pub const ALL: [ReservedKey; 4] = [
        ReservedKey::Skip,
        ReservedKey::Limit,
        ReservedKey::Fields,
        ReservedKey::Sort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservedKey::Skip => "skip",
            ReservedKey::Limit => "limit",
            ReservedKey::Fields => "fields",
            ReservedKey::Sort => "sort",
        }
    }
}

/// Query parameter names recognized for each reserved key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReservedKeys {
    /// Names for `skip` (default: `offset`, `skip`)
    pub skip: Vec<String>,

    /// Names for `limit` (default: `limit`)
    pub limit: Vec<String>,

    /// Names for `fields` (default: `fields`)
    pub fields: Vec<String>,

    /// Names for `sort` (default: `sort`)
    pub sort: Vec<String>,
}

impl Default for ReservedKeys {
    fn default() -> Self {
        Self {
            skip: vec!["offset".to_string(), "skip".to_string()],
            limit: vec!["limit".to_string()],
            fields: vec!["fields".to_string()],
            sort: vec!["sort".to_string()],
        }
    }
}

impl ReservedKeys {
    /// Names configured for one reserved key
    pub fn names(&self, key: ReservedKey) -> &[String] {
        match key {
            ReservedKey::Skip => &self.skip,
            ReservedKey::Limit => &self.limit,
            ReservedKey::Fields => &self.fields,
            ReservedKey::Sort => &self.sort,
        }
    }

    fn names_mut(&mut self, key: ReservedKey) -> &mut Vec<String> {
        match key {
            ReservedKey::Skip => &mut self.skip,
            ReservedKey::Limit => &mut self.limit,
            ReservedKey::Fields => &mut self.fields,
            ReservedKey::Sort => &mut self.sort,
        }
    }
}

/// Unvalidated configuration as it appears in JSON
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct RawConfiguration {
    ignore: Vec<String>,
    max_limit: Option<i64>,
    #[serde(alias = "reservedKeyAliases")]
    reserved_keys: ReservedKeys,
}

/// Validated, immutable parser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawConfiguration")]
pub struct Configuration {
    ignore: HashSet<String>,
    max_limit: Option<u64>,
    reserved_keys: ReservedKeys,
    reserved_lookup: HashMap<String, ReservedKey>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::assemble(HashSet::new(), None, ReservedKeys::default())
    }
}

impl Configuration {
    /// Start building a configuration
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Validate a decoded JSON configuration document.
    ///
    /// Keys: `ignore`, `maxLimit`, `reservedKeys` (alias `reservedKeyAliases`).
    pub fn from_json_value(value: serde_json::Value) -> ConfigResult<Self> {
        let raw: RawConfiguration = serde_json::from_value(value)?;
        Self::try_from(raw)
    }

    /// Whether a key is dropped from both documents
    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignore.contains(key)
    }

    /// The reserved key a query parameter name maps to, if any
    pub fn reserved_key(&self, name: &str) -> Option<ReservedKey> {
        self.reserved_lookup.get(name).copied()
    }

    /// Upper bound applied to `limit`
    pub fn max_limit(&self) -> Option<u64> {
        self.max_limit
    }

    pub fn ignored(&self) -> impl Iterator<Item = &str> {
        self.ignore.iter().map(String::as_str)
    }

    fn assemble(
        ignore: HashSet<String>,
        max_limit: Option<u64>,
        reserved_keys: ReservedKeys,
    ) -> Self {
        let reserved_lookup = ReservedKey::ALL
            .iter()
            .flat_map(|key| {
                reserved_keys
                    .names(*key)
                    .iter()
                    .map(move |name| (name.clone(), *key))
            })
            .collect();

        Self {
            ignore,
            max_limit,
            reserved_keys,
            reserved_lookup,
        }
    }
}

impl TryFrom<RawConfiguration> for Configuration {
    type Error = ConfigError;

    fn try_from(raw: RawConfiguration) -> ConfigResult<Self> {
        let max_limit = match raw.max_limit {
            Some(n) if n < 0 => return Err(ConfigError::InvalidMaxLimit(n)),
            Some(n) => Some(n as u64),
            None => None,
        };

        validate_reserved_keys(&raw.reserved_keys)?;

        Ok(Self::assemble(
            raw.ignore.into_iter().collect(),
            max_limit,
            raw.reserved_keys,
        ))
    }
}

fn validate_reserved_keys(keys: &ReservedKeys) -> ConfigResult<()> {
    let mut owners: HashMap<&str, ReservedKey> = HashMap::new();

    for key in ReservedKey::ALL {
        let names = keys.names(key);
        if names.is_empty() {
            return Err(ConfigError::NoAliases(key.as_str()));
        }

        for name in names {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyAlias(key.as_str()));
            }
            if let Some(owner) = owners.insert(name.as_str(), key) {
                if owner != key {
                    return Err(ConfigError::ConflictingAlias {
                        name: name.clone(),
                        first: owner.as_str(),
                        second: key.as_str(),
                    });
                }
            }
        }
    }

    Ok(())
}

/// Builder for [`Configuration`]; validation happens in [`build`](Self::build)
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    raw: RawConfiguration,
}

impl ConfigurationBuilder {
    /// Add keys to the ignore set
    pub fn ignore<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raw.ignore.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Cap `limit` at this value; negative values fail at build time
    pub fn max_limit(mut self, max_limit: i64) -> Self {
        self.raw.max_limit = Some(max_limit);
        self
    }

    /// Replace the names recognized for a single reserved key
    pub fn alias<I, S>(mut self, key: ReservedKey, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.raw.reserved_keys.names_mut(key) = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> ConfigResult<Configuration> {
        Configuration::try_from(self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.max_limit(), None);
        assert_eq!(config.ignored().count(), 0);
        assert_eq!(config.reserved_key("offset"), Some(ReservedKey::Skip));
        assert_eq!(config.reserved_key("skip"), Some(ReservedKey::Skip));
        assert_eq!(config.reserved_key("limit"), Some(ReservedKey::Limit));
        assert_eq!(config.reserved_key("fields"), Some(ReservedKey::Fields));
        assert_eq!(config.reserved_key("sort"), Some(ReservedKey::Sort));
        assert_eq!(config.reserved_key("name"), None);
    }

    #[test]
    fn test_builder() {
        let config = Configuration::builder()
            .ignore(["envelope", "_"])
            .max_limit(50)
            .build()
            .unwrap();

        assert!(config.is_ignored("envelope"));
        assert!(config.is_ignored("_"));
        assert!(!config.is_ignored("field"));
        assert_eq!(config.max_limit(), Some(50));
    }

    #[test]
    fn test_negative_max_limit_rejected() {
        let result = Configuration::builder().max_limit(-1).build();
        assert_eq!(result.unwrap_err(), ConfigError::InvalidMaxLimit(-1));
    }

    #[test]
    fn test_zero_max_limit_allowed() {
        let config = Configuration::builder().max_limit(0).build().unwrap();
        assert_eq!(config.max_limit(), Some(0));
    }

    #[test]
    fn test_alias_replaces_names() {
        let config = Configuration::builder()
            .alias(ReservedKey::Skip, ["page_offset"])
            .alias(ReservedKey::Sort, ["order"])
            .build()
            .unwrap();

        assert_eq!(config.reserved_key("page_offset"), Some(ReservedKey::Skip));
        assert_eq!(config.reserved_key("offset"), None);
        assert_eq!(config.reserved_key("order"), Some(ReservedKey::Sort));
        assert_eq!(config.reserved_key("sort"), None);
    }

    #[test]
    fn test_conflicting_alias_rejected() {
        let result = Configuration::builder()
            .alias(ReservedKey::Limit, ["limit", "skip"])
            .build();

        assert_eq!(
            result.unwrap_err(),
            ConfigError::ConflictingAlias {
                name: "skip".to_string(),
                first: "skip",
                second: "limit",
            }
        );
    }

    #[test]
    fn test_duplicate_name_within_one_key_allowed() {
        let config = Configuration::builder()
            .alias(ReservedKey::Limit, ["limit", "limit"])
            .build()
            .unwrap();
        assert_eq!(config.reserved_key("limit"), Some(ReservedKey::Limit));
    }

    #[test]
    fn test_empty_alias_rejected() {
        let result = Configuration::builder()
            .alias(ReservedKey::Fields, [" "])
            .build();
        assert_eq!(result.unwrap_err(), ConfigError::EmptyAlias("fields"));

        let result = Configuration::builder()
            .alias(ReservedKey::Sort, Vec::<String>::new())
            .build();
        assert_eq!(result.unwrap_err(), ConfigError::NoAliases("sort"));
    }

    #[test]
    fn test_from_json() {
        let config = Configuration::from_json_value(json!({
            "ignore": ["envelope"],
            "maxLimit": 50,
            "reservedKeys": {"fields": ["select"]}
        }))
        .unwrap();

        assert!(config.is_ignored("envelope"));
        assert_eq!(config.max_limit(), Some(50));
        assert_eq!(config.reserved_key("select"), Some(ReservedKey::Fields));
        // Unlisted keys keep their defaults
        assert_eq!(config.reserved_key("offset"), Some(ReservedKey::Skip));
    }

    #[test]
    fn test_from_json_alias_key_name() {
        let config =
            Configuration::from_json_value(json!({"reservedKeyAliases": {"limit": ["per_page"]}}))
                .unwrap();
        assert_eq!(config.reserved_key("per_page"), Some(ReservedKey::Limit));
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        assert_eq!(
            Configuration::from_json_value(json!({"maxLimit": -5})).unwrap_err(),
            ConfigError::InvalidMaxLimit(-5)
        );
        assert!(matches!(
            Configuration::from_json_value(json!({"maxLimit": 2.5})),
            Err(ConfigError::Malformed(_))
        ));
        assert!(matches!(
            Configuration::from_json_value(json!({"maxLimit": "50"})),
            Err(ConfigError::Malformed(_))
        ));
        assert!(matches!(
            Configuration::from_json_value(json!({"ignore": "envelope"})),
            Err(ConfigError::Malformed(_))
        ));
        assert!(matches!(
            Configuration::from_json_value(json!({"maxlimit": 5})),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn test_serde_deserialize_validates() {
        let result: Result<Configuration, _> = serde_json::from_str(r#"{"maxLimit": -1}"#);
        assert!(result.is_err());

        let config: Configuration = serde_json::from_str(r#"{"maxLimit": 10}"#).unwrap();
        assert_eq!(config.max_limit(), Some(10));
    }

    #[test]
    fn test_configuration_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Configuration>();
    }
}
