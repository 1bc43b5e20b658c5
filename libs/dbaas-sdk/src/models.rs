//! Wire models shared with the DBaaS aggregator.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Untyped connection properties as returned by the aggregator.
pub type ConnectionPropertiesMap = serde_json::Map<String, serde_json::Value>;

/// Well-known classifier attribute names.
pub mod classifier_keys {
    pub const MICROSERVICE_NAME: &str = "microserviceName";
    pub const NAMESPACE: &str = "namespace";
    pub const TENANT_ID: &str = "tenantId";
    pub const SCOPE: &str = "scope";
    pub const DB_ID: &str = "dbId";
}

/// Identity mapping used to look up or provision a logical database.
///
/// Attributes are kept in a sorted map, so two classifiers built from the
/// same attributes compare equal and encode identically no matter the order
/// in which the attributes were inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classifier(BTreeMap<String, String>);

impl Classifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical, injective text encoding of the classifier.
    ///
    /// Every key and value is written as `<byte length>:<bytes>` in sorted
    /// key order, so no two distinct classifiers share an encoding.
    #[must_use]
    pub fn canonical_form(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.0 {
            // Writing into a String cannot fail.
            write!(out, "{}:{key}{}:{value}", key.len(), value.len()).ok();
        }
        out
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl From<BTreeMap<String, String>> for Classifier {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Classifier
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Database creation parameters forwarded verbatim to the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseDbParams {
    /// Prefix for the physical database name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    /// Exclude the database from aggregator backups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_disabled: Option<bool>,
    /// Pin the database to a specific physical database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_database_id: Option<String>,
    /// Adapter-specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Logical database as tracked by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalDb {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub db_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<Classifier>,
    /// Raw connection properties; translated by the adapter.
    #[serde(default)]
    pub connection_properties: ConnectionPropertiesMap,
}
