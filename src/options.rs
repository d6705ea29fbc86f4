//! Option trees.
//!
//! An [`OptionTree`] maps option names to JSON values; nested objects form
//! sub-trees addressed with dotted paths (`"ams.multlineWidth"`).
//!
//! | Method           | Existing keys         | Unknown keys | Depth     |
//! |------------------|-----------------------|--------------|-----------|
//! | `merge_defaults` | kept                  | added        | top level |
//! | `overwrite`      | replaced              | added        | top level |
//! | `overlay`        | replaced / merged     | added        | recursive |
//! | `apply_user`     | replaced / merged     | rejected     | recursive |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionTree(Map<String, Value>);

impl OptionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value if it is an object.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up a dotted path through nested objects.
    ///
    /// ```rust
    /// use texpack::options::OptionTree;
    /// use serde_json::json;
    /// let tree = OptionTree::from_json(json!({"ams": {"multlineWidth": "100%"}})).unwrap();
    /// assert_eq!(tree.get_path("ams.multlineWidth"), Some(&json!("100%")));
    /// assert_eq!(tree.get_path("ams.missing"), None);
    /// ```
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Sets a top-level option, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Adds options from `defaults` whose names are not present yet.
    ///
    /// Returns the names that were skipped because a default already existed.
    pub fn merge_defaults(&mut self, defaults: &OptionTree) -> Vec<String> {
        let mut kept = Vec::new();
        for (key, value) in &defaults.0 {
            if self.0.contains_key(key) {
                kept.push(key.clone());
            } else {
                self.0.insert(key.clone(), value.clone());
            }
        }
        kept
    }

    /// Copies every top-level option from `other`, replacing existing values.
    pub fn overwrite(&mut self, other: &OptionTree) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Merges `other` recursively without checking names.
    pub fn overlay(&mut self, other: &OptionTree) {
        overlay_map(&mut self.0, &other.0);
    }

    /// Applies user overrides on top of the declared options.
    ///
    /// Objects merge into objects; any other value replaces what was there.
    /// Nothing changes unless every override names a declared option.
    ///
    /// # Errors
    /// [`ConfigError::UnknownOption`] with the dotted path of the first
    /// override that has no declared counterpart.
    pub fn apply_user(&mut self, user: &OptionTree) -> ConfigResult<()> {
        let mut updated = self.0.clone();
        apply_checked(&mut updated, &user.0, "")?;
        self.0 = updated;
        Ok(())
    }
}

impl From<Map<String, Value>> for OptionTree {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<OptionTree> for Value {
    fn from(tree: OptionTree) -> Self {
        Value::Object(tree.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OptionTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn overlay_map(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(inner)), Value::Object(incoming)) => overlay_map(inner, incoming),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn apply_checked(
    target: &mut Map<String, Value>,
    source: &Map<String, Value>,
    prefix: &str,
) -> ConfigResult<()> {
    for (key, value) in source {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match (target.get_mut(key), value) {
            (None, _) => return Err(ConfigError::UnknownOption { path }),
            (Some(Value::Object(inner)), Value::Object(incoming)) => {
                apply_checked(inner, incoming, &path)?
            }
            (Some(slot), _) => *slot = value.clone(),
        }
    }
    Ok(())
}
