use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::errors::ExtraInfoError;

/// Primitive value allowed in the extra-info section of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        ExtraValue::Bool(value)
    }
}

impl From<i64> for ExtraValue {
    fn from(value: i64) -> Self {
        ExtraValue::Int(value)
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        ExtraValue::Str(value)
    }
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::Str(value.to_string())
    }
}

/// Bounded, ordered map of additional token information.
///
/// Keys are sorted so two issuers produce the same serialized payload for the
/// same content. Bounds are checked on insert and again when a token is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, ExtraValue>",
    into = "BTreeMap<String, ExtraValue>"
)]
pub struct ExtraInfo(BTreeMap<String, ExtraValue>);

impl ExtraInfo {
    pub const MAX_ENTRIES: usize = 16;
    pub const MAX_KEY_LENGTH: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    ///
    /// # Errors
    /// * `InvalidKey` - Key is empty or longer than 64 characters
    /// * `TooManyEntries` - Map already holds 16 distinct keys
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ExtraValue>,
    ) -> Result<(), ExtraInfoError> {
        let key = key.into();
        Self::check_key(&key)?;
        if !self.0.contains_key(&key) && self.0.len() >= Self::MAX_ENTRIES {
            return Err(ExtraInfoError::TooManyEntries {
                max: Self::MAX_ENTRIES,
            });
        }
        self.0.insert(key, value.into());
        Ok(())
    }

    /// Builder form of [`ExtraInfo::insert`].
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Into<ExtraValue>,
    ) -> Result<Self, ExtraInfoError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&ExtraValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ExtraValue)> {
        self.0.iter()
    }

    fn check_key(key: &str) -> Result<(), ExtraInfoError> {
        let length = key.chars().count();
        if length == 0 || length > Self::MAX_KEY_LENGTH {
            return Err(ExtraInfoError::InvalidKey {
                max: Self::MAX_KEY_LENGTH,
                actual: length,
            });
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, ExtraValue>> for ExtraInfo {
    type Error = ExtraInfoError;

    fn try_from(map: BTreeMap<String, ExtraValue>) -> Result<Self, Self::Error> {
        if map.len() > Self::MAX_ENTRIES {
            return Err(ExtraInfoError::TooManyEntries {
                max: Self::MAX_ENTRIES,
            });
        }
        for key in map.keys() {
            Self::check_key(key)?;
        }
        Ok(Self(map))
    }
}

impl From<ExtraInfo> for BTreeMap<String, ExtraValue> {
    fn from(info: ExtraInfo) -> Self {
        info.0
    }
}
