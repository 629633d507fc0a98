use crate::{Error, Result};

use indexmap::IndexMap;
use std::str::FromStr;

/// Free-form key/value options attached to a message or field.
///
/// Keys are stored without the `options.` prefix, e.g. `sql.table`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Options {
    map: IndexMap<String, String>,
}

impl Options {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    /// Parses an option with `FromStr`. A present but malformed value is an
    /// invalid schema error.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        value.parse().map(Some).map_err(|e| {
            Error::invalid_schema(format!("invalid value `{value}` for option `{key}`: {e}"))
        })
    }

    /// Reads a boolean option: `yes`/`no`/`true`/`false`.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some("yes" | "true") => Ok(Some(true)),
            Some("no" | "false") => Ok(Some(false)),
            Some(value) => Err(Error::invalid_schema(format!(
                "invalid value `{value}` for boolean option `{key}`"
            ))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Options {
            map: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
