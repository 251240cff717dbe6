// rcp-common/src/manifest/options.rs
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RcpError;

/// Value of a package option. Booleans and the strings `True`/`False` are
/// interchangeable, matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl OptionValue {
    pub fn canonical(&self) -> String {
        match self {
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Str(s) if s.eq_ignore_ascii_case("true") => "True".to_string(),
            Self::Str(s) if s.eq_ignore_ascii_case("false") => "False".to_string(),
            Self::Str(s) => s.clone(),
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for OptionValue {}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// `package:option`, the key of an option override.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionKey {
    pub package: String,
    pub option: String,
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package, self.option)
    }
}

impl FromStr for OptionKey {
    type Err = RcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((package, option))
                if !package.is_empty() && !option.is_empty() && !option.contains(':') =>
            {
                Ok(Self {
                    package: package.to_string(),
                    option: option.to_string(),
                })
            }
            _ => Err(RcpError::ParseError(
                "option key",
                format!("'{s}' is not of the form package:option"),
            )),
        }
    }
}

/// Option overrides declared by a manifest, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    entries: BTreeMap<OptionKey, OptionValue>,
}

impl OptionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: OptionKey, value: OptionValue) -> Option<OptionValue> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, package: &str, option: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.package == package && k.option == option)
            .map(|(_, v)| v)
    }

    pub fn for_package<'a>(
        &'a self,
        package: &'a str,
    ) -> impl Iterator<Item = (&'a OptionKey, &'a OptionValue)> + 'a {
        self.entries.iter().filter(move |(k, _)| k.package == package)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OptionKey, &OptionValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<String, OptionValue>> for OptionOverrides {
    type Error = RcpError;

    fn try_from(raw: BTreeMap<String, OptionValue>) -> Result<Self, Self::Error> {
        let mut overrides = Self::new();
        for (key, value) in raw {
            overrides.insert(key.parse()?, value);
        }
        Ok(overrides)
    }
}

impl From<&OptionOverrides> for BTreeMap<String, OptionValue> {
    fn from(overrides: &OptionOverrides) -> Self {
        overrides
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}
