//! Deploy process parameters

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::DeployError;

/// Which MTA versions may replace the deployed one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionRule {
    Higher,
    #[default]
    SameHigher,
    All,
}

impl VersionRule {
    pub fn as_str(self) -> &'static str {
        match self {
            VersionRule::Higher => "HIGHER",
            VersionRule::SameHigher => "SAME_HIGHER",
            VersionRule::All => "ALL",
        }
    }
}

impl fmt::Display for VersionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionRule {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HIGHER" => Ok(VersionRule::Higher),
            "SAME_HIGHER" => Ok(VersionRule::SameHigher),
            "ALL" => Ok(VersionRule::All),
            _ => Err(DeployError::Usage(format!("Invalid version rule {}.", s))),
        }
    }
}

/// Parameters of a deploy process, keyed by parameter id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationParameters {
    values: BTreeMap<String, String>,
}

impl OperationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string parameter
    pub fn with(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(id.into(), value.into());
        self
    }

    /// Set a boolean parameter as "true"/"false"
    pub fn with_flag(self, id: impl Into<String>, value: bool) -> Self {
        self.with(id, value.to_string())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<OperationParameters> for openapi_client::ProcessParameters {
    fn from(params: OperationParameters) -> Self {
        Self {
            parameters: params.values,
        }
    }
}
