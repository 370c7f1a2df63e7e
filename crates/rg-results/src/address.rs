//! Result identity: category plus name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a result comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCategory {
    StaticNative,
    DynamicNative,
    Generated,
    InputProperty,
    FormationNames,
    FlowDiagnostics,
    /// Generated result whose source was deleted; kept until the store is cleared.
    Removed,
}

impl ResultCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultCategory::StaticNative => "STATIC_NATIVE",
            ResultCategory::DynamicNative => "DYNAMIC_NATIVE",
            ResultCategory::Generated => "GENERATED",
            ResultCategory::InputProperty => "INPUT_PROPERTY",
            ResultCategory::FormationNames => "FORMATION_NAMES",
            ResultCategory::FlowDiagnostics => "FLOW_DIAGNOSTICS",
            ResultCategory::Removed => "REMOVED",
        }
    }
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a result in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultAddress {
    pub category: ResultCategory,
    pub name: String,
}

impl ResultAddress {
    pub fn new(category: ResultCategory, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }

    pub fn static_native(name: impl Into<String>) -> Self {
        Self::new(ResultCategory::StaticNative, name)
    }

    pub fn dynamic_native(name: impl Into<String>) -> Self {
        Self::new(ResultCategory::DynamicNative, name)
    }

    pub fn generated(name: impl Into<String>) -> Self {
        Self::new(ResultCategory::Generated, name)
    }
}

impl fmt::Display for ResultAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.name)
    }
}
