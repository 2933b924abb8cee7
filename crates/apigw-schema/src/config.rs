//! # Validator Options
//!
//! Settings shared by every schema a validator compiles. Deserializable so
//! that hosts can embed them in their own configuration files.

use std::fmt;
use std::str::FromStr;

use jsonschema::{Draft, ValidationOptions};
use serde::{Deserialize, Serialize};

/// JSON Schema draft used to compile schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchemaDraft {
    #[serde(rename = "draft4")]
    Draft4,
    #[serde(rename = "draft6")]
    Draft6,
    /// Gateway schemas are written against draft 7.
    #[default]
    #[serde(rename = "draft7")]
    Draft7,
    #[serde(rename = "draft2019-09")]
    Draft201909,
    #[serde(rename = "draft2020-12")]
    Draft202012,
}

impl SchemaDraft {
    /// Configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft4 => "draft4",
            Self::Draft6 => "draft6",
            Self::Draft7 => "draft7",
            Self::Draft201909 => "draft2019-09",
            Self::Draft202012 => "draft2020-12",
        }
    }
}

impl From<SchemaDraft> for Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => Draft::Draft4,
            SchemaDraft::Draft6 => Draft::Draft6,
            SchemaDraft::Draft7 => Draft::Draft7,
            SchemaDraft::Draft201909 => Draft::Draft201909,
            SchemaDraft::Draft202012 => Draft::Draft202012,
        }
    }
}

impl fmt::Display for SchemaDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaDraft {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft4" | "4" => Ok(Self::Draft4),
            "draft6" | "6" => Ok(Self::Draft6),
            "draft7" | "7" => Ok(Self::Draft7),
            "draft2019-09" | "2019-09" => Ok(Self::Draft201909),
            "draft2020-12" | "2020-12" => Ok(Self::Draft202012),
            other => Err(format!(
                "unknown JSON Schema draft '{other}' \
                 (expected draft4, draft6, draft7, draft2019-09 or draft2020-12)"
            )),
        }
    }
}

/// Options applied when compiling and resolving schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Draft every schema is compiled against.
    pub draft: SchemaDraft,
    /// Registry prefix holding plugin schemas; `limit-count` resolves to
    /// `<plugin_prefix>.limit-count`.
    pub plugin_prefix: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            draft: SchemaDraft::default(),
            plugin_prefix: "plugins".to_string(),
        }
    }
}

impl ValidatorOptions {
    /// Registry path of a plugin's schema.
    pub fn plugin_path(&self, plugin: &str) -> String {
        format!("{}.{plugin}", self.plugin_prefix)
    }

    /// Compilation options for the `jsonschema` engine.
    pub(crate) fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(self.draft.into());
        opts
    }
}
