//! Wire format selection.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::RedmineError;

/// The serialization a client speaks for its whole lifetime. Decides both the
/// URL suffix and which codec runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeFormat {
    #[default]
    Xml,
    Json,
}

impl MimeFormat {
    /// URL suffix, without the dot.
    pub fn as_str(self) -> &'static str {
        match self {
            MimeFormat::Xml => "xml",
            MimeFormat::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            MimeFormat::Xml => "application/xml",
            MimeFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for MimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MimeFormat {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(MimeFormat::Xml),
            "json" => Ok(MimeFormat::Json),
            other => Err(RedmineError::InvalidConfig(format!(
                "unknown wire format `{other}` (expected `xml` or `json`)"
            ))),
        }
    }
}
