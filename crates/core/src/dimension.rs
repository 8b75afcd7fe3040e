use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LogvaultError, Result};

/// Closed set of fields a caller may group counts by. Caller input is parsed
/// into this enum up front so the query fragment is always one of three fixed
/// strings, never caller-supplied text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Service,
    Level,
    Message,
}

impl Dimension {
    pub fn column(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Level => "level",
            Self::Message => "message",
        }
    }

    pub fn as_str(self) -> &'static str {
        self.column()
    }
}

impl FromStr for Dimension {
    type Err = LogvaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "service" => Ok(Self::Service),
            "level" => Ok(Self::Level),
            "message" => Ok(Self::Message),
            _ => Err(LogvaultError::InvalidDimension(s.to_string())),
        }
    }
}
