use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Field delimiter recognised by the pipeline.
///
/// Only comma and semicolon are supported. Tab and pipe files are read as
/// semicolon files (i.e. one wide column) rather than sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    Comma,
    /// Default before any file has been seen
    #[default]
    Semicolon,
}

impl Separator {
    pub fn as_byte(self) -> u8 {
        match self {
            Separator::Comma => b',',
            Separator::Semicolon => b';',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Separator::Comma => "comma",
            Separator::Semicolon => "semicolon",
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Separator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "," | "comma" => Ok(Separator::Comma),
            ";" | "semicolon" => Ok(Separator::Semicolon),
            other => Err(format!(
                "unknown separator {:?} (expected comma or semicolon)",
                other
            )),
        }
    }
}
