//! Host platform enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Platform family a keymap file is generated for.
///
/// The display name doubles as the value of a binding's `"platform"` tag and
/// as the suffix of the generated file name (`Default (Linux).sublime-keymap`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "OSX", alias = "osx", alias = "macos")]
    Osx,
    #[serde(rename = "Windows", alias = "windows")]
    Windows,
    #[serde(rename = "Linux", alias = "linux")]
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Osx, Platform::Windows, Platform::Linux];

    /// The platform this process was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Osx
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Osx => "OSX",
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
        }
    }

    /// Tag value that excludes a binding on this platform, e.g. `"!Linux"`.
    pub fn exclusion_marker(self) -> String {
        format!("!{}", self.display_name())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    /// Accepts display names and host short names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "osx" | "macos" => Ok(Platform::Osx),
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            _ => Err(ConfigError::InvalidPlatform(s.to_string())),
        }
    }
}
