//! Architecture selection for a CPU session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::word::WordSize;

/// Supported instruction-set architectures. Chosen once, when a session is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchType {
    Arm,
    Arm64,
    X86,
    X8664,
    Mips,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown architecture '{0}'")]
pub struct ParseArchError(pub String);

impl ArchType {
    pub const ALL: [ArchType; 5] = [
        ArchType::Arm,
        ArchType::Arm64,
        ArchType::X86,
        ArchType::X8664,
        ArchType::Mips,
    ];

    /// Lenient parse accepting the common spellings of each architecture.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().to_ascii_lowercase();
        match trimmed.as_str() {
            "arm" | "arm32" | "armv7" => Some(Self::Arm),
            "arm64" | "aarch64" => Some(Self::Arm64),
            "x86" | "i386" | "i686" => Some(Self::X86),
            "x8664" | "x86_64" | "x86-64" | "amd64" => Some(Self::X8664),
            "mips" | "mipsel" | "mips32" => Some(Self::Mips),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::X86 => "x86",
            Self::X8664 => "x8664",
            Self::Mips => "mips",
        }
    }

    pub fn word_size(self) -> WordSize {
        match self {
            Self::Arm | Self::X86 | Self::Mips => WordSize::Four,
            Self::Arm64 | Self::X8664 => WordSize::Eight,
        }
    }
}

impl fmt::Display for ArchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ArchType {
    type Err = ParseArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseArchError(s.to_string()))
    }
}

/// Session settings as supplied by the surrounding framework, e.g. `{"arch": "arm64"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub arch: ArchType,
}

impl SessionConfig {
    pub fn new(arch: ArchType) -> Self {
        Self { arch }
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(ArchType::parse(" AArch64 "), Some(ArchType::Arm64));
        assert_eq!(ArchType::parse("x86_64"), Some(ArchType::X8664));
        assert_eq!(ArchType::parse("amd64"), Some(ArchType::X8664));
        assert_eq!(ArchType::parse("i386"), Some(ArchType::X86));
        assert_eq!(ArchType::parse("mipsel"), Some(ArchType::Mips));
        assert_eq!(ArchType::parse(""), None);
        assert_eq!(ArchType::parse("riscv"), None);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for arch in ArchType::ALL {
            assert_eq!(arch.to_string().parse::<ArchType>(), Ok(arch));
        }
        assert_eq!(
            "ppc".parse::<ArchType>(),
            Err(ParseArchError("ppc".to_string()))
        );
    }

    #[test]
    fn word_sizes() {
        assert_eq!(ArchType::Arm.word_size().bytes(), 4);
        assert_eq!(ArchType::Arm64.word_size().bytes(), 8);
        assert_eq!(ArchType::X8664.word_size().bytes(), 8);
    }

    #[test]
    fn config_from_json() {
        let config = SessionConfig::from_json(r#"{"arch": "arm64"}"#).unwrap();
        assert_eq!(config, SessionConfig::new(ArchType::Arm64));
        assert!(SessionConfig::from_json(r#"{"arch": "sparc"}"#).is_err());
        assert_eq!(
            serde_json::to_string(&SessionConfig::new(ArchType::X8664)).unwrap(),
            r#"{"arch":"x8664"}"#
        );
    }
}
