//! Consistency levels

use crate::error::{CqlError, CqlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Consistency level for reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum ConsistencyLevel {
    /// Any (write only)
    Any = 0x0000,
    /// One replica
    #[default]
    One = 0x0001,
    /// Two replicas
    Two = 0x0002,
    /// Three replicas
    Three = 0x0003,
    /// Quorum (majority)
    Quorum = 0x0004,
    /// All replicas
    All = 0x0005,
    /// Local quorum
    LocalQuorum = 0x0006,
    /// Each quorum
    EachQuorum = 0x0007,
    /// Serial (lightweight transaction)
    Serial = 0x0008,
    /// Local serial
    LocalSerial = 0x0009,
    /// Local one
    LocalOne = 0x000A,
}

impl ConsistencyLevel {
    /// Convert a native protocol code to a consistency level
    pub fn from_u16(value: u16) -> CqlResult<Self> {
        match value {
            0x0000 => Ok(ConsistencyLevel::Any),
            0x0001 => Ok(ConsistencyLevel::One),
            0x0002 => Ok(ConsistencyLevel::Two),
            0x0003 => Ok(ConsistencyLevel::Three),
            0x0004 => Ok(ConsistencyLevel::Quorum),
            0x0005 => Ok(ConsistencyLevel::All),
            0x0006 => Ok(ConsistencyLevel::LocalQuorum),
            0x0007 => Ok(ConsistencyLevel::EachQuorum),
            0x0008 => Ok(ConsistencyLevel::Serial),
            0x0009 => Ok(ConsistencyLevel::LocalSerial),
            0x000A => Ok(ConsistencyLevel::LocalOne),
            _ => Err(CqlError::Configuration {
                message: format!("Invalid consistency level code: {}", value),
                key: None,
            }),
        }
    }

    /// Native protocol code
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConsistencyLevel::Any => "ANY",
            ConsistencyLevel::One => "ONE",
            ConsistencyLevel::Two => "TWO",
            ConsistencyLevel::Three => "THREE",
            ConsistencyLevel::Quorum => "QUORUM",
            ConsistencyLevel::All => "ALL",
            ConsistencyLevel::LocalQuorum => "LOCAL_QUORUM",
            ConsistencyLevel::EachQuorum => "EACH_QUORUM",
            ConsistencyLevel::Serial => "SERIAL",
            ConsistencyLevel::LocalSerial => "LOCAL_SERIAL",
            ConsistencyLevel::LocalOne => "LOCAL_ONE",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyLevel {
    type Err = CqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ANY" => Ok(ConsistencyLevel::Any),
            "ONE" => Ok(ConsistencyLevel::One),
            "TWO" => Ok(ConsistencyLevel::Two),
            "THREE" => Ok(ConsistencyLevel::Three),
            "QUORUM" => Ok(ConsistencyLevel::Quorum),
            "ALL" => Ok(ConsistencyLevel::All),
            "LOCAL_QUORUM" => Ok(ConsistencyLevel::LocalQuorum),
            "EACH_QUORUM" => Ok(ConsistencyLevel::EachQuorum),
            "SERIAL" => Ok(ConsistencyLevel::Serial),
            "LOCAL_SERIAL" => Ok(ConsistencyLevel::LocalSerial),
            "LOCAL_ONE" => Ok(ConsistencyLevel::LocalOne),
            other => Err(CqlError::Configuration {
                message: format!("Unknown consistency level '{}'", other),
                key: None,
            }),
        }
    }
}
