//! Position vocabularies and the translation between them.
//!
//! Three vocabularies meet here:
//!
//! | Vocabulary | Example | Convention |
//! |------------|---------|------------|
//! | Human command | `open`, `close`, `closed` | — |
//! | Bus percent | `30` | 0 = fully open, 100 = fully closed |
//! | Device percent | `70` | 0 = fully closed, 100 = fully open |
//!
//! [`BusPercent`] ↔ [`DevicePercent`] is the only place the inversion happens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidPosition;

/// Payload tokens that read as "yes" (compared case-insensitively).
pub const TRUTHY: [&str; 5] = ["true", "1", "t", "y", "yes"];

/// Whether `value` is one of the [`TRUTHY`] tokens.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    TRUTHY.iter().any(|token| value.eq_ignore_ascii_case(token))
}

/// Gateway-native position: 0 = closed, 100 = fully open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DevicePercent(u8);

impl DevicePercent {
    pub const CLOSED: Self = Self(0);
    pub const OPEN: Self = Self(100);

    /// # Errors
    ///
    /// Returns [`InvalidPosition`] when `value` exceeds 100.
    pub fn new(value: u8) -> Result<Self, InvalidPosition> {
        if value > 100 {
            return Err(InvalidPosition {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// True iff the device reports fully closed.
    #[must_use]
    pub fn is_closed(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for DevicePercent {
    type Error = InvalidPosition;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DevicePercent> for u8 {
    fn from(percent: DevicePercent) -> Self {
        percent.0
    }
}

impl From<BusPercent> for DevicePercent {
    fn from(bus: BusPercent) -> Self {
        Self(100 - bus.0)
    }
}

impl fmt::Display for DevicePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Bus-facing "closed-ness": 0 = fully open, 100 = fully closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusPercent(u8);

impl BusPercent {
    /// # Errors
    ///
    /// Returns [`InvalidPosition`] when `value` exceeds 100.
    pub fn new(value: u8) -> Result<Self, InvalidPosition> {
        if value > 100 {
            return Err(InvalidPosition {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<DevicePercent> for BusPercent {
    fn from(device: DevicePercent) -> Self {
        Self(100 - device.0)
    }
}

impl FromStr for BusPercent {
    type Err = InvalidPosition;

    /// Accepts a plain run of ASCII digits whose value is at most 100.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidPosition {
            value: s.to_string(),
        };
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: u8 = s.parse().map_err(|_| invalid())?;
        Self::new(value).map_err(|_| invalid())
    }
}

impl fmt::Display for BusPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A position as requested in a command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedPosition {
    Open,
    Closed,
    Percent(BusPercent),
}

impl RequestedPosition {
    /// Resolve into the gateway's convention.
    #[must_use]
    pub fn to_device(self) -> DevicePercent {
        match self {
            Self::Open => DevicePercent::OPEN,
            Self::Closed => DevicePercent::CLOSED,
            Self::Percent(bus) => bus.into(),
        }
    }
}

impl FromStr for RequestedPosition {
    type Err = InvalidPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "close" | "closed" => Ok(Self::Closed),
            other => other.parse().map(Self::Percent),
        }
    }
}

/// Translate a requested position string into a device percent.
///
/// # Errors
///
/// Returns [`InvalidPosition`] for anything other than `open`, `close`,
/// `closed`, or a digit string in `0..=100`.
pub fn translate(requested: &str) -> Result<DevicePercent, InvalidPosition> {
    requested.parse::<RequestedPosition>().map(RequestedPosition::to_device)
}

/// Resolve the payload of a `closed` action: truthy closes, anything else opens.
#[must_use]
pub fn translate_closed_flag(payload: &str) -> DevicePercent {
    if is_truthy(payload) {
        DevicePercent::CLOSED
    } else {
        DevicePercent::OPEN
    }
}
