//! Weather station device identifiers.
//!
//! Stations are addressed by their MAC address. Users type it with or
//! without separators; we keep the compact 12-character upper-case form and
//! only render the colon-separated form when it goes on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of hex digits in a station MAC address.
pub const DEVICE_ID_LEN: usize = 12;

/// Error returned when a device identifier is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceIdError {
    /// Nothing usable was supplied.
    #[error("device identifier is empty")]
    Empty,

    /// The identifier did not contain exactly 12 hex digits.
    #[error(
        "device identifier must be 12 hexadecimal characters (e.g. A0B1C2D3E4F5 or A0:B1:C2:D3:E4:F5), got {found} in {input:?}"
    )]
    WrongLength { input: String, found: usize },
}

/// A validated station identifier in compact form (`A0B1C2D3E4F5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(String);

impl DeviceId {
    /// Parses a user-supplied identifier.
    ///
    /// Input is upper-cased, every non-hex character is dropped, and the
    /// remainder must be exactly 12 digits long.
    pub fn parse(input: &str) -> Result<Self, DeviceIdError> {
        if input.trim().is_empty() {
            return Err(DeviceIdError::Empty);
        }

        let compact: String = input
            .chars()
            .filter(|c| c.is_ascii_hexdigit())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if compact.len() != DEVICE_ID_LEN {
            return Err(DeviceIdError::WrongLength {
                input: input.to_string(),
                found: compact.len(),
            });
        }

        Ok(Self(compact))
    }

    /// Returns the compact form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the colon-separated form expected by the telemetry API.
    pub fn wire_form(&self) -> String {
        let mut out = String::with_capacity(DEVICE_ID_LEN + DEVICE_ID_LEN / 2 - 1);
        for (i, c) in self.0.chars().enumerate() {
            if i > 0 && i % 2 == 0 {
                out.push(':');
            }
            out.push(c);
        }
        out
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = DeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
