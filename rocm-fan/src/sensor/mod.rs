//! GPU sensor readings.
//!
//! A [`SensorSnapshot`] is built fresh every cycle from the vendor tool's
//! output. Building one never fails: any field that cannot be extracted is
//! logged and replaced by a documented default, so the controller always
//! gets a complete snapshot.

pub mod extract;
mod reader;

use std::fmt;

pub use extract::{ExtractError, Field};
pub use reader::SensorReader;

use crate::tracing::prelude::*;

/// One temperature sensor's reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temperature {
    Celsius(i32),

    /// The reading could not be extracted.
    Unreadable,
}

impl Temperature {
    /// Value an unreadable sensor contributes to min/max comparisons.
    pub const UNREADABLE_C: i32 = -1;

    /// Reading in °C, with [`Self::UNREADABLE_C`] standing in for
    /// [`Temperature::Unreadable`].
    pub fn celsius(self) -> i32 {
        match self {
            Temperature::Celsius(c) => c,
            Temperature::Unreadable => Self::UNREADABLE_C,
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Celsius(c) => write!(f, "{c}°C"),
            Temperature::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// Temperatures and fan level from a single query of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSnapshot {
    pub edge: Temperature,
    pub junction: Temperature,
    pub memory: Temperature,

    /// Fan level the device reports right now.
    pub fan_level: u8,
}

impl SensorSnapshot {
    /// Extract a snapshot from the tool's telemetry text.
    ///
    /// Missing or malformed temperatures become [`Temperature::Unreadable`];
    /// a missing or malformed fan level becomes `default_fan_level`.
    pub fn from_output(text: &str, default_fan_level: u8) -> Self {
        Self {
            edge: temperature(text, &extract::EDGE),
            junction: temperature(text, &extract::JUNCTION),
            memory: temperature(text, &extract::MEMORY),
            fan_level: match extract::FAN_LEVEL.extract_as::<u8>(text) {
                Ok(level) => level,
                Err(e) => {
                    warn!(
                        field = extract::FAN_LEVEL.name,
                        error = %e,
                        default = default_fan_level,
                        raw = text,
                        "Failed to extract fan level"
                    );
                    default_fan_level
                }
            },
        }
    }

    pub fn temperatures(&self) -> [Temperature; 3] {
        [self.edge, self.junction, self.memory]
    }

    /// Hottest reading in °C; unreadable sensors count as -1.
    pub fn hottest_c(&self) -> i32 {
        self.temperatures()
            .iter()
            .map(|t| t.celsius())
            .max()
            .unwrap_or(Temperature::UNREADABLE_C)
    }

    /// Coldest reading in °C; negative when any sensor is unreadable.
    pub fn coldest_c(&self) -> i32 {
        self.temperatures()
            .iter()
            .map(|t| t.celsius())
            .min()
            .unwrap_or(Temperature::UNREADABLE_C)
    }
}

fn temperature(text: &str, field: &Field) -> Temperature {
    match field.extract_as::<i32>(text) {
        Ok(c) => Temperature::Celsius(c),
        Err(e) => {
            warn!(
                field = field.name,
                error = %e,
                raw = text,
                "Failed to extract temperature"
            );
            Temperature::Unreadable
        }
    }
}
