use crate::unit::{self, MAX_PIP_POSITION, PipPosition, PriceStep};

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("field `{0}` is not a finite number")]
    NonFinite(&'static str),
    #[error("invalid pip precision: {0}")]
    InvalidPip(String),
    #[error("decoding: {0}")]
    Decode(String),
}

/// Snapshot as it arrives on the wire, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    pub symbol: Option<String>,
    pub current: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub adr_high: Option<f64>,
    pub adr_low: Option<f64>,
    pub pip_position: Option<u8>,
    pub pip_size: Option<f64>,
}

impl RawSnapshot {
    pub fn decode(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

/// One instrument's state for one render. Superseded wholesale by the next snapshot.
///
/// Built from a [`RawSnapshot`] through `TryFrom`, which applies the default policy once:
/// missing `high`/`low` fall back to the extremes of `current` and `open`, and either pip
/// field is derived from the other.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub current: f64,
    /// Session open. The meter centers on `current` while this is unknown.
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub adr_high: f64,
    pub adr_low: f64,
    pub pip_position: PipPosition,
    pub pip_size: f64,
}

impl MarketSnapshot {
    /// Center of the meter: the session open, or the current price before the open is known.
    pub fn mid(&self) -> f64 {
        self.open.unwrap_or(self.current)
    }

    /// Width of the average-daily-range envelope. May be zero or negative on degenerate input.
    pub fn adr_value(&self) -> f64 {
        self.adr_high - self.adr_low
    }

    pub fn pip_step(&self) -> Option<PriceStep> {
        PriceStep::from_f64(self.pip_size)
    }

    /// Checks every field the meter reads.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        finite("current", self.current)?;
        if let Some(open) = self.open {
            finite("open", open)?;
        }
        finite("high", self.high)?;
        finite("low", self.low)?;
        finite("adrHigh", self.adr_high)?;
        finite("adrLow", self.adr_low)?;

        if self.pip_step().is_none() {
            return Err(SnapshotError::InvalidPip(format!(
                "pip size {} is not a positive step",
                self.pip_size
            )));
        }
        if self.pip_position > MAX_PIP_POSITION {
            return Err(SnapshotError::InvalidPip(format!(
                "pip position {} exceeds {}",
                self.pip_position, MAX_PIP_POSITION
            )));
        }
        Ok(())
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64, SnapshotError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SnapshotError::NonFinite(name))
    }
}

fn required(name: &'static str, value: Option<f64>) -> Result<f64, SnapshotError> {
    value
        .ok_or(SnapshotError::Missing(name))
        .and_then(|v| finite(name, v))
}

fn optional(name: &'static str, value: Option<f64>) -> Result<Option<f64>, SnapshotError> {
    value.map(|v| finite(name, v)).transpose()
}

impl TryFrom<RawSnapshot> for MarketSnapshot {
    type Error = SnapshotError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        let symbol = raw
            .symbol
            .filter(|s| !s.trim().is_empty())
            .ok_or(SnapshotError::Missing("symbol"))?;

        let current = required("current", raw.current)?;
        let adr_high = required("adrHigh", raw.adr_high)?;
        let adr_low = required("adrLow", raw.adr_low)?;
        let open = optional("open", raw.open)?;

        let anchor = open.unwrap_or(current);
        let high = optional("high", raw.high)?.unwrap_or(current.max(anchor));
        let low = optional("low", raw.low)?.unwrap_or(current.min(anchor));
        let (high, low) = if high < low { (low, high) } else { (high, low) };

        let pip_size = optional("pipSize", raw.pip_size)?;
        let (pip_position, pip_size) = match (raw.pip_position, pip_size) {
            (Some(position), Some(size)) => (position, size),
            (Some(position), None) => {
                if position > MAX_PIP_POSITION {
                    return Err(SnapshotError::InvalidPip(format!(
                        "pip position {position} exceeds {MAX_PIP_POSITION}"
                    )));
                }
                (position, PriceStep::from_decimals(position).to_f64())
            }
            (None, Some(size)) => {
                let position = unit::pip_position_from_size(size).ok_or_else(|| {
                    SnapshotError::InvalidPip(format!("cannot derive pip position from {size}"))
                })?;
                (position, size)
            }
            (None, None) => return Err(SnapshotError::Missing("pipSize")),
        };

        let snapshot = MarketSnapshot {
            symbol,
            current,
            open,
            high,
            low,
            adr_high,
            adr_low,
            pip_position,
            pip_size,
        };
        snapshot.validate()?;

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eurusd() -> RawSnapshot {
        RawSnapshot {
            symbol: Some("EURUSD".to_string()),
            current: Some(1.0571),
            open: Some(1.0550),
            high: Some(1.0620),
            low: Some(1.0490),
            adr_high: Some(1.0650),
            adr_low: Some(1.0450),
            pip_position: Some(4),
            pip_size: Some(0.0001),
        }
    }

    #[test]
    fn decodes_camel_case_wire_format() {
        let json = r#"{"symbol":"EURUSD","current":1.0571,"open":1.055,"high":1.062,
            "low":1.049,"adrHigh":1.065,"adrLow":1.045,"pipPosition":4,"pipSize":0.0001}"#;

        let snapshot = RawSnapshot::decode(json)
            .and_then(MarketSnapshot::try_from)
            .unwrap();

        assert_eq!(snapshot.symbol, "EURUSD");
        assert_eq!(snapshot.open, Some(1.055));
        assert_eq!(snapshot.adr_low, 1.045);
        assert_eq!(snapshot.pip_position, 4);
    }

    #[test]
    fn missing_open_centers_on_current() {
        let raw = RawSnapshot {
            open: None,
            ..eurusd()
        };
        let snapshot = MarketSnapshot::try_from(raw).unwrap();

        assert_eq!(snapshot.mid(), 1.0571);
    }

    #[test]
    fn missing_extremes_fall_back_to_current_and_open() {
        let raw = RawSnapshot {
            high: None,
            low: None,
            ..eurusd()
        };
        let snapshot = MarketSnapshot::try_from(raw).unwrap();

        assert_eq!(snapshot.high, 1.0571);
        assert_eq!(snapshot.low, 1.0550);
    }

    #[test]
    fn pip_fields_derive_each_other() {
        let from_position = MarketSnapshot::try_from(RawSnapshot {
            pip_size: None,
            ..eurusd()
        })
        .unwrap();
        assert!((from_position.pip_size - 0.0001).abs() < 1e-12);

        let from_size = MarketSnapshot::try_from(RawSnapshot {
            pip_position: None,
            pip_size: Some(0.01),
            ..eurusd()
        })
        .unwrap();
        assert_eq!(from_size.pip_position, 2);

        let neither = MarketSnapshot::try_from(RawSnapshot {
            pip_position: None,
            pip_size: None,
            ..eurusd()
        });
        assert_eq!(neither, Err(SnapshotError::Missing("pipSize")));
    }

    #[test]
    fn rejects_missing_and_non_finite_fields() {
        let missing = MarketSnapshot::try_from(RawSnapshot {
            current: None,
            ..eurusd()
        });
        assert_eq!(missing, Err(SnapshotError::Missing("current")));

        let nan = MarketSnapshot::try_from(RawSnapshot {
            adr_high: Some(f64::NAN),
            ..eurusd()
        });
        assert_eq!(nan, Err(SnapshotError::NonFinite("adrHigh")));

        let inf_open = MarketSnapshot::try_from(RawSnapshot {
            open: Some(f64::INFINITY),
            ..eurusd()
        });
        assert_eq!(inf_open, Err(SnapshotError::NonFinite("open")));
    }

    #[test]
    fn degenerate_adr_is_not_a_validation_error() {
        let snapshot = MarketSnapshot::try_from(RawSnapshot {
            adr_high: Some(1.0450),
            adr_low: Some(1.0450),
            ..eurusd()
        })
        .unwrap();

        assert_eq!(snapshot.adr_value(), 0.0);
    }

    #[test]
    fn swapped_extremes_are_reordered() {
        let snapshot = MarketSnapshot::try_from(RawSnapshot {
            high: Some(1.0490),
            low: Some(1.0620),
            ..eurusd()
        })
        .unwrap();

        assert_eq!((snapshot.high, snapshot.low), (1.0620, 1.0490));
    }
}
