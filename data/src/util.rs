use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes a field, falling back to `T::default()` when the stored shape no longer matches.
pub fn ok_or_default<'a, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'a> + Default,
    D: Deserializer<'a>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// `+1.25%` / `-0.40%` style readout with an explicit sign.
pub fn format_signed(value: f64, decimals: usize, suffix: &str) -> String {
    let sign = if value > 0.0 {
        "+"
    } else if value < 0.0 {
        "-"
    } else {
        ""
    };
    format!("{sign}{:.decimals$}{suffix}", value.abs())
}
