//! Visible price window of the day range meter.
//!
//! The window is centered on the session open and extends by a multiple of the
//! average daily range (ADR) on each side. Each side grows on its own: small moves keep
//! the baseline 50% envelope, larger moves step out in quarter-ADR increments so the
//! gridlines stay predictable instead of sliding continuously.

use exchange::MarketSnapshot;
use serde::{Deserialize, Serialize};

/// Keeps exact quarter boundaries (e.g. 0.85 + 0.15) from rounding up a whole step.
const CEIL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Movement (in ADR) up to which a side keeps the base envelope
    pub inner_threshold: f64,
    /// Movement (in ADR) up to which a side uses the middle envelope
    pub outer_threshold: f64,
    pub base_expansion: f64,
    pub middle_expansion: f64,
    /// Headroom added past the extreme before rounding up
    pub breakout_buffer: f64,
    /// Increment the breakout envelope is rounded up to
    pub step: f64,
    /// Envelope width in pips when the ADR is unusable
    pub fallback_adr_pips: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inner_threshold: 0.4,
            outer_threshold: 0.6,
            base_expansion: 0.5,
            middle_expansion: 0.75,
            breakout_buffer: 0.15,
            step: 0.25,
            fallback_adr_pips: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveScale {
    pub min: f64,
    pub max: f64,
    /// `max - min`, always positive
    pub range: f64,
    pub upper_expansion: f64,
    pub lower_expansion: f64,
    pub max_adr_percentage: f64,
    pub is_progressive: bool,
    /// Center the envelope is measured from
    pub mid: f64,
    /// ADR as reported by the snapshot, zero or negative when degenerate
    pub adr_value: f64,
    /// Price distance of one ADR on screen; equals `adr_value` unless the fallback kicked in
    pub envelope_unit: f64,
}

impl Default for AdaptiveScale {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            range: 1.0,
            upper_expansion: 0.5,
            lower_expansion: 0.5,
            max_adr_percentage: 0.5,
            is_progressive: false,
            mid: 0.5,
            adr_value: 0.0,
            envelope_unit: 1.0,
        }
    }
}

impl AdaptiveScale {
    /// Upper envelope edge, before widening for the session extremes
    pub fn upper_boundary(&self) -> f64 {
        self.mid + self.envelope_unit * self.upper_expansion
    }

    /// Lower envelope edge, before widening for the session extremes
    pub fn lower_boundary(&self) -> f64 {
        self.mid - self.envelope_unit * self.lower_expansion
    }

    pub fn has_adr(&self) -> bool {
        self.adr_value > 0.0
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    fn widened(mut self, prices: &[f64]) -> Self {
        for &price in prices.iter().filter(|p| p.is_finite()) {
            self.max = self.max.max(price);
            self.min = self.min.min(price);
        }
        self.range = self.max - self.min;
        self
    }
}

/// Envelope multiple for one side, given how far price travelled that way (in ADR).
pub fn expansion_for(movement: f64, config: &Config) -> f64 {
    if movement <= config.inner_threshold {
        config.base_expansion
    } else if movement <= config.outer_threshold {
        config.middle_expansion
    } else {
        let steps = ((movement + config.breakout_buffer) / config.step - CEIL_EPSILON).ceil();
        (steps * config.step).max(config.middle_expansion)
    }
}

pub fn compute_adaptive_scale(snapshot: &MarketSnapshot, config: &Config) -> AdaptiveScale {
    let mid = snapshot.mid();
    let adr_value = snapshot.adr_value();

    let inputs = [
        mid,
        adr_value,
        snapshot.high,
        snapshot.low,
        snapshot.current,
    ];
    if inputs.iter().any(|v| !v.is_finite()) || adr_value <= 0.0 {
        log::debug!(
            "{}: unusable ADR {} - {}, using default scale",
            snapshot.symbol,
            snapshot.adr_low,
            snapshot.adr_high
        );
        return fallback_scale(snapshot, config);
    }

    let up_move = ((snapshot.high - mid) / adr_value)
        .max((snapshot.current - mid) / adr_value)
        .max(0.0);
    let down_move = ((mid - snapshot.low) / adr_value)
        .max((mid - snapshot.current) / adr_value)
        .max(0.0);

    let upper_expansion = expansion_for(up_move, config);
    let lower_expansion = expansion_for(down_move, config);

    let max = mid + adr_value * upper_expansion;
    let min = mid - adr_value * lower_expansion;

    AdaptiveScale {
        min,
        max,
        range: max - min,
        upper_expansion,
        lower_expansion,
        max_adr_percentage: upper_expansion.max(lower_expansion),
        is_progressive: upper_expansion > config.base_expansion
            || lower_expansion > config.base_expansion,
        mid,
        adr_value,
        envelope_unit: adr_value,
    }
    .widened(&[snapshot.high, snapshot.low, snapshot.current])
}

/// Base 50/50 envelope around the open, sized from the session range or a pip count.
fn fallback_scale(snapshot: &MarketSnapshot, config: &Config) -> AdaptiveScale {
    let mid = snapshot.mid();
    if !mid.is_finite() {
        return AdaptiveScale::default();
    }

    let session = snapshot.high - snapshot.low;
    let from_pips = snapshot.pip_size * config.fallback_adr_pips;
    let unit = [session, from_pips]
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold(0.0_f64, f64::max);
    let unit = if unit > 0.0 { unit } else { 1.0 };

    let base = config.base_expansion;
    let adr_value = snapshot.adr_value();

    AdaptiveScale {
        min: mid - unit * base,
        max: mid + unit * base,
        range: unit * base * 2.0,
        upper_expansion: base,
        lower_expansion: base,
        max_adr_percentage: base,
        is_progressive: false,
        mid,
        adr_value: if adr_value.is_finite() { adr_value } else { 0.0 },
        envelope_unit: unit,
    }
    .widened(&[snapshot.high, snapshot.low, snapshot.current])
}
