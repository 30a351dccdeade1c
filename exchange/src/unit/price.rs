use serde::{Deserialize, Serialize};

/// Fixed atomic unit scale: 10^-PRICE_SCALE is the smallest stored fraction.
/// Quote currencies never go below 10^-8 in practice, so pips and fractional pips are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
pub struct Price {
    /// number of atomic units (atomic unit = 10^-PRICE_SCALE)
    pub units: i64,
}

impl Price {
    /// number of decimal places of the atomic unit (10^-8)
    pub const PRICE_SCALE: i32 = 8;

    const SCALE_F64: f64 = 100_000_000.0;

    /// Formats the price cut (not rounded) to `decimals` places, trailing zeros stripped.
    ///
    /// `1.05567` with 4 decimals is `"1.0556"`, `1.05500` is `"1.055"`.
    pub fn format_truncated(self, decimals: u8) -> String {
        let mut out = String::with_capacity(24);
        // writing into a String cannot fail
        let _ = self.fmt_truncated_into(decimals, &mut out);
        out
    }

    pub fn fmt_truncated_into<W: core::fmt::Write>(
        self,
        decimals: u8,
        out: &mut W,
    ) -> core::fmt::Result {
        let scale_u = Self::PRICE_SCALE as u32;
        let decimals = u32::from(decimals).min(scale_u);

        let truncated = self.truncate_to_decimals(decimals as u8);

        if truncated.units < 0 {
            out.write_char('-')?;
        }
        let abs_u = (truncated.units as i128).unsigned_abs();

        let scale_pow = 10u128.pow(scale_u);
        let int_part = abs_u / scale_pow;
        write!(out, "{int_part}")?;

        if decimals == 0 {
            return Ok(());
        }

        let frac_div = 10u128.pow(scale_u - decimals);
        let mut frac_part = (abs_u % scale_pow) / frac_div;
        let mut width = decimals as usize;

        while width > 0 && frac_part % 10 == 0 {
            frac_part /= 10;
            width -= 1;
        }

        if width == 0 {
            return Ok(());
        }
        write!(out, ".{frac_part:0width$}")
    }

    /// Drops everything past `decimals` places, towards zero.
    pub fn truncate_to_decimals(self, decimals: u8) -> Self {
        let exp = (Self::PRICE_SCALE - i32::from(decimals)).max(0) as u32;
        let unit = 10i64.pow(exp);
        if unit <= 1 {
            return self;
        }
        Self {
            units: (self.units / unit) * unit,
        }
    }

    /// Lossy: converts to f64, exact for any price that fits in 53 bits of units
    pub fn to_f64(self) -> f64 {
        self.units as f64 / Self::SCALE_F64
    }

    /// Lossy: create Price from f64 (rounds to nearest atomic unit).
    /// Non-finite input saturates the way `as` casts do.
    pub fn from_f64_lossy(v: f64) -> Self {
        Self {
            units: (v * Self::SCALE_F64).round() as i64,
        }
    }

    /// Round this Price to the nearest multiple of `step`, halves away from zero.
    pub fn round_to_step(self, step: PriceStep) -> Self {
        let unit = step.units;
        if unit <= 1 {
            return self;
        }
        let half = unit / 2;
        let rounded = if self.units >= 0 {
            (self.units.saturating_add(half)).div_euclid(unit) * unit
        } else {
            -((-self.units).saturating_add(half)).div_euclid(unit) * unit
        };
        Self { units: rounded }
    }

    /// Create Price from raw atomic units (no rounding)
    pub fn from_units(units: i64) -> Self {
        Self { units }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PriceStep {
    /// step size in atomic units (10^-PRICE_SCALE)
    pub units: i64,
}

impl PriceStep {
    pub fn to_f64(self) -> f64 {
        Price::from_units(self.units).to_f64()
    }

    /// Returns `None` for steps that are not positive or vanish below the atomic unit.
    pub fn from_f64(step: f64) -> Option<Self> {
        if !step.is_finite() || step <= 0.0 {
            return None;
        }
        let units = Price::from_f64_lossy(step).units;
        (units > 0).then_some(Self { units })
    }

    /// One unit in the given decimal place, e.g. 4 => 0.0001
    pub fn from_decimals(decimals: u8) -> Self {
        let exp = (Price::PRICE_SCALE - i32::from(decimals)).max(0) as u32;
        Self {
            units: 10i64.pow(exp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_nearest_pip() {
        let pip = PriceStep::from_f64(0.0001).unwrap();
        let snapped = Price::from_f64_lossy(1.05556).round_to_step(pip);

        assert_eq!(snapped, Price::from_f64_lossy(1.0556));

        let below = Price::from_f64_lossy(1.05554).round_to_step(pip);
        assert_eq!(below, Price::from_f64_lossy(1.0555));
    }

    #[test]
    fn truncates_instead_of_rounding() {
        let price = Price::from_f64_lossy(1.05567);
        assert_eq!(price.format_truncated(4), "1.0556");
        assert_eq!(price.format_truncated(5), "1.05567");
    }

    #[test]
    fn strips_trailing_zeros() {
        assert_eq!(Price::from_f64_lossy(1.0550).format_truncated(4), "1.055");
        assert_eq!(Price::from_f64_lossy(150.0).format_truncated(2), "150");
        assert_eq!(Price::from_f64_lossy(-0.25).format_truncated(3), "-0.25");
    }

    #[test]
    fn float_noise_does_not_leak_into_labels() {
        // 1.0556 is not representable in binary; the atomic rounding keeps it exact
        let noisy = 1.0555 + 0.0001;
        assert_eq!(Price::from_f64_lossy(noisy).format_truncated(4), "1.0556");
    }

    #[test]
    fn rejects_degenerate_steps() {
        assert!(PriceStep::from_f64(0.0).is_none());
        assert!(PriceStep::from_f64(-0.01).is_none());
        assert!(PriceStep::from_f64(f64::NAN).is_none());
        assert!(PriceStep::from_f64(1e-12).is_none());
        assert_eq!(PriceStep::from_decimals(2).units, 1_000_000);
    }
}
