pub mod price;

pub use price::{Price, PriceStep};

/// Decimal places of one pip, e.g. 4 for EURUSD, 2 for USDJPY.
pub type PipPosition = u8;

/// Deepest pip position representable by `Price` atomic units.
pub const MAX_PIP_POSITION: PipPosition = Price::PRICE_SCALE as PipPosition;

/// Pip position implied by a pip size, e.g. 0.0001 => 4.
///
/// Returns `None` for sizes that are not positive or not close to a power of ten.
pub fn pip_position_from_size(pip_size: f64) -> Option<PipPosition> {
    if !pip_size.is_finite() || pip_size <= 0.0 {
        return None;
    }
    let power = -pip_size.log10();
    let rounded = power.round();
    if (power - rounded).abs() > 0.01 || rounded < 0.0 {
        return None;
    }
    let position = rounded as u32;
    (position <= u32::from(MAX_PIP_POSITION)).then_some(position as PipPosition)
}
