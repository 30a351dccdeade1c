//! Price/pixel mapping shared by the painter and the hit-tester.
//!
//! All math stays in `f64` and logical pixels. Device pixels only come into play in
//! [`CoordinateTransform::snap`], which is applied to stroke coordinates right before drawing.

use data::AdaptiveScale;
use data::meter::{compute_adaptive_scale, scale};
use exchange::MarketSnapshot;
use iced::Size;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    max: f64,
    range: f64,
    padding: f64,
    usable: f64,
    dpr: f64,
}

impl CoordinateTransform {
    pub fn new(scale: &AdaptiveScale, height: f32, padding: f32, dpr: f32) -> Self {
        let range = if scale.range.is_finite() && scale.range > 0.0 {
            scale.range
        } else {
            1.0
        };
        let height = f64::from(height.max(0.0));
        let padding = f64::from(padding.max(0.0)).min(height / 2.0);
        let usable = (height - 2.0 * padding).max(1.0);
        let dpr = if dpr.is_finite() && dpr > 0.0 {
            f64::from(dpr)
        } else {
            1.0
        };

        Self {
            max: scale.max,
            range,
            padding,
            usable,
            dpr,
        }
    }

    pub fn price_to_y(&self, price: f64) -> f32 {
        (self.padding + (self.max - price) / self.range * self.usable) as f32
    }

    /// Exact inverse of [`price_to_y`](Self::price_to_y), unbounded.
    pub fn y_to_price(&self, y: f32) -> f64 {
        self.max - (f64::from(y) - self.padding) / self.usable * self.range
    }

    /// Price under a pointer, clamped into the visible window.
    pub fn price_at(&self, y: f32) -> f64 {
        self.y_to_price(y).clamp(self.min(), self.max)
    }

    pub fn min(&self) -> f64 {
        self.max - self.range
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.dpr as f32
    }

    /// Moves a line coordinate onto the device-pixel grid so a `line_width` stroke stays crisp.
    /// Odd device widths are centered on half pixels, even widths on whole pixels.
    pub fn snap(&self, v: f32, line_width: f32) -> f32 {
        let device = f64::from(v) * self.dpr;
        let device_width = (f64::from(line_width) * self.dpr).round().max(1.0);

        let snapped = if device_width % 2.0 == 1.0 {
            device.floor() + 0.5
        } else {
            device.round()
        };
        (snapped / self.dpr) as f32
    }

    /// One logical pixel expressed in price units.
    pub fn price_per_pixel(&self) -> f64 {
        self.range / self.usable
    }
}

/// Scale and transform for a snapshot on a surface of `size`.
/// Painter and hit-tester both go through here so they never disagree.
pub fn project(
    snapshot: &MarketSnapshot,
    config: &scale::Config,
    size: Size,
    padding: f32,
    dpr: f32,
) -> (AdaptiveScale, CoordinateTransform) {
    let scale = compute_adaptive_scale(snapshot, config);
    let transform = CoordinateTransform::new(&scale, size.height, padding, dpr);
    (scale, transform)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(min: f64, max: f64) -> AdaptiveScale {
        AdaptiveScale {
            min,
            max,
            range: max - min,
            ..AdaptiveScale::default()
        }
    }

    #[test]
    fn edges_map_to_padding() {
        let t = CoordinateTransform::new(&scale(1.0450, 1.0650), 400.0, 20.0, 1.0);

        assert!((t.price_to_y(1.0650) - 20.0).abs() < 1e-4);
        assert!((t.price_to_y(1.0450) - 380.0).abs() < 1e-4);
        assert!((t.price_to_y(1.0550) - 200.0).abs() < 1e-4);
    }

    #[test]
    fn round_trip_within_a_device_pixel() {
        for dpr in [1.0, 1.25, 2.0] {
            let t = CoordinateTransform::new(&scale(148.20, 151.35), 613.0, 24.0, dpr);
            let one_pixel = t.price_per_pixel() / f64::from(dpr);

            for i in 0..=100 {
                let price = 148.20 + 3.15 * f64::from(i) / 100.0;
                let back = t.y_to_price(t.price_to_y(price));
                assert!((back - price).abs() <= one_pixel, "{price} -> {back}");
            }
        }
    }

    #[test]
    fn pointer_outside_window_clamps() {
        let t = CoordinateTransform::new(&scale(1.0, 2.0), 100.0, 10.0, 1.0);

        assert_eq!(t.price_at(-50.0), 2.0);
        assert_eq!(t.price_at(500.0), 1.0);
        assert!(t.y_to_price(-50.0) > 2.0);
    }

    #[test]
    fn snapping_lands_on_device_grid() {
        let t = CoordinateTransform::new(&scale(0.0, 1.0), 100.0, 0.0, 1.0);
        assert_eq!(t.snap(10.3, 1.0), 10.5);
        assert_eq!(t.snap(10.6, 2.0), 11.0);

        let hi = CoordinateTransform::new(&scale(0.0, 1.0), 100.0, 0.0, 2.0);
        // 1px logical is 2 device px: whole device pixels
        assert_eq!(hi.snap(10.3, 1.0), 10.5);
        assert_eq!(hi.snap(10.1, 1.0), 10.0);
        // 0.5px logical is 1 device px: half device pixels
        assert_eq!(hi.snap(10.1, 0.5), 10.25);
    }

    #[test]
    fn degenerate_geometry_stays_finite() {
        let t = CoordinateTransform::new(&scale(1.0, 1.0), 10.0, 40.0, f32::NAN);

        assert!(t.price_to_y(1.0).is_finite());
        assert!(t.y_to_price(5.0).is_finite());
        assert_eq!(t.device_pixel_ratio(), 1.0);
    }
}
