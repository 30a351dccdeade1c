/// Ephemeral start/current price pair of a measurement drag. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaMeasurement {
    pub start_price: f64,
    pub start_y: f32,
    pub current_price: f64,
    pub active: bool,
}

impl DeltaMeasurement {
    pub fn begin(price: f64, y: f32) -> Self {
        Self {
            start_price: price,
            start_y: y,
            current_price: price,
            active: true,
        }
    }

    pub fn update(&mut self, price: f64) {
        self.current_price = price;
    }

    pub fn delta(&self) -> f64 {
        self.current_price - self.start_price
    }

    /// Signed change relative to the start price, in percent.
    pub fn percent_change(&self) -> Option<f64> {
        (self.start_price != 0.0).then(|| self.delta() / self.start_price * 100.0)
    }

    pub fn pips(&self, pip_size: f64) -> Option<f64> {
        (pip_size > 0.0).then(|| self.delta() / pip_size)
    }
}
