//! Deterministic random-walk quotes for running the meter without a live feed.

use super::{Event, Source};
use crate::snapshot::RawSnapshot;
use crate::unit::{Price, PriceStep};

use iced_futures::{
    futures::{SinkExt, Stream},
    stream,
};
use std::time::Duration;

/// Per-tick move as a fraction of ADR, before the drift term
const STEP_ADR_FRACTION: f64 = 0.03;
/// Ticks between drift direction changes
const DRIFT_PERIOD: u32 = 240;

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub open: f64,
    pub adr: f64,
    pub pip_position: u8,
}

impl Instrument {
    /// Plausible session parameters for a few well-known symbols; anything else gets a
    /// generic four-decimal instrument.
    pub fn preset(symbol: &str) -> Self {
        let (open, adr, pip_position) = match symbol {
            "EURUSD" => (1.0550, 0.0070, 4),
            "GBPUSD" => (1.2710, 0.0095, 4),
            "AUDUSD" => (0.6620, 0.0060, 4),
            "USDJPY" => (151.20, 0.95, 2),
            "XAUUSD" => (2340.0, 28.0, 1),
            _ => (1.0, 0.0100, 4),
        };
        Self {
            symbol: symbol.to_string(),
            open,
            adr,
            pip_position,
        }
    }
}

/// One instrument's walk. Same seed, same path.
#[derive(Debug, Clone)]
pub struct Walk {
    instrument: Instrument,
    current: f64,
    high: f64,
    low: f64,
    rng: u64,
    ticks: u32,
    drift: f64,
}

impl Walk {
    pub fn new(instrument: Instrument, seed: u64) -> Self {
        let open = instrument.open;
        Self {
            instrument,
            current: open,
            high: open,
            low: open,
            // xorshift state must be non-zero
            rng: seed | 1,
            ticks: 0,
            drift: 0.0,
        }
    }

    pub fn with_symbol_seed(instrument: Instrument) -> Self {
        let seed = instrument
            .symbol
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
                (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
            });
        Self::new(instrument, seed)
    }

    fn next_unit(&mut self) -> f64 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng = x;
        // top 53 bits into [0, 1), then to [-1, 1)
        ((x >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
    }

    pub fn step(&mut self) -> RawSnapshot {
        if self.ticks % DRIFT_PERIOD == 0 {
            self.drift = self.next_unit() * 0.4;
        }
        self.ticks = self.ticks.wrapping_add(1);

        let adr = self.instrument.adr;
        let noise = self.next_unit();
        let moved = self.current + (noise + self.drift) * adr * STEP_ADR_FRACTION;

        // quotes carry one fractional pip
        let quote_step = PriceStep::from_decimals(self.instrument.pip_position.saturating_add(1));
        self.current = Price::from_f64_lossy(moved).round_to_step(quote_step).to_f64();
        self.high = self.high.max(self.current);
        self.low = self.low.min(self.current);

        let open = self.instrument.open;
        RawSnapshot {
            symbol: Some(self.instrument.symbol.clone()),
            current: Some(self.current),
            open: Some(open),
            high: Some(self.high),
            low: Some(self.low),
            adr_high: Some(open + adr / 2.0),
            adr_low: Some(open - adr / 2.0),
            pip_position: Some(self.instrument.pip_position),
            pip_size: Some(PriceStep::from_decimals(self.instrument.pip_position).to_f64()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedConfig {
    pub symbols: Vec<String>,
    pub interval: Duration,
}

pub fn connect(config: FeedConfig) -> impl Stream<Item = Event> {
    stream::channel(100, async move |mut output| {
        let mut walks: Vec<Walk> = config
            .symbols
            .iter()
            .map(|symbol| Walk::with_symbol_seed(Instrument::preset(symbol)))
            .collect();

        log::info!(
            "Simulated feed started for {} symbol(s)",
            config.symbols.len()
        );
        let _ = output.send(Event::Connected(Source::Simulated)).await;

        let mut interval = tokio::time::interval(config.interval);
        loop {
            interval.tick().await;

            for walk in &mut walks {
                let snapshot = walk.step();
                if output
                    .send(Event::SnapshotReceived(Box::new(snapshot)))
                    .await
                    .is_err()
                {
                    log::warn!("Simulated feed receiver dropped, stopping");
                    return;
                }
            }
        }
    })
}
