pub mod adapter;
pub mod snapshot;
pub mod unit;

pub use adapter::Event;
pub use snapshot::{MarketSnapshot, RawSnapshot, SnapshotError};
pub use unit::{PipPosition, Price, PriceStep};
