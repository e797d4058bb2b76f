mod asset;
mod market;
mod snapshot;

pub use asset::{Asset, AssetObservation};
pub use market::{AssetHistory, MarketMetrics, TopAsset};
pub use snapshot::{Snapshot, SnapshotPoint};
