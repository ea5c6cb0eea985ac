mod error;
mod fetcher;
mod future;
mod history;
mod poller;
mod record;
mod sample_log;

pub use error::FutureFetchError;
pub use fetcher::{FetcherSettings, PositionFetcher, PositionSource};
pub use future::FutureLimits;
pub use history::HistoryStore;
pub use poller::{Poller, PollerSettings};
pub use record::{Fix, Record};
pub use sample_log::SampleLog;
