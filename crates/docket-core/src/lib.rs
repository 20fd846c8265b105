pub mod clock;
pub mod config;
pub mod error;
pub mod message;
pub mod metrics;
pub mod stats;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::QueueConfig;
pub use error::{QueueError, Result, StorageError, StorageResult};
pub use message::Message;
pub use stats::QueueStats;
pub use storage::{
    FindOrder, MemoryStore, MessageFilter, MessageMutation, NewMessage, StoreAdapter,
};
pub use store::{ClaimOptions, MessageStore};
