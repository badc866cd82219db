/// FIX Feed - Streaming Market Data Feed Handler
///
/// High-performance feed handler for FIX tag=value market data arriving
/// over a fragmented transport. Features include:
/// - Resumable byte-FSM parsing (messages split across reads parse
///   identically to whole ones)
/// - Fragmentation-absorbing receive buffer with in-place compaction
/// - Garbage recovery by resynchronising on the `8=FIX` anchor
/// - Repeating-group decoding for market-depth snapshots
/// - Object-pooled, allocation-free steady-state hot path
/// - Two-thread transport/parser pipeline with bounded-queue
///   backpressure and atomic statistics

pub mod book;
pub mod buffer;
pub mod config;
pub mod groups;
pub mod numeric;
pub mod parser;
pub mod pipeline;
pub mod pool;
pub mod protocol;
pub mod queue;
pub mod recovery;
pub mod stats;
pub mod stream;
pub mod tick;

pub use book::{OrderBook, PriceLevel};
pub use buffer::ReceiveBuffer;
pub use config::{Backpressure, ConfigError, PipelineConfig};
pub use groups::RepeatingGroupDecoder;
pub use numeric::{scan_fixed, scan_i32, scan_u32};
pub use parser::{MessageFsm, State};
pub use pipeline::{FeedPipeline, MessageBuffer};
pub use pool::{FlyweightTickPool, TickPool};
pub use protocol::{Side, PRICE_SCALE};
pub use queue::{BoundedQueue, PushError, TryPushError};
pub use recovery::{GarbageScanner, RecoveryStats, ScanOutcome};
pub use stats::{Snapshot, Statistics};
pub use stream::{StreamHandler, StreamStats};
pub use tick::{FlyweightTick, Tick, MAX_SYMBOL_LEN};
