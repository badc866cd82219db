/// Pipeline statistics
///
/// Counters shared between the transport and parser threads. All
/// updates are atomic with relaxed ordering: the numbers are monitoring
/// signals, not synchronization points.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Statistics {
    pub bytes_received: AtomicU64,
    pub messages_parsed: AtomicU64,
    pub parse_errors: AtomicU64,
    pub queue_overflows: AtomicU64,
    pub network_reads: AtomicU64,
    pub parser_cycles: AtomicU64,
    // Garbage-recovery counters, published by the parser thread.
    pub error_count: AtomicU64,
    pub recovery_count: AtomicU64,
    pub bytes_skipped: AtomicU64,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub bytes_received: u64,
    pub messages_parsed: u64,
    pub parse_errors: u64,
    pub queue_overflows: u64,
    pub network_reads: u64,
    pub parser_cycles: u64,
    pub error_count: u64,
    pub recovery_count: u64,
    pub bytes_skipped: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            messages_parsed: self.messages_parsed.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            queue_overflows: self.queue_overflows.load(Ordering::Relaxed),
            network_reads: self.network_reads.load(Ordering::Relaxed),
            parser_cycles: self.parser_cycles.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            recovery_count: self.recovery_count.load(Ordering::Relaxed),
            bytes_skipped: self.bytes_skipped.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.bytes_received.store(0, Ordering::Relaxed);
        self.messages_parsed.store(0, Ordering::Relaxed);
        self.parse_errors.store(0, Ordering::Relaxed);
        self.queue_overflows.store(0, Ordering::Relaxed);
        self.network_reads.store(0, Ordering::Relaxed);
        self.parser_cycles.store(0, Ordering::Relaxed);
        self.error_count.store(0, Ordering::Relaxed);
        self.recovery_count.store(0, Ordering::Relaxed);
        self.bytes_skipped.store(0, Ordering::Relaxed);
    }
}
