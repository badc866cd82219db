/// Streaming handler: receive buffer + FSM parser for one connection
///
/// Couples a `ReceiveBuffer` with a `MessageFsm` so that raw transport
/// reads of any size and alignment turn into ticks. Data is absorbed
/// chunk-wise: inputs larger than the buffer capacity are written,
/// parsed, and consumed in turns, so nothing is dropped as long as the
/// parser keeps consuming.

use crate::buffer::ReceiveBuffer;
use crate::parser::MessageFsm;
use crate::tick::Tick;
use tracing::warn;

/// Per-connection stream counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub bytes_received: u64,
    pub messages_parsed: u64,
    pub parse_calls: u64,
    pub compactions: u64,
}

pub struct StreamHandler {
    parser: MessageFsm,
    buffer: ReceiveBuffer,
    stats: StreamStats,
}

impl StreamHandler {
    pub fn new(buffer_size: usize) -> Self {
        StreamHandler {
            parser: MessageFsm::new(),
            buffer: ReceiveBuffer::new(buffer_size),
            stats: StreamStats::default(),
        }
    }

    pub fn with_garbage_recovery(buffer_size: usize, enabled: bool) -> Self {
        let mut handler = Self::new(buffer_size);
        handler.parser.set_garbage_recovery(enabled);
        handler
    }

    /// Absorb one transport read, appending completed ticks to
    /// `ticks`. Returns the number of ticks emitted by this call.
    pub fn feed(&mut self, mut data: &[u8], ticks: &mut Vec<Tick>) -> usize {
        let before = ticks.len();

        while !data.is_empty() {
            let written = self.buffer.write(data);
            self.stats.bytes_received += written as u64;
            data = &data[written..];

            let parsed = self.process_buffer(ticks);

            if written == 0 && parsed == 0 {
                // Parser is wedged on a full buffer it will not
                // consume; dropping is the only move left.
                warn!(dropped = data.len(), "receive buffer full, dropping bytes");
                break;
            }
        }

        ticks.len() - before
    }

    /// Parse whatever the buffer currently holds.
    pub fn process_buffer(&mut self, ticks: &mut Vec<Tick>) -> usize {
        let before = ticks.len();
        let compactions_before = self.buffer.compactions();

        loop {
            let readable_len = self.buffer.readable_len();
            if readable_len == 0 {
                break;
            }
            let consumed = {
                let readable = self.buffer.readable();
                self.parser.parse(readable, ticks)
            };
            self.buffer.consume(consumed);
            self.stats.parse_calls += 1;
            if consumed < readable_len {
                // The parser left a candidate anchor waiting for more
                // input; it stays buffered until the next feed.
                break;
            }
        }

        self.stats.compactions += self.buffer.compactions() - compactions_before;
        let parsed = (ticks.len() - before) as u64;
        self.stats.messages_parsed += parsed;
        parsed as usize
    }

    pub fn is_parsing(&self) -> bool {
        self.parser.is_parsing()
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffer.readable_len()
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn parser(&self) -> &MessageFsm {
        &self.parser
    }

    /// Fresh state for a reconnect: parser, buffer, and counters.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.buffer.reset();
        self.stats = StreamStats::default();
    }
}
