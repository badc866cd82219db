/// Resumable byte-FSM FIX parser
///
/// The parser consumes input one byte at a time and keeps all state
/// between calls, so a message fragmented across any number of
/// transport reads parses exactly as if it arrived whole. All scratch
/// storage is inline in the instance: parsing performs no heap
/// allocation and retains no pointer into the input after `parse`
/// returns.
///
/// A message ends when tag 10 (checksum) is committed, or on a
/// newline once all required fields have been seen. The newline
/// terminator is non-standard FIX but matched by the feeds this
/// handler targets; strict deployments should terminate on tag 10
/// only.

use crate::numeric::{scan_fixed, scan_i32};
use crate::protocol::{
    is_delimiter, is_digit, Side, PRICE_SCALE, TAG_CHECKSUM, TAG_ORDER_QTY, TAG_PRICE, TAG_SIDE,
    TAG_SYMBOL,
};
use crate::recovery::{GarbageScanner, RecoveryStats, ScanOutcome};
use crate::tick::{Tick, MAX_SYMBOL_LEN};

/// Tag digits kept before truncation.
const TAG_SCRATCH_LEN: usize = 15;
/// Value bytes kept before truncation.
const VALUE_SCRATCH_LEN: usize = 255;

/// Parser states. A WAIT_VALUE state exists conceptually between
/// `ReadTag` and `ReadValue` but is inlined: the byte after `=` is
/// already value material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Between fields, looking for the first digit of a tag.
    WaitTag,
    /// Accumulating tag digits.
    ReadTag,
    /// Accumulating value bytes.
    ReadValue,
    /// A message just finished; the next digit starts the next one.
    Complete,
}

/// Collects the required fields of the in-progress tick.
#[derive(Debug, Clone)]
struct TickBuilder {
    symbol: [u8; MAX_SYMBOL_LEN],
    symbol_len: usize,
    price: i64,
    qty: i32,
    side: Side,
    has_symbol: bool,
    has_price: bool,
    has_qty: bool,
    has_side: bool,
}

impl TickBuilder {
    fn new() -> Self {
        TickBuilder {
            symbol: [0; MAX_SYMBOL_LEN],
            symbol_len: 0,
            price: 0,
            qty: 0,
            side: Side::Unset,
            has_symbol: false,
            has_price: false,
            has_qty: false,
            has_side: false,
        }
    }

    fn reset(&mut self) {
        self.symbol_len = 0;
        self.price = 0;
        self.qty = 0;
        self.side = Side::Unset;
        self.has_symbol = false;
        self.has_price = false;
        self.has_qty = false;
        self.has_side = false;
    }

    /// All four required fields observed with emittable values.
    /// Malformed field values (zero price, unknown side) fail here,
    /// so the message they belong to is dropped rather than surfaced.
    fn is_valid(&self) -> bool {
        self.has_symbol
            && self.has_price
            && self.has_qty
            && self.has_side
            && self.symbol_len > 0
            && self.price > 0
            && self.qty > 0
            && (self.side == Side::Bid || self.side == Side::Ask)
    }
}

pub struct MessageFsm {
    state: State,
    current_tag: i32,
    tag_scratch: [u8; TAG_SCRATCH_LEN],
    tag_len: usize,
    value_scratch: [u8; VALUE_SCRATCH_LEN],
    value_len: usize,
    builder: TickBuilder,
    /// True from the first committed field of a message until its
    /// emission; keeps the corruption gate from firing on a fragment
    /// boundary that falls between two fields.
    in_message: bool,
    /// None: corruption gate unarmed (plain FSM). Some(enabled):
    /// corrupt chunk starts are detected, and skipped to the next
    /// `8=FIX` anchor when enabled.
    recovery: Option<bool>,
    recovery_stats: RecoveryStats,
}

impl Default for MessageFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFsm {
    pub fn new() -> Self {
        MessageFsm {
            state: State::WaitTag,
            current_tag: 0,
            tag_scratch: [0; TAG_SCRATCH_LEN],
            tag_len: 0,
            value_scratch: [0; VALUE_SCRATCH_LEN],
            value_len: 0,
            builder: TickBuilder::new(),
            in_message: false,
            recovery: None,
            recovery_stats: RecoveryStats::default(),
        }
    }

    /// Arm the corruption gate. With `true`, garbage at a chunk start
    /// is skipped to the next `8=FIX` anchor; with `false` the corrupt
    /// chunk is consumed in `WaitTag` without emitting.
    pub fn set_garbage_recovery(&mut self, enabled: bool) {
        self.recovery = Some(enabled);
    }

    pub fn garbage_recovery_enabled(&self) -> bool {
        self.recovery == Some(true)
    }

    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery_stats
    }

    /// True while the parser is inside a message: mid-tag, mid-value,
    /// or between fields of a message that has not emitted yet.
    pub fn is_parsing(&self) -> bool {
        self.state != State::WaitTag || self.tag_len > 0 || self.in_message
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Return the parser to a fresh state. Recovery statistics are
    /// kept; they describe the stream, not the machine.
    pub fn reset(&mut self) {
        self.state = State::WaitTag;
        self.current_tag = 0;
        self.tag_len = 0;
        self.value_len = 0;
        self.in_message = false;
        self.builder.reset();
    }

    /// Feed a chunk of the stream, appending completed ticks to
    /// `ticks`. Returns the number of bytes consumed - the full chunk,
    /// except when a trailing candidate anchor must wait for more
    /// input during recovery. Call repeatedly with consecutive chunks;
    /// any fragmentation of the stream yields the same ticks.
    pub fn parse(&mut self, input: &[u8], ticks: &mut Vec<Tick>) -> usize {
        let mut data = input;

        if let Some(enabled) = self.recovery {
            if !self.is_parsing() && data.first().is_some_and(|&b| b != b'8') {
                self.recovery_stats.error_count += 1;
                if !enabled {
                    return input.len();
                }
                match GarbageScanner::scan(data) {
                    ScanOutcome::Anchor(pos) => {
                        self.recovery_stats.bytes_skipped += pos as u64;
                        self.recovery_stats.recovery_count += 1;
                        self.reset();
                        data = &data[pos..];
                    }
                    ScanOutcome::Partial(pos) => {
                        // Consume only the certain garbage; the
                        // candidate anchor is retried when the caller
                        // presents more bytes.
                        self.recovery_stats.bytes_skipped += pos as u64;
                        return pos;
                    }
                    ScanOutcome::Garbage => {
                        self.recovery_stats.bytes_skipped += data.len() as u64;
                        return input.len();
                    }
                }
            }
        }

        for &byte in data {
            if self.process_byte(byte) {
                self.finish_message(ticks);
            }
        }

        input.len()
    }

    /// One byte, one transition. Returns true when a message boundary
    /// was reached.
    fn process_byte(&mut self, byte: u8) -> bool {
        match self.state {
            State::WaitTag => {
                if is_digit(byte) {
                    self.tag_scratch[0] = byte;
                    self.tag_len = 1;
                    self.state = State::ReadTag;
                }
                // Delimiters and stray bytes between fields are noise.
                false
            }

            State::ReadTag => {
                if is_digit(byte) {
                    if self.tag_len < TAG_SCRATCH_LEN {
                        self.tag_scratch[self.tag_len] = byte;
                        self.tag_len += 1;
                    }
                    false
                } else if byte == b'=' {
                    self.current_tag = scan_i32(&self.tag_scratch[..self.tag_len]);
                    self.tag_len = 0;
                    self.value_len = 0;
                    self.state = State::ReadValue;
                    false
                } else {
                    // Malformed tag: drop the field, not the message.
                    self.current_tag = 0;
                    self.tag_len = 0;
                    self.state = State::WaitTag;
                    false
                }
            }

            State::ReadValue => {
                if is_delimiter(byte) {
                    let end_of_message = self.commit_field();
                    self.current_tag = 0;
                    self.value_len = 0;
                    if end_of_message {
                        self.state = State::Complete;
                        return true;
                    }
                    self.state = State::WaitTag;
                    if byte == b'\n' && self.builder.is_valid() {
                        self.state = State::Complete;
                        return true;
                    }
                    false
                } else {
                    if self.value_len < VALUE_SCRATCH_LEN {
                        self.value_scratch[self.value_len] = byte;
                        self.value_len += 1;
                    }
                    // Overflow truncates silently; the next delimiter
                    // still resynchronises.
                    false
                }
            }

            State::Complete => {
                self.state = State::WaitTag;
                self.current_tag = 0;
                if is_digit(byte) {
                    self.tag_scratch[0] = byte;
                    self.tag_len = 1;
                    self.state = State::ReadTag;
                }
                false
            }
        }
    }

    /// Dispatch the committed field into the builder. Returns true for
    /// tag 10, the end-of-message marker.
    fn commit_field(&mut self) -> bool {
        let value = &self.value_scratch[..self.value_len];
        match self.current_tag {
            TAG_ORDER_QTY => {
                self.builder.qty = scan_i32(value);
                self.builder.has_qty = true;
            }
            TAG_PRICE => {
                self.builder.price = scan_fixed(value, PRICE_SCALE);
                self.builder.has_price = true;
            }
            TAG_SIDE => {
                self.builder.side = Side::from_fix(scan_i32(value));
                self.builder.has_side = true;
            }
            TAG_SYMBOL => {
                if self.value_len <= MAX_SYMBOL_LEN {
                    self.builder.symbol[..self.value_len].copy_from_slice(value);
                    self.builder.symbol_len = self.value_len;
                    self.builder.has_symbol = true;
                }
            }
            TAG_CHECKSUM => {
                // Checksum value is not validated; the tag is only the
                // end-of-message signal.
                self.in_message = true;
                return true;
            }
            // 8, 9, 35, 49, 52, 56 and anything else: ignored.
            _ => {}
        }
        self.in_message = true;
        false
    }

    /// Emit the tick if the builder holds a valid one, then clear the
    /// builder for the next message.
    fn finish_message(&mut self, ticks: &mut Vec<Tick>) {
        if self.builder.is_valid() {
            ticks.push(Tick::new(
                &self.builder.symbol[..self.builder.symbol_len],
                self.builder.price,
                self.builder.qty,
                self.builder.side,
                Tick::now_nanos(),
            ));
        }
        self.builder.reset();
        self.in_message = false;
    }
}
