/// Market data tick: a single trade or quote event
///
/// Two ownership variants exist. `Tick` owns its symbol in an inline
/// fixed buffer and may outlive the transport bytes it was parsed
/// from; the FSM parser always emits this form. `FlyweightTick`
/// borrows its symbol from the source buffer and is produced only by
/// the repeating-group batch decoder, where the borrow checker proves
/// the buffer outlives the batch.

use crate::protocol::Side;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum symbol length held inline.
pub const MAX_SYMBOL_LEN: usize = 64;

/// Owning tick. Symbol bytes live in the inline storage, so the value
/// is freely movable and `Send`.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    symbol: [u8; MAX_SYMBOL_LEN],
    symbol_len: u8,
    /// Price in fixed-point, scaled by 10^4.
    pub price: i64,
    pub qty: i32,
    pub side: Side,
    /// Nanoseconds since the Unix epoch, stamped at emission.
    pub timestamp: u64,
}

impl Default for Tick {
    fn default() -> Self {
        Tick {
            symbol: [0; MAX_SYMBOL_LEN],
            symbol_len: 0,
            price: 0,
            qty: 0,
            side: Side::Unset,
            timestamp: 0,
        }
    }
}

impl Tick {
    pub fn new(symbol: &[u8], price: i64, qty: i32, side: Side, timestamp: u64) -> Self {
        let mut tick = Tick {
            price,
            qty,
            side,
            timestamp,
            ..Tick::default()
        };
        tick.set_symbol(symbol);
        tick
    }

    /// Copy the symbol into inline storage, truncating at 64 bytes.
    pub fn set_symbol(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(MAX_SYMBOL_LEN);
        self.symbol[..len].copy_from_slice(&bytes[..len]);
        self.symbol_len = len as u8;
    }

    pub fn symbol_bytes(&self) -> &[u8] {
        &self.symbol[..self.symbol_len as usize]
    }

    /// Symbol as text. FIX symbols are ASCII; anything else reads as
    /// empty (and therefore invalid).
    pub fn symbol(&self) -> &str {
        std::str::from_utf8(self.symbol_bytes()).unwrap_or("")
    }

    /// A tick is valid iff it names a symbol, has a positive price and
    /// quantity, and sits on the bid or ask side.
    pub fn is_valid(&self) -> bool {
        self.symbol_len > 0
            && self.price > 0
            && self.qty > 0
            && (self.side == Side::Bid || self.side == Side::Ask)
    }

    /// Current wall-clock time in nanoseconds since the Unix epoch.
    pub fn now_nanos() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

/// Borrowed-view tick. The symbol points into the buffer the message
/// was decoded from; the lifetime parameter pins it there.
#[derive(Debug, Clone, Copy)]
pub struct FlyweightTick<'a> {
    pub symbol: &'a [u8],
    pub price: i64,
    pub qty: i32,
    pub side: Side,
    pub timestamp: u64,
}

impl<'a> Default for FlyweightTick<'a> {
    fn default() -> Self {
        FlyweightTick {
            symbol: &[],
            price: 0,
            qty: 0,
            side: Side::Unset,
            timestamp: 0,
        }
    }
}

impl<'a> FlyweightTick<'a> {
    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty()
            && self.price > 0
            && self.qty > 0
            && (self.side == Side::Bid || self.side == Side::Ask)
    }

    /// Detach from the source buffer by copying the symbol inline.
    pub fn to_owned_tick(&self) -> Tick {
        Tick::new(self.symbol, self.price, self.qty, self.side, self.timestamp)
    }
}
