/// Repeating-group decoder for market-depth snapshots
///
/// Handles messages of the shape
/// `55=SYM|268=N|269=T|270=P|271=Q|269=T|270=P|271=Q|...` where the
/// group tags tie parallel arrays together by occurrence order. The
/// decoder extracts every field into a fixed-size scratch array in one
/// pass, then walks the 269/270/271 occurrence lists in lockstep.
///
/// Output is flyweight ticks borrowing the message buffer; the borrow
/// checker holds callers to the buffer-outlives-batch rule.

use crate::numeric::{scan_fixed, scan_i32};
use crate::pool::FlyweightTickPool;
use crate::protocol::{
    is_delimiter, Side, PRICE_SCALE, TAG_MD_ENTRY_PX, TAG_MD_ENTRY_SIZE, TAG_MD_ENTRY_TYPE,
    TAG_NO_MD_ENTRIES, TAG_ORDER_QTY, TAG_PRICE, TAG_SIDE, TAG_SYMBOL,
};
use crate::tick::{FlyweightTick, Tick};

/// Fields kept per message.
const MAX_FIELDS: usize = 128;
/// Occurrences tracked per group tag.
const MAX_ENTRIES: usize = 32;

/// One tag=value pair viewed into the message buffer.
#[derive(Debug, Clone, Copy)]
struct Field<'a> {
    tag: i32,
    value: &'a [u8],
}

impl<'a> Default for Field<'a> {
    fn default() -> Self {
        Field { tag: 0, value: &[] }
    }
}

pub struct RepeatingGroupDecoder;

impl RepeatingGroupDecoder {
    /// Decode one snapshot message, appending valid ticks to `out`.
    /// Returns the number of ticks emitted. Invalid entries are
    /// dropped per-entry, never per-message.
    pub fn decode<'a>(message: &'a [u8], out: &mut Vec<FlyweightTick<'a>>) -> usize {
        let mut fields = [Field::default(); MAX_FIELDS];
        let field_count = extract_fields(message, &mut fields);
        let fields = &fields[..field_count];

        let symbol = find_first(fields, TAG_SYMBOL).map_or(&[][..], |f| f.value);

        let declared = find_first(fields, TAG_NO_MD_ENTRIES)
            .map_or(0, |f| scan_i32(f.value));

        let mut type_idx = [0usize; MAX_ENTRIES];
        let type_count = find_all(fields, TAG_MD_ENTRY_TYPE, &mut type_idx);

        if declared <= 0 && type_count == 0 {
            // Not a repeating-group message; decode the ordinary tag
            // set as a single tick.
            return decode_single(fields, symbol, out);
        }

        let mut px_idx = [0usize; MAX_ENTRIES];
        let mut size_idx = [0usize; MAX_ENTRIES];
        let px_count = find_all(fields, TAG_MD_ENTRY_PX, &mut px_idx);
        let size_count = find_all(fields, TAG_MD_ENTRY_SIZE, &mut size_idx);

        let entries = type_count.min(px_count).min(size_count);
        let mut emitted = 0;
        for i in 0..entries {
            let tick = FlyweightTick {
                symbol,
                side: Side::from_entry_type(scan_i32(fields[type_idx[i]].value)),
                price: scan_fixed(fields[px_idx[i]].value, PRICE_SCALE),
                qty: scan_i32(fields[size_idx[i]].value),
                timestamp: Tick::now_nanos(),
            };
            if tick.is_valid() {
                out.push(tick);
                emitted += 1;
            }
        }
        emitted
    }

    /// Decode every newline-separated message in a buffer.
    pub fn decode_buffer<'a>(buffer: &'a [u8], out: &mut Vec<FlyweightTick<'a>>) -> usize {
        let mut emitted = 0;
        for message in buffer.split(|&b| b == b'\n') {
            if !message.is_empty() {
                emitted += Self::decode(message, out);
            }
        }
        emitted
    }

    /// Decode into a pre-sized pool instead of a vector. Returns
    /// `(emitted, dropped)` where `dropped` counts entries lost to
    /// pool exhaustion; the caller decides between dropping and a
    /// bulk reset.
    pub fn decode_into_pool<'a>(
        message: &'a [u8],
        pool: &mut FlyweightTickPool<'a>,
    ) -> (usize, usize) {
        let mut scratch = Vec::with_capacity(MAX_ENTRIES);
        Self::decode(message, &mut scratch);

        let mut emitted = 0;
        let mut dropped = 0;
        for tick in scratch {
            match pool.acquire() {
                Some(slot) => {
                    *slot = tick;
                    emitted += 1;
                }
                None => dropped += 1,
            }
        }
        (emitted, dropped)
    }
}

/// Split a message into tag=value fields using the full delimiter set.
/// Fields beyond the scratch capacity are ignored.
fn extract_fields<'a>(message: &'a [u8], fields: &mut [Field<'a>; MAX_FIELDS]) -> usize {
    let mut count = 0;
    let mut start = 0;

    for pos in 0..=message.len() {
        let at_end = pos == message.len();
        if !at_end && !is_delimiter(message[pos]) {
            continue;
        }
        if count >= MAX_FIELDS {
            break;
        }
        let raw = &message[start..pos];
        start = pos + 1;
        if raw.is_empty() {
            continue;
        }
        if let Some(eq) = raw.iter().position(|&b| b == b'=') {
            if eq > 0 {
                let tag = scan_i32(&raw[..eq]);
                if tag > 0 {
                    fields[count] = Field {
                        tag,
                        value: &raw[eq + 1..],
                    };
                    count += 1;
                }
            }
        }
    }
    count
}

fn find_first<'a, 'b>(fields: &'b [Field<'a>], tag: i32) -> Option<&'b Field<'a>> {
    fields.iter().find(|f| f.tag == tag)
}

/// Collect occurrence indices of `tag` in order. Returns how many were
/// found, bounded by the output slice.
fn find_all(fields: &[Field<'_>], tag: i32, out: &mut [usize]) -> usize {
    let mut count = 0;
    for (i, field) in fields.iter().enumerate() {
        if field.tag == tag {
            if count >= out.len() {
                break;
            }
            out[count] = i;
            count += 1;
        }
    }
    count
}

/// Fallback for messages without group tags: the ordinary 44/38/54
/// tag set, accepting the group equivalents as secondaries.
fn decode_single<'a>(
    fields: &[Field<'a>],
    symbol: &'a [u8],
    out: &mut Vec<FlyweightTick<'a>>,
) -> usize {
    let price = find_first(fields, TAG_PRICE)
        .or_else(|| find_first(fields, TAG_MD_ENTRY_PX))
        .map_or(0, |f| scan_fixed(f.value, PRICE_SCALE));

    let qty = find_first(fields, TAG_ORDER_QTY)
        .or_else(|| find_first(fields, TAG_MD_ENTRY_SIZE))
        .map_or(0, |f| scan_i32(f.value));

    let side = if let Some(f) = find_first(fields, TAG_SIDE) {
        Side::from_fix(scan_i32(f.value))
    } else if let Some(f) = find_first(fields, TAG_MD_ENTRY_TYPE) {
        Side::from_entry_type(scan_i32(f.value))
    } else {
        Side::Unset
    };

    let tick = FlyweightTick {
        symbol,
        price,
        qty,
        side,
        timestamp: Tick::now_nanos(),
    };
    if tick.is_valid() {
        out.push(tick);
        1
    } else {
        0
    }
}
