/// Garbage recovery: resynchronising on the `8=FIX` anchor
///
/// When the stream carries bytes that cannot begin a FIX message, the
/// parser realigns by scanning for the literal five-byte message
/// anchor `8=FIX`. The scan is a small FSM with one good edge per
/// state; a mismatched byte drops back to `Scan`, except that a
/// mismatched `'8'` re-enters `Saw8` so an anchor starting inside a
/// failed match is never lost (prefix restart).

/// Counters for corruption handling, owned by the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Corrupt chunk starts observed.
    pub error_count: u64,
    /// Successful realignments on an anchor.
    pub recovery_count: u64,
    /// Garbage bytes stepped over.
    pub bytes_skipped: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scan,
    Saw8,
    SawEq,
    SawF,
    SawI,
}

/// Result of scanning one chunk for the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Anchor found; offset of its leading `'8'` within the chunk.
    Anchor(usize),
    /// Chunk ended inside a candidate anchor starting at this offset;
    /// the bytes before it are garbage, the rest needs more input.
    Partial(usize),
    /// The whole chunk is garbage.
    Garbage,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GarbageScanner;

impl GarbageScanner {
    /// Scan a chunk for the `8=FIX` anchor.
    pub fn scan(input: &[u8]) -> ScanOutcome {
        let mut state = ScanState::Scan;
        let mut match_start = 0usize;

        for (pos, &byte) in input.iter().enumerate() {
            state = match (state, byte) {
                (ScanState::Scan, b'8') => {
                    match_start = pos;
                    ScanState::Saw8
                }
                (ScanState::Scan, _) => ScanState::Scan,
                (ScanState::Saw8, b'=') => ScanState::SawEq,
                (ScanState::SawEq, b'F') => ScanState::SawF,
                (ScanState::SawF, b'I') => ScanState::SawI,
                (ScanState::SawI, b'X') => return ScanOutcome::Anchor(match_start),
                // Mismatch: an '8' restarts the match at this byte.
                (_, b'8') => {
                    match_start = pos;
                    ScanState::Saw8
                }
                (_, _) => ScanState::Scan,
            };
        }

        if state == ScanState::Scan {
            ScanOutcome::Garbage
        } else {
            ScanOutcome::Partial(match_start)
        }
    }
}
