/// Parser conformance tests: fragmentation, corruption, repeating groups

use fix_feed::{MessageFsm, RepeatingGroupDecoder, Side, State, Tick};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SCENARIO_1: &[u8] = b"8=FIX.4.4|35=D|55=AAPL|44=150.25|38=500|54=1|10=123|\n";

fn parse_whole(input: &[u8]) -> Vec<Tick> {
    let mut parser = MessageFsm::new();
    let mut ticks = Vec::new();
    let consumed = parser.parse(input, &mut ticks);
    assert_eq!(consumed, input.len());
    ticks
}

fn assert_scenario_1_tick(tick: &Tick) {
    assert_eq!(tick.symbol(), "AAPL");
    assert_eq!(tick.price, 1_502_500);
    assert_eq!(tick.qty, 500);
    assert_eq!(tick.side, Side::Bid);
    assert!(tick.is_valid());
}

#[test]
fn test_scenario_single_message() {
    let ticks = parse_whole(SCENARIO_1);
    assert_eq!(ticks.len(), 1);
    assert_scenario_1_tick(&ticks[0]);
}

#[test]
fn test_scenario_two_fragments() {
    let mut parser = MessageFsm::new();
    let mut ticks = Vec::new();

    parser.parse(b"8=FIX.4.4|35=D|55=GO", &mut ticks);
    assert!(ticks.is_empty());
    assert!(parser.is_parsing());

    parser.parse(b"OGL|44=2750.80|38=100|54=2|10=456|\n", &mut ticks);
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].symbol(), "GOOGL");
    assert_eq!(ticks[0].price, 27_508_000);
    assert_eq!(ticks[0].qty, 100);
    assert_eq!(ticks[0].side, Side::Ask);
}

#[test]
fn test_fragmentation_equivalence_byte_by_byte() {
    let expected = parse_whole(SCENARIO_1);

    let mut parser = MessageFsm::new();
    let mut ticks = Vec::new();
    for i in 0..SCENARIO_1.len() {
        parser.parse(&SCENARIO_1[i..i + 1], &mut ticks);
    }

    assert_eq!(ticks.len(), expected.len());
    assert_scenario_1_tick(&ticks[0]);
}

#[test]
fn test_fragmentation_equivalence_random_partitions() {
    // Any partition of the stream must yield the same ticks as one
    // call on the concatenation.
    let mut stream = Vec::new();
    let messages: [&[u8]; 3] = [
        b"8=FIX.4.4|35=D|55=MSFT|44=123.45|38=1000|54=1|10=001|\n",
        b"8=FIX.4.4|35=D|55=GOOGL|44=2750.80|38=100|54=2|10=002|\n",
        b"8=FIX.4.4|35=D|55=TSLA|44=245.67|38=750|54=1|10=003|\n",
    ];
    for msg in messages {
        stream.extend_from_slice(msg);
    }
    let expected = parse_whole(&stream);
    assert_eq!(expected.len(), 3);

    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..100 {
        let mut parser = MessageFsm::new();
        let mut ticks = Vec::new();
        let mut offset = 0;
        while offset < stream.len() {
            let chunk = rng.gen_range(1..=stream.len() - offset);
            parser.parse(&stream[offset..offset + chunk], &mut ticks);
            offset += chunk;
        }

        assert_eq!(ticks.len(), expected.len());
        for (got, want) in ticks.iter().zip(&expected) {
            assert_eq!(got.symbol(), want.symbol());
            assert_eq!(got.price, want.price);
            assert_eq!(got.qty, want.qty);
            assert_eq!(got.side, want.side);
        }
    }
}

#[test]
fn test_batch_equivalence() {
    let mut stream = Vec::new();
    const N: usize = 50;
    for i in 0..N {
        stream.extend_from_slice(
            format!("8=FIX.4.4|35=D|55=SYM|44=100.25|38={}|54=1|10=000|\n", i + 1).as_bytes(),
        );
    }

    let ticks = parse_whole(&stream);
    assert_eq!(ticks.len(), N);
    // Arrival order preserved.
    for (i, tick) in ticks.iter().enumerate() {
        assert_eq!(tick.qty, (i + 1) as i32);
    }
}

#[test]
fn test_invalid_messages_dropped() {
    let cases: [&[u8]; 5] = [
        // Missing symbol, price, qty, side in turn.
        b"8=FIX.4.4|35=D|44=150.25|38=500|54=1|10=123|\n",
        b"8=FIX.4.4|35=D|55=AAPL|38=500|54=1|10=123|\n",
        b"8=FIX.4.4|35=D|55=AAPL|44=150.25|54=1|10=123|\n",
        b"8=FIX.4.4|35=D|55=AAPL|44=150.25|38=500|10=123|\n",
        // Side outside {1, 2}.
        b"8=FIX.4.4|35=D|55=AAPL|44=150.25|38=500|54=3|10=123|\n",
    ];
    for case in cases {
        assert!(parse_whole(case).is_empty(), "expected drop: {:?}", case);
    }
}

#[test]
fn test_scenario_zero_qty_dropped() {
    let ticks = parse_whole(b"8=FIX.4.4|35=D|55=AAPL|44=150.25|38=0|54=1|10=123|\n");
    assert!(ticks.is_empty());
}

#[test]
fn test_truncation_tolerance() {
    // A 512-byte value overflows the scratch; the next delimiter must
    // resynchronise and the following message must parse.
    let mut stream = b"8=FIX.4.4|35=D|58=".to_vec();
    stream.extend(std::iter::repeat(b'Z').take(512));
    stream.extend_from_slice(b"|10=000|\n");
    stream.extend_from_slice(SCENARIO_1);

    let ticks = parse_whole(&stream);
    assert_eq!(ticks.len(), 1);
    assert_scenario_1_tick(&ticks[0]);
}

#[test]
fn test_oversize_tag_resynchronises() {
    let mut stream = b"8=FIX.4.4|123456789012345678901234=x|".to_vec();
    stream.extend_from_slice(SCENARIO_1);
    let ticks = parse_whole(&stream);
    assert_eq!(ticks.len(), 1);
}

#[test]
fn test_scenario_garbage_recovery_enabled() {
    let mut data = b"GARBAGE_".to_vec();
    data.extend_from_slice(SCENARIO_1);

    let mut parser = MessageFsm::new();
    parser.set_garbage_recovery(true);
    let mut ticks = Vec::new();
    parser.parse(&data, &mut ticks);

    assert_eq!(ticks.len(), 1);
    assert_scenario_1_tick(&ticks[0]);

    let stats = parser.recovery_stats();
    assert!(stats.bytes_skipped >= 8);
    assert!(stats.recovery_count >= 1);
}

#[test]
fn test_scenario_garbage_recovery_disabled() {
    let mut data = b"GARBAGE_".to_vec();
    data.extend_from_slice(SCENARIO_1);

    let mut parser = MessageFsm::new();
    parser.set_garbage_recovery(false);
    let mut ticks = Vec::new();
    parser.parse(&data, &mut ticks);

    assert!(ticks.is_empty());
    assert_eq!(parser.state(), State::WaitTag);
}

#[test]
fn test_garbage_between_messages() {
    let mut parser = MessageFsm::new();
    parser.set_garbage_recovery(true);
    let mut ticks = Vec::new();

    parser.parse(SCENARIO_1, &mut ticks);
    parser.parse(b"CORRUPT_DATA_BETWEEN_MESSAGES!!!", &mut ticks);
    parser.parse(
        b"8=FIX.4.4|35=D|55=GOOGL|44=2800.50|38=100|54=2|10=021|\n",
        &mut ticks,
    );

    assert_eq!(ticks.len(), 2);
    assert_eq!(ticks[0].symbol(), "AAPL");
    assert_eq!(ticks[1].symbol(), "GOOGL");
    assert!(parser.recovery_stats().bytes_skipped >= 32);
}

#[test]
fn test_scenario_repeating_groups() {
    let msg = b"8=FIX.4.4|35=W|55=MSFT|268=3|269=0|270=100.50|271=1000|269=0|270=100.25|271=500|269=1|270=100.75|271=750|";
    let mut out = Vec::new();
    let emitted = RepeatingGroupDecoder::decode(msg, &mut out);

    assert_eq!(emitted, 3);
    let expected = [
        (Side::Bid, 1_005_000, 1000),
        (Side::Bid, 1_002_500, 500),
        (Side::Ask, 1_007_500, 750),
    ];
    for (tick, (side, price, qty)) in out.iter().zip(expected) {
        assert_eq!(tick.symbol, b"MSFT");
        assert_eq!(tick.side, side);
        assert_eq!(tick.price, price);
        assert_eq!(tick.qty, qty);
    }
}

#[test]
fn test_repeating_groups_outlive_check() {
    // Flyweights borrow the message; owning copies survive it.
    let msg = b"55=MSFT|268=1|269=0|270=100.50|271=1000|".to_vec();
    let owned: Vec<Tick> = {
        let mut out = Vec::new();
        RepeatingGroupDecoder::decode(&msg, &mut out);
        out.iter().map(|fly| fly.to_owned_tick()).collect()
    };
    drop(msg);
    assert_eq!(owned[0].symbol(), "MSFT");
}

#[test]
fn test_crlf_delimited_messages() {
    let ticks = parse_whole(b"8=FIX.4.4|35=D|55=AAPL|44=150.25|38=500|54=1|10=123|\r\n");
    assert_eq!(ticks.len(), 1);
}
