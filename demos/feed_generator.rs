/// Synthetic FIX feed generator
///
/// Writes pipe-delimited FIX order messages to stdout or a file.
/// Useful for exercising the parser and pipeline against realistic
/// order flow.

use rand::Rng;
use std::env;
use std::fs::File;
use std::io::Write;

const SYMBOLS: [&str; 6] = ["AAPL", "MSFT", "GOOGL", "TSLA", "NVDA", "AMZN"];

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let output_path = if args.len() > 1 {
        args[1].clone()
    } else {
        "/tmp/fix_feed.txt".to_string()
    };

    let message_count: usize = if args.len() > 2 {
        args[2].parse().unwrap_or(10_000)
    } else {
        10_000
    };

    let mut output: Box<dyn Write> = if output_path == "stdout" {
        Box::new(std::io::stdout())
    } else {
        Box::new(File::create(&output_path)?)
    };

    let mut rng = rand::thread_rng();
    let mut checksum = 0u32;

    println!("Generating {} messages to {}", message_count, output_path);

    for i in 0..message_count {
        let symbol = SYMBOLS[rng.gen_range(0..SYMBOLS.len())];
        let whole = rng.gen_range(50..5000);
        let cents = rng.gen_range(0..10_000);
        let qty = rng.gen_range(1..2000);
        let side = rng.gen_range(1..=2);
        checksum = (checksum + 7) % 256;

        writeln!(
            output,
            "8=FIX.4.4|35=D|55={}|44={}.{:04}|38={}|54={}|10={:03}|",
            symbol, whole, cents, qty, side, checksum
        )?;

        if i % 1000 == 0 && i > 0 {
            println!("Generated {} messages", i);
        }
    }

    println!("Feed generation complete: {} messages", message_count);
    Ok(())
}
