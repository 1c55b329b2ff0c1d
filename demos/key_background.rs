//! Remove the near-black background of a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example key_background -- input.jpg output.png [threshold]
//! ```

use std::env;
use std::process;

use alpha_key::{AlphaKeyFilter, ThresholdConfig};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output.png> [threshold]", args[0]);
        process::exit(1);
    }

    let input = &args[1];
    let output = &args[2];
    let config = match args.get(3).map(|t| t.parse::<i32>()) {
        None => ThresholdConfig::default(),
        Some(Ok(t)) => ThresholdConfig::new(t).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            process::exit(1);
        }),
        Some(Err(e)) => {
            eprintln!("Error: threshold is not a number: {e}");
            process::exit(1);
        }
    };

    let filter = AlphaKeyFilter::new(config);
    let result = filter.process_file(input.as_ref(), output.as_ref());

    if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
