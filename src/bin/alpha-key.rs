use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::LevelFilter;

use alpha_key::source::{self, ImageSource};
use alpha_key::{
    default_output_path, ensure_png_output, AlphaKeyFilter, ProcessResult, ThresholdConfig,
    DEFAULT_BLACK_THRESHOLD,
};

#[derive(Parser)]
#[command(
    name = "alpha-key",
    about = "Make near-black image backgrounds transparent",
    version,
    after_help = "Simple usage: alpha-key <image>  (writes <name>_keyed.png next to it)\n\n\
                  A pixel becomes transparent when its red, green and blue values are all\n\
                  below the threshold. Output is always PNG."
)]
struct Cli {
    /// Input image file, directory, or data: URI
    input: String,

    /// Output file or directory (default: {name}_keyed.png)
    #[arg(short, long)]
    output: Option<String>,

    /// Per-channel black threshold (0-255, exclusive)
    #[arg(short, long, default_value_t = i32::from(DEFAULT_BLACK_THRESHOLD), allow_negative_numbers = true)]
    threshold: i32,

    /// Print the result as a PNG data URI on stdout
    #[arg(long, conflicts_with = "output")]
    data_uri: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = match ThresholdConfig::new(cli.threshold) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    let filter = AlphaKeyFilter::new(config);

    let input = ImageSource::from_arg(&cli.input);
    let input_path = match input {
        ImageSource::Path(path) => path,
        _ => {
            run_data_uri(&filter, &cli, &input);
            return;
        }
    };

    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if cli.data_uri {
        if input_path.is_dir() {
            eprintln!("Error: --data-uri works on a single image, not a directory");
            process::exit(1);
        }
        run_data_uri(&filter, &cli, &input);
        return;
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: alpha-key <input_dir> -o <output_dir>");
            process::exit(1);
        };
        filter.process_directory(input_path, &output_dir)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![filter.process_file(input_path, &output_path)]
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &cli);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

/// Key a single image and emit it as a data URI, or as a PNG file when `-o` is given.
fn run_data_uri(filter: &AlphaKeyFilter, cli: &Cli, input: &ImageSource<'_>) {
    if let Some(o) = &cli.output {
        if let Err(e) = ensure_png_output(Path::new(o)) {
            eprintln!("[FAIL] {o}: {e}");
            process::exit(1);
        }
    }

    let png = match filter.apply_source(input) {
        Ok(png) => png,
        Err(e) => {
            eprintln!("[FAIL] {}: {e}", describe(input));
            process::exit(1);
        }
    };

    if let Some(o) = &cli.output {
        if let Err(e) = std::fs::write(o, &png) {
            eprintln!("[FAIL] {o}: Failed to save: {e}");
            process::exit(1);
        }
        if !cli.quiet {
            eprintln!("[OK] {o}");
        }
        return;
    }

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", source::encode_data_uri(&png)) {
        eprintln!("Error: Failed to write output: {e}");
        process::exit(1);
    }
}

fn describe(input: &ImageSource<'_>) -> String {
    match input {
        ImageSource::Path(p) => file_name(p),
        ImageSource::Bytes(_) => "<bytes>".to_string(),
        ImageSource::DataUri(_) => "<data URI>".to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}

fn print_result(result: &ProcessResult, cli: &Cli) {
    if cli.quiet && result.success {
        return;
    }

    let filename = file_name(&result.path);

    if result.success {
        if !cli.quiet {
            eprintln!(
                "[OK] {filename} ({:.0}% transparent)",
                result.keyed_fraction() * 100.0
            );
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if cli.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
        if let Some(out) = &result.output {
            eprintln!("  -> wrote {}", out.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_flag_conflicts_with_output() {
        let result = Cli::try_parse_from(["alpha-key", "in.png", "--data-uri", "-o", "out.png"]);
        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(clap::error::ErrorKind::ArgumentConflict)
        );
    }

    #[test]
    fn threshold_defaults_and_accepts_negatives_for_validation() {
        let cli = Cli::try_parse_from(["alpha-key", "in.png"]).unwrap();
        assert_eq!(cli.threshold, 15);

        let cli = Cli::try_parse_from(["alpha-key", "in.png", "-t", "-3"]).unwrap();
        assert!(ThresholdConfig::new(cli.threshold).is_err());
    }
}
