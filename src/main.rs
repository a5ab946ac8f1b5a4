//! csv-explorer CLI - load, clean, summarize and export a game catalog

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use csv_explorer::{
    CleaningRules, Delimiter, Detector, ExplorerError, ExportFormat, Filter, SampleSize, Session,
    Table, Upload, columns, encoding_for_label,
};
use tracing_subscriber::EnvFilter;

/// File loaded when no input is given.
const DEFAULT_FILE: &str = "base_productos.csv";

/// Explore a video game catalog CSV file.
///
/// Detects encoding and delimiter, removes duplicate rows, coerces the
/// numeric columns and normalizes the text columns, then prints a summary
/// and optionally exports the cleaned data.
#[derive(Parser, Debug)]
#[command(name = "csv-explorer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV file (default: base_productos.csv)
    file: Option<PathBuf>,

    /// Treat the input as an upload: detect on the whole buffer, require .csv
    #[arg(long)]
    upload: bool,

    /// Force the primary encoding (WHATWG label, e.g. utf-8, cp1252)
    #[arg(short = 'e', long)]
    encoding: Option<String>,

    /// Encoding used when the primary one fails to decode
    #[arg(long, default_value = "latin1")]
    fallback_encoding: String,

    /// Force the delimiter (',' or ';')
    #[arg(short = 'd', long)]
    delimiter: Option<char>,

    /// Number of bytes sampled for detection of files on disk
    #[arg(short = 'b', long, default_value_t = csv_explorer::DEFAULT_SAMPLE_BYTES)]
    sample_bytes: usize,

    /// Only keep rows of this genre
    #[arg(long)]
    genre: Option<String>,

    /// Only keep rows of this platform
    #[arg(long)]
    platform: Option<String>,

    /// Lowest year to keep
    #[arg(long)]
    year_min: Option<f64>,

    /// Highest year to keep
    #[arg(long)]
    year_max: Option<f64>,

    /// Print descriptive statistics for every column
    #[arg(long)]
    describe: bool,

    /// Print the first N rows of the (filtered) table
    #[arg(long, value_name = "N")]
    head: Option<usize>,

    /// Export the cleaned table in this format
    #[arg(short = 'x', long, value_enum)]
    export: Option<ExportFormat>,

    /// Export destination (default: videojuegos_limpio.<ext>)
    #[arg(short = 'o', long, requires = "export")]
    output: Option<PathBuf>,

    /// Export the filtered rows instead of the whole table
    #[arg(long, requires = "export")]
    filtered: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), ExplorerError> {
    let detector = build_detector(args)?;
    let rules = CleaningRules::default();
    let session = open_session(args, &detector, &rules)?;

    print_summary(&session);

    let filter = build_filter(args);
    let view = session.filter(&filter);
    if filter != Filter::default() || args.head.is_some() {
        print_filter(&filter, &view);
    }
    if let Some(n) = args.head {
        print_rows(&view.head(n));
    }
    if args.describe {
        print_describe(&session);
    }

    if let Some(format) = args.export {
        let bytes = if args.filtered {
            csv_explorer::export(&view, format)?
        } else {
            session.export(format)?
        };
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format.file_name()));
        fs::write(&output, &bytes)?;
        println!(
            "Exported {} bytes to {} ({})",
            bytes.len(),
            output.display(),
            format.mime()
        );
    }

    Ok(())
}

fn build_detector(args: &Args) -> Result<Detector, ExplorerError> {
    let mut detector = Detector::new();
    detector.sample_size(SampleSize::Bytes(args.sample_bytes));

    if let Some(ref label) = args.encoding {
        detector.encoding(lookup_encoding(label)?);
    }
    detector.fallback_encoding(lookup_encoding(&args.fallback_encoding)?);

    if let Some(c) = args.delimiter {
        let delimiter = Delimiter::from_char(c).ok_or_else(|| {
            ExplorerError::InvalidConfig(format!("delimiter must be ',' or ';', got {c:?}"))
        })?;
        detector.delimiter(delimiter);
    }

    Ok(detector)
}

fn lookup_encoding(label: &str) -> Result<&'static csv_explorer::Encoding, ExplorerError> {
    encoding_for_label(label)
        .ok_or_else(|| ExplorerError::InvalidConfig(format!("unknown encoding {label:?}")))
}

fn open_session(
    args: &Args,
    detector: &Detector,
    rules: &CleaningRules,
) -> Result<Session, ExplorerError> {
    let path = args
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE));

    if args.upload {
        let upload = Upload::new(upload_name(&path), fs::read(&path)?);
        Session::open_upload(&upload, detector, rules)
    } else {
        Session::open_path(&path, detector, rules)
    }
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// Text columns are normalized to uppercase, so filter values are too.
fn build_filter(args: &Args) -> Filter {
    let mut filter = Filter::new();
    if let Some(ref genre) = args.genre {
        filter.genre(genre.trim().to_uppercase());
    }
    if let Some(ref platform) = args.platform {
        filter.platform(platform.trim().to_uppercase());
    }
    if args.year_min.is_some() || args.year_max.is_some() {
        filter.years(
            args.year_min.unwrap_or(f64::NEG_INFINITY),
            args.year_max.unwrap_or(f64::INFINITY),
        );
    }
    filter
}

fn print_summary(session: &Session) {
    let detection = session.detection();
    let summary = session.summary();

    println!("Source: {}", session.source());
    println!("  Encoding: {}", detection.encoding_name());
    if detection.used_fallback() {
        println!("  Detected encoding: {} (failed)", detection.primary.name());
    }
    println!("  Delimiter: {:?}", detection.delimiter.as_byte() as char);
    println!("  Rows: {}", summary.rows);
    println!("  Columns: {}", summary.columns);
    println!("  Missing values: {}", summary.missing);
    if let Some(year) = summary.latest_year {
        println!("  Latest year: {year}");
    }
    if let Some(price) = summary.average_price {
        println!("  Average price: ${price:.2}");
    }

    if !session.malformed().is_empty() {
        println!("  Malformed rows: {}", session.malformed().len());
    }

    println!("  Columns detail:");
    for column in &summary.column_details {
        println!(
            "    {}: {} ({} missing)",
            column.name, column.column_type, column.missing
        );
    }

    if let Some(platforms) = session.value_counts(columns::PLATFORM, Some(10)) {
        println!("  Top platforms:");
        for (platform, count) in platforms {
            println!("    {platform}: {count}");
        }
    }

    println!();
}

fn print_filter(filter: &Filter, view: &Table) {
    println!("Filter:");
    println!("  Genre: {}", filter.genre.as_deref().unwrap_or("all"));
    println!("  Platform: {}", filter.platform.as_deref().unwrap_or("all"));
    match filter.years {
        Some((lo, hi)) => println!("  Years: {lo}..={hi}"),
        None => println!("  Years: all"),
    }
    println!("  Matching rows: {}", view.num_rows());
    println!();
}

fn print_rows(table: &Table) {
    println!("{}", table.headers().join(" | "));
    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("{}", cells.join(" | "));
    }
    println!();
}

fn print_describe(session: &Session) {
    println!("Statistics:");
    for stats in session.describe() {
        println!("  {}:", stats.name);
        println!("    count: {}", stats.count);
        println!("    unique: {}", stats.unique);
        if let Some((ref value, freq)) = stats.top {
            println!("    top: {value} ({freq})");
        }
        if let (Some(mean), Some(min), Some(max)) = (stats.mean, stats.min, stats.max) {
            println!("    mean: {mean:.2}");
            println!("    min: {min}");
            println!("    max: {max}");
        }
    }
    println!();
}
