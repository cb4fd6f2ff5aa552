//! ChanLab CLI — structural analysis of candle files and symbol universes.
//!
//! Commands:
//! - `analyze`: run the analyzer over one CSV/Parquet file (or a synthetic
//!   series) and print strokes, centres and signals
//! - `scan`: analyze every symbol of a universe file from a data directory
//!   and print one summary line per symbol

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chanlab_core::analyzer::candles_from_frame;
use chanlab_core::data::{
    candles_to_frame, read_table, write_table, CandleProvider, FileProvider, SyntheticProvider,
    Universe,
};
use chanlab_core::domain::Signal;
use chanlab_core::fingerprint::dataset_hash;
use chanlab_core::scan::{ScanReport, Scanner};
use chanlab_core::{Analysis, Analyzer, AnalyzerConfig, BarType, Mode, StrokeRule};

#[derive(Parser)]
#[command(
    name = "chanlab",
    about = "ChanLab CLI — Chan structural analysis of OHLCV candles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one candle table.
    Analyze {
        /// CSV or Parquet file with timestamp, open, high, low, close, volume.
        #[arg(required_unless_present = "synthetic", conflicts_with = "synthetic")]
        file: Option<PathBuf>,

        /// Analyze a seeded random walk for this symbol instead of a file.
        #[arg(long, value_name = "SYMBOL")]
        synthetic: Option<String>,

        #[command(flatten)]
        settings: Settings,

        /// Write the full analysis as JSON.
        #[arg(long, value_name = "OUT")]
        json: Option<PathBuf>,

        /// Write the input table with derived columns (.csv or .parquet).
        #[arg(long, value_name = "OUT")]
        annotated: Option<PathBuf>,
    },
    /// Analyze every symbol of a universe file.
    Scan {
        /// TOML file listing symbols by sector.
        #[arg(long)]
        universe: PathBuf,

        /// Directory holding `{SYMBOL}.csv` or `{SYMBOL}.parquet`.
        #[arg(long, required_unless_present = "synthetic")]
        data_dir: Option<PathBuf>,

        /// Use seeded random walks instead of files.
        #[arg(long, default_value_t = false, conflicts_with = "data_dir")]
        synthetic: bool,

        /// Restrict the scan to one sector.
        #[arg(long)]
        sector: Option<String>,

        #[command(flatten)]
        settings: Settings,

        /// Analyze symbols one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write the scan report as JSON.
        #[arg(long, value_name = "OUT")]
        json: Option<PathBuf>,
    },
}

/// Analyzer settings: a TOML file, then per-flag overrides.
#[derive(clap::Args)]
struct Settings {
    /// Analyzer config TOML.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    bar_type: Option<BarTypeArg>,

    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Confirmation delay in bars (0, 1 or 2). Ignored in online mode.
    #[arg(long)]
    delay: Option<u8>,

    /// Reject strokes shorter than the bar type's minimum.
    #[arg(long, default_value_t = false)]
    min_bars: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum BarTypeArg {
    Daily,
    Weekly,
    Minute,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Confirmed,
    Online,
}

impl Settings {
    fn resolve(&self) -> Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalyzerConfig::default(),
        };
        if let Some(bar_type) = self.bar_type {
            config.bar_type = match bar_type {
                BarTypeArg::Daily => BarType::Daily,
                BarTypeArg::Weekly => BarType::Weekly,
                BarTypeArg::Minute => BarType::Minute,
            };
        }
        if let Some(mode) = self.mode {
            config.mode = match mode {
                ModeArg::Confirmed => Mode::Confirmed,
                ModeArg::Online => Mode::Online,
            };
        }
        if let Some(delay) = self.delay {
            config.confirmation_delay = delay;
        }
        if self.min_bars {
            config.stroke_rule = StrokeRule::MinBars;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            synthetic,
            settings,
            json,
            annotated,
        } => run_analyze(
            file.as_deref(),
            synthetic.as_deref(),
            &settings,
            json.as_deref(),
            annotated.as_deref(),
        ),
        Commands::Scan {
            universe,
            data_dir,
            synthetic,
            sector,
            settings,
            sequential,
            json,
        } => run_scan(
            &universe,
            data_dir,
            synthetic,
            sector.as_deref(),
            &settings,
            sequential,
            json.as_deref(),
        ),
    }
}

fn run_analyze(
    file: Option<&Path>,
    synthetic: Option<&str>,
    settings: &Settings,
    json: Option<&Path>,
    annotated: Option<&Path>,
) -> Result<()> {
    let config = settings.resolve()?;
    let analyzer = Analyzer::new(config)?;

    let (source, table) = match (file, synthetic) {
        (Some(path), _) => (
            path.display().to_string(),
            read_table(path).with_context(|| format!("reading {}", path.display()))?,
        ),
        (None, Some(symbol)) => {
            let candles = SyntheticProvider::default().candles(symbol);
            (format!("synthetic:{symbol}"), candles_to_frame(&candles)?)
        }
        (None, None) => bail!("one of FILE or --synthetic is required"),
    };

    let candles =
        candles_from_frame(&table).with_context(|| format!("reading candles from {source}"))?;
    let analysis = analyzer
        .analyze(&candles)
        .with_context(|| format!("analyzing {source}"))?;
    info!(
        source = %source,
        bars = candles.len(),
        dataset = %dataset_hash(&candles)?,
        "analyzed"
    );

    print_analysis(&source, &analysis)?;

    if let Some(path) = json {
        let writer = BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        );
        serde_json::to_writer_pretty(writer, &analysis)?;
        println!("Analysis written to: {}", path.display());
    }
    if let Some(path) = annotated {
        let table = analysis.annotate(&table)?;
        write_table(&table, path).with_context(|| format!("writing {}", path.display()))?;
        println!("Annotated table written to: {}", path.display());
    }

    Ok(())
}

fn run_scan(
    universe_path: &Path,
    data_dir: Option<PathBuf>,
    synthetic: bool,
    sector: Option<&str>,
    settings: &Settings,
    sequential: bool,
    json: Option<&Path>,
) -> Result<()> {
    let universe = Universe::from_file(universe_path)
        .with_context(|| format!("loading universe {}", universe_path.display()))?;
    let symbols = universe.select(sector)?;
    if symbols.is_empty() {
        bail!("universe {} lists no symbols", universe_path.display());
    }

    let provider: Box<dyn CandleProvider> = match (data_dir, synthetic) {
        (_, true) => Box::new(SyntheticProvider::default()),
        (Some(dir), false) => Box::new(FileProvider::new(dir)),
        (None, false) => bail!("one of --data-dir or --synthetic is required"),
    };

    let scanner = Scanner::new(settings.resolve()?)?.with_parallelism(!sequential);
    let report = scanner.scan(provider.as_ref(), &symbols);
    print_report(&report);

    if let Some(path) = json {
        let writer = BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        );
        serde_json::to_writer_pretty(writer, &report)?;
        println!("Report written to: {}", path.display());
    }

    Ok(())
}

fn print_analysis(source: &str, analysis: &Analysis) -> Result<()> {
    let config = &analysis.config;
    println!();
    println!("=== Chan Analysis ===");
    println!("Source:         {source}");
    println!(
        "Config:         {:?} / {:?} / delay {} / {:?} (K = {})",
        config.bar_type,
        config.mode,
        config.effective_delay(),
        config.stroke_rule,
        config.min_stroke_bars()
    );
    println!(
        "Lookahead:      {} structural, {} signal",
        analysis.lookahead.structural, analysis.lookahead.signal
    );
    println!("Bars:           {}", analysis.canonical.len());
    println!(
        "Canonical:      {} valid",
        analysis.canonical.iter().filter(|b| b.valid).count()
    );
    println!("Fractals:       {}", analysis.fractals.len());
    println!("Strokes:        {}", analysis.strokes.len());
    println!("Segments:       {}", analysis.segments.len());
    println!("Centres:        {}", analysis.centres.len());
    println!("Fingerprint:    {}", analysis.fingerprint()?);

    if !analysis.centres.is_empty() {
        println!();
        println!("--- Centres ---");
        println!(
            "{:<4} {:<20} {:<20} {:>10} {:>10} {:>7}",
            "#", "Start", "End", "Low", "High", "Closed"
        );
        println!("{}", "-".repeat(76));
        for (i, c) in analysis.centres.iter().enumerate() {
            println!(
                "{:<4} {:<20} {:<20} {:>10.2} {:>10.2} {:>7}",
                i, c.start, c.end, c.low, c.high, c.closed
            );
        }
    }

    print_signals("Buy signals", &analysis.buy_signals);
    print_signals("Sell signals", &analysis.sell_signals);

    if analysis.is_empty() {
        println!();
        println!("No structure found.");
    }
    println!();
    Ok(())
}

fn print_signals(title: &str, signals: &[Signal]) {
    if signals.is_empty() {
        return;
    }
    println!();
    println!("--- {title} ---");
    for s in signals {
        println!(
            "{:<20} bar {:>5} @ {:>10.2}  {}",
            s.timestamp, s.bar_index, s.price, s.description
        );
    }
}

fn print_report(report: &ScanReport) {
    println!();
    println!(
        "{:<8} {:>6} {:>6} {:>6} {:>6} {:>5} {:>5}  {:<20} {:<20}",
        "Symbol", "Bars", "Strk", "Segs", "Ctrs", "Buys", "Sells", "Latest buy", "Latest sell"
    );
    println!("{}", "-".repeat(96));
    let when = |s: &Option<Signal>| {
        s.as_ref()
            .map(|s| s.timestamp.to_string())
            .unwrap_or_else(|| "-".into())
    };
    for s in &report.summaries {
        println!(
            "{:<8} {:>6} {:>6} {:>6} {:>6} {:>5} {:>5}  {:<20} {:<20}",
            s.symbol,
            s.bars,
            s.strokes,
            s.segments,
            s.centres,
            s.buy_signals,
            s.sell_signals,
            when(&s.latest_buy),
            when(&s.latest_sell)
        );
    }
    for f in &report.failures {
        println!("WARNING: {} skipped: {}", f.symbol, f.error);
    }
    println!();
}
