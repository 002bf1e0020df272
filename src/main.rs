use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use log::LevelFilter;

use pathmerge::input::read_text;
use pathmerge::{build_alignment, RenderConfig, Renderer, Stream};

/// pathmerge - merge a profile decoding path with its aligner domain report
///
/// Reads the decoder path (`fragment,state,codon,amino` steps separated by `;`)
/// and the aligner's domain report, puts both on one position axis and prints
/// the requested streams as fixed-width text.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Decode path file ("-" for stdin)
    #[clap(short = 'd', long = "decode", value_name = "FILE")]
    decode: String,

    /// Aligner domain report file (no hits when omitted)
    #[clap(short = 'r', long = "report", value_name = "FILE")]
    report: Option<String>,

    /// Stream to print as NAME or NAME:LEVEL, repeatable (default: all)
    #[clap(short = 's', long = "stream", value_name = "NAME[:LEVEL]")]
    streams: Vec<Stream>,

    /// Wrap output into blocks of this many columns
    #[clap(short = 'w', long = "width")]
    width: Option<usize>,

    /// Fill for columns nothing is drawn on
    #[clap(long = "padding", default_value = " ")]
    padding: char,

    /// Fill for steps lacking the side a stream reads
    #[clap(long = "blank", default_value = " ")]
    blank: char,

    /// Only show this merged segment (0-based)
    #[clap(long = "segment", value_name = "INDEX")]
    segment: Option<usize>,

    /// Keep the full width and blank everything outside --segment
    #[clap(long = "mask", requires = "segment")]
    mask: bool,

    /// Omit the stream name in front of each row
    #[clap(long = "no-labels")]
    no_labels: bool,

    /// Print the per-domain alignment table instead of streams
    #[clap(long = "table", conflicts_with_all = ["streams", "segment"])]
    table: bool,

    /// Sequence name shown in the table
    #[clap(long = "seq-name", default_value = "query")]
    seq_name: String,

    /// Profile name shown in the table
    #[clap(long = "profile-name", default_value = "profile")]
    profile_name: String,

    /// Output file (stdout if not specified)
    #[clap(short = 'o', long = "output")]
    output: Option<String>,

    /// More log output (-v info, -vv debug)
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors that stop the run
    #[clap(long = "quiet", conflicts_with = "verbose")]
    quiet: bool,

    /// Number of threads for parallel rendering
    #[clap(short = 't', long = "threads", default_value = "4")]
    threads: usize,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Off,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    // RUST_LOG wins over the flags when set
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if args.width == Some(0) {
        bail!("--width must be at least 1");
    }
    if args.decode == "-" && args.report.as_deref() == Some("-") {
        bail!("--decode and --report cannot both read stdin");
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    let decode = read_text(&args.decode)?;
    let report = match &args.report {
        Some(path) => read_text(path)?,
        None => String::new(),
    };

    let path = build_alignment(&decode, &report)
        .context("Failed to merge decode path with aligner report")?;

    let renderer = Renderer::new(
        RenderConfig::default()
            .with_padding(args.padding)
            .with_blank(args.blank)
            .with_width(args.width)
            .with_labels(!args.no_labels),
    );

    let mut output: Box<dyn Write> = match &args.output {
        Some(file) => Box::new(BufWriter::new(
            File::create(file).with_context(|| format!("Failed to create {file}"))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    if args.table {
        let table = renderer.domain_table(&path, &args.seq_name, &args.profile_name)?;
        output.write_all(table.as_bytes())?;
        output.flush()?;
        return Ok(());
    }

    let streams = if args.streams.is_empty() {
        Stream::all()
    } else {
        args.streams.clone()
    };

    let segment = match args.segment {
        Some(index) => {
            let segments = path.segments();
            let segment = segments.get(index).ok_or_else(|| {
                anyhow!(
                    "Segment {index} out of range, path has {} segments",
                    segments.len()
                )
            })?;
            log::info!(
                "showing segment {index} {} ({})",
                segment.interval,
                if segment.matched { "matched" } else { "unmatched" }
            );
            Some(segment.interval)
        }
        None => None,
    };
    let (range, mask) = if args.mask {
        (None, segment)
    } else {
        (segment, None)
    };

    for line in renderer.layout(&path, &streams, range, mask)? {
        writeln!(output, "{line}")?;
    }
    output.flush()?;

    Ok(())
}
