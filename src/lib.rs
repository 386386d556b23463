use anyhow::Context;
use clap::Parser;
use glob::glob;
use log::debug;
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub mod io_helpers;
pub mod json;

use io_helpers::buf_reader::get_bufreader;
use json::records::stats::Stats;
use json::records::{convert_with_sink, RecordSink};

/// Flatten JSON documents into flat key-value line records for CSV-style
/// export. One record is appended per leaf value, keyed by the hyphen-joined
/// path of field names and 1-based array indices down to that leaf.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// JSON file to flatten (supports .gz); reads stdin when omitted
    #[arg(conflicts_with = "glob")]
    pub file_path: Option<PathBuf>,

    /// Flatten every file matching this glob pattern instead
    #[arg(short, long)]
    pub glob: Option<String>,

    /// File the flat records get appended to
    #[arg(short, long)]
    pub output: PathBuf,

    /// Component label copied verbatim into every record
    #[arg(long, default_value = "")]
    pub component: String,

    /// Property label copied verbatim into every record
    #[arg(long, default_value = "")]
    pub property: String,

    /// Initial path prefix seeded into every record key
    #[arg(long, default_value = "")]
    pub prefix: String,
}

fn parse_json_file(file_path: &Path) -> anyhow::Result<Value> {
    let reader = get_bufreader(file_path)
        .with_context(|| format!("could not open '{}'", file_path.display()))?;
    let json = serde_json::from_reader(reader)
        .with_context(|| format!("'{}' is not valid JSON", file_path.display()))?;
    Ok(json)
}

fn parse_json_stdin() -> anyhow::Result<Value> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("could not read stdin")?;
    let json = serde_json::from_str(&buffer).context("stdin is not valid JSON")?;
    Ok(json)
}

pub fn run(args: Cli) -> anyhow::Result<()> {
    let sink = RecordSink::new(&args.output);
    let mut totals = Stats::new();

    if let Some(ref file_path) = args.file_path {
        let json = parse_json_file(file_path)?;
        totals = convert_with_sink(&args.component, &args.property, &args.prefix, &json, &sink);
    } else if let Some(ref pattern) = args.glob {
        for entry in glob(pattern).context("invalid glob pattern")? {
            let path = entry?;
            debug!("flattening '{}'", path.display());
            let json = parse_json_file(&path)?;
            let stats =
                convert_with_sink(&args.component, &args.property, &args.prefix, &json, &sink);
            totals = totals + stats;
        }
    } else {
        let json = parse_json_stdin()?;
        totals = convert_with_sink(&args.component, &args.property, &args.prefix, &json, &sink);
    }

    totals.print().context("failed to print run summary")?;
    sink.errors.eprint();
    Ok(())
}
