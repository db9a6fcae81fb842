use clap::{Parser, ValueEnum};
use codespan_reporting::{
    diagnostic::{Diagnostic, Label as SpanLabel},
    files::SimpleFile,
    term::{
        emit,
        termcolor::{ColorChoice, StandardStream},
    },
};
use log::{error, info, warn};
use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::PathBuf,
    process,
};

use svg2label::{
    label_regions, label_regions_strict, labels_to_json, overlay_document, path,
    regions_from_document, regions_from_json, splice_labels, Counts, LabelConfig, LabelError,
    Region,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The map with a group of text labels added, or a bare overlay for JSON input
    Svg,
    /// Label anchors as a JSON array
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "svg2label", author, version, about)]
struct Opt {
    /// An SVG map or a JSON array of regions, else reads from stdin
    file: Option<PathBuf>,
    /// Output file path (overwrites old files), else writes to stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// JSON object mapping region ids or names to counts
    #[arg(long)]
    counts: Option<PathBuf>,
    /// JSON settings file, flags below take precedence over it
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Output format, defaults to the kind of input
    #[arg(long, value_enum)]
    format: Option<Format>,
    /// Decimal places kept for label coordinates
    #[arg(long)]
    precision: Option<usize>,
    /// CSS class given to each label
    #[arg(long)]
    class: Option<String>,
    /// Only show region names
    #[arg(long)]
    no_counts: bool,
    /// Reject path data that does not follow the SVG path grammar
    #[arg(long)]
    strict: bool,
    /// Report malformed path data and exit without labelling
    #[arg(long)]
    check: bool,
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("svg2label=info"))
        .init();

    let opt = Opt::parse();

    let input = match &opt.file {
        Some(filename) => fs::read_to_string(filename)?,
        None => {
            info!("Reading from standard input");
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    let mut config = match &opt.settings {
        Some(settings) => serde_json::from_reader(File::open(settings)?)?,
        None => LabelConfig::default(),
    };
    if let Some(precision) = opt.precision {
        config.precision = precision;
    }
    if let Some(class) = &opt.class {
        config.class = class.clone();
    }
    if opt.no_counts {
        config.show_counts = false;
    }

    let counts: Counts = match &opt.counts {
        Some(counts) => serde_json::from_reader(File::open(counts)?)?,
        None => Counts::new(),
    };

    let is_svg = input.trim_start().starts_with('<');
    let regions = match read_regions(&input, is_svg) {
        Ok(regions) => regions,
        Err(err) => fail(err),
    };

    if opt.check {
        let findings = report_discarded(&regions)?;
        if findings > 0 {
            error!("Found {findings} malformed token(s)");
            process::exit(1);
        }
        info!("All {} regions have well-formed path data", regions.len());
        return Ok(());
    }

    let labels = if opt.strict {
        label_regions_strict(&regions, &counts, &config).unwrap_or_else(|err| fail(err))
    } else {
        label_regions(&regions, &counts, &config)
    };
    info!("Placed {} labels", labels.len());

    let output = match opt
        .format
        .unwrap_or(if is_svg { Format::Svg } else { Format::Json })
    {
        Format::Svg if is_svg => {
            splice_labels(&input, &labels, &config).unwrap_or_else(|err| fail(err))
        }
        Format::Svg => overlay_document(&labels, &config),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(&labels_to_json(&labels, &config))?;
            json.push('\n');
            json
        }
    };

    if let Some(out_path) = opt.out {
        File::create(out_path)?.write_all(output.as_bytes())
    } else {
        io::stdout().write_all(output.as_bytes())
    }
}

fn read_regions(input: &str, is_svg: bool) -> Result<Vec<Region>, LabelError> {
    if is_svg {
        let document = roxmltree::Document::parse(input)?;
        regions_from_document(&document)
    } else {
        regions_from_json(input)
    }
}

/// Emits a warning diagnostic for every discarded token, returning how many there were
fn report_discarded(regions: &[Region]) -> io::Result<usize> {
    let mut writer = StandardStream::stderr(ColorChoice::Auto);
    let config = codespan_reporting::term::Config::default();

    let mut findings = 0;
    for region in regions {
        let discarded = path::tokenize(&region.d).discarded;
        if discarded.is_empty() {
            continue;
        }
        warn!(
            "Region {} has {} malformed token(s)",
            region.display_name(),
            discarded.len()
        );
        let file = SimpleFile::new(region.display_name(), region.d.as_str());
        for token in &discarded {
            let diagnostic = Diagnostic::warning()
                .with_message(format!("discarded `{}` from path data", token.text))
                .with_labels(vec![
                    SpanLabel::primary((), token.span.clone()).with_message("not a number"),
                ]);
            emit(&mut writer, &config, &file, &diagnostic).map_err(io::Error::other)?;
        }
        findings += discarded.len();
    }
    Ok(findings)
}

fn fail(err: LabelError) -> ! {
    error!("{err}");
    process::exit(1)
}
