use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use probe_latency::{
    analysis::AnalysisReport,
    capture::PcapSource,
    config::{Config, OutputFormat},
    traffic::CaptureAnalyzer,
};
use std::{env, fs, process};

#[derive(Parser)]
#[command(name = "probe-latency")]
#[command(about = "Latency analysis of traffic-generator probe captures")]
struct Cli {
    #[arg(short, long, help = "Input pcap file")]
    input: Option<String>,

    #[arg(short, long, help = "Write the report to this file instead of stdout")]
    output: Option<String>,

    #[arg(short, long, value_enum, help = "Report format")]
    format: Option<OutputFormat>,

    #[arg(short, long, help = "Configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Enable debug logging")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.debug || env::var_os("DEBUG").is_some() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> probe_latency::Result<()> {
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    if cli.input.is_some() {
        config.capture.input = cli.input;
    }
    if cli.output.is_some() {
        config.output.path = cli.output;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    let Some(input) = config.capture.input.as_deref() else {
        bail!("No input capture given; pass --input or set capture.input in the config file");
    };

    info!("Analyzing {}", input);
    let source = PcapSource::open(input, config.capture.nanosecond_precision)?;
    let analysis = CaptureAnalyzer::with_config(&config.analysis)
        .analyze(source)
        .with_context(|| format!("Could not parse {}", input))?;

    let report = AnalysisReport::new(input, analysis, config.analysis.period_delimiter);
    let rendered = match config.output.format {
        OutputFormat::Text => report.to_text(),
        OutputFormat::Json => report.to_json()?,
    };

    match config.output.path.as_deref() {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("Could not write report {}", path))?;
            info!("Report written to {}", path);
        },
        None => print!("{}", rendered),
    }

    Ok(())
}
