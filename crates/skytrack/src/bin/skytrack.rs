use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use skytrack::{
    frames, run_sequence, Detector, DirectorySink, RecordCollector, RunReport, TimeLog,
    TrackerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "skytrack", version, about = "Track a small moving target through an image sequence")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the tracker over a directory of frames.
    Track(TrackArgs),
    /// Write a default configuration file.
    InitConfig {
        /// Destination of the JSON config.
        #[arg(default_value = "skytrack.json")]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct TrackArgs {
    /// JSON configuration file.
    #[arg(long)]
    config: PathBuf,
    /// Override the frames directory of the config.
    #[arg(long)]
    frames: Option<PathBuf>,
    /// Override the annotated-output directory of the config.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
    /// JSON log lines (requires the `tracing` feature).
    #[arg(long)]
    json_log: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Track(args) => track(args),
        Command::InitConfig { path } => {
            TrackerConfig::default().write_json(&path)?;
            println!("wrote {}", path.display());
            Ok(())
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    #[cfg(feature = "tracing")]
    if json && skytrack::core::init_tracing(verbose, true).is_ok() {
        return;
    }
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = skytrack::core::init_with_level(level);
    if json && cfg!(not(feature = "tracing")) {
        log::warn!("--json-log needs the `tracing` feature; using plain logs");
    }
}

fn track(args: TrackArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.verbose, args.json_log);

    let mut cfg = TrackerConfig::load_json(&args.config)?;
    if let Some(frames) = &args.frames {
        cfg.frames_dir = frames.display().to_string();
    }
    if let Some(output) = &args.output {
        cfg.output_dir = Some(output.display().to_string());
    }

    let mut tracker = cfg.build_tracker()?;
    let paths = frames::list_frames(cfg.frames_dir())?;
    log::info!(
        "tracking {} frames from {} with the {} detector",
        paths.len(),
        cfg.frames_dir,
        tracker.detector().name()
    );

    let images = cfg
        .output_dir
        .as_ref()
        .map(|dir| DirectorySink::create(dir, cfg.tracker.search_radius))
        .transpose()?;
    let time_log = cfg
        .time_log
        .as_ref()
        .map(|path| TimeLog::create(path))
        .transpose()?;
    let mut sink = (images, (time_log, RecordCollector::default()));

    let summary = run_sequence(&mut tracker, frames::read_frames(paths), &mut sink);

    if let Some(report_path) = &cfg.report_path {
        let report = RunReport {
            detector: tracker.detector().name().to_string(),
            config: cfg.clone(),
            frames: std::mem::take(&mut sink.1.1.entries),
            summary,
        };
        report.write_json(report_path)?;
        log::info!("report written to {report_path}");
    }

    println!("{summary}");
    Ok(())
}
