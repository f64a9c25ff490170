//! sheettrack CLI — locate a sheet in image files and emit step commands.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};

use sheettrack::{
    CenterStrategy, ExtractionMode, FrameReport, SegmentStrategy, TrackConfig, Tracker,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sheettrack")]
#[command(about = "Locate a sheet of paper, rectify it and derive tracking commands")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the single-frame pipeline on one image.
    Locate(CliLocateArgs),

    /// Track a sheet across an ordered sequence of frames.
    Track(CliTrackArgs),

    /// Print the default configuration as JSON.
    Config,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    /// JSON configuration file; missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Segmentation strategy.
    #[arg(long, value_enum)]
    segment: Option<SegmentArg>,

    /// Corner extraction mode.
    #[arg(long, value_enum)]
    extraction: Option<ExtractionArg>,

    /// Center estimation strategy.
    #[arg(long, value_enum)]
    center: Option<CenterArg>,

    /// Horizontal step size of the controller.
    #[arg(long)]
    step_x: Option<i32>,

    /// Vertical step size of the controller.
    #[arg(long)]
    step_y: Option<i32>,
}

#[derive(Debug, Clone, Args)]
struct CliLocateArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the frame report (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the rectified frame (PNG).
    #[arg(long)]
    rectified: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Clone, Args)]
struct CliTrackArgs {
    /// Input frames, processed in the given order.
    #[arg(long, num_args = 1.., required = true)]
    frames: Vec<PathBuf>,

    /// Path to write per-frame results (JSON array). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Append one `dx, dy` line per produced command to this file.
    #[arg(long)]
    command_log: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SegmentArg {
    ColorRange,
    GlobalThreshold,
}

impl SegmentArg {
    fn to_core(self) -> SegmentStrategy {
        match self {
            Self::ColorRange => SegmentStrategy::ColorRange,
            Self::GlobalThreshold => SegmentStrategy::GlobalThreshold,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExtractionArg {
    PolygonFallback,
    TightRotatedBox,
}

impl ExtractionArg {
    fn to_core(self) -> ExtractionMode {
        match self {
            Self::PolygonFallback => ExtractionMode::PolygonFallback,
            Self::TightRotatedBox => ExtractionMode::TightRotatedBox,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CenterArg {
    Moment,
    InverseWarp,
}

impl CenterArg {
    fn to_core(self) -> CenterStrategy {
        match self {
            Self::Moment => CenterStrategy::Moment,
            Self::InverseWarp => CenterStrategy::InverseWarp,
        }
    }
}

impl ConfigArgs {
    fn build(&self) -> CliResult<TrackConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading config: {}", path.display());
                TrackConfig::from_json_file(path)?
            }
            None => TrackConfig::default(),
        };
        if let Some(s) = self.segment {
            config.segment.strategy = s.to_core();
        }
        if let Some(m) = self.extraction {
            config.contour.mode = m.to_core();
        }
        if let Some(c) = self.center {
            config.center = c.to_core();
        }
        if let Some(x) = self.step_x {
            config.control.step_x = x;
        }
        if let Some(y) = self.step_y {
            config.control.step_y = y;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Locate(args) => run_locate(&args),
        Commands::Track(args) => run_track(&args),
        Commands::Config => run_config(),
    }
}

fn load_frame(path: &Path) -> CliResult<image::RgbImage> {
    let img = image::open(path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", path.display(), e).into()
    })?;
    Ok(img.to_rgb8())
}

fn write_json(out: Option<&Path>, json: &str) -> CliResult<()> {
    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

// ── config ─────────────────────────────────────────────────────────────

fn run_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&TrackConfig::default())?);
    Ok(())
}

// ── locate ─────────────────────────────────────────────────────────────

fn run_locate(args: &CliLocateArgs) -> CliResult<()> {
    let config = args.config.build()?;
    let tracker = Tracker::new(config)?;

    tracing::info!("Loading image: {}", args.image.display());
    let frame = load_frame(&args.image)?;
    let (w, h) = frame.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let output = tracker.locate(&frame)?;
    tracing::info!(
        "Center ({}, {}), rectified {}x{}, rotation {:.2} deg{}",
        output.center[0],
        output.center[1],
        output.rectified.size[0],
        output.rectified.size[1],
        output.rectified.rotation_deg,
        if output.rectified.rotation_applied {
            " (applied)"
        } else {
            ""
        },
    );

    if let Some(path) = &args.rectified {
        output.rectified.image.save(path)?;
        tracing::info!("Rectified frame written to {}", path.display());
    }

    let report = FrameReport::from_output(&output, [w, h]);
    write_json(args.out.as_deref(), &serde_json::to_string_pretty(&report)?)
}

// ── track ──────────────────────────────────────────────────────────────

fn run_track(args: &CliTrackArgs) -> CliResult<()> {
    let config = args.config.build()?;
    let mut tracker = Tracker::new(config)?;

    let mut log = match &args.command_log {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    let mut entries = Vec::with_capacity(args.frames.len());
    let mut n_skipped = 0usize;
    for path in &args.frames {
        let frame = load_frame(path)?;
        match tracker.process(&frame) {
            Ok(report) => {
                if let (Some(file), Some(cmd)) = (log.as_mut(), report.command) {
                    writeln!(file, "{}, {}", cmd.dx, cmd.dy)?;
                }
                tracing::info!(
                    "{}: center ({}, {}) command {:?}",
                    path.display(),
                    report.center[0],
                    report.center[1],
                    report.command,
                );
                entries.push(serde_json::json!({
                    "frame": path.display().to_string(),
                    "report": report,
                }));
            }
            Err(e) => {
                n_skipped += 1;
                tracing::warn!("{}: skipped ({})", path.display(), e);
                entries.push(serde_json::json!({
                    "frame": path.display().to_string(),
                    "skipped": e.to_string(),
                }));
            }
        }
    }

    tracing::info!(
        "Processed {} frames ({} skipped)",
        args.frames.len(),
        n_skipped
    );
    write_json(args.out.as_deref(), &serde_json::to_string_pretty(&entries)?)
}
