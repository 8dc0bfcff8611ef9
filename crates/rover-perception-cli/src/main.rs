//! rover-perception CLI: run the perception pipeline on recorded frames.

use clap::{Args, Parser, Subcommand};
use rover_perception::{
    PerceptionConfig, PerceptionOutput, PerceptionPipeline, RoverPose, VisionOverlay, WorldMap,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "rover-perception")]
#[command(about = "Classify rover camera frames and accumulate a top-down world map")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single frame at a known pose.
    Run(CliRunArgs),

    /// Process a sequence of frames from a JSON manifest into one map.
    Replay(CliReplayArgs),

    /// Print the default configuration as JSON.
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct CliRunArgs {
    /// Path to the camera frame.
    #[arg(long)]
    image: PathBuf,

    /// Rover x position in world cells.
    #[arg(long, allow_hyphen_values = true)]
    x: f64,

    /// Rover y position in world cells.
    #[arg(long, allow_hyphen_values = true)]
    y: f64,

    /// Rover heading in degrees, counterclockwise from +x.
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    yaw: f64,

    /// Pipeline configuration (JSON). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the per-frame output (JSON).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the vision overlay image.
    #[arg(long)]
    overlay_out: Option<PathBuf>,

    /// Path to write the world map image.
    #[arg(long)]
    map_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliReplayArgs {
    /// JSON list of `{ "image", "x", "y", "yaw" }` entries. Relative image
    /// paths are resolved against the manifest's directory.
    #[arg(long)]
    manifest: PathBuf,

    /// Pipeline configuration (JSON). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the per-frame outputs (JSON array).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the final world map image.
    #[arg(long)]
    map_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct ManifestEntry {
    image: PathBuf,
    x: f64,
    y: f64,
    #[serde(default)]
    yaw: f64,
}

#[derive(Debug, Serialize)]
struct ReplayFrame<'a> {
    image: &'a Path,
    pose: RoverPose,
    output: PerceptionOutput,
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
        Commands::Run(args) => run_single(&args),
        Commands::Replay(args) => run_replay(&args),
        Commands::DefaultConfig => run_default_config(),
    }
}

fn run_default_config() -> CliResult<()> {
    let json = serde_json::to_string_pretty(&PerceptionConfig::default())?;
    println!("{}", json);
    Ok(())
}

fn load_config(path: Option<&Path>) -> CliResult<PerceptionConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading config: {}", path.display());
            PerceptionConfig::from_json_file(path).map_err(|e| -> CliError {
                format!("Failed to load config {}: {}", path.display(), e).into()
            })
        }
        None => Ok(PerceptionConfig::default()),
    }
}

fn load_frame(path: &Path) -> CliResult<image::RgbImage> {
    let img = image::open(path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", path.display(), e).into()
    })?;
    Ok(img.to_rgb8())
}

fn write_map(map: &WorldMap, path: &Path) -> CliResult<()> {
    map.to_rgb_image().save(path)?;
    tracing::info!("World map written to {}", path.display());
    Ok(())
}

fn log_output(output: &PerceptionOutput) {
    tracing::info!(
        "navigable={} obstacle={} rock={} (map: +{} navigable cells, +{} obstacle cells)",
        output.stats.navigable_px,
        output.stats.obstacle_px,
        output.stats.rock_px,
        output.stats.map.navigable_cells,
        output.stats.map.obstacle_cells,
    );
    if let Some(rock) = &output.nearest_rock {
        tracing::info!(
            "Nearest rock: {:.1}px at {:.1}° -> cell ({}, {})",
            rock.distance,
            rock.angle.to_degrees(),
            rock.world_cell[0],
            rock.world_cell[1],
        );
    }
}

fn run_single(args: &CliRunArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let pipeline = PerceptionPipeline::new(config)?;

    tracing::info!("Loading image: {}", args.image.display());
    let frame = load_frame(&args.image)?;
    let (w, h) = frame.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let pose = RoverPose::new(args.x, args.y, args.yaw);
    let mut map = pipeline.new_world_map();
    let mut overlay = pipeline.new_overlay();
    let output = pipeline.step(&frame, &pose, &mut map, &mut overlay)?;
    log_output(&output);

    if let Some(out) = &args.out {
        std::fs::write(out, serde_json::to_string_pretty(&output)?)?;
        tracing::info!("Results written to {}", out.display());
    }
    if let Some(path) = &args.overlay_out {
        write_overlay(overlay, path)?;
    }
    if let Some(path) = &args.map_out {
        write_map(&map, path)?;
    }
    Ok(())
}

fn write_overlay(overlay: VisionOverlay, path: &Path) -> CliResult<()> {
    overlay.into_image().save(path)?;
    tracing::info!("Overlay written to {}", path.display());
    Ok(())
}

fn run_replay(args: &CliReplayArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let pipeline = PerceptionPipeline::new(config)?;

    let data = std::fs::read_to_string(&args.manifest).map_err(|e| -> CliError {
        format!("Failed to read manifest {}: {}", args.manifest.display(), e).into()
    })?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&data)?;
    let base = args.manifest.parent().unwrap_or_else(|| Path::new("."));
    tracing::info!("Replaying {} frames", entries.len());

    let mut map = pipeline.new_world_map();
    let mut overlay = pipeline.new_overlay();
    let mut frames = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let path = base.join(&entry.image);
        let frame = load_frame(&path)?;
        let pose = RoverPose::new(entry.x, entry.y, entry.yaw);
        let output = pipeline
            .step(&frame, &pose, &mut map, &mut overlay)
            .map_err(|e| -> CliError {
                format!("Frame {} ({}): {}", i, path.display(), e).into()
            })?;
        tracing::debug!("Frame {}: {}", i, path.display());
        log_output(&output);
        frames.push(ReplayFrame {
            image: &entry.image,
            pose,
            output,
        });
    }

    let flagged = map.rock_cells().count();
    tracing::info!("Map has {} rock cells after {} frames", flagged, frames.len());

    if let Some(out) = &args.out {
        std::fs::write(out, serde_json::to_string_pretty(&frames)?)?;
        tracing::info!("Results written to {}", out.display());
    }
    if let Some(path) = &args.map_out {
        write_map(&map, path)?;
    }
    Ok(())
}
