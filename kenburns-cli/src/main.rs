use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kenburns", about = "Render Ken Burns slideshows", version)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a slideshow manifest to a video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render one preview frame of a slide as a PNG.
    Frame(FrameArgs),
    /// Print resolved motion and the cross-fade plan as JSON.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Rasterize each slide's frames in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Skip the hardware codec and encode with the software codec only.
    #[arg(long, default_value_t = false)]
    software_only: bool,

    /// Keep frames and clips on disk after the export.
    #[arg(long, default_value_t = false)]
    keep_intermediates: bool,

    /// Parent directory for transient frames and clips.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// ffmpeg executable.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Write the export report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Slide index (0-based).
    #[arg(long, default_value_t = 0)]
    slide: usize,

    /// Normalized time within the slide, 0..=1.
    #[arg(long, default_value_t = 0.0)]
    t: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn load(path: &Path) -> anyhow::Result<kenburns::Slideshow> {
    kenburns::Slideshow::from_path(path)
        .with_context(|| format!("load manifest '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut show = load(&args.in_path)?;
    let settings = &mut show.settings;
    settings.threading.parallel |= args.parallel;
    if args.threads.is_some() {
        settings.threading.threads = args.threads;
    }
    if args.software_only {
        settings.encoder.hardware_codec = None;
    }
    settings.keep_intermediates |= args.keep_intermediates;
    if let Some(dir) = args.work_dir {
        settings.work_dir = Some(dir);
    }
    if let Some(bin) = args.ffmpeg {
        settings.encoder.ffmpeg_bin = bin;
    }
    tracing::debug!(?settings, "render settings");

    let report =
        kenburns::export_slideshow(&show, &args.out, &mut kenburns::AutoStyleCycle::default())?;

    for slide in &report.slides {
        eprintln!(
            "slide {}: {} frames, {:?}, {}",
            slide.index, slide.frames, slide.motion.motion_style, slide.codec
        );
    }
    if let Some(dir) = &report.work_dir {
        eprintln!("intermediates kept in {}", dir.display());
    }
    if let Some(path) = &args.report {
        kenburns::ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("write report '{}'", path.display()))?;
    }

    eprintln!(
        "wrote {} ({:.2}s)",
        report.output.display(),
        report.total_duration
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let show = load(&args.in_path)?;
    kenburns::render_preview(
        &show,
        args.slide,
        args.t,
        &args.out,
        &mut kenburns::AutoStyleCycle::default(),
    )?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let show = load(&args.in_path)?;
    let plan = kenburns::plan_slideshow(&show, &mut kenburns::AutoStyleCycle::default())?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
