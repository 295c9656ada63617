use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vizpatch::graph::load_patch_path;
use vizpatch::sink::png::write_png;
use vizpatch::{
    Canvas, NodeRegistry, OutputSink, PcmBandSource, PngSink, Runtime, RuntimeOpts, Texture,
};

#[derive(Parser, Debug)]
#[command(name = "vizpatch", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a patch, print its diagnostics and evaluation schedule.
    Check(CheckArgs),
    /// Run a patch for a number of frames and write the last image as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input patch JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input patch JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Tick rate; each tick advances time by `1 / fps` seconds.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 256)]
    width: u32,

    #[arg(long, default_value_t = 256)]
    height: u32,

    /// Interleaved little-endian f32 PCM feeding the audio nodes.
    #[arg(long)]
    audio_f32le: Option<PathBuf>,

    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,

    #[arg(long, default_value_t = 2)]
    channels: u16,

    /// Write snapshot and recording frames requested by output nodes into this directory.
    #[arg(long)]
    capture_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let registry = Arc::new(NodeRegistry::standard());
    let loaded = load_patch_path(&args.in_path, &registry)
        .with_context(|| format!("load patch '{}'", args.in_path.display()))?;
    for d in &loaded.diagnostics {
        println!("{d}");
    }

    let mut rt = Runtime::from_loaded(loaded, registry, RuntimeOpts::default())?;
    let schedule = rt.schedule()?;
    for d in &schedule.diagnostics {
        println!("{d}");
    }
    let order: Vec<String> = schedule.order.iter().map(|id| id.to_string()).collect();
    println!("order: {}", order.join(" -> "));
    for fb in &schedule.feedback {
        println!(
            "feedback: {}.{} -> {}.{}{}",
            fb.from,
            fb.from_port,
            fb.to,
            fb.to_port,
            if fb.synthetic { " (synthetic delay)" } else { "" }
        );
    }
    if !schedule.isolated.is_empty() {
        let isolated: Vec<String> = schedule.isolated.iter().map(|id| id.to_string()).collect();
        println!("isolated: {}", isolated.join(", "));
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.fps > 0.0, "--fps must be positive");
    let json = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read patch '{}'", args.in_path.display()))?;
    let opts = RuntimeOpts {
        canvas: Canvas::new(args.width, args.height),
        ..RuntimeOpts::default()
    };
    let mut rt = Runtime::from_json(&json, opts)
        .with_context(|| format!("activate patch '{}'", args.in_path.display()))?;
    for d in rt.load_diagnostics() {
        eprintln!("{d}");
    }

    if let Some(path) = &args.audio_f32le {
        let source = PcmBandSource::open(path, args.sample_rate, args.channels)
            .with_context(|| format!("open audio '{}'", path.display()))?;
        rt = rt.with_audio_source(source);
    }

    let image = match &args.capture_dir {
        Some(dir) => run(rt.with_sink(PngSink::new(dir)?), &args)?,
        None => run(rt, &args)?,
    };

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    write_png(&args.out, &image).with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn run<S: OutputSink>(mut rt: Runtime<S>, args: &FrameArgs) -> anyhow::Result<Texture> {
    let dt = 1.0 / args.fps;
    let mut image = Texture::black(rt.opts().canvas);
    for _ in 0..args.frames {
        let report = rt.tick(dt)?;
        for d in &report.diagnostics {
            eprintln!("frame {}: {d}", report.frame.0);
        }
        image = report.image;
    }
    Ok(image)
}
