use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use skyscroll::{Page, Rasterizer, SceneGraph, Viewport};

#[derive(Parser, Debug)]
#[command(name = "skyscroll", version)]
struct Cli {
    /// Log verbosity on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the scene at one scroll position as a PNG.
    Frame(FrameArgs),
    /// Render evenly spaced scroll positions as numbered PNGs.
    Frames(FramesArgs),
    /// Write the scene at one scroll position as SVG text.
    Svg(SvgArgs),
    /// Print a JSON snapshot of node state and registry statistics.
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Scene document JSON (defaults to the built-in day-to-night scene).
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1440)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 900)]
    height: u32,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct Position {
    /// Scroll position as a fraction of the scrollable extent (0..=1).
    #[arg(long)]
    at: Option<f64>,

    /// Scroll position in pixels.
    #[arg(long)]
    scroll: Option<f64>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,
    #[command(flatten)]
    position: Position,
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FramesArgs {
    #[command(flatten)]
    scene: SceneArgs,
    /// Number of frames, from the top of the page to the bottom.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    count: u32,
    /// Output directory for `frame_NNNN.png`.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct SvgArgs {
    #[command(flatten)]
    scene: SceneArgs,
    #[command(flatten)]
    position: Position,
    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SampleArgs {
    #[command(flatten)]
    scene: SceneArgs,
    #[command(flatten)]
    position: Position,
    /// Write the JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Svg(args) => cmd_svg(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

fn open_page(args: &SceneArgs) -> anyhow::Result<Page> {
    let viewport = Viewport::new(f64::from(args.width), f64::from(args.height))?;
    let mut page = match &args.scene {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read scene '{}'", path.display()))?;
            let scene = SceneGraph::from_json(&json)
                .with_context(|| format!("parse scene '{}'", path.display()))?;
            Page::new(scene, viewport)
        }
        None => Page::daybreak(viewport)?,
    };
    page.mount().context("mount scene controller")?;
    Ok(page)
}

/// Scroll down to `position` the way a reader would, then let every scrub catch up.
fn scroll_and_settle(page: &mut Page, position: &Position) {
    match (position.at, position.scroll) {
        (_, Some(px)) => page.scroll_to(px),
        (Some(fraction), None) => page.scroll_to_fraction(fraction),
        (None, None) => {}
    }
    let frames = page.settle();
    tracing::debug!(frames, scroll = page.viewport().scroll_y(), "settled");
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut page = open_page(&args.scene)?;
    scroll_and_settle(&mut page, &args.position);

    let frame = page.render_frame(&Rasterizer::new())?;
    ensure_parent(&args.out)?;
    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let mut page = open_page(&args.scene)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let rasterizer = Rasterizer::new();
    let last = args.count.saturating_sub(1).max(1);
    for i in 0..args.count {
        let position = Position {
            at: Some(f64::from(i) / f64::from(last)),
            scroll: None,
        };
        scroll_and_settle(&mut page, &position);
        let out = args.out_dir.join(format!("frame_{i:04}.png"));
        page.render_frame(&rasterizer)?.save_png(&out)?;
        tracing::info!(frame = i, scroll = page.viewport().scroll_y(), "rendered");
    }
    eprintln!("wrote {} frames to {}", args.count, args.out_dir.display());
    Ok(())
}

fn cmd_svg(args: SvgArgs) -> anyhow::Result<()> {
    let mut page = open_page(&args.scene)?;
    scroll_and_settle(&mut page, &args.position);

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, page.to_svg())
        .with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let mut page = open_page(&args.scene)?;
    scroll_and_settle(&mut page, &args.position);

    let json = serde_json::to_string_pretty(&page.snapshot()).context("serialize snapshot")?;
    match &args.out {
        Some(path) => {
            ensure_parent(path)?;
            std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
