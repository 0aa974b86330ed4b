use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "focus-reveal", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the blur budget and ladder radii for a display as JSON.
    Ladder(LadderArgs),
    /// Play a full reveal of an image and write every presented frame as a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct LadderArgs {
    /// Display height in pixels.
    #[arg(long, default_value_t = 1920)]
    height: u32,

    /// Number of ladder frames.
    #[arg(long, default_value_t = focus_reveal::KEY_FRAME_COUNT)]
    frames: u32,

    /// Curve used to spread radii over the ladder.
    #[arg(long, value_enum, default_value_t = EaseChoice::InOutSine)]
    ease: EaseChoice,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_NNN.png` files and `timeline.json`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Display height in pixels, used to derive the blur budget.
    #[arg(long, default_value_t = 1920)]
    height: u32,

    /// Hold on the sharp image, in milliseconds (<= 0 uses the default).
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    hold_ms: i32,

    /// Downscale the input so its longer side is at most this many pixels.
    #[arg(long)]
    max_side: Option<u32>,

    /// Blur ladder frames in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EaseChoice {
    Linear,
    InOutQuad,
    InOutCubic,
    InOutSine,
}

impl From<EaseChoice> for focus_reveal::Ease {
    fn from(c: EaseChoice) -> Self {
        match c {
            EaseChoice::Linear => Self::Linear,
            EaseChoice::InOutQuad => Self::InOutQuad,
            EaseChoice::InOutCubic => Self::InOutCubic,
            EaseChoice::InOutSine => Self::InOutSine,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Ladder(args) => cmd_ladder(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_ladder(args: LadderArgs) -> anyhow::Result<()> {
    let budget = focus_reveal::MaxBlurBudget::from_display(focus_reveal::DisplayMetrics {
        height_px: args.height,
    })?;
    let plan = focus_reveal::LadderPlan::new(budget, args.frames, args.ease.into())?;
    let json = serde_json::to_string_pretty(&plan).context("serialize ladder plan")?;
    println!("{json}");
    Ok(())
}

#[derive(serde::Serialize)]
struct TimelineEntry {
    file: String,
    at_ms: u64,
    overlay_alpha: u8,
}

/// Writes each presented frame, composited with its overlay, as a numbered PNG.
struct PngSequenceSink {
    dir: PathBuf,
    timeline: Vec<TimelineEntry>,
    error: Option<anyhow::Error>,
}

impl PngSequenceSink {
    fn write_frame(
        &mut self,
        frame: &focus_reveal::PixelBuffer,
        overlay: focus_reveal::OverlayColor,
        at: Duration,
    ) -> anyhow::Result<()> {
        let name = format!("frame_{:03}.png", self.timeline.len());
        let path = self.dir.join(&name);
        focus_reveal::composite_overlay(frame, overlay)?
            .to_image()?
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        self.timeline.push(TimelineEntry {
            file: name,
            at_ms: at.as_millis() as u64,
            overlay_alpha: overlay.alpha,
        });
        Ok(())
    }
}

impl focus_reveal::DisplaySink for PngSequenceSink {
    fn present(
        &mut self,
        frame: &focus_reveal::PixelBuffer,
        overlay: focus_reveal::OverlayColor,
        at: Duration,
    ) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.write_frame(frame, overlay, at) {
            self.error = Some(e);
        }
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let opts = focus_reveal::SourceOpts {
        max_long_side: args.max_side,
        ..focus_reveal::SourceOpts::default()
    };
    let source = focus_reveal::load_source(&args.in_path, &opts)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let sink = PngSequenceSink {
        dir: args.out_dir.clone(),
        timeline: Vec::new(),
        error: None,
    };
    let builder = focus_reveal::FrameLadderBuilder::new().with_threading(
        focus_reveal::LadderThreading {
            parallel: args.parallel,
            threads: args.threads,
        },
    );
    let mut view = focus_reveal::RevealView::for_display(
        sink,
        focus_reveal::DisplayMetrics {
            height_px: args.height,
        },
    )?
    .with_builder(builder);

    view.set_source_image(source)?;
    view.wait_until_ready()?;
    let radii = view.ladder().map(|l| l.radii()).unwrap_or_default();
    eprintln!("ladder radii (most blurred first): {radii:?}");

    if !view.play_animation(args.hold_ms) {
        anyhow::bail!("reveal could not start (ladder not ready)");
    }
    let elapsed = view.run_to_completion();

    let sink = view.into_sink();
    if let Some(e) = sink.error {
        return Err(e);
    }
    write_timeline(&args.out_dir.join("timeline.json"), &sink.timeline)?;

    eprintln!(
        "wrote {} frames ({} ms) to {}",
        sink.timeline.len(),
        elapsed.as_millis(),
        args.out_dir.display()
    );
    Ok(())
}

fn write_timeline(path: &Path, timeline: &[TimelineEntry]) -> anyhow::Result<()> {
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), timeline)
        .with_context(|| format!("write timeline '{}'", path.display()))?;
    Ok(())
}
