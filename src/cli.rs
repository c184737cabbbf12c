// SPDX-License-Identifier: GPL-3.0-or-later
// src/cli.rs
//
// Headless front end: open an image in the crop tool, replay pointer
// gestures, then export the avatar.
//
// Usage examples:
//   avatar-crop portrait.jpg
//   avatar-crop portrait.jpg --gesture "drag 200 150 260 120" --size 256 --format png
//   avatar-crop wide.png --script zoom.txt --preview view.png --dry-run

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::{ArgAction, Parser};
use image::imageops::FilterType;

use crate::app::message::CropMessage;
use crate::app::model::{CropTool, ToolPhase};
use crate::app::persist::FilePersister;
use crate::app::preview::Preview;
use crate::app::source::decode_async;
use crate::config::{AppConfig, parse_dimensions, parse_filter, parse_quality};
use crate::constant::DEFAULT_OUTPUT_STEM;
use crate::domain::crop::export::plan;
use crate::domain::crop::{OutputFormat, OutputSize};
use crate::domain::geometry::{Point, Size};

// ============================================================================
// Arguments
// ============================================================================

/// Crop a circular avatar out of an image by replaying pan, zoom and move
/// gestures against the crop viewport.
#[derive(Parser, Debug, Clone)]
#[command(name = "avatar-crop", version, about)]
pub struct Args {
    /// Source image (PNG, JPEG, WebP, GIF, BMP).
    pub file: PathBuf,

    /// Directory the avatar is written to. Defaults to the configured output directory.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Output file stem; the extension follows the format.
    #[arg(long, default_value = DEFAULT_OUTPUT_STEM)]
    pub name: String,

    /// Viewport size the gestures are expressed in.
    #[arg(long, value_name = "WxH", value_parser = parse_dimensions)]
    pub container: Option<Size>,

    /// Gesture commands, e.g. "down 200 150; move 240 150; up". Repeatable.
    #[arg(short, long = "gesture", value_name = "SCRIPT")]
    pub gestures: Vec<String>,

    /// File with gesture commands, one per line. Runs after --gesture.
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Output edge in pixels, or "native" for the covered source resolution.
    #[arg(long, value_name = "PIXELS|native")]
    pub size: Option<OutputSize>,

    /// Output encoding: png or jpeg.
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// JPEG quality (1-100). Implies --format jpeg; not allowed with --format png.
    #[arg(short, long, value_parser = parse_quality)]
    pub quality: Option<u8>,

    /// Resampling filter: nearest, triangle, catmullrom, gaussian, lanczos3.
    #[arg(long, value_parser = parse_filter)]
    pub filter: Option<FilterType>,

    /// Also write the final viewport (image, dimming, crop outline) here.
    #[arg(long, value_name = "FILE")]
    pub preview: Option<PathBuf>,

    /// Report the crop without writing the avatar.
    #[arg(long)]
    pub dry_run: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Overlay command-line flags on `config`.
    ///
    /// `--format jpeg` alone keeps a quality the config already carries.
    pub fn apply(&self, config: &mut AppConfig) -> anyhow::Result<()> {
        if let Some(container) = self.container {
            config.container = container;
        }
        if let Some(size) = self.size {
            config.output_size = size;
        }
        match (self.format, self.quality) {
            (Some(OutputFormat::Png), Some(quality)) => {
                bail!("--quality {quality} only applies to JPEG output, not --format png")
            }
            (Some(OutputFormat::Jpeg { .. }), None) => {
                if !matches!(config.output_format, OutputFormat::Jpeg { .. }) {
                    config.output_format = OutputFormat::default();
                }
            }
            (Some(format), None) => config.output_format = format,
            (_, Some(quality)) => config.set_jpeg_quality(quality),
            (None, None) => {}
        }
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
        Ok(())
    }
}

// ============================================================================
// Gesture scripts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Down(Point),
    Move(Point),
    Up,
    Cancel,
}

impl From<Gesture> for CropMessage {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Down(point) => CropMessage::PointerDown(point),
            Gesture::Move(point) => CropMessage::PointerMove(point),
            Gesture::Up => CropMessage::PointerUp,
            Gesture::Cancel => CropMessage::PointerCancel,
        }
    }
}

/// Parse commands separated by `;` or newlines. `#` comments out the rest
/// of a line.
///
/// `down X Y`, `move X Y`, `up`, `cancel`, and `drag X0 Y0 X1 Y1` (a full
/// down/move/up gesture).
pub fn parse_script(script: &str) -> anyhow::Result<Vec<Gesture>> {
    let mut gestures = Vec::new();

    for line in script.lines() {
        let line = line.split('#').next().unwrap_or_default();
        for command in line.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            let mut words = command.split_whitespace();
            let verb = words.next().unwrap_or_default().to_ascii_lowercase();
            let numbers = words
                .map(|w| w.parse::<f32>().with_context(|| format!("'{command}': bad number '{w}'")))
                .collect::<anyhow::Result<Vec<f32>>>()?;

            match (verb.as_str(), numbers.as_slice()) {
                ("down", [x, y]) => gestures.push(Gesture::Down(Point::new(*x, *y))),
                ("move", [x, y]) => gestures.push(Gesture::Move(Point::new(*x, *y))),
                ("up", []) => gestures.push(Gesture::Up),
                ("cancel", []) => gestures.push(Gesture::Cancel),
                ("drag", [x0, y0, x1, y1]) => gestures.extend([
                    Gesture::Down(Point::new(*x0, *y0)),
                    Gesture::Move(Point::new(*x1, *y1)),
                    Gesture::Up,
                ]),
                _ => bail!("unrecognized gesture command '{command}'"),
            }
        }
    }

    Ok(gestures)
}

// ============================================================================
// Entry point
// ============================================================================

/// Run one crop. Returns the written avatar path, or `None` for a dry run.
pub async fn run(args: Args, mut config: AppConfig) -> anyhow::Result<Option<PathBuf>> {
    args.apply(&mut config)?;

    let mut gestures = Vec::new();
    for script in &args.gestures {
        gestures.extend(parse_script(script)?);
    }
    if let Some(path) = &args.script {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read gesture script {}", path.display()))?;
        gestures.extend(parse_script(&text).with_context(|| format!("in {}", path.display()))?);
    }

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut tool = CropTool::new(config.crop);
    tool.update(CropMessage::ContainerMeasured(config.container));
    let generation = tool.begin_open();
    let result = decode_async(bytes, config.decode_timeout).await;
    tool.update(CropMessage::ImageDecoded { generation, result });

    match tool.phase() {
        ToolPhase::Ready => {}
        ToolPhase::Failed => {
            let reason = tool.error().unwrap_or("unknown error").to_string();
            tool.update(CropMessage::Close);
            bail!("cannot crop {}: {reason}", args.file.display());
        }
        phase => bail!("crop tool is not ready ({phase:?})"),
    }

    for gesture in gestures {
        tool.update(gesture.into());
    }
    // A script that never releases still ends its drag here.
    tool.update(CropMessage::PointerUp);

    let (Some(state), Some(source)) = (tool.state().copied(), tool.source()) else {
        return Err(anyhow!("crop tool lost its image"));
    };
    log::info!(
        "crop region at ({:.1}, {:.1}), scale {:.3}, pan ({:.1}, {:.1})",
        state.region.x,
        state.region.y,
        state.transform.scale,
        state.transform.offset.x,
        state.transform.offset.y
    );

    if let Some(path) = &args.preview {
        write_preview(&Preview::new(&state, source).render(), path)?;
    }

    if args.dry_run {
        let (width, height) = source.dimensions();
        let plan = plan(&state, width, height);
        println!(
            "source square x={:.1} y={:.1} size={:.1} of {width}x{height}{}",
            plan.source.x,
            plan.source.y,
            plan.source.size,
            if plan.centered { " (centered)" } else { "" }
        );
        tool.update(CropMessage::Close);
        return Ok(None);
    }

    let persister = FilePersister::new(&config.output_dir, &args.name);
    let target = persister.target(config.output_format);
    tool.save(&persister, &config.export_options()).await?;

    // The tool swallows persister failures; check what actually landed.
    if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
        bail!("avatar was not written to {}", target.display());
    }
    Ok(Some(target))
}

fn write_preview(frame: &image::RgbaImage, path: &Path) -> anyhow::Result<()> {
    frame
        .save(path)
        .with_context(|| format!("failed to write preview {}", path.display()))?;
    log::info!("wrote preview {}", path.display());
    Ok(())
}
