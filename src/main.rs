//! rsmark - decode model output into bounding boxes from the command line.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;

use rsmark::config::AppConfig;
use rsmark::{
    CanonicalBox, CornerPolicy, Error, ImageGeometry, Palette, RawPayload, Result, Rgb, TaskType,
    decode_with, extract_object_coordinates,
};

#[derive(Parser, Debug)]
#[command(name = "rsmark")]
#[command(about = "Decode detection output into bounding boxes over an image")]
#[command(version)]
struct Args {
    /// Payload file to decode; reads stdin when absent or "-"
    #[arg(long)]
    payload: Option<PathBuf>,

    /// On-screen image placement as X,Y,W,H
    #[arg(long, conflicts_with_all = ["image", "canvas"])]
    geometry: Option<String>,

    /// Native image size as WxH (requires --canvas)
    #[arg(long, requires = "canvas")]
    image: Option<String>,

    /// Canvas size as WxH (requires --image)
    #[arg(long, requires = "image")]
    canvas: Option<String>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analysis task the payload answers
    #[arg(long, default_value = "detection")]
    task: String,

    /// Swap reversed corners so every box has a non-negative size
    #[arg(long)]
    normalize_corners: bool,

    /// Print the recovered JSON instead of boxes
    #[arg(long)]
    canonical: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// A box as printed, with its palette color.
#[derive(Serialize)]
struct ColoredBox<'a> {
    #[serde(flatten)]
    bbox: &'a CanonicalBox,
    color: Rgb,
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level.to_level_filter()
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let task: TaskType = args.task.parse()?;
    let content = read_payload(args.payload.as_deref())?;

    if args.canonical {
        let json = extract_object_coordinates(&content, task).unwrap_or_else(|| "null".into());
        println!("{}", json);
        return Ok(());
    }

    let boxes = if task.carries_coordinates() {
        let image = resolve_geometry(&args, config.canvas.fill_fraction)?;
        let mut options = config.decoder.to_options();
        if args.normalize_corners {
            options = options.with_corner_policy(CornerPolicy::Normalize);
        }
        decode_with(&RawPayload::from(content), &image, &options)
    } else {
        log::info!("Task '{}' produces no boxes", task);
        Vec::new()
    };

    let palette = Palette::default();
    let colored: Vec<ColoredBox<'_>> = boxes
        .iter()
        .enumerate()
        .map(|(index, bbox)| ColoredBox {
            bbox,
            color: palette.color_for(index),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&colored)?);
    Ok(())
}

fn read_payload(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            log::debug!("Reading payload from {:?}", path);
            Ok(std::fs::read_to_string(path)?)
        }
        _ => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

fn resolve_geometry(args: &Args, fill_fraction: f64) -> Result<ImageGeometry> {
    if let Some(text) = &args.geometry {
        return ImageGeometry::parse(text);
    }
    match (&args.image, &args.canvas) {
        (Some(image), Some(canvas)) => {
            let (native_width, native_height) = parse_size::<u32>(image)?;
            let (canvas_width, canvas_height) = parse_size::<f64>(canvas)?;
            let geometry = ImageGeometry::fit_to_canvas(
                native_width,
                native_height,
                canvas_width,
                canvas_height,
                fill_fraction,
            )?;
            log::debug!("Image placed at {:?}", geometry);
            Ok(geometry)
        }
        _ => Ok(ImageGeometry::unit()),
    }
}

/// Parse `"WxH"`.
fn parse_size<T: std::str::FromStr>(text: &str) -> Result<(T, T)> {
    let invalid = || Error::invalid_argument(format!("size '{text}' must look like WxH"));
    let (width, height) = text.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = width.trim().parse().map_err(|_| invalid())?;
    let height = height.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}
