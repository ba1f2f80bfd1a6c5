use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use std::cell::RefCell;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::rc::Rc;

mod app;
mod config;
mod controller;
mod draggable_line;
mod error;
mod geometry;
mod image_loader;
mod prompt;
mod surface;

use app::{MeasureApp, SessionReport};
use config::{Color4, Settings};
use controller::{MeasurementController, ReferenceLength};
use draggable_line::DraggableLine;
use error::Error;
use surface::LineStyle;

/// Measure an object in a photo against a reference of known length
#[derive(Parser, Debug)]
#[command(name = "photo-measure")]
#[command(about = "Measure objects in a photo against a reference of known length", long_about = None)]
struct Args {
    /// Image to measure (opens a file picker when omitted)
    image: Option<PathBuf>,

    /// Real-world length spanned by the reference line (prompted for when omitted)
    #[arg(short, long, value_name = "LENGTH")]
    reference_length: Option<String>,

    /// Unit label for lengths, e.g. cm or in
    #[arg(short, long)]
    units: Option<String>,

    /// Handle grab range in screen pixels
    #[arg(short, long, value_name = "PX")]
    grab_range: Option<f32>,

    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fail instead of prompting for a missing reference length
    #[arg(long)]
    no_prompt: bool,
}

// ── Startup ─────────────────────────────────────────────────────────────────

fn resolve_image_path(arg: Option<PathBuf>) -> Result<PathBuf, Error> {
    match arg {
        Some(path) => Ok(path),
        None => rfd::FileDialog::new()
            .set_title("Open photo")
            .add_filter("Image", &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"])
            .pick_file()
            .ok_or(Error::NoImageSelected),
    }
}

fn resolve_reference_length(args: &Args, settings: &Settings) -> Result<ReferenceLength, Error> {
    if let Some(raw) = &args.reference_length {
        return raw.parse();
    }
    if let Some(value) = settings.reference_length {
        return ReferenceLength::new(value);
    }
    if args.no_prompt {
        return Err(Error::InvalidReferenceLength(String::new()));
    }
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    prompt::prompt_reference_length(stdin.lock(), std::io::stdout(), interactive)
}

fn build_controller(
    settings: &Settings,
    image_size: [usize; 2],
    reference_length: ReferenceLength,
) -> MeasurementController {
    let (reference, target) = settings.initial_lines(image_size);
    let style = |color: Color4| LineStyle {
        color,
        thickness: settings.line_thickness,
        marker_radius: settings.marker_radius,
    };

    let mut reference_line =
        DraggableLine::new(reference.start, reference.end, style(settings.reference_color));
    let mut target_line = DraggableLine::new(target.start, target.end, style(settings.target_color));
    reference_line.set_grab_range(settings.grab_range);
    target_line.set_grab_range(settings.grab_range);

    MeasurementController::new(reference_line, target_line, reference_length, settings.units.clone())
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path).context("loading settings")?,
        None => Settings::default(),
    };
    if let Some(units) = &args.units {
        settings.units = Some(units.clone());
    }
    if let Some(px) = args.grab_range {
        settings.grab_range = px;
    }

    let image_path = resolve_image_path(args.image.clone())?;
    let image = image_loader::load(&image_path)?;
    let reference_length = resolve_reference_length(&args, &settings)?;

    let controller = build_controller(&settings, image.size(), reference_length);
    log::info!(
        "reference {}, initial target {}",
        controller.reference_text(),
        controller.result_text()
    );
    let initial_lines = (
        controller.reference_line().segment(),
        controller.target_line().segment(),
    );

    let report = Rc::new(RefCell::new(SessionReport::capture(&controller)));
    let app = MeasureApp::new(image, controller, initial_lines, Rc::clone(&report));

    let title = format!(
        "photo-measure - {}",
        image_path
            .file_name()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    );
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(&title, options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("window error: {e}"))?;

    print!("{}", report.borrow());
    Ok(())
}
