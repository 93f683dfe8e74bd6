//! PalmVision command line
//!   $ palm-cli --detections flight_3.json DJI_0042.JPG DJI_0043.JPG
//! Replays a recorded detection run over the given captures and prints the
//! per-image plant condition. `RUST_LOG=debug` shows session events.

use anyhow::{Context, Result};
use clap::Parser;
use palm_detect::RecordedDetector;
use palm_session::{analyze_pending, ImageAttachment, PipelineConfig, Session};
use std::path::PathBuf;
use std::sync::Arc;

mod annotate;
mod report;

use report::Report;

// ================ CLI ================== //

#[derive(Parser)]
#[command(name = "palm-cli", version, about = "Palm plantation health from recorded detections")]
struct CliArgs {
    /// Recorded detections (JSON) keyed by image file name
    #[arg(long)]
    detections: PathBuf,

    /// Pipeline configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured worker count
    #[arg(long)]
    workers: Option<usize>,

    /// Print reports as a JSON array
    #[arg(long)]
    json: bool,

    /// Write annotated copies of analysed images here
    #[arg(long)]
    annotate: Option<PathBuf>,

    /// Box outline width in pixels for annotated images
    #[arg(long, default_value = "2")]
    line_width: u32,

    /// Images to analyse
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1) Parse CLI arguments + config
    let args = CliArgs::parse();
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    // 2) Load the recorded detector
    let detector = RecordedDetector::from_path(&args.detections)
        .with_context(|| format!("Failed to load detections {:?}", args.detections))?
        .with_postprocess(config.postprocess());
    let detector = Arc::new(detector);

    // 3) Select the captures
    let attachments: Vec<ImageAttachment> = args
        .images
        .iter()
        .map(|path| {
            let attachment = ImageAttachment::new(path);
            let location = detector.location(attachment.id());
            attachment.with_location(location)
        })
        .collect();

    let mut session = Session::new();
    session.subscribe(|event| log::debug!("{event:?}"));
    session.set_selection(attachments);

    // 4) Detect + analyse
    analyze_pending(&mut session, detector, config.workers()).await;

    // 5) Report
    let reports: Vec<Report> = session.attachments().iter().map(Report::from_attachment).collect();
    println!("{}", report::render(&reports, args.json)?);

    // 6) Annotate
    if let Some(out_dir) = &args.annotate {
        for attachment in session.attachments().iter().filter(|a| a.condition().is_some()) {
            match annotate::save_annotated(attachment.path(), attachment.analysis(), out_dir, args.line_width) {
                Ok(path) => log::info!("Wrote {:?}", path),
                Err(e) => log::warn!("{}: {e:#}", attachment.id()),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = CliArgs::try_parse_from([
            "palm-cli", "--detections", "rec.json", "--workers", "3", "--json", "a.jpg", "b.jpg",
        ])
        .unwrap();
        assert_eq!(args.workers, Some(3));
        assert!(args.json);
        assert_eq!(args.line_width, 2);
        assert_eq!(args.images.len(), 2);
    }

    #[test]
    fn images_are_required() {
        assert!(CliArgs::try_parse_from(["palm-cli", "--detections", "rec.json"]).is_err());
    }
}
