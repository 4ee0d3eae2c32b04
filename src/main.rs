use clap::Parser;
use screwvision_live::{
    controller::live_overlay, AppError, ConfidenceTier, DetectionController, FileFrameSource, HttpDetector,
    ScreenRect, Settings, Viewport,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Runs the screw detector against a folder of frames.
#[derive(Parser, Debug)]
#[command(name = "screwvision-live", version)]
struct Args {
    /// Settings file (TOML). Defaults to ./screwvision.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Detector address, e.g. 192.168.1.20 or http://host:8000.
    #[arg(long, env = "SCREWVISION_ENDPOINT")]
    endpoint: Option<String>,

    /// Image file or directory of images replayed as camera frames.
    #[arg(long)]
    frames: PathBuf,

    /// Screen size the overlay is laid out for.
    #[arg(long, default_value = "375x812", value_parser = parse_screen)]
    screen: Viewport,

    /// How long to keep the live session running.
    #[arg(long, default_value_t = 10)]
    duration_secs: u64,

    /// Take a single picture instead of running live detection.
    #[arg(long)]
    still: bool,
}

fn parse_screen(value: &str) -> Result<Viewport, String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("{value} is not WIDTHxHEIGHT"))?;
    let width: f32 = width.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: f32 = height.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("{value} must be positive"));
    }
    Ok(Viewport::new(width, height))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn log_rects(kind: &str, rects: &[ScreenRect]) {
    info!("{} overlay: {} boxes", kind, rects.len());
    for rect in rects {
        info!(
            "  {} {:.0}% ({:?}) at ({:.1}, {:.1}) {:.1}x{:.1}{}",
            rect.class.label(),
            rect.confidence * 100.0,
            ConfidenceTier::from_confidence(rect.confidence),
            rect.x1,
            rect.y1,
            rect.width(),
            rect.height(),
            if rect.narrow { " [centered label]" } else { "" }
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        settings.endpoint.base_url = endpoint;
    }
    let detector = Arc::new(HttpDetector::from_settings(&settings.endpoint)?);
    match detector.health().await {
        Ok(report) if report.is_healthy() => {
            info!("Detector at {} is ready: {:?}", detector.base_url(), report.classes)
        }
        Ok(report) => warn!("Detector at {} reports {}", detector.base_url(), report.status),
        Err(e) => warn!("Detector at {} is not reachable: {}", detector.base_url(), e),
    }

    let frames = Arc::new(FileFrameSource::new(&args.frames)?);
    let live_label_width = settings.live.narrow_label_width;
    let mut controller = DetectionController::builder(settings)
        .frames(frames)
        .detector(detector)
        .build()?;

    if args.still {
        let result = controller.take_picture().await?;
        match result.summary() {
            Some(summary) => info!(
                "Still capture {}x{}: {} detections, {}% mean confidence",
                result.image_size.width,
                result.image_size.height,
                summary.count,
                summary.percent()
            ),
            None => info!(
                "Still capture {}x{}: nothing found",
                result.image_size.width, result.image_size.height
            ),
        }
        log_rects("Result", &controller.result_overlay(args.screen));
        return Ok(());
    }

    controller.open_camera();
    let mut live = controller.subscribe_live();
    let deadline = tokio::time::sleep(Duration::from_secs(args.duration_secs));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            changed = live.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = live.borrow_and_update().clone();
                log_rects("Live", &live_overlay(&snapshot, args.screen, live_label_width));
            }
        }
    }

    controller.close_camera();
    Ok(())
}
