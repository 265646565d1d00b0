//! Camera Interface CLI
//!
//! Drives the synthetic camera through the full device lifecycle:
//! initialization, parameter configuration, one single-shot capture and a
//! continuous capture session that ends after a frame count, a capture
//! error, or Ctrl-C.

use camera_interface::{
    capture::{CameraDevice, FileConfig, SyntheticCamera},
    CameraError, FrameBuffer, Pixel,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use tracing::{debug, error, info, warn};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "camera-interface", version, about = "Synthetic camera lifecycle demo")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames to collect in continuous mode.
    #[arg(short = 'n', long)]
    frames: Option<u64>,

    /// Make the synthetic camera fail after this many frames.
    #[arg(long)]
    fail_after: Option<u64>,

    /// Bits per pixel (8 or 16).
    #[arg(long)]
    depth: Option<u8>,

    /// Port for the Prometheus endpoint (requires the `metrics` feature, 0 disables).
    #[arg(long)]
    metrics_port: Option<u16>,
}

/// Messages from callbacks and the signal handler to the main thread.
enum Event<P: Pixel> {
    Frame(FrameBuffer<P>),
    Error(CameraError),
    Interrupted,
}

/// How the continuous capture session ended.
enum Outcome {
    Completed,
    Interrupted,
    Failed(CameraError),
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Camera Interface v{}", camera_interface::VERSION);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match config.capture.bit_depth {
        16 => run::<u16>(&config),
        _ => run::<u8>(&config),
    };

    match result {
        Ok(Outcome::Completed) => info!("Done"),
        Ok(Outcome::Interrupted) => info!("Interrupted, capture stopped"),
        Ok(Outcome::Failed(e)) => {
            warn!("Continuous capture ended with an error: {}", e);
            std::process::exit(2);
        }
        Err(e) => {
            error!("Camera error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Reads the config file, if any, and applies command-line overrides.
fn load_config(args: &Args) -> Result<FileConfig, camera_interface::capture::ConfigError> {
    let mut config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    if let Some(frames) = args.frames {
        config.output.frame_count = frames;
    }
    if args.fail_after.is_some() {
        config.output.fail_after = args.fail_after;
    }
    if let Some(depth) = args.depth {
        config.capture.bit_depth = depth;
    }
    if let Some(port) = args.metrics_port {
        config.output.metrics_port = port;
    }

    config.capture.validate()?;
    Ok(config)
}

fn run<P: Pixel>(config: &FileConfig) -> Result<Outcome, CameraError> {
    let mut camera = SyntheticCamera::<P>::new(config.capture.clone());
    if let Some(frames) = config.output.fail_after {
        camera = camera.fail_after(frames);
    }
    let device = Arc::new(CameraDevice::new(camera));

    let (tx, rx) = mpsc::channel::<Event<P>>();
    let frame_tx = tx.clone();
    let error_tx = tx.clone();
    device.initialize(
        move |frame| {
            let _ = frame_tx.send(Event::Frame(frame));
        },
        move |err| {
            let _ = error_tx.send(Event::Error(err));
        },
    )?;

    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.send(Event::Interrupted);
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    device.set_gain(config.capture.gain)?;
    device.set_exposure(config.capture.exposure_s)?;
    device.set_rate(config.capture.frame_rate_hz)?;

    let still = device.capture_one()?;
    info!(
        width = still.width(),
        height = still.height(),
        captured_at = ?still.timestamp(),
        "Single-shot frame captured"
    );

    start_metrics(&device, config.output.metrics_port);

    if config.output.frame_count == 0 {
        return Ok(Outcome::Completed);
    }

    device.start_capture()?;
    info!(
        frames = config.output.frame_count,
        rate_hz = config.capture.frame_rate_hz,
        "Streaming frames..."
    );

    let mut received = 0u64;
    let outcome = loop {
        match rx.recv() {
            Ok(Event::Frame(frame)) => {
                received += 1;
                debug!(
                    frame = received,
                    first_pixel = ?frame.data().first(),
                    "Frame received"
                );
                if received >= config.output.frame_count {
                    break Outcome::Completed;
                }
            }
            Ok(Event::Error(e)) => break Outcome::Failed(e),
            Ok(Event::Interrupted) | Err(_) => break Outcome::Interrupted,
        }
    };

    device.stop_capture()?;

    let stats = device.stats();
    info!(
        received,
        delivered = stats.frames_delivered(),
        errors = stats.capture_errors(),
        "Capture session finished"
    );

    Ok(outcome)
}

#[cfg(feature = "metrics")]
fn start_metrics<P: Pixel>(device: &Arc<CameraDevice<SyntheticCamera<P>>>, port: u16) {
    use camera_interface::metrics::{
        MetricsRegistry, MetricsServer, MetricsServerConfig, MetricsSnapshot, SnapshotSource,
    };

    if port == 0 {
        return;
    }
    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            return;
        }
    };

    let device = Arc::clone(device);
    let source: SnapshotSource = Arc::new(move || MetricsSnapshot::from_device(&device));
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry, source);

    let spawned = std::thread::Builder::new()
        .name("metrics".to_owned())
        .spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("Failed to start metrics runtime: {}", e);
                    return;
                }
            };
            if let Err(e) = runtime.block_on(server.run_until(std::future::pending())) {
                warn!("Metrics server stopped: {}", e);
            }
        });
    if let Err(e) = spawned {
        warn!("Failed to spawn metrics thread: {}", e);
    }
}

#[cfg(not(feature = "metrics"))]
fn start_metrics<P: Pixel>(_device: &Arc<CameraDevice<SyntheticCamera<P>>>, port: u16) {
    if port != 0 {
        debug!("Built without the `metrics` feature; not serving metrics");
    }
}
