// This is free and unencumbered software released into the public domain.

//! Desktop capture CLI over the ffmpeg provider: run a preview session,
//! take a still, or record a clip, printing session events as JSON lines
//! on stdout.

use camera_view::{
    CameraEvent, CameraMode, CameraSession, EventSink, SessionConfig,
    drivers::ffmpeg::{FfmpegConfig, FfmpegProvider},
};
use clap::Parser;
use serde_json::json;
use std::{
    error::Error as StdError,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

#[derive(Debug, Parser)]
#[command(name = "camera-view-capture", version, about)]
struct Options {
    /// Capture device, repeatable (first is rear-equivalent, second front).
    #[arg(long, default_value = "0")]
    device: Vec<String>,

    #[arg(short, long = "size", value_parser = parse_dimensions, default_value = "640x480")]
    size: (u32, u32),

    #[arg(short, long, default_value_t = 30)]
    framerate: u32,

    /// Directory captured files are written to.
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Take one still and exit.
    #[arg(long, conflicts_with = "record")]
    photo: bool,

    /// Record a clip of this many seconds and exit.
    #[arg(long, value_name = "SECONDS")]
    record: Option<u64>,

    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let w: u32 = w.parse().map_err(|_| format!("invalid width {w:?}"))?;
    let h: u32 = h.parse().map_err(|_| format!("invalid height {h:?}"))?;
    if w == 0 || h == 0 {
        return Err("dimensions must be nonzero".into());
    }
    Ok((w, h))
}

fn print_event(event: &CameraEvent) {
    let line = match event {
        CameraEvent::Ready => json!({"event": "ready"}),
        CameraEvent::Error { message, cause } => json!({
            "event": "error",
            "message": message,
            "cause": cause.as_ref().map(|c| c.to_string()),
        }),
        CameraEvent::PhotoCaptured { path } => {
            json!({"event": "photoCaptured", "path": path.display().to_string()})
        },
        CameraEvent::Toggled => json!({"event": "toggled"}),
        CameraEvent::CameraClosed => json!({"event": "cameraClosed"}),
        CameraEvent::VideoRecordingStarted => json!({"event": "videoRecordingStarted"}),
        CameraEvent::VideoRecordingFinished => json!({"event": "videoRecordingFinished"}),
        CameraEvent::VideoRecordingReady { path } => {
            json!({"event": "videoRecordingReady", "path": path.display().to_string()})
        },
        CameraEvent::ConfirmScreenShown => json!({"event": "confirmScreenShown"}),
        CameraEvent::ConfirmScreenDismissed => json!({"event": "confirmScreenDismissed"}),
    };
    println!("{line}");
}

fn main() -> Result<(), Box<dyn StdError>> {
    let options = Options::parse();

    let default_filter = match options.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        ctrlc::set_handler(move || interrupted.store(true, Ordering::Relaxed))?;
    }

    let provider = FfmpegProvider::new(FfmpegConfig {
        devices: options.device.clone(),
        width: options.size.0,
        height: options.size.1,
        framerate: options.framerate,
        diagnostics: options.verbose > 1,
    });

    let (event_tx, event_rx) = mpsc::channel();
    let sink: EventSink = Arc::new(move |event| {
        let _ = event_tx.send(event);
    });

    let mut session = CameraSession::new(Box::new(provider), SessionConfig::new(&options.out), sink);

    session.start_preview();
    drain(&event_rx);

    if options.photo {
        // let the pipe deliver at least one frame before asking for a still
        std::thread::sleep(Duration::from_millis(500));
        session.take_picture(None);
        run_until(&mut session, &event_rx, &interrupted, None, |event| {
            matches!(
                event,
                CameraEvent::PhotoCaptured { .. } | CameraEvent::Error { .. }
            )
        });
    } else if let Some(seconds) = options.record {
        session.set_mode(CameraMode::Video);
        drain(&event_rx);
        session.record(None);

        let deadline = Instant::now() + Duration::from_secs(seconds);
        run_until(&mut session, &event_rx, &interrupted, Some(deadline), |_| false);

        session.stop();
        run_until(&mut session, &event_rx, &interrupted, None, |event| {
            matches!(
                event,
                CameraEvent::VideoRecordingReady { .. } | CameraEvent::Error { .. }
            )
        });
    } else {
        run_until(&mut session, &event_rx, &interrupted, None, |_| false);
    }

    session.release();
    drain(&event_rx);
    Ok(())
}

fn drain(rx: &mpsc::Receiver<CameraEvent>) {
    while let Ok(event) = rx.try_recv() {
        print_event(&event);
    }
}

/// Pump hardware completions and print events until the predicate matches,
/// the deadline passes, or Ctrl-C.
fn run_until(
    session: &mut CameraSession,
    rx: &mpsc::Receiver<CameraEvent>,
    interrupted: &AtomicBool,
    deadline: Option<Instant>,
    until: impl Fn(&CameraEvent) -> bool,
) {
    loop {
        if interrupted.load(Ordering::Relaxed) {
            return;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return;
        }

        session.process_events_timeout(Duration::from_millis(100));
        while let Ok(event) = rx.try_recv() {
            let done = until(&event);
            print_event(&event);
            if done {
                return;
            }
        }
    }
}
