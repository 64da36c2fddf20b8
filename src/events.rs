// This is free and unencumbered software released into the public domain.

use crate::error::CameraError;
use crate::provider::PhotoPayload;
use std::{path::PathBuf, sync::Arc};

/// Events delivered to the host's notification sink.
#[derive(Debug)]
pub enum CameraEvent {
    /// The capture pipeline is bound and the preview is live.
    Ready,
    Error {
        message: String,
        cause: Option<CameraError>,
    },
    PhotoCaptured {
        path: PathBuf,
    },
    /// Camera position was toggled.
    Toggled,
    /// All capture units were unbound and the hardware released.
    CameraClosed,
    VideoRecordingStarted,
    /// Recording was asked to stop; the file is not processed yet.
    VideoRecordingFinished,
    /// The recorded file is finalized and usable.
    VideoRecordingReady {
        path: PathBuf,
    },
    ConfirmScreenShown,
    ConfirmScreenDismissed,
}

pub type EventSink = Arc<dyn Fn(CameraEvent) + Send + Sync + 'static>;

/// Completions and timers arriving from provider worker threads.
///
/// These are never applied where they arrive: the owner thread drains them
/// through [`crate::CameraSession::process_events`], which is the single
/// place session state is mutated. Each carries the bind-generation ticket
/// stamped on the originating request so completions that outlive their
/// session generation (or the session itself) are discarded.
#[derive(Debug)]
pub enum HardwareEvent {
    PhotoDone {
        ticket: u64,
        result: Result<PhotoPayload, CameraError>,
    },
    RecordingStarted {
        ticket: u64,
    },
    RecordingFinalized {
        ticket: u64,
        result: Result<PathBuf, CameraError>,
    },
    /// The one-shot tap-to-focus timer elapsed without being cancelled.
    FocusTimerElapsed {
        ticket: u64,
    },
    /// Asynchronous provider fault outside any in-flight request.
    ProviderError {
        error: CameraError,
    },
}
