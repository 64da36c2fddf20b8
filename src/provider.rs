// This is free and unencumbered software released into the public domain.

//! The per-platform seam: everything the session controller needs from the
//! native capture stack, behind one trait.

use crate::error::CameraError;
use crate::events::HardwareEvent;
use crate::types::{
    CameraPosition, CaptureFlash, DisplayRatio, PixelSize, SurfaceRotation, VideoQuality,
    WhiteBalance, Zoom,
};
use bytes::Bytes;
use std::{path::PathBuf, sync::Arc, sync::mpsc::SyncSender};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Bgra8,
}

/// One decoded preview frame handed to the host's surface.
#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pixel_format: PixelFormat,
    pub timestamp_ns: u64,
}

impl Frame {
    pub fn new_rgb8(data: Bytes, width: u32, height: u32, stride: u32) -> Self {
        Self {
            data,
            width,
            height,
            stride,
            pixel_format: PixelFormat::Rgb8,
            timestamp_ns: 0,
        }
    }

    pub fn with_timestamp_ns(mut self, ts: u64) -> Self {
        self.timestamp_ns = ts;
        self
    }
}

pub type FrameSink = Arc<dyn Fn(Frame) + Send + Sync + 'static>;

/// The three bindable capture units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureUnitKind {
    Preview,
    Photo,
    Video,
}

/// Construction parameters for one capture unit. White balance rides along
/// because at least one platform fixes it at unit build time.
#[derive(Clone, Debug)]
pub struct UnitSpec {
    pub kind: CaptureUnitKind,
    pub ratio: DisplayRatio,
    /// Explicit still-capture resolution; `None` lets the ratio decide.
    pub resolution: Option<PixelSize>,
    pub rotation: Option<SurfaceRotation>,
    pub white_balance: WhiteBalance,
    pub capture_flash: CaptureFlash,
    pub video_quality: VideoQuality,
}

/// A full bind of a capture unit set against one camera selector.
#[derive(Clone, Debug)]
pub struct BindRequest {
    pub selector: CameraPosition,
    pub units: Vec<UnitSpec>,
    /// Swap the selector under an open recording session instead of tearing
    /// it down. Providers that cannot do this must fail with
    /// [`CameraError::Unsupported`] rather than corrupt the output.
    pub keep_recording: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct ZoomState {
    pub linear: f32,
    pub ratio: f32,
    pub min_ratio: f32,
    pub max_ratio: f32,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            linear: 0.0,
            ratio: 1.0,
            min_ratio: 1.0,
            max_ratio: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PhotoRequest {
    /// Bind-generation ticket echoed back in the completion event.
    pub ticket: u64,
    pub output: PathBuf,
    /// Deliver a raw buffer instead of writing the file directly; forced by
    /// square crop or in-pixel rotation correction.
    pub use_buffer: bool,
    /// Mirror horizontally (front camera).
    pub mirror: bool,
    pub flash: CaptureFlash,
}

#[derive(Clone, Debug)]
pub struct RecordRequest {
    pub ticket: u64,
    pub output: PathBuf,
    pub quality: VideoQuality,
    /// `-1` lets the hardware choose from the quality tier.
    pub max_video_bit_rate: i32,
    pub max_frame_rate: i32,
    pub max_audio_bit_rate: i32,
    pub audio: bool,
}

/// What the hardware produced for one photo request.
#[derive(Clone, Debug)]
pub enum PhotoPayload {
    /// Direct low-latency file write; orientation left to container/EXIF.
    File(PathBuf),
    /// Raw encoded image delivered in memory for the transform path.
    Buffer {
        data: Bytes,
        width: u32,
        height: u32,
        /// Rotation the pixels still need, in degrees clockwise.
        rotation_degrees: i32,
    },
}

/// Uniform surface over one platform's capture stack.
///
/// All methods are called from the session's owning thread only. Operations
/// that complete asynchronously (`take_picture`, `start_recording`,
/// `stop_recording`) report through the [`HardwareEvent`] channel handed to
/// [`connect`](Self::connect); implementations must never call back into the
/// session directly from their worker threads.
pub trait CameraProvider: Send {
    /// Install the completion channel. Called once before the first bind.
    fn connect(&mut self, events: SyncSender<HardwareEvent>);

    fn camera_count(&self) -> usize;

    /// Attach the requested unit set to the selected camera. The previous
    /// set is expected to be fully unbound already (the binder guarantees
    /// this). For `keep_recording` swaps the provider detaches and
    /// reattaches its own preview while the recording runs on; providers
    /// that cannot do this must reject the request before detaching
    /// anything, leaving the existing binding fully intact.
    fn bind(&mut self, request: &BindRequest) -> Result<(), CameraError>;

    fn unbind(&mut self, kind: CaptureUnitKind) -> Result<(), CameraError>;

    fn unbind_all(&mut self) -> Result<(), CameraError>;

    fn is_bound(&self, kind: CaptureUnitKind) -> bool;

    /// Supported still-capture sizes of the currently selected camera.
    fn supported_capture_sizes(&self) -> Vec<PixelSize>;

    /// Whether the currently selected camera has a flash unit.
    fn has_flash_unit(&self) -> bool;

    fn zoom_state(&self) -> ZoomState;

    fn apply_zoom(&mut self, zoom: Zoom) -> Result<(), CameraError>;

    fn enable_torch(&mut self, on: bool) -> Result<(), CameraError>;

    fn set_capture_flash(&mut self, flash: CaptureFlash);

    fn set_target_rotation(&mut self, rotation: SurfaceRotation);

    /// Focus and meter at a normalized preview point.
    fn focus_at(&mut self, x: f32, y: f32, meter_white_balance: bool)
    -> Result<(), CameraError>;

    /// Return focus and metering to continuous/auto mode.
    fn revert_to_continuous_focus(&mut self) -> Result<(), CameraError>;

    fn take_picture(&mut self, request: PhotoRequest) -> Result<(), CameraError>;

    fn start_recording(&mut self, request: RecordRequest) -> Result<(), CameraError>;

    fn stop_recording(&mut self) -> Result<(), CameraError>;

    fn set_frame_sink(&mut self, sink: FrameSink);
}
