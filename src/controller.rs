// This is free and unencumbered software released into the public domain.

//! The camera session controller: the state machine that owns the hardware
//! resource, drives the capture pipeline binder, and marshals hardware
//! completions back onto the owning thread.

use crate::binder::CaptureBinder;
use crate::capability::Capabilities;
use crate::error::CameraError;
use crate::events::{CameraEvent, EventSink, HardwareEvent};
use crate::focus::FocusTimer;
use crate::options::{
    PhotoOptions, ResolvedVideoOptions, SessionDefaults, VideoOptions,
};
use crate::photo::{self, PendingCapture, PendingCaptureOptions};
use crate::provider::{
    BindRequest, CameraProvider, CaptureUnitKind, FrameSink, PhotoPayload, PhotoRequest,
    RecordRequest, UnitSpec,
};
use crate::types::{
    CameraMode, CameraPosition, DisplayRatio, FlashMode, Orientation, WhiteBalance, Zoom,
};
use crate::video::{self, GalleryStore, RecordingState, RotationLatch, RotationLock};
use std::{
    path::PathBuf,
    sync::{
        Arc,
        mpsc::{Receiver, SyncSender, sync_channel},
    },
    time::Duration,
};
use tracing::debug;

const HARDWARE_EVENT_CAPACITY: usize = 32;
const AUTO_FOCUS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unbound,
    Binding,
    Bound(BoundActivity),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundActivity {
    Idle,
    Capturing,
    Recording,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Directory captured files are written to.
    pub files_dir: PathBuf,
    /// When false (the default), orientation is baked into pixels through
    /// the in-memory finishing path instead of being left to EXIF.
    pub allow_exif_rotation: bool,
    pub enable_audio: bool,
    pub should_lock_rotation: bool,
    pub auto_focus_timeout: Duration,
    pub defaults: SessionDefaults,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            files_dir: std::env::temp_dir(),
            allow_exif_rotation: false,
            enable_audio: true,
            should_lock_rotation: true,
            auto_focus_timeout: AUTO_FOCUS_TIMEOUT,
            defaults: SessionDefaults::default(),
        }
    }
}

impl SessionConfig {
    pub fn new(files_dir: impl Into<PathBuf>) -> Self {
        Self {
            files_dir: files_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_allow_exif_rotation(mut self, allow: bool) -> Self {
        self.allow_exif_rotation = allow;
        self
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.enable_audio = enabled;
        self
    }

    pub fn with_rotation_locking(mut self, enabled: bool) -> Self {
        self.should_lock_rotation = enabled;
        self
    }

    pub fn with_auto_focus_timeout(mut self, timeout: Duration) -> Self {
        self.auto_focus_timeout = timeout;
        self
    }

    pub fn with_defaults(mut self, defaults: SessionDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

/// One camera session per live view instance. All methods must be called
/// from the owning thread; hardware completions are applied only through
/// [`process_events`](Self::process_events).
pub struct CameraSession {
    binder: CaptureBinder,
    capabilities: Capabilities,
    config: SessionConfig,
    sink: EventSink,
    hw_tx: SyncSender<HardwareEvent>,
    hw_rx: Receiver<HardwareEvent>,

    state: SessionState,
    position: CameraPosition,
    mode: CameraMode,
    flash_mode: FlashMode,
    white_balance: WhiteBalance,
    rotation: Orientation,
    ratio_override: Option<DisplayRatio>,

    pending_zoom: Option<Zoom>,
    pending: PendingCaptureOptions,
    pending_confirmation: Option<PendingCapture>,
    focus_timer: Option<FocusTimer>,

    recording: RecordingState,
    recording_ticket: Option<u64>,
    recording_output: Option<PathBuf>,
    recording_opts: Option<ResolvedVideoOptions>,
    rotation_latch: RotationLatch,

    gallery: Option<Arc<dyn GalleryStore>>,
    released: bool,
}

impl CameraSession {
    pub fn new(mut provider: Box<dyn CameraProvider>, config: SessionConfig, sink: EventSink) -> Self {
        let (hw_tx, hw_rx) = sync_channel(HARDWARE_EVENT_CAPACITY);
        provider.connect(hw_tx.clone());

        Self {
            binder: CaptureBinder::new(provider),
            capabilities: Capabilities::new(),
            config,
            sink,
            hw_tx,
            hw_rx,
            state: SessionState::Unbound,
            position: CameraPosition::Rear,
            mode: CameraMode::Photo,
            flash_mode: FlashMode::Off,
            white_balance: WhiteBalance::Auto,
            rotation: Orientation::Unknown,
            ratio_override: None,
            pending_zoom: None,
            pending: PendingCaptureOptions::default(),
            pending_confirmation: None,
            focus_timer: None,
            recording: RecordingState::Idle,
            recording_ticket: None,
            recording_output: None,
            recording_opts: None,
            rotation_latch: RotationLatch::default(),
            gallery: None,
            released: false,
        }
    }

    pub fn with_gallery(mut self, gallery: Arc<dyn GalleryStore>) -> Self {
        self.gallery = Some(gallery);
        self
    }

    pub fn with_rotation_lock(mut self, lock: Arc<dyn RotationLock>) -> Self {
        self.rotation_latch = RotationLatch::new(Some(lock));
        self
    }

    // ---- queries ------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, SessionState::Bound(_))
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.recording, RecordingState::Recording | RecordingState::Stopping)
    }

    pub fn position(&self) -> CameraPosition {
        self.position
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn white_balance(&self) -> WhiteBalance {
        self.white_balance
    }

    pub fn get_flash_mode(&self) -> FlashMode {
        self.flash_mode
    }

    pub fn display_ratio(&self) -> DisplayRatio {
        self.ratio_override.unwrap_or_else(|| self.mode.default_ratio())
    }

    /// Must be queried after the ready event; defined to be 0 beforehand.
    pub fn number_of_cameras(&self) -> usize {
        self.capabilities.camera_count()
    }

    /// Flash availability of the currently selected camera. Re-evaluated on
    /// every position toggle because the cache is rebuilt per bind.
    pub fn has_flash(&self) -> bool {
        self.capabilities.has_flash()
    }

    pub fn has_torch(&self) -> bool {
        self.capabilities.has_torch()
    }

    /// `"WxH"` strings for the ratio bucket, largest first.
    pub fn get_available_picture_sizes(&self, ratio: &str) -> Vec<String> {
        self.capabilities.available_picture_sizes(ratio)
    }

    pub fn zoom(&self) -> f32 {
        if self.is_bound() {
            self.binder.provider().zoom_state().linear
        } else {
            match self.pending_zoom {
                Some(Zoom::Linear(v)) => v,
                _ => 0.0,
            }
        }
    }

    pub fn zoom_ratio(&self) -> f32 {
        if self.is_bound() {
            self.binder.provider().zoom_state().ratio
        } else {
            match self.pending_zoom {
                Some(Zoom::Ratio(v)) => v,
                _ => 1.0,
            }
        }
    }

    /// How many photo captures are in flight.
    pub fn pending_captures(&self) -> usize {
        self.pending.len()
    }

    // ---- events -------------------------------------------------------

    fn emit(&self, event: CameraEvent) {
        (self.sink)(event);
    }

    fn emit_error(&self, message: impl Into<String>, cause: Option<CameraError>) {
        self.emit(CameraEvent::Error {
            message: message.into(),
            cause,
        });
    }

    /// Drain and apply every hardware completion currently queued. Must be
    /// called from the owning thread; this is the only place background
    /// completions touch session state.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.hw_rx.try_recv() {
            self.handle_hardware_event(event);
            handled += 1;
        }
        handled
    }

    /// Like [`process_events`](Self::process_events), but blocks up to
    /// `timeout` for the first completion.
    pub fn process_events_timeout(&mut self, timeout: Duration) -> usize {
        match self.hw_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_hardware_event(event);
                1 + self.process_events()
            },
            Err(_) => 0,
        }
    }

    // ---- binding ------------------------------------------------------

    fn unit_specs(&self) -> Vec<UnitSpec> {
        let ratio = self.display_ratio();
        let base = UnitSpec {
            kind: CaptureUnitKind::Preview,
            ratio,
            resolution: None,
            rotation: self.rotation.surface_rotation(),
            white_balance: self.white_balance,
            capture_flash: self.flash_mode.capture_setting(),
            video_quality: self.config.defaults.video_quality,
        };

        let mut units = vec![base.clone()];
        match self.mode {
            CameraMode::Photo => units.push(UnitSpec {
                kind: CaptureUnitKind::Photo,
                resolution: self.capabilities.largest_for_ratio(ratio.as_str()),
                ..base
            }),
            CameraMode::Video => units.push(UnitSpec {
                kind: CaptureUnitKind::Video,
                ..base
            }),
        }
        units
    }

    /// Full serialized unbind + bind cycle for the current state. On success
    /// the capability cache is rebuilt and any buffered zoom applied.
    fn bind_pipeline(&mut self) {
        // stale timers must never outlive the binding they were armed under
        self.focus_timer = None;
        self.state = SessionState::Binding;

        let request = BindRequest {
            selector: self.position,
            units: self.unit_specs(),
            keep_recording: false,
        };

        match self.binder.rebind(&request) {
            Ok(generation) => {
                self.after_bind(generation);
                self.state = SessionState::Bound(BoundActivity::Idle);
                self.emit(CameraEvent::Ready);
            },
            Err(err) => {
                self.binder.unbind_all();
                self.capabilities.invalidate();
                self.state = SessionState::Unbound;
                self.emit_error("failed to bind capture pipeline", Some(err));
            },
        }
    }

    fn after_bind(&mut self, generation: u64) {
        let provider = self.binder.provider();
        let count = provider.camera_count();
        let has_flash = provider.has_flash_unit();
        let sizes = provider.supported_capture_sizes();
        self.capabilities.rebuild(generation, count, has_flash, &sizes);

        if let Some(zoom) = self.pending_zoom.take() {
            if let Err(err) = self.binder.provider_mut().apply_zoom(zoom) {
                self.emit_error("failed to apply buffered zoom", Some(err));
            }
        }

        if self.flash_mode == FlashMode::Torch && self.capabilities.has_flash() {
            if let Err(err) = self.binder.provider_mut().enable_torch(true) {
                self.emit_error("failed to enable torch", Some(err));
            }
        }
    }

    /// Unbind everything and reset transient per-bind state. Pending zoom,
    /// the focus timer, the capability cache, and queued capture snapshots
    /// never survive an unbind: unbinding cancels any in-flight capture, so
    /// keeping its queue entry would pair a later completion with the wrong
    /// snapshot.
    fn teardown(&mut self) {
        self.focus_timer = None;
        self.pending_zoom = None;
        self.capabilities.invalidate();
        while let Some(cancelled) = self.pending.pop() {
            let _ = std::fs::remove_file(&cancelled.output);
        }
        let was_bound = self.binder.unbind_all();
        self.state = SessionState::Unbound;
        if was_bound {
            self.emit(CameraEvent::CameraClosed);
        }
    }

    /// Bind the capture pipeline and start the preview. No-op when already
    /// bound.
    pub fn start_preview(&mut self) {
        if self.released {
            self.emit_error("session released", Some(CameraError::Released));
            return;
        }
        if self.is_bound() {
            return;
        }
        self.bind_pipeline();
    }

    /// Unbind all capture units and release the hardware.
    pub fn stop_preview(&mut self) {
        if self.is_recording() {
            self.stop();
        }
        if self.is_bound() {
            self.teardown();
        }
    }

    // ---- mode / position / parameters --------------------------------

    /// Switch between photo and video capture. Rejected during an active
    /// recording; applied with a full rebind when idle.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.is_recording() {
            self.emit_error(
                "cannot change mode while recording",
                Some(CameraError::capture("recording in progress")),
            );
            return;
        }
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.ratio_override = None;
        if self.state == SessionState::Bound(BoundActivity::Idle) {
            self.teardown();
            self.bind_pipeline();
        }
    }

    pub fn toggle_position(&mut self) {
        self.set_position(self.position.toggled());
    }

    pub fn set_position(&mut self, position: CameraPosition) {
        if position == self.position {
            return;
        }

        if !self.is_recording() {
            self.position = position;
            if self.is_bound() {
                self.teardown();
                self.bind_pipeline();
            }
            self.emit(CameraEvent::Toggled);
            return;
        }

        // Swap the selector under the open recording: only the preview is
        // rebound, the video unit's recording session stays live.
        self.focus_timer = None;
        let previous = self.position;
        self.position = position;

        let request = BindRequest {
            selector: self.position,
            units: self.unit_specs(),
            keep_recording: true,
        };

        match self.binder.swap_selector_recording(&request) {
            Ok(generation) => {
                self.after_bind(generation);
                self.emit(CameraEvent::Toggled);
            },
            Err(err) => {
                // Hard error by contract: the swap is rejected before any
                // unit is detached, so the recording and the preview both
                // continue on the previous selector untouched.
                self.position = previous;
                self.emit_error("cannot switch camera while recording", Some(err));
            },
        }
    }

    pub fn set_zoom(&mut self, value: f32) {
        self.apply_or_buffer_zoom(Zoom::linear(value));
    }

    pub fn set_zoom_ratio(&mut self, value: f32) {
        self.apply_or_buffer_zoom(Zoom::Ratio(value));
    }

    fn apply_or_buffer_zoom(&mut self, zoom: Zoom) {
        if self.is_bound() {
            self.pending_zoom = None;
            if let Err(err) = self.binder.provider_mut().apply_zoom(zoom) {
                self.emit_error("failed to apply zoom", Some(err));
            }
        } else {
            // writing either representation clears the other's pending value
            self.pending_zoom = Some(zoom);
        }
    }

    pub fn set_flash_mode(&mut self, mode: FlashMode) {
        self.flash_mode = mode;
        if !self.is_bound() {
            return;
        }

        let has_flash = self.capabilities.has_flash();
        let provider = self.binder.provider_mut();
        let result = match mode {
            FlashMode::Off => {
                let result = provider.enable_torch(false);
                provider.set_capture_flash(mode.capture_setting());
                result
            },
            FlashMode::Torch => {
                if has_flash {
                    provider.enable_torch(true)
                } else {
                    Ok(())
                }
            },
            FlashMode::On | FlashMode::RedEye | FlashMode::Auto => {
                provider.set_capture_flash(mode.capture_setting());
                Ok(())
            },
        };
        if let Err(err) = result {
            self.emit_error("failed to apply flash mode", Some(err));
        }
    }

    pub fn toggle_flash(&mut self) {
        self.set_flash_mode(self.flash_mode.cycled());
    }

    /// White balance is fixed at capture-unit construction time, so applying
    /// it while idle rebuilds the whole pipeline. Ignored while recording.
    pub fn set_white_balance(&mut self, wb: WhiteBalance) {
        if self.is_recording() {
            return;
        }
        if self.white_balance == wb {
            return;
        }
        self.white_balance = wb;
        if self.state == SessionState::Bound(BoundActivity::Idle) {
            self.teardown();
            self.bind_pipeline();
        }
    }

    /// Override the display ratio; takes effect on the next bind.
    pub fn set_display_ratio(&mut self, ratio: &str) {
        if let Some(parsed) = DisplayRatio::parse(ratio) {
            self.ratio_override = Some(parsed);
        }
    }

    /// Device orientation hint from the host's sensor.
    pub fn set_rotation(&mut self, rotation: Orientation) {
        self.rotation = rotation;
        if let (true, Some(surface)) = (self.is_bound(), rotation.surface_rotation()) {
            self.binder.provider_mut().set_target_rotation(surface);
        }
    }

    pub fn set_frame_sink(&mut self, sink: FrameSink) {
        self.binder.provider_mut().set_frame_sink(sink);
    }

    // ---- focus --------------------------------------------------------

    /// Tap-to-focus at a normalized preview point. Arms (or re-arms) the
    /// one-shot revert timer.
    pub fn tap_to_focus(&mut self, x: f32, y: f32) {
        if !self.is_bound() {
            return;
        }

        let meter_wb = self.white_balance == WhiteBalance::Auto;
        if let Err(err) = self.binder.provider_mut().focus_at(x, y, meter_wb) {
            self.emit_error("cannot access camera for focus", Some(err));
            return;
        }

        // assignment drops (cancels and joins) any previous timer
        self.focus_timer = Some(FocusTimer::arm(
            self.config.auto_focus_timeout,
            self.binder.generation(),
            self.hw_tx.clone(),
        ));
    }

    // ---- photo capture ------------------------------------------------

    /// Request a still capture. Valid only in photo mode; completes
    /// asynchronously with a `PhotoCaptured` event (or the confirm flow).
    pub fn take_picture(&mut self, options: Option<PhotoOptions>) {
        if self.released {
            self.emit_error("session released", Some(CameraError::Released));
            return;
        }
        if self.mode != CameraMode::Photo {
            self.emit_error(
                "takePicture is only valid in photo mode",
                Some(CameraError::capture("session is in video mode")),
            );
            return;
        }
        if !self.is_bound() {
            self.emit_error(
                "cannot take photo before the camera is ready",
                Some(CameraError::bind("camera not bound")),
            );
            return;
        }

        let resolved = options.unwrap_or_default().resolve(&self.config.defaults);
        let output = self.config.files_dir.join(photo::photo_file_name(chrono::Local::now()));
        let ticket = self.binder.generation();
        let mirror = self.position == CameraPosition::Front;
        let use_buffer = resolved.auto_square_crop || !self.config.allow_exif_rotation;

        // the video unit never stays attached across a still capture
        if let Err(err) = self.binder.unbind_unit(CaptureUnitKind::Video) {
            debug!(%err, "could not detach video unit before capture");
        }

        self.pending.push(PendingCapture {
            ticket,
            output: output.clone(),
            mirror,
            options: resolved,
        });

        let request = PhotoRequest {
            ticket,
            output,
            use_buffer,
            mirror,
            flash: self.flash_mode.capture_setting(),
        };

        self.state = SessionState::Bound(BoundActivity::Capturing);
        if let Err(err) = self.binder.provider_mut().take_picture(request) {
            self.pending.pop_back();
            self.state = SessionState::Bound(BoundActivity::Idle);
            self.emit_error("failed to start photo capture", Some(err));
        }
    }

    /// Host decision for the photo confirmation screen: `true` keeps the
    /// capture, `false` discards it without a captured event.
    pub fn confirm_pending_photo(&mut self, save: bool) {
        let Some(capture) = self.pending_confirmation.take() else {
            return;
        };
        self.emit(CameraEvent::ConfirmScreenDismissed);
        if save {
            self.finalize_photo(capture);
        } else {
            let _ = std::fs::remove_file(&capture.output);
        }
    }

    fn finalize_photo(&mut self, capture: PendingCapture) {
        if capture.options.save_to_gallery {
            if let Some(gallery) = &self.gallery {
                if let Err(err) = gallery.persist(&capture.output) {
                    // best effort: reported separately, never suppresses the
                    // captured event
                    self.emit_error("failed to save photo to gallery", Some(CameraError::Persistence(err)));
                }
            }
        }
        self.emit(CameraEvent::PhotoCaptured {
            path: capture.output,
        });
    }

    fn handle_photo_done(&mut self, ticket: u64, result: Result<PhotoPayload, CameraError>) {
        let entry = self.pending.pop();

        if self.state == SessionState::Bound(BoundActivity::Capturing) {
            self.state = SessionState::Bound(BoundActivity::Idle);
        }

        let Some(capture) = entry else {
            debug!(ticket, "photo completion with no pending entry, discarding");
            return;
        };

        // completions from a released session or an older bind generation
        // are discarded, file and all
        if self.released || ticket != self.binder.generation() || capture.ticket != ticket {
            let _ = std::fs::remove_file(&capture.output);
            debug!(ticket, "discarding stale photo completion");
            return;
        }

        match result {
            Err(err) => {
                self.emit_error("failed to take photo", Some(err));
            },
            Ok(PhotoPayload::File(path)) => {
                let capture = PendingCapture {
                    output: path,
                    ..capture
                };
                self.route_finished_photo(capture);
            },
            Ok(PhotoPayload::Buffer {
                data,
                rotation_degrees,
                ..
            }) => {
                if let Err(err) = photo::finish_buffer(
                    &data,
                    rotation_degrees,
                    capture.mirror,
                    &capture.options,
                    &capture.output,
                ) {
                    self.emit_error("failed to process photo", Some(err));
                    return;
                }
                self.route_finished_photo(capture);
            },
        }
    }

    fn route_finished_photo(&mut self, capture: PendingCapture) {
        if capture.options.confirm_photos {
            self.pending_confirmation = Some(capture);
            self.emit(CameraEvent::ConfirmScreenShown);
        } else {
            self.finalize_photo(capture);
        }
    }

    // ---- video recording ----------------------------------------------

    /// Start recording. Valid only in video mode and when not already
    /// recording; completes asynchronously via recording events.
    pub fn record(&mut self, options: Option<VideoOptions>) {
        if self.released {
            self.emit_error("session released", Some(CameraError::Released));
            return;
        }
        if self.mode != CameraMode::Video {
            self.emit_error(
                "record is only valid in video mode",
                Some(CameraError::capture("session is in photo mode")),
            );
            return;
        }
        if self.recording != RecordingState::Idle {
            self.emit_error(
                "already recording",
                Some(CameraError::capture("recording in progress")),
            );
            return;
        }
        if !self.is_bound() {
            self.emit_error(
                "cannot record before the camera is ready",
                Some(CameraError::bind("camera not bound")),
            );
            return;
        }

        let resolved = options.unwrap_or_default().resolve(&self.config.defaults);
        let output = self.config.files_dir.join(video::video_file_name(chrono::Local::now()));

        if self.config.should_lock_rotation {
            self.rotation_latch.engage();
        }

        let ticket = self.binder.generation();
        let request = RecordRequest {
            ticket,
            output: output.clone(),
            quality: resolved.video_quality,
            max_video_bit_rate: resolved.max_video_bit_rate,
            max_frame_rate: resolved.max_frame_rate,
            max_audio_bit_rate: resolved.max_audio_bit_rate,
            audio: self.config.enable_audio,
        };

        self.recording = RecordingState::Starting;
        self.recording_ticket = Some(ticket);
        self.recording_output = Some(output);
        self.recording_opts = Some(resolved);

        if let Err(err) = self.binder.provider_mut().start_recording(request) {
            self.recording = RecordingState::Idle;
            self.recording_ticket = None;
            self.recording_output = None;
            self.recording_opts = None;
            self.rotation_latch.release();
            self.emit_error("failed to start recording", Some(err));
        }
    }

    /// Stop the active recording. No-op when not recording.
    pub fn stop(&mut self) {
        if self.recording != RecordingState::Recording {
            return;
        }
        self.recording = RecordingState::Stopping;

        if self.flash_mode == FlashMode::On && self.capabilities.has_flash() {
            let _ = self.binder.provider_mut().enable_torch(false);
        }

        if let Err(err) = self.binder.provider_mut().stop_recording() {
            self.emit_error("failed to stop recording", Some(err));
        }
        self.emit(CameraEvent::VideoRecordingFinished);
    }

    fn handle_recording_started(&mut self, ticket: u64) {
        if self.released || self.recording_ticket != Some(ticket) {
            debug!(ticket, "discarding stale recording-start");
            return;
        }
        self.recording = RecordingState::Recording;
        self.state = SessionState::Bound(BoundActivity::Recording);

        // with flash mode On the torch runs for the recording's duration
        if self.flash_mode == FlashMode::On && self.capabilities.has_flash() {
            let _ = self.binder.provider_mut().enable_torch(true);
        }

        self.emit(CameraEvent::VideoRecordingStarted);
    }

    fn handle_recording_finalized(&mut self, ticket: u64, result: Result<PathBuf, CameraError>) {
        if self.recording_ticket != Some(ticket) {
            if let Ok(path) = result {
                let _ = std::fs::remove_file(path);
            }
            debug!(ticket, "discarding stale recording finalize");
            return;
        }

        self.recording = RecordingState::Idle;
        self.recording_ticket = None;
        let output = self.recording_output.take();
        let opts = self.recording_opts.take();
        self.rotation_latch.release();

        if self.released {
            if let Some(path) = output {
                let _ = std::fs::remove_file(path);
            }
            return;
        }

        // every finalize leaves the pipeline in a recoverable idle state
        if self.is_bound() {
            self.state = SessionState::Bound(BoundActivity::Idle);
        }

        match result {
            Err(err) => {
                if let Some(path) = output {
                    let _ = std::fs::remove_file(path);
                }
                self.emit_error("recording failed", Some(err));
            },
            Ok(path) => {
                if opts.is_some_and(|o| o.save_to_gallery) {
                    if let Some(gallery) = &self.gallery {
                        if let Err(err) = gallery.persist(&path) {
                            self.emit_error(
                                "failed to save video to gallery",
                                Some(CameraError::Persistence(err)),
                            );
                        }
                    }
                }
                self.emit(CameraEvent::VideoRecordingReady { path });
            },
        }
    }

    // ---- hardware event dispatch --------------------------------------

    fn handle_hardware_event(&mut self, event: HardwareEvent) {
        match event {
            HardwareEvent::PhotoDone { ticket, result } => self.handle_photo_done(ticket, result),
            HardwareEvent::RecordingStarted { ticket } => self.handle_recording_started(ticket),
            HardwareEvent::RecordingFinalized { ticket, result } => {
                self.handle_recording_finalized(ticket, result)
            },
            HardwareEvent::FocusTimerElapsed { ticket } => self.handle_focus_elapsed(ticket),
            HardwareEvent::ProviderError { error } => {
                // binding faults are non-fatal to the controller: report and
                // fall back to a well-defined unbound state
                self.teardown();
                self.emit_error("camera provider fault", Some(error));
            },
        }
    }

    fn handle_focus_elapsed(&mut self, ticket: u64) {
        if self.released || !self.is_bound() || ticket != self.binder.generation() {
            return;
        }
        self.focus_timer = None;
        if let Err(err) = self.binder.provider_mut().revert_to_continuous_focus() {
            self.emit_error("failed to restore continuous focus", Some(err));
        }
    }

    // ---- teardown -----------------------------------------------------

    /// Force the session to `Unbound` from any state and mark it released.
    /// In-flight captures completing afterwards are detected and discarded.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.focus_timer = None;

        if self.recording == RecordingState::Recording {
            self.stop();
        }
        self.rotation_latch.release();

        self.released = true;
        if let Some(capture) = self.pending_confirmation.take() {
            let _ = std::fs::remove_file(&capture.output);
        }
        // teardown drains the capture queue and deletes its temp outputs
        self.teardown();
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        if !self.released {
            self.release();
        }
    }
}
