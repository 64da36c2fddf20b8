// This is free and unencumbered software released into the public domain.

//! Desktop capture provider backed by an `ffmpeg` child process.
//!
//! The preview is a rawvideo pipe read by a background thread; stills are
//! encoded from the most recent preview frame; recordings restart the child
//! with an extra mp4 output leg and finalize it with SIGTERM. Zoom, focus,
//! and white balance are accepted and remembered but have no optical effect,
//! and camera swap under an open recording is unsupported (single input
//! process).

use crate::error::CameraError;
use crate::events::HardwareEvent;
use crate::provider::{
    BindRequest, CameraProvider, CaptureUnitKind, Frame, FrameSink, PhotoPayload, PhotoRequest,
    RecordRequest, ZoomState,
};
use crate::types::{
    CameraPosition, CaptureFlash, PixelSize, SurfaceRotation, VideoQuality, Zoom,
};
use bytes::Bytes;
use image::RgbImage;
use std::{
    env,
    io::{Cursor, Read},
    path::PathBuf,
    process::{Child, Command, Stdio},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc::SyncSender,
    },
    thread::JoinHandle,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::{debug, warn};

const INTERMEDIATE_JPEG_QUALITY: u8 = 95;

#[derive(Clone, Debug)]
pub struct FfmpegConfig {
    /// Capture devices in selector order: rear-equivalent first, then
    /// front-equivalent. A single-device machine maps both selectors to it.
    pub devices: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub framerate: u32,
    /// Inherit the child's stderr instead of discarding it.
    pub diagnostics: bool,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            devices: vec!["0".into()],
            width: 640,
            height: 480,
            framerate: 30,
            diagnostics: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BoundUnits {
    preview: bool,
    photo: bool,
    video: bool,
}

impl BoundUnits {
    fn get(&self, kind: CaptureUnitKind) -> bool {
        match kind {
            CaptureUnitKind::Preview => self.preview,
            CaptureUnitKind::Photo => self.photo,
            CaptureUnitKind::Video => self.video,
        }
    }

    fn set(&mut self, kind: CaptureUnitKind, value: bool) {
        match kind {
            CaptureUnitKind::Preview => self.preview = value,
            CaptureUnitKind::Photo => self.photo = value,
            CaptureUnitKind::Video => self.video = value,
        }
    }

    fn any(&self) -> bool {
        self.preview || self.photo || self.video
    }
}

struct RecordingJob {
    ticket: u64,
    output: PathBuf,
}

pub struct FfmpegProvider {
    config: FfmpegConfig,
    events: Option<SyncSender<HardwareEvent>>,
    frame_sink: Arc<Mutex<Option<FrameSink>>>,
    latest: Arc<Mutex<Option<Frame>>>,
    child: Option<Child>,
    stop: Arc<AtomicBool>,
    reader_join: Option<JoinHandle<()>>,
    bound: BoundUnits,
    selector: CameraPosition,
    zoom: ZoomState,
    torch: bool,
    capture_flash: CaptureFlash,
    rotation: Option<SurfaceRotation>,
    recording: Option<RecordingJob>,
}

impl core::fmt::Debug for FfmpegProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FfmpegProvider")
            .field("config", &self.config)
            .field("selector", &self.selector)
            .field("child", &self.child.as_ref().map(|_| "<child>"))
            .finish()
    }
}

impl FfmpegProvider {
    pub fn new(config: FfmpegConfig) -> Self {
        Self {
            config,
            events: None,
            frame_sink: Arc::new(Mutex::new(None)),
            latest: Arc::new(Mutex::new(None)),
            child: None,
            stop: Arc::new(AtomicBool::new(false)),
            reader_join: None,
            bound: BoundUnits::default(),
            selector: CameraPosition::Rear,
            zoom: ZoomState::default(),
            torch: false,
            capture_flash: CaptureFlash::Off,
            rotation: None,
            recording: None,
        }
    }

    fn events_tx(&self) -> Result<SyncSender<HardwareEvent>, CameraError> {
        self.events
            .clone()
            .ok_or_else(|| CameraError::bind("provider not connected"))
    }

    fn device_for(&self, selector: CameraPosition) -> Result<&str, CameraError> {
        let index = match selector {
            CameraPosition::Rear => 0,
            CameraPosition::Front => 1.min(self.config.devices.len().saturating_sub(1)),
        };
        self.config
            .devices
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| CameraError::bind("no capture device configured"))
    }

    #[inline]
    fn now_ns_best_effort() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    /// Spawn the child and its pipe-reader thread. `record_to` adds the mp4
    /// output leg.
    fn start_child(&mut self, record_to: Option<&RecordRequest>) -> Result<(), CameraError> {
        self.stop.store(false, Ordering::Relaxed);

        let device = self.device_for(self.selector)?.to_string();
        let mut child = spawn_capture(&self.config, &device, record_to)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CameraError::other("ffmpeg stdout not piped"))?;

        let width = self.config.width;
        let height = self.config.height;
        let stride = width.saturating_mul(3);
        let frame_size = (stride as usize).saturating_mul(height as usize);

        let stop = Arc::clone(&self.stop);
        let frame_sink = Arc::clone(&self.frame_sink);
        let latest = Arc::clone(&self.latest);
        let events_tx = self.events_tx()?;

        let join = std::thread::spawn(move || {
            let mut reader = std::io::BufReader::new(stdout);

            while !stop.load(Ordering::Relaxed) {
                let mut buf = vec![0u8; frame_size];
                match reader.read_exact(&mut buf) {
                    Ok(()) => {
                        let ts = FfmpegProvider::now_ns_best_effort();
                        let frame = Frame::new_rgb8(Bytes::from(buf), width, height, stride)
                            .with_timestamp_ns(ts);
                        if let Ok(mut slot) = latest.lock() {
                            *slot = Some(frame.clone());
                        }
                        if let Ok(sink) = frame_sink.lock() {
                            if let Some(sink) = sink.as_ref() {
                                sink(frame);
                            }
                        }
                    },
                    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                    Err(e) => {
                        let _ = events_tx.try_send(HardwareEvent::ProviderError {
                            error: CameraError::provider("reading ffmpeg pipe", e),
                        });
                        break;
                    },
                }
            }
        });

        self.reader_join = Some(join);
        self.child = Some(child);
        Ok(())
    }

    /// SIGTERM first so an mp4 output leg gets its trailer written, then
    /// escalate.
    fn stop_child(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(mut child) = self.child.take() {
            #[cfg(unix)]
            {
                unsafe {
                    let _ = libc::kill(child.id() as i32, libc::SIGTERM);
                }
                let start = std::time::Instant::now();
                while start.elapsed() < Duration::from_millis(900) {
                    if let Ok(Some(_)) = child.try_wait() {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(20));
                }
                let _ = child.kill();
                let _ = child.wait();
            }
            #[cfg(not(unix))]
            {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
        if let Some(j) = self.reader_join.take() {
            let _ = j.join();
        }
    }

    fn latest_frame(&self) -> Option<Frame> {
        self.latest.lock().ok().and_then(|slot| slot.clone())
    }
}

impl CameraProvider for FfmpegProvider {
    fn connect(&mut self, events: SyncSender<HardwareEvent>) {
        self.events = Some(events);
    }

    fn camera_count(&self) -> usize {
        self.config.devices.len()
    }

    fn bind(&mut self, request: &BindRequest) -> Result<(), CameraError> {
        if request.keep_recording {
            return Err(CameraError::unsupported(
                "camera swap under an open recording (single input process)",
            ));
        }

        self.selector = request.selector;
        if self.child.is_none() {
            self.start_child(None)?;
        }
        for unit in &request.units {
            self.bound.set(unit.kind, true);
        }
        debug!(selector = %request.selector, "bound capture units");
        Ok(())
    }

    fn unbind(&mut self, kind: CaptureUnitKind) -> Result<(), CameraError> {
        self.bound.set(kind, false);
        if !self.bound.any() {
            self.stop_child();
        }
        Ok(())
    }

    fn unbind_all(&mut self) -> Result<(), CameraError> {
        self.bound = BoundUnits::default();
        self.stop_child();
        if let Ok(mut slot) = self.latest.lock() {
            *slot = None;
        }
        Ok(())
    }

    fn is_bound(&self, kind: CaptureUnitKind) -> bool {
        self.bound.get(kind)
    }

    fn supported_capture_sizes(&self) -> Vec<PixelSize> {
        vec![PixelSize {
            width: self.config.width,
            height: self.config.height,
        }]
    }

    fn has_flash_unit(&self) -> bool {
        false
    }

    fn zoom_state(&self) -> ZoomState {
        self.zoom
    }

    fn apply_zoom(&mut self, zoom: Zoom) -> Result<(), CameraError> {
        // no optical zoom behind a pipe; keep both representations coherent
        // so queries reflect the last write
        let span = self.zoom.max_ratio - self.zoom.min_ratio;
        match zoom {
            Zoom::Linear(v) => {
                self.zoom.linear = v;
                self.zoom.ratio = self.zoom.min_ratio + v * span;
            },
            Zoom::Ratio(r) => {
                let r = r.clamp(self.zoom.min_ratio, self.zoom.max_ratio);
                self.zoom.ratio = r;
                self.zoom.linear = if span > 0.0 {
                    (r - self.zoom.min_ratio) / span
                } else {
                    0.0
                };
            },
        }
        Ok(())
    }

    fn enable_torch(&mut self, on: bool) -> Result<(), CameraError> {
        self.torch = on;
        Ok(())
    }

    fn set_capture_flash(&mut self, flash: CaptureFlash) {
        self.capture_flash = flash;
    }

    fn set_target_rotation(&mut self, rotation: SurfaceRotation) {
        self.rotation = Some(rotation);
    }

    fn focus_at(&mut self, _x: f32, _y: f32, _meter: bool) -> Result<(), CameraError> {
        Ok(())
    }

    fn revert_to_continuous_focus(&mut self) -> Result<(), CameraError> {
        Ok(())
    }

    fn take_picture(&mut self, request: PhotoRequest) -> Result<(), CameraError> {
        let Some(frame) = self.latest_frame() else {
            return Err(CameraError::capture("no preview frame available yet"));
        };
        let events_tx = self.events_tx()?;

        // encode off the owning thread, report through the event channel
        std::thread::spawn(move || {
            let result = encode_still(&frame, &request);
            let _ = events_tx.try_send(HardwareEvent::PhotoDone {
                ticket: request.ticket,
                result,
            });
        });
        Ok(())
    }

    fn start_recording(&mut self, request: RecordRequest) -> Result<(), CameraError> {
        if self.recording.is_some() {
            return Err(CameraError::capture("recording already in progress"));
        }
        let events_tx = self.events_tx()?;

        // restart the child with the mp4 leg attached
        self.stop_child();
        self.start_child(Some(&request))?;

        self.recording = Some(RecordingJob {
            ticket: request.ticket,
            output: request.output.clone(),
        });
        let _ = events_tx.try_send(HardwareEvent::RecordingStarted {
            ticket: request.ticket,
        });
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<(), CameraError> {
        let Some(job) = self.recording.take() else {
            return Ok(());
        };
        let events_tx = self.events_tx()?;

        self.stop_child();

        let result = if job.output.is_file() {
            Ok(job.output)
        } else {
            Err(CameraError::capture("recorder produced no output file"))
        };
        let _ = events_tx.try_send(HardwareEvent::RecordingFinalized {
            ticket: job.ticket,
            result,
        });

        // preview keeps running after the recording ends
        if self.bound.any() {
            if let Err(err) = self.start_child(None) {
                warn!(%err, "failed to restart preview after recording");
            }
        }
        Ok(())
    }

    fn set_frame_sink(&mut self, sink: FrameSink) {
        if let Ok(mut slot) = self.frame_sink.lock() {
            *slot = Some(sink);
        }
    }
}

impl Drop for FfmpegProvider {
    fn drop(&mut self) {
        self.stop_child();
    }
}

fn encode_still(frame: &Frame, request: &PhotoRequest) -> Result<PhotoPayload, CameraError> {
    let image = RgbImage::from_raw(frame.width, frame.height, frame.data.to_vec())
        .ok_or_else(|| CameraError::capture("preview frame has unexpected geometry"))?;

    let mut jpeg = Cursor::new(Vec::new());
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, INTERMEDIATE_JPEG_QUALITY);
    image
        .write_with_encoder(encoder)
        .map_err(|e| CameraError::provider("encoding still", e))?;
    let jpeg = jpeg.into_inner();

    if request.use_buffer {
        Ok(PhotoPayload::Buffer {
            data: Bytes::from(jpeg),
            width: frame.width,
            height: frame.height,
            rotation_degrees: 0,
        })
    } else {
        std::fs::write(&request.output, &jpeg)
            .map_err(|e| CameraError::provider("writing still", e))?;
        Ok(PhotoPayload::File(request.output.clone()))
    }
}

fn record_size(quality: VideoQuality) -> (u32, u32) {
    match quality {
        VideoQuality::Lowest => (176, 144),
        VideoQuality::Qvga => (320, 240),
        VideoQuality::Max480p => (640, 480),
        VideoQuality::Max720p => (1280, 720),
        VideoQuality::Max1080p => (1920, 1080),
        VideoQuality::Max2160p | VideoQuality::Highest => (3840, 2160),
    }
}

fn spawn_capture(
    config: &FfmpegConfig,
    device: &str,
    record_to: Option<&RecordRequest>,
) -> Result<Child, CameraError> {
    let input_device = get_input_device(device.trim());

    let mut ffargs: Vec<String> = vec![
        "-hide_banner".into(),
        "-nostdin".into(),
        "-nostats".into(),
        "-f".into(),
        ffmpeg_format().into(),
        "-loglevel".into(),
        "error".into(),
        "-video_size".into(),
        format!("{}x{}", config.width, config.height),
        "-framerate".into(),
        config.framerate.to_string(),
    ];

    #[cfg(target_os = "macos")]
    {
        ffargs.push("-pixel_format".into());
        ffargs.push("0rgb".into());
    }

    ffargs.extend([
        "-i".into(),
        input_device,
        "-pix_fmt".into(),
        "rgb24".into(),
        "-f".into(),
        "rawvideo".into(),
        "pipe:1".into(),
    ]);

    if let Some(record) = record_to {
        let (w, h) = record_size(record.quality);
        ffargs.extend([
            "-c:v".into(),
            "libx264".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-s".into(),
            format!("{w}x{h}"),
        ]);
        if record.max_video_bit_rate > 0 {
            ffargs.push("-b:v".into());
            ffargs.push(record.max_video_bit_rate.to_string());
        }
        if record.max_frame_rate > 0 {
            ffargs.push("-r".into());
            ffargs.push(record.max_frame_rate.to_string());
        }
        // no audio input leg on this provider; the request's audio settings
        // have nothing to apply to
        ffargs.push("-an".into());
        ffargs.push(record.output.display().to_string());
    }

    let stderr = if config.diagnostics || env::var_os("CAMERA_VIEW_FFMPEG_STDERR").is_some() {
        Stdio::inherit()
    } else {
        Stdio::null()
    };

    Command::new("ffmpeg")
        .args(&ffargs)
        .stdout(Stdio::piped())
        .stderr(stderr)
        .spawn()
        .map_err(|e| CameraError::provider("spawning ffmpeg", e))
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "macos")] {
        fn ffmpeg_format() -> &'static str {
            "avfoundation"
        }

        fn get_input_device(device: &str) -> String {
            device.strip_prefix("avf:").unwrap_or(device).to_string()
        }
    } else if #[cfg(target_os = "windows")] {
        fn ffmpeg_format() -> &'static str {
            "dshow"
        }

        fn get_input_device(device: &str) -> String {
            device.strip_prefix("dshow:").unwrap_or(device).to_string()
        }
    } else {
        fn ffmpeg_format() -> &'static str {
            "v4l2"
        }

        fn get_input_device(device: &str) -> String {
            let d = device.strip_prefix("file:").unwrap_or(device);
            if d.chars().all(|c| c.is_ascii_digit()) {
                format!("/dev/video{d}")
            } else {
                d.to_string()
            }
        }
    }
}
