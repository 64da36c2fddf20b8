// This is free and unencumbered software released into the public domain.

//! End-to-end session controller tests over a scripted in-memory provider.

use camera_view::{
    BindRequest, CameraError, CameraEvent, CameraMode, CameraPosition, CameraProvider,
    CameraSession, CaptureFlash, CaptureUnitKind, EventSink, FrameSink, HardwareEvent,
    PhotoOptions, PhotoPayload, PhotoRequest, PixelSize, RecordRequest, RotationLock,
    SessionConfig, SurfaceRotation, WhiteBalance, Zoom, ZoomState,
};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
        mpsc::SyncSender,
    },
    time::Duration,
};

#[derive(Default)]
struct FakeState {
    events: Option<SyncSender<HardwareEvent>>,
    bound: Vec<CaptureUnitKind>,
    bind_calls: u32,
    swap_calls: u32,
    unbind_all_calls: u32,
    fail_bind: bool,
    support_swap: bool,
    applied_zooms: Vec<Zoom>,
    zoom: Option<ZoomState>,
    focus_calls: u32,
    continuous_focus_calls: u32,
    photo_requests: Vec<PhotoRequest>,
    record_requests: Vec<RecordRequest>,
    stop_recording_calls: u32,
}

impl FakeState {
    fn send(&self, event: HardwareEvent) {
        self.events
            .as_ref()
            .expect("provider connected")
            .try_send(event)
            .expect("event channel has capacity");
    }
}

struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl CameraProvider for FakeProvider {
    fn connect(&mut self, events: SyncSender<HardwareEvent>) {
        self.state.lock().unwrap().events = Some(events);
    }

    fn camera_count(&self) -> usize {
        2
    }

    fn bind(&mut self, request: &BindRequest) -> Result<(), CameraError> {
        let mut state = self.state.lock().unwrap();
        if request.keep_recording {
            state.swap_calls += 1;
            if !state.support_swap {
                return Err(CameraError::unsupported("selector swap while recording"));
            }
        } else {
            state.bind_calls += 1;
            if state.fail_bind {
                return Err(CameraError::bind("scripted bind failure"));
            }
        }
        for unit in &request.units {
            if !state.bound.contains(&unit.kind) {
                state.bound.push(unit.kind);
            }
        }
        Ok(())
    }

    fn unbind(&mut self, kind: CaptureUnitKind) -> Result<(), CameraError> {
        self.state.lock().unwrap().bound.retain(|k| *k != kind);
        Ok(())
    }

    fn unbind_all(&mut self) -> Result<(), CameraError> {
        let mut state = self.state.lock().unwrap();
        state.unbind_all_calls += 1;
        state.bound.clear();
        Ok(())
    }

    fn is_bound(&self, kind: CaptureUnitKind) -> bool {
        self.state.lock().unwrap().bound.contains(&kind)
    }

    fn supported_capture_sizes(&self) -> Vec<PixelSize> {
        vec![
            PixelSize::new(1600, 1200),
            PixelSize::new(1920, 1080),
            PixelSize::new(640, 480),
        ]
    }

    fn has_flash_unit(&self) -> bool {
        true
    }

    fn zoom_state(&self) -> ZoomState {
        self.state.lock().unwrap().zoom.unwrap_or_default()
    }

    fn apply_zoom(&mut self, zoom: Zoom) -> Result<(), CameraError> {
        let mut state = self.state.lock().unwrap();
        state.applied_zooms.push(zoom);
        let mut zs = state.zoom.unwrap_or_default();
        zs.max_ratio = 5.0;
        match zoom {
            Zoom::Linear(v) => {
                zs.linear = v;
                zs.ratio = 1.0 + v * 4.0;
            },
            Zoom::Ratio(r) => {
                zs.ratio = r;
                zs.linear = (r - 1.0) / 4.0;
            },
        }
        state.zoom = Some(zs);
        Ok(())
    }

    fn enable_torch(&mut self, _on: bool) -> Result<(), CameraError> {
        Ok(())
    }

    fn set_capture_flash(&mut self, _flash: CaptureFlash) {}

    fn set_target_rotation(&mut self, _rotation: SurfaceRotation) {}

    fn focus_at(&mut self, _x: f32, _y: f32, _meter: bool) -> Result<(), CameraError> {
        self.state.lock().unwrap().focus_calls += 1;
        Ok(())
    }

    fn revert_to_continuous_focus(&mut self) -> Result<(), CameraError> {
        self.state.lock().unwrap().continuous_focus_calls += 1;
        Ok(())
    }

    fn take_picture(&mut self, request: PhotoRequest) -> Result<(), CameraError> {
        self.state.lock().unwrap().photo_requests.push(request);
        Ok(())
    }

    fn start_recording(&mut self, request: RecordRequest) -> Result<(), CameraError> {
        self.state.lock().unwrap().record_requests.push(request);
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<(), CameraError> {
        self.state.lock().unwrap().stop_recording_calls += 1;
        Ok(())
    }

    fn set_frame_sink(&mut self, _sink: FrameSink) {}
}

type Events = Arc<Mutex<Vec<CameraEvent>>>;

struct Harness {
    session: CameraSession,
    state: Arc<Mutex<FakeState>>,
    events: Events,
    _dir: tempfile::TempDir,
}

fn build_harness(
    config: impl FnOnce(&mut FakeState),
    tune: impl FnOnce(SessionConfig) -> SessionConfig,
    decorate: impl FnOnce(CameraSession) -> CameraSession,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(Mutex::new(FakeState {
        support_swap: true,
        ..Default::default()
    }));
    config(&mut state.lock().unwrap());

    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink: EventSink = {
        let events = Arc::clone(&events);
        Arc::new(move |event| events.lock().unwrap().push(event))
    };

    let session_config = tune(SessionConfig::new(dir.path()));
    let session = decorate(CameraSession::new(
        Box::new(FakeProvider {
            state: Arc::clone(&state),
        }),
        session_config,
        sink,
    ));

    Harness {
        session,
        state,
        events,
        _dir: dir,
    }
}

fn harness_with(
    config: impl FnOnce(&mut FakeState),
    tune: impl FnOnce(SessionConfig) -> SessionConfig,
) -> Harness {
    build_harness(config, tune, |s| s)
}

fn harness() -> Harness {
    harness_with(|_| {}, |c| c)
}

impl Harness {
    fn taken(&self) -> Vec<CameraEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn last_photo_request(&self) -> PhotoRequest {
        self.state
            .lock()
            .unwrap()
            .photo_requests
            .last()
            .expect("a photo request was issued")
            .clone()
    }

    fn last_record_request(&self) -> RecordRequest {
        self.state
            .lock()
            .unwrap()
            .record_requests
            .last()
            .expect("a record request was issued")
            .clone()
    }

    fn inject(&self, event: HardwareEvent) {
        self.state.lock().unwrap().send(event);
    }
}

fn has_event(events: &[CameraEvent], pred: impl Fn(&CameraEvent) -> bool) -> bool {
    events.iter().any(pred)
}

#[test]
fn preview_binds_and_reports_ready() {
    let mut h = harness();
    assert_eq!(h.session.number_of_cameras(), 0);

    h.session.start_preview();

    let events = h.taken();
    assert!(has_event(&events, |e| matches!(e, CameraEvent::Ready)));
    assert!(h.session.is_bound());
    assert_eq!(h.session.number_of_cameras(), 2);
    assert!(h.session.has_flash());

    // second call is a no-op
    h.session.start_preview();
    assert_eq!(h.state.lock().unwrap().bind_calls, 1);
}

#[test]
fn bind_failure_leaves_session_unbound() {
    let mut h = harness_with(|s| s.fail_bind = true, |c| c);
    h.session.start_preview();

    let events = h.taken();
    assert!(has_event(&events, |e| matches!(e, CameraEvent::Error { .. })));
    assert!(!h.session.is_bound());
    // no stale capability cache
    assert_eq!(h.session.number_of_cameras(), 0);
    assert!(!h.session.has_flash());
}

#[test]
fn picture_sizes_come_from_the_ratio_bucket() {
    let mut h = harness();
    h.session.start_preview();

    assert_eq!(
        h.session.get_available_picture_sizes("4:3"),
        vec!["1600x1200".to_string(), "640x480".to_string()]
    );
    assert_eq!(
        h.session.get_available_picture_sizes("16:9"),
        vec!["1920x1080".to_string()]
    );
}

#[test]
fn toggling_twice_restores_the_original_position() {
    let mut h = harness();
    h.session.start_preview();
    h.taken();

    h.session.toggle_position();
    assert_eq!(h.session.position(), CameraPosition::Front);
    h.session.toggle_position();
    assert_eq!(h.session.position(), CameraPosition::Rear);

    let toggles = h
        .taken()
        .iter()
        .filter(|e| matches!(e, CameraEvent::Toggled))
        .count();
    assert_eq!(toggles, 2);
    assert!(h.session.is_bound());
}

#[test]
fn take_picture_in_video_mode_is_rejected_without_queueing() {
    let mut h = harness();
    h.session.start_preview();
    h.session.set_mode(CameraMode::Video);
    h.taken();

    h.session.take_picture(None);

    let events = h.taken();
    assert!(has_event(&events, |e| matches!(e, CameraEvent::Error { .. })));
    assert_eq!(h.session.pending_captures(), 0);
    assert!(h.state.lock().unwrap().photo_requests.is_empty());
}

#[test]
fn zoom_set_before_bind_is_buffered_and_applied_on_bind() {
    let mut h = harness();
    h.session.set_zoom(0.5);
    assert!(h.state.lock().unwrap().applied_zooms.is_empty());
    assert_eq!(h.session.zoom(), 0.5);

    h.session.start_preview();
    assert_eq!(h.state.lock().unwrap().applied_zooms, vec![Zoom::Linear(0.5)]);
}

#[test]
fn pending_zoom_is_last_write_wins_across_representations() {
    let mut h = harness();
    h.session.set_zoom(0.3);
    h.session.set_zoom_ratio(2.0);
    assert_eq!(h.session.zoom_ratio(), 2.0);

    h.session.start_preview();
    assert_eq!(h.state.lock().unwrap().applied_zooms, vec![Zoom::Ratio(2.0)]);
}

#[test]
fn pending_zoom_does_not_survive_stop_preview() {
    let mut h = harness();
    h.session.set_zoom(0.7);
    h.session.start_preview();
    h.session.stop_preview();
    assert!(has_event(&h.taken(), |e| matches!(e, CameraEvent::CameraClosed)));

    h.session.start_preview();
    // applied once on the first bind only
    assert_eq!(h.state.lock().unwrap().applied_zooms.len(), 1);
}

#[test]
fn completed_photo_emits_captured_event() {
    let mut h = harness();
    h.session.start_preview();
    h.session.take_picture(None);
    h.taken();

    let request = h.last_photo_request();
    h.inject(HardwareEvent::PhotoDone {
        ticket: request.ticket,
        result: Ok(PhotoPayload::File(request.output.clone())),
    });
    h.session.process_events();

    let events = h.taken();
    assert!(has_event(&events, |e| matches!(
        e,
        CameraEvent::PhotoCaptured { path } if *path == request.output
    )));
    assert_eq!(h.session.pending_captures(), 0);
}

#[test]
fn front_camera_requests_are_mirrored() {
    let mut h = harness();
    h.session.start_preview();
    h.session.toggle_position();
    h.session.take_picture(None);

    assert!(h.last_photo_request().mirror);
}

#[test]
fn release_discards_in_flight_photo_completion() {
    let mut h = harness();
    h.session.start_preview();
    h.session.take_picture(None);
    let request = h.last_photo_request();
    h.taken();

    h.session.release();
    h.inject(HardwareEvent::PhotoDone {
        ticket: request.ticket,
        result: Ok(PhotoPayload::File(request.output)),
    });
    h.session.process_events();

    let events = h.taken();
    assert!(!has_event(&events, |e| matches!(e, CameraEvent::PhotoCaptured { .. })));
}

#[test]
fn stale_generation_photo_completion_is_discarded_with_its_file() {
    let mut h = harness();
    h.session.start_preview();
    h.session.take_picture(None);
    let request = h.last_photo_request();
    std::fs::write(&request.output, b"jpeg").unwrap();

    // rebinds and bumps the generation
    h.session.toggle_position();
    h.taken();

    h.inject(HardwareEvent::PhotoDone {
        ticket: request.ticket,
        result: Ok(PhotoPayload::File(request.output.clone())),
    });
    h.session.process_events();

    assert!(!has_event(&h.taken(), |e| matches!(e, CameraEvent::PhotoCaptured { .. })));
    assert!(!request.output.exists());
}

#[test]
fn rebind_mid_capture_drops_the_cancelled_queue_entry() {
    let mut h = harness();
    h.session.start_preview();
    h.session.take_picture(None);
    let first = h.last_photo_request();
    std::fs::write(&first.output, b"jpeg").unwrap();

    // rebinding cancels the in-flight capture; its completion never arrives
    h.session.toggle_position();
    assert_eq!(h.session.pending_captures(), 0);
    assert!(!first.output.exists());
    h.taken();

    // the next capture must pair with its own snapshot, not the stale one
    h.session.take_picture(None);
    let second = h.last_photo_request();
    h.inject(HardwareEvent::PhotoDone {
        ticket: second.ticket,
        result: Ok(PhotoPayload::File(second.output.clone())),
    });
    h.session.process_events();

    assert!(has_event(&h.taken(), |e| matches!(
        e,
        CameraEvent::PhotoCaptured { path } if *path == second.output
    )));
    assert_eq!(h.session.pending_captures(), 0);
}

#[test]
fn confirm_flow_discards_retaken_photo() {
    let mut h = harness();
    h.session.start_preview();
    h.session.take_picture(Some(PhotoOptions {
        confirm_photos: Some(true),
        ..Default::default()
    }));
    let request = h.last_photo_request();
    std::fs::write(&request.output, b"jpeg").unwrap();
    h.taken();

    h.inject(HardwareEvent::PhotoDone {
        ticket: request.ticket,
        result: Ok(PhotoPayload::File(request.output.clone())),
    });
    h.session.process_events();
    assert!(has_event(&h.taken(), |e| matches!(e, CameraEvent::ConfirmScreenShown)));

    h.session.confirm_pending_photo(false);
    let events = h.taken();
    assert!(has_event(&events, |e| matches!(e, CameraEvent::ConfirmScreenDismissed)));
    assert!(!has_event(&events, |e| matches!(e, CameraEvent::PhotoCaptured { .. })));
    assert!(!request.output.exists());
}

struct FailingGallery;

impl camera_view::GalleryStore for FailingGallery {
    fn persist(&self, _path: &std::path::Path) -> std::io::Result<()> {
        Err(std::io::Error::other("gallery full"))
    }
}

#[test]
fn gallery_failure_does_not_suppress_the_captured_event() {
    let mut h = build_harness(|_| {}, |c| c, |s| s.with_gallery(Arc::new(FailingGallery)));

    h.session.start_preview();
    h.session.take_picture(Some(PhotoOptions {
        save_to_gallery: Some(true),
        ..Default::default()
    }));
    let request = h.last_photo_request();
    h.taken();

    h.inject(HardwareEvent::PhotoDone {
        ticket: request.ticket,
        result: Ok(PhotoPayload::File(request.output)),
    });
    h.session.process_events();

    let events = h.taken();
    assert!(has_event(&events, |e| matches!(e, CameraEvent::Error { .. })));
    assert!(has_event(&events, |e| matches!(e, CameraEvent::PhotoCaptured { .. })));
}

#[test]
fn recording_lifecycle_round_trips() {
    let mut h = harness();
    h.session.start_preview();
    h.session.set_mode(CameraMode::Video);
    h.session.record(None);
    h.taken();

    let request = h.last_record_request();
    h.inject(HardwareEvent::RecordingStarted {
        ticket: request.ticket,
    });
    h.session.process_events();
    assert!(h.session.is_recording());
    assert!(has_event(&h.taken(), |e| matches!(
        e,
        CameraEvent::VideoRecordingStarted
    )));

    h.session.stop();
    assert_eq!(h.state.lock().unwrap().stop_recording_calls, 1);
    assert!(has_event(&h.taken(), |e| matches!(
        e,
        CameraEvent::VideoRecordingFinished
    )));

    // repeated stop is a no-op
    h.session.stop();
    assert_eq!(h.state.lock().unwrap().stop_recording_calls, 1);

    h.inject(HardwareEvent::RecordingFinalized {
        ticket: request.ticket,
        result: Ok(request.output.clone()),
    });
    h.session.process_events();
    assert!(has_event(&h.taken(), |e| matches!(
        e,
        CameraEvent::VideoRecordingReady { path } if *path == request.output
    )));
    assert!(!h.session.is_recording());
}

#[test]
fn record_preserves_the_hardware_default_sentinel() {
    let mut h = harness();
    h.session.start_preview();
    h.session.set_mode(CameraMode::Video);
    h.session.record(None);

    let request = h.last_record_request();
    assert_eq!(request.max_video_bit_rate, -1);
    assert_eq!(request.max_frame_rate, -1);
    assert_eq!(request.max_audio_bit_rate, -1);
}

#[test]
fn mode_change_is_rejected_while_recording() {
    let mut h = harness();
    h.session.start_preview();
    h.session.set_mode(CameraMode::Video);
    h.session.record(None);
    let request = h.last_record_request();
    h.inject(HardwareEvent::RecordingStarted {
        ticket: request.ticket,
    });
    h.session.process_events();
    h.taken();

    h.session.set_mode(CameraMode::Photo);
    assert!(has_event(&h.taken(), |e| matches!(e, CameraEvent::Error { .. })));
    assert_eq!(h.session.mode(), CameraMode::Video);
    assert!(h.session.is_recording());
}

struct CountingLock {
    locks: AtomicU32,
    unlocks: AtomicU32,
}

impl RotationLock for CountingLock {
    fn lock(&self) {
        self.locks.fetch_add(1, Ordering::SeqCst);
    }
    fn unlock(&self) {
        self.unlocks.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn rotation_lock_engages_once_and_releases_once() {
    let lock = Arc::new(CountingLock {
        locks: AtomicU32::new(0),
        unlocks: AtomicU32::new(0),
    });

    let mut h = build_harness(|_| {}, |c| c, |s| s.with_rotation_lock(lock.clone()));

    h.session.start_preview();
    h.session.set_mode(CameraMode::Video);
    h.session.record(None);
    let request = h.last_record_request();
    h.inject(HardwareEvent::RecordingStarted {
        ticket: request.ticket,
    });
    h.session.process_events();
    assert_eq!(lock.locks.load(Ordering::SeqCst), 1);

    h.session.stop();
    h.session.stop();
    h.inject(HardwareEvent::RecordingFinalized {
        ticket: request.ticket,
        result: Ok(request.output),
    });
    h.session.process_events();

    assert_eq!(lock.locks.load(Ordering::SeqCst), 1);
    assert_eq!(lock.unlocks.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_finalize_discards_the_file_and_recovers() {
    let mut h = harness();
    h.session.start_preview();
    h.session.set_mode(CameraMode::Video);
    h.session.record(None);
    let request = h.last_record_request();
    std::fs::write(&request.output, b"partial").unwrap();
    h.inject(HardwareEvent::RecordingStarted {
        ticket: request.ticket,
    });
    h.session.process_events();
    h.session.stop();
    h.taken();

    h.inject(HardwareEvent::RecordingFinalized {
        ticket: request.ticket,
        result: Err(CameraError::capture("encoder died")),
    });
    h.session.process_events();

    let events = h.taken();
    assert!(has_event(&events, |e| matches!(e, CameraEvent::Error { .. })));
    assert!(!request.output.exists());
    assert!(h.session.is_bound());
    assert!(!h.session.is_recording());

    // the session is still usable
    h.session.record(None);
    assert_eq!(h.state.lock().unwrap().record_requests.len(), 2);
}

#[test]
fn toggle_while_recording_swaps_without_teardown() {
    let mut h = harness();
    h.session.start_preview();
    h.session.set_mode(CameraMode::Video);
    h.session.record(None);
    let request = h.last_record_request();
    h.inject(HardwareEvent::RecordingStarted {
        ticket: request.ticket,
    });
    h.session.process_events();
    h.taken();
    let unbinds_before = h.state.lock().unwrap().unbind_all_calls;

    h.session.toggle_position();

    assert_eq!(h.session.position(), CameraPosition::Front);
    assert!(h.session.is_recording());
    assert_eq!(h.state.lock().unwrap().swap_calls, 1);
    assert_eq!(h.state.lock().unwrap().unbind_all_calls, unbinds_before);
    assert!(has_event(&h.taken(), |e| matches!(e, CameraEvent::Toggled)));

    // the recording that started before the swap still finalizes
    h.inject(HardwareEvent::RecordingFinalized {
        ticket: request.ticket,
        result: Ok(request.output.clone()),
    });
    h.session.process_events();
    assert!(has_event(&h.taken(), |e| matches!(
        e,
        CameraEvent::VideoRecordingReady { .. }
    )));
}

#[test]
fn unsupported_swap_keeps_recording_on_the_original_camera() {
    let mut h = harness_with(|s| s.support_swap = false, |c| c);
    h.session.start_preview();
    h.session.set_mode(CameraMode::Video);
    h.session.record(None);
    let request = h.last_record_request();
    h.inject(HardwareEvent::RecordingStarted {
        ticket: request.ticket,
    });
    h.session.process_events();
    h.taken();

    h.session.toggle_position();

    let events = h.taken();
    assert!(has_event(&events, |e| matches!(e, CameraEvent::Error { .. })));
    assert!(!has_event(&events, |e| matches!(e, CameraEvent::Toggled)));
    assert_eq!(h.session.position(), CameraPosition::Rear);
    assert!(h.session.is_recording());

    // the rejected swap must leave the old binding fully intact, preview
    // included
    let state = h.state.lock().unwrap();
    assert!(state.bound.contains(&CaptureUnitKind::Preview));
    assert!(state.bound.contains(&CaptureUnitKind::Video));
}

#[test]
fn focus_timer_reverts_to_continuous_focus() {
    let mut h = harness_with(
        |_| {},
        |c| c.with_auto_focus_timeout(Duration::from_millis(30)),
    );
    h.session.start_preview();
    h.session.tap_to_focus(0.5, 0.5);
    assert_eq!(h.state.lock().unwrap().focus_calls, 1);

    h.session.process_events_timeout(Duration::from_secs(2));
    assert_eq!(h.state.lock().unwrap().continuous_focus_calls, 1);
}

#[test]
fn retapping_restarts_the_focus_timer() {
    let mut h = harness_with(
        |_| {},
        |c| c.with_auto_focus_timeout(Duration::from_millis(60)),
    );
    h.session.start_preview();
    h.session.tap_to_focus(0.2, 0.2);
    std::thread::sleep(Duration::from_millis(20));
    h.session.tap_to_focus(0.8, 0.8);

    h.session.process_events_timeout(Duration::from_secs(2));
    std::thread::sleep(Duration::from_millis(100));
    h.session.process_events();

    // only the second timer fired
    assert_eq!(h.state.lock().unwrap().continuous_focus_calls, 1);
}

#[test]
fn unbinding_cancels_the_focus_timer() {
    let mut h = harness_with(
        |_| {},
        |c| c.with_auto_focus_timeout(Duration::from_millis(30)),
    );
    h.session.start_preview();
    h.session.tap_to_focus(0.5, 0.5);
    h.session.stop_preview();

    std::thread::sleep(Duration::from_millis(80));
    h.session.process_events();
    assert_eq!(h.state.lock().unwrap().continuous_focus_calls, 0);
}

#[test]
fn release_unbinds_and_reports_closed() {
    let mut h = harness();
    h.session.start_preview();
    h.taken();

    h.session.release();
    assert!(has_event(&h.taken(), |e| matches!(e, CameraEvent::CameraClosed)));
    assert!(!h.session.is_bound());
    assert!(h.state.lock().unwrap().bound.is_empty());

    // commands after release fail fast
    h.session.take_picture(None);
    assert!(has_event(&h.taken(), |e| matches!(e, CameraEvent::Error { .. })));
}

#[test]
fn white_balance_change_rebinds_when_idle() {
    let mut h = harness();
    h.session.start_preview();
    let binds_before = h.state.lock().unwrap().bind_calls;

    h.session.set_white_balance(WhiteBalance::Fluorescent);
    assert_eq!(h.session.white_balance(), WhiteBalance::Fluorescent);
    assert_eq!(h.state.lock().unwrap().bind_calls, binds_before + 1);

    // same value again is a no-op
    h.session.set_white_balance(WhiteBalance::Fluorescent);
    assert_eq!(h.state.lock().unwrap().bind_calls, binds_before + 1);
}
