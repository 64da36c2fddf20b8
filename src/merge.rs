// This is free and unencumbered software released into the public domain.

//! Video segment merging. The algorithm is container-agnostic: a
//! [`ContainerBackend`] probes metadata, demuxes samples, and muxes the
//! output, while this module owns ordering, track selection, timestamp
//! rewriting, and failure cleanup.

use crate::error::MergeError;
use bytes::Bytes;
use scopeguard::ScopeGuard;
use std::{
    error::Error as StdError,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Fixed gap inserted between segments so timestamps never collide at a
/// segment boundary.
pub const APPEND_DELAY_US: i64 = 200;

/// Per-sample read ceiling. A sample larger than this aborts the merge with
/// an error attributed to its segment.
pub const MAX_SAMPLE_BYTES: usize = 1024 * 1024;

pub type BackendError = Box<dyn StdError + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// Codec configuration for one elementary track, as read from the container
/// header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackFormat {
    /// MIME type, `video/...` or `audio/...`.
    pub mime: String,
    /// Codec-specific configuration blob (SPS/PPS, AudioSpecificConfig, ...).
    pub codec_config: Bytes,
}

impl TrackFormat {
    pub fn kind(&self) -> Option<TrackKind> {
        if self.mime.starts_with("video/") {
            Some(TrackKind::Video)
        } else if self.mime.starts_with("audio/") {
            Some(TrackKind::Audio)
        } else {
            None
        }
    }
}

/// Header-level metadata for one input segment. Obtained without decoding
/// any sample data.
#[derive(Clone, Debug)]
pub struct SegmentMeta {
    /// First video track's format, if the file has one.
    pub video: Option<TrackFormat>,
    /// First audio track's format, if the file has one.
    pub audio: Option<TrackFormat>,
    pub duration_ms: i64,
    pub rotation_degrees: u32,
}

#[derive(Clone, Debug)]
pub struct Sample {
    pub track: TrackKind,
    pub data: Bytes,
    pub time_us: i64,
    pub is_sync: bool,
}

/// Sequential demuxer over one input's selected video and audio tracks.
pub trait SampleReader {
    /// Next sample in demux order, from either selected track. `None` once
    /// both tracks are drained.
    fn next_sample(&mut self) -> Result<Option<Sample>, BackendError>;
}

/// Muxer for the single output file. Track layout is fixed at creation.
pub trait SampleWriter {
    fn write_sample(&mut self, sample: &Sample) -> Result<(), BackendError>;
    /// Interleave trailers and close the file. Consumes the writer; the
    /// output is not valid until this returns.
    fn finalize(self: Box<Self>) -> Result<(), BackendError>;
}

/// Platform seam for the merger: probe a container header, open a demuxer,
/// create a muxer.
pub trait ContainerBackend {
    fn probe(&self, path: &Path) -> Result<SegmentMeta, BackendError>;
    fn open_reader(&self, path: &Path) -> Result<Box<dyn SampleReader>, BackendError>;
    fn create_writer(
        &self,
        path: &Path,
        video: &TrackFormat,
        audio: Option<&TrackFormat>,
        rotation_degrees: u32,
    ) -> Result<Box<dyn SampleWriter>, BackendError>;
}

/// Merge `inputs`, in order, into a single container at `output`.
///
/// The first input's track formats are canonical for the whole output, and
/// its rotation becomes the output's orientation hint. Only the first video
/// and first audio track of each input are carried; format mismatches
/// between segments are not validated, and audio samples from a segment are
/// dropped when the first segment had no audio track. Sample timestamps are
/// rewritten as `time + total_duration_so_far * 1000 + APPEND_DELAY_US`.
///
/// A single input degenerates to a byte-for-byte copy. Any failure aborts
/// the whole operation, deletes the partial output, and identifies the
/// failing input index where one is attributable; a sample larger than
/// [`MAX_SAMPLE_BYTES`] counts as a failure of its segment.
///
/// This is a long-running blocking call; run it on a worker, never on the
/// thread that owns a live camera session.
pub fn merge<B: ContainerBackend>(
    backend: &B,
    inputs: &[PathBuf],
    output: &Path,
) -> Result<PathBuf, MergeError> {
    if inputs.is_empty() {
        return Err(MergeError::EmptyInput);
    }
    if output.file_name().is_none() {
        return Err(MergeError::InvalidOutput(output.display().to_string()));
    }
    if output.exists() {
        fs::remove_file(output)?;
    }

    if let [single] = inputs {
        fs::copy(single, output).map_err(|e| MergeError::segment(0, e))?;
        debug!(output = %output.display(), "single segment, copied verbatim");
        return Ok(output.to_path_buf());
    }

    // until defused, any early return removes the partial output
    let cleanup = scopeguard::guard(output.to_path_buf(), |partial| {
        let _ = fs::remove_file(&partial);
    });

    // the first segment's layout is canonical: its formats define the output
    // tracks and its rotation becomes the orientation hint
    let first = backend
        .probe(&inputs[0])
        .map_err(|e| MergeError::probe(0, e))?;
    let canonical_video = first
        .video
        .clone()
        .ok_or(MergeError::NoVideoTrack { index: 0 })?;
    let output_has_audio = first.audio.is_some();
    let mut writer = backend
        .create_writer(output, &canonical_video, first.audio.as_ref(), first.rotation_degrees)
        .map_err(MergeError::output)?;

    let mut total_duration_ms: i64 = 0;

    for (index, input) in inputs.iter().enumerate() {
        let meta = if index == 0 {
            first.clone()
        } else {
            let meta = backend
                .probe(input)
                .map_err(|e| MergeError::probe(index, e))?;
            if meta.video.is_none() {
                return Err(MergeError::NoVideoTrack { index });
            }
            meta
        };

        let mut reader = backend
            .open_reader(input)
            .map_err(|e| MergeError::segment(index, e))?;
        let offset_us = total_duration_ms * 1000 + APPEND_DELAY_US;

        while let Some(sample) = reader
            .next_sample()
            .map_err(|e| MergeError::segment(index, e))?
        {
            if sample.data.len() > MAX_SAMPLE_BYTES {
                return Err(MergeError::segment(
                    index,
                    format!(
                        "sample of {} bytes exceeds the {MAX_SAMPLE_BYTES} byte read ceiling",
                        sample.data.len()
                    ),
                ));
            }
            if sample.track == TrackKind::Audio && !output_has_audio {
                continue;
            }
            let rewritten = Sample {
                time_us: sample.time_us + offset_us,
                ..sample
            };
            writer.write_sample(&rewritten).map_err(MergeError::output)?;
        }

        total_duration_ms += meta.duration_ms;
        debug!(index, duration_ms = meta.duration_ms, "segment drained");
    }

    writer.finalize().map_err(MergeError::output)?;

    ScopeGuard::into_inner(cleanup);
    info!(
        segments = inputs.len(),
        total_duration_ms,
        output = %output.display(),
        "merged video segments"
    );
    Ok(output.to_path_buf())
}
