// This is free and unencumbered software released into the public domain.

//! Photo finishing: the in-memory decode → transform → re-encode path used
//! when square crop or in-pixel rotation correction is requested, plus the
//! FIFO of per-call option snapshots for in-flight captures.

use crate::error::CameraError;
use crate::options::ResolvedPhotoOptions;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use std::{
    collections::VecDeque,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

/// One queued capture request: the option snapshot taken at call time plus
/// what the completion handler needs to finish and attribute the file.
#[derive(Clone, Debug)]
pub struct PendingCapture {
    /// Bind-generation ticket stamped on the hardware request.
    pub ticket: u64,
    pub output: PathBuf,
    /// Mirror horizontally (front camera at request time).
    pub mirror: bool,
    pub options: ResolvedPhotoOptions,
}

/// FIFO of per-call snapshots, one per in-flight capture request. Hardware
/// capture is serialized so the depth rarely exceeds 1, but nothing here
/// assumes that.
#[derive(Debug, Default)]
pub struct PendingCaptureOptions {
    queue: VecDeque<PendingCapture>,
}

impl PendingCaptureOptions {
    pub fn push(&mut self, capture: PendingCapture) {
        self.queue.push_back(capture);
    }

    pub fn pop(&mut self) -> Option<PendingCapture> {
        self.queue.pop_front()
    }

    /// Drop the most recently pushed entry (its hardware request never got
    /// issued).
    pub fn pop_back(&mut self) -> Option<PendingCapture> {
        self.queue.pop_back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

pub fn photo_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("PIC_{}.jpg", now.format("%Y%m%d%H%M%S"))
}

/// Largest centered square that fits the original bounds:
/// `offset = (longer - shorter) / 2` on the longer axis.
/// Returns `(x, y, side)`.
pub fn square_crop_rect(width: u32, height: u32) -> (u32, u32, u32) {
    if width < height {
        (0, (height - width) / 2, width)
    } else {
        ((width - height) / 2, 0, height)
    }
}

/// Finish an in-memory capture: crop, rotate, mirror, then JPEG-encode at
/// the requested quality. The crop happens before the output encode, never
/// as a post-process on the file.
pub fn finish_buffer(
    data: &Bytes,
    rotation_degrees: i32,
    mirror: bool,
    options: &ResolvedPhotoOptions,
    output: &Path,
) -> Result<(), CameraError> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| CameraError::provider("decoding captured image", e))?;

    let mut img = if options.auto_square_crop {
        let (x, y, side) = square_crop_rect(decoded.width(), decoded.height());
        decoded.crop_imm(x, y, side, side)
    } else {
        decoded
    };

    img = match rotation_degrees.rem_euclid(360) {
        90 => img.rotate90(),
        180 => img.rotate180(),
        270 => img.rotate270(),
        _ => img,
    };

    if mirror {
        img = img.fliph();
    }

    let file = File::create(output).map_err(|e| CameraError::provider("creating photo file", e))?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, options.quality);
    img.write_with_encoder(encoder)
        .map_err(|e| CameraError::provider("encoding jpeg", e))?;

    Ok(())
}
