// This is free and unencumbered software released into the public domain.

//! Video recording flow support: the recording sub-state, the idempotent
//! device-rotation latch, and the best-effort gallery collaborator.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordingState {
    #[default]
    Idle,
    Starting,
    Recording,
    Stopping,
}

pub fn video_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("VID_{}.mp4", now.format("%Y%m%d%H%M%S"))
}

/// Host collaborator that pins and releases the device orientation while a
/// recording is running.
pub trait RotationLock: Send + Sync {
    fn lock(&self);
    fn unlock(&self);
}

/// Idempotence layer over [`RotationLock`]: retries and repeated stop calls
/// must not lock twice or unlock twice.
#[derive(Default)]
pub struct RotationLatch {
    lock: Option<Arc<dyn RotationLock>>,
    engaged: bool,
}

impl RotationLatch {
    pub fn new(lock: Option<Arc<dyn RotationLock>>) -> Self {
        Self {
            lock,
            engaged: false,
        }
    }

    pub fn engage(&mut self) {
        if self.engaged {
            return;
        }
        if let Some(lock) = &self.lock {
            lock.lock();
        }
        self.engaged = true;
    }

    pub fn release(&mut self) {
        if !self.engaged {
            return;
        }
        if let Some(lock) = &self.lock {
            lock.unlock();
        }
        self.engaged = false;
    }
}

/// Destination for captures the host wants mirrored into a shared gallery.
/// Persistence is best-effort: a failure is reported on its own and never
/// fails the capture that produced the file.
pub trait GalleryStore: Send + Sync {
    fn persist(&self, path: &Path) -> io::Result<()>;
}

/// Copies finished files into a flat directory.
pub struct DirGallery {
    dir: PathBuf,
}

impl DirGallery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl GalleryStore for DirGallery {
    fn persist(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no file name"))?;
        let dest = self.dir.join(name);
        std::fs::copy(path, &dest)?;
        debug!(dest = %dest.display(), "persisted capture to gallery");
        Ok(())
    }
}
