// This is free and unencumbered software released into the public domain.

//! Per-call capture options and their resolution against session-level
//! defaults.
//!
//! Resolution follows a defined-value override: a field set on the call wins
//! only when it is provided and truthy (`true`, a non-empty string, a
//! non-zero number); otherwise the session's persisted property applies.
//! The `-1` bitrate/framerate sentinel means "let the hardware choose" and
//! is preserved end-to-end.

use crate::types::VideoQuality;
use serde::{Deserialize, Serialize};

/// The hardware-chooses sentinel for bitrate/framerate fields.
pub const HARDWARE_DEFAULT: i32 = -1;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoOptions {
    pub confirm_photos: Option<bool>,
    pub confirm_retake_text: Option<String>,
    pub confirm_save_text: Option<String>,
    pub save_to_gallery: Option<bool>,
    pub auto_square_crop: Option<bool>,
    /// JPEG compression level in `[1, 100]`.
    pub quality: Option<u8>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoOptions {
    pub save_to_gallery: Option<bool>,
    pub video_quality: Option<VideoQuality>,
    pub max_video_bit_rate: Option<i32>,
    pub max_frame_rate: Option<i32>,
    pub max_audio_bit_rate: Option<i32>,
}

/// Session-level defaults the per-call options resolve against.
#[derive(Clone, Debug)]
pub struct SessionDefaults {
    pub confirm_photos: bool,
    pub confirm_retake_text: String,
    pub confirm_save_text: String,
    pub save_to_gallery: bool,
    pub auto_square_crop: bool,
    pub quality: u8,
    pub video_quality: VideoQuality,
    pub max_video_bit_rate: i32,
    pub max_frame_rate: i32,
    pub max_audio_bit_rate: i32,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            confirm_photos: false,
            confirm_retake_text: "Retake".into(),
            confirm_save_text: "Save".into(),
            save_to_gallery: false,
            auto_square_crop: false,
            quality: 95,
            video_quality: VideoQuality::default(),
            max_video_bit_rate: HARDWARE_DEFAULT,
            max_frame_rate: HARDWARE_DEFAULT,
            max_audio_bit_rate: HARDWARE_DEFAULT,
        }
    }
}

/// One fully resolved snapshot of photo options, queued per in-flight capture
/// so the completion callback sees the values current at request time.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPhotoOptions {
    pub confirm_photos: bool,
    pub confirm_retake_text: String,
    pub confirm_save_text: String,
    pub save_to_gallery: bool,
    pub auto_square_crop: bool,
    pub quality: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedVideoOptions {
    pub save_to_gallery: bool,
    pub video_quality: VideoQuality,
    pub max_video_bit_rate: i32,
    pub max_frame_rate: i32,
    pub max_audio_bit_rate: i32,
}

fn truthy_bool(explicit: Option<bool>, fallback: bool) -> bool {
    if explicit == Some(true) { true } else { fallback }
}

fn truthy_str(explicit: Option<&String>, fallback: &str) -> String {
    match explicit {
        Some(s) if !s.is_empty() => s.clone(),
        _ => fallback.to_string(),
    }
}

impl PhotoOptions {
    pub fn resolve(&self, defaults: &SessionDefaults) -> ResolvedPhotoOptions {
        ResolvedPhotoOptions {
            confirm_photos: truthy_bool(self.confirm_photos, defaults.confirm_photos),
            confirm_retake_text: truthy_str(
                self.confirm_retake_text.as_ref(),
                &defaults.confirm_retake_text,
            ),
            confirm_save_text: truthy_str(
                self.confirm_save_text.as_ref(),
                &defaults.confirm_save_text,
            ),
            save_to_gallery: truthy_bool(self.save_to_gallery, defaults.save_to_gallery),
            auto_square_crop: truthy_bool(self.auto_square_crop, defaults.auto_square_crop),
            quality: match self.quality {
                Some(q) if (1..=100).contains(&q) => q,
                _ => defaults.quality,
            },
        }
    }
}

impl VideoOptions {
    pub fn resolve(&self, defaults: &SessionDefaults) -> ResolvedVideoOptions {
        // A zero bitrate/framerate is not a defined value; -1 is, and passes
        // through untouched.
        let rate = |explicit: Option<i32>, fallback: i32| match explicit {
            Some(v) if v != 0 => v,
            _ => fallback,
        };

        ResolvedVideoOptions {
            save_to_gallery: truthy_bool(self.save_to_gallery, defaults.save_to_gallery),
            video_quality: self.video_quality.unwrap_or(defaults.video_quality),
            max_video_bit_rate: rate(self.max_video_bit_rate, defaults.max_video_bit_rate),
            max_frame_rate: rate(self.max_frame_rate, defaults.max_frame_rate),
            max_audio_bit_rate: rate(self.max_audio_bit_rate, defaults.max_audio_bit_rate),
        }
    }
}
