// This is free and unencumbered software released into the public domain.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Rear,
}

impl CameraPosition {
    pub fn toggled(self) -> Self {
        match self {
            Self::Front => Self::Rear,
            Self::Rear => Self::Front,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    Photo,
    Video,
}

impl CameraMode {
    /// Each mode carries a default display ratio unless the host overrides it.
    pub fn default_ratio(self) -> DisplayRatio {
        match self {
            Self::Photo => DisplayRatio::FourByThree,
            Self::Video => DisplayRatio::SixteenByNine,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Off,
    On,
    Auto,
    Torch,
    /// Legacy value; behaves as `On`.
    RedEye,
}

impl FlashMode {
    /// The flash setting actually programmed on the still-capture unit.
    /// Torch is driven directly on the hardware, not through the capture.
    pub fn capture_setting(self) -> CaptureFlash {
        match self {
            Self::On | Self::RedEye => CaptureFlash::On,
            Self::Auto => CaptureFlash::Auto,
            Self::Off | Self::Torch => CaptureFlash::Off,
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On | Self::RedEye => Self::Auto,
            Self::Auto => Self::Torch,
            Self::Torch => Self::Off,
        }
    }
}

/// Flash as seen by a still-capture unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureFlash {
    Off,
    On,
    Auto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum WhiteBalance {
    #[default]
    Auto,
    Sunny,
    Cloudy,
    Shadow,
    Twilight,
    Fluorescent,
    Incandescent,
    WarmFluorescent,
}

/// Device orientation hint supplied by the host's orientation sensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Orientation {
    /// Target rotation for the capture units, or `None` when unknown.
    pub fn surface_rotation(self) -> Option<SurfaceRotation> {
        match self {
            Self::Unknown => None,
            Self::Portrait => Some(SurfaceRotation::Deg90),
            Self::PortraitUpsideDown => Some(SurfaceRotation::Deg270),
            Self::LandscapeLeft => Some(SurfaceRotation::Deg0),
            Self::LandscapeRight => Some(SurfaceRotation::Deg180),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceRotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayRatio {
    #[serde(rename = "4:3")]
    FourByThree,
    #[serde(rename = "16:9")]
    SixteenByNine,
}

impl DisplayRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FourByThree => "4:3",
            Self::SixteenByNine => "16:9",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "4:3" => Some(Self::FourByThree),
            "16:9" => Some(Self::SixteenByNine),
            _ => None,
        }
    }
}

impl core::fmt::Display for DisplayRatio {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two mutually exclusive representations of the physical zoom.
/// Last write wins; storing one discards any pending value of the other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Zoom {
    /// Normalized zoom in `[0, 1]`.
    Linear(f32),
    /// Optical ratio in `[min_ratio, max_ratio]`.
    Ratio(f32),
}

impl Zoom {
    pub fn linear(value: f32) -> Self {
        Self::Linear(value.clamp(0.0, 1.0))
    }
}

/// Quality tier requested for video recording; the provider maps it onto the
/// nearest capture profile it supports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    Lowest,
    Qvga,
    Max480p,
    #[default]
    Max720p,
    Max1080p,
    Max2160p,
    Highest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }
}

impl core::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
