// This is free and unencumbered software released into the public domain.

//! Camera session controller, capture flows, and video segment merger behind
//! a uniform provider trait.
//!
//! The [`CameraSession`] state machine owns position, mode, zoom, flash,
//! white balance, and rotation, drives a [`CaptureBinder`] over a
//! platform-specific [`CameraProvider`], and reports every outcome through
//! an [`EventSink`]. The [`merge`] operation combines finished video
//! segments into one container and never touches the live camera.

mod binder;
pub use binder::*;

mod capability;
pub use capability::*;

mod controller;
pub use controller::*;

pub mod drivers {
    #[cfg(feature = "ffmpeg")]
    pub mod ffmpeg;
}

mod error;
pub use error::*;

mod events;
pub use events::*;

mod focus;
pub use focus::*;

mod merge;
pub use merge::*;

mod options;
pub use options::*;

mod photo;
pub use photo::*;

mod provider;
pub use provider::*;

mod types;
pub use types::*;

mod video;
pub use video::*;
