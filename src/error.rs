// This is free and unencumbered software released into the public domain.

use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("missing permission: {0}")]
    Permission(String),

    #[error("binding the capture pipeline failed while {context}")]
    Bind {
        context: &'static str,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("capture failed: {0}")]
    Capture(String),

    /// Gallery save failed. Non-fatal: the primary capture still succeeded
    /// and its success event must not be suppressed.
    #[error("failed to persist to gallery")]
    Persistence(#[source] std::io::Error),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("session released")]
    Released,

    #[error("provider error while {context}")]
    Provider {
        context: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Other(String),
}

impl CameraError {
    #[inline]
    pub fn provider(context: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Provider {
            context,
            source: Box::new(source),
        }
    }

    #[inline]
    pub fn bind(context: &'static str) -> Self {
        Self::Bind {
            context,
            source: None,
        }
    }

    #[inline]
    pub fn bind_caused(
        context: &'static str,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Bind {
            context,
            source: Some(Box::new(source)),
        }
    }

    #[inline]
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    #[inline]
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    #[inline]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    #[inline]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("input list is empty")]
    EmptyInput,

    #[error("output path is not valid: {0}")]
    InvalidOutput(String),

    #[error("segment {index} has no video track")]
    NoVideoTrack { index: usize },

    #[error("failed to probe segment {index}")]
    Probe {
        index: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("i/o error on segment {index}")]
    Segment {
        index: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("failed to write output")]
    Output(#[source] Box<dyn StdError + Send + Sync>),

    #[error("i/o error")]
    Io(#[from] std::io::Error),
}

impl MergeError {
    #[inline]
    pub fn probe(index: usize, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Probe {
            index,
            source: source.into(),
        }
    }

    #[inline]
    pub fn segment(index: usize, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Segment {
            index,
            source: source.into(),
        }
    }

    #[inline]
    pub fn output(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Output(source.into())
    }

    /// Index of the failing input segment, when the failure is attributable
    /// to one.
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            Self::NoVideoTrack { index } | Self::Probe { index, .. } | Self::Segment { index, .. } => {
                Some(*index)
            },
            _ => None,
        }
    }
}
