//! Error taxonomy for the perception pipeline.
//!
//! Only malformed inputs and bad configuration surface as errors. An empty
//! observation (no set pixels after cropping) is a valid frame, and world
//! coordinates are clipped structurally, so neither appears here.

use crate::homography::HomographyError;

#[derive(Debug, Clone, PartialEq)]
pub enum PerceptionError {
    /// Image with a zero dimension.
    EmptyImage { width: u32, height: u32 },
    /// Raw frame buffer with an unexpected channel count.
    ChannelCount { expected: usize, got: usize },
    /// Raw frame buffer whose length does not match `width * height * channels`.
    BufferLength { expected: usize, got: usize },
    /// Frame or overlay size differs from the configured image size.
    DimensionMismatch {
        what: &'static str,
        expected: [u32; 2],
        got: [u32; 2],
    },
    /// The calibration quadrilaterals could not be turned into a transform.
    Homography(HomographyError),
    /// Configuration rejected by [`PerceptionConfig::validate`](crate::PerceptionConfig::validate).
    InvalidConfig(String),
}

impl std::fmt::Display for PerceptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyImage { width, height } => {
                write!(f, "image has non-positive dimensions {}x{}", width, height)
            }
            Self::ChannelCount { expected, got } => {
                write!(f, "expected {} channels, got {}", expected, got)
            }
            Self::BufferLength { expected, got } => {
                write!(f, "frame buffer length {} does not match expected {}", got, expected)
            }
            Self::DimensionMismatch {
                what,
                expected,
                got,
            } => write!(
                f,
                "{} size {}x{} does not match configured {}x{}",
                what, got[0], got[1], expected[0], expected[1]
            ),
            Self::Homography(err) => write!(f, "calibration failed: {}", err),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for PerceptionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Homography(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HomographyError> for PerceptionError {
    fn from(err: HomographyError) -> Self {
        Self::Homography(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_mentions_sizes() {
        let err = PerceptionError::DimensionMismatch {
            what: "frame",
            expected: [320, 160],
            got: [640, 480],
        };
        let msg = err.to_string();
        assert!(msg.contains("640x480"));
        assert!(msg.contains("320x160"));
    }

    #[test]
    fn homography_error_is_exposed_as_source() {
        let err = PerceptionError::from(HomographyError::Singular);
        assert!(err.source().is_some());
        assert!(PerceptionError::InvalidConfig("x".into()).source().is_none());
    }
}
