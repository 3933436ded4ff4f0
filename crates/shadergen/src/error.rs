//! Error taxonomy for layout generation
//!
//! Every error is fatal: the generated artifacts must agree with each other, so a
//! partially generated set is as unusable as none at all.

use crate::types::{Dimension, ScalarType};

/// Errors produced while compiling descriptors into header text
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A type or format is not registered in the requested vocabulary
    #[error("unknown type: {0}")]
    UnknownType(UnknownType),

    /// A packed struct cannot be padded to the required alignment
    #[error("layout error in struct `{struct_name}`: {reason}")]
    Layout {
        /// Struct being compiled
        struct_name: String,
        /// What went wrong
        reason: String,
    },

    /// A derived constant references a constant that has no integer value yet
    #[error("constant `{name}` cannot be resolved: `{missing}` is undefined or not an integer")]
    UnresolvedConstant {
        /// Constant being derived
        name: String,
        /// The referenced constant that could not be used
        missing: String,
    },

    /// A descriptor violates a structural invariant (zero repeat count, bad dimension, ...)
    #[error("invalid descriptor `{descriptor}`: {reason}")]
    DescriptorInvariant {
        /// Name of the offending descriptor
        descriptor: String,
        /// Violated invariant
        reason: String,
    },

    /// The descriptor manifest could not be parsed
    #[error("failed to parse manifest: {0}")]
    Manifest(#[from] serde_norway::Error),

    /// Writing generated artifacts failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registry lookup miss
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownType {
    /// No scalar spelling for the type in the target vocabulary
    Scalar { target: &'static str, scalar: ScalarType },
    /// No size information for a (type, dimension) pair
    Sized { scalar: ScalarType, dimension: Dimension },
    /// No image format for a (pixel type, channel layout) pair
    ImageFormat { target: &'static str, pixel: ScalarType, channels: &'static str },
}

impl std::fmt::Display for UnknownType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar { target, scalar } => write!(f, "{scalar:?} has no {target} spelling"),
            Self::Sized { scalar, dimension } => write!(f, "{scalar:?} with dimension {dimension} has no registered size"),
            Self::ImageFormat { target, pixel, channels } => write!(f, "{pixel:?}/{channels} has no {target} image format"),
        }
    }
}

impl From<UnknownType> for Error {
    fn from(value: UnknownType) -> Self {
        Self::UnknownType(value)
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
