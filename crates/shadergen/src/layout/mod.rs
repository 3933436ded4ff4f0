//! Struct layout compilation
//!
//! This module turns declarative struct descriptors into per-target struct
//! declarations whose memory layouts agree byte for byte, inserting the padding
//! required by the packed GPU rule.

mod compiler;
mod descriptor;

pub use compiler::*;
pub use descriptor::*;
