//! Image resource tables
//!
//! Expands the ordered resource list into per-instance tables (formats, flags,
//! image bindings, sampler bindings, debug names) shared by every artifact.

mod allocator;
mod descriptor;
mod naming;

pub use allocator::*;
pub use descriptor::*;
pub use naming::*;
