//! `wgpu` implementation of the graphics seams.
//!
//! - `context` acquires the instance/surface/device triple for a window and
//!   reconfigures the swapchain on resize.
//! - `pipeline` turns the fixed GLSL sources into a render pipeline with one
//!   uniform bind group, and owns the full-surface triangle buffer.

mod context;
mod pipeline;

pub use context::{WgpuBackend, WgpuContext};
pub use pipeline::{WgpuMesh, WgpuProgram};
