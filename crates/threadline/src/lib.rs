//! Threadline: an animated, pointer-reactive line-field backdrop.
//!
//! The crate manages the lifecycle of one GPU rendering session behind a
//! landing screen. The flow is:
//!
//! ```text
//!   host events ──▶ Backdrop::dispatch ──▶ PointerTracker / resize
//!                                                │
//!                                                ▼
//!   FrameScheduler ──▶ Backdrop::on_frame ──▶ UniformState ──▶ draw call
//! ```
//!
//! [`Backdrop`] decides when sessions are created and destroyed,
//! [`RenderSession`] owns the context/program/mesh triple and the listeners it
//! attached, and [`AnimationLoop`] keeps exactly one frame request in flight.
//! The platform plugs in through [`SurfaceHost`], [`FrameScheduler`] and
//! [`GraphicsBackend`]; [`gpu`] provides the `wgpu` backend.

mod backdrop;
mod compile;
mod error;
pub mod gpu;
mod platform;
mod pointer;
mod runtime;
mod session;
mod types;
mod uniforms;

pub use backdrop::{Backdrop, Reconcile};
pub use compile::{shader_sources, FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL};
pub use error::{BackdropError, DrawError, Result};
pub use platform::{
    GraphicsBackend, GraphicsContext, ListenerId, ListenerRegistry, ShaderSources, SurfaceHost,
};
pub use pointer::{PointerTracker, POINTER_SMOOTHING};
pub use runtime::{AnimationLoop, FrameRequest, FrameScheduler, FrameToken};
pub use session::{FrameStatus, RenderSession};
pub use types::{
    BackdropConfig, ConfigError, HostEvent, ListenerKind, SurfaceBounds, DEFAULT_AMPLITUDE,
    DEFAULT_COLOR, DEFAULT_DISTANCE,
};
pub use uniforms::{UniformBlock, UniformState, POINTER_CENTER};
