//! Seams between the backdrop core and the platform hosting it.

use std::collections::BTreeMap;

use crate::error::{DrawError, Result};
use crate::types::{ListenerKind, SurfaceBounds};
use crate::uniforms::UniformBlock;

/// Disposer handle for a listener attached to a [`SurfaceHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// The container the backdrop draws behind. Observed, never owned.
pub trait SurfaceHost {
    /// Current client-space bounds of the container.
    fn bounds(&self) -> SurfaceBounds;
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;
    /// Returns false when the id was not attached.
    fn remove_listener(&mut self, id: ListenerId) -> bool;
    /// Makes the rendered output visible inside the container.
    fn attach_output(&mut self);
    /// Returns false when nothing was attached.
    fn detach_output(&mut self) -> bool;
}

/// Bookkeeping for hosts that keep their listener set in memory.
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistry {
    next: u64,
    attached: BTreeMap<ListenerId, ListenerKind>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ListenerKind) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.attached.insert(id, kind);
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.attached.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn count(&self, kind: ListenerKind) -> usize {
        self.attached.values().filter(|attached| **attached == kind).count()
    }

    pub fn has(&self, kind: ListenerKind) -> bool {
        self.count(kind) > 0
    }
}

/// Shader stages compiled into one program.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

/// Acquires rendering contexts for the host's surface.
pub trait GraphicsBackend {
    type Context: GraphicsContext;

    /// Fails with [`crate::BackdropError::ContextCreation`] when the platform
    /// cannot provide one.
    fn acquire_context(&mut self, width: u32, height: u32) -> Result<Self::Context>;
}

/// An acquired rendering context. Dropping it releases the GPU resources.
pub trait GraphicsContext {
    type Program;
    type Mesh;

    /// Transparent clear colour and source-alpha blending.
    fn configure_blending(&mut self);
    fn compile_program(&mut self, sources: ShaderSources<'_>) -> Result<Self::Program>;
    /// Allocates the single triangle that covers the whole surface.
    fn create_fullscreen_triangle(&mut self) -> Result<Self::Mesh>;
    fn set_size(&mut self, width: u32, height: u32);
    /// Largest surface edge the context supports, when it can tell.
    fn max_surface_dimension(&self) -> Option<u32> {
        None
    }
    fn draw(
        &mut self,
        program: &Self::Program,
        mesh: &Self::Mesh,
        uniforms: &UniformBlock,
    ) -> std::result::Result<(), DrawError>;
    /// Forces the context into the lost state. Returns false when the
    /// capability is absent.
    fn lose_context(&mut self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_tracks_attached_listeners() {
        let mut registry = ListenerRegistry::new();
        let resize = registry.add(ListenerKind::Resize);
        let moved = registry.add(ListenerKind::PointerMove);
        assert_ne!(resize, moved);
        assert_eq!(registry.len(), 2);
        assert!(registry.has(ListenerKind::PointerMove));

        assert!(registry.remove(moved));
        assert!(!registry.remove(moved));
        assert_eq!(registry.count(ListenerKind::PointerMove), 0);
        assert!(registry.remove(resize));
        assert!(registry.is_empty());
    }
}
