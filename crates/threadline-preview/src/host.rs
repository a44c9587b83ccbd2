//! `winit` adapters for the backdrop's platform seams.

use std::sync::Arc;
use std::time::Instant;

use threadline::{
    FrameRequest, FrameScheduler, FrameToken, ListenerId, ListenerKind, ListenerRegistry,
    SurfaceBounds, SurfaceHost,
};
use tracing::debug;
use winit::window::Window;

/// Treats the window's client area as the backdrop container.
///
/// Listeners are bookkeeping only: the event loop forwards every event and the
/// session filters by what it subscribed to.
pub struct WindowHost {
    window: Arc<Window>,
    listeners: ListenerRegistry,
    output_attached: bool,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            listeners: ListenerRegistry::new(),
            output_attached: false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl SurfaceHost for WindowHost {
    fn bounds(&self) -> SurfaceBounds {
        let size = self.window.inner_size();
        SurfaceBounds::sized(f64::from(size.width), f64::from(size.height))
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.listeners.add(kind)
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn attach_output(&mut self) {
        self.output_attached = true;
        debug!("backdrop output attached to window");
    }

    fn detach_output(&mut self) -> bool {
        let was_attached = std::mem::replace(&mut self.output_attached, false);
        if was_attached {
            // Repaint so the compositor drops the last presented frame.
            self.window.request_redraw();
        }
        was_attached
    }
}

/// Maps frame requests onto `Window::request_redraw`.
///
/// winit cannot retract a redraw request, so cancellation only forgets the
/// pending token; the redraw still arrives and finds nothing to fire.
pub struct RedrawScheduler {
    window: Arc<Window>,
    started: Instant,
    next_request: u64,
    pending: Option<(FrameToken, FrameRequest)>,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            started: Instant::now(),
            next_request: 0,
            pending: None,
        }
    }

    /// Token of the request being served by the current redraw, if any.
    pub fn take_fired(&mut self) -> Option<FrameToken> {
        self.pending.take().map(|(token, _)| token)
    }

    /// Milliseconds since the scheduler was created.
    pub fn timestamp_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self, token: FrameToken) -> FrameRequest {
        self.next_request += 1;
        let request = FrameRequest(self.next_request);
        self.pending = Some((token, request));
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if matches!(self.pending, Some((_, pending)) if pending == request) {
            self.pending = None;
        }
    }
}
