//! Rendering-session lifecycle.
//!
//! A [`RenderSession`] owns everything that must be released together: the
//! rendering context, the compiled program, the full-surface mesh, the
//! listeners it attached to the host, and the animation loop driving it.
//!
//! ```text
//!   start ──▶ acquire context ─▶ compile program ─▶ allocate mesh
//!                │                                       │
//!                │           attach output, listeners ◀──┘
//!                ▼
//!   dispose ◀── stop loop ◀── teardown list (reverse) ◀── lose context
//! ```
//!
//! Every method takes the host and scheduler explicitly; the session never
//! captures them, so a callback can only reach state through `&mut self`.

use tracing::{debug, warn};

use crate::compile::shader_sources;
use crate::error::{DrawError, Result};
use crate::platform::{GraphicsBackend, GraphicsContext, ListenerId, SurfaceHost};
use crate::pointer::PointerTracker;
use crate::runtime::{AnimationLoop, FrameScheduler, FrameToken};
use crate::types::{BackdropConfig, HostEvent, ListenerKind};
use crate::uniforms::{UniformState, POINTER_CENTER};

/// Outcome of one [`RenderSession::render_frame`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// One draw call was issued.
    Presented,
    /// The draw failed transiently; the loop keeps going.
    Skipped,
    /// The context can no longer render; the loop should stop.
    Halted,
    /// No live session, or the frame belonged to a stopped run.
    Inactive,
}

/// Resources released in reverse order on dispose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Teardown {
    Output,
    Listener(ListenerKind, ListenerId),
}

struct Live<C: GraphicsContext> {
    // Field order is drop order: mesh and program go before their context.
    mesh: C::Mesh,
    program: C::Program,
    context: C,
    config: BackdropConfig,
    uniforms: UniformState,
}

pub struct RenderSession<C: GraphicsContext> {
    live: Option<Live<C>>,
    pointer: PointerTracker,
    teardown: Vec<Teardown>,
    animation: AnimationLoop,
}

impl<C: GraphicsContext> Default for RenderSession<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: GraphicsContext> RenderSession<C> {
    pub fn new() -> Self {
        Self {
            live: None,
            pointer: PointerTracker::default(),
            teardown: Vec::new(),
            animation: AnimationLoop::new(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn config(&self) -> Option<&BackdropConfig> {
        self.live.as_ref().map(|live| &live.config)
    }

    pub fn uniforms(&self) -> Option<&UniformState> {
        self.live.as_ref().map(|live| &live.uniforms)
    }

    pub fn context(&self) -> Option<&C> {
        self.live.as_ref().map(|live| &live.context)
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn animation(&self) -> &AnimationLoop {
        &self.animation
    }

    /// Listeners this session currently holds on the host.
    pub fn listener_count(&self) -> usize {
        self.teardown
            .iter()
            .filter(|entry| matches!(entry, Teardown::Listener(..)))
            .count()
    }

    fn listens_to(&self, kind: ListenerKind) -> bool {
        self.teardown
            .iter()
            .any(|entry| matches!(entry, Teardown::Listener(attached, _) if *attached == kind))
    }

    /// Builds a fresh session on `host`, disposing any previous one first.
    ///
    /// On error nothing stays attached to the host and the session is unset.
    pub fn start<H, S, B>(
        &mut self,
        host: &mut H,
        scheduler: &mut S,
        backend: &mut B,
        config: &BackdropConfig,
    ) -> Result<()>
    where
        H: SurfaceHost + ?Sized,
        S: FrameScheduler + ?Sized,
        B: GraphicsBackend<Context = C> + ?Sized,
    {
        self.dispose(host, scheduler);
        config.validate()?;

        let (width, height) = host.bounds().client_size();
        let mut context = backend.acquire_context(width, height)?;
        context.configure_blending();

        let program = match context.compile_program(shader_sources()) {
            Ok(program) => program,
            Err(err) => {
                context.lose_context();
                return Err(err);
            }
        };
        let mesh = match context.create_fullscreen_triangle() {
            Ok(mesh) => mesh,
            Err(err) => {
                drop(program);
                context.lose_context();
                return Err(err);
            }
        };

        self.pointer.reset();
        self.live = Some(Live {
            mesh,
            program,
            context,
            config: *config,
            uniforms: UniformState::new(config, width, height),
        });

        host.attach_output();
        self.teardown.push(Teardown::Output);
        self.subscribe(host, ListenerKind::Resize);
        if config.enable_mouse_interaction {
            self.subscribe(host, ListenerKind::PointerMove);
            self.subscribe(host, ListenerKind::PointerLeave);
        }

        self.resize(&*host);
        debug!(
            width,
            height,
            interactive = config.enable_mouse_interaction,
            "render session started"
        );
        Ok(())
    }

    fn subscribe<H: SurfaceHost + ?Sized>(&mut self, host: &mut H, kind: ListenerKind) {
        let id = host.add_listener(kind);
        self.teardown.push(Teardown::Listener(kind, id));
    }

    /// Starts driving frames. No-op without a live session.
    pub fn animate<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> Option<FrameToken> {
        if self.live.is_none() {
            return None;
        }
        Some(self.animation.start(scheduler))
    }

    /// Matches the drawable surface and resolution uniforms to the host bounds.
    pub fn resize<H: SurfaceHost + ?Sized>(&mut self, host: &H) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        let (mut width, mut height) = host.bounds().client_size();
        if width == 0 || height == 0 {
            return;
        }
        if let Some(max) = live.context.max_surface_dimension() {
            if width > max || height > max {
                warn!(width, height, max, "clamping backdrop to the context's surface limit");
                width = width.min(max);
                height = height.min(max);
            }
        }
        live.context.set_size(width, height);
        live.uniforms.set_resolution(width, height);
    }

    /// Routes a host event, but only for listeners this session attached.
    pub fn handle_event<H: SurfaceHost + ?Sized>(&mut self, host: &H, event: HostEvent) {
        if self.live.is_none() || !self.listens_to(event.kind()) {
            return;
        }
        match event {
            HostEvent::Resize => self.resize(host),
            HostEvent::PointerMove { client_x, client_y } => {
                self.pointer.on_pointer_move(client_x, client_y, host.bounds());
            }
            HostEvent::PointerLeave => self.pointer.on_pointer_leave(),
        }
    }

    /// Advances the uniforms to `timestamp_ms` and issues one draw call.
    pub fn render_frame(&mut self, timestamp_ms: f64) -> FrameStatus {
        let Some(live) = self.live.as_mut() else {
            return FrameStatus::Inactive;
        };

        live.uniforms.set_time_ms(timestamp_ms);
        let pointer = if live.config.enable_mouse_interaction {
            self.pointer.tick()
        } else {
            POINTER_CENTER
        };
        live.uniforms.set_pointer(pointer);

        let block = live.uniforms.to_block();
        match live.context.draw(&live.program, &live.mesh, &block) {
            Ok(()) => FrameStatus::Presented,
            Err(DrawError::Transient(reason)) => {
                debug!(%reason, "skipping backdrop frame");
                FrameStatus::Skipped
            }
            Err(DrawError::Fatal(reason)) => {
                warn!(%reason, "backdrop context stopped rendering");
                FrameStatus::Halted
            }
        }
    }

    /// Handles a fired frame request: renders when `token` belongs to the live
    /// run, then schedules the next frame unless rendering halted.
    pub fn on_frame<S: FrameScheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
        token: FrameToken,
        timestamp_ms: f64,
    ) -> FrameStatus {
        if self.live.is_none() || !self.animation.accept(token) {
            return FrameStatus::Inactive;
        }
        let status = self.render_frame(timestamp_ms);
        if status == FrameStatus::Halted {
            self.animation.stop(scheduler);
        } else {
            self.animation.reschedule(scheduler);
        }
        status
    }

    /// Releases everything the session holds. Safe to call repeatedly.
    pub fn dispose<H, S>(&mut self, host: &mut H, scheduler: &mut S)
    where
        H: SurfaceHost + ?Sized,
        S: FrameScheduler + ?Sized,
    {
        self.animation.stop(scheduler);

        while let Some(entry) = self.teardown.pop() {
            match entry {
                Teardown::Listener(kind, id) => {
                    if !host.remove_listener(id) {
                        debug!(?kind, id = id.0, "listener was already detached");
                    }
                }
                Teardown::Output => {
                    host.detach_output();
                }
            }
        }

        if let Some(live) = self.live.take() {
            let Live {
                mesh,
                program,
                mut context,
                ..
            } = live;
            drop(mesh);
            drop(program);
            if !context.lose_context() {
                debug!("context loss is unsupported; relying on drop to release it");
            }
            drop(context);
            debug!("render session disposed");
        }

        self.pointer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackdropError;
    use crate::platform::ShaderSources;
    use crate::runtime::FrameRequest;
    use crate::types::SurfaceBounds;
    use crate::uniforms::UniformBlock;

    #[derive(Default)]
    struct RecordingHost {
        next: u64,
        log: Vec<String>,
    }

    impl SurfaceHost for RecordingHost {
        fn bounds(&self) -> SurfaceBounds {
            SurfaceBounds::sized(64.0, 32.0)
        }

        fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
            self.next += 1;
            self.log.push(format!("add {kind:?}"));
            ListenerId(self.next)
        }

        fn remove_listener(&mut self, id: ListenerId) -> bool {
            self.log.push(format!("remove {}", id.0));
            true
        }

        fn attach_output(&mut self) {
            self.log.push("attach".into());
        }

        fn detach_output(&mut self) -> bool {
            self.log.push("detach".into());
            true
        }
    }

    #[derive(Default)]
    struct NullScheduler(u64);

    impl FrameScheduler for NullScheduler {
        fn request_frame(&mut self, _token: FrameToken) -> FrameRequest {
            self.0 += 1;
            FrameRequest(self.0)
        }

        fn cancel_frame(&mut self, _request: FrameRequest) {}
    }

    struct StubContext;

    impl GraphicsContext for StubContext {
        type Program = ();
        type Mesh = ();

        fn configure_blending(&mut self) {}

        fn compile_program(&mut self, _sources: ShaderSources<'_>) -> Result<()> {
            Ok(())
        }

        fn create_fullscreen_triangle(&mut self) -> Result<()> {
            Err(BackdropError::MeshAllocation("out of memory".into()))
        }

        fn set_size(&mut self, _width: u32, _height: u32) {}

        fn draw(&mut self, _: &(), _: &(), _: &UniformBlock) -> std::result::Result<(), DrawError> {
            Ok(())
        }

        fn lose_context(&mut self) -> bool {
            false
        }
    }

    struct WorkingContext;

    impl GraphicsContext for WorkingContext {
        type Program = ();
        type Mesh = ();

        fn configure_blending(&mut self) {}

        fn compile_program(&mut self, _sources: ShaderSources<'_>) -> Result<()> {
            Ok(())
        }

        fn create_fullscreen_triangle(&mut self) -> Result<()> {
            Ok(())
        }

        fn set_size(&mut self, _width: u32, _height: u32) {}

        fn draw(&mut self, _: &(), _: &(), _: &UniformBlock) -> std::result::Result<(), DrawError> {
            Ok(())
        }

        fn lose_context(&mut self) -> bool {
            true
        }
    }

    struct Backend<F>(F);

    impl<C: GraphicsContext, F: FnMut() -> C> GraphicsBackend for Backend<F> {
        type Context = C;

        fn acquire_context(&mut self, _width: u32, _height: u32) -> Result<C> {
            Ok((self.0)())
        }
    }

    #[test]
    fn teardown_runs_in_reverse_attach_order() {
        let mut host = RecordingHost::default();
        let mut scheduler = NullScheduler::default();
        let mut session = RenderSession::new();
        let config = BackdropConfig::default().with_mouse_interaction(true);

        session
            .start(&mut host, &mut scheduler, &mut Backend(|| WorkingContext), &config)
            .expect("start");
        assert_eq!(session.listener_count(), 3);
        host.log.clear();

        session.dispose(&mut host, &mut scheduler);
        assert_eq!(host.log, ["remove 3", "remove 2", "remove 1", "detach"]);
        assert_eq!(session.listener_count(), 0);
        assert!(!session.is_live());
    }

    #[test]
    fn mesh_failure_attaches_nothing() {
        let mut host = RecordingHost::default();
        let mut scheduler = NullScheduler::default();
        let mut session = RenderSession::new();

        let err = session
            .start(
                &mut host,
                &mut scheduler,
                &mut Backend(|| StubContext),
                &BackdropConfig::default(),
            )
            .unwrap_err();
        assert!(matches!(err, BackdropError::MeshAllocation(_)));
        assert!(host.log.is_empty());
        assert!(session.animate(&mut scheduler).is_none());
    }

    #[test]
    fn events_without_a_listener_are_ignored() {
        let mut host = RecordingHost::default();
        let mut scheduler = NullScheduler::default();
        let mut session = RenderSession::new();
        session
            .start(
                &mut host,
                &mut scheduler,
                &mut Backend(|| WorkingContext),
                &BackdropConfig::default(),
            )
            .expect("start");

        session.handle_event(
            &host,
            HostEvent::PointerMove {
                client_x: 0.0,
                client_y: 0.0,
            },
        );
        assert_eq!(session.pointer().target(), POINTER_CENTER);
    }
}
