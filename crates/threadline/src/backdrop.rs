use tracing::{debug, info, warn};

use crate::error::Result;
use crate::platform::{GraphicsBackend, SurfaceHost};
use crate::runtime::{FrameScheduler, FrameToken};
use crate::session::{FrameStatus, RenderSession};
use crate::types::{BackdropConfig, HostEvent};

/// What [`Backdrop::update`] did with the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// Config was semantically unchanged; the session keeps running.
    Kept,
    /// The previous session was torn down and a new one started.
    Rebuilt,
}

/// Binds a [`RenderSession`] to the lifecycle of its host container.
///
/// Reconciliation rule: any change to the colour, amplitude, distance or
/// interaction flag tears the session down and builds a new one; nothing is
/// patched in place. Teardown always completes before the next start, so two
/// sessions never coexist on one host.
pub struct Backdrop<H, S, B>
where
    H: SurfaceHost,
    S: FrameScheduler,
    B: GraphicsBackend,
{
    host: H,
    scheduler: S,
    backend: B,
    session: RenderSession<B::Context>,
    config: Option<BackdropConfig>,
}

impl<H, S, B> Backdrop<H, S, B>
where
    H: SurfaceHost,
    S: FrameScheduler,
    B: GraphicsBackend,
{
    pub fn new(host: H, scheduler: S, backend: B) -> Self {
        Self {
            host,
            scheduler,
            backend,
            session: RenderSession::new(),
            config: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> &RenderSession<B::Context> {
        &self.session
    }

    /// Config of the mounted session, if any.
    pub fn config(&self) -> Option<&BackdropConfig> {
        self.config.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.config.is_some()
    }

    /// Starts a session with `config` and begins animating.
    ///
    /// On failure the host is left with no output and no listeners, so the
    /// surrounding screen shows an empty background.
    pub fn mount(&mut self, config: BackdropConfig) -> Result<()> {
        self.teardown();
        if let Err(err) = self.session.start(
            &mut self.host,
            &mut self.scheduler,
            &mut self.backend,
            &config,
        ) {
            warn!(error = %err, "backdrop failed to start; leaving background empty");
            return Err(err);
        }
        if let Some(token) = self.session.animate(&mut self.scheduler) {
            debug!(token = token.value(), "backdrop animation running");
        }
        self.config = Some(config);
        info!(
            interactive = config.enable_mouse_interaction,
            amplitude = config.amplitude,
            distance = config.distance,
            "backdrop mounted"
        );
        Ok(())
    }

    /// Applies `config`, rebuilding the session only when it changed.
    pub fn update(&mut self, config: BackdropConfig) -> Result<Reconcile> {
        if self.config == Some(config) && self.session.is_live() {
            return Ok(Reconcile::Kept);
        }
        self.mount(config)?;
        Ok(Reconcile::Rebuilt)
    }

    /// Full teardown: loop, listeners, output, context.
    pub fn unmount(&mut self) {
        if self.config.is_some() || self.session.is_live() {
            info!("backdrop unmounted");
        }
        self.teardown();
    }

    fn teardown(&mut self) {
        self.session.dispose(&mut self.host, &mut self.scheduler);
        self.config = None;
    }

    pub fn dispatch(&mut self, event: HostEvent) {
        self.session.handle_event(&self.host, event);
    }

    /// Entry point for the platform when a frame request fires.
    pub fn on_frame(&mut self, token: FrameToken, timestamp_ms: f64) -> FrameStatus {
        let status = self
            .session
            .on_frame(&mut self.scheduler, token, timestamp_ms);
        if status == FrameStatus::Halted {
            warn!("backdrop animation stopped after a fatal draw error");
        }
        status
    }
}

impl<H, S, B> Drop for Backdrop<H, S, B>
where
    H: SurfaceHost,
    S: FrameScheduler,
    B: GraphicsBackend,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
