//! Animation loop scheduling.
//!
//! The host platform supplies a [`FrameScheduler`] that fires once per display
//! refresh. [`AnimationLoop`] keeps at most one request outstanding and stamps
//! every request with the token of the run that issued it, so a callback that
//! fires after `stop` (cancellation is not always synchronous) is recognised as
//! stale and ignored.

/// Identifies one Idle→Running transition of an [`AnimationLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Handle returned by the platform for a single pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Display-refresh callback primitive provided by the host platform.
///
/// When the request fires the platform calls back into
/// [`crate::Backdrop::on_frame`] with the same token and a monotonic timestamp
/// in milliseconds.
pub trait FrameScheduler {
    fn request_frame(&mut self, token: FrameToken) -> FrameRequest;
    /// Best-effort cancellation; unknown or already fired requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running {
        token: FrameToken,
        pending: Option<FrameRequest>,
    },
}

#[derive(Debug)]
pub struct AnimationLoop {
    state: LoopState,
    next_token: u64,
}

impl Default for AnimationLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            next_token: 1,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    pub fn token(&self) -> Option<FrameToken> {
        match self.state {
            LoopState::Running { token, .. } => Some(token),
            LoopState::Idle => None,
        }
    }

    /// Outstanding frame request, if any.
    pub fn pending(&self) -> Option<FrameRequest> {
        match self.state {
            LoopState::Running { pending, .. } => pending,
            LoopState::Idle => None,
        }
    }

    /// Starts a fresh run, stopping the previous one first.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> FrameToken {
        self.stop(scheduler);
        let token = FrameToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        let request = scheduler.request_frame(token);
        tracing::trace!(token = token.0, request = request.0, "animation loop started");
        self.state = LoopState::Running {
            token,
            pending: Some(request),
        };
        token
    }

    /// Consumes the outstanding request when `token` belongs to the live run.
    pub fn accept(&mut self, token: FrameToken) -> bool {
        match &mut self.state {
            LoopState::Running {
                token: live,
                pending,
            } if *live == token && pending.is_some() => {
                *pending = None;
                true
            }
            _ => {
                tracing::trace!(token = token.0, "ignoring stale animation frame");
                false
            }
        }
    }

    /// Requests the next frame; no-op when idle or a request is already pending.
    pub fn reschedule<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let LoopState::Running { token, pending } = &mut self.state {
            if pending.is_none() {
                *pending = Some(scheduler.request_frame(*token));
            }
        }
    }

    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let LoopState::Running { token, pending } = self.state {
            if let Some(request) = pending {
                scheduler.cancel_frame(request);
            }
            tracing::trace!(token = token.0, "animation loop stopped");
        }
        self.state = LoopState::Idle;
    }
}
