#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use threadline::{
    BackdropError, DrawError, FrameRequest, FrameScheduler, FrameToken, GraphicsBackend,
    GraphicsContext, ListenerId, ListenerKind, ListenerRegistry, ShaderSources, SurfaceBounds,
    SurfaceHost, UniformBlock,
};

#[derive(Debug, Default)]
pub struct FakeHost {
    pub bounds: SurfaceBounds,
    pub listeners: ListenerRegistry,
    pub output_attached: bool,
    pub attach_count: usize,
}

impl FakeHost {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            bounds: SurfaceBounds::sized(width, height),
            ..Self::default()
        }
    }
}

impl SurfaceHost for FakeHost {
    fn bounds(&self) -> SurfaceBounds {
        self.bounds
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.listeners.add(kind)
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn attach_output(&mut self) {
        assert!(!self.output_attached, "output attached twice");
        self.output_attached = true;
        self.attach_count += 1;
    }

    fn detach_output(&mut self) -> bool {
        std::mem::replace(&mut self.output_attached, false)
    }
}

/// Frame scheduler whose requests only fire when the test says so.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    outstanding: VecDeque<(FrameToken, FrameRequest)>,
    pub history: Vec<(FrameToken, FrameRequest)>,
    pub cancelled: Vec<FrameRequest>,
}

impl ManualScheduler {
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Pops the oldest outstanding request, as the display would fire it.
    pub fn fire(&mut self) -> Option<FrameToken> {
        self.outstanding.pop_front().map(|(token, _)| token)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self, token: FrameToken) -> FrameRequest {
        self.next += 1;
        let request = FrameRequest(self.next);
        self.outstanding.push_back((token, request));
        self.history.push((token, request));
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.outstanding.retain(|(_, pending)| *pending != request);
        self.cancelled.push(request);
    }
}

#[derive(Debug, Default)]
pub struct GpuLedger {
    pub acquired: usize,
    pub live_contexts: usize,
    pub live_programs: usize,
    pub live_meshes: usize,
    pub lost: usize,
    pub sizes: Vec<(u32, u32)>,
    pub draws: Vec<UniformBlock>,
    pub blending: bool,
    pub fail_context: bool,
    pub fail_compile: bool,
    pub draw_errors: VecDeque<DrawError>,
}

pub type Ledger = Rc<RefCell<GpuLedger>>;

#[derive(Debug, Default, Clone)]
pub struct FakeBackend {
    pub ledger: Ledger,
}

impl FakeBackend {
    pub fn new() -> (Self, Ledger) {
        let backend = Self::default();
        let ledger = backend.ledger.clone();
        (backend, ledger)
    }
}

impl GraphicsBackend for FakeBackend {
    type Context = FakeContext;

    fn acquire_context(&mut self, width: u32, height: u32) -> threadline::Result<FakeContext> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.fail_context {
            return Err(BackdropError::ContextCreation("no adapter".into()));
        }
        ledger.acquired += 1;
        ledger.live_contexts += 1;
        ledger.sizes.push((width, height));
        Ok(FakeContext {
            ledger: self.ledger.clone(),
            size: (width, height),
        })
    }
}

#[derive(Debug)]
pub struct FakeContext {
    ledger: Ledger,
    pub size: (u32, u32),
}

impl Drop for FakeContext {
    fn drop(&mut self) {
        self.ledger.borrow_mut().live_contexts -= 1;
    }
}

#[derive(Debug)]
pub struct FakeProgram(Ledger);

impl Drop for FakeProgram {
    fn drop(&mut self) {
        self.0.borrow_mut().live_programs -= 1;
    }
}

#[derive(Debug)]
pub struct FakeMesh(Ledger);

impl Drop for FakeMesh {
    fn drop(&mut self) {
        self.0.borrow_mut().live_meshes -= 1;
    }
}

impl GraphicsContext for FakeContext {
    type Program = FakeProgram;
    type Mesh = FakeMesh;

    fn configure_blending(&mut self) {
        self.ledger.borrow_mut().blending = true;
    }

    fn compile_program(&mut self, sources: ShaderSources<'_>) -> threadline::Result<FakeProgram> {
        assert!(sources.fragment.contains("uMouse"));
        let mut ledger = self.ledger.borrow_mut();
        if ledger.fail_compile {
            return Err(BackdropError::ProgramCompile("syntax error".into()));
        }
        ledger.live_programs += 1;
        Ok(FakeProgram(self.ledger.clone()))
    }

    fn create_fullscreen_triangle(&mut self) -> threadline::Result<FakeMesh> {
        self.ledger.borrow_mut().live_meshes += 1;
        Ok(FakeMesh(self.ledger.clone()))
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.ledger.borrow_mut().sizes.push((width, height));
    }

    fn max_surface_dimension(&self) -> Option<u32> {
        Some(4096)
    }

    fn draw(
        &mut self,
        _program: &FakeProgram,
        _mesh: &FakeMesh,
        uniforms: &UniformBlock,
    ) -> Result<(), DrawError> {
        let mut ledger = self.ledger.borrow_mut();
        if let Some(err) = ledger.draw_errors.pop_front() {
            return Err(err);
        }
        ledger.draws.push(*uniforms);
        Ok(())
    }

    fn lose_context(&mut self) -> bool {
        self.ledger.borrow_mut().lost += 1;
        true
    }
}
