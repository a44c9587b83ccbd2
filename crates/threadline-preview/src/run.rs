use std::sync::Arc;

use anyhow::{anyhow, Result};
use threadline::gpu::WgpuBackend;
use threadline::{Backdrop, BackdropConfig, FrameStatus, HostEvent, Reconcile};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::cli::Cli;
use crate::config;
use crate::host::{RedrawScheduler, WindowHost};

type PreviewBackdrop = Backdrop<WindowHost, RedrawScheduler, WgpuBackend<Arc<Window>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Remount,
    ToggleInteraction,
    Quit,
}

fn key_action(key: &Key) -> Option<KeyAction> {
    match key {
        Key::Named(NamedKey::Escape) => Some(KeyAction::Quit),
        Key::Character(value) if value.eq_ignore_ascii_case("r") => Some(KeyAction::Remount),
        Key::Character(value) if value.eq_ignore_ascii_case("i") => {
            Some(KeyAction::ToggleInteraction)
        }
        _ => None,
    }
}

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();
    let mut config = config::resolve(&cli)?;

    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let (width, height) = cli.size;
    let window = WindowBuilder::new()
        .with_title("Threadline Preview")
        .with_inner_size(PhysicalSize::new(width, height))
        .with_transparent(true)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);

    let mut backdrop: PreviewBackdrop = Backdrop::new(
        WindowHost::new(window.clone()),
        RedrawScheduler::new(window.clone()),
        WgpuBackend::new(window.clone()),
    );
    if let Err(err) = backdrop.mount(config) {
        error!("backdrop unavailable, showing an empty window: {err}");
    }
    info!("press R to remount, I to toggle pointer interaction, Esc to quit");

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);
            let Event::WindowEvent { window_id, event } = event else {
                return;
            };
            if window_id != window.id() {
                return;
            }
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    backdrop.unmount();
                    elwt.exit();
                }
                WindowEvent::Resized(_) => backdrop.dispatch(HostEvent::Resize),
                WindowEvent::CursorMoved { position, .. } => {
                    backdrop.dispatch(HostEvent::PointerMove {
                        client_x: position.x,
                        client_y: position.y,
                    });
                }
                WindowEvent::CursorLeft { .. } => backdrop.dispatch(HostEvent::PointerLeave),
                WindowEvent::KeyboardInput { event, .. }
                    if event.state == ElementState::Pressed && !event.repeat =>
                {
                    match key_action(&event.logical_key) {
                        Some(KeyAction::Quit) => {
                            backdrop.unmount();
                            elwt.exit();
                        }
                        Some(KeyAction::Remount) => toggle_mount(&mut backdrop, config),
                        Some(KeyAction::ToggleInteraction) => {
                            config =
                                config.with_mouse_interaction(!config.enable_mouse_interaction);
                            apply(&mut backdrop, config);
                        }
                        None => {}
                    }
                }
                WindowEvent::RedrawRequested => {
                    let Some(token) = backdrop.scheduler_mut().take_fired() else {
                        return;
                    };
                    let timestamp = backdrop.scheduler().timestamp_ms();
                    if backdrop.on_frame(token, timestamp) == FrameStatus::Halted {
                        error!("backdrop stopped rendering; press R to restart it");
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("preview event loop error: {err}"))
}

fn toggle_mount(backdrop: &mut PreviewBackdrop, config: BackdropConfig) {
    if backdrop.is_mounted() {
        backdrop.unmount();
        debug!(listeners = backdrop.host().listener_count(), "backdrop removed");
    } else if let Err(err) = backdrop.mount(config) {
        error!("failed to remount backdrop: {err}");
    }
}

fn apply(backdrop: &mut PreviewBackdrop, config: BackdropConfig) {
    match backdrop.update(config) {
        Ok(Reconcile::Rebuilt) => info!(
            interactive = config.enable_mouse_interaction,
            "backdrop rebuilt with new config"
        ),
        Ok(Reconcile::Kept) => debug!("backdrop config unchanged"),
        Err(err) => error!("failed to apply backdrop config: {err}"),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
