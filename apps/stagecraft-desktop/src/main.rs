use anyhow::Result;
use clap::Parser;
use stagecraft_behavior::{Behavior, BehaviorError, BehaviorHandle, BehaviorRegistry, Capability};
use stagecraft_common::{CanvasSize, EntityId, Quadrant, Transform};
use stagecraft_frame::{FramePump, FrameScheduler, FrameToken, PlayState};
use stagecraft_render::{HeadlessBackend, RenderBackend, RendererConfig};
use stagecraft_scene::{CameraDescriptor, Scene};
use stagecraft_viewport::{SurfaceMetrics, VrMode, apply_resize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "stagecraft-desktop", about = "Windowed host for the stagecraft frame loop")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Backbuffer width cap in physical pixels (-1 = uncapped)
    #[arg(long, default_value = "1920")]
    max_canvas_width: i32,

    /// Backbuffer height cap in physical pixels (-1 = uncapped)
    #[arg(long, default_value = "1920")]
    max_canvas_height: i32,

    /// Pixel-ratio multiplier reapplied each frame
    #[arg(long)]
    pixel_ratio: Option<f64>,
}

/// Frame pump backed by winit redraw requests. A request marks a token
/// armed and asks the window for a redraw; `RedrawRequested` consumes the
/// token. Cancelling disarms, so an already-queued redraw fires into
/// nothing.
struct RedrawPump {
    window: Option<Arc<Window>>,
    next_token: FrameToken,
    armed: Option<FrameToken>,
}

impl RedrawPump {
    fn new() -> Self {
        Self {
            window: None,
            next_token: 0,
            armed: None,
        }
    }

    fn set_window(&mut self, window: Arc<Window>) {
        window.request_redraw();
        self.window = Some(window);
    }

    fn take_fired(&mut self) -> Option<FrameToken> {
        self.armed.take()
    }
}

impl FramePump for RedrawPump {
    fn request_frame(&mut self) -> FrameToken {
        self.next_token += 1;
        self.armed = Some(self.next_token);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        self.next_token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.armed == Some(token) {
            self.armed = None;
        }
    }
}

/// Demo behavior: logs a heartbeat roughly once a second from frame
/// deltas.
struct Heartbeat {
    entity: EntityId,
    accumulated_ms: f64,
}

impl Behavior for Heartbeat {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn capability(&self) -> Capability {
        Capability::TickOnly
    }

    fn tick(&mut self, time_ms: f64, delta_ms: f64) -> Result<(), BehaviorError> {
        self.accumulated_ms += delta_ms;
        if self.accumulated_ms >= 1000.0 {
            self.accumulated_ms = 0.0;
            tracing::info!(elapsed_ms = time_ms as u64, "heartbeat");
        }
        Ok(())
    }
}

struct HostApp {
    scheduler: FrameScheduler<RedrawPump>,
    scene: Scene,
    registry: BehaviorRegistry,
    backend: HeadlessBackend,
    window: Option<Arc<Window>>,
    frames: u64,
    last_report: Instant,
}

impl HostApp {
    fn new(config: RendererConfig) -> Self {
        let mut scene = Scene::new();
        scene.attributes_mut().register_system("camera");
        scene.attributes_mut().register_system("renderer");

        scene.spawn(Transform::default());
        scene.spawn(Transform {
            position: glam::Vec3::new(2.0, 1.0, -4.0),
            ..Transform::default()
        });

        let primary_entity = scene.spawn(Transform::default());
        scene
            .cameras_mut()
            .set_primary(CameraDescriptor::new(primary_entity));

        // Picture-in-picture overlay camera in the top-right corner.
        let overlay_entity = scene.spawn(Transform::default());
        let overlay = CameraDescriptor {
            viewport_divisor: 4.0,
            quadrant: Quadrant::TopRight,
            active: true,
            ..CameraDescriptor::new(overlay_entity)
        };
        scene.cameras_mut().sync_active(&overlay, None);

        let owner = scene.spawn(Transform::default());
        let mut registry = BehaviorRegistry::new();
        let heartbeat: BehaviorHandle = std::rc::Rc::new(std::cell::RefCell::new(Heartbeat {
            entity: owner,
            accumulated_ms: 0.0,
        }));
        registry.add(&heartbeat);

        Self {
            scheduler: FrameScheduler::new(RedrawPump::new(), config),
            scene,
            registry,
            backend: HeadlessBackend::new(CanvasSize::new(1280, 720)),
            window: None,
            frames: 0,
            last_report: Instant::now(),
        }
    }

    fn surface_metrics(&self) -> Option<SurfaceMetrics> {
        let window = self.window.as_ref()?;
        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale);
        Some(SurfaceMetrics::window(logical.width, logical.height, scale))
    }

    fn resize_to_window(&mut self) {
        let Some(metrics) = self.surface_metrics() else {
            return;
        };
        apply_resize(
            &mut self.scene,
            &mut self.backend,
            &metrics,
            self.scheduler.config(),
            VrMode::NONE,
        );
        self.drain_notifications();
    }

    fn drain_notifications(&mut self) {
        for note in self.scene.drain_notifications() {
            tracing::info!(?note, "scene notification");
        }
    }
}

impl ApplicationHandler for HostApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("stagecraft")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        self.scheduler
            .set_device_pixel_ratio(window.scale_factor());
        self.scheduler.pump_mut().set_window(window.clone());
        self.window = Some(window);

        self.scene.mark_surface_ready();
        self.resize_to_window();
        self.scheduler.play();

        tracing::info!("window up; frame loop armed");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.scheduler.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                self.resize_to_window();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scheduler.set_device_pixel_ratio(scale_factor);
                self.resize_to_window();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Space => {
                    if self.scheduler.state() == PlayState::Playing {
                        self.scheduler.pause();
                        tracing::info!("paused (static frames keep drawing)");
                    } else {
                        self.scheduler.play();
                        tracing::info!("playing");
                    }
                }
                KeyCode::Escape => {
                    self.scheduler.stop();
                    event_loop.exit();
                }
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                // Only an armed token runs a frame; a cancelled request
                // fires into nothing.
                if self.scheduler.pump_mut().take_fired().is_none() {
                    return;
                }
                self.scheduler
                    .render_frame(&mut self.scene, &mut self.registry, &mut self.backend);
                self.frames += 1;

                let passes = self.backend.take_passes();
                tracing::trace!(frame = self.frames, passes = passes.len(), "frame drawn");

                if self.last_report.elapsed().as_secs() >= 5 {
                    self.last_report = Instant::now();
                    tracing::info!(
                        frames = self.frames,
                        backbuffer = %self.backend.size(),
                        "frame loop running"
                    );
                }
                self.drain_notifications();
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    // Route the flags through the same string-keyed surface the scene's
    // renderer attribute uses.
    let mut attrs = BTreeMap::new();
    attrs.insert("maxCanvasWidth".to_string(), cli.max_canvas_width.to_string());
    attrs.insert(
        "maxCanvasHeight".to_string(),
        cli.max_canvas_height.to_string(),
    );
    if let Some(ratio) = cli.pixel_ratio {
        attrs.insert("pixelRatio".to_string(), ratio.to_string());
    }
    let config = RendererConfig::from_attributes(&attrs);

    tracing::info!("stagecraft-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = HostApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
