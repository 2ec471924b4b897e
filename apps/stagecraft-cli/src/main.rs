use anyhow::Result;
use clap::{Parser, Subcommand};
use stagecraft_behavior::{Behavior, BehaviorError, BehaviorHandle, BehaviorRegistry, Capability};
use stagecraft_common::{EntityId, Quadrant, Transform};
use stagecraft_frame::{FrameScheduler, ManualPump};
use stagecraft_render::{HeadlessBackend, RenderPass, RendererConfig};
use stagecraft_scene::{CameraDescriptor, Scene};
use stagecraft_viewport::{SurfaceMetrics, VrMode, apply_resize, compute_canvas_size};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stagecraft-cli", about = "CLI driver for the stagecraft frame loop")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info
    Info,
    /// Drive a headless frame loop and print the per-frame pass log
    Run {
        /// Number of frames to drive
        #[arg(short, long, default_value = "5")]
        frames: u32,
        /// Viewport divisor for the additive camera
        #[arg(long, default_value = "4")]
        divisor: f32,
        /// Viewport quadrant for the additive camera (0-3)
        #[arg(long, default_value = "0")]
        position: i64,
        /// Aspect override for the additive camera
        #[arg(long)]
        aspect: Option<f32>,
        /// Composite the additive camera over the full backbuffer
        #[arg(long)]
        fullscreen: bool,
        /// Skip the additive camera entirely
        #[arg(long)]
        no_additive: bool,
        /// Pause the scheduler after this many frames
        #[arg(long)]
        pause_after: Option<u32>,
        /// Emit the pass log as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute the canvas size for a window/container layout
    Size {
        #[arg(long, default_value = "1920")]
        width: f64,
        #[arg(long, default_value = "1080")]
        height: f64,
        #[arg(long, default_value = "1")]
        pixel_ratio: f64,
        /// Width cap in physical pixels (-1 = uncapped)
        #[arg(long, default_value = "1920")]
        max_width: i32,
        /// Height cap in physical pixels (-1 = uncapped)
        #[arg(long, default_value = "1920")]
        max_height: i32,
        /// Size to the container instead of the window
        #[arg(long)]
        embedded: bool,
        #[arg(long, default_value = "640")]
        container_width: f64,
        #[arg(long, default_value = "480")]
        container_height: f64,
        /// Treat the scene as VR-active (unclamped)
        #[arg(long)]
        vr: bool,
    },
}

/// Demo behavior: accumulates a phase from frame deltas so the run shows
/// tick/tock actually advancing.
struct PulseBehavior {
    entity: EntityId,
    phase_ms: f64,
    ticks: u32,
    tocks: u32,
}

impl Behavior for PulseBehavior {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn capability(&self) -> Capability {
        Capability::Both
    }

    fn tick(&mut self, _time_ms: f64, delta_ms: f64) -> Result<(), BehaviorError> {
        self.phase_ms += delta_ms;
        self.ticks += 1;
        Ok(())
    }

    fn tock(
        &mut self,
        _time_ms: f64,
        _delta_ms: f64,
        camera: Option<&CameraDescriptor>,
    ) -> Result<(), BehaviorError> {
        self.tocks += 1;
        if let Some(camera) = camera {
            tracing::debug!(camera = %camera.entity, "tock saw draw camera");
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("stagecraft-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("behavior: {}", stagecraft_behavior::crate_info());
            println!("render: {}", stagecraft_render::crate_info());
            println!("viewport: {}", stagecraft_viewport::crate_info());
            println!("compositor: {}", stagecraft_compositor::crate_info());
        }
        Commands::Run {
            frames,
            divisor,
            position,
            aspect,
            fullscreen,
            no_additive,
            pause_after,
            json,
        } => {
            run_frames(RunOptions {
                frames,
                divisor,
                quadrant: Quadrant::from_index(position),
                aspect,
                fullscreen,
                no_additive,
                pause_after,
                json,
            })?;
        }
        Commands::Size {
            width,
            height,
            pixel_ratio,
            max_width,
            max_height,
            embedded,
            container_width,
            container_height,
            vr,
        } => {
            let metrics = SurfaceMetrics {
                window_size: (width, height),
                container_size: (container_width, container_height),
                pixel_ratio,
            };
            let max = stagecraft_common::MaxCanvasSize {
                width: max_width,
                height: max_height,
            };
            let size = compute_canvas_size(&metrics, embedded, max, vr);
            println!(
                "{} (aspect {:.4}, {} physical)",
                size,
                size.aspect(),
                stagecraft_common::CanvasSize::new(
                    (f64::from(size.width) * pixel_ratio).round() as u32,
                    (f64::from(size.height) * pixel_ratio).round() as u32,
                )
            );
        }
    }

    Ok(())
}

struct RunOptions {
    frames: u32,
    divisor: f32,
    quadrant: Quadrant,
    aspect: Option<f32>,
    fullscreen: bool,
    no_additive: bool,
    pause_after: Option<u32>,
    json: bool,
}

fn run_frames(options: RunOptions) -> Result<()> {
    let mut scene = Scene::new();
    scene.attributes_mut().register_system("camera");
    scene.attributes_mut().register_system("renderer");

    // A couple of visible entities so the frame summary has content.
    let anchor = scene.spawn(Transform::default());
    scene.set_name(anchor, "anchor");
    let satellite = scene.spawn(Transform {
        position: glam::Vec3::new(3.0, 0.0, -2.0),
        ..Transform::default()
    });
    scene.set_name(satellite, "satellite");

    let primary_entity = scene.spawn(Transform::default());
    scene
        .cameras_mut()
        .set_primary(CameraDescriptor::new(primary_entity));

    if !options.no_additive {
        let overlay_entity = scene.spawn(Transform::default());
        let descriptor = CameraDescriptor {
            viewport_divisor: options.divisor,
            quadrant: options.quadrant,
            aspect: options.aspect,
            fullscreen: options.fullscreen,
            active: true,
            ..CameraDescriptor::new(overlay_entity)
        };
        scene.cameras_mut().sync_active(&descriptor, None);
    }

    let owner = scene.spawn(Transform::default());
    let pulse = Rc::new(RefCell::new(PulseBehavior {
        entity: owner,
        phase_ms: 0.0,
        ticks: 0,
        tocks: 0,
    }));
    let mut registry = BehaviorRegistry::new();
    let handle: BehaviorHandle = pulse.clone();
    registry.add(&handle);

    let config = RendererConfig::default();
    let metrics = SurfaceMetrics::window(1280.0, 720.0, 1.0);
    let initial = compute_canvas_size(&metrics, config.embedded, config.max_canvas_size(), false);
    let mut backend = HeadlessBackend::new(initial);

    scene.mark_surface_ready();
    apply_resize(&mut scene, &mut backend, &metrics, &config, VrMode::NONE);

    let mut scheduler = FrameScheduler::new(ManualPump::new(), config);
    scheduler.play();

    let mut frame_log: Vec<Vec<RenderPass>> = Vec::new();
    for frame in 0..options.frames {
        let fired = scheduler.pump_mut().drain();
        if fired.is_empty() {
            break;
        }
        scheduler.render_frame(&mut scene, &mut registry, &mut backend);
        if frame + 1 == options.frames && !options.json {
            print!("{}", backend.summary(&scene));
        }
        frame_log.push(backend.take_passes());

        if options.pause_after == Some(frame + 1) {
            scheduler.pause();
            tracing::info!(frame, "paused; remaining frames draw static state");
        }
    }
    scheduler.stop();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&frame_log)?);
        return Ok(());
    }

    for (i, passes) in frame_log.iter().enumerate() {
        println!("frame {i}: {} pass(es)", passes.len());
        for pass in passes {
            let v = pass.viewport;
            println!(
                "  camera={} viewport=({:.0}, {:.0}, {:.0}, {:.0})",
                pass.camera, v.x, v.y, v.width, v.height
            );
        }
    }
    let pulse = pulse.borrow();
    println!(
        "behavior: {} tick(s), {} tock(s), phase {:.1} ms",
        pulse.ticks, pulse.tocks, pulse.phase_ms
    );
    for note in scene.drain_notifications() {
        println!("notification: {note:?}");
    }

    Ok(())
}
