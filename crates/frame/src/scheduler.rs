use stagecraft_behavior::BehaviorRegistry;
use stagecraft_compositor::Compositor;
use stagecraft_render::{RenderBackend, RendererConfig};
use stagecraft_scene::{Scene, SceneNotification};

use crate::clock::{Clock, FrameTiming};
use crate::pump::{FramePump, FrameToken};

/// Scheduler lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Idle,
    Playing,
    Paused,
    Stopped,
}

/// An externally supplied pipeline that replaces the compositor's draw
/// when configured.
pub trait PostProcess {
    fn render(&mut self, scene: &Scene, backend: &mut dyn RenderBackend);
}

/// A hook that runs after tock on every drawn frame.
pub trait Overlay {
    fn render(&mut self, scene: &Scene);
}

/// The main loop: samples the clock, runs tick, draws, runs tock, and
/// re-arms itself through the host frame pump.
///
/// The host fires an armed request by calling [`render_frame`] (the draw
/// variant) or [`calculate_frame`] (the pure-update variant); both re-arm
/// before returning, so the loop sustains itself until [`stop`] cancels
/// the outstanding token. Hosts apply a resize before the first
/// [`play`] so the initial draw sees the right backbuffer size.
///
/// [`render_frame`]: FrameScheduler::render_frame
/// [`calculate_frame`]: FrameScheduler::calculate_frame
/// [`stop`]: FrameScheduler::stop
/// [`play`]: FrameScheduler::play
pub struct FrameScheduler<P: FramePump> {
    clock: Clock,
    state: PlayState,
    pump: P,
    pending: Option<FrameToken>,
    compositor: Compositor,
    config: RendererConfig,
    device_pixel_ratio: f64,
    post_process: Option<Box<dyn PostProcess>>,
    overlay: Option<Box<dyn Overlay>>,
    render_started: bool,
}

impl<P: FramePump> FrameScheduler<P> {
    pub fn new(pump: P, config: RendererConfig) -> Self {
        Self {
            clock: Clock::start(),
            state: PlayState::Idle,
            pump,
            pending: None,
            compositor: Compositor::new(),
            config,
            device_pixel_ratio: 1.0,
            post_process: None,
            overlay: None,
            render_started: false,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn render_started(&self) -> bool {
        self.render_started
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.device_pixel_ratio = ratio;
    }

    pub fn set_post_process(&mut self, pipeline: Option<Box<dyn PostProcess>>) {
        self.post_process = pipeline;
    }

    pub fn set_overlay(&mut self, overlay: Option<Box<dyn Overlay>>) {
        self.overlay = overlay;
    }

    pub fn pump(&self) -> &P {
        &self.pump
    }

    pub fn pump_mut(&mut self) -> &mut P {
        &mut self.pump
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Start or resume the loop. The first entry from `Idle` restarts the
    /// clock so behaviors see time from zero.
    pub fn play(&mut self) {
        match self.state {
            PlayState::Stopped => {
                tracing::warn!("play() after stop ignored");
            }
            PlayState::Playing => {}
            PlayState::Idle => {
                self.clock.restart();
                self.state = PlayState::Playing;
                self.arm();
                tracing::debug!("scheduler started");
            }
            PlayState::Paused => {
                self.state = PlayState::Playing;
                self.arm();
            }
        }
    }

    /// Stop invoking tick/tock. The loop keeps running and keeps drawing
    /// a static frame; the armed token is left in place.
    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
            tracing::debug!("scheduler paused");
        }
    }

    /// Tear the loop down: revoke the outstanding frame token so no
    /// further tick/tock can run. Terminal.
    pub fn stop(&mut self) {
        if let Some(token) = self.pending.take() {
            self.pump.cancel_frame(token);
        }
        self.state = PlayState::Stopped;
        tracing::debug!("scheduler stopped");
    }

    fn arm(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.pump.request_frame());
        }
    }

    /// The draw variant of the per-frame entry point.
    ///
    /// Samples the clock, ticks, draws through the compositor (or the
    /// post-process pipeline when one is configured), tocks with the
    /// camera the frame was drawn with, then re-arms. The draw itself is
    /// unconditional; only tick/tock are gated on `Playing`.
    pub fn render_frame(
        &mut self,
        scene: &mut Scene,
        registry: &mut BehaviorRegistry,
        backend: &mut dyn RenderBackend,
    ) {
        if self.state == PlayState::Stopped {
            tracing::warn!("frame fired after stop; ignored");
            return;
        }
        self.pending.take();

        let timing = self.clock.sample();
        let playing = self.state == PlayState::Playing;

        if playing {
            registry.tick(timing.time_ms, timing.delta_ms, scene);
        }

        if let Some(multiplier) = self.config.pixel_ratio {
            backend.set_pixel_ratio(self.device_pixel_ratio * multiplier);
        }

        // Re-arm before the draw so a fault below cannot stall the loop.
        self.pending = Some(self.pump.request_frame());

        if let Some(pipeline) = self.post_process.as_mut() {
            pipeline.render(scene, backend);
        } else {
            self.compositor.render(scene, backend);
        }

        let camera = scene.cameras().primary().cloned();
        if playing {
            registry.tock(timing.time_ms, timing.delta_ms, camera.as_ref(), scene);
        }

        if let Some(overlay) = self.overlay.as_mut() {
            overlay.render(scene);
        }

        if !self.render_started {
            self.render_started = true;
            scene.notify(SceneNotification::RenderStart);
        }
    }

    /// The pure-update variant: tick and tock around no draw at all.
    /// Used by hosts that update simulation state without a surface.
    pub fn calculate_frame(&mut self, scene: &mut Scene, registry: &mut BehaviorRegistry) {
        if self.state == PlayState::Stopped {
            return;
        }
        self.pending.take();

        let timing = self.clock.sample();
        let playing = self.state == PlayState::Playing;

        if playing {
            registry.tick(timing.time_ms, timing.delta_ms, scene);
        }

        self.pending = Some(self.pump.request_frame());

        let camera = scene.cameras().primary().cloned();
        if playing {
            registry.tock(timing.time_ms, timing.delta_ms, camera.as_ref(), scene);
        }
    }

    /// Sample the clock without running a frame. Exposed for hosts that
    /// report timing.
    pub fn sample_clock(&mut self) -> FrameTiming {
        self.clock.sample()
    }
}
