//! Per-frame behavior registry: ordered tick/tock callbacks around the
//! draw call.
//!
//! # Invariants
//! - List membership is by pointer identity; re-adding is a no-op.
//! - Insertion order is invocation order.
//! - A faulting callback never aborts the rest of its pass.
//! - Capability is fixed at registration; no per-frame probing.

use std::cell::RefCell;
use std::rc::Rc;

use stagecraft_common::EntityId;
use stagecraft_scene::{CameraDescriptor, Scene};

/// Which per-frame callbacks a behavior participates in, declared once at
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    TickOnly,
    TockOnly,
    Both,
    Neither,
}

impl Capability {
    pub fn has_tick(&self) -> bool {
        matches!(self, Self::TickOnly | Self::Both)
    }

    pub fn has_tock(&self) -> bool {
        matches!(self, Self::TockOnly | Self::Both)
    }
}

/// A fault raised by a single behavior callback. Faults are isolated: the
/// registry logs them and carries on with the pass.
#[derive(Debug, thiserror::Error)]
#[error("behavior fault: {0}")]
pub struct BehaviorError(pub String);

/// A per-frame update contributed by a component or subsystem.
///
/// `tick` runs before the draw pass; `tock` runs after it and alone
/// receives the camera the frame was drawn with.
pub trait Behavior {
    /// The entity owning this behavior; its play state gates invocation.
    fn entity(&self) -> EntityId;

    fn capability(&self) -> Capability;

    fn tick(&mut self, time_ms: f64, delta_ms: f64) -> Result<(), BehaviorError> {
        let _ = (time_ms, delta_ms);
        Ok(())
    }

    fn tock(
        &mut self,
        time_ms: f64,
        delta_ms: f64,
        camera: Option<&CameraDescriptor>,
    ) -> Result<(), BehaviorError> {
        let _ = (time_ms, delta_ms, camera);
        Ok(())
    }
}

/// Shared behavior handle. The frame loop is single-threaded and
/// cooperative, so shared ownership is `Rc` and interior mutability is
/// `RefCell`; identity is the allocation address.
pub type BehaviorHandle = Rc<RefCell<dyn Behavior>>;

fn same_behavior(a: &BehaviorHandle, b: &BehaviorHandle) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

fn contains(list: &[BehaviorHandle], behavior: &BehaviorHandle) -> bool {
    list.iter().any(|b| same_behavior(b, behavior))
}

/// Ordered tick/tock lists of registered behaviors.
#[derive(Default)]
pub struct BehaviorRegistry {
    tick_list: Vec<BehaviorHandle>,
    tock_list: Vec<BehaviorHandle>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a behavior on the lists its capability names. A `Neither`
    /// capability registers nothing; duplicates are rejected per list.
    pub fn add(&mut self, behavior: &BehaviorHandle) {
        let capability = behavior.borrow().capability();
        if capability.has_tick() && !contains(&self.tick_list, behavior) {
            self.tick_list.push(Rc::clone(behavior));
        }
        if capability.has_tock() && !contains(&self.tock_list, behavior) {
            self.tock_list.push(Rc::clone(behavior));
        }
    }

    /// Remove a behavior from whichever lists contain it. Removing an
    /// absent behavior is a no-op.
    pub fn remove(&mut self, behavior: &BehaviorHandle) {
        self.tick_list.retain(|b| !same_behavior(b, behavior));
        self.tock_list.retain(|b| !same_behavior(b, behavior));
    }

    pub fn tick_count(&self) -> usize {
        self.tick_list.len()
    }

    pub fn tock_count(&self) -> usize {
        self.tock_list.len()
    }

    /// Run the pre-draw pass: every tick behavior in insertion order,
    /// skipping those whose owning entity is not playing.
    pub fn tick(&mut self, time_ms: f64, delta_ms: f64, scene: &Scene) {
        for behavior in &self.tick_list {
            let mut b = behavior.borrow_mut();
            if !scene.is_playing(b.entity()) {
                continue;
            }
            if let Err(err) = b.tick(time_ms, delta_ms) {
                tracing::warn!(entity = %b.entity(), %err, "tick fault isolated");
            }
        }
    }

    /// Run the post-draw pass. `camera` is the primary camera the frame
    /// was drawn with, or `None` when the draw was skipped.
    pub fn tock(
        &mut self,
        time_ms: f64,
        delta_ms: f64,
        camera: Option<&CameraDescriptor>,
        scene: &Scene,
    ) {
        for behavior in &self.tock_list {
            let mut b = behavior.borrow_mut();
            if !scene.is_playing(b.entity()) {
                continue;
            }
            if let Err(err) = b.tock(time_ms, delta_ms, camera) {
                tracing::warn!(entity = %b.entity(), %err, "tock fault isolated");
            }
        }
    }
}

pub fn crate_info() -> &'static str {
    "stagecraft-behavior v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagecraft_common::Transform;

    struct Probe {
        entity: EntityId,
        capability: Capability,
        ticks: u32,
        tocks: u32,
        fail_tick: bool,
        last_camera: Option<EntityId>,
        order_log: Option<(Rc<RefCell<Vec<u32>>>, u32)>,
    }

    impl Probe {
        fn handle(entity: EntityId, capability: Capability) -> Rc<RefCell<Probe>> {
            Rc::new(RefCell::new(Probe {
                entity,
                capability,
                ticks: 0,
                tocks: 0,
                fail_tick: false,
                last_camera: None,
                order_log: None,
            }))
        }
    }

    impl Behavior for Probe {
        fn entity(&self) -> EntityId {
            self.entity
        }

        fn capability(&self) -> Capability {
            self.capability
        }

        fn tick(&mut self, _time_ms: f64, _delta_ms: f64) -> Result<(), BehaviorError> {
            self.ticks += 1;
            if let Some((log, tag)) = &self.order_log {
                log.borrow_mut().push(*tag);
            }
            if self.fail_tick {
                return Err(BehaviorError("deliberate test fault".into()));
            }
            Ok(())
        }

        fn tock(
            &mut self,
            _time_ms: f64,
            _delta_ms: f64,
            camera: Option<&CameraDescriptor>,
        ) -> Result<(), BehaviorError> {
            self.tocks += 1;
            self.last_camera = camera.map(|c| c.entity);
            Ok(())
        }
    }

    fn playing_scene() -> (Scene, EntityId) {
        let mut scene = Scene::new();
        let id = scene.spawn(Transform::default());
        (scene, id)
    }

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("behavior"));
    }

    #[test]
    fn double_add_invokes_once_per_capability() {
        let (scene, id) = playing_scene();
        let probe = Probe::handle(id, Capability::Both);
        let handle: BehaviorHandle = probe.clone();

        let mut registry = BehaviorRegistry::new();
        registry.add(&handle);
        registry.add(&handle);
        assert_eq!(registry.tick_count(), 1);
        assert_eq!(registry.tock_count(), 1);

        registry.tick(0.0, 16.0, &scene);
        registry.tock(0.0, 16.0, None, &scene);
        assert_eq!(probe.borrow().ticks, 1);
        assert_eq!(probe.borrow().tocks, 1);
    }

    #[test]
    fn neither_capability_registers_nothing() {
        let (_, id) = playing_scene();
        let handle: BehaviorHandle = Probe::handle(id, Capability::Neither);
        let mut registry = BehaviorRegistry::new();
        registry.add(&handle);
        assert_eq!(registry.tick_count(), 0);
        assert_eq!(registry.tock_count(), 0);
    }

    #[test]
    fn tick_only_stays_out_of_tock_list() {
        let (_, id) = playing_scene();
        let handle: BehaviorHandle = Probe::handle(id, Capability::TickOnly);
        let mut registry = BehaviorRegistry::new();
        registry.add(&handle);
        assert_eq!(registry.tick_count(), 1);
        assert_eq!(registry.tock_count(), 0);
    }

    #[test]
    fn removed_behavior_never_runs_again() {
        let (scene, id) = playing_scene();
        let probe = Probe::handle(id, Capability::Both);
        let handle: BehaviorHandle = probe.clone();

        let mut registry = BehaviorRegistry::new();
        registry.add(&handle);
        registry.tick(0.0, 16.0, &scene);
        registry.remove(&handle);
        registry.tick(16.0, 16.0, &scene);
        registry.tock(16.0, 16.0, None, &scene);

        assert_eq!(probe.borrow().ticks, 1);
        assert_eq!(probe.borrow().tocks, 0);
    }

    #[test]
    fn remove_absent_behavior_is_noop() {
        let (_, id) = playing_scene();
        let handle: BehaviorHandle = Probe::handle(id, Capability::Both);
        let mut registry = BehaviorRegistry::new();
        registry.remove(&handle);
        assert_eq!(registry.tick_count(), 0);
    }

    #[test]
    fn fault_does_not_abort_the_pass() {
        let (scene, id) = playing_scene();
        let faulty = Probe::handle(id, Capability::TickOnly);
        faulty.borrow_mut().fail_tick = true;
        let healthy = Probe::handle(id, Capability::TickOnly);

        let mut registry = BehaviorRegistry::new();
        let faulty_handle: BehaviorHandle = faulty.clone();
        let healthy_handle: BehaviorHandle = healthy.clone();
        registry.add(&faulty_handle);
        registry.add(&healthy_handle);

        registry.tick(0.0, 16.0, &scene);
        assert_eq!(healthy.borrow().ticks, 1);

        // The faulting behavior keeps running on later frames too.
        registry.tick(16.0, 16.0, &scene);
        assert_eq!(faulty.borrow().ticks, 2);
        assert_eq!(healthy.borrow().ticks, 2);
    }

    #[test]
    fn paused_entity_is_skipped() {
        let (mut scene, id) = playing_scene();
        let probe = Probe::handle(id, Capability::Both);
        let handle: BehaviorHandle = probe.clone();
        let mut registry = BehaviorRegistry::new();
        registry.add(&handle);

        scene.pause_entity(id);
        registry.tick(0.0, 16.0, &scene);
        registry.tock(0.0, 16.0, None, &scene);
        assert_eq!(probe.borrow().ticks, 0);
        assert_eq!(probe.borrow().tocks, 0);

        scene.play_entity(id);
        registry.tick(16.0, 16.0, &scene);
        assert_eq!(probe.borrow().ticks, 1);
    }

    #[test]
    fn invocation_follows_insertion_order() {
        let (scene, id) = playing_scene();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = BehaviorRegistry::new();
        for tag in 0..4 {
            let probe = Probe::handle(id, Capability::TickOnly);
            probe.borrow_mut().order_log = Some((log.clone(), tag));
            let handle: BehaviorHandle = probe;
            registry.add(&handle);
        }
        registry.tick(0.0, 16.0, &scene);
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn tock_receives_the_draw_camera() {
        let (scene, id) = playing_scene();
        let probe = Probe::handle(id, Capability::TockOnly);
        let handle: BehaviorHandle = probe.clone();
        let mut registry = BehaviorRegistry::new();
        registry.add(&handle);

        let camera = CameraDescriptor::new(EntityId::new());
        registry.tock(0.0, 16.0, Some(&camera), &scene);
        assert_eq!(probe.borrow().last_camera, Some(camera.entity));
    }
}
