//! Touch input handling.
//!
//! The host input system delivers touch callbacks at any point during a
//! frame. Callbacks only enqueue; [`InputController::update`] drains the
//! queue once per frame and publishes a snapshot that gameplay reads until
//! the next update:
//!
//! - a virtual joystick, started by a touch in the left part of the screen
//! - a swipe, a quick drag longer than the configured swipe length
//! - a switch, two taps at the same spot within the tap threshold
//!
//! All published positions and vectors are in scene coordinates (y up).

use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use bitflags::bitflags;
use patrol_shared::{
    config::InputConfig,
    error::{InitError, InitResult},
    event::{FrameQueue, QueuedTouch, TouchEvent, TouchId, TouchPhase},
    math::{Rect, Vec2},
};
use tracing::{debug, trace};

bitflags! {
    /// Gestures present in the last finalized frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Gestures: u8 {
        const SWIPE = 1 << 0;
        const SWITCH = 1 << 1;
        const JOYSTICK = 1 << 2;
    }
}

/// One logical gesture in the swipe zone, possibly multi-finger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchInstance {
    /// Anchor position (scene space) when the gesture started.
    pub position: Vec2,
    /// Latest position seen for the gesture.
    pub current: Vec2,
    pub timestamp: Option<Instant>,
    pub touch_ids: HashSet<TouchId>,
}

impl TouchInstance {
    pub fn clear(&mut self) {
        self.position = Vec2::ZERO;
        self.current = Vec2::ZERO;
        self.timestamp = None;
        self.touch_ids.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.touch_ids.is_empty()
    }
}

/// A completed tap waiting for its double.
#[derive(Debug, Clone, Copy)]
struct Tap {
    position: Vec2,
    at: Instant,
}

/// Turns raw touches into joystick, swipe and switch input.
pub struct InputController {
    config: InputConfig,
    /// Screen bounds in touch coordinates.
    tbounds: Rect,
    /// Screen bounds in scene coordinates.
    sbounds: Rect,
    active: bool,
    pending: FrameQueue,

    gestures: Gestures,
    joystick_id: Option<TouchId>,
    joystick_origin: Vec2,
    joystick_position: Vec2,
    swipe: Vec2,
    mtouch: TouchInstance,
    last_tap: Option<Tap>,
}

impl InputController {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            tbounds: Rect::default(),
            sbounds: Rect::default(),
            active: false,
            pending: FrameQueue::default(),
            gestures: Gestures::empty(),
            joystick_id: None,
            joystick_origin: Vec2::ZERO,
            joystick_position: Vec2::ZERO,
            swipe: Vec2::ZERO,
            mtouch: TouchInstance::default(),
            last_tap: None,
        }
    }

    /// Records the display (touch) and scene bounds and starts listening.
    pub fn init(&mut self, display: Rect, scene: Rect) -> InitResult<()> {
        for r in [display, scene] {
            if r.is_degenerate() {
                return Err(InitError::DegenerateBounds {
                    width: r.size.width,
                    height: r.size.height,
                });
            }
        }
        self.tbounds = display;
        self.sbounds = scene;
        self.reset();
        self.active = true;
        debug!(bounds = ?self.tbounds, scene = ?self.sbounds, "input controller ready");
        Ok(())
    }

    /// Stops listening and drops all buffered input.
    pub fn dispose(&mut self) {
        self.reset();
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.gestures = Gestures::empty();
        self.joystick_id = None;
        self.joystick_origin = Vec2::ZERO;
        self.joystick_position = Vec2::ZERO;
        self.swipe = Vec2::ZERO;
        self.mtouch.clear();
        self.last_tap = None;
    }

    // ─── Detection ───

    /// Processes every touch delivered since the last call and publishes the
    /// frame snapshot.
    pub fn update(&mut self, _timestep: f32) {
        self.gestures = Gestures::empty();
        self.swipe = Vec2::ZERO;

        for QueuedTouch { phase, event } in self.pending.drain::<QueuedTouch>() {
            match phase {
                TouchPhase::Began => self.on_began(&event),
                TouchPhase::Moved => self.on_moved(&event),
                TouchPhase::Ended => self.on_ended(&event),
            }
        }

        if self.joystick_id.is_some() {
            self.gestures |= Gestures::JOYSTICK;
        }
    }

    /// Discards swipe/switch results and any gesture in progress in the swipe
    /// zone. The joystick and queued touches are kept.
    pub fn clear(&mut self) {
        self.gestures.remove(Gestures::SWIPE | Gestures::SWITCH);
        self.swipe = Vec2::ZERO;
        self.mtouch.clear();
        self.last_tap = None;
    }

    // ─── Results ───

    pub fn gestures(&self) -> Gestures {
        self.gestures
    }

    pub fn did_switch(&self) -> bool {
        self.gestures.contains(Gestures::SWITCH)
    }

    pub fn did_swipe(&self) -> bool {
        self.gestures.contains(Gestures::SWIPE)
    }

    pub fn did_press_joystick(&self) -> bool {
        self.gestures.contains(Gestures::JOYSTICK)
    }

    /// Center of the outer joystick ring.
    pub fn joystick_origin(&self) -> Vec2 {
        self.joystick_origin
    }

    /// Center of the inner joystick knob.
    pub fn joystick_position(&self) -> Vec2 {
        self.joystick_position
    }

    /// Unit direction of this frame's swipe, zero if none.
    pub fn swipe(&self) -> Vec2 {
        self.swipe
    }

    /// The gesture currently tracked in the swipe zone.
    pub fn touch_instance(&self) -> &TouchInstance {
        &self.mtouch
    }

    /// Maps a touch-space point (origin top-left, y down) into scene space.
    pub fn touch_to_screen(&self, pos: Vec2) -> Vec2 {
        let t = &self.tbounds;
        let s = &self.sbounds;
        let px = (pos.x - t.origin.x) / t.size.width;
        let py = (pos.y - t.origin.y) / t.size.height;
        Vec2::new(
            s.origin.x + px * s.size.width,
            s.origin.y + (1.0 - py) * s.size.height,
        )
    }

    /// Movement input for the local player, each axis in `[-gain, gain]`.
    pub fn movement_vector(&self, is_thief: bool) -> Vec2 {
        if self.joystick_id.is_none() || self.config.joystick_radius <= 0.0 {
            return Vec2::ZERO;
        }
        let gain = if is_thief {
            self.config.thief_gain
        } else {
            self.config.cop_gain
        };
        (self.joystick_position - self.joystick_origin) / self.config.joystick_radius * gain
    }

    // ─── Callbacks ───

    pub fn touch_began_cb(&mut self, event: &TouchEvent, _focus: bool) {
        self.enqueue(TouchPhase::Began, event);
    }

    pub fn touch_moved_cb(&mut self, event: &TouchEvent, _previous: Vec2, _focus: bool) {
        self.enqueue(TouchPhase::Moved, event);
    }

    pub fn touch_ended_cb(&mut self, event: &TouchEvent, _focus: bool) {
        self.enqueue(TouchPhase::Ended, event);
    }

    /// Number of touches waiting for the next update.
    pub fn pending(&self) -> usize {
        self.pending.pending::<QueuedTouch>()
    }

    fn enqueue(&mut self, phase: TouchPhase, event: &TouchEvent) {
        if !self.active {
            trace!(?phase, id = ?event.id, "input inactive; touch dropped");
            return;
        }
        self.pending.push(QueuedTouch {
            phase,
            event: *event,
        });
    }

    // ─── Gesture state machine ───

    fn in_joystick_zone(&self, touch_pos: Vec2) -> bool {
        touch_pos.x < self.tbounds.origin.x + self.tbounds.size.width * self.config.joystick_zone
    }

    fn is_tracked(&self, id: TouchId) -> bool {
        self.joystick_id == Some(id) || self.mtouch.touch_ids.contains(&id)
    }

    fn on_began(&mut self, event: &TouchEvent) {
        if self.is_tracked(event.id) {
            trace!(id = ?event.id, "duplicate touch began ignored");
            return;
        }
        let pos = self.touch_to_screen(event.position);
        if self.joystick_id.is_none() && self.in_joystick_zone(event.position) {
            self.joystick_id = Some(event.id);
            self.joystick_origin = pos;
            self.joystick_position = pos;
            debug!(id = ?event.id, origin = ?pos, "joystick pressed");
        } else if self.mtouch.is_idle() {
            self.mtouch.clear();
            self.mtouch.position = pos;
            self.mtouch.current = pos;
            self.mtouch.timestamp = Some(event.timestamp);
            self.mtouch.touch_ids.insert(event.id);
        } else {
            self.mtouch.touch_ids.insert(event.id);
        }
    }

    fn on_moved(&mut self, event: &TouchEvent) {
        let pos = self.touch_to_screen(event.position);
        if self.joystick_id == Some(event.id) {
            let offset = pos - self.joystick_origin;
            self.joystick_position = if offset.length() < self.config.joystick_deadzone {
                self.joystick_origin
            } else {
                self.joystick_origin + offset.clamp_length(self.config.joystick_radius)
            };
        } else if self.mtouch.touch_ids.contains(&event.id) {
            self.mtouch.current = pos;
        } else {
            trace!(id = ?event.id, "move for untracked touch ignored");
        }
    }

    fn on_ended(&mut self, event: &TouchEvent) {
        if self.joystick_id == Some(event.id) {
            self.joystick_id = None;
            self.joystick_position = self.joystick_origin;
            debug!(id = ?event.id, "joystick released");
            return;
        }
        if !self.mtouch.touch_ids.contains(&event.id) {
            trace!(id = ?event.id, "end for untracked touch ignored");
            return;
        }

        self.mtouch.current = self.touch_to_screen(event.position);
        let pos = self.mtouch.current;
        let displacement = pos - self.mtouch.position;
        let distance = displacement.length();
        let held = self
            .mtouch
            .timestamp
            .map_or(Duration::ZERO, |t| event.timestamp.saturating_duration_since(t));

        if distance > self.config.swipe_length {
            self.swipe = displacement.normalize_or_zero();
            self.gestures |= Gestures::SWIPE;
            debug!(direction = ?self.swipe, "swipe");
        } else if distance <= self.config.joystick_deadzone && held <= self.tap_threshold() {
            self.register_tap(pos, event.timestamp);
        }
        self.mtouch.clear();
    }

    fn register_tap(&mut self, position: Vec2, at: Instant) {
        match self.last_tap.take() {
            Some(prev)
                if at.saturating_duration_since(prev.at) <= self.tap_threshold()
                    && prev.position.distance(position) <= self.config.joystick_deadzone =>
            {
                self.gestures |= Gestures::SWITCH;
                debug!(?position, "double tap");
            }
            _ => self.last_tap = Some(Tap { position, at }),
        }
    }

    fn tap_threshold(&self) -> Duration {
        Duration::from_millis(self.config.tap_threshold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 1000.0, 600.0);

    struct Harness {
        input: InputController,
        t0: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let mut input = InputController::new(InputConfig::default());
            input.init(SCREEN, SCREEN).unwrap();
            Self {
                input,
                t0: Instant::now(),
            }
        }

        fn ev(&self, id: u64, x: f32, y: f32, ms: u64) -> TouchEvent {
            TouchEvent::new(
                TouchId(id),
                Vec2::new(x, y),
                self.t0 + Duration::from_millis(ms),
            )
        }

        fn begin(&mut self, id: u64, x: f32, y: f32, ms: u64) {
            let e = self.ev(id, x, y, ms);
            self.input.touch_began_cb(&e, true);
        }

        fn drag(&mut self, id: u64, x: f32, y: f32, ms: u64) {
            let e = self.ev(id, x, y, ms);
            self.input.touch_moved_cb(&e, Vec2::ZERO, true);
        }

        fn end(&mut self, id: u64, x: f32, y: f32, ms: u64) {
            let e = self.ev(id, x, y, ms);
            self.input.touch_ended_cb(&e, true);
        }

        fn frame(&mut self) {
            self.input.update(1.0 / 60.0);
        }
    }

    #[test]
    fn double_tap_switches_without_swipe() {
        let mut h = Harness::new();
        h.begin(1, 800.0, 300.0, 0);
        h.end(1, 800.0, 300.0, 40);
        h.frame();
        assert!(!h.input.did_switch());
        h.begin(2, 803.0, 302.0, 120);
        h.end(2, 803.0, 302.0, 160);
        h.frame();
        assert!(h.input.did_switch());
        assert!(!h.input.did_swipe());
    }

    #[test]
    fn double_tap_in_one_frame() {
        let mut h = Harness::new();
        h.begin(1, 800.0, 300.0, 0);
        h.end(1, 800.0, 300.0, 30);
        h.begin(2, 800.0, 300.0, 60);
        h.end(2, 800.0, 300.0, 90);
        h.frame();
        assert!(h.input.did_switch());
    }

    #[test]
    fn slow_second_tap_starts_over() {
        let mut h = Harness::new();
        h.begin(1, 800.0, 300.0, 0);
        h.end(1, 800.0, 300.0, 20);
        h.begin(2, 800.0, 300.0, 400);
        h.end(2, 800.0, 300.0, 420);
        h.frame();
        assert!(!h.input.did_switch());
        // The late tap becomes the new first tap.
        h.begin(3, 800.0, 300.0, 500);
        h.end(3, 800.0, 300.0, 520);
        h.frame();
        assert!(h.input.did_switch());
    }

    #[test]
    fn taps_far_apart_do_not_switch() {
        let mut h = Harness::new();
        h.begin(1, 600.0, 300.0, 0);
        h.end(1, 600.0, 300.0, 20);
        h.begin(2, 900.0, 300.0, 60);
        h.end(2, 900.0, 300.0, 80);
        h.frame();
        assert!(!h.input.did_switch());
    }

    #[test]
    fn long_drag_is_a_unit_swipe() {
        let mut h = Harness::new();
        h.begin(1, 600.0, 300.0, 0);
        h.drag(1, 700.0, 300.0, 30);
        h.end(1, 760.0, 300.0, 60);
        h.frame();
        assert!(h.input.did_swipe());
        assert!(!h.input.did_switch());
        let s = h.input.swipe();
        assert!((s.length() - 1.0).abs() < 1e-5);
        assert!((s.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn upward_drag_swipes_up_in_scene_space() {
        let mut h = Harness::new();
        h.begin(1, 700.0, 500.0, 0);
        h.end(1, 700.0, 300.0, 50);
        h.frame();
        assert!(h.input.did_swipe());
        assert!((h.input.swipe().y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn short_drag_is_neither_swipe_nor_tap() {
        let mut h = Harness::new();
        h.begin(1, 600.0, 300.0, 0);
        h.end(1, 650.0, 300.0, 20);
        h.begin(2, 650.0, 300.0, 40);
        h.end(2, 650.0, 300.0, 60);
        h.frame();
        assert!(!h.input.did_swipe());
        assert!(!h.input.did_switch());
    }

    #[test]
    fn swipe_flag_lasts_one_frame() {
        let mut h = Harness::new();
        h.begin(1, 600.0, 300.0, 0);
        h.end(1, 900.0, 300.0, 50);
        h.frame();
        assert!(h.input.did_swipe());
        h.frame();
        assert!(!h.input.did_swipe());
        assert_eq!(h.input.swipe(), Vec2::ZERO);
    }

    #[test]
    fn callbacks_wait_for_update() {
        let mut h = Harness::new();
        h.begin(1, 100.0, 300.0, 0);
        assert_eq!(h.input.pending(), 1);
        assert!(!h.input.did_press_joystick());
        h.frame();
        assert!(h.input.did_press_joystick());
        assert_eq!(h.input.pending(), 0);
    }

    #[test]
    fn joystick_is_clamped_to_radius() {
        let mut h = Harness::new();
        h.begin(1, 100.0, 300.0, 0);
        for (i, x) in [150.0, 250.0, 400.0, 480.0].into_iter().enumerate() {
            h.drag(1, x, 300.0 - x / 2.0, 10 * i as u64);
            h.frame();
            let d = h.input.joystick_position() - h.input.joystick_origin();
            assert!(d.length() <= 100.0 + 1e-3, "offset {} escaped", d.length());
        }
        let mv = h.input.movement_vector(false);
        assert!((mv.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn deadzone_yields_no_movement() {
        let mut h = Harness::new();
        h.begin(1, 100.0, 300.0, 0);
        h.drag(1, 110.0, 295.0, 10);
        h.frame();
        assert!(h.input.did_press_joystick());
        assert_eq!(h.input.joystick_position(), h.input.joystick_origin());
        assert_eq!(h.input.movement_vector(true), Vec2::ZERO);
    }

    #[test]
    fn deadzone_boundary_and_radius_clamp() {
        // Power-of-two bounds keep the touch-to-scene mapping exact.
        let bounds = Rect::new(0.0, 0.0, 1024.0, 512.0);
        let mut input = InputController::new(InputConfig::default());
        input.init(bounds, bounds).unwrap();
        let t0 = Instant::now();
        let origin = Vec2::new(100.0, 256.0);
        input.touch_began_cb(&TouchEvent::new(TouchId(1), origin, t0), true);
        input.update(0.016);
        let mut offset_for = |x: f32| {
            input.touch_moved_cb(&TouchEvent::new(TouchId(1), Vec2::new(x, 256.0), t0), origin, true);
            input.update(0.016);
            input.joystick_position() - input.joystick_origin()
        };

        assert_eq!(offset_for(114.0), Vec2::ZERO);
        // An offset of exactly the deadzone already moves the knob.
        assert_eq!(offset_for(115.0), Vec2::new(15.0, 0.0));
        let clamped = offset_for(350.0);
        assert!((clamped.x - 100.0).abs() < 1e-4 && clamped.y == 0.0);
    }

    #[test]
    fn deadzone_is_checked_before_clamping() {
        // With the radius inside the deadzone, clamping first would always
        // collapse the knob back to the origin.
        let mut input = InputController::new(InputConfig {
            joystick_radius: 10.0,
            joystick_deadzone: 15.0,
            ..InputConfig::default()
        });
        input.init(SCREEN, SCREEN).unwrap();
        let t0 = Instant::now();
        input.touch_began_cb(&TouchEvent::new(TouchId(1), Vec2::new(100.0, 300.0), t0), true);
        input.touch_moved_cb(
            &TouchEvent::new(TouchId(1), Vec2::new(120.0, 300.0), t0),
            Vec2::new(100.0, 300.0),
            true,
        );
        input.update(0.016);
        let d = input.joystick_position() - input.joystick_origin();
        assert!((d.length() - 10.0).abs() < 1e-4);
        assert!((input.movement_vector(false).x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn touch_instance_tracks_latest_position() {
        let mut h = Harness::new();
        h.begin(1, 600.0, 300.0, 0);
        h.drag(1, 650.0, 150.0, 20);
        h.frame();
        let mt = h.input.touch_instance();
        assert!(mt.position.distance(Vec2::new(600.0, 300.0)) < 1e-3);
        assert!(mt.current.distance(Vec2::new(650.0, 450.0)) < 1e-3);
        assert!(mt.timestamp.is_some());
    }

    #[test]
    fn joystick_maps_screen_up_to_positive_y() {
        let mut h = Harness::new();
        h.begin(1, 200.0, 300.0, 0);
        h.drag(1, 200.0, 250.0, 10);
        h.frame();
        let mv = h.input.movement_vector(false);
        assert!((mv.y - 0.5).abs() < 1e-5);
        assert!(mv.x.abs() < 1e-5);
    }

    #[test]
    fn role_gain_scales_movement() {
        let mut input = InputController::new(InputConfig {
            thief_gain: 2.0,
            ..InputConfig::default()
        });
        input.init(SCREEN, SCREEN).unwrap();
        let t0 = Instant::now();
        input.touch_began_cb(&TouchEvent::new(TouchId(1), Vec2::new(100.0, 300.0), t0), true);
        input.touch_moved_cb(
            &TouchEvent::new(TouchId(1), Vec2::new(150.0, 300.0), t0),
            Vec2::new(100.0, 300.0),
            true,
        );
        input.update(0.016);
        assert!((input.movement_vector(false).x - 0.5).abs() < 1e-5);
        assert!((input.movement_vector(true).x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn joystick_release_clears_owner() {
        let mut h = Harness::new();
        h.begin(1, 100.0, 300.0, 0);
        h.drag(1, 180.0, 300.0, 10);
        h.frame();
        h.end(1, 180.0, 300.0, 20);
        h.frame();
        assert!(!h.input.did_press_joystick());
        assert_eq!(h.input.movement_vector(false), Vec2::ZERO);
        // A new finger may take over.
        h.begin(2, 50.0, 100.0, 30);
        h.frame();
        assert!(h.input.did_press_joystick());
    }

    #[test]
    fn second_finger_in_zone_does_not_steal_joystick() {
        let mut h = Harness::new();
        h.begin(1, 100.0, 300.0, 0);
        h.begin(2, 120.0, 320.0, 5);
        h.drag(2, 400.0, 320.0, 10);
        h.frame();
        assert_eq!(h.input.joystick_position(), h.input.joystick_origin());
        assert!(h.input.touch_instance().touch_ids.contains(&TouchId(2)));
    }

    #[test]
    fn unknown_touches_are_ignored() {
        let mut h = Harness::new();
        h.drag(9, 100.0, 100.0, 0);
        h.end(9, 100.0, 100.0, 10);
        h.frame();
        assert_eq!(h.input.gestures(), Gestures::empty());
        assert!(h.input.touch_instance().is_idle());
    }

    #[test]
    fn clear_eats_processed_input() {
        let mut h = Harness::new();
        h.begin(1, 100.0, 300.0, 0);
        h.begin(2, 600.0, 300.0, 0);
        h.end(2, 900.0, 300.0, 50);
        h.begin(3, 700.0, 300.0, 60);
        h.frame();
        assert!(h.input.did_swipe());
        h.input.clear();
        assert!(!h.input.did_swipe());
        assert_eq!(h.input.swipe(), Vec2::ZERO);
        assert!(h.input.touch_instance().is_idle());
        assert!(h.input.did_press_joystick());
    }

    #[test]
    fn touch_to_screen_maps_between_rects() {
        let mut input = InputController::new(InputConfig::default());
        input
            .init(Rect::new(0.0, 0.0, 2000.0, 1000.0), Rect::new(0.0, 0.0, 1000.0, 500.0))
            .unwrap();
        assert_eq!(input.touch_to_screen(Vec2::new(0.0, 0.0)), Vec2::new(0.0, 500.0));
        assert_eq!(input.touch_to_screen(Vec2::new(2000.0, 1000.0)), Vec2::new(1000.0, 0.0));
        assert_eq!(input.touch_to_screen(Vec2::new(1000.0, 250.0)), Vec2::new(500.0, 375.0));
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        let mut input = InputController::new(InputConfig::default());
        let err = input
            .init(Rect::new(0.0, 0.0, 0.0, 600.0), SCREEN)
            .unwrap_err();
        assert!(matches!(err, InitError::DegenerateBounds { .. }));
        assert!(!input.is_active());
    }

    #[test]
    fn inactive_controller_drops_touches() {
        let mut h = Harness::new();
        h.input.dispose();
        h.begin(1, 100.0, 300.0, 0);
        assert_eq!(h.input.pending(), 0);
    }
}
