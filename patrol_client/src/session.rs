//! Game session.
//!
//! Per-frame glue between input, the local player and the mirrored remote
//! player, running on the headless engine seams:
//!
//! 1. input snapshot for the frame
//! 2. local player: force, physics step, node sync, animation
//! 3. remote player: node sync (its state arrives through [`GameSession::apply_remote`])
//! 4. animation timing
//!
//! Every frame yields the local player's [`PlayerSync`] for the peer.

use std::time::Duration;

use patrol_shared::{
    animation::{ActionManager, HeadlessActions},
    config::GameConfig,
    event::TouchEvent,
    math::{Rect, Size, Vec2},
    net::PlayerSync,
    physics::SimBody,
    render::HeadlessScene,
    resources::{AssetManager, SpriteSheet},
    role::PlayerRole,
    shared, Shared,
};
use tracing::{debug, info, trace};

use crate::{
    input::{Gestures, InputController},
    menu::Choice,
    player::{sheet_keys, PlayerModel},
};

/// Capsule size of every player, in world units.
pub const PLAYER_SIZE: Size = Size::new(0.8, 1.2);

/// Maps the menu choice to the role this client controls.
pub fn role_for_choice(choice: Choice) -> Option<PlayerRole> {
    match choice {
        Choice::Host => Some(PlayerRole::Cop),
        Choice::Join => Some(PlayerRole::Thief),
        Choice::None => None,
    }
}

/// Where each player starts, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawns {
    pub cop: Vec2,
    pub thief: Vec2,
}

impl Spawns {
    pub fn for_role(&self, role: PlayerRole) -> Vec2 {
        match role {
            PlayerRole::Cop => self.cop,
            PlayerRole::Thief => self.thief,
        }
    }
}

impl Default for Spawns {
    fn default() -> Self {
        Self {
            cop: Vec2::new(4.0, 4.0),
            thief: Vec2::new(12.0, 8.0),
        }
    }
}

/// Counters for gestures seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u32,
    pub swipes: u32,
    pub switches: u32,
}

/// A running headless game.
pub struct GameSession {
    pub input: InputController,
    local: PlayerModel<SimBody>,
    remote: PlayerModel<SimBody>,
    scene: Shared<HeadlessScene>,
    actions: Shared<HeadlessActions>,
    tick: u32,
    stats: SessionStats,
}

impl GameSession {
    /// Creates both players and an initialized input controller.
    ///
    /// `display` is the touch-space screen; the scene is the same size with
    /// its origin at the bottom-left.
    pub fn new(
        cfg: &GameConfig,
        assets: &AssetManager,
        role: PlayerRole,
        display: Rect,
        spawns: Spawns,
    ) -> anyhow::Result<Self> {
        let scene = shared(HeadlessScene::new());
        let actions = shared(HeadlessActions::new());

        let mut input = InputController::new(cfg.input.clone());
        input.init(display, Rect::new(0.0, 0.0, display.size.width, display.size.height))?;

        let build = |role: PlayerRole| -> anyhow::Result<PlayerModel<SimBody>> {
            let pos = spawns.for_role(role);
            let mut player = PlayerModel::new(
                role,
                SimBody::capsule(pos, PLAYER_SIZE),
                pos,
                PLAYER_SIZE,
                cfg.player.draw_scale,
                scene.clone(),
                actions.clone(),
                &cfg.player,
            )?;
            let sheets = sheet_keys(role).map(|key| {
                let frames = assets
                    .get::<SpriteSheet>(&key)
                    .map_or(1, |s| s.frames);
                SpriteSheet::new(key, frames)
            });
            player.attach_sprites(&sheets, PLAYER_SIZE.width * cfg.player.draw_scale);
            Ok(player)
        };
        let local = build(role)?;
        let remote = build(role.opponent())?;

        info!(?role, "session started");
        Ok(Self {
            input,
            local,
            remote,
            scene,
            actions,
            tick: 0,
            stats: SessionStats::default(),
        })
    }

    /// Runs one frame and returns the local player's state for the peer.
    pub fn frame(&mut self, dt: f32) -> PlayerSync {
        self.input.update(dt);
        let gestures = self.input.gestures();
        if gestures.contains(Gestures::SWITCH) {
            self.stats.switches += 1;
            debug!(tick = self.tick, "switch requested");
        }
        if gestures.contains(Gestures::SWIPE) {
            self.stats.swipes += 1;
            debug!(tick = self.tick, direction = ?self.input.swipe(), "swipe");
        }

        let role = self.local.role();
        let force = self.input.movement_vector(role.is_thief());
        self.local.apply_force(force);
        self.local.body_mut().integrate(dt);
        self.local.update(dt);
        let velocity = self.local.velocity();
        self.local.play_animation(velocity);

        self.remote.update(dt);
        self.actions.borrow_mut().update(dt);

        let sync = PlayerSync {
            role,
            tick: self.tick,
            position: self.local.position(),
            velocity,
            force,
        };
        trace!(?sync, "frame");
        self.tick += 1;
        self.stats.frames += 1;
        sync
    }

    /// Mirrors a peer's player.
    pub fn apply_remote(&mut self, sync: &PlayerSync) {
        if sync.role != self.remote.role() {
            debug!(role = ?sync.role, "sync for a role this peer does not mirror");
            return;
        }
        self.remote
            .apply_network(sync.position, sync.velocity, sync.force);
    }

    pub fn local(&self) -> &PlayerModel<SimBody> {
        &self.local
    }

    pub fn remote(&self) -> &PlayerModel<SimBody> {
        &self.remote
    }

    pub fn scene(&self) -> &Shared<HeadlessScene> {
        &self.scene
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Releases both players and stops input.
    pub fn dispose(&mut self) {
        self.input.dispose();
        self.local.dispose();
        self.remote.dispose();
        info!(frames = self.stats.frames, "session ended");
    }
}

/// A touch callback to deliver before a given frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptedTouch {
    Began(TouchEvent),
    Moved { event: TouchEvent, previous: Vec2 },
    Ended(TouchEvent),
}

/// Touch callbacks keyed by the frame they precede.
#[derive(Debug, Clone, Default)]
pub struct TouchScript {
    steps: Vec<(u32, ScriptedTouch)>,
}

impl TouchScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, frame: u32, touch: ScriptedTouch) -> Self {
        self.steps.push((frame, touch));
        self
    }

    /// Delivers the callbacks scheduled before `frame`.
    pub fn deliver(&self, frame: u32, input: &mut InputController) {
        for (_, touch) in self.steps.iter().filter(|(f, _)| *f == frame) {
            match touch {
                ScriptedTouch::Began(e) => input.touch_began_cb(e, true),
                ScriptedTouch::Moved { event, previous } => {
                    input.touch_moved_cb(event, *previous, true)
                }
                ScriptedTouch::Ended(e) => input.touch_ended_cb(e, true),
            }
        }
    }
}

/// Drives `frames` frames paced by `tick`, delivering scripted touches before
/// each frame. Returns the local player's per-frame sync states.
pub async fn run_scripted(
    session: &mut GameSession,
    script: &TouchScript,
    frames: u32,
    tick: Duration,
) -> anyhow::Result<Vec<PlayerSync>> {
    let dt = tick.as_secs_f32();
    let mut interval = tokio::time::interval(tick);
    let mut out = Vec::with_capacity(frames as usize);
    for frame in 0..frames {
        interval.tick().await;
        script.deliver(frame, &mut session.input);
        out.push(session.frame(dt));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use patrol_shared::{event::TouchId, render::SceneGraph};
    use std::time::Instant;

    const DISPLAY: Rect = Rect::new(0.0, 0.0, 1000.0, 600.0);

    fn session(role: PlayerRole) -> GameSession {
        GameSession::new(
            &GameConfig::default(),
            &AssetManager::new(),
            role,
            DISPLAY,
            Spawns::default(),
        )
        .unwrap()
    }

    #[test]
    fn choices_map_to_roles() {
        assert_eq!(role_for_choice(Choice::Host), Some(PlayerRole::Cop));
        assert_eq!(role_for_choice(Choice::Join), Some(PlayerRole::Thief));
        assert_eq!(role_for_choice(Choice::None), None);
    }

    #[test]
    fn idle_frame_keeps_player_still() {
        let mut s = session(PlayerRole::Cop);
        let sync = s.frame(1.0 / 60.0);
        assert_eq!(sync.position, Spawns::default().cop);
        assert_eq!(sync.velocity, Vec2::ZERO);
        assert_eq!(s.local().direction(), crate::player::Direction::Still);
    }

    #[test]
    fn joystick_moves_local_player_right() {
        let mut s = session(PlayerRole::Thief);
        let t0 = Instant::now();
        s.input
            .touch_began_cb(&TouchEvent::new(TouchId(1), Vec2::new(100.0, 300.0), t0), true);
        s.input.touch_moved_cb(
            &TouchEvent::new(TouchId(1), Vec2::new(200.0, 300.0), t0),
            Vec2::new(100.0, 300.0),
            true,
        );
        let mut last = None;
        for _ in 0..5 {
            last = Some(s.frame(1.0 / 60.0));
        }
        let last = last.unwrap();
        assert_eq!(last.role, PlayerRole::Thief);
        assert!(last.velocity.x > 0.0);
        assert!(last.position.x > Spawns::default().thief.x);
        assert_eq!(s.local().direction(), crate::player::Direction::Right);

        let node = s.local().node().unwrap();
        let drawn = s.scene().borrow().position(node).unwrap();
        assert!((drawn.x - last.position.x * 32.0).abs() < 1e-3);
    }

    #[test]
    fn remote_sync_is_mirrored_for_opponent_only() {
        let mut s = session(PlayerRole::Cop);
        let sync = PlayerSync {
            role: PlayerRole::Thief,
            tick: 3,
            position: Vec2::new(5.0, 5.0),
            velocity: Vec2::new(0.0, -1.0),
            force: Vec2::ZERO,
        };
        s.apply_remote(&sync);
        assert_eq!(s.remote().position(), Vec2::new(5.0, 5.0));
        assert_eq!(s.remote().direction(), crate::player::Direction::Down);

        s.apply_remote(&PlayerSync {
            role: PlayerRole::Cop,
            position: Vec2::new(0.0, 0.0),
            ..sync
        });
        assert_eq!(s.remote().position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn players_animate_under_their_own_keys() {
        use crate::player::Direction;
        use patrol_shared::animation::ActionManager;

        let mut s = session(PlayerRole::Cop);
        s.frame(1.0 / 60.0);
        s.apply_remote(&PlayerSync {
            role: PlayerRole::Thief,
            tick: 0,
            position: Vec2::new(5.0, 5.0),
            velocity: Vec2::new(1.0, 0.0),
            force: Vec2::ZERO,
        });
        assert_ne!(s.local().act_key(), s.remote().act_key());
        {
            let actions = s.actions.borrow();
            let local = actions.running(s.local().act_key()).map(|a| a.node);
            let remote = actions.running(s.remote().act_key()).map(|a| a.node);
            assert_eq!(local, s.local().sprite_node(Direction::Still));
            assert_eq!(remote, s.remote().sprite_node(Direction::Right));
        }

        s.remote.dispose();
        assert!(s.actions.borrow().is_active(s.local().act_key()));
        assert!(!s.actions.borrow().is_active(s.remote().act_key()));
        s.local.dispose();
        assert!(!s.actions.borrow().is_active(s.local().act_key()));
    }

    #[test]
    fn dispose_clears_scene() {
        let mut s = session(PlayerRole::Cop);
        s.frame(1.0 / 60.0);
        s.dispose();
        assert!(s.scene().borrow().is_empty());
        assert!(!s.input.is_active());
    }

    #[tokio::test]
    async fn scripted_double_tap_counts_a_switch() {
        let mut s = session(PlayerRole::Cop);
        let t0 = Instant::now();
        let at = |ms: u64| t0 + Duration::from_millis(ms);
        let tap = |id: u64, ms: u64| TouchEvent::new(TouchId(id), Vec2::new(800.0, 300.0), at(ms));
        let script = TouchScript::new()
            .at(1, ScriptedTouch::Began(tap(1, 0)))
            .at(2, ScriptedTouch::Ended(tap(1, 30)))
            .at(4, ScriptedTouch::Began(tap(2, 80)))
            .at(5, ScriptedTouch::Ended(tap(2, 110)));
        let syncs = run_scripted(&mut s, &script, 8, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(syncs.len(), 8);
        assert_eq!(s.stats().switches, 1);
        assert_eq!(s.stats().swipes, 0);
        assert_eq!(s.tick(), 8);
    }
}
