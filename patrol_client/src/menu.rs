//! Menu scene.
//!
//! The opening menu lets the player host or join a game. The scene only
//! records the choice; a scene router polls [`MenuScene::choice`] and tears
//! the menu down.
//!
//! Buttons stay inactive until the scene is activated, since an active
//! widget keeps receiving input even while hidden.

use std::{cell::RefCell, rc::Rc};

use patrol_shared::{
    audio::{AudioBackend, SoundKind},
    error::{InitError, InitResult},
    math::Size,
    resources::AssetManager,
    ui::Button,
};
use tracing::{debug, info};

/// Asset key of the host button.
pub const HOST_BUTTON_KEY: &str = "menu_host";
/// Asset key of the join button.
pub const JOIN_BUTTON_KEY: &str = "menu_join";
/// Looping menu music.
pub const MENU_MUSIC: &str = "menu";
/// Button click effect.
pub const CLICK_SFX: &str = "click";

/// Handle to the shared audio controller.
pub type SharedAudio = Rc<RefCell<dyn AudioBackend>>;

/// What the player picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Choice {
    #[default]
    None,
    Host,
    Join,
}

/// Which menu button an event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    Host,
    Join,
}

pub struct MenuScene {
    size: Size,
    active: bool,
    choice: Choice,
    host: Button,
    join: Button,
    audio: SharedAudio,
}

impl MenuScene {
    /// Builds the menu for a display of `display` pixels, with its height
    /// locked to `scene_height`. Starts the menu music. The scene starts
    /// inactive.
    pub fn new(
        assets: &AssetManager,
        audio: SharedAudio,
        display: Size,
        scene_height: f32,
    ) -> InitResult<Self> {
        if display.is_degenerate() || scene_height.is_nan() || scene_height <= 0.0 {
            return Err(InitError::DegenerateBounds {
                width: display.width,
                height: display.height,
            });
        }
        let size = display * (scene_height / display.height);

        let host = (*assets.require::<Button>(HOST_BUTTON_KEY)?).clone();
        let join = (*assets.require::<Button>(JOIN_BUTTON_KEY)?).clone();

        audio
            .borrow_mut()
            .play_sound(MENU_MUSIC, SoundKind::Music, true);

        let mut menu = Self {
            size,
            active: true,
            choice: Choice::None,
            host,
            join,
            audio,
        };
        menu.set_active(false);
        info!(width = size.width, height = size.height, "menu scene ready");
        Ok(menu)
    }

    /// Tears the scene down.
    pub fn dispose(&mut self) {
        if self.active {
            self.set_active(false);
        }
    }

    /// Toggles the buttons. Activation always starts from [`Choice::None`];
    /// deactivation releases any button left pressed.
    pub fn set_active(&mut self, value: bool) {
        if self.active == value {
            return;
        }
        self.active = value;
        if value {
            self.choice = Choice::None;
            self.host.activate();
            self.join.activate();
        } else {
            self.host.deactivate();
            self.join.deactivate();
            self.host.set_down(false);
            self.join.set_down(false);
        }
    }

    /// Delivers a press or release from the widget toolkit.
    pub fn press(&mut self, button: MenuButton, down: bool) {
        let (widget, choice) = match button {
            MenuButton::Host => (&mut self.host, Choice::Host),
            MenuButton::Join => (&mut self.join, Choice::Join),
        };
        if !widget.press(down) || !down {
            return;
        }
        self.choice = choice;
        debug!(?choice, "menu choice");

        let mut audio = self.audio.borrow_mut();
        audio.stop_sfx(CLICK_SFX);
        audio.play_sound(CLICK_SFX, SoundKind::Sfx, false);
    }

    pub fn choice(&self) -> Choice {
        self.choice
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Scene content size.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn button(&self, button: MenuButton) -> &Button {
        match button {
            MenuButton::Host => &self.host,
            MenuButton::Join => &self.join,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patrol_shared::{
        audio::{AudioCall, HeadlessAudio},
        shared, Shared,
    };

    fn assets() -> AssetManager {
        let mut assets = AssetManager::new();
        assets.insert(HOST_BUTTON_KEY, Button::new(HOST_BUTTON_KEY));
        assets.insert(JOIN_BUTTON_KEY, Button::new(JOIN_BUTTON_KEY));
        assets
    }

    fn menu() -> (MenuScene, Shared<HeadlessAudio>) {
        let audio = shared(HeadlessAudio::new());
        let menu = MenuScene::new(&assets(), audio.clone(), Size::new(1920.0, 1080.0), 720.0)
            .unwrap();
        (menu, audio)
    }

    #[test]
    fn starts_inactive_with_music() {
        let (menu, audio) = menu();
        assert!(!menu.is_active());
        assert_eq!(menu.size(), Size::new(1280.0, 720.0));
        assert!(audio.borrow().is_playing(MENU_MUSIC));
        assert!(!menu.button(MenuButton::Host).is_active());
    }

    #[test]
    fn presses_before_activation_are_ignored() {
        let (mut menu, _audio) = menu();
        menu.press(MenuButton::Host, true);
        assert_eq!(menu.choice(), Choice::None);
    }

    #[test]
    fn host_press_is_idempotent() {
        let (mut menu, audio) = menu();
        menu.set_active(true);
        menu.press(MenuButton::Host, true);
        assert_eq!(menu.choice(), Choice::Host);
        menu.press(MenuButton::Host, false);
        menu.press(MenuButton::Host, true);
        assert_eq!(menu.choice(), Choice::Host);

        let clicks: Vec<_> = audio
            .borrow()
            .calls()
            .iter()
            .filter(|c| matches!(c, AudioCall::Play { key, .. } if key == CLICK_SFX))
            .cloned()
            .collect();
        assert_eq!(clicks.len(), 2);
    }

    #[test]
    fn click_stops_previous_click_first() {
        let (mut menu, audio) = menu();
        menu.set_active(true);
        menu.press(MenuButton::Join, true);
        let audio = audio.borrow();
        let tail = &audio.calls()[audio.calls().len() - 2..];
        assert_eq!(
            tail,
            &[
                AudioCall::Stop {
                    key: CLICK_SFX.to_string()
                },
                AudioCall::Play {
                    key: CLICK_SFX.to_string(),
                    kind: SoundKind::Sfx,
                    looping: false
                },
            ]
        );
    }

    #[test]
    fn reactivation_resets_choice() {
        let (mut menu, _audio) = menu();
        menu.set_active(true);
        menu.press(MenuButton::Join, true);
        assert_eq!(menu.choice(), Choice::Join);
        menu.set_active(false);
        assert!(!menu.button(MenuButton::Join).is_down());
        assert!(!menu.button(MenuButton::Join).is_active());
        menu.set_active(true);
        assert_eq!(menu.choice(), Choice::None);
    }

    #[test]
    fn missing_buttons_fail_init() {
        let mut assets = AssetManager::new();
        assets.insert(HOST_BUTTON_KEY, Button::new(HOST_BUTTON_KEY));
        let audio: SharedAudio = shared(HeadlessAudio::new());
        let err = MenuScene::new(&assets, audio, Size::new(800.0, 600.0), 720.0).err();
        assert_eq!(err, Some(InitError::MissingAsset(JOIN_BUTTON_KEY.to_string())));
    }
}
