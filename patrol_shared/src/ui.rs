//! UI widget state.
//!
//! The widget toolkit draws and hit-tests buttons; scenes only need the
//! activation and pressed state.

/// A push button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    name: String,
    active: bool,
    down: bool,
}

impl Button {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: false,
            down: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts listening for presses.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Stops listening for presses. The visual pressed state is untouched.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_down(&mut self, down: bool) {
        self.down = down;
    }

    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Feeds a press/release from the toolkit. Returns true if listeners fire.
    pub fn press(&mut self, down: bool) -> bool {
        if !self.active {
            return false;
        }
        self.down = down;
        true
    }
}
