//! Keyboard state to paddle commands

use std::collections::HashSet;

use crate::sim::{MoveDir, TickInput};

const UP_KEYS: [&str; 2] = ["KeyW", "ArrowUp"];
const DOWN_KEYS: [&str; 2] = ["KeyS", "ArrowDown"];
const PAUSE_KEY: &str = "Escape";

/// Currently held keys, by `KeyboardEvent.code`
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    held: HashSet<String>,
    pause_pressed: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns true if the key is one the game uses.
    pub fn key_down(&mut self, code: &str) -> bool {
        if code == PAUSE_KEY {
            // Auto-repeat must not flicker the pause state
            if self.held.insert(code.to_string()) {
                self.pause_pressed = true;
            }
            return true;
        }
        if is_move_key(code) {
            self.held.insert(code.to_string());
            return true;
        }
        false
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
    }

    /// Forget every held key (e.g. when the window loses focus)
    pub fn clear(&mut self) {
        self.held.clear();
        self.pause_pressed = false;
    }

    /// Up wins when both directions are held
    pub fn direction(&self) -> MoveDir {
        if UP_KEYS.iter().any(|k| self.held.contains(*k)) {
            MoveDir::Up
        } else if DOWN_KEYS.iter().any(|k| self.held.contains(*k)) {
            MoveDir::Down
        } else {
            MoveDir::Stop
        }
    }

    /// Build this frame's input, consuming any pending pause press
    pub fn tick_input(&mut self) -> TickInput {
        TickInput {
            direction: self.direction(),
            pause: std::mem::take(&mut self.pause_pressed),
        }
    }
}

fn is_move_key(code: &str) -> bool {
    UP_KEYS.contains(&code) || DOWN_KEYS.contains(&code)
}
