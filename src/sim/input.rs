//! Held-key snapshot read once per tick by vehicle kinematics
//!
//! The host updates the snapshot from key events as they arrive; the
//! simulation only ever reads it.

use serde::{Deserialize, Serialize};

/// Logical controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    StrafeLeft,
    StrafeRight,
    Ascend,
    Descend,
}

impl Key {
    pub const ALL: [Key; 8] = [
        Key::Forward,
        Key::Backward,
        Key::TurnLeft,
        Key::TurnRight,
        Key::StrafeLeft,
        Key::StrafeRight,
        Key::Ascend,
        Key::Descend,
    ];

    #[inline]
    const fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Map a DOM `KeyboardEvent.code` to a control
    pub fn from_code(code: &str) -> Option<Key> {
        match code {
            "KeyW" | "ArrowUp" => Some(Key::Forward),
            "KeyS" | "ArrowDown" => Some(Key::Backward),
            "KeyA" | "ArrowLeft" => Some(Key::TurnLeft),
            "KeyD" | "ArrowRight" => Some(Key::TurnRight),
            "KeyQ" => Some(Key::StrafeLeft),
            "KeyE" => Some(Key::StrafeRight),
            "Space" => Some(Key::Ascend),
            "ShiftLeft" | "ShiftRight" => Some(Key::Descend),
            _ => None,
        }
    }
}

/// Set of currently held controls, packed into a bitfield
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    bits: u16,
}

impl InputState {
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Snapshot with the given keys held
    pub fn with(keys: &[Key]) -> Self {
        let mut state = Self::new();
        for &key in keys {
            state.press(key);
        }
        state
    }

    pub fn press(&mut self, key: Key) {
        self.bits |= key.bit();
    }

    pub fn release(&mut self, key: Key) {
        self.bits &= !key.bit();
    }

    pub fn set(&mut self, key: Key, held: bool) {
        if held {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    /// Apply a raw key code; unknown codes are ignored
    pub fn set_code(&mut self, code: &str, held: bool) -> bool {
        match Key::from_code(code) {
            Some(key) => {
                self.set(key, held);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn held(&self, key: Key) -> bool {
        self.bits & key.bit() != 0
    }

    /// Any control that moves or turns the vehicle
    pub fn any(&self) -> bool {
        self.bits != 0
    }

    /// `+1` if only `positive` is held, `-1` if only `negative`, else `0`
    pub fn axis(&self, positive: Key, negative: Key) -> f32 {
        match (self.held(positive), self.held(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }
}
