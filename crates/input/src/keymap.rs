//! Key mapping from primitive actions to keyboard keys.
//!
//! The game reads its bindings from SDL keycodes in `config.cfg`; this module
//! turns those (or plain key names from our own config) into crossterm
//! [`KeyCode`]s and back into names an injector understands.

use crossterm::event::{KeyCode, ModifierKeyCode};
use thiserror::Error;

use crate::types::Action;

/// SDL keycodes for the arrow keys start here: right, left, down, up
const SDL_ARROWS: u32 = 0x4000_004F;
/// SDL keycodes for left ctrl, shift, alt
const SDL_LEFT_MODIFIERS: u32 = 0x4000_00E0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
    #[error("invalid key code {0:#x}")]
    InvalidKeycode(u32),
    #[error("unknown action {0:?}")]
    UnknownAction(String),
}

/// Parse a key name such as `left`, `x`, `space` or `ctrlleft`
pub fn parse_key(name: &str) -> Result<KeyCode, KeymapError> {
    let lower = name.trim().to_lowercase();
    let code = match lower.as_str() {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "ctrlleft" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
        "shiftleft" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
        "altleft" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_graphic() => KeyCode::Char(c),
                (Some('f'), Some(_)) => match other[1..].parse::<u8>() {
                    Ok(n) if (1..=12).contains(&n) => KeyCode::F(n),
                    _ => return Err(KeymapError::UnknownKey(name.to_string())),
                },
                _ => return Err(KeymapError::UnknownKey(name.to_string())),
            }
        }
    };
    Ok(code)
}

/// Key for an SDL keycode as stored in the game's settings
pub fn sdl_keycode(code: u32) -> Result<KeyCode, KeymapError> {
    const ARROWS: [KeyCode; 4] = [KeyCode::Right, KeyCode::Left, KeyCode::Down, KeyCode::Up];
    const MODIFIERS: [ModifierKeyCode; 3] = [
        ModifierKeyCode::LeftControl,
        ModifierKeyCode::LeftShift,
        ModifierKeyCode::LeftAlt,
    ];

    if let Some(i) = code.checked_sub(SDL_ARROWS).filter(|i| *i < 4) {
        return Ok(ARROWS[i as usize]);
    }
    if let Some(i) = code.checked_sub(SDL_LEFT_MODIFIERS).filter(|i| *i < 3) {
        return Ok(KeyCode::Modifier(MODIFIERS[i as usize]));
    }
    match char::from_u32(code) {
        Some(' ') => Ok(KeyCode::Char(' ')),
        Some('\r') => Ok(KeyCode::Enter),
        Some('\t') => Ok(KeyCode::Tab),
        Some(c) if c.is_ascii_graphic() => Ok(KeyCode::Char(c.to_ascii_lowercase())),
        _ => Err(KeymapError::InvalidKeycode(code)),
    }
}

/// Name of a key, the inverse of [`parse_key`]
pub fn key_name(key: KeyCode) -> String {
    match key {
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        KeyCode::Modifier(ModifierKeyCode::LeftControl) => "ctrlleft".to_string(),
        KeyCode::Modifier(ModifierKeyCode::LeftShift) => "shiftleft".to_string(),
        KeyCode::Modifier(ModifierKeyCode::LeftAlt) => "altleft".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

/// One key per primitive action
///
/// Grab and release share a key in the game; both are kept so a custom
/// binding can split them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keymap {
    pub grab: KeyCode,
    pub swap: KeyCode,
    pub shift_left: KeyCode,
    pub shift_right: KeyCode,
    pub release: KeyCode,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            grab: KeyCode::Char('x'),
            swap: KeyCode::Char('z'),
            shift_left: KeyCode::Left,
            shift_right: KeyCode::Right,
            release: KeyCode::Char('x'),
        }
    }
}

impl Keymap {
    pub fn key(&self, action: Action) -> KeyCode {
        match action {
            Action::Grab => self.grab,
            Action::Swap => self.swap,
            Action::ShiftLeft => self.shift_left,
            Action::ShiftRight => self.shift_right,
            Action::Release => self.release,
        }
    }

    pub fn set(&mut self, action: Action, key: KeyCode) {
        match action {
            Action::Grab => self.grab = key,
            Action::Swap => self.swap = key,
            Action::ShiftLeft => self.shift_left = key,
            Action::ShiftRight => self.shift_right = key,
            Action::Release => self.release = key,
        }
    }

    /// Defaults overridden by `(action, key name)` pairs
    pub fn from_names<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, KeymapError> {
        let mut map = Self::default();
        for (action, key) in pairs {
            let action = Action::parse(action)
                .ok_or_else(|| KeymapError::UnknownAction(action.to_string()))?;
            map.set(action, parse_key(key)?);
        }
        Ok(map)
    }

    /// Key name for `action`, as sent to injectors
    pub fn key_name(&self, action: Action) -> String {
        key_name(self.key(action))
    }
}
