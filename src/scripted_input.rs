use bracket_terminal::prelude::VirtualKeyCode;
use std::{fs, path::Path};

use crate::error::GameError;

/// Key presses replayed from a plain-text script, one character per key.
/// Blank lines and lines starting with `#` are ignored.
pub struct ScriptedInput {
    script_commands: Vec<VirtualKeyCode>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let path = path.as_ref();
        let script = fs::read_to_string(path).map_err(|err| GameError::io(path, err))?;
        let input = Self::parse(&script);
        log::info!(
            "Loaded {} scripted keys from {}",
            input.script_commands.len(),
            path.display()
        );
        Ok(input)
    }

    pub fn parse(script: &str) -> Self {
        let mut script_commands = Vec::new();
        for line in script.lines() {
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }
            for char_code in trimmed_line.chars() {
                match char_to_virtualkeycode(char_code) {
                    Some(key) => script_commands.push(key),
                    None => log::warn!("Unknown key in script: {char_code:?}"),
                }
            }
        }

        Self {
            script_commands,
            current_command_index: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.script_commands.len() - self.current_command_index
    }

    pub fn next_key(&mut self) -> Option<VirtualKeyCode> {
        let key = self.script_commands.get(self.current_command_index).copied()?;
        self.current_command_index += 1;
        Some(key)
    }
}

fn char_to_virtualkeycode(c: char) -> Option<VirtualKeyCode> {
    match c {
        'w' | 'W' => Some(VirtualKeyCode::W),
        'a' | 'A' => Some(VirtualKeyCode::A),
        's' | 'S' => Some(VirtualKeyCode::S),
        'd' | 'D' => Some(VirtualKeyCode::D),
        'h' | 'H' => Some(VirtualKeyCode::H),
        'j' | 'J' => Some(VirtualKeyCode::J),
        'k' | 'K' => Some(VirtualKeyCode::K),
        'l' | 'L' => Some(VirtualKeyCode::L),
        'q' | 'Q' => Some(VirtualKeyCode::Q),
        'e' | 'E' => Some(VirtualKeyCode::E),
        'r' | 'R' => Some(VirtualKeyCode::R),
        'z' | 'Z' => Some(VirtualKeyCode::Z),
        'x' | 'X' => Some(VirtualKeyCode::X),
        'c' | 'C' => Some(VirtualKeyCode::C),
        'v' | 'V' => Some(VirtualKeyCode::V),
        '1' => Some(VirtualKeyCode::Key1),
        '2' => Some(VirtualKeyCode::Key2),
        '3' => Some(VirtualKeyCode::Key3),
        '4' => Some(VirtualKeyCode::Key4),
        '5' => Some(VirtualKeyCode::Key5),
        '6' => Some(VirtualKeyCode::Key6),
        '7' => Some(VirtualKeyCode::Key7),
        '8' => Some(VirtualKeyCode::Key8),
        '9' => Some(VirtualKeyCode::Key9),
        '.' => Some(VirtualKeyCode::Period), // wait a frame
        '!' => Some(VirtualKeyCode::Return), // restart after game over
        '^' => Some(VirtualKeyCode::Escape), // quit
        _ => None,
    }
}
