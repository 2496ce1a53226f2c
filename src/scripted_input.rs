//! Replays keypresses from a plain-text script, one character per key.
//! Lines starting with `#` and blank lines are skipped; unknown characters
//! are warned about and dropped. Used for demo runs and soak testing the
//! tick loop without a human at the keyboard.

use bracket_terminal::prelude::VirtualKeyCode;
use log::warn;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

pub struct ScriptedInput {
    keys: Vec<VirtualKeyCode>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut keys = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            for c in trimmed.chars() {
                if let Some(key) = char_to_key(c) {
                    keys.push(key);
                } else {
                    warn!("unknown key in script: {c:?}");
                }
            }
        }

        Ok(Self { keys, cursor: 0 })
    }

    pub fn next_key(&mut self) -> Option<VirtualKeyCode> {
        let key = self.keys.get(self.cursor).copied();
        if key.is_some() {
            self.cursor += 1;
        }
        key
    }
}

fn char_to_key(c: char) -> Option<VirtualKeyCode> {
    match c.to_ascii_lowercase() {
        'w' => Some(VirtualKeyCode::W),
        'a' => Some(VirtualKeyCode::A),
        's' => Some(VirtualKeyCode::S),
        'd' => Some(VirtualKeyCode::D),
        ' ' | 'i' => Some(VirtualKeyCode::Space), // interact
        'v' => Some(VirtualKeyCode::V),           // save
        'l' => Some(VirtualKeyCode::L),           // load
        'h' => Some(VirtualKeyCode::H),           // help
        _ => None,
    }
}
