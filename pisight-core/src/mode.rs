//! Operating mode and the cell that owns it

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis operation selected for the next capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Sparse text (signs, labels)
    #[default]
    Text,
    /// Dense text layout (pages, letters)
    Document,
    /// Dominant color clustering
    Color,
    /// Banknote classification
    Money,
}

impl Mode {
    /// All modes in cycle order.
    pub const ALL: [Mode; 4] = [Mode::Text, Mode::Document, Mode::Color, Mode::Money];

    pub fn index(self) -> usize {
        match self {
            Mode::Text => 0,
            Mode::Document => 1,
            Mode::Color => 2,
            Mode::Money => 3,
        }
    }

    /// Next mode in the cycle, wrapping from MONEY back to TEXT.
    pub fn next(self) -> Mode {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Text => "TEXT",
            Mode::Document => "DOCUMENT",
            Mode::Color => "COLOR",
            Mode::Money => "MONEY",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown mode '{}' (expected TEXT, DOCUMENT, COLOR or MONEY)", s))
    }
}

/// Single-writer mode cell.
///
/// The capture worker owns one of these; readers take a snapshot with
/// [`ModeState::current`] so a dispatch never observes a half-applied change.
#[derive(Debug, Default)]
pub struct ModeState {
    current: Mutex<Mode>,
}

impl ModeState {
    pub fn new(initial: Mode) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    pub fn current(&self) -> Mode {
        *self.current.lock()
    }

    /// Advance to the next mode and return it.
    pub fn advance_mode(&self) -> Mode {
        let mut guard = self.current.lock();
        *guard = guard.next();
        *guard
    }
}
