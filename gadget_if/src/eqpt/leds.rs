//! # Status LED contract

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The LED groups fitted to the rover.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum LedGroup {
    Left,
    Right,
}

/// Colours the status LEDs can show.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum LedColor {
    Black,
    Green,
    Yellow,
    Orange,
    Red,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Status LED collaborator.
pub trait Leds: Send {
    /// Set one LED group to the given colour.
    ///
    /// `brightness_pct` is in [0, 1].
    fn set_color(&mut self, group: LedGroup, color: LedColor, brightness_pct: f64);
}
