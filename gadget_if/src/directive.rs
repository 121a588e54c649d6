//! # Directive module
//!
//! This module provides the directive types sent to the rover by the
//! companion device, and the parsing of raw directive payloads into them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use conquer_once::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use std::collections::HashMap;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speed used for preset commands which do not carry an explicit speed.
///
/// Units: percent
pub const DEFAULT_COMMAND_SPEED_PCT: i64 = 50;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// Alias string to direction lookup, built once on first use so that
/// dispatching never rescans the alias lists.
static DIRECTION_ALIAS_MAP: Lazy<HashMap<&'static str, Direction>> =
    Lazy::new(build_direction_alias_map);

/// Alias string to preset command lookup, built once on first use.
static COMMAND_ALIAS_MAP: Lazy<HashMap<&'static str, Command>> =
    Lazy::new(build_command_alias_map);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A directive, i.e. an instruction sent to the rover by the companion
/// device.
///
/// The `direction` and `command` strings are kept raw here, resolution
/// against the alias sets happens at dispatch so that unrecognised strings
/// can be treated as no-ops rather than parse failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Directive {
    /// A timed move in a given direction.
    Move {
        /// The raw direction string, matched against [`Direction`] aliases.
        direction: String,

        /// Duration of the move in seconds.
        duration_s: i64,

        /// Speed of the move in percent, between -100 and 100.
        speed_pct: i64,
    },

    /// A preset command (circle, square, patrol, sentry, ...).
    Command {
        /// The raw command string, matched against [`Command`] aliases.
        command: String,

        /// Speed of the command in percent, defaults to
        /// [`DEFAULT_COMMAND_SPEED_PCT`].
        speed_pct: i64,
    },

    /// Enable or disable beacon-follow mode.
    Follow {
        /// True to enable follow mode, false to disable it.
        enabled: bool,
    },
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Directional variants understood by the move handler.
///
/// Each variant accepts a set of literal alias strings, corresponding to the
/// slot values of the companion device's voice skill.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

/// Preset command variants understood by the command handler.
///
/// As with [`Direction`] each variant maps to a set of accepted alias
/// strings.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Command {
    Circle,
    Square,
    Sentry,
    Patrol,
    FireOne,
    FireAll,
}

/// Possible directive parsing errors.
#[derive(Debug, Error)]
pub enum DirectiveParseError {
    #[error("Directive contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("\"{0}\" is not a recognised directive type")]
    InvalidType(String),

    #[error("Directive is missing the required field \"{0}\"")]
    MissingField(&'static str),

    #[error("Directive field \"{0}\" cannot be read as an integer")]
    InvalidInt(&'static str),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Directive {
    /// Parse a new directive from a JSON payload.
    ///
    /// Required fields depend on the payload's `type`:
    /// - `move`: `direction` (string), `duration` (int, seconds), `speed`
    ///   (int, percent)
    /// - `command`: `command` (string), `speed` (int, percent, optional)
    /// - `follow`/`stopfollow`: no fields
    ///
    /// Integer fields also accept numeric strings, matching the coercion the
    /// companion device's skill performs on slot values.
    pub fn from_json(json_str: &str) -> Result<Self, DirectiveParseError> {
        // Parse the JSON string into a value
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(DirectiveParseError::InvalidJson(e)),
        };

        // Get the type of the directive
        let directive_type = match val["type"].as_str() {
            Some(s) => s,
            None => return Err(DirectiveParseError::MissingField("type")),
        };

        match directive_type {
            "move" => Ok(Directive::Move {
                direction: req_str(&val, "direction")?,
                duration_s: req_int(&val, "duration")?,
                speed_pct: req_int(&val, "speed")?,
            }),
            "command" => Ok(Directive::Command {
                command: req_str(&val, "command")?,
                speed_pct: opt_int(&val, "speed", DEFAULT_COMMAND_SPEED_PCT)?,
            }),
            "follow" => Ok(Directive::Follow { enabled: true }),
            "stopfollow" => Ok(Directive::Follow { enabled: false }),
            t => Err(DirectiveParseError::InvalidType(String::from(t))),
        }
    }
}

impl Direction {
    /// All directional variants, in declaration order.
    pub const ALL: [Direction; 5] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
        Direction::Stop,
    ];

    /// The literal alias strings accepted for this variant.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Direction::Forward => &["forward", "forwards", "go forward"],
            Direction::Backward => &["back", "backward", "backwards", "go backward"],
            Direction::Left => &["left", "go left"],
            Direction::Right => &["right", "go right"],
            Direction::Stop => &["stop", "brake", "halt"],
        }
    }

    /// Resolve an alias string to its direction, or `None` if the string
    /// matches no variant.
    ///
    /// Matching is exact string membership, unmatched strings are legal
    /// input.
    pub fn from_alias(s: &str) -> Option<Self> {
        DIRECTION_ALIAS_MAP.get(s).copied()
    }
}

impl Command {
    /// All preset command variants, in declaration order.
    pub const ALL: [Command; 6] = [
        Command::Circle,
        Command::Square,
        Command::Sentry,
        Command::Patrol,
        Command::FireOne,
        Command::FireAll,
    ];

    /// The literal alias strings accepted for this variant.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Command::Circle => &["circle", "move around"],
            Command::Square => &["square"],
            Command::Sentry => &["guard", "guard mode", "sentry", "sentry mode"],
            Command::Patrol => &["patrol", "patrol mode"],
            Command::FireOne => &["cannon", "1 shot", "one shot"],
            Command::FireAll => &["all shots", "all shot"],
        }
    }

    /// Resolve an alias string to its command, or `None` if the string
    /// matches no variant.
    pub fn from_alias(s: &str) -> Option<Self> {
        COMMAND_ALIAS_MAP.get(s).copied()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn build_direction_alias_map() -> HashMap<&'static str, Direction> {
    let mut map = HashMap::new();
    for dir in Direction::ALL.iter() {
        for alias in dir.aliases() {
            map.insert(*alias, *dir);
        }
    }
    map
}

fn build_command_alias_map() -> HashMap<&'static str, Command> {
    let mut map = HashMap::new();
    for cmd in Command::ALL.iter() {
        for alias in cmd.aliases() {
            map.insert(*alias, *cmd);
        }
    }
    map
}

/// Get a required string field from the payload.
fn req_str(val: &Value, field: &'static str) -> Result<String, DirectiveParseError> {
    match val[field].as_str() {
        Some(s) => Ok(String::from(s)),
        None => Err(DirectiveParseError::MissingField(field)),
    }
}

/// Get a required integer field from the payload.
///
/// Accepts both JSON integers and numeric strings.
fn req_int(val: &Value, field: &'static str) -> Result<i64, DirectiveParseError> {
    match &val[field] {
        Value::Null => Err(DirectiveParseError::MissingField(field)),
        v => coerce_int(v, field),
    }
}

/// Get an optional integer field from the payload, falling back to `default`
/// when the field is absent.
fn opt_int(val: &Value, field: &'static str, default: i64) -> Result<i64, DirectiveParseError> {
    match &val[field] {
        Value::Null => Ok(default),
        v => coerce_int(v, field),
    }
}

fn coerce_int(v: &Value, field: &'static str) -> Result<i64, DirectiveParseError> {
    if let Some(i) = v.as_i64() {
        return Ok(i);
    }

    // Numeric strings are coerced as well
    if let Some(s) = v.as_str() {
        if let Ok(i) = s.trim().parse::<i64>() {
            return Ok(i);
        }
    }

    Err(DirectiveParseError::InvalidInt(field))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_direction_aliases() {
        assert_eq!(Direction::from_alias("forward"), Some(Direction::Forward));
        assert_eq!(Direction::from_alias("forwards"), Some(Direction::Forward));
        assert_eq!(
            Direction::from_alias("go backward"),
            Some(Direction::Backward)
        );
        assert_eq!(Direction::from_alias("go left"), Some(Direction::Left));
        assert_eq!(Direction::from_alias("halt"), Some(Direction::Stop));
        assert_eq!(Direction::from_alias("brake"), Some(Direction::Stop));

        // Unmatched strings are legal input which resolve to nothing
        assert_eq!(Direction::from_alias("sideways"), None);
        assert_eq!(Direction::from_alias(""), None);
        assert_eq!(Direction::from_alias("FORWARD"), None);
    }

    #[test]
    fn test_command_aliases() {
        assert_eq!(Command::from_alias("circle"), Some(Command::Circle));
        assert_eq!(Command::from_alias("move around"), Some(Command::Circle));
        assert_eq!(Command::from_alias("guard mode"), Some(Command::Sentry));
        assert_eq!(Command::from_alias("sentry"), Some(Command::Sentry));
        assert_eq!(Command::from_alias("patrol"), Some(Command::Patrol));
        assert_eq!(Command::from_alias("one shot"), Some(Command::FireOne));
        assert_eq!(Command::from_alias("all shots"), Some(Command::FireAll));
        assert_eq!(Command::from_alias("pirouette"), None);
    }

    #[test]
    fn test_parse_move() {
        let d = Directive::from_json(
            r#"{"type": "move", "direction": "left", "duration": 3, "speed": 50}"#,
        )
        .unwrap();

        assert_eq!(
            d,
            Directive::Move {
                direction: String::from("left"),
                duration_s: 3,
                speed_pct: 50
            }
        );
    }

    #[test]
    fn test_parse_move_coerces_numeric_strings() {
        let d = Directive::from_json(
            r#"{"type": "move", "direction": "forward", "duration": "4", "speed": "-75"}"#,
        )
        .unwrap();

        assert_eq!(
            d,
            Directive::Move {
                direction: String::from("forward"),
                duration_s: 4,
                speed_pct: -75
            }
        );
    }

    #[test]
    fn test_parse_move_missing_field() {
        let res =
            Directive::from_json(r#"{"type": "move", "direction": "forward", "duration": 3}"#);
        assert!(matches!(res, Err(DirectiveParseError::MissingField("speed"))));

        let res = Directive::from_json(r#"{"type": "move", "duration": 3, "speed": 50}"#);
        assert!(matches!(
            res,
            Err(DirectiveParseError::MissingField("direction"))
        ));
    }

    #[test]
    fn test_parse_move_bad_int() {
        let res = Directive::from_json(
            r#"{"type": "move", "direction": "forward", "duration": "soon", "speed": 50}"#,
        );
        assert!(matches!(
            res,
            Err(DirectiveParseError::InvalidInt("duration"))
        ));
    }

    #[test]
    fn test_parse_command_default_speed() {
        let d = Directive::from_json(r#"{"type": "command", "command": "square"}"#).unwrap();

        assert_eq!(
            d,
            Directive::Command {
                command: String::from("square"),
                speed_pct: DEFAULT_COMMAND_SPEED_PCT
            }
        );

        let d = Directive::from_json(r#"{"type": "command", "command": "circle", "speed": 40}"#)
            .unwrap();

        assert_eq!(
            d,
            Directive::Command {
                command: String::from("circle"),
                speed_pct: 40
            }
        );
    }

    #[test]
    fn test_parse_follow() {
        assert_eq!(
            Directive::from_json(r#"{"type": "follow"}"#).unwrap(),
            Directive::Follow { enabled: true }
        );
        assert_eq!(
            Directive::from_json(r#"{"type": "stopfollow"}"#).unwrap(),
            Directive::Follow { enabled: false }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Directive::from_json("not json at all"),
            Err(DirectiveParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Directive::from_json(r#"{"direction": "forward"}"#),
            Err(DirectiveParseError::MissingField("type"))
        ));
        assert!(matches!(
            Directive::from_json(r#"{"type": "dance"}"#),
            Err(DirectiveParseError::InvalidType(_))
        ));
    }
}
