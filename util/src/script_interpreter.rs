//! # Directive script interpreter module
//!
//! This module provides an interpreter for timed directive scripts, allowing
//! sequences of companion-device directives to be replayed without a paired
//! device, for example during bench testing.
//!
//! A script is a series of `<time>: <json payload>;` entries, where `<time>`
//! is the number of seconds after session start at which the payload should
//! be dispatched.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use gadget_if::directive::{Directive, DirectiveParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A directive which is scripted to occur at a specific time.
struct ScheduledDirective {
    /// The time the directive is supposed to be dispatched at
    exec_time_s: f64,

    /// The directive to dispatch
    directive: Directive,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_directives` to acquire the directives that need dispatching
/// now.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    directives: VecDeque<ScheduledDirective>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid directive at {0} s: {1}")]
    InvalidDirective(f64, DirectiveParseError),
}

pub enum PendingDirectives {
    None,
    Some(Vec<Directive>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    ///
    /// The whole script is parsed up front so that a malformed entry is
    /// rejected before anything runs, rather than halfway through a routine.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        // Load the script into a string
        let script = match fs::read_to_string(script_path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e)),
        };

        // Empty queue of directives
        let mut queue: VecDeque<ScheduledDirective> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .unwrap();

        let mut num_caps = 0;

        for cap in re.captures_iter(&script) {
            // Parse the exec time
            let exec_time_s: f64 = match cap.get(1).unwrap().as_str().parse() {
                Ok(t) => t,
                Err(e) => return Err(ScriptError::InvalidTimestamp(format!("{}", e))),
            };

            // Parse the directive from the payload. The scripts contain JSON
            // only.
            let directive = match Directive::from_json(cap.get(3).unwrap().as_str()) {
                Ok(d) => d,
                Err(e) => return Err(ScriptError::InvalidDirective(exec_time_s, e)),
            };

            // Build the scheduled entry from the match
            queue.push_back(ScheduledDirective {
                exec_time_s,
                directive,
            });

            num_caps += 1;
        }

        if num_caps == 0 {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            _script_path: path,
            directives: queue,
        })
    }

    /// Return a vector of pending directives, or `None` if nothing needs
    /// dispatching now.
    pub fn get_pending_directives(&mut self) -> PendingDirectives {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.directives.is_empty() {
            return PendingDirectives::EndOfScript;
        }

        let mut pending: Vec<Directive> = vec![];

        let current_time_s = get_elapsed_seconds();

        // Peek items from the queue, if the head's exec time is lower than
        // the current time add it to the vector, and keep adding directives
        // until the exec times are larger than the current time.
        while self
            .directives
            .front()
            .map(|d| d.exec_time_s < current_time_s)
            .unwrap_or(false)
        {
            // Unwrap is fine, the front was just checked
            pending.push(self.directives.pop_front().unwrap().directive);
        }

        if !pending.is_empty() {
            PendingDirectives::Some(pending)
        } else {
            PendingDirectives::None
        }
    }

    /// Get the number of directives remaining in the script
    pub fn get_num_directives(&self) -> usize {
        self.directives.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.directives.back() {
            Some(d) => d.exec_time_s,
            None => 0f64,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_script(name: &str, content: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_script() {
        let path = write_script(
            "pet_sw_test_script_ok.prs",
            "0.5: {\"type\": \"command\", \"command\": \"patrol\"};\n\
             4.0: {\"type\": \"move\", \"direction\": \"stop\", \"duration\": 1, \"speed\": 0};\n\
             6.0: {\"type\": \"follow\"};\n",
        );

        let si = ScriptInterpreter::new(&path).unwrap();
        assert_eq!(si.get_num_directives(), 3);
        assert_eq!(si.get_duration(), 6.0);
    }

    #[test]
    fn test_load_script_errors() {
        let path = write_script("pet_sw_test_script_empty.prs", "no entries here\n");
        assert!(matches!(
            ScriptInterpreter::new(&path),
            Err(ScriptError::ScriptEmpty)
        ));

        let path = write_script(
            "pet_sw_test_script_bad_directive.prs",
            "1.0: {\"type\": \"move\", \"direction\": \"left\"};\n",
        );
        assert!(matches!(
            ScriptInterpreter::new(&path),
            Err(ScriptError::InvalidDirective(_, _))
        ));

        assert!(matches!(
            ScriptInterpreter::new("/definitely/not/a/real/path.prs"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
