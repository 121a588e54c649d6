//! # Directive processor module
//!
//! The directive processor routes parsed companion-device directives to the
//! motion controller, the mode store, the LEDs and the event sender. It is
//! the single place deciding what a directive does; it runs on its own
//! dispatch thread so a blocking composite maneuver (square, sentry) never
//! stalls the background loops or the directive source.
//!
//! Nothing here returns an error: a directive that cannot be executed is
//! logged and dropped.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::sync::{Arc, Mutex};

// Internal
use crate::mode_store::ModeStore;
use crate::motion_ctrl::MotionCtrl;
use gadget_if::directive::{Command, Direction, Directive};
use gadget_if::eqpt::{LedColor, LedGroup, Leds};
use gadget_if::events::{Event, EventSender};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Phrase read out by the companion device when sentry mode activates.
const SENTRY_SPEECH: &str = "Sentry mode activated";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything the processor may touch while executing a directive.
pub struct DispatchCtx {
    pub modes: Arc<ModeStore>,
    pub motion: MotionCtrl,
    pub leds: Arc<Mutex<Box<dyn Leds>>>,
    pub events: Arc<dyn EventSender>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a directive.
///
/// Mutates the mode store and issues maneuvers through the motion
/// controller. May block for the duration of a composite maneuver.
pub fn exec(ctx: &DispatchCtx, directive: &Directive) {
    match directive {
        Directive::Move {
            direction,
            duration_s,
            speed_pct,
        } => exec_move(ctx, direction, *duration_s, *speed_pct),

        Directive::Command { command, speed_pct } => exec_command(ctx, command, *speed_pct),

        Directive::Follow { enabled } => ctx.modes.set_follow_enabled(*enabled),
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Handle a move directive.
fn exec_move(ctx: &DispatchCtx, direction: &str, duration_s: i64, speed_pct: i64) {
    let dir = match Direction::from_alias(direction) {
        Some(d) => d,
        None => {
            // Unmatched strings are valid input which just do nothing
            debug!("\"{}\" matches no known direction, ignoring", direction);
            return;
        }
    };

    debug!("Move: {:?} for {} s at {} %", dir, duration_s, speed_pct);

    if let Err(e) = ctx
        .motion
        .move_dir(dir, duration_s as f64, speed_pct as f64, false)
    {
        warn!("Move manoeuvre failed: {}", e);
    }

    // Stopping is also an implicit exit from patrol mode
    if dir == Direction::Stop {
        ctx.modes.set_patrol_enabled(false);
    }
}

/// Handle a preset command directive.
fn exec_command(ctx: &DispatchCtx, command: &str, speed_pct: i64) {
    let cmd = match Command::from_alias(command) {
        Some(c) => c,
        None => {
            debug!("\"{}\" matches no known command, ignoring", command);
            return;
        }
    };

    debug!("Command: {:?} at {} %", cmd, speed_pct);

    let speed_pct = speed_pct as f64;

    match cmd {
        Command::Circle => {
            if let Err(e) = ctx.motion.drive_circle(speed_pct) {
                warn!("Circle manoeuvre failed: {}", e);
            }
        }

        Command::Square => {
            // Blocks until all four legs have completed
            if let Err(e) = ctx.motion.drive_square(speed_pct) {
                warn!("Square manoeuvre failed: {}", e);
            }
        }

        Command::Patrol => {
            // The patrol loop picks this up asynchronously
            ctx.modes.set_patrol_enabled(true);
        }

        Command::Sentry => exec_sentry(ctx),

        Command::FireOne | Command::FireAll => {
            debug!("No launcher fitted to this model, ignoring fire command");
        }
    }
}

/// Activate sentry mode: announce it, strike the shuffle posture, show the
/// alert colour.
fn exec_sentry(ctx: &DispatchCtx) {
    ctx.modes.set_sentry_enabled(true);

    // The announcement goes out before the posture so the companion device
    // speaks while the rover moves
    ctx.events.send_event(Event::speech(SENTRY_SPEECH));

    if let Err(e) = ctx.motion.sentry_shuffle() {
        warn!("Sentry shuffle failed: {}", e);
    }

    let mut leds = ctx.leds.lock().unwrap_or_else(|e| e.into_inner());
    leds.set_color(LedGroup::Left, LedColor::Yellow, 1.0);
    leds.set_color(LedGroup::Right, LedColor::Yellow, 1.0);
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::MotionParams;
    use crate::test_eqpt::{
        new_journal, DriveCall, MockDrive, MockLeds, RecordingEventSender,
    };
    use gadget_if::events::EventName;

    struct Harness {
        ctx: DispatchCtx,
        drive: MockDrive,
        leds: MockLeds,
        events: RecordingEventSender,
    }

    fn harness() -> Harness {
        harness_with(MockDrive::new(), RecordingEventSender::new())
    }

    fn harness_with(drive: MockDrive, events: RecordingEventSender) -> Harness {
        let leds = MockLeds::new();

        let ctx = DispatchCtx {
            modes: Arc::new(ModeStore::new()),
            motion: MotionCtrl::new(Box::new(drive.clone()), MotionParams::default()),
            leds: Arc::new(Mutex::new(Box::new(leds.clone()))),
            events: Arc::new(events.clone()),
        };

        Harness {
            ctx,
            drive,
            leds,
            events,
        }
    }

    fn move_directive(direction: &str, duration_s: i64, speed_pct: i64) -> Directive {
        Directive::Move {
            direction: String::from(direction),
            duration_s,
            speed_pct,
        }
    }

    fn command_directive(command: &str, speed_pct: i64) -> Directive {
        Directive::Command {
            command: String::from(command),
            speed_pct,
        }
    }

    #[test]
    fn test_unknown_direction_is_a_no_op() {
        let h = harness();

        exec(&h.ctx, &move_directive("sideways", 3, 50));
        exec(&h.ctx, &move_directive("", 3, 50));

        assert_eq!(h.drive.num_calls(), 0);
        assert_eq!(h.events.num_events(), 0);
    }

    #[test]
    fn test_move_left_turns_then_drives() {
        let h = harness();

        exec(&h.ctx, &move_directive("left", 3, 50));

        assert_eq!(
            h.drive.calls(),
            vec![
                DriveCall::DriveTimed {
                    left_pct: 0.0,
                    right_pct: 50.0,
                    duration_s: 2.0,
                    block: true
                },
                DriveCall::DriveTimed {
                    left_pct: 50.0,
                    right_pct: 50.0,
                    duration_s: 3.0,
                    block: false
                },
            ]
        );
    }

    #[test]
    fn test_move_forward_alias() {
        let h = harness();

        exec(&h.ctx, &move_directive("go forward", 2, 40));

        assert_eq!(
            h.drive.calls(),
            vec![DriveCall::DriveTimed {
                left_pct: 40.0,
                right_pct: 40.0,
                duration_s: 2.0,
                block: false
            }]
        );
    }

    #[test]
    fn test_stop_clears_patrol_mode() {
        let h = harness();
        h.ctx.modes.set_patrol_enabled(true);

        exec(&h.ctx, &move_directive("halt", 0, 0));

        assert_eq!(h.drive.calls(), vec![DriveCall::Stop]);
        assert!(!h.ctx.modes.patrol_enabled());

        // Stop must not touch the other modes
        h.ctx.modes.set_follow_enabled(true);
        exec(&h.ctx, &move_directive("stop", 0, 0));
        assert!(h.ctx.modes.follow_enabled());
    }

    #[test]
    fn test_square_command() {
        let h = harness();

        exec(&h.ctx, &command_directive("square", 40));

        // Four blocking right legs, each turn + forward
        let calls = h.drive.calls();
        assert_eq!(calls.len(), 8);
        assert!(calls.iter().all(|c| matches!(
            c,
            DriveCall::DriveTimed { block: true, .. }
        )));
    }

    #[test]
    fn test_patrol_command_only_sets_flag() {
        let h = harness();

        exec(&h.ctx, &command_directive("patrol mode", 50));

        assert!(h.ctx.modes.patrol_enabled());
        assert_eq!(h.drive.num_calls(), 0);
    }

    #[test]
    fn test_follow_directives() {
        let h = harness();

        exec(&h.ctx, &Directive::Follow { enabled: true });
        assert!(h.ctx.modes.follow_enabled());
        assert_eq!(h.drive.num_calls(), 0);

        exec(&h.ctx, &Directive::Follow { enabled: false });
        assert!(!h.ctx.modes.follow_enabled());
    }

    #[test]
    fn test_sentry_speaks_before_posturing() {
        let journal = new_journal();
        let drive = MockDrive::with_journal(journal.clone());
        let events = RecordingEventSender::with_journal(journal.clone());
        let h = harness_with(drive, events);

        exec(&h.ctx, &command_directive("sentry mode", 50));

        // Exactly one speech event with the fixed phrase
        let events = h.events.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, EventName::Speech);
        assert_eq!(events[0].payload["speechOut"], "Sentry mode activated");

        // The event is emitted before the first posture maneuver
        let journal = journal.lock().unwrap();
        assert_eq!(journal[0], "event:Speech");
        assert!(journal[1..].iter().all(|entry| entry.as_str() == "drive"));

        // Sentry flag is set and the alert colour is shown on both sides
        assert!(h.ctx.modes.sentry_enabled());
        let led_calls = h.leds.calls();
        assert_eq!(
            led_calls,
            vec![
                (LedGroup::Left, LedColor::Yellow, 1.0),
                (LedGroup::Right, LedColor::Yellow, 1.0),
            ]
        );
    }

    #[test]
    fn test_unknown_command_is_a_no_op() {
        let h = harness();

        exec(&h.ctx, &command_directive("backflip", 50));

        assert_eq!(h.drive.num_calls(), 0);
        assert_eq!(h.events.num_events(), 0);
        assert!(!h.ctx.modes.patrol_enabled());
    }

    #[test]
    fn test_fire_commands_are_no_ops() {
        let h = harness();

        exec(&h.ctx, &command_directive("cannon", 50));
        exec(&h.ctx, &command_directive("all shots", 50));

        assert_eq!(h.drive.num_calls(), 0);
        assert_eq!(h.events.num_events(), 0);
    }

    #[test]
    fn test_actuator_fault_is_contained() {
        let h = harness();

        h.drive.fail_next_call();

        // Must not panic or propagate
        exec(&h.ctx, &move_directive("forward", 2, 50));

        // Subsequent directives still work
        exec(&h.ctx, &move_directive("forward", 2, 50));
        assert_eq!(h.drive.num_calls(), 1);
    }
}
