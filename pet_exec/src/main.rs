//! Main pet rover executable entry point.
//!
//! # Architecture
//!
//! The exec brings the rover up and then runs a set of long-lived threads:
//!
//!     - Source pump (this thread): reads directives from a timed script or
//!       from stdin and feeds them to the dispatch thread
//!     - Dispatch thread: executes one directive at a time, so a blocking
//!       composite maneuver (square, sentry) never stalls the source or the
//!       background loops
//!     - Five background control loops: patrol, follow, touch, light, power
//!
//! All threads share the mode store and command the single drive actuator
//! through motion control, which serialises their access. The process runs
//! until the directive source ends; the control loops themselves are never
//! cancelled individually.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::io::BufRead;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

// Internal
use gadget_if::directive::Directive;
use gadget_if::eqpt::{LedColor, LedGroup, Leds};
use gadget_if::events::EventSender;
use pet_lib::{
    directive_processor::{self, DispatchCtx},
    loops,
    mode_store::ModeStore,
    motion_ctrl::MotionCtrl,
    params::Params,
    sim_eqpt::{
        LogEventSender, SimBeacon, SimBump, SimDrive, SimLeds, SimLight, SimTelemetry, SimVars,
    },
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    raise_error,
    script_interpreter::{PendingDirectives, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period at which the directive script is polled for pending directives.
const SOURCE_POLL_PERIOD_S: f64 = 0.1;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("pet_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Pet Rover Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: Params = match util::params::load("pet_exec.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!(
                "Could not load parameters ({}), continuing with built-in defaults",
                e
            );
            Params::default()
        }
    };

    info!("Exec parameters loaded");

    // ---- INITIALISE DIRECTIVE SOURCE ----

    // The source determines whether directives come from a timed script or
    // from stdin (the stand-in for the companion transport).
    let mut source = DirectiveSource::Stdin;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path
    if args.len() == 2 {
        info!("Loading script from \"{}\"", &args[1]);

        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

        info!(
            "Loaded script lasts {:.02} s and contains {} directives\n",
            si.get_duration(),
            si.get_num_directives()
        );

        source = DirectiveSource::Script(si);
    } else if args.len() == 1 {
        info!("No script provided, directives will be read from stdin\n");
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    // ---- INITIALISE EQUIPMENT ----

    info!("Initialising equipment...");

    let sim_vars = SimVars::new();

    let motion = MotionCtrl::new(Box::new(SimDrive::new()), params.motion.clone());
    let leds: Arc<Mutex<Box<dyn Leds>>> = Arc::new(Mutex::new(Box::new(SimLeds::new())));
    let events: Arc<dyn EventSender> = Arc::new(LogEventSender::new());
    let modes = Arc::new(ModeStore::new());

    info!("Equipment initialised (simulated backends)\n");

    // Show we're up
    {
        let mut leds = leds.lock().unwrap_or_else(|e| e.into_inner());
        leds.set_color(LedGroup::Left, LedColor::Green, 1.0);
        leds.set_color(LedGroup::Right, LedColor::Green, 1.0);
    }

    // ---- SPAWN CONTROL THREADS ----

    info!("Starting control threads");

    // Dispatch thread
    let (directive_tx, directive_rx) = mpsc::channel::<Directive>();
    {
        let ctx = DispatchCtx {
            modes: modes.clone(),
            motion: motion.clone(),
            leds: leds.clone(),
            events: events.clone(),
        };

        thread::Builder::new()
            .name(String::from("dispatch"))
            .spawn(move || {
                while let Ok(directive) = directive_rx.recv() {
                    directive_processor::exec(&ctx, &directive);
                }
            })
            .wrap_err("Failed to spawn the dispatch thread")?;
    }

    // Patrol loop
    {
        let modes = modes.clone();
        let motion = motion.clone();
        let patrol_params = params.patrol.clone();
        thread::Builder::new()
            .name(String::from("patrol"))
            .spawn(move || loops::patrol::patrol_thread(modes, motion, patrol_params))
            .wrap_err("Failed to spawn the patrol loop")?;
    }

    // Follow loop
    {
        let modes = modes.clone();
        let motion = motion.clone();
        let beacon = Box::new(SimBeacon::new(sim_vars.clone()));
        let follow_params = params.follow.clone();
        thread::Builder::new()
            .name(String::from("follow"))
            .spawn(move || loops::follow::follow_thread(modes, motion, beacon, follow_params))
            .wrap_err("Failed to spawn the follow loop")?;
    }

    // Touch loop
    {
        let bump = Box::new(SimBump::new(sim_vars.clone()));
        let events = events.clone();
        thread::Builder::new()
            .name(String::from("touch"))
            .spawn(move || loops::touch::touch_thread(bump, events))
            .wrap_err("Failed to spawn the touch loop")?;
    }

    // Light monitor loop
    {
        let modes = modes.clone();
        let light = Box::new(SimLight::new(sim_vars.clone()));
        let light_params = params.light.clone();
        thread::Builder::new()
            .name(String::from("light"))
            .spawn(move || loops::light::light_thread(modes, light, light_params))
            .wrap_err("Failed to spawn the light loop")?;
    }

    // Power telemetry loop
    {
        let modes = modes.clone();
        let api = Box::new(SimTelemetry::new());
        let events = events.clone();
        let telemetry_params = params.telemetry.clone();
        thread::Builder::new()
            .name(String::from("power"))
            .spawn(move || loops::power::power_thread(modes, api, events, telemetry_params))
            .wrap_err("Failed to spawn the power loop")?;
    }

    info!("Control threads running\n");

    // ---- MAIN LOOP ----

    // Pump the directive source until it ends. The control loops are killed
    // with the process, they are never stopped individually.
    match source {
        DirectiveSource::Script(ref mut si) => loop {
            match si.get_pending_directives() {
                PendingDirectives::None => (),
                PendingDirectives::Some(pending) => {
                    for directive in pending {
                        if directive_tx.send(directive).is_err() {
                            raise_error!("Dispatch thread has died");
                        }
                    }
                }
                // Exit if end of script reached
                PendingDirectives::EndOfScript => {
                    info!("End of directive script reached, stopping");
                    break;
                }
            }

            thread::sleep(Duration::from_secs_f64(SOURCE_POLL_PERIOD_S));
        },

        DirectiveSource::Stdin => {
            let stdin = std::io::stdin();

            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        warn!("Could not read from directive input: {}", e);
                        break;
                    }
                };

                if line.trim().is_empty() {
                    continue;
                }

                // A malformed payload is dropped and logged, never fatal
                match Directive::from_json(&line) {
                    Ok(directive) => {
                        if directive_tx.send(directive).is_err() {
                            raise_error!("Dispatch thread has died");
                        }
                    }
                    Err(e) => warn!("Dropping malformed directive: {}", e),
                }
            }

            info!("Directive input closed, stopping");
        }
    };

    // ---- SHUTDOWN ----

    {
        let mut leds = leds.lock().unwrap_or_else(|e| e.into_inner());
        leds.set_color(LedGroup::Left, LedColor::Black, 1.0);
        leds.set_color(LedGroup::Right, LedColor::Black, 1.0);
    }

    info!("End of execution");

    session.exit();

    Ok(())
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible sources for the directives incoming to the exec.
enum DirectiveSource {
    Stdin,
    Script(ScriptInterpreter),
}
