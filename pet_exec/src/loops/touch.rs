//! Touch loop - speech response to the touch sensor being bumped

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::Arc;

// Internal
use gadget_if::eqpt::BumpSensor;
use gadget_if::events::{Event, EventSender};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Phrase read out when the rover is patted.
const PAT_SPEECH: &str = "Ahh, I like that.";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Touch thread entry point.
///
/// Blocks inside the sensor's level-triggered wait, emits a speech event on
/// each bump and goes straight back to waiting. There is no debounce: a
/// continuously asserted sensor refires immediately.
pub fn touch_thread(mut bump: Box<dyn BumpSensor>, events: Arc<dyn EventSender>) {
    loop {
        // A false return is a spurious wakeup with no bump behind it
        if !bump.wait_for_bump() {
            continue;
        }

        events.send_event(Event::speech(PAT_SPEECH));
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_eqpt::{MockBump, RecordingEventSender};
    use gadget_if::events::EventName;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_each_bump_emits_one_speech_event() {
        let events = RecordingEventSender::new();

        {
            let bump = Box::new(MockBump::new(2));
            let events: Arc<dyn EventSender> = Arc::new(events.clone());
            thread::spawn(move || touch_thread(bump, events));
        }

        thread::sleep(Duration::from_millis(300));

        let recorded = events.events();
        assert_eq!(recorded.len(), 2);
        for event in recorded {
            assert_eq!(event.name, EventName::Speech);
            assert_eq!(event.payload["speechOut"], "Ahh, I like that.");
        }
    }
}
