//! Keyboard shortcut dispatch and rebinding
//!
//! Dispatch walks the active bindings in order and stops at the first chord
//! whose key and exact modifier state match the event. Rebinding is driven
//! by [`ShortcutRecorder`], a two-state machine fed discrete input events.

use repeater_common::{Chord, KeyEvent, ShortcutAction, ShortcutMap};
use tracing::debug;

use crate::error::RepeaterError;

/// Find the action bound to `event`
///
/// When `bindings` is absent or empty the built-in defaults are used in its
/// place. The two sets are never merged here. Unknown actions are returned
/// like any other so the caller's no-op branch can swallow them.
pub fn dispatch(event: &KeyEvent, bindings: Option<&ShortcutMap>) -> Option<ShortcutAction> {
    let defaults;
    let active = match bindings {
        Some(map) if !map.is_empty() => map,
        _ => {
            defaults = ShortcutMap::defaults();
            &defaults
        }
    };

    let action = active
        .iter()
        .find(|(_, chord)| chord.matches(event))
        .map(|(action, _)| action.clone());

    if let Some(action) = &action {
        debug!(code = %event.code, action = %action, "Shortcut matched");
    }
    action
}

/// State of the rebinding flow
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing {
        action: ShortcutAction,
        original: Option<Chord>,
    },
}

/// Input to the rebinding flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// User asked to rebind an action
    Begin(ShortcutAction),
    /// A key was pressed while the flow is active
    Key(KeyEvent),
    /// User dismissed the capture (click elsewhere, close modal)
    Cancel,
}

/// Result of feeding one event to the recorder
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Started { action: ShortcutAction, original: Option<Chord> },
    /// Still capturing; only a modifier was pressed
    Waiting,
    Recorded { action: ShortcutAction, chord: Chord },
    /// Capture abandoned; the original binding stays in place
    Cancelled { action: ShortcutAction, original: Option<Chord> },
    /// Chord clashes with another action; still capturing
    Rejected(RepeaterError),
    Ignored,
}

/// Records a new chord for one action at a time
#[derive(Debug, Default)]
pub struct ShortcutRecorder {
    state: CaptureState,
}

impl ShortcutRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing { .. })
    }

    /// Apply one event. `bindings` is modified on `Recorded`, and seeded
    /// with the defaults on `Begin` when it is empty.
    pub fn handle(&mut self, event: CaptureEvent, bindings: &mut ShortcutMap) -> CaptureOutcome {
        let state = std::mem::take(&mut self.state);

        match (state, event) {
            (_, CaptureEvent::Begin(action)) => {
                // An empty map dispatches through the defaults, so conflicts
                // must be checked against (and written into) those
                if bindings.is_empty() {
                    *bindings = ShortcutMap::defaults();
                }
                let original = bindings.get(&action).cloned();
                self.state = CaptureState::Capturing {
                    action: action.clone(),
                    original: original.clone(),
                };
                CaptureOutcome::Started { action, original }
            }
            (CaptureState::Idle, _) => CaptureOutcome::Ignored,
            (CaptureState::Capturing { action, original }, CaptureEvent::Cancel) => {
                CaptureOutcome::Cancelled { action, original }
            }
            (CaptureState::Capturing { action, original }, CaptureEvent::Key(key)) => {
                if key.is_modifier_only() {
                    self.state = CaptureState::Capturing { action, original };
                    return CaptureOutcome::Waiting;
                }
                if key.code == "Escape" && !key.has_modifiers() {
                    return CaptureOutcome::Cancelled { action, original };
                }

                let chord = key.to_chord();
                if let Some(owner) = bindings.find_conflict(&chord, &action) {
                    let error = RepeaterError::ShortcutConflict {
                        action: owner.to_string(),
                        chord: chord.to_string(),
                    };
                    self.state = CaptureState::Capturing { action, original };
                    return CaptureOutcome::Rejected(error);
                }

                bindings.set(action.clone(), chord.clone());
                debug!(action = %action, chord = %chord, "Shortcut rebound");
                CaptureOutcome::Recorded { action, chord }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_falls_back_to_defaults() {
        let event = KeyEvent::new("Enter").with_ctrl();
        assert_eq!(dispatch(&event, None), Some(ShortcutAction::SendRequest));
        assert_eq!(dispatch(&event, Some(&ShortcutMap::new())), Some(ShortcutAction::SendRequest));
    }

    #[test]
    fn test_custom_set_is_not_merged_with_defaults() {
        let mut custom = ShortcutMap::new();
        custom.set(ShortcutAction::ClearInput, Chord::new("KeyK", true, false, false));

        let default_send = KeyEvent::new("Enter").with_ctrl();
        assert_eq!(dispatch(&default_send, Some(&custom)), None);
    }

    #[test]
    fn test_unknown_action_is_returned() {
        let mut custom = ShortcutMap::new();
        custom.set(ShortcutAction::from_id("legacy"), Chord::new("KeyQ", true, false, false));
        let action = dispatch(&KeyEvent::new("KeyQ").with_ctrl(), Some(&custom));
        assert_eq!(action, Some(ShortcutAction::Unknown("legacy".to_string())));
    }

    #[test]
    fn test_recorder_ignores_keys_when_idle() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutMap::defaults();
        let outcome = recorder.handle(CaptureEvent::Key(KeyEvent::new("KeyA")), &mut bindings);
        assert_eq!(outcome, CaptureOutcome::Ignored);
        assert_eq!(bindings, ShortcutMap::defaults());
    }

    #[test]
    fn test_recorder_full_flow() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutMap::defaults();

        let outcome = recorder.handle(CaptureEvent::Begin(ShortcutAction::SendRequest), &mut bindings);
        assert!(matches!(outcome, CaptureOutcome::Started { original: Some(_), .. }));
        assert!(recorder.is_capturing());

        let outcome = recorder.handle(CaptureEvent::Key(KeyEvent::new("ControlLeft").with_ctrl()), &mut bindings);
        assert_eq!(outcome, CaptureOutcome::Waiting);

        let outcome = recorder.handle(CaptureEvent::Key(KeyEvent::new("Space").with_ctrl()), &mut bindings);
        assert_eq!(
            outcome,
            CaptureOutcome::Recorded {
                action: ShortcutAction::SendRequest,
                chord: Chord::new("Space", true, false, false),
            }
        );
        assert_eq!(recorder.state(), &CaptureState::Idle);
        assert_eq!(bindings.get(&ShortcutAction::SendRequest).unwrap().key, "Space");
    }

    #[test]
    fn test_recorder_rejects_conflict_and_keeps_capturing() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutMap::defaults();

        recorder.handle(CaptureEvent::Begin(ShortcutAction::SendRequest), &mut bindings);
        let outcome = recorder.handle(CaptureEvent::Key(KeyEvent::new("KeyL").with_ctrl()), &mut bindings);

        assert!(matches!(
            outcome,
            CaptureOutcome::Rejected(RepeaterError::ShortcutConflict { ref action, .. }) if action == "clearInput"
        ));
        assert!(recorder.is_capturing());
        assert_eq!(bindings.get(&ShortcutAction::SendRequest).unwrap().key, "Enter");
    }

    #[test]
    fn test_recorder_escape_cancels() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutMap::defaults();

        recorder.handle(CaptureEvent::Begin(ShortcutAction::ClearInput), &mut bindings);
        let outcome = recorder.handle(CaptureEvent::Key(KeyEvent::new("Escape")), &mut bindings);

        assert!(matches!(outcome, CaptureOutcome::Cancelled { action: ShortcutAction::ClearInput, .. }));
        assert!(!recorder.is_capturing());
        assert_eq!(bindings, ShortcutMap::defaults());
    }

    #[test]
    fn test_begin_on_empty_map_seeds_defaults() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutMap::new();

        let outcome = recorder.handle(CaptureEvent::Begin(ShortcutAction::SendRequest), &mut bindings);
        assert!(matches!(outcome, CaptureOutcome::Started { original: Some(_), .. }));
        assert_eq!(bindings, ShortcutMap::defaults());

        // Ctrl+L is the active default for clearInput
        let outcome = recorder.handle(CaptureEvent::Key(KeyEvent::new("KeyL").with_ctrl()), &mut bindings);
        assert!(matches!(outcome, CaptureOutcome::Rejected(RepeaterError::ShortcutConflict { .. })));
        assert!(recorder.is_capturing());
    }

    #[test]
    fn test_rebinding_same_action_to_own_chord_is_allowed() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutMap::defaults();

        recorder.handle(CaptureEvent::Begin(ShortcutAction::ClearInput), &mut bindings);
        let outcome = recorder.handle(CaptureEvent::Key(KeyEvent::new("KeyL").with_ctrl()), &mut bindings);
        assert!(matches!(outcome, CaptureOutcome::Recorded { .. }));
    }
}
