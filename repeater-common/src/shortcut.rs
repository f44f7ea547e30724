//! Keyboard shortcut data: actions, chords, key events and the binding map

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Actions a shortcut can trigger
///
/// The set is closed. Identifiers found in persisted bindings that do not
/// name one of the known actions are kept as `Unknown` so they round-trip,
/// but they never run anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShortcutAction {
    SendRequest,
    ClearInput,
    ToggleOutOfScope,
    Unknown(String),
}

impl ShortcutAction {
    /// All actions with a registered handler, in default binding order
    pub fn known() -> [ShortcutAction; 3] {
        [
            ShortcutAction::SendRequest,
            ShortcutAction::ClearInput,
            ShortcutAction::ToggleOutOfScope,
        ]
    }

    /// Wire identifier used in persisted settings
    pub fn id(&self) -> &str {
        match self {
            ShortcutAction::SendRequest => "sendRequest",
            ShortcutAction::ClearInput => "clearInput",
            ShortcutAction::ToggleOutOfScope => "toggleOOS",
            ShortcutAction::Unknown(id) => id,
        }
    }

    pub fn from_id(id: &str) -> Self {
        match id {
            "sendRequest" => ShortcutAction::SendRequest,
            "clearInput" => ShortcutAction::ClearInput,
            "toggleOOS" => ShortcutAction::ToggleOutOfScope,
            other => ShortcutAction::Unknown(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ShortcutAction::Unknown(_))
    }
}

impl From<String> for ShortcutAction {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl From<ShortcutAction> for String {
    fn from(action: ShortcutAction) -> Self {
        action.id().to_string()
    }
}

impl fmt::Display for ShortcutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A key code plus the exact modifier state required to trigger it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    /// `KeyboardEvent.code` style identifier, e.g. `KeyL`, `Enter`, `Space`
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    /// Human-readable form, e.g. `Ctrl+Shift+L`
    #[serde(default)]
    pub description: String,
}

impl Chord {
    /// Create a chord and derive its description
    pub fn new(key: impl Into<String>, ctrl: bool, shift: bool, alt: bool) -> Self {
        let key = key.into();
        let description = describe(&key, ctrl, shift, alt);
        Self {
            key,
            ctrl,
            shift,
            alt,
            description,
        }
    }

    /// Exact match: key code equal and every modifier flag equal.
    /// Meta counts as ctrl.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.code
            && self.ctrl == (event.ctrl_key || event.meta_key)
            && self.shift == event.shift_key
            && self.alt == event.alt_key
    }

    /// Same key and modifiers, ignoring the description text
    pub fn same_keys(&self, other: &Chord) -> bool {
        self.key == other.key
            && self.ctrl == other.ctrl
            && self.shift == other.shift
            && self.alt == other.alt
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            f.write_str(&describe(&self.key, self.ctrl, self.shift, self.alt))
        } else {
            f.write_str(&self.description)
        }
    }
}

fn describe(key: &str, ctrl: bool, shift: bool, alt: bool) -> String {
    let mut parts = Vec::with_capacity(4);
    if ctrl {
        parts.push("Ctrl");
    }
    if shift {
        parts.push("Shift");
    }
    if alt {
        parts.push("Alt");
    }
    let label = key
        .strip_prefix("Key")
        .or_else(|| key.strip_prefix("Digit"))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(key);
    parts.push(label);
    parts.join("+")
}

/// A discrete keyboard event as delivered by the front-end
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub code: String,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub alt_key: bool,
}

impl KeyEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    /// True for presses of a bare modifier key
    pub fn is_modifier_only(&self) -> bool {
        matches!(
            self.code.as_str(),
            "ControlLeft"
                | "ControlRight"
                | "ShiftLeft"
                | "ShiftRight"
                | "AltLeft"
                | "AltRight"
                | "MetaLeft"
                | "MetaRight"
        )
    }

    pub fn has_modifiers(&self) -> bool {
        self.ctrl_key || self.meta_key || self.shift_key || self.alt_key
    }

    /// Chord that this event would trigger
    pub fn to_chord(&self) -> Chord {
        Chord::new(self.code.clone(), self.ctrl_key || self.meta_key, self.shift_key, self.alt_key)
    }
}

/// Ordered mapping from action to chord
///
/// Iteration order is the order entries were inserted (or appeared in the
/// persisted JSON object). Dispatch relies on it to resolve conflicting
/// chords deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortcutMap {
    bindings: Vec<(ShortcutAction, Chord)>,
}

impl ShortcutMap {
    /// Empty binding map
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in bindings used whenever no custom set is available
    pub fn defaults() -> Self {
        [
            (ShortcutAction::SendRequest, Chord::new("Enter", true, false, false)),
            (ShortcutAction::ClearInput, Chord::new("KeyL", true, false, false)),
            (ShortcutAction::ToggleOutOfScope, Chord::new("KeyO", true, true, false)),
        ]
        .into_iter()
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShortcutAction, &Chord)> {
        self.bindings.iter().map(|(action, chord)| (action, chord))
    }

    pub fn get(&self, action: &ShortcutAction) -> Option<&Chord> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == action)
            .map(|(_, chord)| chord)
    }

    /// Bind `action` to `chord`, keeping the existing position if the
    /// action is already bound
    pub fn set(&mut self, action: ShortcutAction, chord: Chord) {
        match self.bindings.iter_mut().find(|(bound, _)| *bound == action) {
            Some(entry) => entry.1 = chord,
            None => self.bindings.push((action, chord)),
        }
    }

    /// First action other than `except` already bound to the same keys
    pub fn find_conflict(&self, chord: &Chord, except: &ShortcutAction) -> Option<&ShortcutAction> {
        self.bindings
            .iter()
            .find(|(action, bound)| action != except && bound.same_keys(chord))
            .map(|(action, _)| action)
    }

    /// Append default chords for every known action missing from this map
    pub fn filled_from_defaults(mut self) -> Self {
        for (action, chord) in ShortcutMap::defaults().bindings {
            if self.get(&action).is_none() {
                self.bindings.push((action, chord));
            }
        }
        self
    }
}

impl FromIterator<(ShortcutAction, Chord)> for ShortcutMap {
    fn from_iter<I: IntoIterator<Item = (ShortcutAction, Chord)>>(iter: I) -> Self {
        let mut map = ShortcutMap::new();
        for (action, chord) in iter {
            map.set(action, chord);
        }
        map
    }
}

impl Serialize for ShortcutMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bindings.len()))?;
        for (action, chord) in &self.bindings {
            map.serialize_entry(action.id(), chord)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ShortcutMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ShortcutMapVisitor;

        impl<'de> Visitor<'de> for ShortcutMapVisitor {
            type Value = ShortcutMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of action identifiers to chords")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = ShortcutMap::new();
                while let Some((id, chord)) = access.next_entry::<String, Chord>()? {
                    map.set(ShortcutAction::from_id(&id), chord);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ShortcutMapVisitor)
    }
}
