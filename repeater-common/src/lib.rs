//! Common data types for the Repeater modules
//!
//! Shared between the classification engine, the session layer and any
//! front-end that persists or renders them:
//! - Captured/sent request records and the executor's response shape
//! - Keyboard chords, shortcut actions and the ordered binding map

pub mod request;
pub mod shortcut;

pub use request::{ExecuteOptions, ExecutedResponse, HistoryEntry, RequestRecord};
pub use shortcut::{Chord, KeyEvent, ShortcutAction, ShortcutMap};
