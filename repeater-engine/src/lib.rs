//! Repeater Engine - Scope classification and response baselines
//!
//! This crate holds the control logic behind the request editor: deciding
//! which captured requests are out of scope, tracking the response baseline
//! for diffing across sends, and mapping keyboard chords to actions.

pub mod error;
pub mod traits;
pub mod matcher;
pub mod scope;
pub mod render;
pub mod format;
pub mod raw_request;
pub mod history;
pub mod session;
pub mod shortcuts;
pub mod settings;
pub mod context;
pub mod logging;

pub use repeater_common::{
    Chord, ExecuteOptions, ExecutedResponse, HistoryEntry, KeyEvent, RequestRecord,
    ShortcutAction, ShortcutMap,
};

pub use error::{ErrorSeverity, RepeaterError, RepeaterResult};

pub use traits::{HistorySink, RequestExecutor, ResponseView};

pub use matcher::{matches, validate_pattern};

pub use scope::{classify, reclassify_all};

pub use render::{diff_lines, DiffLine, PlainRenderer, ResponseRenderer};

pub use raw_request::{parse_raw_request, record_from_raw, ParsedRequest};

pub use history::RequestHistory;

pub use session::{BaselineState, RequestSession, SendOutcome};

pub use shortcuts::{dispatch, CaptureEvent, CaptureOutcome, CaptureState, ShortcutRecorder};

pub use settings::{load_settings, JsonFileStore, MemoryStore, Settings, SettingsStore};

pub use context::{KeyOutcome, RepeaterContext};

pub use logging::{init_logging, LoggingConfig};
