//! Application context tying settings, captured traffic and the session
//!
//! One context is built at startup and handed to every operation instead of
//! living in a global. Everything runs on one event loop, so `&mut self`
//! is all the exclusion pattern edits and reclassification need.

use repeater_common::{KeyEvent, RequestRecord, ShortcutAction};
use tracing::{debug, info};

use crate::error::RepeaterResult;
use crate::history::RequestHistory;
use crate::raw_request::record_from_raw;
use crate::render::ResponseRenderer;
use crate::scope::{classify, reclassify_all};
use crate::session::{RequestSession, SendOutcome};
use crate::settings::{load_settings, Settings, SettingsStore};
use crate::shortcuts::{dispatch, CaptureEvent, CaptureOutcome, ShortcutRecorder};
use crate::traits::{RequestExecutor, ResponseView};

/// Result of routing a key event through the context
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// No binding matched
    Unbound,
    /// The bound action ran synchronously
    Handled(ShortcutAction),
    /// Send shortcut pressed; the caller drives `send`
    SendRequested,
    /// Binding names an action with no handler
    Ignored(ShortcutAction),
    /// Event consumed by an active rebinding
    Capture(CaptureOutcome),
}

pub struct RepeaterContext {
    settings: Settings,
    requests: Vec<RequestRecord>,
    session: RequestSession,
    history: RequestHistory,
    recorder: ShortcutRecorder,
    show_out_of_scope: bool,
}

impl RepeaterContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            history: RequestHistory::new(settings.history_limit),
            settings,
            requests: Vec::new(),
            session: RequestSession::new(),
            recorder: ShortcutRecorder::new(),
            show_out_of_scope: false,
        }
    }

    /// Fresh context with default settings and no traffic
    pub fn reset_to_defaults() -> Self {
        Self::new(Settings::default())
    }

    /// Build a context from stored settings
    pub async fn load(store: &dyn SettingsStore) -> RepeaterResult<Self> {
        let settings = load_settings(store).await?;
        let mut context = Self::new(settings);
        context.reclassify();
        Ok(context)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &RequestSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut RequestSession {
        &mut self.session
    }

    pub fn history(&self) -> &RequestHistory {
        &self.history
    }

    pub fn requests(&self) -> &[RequestRecord] {
        &self.requests
    }

    /// Requests to list, hiding out-of-scope ones unless shown
    pub fn visible_requests(&self) -> impl Iterator<Item = &RequestRecord> {
        let show_all = self.show_out_of_scope;
        self.requests.iter().filter(move |r| show_all || !r.is_oos)
    }

    pub fn show_out_of_scope(&self) -> bool {
        self.show_out_of_scope
    }

    pub fn toggle_out_of_scope(&mut self) -> bool {
        self.show_out_of_scope = !self.show_out_of_scope;
        self.show_out_of_scope
    }

    /// Classify and store a captured request
    pub fn capture_request(&mut self, mut record: RequestRecord) -> &RequestRecord {
        record.is_oos = classify(
            &record.url,
            &self.settings.oos_patterns,
            &self.settings.in_scope_patterns,
        );
        let index = self.requests.len();
        self.requests.push(record);
        &self.requests[index]
    }

    /// Parse, classify and store a captured raw request
    pub fn capture_raw(&mut self, raw_request: &str, use_https: bool) -> RepeaterResult<&RequestRecord> {
        let record = record_from_raw(raw_request, use_https)?;
        Ok(self.capture_request(record))
    }

    fn reclassify(&mut self) {
        reclassify_all(
            &mut self.requests,
            &self.settings.oos_patterns,
            &self.settings.in_scope_patterns,
        );
    }

    /// Replace the in-memory settings and reclassify all traffic
    pub fn apply_settings(&mut self, settings: Settings) {
        self.history.set_limit(settings.history_limit);
        self.settings = settings;
        self.reclassify();
    }

    /// Persist and apply new settings. Nothing changes if saving fails.
    pub async fn save_settings(&mut self, settings: Settings, store: &dyn SettingsStore) -> RepeaterResult<()> {
        store.save(&settings).await?;
        info!("Settings applied");
        self.apply_settings(settings);
        Ok(())
    }

    /// Persist and apply default settings
    pub async fn reset_settings(&mut self, store: &dyn SettingsStore) -> RepeaterResult<()> {
        self.save_settings(Settings::reset(), store).await
    }

    /// Start recording a new chord for `action`
    pub fn begin_rebind(&mut self, action: ShortcutAction) -> CaptureOutcome {
        self.recorder
            .handle(CaptureEvent::Begin(action), &mut self.settings.shortcuts)
    }

    pub fn cancel_rebind(&mut self) -> CaptureOutcome {
        self.recorder
            .handle(CaptureEvent::Cancel, &mut self.settings.shortcuts)
    }

    /// Route a key event to the rebinding flow or to the bound action
    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        if self.recorder.is_capturing() {
            let outcome = self
                .recorder
                .handle(CaptureEvent::Key(event.clone()), &mut self.settings.shortcuts);
            return KeyOutcome::Capture(outcome);
        }

        let Some(action) = dispatch(event, Some(&self.settings.shortcuts)) else {
            return KeyOutcome::Unbound;
        };

        match action {
            ShortcutAction::SendRequest => KeyOutcome::SendRequested,
            ShortcutAction::ClearInput => {
                self.session.clear_request();
                KeyOutcome::Handled(action)
            }
            ShortcutAction::ToggleOutOfScope => {
                let shown = self.toggle_out_of_scope();
                debug!(shown, "Out-of-scope visibility toggled");
                KeyOutcome::Handled(action)
            }
            ShortcutAction::Unknown(_) => KeyOutcome::Ignored(action),
        }
    }

    /// Send the session's request, recording it in history first
    pub async fn send<E, V, R>(&mut self, executor: &E, view: &mut V, renderer: &R) -> SendOutcome
    where
        E: RequestExecutor + ?Sized,
        V: ResponseView + ?Sized,
        R: ResponseRenderer + ?Sized,
    {
        let format_json = self.settings.format_json;
        self.session
            .send(executor, &mut self.history, view, renderer, format_json)
            .await
    }
}

impl Default for RepeaterContext {
    fn default() -> Self {
        Self::reset_to_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_classifies_on_insert() {
        let mut context = RepeaterContext::reset_to_defaults();
        let record = context
            .capture_raw("GET /static/site.css HTTP/1.1\nHost: example.com\n\n", true)
            .unwrap();
        assert!(record.is_oos);

        let record = context
            .capture_raw("GET /api/me HTTP/1.1\nHost: example.com\n\n", true)
            .unwrap();
        assert!(!record.is_oos);

        assert_eq!(context.visible_requests().count(), 1);
        context.toggle_out_of_scope();
        assert_eq!(context.visible_requests().count(), 2);
    }

    #[test]
    fn test_apply_settings_reclassifies() {
        let mut context = RepeaterContext::reset_to_defaults();
        context.capture_request(RequestRecord::new("GET", "https://example.com/logo.png", "", true));
        assert!(context.requests()[0].is_oos);

        let mut settings = context.settings().clone();
        settings.add_in_scope_pattern(r"^/logo").unwrap();
        context.apply_settings(settings);
        assert!(!context.requests()[0].is_oos);
    }

    #[test]
    fn test_clear_input_shortcut() {
        let mut context = RepeaterContext::reset_to_defaults();
        context.session_mut().set_request("GET / HTTP/1.1", true);

        let outcome = context.handle_key(&KeyEvent::new("KeyL").with_ctrl());
        assert_eq!(outcome, KeyOutcome::Handled(ShortcutAction::ClearInput));
        assert_eq!(context.session().request(), "");
    }

    #[test]
    fn test_toggle_and_send_shortcuts() {
        let mut context = RepeaterContext::reset_to_defaults();
        let outcome = context.handle_key(&KeyEvent::new("KeyO").with_ctrl().with_shift());
        assert_eq!(outcome, KeyOutcome::Handled(ShortcutAction::ToggleOutOfScope));
        assert!(context.show_out_of_scope());

        let outcome = context.handle_key(&KeyEvent::new("Enter").with_meta());
        assert_eq!(outcome, KeyOutcome::SendRequested);

        assert_eq!(context.handle_key(&KeyEvent::new("KeyZ")), KeyOutcome::Unbound);
    }

    #[test]
    fn test_rebind_consumes_keys() {
        let mut context = RepeaterContext::reset_to_defaults();
        context.begin_rebind(ShortcutAction::ToggleOutOfScope);

        let outcome = context.handle_key(&KeyEvent::new("KeyH").with_alt());
        assert!(matches!(outcome, KeyOutcome::Capture(CaptureOutcome::Recorded { .. })));
        assert!(!context.show_out_of_scope());

        let outcome = context.handle_key(&KeyEvent::new("KeyH").with_alt());
        assert_eq!(outcome, KeyOutcome::Handled(ShortcutAction::ToggleOutOfScope));
    }
}
