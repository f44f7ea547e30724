//! Request editing session and the response baseline protocol
//!
//! A session owns the editable request, the latest raw response and the
//! baseline used for diffing:
//! - The first successful response becomes the baseline, stored verbatim
//! - Later responses only replace `current_response`
//! - Clearing the baseline lets the next response take its place
//!
//! Which renderer runs is decided on every arrival from the baseline state
//! and the view's diff toggle at that moment. The response that just became
//! the baseline is shown highlighted, since there is nothing to compare.

use tracing::{info, warn};

use crate::error::RepeaterError;
use crate::format::{format_duration, format_response, format_size, status_class, STATUS_ERROR_CLASS};
use crate::raw_request::parse_raw_request;
use crate::render::{escape_html, ResponseRenderer};
use crate::traits::{HistorySink, RequestExecutor, ResponseView};

/// Baseline protocol states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineState {
    Empty,
    Set,
}

/// What a completed `send` did
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Completed {
        status: u16,
        /// True when this response became the new baseline
        baseline_set: bool,
    },
    /// Reported to the view; session state left as it was
    Failed(RepeaterError),
}

/// Editable request plus response/baseline state for one repeater tab
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSession {
    request: String,
    use_https: bool,
    current_response: Option<String>,
    baseline: Option<String>,
    /// `current_response` is the response that set the baseline
    current_is_baseline: bool,
}

impl RequestSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            request: String::new(),
            use_https: true,
            current_response: None,
            baseline: None,
            current_is_baseline: false,
        }
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    pub fn set_request(&mut self, raw_request: impl Into<String>, use_https: bool) {
        self.request = raw_request.into();
        self.use_https = use_https;
    }

    pub fn use_https(&self) -> bool {
        self.use_https
    }

    pub fn set_use_https(&mut self, use_https: bool) {
        self.use_https = use_https;
    }

    /// Empty the request editor
    pub fn clear_request(&mut self) {
        self.request.clear();
    }

    pub fn current_response(&self) -> Option<&str> {
        self.current_response.as_deref()
    }

    pub fn baseline(&self) -> Option<&str> {
        self.baseline.as_deref()
    }

    pub fn baseline_state(&self) -> BaselineState {
        match self.baseline {
            Some(_) => BaselineState::Set,
            None => BaselineState::Empty,
        }
    }

    /// Drop the baseline; the next response becomes the new one
    pub fn clear_baseline(&mut self) {
        self.current_is_baseline = false;
        if self.baseline.take().is_some() {
            info!("Response baseline cleared");
        }
    }

    /// Record a successful response. Returns true if it became the baseline.
    pub fn receive_response(&mut self, raw_response: String) -> bool {
        let became_baseline = self.baseline.is_none();
        if became_baseline {
            self.baseline = Some(raw_response.clone());
        }
        self.current_response = Some(raw_response);
        self.current_is_baseline = became_baseline;
        became_baseline
    }

    /// Markup for the current response, or `None` before the first one
    pub fn render_current<R: ResponseRenderer + ?Sized>(&self, renderer: &R, diff_enabled: bool) -> Option<String> {
        let current = self.current_response.as_deref()?;
        let markup = match self.baseline.as_deref() {
            Some(baseline) if diff_enabled && !self.current_is_baseline => {
                renderer.render_diff(baseline, current)
            }
            _ => renderer.highlight_http(current),
        };
        Some(markup)
    }

    /// Send the request in the editor and update the view
    ///
    /// The request is appended to history before anything else happens.
    /// Failures are reported to the view and returned as
    /// `SendOutcome::Failed`; they never touch the baseline.
    pub async fn send<E, H, V, R>(
        &mut self,
        executor: &E,
        history: &mut H,
        view: &mut V,
        renderer: &R,
        format_json: bool,
    ) -> SendOutcome
    where
        E: RequestExecutor + ?Sized,
        H: HistorySink + ?Sized,
        V: ResponseView + ?Sized,
        R: ResponseRenderer + ?Sized,
    {
        history.add_to_history(&self.request, self.use_https);

        let (url, options) = match parse_raw_request(&self.request, self.use_https) {
            Ok(parsed) => parsed.into_execute(),
            Err(e) => return Self::report_failure(view, e),
        };

        info!(method = %options.method, url = %url, "Sending request");
        let response = match executor.execute_request(&url, &options).await {
            Ok(response) => response,
            Err(e) => return Self::report_failure(view, e),
        };

        let raw = format_response(&response, format_json);
        let baseline_set = self.receive_response(raw);

        view.set_status(
            format!("{} {}", response.status, response.status_text).trim_end(),
            status_class(response.status),
        );
        view.set_timing(&format_duration(response.duration), &format_size(response.size));
        if let Some(markup) = self.render_current(renderer, view.diff_enabled()) {
            view.set_body(&markup);
        }

        info!(
            status = response.status,
            duration_ms = response.duration,
            baseline_set,
            "Request completed"
        );
        SendOutcome::Completed {
            status: response.status,
            baseline_set,
        }
    }

    fn report_failure<V: ResponseView + ?Sized>(view: &mut V, error: RepeaterError) -> SendOutcome {
        warn!("Request failed: {}", error);
        view.set_status("Error", STATUS_ERROR_CLASS);
        view.set_timing(&format_duration(0), &format_size(0));
        view.set_body(&escape_html(&error.display_body()));
        SendOutcome::Failed(error)
    }
}

impl Default for RequestSession {
    fn default() -> Self {
        Self::new()
    }
}
