//! Seams to the front-end: network, history and response display

use async_trait::async_trait;
use repeater_common::{ExecuteOptions, ExecutedResponse};

use crate::error::RepeaterResult;

/// Trait for executing a request over the network
#[async_trait]
pub trait RequestExecutor {
    /// Send the request. Failures come back as `RepeaterError::Network`
    /// carrying the message and a trace description.
    async fn execute_request(&self, url: &str, options: &ExecuteOptions) -> RepeaterResult<ExecutedResponse>;
}

/// Trait for recording requests before they are sent
pub trait HistorySink {
    /// Fire-and-forget append
    fn add_to_history(&mut self, raw_request: &str, use_https: bool);
}

/// Trait for the response panel the session writes into
pub trait ResponseView {
    fn set_status(&mut self, text: &str, class: &str);

    fn set_timing(&mut self, time: &str, size: &str);

    fn set_body(&mut self, markup: &str);

    /// Whether the "show diff" toggle is on
    fn diff_enabled(&self) -> bool;
}
