//! Request history kept across sends

use repeater_common::HistoryEntry;
use std::collections::VecDeque;

use crate::settings::DEFAULT_HISTORY_LIMIT;
use crate::traits::HistorySink;

/// Bounded, newest-last list of sent requests
#[derive(Debug, Clone)]
pub struct RequestHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for RequestHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl RequestHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Change the cap, evicting the oldest entries if needed
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl HistorySink for RequestHistory {
    fn add_to_history(&mut self, raw_request: &str, use_https: bool) {
        self.entries.push_back(HistoryEntry::new(raw_request, use_https));
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_send_appends() {
        let mut history = RequestHistory::new(10);
        history.add_to_history("GET / HTTP/1.1", true);
        history.add_to_history("GET / HTTP/1.1", true);
        assert_eq!(history.len(), 2);

        let ids: Vec<_> = history.entries().map(|e| e.id).collect();
        assert_ne!(ids[0], ids[1]);

        history.add_to_history("GET / HTTP/1.1", false);
        assert_eq!(history.len(), 3);
        assert!(!history.latest().unwrap().use_https);
    }

    #[test]
    fn test_oldest_evicted() {
        let mut history = RequestHistory::new(2);
        history.add_to_history("one", true);
        history.add_to_history("two", true);
        history.add_to_history("three", true);

        let raws: Vec<&str> = history.entries().map(|e| e.raw_request.as_str()).collect();
        assert_eq!(raws, vec!["two", "three"]);

        history.set_limit(1);
        assert_eq!(history.latest().unwrap().raw_request, "three");
        assert_eq!(history.len(), 1);
    }
}
