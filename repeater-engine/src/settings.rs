//! User settings and their persistence
//!
//! Settings travel as one JSON object (camelCase keys), the same shape the
//! extension keeps in local storage. Shortcut bindings keep their JSON
//! object order, which decides dispatch among conflicting chords.

use async_trait::async_trait;
use repeater_common::ShortcutMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{RepeaterError, RepeaterResult};
use crate::matcher::validate_pattern;

/// Default cap on request history entries
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Complete user settings object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Provider name to API key, e.g. `{"openai": "sk-..."}`
    pub api_keys: BTreeMap<String, String>,

    /// Route requests through the extension's privileged fetch
    pub cors_bypass: bool,

    /// Regexes marking captured requests as noise
    pub oos_patterns: Vec<String>,

    /// Regexes that always keep a request in scope
    pub in_scope_patterns: Vec<String>,

    pub shortcuts: ShortcutMap,

    /// Pretty-print JSON response bodies
    pub format_json: bool,

    pub history_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: BTreeMap::new(),
            cors_bypass: false,
            oos_patterns: vec![
                r"\.(png|jpe?g|gif|svg|ico|webp|woff2?|ttf|eot|css)(\?|$)".to_string(),
                r"^/(collect|analytics|telemetry)(/|\?|$)".to_string(),
            ],
            in_scope_patterns: Vec::new(),
            shortcuts: ShortcutMap::defaults(),
            format_json: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

fn add_pattern(list: &mut Vec<String>, field: &str, pattern: &str) -> RepeaterResult<()> {
    let pattern = pattern.trim();
    validate_pattern(pattern)?;
    if list.iter().any(|existing| existing == pattern) {
        return Err(RepeaterError::validation(field, "pattern already present"));
    }
    list.push(pattern.to_string());
    Ok(())
}

fn remove_pattern(list: &mut Vec<String>, field: &str, index: usize) -> RepeaterResult<String> {
    if index >= list.len() {
        return Err(RepeaterError::validation(
            field,
            &format!("index {} out of range ({} patterns)", index, list.len()),
        ));
    }
    Ok(list.remove(index))
}

/// Drop invalid and repeated patterns, keeping first occurrences in order
fn sanitize_patterns(list: Vec<String>, field: &str) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(list.len());
    for pattern in list {
        if let Err(e) = validate_pattern(&pattern) {
            warn!("Dropping stored {} entry: {}", field, e);
            continue;
        }
        if !kept.contains(&pattern) {
            kept.push(pattern);
        }
    }
    kept
}

impl Settings {
    /// Validate and append an out-of-scope pattern
    pub fn add_oos_pattern(&mut self, pattern: &str) -> RepeaterResult<()> {
        add_pattern(&mut self.oos_patterns, "oosPatterns", pattern)
    }

    /// Validate and append an in-scope pattern
    pub fn add_in_scope_pattern(&mut self, pattern: &str) -> RepeaterResult<()> {
        add_pattern(&mut self.in_scope_patterns, "inScopePatterns", pattern)
    }

    pub fn remove_oos_pattern(&mut self, index: usize) -> RepeaterResult<String> {
        remove_pattern(&mut self.oos_patterns, "oosPatterns", index)
    }

    pub fn remove_in_scope_pattern(&mut self, index: usize) -> RepeaterResult<String> {
        remove_pattern(&mut self.in_scope_patterns, "inScopePatterns", index)
    }

    pub fn set_api_key(&mut self, provider: &str, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            self.api_keys.remove(provider);
        } else {
            self.api_keys.insert(provider.to_string(), key.to_string());
        }
    }

    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys.get(provider).map(String::as_str)
    }

    /// Fresh default settings
    pub fn reset() -> Self {
        Self::default()
    }

    /// Bring stored settings into a consistent state: missing shortcuts
    /// filled from defaults, invalid or repeated patterns dropped
    pub fn normalized(self) -> Self {
        Self {
            oos_patterns: sanitize_patterns(self.oos_patterns, "oosPatterns"),
            in_scope_patterns: sanitize_patterns(self.in_scope_patterns, "inScopePatterns"),
            shortcuts: self.shortcuts.filled_from_defaults(),
            history_limit: if self.history_limit == 0 {
                DEFAULT_HISTORY_LIMIT
            } else {
                self.history_limit
            },
            ..self
        }
    }
}

/// Storage backend for the settings object
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored settings, or `None` when nothing has been saved yet
    async fn load(&self) -> RepeaterResult<Option<Settings>>;

    async fn save(&self, settings: &Settings) -> RepeaterResult<()>;
}

/// Load and normalize settings, falling back to defaults
pub async fn load_settings(store: &dyn SettingsStore) -> RepeaterResult<Settings> {
    match store.load().await? {
        Some(settings) => {
            info!("Loaded stored settings");
            Ok(settings.normalized())
        }
        None => {
            info!("No stored settings, using defaults");
            Ok(Settings::default())
        }
    }
}

/// Settings kept in a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn load(&self) -> RepeaterResult<Option<Settings>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepeaterError::persistence("read settings", e)),
        };
        let settings = serde_json::from_slice(&bytes)?;
        Ok(Some(settings))
    }

    async fn save(&self, settings: &Settings) -> RepeaterResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepeaterError::persistence("create settings directory", e))?;
        }
        let json = serde_json::to_vec_pretty(settings)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| RepeaterError::persistence("write settings", e))?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// In-memory store holding the serialized settings text
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-serialized settings, as a previous version might have left them
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(Some(raw.into())),
        }
    }

    pub async fn raw(&self) -> Option<String> {
        self.value.read().await.clone()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load(&self) -> RepeaterResult<Option<Settings>> {
        match self.value.read().await.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, settings: &Settings) -> RepeaterResult<()> {
        let raw = serde_json::to_string(settings)?;
        *self.value.write().await = Some(raw);
        Ok(())
    }
}
