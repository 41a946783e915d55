//! Output sink for handlers and builtin commands, plus parser settings.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Captured {
    out: String,
    err: String,
}

/// Where handler output goes: the process's stdio, or an in-memory buffer.
#[derive(Debug, Clone, Default)]
pub struct Console {
    capture: Option<Arc<Mutex<Captured>>>,
}

impl Console {
    /// Write to the process's stdout / stderr.
    pub fn stdio() -> Self {
        Self::default()
    }

    /// Collect output in memory instead of printing it.
    pub fn capture() -> Self {
        Self {
            capture: Some(Arc::default()),
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, Captured>> {
        self.capture
            .as_ref()
            .map(|c| c.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    /// Write `text` to the output stream.
    pub fn out(&self, text: &str) {
        match self.lock() {
            Some(mut c) => c.out.push_str(text),
            None => {
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }
        }
    }

    /// Write `text` to the diagnostic stream.
    pub fn err(&self, text: &str) {
        match self.lock() {
            Some(mut c) => c.err.push_str(text),
            None => {
                let mut stderr = std::io::stderr().lock();
                let _ = stderr.write_all(text.as_bytes());
                let _ = stderr.flush();
            }
        }
    }

    /// Captured stdout text. Empty for a stdio console.
    pub fn stdout_text(&self) -> String {
        self.lock().map(|c| c.out.clone()).unwrap_or_default()
    }

    /// Captured stderr text. Empty for a stdio console.
    pub fn stderr_text(&self) -> String {
        self.lock().map(|c| c.err.clone()).unwrap_or_default()
    }
}

/// Manifest file names the `version` builtin looks for, nearest first.
pub const DEFAULT_MANIFEST_NAMES: &[&str] = &["Cargo.toml", "package.json"];

/// Per-parser configuration. Children built from a schema inherit it.
#[derive(Debug, Clone)]
pub struct Settings {
    pub console: Console,
    pub manifest_names: Vec<String>,
    /// Directory the manifest search starts from (current directory if unset).
    pub search_root: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console: Console::stdio(),
            manifest_names: DEFAULT_MANIFEST_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            search_root: None,
        }
    }
}

impl Settings {
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn with_manifest_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_root = Some(dir.into());
        self
    }
}
