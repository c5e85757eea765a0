//! Progress output sinks

use std::sync::Mutex;

/// Receives one human-readable line per processed version
pub trait MigrationOutput: Send + Sync {
    fn writeln(&self, message: &str);
}

/// Discards all output
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

impl MigrationOutput for NullOutput {
    fn writeln(&self, _message: &str) {}
}

/// Keeps every line in memory
#[derive(Debug, Default)]
pub struct CollectingOutput {
    lines: Mutex<Vec<String>>,
}

impl CollectingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl MigrationOutput for CollectingOutput {
    fn writeln(&self, message: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}

impl<T: MigrationOutput + ?Sized> MigrationOutput for std::sync::Arc<T> {
    fn writeln(&self, message: &str) {
        (**self).writeln(message);
    }
}
