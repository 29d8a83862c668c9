// Progress log sinks.

use std::sync::Mutex;

use crate::domain::ports::ProgressLog;

/// Production sink: each progress line becomes an info event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ProgressLog for TracingLog {
    fn append_line(&self, line: &str) {
        tracing::info!("{line}");
    }
}

/// Collects lines in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().to_vec(),
        }
    }
}

impl ProgressLog for MemoryLog {
    fn append_line(&self, line: &str) {
        let mut guard = match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(line.to_string());
        // Mirror into tracing so captured test output stays readable.
        tracing::debug!("{line}");
    }
}
