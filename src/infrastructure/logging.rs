// Logging sink shared by the pipeline and the engine callbacks.
//
// Writes happen either from the calling context or from the engine's own
// synchronous callbacks, never concurrently; a plain shared reference is
// enough for readers, mutation is confined to configuration time.

use crate::domain::value_objects::CpSolverStatus;

/// Leveled text sink with an optional external callback fan-out.
///
/// Disabled loggers drop every line. Enabled loggers echo to stdout or to
/// the `tracing` subscriber, and always feed each registered callback.
pub struct SolverLogger {
    enabled: bool,
    log_to_stdout: bool,
    callbacks: Vec<Box<dyn Fn(&str) + Send>>,
}

impl SolverLogger {
    pub fn new() -> Self {
        Self {
            enabled: false,
            log_to_stdout: true,
            callbacks: Vec::new(),
        }
    }

    pub fn enable_logging(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_log_to_stdout(&mut self, enabled: bool) {
        self.log_to_stdout = enabled;
    }

    pub fn logging_is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn add_info_logging_callback(&mut self, callback: Box<dyn Fn(&str) + Send>) {
        self.callbacks.push(callback);
    }

    pub fn log(&self, message: &str) {
        if !self.enabled {
            return;
        }
        if self.log_to_stdout {
            println!("{message}");
        } else {
            tracing::info!(target: "satbridge", "{message}");
        }
        for callback in &self.callbacks {
            callback(message);
        }
    }

    /// Emit the formatted engine-status summary for a status the pipeline
    /// decided without running the engine, so operational scripts see the
    /// same status line on every early-exit path.
    pub fn log_status_summary(&self, status: CpSolverStatus) {
        if self.enabled {
            self.log(&status_summary(status));
        }
    }
}

impl Default for SolverLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Formatted summary line matching what the engine prints for its own runs
pub fn status_summary(status: CpSolverStatus) -> String {
    format!("CpSolverResponse summary:\nstatus: {status}")
}
