use log::{Level, Log, Metadata, Record};
use std::fmt::Display;

const TARGET: &str = env!("CARGO_CRATE_NAME");

/// A handle to the sink that reconciliation logs are written to. The orchestrator is given one
/// when it is constructed and derives a [`PassLogger`] from it for every pass.
#[derive(Clone, Copy)]
pub struct Logger {
    sink: &'static dyn Log,
}

impl Logger {
    /// Write to whatever logger is installed for the `log` facade, e.g. `env_logger`.
    pub fn global() -> Self {
        Self {
            sink: log::logger(),
        }
    }

    /// Write to `sink` regardless of the logger installed for the `log` facade.
    pub fn new(sink: &'static dyn Log) -> Self {
        Self { sink }
    }

    /// A logger whose messages are all prefixed with the `namespace/name` of the `ControlPlane`
    /// being reconciled.
    pub fn for_pass(&self, namespace: &str, name: &str) -> PassLogger {
        PassLogger {
            sink: self.sink,
            key: format!("{}/{}", namespace, name),
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Logs on behalf of a single reconciliation pass.
pub struct PassLogger {
    sink: &'static dyn Log,
    key: String,
}

impl PassLogger {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn error<D: Display>(&self, message: D) {
        self.log(Level::Error, message)
    }

    pub fn warn<D: Display>(&self, message: D) {
        self.log(Level::Warn, message)
    }

    pub fn info<D: Display>(&self, message: D) {
        self.log(Level::Info, message)
    }

    pub fn debug<D: Display>(&self, message: D) {
        self.log(Level::Debug, message)
    }

    pub fn trace<D: Display>(&self, message: D) {
        self.log(Level::Trace, message)
    }

    fn log<D: Display>(&self, level: Level, message: D) {
        let metadata = Metadata::builder().level(level).target(TARGET).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(format_args!("[{}] {}", self.key, message))
                .module_path_static(Some(module_path!()))
                .file_static(Some(file!()))
                .line(Some(line!()))
                .build(),
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        lines: Mutex<Vec<(Level, String)>>,
    }

    impl Log for Capture {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.level() <= Level::Debug
        }

        fn log(&self, record: &Record<'_>) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    #[test]
    fn messages_are_scoped_to_the_pass() {
        let capture: &'static Capture = Box::leak(Box::default());
        let log = Logger::new(capture).for_pass("edge", "cp");
        assert_eq!(log.key(), "edge/cp");
        log.info("Reconciling");
        log.trace("filtered out");
        log.error(format!("failed {}", 1));

        let lines = capture.lines.lock().unwrap();
        assert_eq!(
            *lines,
            vec![
                (Level::Info, "[edge/cp] Reconciling".to_string()),
                (Level::Error, "[edge/cp] failed 1".to_string()),
            ]
        );
    }
}
