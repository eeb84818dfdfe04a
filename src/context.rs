// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The process-wide logging context.

use std::fmt;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::PoisonError;
use std::sync::RwLock;

use log::LevelFilter;
use log::Log;
use log::Metadata;
use log::Record;
use logforth::append::Stderr;
use logforth::layout::TextLayout;
use logforth::trap::Trap;

use crate::LoggerFactory;
use crate::PropertyMap;
use crate::config_file::ConfigFile;
use crate::logger::Logger;

static CONTEXT: OnceLock<LoggerContext> = OnceLock::new();

/// The logging context shared by the whole process.
///
/// There is exactly one context per process. It is created on first access through
/// [`LoggerContext::global`], which also routes the [`log`] facade into it unless another logger
/// was installed before. Reconfiguration replaces the active [`Logger`] as a whole; concurrent
/// log calls observe either the previous or the new logger.
#[derive(Debug)]
pub struct LoggerContext {
    state: RwLock<State>,
    bridged: bool,
}

#[derive(Debug, Default)]
struct State {
    logger: Option<Arc<Logger>>,
    location: Option<PathBuf>,
}

impl LoggerContext {
    /// Return the process-wide context, creating it on first use.
    pub fn global() -> &'static LoggerContext {
        CONTEXT.get_or_init(|| LoggerContext {
            state: RwLock::new(State::default()),
            bridged: install_bridge(),
        })
    }

    /// Load the declarative configuration at `path` and make it the active configuration.
    ///
    /// `${...}` references in the document are resolved against `properties`. A document that
    /// cannot be read or understood is reported on stderr and replaced by a fallback
    /// configuration that writes errors to stderr; this never fails.
    pub fn set_config_location(&self, path: &Path, properties: &PropertyMap) {
        let logger = match ConfigFile::load(path, properties).and_then(|config| config.build()) {
            Ok(logger) => logger,
            Err(err) => {
                status(format_args!(
                    "cannot apply configuration {}, falling back to errors on stderr: {err:#}",
                    path.display()
                ));
                fallback_logger()
            }
        };

        let max_level = logger.max_level();
        let previous = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.location = Some(path.to_path_buf());
            state.logger.replace(Arc::new(logger))
        };
        if let Some(previous) = previous {
            previous.flush();
        }
        if self.bridged {
            log::set_max_level(max_level);
        }

        log::debug!(
            target: "logforth_configurator",
            "logging configured from {} at max level {max_level}",
            path.display()
        );
    }

    /// The location of the active configuration, if any.
    pub fn config_location(&self) -> Option<PathBuf> {
        self.read(|state| state.location.clone())
    }

    /// Return whether a configuration is active.
    pub fn is_active(&self) -> bool {
        self.read(|state| state.logger.is_some())
    }

    /// Return whether the [`log`] facade is routed into this context.
    pub fn is_bridged(&self) -> bool {
        self.bridged
    }

    /// A factory for loggers bound to this context.
    pub fn logger_factory(&'static self) -> LoggerFactory {
        LoggerFactory::new(self)
    }

    /// Flush and release the active configuration.
    ///
    /// Records logged afterwards are discarded until the context is configured again. Calling
    /// this on an inactive context does nothing.
    pub fn shutdown(&self) {
        let previous = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.location = None;
            state.logger.take()
        };
        let Some(previous) = previous else {
            return;
        };

        previous.flush();
        if self.bridged {
            log::set_max_level(LevelFilter::Off);
        }
    }

    pub(crate) fn enabled(&self, metadata: &Metadata) -> bool {
        self.read(|state| {
            state
                .logger
                .as_ref()
                .is_some_and(|logger| logger.enabled(metadata))
        })
    }

    pub(crate) fn log(&self, record: &Record) {
        // appenders run outside the lock
        let logger = self.read(|state| state.logger.clone());
        if let Some(logger) = logger {
            logger.log(record);
        }
    }

    pub(crate) fn flush(&self) {
        let logger = self.read(|state| state.logger.clone());
        if let Some(logger) = logger {
            logger.flush();
        }
    }

    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }
}

fn fallback_logger() -> Logger {
    let filter = env_filter::Builder::new()
        .filter_level(LevelFilter::Error)
        .build();
    let dispatch = logforth::core::builder()
        .dispatch(|d| d.append(Stderr::default().with_layout(TextLayout::default().no_color())))
        .build();
    Logger::new(filter, dispatch)
}

fn install_bridge() -> bool {
    match log::set_boxed_logger(Box::new(Bridge)) {
        Ok(()) => {
            log::set_max_level(LevelFilter::Off);
            true
        }
        Err(err) => {
            status(format_args!(
                "{err}; only loggers obtained from a logger factory are routed"
            ));
            false
        }
    }
}

fn status(message: fmt::Arguments) {
    let _ = write_status(&mut io::stderr(), message);
}

fn write_status(w: &mut impl Write, message: fmt::Arguments) -> io::Result<()> {
    writeln!(w, "logforth-configurator: {message}")
}

/// Reports write and flush failures of file appenders as status lines on stderr.
#[derive(Debug, Default)]
pub(crate) struct StatusTrap;

impl Trap for StatusTrap {
    fn trap(&self, err: &logforth::Error) {
        status(format_args!("log file error: {err}"));
    }
}

/// Routes the [`log`] facade into the global context.
struct Bridge;

impl Log for Bridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        LoggerContext::global().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        LoggerContext::global().log(record);
    }

    fn flush(&self) {
        LoggerContext::global().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line() {
        let mut buf = Vec::new();
        write_status(&mut buf, format_args!("flush failed: {}", "disk full")).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "logforth-configurator: flush failed: disk full\n"
        );
    }

    #[test]
    fn test_fallback_logs_errors_only() {
        let logger = fallback_logger();
        assert_eq!(logger.max_level(), LevelFilter::Error);
        assert!(!logger.enabled(&Metadata::builder().level(log::Level::Warn).build()));
    }
}
