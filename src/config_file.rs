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

//! The declarative configuration document read by the logging backend.
//!
//! ```json
//! {
//!   "filter": "info,my_app::db=debug",
//!   "appenders": [
//!     { "kind": "stdout", "layout": { "kind": "text", "colored": false } },
//!     { "kind": "file", "path": "${application.home}/logs/app.log", "layout": { "kind": "json" } }
//!   ]
//! }
//! ```
//!
//! Every string in the document may reference properties as `${name}`; see
//! [`PropertyMap::substitute`].

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::anyhow;
use anyhow::bail;
use jiff::tz::TimeZone;
use logforth::Append;
use logforth::Layout;
use logforth::append::Stderr;
use logforth::append::Stdout;
use logforth::append::file::FileBuilder;
use logforth::layout::JsonLayout;
use logforth::layout::TextLayout;
use serde::Deserialize;
use serde_json::Value;

use crate::PropertyMap;
use crate::context::StatusTrap;
use crate::logger::Logger;

/// The well-known name of the declarative configuration resource.
pub const DEFAULT_RESOURCE_NAME: &str = "logforth.json";

/// The filter directives used when a document names none.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// A parsed declarative configuration document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Filter directives, in `env_logger` syntax.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// The appenders every accepted record is written to.
    #[serde(default = "default_appenders")]
    pub appenders: Vec<AppenderConfig>,
}

/// The configuration of one appender.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum AppenderConfig {
    /// Write to the standard output. The layout defaults to colored text.
    Stdout {
        #[serde(default)]
        layout: LayoutConfig,
    },
    /// Write to the standard error. The layout defaults to colored text.
    Stderr {
        #[serde(default)]
        layout: LayoutConfig,
    },
    /// Append to the file at `path`, creating its directory if needed. The layout defaults to
    /// plain text.
    File {
        path: PathBuf,
        #[serde(default = "default_file_layout")]
        layout: LayoutConfig,
    },
}

/// The configuration of a layout.
///
/// Time zones are IANA names such as `Europe/Berlin`, or `UTC`. Without one, the system time
/// zone is used.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum LayoutConfig {
    /// One line of text per record; `colored` controls level colors.
    Text {
        #[serde(default = "default_colored")]
        colored: bool,
        #[serde(default)]
        timezone: Option<String>,
    },
    /// One JSON object per record.
    Json {
        #[serde(default)]
        timezone: Option<String>,
    },
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig::Text {
            colored: default_colored(),
            timezone: None,
        }
    }
}

fn default_filter() -> String {
    DEFAULT_DIRECTIVES.to_string()
}

fn default_appenders() -> Vec<AppenderConfig> {
    vec![AppenderConfig::Stdout {
        layout: LayoutConfig::default(),
    }]
}

fn default_file_layout() -> LayoutConfig {
    LayoutConfig::Text {
        colored: false,
        timezone: None,
    }
}

fn default_colored() -> bool {
    true
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            filter: default_filter(),
            appenders: default_appenders(),
        }
    }
}

impl ConfigFile {
    /// Read and parse the document at `path`, resolving `${...}` references against
    /// `properties`.
    pub fn load(path: &Path, properties: &PropertyMap) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content, properties)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse a document, resolving `${...}` references against `properties`.
    pub fn parse(content: &str, properties: &PropertyMap) -> anyhow::Result<Self> {
        let mut value: Value = serde_json::from_str(content)?;
        substitute_strings(&mut value, properties);
        Ok(serde_json::from_value(value)?)
    }

    /// Build the [`Logger`] described by this document.
    ///
    /// # Errors
    ///
    /// Return an error if the filter directives are invalid, no appender is configured, a time
    /// zone is unknown or a log file cannot be created.
    pub fn build(&self) -> anyhow::Result<Logger> {
        let mut filter = env_filter::Builder::new();
        filter
            .try_parse(&self.filter)
            .with_context(|| format!("invalid filter directives: {}", self.filter))?;

        let mut appends = Vec::with_capacity(self.appenders.len());
        for appender in &self.appenders {
            appends.push(appender.build()?);
        }
        let mut appends = appends.into_iter();
        let Some(first) = appends.next() else {
            bail!("at least one appender must be configured");
        };

        let dispatch = logforth::core::builder()
            .dispatch(|d| appends.fold(d.append(first), |d, append| d.append(append)))
            .build();
        Ok(Logger::new(filter.build(), dispatch))
    }
}

impl AppenderConfig {
    fn build(&self) -> anyhow::Result<Box<dyn Append>> {
        let append: Box<dyn Append> = match self {
            AppenderConfig::Stdout { layout } => {
                Box::new(Stdout::default().with_layout(layout.build()?))
            }
            AppenderConfig::Stderr { layout } => {
                Box::new(Stderr::default().with_layout(layout.build()?))
            }
            AppenderConfig::File { path, layout } => {
                let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
                    bail!("log file path has no file name: {}", path.display());
                };
                let file = FileBuilder::new(dir, name.to_string_lossy())
                    .layout(layout.build()?)
                    .trap(StatusTrap)
                    .build()
                    .map_err(|err| anyhow!("failed to open {}: {err}", path.display()))?;
                Box::new(file)
            }
        };
        Ok(append)
    }
}

impl LayoutConfig {
    fn build(&self) -> anyhow::Result<Box<dyn Layout>> {
        let layout: Box<dyn Layout> = match self {
            LayoutConfig::Text { colored, timezone } => {
                let mut layout = TextLayout::default();
                if !colored {
                    layout = layout.no_color();
                }
                if let Some(tz) = timezone {
                    layout = layout.timezone(time_zone(tz)?);
                }
                Box::new(layout)
            }
            LayoutConfig::Json { timezone } => {
                let mut layout = JsonLayout::default();
                if let Some(tz) = timezone {
                    layout = layout.timezone(time_zone(tz)?);
                }
                Box::new(layout)
            }
        };
        Ok(layout)
    }
}

fn time_zone(name: &str) -> anyhow::Result<TimeZone> {
    if name.eq_ignore_ascii_case("utc") {
        return Ok(TimeZone::UTC);
    }
    TimeZone::get(name).with_context(|| format!("unknown time zone: {name}"))
}

fn substitute_strings(value: &mut Value, properties: &PropertyMap) {
    match value {
        Value::String(s) => *s = properties.substitute(s),
        Value::Array(items) => {
            for item in items {
                substitute_strings(item, properties);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                substitute_strings(item, properties);
            }
        }
        _ => {}
    }
}
