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

//! The host application's environment and configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::Value;

use crate::resource::ResourceLocation;

/// The mode the host application runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Development mode.
    Dev,
    /// Test mode.
    Test,
    /// Production mode.
    #[default]
    Prod,
}

impl Mode {
    /// Return the lowercase name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Dev => "dev",
            Mode::Test => "test",
            Mode::Prod => "prod",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Mode::Dev),
            "test" => Ok(Mode::Test),
            "prod" => Ok(Mode::Prod),
            other => Err(anyhow::anyhow!("unknown mode: {other}")),
        }
    }
}

/// The environment of the host application: where it lives, which mode it runs in and where its
/// resources can be found.
///
/// # Examples
///
/// ```
/// use logforth_configurator::Environment;
/// use logforth_configurator::Mode;
///
/// let env = Environment::new("/srv/app", Mode::Prod).with_resource_root("/srv/app/conf");
/// assert_eq!(env.mode(), Mode::Prod);
/// ```
#[derive(Debug, Clone)]
pub struct Environment {
    root_path: PathBuf,
    mode: Mode,
    resource_roots: Vec<PathBuf>,
}

impl Environment {
    /// Create an environment rooted at `root_path`.
    pub fn new(root_path: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            root_path: root_path.into(),
            mode,
            resource_roots: vec![],
        }
    }

    /// An environment rooted at the current working directory in [`Mode::Test`].
    pub fn simple() -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(root, Mode::Test)
    }

    /// Add a directory to search for resources in, before the root path.
    ///
    /// Directories are searched in the order they are added.
    pub fn with_resource_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_roots.push(dir.into());
        self
    }

    /// The root path of the application.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// The absolute form of the root path.
    ///
    /// Relative roots are resolved against the current working directory; the path is not
    /// required to exist.
    pub fn absolute_root_path(&self) -> PathBuf {
        absolute_path(&self.root_path)
    }

    /// The mode of the application.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Look up the resource `name`.
    ///
    /// Searches every resource root in order, then the root path. Returns the location of the
    /// first regular file found.
    pub fn resource(&self, name: &str) -> Option<ResourceLocation> {
        self.resource_roots
            .iter()
            .chain(std::iter::once(&self.root_path))
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
            .map(|found| ResourceLocation::from_path(absolute_path(&found)))
    }
}

pub(crate) fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// The flat configuration of the host application.
///
/// Keys are dotted paths (`play.logger.includeConfigProperties`) and values are JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    entries: BTreeMap<String, Value>,
}

impl Config {
    /// An empty configuration.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Build a configuration from a JSON document, flattening nested objects into dotted keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_configurator::Config;
    ///
    /// let config = Config::from_json(serde_json::json!({
    ///     "play": { "logger": { "includeConfigProperties": true } }
    /// }));
    /// assert_eq!(config.get_bool("play.logger.includeConfigProperties"), Some(true));
    /// ```
    pub fn from_json(value: Value) -> Self {
        let mut config = Config::empty();
        flatten(&mut config.entries, String::new(), value);
        config
    }

    /// Get the raw value at `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get the value at `key` if it is a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Iterate over all entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Return whether the configuration has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(entries: &mut BTreeMap<String, Value>, prefix: String, value: Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(entries, key, v);
            }
        }
        value => {
            if !prefix.is_empty() {
                entries.insert(prefix, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("Dev".parse::<Mode>().unwrap(), Mode::Dev);
        assert_eq!(" prod ".parse::<Mode>().unwrap(), Mode::Prod);
        assert!("staging".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Prod);
        assert_eq!(Mode::Test.to_string(), "test");
    }

    #[test]
    fn test_resource_search_order() {
        let root = TempDir::new().expect("failed to create a temporary directory");
        let conf = TempDir::new().expect("failed to create a temporary directory");
        fs::write(root.path().join("logforth.json"), "{}").unwrap();

        let env = Environment::new(root.path(), Mode::Dev).with_resource_root(conf.path());
        let found = env.resource("logforth.json").unwrap();
        assert_eq!(found.to_path().unwrap(), root.path().join("logforth.json"));

        fs::write(conf.path().join("logforth.json"), "{}").unwrap();
        let found = env.resource("logforth.json").unwrap();
        assert_eq!(found.to_path().unwrap(), conf.path().join("logforth.json"));

        assert!(env.resource("missing.json").is_none());
    }

    #[test]
    fn test_resource_ignores_directories() {
        let root = TempDir::new().expect("failed to create a temporary directory");
        fs::create_dir(root.path().join("logforth.json")).unwrap();
        let env = Environment::new(root.path(), Mode::Test);
        assert!(env.resource("logforth.json").is_none());
    }

    #[test]
    fn test_config_flatten() {
        let config = Config::from_json(json!({
            "app": { "name": "demo", "workers": 4, "empty": {} },
            "debug": false,
        }));
        assert_eq!(config.get("app.name"), Some(&json!("demo")));
        assert_eq!(config.get("app.workers"), Some(&json!(4)));
        assert_eq!(config.get("app.empty"), Some(&json!({})));
        assert_eq!(config.get_bool("debug"), Some(false));
        assert_eq!(config.get_bool("app.name"), None);
        assert_eq!(config.entries().count(), 4);
    }
}
