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

//! Substitution properties handed to the logging backend.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::environment::Config;
use crate::environment::Environment;

/// The property holding the absolute root path of the application.
pub const APPLICATION_HOME: &str = "application.home";

/// The configuration key that makes [`generate_properties`] include every configuration entry.
pub const INCLUDE_CONFIG_PROPERTIES: &str = "play.logger.includeConfigProperties";

/// An immutable mapping from property name to value.
///
/// The backend resolves `${name}` references in its declarative configuration against this map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap(BTreeMap<String, String>);

impl PropertyMap {
    /// An empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Return whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over all properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return whether the map holds no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve property references in `text`.
    ///
    /// Supported forms:
    ///
    /// * `${name}` is replaced with the value of property `name`;
    /// * `${name:-default}` falls back to `default` when `name` is not a property;
    /// * `${env:NAME}` is replaced with the environment variable `NAME`.
    ///
    /// References that cannot be resolved are kept verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_configurator::PropertyMap;
    ///
    /// let properties = PropertyMap::from_iter([("application.home", "/srv/app")]);
    /// assert_eq!(
    ///     properties.substitute("${application.home}/logs/${name:-app}.log"),
    ///     "/srv/app/logs/app.log"
    /// );
    /// assert_eq!(properties.substitute("${unknown}"), "${unknown}");
    /// ```
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let reference = &after[..end];
            match self.resolve(reference) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[start..start + 2 + end + 1]),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }

    fn resolve(&self, reference: &str) -> Option<String> {
        if let Some(name) = reference.strip_prefix("env:") {
            return std::env::var(name).ok();
        }
        match reference.split_once(":-") {
            Some((name, default)) => Some(
                self.get(name)
                    .map(str::to_string)
                    .unwrap_or_else(|| default.to_string()),
            ),
            None => self.get(reference).map(str::to_string),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        PropertyMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V> Extend<(K, V)> for PropertyMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl From<BTreeMap<String, String>> for PropertyMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        PropertyMap(map)
    }
}

/// Generate the properties for configuring the logging backend.
///
/// * When `play.logger.includeConfigProperties` is `true` in `config`, every configuration entry
///   is included. Strings are kept verbatim, other values use their JSON rendering.
/// * `application.home` is set to the absolute root path of `env`.
/// * `optional_properties` are applied last and win on key collisions.
///
/// # Examples
///
/// ```
/// use logforth_configurator::Config;
/// use logforth_configurator::Environment;
/// use logforth_configurator::Mode;
/// use logforth_configurator::PropertyMap;
/// use logforth_configurator::properties::generate_properties;
///
/// let env = Environment::new("/srv/app", Mode::Prod);
/// let properties = generate_properties(&env, &Config::empty(), &PropertyMap::new());
/// assert_eq!(properties.get("application.home"), Some("/srv/app"));
/// ```
pub fn generate_properties(
    env: &Environment,
    config: &Config,
    optional_properties: &PropertyMap,
) -> PropertyMap {
    let mut properties = PropertyMap::new();

    if config.get_bool(INCLUDE_CONFIG_PROPERTIES) == Some(true) {
        properties.extend(config.entries().map(|(k, v)| (k, render_value(v))));
    }

    let home = env.absolute_root_path();
    properties.extend([(APPLICATION_HOME, home.to_string_lossy().into_owned())]);
    properties.extend(optional_properties.iter());
    properties
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        value => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::environment::Mode;

    #[test]
    fn test_substitute() {
        let properties =
            PropertyMap::from_iter([("application.home", "/srv/app"), ("level", "debug")]);

        assert_eq!(properties.substitute("no references"), "no references");
        assert_eq!(
            properties.substitute("${application.home}/logs"),
            "/srv/app/logs"
        );
        assert_eq!(properties.substitute("${level}${level}"), "debugdebug");
        assert_eq!(properties.substitute("${missing:-info}"), "info");
        assert_eq!(properties.substitute("${level:-info}"), "debug");
        assert_eq!(properties.substitute("a ${missing} b"), "a ${missing} b");
        assert_eq!(properties.substitute("unterminated ${level"), "unterminated ${level");
        assert_eq!(properties.substitute("$level {level}"), "$level {level}");
    }

    #[test]
    fn test_substitute_env() {
        let path = std::env::var("PATH").unwrap_or_default();
        let properties = PropertyMap::new();
        if !path.is_empty() {
            assert_eq!(properties.substitute("${env:PATH}"), path);
        }
        assert_eq!(
            properties.substitute("${env:LOGFORTH_CONFIGURATOR_SURELY_UNSET}"),
            "${env:LOGFORTH_CONFIGURATOR_SURELY_UNSET}"
        );
    }

    #[test]
    fn test_generate_without_config_properties() {
        let env = Environment::new("/srv/app", Mode::Dev);
        let config = Config::empty().with("app.name", "demo");
        let properties = generate_properties(&env, &config, &PropertyMap::new());
        assert_eq!(properties.len(), 1);
        assert_eq!(properties.get(APPLICATION_HOME), Some("/srv/app"));
    }

    #[test]
    fn test_generate_with_config_properties_and_overrides() {
        let env = Environment::new("/srv/app", Mode::Dev);
        let config = Config::from_json(json!({
            "play": { "logger": { "includeConfigProperties": true } },
            "app": { "name": "demo", "workers": 4 },
        }));
        let overrides = PropertyMap::from_iter([("app.name", "override"), ("extra", "1")]);
        let properties = generate_properties(&env, &config, &overrides);

        assert_eq!(properties.get(APPLICATION_HOME), Some("/srv/app"));
        assert_eq!(properties.get("app.name"), Some("override"));
        assert_eq!(properties.get("app.workers"), Some("4"));
        assert_eq!(properties.get(INCLUDE_CONFIG_PROPERTIES), Some("true"));
        assert_eq!(properties.get("extra"), Some("1"));
    }

    #[test]
    fn test_relative_root_is_absolutized() {
        let env = Environment::new("relative/root", Mode::Test);
        let properties = generate_properties(&env, &Config::empty(), &PropertyMap::new());
        let home = std::path::PathBuf::from(properties.get(APPLICATION_HOME).unwrap());
        assert!(home.is_absolute());
        assert!(home.ends_with("relative/root"));
    }
}
