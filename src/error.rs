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

use std::fmt;

/// The kind of a configuration failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The declarative configuration resource could not be located.
    ConfigurationMissing,
    /// The located resource could not be turned into a valid configuration location.
    ConfigurationMalformed,
    /// The configurator was shut down and cannot be configured again.
    AlreadyShutDown,
}

impl ErrorKind {
    /// Return the stable name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigurationMissing => "ConfigurationMissing",
            ErrorKind::ConfigurationMalformed => "ConfigurationMalformed",
            ErrorKind::AlreadyShutDown => "AlreadyShutDown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error struct of logforth-configurator.
///
/// Every error carries a [`ErrorKind`], a short title, an optional longer description, a list of
/// key-value context entries and the underlying causes.
pub struct Error {
    kind: ErrorKind,
    message: String,
    description: Option<String>,
    sources: Vec<anyhow::Error>,
    context: Vec<(&'static str, String)>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)?;

        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.sources.is_empty() {
            write!(f, ", sources: [")?;
            for (i, source) in self.sources.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{source}")?;
            }
            write!(f, "]")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("description", &self.description);
            de.field("context", &self.context);
            de.field("sources", &self.sources);
            return de.finish();
        }

        write!(f, "{} ({})", self.message, self.kind)?;
        writeln!(f)?;

        if let Some(description) = &self.description {
            writeln!(f)?;
            writeln!(f, "{description}")?;
        }
        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }
        if !self.sources.is_empty() {
            writeln!(f)?;
            writeln!(f, "Sources:")?;
            for source in self.sources.iter() {
                writeln!(f, "   {source:#}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.sources.first().map(|v| v.as_ref())
    }
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            description: None,
            sources: vec![],
            context: vec![],
        }
    }

    /// Attach a human readable description to the error.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add one more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Add one more source in error.
    pub fn with_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        self.sources.push(src.into());
        self
    }

    /// Return the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the title of this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Return the description of this error, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Return the value of the first context entry named `key`.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Return an iterator over all sources of this error.
    pub fn sources(&self) -> impl ExactSizeIterator<Item = &(dyn std::error::Error + 'static)> {
        self.sources.iter().map(|v| v.as_ref())
    }

    /// Default constructor for a missing configuration resource named `resource`.
    pub fn configuration_missing(resource: &str) -> Error {
        Error::new(
            ErrorKind::ConfigurationMissing,
            format!("{resource} resource was not found"),
        )
        .with_description(format!(
            "Could not find the {resource} resource in any of the search locations"
        ))
        .with_context("resource", resource)
    }

    /// Default constructor for a resource location that cannot be interpreted.
    pub fn configuration_malformed(location: &str, cause: impl Into<anyhow::Error>) -> Error {
        Error::new(
            ErrorKind::ConfigurationMalformed,
            "configuration resource location is malformed",
        )
        .with_description(format!("Could not parse the location {location:?}"))
        .with_context("location", location)
        .with_source(cause)
    }

    /// Default constructor for configuring a configurator that has been shut down.
    pub fn already_shut_down(resource: &str) -> Error {
        Error::new(ErrorKind::AlreadyShutDown, "configurator is already shut down")
            .with_description("Create a new configurator to configure logging again")
            .with_context("resource", resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_resource() {
        let err = Error::configuration_missing("logforth.json");
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
        assert_eq!(err.context_value("resource"), Some("logforth.json"));
        assert!(err.to_string().contains("logforth.json resource was not found"));
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_malformed_keeps_cause() {
        let err = Error::configuration_malformed("ftp://x", anyhow::anyhow!("unsupported scheme"));
        assert_eq!(err.kind(), ErrorKind::ConfigurationMalformed);
        assert_eq!(err.sources().len(), 1);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "unsupported scheme");

        let debug = format!("{err:?}");
        assert!(debug.contains("Sources:"));
        assert!(debug.contains("location: ftp://x"));
    }
}
