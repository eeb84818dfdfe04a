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
use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::bail;
use url::ParseError;
use url::Url;

use crate::Error;

/// The location of a declarative configuration resource.
///
/// Locations are either `file:` URLs or bare absolute paths.
///
/// # Examples
///
/// ```
/// use logforth_configurator::ResourceLocation;
///
/// let location = ResourceLocation::from_path("/etc/my app/logforth.json");
/// assert_eq!(location.as_str(), "file:///etc/my%20app/logforth.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceLocation(String);

impl ResourceLocation {
    /// Wrap a raw location string as it was handed out by a resource lookup.
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Render an absolute path as a `file:` URL.
    ///
    /// A relative path has no URL form and is kept verbatim, so [`to_path`](Self::to_path)
    /// rejects it later.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Url::from_file_path(path) {
            Ok(url) => Self(url.into()),
            Err(()) => Self(path.to_string_lossy().into_owned()),
        }
    }

    /// The raw location string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert this location into an absolute filesystem path.
    ///
    /// # Errors
    ///
    /// Return a [`ConfigurationMalformed`](crate::ErrorKind::ConfigurationMalformed) error if the
    /// location is not a local `file:` URL or an absolute path.
    pub fn to_path(&self) -> Result<PathBuf, Error> {
        parse_location(&self.0).map_err(|err| Error::configuration_malformed(&self.0, err))
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PathBuf> for ResourceLocation {
    fn from(path: PathBuf) -> Self {
        ResourceLocation::from_path(path)
    }
}

fn parse_location(location: &str) -> anyhow::Result<PathBuf> {
    let path = match Url::parse(location) {
        Ok(url) => {
            if url.scheme() != "file" {
                bail!("unsupported scheme: {}", url.scheme());
            }
            if url.query().is_some() || url.fragment().is_some() {
                bail!("query and fragment are not allowed");
            }
            check_escapes(url.path())?;
            url.to_file_path()
                .map_err(|()| anyhow!("not a local file: {url}"))?
        }
        Err(ParseError::RelativeUrlWithoutBase) => {
            let path = PathBuf::from(location);
            if !path.is_absolute() {
                bail!("location is neither a URL nor an absolute path");
            }
            path
        }
        Err(err) => return Err(err.into()),
    };

    if path.as_os_str().as_encoded_bytes().contains(&0) {
        bail!("location contains a NUL byte");
    }
    Ok(path)
}

// The URL parser keeps invalid escapes verbatim; every `%` must start two hex digits.
fn check_escapes(path: &str) -> anyhow::Result<()> {
    let bytes = path.as_bytes();
    for (offset, _) in path.match_indices('%') {
        let valid = bytes
            .get(offset + 1..offset + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            bail!("invalid percent-escape at offset {offset}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_file_url_forms() {
        for location in [
            "file:///var/app/logforth.json",
            "file:/var/app/logforth.json",
            "file://localhost/var/app/logforth.json",
            "FILE:///var/app/logforth.json",
            "/var/app/logforth.json",
        ] {
            let path = ResourceLocation::new(location).to_path().unwrap();
            assert_eq!(path, PathBuf::from("/var/app/logforth.json"), "{location}");
        }
    }

    #[test]
    fn test_from_path_escapes() {
        let location = ResourceLocation::from_path("/tmp/100% sure/#1.json");
        assert_eq!(location.as_str(), "file:///tmp/100%25%20sure/%231.json");
        assert_eq!(
            location.to_path().unwrap(),
            PathBuf::from("/tmp/100% sure/#1.json")
        );
    }

    #[test]
    fn test_from_relative_path_is_rejected() {
        let location = ResourceLocation::from_path("conf/logforth.json");
        assert_eq!(location.as_str(), "conf/logforth.json");
        let err = location.to_path().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationMalformed);
    }

    #[test]
    fn test_malformed_locations() {
        for location in [
            "",
            "http://example.com/logforth.json",
            "file://remote-host/logforth.json",
            "relative/logforth.json",
            "file:///bad%zzescape",
            "file:///truncated%2",
            "file:///tmp/a%+1b.json",
            "file:///tmp/a%-1b.json",
            "file:///with?query",
            "file:///with#fragment",
            "file:///nul%00byte",
            "http://[::1",
        ] {
            let err = ResourceLocation::new(location).to_path().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigurationMalformed, "{location}");
            assert_eq!(err.context_value("location"), Some(location));
            assert_eq!(err.sources().len(), 1);
        }
    }
}
