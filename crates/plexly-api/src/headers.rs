// Plex request headers
//
// Every request to plex.tv or a media server carries a set of `X-Plex-*`
// headers identifying the client. Unset headers are never sent.

use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use crate::error::Error;

const PREFIX: &str = "X-Plex-";

pub const PLATFORM: &str = "X-Plex-Platform";
pub const PLATFORM_VERSION: &str = "X-Plex-Platform-Version";
pub const PROVIDES: &str = "X-Plex-Provides";
pub const PRODUCT: &str = "X-Plex-Product";
pub const VERSION: &str = "X-Plex-Version";
pub const DEVICE: &str = "X-Plex-Device";
pub const CLIENT_IDENTIFIER: &str = "X-Plex-Client-Identifier";
pub const TOKEN: &str = "X-Plex-Token";

/// Ordered set of `X-Plex-*` identification headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlexHeaders {
    values: IndexMap<String, String>,
}

impl Default for PlexHeaders {
    fn default() -> Self {
        let mut values = IndexMap::new();
        values.insert(PLATFORM.to_owned(), std::env::consts::OS.to_owned());
        values.insert(PLATFORM_VERSION.to_owned(), String::new());
        values.insert(PROVIDES.to_owned(), "controller".to_owned());
        values.insert(PRODUCT.to_owned(), "plexly".to_owned());
        values.insert(VERSION.to_owned(), env!("CARGO_PKG_VERSION").to_owned());
        values.insert(DEVICE.to_owned(), String::new());
        values.insert(CLIENT_IDENTIFIER.to_owned(), generate_client_identifier());
        Self { values }
    }
}

impl PlexHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header. Names without the `X-Plex-` prefix are read as
    /// camelCase and transposed, so `clientIdentifier` sets
    /// `X-Plex-Client-Identifier`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(header_name(name), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Look up a header by full or camelCase name. Unset headers return `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&header_name(name))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn client_identifier(&self) -> Option<&str> {
        self.get(CLIENT_IDENTIFIER)
    }

    /// Headers that will actually be sent, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode into a `HeaderMap` for use as reqwest default headers.
    pub fn to_header_map(&self) -> Result<HeaderMap, Error> {
        let mut map = HeaderMap::new();
        for (name, value) in self.iter() {
            let header =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                    name: name.to_owned(),
                    reason: e.to_string(),
                })?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;
            map.insert(header, value);
        }
        Ok(map)
    }
}

/// Normalize a header name: `X-Plex-*` names pass through, anything else
/// is treated as camelCase (`platformVersion` -> `X-Plex-Platform-Version`).
pub fn header_name(name: &str) -> String {
    if name.starts_with(PREFIX) {
        return name.to_owned();
    }

    let mut out = String::with_capacity(PREFIX.len() + name.len() + 4);
    out.push_str(PREFIX);
    for (i, ch) in name.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}

fn generate_client_identifier() -> String {
    format!("plexly-{}", Uuid::new_v4().simple())
}
