// ── Attribute store ──
//
// Scalar attributes of one response element, keyed exactly as received.
// Raw values are strings; derived values computed by a node variant live
// in the same namespace. Typed parse helpers fail soft and never mutate.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// One attribute value: raw text from the server, or a derived value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Float(f64),
    Timestamp(DateTime<Utc>),
    /// A derived attribute whose computation had no usable input.
    Absent,
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Float(v) => write!(f, "{v}"),
            Self::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
            Self::Absent => Ok(()),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

/// Attribute name to value mapping with soft-failing typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeStore {
    values: IndexMap<String, AttributeValue>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from raw string attributes.
    pub fn from_raw(raw: &IndexMap<String, String>) -> Self {
        raw.iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Insert or overwrite a raw text attribute.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), AttributeValue::Text(value.into()));
    }

    /// Insert or overwrite a derived attribute.
    pub fn set_derived(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw text of an attribute. Derived values are not text and return `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(AttributeValue::as_text)
    }

    /// Any attribute value, raw or derived.
    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Parse a raw attribute consisting solely of ASCII digits.
    ///
    /// Signs, whitespace, decimal points, and empty strings give `None`.
    pub fn parse_int(&self, name: &str) -> Option<u64> {
        let raw = self.get(name)?;
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok()
    }

    /// Parse a raw attribute as a Unix epoch in seconds.
    ///
    /// An optional leading `-` followed by ASCII digits; a `+` sign or
    /// whitespace gives `None`.
    pub fn parse_timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        let raw = self.get(name)?;
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        DateTime::from_timestamp(raw.parse().ok()?, 0)
    }

    /// Boolean policy for Plex flags: `"1"` or `"true"` (any ASCII case)
    /// is true. Anything else, including a missing attribute, is false.
    pub fn parse_flag(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }

    /// A derived float, or a raw attribute that parses as one.
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// A derived timestamp.
    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.values.get(name)? {
            AttributeValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Snapshot copy of every attribute.
    pub fn to_map(&self) -> IndexMap<String, AttributeValue> {
        self.values.clone()
    }

    /// Snapshot as a JSON object. Absent derived values become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl FromIterator<(String, String)> for AttributeStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k, AttributeValue::Text(v)))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store(pairs: &[(&str, &str)]) -> AttributeStore {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn parse_int_accepts_only_digits() {
        let s = store(&[
            ("height", "1080"),
            ("rating", "12.5"),
            ("neg", "-5"),
            ("plus", "+5"),
            ("empty", ""),
            ("word", "abc"),
            ("spaced", " 42"),
        ]);
        assert_eq!(s.parse_int("height"), Some(1080));
        for name in ["rating", "neg", "plus", "empty", "word", "spaced", "missing"] {
            assert_eq!(s.parse_int(name), None, "{name}");
        }
    }

    #[test]
    fn parse_int_overflow_is_absent() {
        let s = store(&[("huge", "99999999999999999999999")]);
        assert_eq!(s.parse_int("huge"), None);
    }

    #[test]
    fn parse_timestamp_matches_epoch() {
        let s = store(&[
            ("addedAt", "1427997393"),
            ("bad", "2015-04-02"),
            ("frac", "1.5"),
            ("plus", "+5"),
            ("space", " 5"),
            ("sign", "-"),
            ("neg", "-5"),
        ]);
        let ts = s.parse_timestamp("addedAt").unwrap();
        assert_eq!(ts.timestamp(), 1_427_997_393);
        assert_eq!(s.parse_timestamp("bad"), None);
        assert_eq!(s.parse_timestamp("frac"), None);
        assert_eq!(s.parse_timestamp("plus"), None);
        assert_eq!(s.parse_timestamp("space"), None);
        assert_eq!(s.parse_timestamp("sign"), None);
        assert_eq!(s.parse_timestamp("neg").unwrap().timestamp(), -5);
        assert_eq!(s.parse_timestamp("missing"), None);
    }

    #[test]
    fn parse_helpers_do_not_mutate() {
        let s = store(&[("addedAt", "1427997393"), ("size", "x")]);
        let before = s.clone();
        let _ = s.parse_timestamp("addedAt");
        let _ = s.parse_int("size");
        assert_eq!(s, before);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let s = store(&[("ratingKey", "7459")]);
        assert_eq!(s.get("ratingKey"), Some("7459"));
        assert_eq!(s.get("ratingkey"), None);
    }

    #[test]
    fn flag_policy() {
        let s = store(&[("a", "1"), ("b", "TRUE"), ("c", "0"), ("d", "yes"), ("e", "")]);
        assert!(s.parse_flag("a"));
        assert!(s.parse_flag("b"));
        assert!(!s.parse_flag("c"));
        assert!(!s.parse_flag("d"));
        assert!(!s.parse_flag("e"));
        assert!(!s.parse_flag("missing"));
    }

    #[test]
    fn derived_values_share_namespace() {
        let mut s = store(&[("title", "Endgame")]);
        s.set_derived("progress", AttributeValue::Float(50.0));
        s.set_derived("addedAtDateTime", AttributeValue::Absent);

        assert_eq!(s.get("progress"), None);
        assert_eq!(s.float("progress"), Some(50.0));
        assert!(s.value("addedAtDateTime").unwrap().is_absent());
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn to_map_is_a_snapshot() {
        let mut s = store(&[("title", "Endgame")]);
        let snapshot = s.to_map();
        s.insert("title", "Changed");
        assert_eq!(
            snapshot.get("title"),
            Some(&AttributeValue::Text("Endgame".into()))
        );
    }

    #[test]
    fn to_json_renders_derived_values() {
        let mut s = store(&[("title", "Endgame")]);
        s.set_derived("progress", AttributeValue::Float(25.0));
        s.set_derived("updatedAtDateTime", AttributeValue::Absent);
        s.set_derived(
            "addedAtDateTime",
            AttributeValue::Timestamp(DateTime::from_timestamp(0, 0).unwrap()),
        );

        let json = s.to_json();
        assert_eq!(json["title"], "Endgame");
        assert_eq!(json["progress"], 25.0);
        assert!(json["updatedAtDateTime"].is_null());
        assert_eq!(json["addedAtDateTime"], "1970-01-01T00:00:00+00:00");
    }
}
