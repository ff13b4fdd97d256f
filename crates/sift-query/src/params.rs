//! Raw request parameters.
//!
//! [`Params`] mirrors the nested mapping a web framework builds from a
//! query string: string keys mapping to either a string or another
//! mapping. The resolver reads four top-level keys:
//!
//! | key | shape | used for |
//! |-----|-------|----------|
//! | `query` | mapping | search field values and active filters |
//! | `sorting` | string | active sort scope |
//! | `sort_order` | string | `"asc"` or `"desc"` |
//! | `page` | string | passed through to the ending scope |
//!
//! ```
//! use sift_query::Params;
//!
//! let params = Params::from_query_string("query[status]=completed&sorting=by_title");
//! assert_eq!(params.query_value("status"), Some("completed"));
//! assert_eq!(params.get_str("sorting"), Some("by_title"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const QUERY_KEY: &str = "query";
pub const SORTING_KEY: &str = "sorting";
pub const SORT_ORDER_KEY: &str = "sort_order";
pub const PAGE_KEY: &str = "page";

/// A single parameter: either a string or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Value(String),
    Map(Params),
}

impl Param {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::Value(s) => Some(s),
            Param::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&Params> {
        match self {
            Param::Map(m) => Some(m),
            Param::Value(_) => None,
        }
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Value(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Value(s)
    }
}

impl From<Params> for Param {
    fn from(p: Params) -> Self {
        Param::Map(p)
    }
}

/// Nested request parameter mapping, ordered by key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Param>);

impl Params {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Params::default()
    }

    /// Parses an `application/x-www-form-urlencoded` string.
    ///
    /// Bracketed keys nest: `query[status]=done` becomes
    /// `{"query": {"status": "done"}}`. A trailing `[]` is dropped, and a
    /// later duplicate replaces an earlier one.
    pub fn from_query_string(input: &str) -> Self {
        let mut params = Params::new();
        for (key, value) in url::form_urlencoded::parse(input.trim_start_matches('?').as_bytes()) {
            let path = split_key(&key);
            if path.is_empty() {
                continue;
            }
            params.insert_path(&path, value.into_owned());
        }
        params
    }

    /// Renders the mapping back to a query string with bracketed nesting.
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        self.flatten_into(None, &mut pairs);
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// Adds a string value (builder style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, Param::Value(value.into()));
        self
    }

    /// Adds a nested mapping (builder style).
    pub fn with_map(mut self, key: impl Into<String>, map: Params) -> Self {
        self.insert(key, Param::Map(map));
        self
    }

    /// Sets `query[name]` (builder style).
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_query(name, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, param: impl Into<Param>) -> Option<Param> {
        self.0.insert(key.into(), param.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Param> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.0.get(key)
    }

    /// Returns the value under `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Param::as_str)
    }

    /// Returns the value under `key` if it is a mapping.
    pub fn get_map(&self, key: &str) -> Option<&Params> {
        self.get(key).and_then(Param::as_map)
    }

    /// Returns `query[name]` if present and a string.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.get_map(QUERY_KEY).and_then(|q| q.get_str(name))
    }

    /// Sets `query[name]`, creating (or replacing a non-mapping) `query`.
    pub fn set_query(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let entry = self
            .0
            .entry(QUERY_KEY.to_string())
            .or_insert_with(|| Param::Map(Params::new()));
        if let Param::Value(_) = entry {
            *entry = Param::Map(Params::new());
        }
        if let Param::Map(query) = entry {
            query.insert(name, Param::Value(value.into()));
        }
    }

    /// Removes `query[name]`, dropping `query` itself once it is empty.
    pub fn remove_query(&mut self, name: &str) -> Option<Param> {
        let removed = match self.0.get_mut(QUERY_KEY) {
            Some(Param::Map(query)) => query.remove(name),
            _ => None,
        };
        if matches!(self.0.get(QUERY_KEY), Some(Param::Map(q)) if q.is_empty()) {
            self.0.remove(QUERY_KEY);
        }
        removed
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert_path(&mut self, path: &[String], value: String) {
        let (head, rest) = match path.split_first() {
            Some(split) => split,
            None => return,
        };
        if rest.is_empty() {
            self.0.insert(head.clone(), Param::Value(value));
            return;
        }
        let entry = self
            .0
            .entry(head.clone())
            .or_insert_with(|| Param::Map(Params::new()));
        if let Param::Value(_) = entry {
            *entry = Param::Map(Params::new());
        }
        if let Param::Map(nested) = entry {
            nested.insert_path(rest, value);
        }
    }

    fn flatten_into(&self, prefix: Option<&str>, out: &mut Vec<(String, String)>) {
        for (key, param) in &self.0 {
            let full = match prefix {
                Some(p) => format!("{}[{}]", p, key),
                None => key.clone(),
            };
            match param {
                Param::Value(v) => out.push((full, v.clone())),
                Param::Map(m) => m.flatten_into(Some(&full), out),
            }
        }
    }
}

impl FromIterator<(String, Param)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Param)>>(iter: I) -> Self {
        Params(iter.into_iter().collect())
    }
}

/// Returns `true` for empty or whitespace-only input.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Splits `a[b][c]` into `["a", "b", "c"]`. Keys with unbalanced brackets
/// are kept whole.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 || !key.ends_with(']') {
        return vec![key.to_string()];
    }

    let mut path = vec![key[..open].to_string()];
    for segment in key[open + 1..key.len() - 1].split("][") {
        if segment.contains('[') || segment.contains(']') {
            return vec![key.to_string()];
        }
        if !segment.is_empty() {
            path.push(segment.to_string());
        }
    }
    path
}
