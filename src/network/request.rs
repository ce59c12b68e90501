//! Request descriptors and query-string filters

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::models::{Header, HttpMethod};

/// Query parameters appended to a request path
///
/// Keys are kept sorted so the same filters always render the same query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters {
    params: BTreeMap<String, String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Flatten the top-level fields of a serializable filter object.
    ///
    /// Nulls are skipped; strings are taken verbatim; any other value is
    /// rendered as compact JSON.
    pub fn from_serialize<T: Serialize>(filter: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(filter).map_err(ApiError::Encode)?;
        let mut filters = Filters::new();
        if let Value::Object(fields) = value {
            for (key, value) in fields {
                match value {
                    Value::Null => {}
                    Value::String(s) => filters.insert(key, s),
                    other => filters.insert(key, other.to_string()),
                }
            }
        }
        Ok(filters)
    }

    /// `key=value&...`, form-urlencoded, without the leading `?`
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (key, value) in iter {
            filters.insert(key, value);
        }
        filters
    }
}

/// A single API call, built fresh for each request
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Filters,
    pub body: Option<Value>,
    pub headers: Vec<Header>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::DELETE, path)
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    pub fn query(mut self, filters: &Filters) -> Self {
        for (key, value) in &filters.params {
            self.query.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    /// Path plus query string, as appended to the base URL
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query.to_query_string())
        }
    }
}
