//! Listing filters and their query-string form.
//!
//! Filters are a flat, ordered key/value object. Empty strings, nulls and
//! non-finite numbers are omitted before serialization, so a cleared input
//! never reaches the server as `key=`.

use serde_json::Value;
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl FilterValue {
    /// Wire form, or `None` when the value must be omitted.
    pub fn render(&self) -> Option<String> {
        match self {
            FilterValue::Text(s) if s.is_empty() => None,
            FilterValue::Text(s) => Some(s.clone()),
            FilterValue::Int(n) => Some(n.to_string()),
            FilterValue::Float(f) if !f.is_finite() => None,
            FilterValue::Float(f) => Some(f.to_string()),
            FilterValue::Bool(b) => Some(b.to_string()),
            FilterValue::Null => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Int(i64::from(value))
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Int(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FilterValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("filters must be a JSON object")]
    NotAnObject,
    #[error("filter `{0}` must be a scalar value")]
    NestedValue(String),
    #[error("filter `{0}` is not of the form key=value")]
    MalformedPair(String),
}

/// Ordered flat filter object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(Vec<(String, FilterValue)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Filters::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a key, keeping its original position when it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// True when nothing would be sent.
    pub fn is_effectively_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Builds filters from a flat JSON object. Nested values are rejected.
    pub fn from_json(value: &Value) -> Result<Self, FilterError> {
        let object = value.as_object().ok_or(FilterError::NotAnObject)?;
        let mut filters = Filters::new();
        for (key, value) in object {
            let value = match value {
                Value::Null => FilterValue::Null,
                Value::Bool(b) => FilterValue::Bool(*b),
                Value::String(s) => FilterValue::Text(s.clone()),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => FilterValue::Int(i),
                    None => FilterValue::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
                Value::Array(_) | Value::Object(_) => {
                    return Err(FilterError::NestedValue(key.clone()))
                }
            };
            filters.set(key.clone(), value);
        }
        Ok(filters)
    }

    /// Parses CLI-style `key=value` arguments as text filters.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Filters::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (key, value) = assignment
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| FilterError::MalformedPair(assignment.to_string()))?;
            filters.set(key.trim(), value.trim());
        }
        Ok(filters)
    }

    /// Non-empty key/value pairs in insertion order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.render().map(|v| (k.clone(), v)))
            .collect()
    }

    /// `?a=1&b=2`, or an empty string when no value survives.
    pub fn to_query_string(&self) -> String {
        let pairs = self.pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let mut serializer = form_urlencoded::Serializer::for_suffix(String::from("?"), 1);
        for (k, v) in &pairs {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    /// Inverse of [`Filters::to_query_string`]. A leading `?` is optional.
    pub fn parse_query(query: &str) -> Vec<(String, String)> {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_values_are_omitted() {
        let filters = Filters::new()
            .with("crop", "maize")
            .with("county", "")
            .with("minPrice", 50)
            .with("maxPrice", "");
        assert_eq!(filters.to_query_string(), "?crop=maize&minPrice=50");
    }

    #[test]
    fn json_object_keeps_field_order() {
        let filters = Filters::from_json(&json!({
            "crop": "maize",
            "county": "",
            "minPrice": 50,
            "maxPrice": ""
        }))
        .unwrap();
        let query = filters.to_query_string();
        assert!(query.contains("crop=maize"));
        assert!(query.contains("minPrice=50"));
        assert!(!query.contains("county"));
        assert!(!query.contains("maxPrice"));
    }

    #[test]
    fn round_trip_recovers_only_non_empty_pairs() {
        let filters = Filters::new()
            .with("crop", "sweet potato")
            .with("county", Option::<&str>::None)
            .with("verified", true)
            .with("note", "a&b=c")
            .with("ratio", 0.5)
            .with("nan", f64::NAN);
        let parsed = Filters::parse_query(&filters.to_query_string());
        assert_eq!(
            parsed,
            vec![
                ("crop".to_string(), "sweet potato".to_string()),
                ("verified".to_string(), "true".to_string()),
                ("note".to_string(), "a&b=c".to_string()),
                ("ratio".to_string(), "0.5".to_string()),
            ]
        );
    }

    #[test]
    fn all_empty_yields_no_query() {
        let filters = Filters::new().with("crop", "").with("county", FilterValue::Null);
        assert_eq!(filters.to_query_string(), "");
        assert!(filters.is_effectively_empty());
    }

    #[test]
    fn set_replaces_in_place() {
        let mut filters = Filters::new().with("a", "1").with("b", "2");
        filters.set("a", "3");
        assert_eq!(filters.to_query_string(), "?a=3&b=2");
        assert_eq!(filters.remove("a"), Some(FilterValue::Text("3".into())));
        assert_eq!(filters.to_query_string(), "?b=2");
    }

    #[test]
    fn nested_json_is_rejected() {
        assert_eq!(
            Filters::from_json(&json!({"price": {"min": 1}})),
            Err(FilterError::NestedValue("price".into()))
        );
        assert_eq!(Filters::from_json(&json!([1])), Err(FilterError::NotAnObject));
    }

    #[test]
    fn assignments_parse_and_reject_garbage() {
        let filters = Filters::from_assignments(["crop=beans", "county = Meru"]).unwrap();
        assert_eq!(filters.to_query_string(), "?crop=beans&county=Meru");
        assert!(Filters::from_assignments(["=x"]).is_err());
        assert!(Filters::from_assignments(["novalue"]).is_err());
    }
}
