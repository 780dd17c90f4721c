use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flight route as stored by the backend.
///
/// Domain fields are opaque: `origin` and `destination` are named because
/// callers display them, but they hold whatever JSON the backend sent (a code,
/// a populated airport document, ...). Every other field is kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Route {
    /// Empty only in update responses that omit it
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Route {
    pub fn new(id: impl Into<String>) -> Self {
        Route {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// `origin` when the backend sent a plain string.
    pub fn origin_str(&self) -> Option<&str> {
        self.origin.as_ref().and_then(Value::as_str)
    }

    pub fn destination_str(&self) -> Option<&str> {
        self.destination.as_ref().and_then(Value::as_str)
    }
}

/// Payload for `POST /routes`; the backend assigns the identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewRoute {
    pub origin: String,
    pub destination: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewRoute {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        NewRoute {
            origin: origin.into(),
            destination: destination.into(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Partial fields for `PUT /routes/{id}`. Absent fields are not sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RoutePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoutePatch {
    pub fn origin(mut self, origin: impl Into<Value>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<Value>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.origin.is_none() && self.destination.is_none() && self.extra.is_empty()
    }
}
