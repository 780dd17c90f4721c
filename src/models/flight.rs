use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Route reference on a flight. The backend sends either a bare id or the
/// populated route document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RouteRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(flatten)]
        rest: Map<String, Value>,
    },
}

impl RouteRef {
    pub fn id(&self) -> &str {
        match self {
            RouteRef::Id(id) => id,
            RouteRef::Populated { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flight {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Flight {
    pub fn new(id: impl Into<String>, route_id: Option<&str>) -> Self {
        Flight {
            id: id.into(),
            route: route_id.map(|r| RouteRef::Id(r.to_string())),
            extra: Map::new(),
        }
    }

    pub fn uses_route(&self, route_id: &str) -> bool {
        self.route.as_ref().is_some_and(|r| r.id() == route_id)
    }
}
