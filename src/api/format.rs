use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::model::{Organization, Role, User};
use crate::projection::EnhancedUser;

/// An entity exposed as a HAL resource
pub trait Resource: Serialize {
    /// Collection path segment under `/api`, also the `_embedded` relation name
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    /// Links besides `self`
    fn links(&self) -> Map<String, Value> {
        Map::new()
    }
}

pub fn item_href(collection: &str, id: Uuid) -> String {
    format!("/api/{}/{}", collection, id)
}

fn link(href: String) -> Value {
    json!({ "href": href })
}

/// `{ ...fields, "_links": { "self": ..., ... } }`
pub fn item<R: Resource>(resource: &R) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(resource)?;

    let mut links = Map::new();
    links.insert("self".into(), link(item_href(R::COLLECTION, resource.id())));
    links.extend(resource.links());

    if let Value::Object(obj) = &mut value {
        obj.insert("_links".into(), Value::Object(links));
    }
    Ok(value)
}

/// `{ "_embedded": { "<collection>": [...] }, "_links": { "self": ... }, "page": { "total": n } }`
pub fn collection<R: Resource>(resources: &[R], self_href: impl Into<String>) -> Result<Value, serde_json::Error> {
    let items = resources.iter().map(item).collect::<Result<Vec<_>, _>>()?;

    let mut embedded = Map::new();
    embedded.insert(R::COLLECTION.to_string(), Value::Array(items));

    Ok(json!({
        "_embedded": embedded,
        "_links": { "self": link(self_href.into()) },
        "page": { "total": resources.len() }
    }))
}

impl Resource for Organization {
    const COLLECTION: &'static str = "organizations";

    fn id(&self) -> Uuid {
        self.id
    }

    fn links(&self) -> Map<String, Value> {
        let mut links = Map::new();
        links.insert("roles".into(), link(format!("{}/roles", item_href(Self::COLLECTION, self.id))));
        links
    }
}

impl Resource for Role {
    const COLLECTION: &'static str = "roles";

    fn id(&self) -> Uuid {
        self.id
    }

    fn links(&self) -> Map<String, Value> {
        organization_link(self.organization_id)
    }
}

impl Resource for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn links(&self) -> Map<String, Value> {
        organization_link(self.organization_id)
    }
}

impl Resource for EnhancedUser {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.user.id
    }

    fn links(&self) -> Map<String, Value> {
        organization_link(self.user.organization_id)
    }
}

fn organization_link(organization_id: Option<Uuid>) -> Map<String, Value> {
    let mut links = Map::new();
    if let Some(id) = organization_id {
        links.insert("organization".into(), link(item_href(Organization::COLLECTION, id)));
    }
    links
}
