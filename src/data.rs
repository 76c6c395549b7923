use crate::error::{Error, Result};
use crate::resource::{Resource, ResourceInner};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

/// Schema descriptor implemented by every API entity.
///
/// An entity is a plain serde struct plus a handful of constants telling
/// the generic [`Resource`] engine where its collection lives and how its
/// fields behave on the wire:
///
/// - [`read_only_fields`](DataObject::read_only_fields) are managed by the
///   server (ids, creation dates, state) and are stripped from every write
///   body; sending them back would be rejected.
/// - [`field_mapping`](DataObject::field_mapping) renames fields whose wire
///   name is not usable as a Rust identifier, e.g. a local `case_value`
///   field stored as `case` by the server.
///
/// Entities also embed an [`ObjectBinding`] (marked `#[serde(skip)]`) so
/// records returned by `get` and by listings can carry a link back to the
/// engine that produced them.
pub trait DataObject: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Path of the entity's collection under the session base URL,
    /// without a leading slash
    fn resource_path() -> &'static str;

    /// Server-managed fields, stripped from write bodies
    fn read_only_fields() -> &'static [&'static str] {
        &[]
    }

    /// Field renames applied on the wire, as (local, wire) pairs
    fn field_mapping() -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// The record's id; empty while the record has not been persisted
    fn id(&self) -> &str;

    /// The record's link back to the engine that produced it
    fn binding(&self) -> &ObjectBinding;

    fn binding_mut(&mut self) -> &mut ObjectBinding;
}

/// Non-owning link from a fetched record back to the resource engine that
/// produced it. Engines attach it on `get` and on every page fetch; it
/// never keeps the engine alive, so record-level verbs fail cleanly once
/// every engine clone has been dropped.
#[derive(Default, Clone)]
pub struct ObjectBinding {
    resource: Option<Weak<ResourceInner>>,
}

impl ObjectBinding {
    /// True once the record has been attached to an engine
    pub fn is_bound(&self) -> bool {
        self.resource.is_some()
    }

    /// True while the issuing engine (or a clone of it) is still alive
    pub fn is_alive(&self) -> bool {
        self.resource
            .as_ref()
            .map(|weak| weak.strong_count() > 0)
            .unwrap_or(false)
    }

    pub(crate) fn attach(&mut self, resource: Weak<ResourceInner>) {
        self.resource = Some(resource);
    }

    pub(crate) fn upgrade(&self) -> Option<Arc<ResourceInner>> {
        self.resource.as_ref().and_then(Weak::upgrade)
    }
}

impl fmt::Debug for ObjectBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBinding")
            .field("bound", &self.is_bound())
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Record-level verbs on fetched entities.
///
/// Implemented for every [`DataObject`]; the verbs route through the engine
/// the record is bound to, so they work on records obtained from `get` or
/// from a listing while that engine is alive.
#[async_trait]
pub trait ObjectOps: DataObject + Sized {
    /// The engine this record is bound to. Fails with
    /// [`Error::Precondition`] when the record has no id or the engine has
    /// been dropped; no request is sent in either case.
    fn resource(&self) -> Result<Resource<Self>> {
        if self.id().is_empty() {
            return Err(Error::Precondition(
                "object has no id and is not initialized for operations".to_string(),
            ));
        }
        match self.binding().upgrade() {
            Some(inner) => Ok(Resource::from_inner(inner)),
            None => Err(Error::Precondition("resource has expired".to_string())),
        }
    }

    /// Push the record's current state to the server
    async fn update(&self) -> Result<()> {
        self.resource()?.update(self).await
    }

    /// Delete the record on the server
    async fn delete(&self) -> Result<()> {
        let resource = self.resource()?;
        resource.delete(self.id()).await
    }
}

impl<T: DataObject> ObjectOps for T {}

/// Serialize an object for a write: read-only fields dropped and local
/// names remapped to their wire form. Rewrites apply to top-level keys.
pub(crate) fn to_wire<T: DataObject>(object: &T) -> Result<Value> {
    to_wire_as::<T, T>(object)
}

/// Serialize an alternate payload under `T`'s write rules, for custom
/// verbs whose body is not the entity itself
pub(crate) fn to_wire_as<T: DataObject, B: Serialize>(body: &B) -> Result<Value> {
    let mut value = serde_json::to_value(body)?;
    if let Value::Object(ref mut map) = value {
        for field in T::read_only_fields() {
            map.remove(*field);
        }
        for (local, wire) in T::field_mapping() {
            if let Some(v) = map.remove(*local) {
                map.insert((*wire).to_string(), v);
            }
        }
    }
    Ok(value)
}

/// Rewrite an inbound entity value back to local field names and
/// deserialize it
pub(crate) fn from_wire<T: DataObject>(mut value: Value) -> Result<T> {
    if let Value::Object(ref mut map) = value {
        for (local, wire) in T::field_mapping() {
            if let Some(v) = map.remove(*wire) {
                map.insert((*local).to_string(), v);
            }
        }
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthInfo;
    use crate::session::Session;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Keyword {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        case_value: String,
        #[serde(skip)]
        binding: ObjectBinding,
    }

    impl DataObject for Keyword {
        fn resource_path() -> &'static str {
            "scg-external-api/api/v1/keywords"
        }

        fn read_only_fields() -> &'static [&'static str] {
            &["id"]
        }

        fn field_mapping() -> &'static [(&'static str, &'static str)] {
            &[("case_value", "case")]
        }

        fn id(&self) -> &str {
            &self.id
        }

        fn binding(&self) -> &ObjectBinding {
            &self.binding
        }

        fn binding_mut(&mut self) -> &mut ObjectBinding {
            &mut self.binding
        }
    }

    fn session() -> Session {
        let auth = Arc::new(AuthInfo::new("k", "s", "t"));
        Session::new("https://api.example.com", auth, reqwest::Client::new())
    }

    #[test]
    fn test_to_wire_strips_and_remaps() {
        let keyword = Keyword {
            id: "KW-1".to_string(),
            name: "stop".to_string(),
            case_value: "EXACT".to_string(),
            binding: ObjectBinding::default(),
        };

        let wire = to_wire(&keyword).unwrap();
        assert_eq!(wire, json!({"name": "stop", "case": "EXACT"}));
    }

    #[test]
    fn test_from_wire_restores_local_names() {
        let keyword: Keyword =
            from_wire(json!({"id": "KW-1", "name": "stop", "case": "INSENSITIVE"})).unwrap();

        assert_eq!(keyword.id, "KW-1");
        assert_eq!(keyword.case_value, "INSENSITIVE");
    }

    #[test]
    fn test_to_wire_as_applies_entity_rules() {
        #[derive(Serialize)]
        struct Patch {
            id: String,
            case_value: String,
        }

        let wire = to_wire_as::<Keyword, Patch>(&Patch {
            id: "ignored".to_string(),
            case_value: "EXACT".to_string(),
        })
        .unwrap();

        assert_eq!(wire, json!({"case": "EXACT"}));
    }

    #[test]
    fn test_binding_liveness() {
        let inner = Arc::new(ResourceInner {
            session: session(),
            url: "https://api.example.com/things".to_string(),
        });

        let mut binding = ObjectBinding::default();
        assert!(!binding.is_bound());
        assert!(!binding.is_alive());

        binding.attach(Arc::downgrade(&inner));
        assert!(binding.is_bound());
        assert!(binding.is_alive());

        drop(inner);
        assert!(binding.is_bound());
        assert!(!binding.is_alive());
    }

    #[test]
    fn test_resource_requires_id() {
        let keyword = Keyword::default();
        let err = keyword.resource().unwrap_err();
        assert!(matches!(err, Error::Precondition(ref msg) if msg.contains("no id")));
    }

    #[test]
    fn test_resource_requires_live_engine() {
        let mut keyword = Keyword {
            id: "KW-1".to_string(),
            ..Default::default()
        };

        // never bound counts as expired
        let err = keyword.resource().unwrap_err();
        assert!(matches!(err, Error::Precondition(ref msg) if msg.contains("expired")));

        let inner = Arc::new(ResourceInner {
            session: session(),
            url: "https://api.example.com/things".to_string(),
        });
        keyword.binding_mut().attach(Arc::downgrade(&inner));
        assert!(keyword.resource().is_ok());

        drop(inner);
        let err = keyword.resource().unwrap_err();
        assert!(matches!(err, Error::Precondition(ref msg) if msg.contains("expired")));
    }
}
