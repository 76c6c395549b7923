use crate::data::{self, DataObject};
use crate::error::{Error, Result};
use crate::list::{FetchFn, ForwardList, Page, PageWire};
use crate::rest::{execute, set_or_replace_arg, to_args, ListParameters};
use crate::session::Session;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Filter on a listing: field/value pairs ANDed by the server
pub type Filter = BTreeMap<String, String>;

/// Reply carrying just the id of a created or minted object
#[derive(Debug, Clone, Deserialize)]
pub struct GenericReply {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug)]
pub(crate) struct ResourceInner {
    pub(crate) session: Session,
    pub(crate) url: String,
}

/// Access engine for one entity collection.
///
/// A `Resource<T>` bundles a session with the collection URL derived from
/// `T`'s schema descriptor and speaks the full request protocol for it:
/// bearer headers, status classification, and token refresh with replay.
/// Cloning is cheap; records fetched through any clone stay operable until
/// the last clone is dropped. A [`ForwardList`] produced by [`list`](Resource::list)
/// holds its own reference and keeps records it yielded operable for its
/// own lifetime.
#[derive(Debug)]
pub struct Resource<T: DataObject> {
    inner: Arc<ResourceInner>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DataObject> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Resource {
            inner: Arc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}

impl<T: DataObject> Resource<T> {
    /// Engine for the entity's own collection under the session base URL
    pub fn new(session: &Session) -> Self {
        let url = format!("{}/{}", session.url(), T::resource_path());
        Self::with_url(session, url)
    }

    /// Engine over an explicit collection URL, for nested collections such
    /// as `contacts/{id}/application_tokens`
    pub fn with_url(session: &Session, url: impl Into<String>) -> Self {
        Resource {
            inner: Arc::new(ResourceInner {
                session: session.clone(),
                url: url.into(),
            }),
            _marker: PhantomData,
        }
    }

    pub(crate) fn from_inner(inner: Arc<ResourceInner>) -> Self {
        Resource {
            inner,
            _marker: PhantomData,
        }
    }

    /// Collection URL this engine operates on
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Session this engine was created from
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Lazy listing of the collection.
    ///
    /// `filter` entries become query arguments the server ANDs together;
    /// `params` control the starting offset, page size and sort order.
    /// Nothing is fetched until the first record is requested from the
    /// returned list.
    pub fn list(&self, filter: Option<&Filter>, params: Option<&ListParameters>) -> ForwardList<T> {
        let args = to_args(filter, params);
        let start_offset = params.map(|p| p.start_offset).unwrap_or(0);
        let inner = Arc::clone(&self.inner);

        let fetch: FetchFn<T> = Box::new(move |offset| {
            let inner = Arc::clone(&inner);
            let mut args = args.clone();
            Box::pin(async move {
                if offset != 0 {
                    set_or_replace_arg(&mut args, "offset", &offset.to_string());
                }
                let response = execute(&inner.session, || {
                    inner.session.client().get(&inner.url).query(&args)
                })
                .await?;

                let wire: PageWire = response.json().await?;
                let total = wire.total;
                let mut records = Vec::with_capacity(wire.list.len());
                for value in wire.list {
                    let mut record: T = data::from_wire(value)?;
                    record.binding_mut().attach(Arc::downgrade(&inner));
                    records.push(record);
                }
                Ok(Page { records, total })
            })
        });

        ForwardList::new(start_offset, fetch)
    }

    /// Fetch one record by id. The record comes back bound to this engine,
    /// so record-level verbs work on it while the engine lives.
    pub async fn get(&self, id: &str) -> Result<T> {
        let url = format!("{}/{}", self.inner.url, id);
        let response = execute(&self.inner.session, || {
            self.inner.session.client().get(&url)
        })
        .await?;

        let value: serde_json::Value = response.json().await?;
        let mut record: T = data::from_wire(value)?;
        record.binding_mut().attach(Arc::downgrade(&self.inner));
        Ok(record)
    }

    /// Create a record from the object's writable fields and return the id
    /// assigned by the server
    pub async fn create(&self, object: &T) -> Result<String> {
        let body = data::to_wire(object)?;
        let response = execute(&self.inner.session, || {
            self.inner.session.client().post(&self.inner.url).json(&body)
        })
        .await?;

        let reply: GenericReply = response.json().await?;
        Ok(reply.id)
    }

    /// Push the object's writable fields to `{collection}/{id}`
    pub async fn update(&self, object: &T) -> Result<()> {
        if object.id().is_empty() {
            return Err(Error::Precondition(
                "cannot update an object without id".to_string(),
            ));
        }

        let url = format!("{}/{}", self.inner.url, object.id());
        let body = data::to_wire(object)?;
        let response = execute(&self.inner.session, || {
            self.inner.session.client().post(&url).json(&body)
        })
        .await?;
        drain_reply(response).await
    }

    /// Delete the record with the given id
    pub async fn delete(&self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::Precondition(
                "cannot delete an object without id".to_string(),
            ));
        }
        self.delete_url(&format!("{}/{}", self.inner.url, id)).await
    }

    /// Delete an explicit URL under this engine's protocol, for custom
    /// sub-resources
    pub async fn delete_url(&self, url: &str) -> Result<()> {
        let url = url.to_string();
        let response = execute(&self.inner.session, || {
            self.inner.session.client().delete(&url)
        })
        .await?;
        drain_reply(response).await
    }

    /// POST with an empty body and extra query arguments, parsing the
    /// reply. Building block for custom verbs that mint something, like a
    /// sender id purchase or an attachment access token.
    pub async fn post_no_body<R>(&self, url: &str, args: &[(&str, &str)]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = url.to_string();
        let args: Vec<(String, String)> = args
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let response = execute(&self.inner.session, || {
            self.inner.session.client().post(&url).query(&args)
        })
        .await?;

        Ok(response.json().await?)
    }

    /// POST an alternate payload through this entity's write rules
    /// (read-only strip and field remap), discarding the reply. Building
    /// block for custom verbs like a message request state change.
    pub async fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<()> {
        let url = url.to_string();
        let body = data::to_wire_as::<T, B>(body)?;
        let response = execute(&self.inner.session, || {
            self.inner.session.client().post(&url).json(&body)
        })
        .await?;
        drain_reply(response).await
    }

    /// POST a file's bytes to a URL under this engine. An empty
    /// `mime_type` defaults to `application/octet-stream`; a non-empty
    /// `suggested_file_name` is advertised via `Content-Disposition`.
    pub async fn upload_file(
        &self,
        url: &str,
        path: &Path,
        suggested_file_name: &str,
        mime_type: &str,
    ) -> Result<()> {
        let content = tokio::fs::read(path).await?;
        let content_type = if mime_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            mime_type.to_string()
        };
        let disposition = if suggested_file_name.is_empty() {
            None
        } else {
            Some(format!(
                "attachment; filename=\"{}\"",
                suggested_file_name
            ))
        };

        let url = url.to_string();
        let response = execute(&self.inner.session, || {
            // the body is cloned so an auth replay can resend it
            let mut request = self
                .inner
                .session
                .client()
                .post(&url)
                .header(CONTENT_TYPE, content_type.as_str())
                .body(content.clone());
            if let Some(ref disposition) = disposition {
                request = request.header(CONTENT_DISPOSITION, disposition.as_str());
            }
            request
        })
        .await?;
        drain_reply(response).await
    }

    /// GET a URL under this engine and stream the reply body to `path`
    pub async fn download_file(&self, url: &str, path: &Path) -> Result<()> {
        let target = url.to_string();
        let mut response = execute(&self.inner.session, || {
            self.inner.session.client().get(&target)
        })
        .await?;

        let mut file = tokio::fs::File::create(path).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

/// Consume and discard a reply body
async fn drain_reply(response: reqwest::Response) -> Result<()> {
    response.bytes().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthInfo;
    use crate::data::ObjectBinding;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Thing {
        #[serde(default)]
        id: String,
        #[serde(skip)]
        binding: ObjectBinding,
    }

    impl DataObject for Thing {
        fn resource_path() -> &'static str {
            "scg-external-api/api/v1/things"
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
        Session::new("https://api.example.com/", auth, reqwest::Client::new())
    }

    #[test]
    fn test_collection_url_from_descriptor() {
        let resource = Resource::<Thing>::new(&session());
        assert_eq!(
            resource.url(),
            "https://api.example.com/scg-external-api/api/v1/things"
        );
    }

    #[test]
    fn test_with_url_keeps_explicit_url() {
        let url = "https://api.example.com/scg-external-api/api/v1/contacts/CT-1/things";
        let resource = Resource::<Thing>::with_url(&session(), url);
        assert_eq!(resource.url(), url);
    }
}
