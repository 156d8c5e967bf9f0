//! Client-side caches of the backend's resources
//!
//! Every resource store follows the same discipline: an operation sets
//! `loading` and clears `error`, calls the proxy route, applies the result to
//! the cache on success, and records the error message on failure before
//! returning it to the caller. Concurrent operations are not sequenced; the
//! last reply to arrive decides the final cache state.

mod entity;
mod envelope;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::client::{Access, ApiClient};
use crate::error::{Error, Result};
use crate::payload::{BodyKind, Payload};

pub use entity::*;
pub use envelope::*;

/// Description of one backend resource and its proxy routes
pub trait Resource: Send + Sync + 'static {
    /// Collection route, e.g. `/api/courses`
    const PATH: &'static str;

    /// Envelope key of a list reply, also used in messages
    const PLURAL: &'static str;

    /// Envelope key of a single-entity reply, also used in messages
    const SINGULAR: &'static str;

    /// Label used in placeholders such as `Untitled Course`
    const LABEL: &'static str;

    /// Whether the routes receive the bearer token
    const ACCESS: Access;

    /// Body expected by `POST <PATH>`
    const CREATE_BODY: BodyKind;

    /// Body expected by `PUT <PATH>/:id`
    const UPDATE_BODY: BodyKind;

    /// Name shown for an entity, with the `Untitled` fallback
    fn display_name(entity: &Entity) -> String {
        entity.display_name(Self::LABEL)
    }
}

/// Observable state of a resource store
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Entities in the order the last fetch returned them
    pub collection: Vec<Arc<Entity>>,

    /// The entity in focus for detail views
    pub current: Option<Arc<Entity>>,

    /// Whether an operation is in flight
    pub loading: bool,

    /// Message of the last failure
    pub error: Option<String>,
}

/// Cache of one resource type plus the operations that mutate it
pub struct ResourceStore<R: Resource> {
    client: ApiClient,
    state: RwLock<StoreState>,
    page_size: usize,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> std::fmt::Debug for ResourceStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("resource", &R::PLURAL)
            .field("state", &*self.read())
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ResourceStore<R> {
    /// Create an empty store
    pub fn new(client: ApiClient, page_size: usize) -> Self {
        Self {
            client,
            state: RwLock::new(StoreState::default()),
            page_size: page_size.max(1),
            _resource: PhantomData,
        }
    }

    /// Load the whole collection, replacing the cached one
    pub async fn fetch_all(&self) -> Result<Vec<Arc<Entity>>> {
        let default = format!("Failed to fetch {}", R::PLURAL);
        self.run(async {
            let reply = self.send(Method::GET, R::PATH, R::ACCESS, None, &default).await?;
            let collection: Vec<Arc<Entity>> = Envelope::open(reply, R::PLURAL)
                .into_list()?
                .into_iter()
                .map(Arc::new)
                .collect();

            debug!("fetched {} {}", collection.len(), R::PLURAL);
            self.write().collection = collection.clone();
            Ok(collection)
        })
        .await
    }

    /// Load one entity into `current`
    pub async fn fetch_one(&self, id: &str) -> Result<Arc<Entity>> {
        let default = format!("Failed to fetch {}", R::SINGULAR);
        let path = Self::item_path(id)?;
        self.run(async {
            let reply = self.send(Method::GET, &path, R::ACCESS, None, &default).await?;
            let entity = Arc::new(Envelope::open(reply, R::SINGULAR).into_entity()?);

            self.write().current = Some(Arc::clone(&entity));
            Ok(entity)
        })
        .await
    }

    /// Create an entity and append it to the collection
    pub async fn create<P: Into<Payload>>(&self, payload: P) -> Result<Arc<Entity>> {
        let payload = Self::expect_body(payload.into(), R::CREATE_BODY, "create")?;
        let default = format!("Failed to create {}", R::SINGULAR);
        self.run(async {
            let reply = self
                .send(Method::POST, R::PATH, R::ACCESS, Some(payload), &default)
                .await?;
            let created = Arc::new(Envelope::open(reply, R::SINGULAR).into_entity()?);

            self.write().collection.push(Arc::clone(&created));
            Ok(created)
        })
        .await
    }

    /// Update an entity, replacing it in the collection and in `current`.
    ///
    /// Entries with other ids are left untouched. An id missing from the cache
    /// changes nothing locally.
    pub async fn update<P: Into<Payload>>(&self, id: &str, payload: P) -> Result<Arc<Entity>> {
        let payload = Self::expect_body(payload.into(), R::UPDATE_BODY, "update")?;
        let default = format!("Failed to update {}", R::SINGULAR);
        let path = Self::item_path(id)?;
        self.run(async {
            let reply = self
                .send(Method::PUT, &path, R::ACCESS, Some(payload), &default)
                .await?;
            let updated = Arc::new(Envelope::open(reply, R::SINGULAR).into_entity()?);

            self.replace_entry(id, |_| Arc::clone(&updated));
            Ok(updated)
        })
        .await
    }

    /// Delete an entity, dropping it from the collection and from `current`
    pub async fn delete(&self, id: &str) -> Result<()> {
        let default = format!("Failed to delete {}", R::SINGULAR);
        let path = Self::item_path(id)?;
        self.run(async {
            self.send(Method::DELETE, &path, R::ACCESS, None, &default).await?;

            let mut state = self.write();
            state.collection.retain(|entity| !entity.has_id(id));
            if state.current.as_ref().map_or(false, |current| current.has_id(id)) {
                state.current = None;
            }
            Ok(())
        })
        .await
    }

    /// Reset `error` without touching anything else
    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Replace the collection directly
    pub fn set_collection(&self, entities: Vec<Entity>) {
        self.write().collection = entities.into_iter().map(Arc::new).collect();
    }

    /// Replace the focused entity directly
    pub fn set_current(&self, entity: Option<Entity>) {
        self.write().current = entity.map(Arc::new);
    }

    /// Copy of the store state
    pub fn state(&self) -> StoreState {
        self.read().clone()
    }

    /// The cached collection
    pub fn collection(&self) -> Vec<Arc<Entity>> {
        self.read().collection.clone()
    }

    /// The focused entity
    pub fn current(&self) -> Option<Arc<Entity>> {
        self.read().current.clone()
    }

    pub fn loading(&self) -> bool {
        self.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    /// Cached entity with the given id
    pub fn find(&self, id: &str) -> Option<Arc<Entity>> {
        self.read()
            .collection
            .iter()
            .find(|entity| entity.has_id(id))
            .cloned()
    }

    /// Rows shown on a 1-based table page. Page 0 and pages past the end
    /// are empty.
    pub fn page(&self, number: usize) -> Vec<Arc<Entity>> {
        if number == 0 {
            return Vec::new();
        }
        self.read()
            .collection
            .iter()
            .skip((number - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect()
    }

    /// Number of table pages, at least one
    pub fn page_count(&self) -> usize {
        self.read().collection.len().div_ceil(self.page_size).max(1)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Run an operation under the loading/error discipline.
    ///
    /// `operation` applies its own result to the cache before resolving.
    pub(crate) async fn run<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        {
            let mut state = self.write();
            state.loading = true;
            state.error = None;
        }

        let result = operation.await;

        let mut state = self.write();
        state.loading = false;
        state.error = result.as_ref().err().map(ToString::to_string);
        result
    }

    /// Call a proxy route and return its JSON reply
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        access: Access,
        payload: Option<Payload>,
        failure_message: &str,
    ) -> Result<Value> {
        let builder = self
            .client
            .request(method, path, access)?
            .failure_message(failure_message);
        let builder = match payload {
            Some(Payload::Json(body)) => builder.json(&body)?,
            Some(Payload::Form(form)) => builder.form(form),
            None => builder,
        };
        self.client.execute(builder, access).await
    }

    /// Replace every entry with the given id, in the collection and in
    /// `current`, with the result of `f`. Other entries keep their identity.
    pub(crate) fn replace_entry<F>(&self, id: &str, f: F)
    where
        F: Fn(&Arc<Entity>) -> Arc<Entity>,
    {
        let mut state = self.write();
        for entry in state.collection.iter_mut().filter(|entity| entity.has_id(id)) {
            *entry = f(entry);
        }
        if let Some(current) = state.current.as_mut().filter(|current| current.has_id(id)) {
            *current = f(current);
        }
    }

    /// Route of one entity. The id has to stay a single path segment, so ids
    /// that would be resolved as `.`/`..` or that carry a separator, query,
    /// fragment or escape are rejected before any request.
    pub(crate) fn item_path(id: &str) -> Result<String> {
        let unsafe_id = matches!(id, "" | "." | "..") || id.contains(['/', '\\', '?', '#', '%']);
        if unsafe_id {
            return Err(Error::validation(format!("Invalid {} id", R::SINGULAR)));
        }
        Ok(format!("{}/{}", R::PATH, id))
    }

    fn expect_body(payload: Payload, expected: BodyKind, operation: &str) -> Result<Payload> {
        if payload.kind() == expected {
            Ok(payload)
        } else {
            Err(Error::validation(format!(
                "{} {} requires {}",
                R::LABEL,
                operation,
                expected.describe()
            )))
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
