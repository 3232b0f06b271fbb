//! Collection stores.
//!
//! A [`CollectionStore`] mirrors one backend table scoped to the signed-in user. Every
//! mutation is write-then-reflect: the remote write goes first and the local list is
//! patched only when it succeeds. The list lock is never held across a network call, so
//! mutations on one store are not serialized against each other.

mod reconcile;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::errors::AppError;
use crate::gateway::{AuthState, RestGateway};

/// A row type a collection store can mirror.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Writable columns, without id and owner.
    type Input: Clone + Send + Sync + Serialize + 'static;

    /// Backend table name.
    const TABLE: &'static str;
    /// Human-readable name used in messages.
    const LABEL: &'static str;

    fn id(&self) -> i64;
    fn owner(&self) -> Uuid;
    fn is_favorite(&self) -> bool;
    fn set_favorite(&mut self, favorite: bool);
    /// Whether the record matches an already lowercased search term.
    fn matches(&self, needle: &str) -> bool;
    fn changes(&self) -> Self::Input;
}

/// Load state of a collection store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    Uninitialized,
    Loading,
    Ready,
}

/// Body of an insert or full update: the writable columns plus the owner.
#[derive(Serialize)]
struct OwnedRow<'a, I: Serialize> {
    user_id: Uuid,
    #[serde(flatten)]
    fields: &'a I,
}

struct Inner<R> {
    owner: Option<Uuid>,
    items: Vec<R>,
}

/// In-memory mirror of one user-scoped backend table.
pub struct CollectionStore<R: Record> {
    gateway: Arc<RestGateway>,
    inner: RwLock<Inner<R>>,
    state: watch::Sender<StoreState>,
    /// Owner whose latest load has finished, successfully or not.
    settled: watch::Sender<Option<Uuid>>,
}

impl<R: Record> CollectionStore<R> {
    pub fn new(gateway: Arc<RestGateway>) -> Self {
        let (state, _) = watch::channel(StoreState::Uninitialized);
        let (settled, _) = watch::channel(None);
        Self {
            gateway,
            inner: RwLock::new(Inner {
                owner: None,
                items: Vec::new(),
            }),
            state,
            settled,
        }
    }

    pub fn state(&self) -> StoreState {
        *self.state.borrow()
    }

    pub fn is_loading(&self) -> bool {
        self.state() != StoreState::Ready
    }

    /// Wait until a load for `owner` has finished.
    ///
    /// Resolves after a failed load too; the store then stays in `Loading`. A list
    /// still settled for a previous account does not count.
    pub async fn settled_for(&self, owner: Uuid) {
        let mut settled = self.settled.subscribe();
        let _ = settled.wait_for(|current| *current == Some(owner)).await;
    }

    /// Replace the whole list with the rows `owner` has on the backend.
    ///
    /// Rows of a previous owner are dropped before the request. On failure the store
    /// stays in `Loading`; nothing retries.
    pub async fn load(&self, owner: Uuid) -> Result<(), AppError> {
        {
            let mut inner = self.inner.write().await;
            if inner.owner != Some(owner) {
                inner.items.clear();
            }
            inner.owner = Some(owner);
            self.state.send_replace(StoreState::Loading);
            self.settled.send_replace(None);
        }

        let result = self.gateway.select_owned(R::TABLE, owner).await;

        let mut inner = self.inner.write().await;
        let current = inner.owner == Some(owner);
        let rows: Vec<R> = match result {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(table = R::TABLE, "Error fetching {}s: {}", R::LABEL, e);
                if current {
                    self.settled.send_replace(Some(owner));
                }
                return Err(e);
            }
        };
        if !current {
            tracing::debug!(table = R::TABLE, "Session changed during load, discarding rows");
            return Ok(());
        }
        tracing::info!(table = R::TABLE, count = rows.len(), "Loaded {}s", R::LABEL);
        inner.items = rows;
        self.state.send_replace(StoreState::Ready);
        self.settled.send_replace(Some(owner));
        Ok(())
    }

    /// Forget everything; used when the session ends.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.owner = None;
        inner.items.clear();
        self.state.send_replace(StoreState::Uninitialized);
        self.settled.send_replace(None);
    }

    /// Insert a record for the current owner and prepend the stored row.
    pub async fn add(&self, input: R::Input) -> Result<R, AppError> {
        let owner = self
            .inner
            .read()
            .await
            .owner
            .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))?;

        let body = OwnedRow {
            user_id: owner,
            fields: &input,
        };
        let row: R = match self.gateway.insert(R::TABLE, &body).await {
            Ok(row) => row,
            Err(e) => {
                tracing::error!(table = R::TABLE, "Error saving {}: {}", R::LABEL, e);
                return Err(e);
            }
        };

        let mut inner = self.inner.write().await;
        reconcile::prepend(&mut inner.items, row.clone());
        Ok(row)
    }

    /// Replace every writable column of `record` and reflect the stored row.
    pub async fn update(&self, record: R) -> Result<R, AppError> {
        let changes = record.changes();
        let body = OwnedRow {
            user_id: record.owner(),
            fields: &changes,
        };
        let row: R = match self.gateway.update(R::TABLE, record.id(), &body).await {
            Ok(row) => row,
            Err(e) => {
                tracing::error!(table = R::TABLE, id = record.id(), "Error updating {}: {}", R::LABEL, e);
                return Err(e);
            }
        };

        let mut inner = self.inner.write().await;
        reconcile::replace(&mut inner.items, record.id(), row.clone());
        Ok(row)
    }

    /// Delete a record remotely, then drop it locally if present.
    pub async fn remove(&self, id: i64) -> Result<(), AppError> {
        if let Err(e) = self.gateway.delete(R::TABLE, id).await {
            tracing::error!(table = R::TABLE, id, "Error deleting {}: {}", R::LABEL, e);
            return Err(e);
        }

        let mut inner = self.inner.write().await;
        reconcile::remove(&mut inner.items, id);
        Ok(())
    }

    /// Flip the favorite flag and return the new value.
    ///
    /// The negation is computed from the local copy before the request is sent, so two
    /// toggles in flight at once both write the same value and one of them is lost.
    pub async fn toggle_favorite(&self, id: i64) -> Result<bool, AppError> {
        let current = self
            .inner
            .read()
            .await
            .items
            .iter()
            .find(|r| r.id() == id)
            .map(|r| r.is_favorite())
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", R::LABEL, id)))?;

        let favorite = !current;
        if let Err(e) = self
            .gateway
            .patch(R::TABLE, id, &json!({ "isFavorite": favorite }))
            .await
        {
            tracing::error!(table = R::TABLE, id, "Error updating favorite: {}", e);
            return Err(e);
        }

        let mut inner = self.inner.write().await;
        reconcile::set_favorite(&mut inner.items, id, favorite);
        Ok(favorite)
    }

    pub async fn list(&self) -> Vec<R> {
        self.inner.read().await.items.clone()
    }

    pub async fn get(&self, id: i64) -> Option<R> {
        self.inner
            .read()
            .await
            .items
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    pub async fn favorites(&self) -> Vec<R> {
        self.inner
            .read()
            .await
            .items
            .iter()
            .filter(|r| r.is_favorite())
            .cloned()
            .collect()
    }

    /// Case-insensitive search; an empty term matches everything.
    pub async fn search(&self, term: &str) -> Vec<R> {
        let inner = self.inner.read().await;
        reconcile::filter(&inner.items, term)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.items.len()
    }

    pub async fn favorite_count(&self) -> usize {
        self.inner
            .read()
            .await
            .items
            .iter()
            .filter(|r| r.is_favorite())
            .count()
    }

    /// Follow the session: reload on a new identity, clear on sign-out.
    pub fn follow_session(self: Arc<Self>, mut changes: watch::Receiver<AuthState>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let owner = changes
                    .borrow_and_update()
                    .session
                    .as_ref()
                    .map(|s| s.user.id);
                self.sync_owner(owner).await;

                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    async fn sync_owner(&self, owner: Option<Uuid>) {
        let loaded_for = self.inner.read().await.owner;

        match owner {
            None if loaded_for.is_some() || self.state() != StoreState::Uninitialized => {
                self.clear().await;
            }
            None => {}
            // Token refresh or profile edit for the same account
            Some(owner) if loaded_for == Some(owner) => {}
            // Errors are logged by `load`; the store stays in Loading
            Some(owner) => {
                let _ = self.load(owner).await;
            }
        }
    }
}
