//! Client core for the purchase-order manager: thin REST wrappers over the
//! order backend, and the order store that mirrors the committed list
//! locally with optimistic mutations and snapshot rollback.

use std::{collections::HashSet, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{OrderId, OrderStatus, PurchaseOrder},
    protocol::{DeleteManyResponse, EmailParsingRequest, EmailParsingResponse},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use url::Url;

pub mod drafts;
pub mod error;
pub mod view;

use error::RequestError;

/// REST wrappers over the order backend. `base` is the full API prefix,
/// e.g. `http://127.0.0.1:8000/api`.
pub struct OrdersApi {
    http: Client,
    base: Url,
}

impl OrdersApi {
    pub fn new(base: impl AsRef<str>) -> Result<Self> {
        let base = Url::parse(base.as_ref().trim_end_matches('/'))
            .context("invalid backend base URL")?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("backend base URL must be http(s): {base}");
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append percent-encoded path segments to the base URL.
    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut parts) = url.path_segments_mut() {
            parts.pop_if_empty().extend(segments);
        }
        url
    }

    fn check(response: reqwest::Response) -> Result<reqwest::Response, RequestError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(RequestError::Status { status })
        }
    }

    pub async fn list(&self) -> Result<Vec<PurchaseOrder>, RequestError> {
        let response = self.http.get(self.url_for(&["orders"])).send().await?;
        Ok(Self::check(response)?.json().await?)
    }

    pub async fn create(&self, order: &PurchaseOrder) -> Result<PurchaseOrder, RequestError> {
        let response = self
            .http
            .post(self.url_for(&["orders"]))
            .json(order)
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }

    pub async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<PurchaseOrder, RequestError> {
        let mut url = self.url_for(&["orders", id.as_str(), "status"]);
        url.query_pairs_mut().append_pair("status", status.as_str());
        let response = self.http.patch(url).send().await?;
        Ok(Self::check(response)?.json().await?)
    }

    pub async fn delete(&self, id: &OrderId) -> Result<(), RequestError> {
        let response = self
            .http
            .delete(self.url_for(&["orders", id.as_str()]))
            .send()
            .await?;
        Self::check(response)?;
        Ok(())
    }

    pub async fn delete_many(&self, ids: &[OrderId]) -> Result<DeleteManyResponse, RequestError> {
        let response = self
            .http
            .post(self.url_for(&["orders", "delete-many"]))
            .json(ids)
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }

    pub async fn parse_email(&self, email_text: &str) -> Result<EmailParsingResponse, RequestError> {
        let response = self
            .http
            .post(self.url_for(&["orders", "parse"]))
            .json(&EmailParsingRequest {
                email_text: email_text.to_string(),
            })
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }
}

/// Events fanned out to store subscribers.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// Full snapshot after any local change: load, optimistic apply,
    /// rollback, or post-save refresh.
    OrdersChanged { orders: Vec<PurchaseOrder> },
    LoadingChanged { loading: bool },
    /// Transient success notification.
    Notice(String),
    /// Transient failure notification. Local state has already been rolled
    /// back to its pre-mutation snapshot where one was taken.
    Failure(String),
}

#[derive(Default)]
struct StoreState {
    orders: Vec<PurchaseOrder>,
    loading: bool,
    last_error: Option<String>,
}

/// Local mirror of the committed order list. The backend always owns the
/// authoritative copy; this list is the last successful fetch, patched
/// optimistically by status updates and deletes.
///
/// Mutations are not queued or serialized against each other; two rapid
/// updates to the same id race at the network layer and the last response
/// wins locally.
pub struct OrderStore {
    api: OrdersApi,
    inner: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl OrderStore {
    pub fn new(api: OrdersApi) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            inner: Mutex::new(StoreState::default()),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn orders(&self) -> Vec<PurchaseOrder> {
        self.inner.lock().await.orders.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.loading
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.lock().await.last_error.clone()
    }

    async fn emit_orders(&self) {
        let orders = self.inner.lock().await.orders.clone();
        let _ = self.events.send(StoreEvent::OrdersChanged { orders });
    }

    async fn set_loading(&self, loading: bool) {
        self.inner.lock().await.loading = loading;
        let _ = self.events.send(StoreEvent::LoadingChanged { loading });
    }

    async fn restore(&self, snapshot: Vec<PurchaseOrder>) {
        self.inner.lock().await.orders = snapshot;
        self.emit_orders().await;
    }

    /// Replace the local list with the backend's. On failure the previous
    /// list stays in place; the loading flag clears on every path.
    pub async fn refresh(&self) -> Result<()> {
        self.set_loading(true).await;
        let outcome = self.api.list().await;
        let result = match outcome {
            Ok(orders) => {
                debug!(count = orders.len(), "orders: list refreshed");
                {
                    let mut guard = self.inner.lock().await;
                    guard.orders = orders;
                    guard.last_error = None;
                }
                self.emit_orders().await;
                Ok(())
            }
            Err(err) => {
                warn!("orders: list refresh failed: {err}");
                self.inner.lock().await.last_error = Some(err.to_string());
                let _ = self
                    .events
                    .send(StoreEvent::Failure(format!("Failed to fetch orders: {err}")));
                Err(err.into())
            }
        };
        self.set_loading(false).await;
        result
    }

    /// Create-or-overwrite one order. Deliberately not optimistic: the
    /// backend decides between insert and overwrite, so the list is only
    /// refreshed after the call succeeds. Failure mutates nothing locally
    /// and propagates so the caller can keep a draft staged.
    pub async fn save_order(&self, order: PurchaseOrder) -> Result<PurchaseOrder> {
        let saved = match self.api.create(&order).await {
            Ok(saved) => saved,
            Err(err) => {
                warn!(order_id = %order.id, "orders: save failed: {err}");
                let _ = self.events.send(StoreEvent::Failure(format!(
                    "Failed to save order {}: {err}",
                    order.id
                )));
                return Err(err).with_context(|| format!("failed to save order {}", order.id));
            }
        };
        info!(order_id = %saved.id, "orders: order saved");
        let _ = self
            .events
            .send(StoreEvent::Notice(format!("Order {} saved", saved.id)));
        if let Err(err) = self.refresh().await {
            warn!("orders: refresh after save failed: {err}");
        }
        Ok(saved)
    }

    /// Optimistically set the status of the order with `id`, restoring the
    /// exact pre-mutation snapshot if the backend rejects the change.
    pub async fn update_status(&self, id: &OrderId, status: OrderStatus) {
        let snapshot = {
            let mut guard = self.inner.lock().await;
            let snapshot = guard.orders.clone();
            match guard.orders.iter_mut().find(|order| order.id == *id) {
                Some(order) => order.status = status,
                None => warn!(order_id = %id, "orders: status update for unknown id"),
            }
            snapshot
        };
        self.emit_orders().await;

        match self.api.update_status(id, status).await {
            Ok(_) => {
                info!(order_id = %id, status = status.as_str(), "orders: status updated");
                let _ = self
                    .events
                    .send(StoreEvent::Notice(format!("Status updated to {status}")));
            }
            Err(err) => {
                warn!(order_id = %id, "orders: status update failed, rolling back: {err}");
                self.restore(snapshot).await;
                let _ = self
                    .events
                    .send(StoreEvent::Failure(format!("Failed to update status: {err}")));
            }
        }
    }

    /// Optimistically remove one order; restore the snapshot on failure.
    pub async fn delete_order(&self, id: &OrderId) {
        let snapshot = {
            let mut guard = self.inner.lock().await;
            let snapshot = guard.orders.clone();
            guard.orders.retain(|order| order.id != *id);
            snapshot
        };
        self.emit_orders().await;

        match self.api.delete(id).await {
            Ok(()) => {
                info!(order_id = %id, "orders: order deleted");
                let _ = self
                    .events
                    .send(StoreEvent::Notice(format!("Order {id} deleted")));
            }
            Err(err) => {
                warn!(order_id = %id, "orders: delete failed, rolling back: {err}");
                self.restore(snapshot).await;
                let _ = self
                    .events
                    .send(StoreEvent::Failure(format!("Failed to delete order: {err}")));
            }
        }
    }

    /// Optimistically remove every order in `ids`. The success notice
    /// carries the server's own count, which may differ from the local
    /// removal when some ids no longer existed; the removal is not
    /// reconciled against it.
    pub async fn delete_orders(&self, ids: &[OrderId]) {
        if ids.is_empty() {
            return;
        }
        let id_set: HashSet<OrderId> = ids.iter().cloned().collect();
        let snapshot = {
            let mut guard = self.inner.lock().await;
            let snapshot = guard.orders.clone();
            guard.orders.retain(|order| !id_set.contains(&order.id));
            snapshot
        };
        self.emit_orders().await;

        match self.api.delete_many(ids).await {
            Ok(response) => {
                info!(
                    requested = ids.len(),
                    deleted = response.deleted_count,
                    "orders: bulk delete finished"
                );
                let _ = self.events.send(StoreEvent::Notice(format!(
                    "{} order(s) deleted",
                    response.deleted_count
                )));
            }
            Err(err) => {
                warn!("orders: bulk delete failed, rolling back: {err}");
                self.restore(snapshot).await;
                let _ = self
                    .events
                    .send(StoreEvent::Failure(format!("Failed to delete orders: {err}")));
            }
        }
    }

    /// Parse raw email text into order drafts. Passthrough to the backend;
    /// the result feeds a [`drafts::DraftSession`], never this store.
    pub async fn parse_email(&self, email_text: &str) -> Result<EmailParsingResponse> {
        debug!(bytes = email_text.len(), "orders: parse requested");
        let response = self
            .api
            .parse_email(email_text)
            .await
            .context("email parsing failed")?;
        debug!(
            drafts = response.parsed_data.len(),
            warnings = response.errors.len(),
            known_existing = response.existing_ids.len(),
            "orders: parse finished"
        );
        Ok(response)
    }
}

/// Seam between UI layers and the store, so views and bridges depend on a
/// trait object rather than the concrete store.
#[async_trait]
pub trait StoreHandle: Send + Sync {
    async fn refresh(&self) -> Result<()>;
    async fn save_order(&self, order: PurchaseOrder) -> Result<PurchaseOrder>;
    async fn update_status(&self, id: &OrderId, status: OrderStatus);
    async fn delete_order(&self, id: &OrderId);
    async fn delete_orders(&self, ids: &[OrderId]);
    async fn parse_email(&self, email_text: &str) -> Result<EmailParsingResponse>;
    async fn orders(&self) -> Vec<PurchaseOrder>;
    fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent>;
}

#[async_trait]
impl StoreHandle for Arc<OrderStore> {
    async fn refresh(&self) -> Result<()> {
        OrderStore::refresh(self).await
    }

    async fn save_order(&self, order: PurchaseOrder) -> Result<PurchaseOrder> {
        OrderStore::save_order(self, order).await
    }

    async fn update_status(&self, id: &OrderId, status: OrderStatus) {
        OrderStore::update_status(self, id, status).await;
    }

    async fn delete_order(&self, id: &OrderId) {
        OrderStore::delete_order(self, id).await;
    }

    async fn delete_orders(&self, ids: &[OrderId]) {
        OrderStore::delete_orders(self, ids).await;
    }

    async fn parse_email(&self, email_text: &str) -> Result<EmailParsingResponse> {
        OrderStore::parse_email(self, email_text).await
    }

    async fn orders(&self) -> Vec<PurchaseOrder> {
        OrderStore::orders(self).await
    }

    fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
