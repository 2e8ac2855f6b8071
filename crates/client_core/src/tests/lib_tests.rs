use super::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete as del, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct MockBackend {
    inner: Arc<std::sync::Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    orders: Vec<PurchaseOrder>,
    /// When set, every handler answers 500 (400 for parse, matching the
    /// real backend's all-failed parse behavior).
    fail_requests: bool,
    parse_response: EmailParsingResponse,
    status_calls: Vec<(String, OrderStatus)>,
}

impl MockBackend {
    fn with_orders(orders: Vec<PurchaseOrder>) -> Self {
        let backend = Self::default();
        backend.inner.lock().expect("mock state").orders = orders;
        backend
    }

    fn set_failing(&self, failing: bool) {
        self.inner.lock().expect("mock state").fail_requests = failing;
    }

    fn orders(&self) -> Vec<PurchaseOrder> {
        self.inner.lock().expect("mock state").orders.clone()
    }
}

async fn list_orders(
    State(backend): State<MockBackend>,
) -> Result<Json<Vec<PurchaseOrder>>, StatusCode> {
    let state = backend.inner.lock().expect("mock state");
    if state.fail_requests {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(state.orders.clone()))
}

async fn create_order(
    State(backend): State<MockBackend>,
    Json(order): Json<PurchaseOrder>,
) -> Result<Json<PurchaseOrder>, StatusCode> {
    let mut state = backend.inner.lock().expect("mock state");
    if state.fail_requests {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    if let Some(existing) = state.orders.iter_mut().find(|o| o.id == order.id) {
        *existing = order.clone();
    } else {
        state.orders.push(order.clone());
    }
    Ok(Json(order))
}

#[derive(Deserialize)]
struct StatusQuery {
    status: OrderStatus,
}

async fn update_order_status(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<PurchaseOrder>, StatusCode> {
    let mut state = backend.inner.lock().expect("mock state");
    if state.fail_requests {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    state.status_calls.push((id.clone(), query.status));
    let order = state
        .orders
        .iter_mut()
        .find(|o| o.id.as_str() == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    order.status = query.status;
    Ok(Json(order.clone()))
}

async fn delete_order(State(backend): State<MockBackend>, Path(id): Path<String>) -> StatusCode {
    let mut state = backend.inner.lock().expect("mock state");
    if state.fail_requests {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let before = state.orders.len();
    state.orders.retain(|o| o.id.as_str() != id);
    if state.orders.len() < before {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn delete_many_orders(
    State(backend): State<MockBackend>,
    Json(ids): Json<Vec<OrderId>>,
) -> Result<Json<DeleteManyResponse>, StatusCode> {
    let mut state = backend.inner.lock().expect("mock state");
    if state.fail_requests {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let before = state.orders.len();
    state.orders.retain(|o| !ids.contains(&o.id));
    Ok(Json(DeleteManyResponse {
        deleted_count: (before - state.orders.len()) as u64,
    }))
}

async fn parse_email_text(
    State(backend): State<MockBackend>,
    Json(_request): Json<EmailParsingRequest>,
) -> Result<Json<EmailParsingResponse>, StatusCode> {
    let state = backend.inner.lock().expect("mock state");
    if state.fail_requests {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(state.parse_response.clone()))
}

async fn spawn_backend(backend: MockBackend) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/delete-many", post(delete_many_orders))
        .route("/api/orders/parse", post(parse_email_text))
        .route("/api/orders/:id/status", patch(update_order_status))
        .route("/api/orders/:id", del(delete_order))
        .with_state(backend);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api")
}

fn order(id: &str, supplier: &str, status: OrderStatus) -> PurchaseOrder {
    PurchaseOrder {
        id: OrderId::new(id),
        supplier: supplier.to_string(),
        items: "100x Widget A".to_string(),
        expected_date: Some("Jan 15, 2024".to_string()),
        status,
        last_updated: "Jan 2, 2024".to_string(),
        additional_context: None,
    }
}

async fn store_with(backend: &MockBackend) -> Arc<OrderStore> {
    let base = spawn_backend(backend.clone()).await;
    OrderStore::new(OrdersApi::new(base).expect("api"))
}

fn drain_events(rx: &mut broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn notices(events: &[StoreEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            StoreEvent::Notice(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}

fn failures(events: &[StoreEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            StoreEvent::Failure(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn base_url_must_be_http() {
    assert!(OrdersApi::new("http://127.0.0.1:8000/api").is_ok());
    assert!(OrdersApi::new("ftp://127.0.0.1/api").is_err());
    assert!(OrdersApi::new("not a url").is_err());
}

#[tokio::test]
async fn refresh_replaces_list_and_clears_loading() {
    let backend = MockBackend::with_orders(vec![
        order("PO-1", "Acme Corp", OrderStatus::OnTrack),
        order("PO-2", "Beta Inc", OrderStatus::Shipped),
    ]);
    let store = store_with(&backend).await;

    store.refresh().await.expect("refresh");

    let orders = store.orders().await;
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id, OrderId::new("PO-1"));
    assert!(!store.is_loading().await);
    assert_eq!(store.last_error().await, None);
}

#[tokio::test]
async fn refresh_failure_keeps_previous_list_and_flags_error() {
    let backend = MockBackend::with_orders(vec![order("PO-1", "Acme Corp", OrderStatus::OnTrack)]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("initial refresh");

    backend.set_failing(true);
    let mut rx = store.subscribe();
    let result = store.refresh().await;

    assert!(result.is_err());
    let orders = store.orders().await;
    assert_eq!(orders.len(), 1, "previous list must survive a failed load");
    assert!(store.last_error().await.is_some());
    assert!(!store.is_loading().await, "loading must clear on failure too");
    let events = drain_events(&mut rx);
    assert_eq!(failures(&events).len(), 1);
}

#[tokio::test]
async fn update_status_changes_only_the_target_order() {
    let backend = MockBackend::with_orders(vec![
        order("PO-1", "Acme Corp", OrderStatus::OnTrack),
        order("PO-2", "Beta Inc", OrderStatus::OnTrack),
    ]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");
    let before = store.orders().await;
    let mut rx = store.subscribe();

    store
        .update_status(&OrderId::new("PO-2"), OrderStatus::Shipped)
        .await;

    let after = store.orders().await;
    assert_eq!(after[0], before[0], "untouched order must not change");
    assert_eq!(after[1].status, OrderStatus::Shipped);
    assert_eq!(
        notices(&drain_events(&mut rx)),
        vec!["Status updated to Shipped".to_string()]
    );
    let calls = backend.inner.lock().expect("mock state").status_calls.clone();
    assert_eq!(calls, vec![("PO-2".to_string(), OrderStatus::Shipped)]);
}

#[tokio::test]
async fn update_status_failure_restores_exact_snapshot() {
    let backend = MockBackend::with_orders(vec![
        order("PO-1", "Acme Corp", OrderStatus::OnTrack),
        order("PO-2", "Beta Inc", OrderStatus::ProductDelays),
    ]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");
    let before = store.orders().await;

    backend.set_failing(true);
    let mut rx = store.subscribe();
    store
        .update_status(&OrderId::new("PO-1"), OrderStatus::ShipmentDelay)
        .await;

    assert_eq!(store.orders().await, before, "rollback must be exact");
    assert_eq!(failures(&drain_events(&mut rx)).len(), 1);
}

#[tokio::test]
async fn update_status_encodes_the_status_literal_in_the_query() {
    let backend = MockBackend::with_orders(vec![order("PO 7", "Acme Corp", OrderStatus::OnTrack)]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");

    // Both the id path segment and the "Product Delays" query value carry
    // spaces and must survive percent-encoding.
    store
        .update_status(&OrderId::new("PO 7"), OrderStatus::ProductDelays)
        .await;

    let calls = backend.inner.lock().expect("mock state").status_calls.clone();
    assert_eq!(calls, vec![("PO 7".to_string(), OrderStatus::ProductDelays)]);
}

#[tokio::test]
async fn delete_order_removes_by_id() {
    let backend = MockBackend::with_orders(vec![
        order("PO-1", "Acme Corp", OrderStatus::OnTrack),
        order("PO-2", "Beta Inc", OrderStatus::Shipped),
    ]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");

    store.delete_order(&OrderId::new("PO-1")).await;

    let orders = store.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, OrderId::new("PO-2"));
    assert_eq!(backend.orders().len(), 1);
}

#[tokio::test]
async fn delete_order_failure_restores_snapshot() {
    let backend = MockBackend::with_orders(vec![order("PO-1", "Acme Corp", OrderStatus::OnTrack)]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");
    let before = store.orders().await;

    backend.set_failing(true);
    store.delete_order(&OrderId::new("PO-1")).await;

    assert_eq!(store.orders().await, before);
}

#[tokio::test]
async fn delete_many_removes_all_requested_ids_even_when_server_count_differs() {
    // Only PO-A exists server-side; the optimistic removal still drops both
    // requested ids locally and the notice reports the server's count.
    let backend = MockBackend::with_orders(vec![order("PO-A", "Acme Corp", OrderStatus::OnTrack)]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");
    {
        let mut guard = store.inner.lock().await;
        guard.orders.push(order("PO-B", "Beta Inc", OrderStatus::Shipped));
    }

    let mut rx = store.subscribe();
    store
        .delete_orders(&[OrderId::new("PO-A"), OrderId::new("PO-B")])
        .await;

    assert!(store.orders().await.is_empty());
    assert_eq!(
        notices(&drain_events(&mut rx)),
        vec!["1 order(s) deleted".to_string()]
    );
}

#[tokio::test]
async fn delete_many_failure_restores_snapshot() {
    let backend = MockBackend::with_orders(vec![
        order("PO-1", "Acme Corp", OrderStatus::OnTrack),
        order("PO-2", "Beta Inc", OrderStatus::Shipped),
        order("PO-3", "Gamma LLC", OrderStatus::ShipmentDelay),
    ]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");
    let before = store.orders().await;

    backend.set_failing(true);
    store
        .delete_orders(&[OrderId::new("PO-1"), OrderId::new("PO-3")])
        .await;

    assert_eq!(store.orders().await, before);
}

#[tokio::test]
async fn delete_many_with_no_ids_is_a_no_op() {
    let backend = MockBackend::with_orders(vec![order("PO-1", "Acme Corp", OrderStatus::OnTrack)]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");

    backend.set_failing(true);
    let mut rx = store.subscribe();
    store.delete_orders(&[]).await;

    assert!(drain_events(&mut rx).is_empty(), "no call, no events");
    assert_eq!(store.orders().await.len(), 1);
}

#[tokio::test]
async fn save_order_refreshes_the_authoritative_list() {
    let backend = MockBackend::with_orders(vec![order("PO-1", "Acme Corp", OrderStatus::OnTrack)]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");

    // Overwrite semantics live server-side: saving an existing id must end
    // with the re-fetched list, not a local guess.
    let mut replacement = order("PO-1", "Acme Corporation", OrderStatus::Shipped);
    replacement.items = "200x Widget A".to_string();
    store.save_order(replacement).await.expect("save");

    let orders = store.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].supplier, "Acme Corporation");
    assert_eq!(orders[0].status, OrderStatus::Shipped);
}

#[tokio::test]
async fn save_order_failure_propagates_and_leaves_list_untouched() {
    let backend = MockBackend::with_orders(vec![order("PO-1", "Acme Corp", OrderStatus::OnTrack)]);
    let store = store_with(&backend).await;
    store.refresh().await.expect("refresh");
    let before = store.orders().await;

    backend.set_failing(true);
    let result = store
        .save_order(order("PO-2", "Beta Inc", OrderStatus::OnTrack))
        .await;

    assert!(result.is_err(), "save must rethrow so drafts stay staged");
    assert_eq!(store.orders().await, before);
}

#[tokio::test]
async fn parse_email_decodes_drafts_warnings_and_existing_ids() {
    let backend = MockBackend::default();
    backend.inner.lock().expect("mock state").parse_response = EmailParsingResponse {
        parsed_data: vec![order("PO-1", "Acme Corp", OrderStatus::OnTrack)],
        errors: vec!["Failed to parse order 'entry 2': missing id".to_string()],
        existing_ids: vec![OrderId::new("PO-1")],
    };
    let store = store_with(&backend).await;

    let response = store
        .parse_email("From: orders@acme.example\nPO-1 is on track.")
        .await
        .expect("parse");

    assert_eq!(response.parsed_data.len(), 1);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.existing_ids, vec![OrderId::new("PO-1")]);
}

#[tokio::test]
async fn parse_email_rejection_surfaces_the_status_line() {
    let backend = MockBackend::default();
    backend.set_failing(true);
    let store = store_with(&backend).await;

    let err = store
        .parse_email("not an email")
        .await
        .expect_err("parse must fail");
    let chain = format!("{err:#}");
    assert!(chain.contains("400"), "unexpected error: {chain}");
}
