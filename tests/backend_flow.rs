//! End-to-end flows against an in-process fake backend.
//!
//! The fake is an axum router bound to an ephemeral port; every request is
//! recorded so tests can assert on call order, bodies and headers.

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use agentdesk::admin::{ActionOutcome, AdminError, AdminPanel, DeleteOutcome, FixedAnswer};
use agentdesk::api::{ApiClient, ClientConfig, SiteInput, UserId};
use agentdesk::dashboard::SalesWidget;
use agentdesk::notify::{NotificationLevel, Notifier};
use agentdesk::session::{ChangeOutcome, RefreshOutcome, SessionTracker, START_FAILED_MESSAGE};
use agentdesk::status::{PauseKind, StatusCatalog, StatusStore};

#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<String>>,
    bodies: Mutex<Vec<(String, Value)>>,
    auth: Mutex<Vec<Option<String>>>,
    request_ids: Mutex<Vec<String>>,
    queries: Mutex<Vec<String>>,
    snapshot: Mutex<Value>,
    fail_start: AtomicBool,
    fail_sales: AtomicBool,
    /// Role returned by `/users/me`; empty means SuperAdmin
    role: Mutex<String>,
}

impl FakeBackend {
    fn with_snapshot(snapshot: Value) -> Arc<Self> {
        let backend = Self::default();
        *backend.snapshot.lock().unwrap() = snapshot;
        Arc::new(backend)
    }

    fn record(&self, call: impl Into<String>, headers: &HeaderMap) {
        self.calls.lock().unwrap().push(call.into());
        self.auth.lock().unwrap().push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
            self.request_ids.lock().unwrap().push(id.to_string());
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn body_of(&self, call: &str) -> Option<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == call)
            .map(|(_, body)| body.clone())
    }
}

type Shared = Arc<FakeBackend>;

async fn live(State(b): State<Shared>, Path(id): Path<String>, headers: HeaderMap) -> Json<Value> {
    b.record(format!("live:{}", id), &headers);
    Json(b.snapshot.lock().unwrap().clone())
}

async fn close(State(b): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("close", &headers);
    b.bodies.lock().unwrap().push(("close".to_string(), body));
    Json(json!({"message": "Session fermée"})).into_response()
}

async fn start(State(b): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("start", &headers);
    b.bodies.lock().unwrap().push(("start".to_string(), body.clone()));

    if b.fail_start.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"}))).into_response();
    }

    let mut snapshot = b.snapshot.lock().unwrap();
    if let Some(obj) = snapshot.as_object_mut() {
        obj.insert("statut_actuel".to_string(), body["status"].clone());
    }
    StatusCode::CREATED.into_response()
}

async fn sales(State(b): State<Shared>, headers: HeaderMap) -> Response {
    b.record("sales", &headers);
    if b.fail_sales.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(json!({
        "Awa Diallo": {"S1": 2, "S2": 3},
        "Binta Sow": {"S1": 7, "S2": 0},
        "Zero": {"S1": 0}
    }))
    .into_response()
}

async fn me(State(b): State<Shared>, headers: HeaderMap) -> Json<Value> {
    b.record("me", &headers);
    let role = match b.role.lock().unwrap().as_str() {
        "" => "SuperAdmin".to_string(),
        other => other.to_string(),
    };
    Json(json!({
        "id": 1,
        "firstname": "Sophie",
        "lastname": "Martin",
        "email": "sophie@ex.fr",
        "role": role,
        "site_name": "Paris",
        "profil": "Superviseur",
        "created_at": "2023-09-01T10:00:00Z"
    }))
}

async fn list_users(
    State(b): State<Shared>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Json<Value> {
    b.record("users", &headers);
    b.queries.lock().unwrap().push(query.unwrap_or_default());
    Json(json!({
        "users": [
            {"id": 5, "firstname": "Awa", "lastname": "Diallo", "role": "Agent", "site_id": 1},
            {"id": 6, "firstname": "Binta", "lastname": "Sow", "role": "Agent", "site_id": 2, "active": false}
        ],
        "total": 2
    }))
}

async fn delete_user(State(b): State<Shared>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    b.record(format!("delete:{}", id), &headers);
    match id.as_str() {
        "5" => Json(json!({"message": "Agent désactivé : des ventes sont liées"})).into_response(),
        "6" => Json(json!({"message": "Utilisateur supprimé"})).into_response(),
        "7" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html><body>Internal Server Error</body></html>",
        )
            .into_response(),
        "8" => (StatusCode::CONFLICT, Json(json!({"error": "Agent lié à des ventes"}))).into_response(),
        _ => (StatusCode::BAD_REQUEST, Json(json!({"message": "Agent introuvable"}))).into_response(),
    }
}

async fn toggle_active(
    State(b): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let call = format!("toggle:{}", id);
    b.record(call.clone(), &headers);
    b.bodies.lock().unwrap().push((call, body));
    match id.as_str() {
        "5" | "6" => Json(json!({"message": "Statut mis à jour"})).into_response(),
        "1" => (StatusCode::FORBIDDEN, Json(json!({"error": "Compte protégé"}))).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn list_sites(State(b): State<Shared>, headers: HeaderMap) -> Json<Value> {
    b.record("sites", &headers);
    Json(json!([
        {"id": 1, "code": "PAR", "name": "Paris"},
        {"id": 2, "code": "DKR", "name": "Dakar"}
    ]))
}

async fn create_site(State(b): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> StatusCode {
    b.record("sites:post", &headers);
    b.bodies.lock().unwrap().push(("sites:post".to_string(), body));
    StatusCode::CREATED
}

async fn update_site(
    State(b): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let call = format!("sites:put:{}", id);
    b.record(call.clone(), &headers);
    b.bodies.lock().unwrap().push((call, body));
    StatusCode::OK
}

async fn remove_site(State(b): State<Shared>, Path(id): Path<String>, headers: HeaderMap) -> StatusCode {
    b.record(format!("sites:delete:{}", id), &headers);
    StatusCode::NO_CONTENT
}

async fn spawn_backend(backend: Shared) -> String {
    let app = Router::new()
        .route("/api/session_agents/user/live/:id", get(live))
        .route("/api/session_agents/close", post(close))
        .route("/api/session_agents/start", post(start))
        .route("/api/sales/monthly-agents-charthorizontal", get(sales))
        .route("/api/users/me", get(me))
        .route("/api/users", get(list_users))
        .route("/api/users/:id/delete-users", delete(delete_user))
        .route("/api/users/:id/toggle-active", put(toggle_active))
        .route("/api/sites", get(list_sites).post(create_site))
        .route("/api/sites/:id", put(update_site).delete(remove_site))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn client(base_url: String, token: Option<&str>) -> ApiClient {
    ApiClient::new(ClientConfig {
        base_url,
        token: token.map(str::to_string),
        request_timeout_secs: 5,
    })
    .unwrap()
}

fn tracker(client: ApiClient, notifier: Notifier, user: Option<u64>) -> SessionTracker {
    SessionTracker::new(
        Arc::new(client),
        StatusCatalog::default(),
        Arc::new(StatusStore::new()),
        notifier,
        user.map(UserId::from),
    )
}

fn available_snapshot() -> Value {
    json!({
        "statut_actuel": "Disponible",
        "session_start_time": "2024-05-02T08:00:00Z",
        "cumul_statuts": {"Disponible": 3600, "Pause": 300, "Inconnu": 10}
    })
}

// ============================================
// Sessions
// ============================================

#[tokio::test]
async fn test_refresh_applies_live_snapshot() {
    let backend = FakeBackend::with_snapshot(available_snapshot());
    let url = spawn_backend(backend.clone()).await;
    let tracker = tracker(client(url, None), Notifier::new(), Some(42));

    let outcome = tracker.refresh_current().await;
    assert_eq!(outcome, RefreshOutcome::Applied { active: true });

    let state = tracker.state().await;
    assert_eq!(state.timers.get("available"), Some(&3600));
    assert_eq!(state.timers.get("pause"), Some(&300));
    assert_eq!(state.timers.len(), 2);
    assert_eq!(tracker.store().current().as_deref(), Some("Disponible"));
    assert_eq!(
        state.current_session.map(|s| s.status),
        Some("Disponible".to_string())
    );
    assert_eq!(backend.calls(), vec!["live:42"]);
}

#[tokio::test]
async fn test_null_snapshot_keeps_state() {
    let backend = FakeBackend::with_snapshot(Value::Null);
    let url = spawn_backend(backend).await;
    let tracker = tracker(client(url, None), Notifier::new(), Some(42));

    assert_eq!(tracker.refresh_current().await, RefreshOutcome::Empty);
    assert!(tracker.state().await.timers.is_empty());
    assert_eq!(tracker.store().current(), None);
}

#[tokio::test]
async fn test_change_status_closes_then_starts() {
    let backend = FakeBackend::with_snapshot(available_snapshot());
    let url = spawn_backend(backend.clone()).await;
    let tracker = tracker(client(url, Some("secret")), Notifier::new(), Some(42));

    let outcome = tracker.change_status("Pause", Some(PauseKind::Lunch)).await;
    assert_eq!(
        outcome,
        ChangeOutcome::Persisted(RefreshOutcome::Applied { active: true })
    );

    assert_eq!(backend.calls(), vec!["close", "start", "live:42"]);
    assert_eq!(backend.body_of("close"), Some(json!({"user_id": 42})));
    assert_eq!(
        backend.body_of("start"),
        Some(json!({"user_id": 42, "status": "Pause", "pause_type": "lunch"}))
    );
    assert_eq!(tracker.store().current().as_deref(), Some("Pause"));
}

#[tokio::test]
async fn test_start_failure_notifies_and_keeps_optimistic_status() {
    let backend = FakeBackend::with_snapshot(available_snapshot());
    backend.fail_start.store(true, Ordering::SeqCst);
    let url = spawn_backend(backend.clone()).await;
    let notifier = Notifier::new();
    let mut toasts = notifier.subscribe();
    let tracker = tracker(client(url, None), notifier, Some(42));

    let outcome = tracker.change_status("Réunion", None).await;
    assert_eq!(outcome, ChangeOutcome::StartFailed);
    assert_eq!(tracker.store().current().as_deref(), Some("Réunion"));
    assert_eq!(backend.calls(), vec!["close", "start"]);
    assert_eq!(
        backend.body_of("start"),
        Some(json!({"user_id": 42, "status": "Réunion"}))
    );

    let toast = toasts.try_recv().unwrap();
    assert_eq!(toast.level, NotificationLevel::Error);
    assert_eq!(toast.message, START_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_bearer_token_and_request_id_sent() {
    let backend = FakeBackend::with_snapshot(available_snapshot());
    let url = spawn_backend(backend.clone()).await;
    let authed = tracker(client(url.clone(), Some("secret")), Notifier::new(), Some(42));
    authed.refresh_current().await;

    let anonymous = tracker(client(url, None), Notifier::new(), Some(42));
    anonymous.refresh_current().await;

    let auth = backend.auth.lock().unwrap().clone();
    assert_eq!(auth, vec![Some("Bearer secret".to_string()), None]);

    let ids = backend.request_ids.lock().unwrap().clone();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_logout_closes_and_clears() {
    let backend = FakeBackend::with_snapshot(available_snapshot());
    let url = spawn_backend(backend.clone()).await;
    let tracker = tracker(client(url, None), Notifier::new(), Some(42));

    tracker.refresh_current().await;
    tracker.logout().await;

    assert_eq!(backend.calls(), vec!["live:42", "close"]);
    assert_eq!(tracker.store().current(), None);
    assert!(tracker.state().await.timers.is_empty());
}

// ============================================
// Sales
// ============================================

#[tokio::test]
async fn test_sales_widget_loads_ranking() {
    let backend = Arc::new(FakeBackend::default());
    let url = spawn_backend(backend.clone()).await;
    let client = client(url, None);

    let mut widget = SalesWidget::new();
    assert!(widget.load(&client).await);

    let names: Vec<&str> = widget.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Binta Sow", "Awa Diallo"]);
    assert_eq!(widget.entries()[0].value, 7.0);
    assert_eq!(widget.entries()[0].percent, 58.3);
    assert_eq!(widget.entries()[1].percent, 41.7);

    backend.fail_sales.store(true, Ordering::SeqCst);
    assert!(!widget.load(&client).await);
    assert_eq!(widget.entries().len(), 2);
}

// ============================================
// Administration
// ============================================

async fn loaded_panel(answer: bool) -> (AdminPanel, Shared, Notifier) {
    loaded_panel_as("", answer).await
}

async fn loaded_panel_as(role: &str, answer: bool) -> (AdminPanel, Shared, Notifier) {
    let backend = Arc::new(FakeBackend::default());
    *backend.role.lock().unwrap() = role.to_string();
    let url = spawn_backend(backend.clone()).await;
    let notifier = Notifier::new();
    let mut panel = AdminPanel::new(
        client(url, Some("admin-token")),
        notifier.clone(),
        Arc::new(FixedAnswer(answer)),
    );
    panel.load().await.unwrap();
    (panel, backend, notifier)
}

#[tokio::test]
async fn test_panel_load_for_super_admin() {
    let (panel, backend, _) = loaded_panel(true).await;

    assert!(panel.can_manage_agents());
    assert!(panel.can_manage_sites());
    assert_eq!(panel.agents().len(), 2);
    assert_eq!(panel.sites().len(), 2);
    assert_eq!(panel.site_badge("2").map(|b| b.name.as_str()), Some("Dakar"));
    assert_eq!(backend.calls(), vec!["me", "users", "sites"]);

    let query = backend.queries.lock().unwrap()[0].clone();
    assert!(query.contains("page=1"));
    assert!(query.contains("limit=1000"));

    let me = panel.current_user().unwrap();
    assert_eq!(me.site_name.as_deref(), Some("Paris"));
    assert_eq!(me.profil.as_deref(), Some("Superviseur"));
    assert!(me.created_at.is_some());
    assert!(panel.agents()[0].is_active());
    assert!(!panel.agents()[1].is_active());
}

#[tokio::test]
async fn test_delete_agent_outcomes() {
    let (mut panel, backend, notifier) = loaded_panel(true).await;
    let mut toasts = notifier.subscribe();

    let outcome = panel.delete_agent(&UserId::from(5)).await.unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::Done(DeleteOutcome::Deactivated(_))
    ));
    assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Info);

    let outcome = panel.delete_agent(&UserId::from(6)).await.unwrap();
    assert_eq!(
        outcome,
        ActionOutcome::Done(DeleteOutcome::Deleted("Utilisateur supprimé".to_string()))
    );
    assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Success);

    // Successful deletes refetch the list
    let calls = backend.calls();
    assert_eq!(&calls[3..], &["delete:5", "users", "delete:6", "users"]);
}

#[tokio::test]
async fn test_delete_agent_failure_toasts() {
    let (mut panel, backend, notifier) = loaded_panel(true).await;
    let mut toasts = notifier.subscribe();

    // Only the server's `error` field is shown; anything else gets the fallback
    for (id, expected) in [
        (9, "Erreur lors de la suppression"),
        (7, "Erreur lors de la suppression"),
        (8, "Agent lié à des ventes"),
    ] {
        let outcome = panel.delete_agent(&UserId::from(id)).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Failed);
        let toast = toasts.try_recv().unwrap();
        assert_eq!(toast.level, NotificationLevel::Error);
        assert_eq!(toast.message, expected);
    }

    // Failures do not refetch
    let calls = backend.calls();
    assert_eq!(&calls[3..], &["delete:9", "delete:7", "delete:8"]);
}

#[tokio::test]
async fn test_toggle_agent_active() {
    let (mut panel, backend, notifier) = loaded_panel(true).await;
    let mut toasts = notifier.subscribe();

    // Agent 5 has no `active` field and counts as active
    let outcome = panel.toggle_agent_active(&UserId::from(5)).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Done(false));
    assert_eq!(backend.body_of("toggle:5"), Some(json!({"active": false})));
    let toast = toasts.try_recv().unwrap();
    assert_eq!(toast.level, NotificationLevel::Success);
    assert_eq!(toast.message, "Compte verrouillé");

    let outcome = panel.toggle_agent_active(&UserId::from(6)).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Done(true));
    assert_eq!(backend.body_of("toggle:6"), Some(json!({"active": true})));
    assert_eq!(toasts.try_recv().unwrap().message, "Compte déverrouillé");

    let outcome = panel.toggle_agent_active(&UserId::from(1)).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Failed);
    assert_eq!(toasts.try_recv().unwrap().message, "Compte protégé");

    let outcome = panel.toggle_agent_active(&UserId::from(3)).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Failed);
    assert_eq!(
        toasts.try_recv().unwrap().message,
        "Erreur lors du changement de statut"
    );

    let calls = backend.calls();
    assert_eq!(
        &calls[3..],
        &["toggle:5", "users", "toggle:6", "users", "toggle:1", "toggle:3"]
    );
}

#[tokio::test]
async fn test_delete_cancelled_sends_nothing() {
    let (mut panel, backend, _) = loaded_panel(false).await;

    let outcome = panel.delete_agent(&UserId::from(5)).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Cancelled);
    assert!(!backend.calls().iter().any(|c| c.starts_with("delete")));
}

#[tokio::test]
async fn test_site_validation_blocks_request() {
    let (mut panel, backend, _) = loaded_panel(true).await;

    let result = panel
        .add_site(&SiteInput {
            code: "LYO".to_string(),
            name: "   ".to_string(),
        })
        .await;
    assert!(matches!(result, Err(AdminError::Validation(_))));
    assert!(!backend.calls().contains(&"sites:post".to_string()));

    let outcome = panel
        .add_site(&SiteInput {
            code: " LYO ".to_string(),
            name: "Lyon".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Done(()));
    assert_eq!(
        backend.body_of("sites:post"),
        Some(json!({"code": "LYO", "name": "Lyon"}))
    );
}

#[tokio::test]
async fn test_edit_site_refetches() {
    let (mut panel, backend, notifier) = loaded_panel(true).await;
    let mut toasts = notifier.subscribe();

    let outcome = panel
        .edit_site(
            "2",
            &SiteInput {
                code: "DKR".to_string(),
                name: " Dakar Plateau ".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Done(()));
    assert_eq!(
        backend.body_of("sites:put:2"),
        Some(json!({"code": "DKR", "name": "Dakar Plateau"}))
    );

    let toast = toasts.try_recv().unwrap();
    assert_eq!(toast.level, NotificationLevel::Success);
    assert_eq!(toast.message, "Site modifié");
    assert_eq!(&backend.calls()[3..], &["sites:put:2", "sites"]);
}

#[tokio::test]
async fn test_delete_site_confirmed_and_cancelled() {
    let (mut panel, backend, notifier) = loaded_panel(true).await;
    let mut toasts = notifier.subscribe();

    let outcome = panel.delete_site("1").await.unwrap();
    assert_eq!(outcome, ActionOutcome::Done(()));
    assert_eq!(toasts.try_recv().unwrap().message, "Site supprimé");
    assert_eq!(&backend.calls()[3..], &["sites:delete:1", "sites"]);

    let (mut panel, backend, _) = loaded_panel(false).await;
    let outcome = panel.delete_site("1").await.unwrap();
    assert_eq!(outcome, ActionOutcome::Cancelled);
    assert!(!backend.calls().iter().any(|c| c.starts_with("sites:delete")));
}

#[tokio::test]
async fn test_admin_cannot_manage_sites() {
    let (mut panel, backend, _) = loaded_panel_as("Admin", true).await;

    assert!(panel.can_manage_agents());
    assert!(!panel.can_manage_sites());
    assert_eq!(backend.calls(), vec!["me", "users"]);

    let input = SiteInput {
        code: "LYO".to_string(),
        name: "Lyon".to_string(),
    };
    assert!(matches!(
        panel.add_site(&input).await,
        Err(AdminError::Forbidden(_))
    ));
    assert!(matches!(
        panel.edit_site("1", &input).await,
        Err(AdminError::Forbidden(_))
    ));
    assert!(matches!(
        panel.delete_site("1").await,
        Err(AdminError::Forbidden(_))
    ));
    assert_eq!(backend.calls(), vec!["me", "users"]);
}
