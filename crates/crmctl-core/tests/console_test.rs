#![allow(clippy::unwrap_used)]
// End-to-end tests for `Console` against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crmctl_core::{
    Console, ConsoleConfig, CoreError, LeadStatus, ListQuery, MemorySessionStore, Session, SessionStore,
    SessionUser,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_with(store: Arc<MemorySessionStore>) -> (MockServer, Console) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let console = Console::init(ConsoleConfig::new(base_url), store).unwrap();
    (server, console)
}

fn saved_session() -> Session {
    Session {
        token: SecretString::from("jwt-saved".to_owned()),
        user: SessionUser {
            id: "u1".into(),
            email: Some("ada@example.com".into()),
            username: Some("ada".into()),
            role_id: Some("r1".into()),
            role_name: Some("admin".into()),
        },
    }
}

async fn signed_in() -> (MockServer, Console, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::with_session(saved_session()));
    let (server, console) = setup_with(Arc::clone(&store)).await;
    (server, console, store)
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": "ok", "data": data }))
}

fn page(items: Value, total: u64) -> ResponseTemplate {
    ok(json!({ "items": items, "total": total, "currentPage": 1 }))
}

fn ids(page: &crmctl_core::Page<Value>) -> Vec<String> {
    page.items.iter().map(|i| i["id"].as_str().unwrap().to_owned()).collect()
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn saved_session_is_restored_and_sent() {
    let (server, console, _store) = signed_in().await;
    assert!(console.is_authenticated());

    Mock::given(method("GET"))
        .and(path("/api/contact"))
        .and(header("authorization", "Bearer jwt-saved"))
        .respond_with(page(json!([]), 0))
        .expect(1)
        .mount(&server)
        .await;

    console.contacts().list(&ListQuery::new()).await.unwrap();
}

#[tokio::test]
async fn login_resolves_role_name_and_persists() {
    let store = Arc::new(MemorySessionStore::new());
    let (server, console) = setup_with(Arc::clone(&store)).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ok(json!({
            "token": "jwt-new",
            "user": { "id": "u2", "email": "bo@example.com", "role_id": "r7" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/role/r7"))
        .and(header("authorization", "Bearer jwt-new"))
        .respond_with(ok(json!({ "id": "r7", "role_name": "Sales" })))
        .mount(&server)
        .await;

    let user = console
        .login("bo@example.com", &SecretString::from("pw".to_owned()))
        .await
        .unwrap();
    assert_eq!(user.role_name.as_deref(), Some("Sales"));

    let stored = store.load().unwrap().unwrap();
    assert_eq!(stored.token.expose_secret(), "jwt-new");
    assert_eq!(stored.user.role_name.as_deref(), Some("Sales"));
    assert!(console.is_authenticated());
}

#[tokio::test]
async fn failed_role_lookup_does_not_block_login() {
    let store = Arc::new(MemorySessionStore::new());
    let (server, console) = setup_with(Arc::clone(&store)).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/admin-login"))
        .respond_with(ok(json!({
            "token": "jwt-admin",
            "user": { "id": "u3", "email": "root@example.com", "role_id": "r1" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/role/r1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let user = console.admin_login("root@example.com", false).await.unwrap();
    assert_eq!(user.id, "u3");
    assert_eq!(user.role_name, None);
    assert!(store.load().unwrap().is_some());
}

#[tokio::test]
async fn unauthorized_response_signs_out() {
    let (server, console, store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/lead"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .mount(&server)
        .await;

    let err = console.leads().list(&ListQuery::new()).await.unwrap_err();
    assert!(err.is_auth_failure());
    assert!(!console.is_authenticated());
    assert!(store.load().unwrap().is_none());
    assert!(console.cache().is_empty());
}

#[tokio::test]
async fn logout_clears_everything() {
    let (server, console, store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/role"))
        .respond_with(page(json!([{ "id": "r1", "role_name": "admin" }]), 1))
        .mount(&server)
        .await;
    console.roles().list(&ListQuery::new()).await.unwrap();
    assert!(!console.cache().is_empty());

    console.logout().unwrap();
    assert!(console.cache().is_empty());
    assert!(console.current_session().is_none());
    assert!(store.load().unwrap().is_none());
}

// ── Cache behaviour ─────────────────────────────────────────────────

#[tokio::test]
async fn identical_lists_hit_the_network_once() {
    let (server, console, _store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/lead"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "10"))
        .respond_with(page(json!([{ "id": "l1", "leadTitle": "Acme" }]), 1))
        .expect(1)
        .mount(&server)
        .await;

    let leads = console.leads();
    let (first, second) = (ListQuery::new(), ListQuery::new());
    let (a, b) = tokio::join!(leads.list(&first), leads.list(&second));
    assert_eq!(a.unwrap().items[0].lead_title, "Acme");
    assert_eq!(b.unwrap().total, 1);

    let again = console.resource("lead").unwrap().list(&ListQuery::new().page(1)).await.unwrap();
    assert_eq!(ids(&again), ["l1"]);
}

#[tokio::test]
async fn create_refreshes_lists() {
    let (server, console, _store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/contact"))
        .respond_with(page(json!([{ "id": "c1", "name": "Ann" }]), 1))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/contact"))
        .respond_with(page(json!([{ "id": "c1", "name": "Ann" }, { "id": "c2", "name": "Bob" }]), 2))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ok(json!({ "id": "c2", "name": "Bob" })))
        .expect(1)
        .mount(&server)
        .await;

    let contacts = console.contacts();
    assert_eq!(contacts.list(&ListQuery::new()).await.unwrap().total, 1);

    let values = json!({ "name": "Bob", "email": "bob@example.com", "phone": "5551234567" });
    let created = console
        .create_record("contact", values.as_object().cloned().unwrap())
        .await
        .unwrap();
    assert_eq!(created["id"], "c2");

    assert_eq!(contacts.list(&ListQuery::new()).await.unwrap().total, 2);
}

#[tokio::test]
async fn invalid_input_never_reaches_the_server() {
    let (server, console, _store) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let values = json!({ "name": "B", "email": "nope", "phone": "12" });
    let err = console
        .create_record("contact", values.as_object().cloned().unwrap())
        .await
        .unwrap_err();
    let CoreError::InvalidInput(errors) = err else {
        panic!("expected InvalidInput, got {err:?}");
    };
    assert_eq!(errors.len(), 3);
}

#[tokio::test]
async fn optimistic_delete_is_visible_then_rolled_back() {
    let (server, console, _store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/lead"))
        .respond_with(page(json!([{ "id": "l1" }, { "id": "l2" }]), 2))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/lead/l1"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "constraint violation" }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let leads = console.resource("lead").unwrap().clone();
    let before = leads.list(&ListQuery::new()).await.unwrap();
    assert_eq!(ids(&before), ["l1", "l2"]);

    let pending = {
        let leads = leads.clone();
        tokio::spawn(async move { leads.delete("l1").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let during = leads.list(&ListQuery::new()).await.unwrap();
    assert_eq!(ids(&during), ["l2"]);
    assert_eq!(during.total, 1);

    let err = pending.await.unwrap().unwrap_err();
    assert_eq!(err.failure().status, Some(500));
    assert_eq!(err.failure().message, "constraint violation");

    let after = leads.list(&ListQuery::new()).await.unwrap();
    assert_eq!(ids(&after), ["l1", "l2"]);
    assert_eq!(after.total, 2);
}

#[tokio::test]
async fn overlapping_failed_deletes_both_roll_back() {
    let (server, console, _store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/lead"))
        .respond_with(page(json!([{ "id": "l1" }, { "id": "l2" }, { "id": "l3" }]), 3))
        .expect(1)
        .mount(&server)
        .await;
    for (id, delay) in [("l1", 200), ("l2", 400)] {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/lead/{id}")))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "message": "constraint violation" }))
                    .set_delay(Duration::from_millis(delay)),
            )
            .mount(&server)
            .await;
    }

    let leads = console.resource("lead").unwrap().clone();
    leads.list(&ListQuery::new()).await.unwrap();

    let first = {
        let leads = leads.clone();
        tokio::spawn(async move { leads.delete("l1").await })
    };
    let second = {
        let leads = leads.clone();
        tokio::spawn(async move { leads.delete("l2").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let during = leads.list(&ListQuery::new()).await.unwrap();
    assert_eq!(ids(&during), ["l3"]);
    assert_eq!(during.total, 1);

    assert!(first.await.unwrap().is_err());
    let halfway = leads.list(&ListQuery::new()).await.unwrap();
    assert_eq!(ids(&halfway), ["l1", "l3"]);
    assert_eq!(halfway.total, 2);

    assert!(second.await.unwrap().is_err());
    let after = leads.list(&ListQuery::new()).await.unwrap();
    assert_eq!(ids(&after), ["l1", "l2", "l3"]);
    assert_eq!(after.total, 3);
}

#[tokio::test]
async fn successful_delete_stays_removed() {
    let (server, console, _store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/lead"))
        .respond_with(page(json!([{ "id": "l1" }, { "id": "l2" }]), 2))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/lead"))
        .respond_with(page(json!([{ "id": "l2" }]), 1))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/lead/l1"))
        .respond_with(ok(json!({ "id": "l1", "leadTitle": "Acme" })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/lead/l1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Lead not found" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/lead/l1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "Lead deleted" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let leads = console.resource("lead").unwrap().clone();
    assert_eq!(ids(&leads.list(&ListQuery::new()).await.unwrap()), ["l1", "l2"]);
    assert_eq!(leads.get("l1").await.unwrap()["leadTitle"], "Acme");

    let pending = {
        let leads = leads.clone();
        tokio::spawn(async move { leads.delete("l1").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let during = leads.list(&ListQuery::new()).await.unwrap();
    assert_eq!(ids(&during), ["l2"]);
    assert_eq!(during.total, 1);

    let message = pending.await.unwrap().unwrap();
    assert_eq!(message.as_deref(), Some("Lead deleted"));

    let after = leads.list(&ListQuery::new()).await.unwrap();
    assert_eq!(ids(&after), ["l2"]);
    assert_eq!(after.total, 1);

    let err = leads.get("l1").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn protected_records_are_not_deleted() {
    let (server, console, _store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/role/r1"))
        .respond_with(ok(json!({ "id": "r1", "role_name": "admin" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stage/s1"))
        .respond_with(ok(json!({ "id": "s1", "name": "New", "created_by": "SYSTEM" })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ok(Value::Null))
        .expect(0)
        .mount(&server)
        .await;

    let err = console.delete_record("role", "r1").await.unwrap_err();
    assert!(matches!(err, CoreError::Rejected { .. }), "{err:?}");
    let err = console.delete_record("stage", "s1").await.unwrap_err();
    assert!(matches!(err, CoreError::Rejected { .. }), "{err:?}");
}

// ── Leads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn new_lead_lands_in_the_default_stage() {
    let (server, console, _store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/stage"))
        .and(query_param("limit", "all"))
        .respond_with(page(
            json!([
                { "id": "s1", "name": "Qualify", "pipeline": "p1", "type": "lead" },
                { "id": "s2", "name": "New", "pipeline": "p1", "type": "lead", "is_default": true }
            ]),
            2,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/lead"))
        .and(body_partial_json(json!({ "leadTitle": "Acme", "stage": "s2" })))
        .respond_with(ok(json!({ "id": "l9", "leadTitle": "Acme", "stage": "s2" })))
        .expect(1)
        .mount(&server)
        .await;

    let values = json!({
        "leadTitle": "Acme", "leadValue": 1000, "pipeline": "p1",
        "source": "f1", "category": "f2"
    });
    let lead = console
        .create_record("lead", values.as_object().cloned().unwrap())
        .await
        .unwrap();
    assert_eq!(lead["stage"], "s2");
}

#[tokio::test]
async fn moving_and_closing_a_lead_send_the_whole_record() {
    let (server, console, _store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/lead/l1"))
        .respond_with(ok(json!({ "id": "l1", "leadTitle": "Acme", "stage": "s1", "status": "open" })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/lead/l1"))
        .and(body_partial_json(json!({ "leadTitle": "Acme", "stage": "s2" })))
        .respond_with(ok(json!({ "id": "l1", "leadTitle": "Acme", "stage": "s2" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/lead/l1"))
        .and(body_partial_json(json!({ "status": "closed", "stage": "s1" })))
        .respond_with(ok(json!({ "id": "l1", "status": "closed" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(console.move_lead("l1", "s1").await.unwrap().is_none());
    let moved = console.move_lead("l1", "s2").await.unwrap().unwrap();
    assert_eq!(moved["stage"], "s2");

    let closed = console.set_lead_status("l1", LeadStatus::Closed).await.unwrap();
    assert_eq!(closed["status"], "closed");
}
