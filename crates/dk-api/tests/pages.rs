use std::sync::Arc;

use actix_web::{http::header, http::StatusCode, test, web, App};
use dk_api::session::actor_cookie;
use dk_api::{configure_routes, AppState};
use dk_core::{
    AppError, Docket, Document, DocumentStore, MemoryStore, MockDocumentStore, Revision, Snapshot,
};
use serde_json::json;
use uuid::Uuid;

fn state(store: Arc<dyn DocumentStore>) -> web::Data<AppState> {
    web::Data::new(AppState {
        docket: Docket::new(store),
        default_user: "anon@example.com".into(),
    })
}

fn body_text(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[actix_web::test]
async fn empty_directory_invites_first_item() {
    let app = test::init_service(
        App::new().app_data(state(Arc::new(MemoryStore::new()))).configure(configure_routes),
    )
    .await;
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("No items yet"));
    assert!(html.contains("anon@example.com"));
}

#[actix_web::test]
async fn form_submission_redirects_and_lists_item() {
    let store = Arc::new(MemoryStore::new());
    let app = test::init_service(App::new().app_data(state(store.clone())).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/items")
        .cookie(actor_cookie("Ana Souza"))
        .set_form([
            ("title", "Carta Status"),
            ("project_code", "FT02"),
            ("work_type", "subestação"),
            ("tags", "carta"),
            ("url", ""),
            ("note", ""),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/?notice=created");

    let stored = store.load(Document::Items).await.unwrap().unwrap();
    assert_eq!(stored.value[0]["created_by"], json!("Ana Souza"));
    assert_eq!(stored.value[0]["links"], json!([]));

    let req = test::TestRequest::get().uri("/?q=ft02&notice=created").to_request();
    let html = body_text(&test::call_and_read_body(&app, req).await);
    assert!(html.contains("Carta Status"));
    assert!(html.contains("Item created and published"));
}

#[actix_web::test]
async fn invalid_form_keeps_values_and_shows_error() {
    let store = Arc::new(MemoryStore::new());
    let app = test::init_service(App::new().app_data(state(store.clone())).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/items")
        .set_form([("title", "Rascunho"), ("project_code", ""), ("work_type", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("Please fill in: project code, work type."));
    assert!(html.contains(r#"value="Rascunho""#));
    assert!(store.load(Document::Items).await.unwrap().is_none());
}

#[actix_web::test]
async fn forum_thread_and_reply_via_forms() {
    let store = Arc::new(MemoryStore::new());
    let app = test::init_service(App::new().app_data(state(store.clone())).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/threads")
        .set_form([("title", "Drenagem atraso"), ("tags", ""), ("message", "Precisamos de revisão")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let stored = store.load(Document::Threads).await.unwrap().unwrap();
    let id = stored.value[0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/threads/{id}/posts"))
        .set_form([("text", "ok")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/forum?notice=reply");

    let req = test::TestRequest::get().uri("/forum").to_request();
    let html = body_text(&test::call_and_read_body(&app, req).await);
    assert!(html.contains("Drenagem atraso"));
    assert!(html.contains("2 messages"));
}

#[actix_web::test]
async fn identity_sets_cookie_and_returns() {
    let app = test::init_service(
        App::new().app_data(state(Arc::new(MemoryStore::new()))).configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/identity")
        .set_form([("actor", "bia@corp.com"), ("back", "/forum")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/forum?notice=identity");
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "docket_actor")
        .expect("actor cookie");

    let req = test::TestRequest::get().uri("/forum").cookie(cookie.into_owned()).to_request();
    let html = body_text(&test::call_and_read_body(&app, req).await);
    assert!(html.contains(r#"value="bia@corp.com""#));
}

#[actix_web::test]
async fn failed_reply_keeps_the_typed_text() {
    let thread_id = Uuid::now_v7();
    let threads = json!([{
        "id": thread_id,
        "title": "Drenagem atraso",
        "created_by": "ana",
        "created_at": "2024-05-01T12:30:00Z",
        "tags": [],
        "posts": [],
    }]);
    let mut store = MockDocumentStore::new();
    store.expect_backend_name().return_const("mock");
    store.expect_load().returning(move |_| {
        Ok(Some(Snapshot { value: threads.clone(), revision: Some(Revision("r1".into())) }))
    });
    store
        .expect_save()
        .times(1)
        .returning(|_, _, _, _| Err(AppError::Conflict("sha does not match".into())));

    let app = test::init_service(App::new().app_data(state(Arc::new(store))).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/threads/{thread_id}/posts"))
        .set_form([("text", "Vou revisar amanhã")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("Someone else saved changes"));
    assert!(html.contains("Vou revisar amanhã</textarea>"));
}
