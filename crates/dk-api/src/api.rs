//! JSON API mirroring the HTML pages, for scripts and other front ends.

use actix_web::{web, HttpRequest, HttpResponse};
use dk_core::{ItemQuery, NewItem, NewLink, NewReply, NewThread, ThreadQuery};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::session::current_actor;

type ApiResult = Result<HttpResponse, ApiError>;

pub async fn health(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "backend": data.docket.backend_name(),
    }))
}

pub async fn list_items(data: web::Data<AppState>, query: web::Query<ItemQuery>) -> ApiResult {
    let items = data.docket.list_items(&query).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn list_threads(data: web::Data<AppState>, query: web::Query<ThreadQuery>) -> ApiResult {
    let threads = data.docket.list_threads(&query).await?;
    Ok(HttpResponse::Ok().json(threads))
}

pub async fn create_item(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewItem>,
) -> ApiResult {
    let actor = current_actor(&req, &data.default_user);
    let item = data.docket.create_item(&actor, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn add_link(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<NewLink>,
) -> ApiResult {
    let actor = current_actor(&req, &data.default_user);
    let item = data.docket.add_link(&actor, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn upvote(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult {
    let actor = current_actor(&req, &data.default_user);
    let item = data.docket.upvote(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn create_thread(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewThread>,
) -> ApiResult {
    let actor = current_actor(&req, &data.default_user);
    let thread = data.docket.create_thread(&actor, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(thread))
}

pub async fn reply(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<NewReply>,
) -> ApiResult {
    let actor = current_actor(&req, &data.default_user);
    let thread = data.docket.reply(&actor, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(thread))
}
