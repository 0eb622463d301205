//! # dk-api HTML handlers
//!
//! This module coordinates the flow between browser forms and the Docket
//! service. Successful mutations answer `303 See Other` back to the page,
//! which is the page's refresh; failures re-render the page with the message.

use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use askama::Template;
use dk_core::{
    AppError, Docket, ItemQuery, ItemSort, NewItem, NewLink, NewReply, NewThread, ThreadQuery,
    ThreadSort,
};
use dk_ui::{Chrome, DirectoryTemplate, ForumTemplate, ItemView, NewItemTemplate, ThreadView};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{status_of, user_message};
use crate::session::{actor_cookie, current_actor, safe_return_path};

/// State shared across all Actix-web workers.
pub struct AppState {
    pub docket: Docket,
    /// Identity used when the session has not supplied one.
    pub default_user: String,
}

/// `?notice=` code set by the redirect after a successful mutation.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    #[serde(default)]
    pub notice: Option<String>,
}

impl Flash {
    fn text(&self) -> &'static str {
        match self.notice.as_deref() {
            Some("created") => "Item created and published in the directory.",
            Some("voted") => "Vote recorded.",
            Some("linked") => "Link added.",
            Some("thread") => "Discussion published.",
            Some("reply") => "Reply published.",
            Some("identity") => "Identity updated.",
            _ => "",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IdentityForm {
    #[serde(default)]
    pub actor: String,
    #[serde(default)]
    pub back: String,
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

fn html(status: StatusCode, rendered: askama::Result<String>) -> HttpResponse {
    match rendered {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("template rendering failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn log_failure(action: &str, err: &AppError) {
    if err.is_storage() {
        log::error!("{action} failed: {err}");
    } else {
        log::info!("{action} rejected: {err}");
    }
}

fn item_sort_name(sort: ItemSort) -> &'static str {
    match sort {
        ItemSort::MostRecent => "recent",
        ItemSort::MostUpvoted => "upvotes",
        ItemSort::TitleAsc => "title",
    }
}

fn thread_sort_name(sort: ThreadSort) -> &'static str {
    match sort {
        ThreadSort::MostRecent => "recent",
        ThreadSort::MostReplied => "replies",
        ThreadSort::TitleAsc => "title",
    }
}

/// Renders the directory, folding a listing failure into the error banner.
async fn render_directory(
    data: &AppState,
    req: &HttpRequest,
    query: &ItemQuery,
    notice: &str,
    failure: Option<&AppError>,
) -> HttpResponse {
    let actor = current_actor(req, &data.default_user);
    let (items, listing_error) = match data.docket.list_items(query).await {
        Ok(items) => (items.iter().map(ItemView::from).collect::<Vec<_>>(), None),
        Err(e) => {
            log_failure("list items", &e);
            (Vec::new(), Some(e))
        }
    };
    let shown = failure.or(listing_error.as_ref());
    let status = shown.map_or(StatusCode::OK, status_of);
    let error = shown.map(user_message).unwrap_or_default();

    let page = DirectoryTemplate {
        chrome: Chrome {
            actor: actor.as_str(),
            backend: data.docket.backend_name(),
            path: "/",
            notice,
            error: &error,
        },
        items: &items,
        q: query.q.as_deref().unwrap_or_default(),
        code: query.code.as_deref().unwrap_or_default(),
        work_type: query.work_type.as_deref().unwrap_or_default(),
        sort: item_sort_name(query.sort),
    };
    html(status, page.render())
}

/// Forum form values to refill after a failed submission.
#[derive(Debug, Default)]
struct ForumDraft {
    thread: NewThread,
    reply_to: String,
    reply_text: String,
}

/// Renders the forum; `draft` refills the forms after a failure.
async fn render_forum(
    data: &AppState,
    req: &HttpRequest,
    query: &ThreadQuery,
    notice: &str,
    failure: Option<&AppError>,
    draft: &ForumDraft,
) -> HttpResponse {
    let actor = current_actor(req, &data.default_user);
    let (threads, listing_error) = match data.docket.list_threads(query).await {
        Ok(threads) => (threads.iter().map(ThreadView::from).collect::<Vec<_>>(), None),
        Err(e) => {
            log_failure("list threads", &e);
            (Vec::new(), Some(e))
        }
    };
    let shown = failure.or(listing_error.as_ref());
    let status = shown.map_or(StatusCode::OK, status_of);
    let error = shown.map(user_message).unwrap_or_default();

    let page = ForumTemplate {
        chrome: Chrome {
            actor: actor.as_str(),
            backend: data.docket.backend_name(),
            path: "/forum",
            notice,
            error: &error,
        },
        threads: &threads,
        q: query.q.as_deref().unwrap_or_default(),
        sort: thread_sort_name(query.sort),
        new_title: &draft.thread.title,
        new_tags: &draft.thread.tags,
        new_message: &draft.thread.message,
        reply_to: &draft.reply_to,
        reply_text: &draft.reply_text,
    };
    html(status, page.render())
}

fn render_new_item(
    data: &AppState,
    req: &HttpRequest,
    form: &NewItem,
    failure: Option<&AppError>,
) -> HttpResponse {
    let actor = current_actor(req, &data.default_user);
    let status = failure.map_or(StatusCode::OK, status_of);
    let error = failure.map(user_message).unwrap_or_default();

    let page = NewItemTemplate {
        chrome: Chrome {
            actor: actor.as_str(),
            backend: data.docket.backend_name(),
            path: "/items/new",
            notice: "",
            error: &error,
        },
        title: &form.title,
        project_code: &form.project_code,
        work_type: &form.work_type,
        tags: &form.tags,
        url: form.url.as_deref().unwrap_or_default(),
        note: form.note.as_deref().unwrap_or_default(),
    };
    html(status, page.render())
}

/// Renders the Directory (e.g. `/?q=ft02&sort=upvotes`)
pub async fn directory(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ItemQuery>,
    flash: web::Query<Flash>,
) -> impl Responder {
    render_directory(&data, &req, &query, flash.text(), None).await
}

pub async fn new_item_form(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    render_new_item(&data, &req, &NewItem::default(), None)
}

pub async fn create_item(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<NewItem>,
) -> impl Responder {
    let actor = current_actor(&req, &data.default_user);
    let form = form.into_inner();
    match data.docket.create_item(&actor, form.clone()).await {
        Ok(_) => see_other("/?notice=created"),
        Err(e) => {
            log_failure("create item", &e);
            render_new_item(&data, &req, &form, Some(&e))
        }
    }
}

pub async fn add_link(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    form: web::Form<NewLink>,
) -> impl Responder {
    let actor = current_actor(&req, &data.default_user);
    match data.docket.add_link(&actor, path.into_inner(), form.into_inner()).await {
        Ok(_) => see_other("/?notice=linked"),
        Err(e) => {
            log_failure("add link", &e);
            render_directory(&data, &req, &ItemQuery::default(), "", Some(&e)).await
        }
    }
}

pub async fn upvote(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    let actor = current_actor(&req, &data.default_user);
    match data.docket.upvote(&actor, path.into_inner()).await {
        Ok(_) => see_other("/?notice=voted"),
        Err(e) => {
            log_failure("upvote", &e);
            render_directory(&data, &req, &ItemQuery::default(), "", Some(&e)).await
        }
    }
}

/// Renders the Forum (e.g. `/forum?q=drenagem&sort=replies`)
pub async fn forum(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ThreadQuery>,
    flash: web::Query<Flash>,
) -> impl Responder {
    render_forum(&data, &req, &query, flash.text(), None, &ForumDraft::default()).await
}

pub async fn create_thread(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<NewThread>,
) -> impl Responder {
    let actor = current_actor(&req, &data.default_user);
    let form = form.into_inner();
    match data.docket.create_thread(&actor, form.clone()).await {
        Ok(_) => see_other("/forum?notice=thread"),
        Err(e) => {
            log_failure("create thread", &e);
            let draft = ForumDraft { thread: form, ..Default::default() };
            render_forum(&data, &req, &ThreadQuery::default(), "", Some(&e), &draft).await
        }
    }
}

pub async fn reply(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    form: web::Form<NewReply>,
) -> impl Responder {
    let actor = current_actor(&req, &data.default_user);
    let thread_id = path.into_inner();
    let form = form.into_inner();
    match data.docket.reply(&actor, thread_id, form.clone()).await {
        Ok(_) => see_other("/forum?notice=reply"),
        Err(e) => {
            log_failure("reply", &e);
            let draft = ForumDraft {
                reply_to: thread_id.to_string(),
                reply_text: form.text,
                ..Default::default()
            };
            render_forum(&data, &req, &ThreadQuery::default(), "", Some(&e), &draft).await
        }
    }
}

/// Stores the session's display label and returns to the page it came from.
pub async fn set_identity(form: web::Form<IdentityForm>) -> impl Responder {
    let back = safe_return_path(&form.back);
    let separator = if back.contains('?') { '&' } else { '?' };
    HttpResponse::SeeOther()
        .cookie(actor_cookie(&form.actor))
        .insert_header((header::LOCATION, format!("{back}{separator}notice=identity")))
        .finish()
}
