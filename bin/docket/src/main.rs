//! # Docket Binary
//!
//! The entry point that assembles the application from settings and the
//! storage plugins compiled in.

mod config;

use std::sync::Arc;
use std::time::Duration;

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context};
use dk_api::middleware::{cors_policy, security_headers, standard_middleware};
use dk_api::{configure_routes, AppState};
use dk_core::{CachedStore, Docket, DocumentStore, MemoryStore};

#[cfg(feature = "storage-github")]
use dk_store_github::{GitHubDocumentStore, GitHubSettings};

#[cfg(feature = "storage-local")]
use dk_store_local::LocalDocumentStore;

use crate::config::{Backend, Settings};

fn build_store(settings: &Settings) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let backend = settings.backend();
    let store: Arc<dyn DocumentStore> = match backend {
        #[cfg(feature = "storage-github")]
        Backend::Github => {
            let Some((token, repo)) = settings.github.credentials() else {
                bail!("the github backend needs github.token and github.repo");
            };
            let store = GitHubDocumentStore::new(GitHubSettings {
                token,
                repo,
                branch: settings.github.branch.clone(),
                api_url: settings.github.api_url.clone(),
            })
            .context("building the GitHub client")?;
            Arc::new(store)
        }
        #[cfg(feature = "storage-local")]
        Backend::Local => Arc::new(LocalDocumentStore::new(settings.storage.data_dir.clone())),
        Backend::Memory => {
            log::warn!("memory backend selected: data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        other => bail!("storage backend {other:?} is not compiled into this binary"),
    };

    let ttl = match settings.storage.cache_ttl_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    Ok(Arc::new(CachedStore::new(store, ttl)))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().context("loading settings")?;
    let store = build_store(&settings)?;

    let state = web::Data::new(AppState {
        docket: Docket::new(store),
        default_user: settings.default_user.clone(),
    });

    let bind = (settings.server.host.clone(), settings.server.port);
    log::info!(
        "Docket starting on http://{}:{} (storage: {})",
        bind.0,
        bind.1,
        state.docket.backend_name()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(standard_middleware())
            .wrap(security_headers())
            .wrap(cors_policy())
            .configure(configure_routes)
            .service(Files::new("/static", "./static"))
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
