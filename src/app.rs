use axum::{
    Form, Router,
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::{Html, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use handlebars::{Handlebars, handlebars_helper};
use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::cursor::{SESSION_COOKIE, SessionStore};
use crate::error::AppError;
use crate::files::FileLister;
use crate::portal::Portal;
use crate::roster::Roster;
use crate::views::{PortalView, Search, SearchForm};

const PORTAL_TEMPLATE: &str = "portal";

handlebars_helper!(format_mark: |v: f64| {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
});

pub struct AppState {
    portal: Portal,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(portal: Portal) -> Result<Self, handlebars::TemplateError> {
        let mut templates = Handlebars::new();
        templates.register_template_string(
            PORTAL_TEMPLATE,
            include_str!("../templates/portal.hbs"),
        )?;
        templates.register_helper("format_mark", Box::new(format_mark));
        Ok(AppState { portal, templates })
    }

    pub fn portal(&self) -> &Portal {
        &self.portal
    }

    fn render(&self, view: &PortalView) -> Result<Html<String>, AppError> {
        Ok(Html(self.templates.render(PORTAL_TEMPLATE, view)?))
    }
}

/// Build the router over an already-assembled state.
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<FsPath>) -> Router {
    Router::new()
        .route("/", get(index).post(search))
        .route("/next", get(next_student))
        .route("/browse/*path", get(browse))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let roster = Roster::load(&config.data)?;
    log::info!(
        "loaded {} students from {}",
        roster.len(),
        config.data.display()
    );

    let files = FileLister::new(&config.browse_root)?;
    log::info!("browsing confined to {}", files.root().display());

    let portal = Portal::new(
        roster,
        SessionStore::new(config.session_ttl()).with_max_sessions(config.max_sessions),
        files,
        config.range_compare,
    );
    let state = Arc::new(AppState::new(portal)?);
    let app = router(state, &config.static_dir);

    // Start server
    let listener = TcpListener::bind(config.bind).await?;
    log::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    state.render(&state.portal.index(&Search::All, None))
}

async fn search(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<SearchForm>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let search = form.search();
    let existing = session_id(&jar);

    // Only a single-student lookup needs a session; create one on first use.
    let (jar, session) = match (&search, existing) {
        (Search::Single(_), None) => {
            let id = SessionStore::new_session_id();
            (jar.add(session_cookie(id.clone())), Some(id))
        }
        (_, existing) => (jar, existing),
    };

    let view = state.portal.index(&search, session.as_deref());
    Ok((jar, state.render(&view)?))
}

async fn next_student(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Html<String>, AppError> {
    let session = session_id(&jar);
    state.render(&state.portal.next(session.as_deref()))
}

async fn browse(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Html<String>, AppError> {
    let view = state.portal.browse(&path)?;
    state.render(&view)
}

fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} in {}ms",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
