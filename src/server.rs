use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, info_span, warn, Instrument};

use crate::config::DashboardConfig;
use crate::error::DashError;
use crate::layout::{error_page, not_found_page, render_document};
use crate::loader::DataSource;
use crate::pages::{Route, ROUTES};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    request_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config: Arc::new(config),
            request_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Pages reload their files on every request, so each gets a fresh source.
    pub fn source(&self) -> DataSource {
        DataSource::new(self.config.data_dir.clone())
    }

    fn next_request_id(&self) -> String {
        let id = self.request_seq.fetch_add(1, Ordering::Relaxed);
        format!("req-{id:016x}")
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new();
    for route in ROUTES.iter() {
        router = router.route(
            route.path,
            get(move |state: State<AppState>| page_handler(state, route)),
        );
    }
    router
        .fallback(not_found_handler)
        .layer(from_fn_with_state(state.clone(), request_tracing_middleware))
        .with_state(state)
}

/// Serve until SIGINT or SIGTERM.
pub async fn run(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
}

async fn page_handler(State(state): State<AppState>, route: &'static Route) -> Response {
    let source = state.source();
    let rendered = tokio::task::spawn_blocking(move || -> Result<String, DashError> {
        let page = (route.render)(&source)?;
        render_document(&page, route.path)
    })
    .await;

    match rendered {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(err)) => {
            error!(path = route.path, error = %err, load_failure = err.is_load_failure(), "page render failed");
            server_error(route.path, &err.to_string())
        }
        Err(join) => {
            error!(path = route.path, error = %join, "page render task failed");
            server_error(route.path, "internal error while rendering the page")
        }
    }
}

fn server_error(path: &str, message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(error_page(path, message)),
    )
        .into_response()
}

async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Html(not_found_page())).into_response()
}

async fn request_tracing_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = state.next_request_id();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let span = info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let mut response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| info!(status = response.status().as_u16(), "request completed"));
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "signal registration failed, waiting for ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
