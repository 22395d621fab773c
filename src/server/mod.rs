//! HTTP transport — a thin axum front end over `SecretEngine`.
//!
//! Routes:
//! - `GET /`              minimal HTML form
//! - `POST /save`         form field `text`, answers with the retrieval URL
//! - `GET /get/:handle`   answers with the plaintext exactly once
//!
//! The engine is synchronous, so every call runs on tokio's blocking pool.
//! "Empty" and "expired or invalid" are ordinary 200 answers, as browsers
//! render them as pages; only internal failures are 500s.

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Form, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::engine::SecretEngine;
use crate::errors::{OnceSecretError, Result};
use crate::store::SecretStore;

/// Shown when `/save` receives an empty message.
pub const EMPTY_MESSAGE: &str =
    "Oops! Cannot process an empty message. Return to the home page and try again.";

/// Shown for consumed, unknown and malformed handles alike.
pub const EXPIRED_OR_INVALID: &str =
    "Oops! Either the secret expired or the URL is wrong. Return to the home page and try again.";

/// Shown for any internal failure; details go to the log only.
pub const GENERIC_FAILURE: &str =
    "Oops! Something went wrong on our side. Return to the home page and try again.";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>OnceSecret</title></head>
<body>
<h1>Share a secret once</h1>
<form action="/save" method="post">
<textarea name="text" rows="10" cols="60"></textarea><br>
<button type="submit">Create link</button>
</form>
<p>The link works exactly one time. After that the secret is gone.</p>
</body>
</html>
"#;

/// Shared state handed to every request handler.
pub struct AppState<S> {
    engine: Arc<SecretEngine<S>>,
    base_url: Option<String>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            base_url: self.base_url.clone(),
        }
    }
}

impl<S: SecretStore + 'static> AppState<S> {
    /// Wrap `engine`; `base_url` of `None` means "derive from `Host`".
    pub fn new(engine: SecretEngine<S>, base_url: Option<String>) -> Self {
        Self {
            engine: Arc::new(engine),
            base_url,
        }
    }

    fn base_for(&self, headers: &HeaderMap) -> String {
        if let Some(ref base) = self.base_url {
            return base.clone();
        }
        headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(|host| format!("http://{host}"))
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    text: String,
}

/// Build the router for `state`.
pub fn router<S: SecretStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/save", post(save::<S>))
        .route("/get/:handle", get(retrieve::<S>))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve<S: SecretStore + 'static>(listener: TcpListener, state: AppState<S>) -> Result<()> {
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

/// Serve until `shutdown` resolves.
pub async fn serve_with_shutdown<S, F>(
    listener: TcpListener,
    state: AppState<S>,
    shutdown: F,
) -> Result<()>
where
    S: SecretStore + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "oncesecret listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| OnceSecretError::Server(format!("serve: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn save<S: SecretStore + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Form(form): Form<SaveForm>,
) -> Response {
    let engine = Arc::clone(&state.engine);
    let text = form.text;
    let outcome = tokio::task::spawn_blocking(move || engine.submit(&text)).await;

    match outcome {
        Ok(Ok(handle)) => Settings::retrieval_url(&state.base_for(&headers), &handle).into_response(),
        Ok(Err(OnceSecretError::EmptyInput)) => EMPTY_MESSAGE.into_response(),
        Ok(Err(e)) => internal_error("save", &e),
        Err(e) => internal_error("save", &e),
    }
}

async fn retrieve<S: SecretStore + 'static>(
    State(state): State<AppState<S>>,
    Path(handle): Path<String>,
) -> Response {
    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || engine.retrieve(&handle)).await;

    match outcome {
        Ok(Ok(Some(mut plaintext))) => (
            [(header::CACHE_CONTROL, "no-store")],
            // Hand the buffer itself to the response body instead of copying it.
            std::mem::take(&mut *plaintext),
        )
            .into_response(),
        Ok(Ok(None)) => ([(header::CACHE_CONTROL, "no-store")], EXPIRED_OR_INVALID).into_response(),
        Ok(Err(e)) => internal_error("get", &e),
        Err(e) => internal_error("get", &e),
    }
}

fn internal_error(route: &str, e: &dyn std::fmt::Display) -> Response {
    tracing::error!(route, error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE).into_response()
}
