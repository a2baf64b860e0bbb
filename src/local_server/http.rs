use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use url::Url;

use crate::{AuthGuard, GateError, GuardOutcome, Navigation, OAuthProvider, Route, TokenStore};

use super::config::AppServerConfig;
use super::target::RedirectTarget;

pub(super) struct AppState<P: OAuthProvider, S: TokenStore> {
    pub(super) guard: Arc<AuthGuard<P, S>>,
    pub(super) target: RedirectTarget,
    pub(super) pages: Arc<AppServerConfig>,
}

impl<P: OAuthProvider, S: TokenStore> Clone for AppState<P, S> {
    fn clone(&self) -> Self {
        Self {
            guard: Arc::clone(&self.guard),
            target: self.target.clone(),
            pages: Arc::clone(&self.pages),
        }
    }
}

pub(super) async fn navigate_handler<P, S>(
    State(state): State<AppState<P, S>>,
    uri: Uri,
) -> Response
where
    P: OAuthProvider + 'static,
    S: TokenStore + 'static,
{
    let location = match state.target.location(uri.path(), uri.query()) {
        Ok(location) => location,
        Err(error) => return failure_page(&state.pages, &error),
    };

    match state.guard.resolve(&location).await {
        Ok(outcome) => render(&state, &location, outcome),
        Err(error) => failure_page(&state.pages, &error),
    }
}

pub(super) async fn sign_in_handler<P, S>(State(state): State<AppState<P, S>>) -> Response
where
    P: OAuthProvider + 'static,
    S: TokenStore + 'static,
{
    match state.guard.sign_in() {
        Ok(navigation) => redirect(&navigation, "/"),
        Err(error) => failure_page(&state.pages, &error),
    }
}

fn render<P: OAuthProvider, S: TokenStore>(
    state: &AppState<P, S>,
    location: &Url,
    outcome: GuardOutcome,
) -> Response {
    let GuardOutcome { navigation, alert } = outcome;

    if let Some(message) = alert {
        let html = state
            .pages
            .alert_html
            .replace("{location}", &escape_html(target_of(&navigation, location.path())))
            .replace("{message}", &escape_html(&message));
        return (StatusCode::OK, Html(html)).into_response();
    }

    if navigation != Navigation::Allow {
        return redirect(&navigation, location.path());
    }

    match state.guard.config().routes.classify(location.path()) {
        Route::Protected => (StatusCode::OK, Html(state.pages.home_html.clone())).into_response(),
        Route::Login => {
            let html = state
                .pages
                .login_html
                .replace("{sign_in}", &escape_html(&state.pages.sign_in_path));
            (StatusCode::OK, Html(html)).into_response()
        }
        Route::Callback | Route::Unguarded => {
            (StatusCode::NOT_FOUND, Html(state.pages.not_found_html.clone())).into_response()
        }
    }
}

fn redirect(navigation: &Navigation, current: &str) -> Response {
    Redirect::to(target_of(navigation, current)).into_response()
}

fn target_of<'a>(navigation: &'a Navigation, current: &'a str) -> &'a str {
    match navigation {
        Navigation::Allow => current,
        Navigation::RedirectInternal(path) => path,
        Navigation::RedirectExternal(url) => url.as_str(),
    }
}

fn failure_page(pages: &AppServerConfig, error: &GateError) -> Response {
    tracing::error!(%error, "navigation failed");
    let html = pages
        .alert_html
        .replace("{location}", "/")
        .replace("{message}", &escape_html(&error.to_string()));
    (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
