use std::future::Future;
use std::net::TcpListener;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener as TokioTcpListener;

use crate::{AuthGuard, GateError, OAuthProvider, TokenStore};

use super::config::AppServerConfig;
use super::http::{AppState, navigate_handler, sign_in_handler};
use super::target::RedirectTarget;

/// Serves the app's routes through an [`AuthGuard`], acting as the browser
/// shell: guard redirects become `303 See Other`, alerts become a page.
pub struct AppServer<P: OAuthProvider, S: TokenStore> {
    guard: Arc<AuthGuard<P, S>>,
    config: AppServerConfig,
}

impl<P, S> AppServer<P, S>
where
    P: OAuthProvider + 'static,
    S: TokenStore + 'static,
{
    /// Bind address comes from the guard's redirect uri.
    pub fn new(guard: AuthGuard<P, S>) -> Result<Self, GateError> {
        let config = AppServerConfig::from_redirect_uri(&guard.config().redirect_uri)?;
        Ok(Self::from_config(guard, config))
    }

    pub fn from_config(guard: AuthGuard<P, S>, config: AppServerConfig) -> Self {
        Self {
            guard: Arc::new(guard),
            config,
        }
    }

    pub fn guard(&self) -> &AuthGuard<P, S> {
        &self.guard
    }

    pub fn config(&self) -> &AppServerConfig {
        &self.config
    }

    pub fn bind(&self) -> Result<TcpListener, GateError> {
        TcpListener::bind((self.config.host.as_str(), self.config.port)).map_err(GateError::from)
    }

    pub fn router(&self) -> Result<Router, GateError> {
        let state = AppState {
            guard: Arc::clone(&self.guard),
            target: RedirectTarget::parse(&self.config.origin())?,
            pages: Arc::new(self.config.clone()),
        };

        Ok(Router::new()
            .route(&self.config.sign_in_path, get(sign_in_handler::<P, S>))
            .fallback(navigate_handler::<P, S>)
            .with_state(state))
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve_with<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), GateError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router()?;

        listener.set_nonblocking(true)?;
        let listener = TokioTcpListener::from_std(listener)?;
        tracing::info!(addr = %listener.local_addr()?, "app server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("app server stopped");
        Ok(())
    }

    pub async fn serve<F>(&self, shutdown: F) -> Result<(), GateError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind()?;
        self.serve_with(listener, shutdown).await
    }
}
