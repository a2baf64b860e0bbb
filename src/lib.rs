//! Gate a protected view behind the PagerDuty OAuth 2.0 authorization-code flow.
//!
//! [`AuthGuard`] decides, per navigation, whether to render a route, move to
//! another route, or leave for the provider. The token it checks lives in an
//! injectable [`TokenStore`]. With the `local-server` feature an axum app host
//! serves the routes through the guard.

mod client;
mod config;
mod error;
mod guard;
#[cfg(feature = "local-server")]
mod local_server;
mod pkce;
mod providers;
mod routes;
mod store;
mod types;

pub use client::OAuthClient;
pub use config::{
    CLIENT_ID_VAR, GateConfig, LOGIN_ROUTE_VAR, PKCE_VAR, REDIRECT_URI_VAR, TIMEOUT_VAR,
};
pub use error::GateError;
pub use guard::{AuthGuard, CallbackOutcome, ExchangeStatus, GuardOutcome, Navigation};
#[cfg(feature = "local-server")]
pub use local_server::{AppServer, AppServerConfig};
pub use pkce::{PkceMode, PkcePair};
pub use providers::{OAuthProvider, PagerDutyProvider, TokenRequestFormat};
pub use routes::{CALLBACK_PATH, LOGIN_PATH, ROOT_PATH, Route, RouteTable};
pub use store::{CODE_VERIFIER_KEY, FileStore, MemoryStore, TOKEN_KEY, TokenStore};
pub use types::{AuthorizationResponse, TokenResponse};
