use std::env;
use std::time::Duration;

use url::Url;

use crate::{GateError, PkceMode, RouteTable};

pub const CLIENT_ID_VAR: &str = "PAGERDUTY_CLIENT_ID";
pub const REDIRECT_URI_VAR: &str = "PAGERDUTY_REDIRECT_URI";
pub const PKCE_VAR: &str = "PAGERDUTY_PKCE";
pub const LOGIN_ROUTE_VAR: &str = "PAGERDUTY_LOGIN_ROUTE";
pub const TIMEOUT_VAR: &str = "PAGERDUTY_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub pkce: PkceMode,
    pub routes: RouteTable,
    pub timeout: Option<Duration>,
}

impl GateConfig {
    /// The callback route is the path of `redirect_uri`; an unparsable uri
    /// keeps the default callback path.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        let redirect_uri = redirect_uri.into();
        Self {
            routes: callback_routes(&redirect_uri),
            client_id: client_id.into(),
            redirect_uri,
            pkce: PkceMode::default(),
            timeout: None,
        }
    }

    /// Build a config from `PAGERDUTY_*` environment variables.
    pub fn from_env() -> Result<Self, GateError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`GateConfig::from_env`] with values taken from `lookup`,
    /// keyed by the `PAGERDUTY_*` variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| GateError::Config(format!("{name} is not set")))
        };

        let mut config = Self::new(required(CLIENT_ID_VAR)?, required(REDIRECT_URI_VAR)?);
        if let Some(mode) = lookup(PKCE_VAR) {
            config.pkce = mode.parse()?;
        }
        if let Some(login) = lookup(LOGIN_ROUTE_VAR).filter(|value| !value.is_empty()) {
            config.routes = config.routes.with_login(login);
        }
        if let Some(secs) = lookup(TIMEOUT_VAR).filter(|value| !value.is_empty()) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                GateError::Config(format!("{TIMEOUT_VAR} is not a number: {secs}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_pkce(mut self, pkce: PkceMode) -> Self {
        self.pkce = pkce;
        self
    }

    /// Replace the route table wholesale, callback path included.
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_login_route(mut self, login: impl Into<String>) -> Self {
        self.routes = self.routes.with_login(login);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn callback_routes(redirect_uri: &str) -> RouteTable {
    match Url::parse(redirect_uri) {
        Ok(url) => RouteTable::default().with_callback(url.path()),
        Err(_) => RouteTable::default(),
    }
}
