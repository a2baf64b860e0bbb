//! Navigation guards for the protected, login, and callback routes.
//!
//! Guards never navigate themselves. Each returns a [`Navigation`] that the
//! host (a browser shell, the bundled app server, a test) carries out.

use url::Url;

use crate::store::{CODE_VERIFIER_KEY, TOKEN_KEY};
use crate::{
    AuthorizationResponse, GateConfig, GateError, OAuthClient, OAuthProvider, PkceMode, PkcePair,
    Route, TokenStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render the requested route.
    Allow,
    /// Move to another route of this app.
    RedirectInternal(String),
    /// Leave the app for another origin.
    RedirectExternal(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeStatus {
    /// The provider returned an `access_token` and it was cached.
    Stored,
    /// The provider answered 2xx JSON without an `access_token`; nothing was cached.
    MissingAccessToken,
    /// The exchange did not produce a token response.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub navigation: Navigation,
    pub status: ExchangeStatus,
}

impl CallbackOutcome {
    /// Text to show the user in a blocking alert, if any.
    pub fn alert(&self) -> Option<&str> {
        match &self.status {
            ExchangeStatus::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Result of [`AuthGuard::resolve`]: where to go, plus an optional alert to
/// show before going there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub navigation: Navigation,
    pub alert: Option<String>,
}

impl From<Navigation> for GuardOutcome {
    fn from(navigation: Navigation) -> Self {
        Self {
            navigation,
            alert: None,
        }
    }
}

impl From<CallbackOutcome> for GuardOutcome {
    fn from(outcome: CallbackOutcome) -> Self {
        Self {
            alert: outcome.alert().map(str::to_string),
            navigation: outcome.navigation,
        }
    }
}

pub struct AuthGuard<P: OAuthProvider, S: TokenStore> {
    client: OAuthClient<P>,
    store: S,
}

impl<P: OAuthProvider, S: TokenStore> AuthGuard<P, S> {
    pub fn new(provider: P, config: GateConfig, store: S) -> Result<Self, GateError> {
        Ok(Self::with_client(OAuthClient::new(provider, config)?, store))
    }

    pub fn with_client(client: OAuthClient<P>, store: S) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &OAuthClient<P> {
        &self.client
    }

    pub fn config(&self) -> &GateConfig {
        self.client.config()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cached_token(&self) -> Result<Option<String>, GateError> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .filter(|token| !token.is_empty()))
    }

    pub fn is_authenticated(&self) -> Result<bool, GateError> {
        Ok(self.cached_token()?.is_some())
    }

    /// Guard for the protected root route.
    pub fn check_protected(&self) -> Result<Navigation, GateError> {
        if self.is_authenticated()? {
            tracing::debug!("token cached, allowing protected route");
            return Ok(Navigation::Allow);
        }

        match &self.config().routes.login {
            Some(login) => {
                tracing::debug!(%login, "no token cached, redirecting to login");
                Ok(Navigation::RedirectInternal(login.clone()))
            }
            None => self.sign_in(),
        }
    }

    /// Guard for the login route: a signed-in user has nothing to do there.
    pub fn check_login(&self) -> Result<Navigation, GateError> {
        if self.is_authenticated()? {
            Ok(Navigation::RedirectInternal(self.config().routes.root.clone()))
        } else {
            Ok(Navigation::Allow)
        }
    }

    /// Leave for the provider's authorize endpoint.
    ///
    /// Only [`PkceMode::S256`] writes to the store, keeping the verifier for
    /// the callback.
    pub fn sign_in(&self) -> Result<Navigation, GateError> {
        let url = match self.config().pkce {
            PkceMode::Blank => self.client.authorization_url(Some(""))?,
            PkceMode::Omit => self.client.authorization_url(None)?,
            PkceMode::S256 => {
                let pkce = PkcePair::generate()?;
                self.store.set(CODE_VERIFIER_KEY, &pkce.code_verifier)?;
                self.client.authorization_url(Some(&pkce.code_challenge))?
            }
        };
        tracing::debug!(authorize_url = url.path(), "redirecting to provider");
        Ok(Navigation::RedirectExternal(url))
    }

    /// Guard for the callback route. Always ends at the root route; only a
    /// failing store is an error.
    pub async fn handle_callback(&self, location: &Url) -> Result<CallbackOutcome, GateError> {
        let status = match AuthorizationResponse::from_url(location) {
            Ok(response) => self.exchange(&response.code).await?,
            Err(error) => {
                tracing::warn!(%error, "callback without authorization code");
                ExchangeStatus::Failed {
                    message: error.alert_text(),
                }
            }
        };

        Ok(CallbackOutcome {
            navigation: Navigation::RedirectInternal(self.config().routes.root.clone()),
            status,
        })
    }

    async fn exchange(&self, code: &str) -> Result<ExchangeStatus, GateError> {
        let code_verifier = match self.config().pkce {
            PkceMode::S256 => {
                let verifier = self.store.get(CODE_VERIFIER_KEY)?.unwrap_or_default();
                self.store.remove(CODE_VERIFIER_KEY)?;
                verifier
            }
            PkceMode::Blank | PkceMode::Omit => PkcePair::blank().code_verifier,
        };

        match self.client.exchange_code(code, &code_verifier).await {
            Ok(token) => match token.access_token {
                Some(access_token) => {
                    self.store.set(TOKEN_KEY, &access_token)?;
                    tracing::info!("access token cached");
                    Ok(ExchangeStatus::Stored)
                }
                None => {
                    tracing::warn!("token response has no access_token, nothing cached");
                    Ok(ExchangeStatus::MissingAccessToken)
                }
            },
            Err(error) => {
                tracing::warn!(%error, "token exchange failed");
                Ok(ExchangeStatus::Failed {
                    message: error.alert_text(),
                })
            }
        }
    }

    /// Run whichever guard owns `location`'s path.
    pub async fn resolve(&self, location: &Url) -> Result<GuardOutcome, GateError> {
        let route = self.config().routes.classify(location.path());
        tracing::debug!(path = location.path(), ?route, "resolving navigation");
        match route {
            Route::Protected => self.check_protected().map(GuardOutcome::from),
            Route::Login => self.check_login().map(GuardOutcome::from),
            Route::Callback => self.handle_callback(location).await.map(GuardOutcome::from),
            Route::Unguarded => Ok(Navigation::Allow.into()),
        }
    }
}
