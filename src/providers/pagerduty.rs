use crate::{OAuthProvider, TokenRequestFormat};

const DEFAULT_BASE_URL: &str = "https://app.pagerduty.com";
const AUTHORIZE_PATH: &str = "/oauth/authorize";
const TOKEN_PATH: &str = "/oauth/token";

#[derive(Debug, Clone)]
pub struct PagerDutyProvider {
    base_url: String,
    authorize_url: String,
    token_url: String,
}

impl Default for PagerDutyProvider {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl OAuthProvider for PagerDutyProvider {
    fn id(&self) -> &str {
        "pagerduty"
    }

    fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    fn token_url(&self) -> &str {
        &self.token_url
    }

    // The token endpoint takes its parameters in the query string of an empty POST.
    fn token_request_format(&self) -> TokenRequestFormat {
        TokenRequestFormat::Query
    }
}

impl PagerDutyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            authorize_url: format!("{base_url}{AUTHORIZE_PATH}"),
            token_url: format!("{base_url}{TOKEN_PATH}"),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_base_url() -> &'static str {
        DEFAULT_BASE_URL
    }
}
