use crate::GateError;
use crate::routes::normalize_path;

use super::target::RedirectTarget;

pub(crate) const DEFAULT_HOME_HTML: &str = include_str!("html/home.html");
pub(crate) const DEFAULT_LOGIN_HTML: &str = include_str!("html/login.html");
pub(crate) const DEFAULT_ALERT_HTML: &str = include_str!("html/alert.html");
pub(crate) const DEFAULT_NOT_FOUND_HTML: &str = include_str!("html/not_found.html");

pub const DEFAULT_SIGN_IN_PATH: &str = "/login/start";

/// Pages and bind address of the app host.
///
/// `login_html` may contain `{sign_in}`; `alert_html` may contain `{message}`
/// and `{location}`. Substituted values are html-escaped.
#[derive(Debug, Clone)]
pub struct AppServerConfig {
    pub host: String,
    pub port: u16,
    pub sign_in_path: String,
    pub home_html: String,
    pub login_html: String,
    pub alert_html: String,
    pub not_found_html: String,
}

impl AppServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            home_html: DEFAULT_HOME_HTML.to_string(),
            login_html: DEFAULT_LOGIN_HTML.to_string(),
            alert_html: DEFAULT_ALERT_HTML.to_string(),
            not_found_html: DEFAULT_NOT_FOUND_HTML.to_string(),
        }
    }

    /// Listen where the provider will send the browser back to.
    pub fn from_redirect_uri(redirect_uri: &str) -> Result<Self, GateError> {
        let target = RedirectTarget::parse(redirect_uri)?;
        Ok(Self::new(target.host, target.port))
    }

    pub fn origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = normalize_path(path.into());
        self
    }

    pub fn with_home_html(mut self, html: impl Into<String>) -> Self {
        self.home_html = html.into();
        self
    }

    pub fn with_login_html(mut self, html: impl Into<String>) -> Self {
        self.login_html = html.into();
        self
    }

    pub fn with_alert_html(mut self, html: impl Into<String>) -> Self {
        self.alert_html = html.into();
        self
    }

    pub fn with_not_found_html(mut self, html: impl Into<String>) -> Self {
        self.not_found_html = html.into();
        self
    }
}
