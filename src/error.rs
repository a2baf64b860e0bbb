use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("os rng error: {message}")]
    OsRng { message: String },

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid redirect uri: {0}")]
    InvalidRedirectUri(String),

    #[error("invalid header: {name}={value}")]
    InvalidHeader { name: String, value: String },

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String, body: String },

    #[error("missing authorization code in callback url")]
    MissingAuthorizationCode,

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),
}

impl GateError {
    /// The text a user should see when this error ends a token exchange.
    ///
    /// Provider responses are surfaced verbatim; everything else uses the
    /// error's display form.
    pub fn alert_text(&self) -> String {
        match self {
            Self::HttpStatus { body, .. } | Self::InvalidResponse { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}
