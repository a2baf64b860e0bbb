use url::Url;

use crate::GateError;

/// Where the app host listens, taken from the configured redirect uri.
#[derive(Debug, Clone)]
pub(super) struct RedirectTarget {
    pub(super) scheme: String,
    pub(super) host: String,
    pub(super) port: u16,
}

impl RedirectTarget {
    pub(super) fn parse(redirect_uri: &str) -> Result<Self, GateError> {
        let url = Url::parse(redirect_uri)?;
        if url.scheme() != "http" {
            return Err(GateError::InvalidRedirectUri(
                "redirect uri must use http scheme".to_string(),
            ));
        }

        let host = url.host_str().ok_or_else(|| {
            GateError::InvalidRedirectUri("redirect uri is missing host".to_string())
        })?;

        let port = url.port_or_known_default().ok_or_else(|| {
            GateError::InvalidRedirectUri("redirect uri is missing port".to_string())
        })?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// Absolute location of a request the host received. Scheme, host and
    /// port always come from the target, never from the request.
    pub(super) fn location(&self, path: &str, query: Option<&str>) -> Result<Url, GateError> {
        let mut url = Url::parse(&format!("{}://{}:{}", self.scheme, self.host, self.port))?;
        url.set_path(path);
        url.set_query(query);
        Ok(url)
    }
}
