use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::GateError;

/// The query of a provider redirect back to the callback route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub code: String,
}

impl AuthorizationResponse {
    pub fn from_url(callback_url: &Url) -> Result<Self, GateError> {
        callback_url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| Self {
                code: value.into_owned(),
            })
            .ok_or(GateError::MissingAuthorizationCode)
    }

    pub fn parse(callback_url: &str) -> Result<Self, GateError> {
        Self::from_url(&Url::parse(callback_url)?)
    }
}

/// Body of a successful token exchange. Nothing beyond the JSON object shape
/// is checked, so `access_token` may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::{AuthorizationResponse, TokenResponse};
    use crate::GateError;

    #[test]
    fn parse_reads_code() {
        let response =
            AuthorizationResponse::parse("http://localhost/oauth-callback?code=abc123").unwrap();
        assert_eq!(response.code, "abc123");
    }

    #[test]
    fn parse_decodes_percent_escapes() {
        let response =
            AuthorizationResponse::parse("http://localhost/oauth-callback?x=1&code=a%2Fb").unwrap();
        assert_eq!(response.code, "a/b");
    }

    #[test]
    fn parse_requires_code() {
        let result = AuthorizationResponse::parse("http://localhost/oauth-callback?error=denied");
        assert!(matches!(result, Err(GateError::MissingAuthorizationCode)));
    }

    #[test]
    fn token_response_keeps_unknown_fields() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"tok1","token_type":"bearer","id_token":"jwt"}"#,
        )
        .unwrap();
        assert_eq!(token.access_token.as_deref(), Some("tok1"));
        assert_eq!(token.token_type.as_deref(), Some("bearer"));
        assert!(token.extra.contains_key("id_token"));
    }

    #[test]
    fn token_response_without_access_token() {
        let token: TokenResponse = serde_json::from_str(r#"{"error":"nope"}"#).unwrap();
        assert!(token.access_token.is_none());
    }
}
