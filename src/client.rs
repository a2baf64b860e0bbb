use reqwest::{
    Client, RequestBuilder,
    header::{HeaderName, HeaderValue},
};
use url::Url;

use crate::pkce::CHALLENGE_METHOD;
use crate::{GateConfig, GateError, OAuthProvider, TokenRequestFormat, TokenResponse};

#[derive(Debug, Clone)]
pub struct OAuthClient<P: OAuthProvider> {
    provider: P,
    config: GateConfig,
    http: Client,
}

impl<P: OAuthProvider> OAuthClient<P> {
    pub fn new(provider: P, config: GateConfig) -> Result<Self, GateError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            provider,
            config,
            http,
        })
    }

    pub fn with_http_client(provider: P, config: GateConfig, http: Client) -> Self {
        Self {
            provider,
            config,
            http,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The provider's authorize URL for this client.
    ///
    /// `challenge` adds `code_challenge_method=S256` and the given (possibly
    /// empty) `code_challenge`; `None` leaves both out.
    pub fn authorization_url(&self, challenge: Option<&str>) -> Result<Url, GateError> {
        let mut params = vec![
            ("client_id".to_string(), self.config.client_id.clone()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("response_type".to_string(), "code".to_string()),
        ];
        if let Some(challenge) = challenge {
            params.push((
                "code_challenge_method".to_string(),
                CHALLENGE_METHOD.to_string(),
            ));
            params.push(("code_challenge".to_string(), challenge.to_string()));
        }
        merge_params(&mut params, self.provider.authorize_params());

        let mut url = Url::parse(self.provider.authorize_url())?;
        url.query_pairs_mut().extend_pairs(&params);
        Ok(url)
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, GateError> {
        let payload = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("code".to_string(), code.to_string()),
            ("code_verifier".to_string(), code_verifier.to_string()),
        ];

        self.send_token_request(payload).await
    }

    async fn send_token_request(
        &self,
        mut payload: Vec<(String, String)>,
    ) -> Result<TokenResponse, GateError> {
        merge_params(&mut payload, self.provider.token_params());

        let mut token_url = Url::parse(self.provider.token_url())?;
        let format = self.provider.token_request_format();
        if format == TokenRequestFormat::Query {
            token_url.query_pairs_mut().extend_pairs(&payload);
        }

        let headers = self.provider.token_headers();
        let builder = apply_headers(self.http.post(token_url), &headers)?;

        tracing::debug!(
            provider = self.provider.id(),
            ?format,
            "sending token request"
        );
        let response = match format {
            TokenRequestFormat::Query => builder.send().await?,
            TokenRequestFormat::Form => builder.form(&payload).send().await?,
            TokenRequestFormat::Json => {
                let body: serde_json::Map<String, serde_json::Value> = payload
                    .into_iter()
                    .map(|(key, value)| (key, serde_json::Value::String(value)))
                    .collect();
                builder.json(&body).send().await?
            }
        };

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GateError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let token = serde_json::from_str(&body).map_err(|err| GateError::InvalidResponse {
            message: err.to_string(),
            body,
        })?;

        Ok(token)
    }
}

/// Provider params override same-named base params and append the rest.
fn merge_params(params: &mut Vec<(String, String)>, extra: Vec<(String, String)>) {
    for (key, value) in extra {
        if let Some((_, existing)) = params.iter_mut().find(|(param, _)| *param == key) {
            *existing = value;
        } else {
            params.push((key, value));
        }
    }
}

fn apply_headers(
    mut builder: RequestBuilder,
    headers: &[(String, String)],
) -> Result<RequestBuilder, GateError> {
    for (name, value) in headers {
        let name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| GateError::InvalidHeader {
                name: name.clone(),
                value: value.clone(),
            })?;
        let value = HeaderValue::from_str(value).map_err(|_| GateError::InvalidHeader {
            name: name.to_string(),
            value: value.clone(),
        })?;
        builder = builder.header(name, value);
    }
    Ok(builder)
}
