/// Where the token request carries its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRequestFormat {
    /// POST with every parameter in the query string and no body.
    Query,
    Form,
    Json,
}

pub trait OAuthProvider: Send + Sync {
    fn id(&self) -> &str;
    fn authorize_url(&self) -> &str;
    fn token_url(&self) -> &str;

    fn authorize_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn token_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn token_request_format(&self) -> TokenRequestFormat {
        TokenRequestFormat::Form
    }

    fn token_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}
