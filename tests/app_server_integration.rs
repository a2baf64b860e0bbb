use std::net::TcpListener;
use std::sync::Arc;

use pagerduty_gate::{
    AppServer, AuthGuard, GateConfig, LOGIN_PATH, MemoryStore, PagerDutyProvider, TOKEN_KEY,
    TokenStore,
};
use reqwest::{StatusCode, header::LOCATION, redirect::Policy};
use tokio::sync::oneshot;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct RunningApp {
    origin: String,
    http: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl RunningApp {
    async fn start(provider: &MockServer, store: Arc<MemoryStore>, login: Option<&str>) -> Self {
        Self::start_with_callback(provider, store, login, "/oauth-callback").await
    }

    async fn start_with_callback(
        provider: &MockServer,
        store: Arc<MemoryStore>,
        login: Option<&str>,
        callback: &str,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());

        let mut config = GateConfig::new("client-id", format!("{origin}{callback}"));
        if let Some(login) = login {
            config = config.with_login_route(login);
        }
        let guard =
            AuthGuard::new(PagerDutyProvider::with_base_url(provider.uri()), config, store).unwrap();
        let server = AppServer::new(guard).unwrap();

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve_with(listener, async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap();

        Self {
            origin,
            http,
            shutdown: Some(shutdown),
            handle,
        }
    }

    async fn get(&self, path_and_query: &str) -> reqwest::Response {
        self.http
            .get(format!("{}{}", self.origin, path_and_query))
            .send()
            .await
            .unwrap()
    }

    async fn stop(self) {
        let Self {
            http,
            shutdown,
            handle,
            ..
        } = self;
        drop(http);
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }
        handle.await.unwrap();
    }
}

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn signed_out_home_redirects_to_provider() {
    let provider = MockServer::start().await;
    let app = RunningApp::start(&provider, Arc::new(MemoryStore::new()), None).await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with(&format!("{}/oauth/authorize?", provider.uri())));
    assert!(target.contains("client_id=client-id"));

    app.stop().await;
}

#[tokio::test]
async fn callback_caches_token_and_unlocks_home() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("code", "abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": "tok1" })),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let store = Arc::new(MemoryStore::new());
    let app = RunningApp::start(&provider, store.clone(), None).await;

    let response = app.get("/oauth-callback?code=abc123").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));

    let home = app.get("/").await;
    assert_eq!(home.status(), StatusCode::OK);
    assert!(home.text().await.unwrap().contains("<h1>Home</h1>"));

    app.stop().await;
}

#[tokio::test]
async fn callback_served_at_redirect_uri_path() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("code", "abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": "tok1" })),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let store = Arc::new(MemoryStore::new());
    let app =
        RunningApp::start_with_callback(&provider, store.clone(), None, "/auth/callback").await;

    let response = app.get("/auth/callback?code=abc123").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));

    app.stop().await;
}

#[tokio::test]
async fn failed_callback_renders_alert() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("<invalid_grant>"))
        .mount(&provider)
        .await;

    let store = Arc::new(MemoryStore::new());
    let app = RunningApp::start(&provider, store.clone(), None).await;

    let response = app.get("/oauth-callback?code=abc123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("&lt;invalid_grant&gt;"));
    assert!(body.contains(r#"href="/""#));
    assert!(store.get(TOKEN_KEY).unwrap().is_none());

    app.stop().await;
}

#[tokio::test]
async fn login_route_flow() {
    let provider = MockServer::start().await;
    let app = RunningApp::start(&provider, Arc::new(MemoryStore::new()), Some(LOGIN_PATH)).await;

    let home = app.get("/").await;
    assert_eq!(home.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&home), "/login");

    let login = app.get("/login").await;
    assert_eq!(login.status(), StatusCode::OK);
    assert!(login.text().await.unwrap().contains(r#"href="/login/start""#));

    let start = app.get("/login/start").await;
    assert_eq!(start.status(), StatusCode::SEE_OTHER);
    assert!(location(&start).starts_with(&format!("{}/oauth/authorize?", provider.uri())));

    app.stop().await;
}

#[tokio::test]
async fn signed_in_login_redirects_home() {
    let provider = MockServer::start().await;
    let store = Arc::new(MemoryStore::new().with_entry(TOKEN_KEY, "tok1"));
    let app = RunningApp::start(&provider, store, Some(LOGIN_PATH)).await;

    let login = app.get("/login").await;
    assert_eq!(login.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&login), "/");

    app.stop().await;
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let provider = MockServer::start().await;
    let app = RunningApp::start(&provider, Arc::new(MemoryStore::new()), None).await;

    let response = app.get("/nowhere").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.stop().await;
}
