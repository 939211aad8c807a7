use std::net::SocketAddr;
use std::sync::{Arc, Once};
use tokio::sync::watch;
use vanish_server::api::{self, MgmtState, ServiceContainer};
use vanish_server::config::{
    AuthConfig, Config, LogFormat, MessageConfig, RateLimitConfig, ServerConfig, StoreBackend, StoreConfig,
    TelemetryConfig,
};
use vanish_server::services::auth_service::StaticCredentials;
use vanish_server::services::health_service::HealthService;
use vanish_server::services::message_service::MessageService;
use vanish_server::services::rate_limit_service::RateLimitService;
use vanish_server::storage::MessageStore;
use vanish_server::storage::memory::MemoryStore;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("vanish_server=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config() -> Config {
    Config {
        title: "Vanish (test)".to_string(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // 0 means let OS choose
            mgmt_port: 0,
            root_path: "/".to_string(),
            request_timeout_secs: 10,
            shutdown_timeout_secs: 5,
            trusted_proxies: vec!["127.0.0.1/32".parse().expect("valid cidr")],
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            op_timeout_secs: 5,
            sweep_interval_secs: 1,
        },
        auth: AuthConfig { username: "poster".to_string(), password: "hunter2".to_string() },
        messages: MessageConfig { id_length: 32, min_length: 1, max_length: 1000, validity_secs: 600 },
        rate_limit: RateLimitConfig {
            per_second: 10_000,
            burst: 10_000,
            post_per_second: 10_000,
            post_burst: 10_000,
        },
        telemetry: TelemetryConfig { log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub config: Config,
    _shutdown_tx: watch::Sender<bool>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(get_test_config()).await
    }

    pub async fn spawn_with_config(config: Config) -> Self {
        setup_tracing();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let store = MemoryStore::new();
        store.spawn_sweeper(config.store.sweep_interval_secs, shutdown_rx);

        let services = ServiceContainer {
            message_service: MessageService::new(
                Arc::clone(&store) as Arc<dyn MessageStore>,
                config.messages.clone(),
                &config.server.root_path,
            ),
            credentials: Arc::new(StaticCredentials::new(&config.auth.username, &config.auth.password)),
            rate_limit_service: RateLimitService::new(config.server.trusted_proxies.clone()),
            health_service: HealthService::new(Arc::clone(&store) as Arc<dyn MessageStore>),
        };

        let mgmt_app = api::mgmt_router(MgmtState { health_service: services.health_service.clone() });
        let app = api::app_router(config.clone(), services);

        let api_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("failed to bind");
        let api_addr = api_listener.local_addr().expect("listener has no address");
        tokio::spawn(async move {
            axum::serve(api_listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .expect("api server failed");
        });

        let mgmt_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("failed to bind");
        let mgmt_addr = mgmt_listener.local_addr().expect("listener has no address");
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt_app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .expect("mgmt server failed");
        });

        Self {
            server_url: format!("http://{api_addr}"),
            mgmt_url: format!("http://{mgmt_addr}"),
            client: reqwest::Client::new(),
            config,
            _shutdown_tx: shutdown_tx,
        }
    }

    /// Posts a message body with the configured credentials.
    pub async fn post_message(&self, body: &serde_json::Value, test_expiry: Option<i64>) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}/", self.server_url))
            .basic_auth(&self.config.auth.username, Some(&self.config.auth.password))
            .json(body);
        if let Some(secs) = test_expiry {
            request = request.query(&[("test_expiry", secs)]);
        }
        request.send().await.expect("post request failed")
    }

    /// Posts a message body with explicit credentials.
    pub async fn post_message_as(
        &self,
        username: &str,
        password: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/", self.server_url))
            .basic_auth(username, Some(password))
            .json(body)
            .send()
            .await
            .expect("post request failed")
    }

    /// Fetches a message by its retrieval path (as returned in `url`).
    pub async fn get_path(&self, path: &str) -> reqwest::Response {
        self.client.get(format!("{}{path}", self.server_url)).send().await.expect("get request failed")
    }
}
