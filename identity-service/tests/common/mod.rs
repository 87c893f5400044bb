#![allow(dead_code)]

use std::sync::Arc;

use auth::PasswordHasher;
use auth::TokenIssuer;
use identity_service::inbound::http::router::create_router;
use identity_service::principal::models::PrecheckStrategy;
use identity_service::principal::ports::PrincipalRepository;
use identity_service::principal::service::IdentityService;
use identity_service::repositories::InMemoryPrincipalRepository;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp<R: PrincipalRepository> {
    pub address: String,
    pub port: u16,
    pub repository: Arc<R>,
    pub api_client: reqwest::Client,
    pub token_issuer: Arc<TokenIssuer>,
}

impl TestApp<InMemoryPrincipalRepository> {
    /// Spawn the application backed by a fresh in-memory store
    pub async fn spawn() -> Self {
        Self::spawn_with_precheck(PrecheckStrategy::Combined).await
    }

    pub async fn spawn_with_precheck(precheck: PrecheckStrategy) -> Self {
        Self::spawn_with(Arc::new(InMemoryPrincipalRepository::new()), precheck).await
    }
}

impl<R: PrincipalRepository> TestApp<R> {
    /// Spawn the application in a background task on top of `repository`
    pub async fn spawn_with(repository: Arc<R>, precheck: PrecheckStrategy) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let token_issuer =
            Arc::new(TokenIssuer::new(JWT_SECRET).expect("Failed to create token issuer"));

        // Minimum Argon2 cost keeps the suite fast
        let password_hasher =
            PasswordHasher::with_cost(1024, 1, 1).expect("Failed to create password hasher");

        let identity_service = Arc::new(
            IdentityService::new(
                Arc::clone(&repository),
                password_hasher,
                Arc::clone(&token_issuer),
            )
            .with_precheck(precheck),
        );

        let router = create_router(identity_service, Arc::clone(&token_issuer));

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            repository,
            api_client: reqwest::Client::new(),
            token_issuer,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// POST /api/register with the given fields
    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// POST /api/login with the given fields
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/login")
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
