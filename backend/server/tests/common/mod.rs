#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use sightings::{
    app,
    cache::MemoryCache,
    config::Config,
    mail::{MailError, Mailer, OutgoingEmail},
    state::State,
    store::MemoryStore,
};
use tokio::net::TcpListener;

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("outbox lock").clone()
    }

    /// Code from the most recent OTP email.
    pub fn last_otp(&self) -> String {
        let sent = self.sent();
        let body = &sent.last().expect("an OTP email was sent").body;

        body.split_whitespace()
            .map(|word| word.trim_end_matches('.'))
            .find(|word| word.len() == 6 && word.chars().all(|c| c.is_ascii_digit()))
            .expect("OTP in email body")
            .to_string()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().expect("outbox lock").push(email);
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Unavailable("connection refused".to_string()))
    }
}

pub fn failing_mailer() -> Option<Arc<dyn Mailer>> {
    let mailer: Arc<dyn Mailer> = Arc::new(FailingMailer);

    Some(mailer)
}

pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub cache: Arc<MemoryCache>,
    pub store: Arc<MemoryStore>,
    pub outbox: Arc<RecordingMailer>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(Config::default(), None).await
    }

    /// `mailer` replaces the recording outbox when given.
    pub async fn start_with(config: Config, mailer: Option<Arc<dyn Mailer>>) -> Self {
        let cache = Arc::new(MemoryCache::new());
        let store = Arc::new(MemoryStore::new());
        let outbox = Arc::new(RecordingMailer::default());
        let mailer = mailer.unwrap_or_else(|| outbox.clone() as Arc<dyn Mailer>);

        let state = State::with_backends(config, cache.clone(), store.clone(), mailer);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let address = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app(state).into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("serve");
        });

        Self {
            base_url: format!("http://{address}"),
            client: Client::new(),
            cache,
            store,
            outbox,
        }
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("GET request")
    }

    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .expect("POST request")
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("POST request")
    }
}

pub async fn json_of(response: Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json().await.expect("JSON response body");

    (status, body)
}
