//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use resilient_call::client::{BackendError, Collection, IdempotencyKey, Payload, RemoteBackend};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;

/// Operation that fails a fixed number of times, then returns its call number.
pub struct Script {
    failures: u32,
    message: &'static str,
    calls: AtomicU32,
    call_times: Mutex<Vec<Instant>>,
}

impl Script {
    pub fn failing(failures: u32, message: &'static str) -> Self {
        Self {
            failures,
            message,
            calls: AtomicU32::new(0),
            call_times: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing(message: &'static str) -> Self {
        Self::failing(u32::MAX, message)
    }

    pub fn succeeding() -> Self {
        Self::failing(0, "unused")
    }

    pub async fn call(&self) -> Result<u32, io::Error> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.call_times.lock().unwrap().push(Instant::now());
        if n <= self.failures {
            Err(io::Error::other(format!("{} (call {n})", self.message)))
        } else {
            Ok(n)
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Gaps between consecutive calls.
    pub fn intervals(&self) -> Vec<Duration> {
        let times = self.call_times.lock().unwrap();
        times.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }
}

/// In-memory backend whose every operation fails `failures` times first.
pub struct MockBackend {
    failures: u32,
    error: fn() -> BackendError,
    calls: Mutex<HashMap<&'static str, u32>>,
    keys: Mutex<Vec<IdempotencyKey>>,
    records: Mutex<HashMap<IdempotencyKey, Payload>>,
}

impl MockBackend {
    pub fn new(failures: u32, error: fn() -> BackendError) -> Arc<Self> {
        Arc::new(Self {
            failures,
            error,
            calls: Mutex::new(HashMap::new()),
            keys: Mutex::new(Vec::new()),
            records: Mutex::new(HashMap::new()),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::new(0, || BackendError::Other("unused".into()))
    }

    pub fn calls(&self, operation: &'static str) -> u32 {
        self.calls.lock().unwrap().get(operation).copied().unwrap_or(0)
    }

    /// Idempotency keys seen by `create_record`, one per attempt.
    pub fn keys(&self) -> Vec<IdempotencyKey> {
        self.keys.lock().unwrap().clone()
    }

    pub fn stored_records(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn attempt(&self, operation: &'static str) -> Result<(), BackendError> {
        let mut calls = self.calls.lock().unwrap();
        let n = calls.entry(operation).or_insert(0);
        *n += 1;
        if *n <= self.failures {
            Err((self.error)())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteBackend for MockBackend {
    async fn current_user(&self) -> Result<Payload, BackendError> {
        self.attempt("current_user")?;
        Ok(json!({ "id": "user_1", "email": "ada@example.com" }))
    }

    async fn list_records(&self, collection: Collection, query: &Payload) -> Result<Vec<Payload>, BackendError> {
        self.attempt("list_records")?;
        Ok(vec![json!({ "collection": collection.as_str(), "query": query })])
    }

    async fn create_record(
        &self,
        collection: Collection,
        record: &Payload,
        key: &IdempotencyKey,
    ) -> Result<Payload, BackendError> {
        self.keys.lock().unwrap().push(*key);
        // The write lands even when the acknowledgement is lost.
        self.records.lock().unwrap().entry(*key).or_insert_with(|| record.clone());
        self.attempt("create_record")?;
        Ok(json!({ "collection": collection.as_str(), "id": key.to_string() }))
    }

    async fn generate_image(&self, request: &Payload) -> Result<Payload, BackendError> {
        self.attempt("generate_image")?;
        Ok(json!({ "prompt": request["prompt"], "images": ["https://cdn.example.com/1.png"] }))
    }

    async fn upload(&self, path: &str, bytes: &[u8], _options: &Payload) -> Result<Payload, BackendError> {
        self.attempt("upload")?;
        Ok(json!({ "publicUrl": format!("https://cdn.example.com/{path}"), "size": bytes.len() }))
    }
}

/// Start a programmable HTTP backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut request = [0u8; 1024];
                        let _ = socket.read(&mut request).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
