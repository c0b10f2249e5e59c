//! In-memory `ModSource` used by the builder and pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::core::config::IndexerConfig;
use crate::core::error::{IndexError, IndexResult};
use crate::core::http::build_http_client;
use crate::core::model::ModRecord;
use crate::core::remote::{DirectoryEntry, EntryKind, ModSource};

pub const ROOT: &str = "mem://list/root";

pub fn dir(name: &str) -> DirectoryEntry {
    DirectoryEntry {
        name: name.into(),
        kind: EntryKind::Dir,
        url: format!("mem://list/{name}"),
        download_url: None,
    }
}

pub fn file(name: &str) -> DirectoryEntry {
    DirectoryEntry {
        name: name.into(),
        kind: EntryKind::File,
        url: format!("mem://file/{name}"),
        download_url: None,
    }
}

/// Client carrying `Bearer test-token`, as the real run would build it.
pub fn authed_client() -> reqwest::Client {
    let config = IndexerConfig {
        token: TEST_TOKEN.into(),
        ..IndexerConfig::default()
    };
    build_http_client(&config).unwrap()
}

pub const TEST_TOKEN: &str = "test-token";

pub fn mod_doc(name: &str) -> Value {
    json!({
        "name": name,
        "version": "1.0.0",
        "author": "tester",
        "description": format!("{name} description\nsecond line"),
        "modloader": "QuestLoader",
        "download": format!("https://example.com/{name}.qmod")
    })
}

/// Listings keyed by location (`None` = the call fails) and documents keyed
/// by `<version>/<file>` (`None` = fetch fails).
#[derive(Default)]
pub struct FakeSource {
    listings: HashMap<String, Option<Vec<DirectoryEntry>>>,
    documents: HashMap<String, Option<Value>>,
    delay: Option<Duration>,
    pub list_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, entries: Vec<DirectoryEntry>) -> Self {
        self.listings.insert(ROOT.into(), Some(entries));
        self
    }

    pub fn with_failing_root(mut self) -> Self {
        self.listings.insert(ROOT.into(), None);
        self
    }

    pub fn with_version(mut self, version: &str, entries: Vec<DirectoryEntry>) -> Self {
        self.listings
            .insert(format!("mem://list/{version}"), Some(entries));
        self
    }

    pub fn with_failing_version(mut self, version: &str) -> Self {
        self.listings.insert(format!("mem://list/{version}"), None);
        self
    }

    pub fn with_document(mut self, version: &str, file_name: &str, doc: Option<Value>) -> Self {
        self.documents
            .insert(format!("{version}/{file_name}"), doc);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn remote_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst) + self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModSource for FakeSource {
    fn root_location(&self) -> String {
        ROOT.into()
    }

    fn mod_location(&self, version: &str, file_name: &str) -> IndexResult<String> {
        Ok(format!("{version}/{file_name}"))
    }

    async fn list_entries(&self, location: &str) -> IndexResult<Vec<DirectoryEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match self.listings.get(location) {
            Some(Some(entries)) => Ok(entries.clone()),
            _ => Err(IndexError::DirectoryUnavailable {
                url: location.into(),
                reason: "HTTP 404 Not Found".into(),
            }),
        }
    }

    async fn fetch_mod(&self, location: &str) -> IndexResult<ModRecord> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.documents.get(location) {
            Some(Some(doc)) => {
                ModRecord::from_value(doc.clone()).map_err(|reason| IndexError::ParseFailed {
                    url: location.into(),
                    reason,
                })
            }
            _ => Err(IndexError::FetchFailed {
                url: location.into(),
                reason: "HTTP 404 Not Found".into(),
            }),
        }
    }
}

/// Minimal HTTP/1.1 responder on a loopback port. Each path maps to a status
/// and body; unknown paths get a 404. Request heads are recorded lowercased.
pub struct StubServer {
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(routes: &[(&str, u16, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes: Arc<HashMap<String, (u16, String)>> = Arc::new(
            routes
                .iter()
                .map(|(path, status, body)| (path.to_lowercase(), (*status, body.to_string())))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => head.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&head).to_lowercase();
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().unwrap().push(head);

                    let (status, body) = routes
                        .get(&path)
                        .cloned()
                        .unwrap_or((404, r#"{"message":"Not Found"}"#.to_string()));
                    let response = format!(
                        "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\n\
                         content-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        if status < 400 { "OK" } else { "Error" },
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { base, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Recorded request heads (lowercased) whose path is `path`.
    pub fn requests_to(&self, path: &str) -> Vec<String> {
        let prefix = format!("get {} ", path.to_lowercase());
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|head| head.starts_with(&prefix))
            .cloned()
            .collect()
    }
}
