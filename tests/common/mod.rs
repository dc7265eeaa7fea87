//! Shared test utilities for progression integration tests

#![allow(dead_code)]

use std::io::Read;
use std::path::Path;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;
use tiny_http::{Header, Response, Server};

use drp_progress::progress::{FileStore, ManualClock, ProgressionEngine, StatePersistence};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Engine persisting into `dir`, driven by `clock`
pub fn file_engine(dir: &Path, clock: &Rc<ManualClock>) -> ProgressionEngine {
    let store = FileStore::new(dir);
    ProgressionEngine::new(StatePersistence::new(Box::new(store))).with_clock(Rc::clone(clock))
}

/// A request seen by the fake backend
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

/// Minimal stand-in for the gamification API.
///
/// GET returns the stored blob (404 when empty, or `fail_with` if set);
/// POST replaces it.
pub struct FakeBackend {
    server: Arc<Server>,
    worker: Option<JoinHandle<()>>,
    pub base_url: String,
    pub blob: Arc<Mutex<Option<String>>>,
    pub requests: Arc<Mutex<Vec<SeenRequest>>>,
    pub fail_with: Arc<Mutex<Option<u16>>>,
}

impl FakeBackend {
    pub fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("Failed to bind fake backend"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("fake backend has an IP address");
        let blob: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let requests: Arc<Mutex<Vec<SeenRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let fail_with: Arc<Mutex<Option<u16>>> = Arc::new(Mutex::new(None));

        let worker = {
            let server = Arc::clone(&server);
            let blob = Arc::clone(&blob);
            let requests = Arc::clone(&requests);
            let fail_with = Arc::clone(&fail_with);
            thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    let method = request.method().to_string();
                    requests.lock().unwrap().push(SeenRequest {
                        method: method.clone(),
                        url: request.url().to_string(),
                        body: body.clone(),
                    });

                    let json = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("valid header");
                    let response = if let Some(code) = *fail_with.lock().unwrap() {
                        Response::from_string("{\"error\":\"unavailable\"}").with_status_code(code)
                    } else if method == "POST" {
                        *blob.lock().unwrap() = Some(body);
                        Response::from_string("{\"ok\":true}").with_status_code(200)
                    } else {
                        match blob.lock().unwrap().clone() {
                            Some(stored) => Response::from_string(stored).with_status_code(200),
                            None => Response::from_string("{\"error\":\"not_found\"}")
                                .with_status_code(404),
                        }
                    };
                    let _ = request.respond(response.with_header(json));
                }
            })
        };

        Self {
            server,
            worker: Some(worker),
            base_url: format!("http://{}/api/v1", addr),
            blob,
            requests,
            fail_with,
        }
    }

    pub fn set_blob(&self, json: &str) {
        *self.blob.lock().unwrap() = Some(json.to_string());
    }

    pub fn fail_with(&self, code: u16) {
        *self.fail_with.lock().unwrap() = Some(code);
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
