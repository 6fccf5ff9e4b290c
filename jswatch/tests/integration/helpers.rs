//! Test helper functions for integration tests

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::SystemTime;

use jswatch::compiler::{Backend, LocalBackend};
use jswatch::monitor::ChangeStream;
use jswatch::Result;
use reqwest::Url;
use tempfile::TempDir;
use tiny_http::{Header, Response, Server};

/// Local backend whose "compiler" copies the source to the target
pub fn copying_backend() -> Arc<Backend> {
    Arc::new(Backend::Local(LocalBackend::with_command(
        "sh",
        ["-c", r#"cp "$6" "$8""#, "fake-closure"],
    )))
}

/// Creates a temporary directory containing the given files
pub fn create_tree(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    for (name, content) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
    }
    temp
}

pub fn set_modified(path: &Path, time: SystemTime) {
    let file = File::options()
        .write(true)
        .open(path)
        .expect("Failed to open file");
    file.set_modified(time).expect("Failed to set modification time");
}

/// Writes an executable shell script named `name` into `dir`
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
    path
}

/// Writes an executable shell script standing in for inotifywait
pub fn fake_inotifywait(dir: &Path, body: &str) -> PathBuf {
    fake_tool(dir, "fake-inotifywait", body)
}

/// Change stream replaying a fixed list of paths
pub struct ScriptedSource {
    paths: VecDeque<PathBuf>,
    running: bool,
}

impl ScriptedSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths: paths.into(),
            running: false,
        }
    }
}

impl ChangeStream for ScriptedSource {
    fn start(&mut self) -> Result<()> {
        self.running = true;
        Ok(())
    }

    fn next_changed_path(&mut self) -> Option<PathBuf> {
        if self.running {
            self.paths.pop_front()
        } else {
            None
        }
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

/// One request as received by [`FakeService`]
#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub content_type: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl CapturedRequest {
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// HTTP server answering exactly one request with a canned response
pub struct FakeService {
    pub url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl FakeService {
    pub fn start(status: u16, body: &str) -> Self {
        let server = Server::http("127.0.0.1:0").expect("Failed to bind test server");
        let port = server
            .server_addr()
            .to_ip()
            .expect("Test server has no IP address")
            .port();
        let body = body.to_string();

        let handle = thread::spawn(move || {
            let mut request = server.recv().expect("Failed to receive request");
            let mut raw = String::new();
            request
                .as_reader()
                .read_to_string(&mut raw)
                .expect("Failed to read request body");

            let captured = CapturedRequest {
                method: request.method().to_string(),
                content_type: request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.to_string()),
                fields: decode_form(&raw),
            };

            let header = Header::from_bytes("Content-Type", "application/json")
                .expect("Invalid header");
            request
                .respond(
                    Response::from_string(body)
                        .with_status_code(status)
                        .with_header(header),
                )
                .expect("Failed to respond");
            captured
        });

        Self {
            url: format!("http://127.0.0.1:{port}/compile"),
            handle,
        }
    }

    /// Wait for the request to have been served and return it
    pub fn request(self) -> CapturedRequest {
        self.handle.join().expect("Test server panicked")
    }
}

fn decode_form(raw: &str) -> Vec<(String, String)> {
    let url = Url::parse(&format!("http://localhost/?{raw}")).expect("Invalid form body");
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
