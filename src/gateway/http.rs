//! Blocking HTTP gateway built on ureq
//!
//! Each request runs on the blocking pool; transfer progress is reported
//! from inside the read loop of that same blocking call.

use super::{decode_list, Gateway, TransferProgress};
use crate::error::{SurError, SurResult};
use crate::spec::Specification;
use async_trait::async_trait;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;
use ureq::{Agent, SendBody};

const CHUNK_SIZE: usize = 16 * 1024;

/// Characters escaped when a digest becomes a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Gateway speaking the repository's HTTP protocol
#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    agent: Agent,
}

impl HttpGateway {
    /// Create a gateway for `base_url` with a global per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Download URL of a package; the digest stays one path segment
    fn package_url(&self, digest: &str) -> String {
        self.url(&format!("get/{}", utf8_percent_encode(digest, SEGMENT)))
    }
}

/// Run a blocking transfer on the blocking pool
async fn blocking<T, F>(operation: &'static str, f: F) -> SurResult<T>
where
    F: FnOnce() -> SurResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SurError::Internal(format!("{} task failed: {}", operation, e)))?
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list(&self) -> SurResult<Vec<Specification>> {
        let agent = self.agent.clone();
        let url = self.url("list");

        blocking("list", move || {
            debug!("GET {}", url);
            let mut response = agent
                .get(&url)
                .call()
                .map_err(|e| SurError::remote("list", e.to_string()))?;

            let status = response.status().as_u16();
            if status != 200 {
                return Err(SurError::remote_status("list", status));
            }

            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| SurError::remote("list", e.to_string()))?;

            decode_list(&body)
        })
        .await
    }

    async fn fetch(
        &self,
        digest: &str,
        dest: &Path,
        progress: Arc<dyn TransferProgress>,
    ) -> SurResult<u64> {
        let agent = self.agent.clone();
        let url = self.package_url(digest);
        let dest = dest.to_path_buf();

        blocking("fetch", move || {
            debug!("GET {}", url);
            let mut response = agent
                .get(&url)
                .call()
                .map_err(|e| SurError::remote("fetch", e.to_string()))?;

            let status = response.status().as_u16();
            if status != 200 {
                return Err(SurError::remote_status("fetch", status));
            }

            let total = response.body().content_length();
            let mut reader = response.body_mut().as_reader();
            let mut file = File::create(&dest)
                .map_err(|e| SurError::io(format!("creating {}", dest.display()), e))?;

            let mut buf = vec![0u8; CHUNK_SIZE];
            let mut done = 0u64;
            loop {
                let n = reader
                    .read(&mut buf)
                    .map_err(|e| SurError::remote("fetch", e.to_string()))?;
                if n == 0 {
                    break;
                }
                file.write_all(&buf[..n])
                    .map_err(|e| SurError::io(format!("writing {}", dest.display()), e))?;
                done += n as u64;
                progress.advance(done, total);
            }

            file.flush()
                .map_err(|e| SurError::io(format!("writing {}", dest.display()), e))?;
            Ok(done)
        })
        .await
    }

    async fn submit(
        &self,
        package: &Path,
        user: &str,
        progress: Arc<dyn TransferProgress>,
    ) -> SurResult<u16> {
        let agent = self.agent.clone();
        let url = self.url("submit");
        let package = package.to_path_buf();
        let user = user.to_string();

        blocking("submit", move || {
            let bytes = std::fs::read(&package)
                .map_err(|e| SurError::io(format!("reading {}", package.display()), e))?;
            let file_name = package
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let boundary = format!("sur-{}", uuid::Uuid::new_v4().simple());
            let body = multipart_body(&boundary, &file_name, &bytes, &user);
            let total = body.len() as u64;

            debug!("POST {} ({} bytes)", url, total);
            let mut reader = ProgressReader {
                inner: Cursor::new(body),
                done: 0,
                total,
                progress,
            };

            let response = agent
                .post(&url)
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .header("Content-Length", total.to_string())
                .send(SendBody::from_reader(&mut reader))
                .map_err(|e| SurError::remote("submit", e.to_string()))?;

            Ok(response.status().as_u16())
        })
        .await
    }

    async fn annotate(&self, digest: &str, user: &str) -> SurResult<u16> {
        let agent = self.agent.clone();
        let url = self.url("annotate");
        let digest = digest.to_string();
        let user = user.to_string();

        blocking("annotate", move || {
            debug!("POST {}", url);
            let response = agent
                .post(&url)
                .send_form([("digest", digest.as_str()), ("user", user.as_str())])
                .map_err(|e| SurError::remote("annotate", e.to_string()))?;

            Ok(response.status().as_u16())
        })
        .await
    }
}

/// Build a multipart/form-data body with a `file` and a `user` part
fn multipart_body(boundary: &str, file_name: &str, bytes: &[u8], user: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/x-tar\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"user\"\r\n\r\n");
    body.extend_from_slice(user.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

/// Reader that reports upload progress as the body is consumed
struct ProgressReader {
    inner: Cursor<Vec<u8>>,
    done: u64,
    total: u64,
    progress: Arc<dyn TransferProgress>,
}

impl Read for ProgressReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.done += n as u64;
        self.progress.advance(self.done, Some(self.total));
        Ok(n)
    }
}
