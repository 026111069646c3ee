//! Single-shot access to external systems.
//!
//! Every probe issues exactly one call bounded by the configured timeout and
//! never retries. Errors are classified into [`ProbeError`] so checks can turn
//! them into results without inspecting transport details.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on how much of a response body is kept.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{target} unreachable: {reason}")]
    Unreachable { target: String, reason: String },
    #[error("{target} did not answer within {secs}s")]
    Timeout { target: String, secs: u64 },
    #[error("not found: {resource}")]
    NotFound { resource: String },
    #[error("{target} answered unexpectedly: {reason}")]
    UnexpectedResponse { target: String, reason: String },
    #[error("{tool} not found on PATH")]
    ToolMissing { tool: String },
    #[error("{tool} failed: {reason}")]
    Command { tool: String, reason: String },
}

impl ProbeError {
    /// A missing tool says nothing about the target itself.
    pub fn is_inconclusive(&self) -> bool {
        matches!(self, ProbeError::ToolMissing { .. })
    }
}

#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

impl BasicAuth {
    pub fn from_parts(username: Option<&String>, password: Option<&String>) -> Option<Self> {
        username.map(|u| BasicAuth {
            username: u.clone(),
            password: password.cloned(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait HttpProbe {
    fn get(&self, url: &str, auth: Option<&BasicAuth>) -> Result<HttpResponse, ProbeError>;
}

pub trait ClusterProbe {
    /// Runs one read-only kubectl query and returns stdout.
    fn query(&self, args: &[&str]) -> Result<String, ProbeError>;

    /// Human-readable form of the query for reports.
    fn describe(&self, args: &[&str]) -> String {
        format!("kubectl {}", args.join(" "))
    }
}

pub struct ReqwestProbe {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("deploy-verify/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }
}

impl HttpProbe for ReqwestProbe {
    fn get(&self, url: &str, auth: Option<&BasicAuth>) -> Result<HttpResponse, ProbeError> {
        let mut req = self.client.get(url);
        if let Some(a) = auth {
            req = req.basic_auth(&a.username, a.password.as_ref());
        }
        let resp = req.send().map_err(|e| classify_reqwest(url, self.timeout, &e))?;
        let status = resp.status().as_u16();
        let body = read_capped(resp, MAX_BODY_BYTES).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                ProbeError::Timeout {
                    target: url.to_string(),
                    secs: self.timeout.as_secs(),
                }
            } else {
                ProbeError::Unreachable {
                    target: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        Ok(HttpResponse { status, body })
    }
}

/// Reads at most `limit` bytes; anything past it is dropped.
pub fn read_capped(reader: impl Read, limit: u64) -> std::io::Result<String> {
    let mut buf = Vec::new();
    reader.take(limit).read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn classify_reqwest(url: &str, timeout: Duration, e: &reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout {
            target: url.to_string(),
            secs: timeout.as_secs(),
        }
    } else {
        ProbeError::Unreachable {
            target: url.to_string(),
            reason: root_cause(e),
        }
    }
}

fn root_cause(e: &(dyn std::error::Error + 'static)) -> String {
    let mut cur = e;
    while let Some(next) = cur.source() {
        cur = next;
    }
    cur.to_string()
}

pub struct KubectlProbe {
    binary: String,
    context: Option<String>,
    timeout: Duration,
}

impl KubectlProbe {
    pub fn new(binary: &str, context: Option<&str>, timeout: Duration) -> Self {
        Self {
            binary: binary.to_string(),
            context: context.map(str::to_string),
            timeout,
        }
    }

    fn resolve(&self) -> Result<PathBuf, ProbeError> {
        which::which(&self.binary).map_err(|_| ProbeError::ToolMissing {
            tool: self.binary.clone(),
        })
    }

    fn full_args(&self, args: &[&str]) -> Vec<String> {
        let mut out = Vec::with_capacity(args.len() + 3);
        if let Some(ctx) = &self.context {
            out.push("--context".to_string());
            out.push(ctx.clone());
        }
        out.push(format!("--request-timeout={}s", self.timeout.as_secs()));
        out.extend(args.iter().map(|a| a.to_string()));
        out
    }
}

impl ClusterProbe for KubectlProbe {
    fn query(&self, args: &[&str]) -> Result<String, ProbeError> {
        let bin = self.resolve()?;
        let full = self.full_args(args);
        tracing::debug!(binary = %bin.display(), args = ?full, "running kubectl");
        let spawn_err = |e: std::io::Error| ProbeError::Command {
            tool: self.binary.clone(),
            reason: e.to_string(),
        };
        let mut child = Command::new(&bin)
            .args(&full)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // Drain both pipes off-thread so a chatty kubectl cannot stall on a full pipe.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let status = loop {
            match child.try_wait().map_err(spawn_err)? {
                Some(status) => break status,
                None if started.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!(args = ?full, "kubectl overran its deadline and was killed");
                    return Err(ProbeError::Timeout {
                        target: self.describe(args),
                        secs: self.timeout.as_secs(),
                    });
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        let stdout = collect(stdout);
        if status.success() {
            return Ok(stdout);
        }
        let stderr = collect(stderr).trim().to_string();
        Err(classify_kubectl_failure(
            &self.describe(args),
            self.timeout,
            &stderr,
        ))
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn drain(mut pipe: impl Read + Send + 'static) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default()
}

pub fn classify_kubectl_failure(target: &str, timeout: Duration, stderr: &str) -> ProbeError {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("notfound")
        || lower.contains("not found")
        || lower.contains("doesn't have a resource type")
        || lower.contains("could not find the requested resource")
    {
        ProbeError::NotFound {
            resource: first_line(stderr),
        }
    } else if lower.contains("timeout") || lower.contains("deadline exceeded") {
        ProbeError::Timeout {
            target: target.to_string(),
            secs: timeout.as_secs(),
        }
    } else if lower.contains("unable to connect")
        || lower.contains("connection refused")
        || lower.contains("no such host")
    {
        ProbeError::Unreachable {
            target: target.to_string(),
            reason: first_line(stderr),
        }
    } else {
        ProbeError::Command {
            tool: "kubectl".to_string(),
            reason: if stderr.is_empty() {
                "exited with non-zero status".to_string()
            } else {
                first_line(stderr)
            },
        }
    }
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or_default().trim().to_string()
}
