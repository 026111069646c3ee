#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCRUBBED_ENV: [&str; 17] = [
    "REGISTRY_URL",
    "REGISTRY_USERNAME",
    "REGISTRY_PASSWORD",
    "CHARTS_URL",
    "CHARTS_USERNAME",
    "CHARTS_PASSWORD",
    "K8S_NAMESPACE",
    "KUBE_CONTEXT",
    "KUBECTL",
    "SERVICE_URL",
    "HEALTH_PATH",
    "RUST_LOG",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "http_proxy",
    "https_proxy",
];

/// Serves canned responses keyed by request path until the test process exits.
pub struct StubServer {
    pub base: String,
}

impl StubServer {
    pub fn start(routes: &[(&str, u16, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let routes: Vec<(String, u16, String)> = routes
            .iter()
            .map(|(p, s, b)| (p.to_string(), *s, b.to_string()))
            .collect();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                let path = head
                    .lines()
                    .next()
                    .and_then(|l| l.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, s, b)| (*s, b.clone()))
                    .unwrap_or((404, "{\"error\":\"not found\"}".to_string()));
                let response = format!(
                    "HTTP/1.1 {} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { base }
    }

    pub fn healthy() -> Self {
        Self::start(&[
            ("/v2/", 200, "{}"),
            ("/api/charts", 200, "[{\"name\":\"blacklist\",\"version\":\"1.0.0\"}]"),
            ("/health", 200, "{\"status\":\"ok\"}"),
            ("/api/stats", 200, "{\"total_ips\":0}"),
            ("/api/collection/status", 200, "{\"enabled\":true}"),
        ])
    }
}

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub bin: PathBuf,
    pub config: PathBuf,
}

impl TestEnv {
    /// Isolated workspace with a fake kubectl. Cluster answers start healthy.
    pub fn new(service_base: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let bin = root.join("bin");
        fs::create_dir_all(&bin).expect("create bin dir");
        write_fake_kubectl(&bin);

        let env = Self {
            config: root.join("verify.toml"),
            _tmp: tmp,
            root,
            bin,
        };
        env.write_config(service_base, "blacklist");
        env.cluster_ok("nodes", &nodes_json(1));
        env.cluster_ok("namespace", "namespace/blacklist\n");
        env.cluster_ok("pods", &pods_json(&["Running", "Running"]));
        env.cluster_ok(
            "services",
            &serde_json::json!({"items": [{"metadata": {"name": "blacklist"}}]}).to_string(),
        );
        env.cluster_ok(
            "applications",
            &serde_json::json!({"items": [{
                "metadata": {"name": "blacklist"},
                "status": {"sync": {"status": "Synced"}, "health": {"status": "Healthy"}}
            }]})
            .to_string(),
        );
        env
    }

    pub fn kubectl_path(&self) -> PathBuf {
        self.bin.join("kubectl")
    }

    pub fn write_config(&self, base: &str, namespace: &str) {
        let raw = format!(
            r#"[registry]
url = "{base}"

[chart_repo]
url = "{base}"

[cluster]
kubectl = "{kubectl}"
namespace = "{namespace}"

[service]
url = "{base}"

[probe]
timeout_secs = 2
"#,
            base = base,
            kubectl = self.kubectl_path().display(),
            namespace = namespace,
        );
        fs::write(&self.config, raw).expect("write config");
    }

    pub fn cluster_ok(&self, kind: &str, stdout: &str) {
        let _ = fs::remove_file(self.bin.join(format!("{}.err", kind)));
        fs::write(self.bin.join(format!("{}.out", kind)), stdout).expect("write kubectl fixture");
    }

    pub fn cluster_err(&self, kind: &str, stderr: &str) {
        fs::write(self.bin.join(format!("{}.err", kind)), stderr).expect("write kubectl fixture");
    }

    pub fn cluster_down(&self) {
        for kind in ["nodes", "namespace", "pods", "services", "applications"] {
            self.cluster_err(
                kind,
                "Unable to connect to the server: dial tcp 127.0.0.1:6443: connect: connection refused\n",
            );
        }
    }

    /// Command without any config selection flags.
    pub fn bare_cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("deploy-verify");
        cmd.current_dir(&self.root).env("HOME", &self.root);
        for key in SCRUBBED_ENV {
            cmd.env_remove(key);
        }
        cmd
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.arg("--config").arg(&self.config);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

fn write_fake_kubectl(bin: &Path) {
    let script = r#"#!/bin/sh
dir="$(dirname "$0")"
kind=""
prev=""
for a in "$@"; do
  if [ "$prev" = "get" ]; then kind="$a"; fi
  prev="$a"
done
echo "$@" >> "$dir/calls.log"
if [ -f "$dir/$kind.err" ]; then cat "$dir/$kind.err" >&2; exit 1; fi
if [ -f "$dir/$kind.out" ]; then cat "$dir/$kind.out"; exit 0; fi
echo "error: the server doesn't have a resource type \"$kind\"" >&2
exit 1
"#;
    let path = bin.join("kubectl");
    fs::write(&path, script).expect("write fake kubectl");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).expect("kubectl metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod kubectl");
    }
}

pub fn pods_json(phases: &[&str]) -> String {
    let items: Vec<Value> = phases
        .iter()
        .enumerate()
        .map(|(i, phase)| {
            serde_json::json!({
                "metadata": {"name": format!("blacklist-{}", i)},
                "status": {"phase": phase}
            })
        })
        .collect();
    serde_json::json!({"apiVersion": "v1", "kind": "List", "items": items}).to_string()
}

pub fn nodes_json(count: usize) -> String {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "metadata": {"name": format!("node-{}", i)},
                "status": {"conditions": [{"type": "Ready", "status": "True"}]}
            })
        })
        .collect();
    serde_json::json!({"apiVersion": "v1", "kind": "List", "items": items}).to_string()
}

pub fn result<'a>(report: &'a Value, name: &str) -> &'a Value {
    report["data"]["results"]
        .as_array()
        .expect("results array")
        .iter()
        .find(|r| r["name"] == name)
        .unwrap_or_else(|| panic!("no result for {}", name))
}
