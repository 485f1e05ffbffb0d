use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

const HEADER: &str = "url,method,ip,time_ms\n";

/// Append-only CSV request log.
pub struct AccessLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AccessLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub async fn append(
        &self,
        url: &str,
        method: &str,
        ip: &str,
        time_ms: u64,
    ) -> std::io::Result<()> {
        let _g = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        if file.metadata().await?.len() == 0 {
            file.write_all(HEADER.as_bytes()).await?;
        }
        let line = format!("{},{},{},{}\n", csv_field(url), method, csv_field(ip), time_ms);
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn client_ip(req: &Request<Body>) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Middleware recording every request before it is handled.
pub async fn record(State(log): State<Arc<AccessLog>>, req: Request, next: Next) -> Response {
    let url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let method = req.method().to_string();
    let ip = client_ip(&req);

    if let Err(err) = log.append(&url, &method, &ip, points::now_ms()).await {
        warn!("access log write failed: {err}");
    }
    next.run(req).await
}
