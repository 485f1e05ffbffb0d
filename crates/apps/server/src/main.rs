use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use points::{MemoryStore, SharePointStore};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod access_log;
mod api;
mod store;

use access_log::AccessLog;
use api::AppState;
use store::JsonFileStore;

#[derive(Clone, Debug)]
struct ServerConfig {
    addr: String,
    /// `None` keeps points in memory only.
    points_file: Option<PathBuf>,
    upload_dir: PathBuf,
    access_log: PathBuf,
    delete_password: Option<String>,
}

impl ServerConfig {
    fn from_env() -> Self {
        let data_root = env_var_path("SHARE_DATA_ROOT", PathBuf::from("data"));
        let points_file = match env::var("SHARE_POINTS_FILE") {
            Ok(v) if v.trim().is_empty() => None,
            Ok(v) => Some(PathBuf::from(v)),
            Err(_) => Some(data_root.join("points.json")),
        };
        Self {
            addr: env::var("SHARE_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            points_file,
            upload_dir: env_var_path("SHARE_UPLOAD_DIR", data_root.join("uploads")),
            access_log: env_var_path("SHARE_ACCESS_LOG", data_root.join("api_access_log.csv")),
            delete_password: env::var("SHARE_DELETE_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env();
    let addr: SocketAddr = match config.addr.parse() {
        Ok(a) => a,
        Err(err) => {
            error!("invalid SHARE_ADDR {:?}: {err}", config.addr);
            std::process::exit(1);
        }
    };
    if config.delete_password.is_none() {
        warn!("SHARE_DELETE_PASSWORD is not set; deletes will be refused");
    }

    let store: Arc<dyn SharePointStore> = match &config.points_file {
        Some(path) => {
            let store = JsonFileStore::new(path.clone())
                .with_delete_password(config.delete_password.clone());
            info!("share points stored in {}", store.path().display());
            Arc::new(store)
        }
        None => {
            warn!("SHARE_POINTS_FILE is empty; share points are kept in memory only");
            let store = MemoryStore::new();
            Arc::new(match config.delete_password.clone() {
                Some(pw) => store.with_delete_password(pw),
                None => store,
            })
        }
    };

    if let Err(err) = tokio::fs::create_dir_all(&config.upload_dir).await {
        warn!("failed to create upload dir: {err}");
    }

    let state = AppState {
        store,
        upload_dir: config.upload_dir.clone(),
    };
    let log = Arc::new(AccessLog::new(config.access_log.clone()));
    let app = api::router(state, log);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };
    info!("share point API listening on http://{addr}");
    info!("uploads served from http://{addr}/uploads/");
    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("server error: {err}");
    }
}

fn env_var_path(key: &str, default: PathBuf) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or(default)
}
