use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, Path as AxumPath, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{middleware, Json, Router};
use points::upload::{self, MAX_FILES, MAX_FILE_BYTES};
use points::{
    decode_comment, decode_new_point, DeleteRequest, DeleteResponse, SharePoint, SharePointStore,
    StoreError, UploadResponse, ValidationError,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::access_log::{self, AccessLog};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SharePointStore>,
    pub upload_dir: PathBuf,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

fn validation_error(e: ValidationError) -> (StatusCode, Json<Value>) {
    api_error(StatusCode::BAD_REQUEST, e.to_string())
}

fn store_error(e: StoreError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("share point store failed: {e}");
    }
    api_error(status, e.to_string())
}

pub fn router(state: AppState, log: Arc<AccessLog>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS]);

    // Multipart framing on top of the largest accepted payload.
    let upload_limit = MAX_FILES * MAX_FILE_BYTES + 1024 * 1024;

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/points", get(list_points).post(create_point))
        .route("/api/points/:id", delete(delete_point))
        .route("/api/points/:id/comments", post(add_comment))
        .route(
            "/api/upload",
            post(upload_images).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
        .layer(middleware::from_fn_with_state(log, access_log::record))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn list_points(State(state): State<AppState>) -> ApiResult<Vec<SharePoint>> {
    let points = state.store.list().await.map_err(store_error)?;
    Ok(Json(points))
}

async fn create_point(State(state): State<AppState>, body: Bytes) -> ApiResult<SharePoint> {
    let point = decode_new_point(&body).map_err(validation_error)?;
    let created = state.store.create(point).await.map_err(store_error)?;
    Ok(Json(created))
}

async fn add_comment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    body: Bytes,
) -> ApiResult<SharePoint> {
    let comment = decode_comment(&body).map_err(validation_error)?;
    let updated = state
        .store
        .add_comment(&id, comment)
        .await
        .map_err(store_error)?;
    Ok(Json(updated))
}

fn delete_failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = DeleteResponse {
        success: false,
        message: Some(message.into()),
    };
    (status, Json(body)).into_response()
}

async fn delete_point(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    body: Bytes,
) -> Response {
    let request: DeleteRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return delete_failure(StatusCode::BAD_REQUEST, format!("malformed payload: {e}")),
    };

    match state.store.delete(&id, &request.password).await {
        Ok(success) => Json(DeleteResponse {
            success,
            message: None,
        })
        .into_response(),
        Err(StoreError::Forbidden(msg)) => delete_failure(StatusCode::FORBIDDEN, msg),
        Err(StoreError::NotFound(msg)) => delete_failure(StatusCode::NOT_FOUND, msg),
        Err(e) => {
            error!("deleting share point {id} failed: {e}");
            delete_failure(StatusCode::INTERNAL_SERVER_ERROR, "delete failed")
        }
    }
}

struct AcceptedFile {
    stored_name: String,
    bytes: Bytes,
}

async fn upload_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let mut accepted = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?
    {
        if field.name() != Some(upload::FIELD_NAME) {
            continue;
        }
        if accepted.len() == MAX_FILES {
            return Err(validation_error(ValidationError::TooManyFiles { max: MAX_FILES }));
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;
        let ext = upload::check_file(&file_name, content_type.as_deref(), bytes.len())
            .map_err(validation_error)?;
        accepted.push(AcceptedFile {
            stored_name: upload::stored_name(&ext),
            bytes,
        });
    }
    upload::check_file_count(accepted.len()).map_err(validation_error)?;

    let urls = write_uploads(&state.upload_dir, &accepted)
        .await
        .map_err(|e| {
            error!("storing upload failed: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "File upload failed")
        })?;
    info!("stored {} uploaded images", urls.len());
    Ok(Json(UploadResponse { urls }))
}

/// Write every file or none: on failure the files already written are removed.
async fn write_uploads(dir: &Path, files: &[AcceptedFile]) -> std::io::Result<Vec<String>> {
    tokio::fs::create_dir_all(dir).await?;
    let mut urls = Vec::with_capacity(files.len());
    for (i, file) in files.iter().enumerate() {
        if let Err(e) = tokio::fs::write(dir.join(&file.stored_name), &file.bytes).await {
            for written in &files[..i] {
                if let Err(rm) = tokio::fs::remove_file(dir.join(&written.stored_name)).await {
                    warn!("failed to remove partial upload {}: {rm}", written.stored_name);
                }
            }
            return Err(e);
        }
        urls.push(upload::public_url(&file.stored_name));
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use foundation::CanonicalPoint;
    use points::{
        ClientConfig, Comment, HttpStore, ImageUpload, ImageUploader, NewSharePoint,
        SharePointStore, StoreError,
    };

    use axum::body::Bytes;

    use super::{router, write_uploads, AcceptedFile, AppState};
    use crate::access_log::AccessLog;
    use crate::store::JsonFileStore;

    struct TestServer {
        base: String,
        dir: tempfile::TempDir,
    }

    async fn spawn_server(password: Option<&str>) -> TestServer {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("points.json"))
            .with_delete_password(password.map(str::to_string));
        let state = AppState {
            store: Arc::new(store),
            upload_dir: dir.path().join("uploads"),
        };
        let log = Arc::new(AccessLog::new(dir.path().join("access.csv")));
        let app = router(state, log);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });
        TestServer {
            base: format!("http://{addr}"),
            dir,
        }
    }

    fn client(server: &TestServer) -> HttpStore {
        HttpStore::new(ClientConfig::new(server.base.clone())).unwrap()
    }

    fn candidate(name: &str) -> NewSharePoint {
        let p = CanonicalPoint::new(116.397428, 39.90923).unwrap();
        NewSharePoint::new(p, name, "gate", Vec::new())
    }

    #[tokio::test]
    async fn create_list_and_comment() {
        let server = spawn_server(None).await;
        let store = client(&server);

        let created = store.create(candidate("Qianmen")).await.unwrap();
        let id = created.id.clone().unwrap();
        assert_eq!(created.position().unwrap().lon_lat(), (116.397428, 39.90923));

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![created.clone()]);

        let updated = store
            .add_comment(&id, Comment::new("li", "still standing", 9, Vec::new()))
            .await
            .unwrap();
        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.id, created.id);

        let err = store
            .add_comment("missing", Comment::new("li", "x", 9, Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)), "{err}");
    }

    #[tokio::test]
    async fn malformed_payloads_get_400() {
        let server = spawn_server(None).await;
        let http = reqwest::Client::new();
        for body in [
            r#"{"name": 1, "lat": 1, "lon": 2}"#,
            r#"{"name": "a", "lat": 100, "lon": 2}"#,
            r#"not json"#,
        ] {
            let resp = http
                .post(format!("{}/api/points", server.base))
                .header("content-type", "application/json")
                .body(body)
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST, "{body}");
            let v: serde_json::Value = resp.json().await.unwrap();
            assert!(v["error"].is_string());
        }
        assert!(client(&server).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_checks_the_password() {
        let server = spawn_server(Some("pw")).await;
        let store = client(&server);
        let id = store.create(candidate("temp")).await.unwrap().id.unwrap();

        let err = store.delete(&id, "wrong").await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)), "{err}");
        assert_eq!(store.list().await.unwrap().len(), 1);

        assert!(store.delete(&id, "pw").await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_password_forbids_every_delete() {
        let server = spawn_server(None).await;
        let store = client(&server);
        let id = store.create(candidate("kept")).await.unwrap().id.unwrap();
        assert!(matches!(
            store.delete(&id, "").await,
            Err(StoreError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn uploads_are_stored_and_served() {
        let server = spawn_server(None).await;
        let store = client(&server);
        let png = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        let urls = store
            .upload(vec![ImageUpload::from_file_name("Shot.PNG", png.clone()).unwrap()])
            .await
            .unwrap();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("/uploads/"));
        assert!(urls[0].ends_with(".png"));

        let served = reqwest::get(store.absolute_url(&urls[0]))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(served.to_vec(), png);
    }

    #[tokio::test]
    async fn uploads_reject_non_images() {
        let server = spawn_server(None).await;
        let form = reqwest::multipart::Form::new().part(
            "files",
            reqwest::multipart::Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_str("text/plain")
                .unwrap(),
        );
        let resp = reqwest::Client::new()
            .post(format!("{}/api/upload", server.base))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

        let empty = reqwest::multipart::Form::new().text("other", "x");
        let resp = reqwest::Client::new()
            .post(format!("{}/api/upload", server.base))
            .multipart(empty)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn requests_are_logged() {
        let server = spawn_server(None).await;
        client(&server).list().await.unwrap();
        let text = std::fs::read_to_string(server.dir.path().join("access.csv")).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("url,method,ip,time_ms"));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(&row[..3], &["/api/points", "GET", "127.0.0.1"]);
        assert!(row[3].parse::<u64>().is_ok());
    }

    #[tokio::test]
    async fn failed_uploads_leave_no_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            AcceptedFile {
                stored_name: "first.png".into(),
                bytes: Bytes::from_static(b"one"),
            },
            AcceptedFile {
                stored_name: "missing/second.png".into(),
                bytes: Bytes::from_static(b"two"),
            },
        ];
        assert!(write_uploads(dir.path(), &files).await.is_err());
        assert!(!dir.path().join("first.png").exists());

        let urls = write_uploads(dir.path(), &files[..1]).await.unwrap();
        assert_eq!(urls, vec!["/uploads/first.png".to_string()]);
        assert_eq!(std::fs::read(dir.path().join("first.png")).unwrap(), b"one");
    }
}
