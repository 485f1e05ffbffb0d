use std::path::{Path, PathBuf};

use points::{BoxFuture, Comment, NewSharePoint, SharePoint, SharePointStore, StoreError};
use tokio::sync::Mutex;
use tracing::info;

/// Share points persisted as one JSON array document.
///
/// Every mutation is load, modify, save under one lock; saves go to a temp
/// file that is renamed over the document.
pub struct JsonFileStore {
    path: PathBuf,
    delete_password: Option<String>,
    lock: Mutex<()>,
}

fn storage(e: impl std::fmt::Display) -> StoreError {
    StoreError::Storage(e.to_string())
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            delete_password: None,
            lock: Mutex::new(()),
        }
    }

    /// Without a password every delete is forbidden.
    pub fn with_delete_password(mut self, password: Option<String>) -> Self {
        self.delete_password = password;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_unlocked(&self) -> Result<Vec<SharePoint>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s).map_err(storage),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(storage(e)),
        }
    }

    async fn save_unlocked(&self, points: &[SharePoint]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(storage)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(points).map_err(storage)?;
        tokio::fs::write(&tmp, text).await.map_err(storage)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(storage)?;
        Ok(())
    }

    async fn list_locked(&self) -> Result<Vec<SharePoint>, StoreError> {
        let _g = self.lock.lock().await;
        self.load_unlocked().await
    }

    async fn create_locked(&self, point: NewSharePoint) -> Result<SharePoint, StoreError> {
        let point = point.validated()?;
        let record =
            SharePoint::from_new(point, uuid::Uuid::new_v4().to_string(), points::now_ms());

        let _g = self.lock.lock().await;
        let mut all = self.load_unlocked().await?;
        all.push(record.clone());
        self.save_unlocked(&all).await?;
        info!("created share point {:?} ({})", record.id, record.name);
        Ok(record)
    }

    async fn comment_locked(&self, id: &str, comment: Comment) -> Result<SharePoint, StoreError> {
        let comment = comment.validated()?;

        let _g = self.lock.lock().await;
        let mut all = self.load_unlocked().await?;
        let point = all
            .iter_mut()
            .find(|p| p.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound("Point not found".to_string()))?;
        point.comments.push(comment);
        let updated = point.clone();
        self.save_unlocked(&all).await?;
        Ok(updated)
    }

    async fn delete_locked(&self, id: &str, password: &str) -> Result<bool, StoreError> {
        if self.delete_password.as_deref() != Some(password) {
            return Err(StoreError::Forbidden("wrong password".to_string()));
        }

        let _g = self.lock.lock().await;
        let mut all = self.load_unlocked().await?;
        let before = all.len();
        all.retain(|p| p.id.as_deref() != Some(id));
        if all.len() == before {
            return Err(StoreError::NotFound("Point not found".to_string()));
        }
        self.save_unlocked(&all).await?;
        info!("deleted share point {id}");
        Ok(true)
    }
}

impl SharePointStore for JsonFileStore {
    fn list(&self) -> BoxFuture<'_, Result<Vec<SharePoint>, StoreError>> {
        Box::pin(self.list_locked())
    }

    fn create(&self, point: NewSharePoint) -> BoxFuture<'_, Result<SharePoint, StoreError>> {
        Box::pin(self.create_locked(point))
    }

    fn add_comment<'a>(
        &'a self,
        id: &'a str,
        comment: Comment,
    ) -> BoxFuture<'a, Result<SharePoint, StoreError>> {
        Box::pin(self.comment_locked(id, comment))
    }

    fn delete<'a>(
        &'a self,
        id: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<bool, StoreError>> {
        Box::pin(self.delete_locked(id, password))
    }
}
