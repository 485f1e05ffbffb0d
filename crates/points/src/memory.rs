use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::now_ms;
use crate::record::{Comment, NewSharePoint, SharePoint};
use crate::store::{BoxFuture, SharePointStore, StoreError};

/// In-process store. Validates like the remote service does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    points: RwLock<Vec<SharePoint>>,
    delete_password: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points(points: Vec<SharePoint>) -> Self {
        Self {
            points: RwLock::new(points),
            delete_password: None,
        }
    }

    /// Without a password every delete is forbidden.
    pub fn with_delete_password(mut self, password: impl Into<String>) -> Self {
        self.delete_password = Some(password.into());
        self
    }

    pub fn len(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().is_empty()
    }

    fn create_now(&self, point: NewSharePoint) -> Result<SharePoint, StoreError> {
        let point = point.validated()?;
        let record = SharePoint::from_new(point, Uuid::new_v4().to_string(), now_ms());
        self.points.write().push(record.clone());
        debug!("created share point {:?}", record.id);
        Ok(record)
    }

    fn comment_now(&self, id: &str, comment: Comment) -> Result<SharePoint, StoreError> {
        let comment = comment.validated()?;
        let mut points = self.points.write();
        let point = points
            .iter_mut()
            .find(|p| p.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(format!("share point {id}")))?;
        point.comments.push(comment);
        Ok(point.clone())
    }

    fn delete_now(&self, id: &str, password: &str) -> Result<bool, StoreError> {
        if self.delete_password.as_deref() != Some(password) {
            return Err(StoreError::Forbidden("wrong password".to_string()));
        }
        let mut points = self.points.write();
        let before = points.len();
        points.retain(|p| p.id.as_deref() != Some(id));
        if points.len() == before {
            return Err(StoreError::NotFound(format!("share point {id}")));
        }
        Ok(true)
    }
}

impl SharePointStore for MemoryStore {
    fn list(&self) -> BoxFuture<'_, Result<Vec<SharePoint>, StoreError>> {
        let points = self.points.read().clone();
        Box::pin(async move { Ok(points) })
    }

    fn create(&self, point: NewSharePoint) -> BoxFuture<'_, Result<SharePoint, StoreError>> {
        Box::pin(async move { self.create_now(point) })
    }

    fn add_comment<'a>(
        &'a self,
        id: &'a str,
        comment: Comment,
    ) -> BoxFuture<'a, Result<SharePoint, StoreError>> {
        Box::pin(async move { self.comment_now(id, comment) })
    }

    fn delete<'a>(
        &'a self,
        id: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<bool, StoreError>> {
        Box::pin(async move { self.delete_now(id, password) })
    }
}

#[cfg(test)]
mod tests {
    use foundation::CanonicalPoint;
    use pretty_assertions::assert_eq;

    use super::MemoryStore;
    use crate::record::{Comment, NewSharePoint};
    use crate::store::{SharePointStore, StoreError};

    fn candidate(name: &str) -> NewSharePoint {
        let p = CanonicalPoint::new(116.39, 39.9).unwrap();
        NewSharePoint::new(p, name, "", Vec::new())
    }

    #[tokio::test]
    async fn create_assigns_ids_and_trims() {
        let store = MemoryStore::new();
        let a = store.create(candidate("  Qianmen ")).await.unwrap();
        let b = store.create(candidate("Qianmen")).await.unwrap();
        assert_eq!(a.name, "Qianmen");
        assert!(a.id.is_some());
        assert_ne!(a.id, b.id);
        assert!(a.comments.is_empty());
        assert!(a.timestamp.is_some());
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_rejects_invalid_payloads() {
        let store = MemoryStore::new();
        let err = store.create(candidate(" ")).await.unwrap_err();
        assert!(err.is_validation());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn comments_return_the_full_record() {
        let store = MemoryStore::new();
        let p = store.create(candidate("Fengtai")).await.unwrap();
        let id = p.id.clone().unwrap();

        let updated = store
            .add_comment(&id, Comment::new("li", "old platform", 7, Vec::new()))
            .await
            .unwrap();
        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.comments[0].contents, "old platform");
        assert_eq!(updated.name, "Fengtai");

        let err = store
            .add_comment("missing", Comment::new("li", "x", 7, Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_requires_the_password() {
        let store = MemoryStore::new().with_delete_password("s3cret");
        let p = store.create(candidate("gone")).await.unwrap();
        let id = p.id.unwrap();

        assert!(matches!(
            store.delete(&id, "nope").await,
            Err(StoreError::Forbidden(_))
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.delete(&id, "s3cret").await, Ok(true));
        assert!(store.is_empty());
        assert!(matches!(
            store.delete(&id, "s3cret").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_without_configured_password_is_forbidden() {
        let store = MemoryStore::new();
        let p = store.create(candidate("kept")).await.unwrap();
        assert!(matches!(
            store.delete(p.id.as_deref().unwrap(), "").await,
            Err(StoreError::Forbidden(_))
        ));
    }
}
