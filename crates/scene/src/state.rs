use catalog::{Line, LineCatalog};
use points::{Comment, SharePoint, SharePointStore, StoreError, check_record};
use tracing::{debug, info, warn};

use crate::candidate::PointCandidate;
use crate::layers::{LineLayer, SharePointLayer};
use crate::render::RenderScene;
use crate::visibility::Visibility;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    Store(StoreError),
    UnknownPoint(usize),
    /// The point at this index was never stored and has no id.
    MissingId(usize),
}

impl SceneError {
    pub fn is_network(&self) -> bool {
        matches!(self, SceneError::Store(e) if e.is_network())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SceneError::Store(e) if e.is_validation())
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Store(e) => write!(f, "{e}"),
            SceneError::UnknownPoint(index) => write!(f, "no share point at index {index}"),
            SceneError::MissingId(index) => write!(f, "share point {index} has no id"),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SceneError {
    fn from(e: StoreError) -> Self {
        SceneError::Store(e)
    }
}

fn checked(point: SharePoint) -> Result<SharePoint, StoreError> {
    check_record(&point).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(point)
}

/// What the map renders right now.
///
/// Owned by one session and mutated through `&mut self` only, so there is a
/// single writer. Failed operations leave the state as it was.
pub struct DisplayState<S> {
    catalog: LineCatalog,
    store: S,
    requested_year: i32,
    year: i32,
    line_layer: LineLayer,
    point_layer: SharePointLayer,
    points: Vec<SharePoint>,
}

impl<S: SharePointStore> DisplayState<S> {
    /// Starts at the earliest known year with both layers visible and no
    /// share points loaded.
    pub fn new(catalog: LineCatalog, store: S) -> Self {
        let year = catalog.index().first();
        Self {
            catalog,
            store,
            requested_year: year,
            year,
            line_layer: LineLayer::default(),
            point_layer: SharePointLayer::default(),
            points: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &LineCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolved (nearest known) year.
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn requested_year(&self) -> i32 {
        self.requested_year
    }

    pub fn lines(&self) -> &[Line] {
        self.catalog.dataset_for(self.year).lines
    }

    pub fn description(&self) -> &str {
        self.catalog.dataset_for(self.year).description
    }

    pub fn share_points(&self) -> &[SharePoint] {
        &self.points
    }

    pub fn show_lines(&self) -> bool {
        self.line_layer.visibility.visible
    }

    pub fn show_share_points(&self) -> bool {
        self.point_layer.visibility.visible
    }

    /// Move the timeline. Returns the year it snapped to.
    pub fn set_year(&mut self, requested: i32) -> i32 {
        self.requested_year = requested;
        self.year = self.catalog.nearest_year(requested);
        debug!("year {requested} resolved to {}", self.year);
        self.year
    }

    pub fn set_show_lines(&mut self, show: bool) {
        self.line_layer.visibility = Visibility::from(show);
    }

    pub fn set_show_share_points(&mut self, show: bool) {
        self.point_layer.visibility = Visibility::from(show);
    }

    /// Replace the point list with the store's. Returns the new count.
    pub async fn load_share_points(&mut self) -> Result<usize, SceneError> {
        let fetched = self
            .store
            .list()
            .await
            .inspect_err(|e| warn!("loading share points failed: {e}"))?;
        let fetched = fetched
            .into_iter()
            .map(checked)
            .collect::<Result<Vec<_>, _>>()?;
        info!("loaded {} share points", fetched.len());
        self.points = fetched;
        Ok(self.points.len())
    }

    /// Store a candidate and append the stored record.
    pub async fn submit_share_point(
        &mut self,
        candidate: PointCandidate,
    ) -> Result<&SharePoint, SceneError> {
        let created = self
            .store
            .create(candidate.into_payload())
            .await
            .inspect_err(|e| warn!("submitting share point failed: {e}"))?;
        let created = checked(created)?;
        self.points.push(created);
        let index = self.points.len() - 1;
        Ok(&self.points[index])
    }

    /// Add a comment to the point at `index` and replace it with the store's
    /// updated record.
    pub async fn submit_comment(
        &mut self,
        index: usize,
        comment: Comment,
    ) -> Result<&SharePoint, SceneError> {
        let id = self.point_id(index)?;
        let updated = self
            .store
            .add_comment(&id, comment)
            .await
            .inspect_err(|e| warn!("submitting comment on {id} failed: {e}"))?;
        let updated = checked(updated)?;
        self.points[index] = updated;
        Ok(&self.points[index])
    }

    /// Delete the point at `index`. It is dropped from the list only when the
    /// store reports success.
    pub async fn remove_share_point(
        &mut self,
        index: usize,
        password: &str,
    ) -> Result<bool, SceneError> {
        let id = self.point_id(index)?;
        let success = self.store.delete(&id, password).await?;
        if success {
            self.points.remove(index);
            info!("removed share point {id}");
        }
        Ok(success)
    }

    fn point_id(&self, index: usize) -> Result<String, SceneError> {
        let point = self
            .points
            .get(index)
            .ok_or(SceneError::UnknownPoint(index))?;
        point.id.clone().ok_or(SceneError::MissingId(index))
    }

    pub fn render(&self) -> RenderScene {
        let view = self.catalog.dataset_for(self.year);
        RenderScene {
            year: view.year,
            requested_year: self.requested_year,
            description: view.description.to_string(),
            lines: self.line_layer.extract(view.lines),
            points: self.point_layer.extract(&self.points),
        }
    }
}
