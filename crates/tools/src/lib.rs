//! Helpers behind the `rails` command-line front end.

use std::path::{Path, PathBuf};

use catalog::LineCatalog;
use foundation::math::{gcj02_to_wgs84, haversine_m, wgs84_to_gcj02};
use foundation::GeoError;
use points::ImageUpload;
use serde::Serialize;
use tracing::debug;

/// Catalog used when no `--catalog` is given and `RAILS_CATALOG_DIR` is unset.
pub const BUNDLED_CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/catalog");

pub fn default_catalog_dir() -> PathBuf {
    std::env::var("RAILS_CATALOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(BUNDLED_CATALOG))
}

/// One coordinate conversion, `[lon, lat]` in and out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub from: &'static str,
    pub to: &'static str,
    pub input: [f64; 2],
    pub output: [f64; 2],
    /// Surface distance between input and output.
    pub shift_m: f64,
}

fn conversion(
    from: &'static str,
    to: &'static str,
    lon: f64,
    lat: f64,
    (out_lon, out_lat): (f64, f64),
) -> Conversion {
    Conversion {
        from,
        to,
        input: [lon, lat],
        output: [out_lon, out_lat],
        shift_m: haversine_m(lon, lat, out_lon, out_lat),
    }
}

pub fn to_display(lon: f64, lat: f64) -> Result<Conversion, GeoError> {
    let out = wgs84_to_gcj02(lon, lat)?;
    Ok(conversion("WGS-84", "GCJ-02", lon, lat, out))
}

pub fn to_canonical(lon: f64, lat: f64) -> Result<Conversion, GeoError> {
    let out = gcj02_to_wgs84(lon, lat)?;
    Ok(conversion("GCJ-02", "WGS-84", lon, lat, out))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearReport {
    pub requested: i32,
    pub year: i32,
    pub known_years: Vec<i32>,
    pub description: String,
    pub lines: Vec<String>,
}

pub fn resolve_year(catalog: &LineCatalog, requested: i32) -> YearReport {
    let view = catalog.dataset_for(requested);
    YearReport {
        requested,
        year: view.year,
        known_years: catalog.index().years().to_vec(),
        description: view.description.to_string(),
        lines: view.lines.iter().map(|l| l.name.clone()).collect(),
    }
}

/// Read image files for upload. The content type comes from the extension.
pub fn read_images(paths: &[PathBuf]) -> Result<Vec<ImageUpload>, String> {
    paths.iter().map(|p| read_image(p)).collect()
}

fn read_image(path: &Path) -> Result<ImageUpload, String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("{}: not a file name", path.display()))?;
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    debug!("read {} ({} bytes)", path.display(), bytes.len());
    let upload = ImageUpload::from_file_name(name, bytes).map_err(|e| e.to_string())?;
    upload.check().map_err(|e| e.to_string())?;
    Ok(upload)
}
