//! Concurrent, fail-fast loading of every data source a map needs.
//!
//! All fetches are started together and awaited as a group. The first failure
//! drops the remaining fetches and is returned; partial results are never
//! handed to the caller.

use std::fmt;
use std::path::PathBuf;

use futures_util::future::try_join_all;
use tracing::debug;

use crate::geojson::{FeatureCollection, GeoJsonError};
use crate::table::{Table, TableError};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Geometry,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::File(p) => write!(f, "{}", p.display()),
            SourceLocation::Url(u) => write!(f, "{u}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub name: String,
    pub kind: SourceKind,
    pub location: SourceLocation,
}

impl DataSource {
    pub fn new(name: impl Into<String>, kind: SourceKind, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            kind,
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadedSource {
    Geometry(FeatureCollection),
    Table(Table),
}

#[derive(Debug)]
pub enum LoadErrorKind {
    Io(std::io::Error),
    Http(reqwest::Error),
    Geometry(GeoJsonError),
    Table(TableError),
}

#[derive(Debug)]
pub struct LoadError {
    pub source_name: String,
    pub location: SourceLocation,
    pub kind: LoadErrorKind,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load {} from {}: ", self.source_name, self.location)?;
        match &self.kind {
            LoadErrorKind::Io(e) => write!(f, "{e}"),
            LoadErrorKind::Http(e) => write!(f, "{e}"),
            LoadErrorKind::Geometry(e) => write!(f, "{e}"),
            LoadErrorKind::Table(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            LoadErrorKind::Io(e) => Some(e),
            LoadErrorKind::Http(e) => Some(e),
            LoadErrorKind::Geometry(e) => Some(e),
            LoadErrorKind::Table(e) => Some(e),
        }
    }
}

/// Everything a map needs, split out of the loaded sources.
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    pub table: Table,
    pub data_layer: FeatureCollection,
    pub overlays: Vec<FeatureCollection>,
}

impl MapData {
    /// Expects the ordering produced by `MapPackage::sources`: the table, the
    /// data layer, then overlays.
    pub fn from_loaded(loaded: Vec<LoadedSource>) -> Option<Self> {
        let mut iter = loaded.into_iter();
        let LoadedSource::Table(table) = iter.next()? else {
            return None;
        };
        let LoadedSource::Geometry(data_layer) = iter.next()? else {
            return None;
        };
        let mut overlays = Vec::new();
        for item in iter {
            let LoadedSource::Geometry(fc) = item else {
                return None;
            };
            overlays.push(fc);
        }
        Some(Self {
            table,
            data_layer,
            overlays,
        })
    }
}

/// Loads all sources concurrently; results keep the input order.
pub async fn load_all(sources: &[DataSource]) -> Result<Vec<LoadedSource>, LoadError> {
    try_join_all(sources.iter().map(load_one)).await
}

pub async fn load_one(source: &DataSource) -> Result<LoadedSource, LoadError> {
    let fail = |kind| LoadError {
        source_name: source.name.clone(),
        location: source.location.clone(),
        kind,
    };

    let payload = fetch_text(&source.location).await.map_err(fail)?;
    debug!(
        source = %source.name,
        location = %source.location,
        bytes = payload.len(),
        "fetched source"
    );

    match source.kind {
        SourceKind::Geometry => FeatureCollection::from_geojson_str(&payload)
            .map(LoadedSource::Geometry)
            .map_err(|e| fail(LoadErrorKind::Geometry(e))),
        SourceKind::Table => Table::from_csv_str(&payload)
            .map(LoadedSource::Table)
            .map_err(|e| fail(LoadErrorKind::Table(e))),
    }
}

async fn fetch_text(location: &SourceLocation) -> Result<String, LoadErrorKind> {
    match location {
        SourceLocation::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(LoadErrorKind::Io),
        SourceLocation::Url(url) => {
            let resp = reqwest::get(url.as_str())
                .await
                .and_then(|r| r.error_for_status())
                .map_err(LoadErrorKind::Http)?;
            resp.text().await.map_err(LoadErrorKind::Http)
        }
    }
}
