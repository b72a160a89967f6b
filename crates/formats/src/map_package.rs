use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data_loader::{DataSource, SourceKind, SourceLocation};
use crate::map_config::{ConfigError, MapConfig};

/// A validated config together with the directory its relative sources resolve against.
#[derive(Debug, Clone)]
pub struct MapPackage {
    root: PathBuf,
    config: MapConfig,
}

#[derive(Debug)]
pub enum MapPackageError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Config(ConfigError),
}

impl fmt::Display for MapPackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapPackageError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            MapPackageError::Parse(err) => write!(f, "config parse error: {err}"),
            MapPackageError::Config(err) => write!(f, "config error: {err}"),
        }
    }
}

impl std::error::Error for MapPackageError {}

impl MapPackage {
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self, MapPackageError> {
        let config_path = config_path.as_ref();
        let payload = fs::read_to_string(config_path).map_err(|e| MapPackageError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_json_str(&payload, root)
    }

    pub fn from_json_str(payload: &str, root: impl Into<PathBuf>) -> Result<Self, MapPackageError> {
        let config: MapConfig = serde_json::from_str(payload).map_err(MapPackageError::Parse)?;
        Self::new(config, root)
    }

    pub fn new(config: MapConfig, root: impl Into<PathBuf>) -> Result<Self, MapPackageError> {
        config.validate().map_err(MapPackageError::Config)?;
        Ok(Self {
            root: root.into(),
            config,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, source: &str) -> SourceLocation {
        if source.starts_with("http://") || source.starts_with("https://") {
            SourceLocation::Url(source.to_string())
        } else {
            SourceLocation::File(self.root.join(source))
        }
    }

    /// Every source the map needs: the table, the data layer, then overlays in order.
    pub fn sources(&self) -> Vec<DataSource> {
        let cfg = &self.config;
        let mut out = vec![
            DataSource::new("table", SourceKind::Table, self.resolve(&cfg.table.source)),
            DataSource::new(
                "data_layer",
                SourceKind::Geometry,
                self.resolve(&cfg.data_layer.source),
            ),
        ];
        for (i, overlay) in cfg.overlays.iter().enumerate() {
            out.push(DataSource::new(
                format!("overlay[{i}]"),
                SourceKind::Geometry,
                self.resolve(&overlay.source),
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{MapPackage, MapPackageError};
    use crate::data_loader::{SourceKind, SourceLocation};
    use crate::map_config::ConfigError;
    use crate::map_config::tests::{SAMPLE, sample};
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn loads_config_and_resolves_relative_sources() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("map.json");
        fs::write(&path, SAMPLE).expect("write config");

        let package = MapPackage::load(&path).expect("load package");
        assert_eq!(package.root(), dir.path());

        let sources = package.sources();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].kind, SourceKind::Table);
        assert_eq!(
            sources[1].location,
            SourceLocation::File(dir.path().join("data/us-counties.json"))
        );
        assert_eq!(sources[2].name, "overlay[0]");
    }

    #[test]
    fn urls_are_left_alone() {
        let package = MapPackage::new(sample(), PathBuf::from("/srv")).expect("package");
        assert_eq!(
            package.resolve("https://example.com/ky.geojson"),
            SourceLocation::Url("https://example.com/ky.geojson".to_string())
        );
    }

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = sample();
        cfg.version = "0.9".to_string();
        let err = MapPackage::new(cfg, "/srv").unwrap_err();
        assert!(matches!(
            err,
            MapPackageError::Config(ConfigError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = MapPackage::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, MapPackageError::Io { .. }));
    }
}
