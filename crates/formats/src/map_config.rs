//! Declarative map description, deserialized once from JSON and then shared
//! read-only by every stage.

use foundation::Rgba;
use foundation::math::Projection;
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub projection: ProjectionConfig,
    pub map: MapViewConfig,
    pub table: TableSourceConfig,
    pub start_year: String,
    pub data_layer: DataLayerConfig,
    #[serde(default)]
    pub overlays: Vec<OverlayLayerConfig>,
    pub tooltip: TooltipConfig,
    #[serde(default)]
    pub no_data: NoDataConfig,
    #[serde(default)]
    pub legend: LegendConfig,
    #[serde(default)]
    pub slider: SliderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionConfig {
    /// Identifier such as `EPSG:3657`; informational.
    pub code: String,
    /// proj4-style definition string.
    pub def: String,
    /// Map units per pixel, one entry per integer zoom level.
    pub resolutions: Vec<f64>,
    #[serde(default)]
    pub origin: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapViewConfig {
    /// `[lat, lon]` in degrees.
    pub center: [f64; 2],
    pub zoom: f64,
    #[serde(default = "default_zoom_snap")]
    pub zoom_snap: f64,
    #[serde(default = "default_zoom_delta")]
    pub zoom_delta: f64,
    #[serde(default = "default_true")]
    pub scroll_wheel_zoom: bool,
    #[serde(default = "default_true")]
    pub dragging: bool,
    #[serde(default)]
    pub zoom_control: bool,
    /// `[[lat, lon], [lat, lon]]` corners limiting the view center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bounds: Option<[[f64; 2]; 2]>,
    #[serde(default)]
    pub max_bounds_viscosity: f64,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_background")]
    pub background: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSourceConfig {
    pub source: String,
    pub state_field: String,
    pub county_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataLayerConfig {
    pub source: String,
    /// Feature property holding the join identifier.
    pub id_field: String,
    /// Record columns that are not yearly observations.
    #[serde(default)]
    pub exclude: Vec<String>,
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub style: PathStyleConfig,
    #[serde(default)]
    pub hover: PathStyleConfig,
    #[serde(default)]
    pub unhover: PathStyleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayLayerConfig {
    pub source: String,
    #[serde(default)]
    pub style: PathStyleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationConfig {
    #[serde(default)]
    pub method: ClassificationMethod,
    pub classes: usize,
    pub palette: PaletteConfig,
    #[serde(default)]
    pub mode: InterpolationMode,
}

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    #[serde(alias = "e")]
    Equal,
    #[default]
    #[serde(alias = "q")]
    Quantile,
    #[serde(alias = "l")]
    Logarithmic,
    #[serde(alias = "k")]
    Kmeans,
}

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    Rgb,
    #[default]
    Lab,
    Lch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaletteConfig {
    /// A named ColorBrewer scheme, e.g. `OrRd`.
    Brewer {
        #[serde(alias = "color")]
        name: String,
    },
    /// Explicit color stops, low to high.
    Colors { colors: Vec<String> },
}

/// Optional path-style fields. Layers merge these over their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathStyleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TooltipConfig {
    /// Placeholders: `{year}`, `{value}`, and `{COLUMN}` for any record column.
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoDataConfig {
    pub color: String,
    pub text: String,
}

impl Default for NoDataConfig {
    fn default() -> Self {
        Self {
            color: "lightgrey".to_string(),
            text: "Data unavailable".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LegendConfig {
    pub position: ControlPosition,
    pub mobile_position: ControlPosition,
    /// Placeholder: `{year}`.
    pub title: String,
    /// Placeholders: `{lower}`, `{upper}`, `{color}`, `{class}`.
    pub entry: String,
    pub no_data_label: String,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            position: ControlPosition::TopRight,
            mobile_position: ControlPosition::BottomLeft,
            title: "{year}".to_string(),
            entry: "{lower} \u{2014} {upper}".to_string(),
            no_data_label: "No data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SliderConfig {
    pub position: ControlPosition,
    pub mobile_position: ControlPosition,
    /// Element id of the slider container in HTML output.
    pub element_id: String,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            position: ControlPosition::BottomLeft,
            mobile_position: ControlPosition::BottomRight,
            element_id: "ui-controls".to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_zoom_snap() -> f64 {
    1.0
}

fn default_zoom_delta() -> f64 {
    1.0
}

fn default_width() -> u32 {
    960
}

fn default_height() -> u32 {
    600
}

fn default_background() -> String {
    "#ffffff".to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnsupportedVersion { found: String },
    Invalid { field: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnsupportedVersion { found } => {
                write!(f, "unsupported config version: {found}")
            }
            ConfigError::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}

impl MapConfig {
    /// Structural checks that do not need the data. Palette names are checked
    /// when the color scale is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version.clone(),
            });
        }

        Projection::from_proj4(&self.projection.def)
            .map_err(|e| invalid("projection.def", e.to_string()))?;
        let res = &self.projection.resolutions;
        if res.is_empty() {
            return Err(invalid("projection.resolutions", "must not be empty"));
        }
        if res.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(invalid("projection.resolutions", "must be positive"));
        }

        let map = &self.map;
        if map.width == 0 || map.height == 0 {
            return Err(invalid("map.width/height", "must be positive"));
        }
        if !map.zoom.is_finite() || map.zoom < 0.0 {
            return Err(invalid("map.zoom", "must be a non-negative number"));
        }
        if !(map.zoom_snap >= 0.0) {
            return Err(invalid("map.zoom_snap", "must be non-negative"));
        }
        if !(map.center[0].abs() <= 90.0 && map.center[1].abs() <= 180.0) {
            return Err(invalid("map.center", "must be [lat, lon] in degrees"));
        }
        check_color("map.background", &map.background)?;

        for (field, value) in [
            ("table.source", &self.table.source),
            ("table.state_field", &self.table.state_field),
            ("table.county_field", &self.table.county_field),
            ("data_layer.source", &self.data_layer.source),
            ("data_layer.id_field", &self.data_layer.id_field),
            ("start_year", &self.start_year),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }

        let class = &self.data_layer.classification;
        if class.classes == 0 {
            return Err(invalid("data_layer.classification.classes", "must be at least 1"));
        }
        if let PaletteConfig::Colors { colors } = &class.palette {
            if colors.is_empty() {
                return Err(invalid("data_layer.classification.palette", "needs colors"));
            }
            for c in colors {
                check_color("data_layer.classification.palette", c)?;
            }
        }

        check_style("data_layer.style", &self.data_layer.style)?;
        check_style("data_layer.hover", &self.data_layer.hover)?;
        check_style("data_layer.unhover", &self.data_layer.unhover)?;
        for (i, overlay) in self.overlays.iter().enumerate() {
            if overlay.source.trim().is_empty() {
                return Err(invalid(format!("overlays[{i}].source"), "must not be empty"));
            }
            check_style(&format!("overlays[{i}].style"), &overlay.style)?;
        }

        check_color("no_data.color", &self.no_data.color)?;
        Ok(())
    }
}

fn check_color(field: &str, value: &str) -> Result<(), ConfigError> {
    Rgba::parse(value)
        .map(|_| ())
        .map_err(|e| invalid(field, e.to_string()))
}

fn check_style(field: &str, style: &PathStyleConfig) -> Result<(), ConfigError> {
    if let Some(c) = &style.color {
        check_color(&format!("{field}.color"), c)?;
    }
    if let Some(c) = &style.fill_color {
        check_color(&format!("{field}.fill_color"), c)?;
    }
    for (name, v) in [
        ("weight", style.weight),
        ("opacity", style.opacity),
        ("fill_opacity", style.fill_opacity),
    ] {
        if let Some(v) = v
            && (!v.is_finite() || v < 0.0)
        {
            return Err(invalid(format!("{field}.{name}"), "must be non-negative"));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        ClassificationMethod, ConfigError, InterpolationMode, MapConfig, PaletteConfig,
    };
    use pretty_assertions::assert_eq;

    pub(crate) const SAMPLE: &str = r##"{
        "version": "1.0",
        "projection": {
            "code": "EPSG:3657",
            "def": "+proj=lcc +lat_1=45.68333333333333 +lat_2=44.41666666666666 +lat_0=43.83333333333334 +lon_0=-100 +x_0=600000 +y_0=0 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs",
            "resolutions": [8192, 4096, 2048, 1024, 512, 256, 128],
            "origin": [0, 0]
        },
        "map": {"center": [47.1152105, -101.3031364], "zoom": 0.4, "zoom_snap": 0.1, "zoom_delta": 0.2},
        "table": {"source": "data/us-unemployment-counties.csv", "state_field": "STATE_FIP", "county_field": "COUNTY_FIP"},
        "start_year": "2001",
        "data_layer": {
            "source": "data/us-counties.json",
            "id_field": "GEOID",
            "exclude": ["COUNTY_FIP", "STATE_FIP", "NAME"],
            "classification": {"method": "q", "classes": 5, "palette": {"type": "brewer", "color": "OrRd"}, "mode": "lab"},
            "style": {"color": "black", "weight": 0.5, "fill_opacity": 1},
            "hover": {"color": "#ffd70090", "weight": 5},
            "unhover": {"color": "black", "weight": 1}
        },
        "overlays": [{"source": "data/boundary_lines.json", "style": {"color": "#333333", "weight": 2, "opacity": 1, "interactive": false}}],
        "tooltip": {"template": "<b>{NAME} County</b><br>{value}% Unemployment"},
        "no_data": {"color": "lightgrey", "text": "Data unavailable"}
    }"##;

    pub(crate) fn sample() -> MapConfig {
        serde_json::from_str(SAMPLE).expect("parse sample config")
    }

    #[test]
    fn parses_sample_with_defaults_and_aliases() {
        let cfg = sample();
        assert_eq!(cfg.data_layer.classification.method, ClassificationMethod::Quantile);
        assert_eq!(cfg.data_layer.classification.mode, InterpolationMode::Lab);
        assert_eq!(
            cfg.data_layer.classification.palette,
            PaletteConfig::Brewer {
                name: "OrRd".to_string()
            }
        );
        assert_eq!(cfg.map.width, 960);
        assert!(cfg.map.scroll_wheel_zoom);
        assert_eq!(cfg.legend.no_data_label, "No data");
        assert_eq!(cfg.slider.element_id, "ui-controls");
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_colors_and_counts() {
        let mut cfg = sample();
        cfg.data_layer.hover.color = Some("not-a-color".to_string());
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "data_layer.hover.color"
        ));

        let mut cfg = sample();
        cfg.data_layer.classification.classes = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = sample();
        cfg.version = "2.0".to_string();
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::UnsupportedVersion {
                found: "2.0".to_string()
            })
        );
    }

    #[test]
    fn rejects_bad_projection() {
        let mut cfg = sample();
        cfg.projection.def = "+proj=utm +zone=14".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "projection.def"
        ));
    }
}
