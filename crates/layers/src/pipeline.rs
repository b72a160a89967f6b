//! Builds a ready-to-render [`MapView`] from a validated config and loaded data.
//!
//! Order matters: join once, gather observations over every year column,
//! classify once, then color. Year changes afterwards only re-read the joined
//! records.

use std::fmt;

use compute::{
    Classification, ClassifyError, JoinKeys, JoinReport, Statistics, Summary,
    collect_observations, join, value_columns,
};
use foundation::{ColorParseError, Rgba};
use formats::{MapConfig, MapData, PathStyleConfig};
use tracing::info;

use crate::choropleth::{ChoroplethLayer, ChoroplethStyles, NoData};
use crate::legend::{Legend, RangeEntry};
use crate::overlay::OverlayLayer;
use crate::scale::{ColorScale, Colorizer, ScaleError};
use crate::slider::{SliderError, YearSlider};
use crate::symbology::{PathStyle, StylePatch};
use crate::tooltip::PlaceholderTooltip;
use crate::view::{MapState, MapView};

const DATA_LAYER_ID: u64 = 1;

#[derive(Debug)]
pub enum BuildError {
    Slider(SliderError),
    Classify(ClassifyError),
    Scale(ScaleError),
    Style {
        field: String,
        source: ColorParseError,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Slider(e) => write!(f, "year slider: {e}"),
            BuildError::Classify(e) => write!(f, "classification: {e}"),
            BuildError::Scale(e) => write!(f, "color scale: {e}"),
            BuildError::Style { field, source } => write!(f, "{field}: {source}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Slider(e) => Some(e),
            BuildError::Classify(e) => Some(e),
            BuildError::Scale(e) => Some(e),
            BuildError::Style { source, .. } => Some(source),
        }
    }
}

impl From<SliderError> for BuildError {
    fn from(e: SliderError) -> Self {
        BuildError::Slider(e)
    }
}

impl From<ClassifyError> for BuildError {
    fn from(e: ClassifyError) -> Self {
        BuildError::Classify(e)
    }
}

impl From<ScaleError> for BuildError {
    fn from(e: ScaleError) -> Self {
        BuildError::Scale(e)
    }
}

pub struct BuiltMap {
    pub view: MapView,
    pub report: JoinReport,
    /// The numeric observations the breakpoints were computed from.
    pub observations: Summary,
}

pub fn build_map(cfg: &MapConfig, data: MapData) -> Result<BuiltMap, BuildError> {
    let layer_cfg = &cfg.data_layer;
    let keys = JoinKeys::new(
        &layer_cfg.id_field,
        &cfg.table.state_field,
        &cfg.table.county_field,
    );

    let years = value_columns(&data.table.headers, &layer_cfg.exclude, &keys);
    let slider = YearSlider::new(years.clone(), &cfg.start_year, &cfg.slider)?;

    let joined = join(data.data_layer, &data.table, &keys);
    let observations = collect_observations(&joined, &years);
    let summary = Statistics::summarize(&observations).ok_or(ClassifyError::NoObservations)?;
    let classification = Classification::compute(
        &observations,
        layer_cfg.classification.method,
        layer_cfg.classification.classes,
    )?;
    info!(
        method = ?classification.method,
        classes = classification.class_count(),
        observations = summary.count,
        years = years.len(),
        fingerprint = %classification.fingerprint(),
        "classified observations"
    );

    let scale = ColorScale::from_config(&layer_cfg.classification)?;
    let colorizer = Colorizer::new(classification, &scale);

    let styles = ChoroplethStyles {
        base: PathStyle::default().patched(&patch("data_layer.style", &layer_cfg.style)?),
        hover: patch("data_layer.hover", &layer_cfg.hover)?,
        unhover: patch("data_layer.unhover", &layer_cfg.unhover)?,
    };
    let no_data_color = Rgba::parse(&cfg.no_data.color).map_err(|source| BuildError::Style {
        field: "no_data.color".to_string(),
        source,
    })?;

    let legend = Legend::build(
        &cfg.legend,
        &colorizer,
        &RangeEntry::new(&cfg.legend.entry),
        no_data_color,
        &cfg.start_year,
    );

    let report = joined.report.clone();
    let choropleth = ChoroplethLayer::new(
        DATA_LAYER_ID,
        joined.features,
        colorizer,
        Box::new(PlaceholderTooltip::new(&cfg.tooltip.template)),
        styles,
        NoData {
            color: no_data_color,
            text: cfg.no_data.text.clone(),
        },
        &cfg.start_year,
    );

    let overlay_base = PathStyle {
        interactive: false,
        ..PathStyle::default()
    };
    let mut overlays = Vec::with_capacity(data.overlays.len());
    for (i, (fc, ocfg)) in data.overlays.into_iter().zip(&cfg.overlays).enumerate() {
        let style = overlay_base.patched(&patch(&format!("overlays[{i}].style"), &ocfg.style)?);
        overlays.push(OverlayLayer::new(DATA_LAYER_ID + 1 + i as u64, fc, style));
    }

    let view = MapView::with_default_handlers(MapState {
        choropleth,
        overlays,
        legend,
        slider,
    });

    Ok(BuiltMap {
        view,
        report,
        observations: summary,
    })
}

fn patch(field: &str, cfg: &PathStyleConfig) -> Result<StylePatch, BuildError> {
    StylePatch::from_config(cfg).map_err(|source| BuildError::Style {
        field: field.to_string(),
        source,
    })
}
