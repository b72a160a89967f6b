use compute::JoinedFeature;
use foundation::Rgba;
use runtime::FeatureIndex;
use tracing::debug;

use crate::layer::{Layer, LayerId, LayerKind};
use crate::scale::Colorizer;
use crate::symbology::{PathStyle, StylePatch};
use crate::tooltip::TooltipTemplate;

/// Fill and tooltip text for features with no value in the selected year.
#[derive(Debug, Clone, PartialEq)]
pub struct NoData {
    pub color: Rgba,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoroplethStyles {
    pub base: PathStyle,
    pub hover: StylePatch,
    pub unhover: StylePatch,
}

/// What one feature currently looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureState {
    pub style: PathStyle,
    pub tooltip: String,
    /// The selected year's value, `None` when the feature renders as no data.
    pub value: Option<f64>,
}

/// The interactive data layer: joined features colored by the selected year.
pub struct ChoroplethLayer {
    id: LayerId,
    features: Vec<JoinedFeature>,
    colorizer: Colorizer,
    tooltip: Box<dyn TooltipTemplate>,
    styles: ChoroplethStyles,
    no_data: NoData,
    year: String,
    states: Vec<FeatureState>,
    // Back to front.
    order: Vec<FeatureIndex>,
    hovered: Option<FeatureIndex>,
}

impl ChoroplethLayer {
    pub fn new(
        id: u64,
        features: Vec<JoinedFeature>,
        colorizer: Colorizer,
        tooltip: Box<dyn TooltipTemplate>,
        styles: ChoroplethStyles,
        no_data: NoData,
        year: &str,
    ) -> Self {
        let states = features
            .iter()
            .map(|_| FeatureState {
                style: styles.base,
                tooltip: String::new(),
                value: None,
            })
            .collect();
        let order = (0..features.len()).collect();
        let mut layer = Self {
            id: LayerId(id),
            features,
            colorizer,
            tooltip,
            styles,
            no_data,
            year: String::new(),
            states,
            order,
            hovered: None,
        };
        layer.set_year(year);
        layer
    }

    /// Re-evaluates every feature's fill and tooltip for `year`.
    ///
    /// Reads a different column of the already joined records; nothing is
    /// re-joined or re-classified. Stroke changes from hovering are kept.
    pub fn set_year(&mut self, year: &str) {
        self.year = year.to_string();
        let mut with_data = 0usize;
        for (jf, state) in self.features.iter().zip(self.states.iter_mut()) {
            let shown = jf.record.as_ref().and_then(|record| {
                let value = record.number(year)?;
                let color = self.colorizer.color(value)?;
                Some((value, color, self.tooltip.render(record, year)))
            });
            match shown {
                Some((value, color, text)) => {
                    with_data += 1;
                    state.style.fill = Some(color);
                    state.tooltip = text;
                    state.value = Some(value);
                }
                None => {
                    state.style.fill = Some(self.no_data.color);
                    state.tooltip = self.no_data.text.clone();
                    state.value = None;
                }
            }
        }
        debug!(
            year,
            with_data,
            no_data = self.features.len() - with_data,
            "recolored choropleth"
        );
    }

    /// Applies the hover patch and raises the feature above the others.
    pub fn highlight(&mut self, feature: FeatureIndex) -> bool {
        let Some(state) = self.states.get_mut(feature) else {
            return false;
        };
        state.style.apply(&self.styles.hover);
        self.bring_to_front(feature);
        self.hovered = Some(feature);
        true
    }

    /// Applies the unhover patch and lowers the feature below the others.
    pub fn unhighlight(&mut self, feature: FeatureIndex) -> bool {
        let Some(state) = self.states.get_mut(feature) else {
            return false;
        };
        state.style.apply(&self.styles.unhover);
        self.bring_to_back(feature);
        if self.hovered == Some(feature) {
            self.hovered = None;
        }
        true
    }

    fn bring_to_front(&mut self, feature: FeatureIndex) {
        self.order.retain(|&i| i != feature);
        self.order.push(feature);
    }

    fn bring_to_back(&mut self, feature: FeatureIndex) {
        self.order.retain(|&i| i != feature);
        self.order.insert(0, feature);
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[JoinedFeature] {
        &self.features
    }

    pub fn state(&self, feature: FeatureIndex) -> Option<&FeatureState> {
        self.states.get(feature)
    }

    pub fn states(&self) -> &[FeatureState] {
        &self.states
    }

    /// Feature indices from bottom to top.
    pub fn draw_order(&self) -> &[FeatureIndex] {
        &self.order
    }

    pub fn hovered(&self) -> Option<FeatureIndex> {
        self.hovered
    }

    pub fn colorizer(&self) -> &Colorizer {
        &self.colorizer
    }

    pub fn tooltip(&self) -> &dyn TooltipTemplate {
        self.tooltip.as_ref()
    }

    pub fn styles(&self) -> &ChoroplethStyles {
        &self.styles
    }

    pub fn no_data(&self) -> &NoData {
        &self.no_data
    }
}

impl Layer for ChoroplethLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Choropleth
    }

    fn interactive(&self) -> bool {
        self.styles.base.interactive
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{ChoroplethLayer, ChoroplethStyles, NoData};
    use crate::layer::Layer;
    use crate::scale::{ColorScale, Colorizer};
    use crate::symbology::{PathStyle, StylePatch};
    use crate::tooltip::PlaceholderTooltip;
    use compute::{Classification, JoinKeys, join};
    use foundation::Rgba;
    use formats::{
        ClassificationMethod, Feature, FeatureCollection, InterpolationMode, Table,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    pub(crate) const CSV: &str = "STATE_FIP,COUNTY_FIP,NAME,2001,2002\n\
        38,015,Burleigh,1,10\n\
        38,017,Cass,5,\n\
        38,059,Morton,3,7\n";

    pub(crate) fn county(geoid: &str) -> Feature {
        let mut properties = serde_json::Map::new();
        properties.insert("GEOID".to_string(), json!(geoid));
        Feature {
            id: None,
            properties,
            geometry: None,
        }
    }

    pub(crate) fn lightgrey() -> Rgba {
        Rgba::rgb(211, 211, 211)
    }

    pub(crate) fn layer() -> ChoroplethLayer {
        let fc = FeatureCollection {
            features: vec![
                county("38015"),
                county("38017"),
                county("99999"),
                county("38059"),
            ],
        };
        let table = Table::from_csv_str(CSV).unwrap();
        let joined = join(
            fc,
            &table,
            &JoinKeys::new("GEOID", "STATE_FIP", "COUNTY_FIP"),
        );
        let classes = Classification::compute(
            &[1.0, 10.0, 5.0, 3.0, 7.0],
            ClassificationMethod::Equal,
            3,
        )
        .unwrap();
        let scale = ColorScale::new(
            vec![Rgba::rgb(255, 255, 255), Rgba::rgb(0, 0, 0)],
            InterpolationMode::Rgb,
        )
        .unwrap();
        let base = PathStyle {
            stroke: Rgba::rgb(0, 0, 0),
            weight: 0.5,
            fill_opacity: 1.0,
            ..PathStyle::default()
        };
        ChoroplethLayer::new(
            1,
            joined.features,
            Colorizer::new(classes, &scale),
            Box::new(PlaceholderTooltip::new("{NAME}: {value}%")),
            ChoroplethStyles {
                base,
                hover: StylePatch {
                    stroke: Some(Rgba::rgb(255, 215, 0)),
                    weight: Some(5.0),
                    ..StylePatch::default()
                },
                unhover: StylePatch {
                    stroke: Some(Rgba::rgb(0, 0, 0)),
                    weight: Some(1.0),
                    ..StylePatch::default()
                },
            },
            NoData {
                color: lightgrey(),
                text: "Data unavailable".to_string(),
            },
            "2001",
        )
    }

    #[test]
    fn colors_matched_features_and_marks_the_rest_as_no_data() {
        let layer = layer();
        assert_eq!(layer.len(), 4);
        assert!(layer.interactive());

        let burleigh = layer.state(0).unwrap();
        assert_eq!(burleigh.value, Some(1.0));
        assert_eq!(burleigh.style.fill, Some(Rgba::rgb(255, 255, 255)));
        assert_eq!(burleigh.tooltip, "Burleigh: 1%");

        let missing = layer.state(2).unwrap();
        assert_eq!(missing.value, None);
        assert_eq!(missing.style.fill, Some(lightgrey()));
        assert_eq!(missing.tooltip, "Data unavailable");
    }

    #[test]
    fn year_change_rereads_values_only() {
        let mut layer = layer();
        let breaks = layer.colorizer().classification().breaks.clone();

        layer.set_year("2002");
        assert_eq!(layer.year(), "2002");
        assert_eq!(layer.colorizer().classification().breaks, breaks);

        let burleigh = layer.state(0).unwrap();
        assert_eq!(burleigh.style.fill, Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(burleigh.tooltip, "Burleigh: 10%");

        // Empty cell: no data for this year only.
        let cass = layer.state(1).unwrap();
        assert_eq!(cass.style.fill, Some(lightgrey()));
        assert_eq!(cass.tooltip, "Data unavailable");
        layer.set_year("2001");
        assert_eq!(layer.state(1).unwrap().tooltip, "Cass: 5%");
    }

    #[test]
    fn hover_patches_style_and_reorders() {
        let mut layer = layer();
        assert_eq!(layer.draw_order(), &[0, 1, 2, 3]);

        assert!(layer.highlight(1));
        let hovered = layer.state(1).unwrap().style;
        assert_eq!(hovered.weight, 5.0);
        assert_eq!(hovered.stroke, Rgba::rgb(255, 215, 0));
        assert_eq!(hovered.fill_opacity, 1.0);
        assert_eq!(layer.draw_order(), &[0, 2, 3, 1]);
        assert_eq!(layer.hovered(), Some(1));

        // Recoloring keeps the hover stroke.
        layer.set_year("2002");
        assert_eq!(layer.state(1).unwrap().style.weight, 5.0);

        assert!(layer.unhighlight(1));
        let restored = layer.state(1).unwrap().style;
        assert_eq!(restored.weight, 1.0);
        assert_eq!(restored.stroke, Rgba::rgb(0, 0, 0));
        assert_eq!(layer.draw_order(), &[1, 0, 2, 3]);
        assert_eq!(layer.hovered(), None);

        assert!(!layer.highlight(42));
    }
}
