use formats::FeatureCollection;

use crate::layer::{Layer, LayerId, LayerKind};
use crate::symbology::PathStyle;

/// A fixed-style reference layer, e.g. state boundary lines, drawn above the
/// data layer.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    id: LayerId,
    features: FeatureCollection,
    style: PathStyle,
}

impl OverlayLayer {
    pub fn new(id: u64, features: FeatureCollection, style: PathStyle) -> Self {
        Self {
            id: LayerId(id),
            features,
            style,
        }
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    pub fn style(&self) -> &PathStyle {
        &self.style
    }
}

impl Layer for OverlayLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Overlay
    }

    fn interactive(&self) -> bool {
        self.style.interactive
    }
}
