/// Identity of a layer within one map; doubles as the `data-layer` attribute
/// in rendered output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerKind {
    /// Features colored by their joined value.
    Choropleth,
    /// Reference geometry with one fixed style.
    Overlay,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Choropleth => "choropleth",
            LayerKind::Overlay => "overlay",
        }
    }
}

pub trait Layer {
    fn id(&self) -> LayerId;

    fn kind(&self) -> LayerKind;

    /// Whether the layer reacts to pointer events.
    fn interactive(&self) -> bool;
}
