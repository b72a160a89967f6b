pub mod choropleth;
pub mod interaction;
pub mod layer;
pub mod legend;
pub mod overlay;
pub mod palette;
pub mod pipeline;
pub mod scale;
pub mod slider;
pub mod symbology;
pub mod template;
pub mod tooltip;
pub mod view;

pub use choropleth::{ChoroplethLayer, ChoroplethStyles, FeatureState, NoData};
pub use layer::*;
pub use legend::{Legend, LegendEntry, LegendEntryFormatter, RangeEntry, format_number};
pub use overlay::OverlayLayer;
pub use pipeline::{BuildError, BuiltMap, build_map};
pub use scale::{ColorScale, Colorizer, ScaleError};
pub use slider::{SliderError, YearSlider};
pub use symbology::{PathStyle, StylePatch};
pub use tooltip::{PlaceholderTooltip, TooltipTemplate};
pub use view::{Device, MapState, MapView};
