//! UI callbacks as explicit handlers.
//!
//! Each handler reacts to some [`MapEvent`]s and ignores the rest. Side effects
//! are limited to what each type documents.

use runtime::MapEvent;
use tracing::warn;

use crate::layer::Layer;
use crate::view::MapState;

pub trait InteractionHandler {
    fn name(&self) -> &'static str;

    fn handle(&mut self, event: &MapEvent, state: &mut MapState);
}

/// `PointerEnter`: applies the hover style to the feature and brings it to the
/// front. No effect when the data layer is not interactive.
#[derive(Debug, Default, Clone, Copy)]
pub struct HoverHighlight;

impl InteractionHandler for HoverHighlight {
    fn name(&self) -> &'static str {
        "hover_highlight"
    }

    fn handle(&mut self, event: &MapEvent, state: &mut MapState) {
        if let MapEvent::PointerEnter { feature } = event
            && state.choropleth.interactive()
            && !state.choropleth.highlight(*feature)
        {
            warn!(feature, "pointer entered unknown feature");
        }
    }
}

/// `PointerLeave`: applies the unhover style and sends the feature to the back.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnhoverRestore;

impl InteractionHandler for UnhoverRestore {
    fn name(&self) -> &'static str {
        "unhover_restore"
    }

    fn handle(&mut self, event: &MapEvent, state: &mut MapState) {
        if let MapEvent::PointerLeave { feature } = event
            && state.choropleth.interactive()
            && !state.choropleth.unhighlight(*feature)
        {
            warn!(feature, "pointer left unknown feature");
        }
    }
}

/// `YearChanged`: moves the slider and recolors the data layer. Years that are
/// not value columns are logged and ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct YearRecolor;

impl InteractionHandler for YearRecolor {
    fn name(&self) -> &'static str {
        "year_recolor"
    }

    fn handle(&mut self, event: &MapEvent, state: &mut MapState) {
        let MapEvent::YearChanged { year } = event else {
            return;
        };
        match state.slider.select(year) {
            Ok(_) => state.choropleth.set_year(year),
            Err(e) => warn!(error = %e, "ignoring year change"),
        }
    }
}

/// `YearChanged`: writes the year into the legend title.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegendTitle;

impl InteractionHandler for LegendTitle {
    fn name(&self) -> &'static str {
        "legend_title"
    }

    fn handle(&mut self, event: &MapEvent, state: &mut MapState) {
        if let MapEvent::YearChanged { year } = event
            && state.slider.contains(year)
        {
            state.legend.set_year(year);
        }
    }
}
