use formats::Record;

use crate::template::Template;

/// Tooltip text for a matched record in a given year.
///
/// Unmatched features and missing values never reach the template; they show
/// the layer's no-data text instead.
pub trait TooltipTemplate {
    fn render(&self, record: &Record, year: &str) -> String;
}

/// Template-driven tooltip. `{year}` is the selected year, `{value}` that
/// year's cell as written in the table, and any other name a record column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderTooltip {
    template: Template,
}

impl PlaceholderTooltip {
    pub fn new(template: &str) -> Self {
        Self {
            template: Template::parse(template),
        }
    }
}

impl TooltipTemplate for PlaceholderTooltip {
    fn render(&self, record: &Record, year: &str) -> String {
        self.template.render(|name| match name {
            "year" => Some(year.to_string()),
            "value" => record.get(year).map(|v| v.trim().to_string()),
            column => record.get(column).map(str::to_string),
        })
    }
}
