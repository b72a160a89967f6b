use foundation::Rgba;
use formats::{ControlPosition, LegendConfig};

use crate::scale::Colorizer;
use crate::template::Template;
use crate::view::Device;

/// Label for one legend class.
pub trait LegendEntryFormatter {
    /// `breaks` are all `N + 1` breakpoints; `class` is in `0..N`.
    fn entry(&self, color: Rgba, breaks: &[f64], class: usize) -> String;
}

/// `{lower}`, `{upper}`, `{color}` and `{class}` (1-based) placeholders.
/// Bounds are formatted with [`format_number`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEntry {
    template: Template,
}

impl RangeEntry {
    pub fn new(template: &str) -> Self {
        Self {
            template: Template::parse(template),
        }
    }
}

impl LegendEntryFormatter for RangeEntry {
    fn entry(&self, color: Rgba, breaks: &[f64], class: usize) -> String {
        self.template.render(|name| match name {
            "lower" => breaks.get(class).map(|&v| format_number(v)),
            "upper" => breaks.get(class + 1).map(|&v| format_number(v)),
            "color" => Some(color.to_css()),
            "class" => Some((class + 1).to_string()),
            _ => None,
        })
    }
}

/// en-US grouping with at most three fraction digits, trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    let fixed = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub color: Rgba,
    pub label: String,
}

/// Title, one entry per class, and a closing no-data entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    title: Template,
    year: String,
    entries: Vec<LegendEntry>,
    no_data: LegendEntry,
    position: ControlPosition,
    mobile_position: ControlPosition,
}

impl Legend {
    /// Swatch colors come from querying `colorizer` at each lower breakpoint.
    pub fn build(
        cfg: &LegendConfig,
        colorizer: &Colorizer,
        formatter: &dyn LegendEntryFormatter,
        no_data_color: Rgba,
        year: &str,
    ) -> Self {
        let breaks = &colorizer.classification().breaks;
        let mut entries = Vec::with_capacity(breaks.len().saturating_sub(1));
        for class in 0..colorizer.classification().class_count() {
            let Some(color) = colorizer
                .color(breaks[class])
                .or_else(|| colorizer.class_color(class))
            else {
                continue;
            };
            entries.push(LegendEntry {
                color,
                label: formatter.entry(color, breaks, class),
            });
        }

        Self {
            title: Template::parse(&cfg.title),
            year: year.to_string(),
            entries,
            no_data: LegendEntry {
                color: no_data_color,
                label: cfg.no_data_label.clone(),
            },
            position: cfg.position,
            mobile_position: cfg.mobile_position,
        }
    }

    pub fn title(&self) -> String {
        self.title.render(|name| (name == "year").then(|| self.year.clone()))
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn set_year(&mut self, year: &str) {
        self.year = year.to_string();
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    pub fn no_data(&self) -> &LegendEntry {
        &self.no_data
    }

    pub fn position(&self, device: Device) -> ControlPosition {
        match device {
            Device::Desktop => self.position,
            Device::Mobile => self.mobile_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Legend, LegendEntryFormatter, RangeEntry, format_number};
    use crate::scale::{ColorScale, Colorizer};
    use crate::view::Device;
    use compute::Classification;
    use foundation::Rgba;
    use formats::{ClassificationMethod, ControlPosition, InterpolationMode, LegendConfig};
    use pretty_assertions::assert_eq;

    fn colorizer() -> Colorizer {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let classes =
            Classification::compute(&values, ClassificationMethod::Quantile, 5).unwrap();
        let scale = ColorScale::new(
            vec![Rgba::rgb(255, 255, 255), Rgba::rgb(0, 0, 0)],
            InterpolationMode::Rgb,
        )
        .unwrap();
        Colorizer::new(classes, &scale)
    }

    #[test]
    fn formats_numbers_like_en_us() {
        assert_eq!(format_number(2.8), "2.8");
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(1234.5678), "1,234.568");
        assert_eq!(format_number(1_000_000.0), "1,000,000");
        assert_eq!(format_number(-1234.5), "-1,234.5");
        assert_eq!(format_number(0.0004), "0");
    }

    #[test]
    fn range_entry_placeholders() {
        let f = RangeEntry::new("{class}: {lower}% \u{2014} {upper}% on {color}");
        let out = f.entry(Rgba::rgb(255, 0, 0), &[1.0, 2.8, 1500.0], 1);
        assert_eq!(out, "2: 2.8% \u{2014} 1,500% on #ff0000");
    }

    #[test]
    fn one_entry_per_class_and_a_no_data_entry() {
        let cfg = LegendConfig {
            title: "{year} Unemployment Rates".to_string(),
            entry: "{lower}% \u{2014} {upper}%".to_string(),
            ..LegendConfig::default()
        };
        let colorize = colorizer();
        let mut legend = Legend::build(
            &cfg,
            &colorize,
            &RangeEntry::new(&cfg.entry),
            Rgba::rgb(211, 211, 211),
            "2001",
        );

        let labels: Vec<&str> = legend.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "1% \u{2014} 2.8%",
                "2.8% \u{2014} 4.6%",
                "4.6% \u{2014} 6.4%",
                "6.4% \u{2014} 8.2%",
                "8.2% \u{2014} 10%",
            ]
        );
        for (i, e) in legend.entries().iter().enumerate() {
            assert_eq!(Some(e.color), colorize.class_color(i));
        }
        assert_eq!(legend.no_data().label, "No data");
        assert_eq!(legend.no_data().color, Rgba::rgb(211, 211, 211));

        assert_eq!(legend.title(), "2001 Unemployment Rates");
        legend.set_year("2005");
        assert_eq!(legend.title(), "2005 Unemployment Rates");

        assert_eq!(legend.position(Device::Desktop), ControlPosition::TopRight);
        assert_eq!(legend.position(Device::Mobile), ControlPosition::BottomLeft);
    }
}
