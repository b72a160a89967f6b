use std::fmt;

use formats::{ControlPosition, SliderConfig};

use crate::view::Device;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliderError {
    NoYears,
    UnknownYear(String),
}

impl fmt::Display for SliderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliderError::NoYears => write!(f, "table has no year columns"),
            SliderError::UnknownYear(y) => write!(f, "year {y:?} is not a table column"),
        }
    }
}

impl std::error::Error for SliderError {}

/// Discrete year selector over the table's value columns, in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSlider {
    years: Vec<String>,
    index: usize,
    element_id: String,
    position: ControlPosition,
    mobile_position: ControlPosition,
}

impl YearSlider {
    pub fn new(years: Vec<String>, start: &str, cfg: &SliderConfig) -> Result<Self, SliderError> {
        if years.is_empty() {
            return Err(SliderError::NoYears);
        }
        let index = years
            .iter()
            .position(|y| y == start)
            .ok_or_else(|| SliderError::UnknownYear(start.to_string()))?;
        Ok(Self {
            years,
            index,
            element_id: cfg.element_id.clone(),
            position: cfg.position,
            mobile_position: cfg.mobile_position,
        })
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &str {
        &self.years[self.index]
    }

    pub fn contains(&self, year: &str) -> bool {
        self.years.iter().any(|y| y == year)
    }

    /// Moves to `year`; returns whether the selection changed.
    pub fn select(&mut self, year: &str) -> Result<bool, SliderError> {
        let index = self
            .years
            .iter()
            .position(|y| y == year)
            .ok_or_else(|| SliderError::UnknownYear(year.to_string()))?;
        let changed = index != self.index;
        self.index = index;
        Ok(changed)
    }

    /// Moves to the year at `index`, clamped to the range.
    pub fn select_index(&mut self, index: usize) -> bool {
        let index = index.min(self.years.len() - 1);
        let changed = index != self.index;
        self.index = index;
        changed
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
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
    use super::{SliderError, YearSlider};
    use crate::view::Device;
    use formats::{ControlPosition, SliderConfig};

    fn years() -> Vec<String> {
        (2001..=2005).map(|y| y.to_string()).collect()
    }

    #[test]
    fn starts_at_configured_year() {
        let mut s = YearSlider::new(years(), "2003", &SliderConfig::default()).unwrap();
        assert_eq!(s.current(), "2003");
        assert_eq!(s.index(), 2);

        assert_eq!(s.select("2005"), Ok(true));
        assert_eq!(s.select("2005"), Ok(false));
        assert_eq!(
            s.select("1999"),
            Err(SliderError::UnknownYear("1999".to_string()))
        );
        assert_eq!(s.current(), "2005");

        // Already at the last year; out-of-range indices clamp.
        assert!(!s.select_index(99));
        assert_eq!(s.current(), "2005");
        assert!(s.select_index(0));
        assert_eq!(s.current(), "2001");
        assert_eq!(s.element_id(), "ui-controls");
    }

    #[test]
    fn rejects_unknown_start_and_empty_years() {
        assert_eq!(
            YearSlider::new(years(), "NAME", &SliderConfig::default()),
            Err(SliderError::UnknownYear("NAME".to_string()))
        );
        assert_eq!(
            YearSlider::new(Vec::new(), "2001", &SliderConfig::default()),
            Err(SliderError::NoYears)
        );
    }

    #[test]
    fn responsive_position() {
        let s = YearSlider::new(years(), "2001", &SliderConfig::default()).unwrap();
        assert_eq!(s.position(Device::Desktop), ControlPosition::BottomLeft);
        assert_eq!(s.position(Device::Mobile), ControlPosition::BottomRight);
    }
}
