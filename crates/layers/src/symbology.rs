use foundation::{ColorParseError, Rgba};
use formats::PathStyleConfig;

/// Resolved stroke and fill styling for one path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathStyle {
    pub stroke: Rgba,
    pub weight: f64,
    pub opacity: f64,
    /// `None` falls back to the stroke color.
    pub fill: Option<Rgba>,
    pub fill_opacity: f64,
    pub interactive: bool,
}

impl PathStyle {
    pub fn fill_color(&self) -> Rgba {
        self.fill.unwrap_or(self.stroke)
    }

    /// Overrides only the fields `patch` sets.
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(c) = patch.stroke {
            self.stroke = c;
        }
        if let Some(w) = patch.weight {
            self.weight = w;
        }
        if let Some(o) = patch.opacity {
            self.opacity = o;
        }
        if let Some(c) = patch.fill {
            self.fill = Some(c);
        }
        if let Some(o) = patch.fill_opacity {
            self.fill_opacity = o;
        }
        if let Some(i) = patch.interactive {
            self.interactive = i;
        }
    }

    pub fn patched(mut self, patch: &StylePatch) -> Self {
        self.apply(patch);
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            stroke: Rgba::rgb(0x33, 0x88, 0xff),
            weight: 3.0,
            opacity: 1.0,
            fill: None,
            fill_opacity: 0.2,
            interactive: true,
        }
    }
}

/// A partial style, e.g. a hover highlight.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub stroke: Option<Rgba>,
    pub weight: Option<f64>,
    pub opacity: Option<f64>,
    pub fill: Option<Rgba>,
    pub fill_opacity: Option<f64>,
    pub interactive: Option<bool>,
}

impl StylePatch {
    pub fn fill(color: Rgba) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    pub fn from_config(cfg: &PathStyleConfig) -> Result<Self, ColorParseError> {
        Ok(Self {
            stroke: cfg.color.as_deref().map(Rgba::parse).transpose()?,
            weight: cfg.weight,
            opacity: cfg.opacity,
            fill: cfg.fill_color.as_deref().map(Rgba::parse).transpose()?,
            fill_opacity: cfg.fill_opacity,
            interactive: cfg.interactive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{PathStyle, StylePatch};
    use foundation::Rgba;
    use formats::PathStyleConfig;

    #[test]
    fn patch_overrides_only_set_fields() {
        let base = PathStyle::default().patched(&StylePatch {
            stroke: Some(Rgba::rgb(0, 0, 0)),
            weight: Some(0.5),
            fill_opacity: Some(1.0),
            ..StylePatch::default()
        });
        assert_eq!(base.fill_color(), Rgba::rgb(0, 0, 0));

        let hovered = base.patched(&StylePatch {
            weight: Some(5.0),
            ..StylePatch::default()
        });
        assert_eq!(hovered.weight, 5.0);
        assert_eq!(hovered.stroke, base.stroke);
        assert_eq!(hovered.fill_opacity, 1.0);
    }

    #[test]
    fn builds_patch_from_config() {
        let cfg = PathStyleConfig {
            color: Some("#ffd70090".to_string()),
            weight: Some(5.0),
            ..PathStyleConfig::default()
        };
        let patch = StylePatch::from_config(&cfg).expect("patch");
        assert_eq!(patch.stroke.map(|c| (c.r, c.g, c.b)), Some((255, 215, 0)));
        assert_eq!(patch.fill, None);

        let bad = PathStyleConfig {
            fill_color: Some("nope".to_string()),
            ..PathStyleConfig::default()
        };
        assert!(StylePatch::from_config(&bad).is_err());
    }
}
