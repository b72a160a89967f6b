use std::fmt;

use compute::Classification;
use foundation::{Lab, Lch, Rgba};
use formats::{ClassificationConfig, InterpolationMode, PaletteConfig};

use crate::palette;

#[derive(Debug, Clone, PartialEq)]
pub enum ScaleError {
    UnknownPalette(String),
    BadColor(String),
    EmptyPalette,
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleError::UnknownPalette(name) => {
                let known: Vec<&str> = palette::brewer_names().collect();
                write!(f, "unknown palette {name:?} (known: {})", known.join(", "))
            }
            ScaleError::BadColor(c) => write!(f, "bad palette color {c:?}"),
            ScaleError::EmptyPalette => write!(f, "palette has no colors"),
        }
    }
}

impl std::error::Error for ScaleError {}

/// Continuous color ramp over `[0, 1]` with evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<Rgba>,
    mode: InterpolationMode,
}

impl ColorScale {
    pub fn new(stops: Vec<Rgba>, mode: InterpolationMode) -> Result<Self, ScaleError> {
        if stops.is_empty() {
            return Err(ScaleError::EmptyPalette);
        }
        Ok(Self { stops, mode })
    }

    pub fn from_config(cfg: &ClassificationConfig) -> Result<Self, ScaleError> {
        let stops = match &cfg.palette {
            PaletteConfig::Brewer { name } => {
                palette::brewer(name).ok_or_else(|| ScaleError::UnknownPalette(name.clone()))?
            }
            PaletteConfig::Colors { colors } => colors
                .iter()
                .map(|c| Rgba::parse(c).map_err(|_| ScaleError::BadColor(c.clone())))
                .collect::<Result<Vec<_>, _>>()?,
        };
        Self::new(stops, cfg.mode)
    }

    pub fn at(&self, t: f64) -> Rgba {
        if self.stops.len() == 1 {
            return self.stops[0];
        }
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (self.stops.len() - 1) as f64;
        let i = (pos.floor() as usize).min(self.stops.len() - 2);
        let f = pos - i as f64;
        interpolate(self.stops[i], self.stops[i + 1], f, self.mode)
    }
}

fn interpolate(a: Rgba, b: Rgba, f: f64, mode: InterpolationMode) -> Rgba {
    let alpha = lerp(a.a, b.a, f);
    match mode {
        InterpolationMode::Rgb => Rgba {
            r: lerp(a.r as f64, b.r as f64, f).round() as u8,
            g: lerp(a.g as f64, b.g as f64, f).round() as u8,
            b: lerp(a.b as f64, b.b as f64, f).round() as u8,
            a: alpha,
        },
        InterpolationMode::Lab => {
            let (la, lb) = (a.to_lab(), b.to_lab());
            Rgba::from_lab(
                Lab {
                    l: lerp(la.l, lb.l, f),
                    a: lerp(la.a, lb.a, f),
                    b: lerp(la.b, lb.b, f),
                },
                alpha,
            )
        }
        InterpolationMode::Lch => {
            let (ca, cb) = (a.to_lch(), b.to_lch());
            let h = match (ca.h.is_nan(), cb.h.is_nan()) {
                (true, true) => f64::NAN,
                (true, false) => cb.h,
                (false, true) => ca.h,
                (false, false) => {
                    let mut dh = cb.h - ca.h;
                    if dh > 180.0 {
                        dh -= 360.0;
                    } else if dh < -180.0 {
                        dh += 360.0;
                    }
                    (ca.h + f * dh).rem_euclid(360.0)
                }
            };
            Rgba::from_lch(
                Lch {
                    l: lerp(ca.l, cb.l, f),
                    c: lerp(ca.c, cb.c, f),
                    h,
                },
                alpha,
            )
        }
    }
}

fn lerp(a: f64, b: f64, f: f64) -> f64 {
    a + (b - a) * f
}

/// Value-to-color function for a fixed classification.
///
/// Built once; class colors are sampled evenly from the scale, the first class
/// at the light end and the top class at the dark end.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorizer {
    classification: Classification,
    class_colors: Vec<Rgba>,
}

impl Colorizer {
    pub fn new(classification: Classification, scale: &ColorScale) -> Self {
        let n = classification.class_count();
        let class_colors = (0..n)
            .map(|c| {
                // A single class sits in the middle of the ramp.
                let t = if n == 1 { 0.5 } else { c as f64 / (n - 1) as f64 };
                scale.at(t)
            })
            .collect();
        Self {
            classification,
            class_colors,
        }
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn class_colors(&self) -> &[Rgba] {
        &self.class_colors
    }

    pub fn class_color(&self, class: usize) -> Option<Rgba> {
        self.class_colors.get(class).copied()
    }

    /// `None` for non-finite values, which render with the no-data style.
    pub fn color(&self, value: f64) -> Option<Rgba> {
        self.classification
            .classify(value)
            .and_then(|c| self.class_color(c))
    }
}
