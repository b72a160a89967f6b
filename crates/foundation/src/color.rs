//! sRGB colors, CSS-style parsing, and CIE Lab / LCh conversion.
//!
//! Lab uses the D65 white point with the same constants as common web color
//! libraries so interpolated palettes match what browsers show.

use std::fmt;

const XN: f64 = 0.950_470;
const YN: f64 = 1.0;
const ZN: f64 = 1.088_830;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lch {
    pub l: f64,
    pub c: f64,
    /// Hue in degrees, `[0, 360)`. NaN for achromatic colors.
    pub h: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized color: {:?}", self.0)
    }
}

impl std::error::Error for ColorParseError {}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` and a
    /// small set of named colors.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let s = input.trim();
        let err = || ColorParseError(input.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }

        let lower = s.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|b| b.strip_suffix(')'))
        {
            return parse_functional(body).ok_or_else(err);
        }

        named(&lower).ok_or_else(err)
    }

    /// `#rrggbb` when opaque, otherwise `rgba(r,g,b,a)`.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            self.to_hex()
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, round3(self.a))
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_lab(&self) -> Lab {
        let r = srgb_to_linear(self.r as f64 / 255.0);
        let g = srgb_to_linear(self.g as f64 / 255.0);
        let b = srgb_to_linear(self.b as f64 / 255.0);

        let x = xyz_to_lab((0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b) / XN);
        let y = xyz_to_lab((0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b) / YN);
        let z = xyz_to_lab((0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b) / ZN);

        Lab {
            l: 116.0 * y - 16.0,
            a: 500.0 * (x - y),
            b: 200.0 * (y - z),
        }
    }

    pub fn from_lab(lab: Lab, alpha: f64) -> Self {
        let y = (lab.l + 16.0) / 116.0;
        let x = y + lab.a / 500.0;
        let z = y - lab.b / 200.0;

        let y = YN * lab_to_xyz(y);
        let x = XN * lab_to_xyz(x);
        let z = ZN * lab_to_xyz(z);

        let r = linear_to_srgb8(3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z);
        let g = linear_to_srgb8(-0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z);
        let b = linear_to_srgb8(0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z);
        Self {
            r,
            g,
            b,
            a: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn to_lch(&self) -> Lch {
        self.to_lab().to_lch()
    }

    pub fn from_lch(lch: Lch, alpha: f64) -> Self {
        Self::from_lab(lch.to_lab(), alpha)
    }
}

impl Lab {
    pub fn to_lch(self) -> Lch {
        let c = (self.a * self.a + self.b * self.b).sqrt();
        let h = if c < 1e-4 {
            f64::NAN
        } else {
            self.b.atan2(self.a).to_degrees().rem_euclid(360.0)
        };
        Lch { l: self.l, c, h }
    }
}

impl Lch {
    pub fn to_lab(self) -> Lab {
        let h = if self.h.is_nan() { 0.0 } else { self.h };
        let rad = h.to_radians();
        Lab {
            l: self.l,
            a: rad.cos() * self.c,
            b: rad.sin() * self.c,
        }
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb8(c: f64) -> u8 {
    let v = if c <= 0.003_04 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn xyz_to_lab(t: f64) -> f64 {
    if t > T3 { t.cbrt() } else { t / T2 + T0 }
}

fn lab_to_xyz(t: f64) -> f64 {
    if t > T1 { t * t * t } else { T2 * (t - T0) }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?).with_alpha(nibble(3)? as f64 / 255.0)),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?).with_alpha(byte(6)? as f64 / 255.0)),
        _ => None,
    }
}

fn parse_functional(body: &str) -> Option<Rgba> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v: f64 = s.parse().ok()?;
        if !(0.0..=255.0).contains(&v) {
            return None;
        }
        Some(v.round() as u8)
    };
    let mut color = Rgba::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
    if let Some(a) = parts.get(3) {
        let a: f64 = a.parse().ok()?;
        if !(0.0..=1.0).contains(&a) {
            return None;
        }
        color = color.with_alpha(a);
    }
    Some(color)
}

fn named(name: &str) -> Option<Rgba> {
    let c = match name {
        "black" => Rgba::rgb(0, 0, 0),
        "white" => Rgba::rgb(255, 255, 255),
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        "darkgray" | "darkgrey" => Rgba::rgb(169, 169, 169),
        "lightgray" | "lightgrey" => Rgba::rgb(211, 211, 211),
        "gainsboro" => Rgba::rgb(220, 220, 220),
        "silver" => Rgba::rgb(192, 192, 192),
        "red" => Rgba::rgb(255, 0, 0),
        "maroon" => Rgba::rgb(128, 0, 0),
        "orange" => Rgba::rgb(255, 165, 0),
        "gold" => Rgba::rgb(255, 215, 0),
        "yellow" => Rgba::rgb(255, 255, 0),
        "green" => Rgba::rgb(0, 128, 0),
        "blue" => Rgba::rgb(0, 0, 255),
        "navy" => Rgba::rgb(0, 0, 128),
        "purple" => Rgba::rgb(128, 0, 128),
        "transparent" => Rgba::rgb(0, 0, 0).with_alpha(0.0),
        _ => return None,
    };
    Some(c)
}
