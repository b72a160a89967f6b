/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// GRS80 flattening. Shares the WGS84 semi-major axis.
pub const GRS80_F: f64 = 1.0 / 298.257_222_101;

/// Reference ellipsoid described by its semi-major axis and flattening.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: WGS84_A,
        f: WGS84_F,
    };
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: WGS84_A,
        f: GRS80_F,
    };

    pub fn from_axes(a: f64, b: f64) -> Self {
        Self { a, f: (a - b) / a }
    }

    pub fn sphere(radius: f64) -> Self {
        Self { a: radius, f: 0.0 }
    }

    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "WGS84" => Some(Self::WGS84),
            "GRS80" => Some(Self::GRS80),
            _ => None,
        }
    }
}

/// Snyder's isometric-latitude helper `t(phi)` (eq. 15-9).
pub fn conformal_t(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (std::f64::consts::FRAC_PI_4 - phi * 0.5).tan() / ((1.0 - es) / (1.0 + es)).powf(e * 0.5)
}

/// Snyder's `m(phi)` (eq. 14-15): radius of the parallel divided by `a`.
pub fn parallel_m(phi: f64, e2: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - e2 * s * s).sqrt()
}
