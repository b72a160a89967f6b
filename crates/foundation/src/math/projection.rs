use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use super::geodesy::{Ellipsoid, conformal_t, parallel_m};
use super::vec::Vec2;

/// Latitude limit for Mercator, matching the usual web-map clamp.
const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_8;

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionError {
    Empty,
    MalformedToken(String),
    MissingParameter(&'static str),
    InvalidNumber { key: String, value: String },
    UnsupportedProjection(String),
    UnsupportedEllipsoid(String),
    UnsupportedUnits(String),
    Degenerate(&'static str),
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::Empty => write!(f, "projection definition is empty"),
            ProjectionError::MalformedToken(tok) => write!(f, "malformed projection token: {tok}"),
            ProjectionError::MissingParameter(key) => write!(f, "missing +{key} parameter"),
            ProjectionError::InvalidNumber { key, value } => {
                write!(f, "invalid number for +{key}: {value}")
            }
            ProjectionError::UnsupportedProjection(p) => write!(f, "unsupported projection: {p}"),
            ProjectionError::UnsupportedEllipsoid(e) => write!(f, "unsupported ellipsoid: {e}"),
            ProjectionError::UnsupportedUnits(u) => write!(f, "unsupported units: {u}"),
            ProjectionError::Degenerate(why) => write!(f, "degenerate projection: {why}"),
        }
    }
}

impl std::error::Error for ProjectionError {}

/// A forward map projection from geographic degrees to planar coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Plate carrée in degrees (`+proj=longlat`).
    LongLat,
    Mercator(Mercator),
    LambertConformalConic(LambertConformalConic),
}

impl Projection {
    /// Parses the subset of proj4 syntax needed for map definitions, e.g.
    /// `+proj=lcc +lat_1=45.68 +lat_2=44.41 +lat_0=43.83 +lon_0=-100 +x_0=600000 +ellps=GRS80 +units=m`.
    ///
    /// Unknown keys such as `+towgs84` or `+no_defs` are accepted and ignored.
    pub fn from_proj4(def: &str) -> Result<Self, ProjectionError> {
        let params = Proj4Params::parse(def)?;
        let proj = params
            .get("proj")
            .ok_or(ProjectionError::MissingParameter("proj"))?;

        match proj {
            "longlat" | "latlong" | "lonlat" => Ok(Projection::LongLat),
            "merc" => {
                params.require_meters()?;
                Ok(Projection::Mercator(Mercator {
                    ellipsoid: params.ellipsoid()?,
                    lon_0: params.number("lon_0", 0.0)?.to_radians(),
                    k_0: params.number("k_0", params.number("k", 1.0)?)?,
                    x_0: params.number("x_0", 0.0)?,
                    y_0: params.number("y_0", 0.0)?,
                }))
            }
            "lcc" => {
                params.require_meters()?;
                let lat_1 = params.required_number("lat_1")?;
                let lat_2 = params.number("lat_2", lat_1)?;
                let lat_0 = params.number("lat_0", lat_1)?;
                LambertConformalConic::new(
                    params.ellipsoid()?,
                    lat_1.to_radians(),
                    lat_2.to_radians(),
                    lat_0.to_radians(),
                    params.number("lon_0", 0.0)?.to_radians(),
                    params.number("k_0", params.number("k", 1.0)?)?,
                    params.number("x_0", 0.0)?,
                    params.number("y_0", 0.0)?,
                )
                .map(Projection::LambertConformalConic)
            }
            other => Err(ProjectionError::UnsupportedProjection(other.to_string())),
        }
    }

    /// Projects `(lon, lat)` in degrees.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Vec2 {
        match self {
            Projection::LongLat => Vec2::new(lon_deg, lat_deg),
            Projection::Mercator(m) => m.project(lon_deg, lat_deg),
            Projection::LambertConformalConic(l) => l.project(lon_deg, lat_deg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mercator {
    pub ellipsoid: Ellipsoid,
    pub lon_0: f64,
    pub k_0: f64,
    pub x_0: f64,
    pub y_0: f64,
}

impl Mercator {
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Vec2 {
        let lat = lat_deg
            .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
            .to_radians();
        let dlon = wrap_pi(lon_deg.to_radians() - self.lon_0);
        let ak = self.ellipsoid.a * self.k_0;
        let t = conformal_t(lat, self.ellipsoid.e());
        Vec2::new(self.x_0 + ak * dlon, self.y_0 - ak * t.ln())
    }
}

/// Lambert conformal conic (Snyder, "Map Projections: A Working Manual", ch. 15).
#[derive(Debug, Clone, PartialEq)]
pub struct LambertConformalConic {
    pub ellipsoid: Ellipsoid,
    pub lon_0: f64,
    pub x_0: f64,
    pub y_0: f64,
    n: f64,
    /// `a * k_0 * F`
    ak_f: f64,
    rho_0: f64,
}

impl LambertConformalConic {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ellipsoid: Ellipsoid,
        lat_1: f64,
        lat_2: f64,
        lat_0: f64,
        lon_0: f64,
        k_0: f64,
        x_0: f64,
        y_0: f64,
    ) -> Result<Self, ProjectionError> {
        if (lat_1 + lat_2).abs() < 1e-10 {
            return Err(ProjectionError::Degenerate(
                "standard parallels are symmetric about the equator",
            ));
        }

        let e = ellipsoid.e();
        let e2 = ellipsoid.e2();
        let m1 = parallel_m(lat_1, e2);
        let t1 = conformal_t(lat_1, e);

        let n = if (lat_1 - lat_2).abs() > 1e-10 {
            let m2 = parallel_m(lat_2, e2);
            let t2 = conformal_t(lat_2, e);
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        } else {
            lat_1.sin()
        };
        if !n.is_finite() || n == 0.0 {
            return Err(ProjectionError::Degenerate("cone constant is not finite"));
        }

        let f = m1 / (n * t1.powf(n));
        let ak_f = ellipsoid.a * k_0 * f;
        let rho_0 = rho_for(ak_f, n, lat_0, e);

        Ok(Self {
            ellipsoid,
            lon_0,
            x_0,
            y_0,
            n,
            ak_f,
            rho_0,
        })
    }

    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Vec2 {
        let lat = lat_deg.to_radians();
        let rho = rho_for(self.ak_f, self.n, lat, self.ellipsoid.e());
        let theta = self.n * wrap_pi(lon_deg.to_radians() - self.lon_0);
        Vec2::new(
            self.x_0 + rho * theta.sin(),
            self.y_0 + self.rho_0 - rho * theta.cos(),
        )
    }
}

fn rho_for(ak_f: f64, n: f64, lat: f64, e: f64) -> f64 {
    // At the pole on the cone's side the radius collapses to the apex.
    if (lat.abs() - FRAC_PI_2).abs() < 1e-10 && lat * n > 0.0 {
        return 0.0;
    }
    ak_f * conformal_t(lat, e).powf(n)
}

fn wrap_pi(mut a: f64) -> f64 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

struct Proj4Params<'a> {
    pairs: Vec<(&'a str, Option<&'a str>)>,
}

impl<'a> Proj4Params<'a> {
    fn parse(def: &'a str) -> Result<Self, ProjectionError> {
        let mut pairs = Vec::new();
        for tok in def.split_whitespace() {
            let body = tok
                .strip_prefix('+')
                .ok_or_else(|| ProjectionError::MalformedToken(tok.to_string()))?;
            if body.is_empty() {
                return Err(ProjectionError::MalformedToken(tok.to_string()));
            }
            match body.split_once('=') {
                Some((k, v)) => pairs.push((k, Some(v))),
                None => pairs.push((body, None)),
            }
        }
        if pairs.is_empty() {
            return Err(ProjectionError::Empty);
        }
        Ok(Self { pairs })
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| *v)
    }

    fn number(&self, key: &'static str, default: f64) -> Result<f64, ProjectionError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ProjectionError::InvalidNumber {
                    key: key.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    fn required_number(&self, key: &'static str) -> Result<f64, ProjectionError> {
        if self.get(key).is_none() {
            return Err(ProjectionError::MissingParameter(key));
        }
        self.number(key, 0.0)
    }

    fn ellipsoid(&self) -> Result<Ellipsoid, ProjectionError> {
        if let Some(a) = self.get("a") {
            let a: f64 = a.parse().map_err(|_| ProjectionError::InvalidNumber {
                key: "a".to_string(),
                value: a.to_string(),
            })?;
            let b = self.number("b", a)?;
            return Ok(Ellipsoid::from_axes(a, b));
        }
        if let Some(r) = self.get("R") {
            let r: f64 = r.parse().map_err(|_| ProjectionError::InvalidNumber {
                key: "R".to_string(),
                value: r.to_string(),
            })?;
            return Ok(Ellipsoid::sphere(r));
        }
        let name = self.get("ellps").or(self.get("datum")).unwrap_or("WGS84");
        Ellipsoid::by_name(name).ok_or_else(|| ProjectionError::UnsupportedEllipsoid(name.into()))
    }

    fn require_meters(&self) -> Result<(), ProjectionError> {
        match self.get("units") {
            None | Some("m") => Ok(()),
            Some(other) => Err(ProjectionError::UnsupportedUnits(other.to_string())),
        }
    }
}
