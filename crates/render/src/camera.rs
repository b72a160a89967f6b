use std::fmt;

use foundation::math::{Projection, ProjectionError, Vec2};
use formats::MapConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    Projection(ProjectionError),
    NoResolutions,
    BadResolution(f64),
    BadViewport { width: f64, height: f64 },
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::Projection(e) => write!(f, "projection: {e}"),
            CameraError::NoResolutions => write!(f, "at least one resolution is required"),
            CameraError::BadResolution(r) => write!(f, "resolution must be positive, got {r}"),
            CameraError::BadViewport { width, height } => {
                write!(f, "viewport must be positive, got {width}x{height}")
            }
        }
    }
}

impl std::error::Error for CameraError {}

impl From<ProjectionError> for CameraError {
    fn from(e: ProjectionError) -> Self {
        CameraError::Projection(e)
    }
}

/// Projected CRS with a resolution ladder, looking at one center and zoom.
///
/// World pixels grow east and south from `origin`; zoom `z` maps `1 / res[z]`
/// pixels to a map unit. Fractional zooms interpolate the scale linearly
/// between the neighbouring levels.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    projection: Projection,
    scales: Vec<f64>,
    origin: Vec2,
    viewport: Vec2,
    zoom_snap: f64,
    zoom: f64,
    center: Vec2,
}

impl Camera {
    pub fn new(
        projection: Projection,
        resolutions: &[f64],
        origin: Vec2,
        viewport: Vec2,
        zoom_snap: f64,
    ) -> Result<Self, CameraError> {
        if resolutions.is_empty() {
            return Err(CameraError::NoResolutions);
        }
        if let Some(&bad) = resolutions.iter().find(|r| !r.is_finite() || **r <= 0.0) {
            return Err(CameraError::BadResolution(bad));
        }
        if !(viewport.x > 0.0 && viewport.y > 0.0) {
            return Err(CameraError::BadViewport {
                width: viewport.x,
                height: viewport.y,
            });
        }
        let center = projection.project(0.0, 0.0);
        Ok(Self {
            projection,
            scales: resolutions.iter().map(|r| 1.0 / r).collect(),
            origin,
            viewport,
            zoom_snap,
            zoom: 0.0,
            center,
        })
    }

    /// Camera for the configured initial view, limited to `max_bounds` if set.
    pub fn from_config(cfg: &MapConfig) -> Result<Self, CameraError> {
        let projection = Projection::from_proj4(&cfg.projection.def)?;
        let [ox, oy] = cfg.projection.origin;
        let mut camera = Self::new(
            projection,
            &cfg.projection.resolutions,
            Vec2::new(ox, oy),
            Vec2::new(cfg.map.width as f64, cfg.map.height as f64),
            cfg.map.zoom_snap,
        )?;
        let [lat, lon] = cfg.map.center;
        camera.set_view(lat, lon, cfg.map.zoom);
        if let Some(bounds) = cfg.map.max_bounds {
            camera.limit_center(bounds);
        }
        Ok(camera)
    }

    pub fn min_zoom(&self) -> f64 {
        0.0
    }

    pub fn max_zoom(&self) -> f64 {
        (self.scales.len() - 1) as f64
    }

    /// Rounds to the nearest multiple of the zoom snap, then clamps.
    pub fn limit_zoom(&self, zoom: f64) -> f64 {
        let snapped = if self.zoom_snap > 0.0 {
            (zoom / self.zoom_snap).round() * self.zoom_snap
        } else {
            zoom
        };
        snapped.clamp(self.min_zoom(), self.max_zoom())
    }

    /// Pixels per map unit at `zoom`.
    pub fn scale_at(&self, zoom: f64) -> f64 {
        let zoom = zoom.clamp(self.min_zoom(), self.max_zoom());
        let base = zoom.floor() as usize;
        let frac = zoom - base as f64;
        let lo = self.scales[base];
        match self.scales.get(base + 1) {
            Some(&hi) if frac > 0.0 => lo + (hi - lo) * frac,
            _ => lo,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale_at(self.zoom)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_view(&mut self, lat_deg: f64, lon_deg: f64, zoom: f64) {
        self.center = self.projection.project(lon_deg, lat_deg);
        self.zoom = self.limit_zoom(zoom);
    }

    /// Screen position of `(lon, lat)` with the view center in the middle.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Vec2 {
        let p = self.world_pixel(self.projection.project(lon_deg, lat_deg));
        let c = self.world_pixel(self.center);
        p - c + self.viewport * 0.5
    }

    /// Pans the minimum amount that keeps the view inside `bounds`, given as
    /// two `[lat, lon]` corners. Bounds smaller than the view get centered.
    pub fn limit_center(&mut self, bounds: [[f64; 2]; 2]) {
        let [[lat_a, lon_a], [lat_b, lon_b]] = bounds;
        let sw = self.world_pixel(self.projection.project(lon_a.min(lon_b), lat_a.min(lat_b)));
        let ne = self.world_pixel(self.projection.project(lon_a.max(lon_b), lat_a.max(lat_b)));
        let (bmin, bmax) = (
            Vec2::new(sw.x.min(ne.x), sw.y.min(ne.y)),
            Vec2::new(sw.x.max(ne.x), sw.y.max(ne.y)),
        );

        let center = self.world_pixel(self.center);
        let half = self.viewport * 0.5;
        let min_offset = bmin - (center - half);
        let max_offset = bmax - (center + half);
        let dx = rebound(min_offset.x, -max_offset.x);
        let dy = rebound(min_offset.y, -max_offset.y);
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        let scale = self.scale();
        let moved = center + Vec2::new(dx, dy);
        self.center = Vec2::new(
            self.origin.x + moved.x / scale,
            self.origin.y - moved.y / scale,
        );
    }

    fn world_pixel(&self, p: Vec2) -> Vec2 {
        let s = self.scale();
        Vec2::new(s * (p.x - self.origin.x), s * (self.origin.y - p.y))
    }
}

fn rebound(left: f64, right: f64) -> f64 {
    if left + right > 0.0 {
        (left - right).round() / 2.0
    } else {
        left.ceil().max(0.0) - right.floor().max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, CameraError};
    use foundation::math::{Projection, Vec2};
    use formats::MapConfig;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "expected {a} ~= {b}");
    }

    fn degrees() -> Camera {
        Camera::new(
            Projection::LongLat,
            &[1.0],
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 100.0),
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn fractional_zoom_interpolates_scale() {
        let cam = Camera::new(
            Projection::LongLat,
            &[8192.0, 4096.0, 2048.0],
            Vec2::new(0.0, 0.0),
            Vec2::new(960.0, 600.0),
            0.1,
        )
        .unwrap();
        assert_close(cam.scale_at(0.0), 1.0 / 8192.0);
        assert_close(cam.scale_at(0.5), 1.5 / 8192.0);
        assert_close(cam.scale_at(2.0), 1.0 / 2048.0);
        // Beyond the ladder clamps to the last level.
        assert_close(cam.scale_at(7.0), 1.0 / 2048.0);

        assert_close(cam.limit_zoom(0.43), 0.4);
        assert_close(cam.limit_zoom(-3.0), 0.0);
        assert_close(cam.limit_zoom(9.0), 2.0);
    }

    #[test]
    fn center_lands_mid_viewport_and_north_is_up() {
        let mut cam = degrees();
        cam.set_view(10.0, 20.0, 0.0);
        let c = cam.project(20.0, 10.0);
        assert_close(c.x, 50.0);
        assert_close(c.y, 50.0);
        let north = cam.project(20.0, 15.0);
        assert_close(north.y, 45.0);
        let east = cam.project(25.0, 10.0);
        assert_close(east.x, 55.0);
    }

    #[test]
    fn max_bounds_pan_the_view_back() {
        // Bounds wider than the view: pan just enough.
        let mut cam = degrees();
        cam.set_view(0.0, 80.0, 0.0);
        cam.limit_center([[-100.0, -100.0], [100.0, 100.0]]);
        let c = cam.project(50.0, 0.0);
        assert_close(c.x, 50.0);

        // Bounds narrower than the view: center on them.
        let mut cam = degrees();
        cam.set_view(0.0, 30.0, 0.0);
        cam.limit_center([[10.0, 10.0], [-10.0, -10.0]]);
        let c = cam.project(0.0, 0.0);
        assert_close(c.x, 50.0);
        assert_close(c.y, 50.0);

        // Already inside: untouched.
        let mut cam = degrees();
        cam.set_view(0.0, 0.0, 0.0);
        cam.limit_center([[-60.0, -60.0], [60.0, 60.0]]);
        assert_close(cam.project(0.0, 0.0).x, 50.0);
    }

    #[test]
    fn rejects_bad_inputs() {
        let p = || Projection::LongLat;
        let origin = Vec2::new(0.0, 0.0);
        let view = Vec2::new(10.0, 10.0);
        assert_eq!(
            Camera::new(p(), &[], origin, view, 1.0),
            Err(CameraError::NoResolutions)
        );
        assert_eq!(
            Camera::new(p(), &[1.0, 0.0], origin, view, 1.0),
            Err(CameraError::BadResolution(0.0))
        );
        assert!(matches!(
            Camera::new(p(), &[1.0], origin, Vec2::new(0.0, 10.0), 1.0),
            Err(CameraError::BadViewport { .. })
        ));
    }

    #[test]
    fn builds_from_lambert_config() {
        let cfg: MapConfig = serde_json::from_str(crate::tests::CONFIG).unwrap();
        let cam = Camera::from_config(&cfg).unwrap();
        assert_close(cam.zoom(), 0.4);
        let c = cam.project(-101.3031364, 47.1152105);
        assert_close(c.x, 480.0);
        assert_close(c.y, 300.0);
    }
}
