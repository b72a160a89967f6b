use foundation::math::Vec2;
use formats::{Geometry, GeoPoint};
use layers::{Layer, LayerId, LayerKind, MapView, PathStyle};

use crate::camera::Camera;

const POINT_RADIUS_PX: f64 = 4.0;

/// One styled path in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    pub layer: LayerId,
    pub kind: LayerKind,
    /// Index into the data layer; `None` for overlays.
    pub feature: Option<usize>,
    /// SVG path data.
    pub d: String,
    pub style: PathStyle,
    /// Area geometry that takes a fill. Lines are stroked only.
    pub filled: bool,
    pub tooltip: Option<String>,
}

/// Everything to draw for the current view, bottom to top.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Vec2,
    pub commands: Vec<PathCommand>,
}

pub struct Renderer;

impl Renderer {
    /// Data layer features in draw order, then overlays in config order.
    pub fn collect(view: &MapView, camera: &Camera) -> RenderFrame {
        let mut frame = RenderFrame {
            viewport: camera.viewport(),
            commands: Vec::new(),
        };

        let choropleth = view.choropleth();
        for &i in choropleth.draw_order() {
            let (Some(jf), Some(state)) = (choropleth.features().get(i), choropleth.state(i))
            else {
                continue;
            };
            let Some(geometry) = &jf.feature.geometry else {
                continue;
            };
            let Some(d) = path_data(geometry, camera) else {
                continue;
            };
            frame.commands.push(PathCommand {
                layer: choropleth.id(),
                kind: choropleth.kind(),
                feature: Some(i),
                d,
                style: state.style,
                filled: is_area(geometry),
                tooltip: choropleth.interactive().then(|| state.tooltip.clone()),
            });
        }

        for overlay in view.overlays() {
            for feature in &overlay.features().features {
                let Some(geometry) = &feature.geometry else {
                    continue;
                };
                let Some(d) = path_data(geometry, camera) else {
                    continue;
                };
                frame.commands.push(PathCommand {
                    layer: overlay.id(),
                    kind: overlay.kind(),
                    feature: None,
                    d,
                    style: *overlay.style(),
                    filled: is_area(geometry),
                    tooltip: None,
                });
            }
        }

        frame
    }
}

fn is_area(geometry: &Geometry) -> bool {
    matches!(
        geometry,
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Point(_) | Geometry::MultiPoint(_)
    )
}

/// SVG path data for `geometry`, or `None` when nothing is drawable.
pub fn path_data(geometry: &Geometry, camera: &Camera) -> Option<String> {
    let mut d = String::new();
    match geometry {
        Geometry::Point(p) => circle(&mut d, camera, p),
        Geometry::MultiPoint(ps) => ps.iter().for_each(|p| circle(&mut d, camera, p)),
        Geometry::LineString(line) => ring(&mut d, camera, line, false),
        Geometry::MultiLineString(lines) => {
            lines.iter().for_each(|l| ring(&mut d, camera, l, false))
        }
        Geometry::Polygon(rings) => rings.iter().for_each(|r| ring(&mut d, camera, r, true)),
        Geometry::MultiPolygon(polys) => polys
            .iter()
            .flatten()
            .for_each(|r| ring(&mut d, camera, r, true)),
    }
    (!d.is_empty()).then_some(d)
}

fn ring(d: &mut String, camera: &Camera, points: &[GeoPoint], close: bool) {
    let mut started = false;
    for p in points {
        let s = camera.project(p.lon_deg, p.lat_deg);
        if !s.is_finite() {
            continue;
        }
        d.push(if started { 'L' } else { 'M' });
        d.push_str(&coord(s));
        started = true;
    }
    if started && close {
        d.push('Z');
    }
}

fn circle(d: &mut String, camera: &Camera, p: &GeoPoint) {
    let s = camera.project(p.lon_deg, p.lat_deg);
    if !s.is_finite() {
        return;
    }
    let r = POINT_RADIUS_PX;
    d.push_str(&format!(
        "M{}m{},0a{r},{r} 0 1,0 {},0a{r},{r} 0 1,0 {},0Z",
        coord(s),
        -r,
        2.0 * r,
        -2.0 * r
    ));
}

fn coord(p: Vec2) -> String {
    format!("{},{}", num(p.x), num(p.y))
}

/// Two decimals, trailing zeros dropped.
pub(crate) fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::{RenderFrame, Renderer, num, path_data};
    use crate::camera::Camera;
    use crate::tests::view;
    use foundation::math::{Projection, Vec2};
    use formats::{GeoPoint, Geometry};
    use layers::LayerKind;
    use pretty_assertions::assert_eq;

    fn camera() -> Camera {
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
    fn empty_frame_has_zero_viewport() {
        let frame = RenderFrame::default();
        assert_eq!(frame.viewport, Vec2::new(0.0, 0.0));
        assert!(frame.commands.is_empty());
    }

    #[test]
    fn formats_coordinates_compactly() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(1.256), "1.26");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(10.5), "10.5");
    }

    #[test]
    fn polygon_rings_close_and_lines_do_not() {
        let cam = camera();
        let square = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(10.0, 0.0),
            GeoPoint::new(10.0, 10.0),
        ];
        assert_eq!(
            path_data(&Geometry::Polygon(vec![square.clone()]), &cam).as_deref(),
            Some("M50,50L60,50L60,40Z")
        );
        assert_eq!(
            path_data(&Geometry::LineString(square), &cam).as_deref(),
            Some("M50,50L60,50L60,40")
        );
        assert_eq!(path_data(&Geometry::Polygon(vec![]), &cam), None);
    }

    #[test]
    fn collects_data_layer_then_overlays() {
        let (mut view, cam) = view();
        let frame = Renderer::collect(&view, &cam);
        let features: Vec<Option<usize>> = frame.commands.iter().map(|c| c.feature).collect();
        assert_eq!(features, vec![Some(0), Some(1), None]);
        assert_eq!(frame.commands[0].kind, LayerKind::Choropleth);
        assert_eq!(frame.commands[2].kind, LayerKind::Overlay);
        assert!(frame.commands[0].filled);
        assert!(!frame.commands[2].filled);
        assert_eq!(frame.commands[2].tooltip, None);
        assert_eq!(
            frame.commands[1].tooltip.as_deref(),
            Some("Data unavailable")
        );

        // Hovered features draw last.
        view.pointer_enter(0);
        let frame = Renderer::collect(&view, &cam);
        let features: Vec<Option<usize>> = frame.commands.iter().map(|c| c.feature).collect();
        assert_eq!(features, vec![Some(1), Some(0), None]);
        assert_eq!(frame.commands[1].style.weight, 5.0);
    }
}
