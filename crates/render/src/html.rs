//! Self-contained interactive page: the SVG map, per-year fills and tooltips,
//! and a little script for the slider, hover, wheel zoom and drag.

use std::fmt::Write as _;

use foundation::Rgba;
use formats::{ControlPosition, MapViewConfig};
use layers::{Device, MapView, PathStyle, StylePatch};
use serde::Serialize;
use tracing::debug;

use crate::camera::Camera;
use crate::renderer::Renderer;
use crate::svg::{escape, open_svg, write_paths};

#[derive(Debug, Serialize)]
struct YearFrame {
    year: String,
    title: String,
    fills: Vec<String>,
    tooltips: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
struct StyleJs {
    #[serde(skip_serializing_if = "Option::is_none")]
    stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stroke_alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fill_opacity: Option<f64>,
}

impl StyleJs {
    fn full(style: &PathStyle) -> Self {
        Self {
            stroke: Some(style.stroke.to_hex()),
            stroke_alpha: Some(style.stroke.a),
            weight: Some(style.weight),
            opacity: Some(style.opacity),
            fill_opacity: Some(style.fill_opacity),
        }
    }

    fn patch(patch: &StylePatch) -> Self {
        Self {
            stroke: patch.stroke.map(|c| c.to_hex()),
            stroke_alpha: patch.stroke.map(|c| c.a),
            weight: patch.weight,
            opacity: patch.opacity,
            fill_opacity: patch.fill_opacity,
        }
    }
}

#[derive(Debug, Serialize)]
struct PageData {
    start: usize,
    frames: Vec<YearFrame>,
    styles: Vec<StyleJs>,
    hover: StyleJs,
    unhover: StyleJs,
    interactive: bool,
    scroll_wheel_zoom: bool,
    dragging: bool,
    zoom_delta: f64,
}

/// Renders the page for the view's current year. Every year is visited once
/// through the view's event queue to capture its fills and tooltips; the view
/// ends on the year it started with. Fails only if the page state cannot be
/// serialized.
pub fn render_html(
    view: &mut MapView,
    camera: &Camera,
    map: &MapViewConfig,
    background: Rgba,
    title: &str,
) -> Result<String, serde_json::Error> {
    let start_year = view.year().to_string();
    let years = view.slider().years().to_vec();

    let mut frames = Vec::with_capacity(years.len());
    for year in &years {
        view.select_year(year);
        let layer = view.choropleth();
        frames.push(YearFrame {
            year: year.clone(),
            title: view.legend().title(),
            fills: layer
                .states()
                .iter()
                .map(|s| s.style.fill_color().to_hex())
                .collect(),
            tooltips: layer.states().iter().map(|s| s.tooltip.clone()).collect(),
        });
    }
    view.select_year(&start_year);
    debug!(years = frames.len(), "captured year frames");

    let layer = view.choropleth();
    let data = PageData {
        start: view.slider().index(),
        frames,
        styles: layer.states().iter().map(|s| StyleJs::full(&s.style)).collect(),
        hover: StyleJs::patch(&layer.styles().hover),
        unhover: StyleJs::patch(&layer.styles().unhover),
        interactive: layer.styles().base.interactive,
        scroll_wheel_zoom: map.scroll_wheel_zoom,
        dragging: map.dragging,
        zoom_delta: map.zoom_delta,
    };
    let json = serde_json::to_string(&data)?.replace("</", "<\\/");

    let frame = Renderer::collect(view, camera);
    let mut svg = String::new();
    open_svg(&mut svg, &frame, background);
    svg.push_str(r#"<g id="map-pan">"#);
    svg.push('\n');
    write_paths(&mut svg, &frame);
    svg.push_str("</g>\n</svg>\n");

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape(title));
    out.push_str("<style>\n");
    out.push_str(BASE_CSS);
    let legend = view.legend();
    write_control_css(
        &mut out,
        view.device(),
        ".legend",
        legend.position(Device::Desktop),
        legend.position(Device::Mobile),
    );
    let slider = view.slider();
    write_control_css(
        &mut out,
        view.device(),
        &format!("#{}", css_ident(slider.element_id())),
        slider.position(Device::Desktop),
        slider.position(Device::Mobile),
    );
    out.push_str("</style>\n</head>\n<body>\n");

    let _ = writeln!(
        out,
        r#"<div id="map" style="width:{}px;height:{}px">"#,
        map.width, map.height
    );
    out.push_str(&svg);
    write_legend(&mut out, view);
    write_slider(&mut out, view);
    if map.zoom_control {
        out.push_str(ZOOM_CONTROL);
    }
    out.push_str("<div id=\"tooltip\" hidden></div>\n</div>\n");

    let _ = writeln!(out, "<script>\nconst DATA = {json};\n{SCRIPT}</script>");
    out.push_str("</body>\n</html>\n");
    Ok(out)
}

fn write_legend(out: &mut String, view: &MapView) {
    let legend = view.legend();
    out.push_str("<div class=\"ctl legend\">\n");
    let _ = writeln!(out, "<h3>{}</h3>\n<ul>", legend.title());
    for entry in legend.entries().iter().chain(std::iter::once(legend.no_data())) {
        let _ = writeln!(
            out,
            r#"<li><span style="background:{}"></span>{}</li>"#,
            entry.color.to_css(),
            entry.label
        );
    }
    out.push_str("</ul>\n</div>\n");
}

fn write_slider(out: &mut String, view: &MapView) {
    let slider = view.slider();
    let _ = writeln!(
        out,
        r#"<div id="{}" class="ctl"><input type="range" class="year-slider" min="0" max="{}" step="1" value="{}"><span class="year-label">{}</span></div>"#,
        escape(slider.element_id()),
        slider.years().len().saturating_sub(1),
        slider.index(),
        escape(slider.current())
    );
}

/// Desktop placement with a narrow-screen override, or the mobile corner only
/// when the view is laid out for mobile.
fn write_control_css(
    out: &mut String,
    device: Device,
    selector: &str,
    desktop: ControlPosition,
    mobile: ControlPosition,
) {
    match device {
        Device::Mobile => {
            let _ = writeln!(out, "{selector} {{ {} }}", corner_css(mobile));
        }
        Device::Desktop => {
            let _ = writeln!(out, "{selector} {{ {} }}", corner_css(desktop));
            let _ = writeln!(
                out,
                "@media (max-width: 640px), (pointer: coarse) {{ {selector} {{ {} }} }}",
                corner_css(mobile)
            );
        }
    }
}

fn corner_css(position: ControlPosition) -> &'static str {
    match position {
        ControlPosition::TopLeft => "top: 10px; left: 10px; bottom: auto; right: auto;",
        ControlPosition::TopRight => "top: 10px; right: 10px; bottom: auto; left: auto;",
        ControlPosition::BottomLeft => "bottom: 10px; left: 10px; top: auto; right: auto;",
        ControlPosition::BottomRight => "bottom: 10px; right: 10px; top: auto; left: auto;",
    }
}

fn css_ident(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

const ZOOM_CONTROL: &str = "<div class=\"ctl zoom\"><button data-zoom=\"1\">+</button>\
    <button data-zoom=\"-1\">&minus;</button></div>\n";

const BASE_CSS: &str = "\
body { margin: 0; font-family: sans-serif; }
#map { position: relative; overflow: hidden; }
#map svg { display: block; touch-action: none; }
.ctl { position: absolute; background: rgba(255,255,255,0.9); border-radius: 4px; padding: 6px 10px; }
.legend h3 { margin: 0 0 6px; font-size: 15px; }
.legend ul { list-style: none; margin: 0; padding: 0; }
.legend li { font-size: 12px; line-height: 20px; }
.legend li span { display: inline-block; width: 14px; height: 14px; margin-right: 6px; vertical-align: middle; }
.year-label { margin-left: 8px; font-weight: bold; }
.zoom { top: 10px; left: 50%; }
#tooltip { position: absolute; pointer-events: none; background: #fff; border: 1px solid #999; border-radius: 3px; padding: 4px 8px; font-size: 12px; white-space: nowrap; }
";

const SCRIPT: &str = r#"(function () {
  const svg = document.querySelector('#map svg');
  const pan = document.getElementById('map-pan');
  const group = pan.querySelector('g.choropleth');
  const tip = document.getElementById('tooltip');
  const slider = document.querySelector('.year-slider');
  const label = document.querySelector('.year-label');
  const title = document.querySelector('.legend h3');
  const paths = new Map();
  document.querySelectorAll('path[data-feature]').forEach(p => paths.set(+p.dataset.feature, p));
  const styles = DATA.styles.map(s => Object.assign({}, s));
  let frame = DATA.frames[DATA.start];

  function paint(i) {
    const p = paths.get(i), s = styles[i];
    if (!p) return;
    p.setAttribute('stroke', s.stroke);
    p.setAttribute('stroke-width', s.weight);
    p.setAttribute('stroke-opacity', s.opacity * s.stroke_alpha);
    p.setAttribute('fill-opacity', s.fill_opacity);
  }
  function patch(i, change) {
    Object.assign(styles[i], change);
    paint(i);
  }
  function showYear(index) {
    frame = DATA.frames[index];
    paths.forEach((p, i) => p.setAttribute('fill', frame.fills[i]));
    label.textContent = frame.year;
    title.innerHTML = frame.title;
  }

  slider.addEventListener('input', e => showYear(+e.target.value));

  if (DATA.interactive && group) {
    paths.forEach((p, i) => {
      p.addEventListener('mouseover', () => {
        patch(i, DATA.hover);
        group.appendChild(p);
        tip.innerHTML = frame.tooltips[i];
        tip.hidden = false;
      });
      p.addEventListener('mousemove', e => {
        const r = svg.getBoundingClientRect();
        tip.style.left = (e.clientX - r.left + 12) + 'px';
        tip.style.top = (e.clientY - r.top + 12) + 'px';
      });
      p.addEventListener('mouseout', () => {
        patch(i, DATA.unhover);
        group.insertBefore(p, group.firstChild);
        tip.hidden = true;
      });
    });
  }

  let k = 1, tx = 0, ty = 0;
  function apply() { pan.setAttribute('transform', `translate(${tx},${ty}) scale(${k})`); }
  function zoomAt(steps, x, y) {
    const f = Math.pow(2, steps * DATA.zoom_delta);
    tx = x - (x - tx) * f;
    ty = y - (y - ty) * f;
    k *= f;
    apply();
  }
  if (DATA.scroll_wheel_zoom) {
    svg.addEventListener('wheel', e => {
      e.preventDefault();
      const r = svg.getBoundingClientRect();
      zoomAt(e.deltaY < 0 ? 1 : -1, e.clientX - r.left, e.clientY - r.top);
    }, { passive: false });
  }
  document.querySelectorAll('[data-zoom]').forEach(b => b.addEventListener('click', () => {
    zoomAt(+b.dataset.zoom, svg.clientWidth / 2, svg.clientHeight / 2);
  }));
  if (DATA.dragging) {
    let drag = null;
    svg.addEventListener('pointerdown', e => { drag = { x: e.clientX - tx, y: e.clientY - ty }; });
    window.addEventListener('pointermove', e => {
      if (!drag) return;
      tx = e.clientX - drag.x;
      ty = e.clientY - drag.y;
      apply();
    });
    window.addEventListener('pointerup', () => { drag = null; });
  }
})();
"#;
