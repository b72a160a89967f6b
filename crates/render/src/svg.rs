//! Static SVG output for one year.

use std::fmt::Write as _;

use foundation::Rgba;
use foundation::math::Vec2;
use formats::ControlPosition;
use layers::{Legend, MapView, PathStyle};

use crate::camera::Camera;
use crate::renderer::{PathCommand, RenderFrame, Renderer, num};

const MARGIN: f64 = 10.0;
const LEGEND_WIDTH: f64 = 190.0;
const LINE_HEIGHT: f64 = 20.0;
const SWATCH: f64 = 14.0;
const SLIDER_WIDTH: f64 = 120.0;

pub fn render_svg(view: &MapView, camera: &Camera, background: Rgba) -> String {
    let frame = Renderer::collect(view, camera);
    let mut out = String::new();
    open_svg(&mut out, &frame, background);
    write_paths(&mut out, &frame);
    write_legend(&mut out, view.legend(), view.legend().position(view.device()), frame.viewport);
    write_year_badge(
        &mut out,
        view.year(),
        view.slider().position(view.device()),
        frame.viewport,
    );
    out.push_str("</svg>\n");
    out
}

pub(crate) fn open_svg(out: &mut String, frame: &RenderFrame, background: Rgba) {
    let (w, h) = (num(frame.viewport.x), num(frame.viewport.y));
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = writeln!(
        out,
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        background.to_css()
    );
}

/// Paths grouped per layer, bottom to top.
pub(crate) fn write_paths(out: &mut String, frame: &RenderFrame) {
    let mut current = None;
    for cmd in &frame.commands {
        if current != Some(cmd.layer) {
            if current.is_some() {
                out.push_str("</g>\n");
            }
            let _ = writeln!(
                out,
                r#"<g class="{}" data-layer="{}">"#,
                cmd.kind.as_str(),
                cmd.layer.0
            );
            current = Some(cmd.layer);
        }
        write_path(out, cmd);
    }
    if current.is_some() {
        out.push_str("</g>\n");
    }
}

fn write_path(out: &mut String, cmd: &PathCommand) {
    out.push_str("<path");
    if let Some(i) = cmd.feature {
        let _ = write!(out, r#" data-feature="{i}""#);
    }
    let _ = write!(out, r#" d="{}""#, cmd.d);
    out.push_str(&style_attrs(&cmd.style, cmd.filled));
    match &cmd.tooltip {
        Some(text) => {
            let _ = writeln!(out, "><title>{}</title></path>", escape(&plain_text(text)));
        }
        None => out.push_str("/>\n"),
    }
}

pub(crate) fn style_attrs(style: &PathStyle, filled: bool) -> String {
    let mut s = String::new();
    let _ = write!(
        s,
        r#" stroke="{}" stroke-width="{}" stroke-opacity="{}" stroke-linejoin="round""#,
        style.stroke.to_hex(),
        num(style.weight),
        num(style.opacity * style.stroke.a),
    );
    if filled {
        let fill = style.fill_color();
        let _ = write!(
            s,
            r#" fill="{}" fill-opacity="{}" fill-rule="evenodd""#,
            fill.to_hex(),
            num(style.fill_opacity * fill.a),
        );
    } else {
        s.push_str(r#" fill="none""#);
    }
    if !style.interactive {
        s.push_str(r#" pointer-events="none""#);
    }
    s
}

/// Top-left corner of a `size` box docked in `position`.
pub(crate) fn dock(position: ControlPosition, size: (f64, f64), viewport: Vec2) -> (f64, f64) {
    let x = match position {
        ControlPosition::TopLeft | ControlPosition::BottomLeft => MARGIN,
        ControlPosition::TopRight | ControlPosition::BottomRight => viewport.x - MARGIN - size.0,
    };
    let y = match position {
        ControlPosition::TopLeft | ControlPosition::TopRight => MARGIN,
        ControlPosition::BottomLeft | ControlPosition::BottomRight => viewport.y - MARGIN - size.1,
    };
    (x, y)
}

fn write_legend(
    out: &mut String,
    legend: &Legend,
    position: ControlPosition,
    viewport: Vec2,
) {
    let rows = legend.entries().len() + 1;
    let height = LINE_HEIGHT * (rows as f64 + 1.0) + MARGIN;
    let (x, y) = dock(position, (LEGEND_WIDTH, height), viewport);

    let _ = writeln!(
        out,
        r#"<g class="legend" transform="translate({},{})">"#,
        num(x),
        num(y)
    );
    let _ = writeln!(
        out,
        r##"<rect width="{}" height="{}" rx="4" fill="#ffffff" fill-opacity="0.9"/>"##,
        num(LEGEND_WIDTH),
        num(height)
    );
    let _ = writeln!(
        out,
        r#"<text x="{}" y="{}" font-family="sans-serif" font-size="14" font-weight="bold">{}</text>"#,
        num(MARGIN),
        num(LINE_HEIGHT),
        escape(&plain_text(&legend.title()))
    );

    let swatches = legend
        .entries()
        .iter()
        .map(|e| (e.color, e.label.as_str()))
        .chain(std::iter::once((legend.no_data().color, legend.no_data().label.as_str())));
    for (row, (color, label)) in swatches.enumerate() {
        let top = LINE_HEIGHT * (row as f64 + 1.0) + MARGIN / 2.0;
        let _ = writeln!(
            out,
            r#"<rect x="{}" y="{}" width="{SWATCH}" height="{SWATCH}" fill="{}"/>"#,
            num(MARGIN),
            num(top),
            color.to_hex()
        );
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-family="sans-serif" font-size="12">{}</text>"#,
            num(MARGIN * 2.0 + SWATCH),
            num(top + SWATCH - 2.0),
            escape(&plain_text(label))
        );
    }
    out.push_str("</g>\n");
}

fn write_year_badge(
    out: &mut String,
    year: &str,
    position: ControlPosition,
    viewport: Vec2,
) {
    let height = LINE_HEIGHT + MARGIN;
    let (x, y) = dock(position, (SLIDER_WIDTH, height), viewport);
    let _ = writeln!(
        out,
        r##"<g class="year" transform="translate({},{})"><rect width="{}" height="{}" rx="4" fill="#ffffff" fill-opacity="0.9"/><text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text></g>"##,
        num(x),
        num(y),
        num(SLIDER_WIDTH),
        num(height),
        num(SLIDER_WIDTH / 2.0),
        num(LINE_HEIGHT),
        escape(year)
    );
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Strips markup from tooltip or label HTML; `<br>` becomes a newline.
pub(crate) fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
        if tag.starts_with("br") {
            out.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    decode_entities(out.trim())
}

fn decode_entities(text: &str) -> String {
    const ENTITIES: &[(&str, &str)] = &[
        ("&mdash;", "\u{2014}"),
        ("&ndash;", "\u{2013}"),
        ("&nbsp;", "\u{a0}"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&amp;", "&"),
    ];
    let mut out = text.to_string();
    for (entity, ch) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{dock, escape, plain_text, render_svg};
    use crate::tests::view;
    use foundation::Rgba;
    use foundation::math::Vec2;
    use formats::ControlPosition;
    use layers::Device;

    #[test]
    fn strips_markup_from_tooltips() {
        assert_eq!(
            plain_text("<b>Burleigh County</b><br>\n 2.6% Unemployment"),
            "Burleigh County\n\n 2.6% Unemployment"
        );
        assert_eq!(plain_text("1% &mdash; 2%"), "1% \u{2014} 2%");
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn docks_controls_in_corners() {
        let vp = Vec2::new(960.0, 600.0);
        assert_eq!(dock(ControlPosition::TopLeft, (100.0, 50.0), vp), (10.0, 10.0));
        assert_eq!(dock(ControlPosition::TopRight, (100.0, 50.0), vp), (850.0, 10.0));
        assert_eq!(dock(ControlPosition::BottomLeft, (100.0, 50.0), vp), (10.0, 540.0));
        assert_eq!(dock(ControlPosition::BottomRight, (100.0, 50.0), vp), (850.0, 540.0));
    }

    #[test]
    fn svg_has_paths_legend_and_year() {
        let (mut view, cam) = view();
        let svg = render_svg(&view, &cam, Rgba::rgb(255, 255, 255));
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"data-feature="0""#));
        assert!(svg.contains("<title>Burleigh County\n2.6% Unemployment</title>"));
        assert!(svg.contains("<title>Data unavailable</title>"));
        assert!(svg.contains(r##"fill="#d3d3d3""##));
        assert!(svg.contains(r#"class="overlay""#));
        assert!(svg.contains("2001 Unemployment Rates"));
        assert!(svg.contains(">No data</text>"));

        // Mobile layout moves the legend to the bottom-left corner.
        let desktop_legend = svg.lines().find(|l| l.contains(r#"class="legend""#)).map(str::to_string);
        view.set_device(Device::Mobile);
        let svg = render_svg(&view, &cam, Rgba::rgb(255, 255, 255));
        let mobile_legend = svg.lines().find(|l| l.contains(r#"class="legend""#)).map(str::to_string);
        assert_ne!(desktop_legend, mobile_legend);
        assert_eq!(
            mobile_legend.as_deref(),
            Some(r#"<g class="legend" transform="translate(10,440)">"#)
        );

        view.select_year("2002");
        let svg = render_svg(&view, &cam, Rgba::rgb(255, 255, 255));
        assert!(svg.contains("2002 Unemployment Rates"));
        assert!(svg.contains("<title>Burleigh County\n3.1% Unemployment</title>"));
    }
}
