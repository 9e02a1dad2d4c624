//! Self-contained HTML output: inline SVG map, color bar, hover/pan/zoom script.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;
use serde::Serialize;

use super::ChoroplethOptions;
use super::geometry::PolygonRings;
use super::join::JoinedRegion;
use super::scale::ColorMapper;
use crate::error::{Result, render_err};
use crate::figure::fonts::ensure_registered;
use crate::figure::text::format_tick;

const COLORBAR_WIDTH: u32 = 120;
const TITLE_HEIGHT: u32 = 36;
const MAP_MARGIN: u32 = 10;
const COLORBAR_TICKS: usize = 5;

/// Tooltip payload for one region, in unzoomed SVG pixel space.
#[derive(Serialize)]
struct HoverRegion {
    name: String,
    value: String,
    /// Polygons as lists of rings of `[x, y]`.
    polygons: Vec<Vec<Vec<[f64; 2]>>>,
}

/// Tooltip text of a value: thousands separators, `N/A` when missing.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => (v.round() as i64).to_formatted_string(&Locale::en),
        _ => "N/A".to_string(),
    }
}

/// Color-bar tick label: grouped integers for wide ranges, short decimals otherwise.
fn format_colorbar_tick(v: f64, span: f64) -> String {
    if span >= 10.0 {
        (v.round() as i64).to_formatted_string(&Locale::en)
    } else {
        format_tick(v)
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Data extent padded and widened to the pixel aspect ratio, so shapes keep their proportions.
fn fit_extent(
    bounds: Option<(f64, f64, f64, f64)>,
    px_w: u32,
    px_h: u32,
) -> ((f64, f64), (f64, f64)) {
    let Some((x0, y0, x1, y1)) = bounds else {
        return ((0.0, 1.0), (0.0, 1.0));
    };
    let dw = (x1 - x0).max(f64::EPSILON);
    let dh = (y1 - y0).max(f64::EPSILON);
    let (pw, ph) = (px_w.max(1) as f64, px_h.max(1) as f64);
    let units_per_px = (dw / pw).max(dh / ph) * 1.02;
    let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
    let (hw, hh) = (pw * units_per_px / 2.0, ph * units_per_px / 2.0);
    ((cx - hw, cx + hw), (cy - hh, cy + hh))
}

fn region_bounds(regions: &[JoinedRegion]) -> Option<(f64, f64, f64, f64)> {
    regions
        .iter()
        .flat_map(|r| r.polygons.iter())
        .flat_map(|p| p.iter())
        .flat_map(|ring| ring.iter())
        .fold(None, |acc, &(x, y)| match acc {
            None => Some((x, y, x, y)),
            Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
        })
}

/// Render the region layer to SVG and collect the hover geometry.
/// Absolute shoelace area of the outer ring.
fn outer_area(poly: &PolygonRings) -> f64 {
    let Some(ring) = poly.first() else {
        return 0.0;
    };
    let n = ring.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum();
    (twice / 2.0).abs()
}

fn render_map_svg(
    regions: &[JoinedRegion],
    mapper: &ColorMapper,
    opts: &ChoroplethOptions,
    size: (u32, u32),
) -> Result<(String, Vec<HoverRegion>)> {
    let mut svg = String::new();
    let mut hover = Vec::with_capacity(regions.len());
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let inner = (
            size.0.saturating_sub(2 * MAP_MARGIN),
            size.1.saturating_sub(2 * MAP_MARGIN),
        );
        let (xr, yr) = fit_extent(region_bounds(regions), inner.0, inner.1);
        let mut chart = ChartBuilder::on(&root)
            .margin(MAP_MARGIN)
            .build_cartesian_2d(xr.0..xr.1, yr.0..yr.1)
            .map_err(render_err)?;

        let border = (opts.line_width > 0.0).then(|| {
            RGBColor::from(opts.line_color).stroke_width((opts.line_width.round() as u32).max(1))
        });

        // Larger outlines go first so enclaves and hole fills stack on top of their host.
        let mut layers: Vec<(f64, &PolygonRings, ShapeStyle)> = regions
            .iter()
            .flat_map(|region| {
                let fill = RGBColor::from(mapper.map(region.value))
                    .mix(opts.fill_alpha.clamp(0.0, 1.0))
                    .filled();
                region
                    .polygons
                    .iter()
                    .map(move |poly| (outer_area(poly), poly, fill))
            })
            .collect();
        layers.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, poly, fill) in layers {
            for (i, ring) in poly.iter().enumerate() {
                if ring.len() < 3 {
                    continue;
                }
                // holes are punched out with the page background
                let style = if i == 0 { fill } else { WHITE.filled() };
                chart
                    .draw_series(std::iter::once(Polygon::new(ring.clone(), style)))
                    .map_err(render_err)?;
                if let Some(border) = border {
                    let mut closed = ring.clone();
                    closed.push(ring[0]);
                    chart
                        .draw_series(std::iter::once(PathElement::new(closed, border)))
                        .map_err(render_err)?;
                }
            }
        }

        for region in regions {
            let pixel_polys = region
                .polygons
                .iter()
                .map(|poly| {
                    poly.iter()
                        .map(|ring| {
                            ring.iter()
                                .map(|p| {
                                    let (x, y) = chart.backend_coord(p);
                                    [x as f64, y as f64]
                                })
                                .collect()
                        })
                        .collect()
                })
                .collect();
            hover.push(HoverRegion {
                name: region.name.clone().unwrap_or_else(|| "N/A".to_string()),
                value: format_value(region.value),
                polygons: pixel_polys,
            });
        }
        root.present().map_err(render_err)?;
    }
    Ok((svg, hover))
}

/// Vertical color bar titled with the legend label; low values at the bottom.
fn render_colorbar_svg(mapper: &ColorMapper, legend_label: &str, height: u32) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (COLORBAR_WIDTH, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        ensure_registered(FontFamily::SansSerif.as_str());
        let text = FontDesc::new(FontFamily::SansSerif, 12.0, FontStyle::Normal).color(&BLACK);
        root.draw(&Text::new(
            legend_label.to_string(),
            (10, 14),
            text.pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(render_err)?;

        let (bx0, bx1) = (12i32, 32i32);
        let top = 32i32;
        let bottom = height as i32 - 20;
        let span_px = (bottom - top).max(1) as f64;
        let n = mapper.palette.len().max(1);
        for (i, c) in mapper.palette.iter().enumerate() {
            let y_hi = bottom - ((i + 1) as f64 / n as f64 * span_px).round() as i32;
            let y_lo = bottom - (i as f64 / n as f64 * span_px).round() as i32;
            root.draw(&Rectangle::new(
                [(bx0, y_hi), (bx1, y_lo)],
                RGBColor::from(*c).filled(),
            ))
            .map_err(render_err)?;
        }
        root.draw(&Rectangle::new([(bx0, top), (bx1, bottom)], BLACK.stroke_width(1)))
            .map_err(render_err)?;

        let (low, high) = (mapper.range.low, mapper.range.high);
        for k in 0..COLORBAR_TICKS {
            let t = k as f64 / (COLORBAR_TICKS - 1) as f64;
            let y = bottom - (t * span_px).round() as i32;
            root.draw(&PathElement::new(vec![(bx1, y), (bx1 + 4, y)], BLACK.stroke_width(1)))
                .map_err(render_err)?;
            root.draw(&Text::new(
                format_colorbar_tick(low + (high - low) * t, high - low),
                (bx1 + 8, y),
                text.pos(Pos::new(HPos::Left, VPos::Center)),
            ))
            .map_err(render_err)?;
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Complete HTML page for the joined regions.
pub fn render_document(
    regions: &[JoinedRegion],
    mapper: &ColorMapper,
    opts: &ChoroplethOptions,
) -> Result<String> {
    let map_w = opts.width.saturating_sub(COLORBAR_WIDTH).max(100);
    let map_h = opts.height.saturating_sub(TITLE_HEIGHT).max(100);

    let (map_svg, hover) = render_map_svg(regions, mapper, opts, (map_w, map_h))?;
    let colorbar_svg = render_colorbar_svg(mapper, &opts.legend_label, map_h)?;
    let data = serde_json::to_string(&hover)?.replace("</", "<\\/");
    let labels = serde_json::to_string(&[&opts.region_label, &opts.legend_label])?
        .replace("</", "<\\/");

    let title = escape_html(&opts.title);
    Ok(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: sans-serif; margin: 0; padding: 8px; }}
  .map-title {{ height: {title_h}px; line-height: {title_h}px; font-size: 18px; font-weight: bold; }}
  .map-row {{ display: flex; width: {width}px; }}
  #map {{ position: relative; width: {map_w}px; height: {map_h}px; overflow: hidden; cursor: grab; }}
  #map svg {{ display: block; }}
  #tooltip {{ position: absolute; display: none; pointer-events: none; background: rgba(255,255,255,0.95);
    border: 1px solid #888; padding: 4px 6px; font-size: 12px; white-space: nowrap; }}
  .toolbar {{ font-size: 12px; color: #555; margin-top: 4px; }}
</style>
</head>
<body>
<div class="map-title">{title}</div>
<div class="map-row">
<div id="map">{map_svg}<div id="tooltip"></div></div>
<div id="colorbar">{colorbar_svg}</div>
</div>
<div class="toolbar">Drag to pan, scroll to zoom, double-click to reset. <a id="save" href="#" download="map.svg">Save SVG</a></div>
<script>
(function () {{
  const REGIONS = {data};
  const LABELS = {labels};
  const W = {map_w}, H = {map_h};
  const host = document.getElementById("map");
  const svg = host.querySelector("svg");
  const tip = document.getElementById("tooltip");
  let view = {{ x: 0, y: 0, w: W, h: H }};
  let drag = null;

  function apply() {{
    svg.setAttribute("viewBox", view.x + " " + view.y + " " + view.w + " " + view.h);
  }}
  function toSvg(ev) {{
    const r = svg.getBoundingClientRect();
    return [view.x + (ev.clientX - r.left) / r.width * view.w,
            view.y + (ev.clientY - r.top) / r.height * view.h];
  }}
  function inRing(p, ring) {{
    let inside = false;
    for (let i = 0, j = ring.length - 1; i < ring.length; j = i++) {{
      const xi = ring[i][0], yi = ring[i][1], xj = ring[j][0], yj = ring[j][1];
      if ((yi > p[1]) !== (yj > p[1]) && p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi) inside = !inside;
    }}
    return inside;
  }}
  function hit(p) {{
    for (let k = REGIONS.length - 1; k >= 0; k--) {{
      for (const poly of REGIONS[k].polygons) {{
        let inside = false;
        for (const ring of poly) if (inRing(p, ring)) inside = !inside;
        if (inside) return REGIONS[k];
      }}
    }}
    return null;
  }}
  function text(s) {{ return document.createTextNode(s); }}

  host.addEventListener("mousemove", function (ev) {{
    if (drag) {{
      const r = svg.getBoundingClientRect();
      view.x = drag.x - (ev.clientX - drag.cx) / r.width * view.w;
      view.y = drag.y - (ev.clientY - drag.cy) / r.height * view.h;
      apply();
      return;
    }}
    const region = hit(toSvg(ev));
    if (!region) {{ tip.style.display = "none"; return; }}
    tip.replaceChildren(text(LABELS[0] + ": " + region.name), document.createElement("br"),
                        text(LABELS[1] + ": " + region.value));
    const r = host.getBoundingClientRect();
    tip.style.left = (ev.clientX - r.left + 12) + "px";
    tip.style.top = (ev.clientY - r.top + 12) + "px";
    tip.style.display = "block";
  }});
  host.addEventListener("mouseleave", function () {{ tip.style.display = "none"; drag = null; }});
  host.addEventListener("mousedown", function (ev) {{
    drag = {{ x: view.x, y: view.y, cx: ev.clientX, cy: ev.clientY }};
    host.style.cursor = "grabbing";
  }});
  window.addEventListener("mouseup", function () {{ drag = null; host.style.cursor = "grab"; }});
  host.addEventListener("wheel", function (ev) {{
    ev.preventDefault();
    const p = toSvg(ev);
    const f = ev.deltaY < 0 ? 0.8 : 1.25;
    view = {{ x: p[0] - (p[0] - view.x) * f, y: p[1] - (p[1] - view.y) * f, w: view.w * f, h: view.h * f }};
    apply();
  }}, {{ passive: false }});
  host.addEventListener("dblclick", function () {{ view = {{ x: 0, y: 0, w: W, h: H }}; apply(); }});
  document.getElementById("save").addEventListener("click", function (ev) {{
    const blob = new Blob([new XMLSerializer().serializeToString(svg)], {{ type: "image/svg+xml" }});
    ev.currentTarget.href = URL.createObjectURL(blob);
  }});
  apply();
}})();
</script>
</body>
</html>
"##,
        title = title,
        title_h = TITLE_HEIGHT,
        width = map_w + COLORBAR_WIDTH,
        map_w = map_w,
        map_h = map_h,
        map_svg = map_svg,
        colorbar_svg = colorbar_svg,
        data = data,
        labels = labels,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choropleth::scale::ScaleRange;
    use crate::color::Rgb;

    fn square(name: &str, value: Option<f64>, x: f64) -> JoinedRegion {
        JoinedRegion {
            name: Some(name.to_string()),
            key: Some(name.to_lowercase()),
            value,
            polygons: vec![vec![vec![(x, 0.0), (x + 1.0, 0.0), (x + 1.0, 1.0), (x, 1.0)]]],
        }
    }

    fn mapper() -> ColorMapper {
        ColorMapper::new(
            vec![Rgb::BLACK, Rgb::WHITE],
            ScaleRange { low: 0.0, high: 2000.0 },
            Rgb::LIGHTGREY,
        )
    }

    #[test]
    fn values_use_thousands_separators() {
        assert_eq!(format_value(Some(1234567.4)), "1,234,567");
        assert_eq!(format_value(None), "N/A");
        assert_eq!(format_value(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn fit_extent_keeps_aspect() {
        let ((x0, x1), (y0, y1)) = fit_extent(Some((0.0, 0.0, 10.0, 10.0)), 200, 100);
        let ratio = (x1 - x0) / (y1 - y0);
        assert!((ratio - 2.0).abs() < 1e-9);
        assert!(x0 < 0.0 && x1 > 10.0);
        assert!(y0 <= 0.0 && y1 >= 10.0);
    }

    #[test]
    fn document_embeds_regions_and_escapes_title() {
        let opts = ChoroplethOptions {
            title: "Votes <2024>".into(),
            legend_label: "Voix".into(),
            region_label: "Moughataa".into(),
            ..ChoroplethOptions::default()
        };
        let regions = vec![square("Atar", Some(1500.0), 0.0), square("Néma", None, 2.0)];
        let html = render_document(&regions, &mapper(), &opts).unwrap();
        assert!(html.contains("<title>Votes &lt;2024&gt;</title>"));
        assert!(html.contains("\"Moughataa\""));
        assert!(html.contains("\"1,500\""));
        assert!(html.contains("\"N/A\""));
        assert!(html.contains("<svg"));
        assert!(html.contains("Voix"));
        assert!(!html.contains("Votes <2024>"));
    }

    #[test]
    fn script_data_cannot_close_the_script_tag() {
        let regions = vec![square("</script><b>", Some(1.0), 0.0)];
        let html = render_document(&regions, &mapper(), &ChoroplethOptions::default()).unwrap();
        assert!(!html.contains("</script><b>"));
    }

    #[test]
    fn document_offers_svg_download() {
        let regions = [square("Atar", Some(1.0), 0.0)];
        let html = render_document(&regions, &mapper(), &ChoroplethOptions::default()).unwrap();
        assert!(html.contains(r#"download="map.svg""#));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn enclaves_stay_visible_inside_a_holed_region() {
        let dark_red = Rgb::new(0x7F, 0, 0);
        let dark_blue = Rgb::new(0, 0, 0x7F);
        let mapper = ColorMapper::new(
            vec![dark_red, dark_blue],
            ScaleRange { low: 0.0, high: 10.0 },
            Rgb::LIGHTGREY,
        );
        let enclave = square("inner", Some(0.0), 1.0);
        let host = JoinedRegion {
            name: Some("outer".into()),
            key: Some("outer".into()),
            value: Some(10.0),
            polygons: vec![vec![
                vec![(-1.0, -1.0), (3.0, -1.0), (3.0, 2.0), (-1.0, 2.0)],
                vec![(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0)],
            ]],
        };
        let (svg, hover) = render_map_svg(
            &[enclave, host],
            &mapper,
            &ChoroplethOptions::default(),
            (400, 300),
        )
        .unwrap();
        let enclave_fill = svg.rfind(r##"fill="#7F0000""##).unwrap();
        let hole_fill = svg.rfind(r##"fill="#FFFFFF""##).unwrap();
        assert!(enclave_fill > hole_fill);
        assert!(svg.find(r##"fill="#00007F""##).unwrap() < hole_fill);
        assert_eq!(hover[0].name, "inner");
    }

    #[test]
    fn zero_line_width_draws_no_borders() {
        let regions = [square("Atar", Some(1.0), 0.0)];
        let (with_borders, _) =
            render_map_svg(&regions, &mapper(), &ChoroplethOptions::default(), (300, 200)).unwrap();
        assert!(with_borders.contains("<polyline"));

        let opts = ChoroplethOptions {
            line_width: 0.0,
            ..ChoroplethOptions::default()
        };
        let (without, _) = render_map_svg(&regions, &mapper(), &opts, (300, 200)).unwrap();
        assert!(!without.contains("<polyline"));
    }

    #[test]
    fn outer_area_ignores_winding() {
        let cw = vec![vec![(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]];
        let ccw = vec![vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]];
        assert_eq!(outer_area(&cw), 4.0);
        assert_eq!(outer_area(&ccw), 4.0);
    }
}
