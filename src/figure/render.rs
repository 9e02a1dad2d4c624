//! Plotters rendering of a retained [`Figure`].

use std::f64::consts::PI;
use std::path::Path;

use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::TRANSPARENT;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use super::text::{estimate_text_width_px, format_tick, truncate_to_width};
use super::{Artist, Axes, Figure, Limits, MarkerShape, PieArtist};
use crate::color::Rgb;
use crate::error::{Result, render_err};
use crate::theme::RenderDefaults;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Figures are laid out at 100 dpi.
const PX_PER_PT: f64 = 100.0 / 72.0;
const MARGIN: u32 = 12;
const TIGHT_MARGIN: u32 = 6;
const Y_TICKS: usize = 10;

pub(crate) fn pt_to_px(pt: f64) -> f64 {
    pt * PX_PER_PT
}

fn stroke_px(pt: f64) -> u32 {
    (pt_to_px(pt).round() as u32).max(1)
}

fn font(family: &str, pt: u32, bold: bool, color: Rgb) -> TextStyle<'_> {
    let style = if bold {
        FontStyle::Bold
    } else {
        FontStyle::Normal
    };
    super::fonts::ensure_registered(family);
    FontDesc::new(FontFamily::Name(family), pt_to_px(pt as f64), style)
        .color(&RGBColor::from(color))
}

pub(crate) fn save(fig: &Figure, path: &Path) -> Result<()> {
    let size = (fig.config().width, fig.config().height);
    let is_svg = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_figure(&root, fig)?;
        root.present().map_err(render_err)?;
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw_figure(&root, fig)?;
        root.present().map_err(render_err)?;
    }
    log::debug!("rendered {}x{} figure to {}", size.0, size.1, path.display());
    Ok(())
}

pub(crate) fn to_svg_string(fig: &Figure) -> Result<String> {
    let size = (fig.config().width, fig.config().height);
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, size).into_drawing_area();
        draw_figure(&root, fig)?;
        root.present().map_err(render_err)?;
    }
    Ok(buf)
}

/// Paint every axes of `fig` onto `root`, side by side.
pub fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, fig: &Figure) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&RGBColor::from(fig.defaults().figure_facecolor))
        .map_err(render_err)?;

    let panels = root.split_evenly((1, fig.axes_count().max(1)));
    for (panel, axes) in panels.iter().zip(fig.all_axes()) {
        let area = match axes.title() {
            Some(t) if !t.trim().is_empty() => {
                let d = axes.defaults();
                let style = font(&d.font_family, d.title_size, d.title_bold, d.axes_labelcolor);
                panel.titled(t, style).map_err(render_err)?
            }
            _ => panel.clone(),
        };
        if axes.is_pie() {
            draw_pie_axes(&area, axes)?;
        } else {
            draw_cartesian(&area, axes, fig.is_tight())?;
        }
    }
    Ok(())
}

/// Compute a tight left label area width for the Y axis (in pixels), based on the
/// formatted tick labels that will appear.
pub fn compute_left_label_area_px(ymin: f64, ymax: f64, ticks: usize, font_px: u32) -> u32 {
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = ymin + (ymax - ymin) * t;
        max_px = max_px.max(estimate_text_width_px(&format_tick(v), font_px));
    }
    max_px.saturating_add(18).clamp(36, 140)
}

struct Gutters {
    margin: u32,
    left: u32,
    bottom: u32,
}

fn gutters(axes: &Axes, limits: &Limits, tight: bool) -> Gutters {
    let d = axes.defaults();
    let label_px = pt_to_px(d.label_size as f64).ceil() as u32;
    if !tight {
        return Gutters {
            margin: MARGIN,
            left: 70,
            bottom: 56,
        };
    }
    let tick_px = pt_to_px(d.ytick_labelsize as f64).ceil() as u32;
    let desc = |label: Option<&str>| if label.is_some() { label_px + 10 } else { 0 };
    Gutters {
        margin: TIGHT_MARGIN,
        left: compute_left_label_area_px(limits.y.0, limits.y.1, Y_TICKS, tick_px)
            + desc(axes.ylabel()),
        bottom: pt_to_px(d.xtick_labelsize as f64).ceil() as u32 + 14 + desc(axes.xlabel()),
    }
}

fn draw_cartesian<DB>(area: &DrawingArea<DB, Shift>, axes: &Axes, tight: bool) -> Result<()>
where
    DB: DrawingBackend,
{
    let d = axes.defaults();
    let limits = axes.view_limits();
    let g = gutters(axes, &limits, tight);

    let mut chart = ChartBuilder::on(area)
        .margin(g.margin)
        .x_label_area_size(g.bottom)
        .y_label_area_size(g.left)
        .build_cartesian_2d(limits.x.0..limits.x.1, limits.y.0..limits.y.1)
        .map_err(render_err)?;

    chart
        .plotting_area()
        .fill(&RGBColor::from(d.axes_facecolor))
        .map_err(render_err)?;

    let grid_first = !d.grid_visible || d.grid_below;
    if grid_first {
        draw_mesh(&mut chart, axes)?;
    }

    let mut labelled = false;
    for artist in axes.artists() {
        labelled |= draw_artist(&mut chart, artist)?;
    }

    if !grid_first {
        draw_mesh(&mut chart, axes)?;
    }
    draw_spines(&mut chart, axes, &limits)?;

    if axes.legend_enabled() && labelled {
        chart
            .configure_series_labels()
            .border_style(RGBColor::from(d.grid_color))
            .background_style(WHITE.mix(0.85))
            .position(SeriesLabelPosition::UpperRight)
            .label_font(font(&d.font_family, d.label_size, false, d.axes_labelcolor))
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

fn draw_mesh<DB>(chart: &mut Chart<'_, DB>, axes: &Axes) -> Result<()>
where
    DB: DrawingBackend,
{
    let d = axes.defaults();
    let categories = axes.categories();
    let xtick_px = pt_to_px(d.xtick_labelsize as f64).ceil() as u32;
    let slot_px = chart
        .plotting_area()
        .dim_in_pixel()
        .0
        .checked_div(categories.len() as u32)
        .unwrap_or(u32::MAX);

    let x_fmt = |v: &f64| -> String {
        if categories.is_empty() {
            return format_tick(*v);
        }
        let i = v.round();
        if (v - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        categories
            .get(i as usize)
            .map(|name| truncate_to_width(name, xtick_px, slot_px.saturating_sub(4)))
            .unwrap_or_default()
    };
    let y_fmt = |v: &f64| format_tick(*v);

    let tick_style = font(&d.font_family, d.xtick_labelsize, false, d.xtick_color);
    let desc_style = font(&d.font_family, d.label_size, false, d.axes_labelcolor);
    let axis_color = if axes.spines().left || axes.spines().bottom {
        RGBColor::from(d.axes_edgecolor).to_rgba()
    } else {
        TRANSPARENT
    };

    let mut mesh = chart.configure_mesh();
    mesh.x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .y_labels(Y_TICKS)
        .label_style(tick_style)
        .axis_desc_style(desc_style)
        .axis_style(axis_color)
        .bold_line_style(RGBColor::from(d.grid_color).stroke_width(stroke_px(d.grid_linewidth)))
        .light_line_style(TRANSPARENT);
    if !categories.is_empty() {
        mesh.x_labels(categories.len().max(2)).disable_x_mesh();
    }
    if !d.grid_visible {
        mesh.disable_mesh();
    }
    if let Some(x) = axes.xlabel() {
        mesh.x_desc(x);
    }
    if let Some(y) = axes.ylabel() {
        mesh.y_desc(y);
    }
    mesh.draw().map_err(render_err)?;
    Ok(())
}

fn draw_spines<DB>(chart: &mut Chart<'_, DB>, axes: &Axes, limits: &Limits) -> Result<()>
where
    DB: DrawingBackend,
{
    let spines = axes.spines();
    let style = RGBColor::from(axes.defaults().axes_edgecolor).stroke_width(1);
    let (x0, x1) = limits.x;
    let (y0, y1) = limits.y;
    if spines.top {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x0, y1), (x1, y1)],
                style,
            )))
            .map_err(render_err)?;
    }
    if spines.right {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x1, y0), (x1, y1)],
                style,
            )))
            .map_err(render_err)?;
    }
    Ok(())
}

/// Draw one artist; returns whether it registered a legend entry.
fn draw_artist<DB>(chart: &mut Chart<'_, DB>, artist: &Artist) -> Result<bool>
where
    DB: DrawingBackend,
{
    match artist {
        Artist::Line(a) => {
            let color = RGBColor::from(a.color);
            let style = color.stroke_width(stroke_px(a.line_width));
            let anno = chart
                .draw_series(LineSeries::new(a.points.iter().copied(), style))
                .map_err(render_err)?;
            if let Some(label) = &a.label {
                anno.label(label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
            if a.marker != MarkerShape::None {
                let r = (pt_to_px(a.marker_size) / 2.0).round().max(1.0) as i32;
                draw_markers(chart, &a.points, a.marker, r, color.filled())?;
            }
            Ok(a.label.is_some())
        }
        Artist::Scatter(a) => {
            let color = RGBColor::from(a.color);
            // marker area is in points squared
            let r = (pt_to_px(a.size.max(0.0).sqrt()) / 2.0).round().max(1.0) as i32;
            let fill = color.mix(a.alpha).filled();
            let anno = chart
                .draw_series(
                    a.points
                        .iter()
                        .map(|p| EmptyElement::at(*p) + Circle::new((0, 0), r, fill)),
                )
                .map_err(render_err)?;
            if let Some(label) = &a.label {
                anno.label(label.as_str())
                    .legend(move |(x, y)| Circle::new((x + 8, y), 4, color.filled()));
            }
            if let Some(edge) = a.edge_color.filter(|_| a.edge_width > 0.0) {
                let stroke = RGBColor::from(edge).stroke_width(stroke_px(a.edge_width));
                chart
                    .draw_series(
                        a.points
                            .iter()
                            .map(|p| EmptyElement::at(*p) + Circle::new((0, 0), r, stroke)),
                    )
                    .map_err(render_err)?;
            }
            Ok(a.label.is_some())
        }
        Artist::Bars(a) => {
            let color = RGBColor::from(a.color);
            let half = a.width / 2.0;
            let rects: Vec<[(f64, f64); 2]> = a
                .bars
                .iter()
                .map(|(x, h)| [(x - half, 0.0f64.min(*h)), (x + half, 0.0f64.max(*h))])
                .collect();
            let anno = chart
                .draw_series(
                    rects
                        .iter()
                        .map(|r| Rectangle::new(*r, color.filled())),
                )
                .map_err(render_err)?;
            if let Some(label) = &a.label {
                anno.label(label.as_str()).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
            }
            if let Some(edge) = a.edge_color.filter(|_| a.edge_width > 0.0) {
                let stroke = RGBColor::from(edge).stroke_width(stroke_px(a.edge_width));
                chart
                    .draw_series(rects.iter().map(|r| Rectangle::new(*r, stroke)))
                    .map_err(render_err)?;
            }
            Ok(a.label.is_some())
        }
        Artist::Histogram(a) => {
            let color = RGBColor::from(a.color);
            let fill = color.mix(a.alpha).filled();
            let rects: Vec<[(f64, f64); 2]> = a
                .counts
                .iter()
                .enumerate()
                .map(|(i, c)| [(a.edges[i], 0.0), (a.edges[i + 1], *c as f64)])
                .collect();
            let anno = chart
                .draw_series(rects.iter().map(|r| Rectangle::new(*r, fill)))
                .map_err(render_err)?;
            if let Some(label) = &a.label {
                anno.label(label.as_str()).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
            }
            if let Some(edge) = a.edge_color {
                let stroke = RGBColor::from(edge).stroke_width(1);
                chart
                    .draw_series(rects.iter().map(|r| Rectangle::new(*r, stroke)))
                    .map_err(render_err)?;
            }
            Ok(a.label.is_some())
        }
        Artist::Pie(_) => Ok(false),
    }
}

fn draw_markers<DB>(
    chart: &mut Chart<'_, DB>,
    points: &[(f64, f64)],
    shape: MarkerShape,
    r: i32,
    style: ShapeStyle,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let at = |p: &(f64, f64)| EmptyElement::at(*p);
    match shape {
        MarkerShape::None => Ok(()),
        MarkerShape::Circle => chart
            .draw_series(points.iter().map(|p| at(p) + Circle::new((0, 0), r, style)))
            .map(|_| ()),
        MarkerShape::Square => chart
            .draw_series(
                points
                    .iter()
                    .map(|p| at(p) + Rectangle::new([(-r, -r), (r, r)], style)),
            )
            .map(|_| ()),
        MarkerShape::Triangle => chart
            .draw_series(
                points
                    .iter()
                    .map(|p| at(p) + TriangleMarker::new((0, 0), r, style)),
            )
            .map(|_| ()),
        MarkerShape::Diamond => chart
            .draw_series(points.iter().map(|p| {
                at(p) + Polygon::new(vec![(0, -r), (r, 0), (0, r), (-r, 0)], style)
            }))
            .map(|_| ()),
        MarkerShape::Cross => chart
            .draw_series(points.iter().map(|p| {
                at(p)
                    + PathElement::new(vec![(-r, 0), (r, 0)], style)
                    + PathElement::new(vec![(0, -r), (0, r)], style)
            }))
            .map(|_| ()),
        MarkerShape::X => chart
            .draw_series(points.iter().map(|p| at(p) + Cross::new((0, 0), r, style)))
            .map(|_| ()),
    }
    .map_err(render_err)
}

fn draw_pie_axes<DB>(area: &DrawingArea<DB, Shift>, axes: &Axes) -> Result<()>
where
    DB: DrawingBackend,
{
    let d = axes.defaults();
    area.fill(&RGBColor::from(d.axes_facecolor))
        .map_err(render_err)?;
    for artist in axes.artists() {
        if let Artist::Pie(pie) = artist {
            draw_pie(area, pie, d)?;
        }
    }
    Ok(())
}

/// Wedges run counter-clockwise from `start_angle`; labels sit just outside the rim.
fn draw_pie<DB>(area: &DrawingArea<DB, Shift>, pie: &PieArtist, d: &RenderDefaults) -> Result<()>
where
    DB: DrawingBackend,
{
    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = (w.min(h) as f64 / 2.0) * 0.75;
    let total: f64 = pie.values.iter().sum();
    let edge = RGBColor::from(d.axes_facecolor).stroke_width(1);
    let label_style = font(&d.font_family, d.label_size, false, d.axes_labelcolor);

    let to_px = |angle: f64, r: f64| -> (i32, i32) {
        (
            (center.0 + r * angle.cos()).round() as i32,
            (center.1 - r * angle.sin()).round() as i32,
        )
    };

    let mut start = pie.start_angle.to_radians();
    for (i, value) in pie.values.iter().enumerate() {
        let sweep = value / total * 2.0 * PI;
        if sweep <= 0.0 {
            continue;
        }
        let steps = ((sweep / (2.0 * PI)) * 180.0).ceil().max(2.0) as usize;
        let mut ring = vec![to_px(0.0, 0.0)];
        ring.extend((0..=steps).map(|s| to_px(start + sweep * s as f64 / steps as f64, radius)));

        let color = RGBColor::from(pie.colors[i % pie.colors.len()]);
        area.draw(&Polygon::new(ring.clone(), color.filled()))
            .map_err(render_err)?;
        ring.push(ring[0]);
        area.draw(&PathElement::new(ring, edge))
            .map_err(render_err)?;

        if let Some(label) = pie.labels.get(i) {
            let mid = start + sweep / 2.0;
            let (cos, sin) = (mid.cos(), mid.sin());
            let hpos = if cos.abs() < 0.1 {
                HPos::Center
            } else if cos > 0.0 {
                HPos::Left
            } else {
                HPos::Right
            };
            let vpos = if sin > 0.1 {
                VPos::Bottom
            } else if sin < -0.1 {
                VPos::Top
            } else {
                VPos::Center
            };
            area.draw(&Text::new(
                label.clone(),
                to_px(mid, radius * 1.1),
                label_style.pos(Pos::new(hpos, vpos)),
            ))
            .map_err(render_err)?;
        }
        start += sweep;
    }
    Ok(())
}
