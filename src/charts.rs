//! Themed one-call charts.
//!
//! Every function here follows the same flow: resolve the surface (fresh or reused),
//! apply the theme for the duration of the call, pick the theme color for the chart
//! kind, issue exactly one draw call on the axes, set whichever labels were given,
//! trim the decoration, and optionally show the result. The returned
//! `(Figure, AxesId)` pair can be used to keep drawing on the same axes.
//!
//! ```no_run
//! use vizcraft::charts::{ChartOptions, styled_bar, styled_line};
//!
//! let (fig, ax) = styled_line(
//!     vec!["Jan", "Feb", "Mar"],
//!     &[120.0, 135.0, 128.0],
//!     "o",
//!     ChartOptions::default().title("Monthly latency").ylabel("ms"),
//! )?;
//! let (fig, _) = styled_bar(&["Jan", "Feb", "Mar"], &[3.0, 5.0, 4.0],
//!     ChartOptions::default().on(fig, ax))?;
//! fig.save("latency.svg")?;
//! # Ok::<(), vizcraft::VizError>(())
//! ```

use std::str::FromStr;

use crate::color::Rgb;
use crate::error::Result;
use crate::figure::{
    AxesId, AxisData, BarStyle, Figure, FigureConfig, HistStyle, LineStyle, MarkerShape,
    PieStyle, ScatterStyle,
};
use crate::theme::{DEFAULT_THEME, StyleScope, Theme, apply_style};

/// Marker area of [`styled_scatter`] points, in points squared.
pub const DEFAULT_SCATTER_SIZE: f64 = 60.0;
pub const DEFAULT_SCATTER_ALPHA: f64 = 0.85;
pub const DEFAULT_HIST_BINS: usize = 10;

const HIST_ALPHA: f64 = 0.9;
const EDGE_WIDTH: f64 = 0.8;
const BAR_WIDTH: f64 = 0.8;
const PIE_START_ANGLE: f64 = 90.0;

/// Where a chart is drawn.
#[derive(Debug, Clone)]
pub enum Surface {
    /// Create a new figure of the given size.
    Fresh(FigureConfig),
    /// Draw onto an existing figure's axes.
    Reused { figure: Figure, axes: AxesId },
}

impl Default for Surface {
    fn default() -> Self {
        Surface::Fresh(FigureConfig::default())
    }
}

/// Cosmetic options shared by the chart functions.
#[derive(Debug, Clone)]
pub struct ChartOptions<'t> {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    /// Overrides the theme color picked for the chart kind.
    pub color: Option<Rgb>,
    pub surface: Surface,
    pub theme: &'t Theme,
    pub show: bool,
}

impl Default for ChartOptions<'static> {
    fn default() -> Self {
        Self {
            title: None,
            xlabel: None,
            ylabel: None,
            color: None,
            surface: Surface::default(),
            theme: &DEFAULT_THEME,
            show: false,
        }
    }
}

impl<'t> ChartOptions<'t> {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn xlabel(mut self, label: impl Into<String>) -> Self {
        self.xlabel = Some(label.into());
        self
    }

    pub fn ylabel(mut self, label: impl Into<String>) -> Self {
        self.ylabel = Some(label.into());
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Draw onto `axes` of an existing `figure`.
    pub fn on(mut self, figure: Figure, axes: AxesId) -> Self {
        self.surface = Surface::Reused { figure, axes };
        self
    }

    pub fn surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    pub fn theme<'u>(self, theme: &'u Theme) -> ChartOptions<'u> {
        ChartOptions {
            title: self.title,
            xlabel: self.xlabel,
            ylabel: self.ylabel,
            color: self.color,
            surface: self.surface,
            theme,
            show: self.show,
        }
    }

    pub fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }
}

/// Labels and flags that outlive the surface resolution step.
struct Finish {
    title: Option<String>,
    xlabel: Option<String>,
    ylabel: Option<String>,
    show: bool,
}

fn begin(opts: ChartOptions<'_>) -> (StyleScope, Figure, AxesId, Finish) {
    let scope = apply_style(opts.theme);
    let (figure, axes) = match opts.surface {
        Surface::Fresh(config) => {
            let figure = Figure::with_defaults(config, scope.defaults().clone());
            let axes = figure.primary_axes();
            (figure, axes)
        }
        Surface::Reused { figure, axes } => (figure, axes),
    };
    let finish = Finish {
        title: opts.title,
        xlabel: opts.xlabel,
        ylabel: opts.ylabel,
        show: opts.show,
    };
    (scope, figure, axes, finish)
}

fn finish(mut figure: Figure, id: AxesId, f: Finish, cartesian: bool) -> Result<(Figure, AxesId)> {
    let axes = figure.axes_mut(id)?;
    if let Some(t) = f.title {
        axes.set_title(t);
    }
    if let Some(x) = f.xlabel {
        axes.set_xlabel(x);
    }
    if let Some(y) = f.ylabel {
        axes.set_ylabel(y);
    }
    if cartesian {
        let spines = axes.spines_mut();
        spines.top = false;
        spines.right = false;
    }
    figure.tight_layout();
    if f.show {
        if let Err(e) = figure.show() {
            log::warn!("show failed: {}", e);
        }
    }
    Ok((figure, id))
}

/// Line chart in the theme's primary color.
///
/// `marker` takes the usual one-character codes (`"o"`, `"s"`, `"^"`, ...); pass `""`
/// for a bare line.
pub fn styled_line(
    x: impl Into<AxisData>,
    y: &[f64],
    marker: &str,
    opts: ChartOptions<'_>,
) -> Result<(Figure, AxesId)> {
    let marker = MarkerShape::from_str(marker)?;
    let theme = opts.theme;
    let color = opts.color.unwrap_or(theme.primary);
    let (_scope, mut figure, id, f) = begin(opts);
    figure.axes_mut(id)?.plot(
        x,
        y,
        LineStyle {
            color: Some(color),
            width: Some(theme.line_width),
            marker,
            marker_size: theme.marker_size as f64,
            label: None,
        },
    )?;
    finish(figure, id, f, true)
}

/// Scatter chart in the theme's secondary color, edged in the background color.
pub fn styled_scatter(
    x: impl Into<AxisData>,
    y: &[f64],
    size: f64,
    alpha: f64,
    opts: ChartOptions<'_>,
) -> Result<(Figure, AxesId)> {
    let theme = opts.theme;
    let color = opts.color.unwrap_or(theme.secondary);
    let (_scope, mut figure, id, f) = begin(opts);
    figure.axes_mut(id)?.scatter(
        x,
        y,
        ScatterStyle {
            color: Some(color),
            size,
            alpha,
            edge_color: Some(theme.background),
            edge_width: EDGE_WIDTH,
            label: None,
        },
    )?;
    finish(figure, id, f, true)
}

/// Bar chart in the theme's accent color, one bar per category.
pub fn styled_bar<S: AsRef<str>>(
    categories: &[S],
    values: &[f64],
    opts: ChartOptions<'_>,
) -> Result<(Figure, AxesId)> {
    let theme = opts.theme;
    let color = opts.color.unwrap_or(theme.accent);
    let (_scope, mut figure, id, f) = begin(opts);
    figure.axes_mut(id)?.bar(
        categories,
        values,
        BarStyle {
            color: Some(color),
            width: BAR_WIDTH,
            edge_color: Some(theme.grid),
            edge_width: EDGE_WIDTH,
            label: None,
        },
    )?;
    finish(figure, id, f, true)
}

/// Histogram in the theme's primary color. The y label defaults to `"Count"`.
pub fn styled_hist(data: &[f64], bins: usize, opts: ChartOptions<'_>) -> Result<(Figure, AxesId)> {
    let theme = opts.theme;
    let color = opts.color.unwrap_or(theme.primary);
    let mut opts = opts;
    if opts.ylabel.is_none() {
        opts.ylabel = Some("Count".to_string());
    }
    let (_scope, mut figure, id, f) = begin(opts);
    figure.axes_mut(id)?.hist(
        data,
        bins,
        HistStyle {
            color: Some(color),
            alpha: HIST_ALPHA,
            edge_color: Some(theme.background),
            label: None,
        },
    )?;
    finish(figure, id, f, true)
}

/// Pie chart. Without explicit `colors` the wedges take the theme's categorical slots
/// (primary, secondary, accent, muted, danger), cycling past five.
///
/// Only the title of `opts` is used; pies have no axis labels.
pub fn styled_pie<S: AsRef<str>>(
    labels: &[S],
    values: &[f64],
    colors: Option<&[Rgb]>,
    opts: ChartOptions<'_>,
) -> Result<(Figure, AxesId)> {
    let theme = opts.theme;
    let colors = match colors {
        Some(c) if !c.is_empty() => c.to_vec(),
        _ => theme.pie_colors(values.len()),
    };
    let mut opts = opts;
    opts.xlabel = None;
    opts.ylabel = None;
    let (_scope, mut figure, id, f) = begin(opts);
    figure.axes_mut(id)?.pie(
        values,
        labels,
        PieStyle {
            colors: Some(colors),
            start_angle: PIE_START_ANGLE,
        },
    )?;
    finish(figure, id, f, false)
}
