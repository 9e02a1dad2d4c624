//! Retained figure model: a [`Figure`] owns one or more [`Axes`], each axes collects
//! draw primitives ([`Artist`]s). Nothing is rasterized until [`Figure::save`],
//! [`Figure::to_svg_string`] or [`Figure::show`] hands the figure to plotters.
//!
//! The draw primitives on [`Axes`] are the only place chart input is checked: they
//! reject mismatched lengths, non-finite values and impossible pie wedges.

pub mod fonts;
pub mod render;
pub mod text;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::color::Rgb;
use crate::error::{Result, VizError};
use crate::theme::{RenderDefaults, current_defaults};

/// Default surface size in pixels (7.2 x 4.2 inches at 100 dpi).
pub const DEFAULT_FIGURE_SIZE: (u32, u32) = (720, 420);

/// Microsoft Office (2013+) chart series palette, used when a primitive gets no color.
const OFFICE10: [Rgb; 10] = [
    Rgb::new(68, 114, 196),  // blue      (#4472C4)
    Rgb::new(237, 125, 49),  // orange    (#ED7D31)
    Rgb::new(165, 165, 165), // gray      (#A5A5A5)
    Rgb::new(255, 192, 0),   // gold      (#FFC000)
    Rgb::new(91, 155, 213),  // light blue(#5B9BD5)
    Rgb::new(112, 173, 71),  // green     (#70AD47)
    Rgb::new(38, 68, 120),   // dark blue (#264478)
    Rgb::new(158, 72, 14),   // dark org. (#9E480E)
    Rgb::new(99, 99, 99),    // dark gray (#636363)
    Rgb::new(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> Rgb {
    OFFICE10[idx % OFFICE10.len()]
}

/// Size of a freshly created surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FIGURE_SIZE.0,
            height: DEFAULT_FIGURE_SIZE.1,
        }
    }
}

/// Handle to one plotting area of a [`Figure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AxesId(usize);

impl AxesId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A drawing surface.
#[derive(Clone, Debug)]
pub struct Figure {
    config: FigureConfig,
    defaults: RenderDefaults,
    axes: Vec<Axes>,
    tight: bool,
}

impl Figure {
    /// New figure with one axes, styled by the defaults currently in effect.
    pub fn new(config: FigureConfig) -> Self {
        Self::with_defaults(config, current_defaults())
    }

    /// New figure with one axes, styled by explicit defaults.
    pub fn with_defaults(config: FigureConfig, defaults: RenderDefaults) -> Self {
        let first = Axes::new(defaults.clone());
        Self {
            config,
            defaults,
            axes: vec![first],
            tight: false,
        }
    }

    pub fn config(&self) -> &FigureConfig {
        &self.config
    }

    pub fn defaults(&self) -> &RenderDefaults {
        &self.defaults
    }

    /// The axes every figure starts with.
    pub fn primary_axes(&self) -> AxesId {
        AxesId(0)
    }

    /// Append another axes; axes are laid out side by side.
    pub fn add_axes(&mut self) -> AxesId {
        self.axes.push(Axes::new(self.defaults.clone()));
        AxesId(self.axes.len() - 1)
    }

    pub fn axes_count(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self, id: AxesId) -> Result<&Axes> {
        self.axes
            .get(id.0)
            .ok_or_else(|| VizError::InvalidData(format!("figure has no axes #{}", id.0)))
    }

    pub fn axes_mut(&mut self, id: AxesId) -> Result<&mut Axes> {
        self.axes
            .get_mut(id.0)
            .ok_or_else(|| VizError::InvalidData(format!("figure has no axes #{}", id.0)))
    }

    pub(crate) fn all_axes(&self) -> &[Axes] {
        &self.axes
    }

    /// Shrink margins and size label gutters to their content.
    pub fn tight_layout(&mut self) {
        self.tight = true;
    }

    pub fn is_tight(&self) -> bool {
        self.tight
    }

    /// Render to a file: `.svg` uses the SVG backend, anything else the bitmap backend.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        render::save(self, path.as_ref())
    }

    /// Render to an in-memory SVG document.
    pub fn to_svg_string(&self) -> Result<String> {
        render::to_svg_string(self)
    }

    /// Render to a temporary SVG and ask the platform viewer to open it.
    ///
    /// Returns the path of the rendered file. Launching the viewer is best effort.
    pub fn show(&self) -> Result<PathBuf> {
        let file = tempfile::Builder::new()
            .prefix("vizcraft-")
            .suffix(".svg")
            .tempfile()?;
        let (_handle, path) = file.keep().map_err(|e| VizError::Io(e.error))?;
        self.save(&path)?;
        open_in_viewer(&path);
        Ok(path)
    }
}

fn open_in_viewer(path: &Path) {
    #[cfg(target_os = "macos")]
    let mut cmd = std::process::Command::new("open");
    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut cmd = std::process::Command::new("xdg-open");

    match spawn_reaped(cmd.arg(path)) {
        Ok(_) => log::info!("opened {} in the system viewer", path.display()),
        Err(e) => log::warn!(
            "could not launch a viewer for {}: {}",
            path.display(),
            e
        ),
    }
}

/// Start `cmd` and wait for it on a background thread so it never lingers as a zombie.
fn spawn_reaped(cmd: &mut std::process::Command) -> std::io::Result<std::thread::JoinHandle<()>> {
    let mut child = cmd.spawn()?;
    Ok(std::thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => log::debug!("viewer exited with {}", status),
        Ok(_) => {}
        Err(e) => log::debug!("waiting for viewer failed: {}", e),
    }))
}

/// X values of a series: numbers, or category names placed at 0, 1, 2, ...
#[derive(Clone, Debug, PartialEq)]
pub enum AxisData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl AxisData {
    pub fn len(&self) -> usize {
        match self {
            AxisData::Numeric(v) => v.len(),
            AxisData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f64>> for AxisData {
    fn from(v: Vec<f64>) -> Self {
        AxisData::Numeric(v)
    }
}

impl From<&[f64]> for AxisData {
    fn from(v: &[f64]) -> Self {
        AxisData::Numeric(v.to_vec())
    }
}

impl From<&Vec<f64>> for AxisData {
    fn from(v: &Vec<f64>) -> Self {
        AxisData::Numeric(v.clone())
    }
}

impl<const N: usize> From<[f64; N]> for AxisData {
    fn from(v: [f64; N]) -> Self {
        AxisData::Numeric(v.to_vec())
    }
}

impl<const N: usize> From<&[f64; N]> for AxisData {
    fn from(v: &[f64; N]) -> Self {
        AxisData::Numeric(v.to_vec())
    }
}

impl From<Vec<String>> for AxisData {
    fn from(v: Vec<String>) -> Self {
        AxisData::Categorical(v)
    }
}

impl From<&[String]> for AxisData {
    fn from(v: &[String]) -> Self {
        AxisData::Categorical(v.to_vec())
    }
}

impl From<Vec<&str>> for AxisData {
    fn from(v: Vec<&str>) -> Self {
        AxisData::Categorical(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for AxisData {
    fn from(v: &[&str]) -> Self {
        AxisData::Categorical(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AxisData {
    fn from(v: [&str; N]) -> Self {
        AxisData::Categorical(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<&[&str; N]> for AxisData {
    fn from(v: &[&str; N]) -> Self {
        AxisData::Categorical(v.iter().map(|s| s.to_string()).collect())
    }
}

/// Marker shape for data points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerShape {
    #[default]
    None,
    Circle,
    Square,
    Triangle,
    Diamond,
    Cross,
    X,
}

impl FromStr for MarkerShape {
    type Err = VizError;

    /// Accepts the usual one-character marker codes (`o`, `s`, `^`, `D`, `+`, `x`) or
    /// the shape name; an empty string means no marker.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "none" | "None" => Ok(MarkerShape::None),
            "o" | "circle" => Ok(MarkerShape::Circle),
            "s" | "square" => Ok(MarkerShape::Square),
            "^" | "triangle" => Ok(MarkerShape::Triangle),
            "D" | "d" | "diamond" => Ok(MarkerShape::Diamond),
            "+" | "cross" => Ok(MarkerShape::Cross),
            "x" | "X" => Ok(MarkerShape::X),
            other => Err(VizError::InvalidData(format!("unknown marker '{other}'"))),
        }
    }
}

/// Which border lines of an axes are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spines {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Default for Spines {
    fn default() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Option<Rgb>,
    /// Stroke width in points; `None` uses the axes default line width.
    pub width: Option<f64>,
    pub marker: MarkerShape,
    pub marker_size: f64,
    pub label: Option<String>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: None,
            width: None,
            marker: MarkerShape::None,
            marker_size: 6.0,
            label: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScatterStyle {
    pub color: Option<Rgb>,
    /// Marker area in points squared.
    pub size: f64,
    pub alpha: f64,
    pub edge_color: Option<Rgb>,
    pub edge_width: f64,
    pub label: Option<String>,
}

impl Default for ScatterStyle {
    fn default() -> Self {
        Self {
            color: None,
            size: 36.0,
            alpha: 1.0,
            edge_color: None,
            edge_width: 0.0,
            label: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarStyle {
    pub color: Option<Rgb>,
    pub width: f64,
    pub edge_color: Option<Rgb>,
    pub edge_width: f64,
    pub label: Option<String>,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            color: None,
            width: 0.8,
            edge_color: None,
            edge_width: 0.0,
            label: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistStyle {
    pub color: Option<Rgb>,
    pub alpha: f64,
    pub edge_color: Option<Rgb>,
    pub label: Option<String>,
}

impl Default for HistStyle {
    fn default() -> Self {
        Self {
            color: None,
            alpha: 1.0,
            edge_color: None,
            label: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PieStyle {
    /// Wedge colors; cycled when shorter than the value list. `None` uses the office palette.
    pub colors: Option<Vec<Rgb>>,
    /// Angle of the first wedge edge, degrees counter-clockwise from the x axis.
    pub start_angle: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineArtist {
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
    pub line_width: f64,
    pub marker: MarkerShape,
    pub marker_size: f64,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScatterArtist {
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
    pub size: f64,
    pub alpha: f64,
    pub edge_color: Option<Rgb>,
    pub edge_width: f64,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarArtist {
    /// (center x, height)
    pub bars: Vec<(f64, f64)>,
    pub width: f64,
    pub color: Rgb,
    pub edge_color: Option<Rgb>,
    pub edge_width: f64,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistArtist {
    /// `counts.len() + 1` bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub color: Rgb,
    pub alpha: f64,
    pub edge_color: Option<Rgb>,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PieArtist {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
    pub colors: Vec<Rgb>,
    pub start_angle: f64,
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum Artist {
    Line(LineArtist),
    Scatter(ScatterArtist),
    Bars(BarArtist),
    Histogram(HistArtist),
    Pie(PieArtist),
}

impl Artist {
    fn label(&self) -> Option<&str> {
        match self {
            Artist::Line(a) => a.label.as_deref(),
            Artist::Scatter(a) => a.label.as_deref(),
            Artist::Bars(a) => a.label.as_deref(),
            Artist::Histogram(a) => a.label.as_deref(),
            Artist::Pie(_) => None,
        }
    }

    fn set_label(&mut self, label: String) {
        match self {
            Artist::Line(a) => a.label = Some(label),
            Artist::Scatter(a) => a.label = Some(label),
            Artist::Bars(a) => a.label = Some(label),
            Artist::Histogram(a) => a.label = Some(label),
            Artist::Pie(_) => {}
        }
    }
}

/// Data-space view rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

/// One plotting area.
#[derive(Clone, Debug)]
pub struct Axes {
    defaults: RenderDefaults,
    title: Option<String>,
    xlabel: Option<String>,
    ylabel: Option<String>,
    spines: Spines,
    categories: Vec<String>,
    artists: Vec<Artist>,
    legend: bool,
}

impl Axes {
    fn new(defaults: RenderDefaults) -> Self {
        Self {
            defaults,
            title: None,
            xlabel: None,
            ylabel: None,
            spines: Spines::default(),
            categories: Vec::new(),
            artists: Vec::new(),
            legend: false,
        }
    }

    pub fn defaults(&self) -> &RenderDefaults {
        &self.defaults
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) -> &mut Self {
        self.xlabel = Some(label.into());
        self
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) -> &mut Self {
        self.ylabel = Some(label.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn xlabel(&self) -> Option<&str> {
        self.xlabel.as_deref()
    }

    pub fn ylabel(&self) -> Option<&str> {
        self.ylabel.as_deref()
    }

    pub fn spines(&self) -> Spines {
        self.spines
    }

    pub fn spines_mut(&mut self) -> &mut Spines {
        &mut self.spines
    }

    /// Category names in the order they were first seen.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn legend_enabled(&self) -> bool {
        self.legend
    }

    /// True when this axes holds a pie; pies are drawn without cartesian axes.
    pub fn is_pie(&self) -> bool {
        self.artists.iter().any(|a| matches!(a, Artist::Pie(_)))
    }

    /// Label the recorded series in draw order and turn the legend on.
    pub fn legend<S: AsRef<str>>(&mut self, labels: &[S]) -> &mut Self {
        let mut names = labels.iter();
        for artist in self.artists.iter_mut() {
            if matches!(artist, Artist::Pie(_)) {
                continue;
            }
            match names.next() {
                Some(n) => artist.set_label(n.as_ref().to_string()),
                None => break,
            }
        }
        self.legend = true;
        self
    }

    /// Labels of series that will appear in the legend.
    pub fn legend_labels(&self) -> Vec<&str> {
        self.artists.iter().filter_map(Artist::label).collect()
    }

    fn category_position(&mut self, name: &str) -> f64 {
        match self.categories.iter().position(|c| c == name) {
            Some(i) => i as f64,
            None => {
                self.categories.push(name.to_string());
                (self.categories.len() - 1) as f64
            }
        }
    }

    fn x_positions(&mut self, x: AxisData) -> Vec<f64> {
        match x {
            AxisData::Numeric(v) => v,
            AxisData::Categorical(names) => names
                .iter()
                .map(|n| self.category_position(n))
                .collect(),
        }
    }

    fn next_cycle_color(&self) -> Rgb {
        let used = self
            .artists
            .iter()
            .filter(|a| !matches!(a, Artist::Pie(_)))
            .count();
        office_color(used)
    }

    /// Line through `(x, y)` with optional markers.
    pub fn plot(
        &mut self,
        x: impl Into<AxisData>,
        y: &[f64],
        style: LineStyle,
    ) -> Result<&mut Self> {
        let x = x.into();
        check_lengths("plot x/y", x.len(), y.len())?;
        check_finite("plot", y)?;
        if let AxisData::Numeric(xs) = &x {
            check_finite("plot", xs)?;
        }
        let color = style.color.unwrap_or_else(|| self.next_cycle_color());
        let xs = self.x_positions(x);
        self.artists.push(Artist::Line(LineArtist {
            points: xs.into_iter().zip(y.iter().copied()).collect(),
            color,
            line_width: style.width.unwrap_or(self.defaults.line_width),
            marker: style.marker,
            marker_size: style.marker_size,
            label: style.label,
        }));
        Ok(self)
    }

    /// Unconnected markers at `(x, y)`.
    pub fn scatter(
        &mut self,
        x: impl Into<AxisData>,
        y: &[f64],
        style: ScatterStyle,
    ) -> Result<&mut Self> {
        let x = x.into();
        check_lengths("scatter x/y", x.len(), y.len())?;
        check_finite("scatter", y)?;
        if let AxisData::Numeric(xs) = &x {
            check_finite("scatter", xs)?;
        }
        if !(0.0..=1.0).contains(&style.alpha) {
            return Err(VizError::InvalidData(format!(
                "alpha {} outside [0, 1]",
                style.alpha
            )));
        }
        let color = style.color.unwrap_or_else(|| self.next_cycle_color());
        let xs = self.x_positions(x);
        self.artists.push(Artist::Scatter(ScatterArtist {
            points: xs.into_iter().zip(y.iter().copied()).collect(),
            color,
            size: style.size,
            alpha: style.alpha,
            edge_color: style.edge_color,
            edge_width: style.edge_width,
            label: style.label,
        }));
        Ok(self)
    }

    /// One bar per category.
    pub fn bar<S: AsRef<str>>(
        &mut self,
        categories: &[S],
        heights: &[f64],
        style: BarStyle,
    ) -> Result<&mut Self> {
        check_lengths("bar categories/values", categories.len(), heights.len())?;
        check_finite("bar", heights)?;
        let color = style.color.unwrap_or_else(|| self.next_cycle_color());
        let bars = categories
            .iter()
            .zip(heights)
            .map(|(c, h)| (self.category_position(c.as_ref()), *h))
            .collect();
        self.artists.push(Artist::Bars(BarArtist {
            bars,
            width: style.width,
            color,
            edge_color: style.edge_color,
            edge_width: style.edge_width,
            label: style.label,
        }));
        Ok(self)
    }

    /// Histogram of `data` over `bins` equal-width bins.
    pub fn hist(&mut self, data: &[f64], bins: usize, style: HistStyle) -> Result<&mut Self> {
        if bins == 0 {
            return Err(VizError::InvalidData("histogram needs at least one bin".into()));
        }
        check_finite("hist", data)?;
        let (edges, counts) = bin_counts(data, bins);
        let color = style.color.unwrap_or_else(|| self.next_cycle_color());
        self.artists.push(Artist::Histogram(HistArtist {
            edges,
            counts,
            color,
            alpha: style.alpha,
            edge_color: style.edge_color,
            label: style.label,
        }));
        Ok(self)
    }

    /// Pie of `values`; `labels` may be empty, otherwise one per value.
    pub fn pie<S: AsRef<str>>(
        &mut self,
        values: &[f64],
        labels: &[S],
        style: PieStyle,
    ) -> Result<&mut Self> {
        if !labels.is_empty() {
            check_lengths("pie labels/values", labels.len(), values.len())?;
        }
        check_finite("pie", values)?;
        if let Some(v) = values.iter().find(|v| **v < 0.0) {
            return Err(VizError::InvalidData(format!(
                "wedge sizes must be non-negative, got {v}"
            )));
        }
        if values.iter().sum::<f64>() <= 0.0 {
            return Err(VizError::InvalidData("pie needs a positive total".into()));
        }
        let palette = match style.colors {
            Some(c) if !c.is_empty() => c,
            _ => OFFICE10.to_vec(),
        };
        let colors = palette.iter().copied().cycle().take(values.len()).collect();
        self.artists.push(Artist::Pie(PieArtist {
            values: values.to_vec(),
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
            colors,
            start_angle: style.start_angle,
        }));
        Ok(self)
    }

    /// View rectangle covering every cartesian artist, with a 5% margin.
    ///
    /// Bars and histograms stick to zero: no margin is added below a zero baseline.
    pub fn view_limits(&self) -> Limits {
        let mut xs: Vec<f64> = Vec::new();
        let mut ys: Vec<f64> = Vec::new();
        let mut sticky_zero = false;

        for artist in &self.artists {
            match artist {
                Artist::Line(a) => extend_points(&a.points, &mut xs, &mut ys),
                Artist::Scatter(a) => extend_points(&a.points, &mut xs, &mut ys),
                Artist::Bars(a) => {
                    sticky_zero = true;
                    for (x, h) in &a.bars {
                        xs.push(x - a.width / 2.0);
                        xs.push(x + a.width / 2.0);
                        ys.push(0.0);
                        ys.push(*h);
                    }
                }
                Artist::Histogram(a) => {
                    sticky_zero = true;
                    xs.extend(a.edges.iter().copied());
                    ys.push(0.0);
                    ys.extend(a.counts.iter().map(|c| *c as f64));
                }
                Artist::Pie(_) => {}
            }
        }

        let x = padded(span(&xs), false);
        let y = padded(span(&ys), sticky_zero);
        Limits { x, y }
    }
}

fn extend_points(points: &[(f64, f64)], xs: &mut Vec<f64>, ys: &mut Vec<f64>) {
    for (x, y) in points {
        xs.push(*x);
        ys.push(*y);
    }
}

fn span(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

fn padded(range: Option<(f64, f64)>, sticky_zero: bool) -> (f64, f64) {
    let Some((lo, hi)) = range else {
        return (0.0, 1.0);
    };
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    let lo_out = if sticky_zero && lo == 0.0 { 0.0 } else { lo - pad };
    let hi_out = if sticky_zero && hi == 0.0 { 0.0 } else { hi + pad };
    (lo_out, hi_out)
}

fn check_lengths(what: &'static str, left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(VizError::LengthMismatch { what, left, right });
    }
    Ok(())
}

fn check_finite(what: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(VizError::InvalidData(format!(
            "{what}: non-finite value at position {i}"
        ))),
        None => Ok(()),
    }
}

/// Equal-width binning; the last bin is closed on the right.
///
/// Empty input bins over (0, 1); a constant sample over (v - 0.5, v + 0.5).
pub fn bin_counts(data: &[f64], bins: usize) -> (Vec<f64>, Vec<usize>) {
    let (lo, hi) = match span(data) {
        None => (0.0, 1.0),
        Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
        Some(r) => r,
    };
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in data {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (edges, counts)
}
