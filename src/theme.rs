//! Theme tokens and the process-wide rendering defaults they drive.
//!
//! A [`Theme`] is an immutable bundle of colors and typography. [`apply_style`] writes
//! it into the shared [`RenderDefaults`] that newly created figures pick up, and hands
//! back a [`StyleScope`] that puts the previous defaults back when it is dropped.
//!
//! The defaults live behind a lock, so access is memory-safe, but two threads applying
//! different themes at the same time will still observe each other. Styling is meant
//! to be driven from one call stack at a time.

use std::borrow::Cow;
use std::sync::{OnceLock, RwLock};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Ink used for axis labels and ticks.
pub const INK: Rgb = Rgb::from_hex(0x0F172A);

/// Immutable color + typography bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub danger: Rgb,
    pub muted: Rgb,
    pub grid: Rgb,
    pub background: Rgb,

    pub font_family: Cow<'static, str>,
    pub title_size: u32,
    pub label_size: u32,
    pub tick_size: u32,
    pub line_width: f64,
    pub marker_size: u32,
}

/// The process-wide default theme.
pub static DEFAULT_THEME: Theme = Theme {
    primary: Rgb::from_hex(0x2563EB),
    secondary: Rgb::from_hex(0x16A34A),
    accent: Rgb::from_hex(0xF59E0B),
    danger: Rgb::from_hex(0xDC2626),
    muted: Rgb::from_hex(0x64748B),
    grid: Rgb::from_hex(0xE2E8F0),
    background: Rgb::from_hex(0xFFFFFF),

    font_family: Cow::Borrowed("DejaVu Sans"),
    title_size: 14,
    label_size: 11,
    tick_size: 10,
    line_width: 2.2,
    marker_size: 6,
};

impl Default for Theme {
    fn default() -> Self {
        DEFAULT_THEME.clone()
    }
}

impl Theme {
    /// Categorical colors in slice order: primary, secondary, accent, muted, danger.
    pub fn categorical(&self) -> [Rgb; 5] {
        [
            self.primary,
            self.secondary,
            self.accent,
            self.muted,
            self.danger,
        ]
    }

    /// `n` categorical colors. Past the fifth slot the sequence starts over.
    pub fn pie_colors(&self, n: usize) -> Vec<Rgb> {
        self.categorical().iter().copied().cycle().take(n).collect()
    }

    /// Load a theme from a JSON file; absent fields keep their default values.
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Rendering parameters every new figure starts from.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderDefaults {
    pub figure_facecolor: Rgb,
    pub axes_facecolor: Rgb,
    pub axes_edgecolor: Rgb,
    pub axes_labelcolor: Rgb,
    pub title_bold: bool,
    pub title_size: u32,
    pub label_size: u32,
    pub xtick_labelsize: u32,
    pub ytick_labelsize: u32,
    pub xtick_color: Rgb,
    pub ytick_color: Rgb,
    pub grid_color: Rgb,
    pub grid_linewidth: f64,
    pub grid_visible: bool,
    pub grid_below: bool,
    pub font_family: Cow<'static, str>,
    pub line_width: f64,
}

impl Default for RenderDefaults {
    /// Plain engine baseline in effect before any theme is applied.
    fn default() -> Self {
        Self {
            figure_facecolor: Rgb::WHITE,
            axes_facecolor: Rgb::WHITE,
            axes_edgecolor: Rgb::BLACK,
            axes_labelcolor: Rgb::BLACK,
            title_bold: false,
            title_size: 12,
            label_size: 10,
            xtick_labelsize: 10,
            ytick_labelsize: 10,
            xtick_color: Rgb::BLACK,
            ytick_color: Rgb::BLACK,
            grid_color: Rgb::from_hex(0xB0B0B0),
            grid_linewidth: 0.8,
            grid_visible: false,
            grid_below: false,
            font_family: Cow::Borrowed("sans-serif"),
            line_width: 1.5,
        }
    }
}

impl RenderDefaults {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            figure_facecolor: theme.background,
            axes_facecolor: theme.background,
            axes_edgecolor: theme.grid,
            axes_labelcolor: INK,
            title_bold: true,
            title_size: theme.title_size,
            label_size: theme.label_size,
            xtick_labelsize: theme.tick_size,
            ytick_labelsize: theme.tick_size,
            xtick_color: INK,
            ytick_color: INK,
            grid_color: theme.grid,
            grid_linewidth: 0.8,
            grid_visible: true,
            grid_below: true,
            font_family: theme.font_family.clone(),
            line_width: theme.line_width,
        }
    }
}

fn defaults_cell() -> &'static RwLock<RenderDefaults> {
    static CELL: OnceLock<RwLock<RenderDefaults>> = OnceLock::new();
    CELL.get_or_init(|| RwLock::new(RenderDefaults::default()))
}

/// Snapshot of the defaults currently in effect.
pub fn current_defaults() -> RenderDefaults {
    defaults_cell()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

fn replace_defaults(next: RenderDefaults) -> RenderDefaults {
    let mut guard = defaults_cell()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    std::mem::replace(&mut *guard, next)
}

/// Apply `theme` as the rendering defaults for figures created from now on.
///
/// The returned scope restores whatever was active before once it goes out of scope;
/// call [`StyleScope::persist`] to keep the theme in place instead.
#[must_use = "dropping the scope immediately restores the previous defaults"]
pub fn apply_style(theme: &Theme) -> StyleScope {
    let applied = RenderDefaults::from_theme(theme);
    let previous = replace_defaults(applied.clone());
    StyleScope {
        applied,
        previous: Some(previous),
    }
}

/// Guard returned by [`apply_style`].
#[derive(Debug)]
pub struct StyleScope {
    applied: RenderDefaults,
    previous: Option<RenderDefaults>,
}

impl StyleScope {
    /// The defaults this scope installed.
    pub fn defaults(&self) -> &RenderDefaults {
        &self.applied
    }

    /// Leave the theme applied after the scope ends.
    pub fn persist(mut self) {
        self.previous = None;
    }
}

impl Drop for StyleScope {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            replace_defaults(previous);
        }
    }
}
