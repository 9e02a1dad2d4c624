//! Value range, palette resolution and value-to-color mapping.

use color_brewery::{ColorRange, PaletteIter, RGBColor as BrewerColor};
use rgb::RGB8;

use crate::color::Rgb;
use crate::error::Degradation;
use crate::fallback::{FallbackChain, Resolved};

/// Number of entries in the stretched mapping palette.
pub const PALETTE_SIZE: usize = 256;

/// Closed value interval the colors are spread over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleRange {
    pub low: f64,
    pub high: f64,
}

/// Caller bounds win; otherwise the data extremes. A zero-width range is widened to
/// `high + 1` (or a few ulps for magnitudes where `+ 1` is lost), and no data with no
/// bounds gives `(0, 1)`.
pub fn resolve_scale(
    values: impl IntoIterator<Item = f64>,
    low: Option<f64>,
    high: Option<f64>,
) -> ScaleRange {
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.into_iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    let data_low = min.is_finite().then_some(min);
    let data_high = max.is_finite().then_some(max);

    let low = low.or(data_low);
    let high = high.or(data_high);
    let (low, high) = match (low, high) {
        (Some(l), Some(h)) => (l, h),
        (Some(l), None) => (l, l),
        (None, Some(h)) => (h, h),
        (None, None) => (0.0, 1.0),
    };
    if high == low {
        ScaleRange {
            low,
            high: low + 1.0_f64.max(low.abs() * f64::EPSILON * 4.0),
        }
    } else {
        ScaleRange { low, high }
    }
}

/// Which strategy produced the palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteSource {
    Brewer,
    Perceptual,
    /// Nothing matched the requested name; Viridis was used.
    Fallback,
}

fn brewer_family(name: &str) -> Option<PaletteIter<RGB8>> {
    let family = match name.to_ascii_lowercase().as_str() {
        "ylgn" => RGB8::ylgn(),
        "ylgnbu" => RGB8::ylgnbu(),
        "gnbu" => RGB8::gnbu(),
        "bugn" => RGB8::bugn(),
        "pubugn" => RGB8::pubugn(),
        "pubu" => RGB8::pubu(),
        "bupu" => RGB8::bupu(),
        "rdpu" => RGB8::rdpu(),
        "purd" => RGB8::purd(),
        "orrd" => RGB8::orrd(),
        "ylorrd" => RGB8::ylorrd(),
        "ylorbr" => RGB8::ylorbr(),
        "purples" => RGB8::purples(),
        "blues" => RGB8::blues(),
        "greens" => RGB8::greens(),
        "oranges" => RGB8::oranges(),
        "reds" => RGB8::reds(),
        "greys" => RGB8::greys(),
        "puor" => RGB8::puor(),
        "brbg" => RGB8::brbg(),
        "prgn" => RGB8::prgn(),
        "piyg" => RGB8::piyg(),
        "rdbu" => RGB8::rdbu(),
        "rdgy" => RGB8::rdgy(),
        "rdylbu" => RGB8::rdylbu(),
        "spectral" => RGB8::spectral(),
        "rdylgn" => RGB8::rdylgn(),
        "set1" => RGB8::set1(),
        "pastel1" => RGB8::pastel1(),
        "set2" => RGB8::set2(),
        "pastel2" => RGB8::pastel2(),
        "dark2" => RGB8::dark2(),
        "set3" => RGB8::set3(),
        "paired" => RGB8::paired(),
        "accent" => RGB8::accent(),
        _ => return None,
    };
    Some(family)
}

/// Brewer scheme `name` with exactly `steps` colors.
pub fn brewer_palette(name: &str, steps: usize) -> Result<Vec<Rgb>, Degradation> {
    let family =
        brewer_family(name).ok_or_else(|| Degradation::UnknownPalette(name.to_string()))?;
    family
        .into_iter()
        .find(|p| p.len() == steps)
        .map(|p| p.colors().into_iter().map(Rgb::from).collect())
        .ok_or_else(|| Degradation::UnsupportedSteps {
            name: name.to_string(),
            steps,
        })
}

/// Matplotlib perceptual scheme sampled at [`PALETTE_SIZE`] points.
pub fn perceptual_palette(name: &str) -> Result<Vec<Rgb>, Degradation> {
    let palette = match name.to_ascii_lowercase().as_str() {
        "viridis" => RGB8::viridis(),
        "magma" => RGB8::magma(),
        "inferno" => RGB8::inferno(),
        "plasma" => RGB8::plasma(),
        _ => return Err(Degradation::UnknownPalette(name.to_string())),
    };
    Ok(sample_gradient(&palette.gradient(), PALETTE_SIZE))
}

fn sample_gradient<G: ColorRange<RGB8>>(g: &G, n: usize) -> Vec<Rgb> {
    let last = n.saturating_sub(1).max(1) as f64;
    (0..n).map(|i| Rgb::from(g.rgb(i as f64 / last))).collect()
}

/// Stretch `base` to `n` entries by repeating each color over an equal share.
pub fn linear_palette(base: &[Rgb], n: usize) -> Vec<Rgb> {
    if base.is_empty() {
        return Vec::new();
    }
    (0..n).map(|i| base[i * base.len() / n]).collect()
}

/// Resolve `name`/`steps` through the palette strategies; Viridis if none applies.
pub fn resolve_palette(name: &str, steps: usize) -> (Vec<Rgb>, PaletteSource, Vec<Degradation>) {
    let Resolved {
        value,
        degradations,
        ..
    } = FallbackChain::new("palette")
        .then("brewer", || {
            brewer_palette(name, steps)
                .map(|base| (linear_palette(&base, PALETTE_SIZE), PaletteSource::Brewer))
        })
        .then("perceptual", || {
            perceptual_palette(name).map(|p| (p, PaletteSource::Perceptual))
        })
        .resolve((viridis(), PaletteSource::Fallback));
    let (palette, source) = value;
    if source == PaletteSource::Fallback {
        log::debug!("palette '{}' ({} steps) unavailable, using Viridis", name, steps);
    }
    (palette, source, degradations)
}

fn viridis() -> Vec<Rgb> {
    sample_gradient(&RGB8::viridis().gradient(), PALETTE_SIZE)
}

/// Linear value-to-color mapping over a [`ScaleRange`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMapper {
    pub palette: Vec<Rgb>,
    pub range: ScaleRange,
    pub nan_color: Rgb,
}

impl ColorMapper {
    pub fn new(palette: Vec<Rgb>, range: ScaleRange, nan_color: Rgb) -> Self {
        Self {
            palette,
            range,
            nan_color,
        }
    }

    /// Values outside the range take the end colors; missing values the nan color.
    pub fn map(&self, value: Option<f64>) -> Rgb {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return self.nan_color;
        };
        let n = self.palette.len();
        if n == 0 {
            return self.nan_color;
        }
        let ScaleRange { low, high } = self.range;
        let t = (v - low) / (high - low);
        let idx = if t <= 0.0 {
            0
        } else if t >= 1.0 {
            n - 1
        } else {
            ((t * n as f64).floor() as usize).min(n - 1)
        };
        self.palette[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_bounds_take_precedence() {
        let r = resolve_scale([1.0, 5.0], Some(0.0), Some(10.0));
        assert_eq!(r, ScaleRange { low: 0.0, high: 10.0 });
        let r = resolve_scale([1.0, 5.0], None, None);
        assert_eq!(r, ScaleRange { low: 1.0, high: 5.0 });
    }

    #[test]
    fn degenerate_range_is_widened() {
        let r = resolve_scale(Vec::<f64>::new(), Some(10.0), Some(10.0));
        assert!(r.high > 10.0);
        assert_eq!(resolve_scale(Vec::<f64>::new(), None, None), ScaleRange {
            low: 0.0,
            high: 1.0
        });
        assert_eq!(resolve_scale([3.0, 3.0], None, None).high, 4.0);

        let huge = resolve_scale(Vec::<f64>::new(), Some(1e17), Some(1e17));
        assert_eq!(huge.low, 1e17);
        assert!(huge.high > huge.low);
        let negative = resolve_scale([-1e17], None, None);
        assert!(negative.high > negative.low);
    }

    #[test]
    fn brewer_lookup_is_case_insensitive() {
        let p = brewer_palette("orrd", 9).unwrap();
        assert_eq!(p.len(), 9);
        assert_eq!(brewer_palette("OrRd", 9).unwrap(), p);
        assert!(matches!(
            brewer_palette("OrRd", 42),
            Err(Degradation::UnsupportedSteps { .. })
        ));
        assert!(matches!(
            brewer_palette("NoSuchPalette", 9),
            Err(Degradation::UnknownPalette(_))
        ));
    }

    #[test]
    fn unknown_palette_falls_back_to_viridis() {
        let (p, source, why) = resolve_palette("NoSuchPalette", 9);
        assert_eq!(source, PaletteSource::Fallback);
        assert_eq!(p.len(), PALETTE_SIZE);
        assert_eq!(why.len(), 2);

        let (_, source, _) = resolve_palette("Magma", 9);
        assert_eq!(source, PaletteSource::Perceptual);
        let (p, source, _) = resolve_palette("Blues", 5);
        assert_eq!(source, PaletteSource::Brewer);
        assert_eq!(p.len(), PALETTE_SIZE);
    }

    #[test]
    fn linear_palette_keeps_order() {
        let base = [Rgb::BLACK, Rgb::WHITE];
        let p = linear_palette(&base, 4);
        assert_eq!(p, vec![Rgb::BLACK, Rgb::BLACK, Rgb::WHITE, Rgb::WHITE]);
    }

    #[test]
    fn mapper_clamps_and_marks_missing() {
        let m = ColorMapper::new(
            vec![Rgb::BLACK, Rgb::WHITE],
            ScaleRange { low: 0.0, high: 10.0 },
            Rgb::LIGHTGREY,
        );
        assert_eq!(m.map(None), Rgb::LIGHTGREY);
        assert_eq!(m.map(Some(f64::NAN)), Rgb::LIGHTGREY);
        assert_eq!(m.map(Some(-5.0)), Rgb::BLACK);
        assert_eq!(m.map(Some(4.9)), Rgb::BLACK);
        assert_eq!(m.map(Some(5.0)), Rgb::WHITE);
        assert_eq!(m.map(Some(10.0)), Rgb::WHITE);
        assert_eq!(m.map(Some(99.0)), Rgb::WHITE);
    }
}
