//! Interactive choropleth maps.
//!
//! [`build_choropleth`] joins a value table onto region geometry by a normalized name
//! key, maps each value onto a color scale and writes a self-contained HTML page with
//! hover tooltips, pan, wheel zoom and a color bar.
//!
//! Only a missing join or value column is fatal. Unreadable values become missing,
//! an unknown palette falls back to Viridis, and an unsupported coordinate system
//! leaves the geometry as it is.

pub mod geometry;
pub mod html;
pub mod join;
pub mod scale;
pub mod table;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use geometry::{GeoFeature, GeoLayer, GeoSource, Projection};
pub use join::JoinedRegion;
pub use scale::{ColorMapper, PaletteSource, ScaleRange};
pub use table::DataTable;

use crate::color::Rgb;
use crate::error::{Degradation, Result, VizError};
use crate::fallback::FallbackChain;

/// Styling and scale options for [`build_choropleth`].
///
/// Deserializes from JSON; absent fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoroplethOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fill_alpha: f64,
    pub line_color: Rgb,
    pub line_width: f64,
    pub palette_name: String,
    pub palette_steps: usize,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub nan_color: Rgb,
    pub legend_label: String,
    /// Label of the region name in the hover tooltip.
    pub region_label: String,
    /// Map low values to the last palette color instead of the first.
    pub reverse_palette: bool,
}

impl Default for ChoroplethOptions {
    fn default() -> Self {
        Self {
            title: "Choropleth Map".to_string(),
            width: 1100,
            height: 650,
            fill_alpha: 0.85,
            line_color: Rgb::BLACK,
            line_width: 0.6,
            palette_name: "OrRd".to_string(),
            palette_steps: 9,
            low: None,
            high: None,
            nan_color: Rgb::LIGHTGREY,
            legend_label: "Value".to_string(),
            region_label: "Region".to_string(),
            reverse_palette: false,
        }
    }
}

impl ChoroplethOptions {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Handle to a written map.
#[derive(Clone, Debug)]
pub struct ChoroplethMap {
    pub title: String,
    /// One entry per geometry feature (more when a key matched several value rows).
    pub regions: Vec<JoinedRegion>,
    pub scale: ScaleRange,
    pub mapper: ColorMapper,
    pub palette_source: PaletteSource,
    /// Whether coordinates were projected to Web Mercator.
    pub reprojected: bool,
    /// Value cells that could not be read as numbers.
    pub invalid_values: usize,
    pub output: PathBuf,
}

impl ChoroplethMap {
    /// Fill color of every region, in region order.
    pub fn fill_colors(&self) -> Vec<Rgb> {
        self.regions.iter().map(|r| self.mapper.map(r.value)).collect()
    }
}

/// Build a choropleth of `value_column` and write it as HTML to `output_path`.
///
/// `geometry_key` names the region property in the geometry layer, `values_key` the
/// region column of `values`. Both sides are compared trimmed and lowercased.
pub fn build_choropleth(
    geometry: impl Into<GeoSource>,
    values: &DataTable,
    geometry_key: &str,
    values_key: &str,
    value_column: &str,
    output_path: impl AsRef<Path>,
    options: &ChoroplethOptions,
) -> Result<ChoroplethMap> {
    let mut layer = geometry.into().load()?;

    let columns = layer.columns();
    if !columns.iter().any(|c| c == geometry_key) {
        return Err(VizError::Configuration {
            column: geometry_key.to_string(),
            source_name: "geometry layer",
            available: columns,
        });
    }
    values.require_column(values_key)?;
    values.require_column(value_column)?;

    let reprojected = reproject_layer(&mut layer);

    let outcome = join::left_join(&layer, geometry_key, values, values_key, value_column)?;
    if outcome.invalid_values > 0 {
        log::warn!(
            "{} value(s) in '{}' could not be read as numbers and are treated as missing",
            outcome.invalid_values,
            value_column
        );
    }
    if !outcome.duplicate_keys.is_empty() {
        log::warn!(
            "{} region key(s) occur more than once in the value table: {}",
            outcome.duplicate_keys.len(),
            outcome.duplicate_keys.join(", ")
        );
    }

    let scale = scale::resolve_scale(
        outcome.regions.iter().filter_map(|r| r.value),
        options.low,
        options.high,
    );
    let (mut palette, palette_source, _) =
        scale::resolve_palette(&options.palette_name, options.palette_steps);
    if options.reverse_palette {
        palette.reverse();
    }
    let mapper = ColorMapper::new(palette, scale, options.nan_color);

    let document = html::render_document(&outcome.regions, &mapper, options)?;
    let output = output_path.as_ref().to_path_buf();
    std::fs::write(&output, document)?;
    log::info!(
        "wrote choropleth of {} region(s) to {}",
        outcome.regions.len(),
        output.display()
    );

    Ok(ChoroplethMap {
        title: options.title.clone(),
        regions: outcome.regions,
        scale,
        mapper,
        palette_source,
        reprojected,
        invalid_values: outcome.invalid_values,
        output,
    })
}

/// Project declared geographic layers to Web Mercator; returns whether coordinates changed.
fn reproject_layer(layer: &mut GeoLayer) -> bool {
    let declared = layer.crs.clone();
    let resolved = FallbackChain::new("reprojection")
        .then("declared crs", || match declared.as_deref() {
            Some(name) => geometry::classify_crs(name),
            None => Err(Degradation::NoCrs),
        })
        .resolve(Projection::Identity);
    geometry::reproject(layer, resolved.value);
    resolved.value == Projection::GeographicToMercator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_json_keeps_defaults() {
        let o: ChoroplethOptions =
            serde_json::from_str(r#"{"title": "Votes", "palette_steps": 5, "line_color": "white"}"#)
                .unwrap();
        assert_eq!(o.title, "Votes");
        assert_eq!(o.palette_steps, 5);
        assert_eq!(o.line_color, Rgb::WHITE);
        assert_eq!(o.width, 1100);
        assert_eq!(o.nan_color, Rgb::LIGHTGREY);
        assert_eq!(o.palette_name, "OrRd");
    }

    #[test]
    fn layers_without_crs_stay_put() {
        let mut layer = GeoLayer::from_geojson_str(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":
                 {"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}]}"#,
        )
        .unwrap();
        let before = layer.clone();
        assert!(!reproject_layer(&mut layer));
        assert_eq!(layer, before);

        layer.crs = Some("EPSG:32628".into());
        assert!(!reproject_layer(&mut layer));

        layer.crs = Some("EPSG:4326".into());
        assert!(reproject_layer(&mut layer));
    }
}
