//! Region geometry: GeoJSON loading and Web Mercator reprojection.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use geojson::{Feature, GeoJson, Geometry, JsonObject, Value};

use crate::error::{Degradation, Result};

/// Semi-major axis of the WGS84 ellipsoid, in meters.
const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Latitude beyond which Web Mercator diverges.
pub const MERCATOR_MAX_LAT: f64 = 85.0511;

pub type Ring = Vec<(f64, f64)>;
/// Exterior ring first, then holes.
pub type PolygonRings = Vec<Ring>;

/// One region of a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFeature {
    pub properties: JsonObject,
    pub polygons: Vec<PolygonRings>,
}

impl GeoFeature {
    /// Property rendered as text; `null` and absent properties have no text.
    pub fn property_text(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A set of polygon features plus the coordinate reference system they declare.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeoLayer {
    pub features: Vec<GeoFeature>,
    /// Name from the legacy GeoJSON `crs` member, if present.
    pub crs: Option<String>,
}

impl GeoLayer {
    pub fn from_geojson(geojson: GeoJson) -> Self {
        match geojson {
            GeoJson::FeatureCollection(fc) => {
                let crs = fc.foreign_members.as_ref().and_then(crs_name);
                Self {
                    features: fc.features.into_iter().map(convert_feature).collect(),
                    crs,
                }
            }
            GeoJson::Feature(f) => {
                let crs = f.foreign_members.as_ref().and_then(crs_name);
                Self {
                    features: vec![convert_feature(f)],
                    crs,
                }
            }
            GeoJson::Geometry(g) => Self {
                features: vec![GeoFeature {
                    properties: JsonObject::new(),
                    polygons: polygons_of(&g),
                }],
                crs: None,
            },
        }
    }

    pub fn from_geojson_str(text: &str) -> Result<Self> {
        Ok(Self::from_geojson(text.parse::<GeoJson>()?))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let layer = Self::from_geojson(GeoJson::from_reader(reader)?);
        log::debug!(
            "loaded {} feature(s) from {} (crs: {})",
            layer.features.len(),
            path.as_ref().display(),
            layer.crs.as_deref().unwrap_or("none")
        );
        Ok(layer)
    }

    /// Property keys in first-seen order, followed by `geometry`.
    pub fn columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = Vec::new();
        for f in &self.features {
            for k in f.properties.keys() {
                if !cols.iter().any(|c| c == k) {
                    cols.push(k.clone());
                }
            }
        }
        cols.push("geometry".to_string());
        cols
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` over every ring.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut it = self
            .features
            .iter()
            .flat_map(|f| f.polygons.iter())
            .flat_map(|p| p.iter())
            .flat_map(|r| r.iter());
        let first = it.next()?;
        Some(it.fold(
            (first.0, first.1, first.0, first.1),
            |(x0, y0, x1, y1), (x, y)| (x0.min(*x), y0.min(*y), x1.max(*x), y1.max(*y)),
        ))
    }

    fn map_coords(&mut self, f: impl Fn((f64, f64)) -> (f64, f64)) {
        for feature in &mut self.features {
            for ring in feature.polygons.iter_mut().flat_map(|p| p.iter_mut()) {
                for pt in ring.iter_mut() {
                    *pt = f(*pt);
                }
            }
        }
    }
}

/// Geometry input: a GeoJSON file or an already loaded layer.
#[derive(Clone, Debug)]
pub enum GeoSource {
    Path(PathBuf),
    Layer(GeoLayer),
}

impl GeoSource {
    pub fn load(self) -> Result<GeoLayer> {
        match self {
            GeoSource::Path(p) => GeoLayer::from_path(p),
            GeoSource::Layer(l) => Ok(l),
        }
    }
}

impl From<GeoLayer> for GeoSource {
    fn from(l: GeoLayer) -> Self {
        GeoSource::Layer(l)
    }
}

impl From<PathBuf> for GeoSource {
    fn from(p: PathBuf) -> Self {
        GeoSource::Path(p)
    }
}

impl From<&Path> for GeoSource {
    fn from(p: &Path) -> Self {
        GeoSource::Path(p.to_path_buf())
    }
}

impl From<&str> for GeoSource {
    fn from(p: &str) -> Self {
        GeoSource::Path(PathBuf::from(p))
    }
}

fn crs_name(members: &JsonObject) -> Option<String> {
    let props = members.get("crs")?.get("properties")?;
    if let Some(name) = props.get("name").and_then(|n| n.as_str()) {
        return Some(name.to_string());
    }
    // {"type": "EPSG", "properties": {"code": 4326}}
    props
        .get("code")
        .and_then(|c| c.as_u64())
        .map(|c| format!("EPSG:{c}"))
}

fn convert_feature(f: Feature) -> GeoFeature {
    GeoFeature {
        polygons: f.geometry.as_ref().map(polygons_of).unwrap_or_default(),
        properties: f.properties.unwrap_or_default(),
    }
}

fn polygons_of(g: &Geometry) -> Vec<PolygonRings> {
    match &g.value {
        Value::Polygon(rings) => vec![convert_rings(rings)],
        Value::MultiPolygon(polys) => polys.iter().map(|p| convert_rings(p)).collect(),
        Value::GeometryCollection(items) => items.iter().flat_map(polygons_of).collect(),
        _ => {
            log::debug!("skipping non-areal geometry");
            Vec::new()
        }
    }
}

fn convert_rings(rings: &[Vec<Vec<f64>>]) -> PolygonRings {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .filter_map(|pos| Some((*pos.first()?, *pos.get(1)?)))
                .collect()
        })
        .collect()
}

/// Target handling for a declared coordinate reference system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    /// Longitude/latitude degrees to Web Mercator meters.
    GeographicToMercator,
    /// Coordinates are kept as they are.
    Identity,
}

/// Classify a CRS name such as `EPSG:4326` or `urn:ogc:def:crs:OGC:1.3:CRS84`.
pub fn classify_crs(name: &str) -> std::result::Result<Projection, Degradation> {
    let n = name.trim().to_ascii_uppercase();
    let code = n.rsplit(':').next().unwrap_or_default();
    match code {
        "4326" | "CRS84" | "WGS84" => Ok(Projection::GeographicToMercator),
        "3857" | "900913" | "3785" => Ok(Projection::Identity),
        _ => Err(Degradation::UnsupportedCrs(name.to_string())),
    }
}

/// Spherical Web Mercator (EPSG:3857) forward projection; latitude is clamped.
pub fn lonlat_to_mercator((lon, lat): (f64, f64)) -> (f64, f64) {
    let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
    (x, y)
}

/// Apply `projection` to every coordinate of `layer`.
pub fn reproject(layer: &mut GeoLayer, projection: Projection) {
    match projection {
        Projection::GeographicToMercator => {
            layer.map_coords(lonlat_to_mercator);
            layer.crs = Some("EPSG:3857".to_string());
        }
        Projection::Identity => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER: &str = r#"{
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}},
        "features": [
            {"type": "Feature", "properties": {"name": "A", "pop": 3},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
            {"type": "Feature", "properties": {"name": null},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[2,2],[3,2],[3,3],[2,2]]], [[[4,4],[5,4],[5,5],[4,4]]]]}},
            {"type": "Feature", "properties": {"name": "C"}, "geometry": null}
        ]
    }"#;

    #[test]
    fn parses_features_and_crs() {
        let layer = GeoLayer::from_geojson_str(LAYER).unwrap();
        assert_eq!(layer.features.len(), 3);
        assert_eq!(layer.crs.as_deref(), Some("urn:ogc:def:crs:OGC:1.3:CRS84"));
        assert_eq!(layer.features[1].polygons.len(), 2);
        assert!(layer.features[2].polygons.is_empty());
        assert_eq!(layer.features[0].property_text("pop").as_deref(), Some("3"));
        assert_eq!(layer.features[1].property_text("name"), None);
    }

    #[test]
    fn columns_end_with_geometry() {
        let layer = GeoLayer::from_geojson_str(LAYER).unwrap();
        let cols = layer.columns();
        assert!(cols.contains(&"name".to_string()));
        assert_eq!(cols.last().map(String::as_str), Some("geometry"));
    }

    #[test]
    fn crs_names_classify() {
        assert_eq!(classify_crs("EPSG:4326"), Ok(Projection::GeographicToMercator));
        assert_eq!(
            classify_crs("urn:ogc:def:crs:OGC:1.3:CRS84"),
            Ok(Projection::GeographicToMercator)
        );
        assert_eq!(classify_crs("urn:ogc:def:crs:EPSG::3857"), Ok(Projection::Identity));
        assert!(matches!(
            classify_crs("EPSG:32628"),
            Err(Degradation::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn mercator_reference_points() {
        let (x, y) = lonlat_to_mercator((0.0, 0.0));
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
        let (x, _) = lonlat_to_mercator((180.0, 0.0));
        assert!((x - 20_037_508.34).abs() < 1.0);
        let (_, y_pole) = lonlat_to_mercator((0.0, 90.0));
        let (_, y_max) = lonlat_to_mercator((0.0, MERCATOR_MAX_LAT));
        assert_eq!(y_pole, y_max);
        assert!(y_pole.is_finite());
    }

    #[test]
    fn reproject_rewrites_coordinates() {
        let mut layer = GeoLayer::from_geojson_str(LAYER).unwrap();
        reproject(&mut layer, Projection::GeographicToMercator);
        let (_, _, max_x, _) = layer.bounds().unwrap();
        assert!(max_x > 500_000.0);
        assert_eq!(layer.crs.as_deref(), Some("EPSG:3857"));
    }
}
