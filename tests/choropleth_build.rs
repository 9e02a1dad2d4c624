use std::path::Path;

use vizcraft::VizError;
use vizcraft::choropleth::{
    ChoroplethOptions, DataTable, GeoLayer, PaletteSource, build_choropleth,
};

fn square(name: Option<&str>, x: f64) -> String {
    let name = name.map_or("null".to_string(), |n| format!("\"{n}\""));
    format!(
        r#"{{"type":"Feature","properties":{{"ADM2_EN":{name},"code":1}},
            "geometry":{{"type":"Polygon","coordinates":[[[{x},16.0],[{x1},16.0],[{x1},17.0],[{x},17.0],[{x},16.0]]]}}}}"#,
        x1 = x + 1.0
    )
}

fn layer(names: &[Option<&str>], crs: Option<&str>) -> GeoLayer {
    let features: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, n)| square(*n, -16.0 + i as f64))
        .collect();
    let crs = crs
        .map(|c| format!(r#""crs":{{"type":"name","properties":{{"name":"{c}"}}}},"#))
        .unwrap_or_default();
    GeoLayer::from_geojson_str(&format!(
        r#"{{"type":"FeatureCollection",{crs}"features":[{}]}}"#,
        features.join(",")
    ))
    .unwrap()
}

fn votes(rows: &[(&str, &str)]) -> DataTable {
    let mut t = DataTable::new(["moughataa", "nb_votes"]);
    for (k, v) in rows {
        t.push_row([*k, *v]).unwrap();
    }
    t
}

fn build(
    layer: GeoLayer,
    table: &DataTable,
    out: &Path,
    options: &ChoroplethOptions,
) -> vizcraft::Result<vizcraft::choropleth::ChoroplethMap> {
    build_choropleth(layer, table, "ADM2_EN", "moughataa", "nb_votes", out, options)
}

#[test]
fn join_ignores_case_and_padding() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("map.html");
    let map = build(
        layer(&[Some("nouakchott")], None),
        &votes(&[(" Nouakchott ", "1200")]),
        &out,
        &ChoroplethOptions::default(),
    )
    .unwrap();
    assert_eq!(map.regions.len(), 1);
    assert_eq!(map.regions[0].value, Some(1200.0));
    assert!(out.exists());
}

#[test]
fn regions_without_values_survive() {
    let dir = tempfile::tempdir().unwrap();
    let map = build(
        layer(&[Some("Atar"), Some("Akjoujt"), Some("Néma"), Some("Kiffa")], None),
        &votes(&[("atar", "10"), ("kiffa", "30")]),
        &dir.path().join("m.html"),
        &ChoroplethOptions::default(),
    )
    .unwrap();
    assert_eq!(map.regions.len(), 4);
    let missing = map.regions.iter().filter(|r| r.value.is_none()).count();
    assert_eq!(missing, 2);
    let colors = map.fill_colors();
    assert_eq!(colors[1], map.mapper.nan_color);
    assert_ne!(colors[0], map.mapper.nan_color);
}

#[test]
fn equal_bounds_are_widened() {
    let dir = tempfile::tempdir().unwrap();
    let options = ChoroplethOptions {
        low: Some(10.0),
        high: Some(10.0),
        ..ChoroplethOptions::default()
    };
    let map = build(
        layer(&[Some("A")], None),
        &votes(&[("a", "10")]),
        &dir.path().join("m.html"),
        &options,
    )
    .unwrap();
    assert_eq!(map.scale.low, 10.0);
    assert!(map.scale.high > 10.0);
}

#[test]
fn unreadable_value_only_affects_its_row() {
    let dir = tempfile::tempdir().unwrap();
    let map = build(
        layer(&[Some("A"), Some("B"), Some("C")], None),
        &votes(&[("a", "N/A"), ("b", "5"), ("c", "15")]),
        &dir.path().join("m.html"),
        &ChoroplethOptions::default(),
    )
    .unwrap();
    assert_eq!(map.invalid_values, 1);
    let values: Vec<Option<f64>> = map.regions.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![None, Some(5.0), Some(15.0)]);
    assert_eq!((map.scale.low, map.scale.high), (5.0, 15.0));
}

#[test]
fn missing_geometry_column_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("m.html");
    let err = build_choropleth(
        layer(&[Some("A")], None),
        &votes(&[("a", "1")]),
        "shapeName",
        "moughataa",
        "nb_votes",
        &out,
        &ChoroplethOptions::default(),
    )
    .unwrap_err();
    match &err {
        VizError::Configuration {
            column, available, ..
        } => {
            assert_eq!(column, "shapeName");
            assert!(available.contains(&"ADM2_EN".to_string()));
            assert!(available.contains(&"geometry".to_string()));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("shapeName"));
    assert!(!out.exists());
}

#[test]
fn missing_value_column_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = build_choropleth(
        layer(&[Some("A")], None),
        &votes(&[("a", "1")]),
        "ADM2_EN",
        "moughataa",
        "votes",
        dir.path().join("m.html"),
        &ChoroplethOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, VizError::Configuration { ref column, .. } if column == "votes"));
    assert!(err.to_string().contains("['moughataa', 'nb_votes']"));
}

#[test]
fn unknown_palette_still_produces_a_map() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("m.html");
    let options = ChoroplethOptions {
        palette_name: "NoSuchPalette".into(),
        ..ChoroplethOptions::default()
    };
    let map = build(layer(&[Some("A")], None), &votes(&[("a", "1")]), &out, &options).unwrap();
    assert_eq!(map.palette_source, PaletteSource::Fallback);
    assert_eq!(map.mapper.palette.len(), 256);
    assert!(std::fs::read_to_string(&out).unwrap().contains("<svg"));
}

#[test]
fn brewer_palette_and_reverse() {
    let dir = tempfile::tempdir().unwrap();
    let forward = build(
        layer(&[Some("A"), Some("B")], None),
        &votes(&[("a", "0"), ("b", "100")]),
        &dir.path().join("f.html"),
        &ChoroplethOptions::default(),
    )
    .unwrap();
    assert_eq!(forward.palette_source, PaletteSource::Brewer);

    let reversed = build(
        layer(&[Some("A"), Some("B")], None),
        &votes(&[("a", "0"), ("b", "100")]),
        &dir.path().join("r.html"),
        &ChoroplethOptions {
            reverse_palette: true,
            ..ChoroplethOptions::default()
        },
    )
    .unwrap();
    assert_eq!(forward.fill_colors()[0], reversed.fill_colors()[1]);
    assert_eq!(forward.fill_colors()[1], reversed.fill_colors()[0]);
}

#[test]
fn declared_geographic_layers_are_projected() {
    let dir = tempfile::tempdir().unwrap();
    let projected = build(
        layer(&[Some("A")], Some("urn:ogc:def:crs:OGC:1.3:CRS84")),
        &votes(&[("a", "1")]),
        &dir.path().join("p.html"),
        &ChoroplethOptions::default(),
    )
    .unwrap();
    assert!(projected.reprojected);
    let (x, _) = projected.regions[0].polygons[0][0][0];
    assert!(x < -1_000_000.0, "x = {x}");

    let kept = build(
        layer(&[Some("A")], Some("EPSG:32628")),
        &votes(&[("a", "1")]),
        &dir.path().join("k.html"),
        &ChoroplethOptions::default(),
    )
    .unwrap();
    assert!(!kept.reprojected);
    assert_eq!(kept.regions[0].polygons[0][0][0], (-16.0, 16.0));
}

#[test]
fn html_carries_tooltip_labels_and_title() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("votes.html");
    let options = ChoroplethOptions {
        title: "Résultats - Élection 2024".into(),
        legend_label: "Nombre de voix".into(),
        region_label: "Moughataa".into(),
        ..ChoroplethOptions::default()
    };
    build(
        layer(&[Some("Atar"), None], None),
        &votes(&[("atar", "12345")]),
        &out,
        &options,
    )
    .unwrap();
    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("<title>Résultats - Élection 2024</title>"));
    assert!(html.contains("Moughataa"));
    assert!(html.contains("Nombre de voix"));
    assert!(html.contains("12,345"));
    assert!(html.contains("\"N/A\""));
}

#[test]
fn geometry_can_be_read_from_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let geo = dir.path().join("regions.geojson");
    std::fs::write(
        &geo,
        format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            square(Some("Atar"), 0.0)
        ),
    )
    .unwrap();
    let csv = dir.path().join("votes.csv");
    std::fs::write(&csv, "moughataa,nb_votes\nATAR,7\n").unwrap();

    let table = DataTable::from_csv_path(&csv).unwrap();
    let map = build_choropleth(
        geo.as_path(),
        &table,
        "ADM2_EN",
        "moughataa",
        "nb_votes",
        dir.path().join("m.html"),
        &ChoroplethOptions::default(),
    )
    .unwrap();
    assert_eq!(map.regions[0].value, Some(7.0));
}
