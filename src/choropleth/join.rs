//! Left join of value rows onto geometry features by normalized region name.

use std::collections::HashMap;

use super::geometry::{GeoLayer, PolygonRings};
use super::table::{DataTable, coerce_numeric, normalize_key};
use crate::error::Result;

/// One geometry region after the join.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinedRegion {
    /// Region name as it appears in the geometry layer.
    pub name: Option<String>,
    /// Normalized join key; `None` when the geometry name was null or absent.
    pub key: Option<String>,
    pub value: Option<f64>,
    pub polygons: Vec<PolygonRings>,
}

/// Join output plus bookkeeping for the caller's diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JoinOutcome {
    pub regions: Vec<JoinedRegion>,
    /// Value cells that could not be read as finite numbers.
    pub invalid_values: usize,
    /// Normalized keys that occur more than once in the value table.
    pub duplicate_keys: Vec<String>,
}

/// Left-join `values` onto `layer`.
///
/// Every feature survives. A feature whose key matches several value rows yields one
/// region per match, in value-table order. Null geometry names and empty value keys
/// never match. The column names must already have been checked.
pub fn left_join(
    layer: &GeoLayer,
    geometry_key: &str,
    values: &DataTable,
    values_key: &str,
    value_column: &str,
) -> Result<JoinOutcome> {
    let key_idx = values.require_column(values_key)?;
    let value_idx = values.require_column(value_column)?;

    let mut invalid_values = 0usize;
    let mut lookup: HashMap<String, Vec<Option<f64>>> = HashMap::new();
    for row in values.rows() {
        let value = coerce_numeric(&row[value_idx]);
        if value.is_none() {
            invalid_values += 1;
        }
        let key = normalize_key(&row[key_idx]);
        if key.is_empty() {
            continue;
        }
        lookup.entry(key).or_default().push(value);
    }

    let mut duplicate_keys: Vec<String> = lookup
        .iter()
        .filter(|(_, v)| v.len() > 1)
        .map(|(k, _)| k.clone())
        .collect();
    duplicate_keys.sort();

    let mut regions = Vec::with_capacity(layer.features.len());
    for feature in &layer.features {
        let name = feature.property_text(geometry_key);
        let key = name.as_deref().map(normalize_key);
        let matches = key.as_ref().and_then(|k| lookup.get(k));
        match matches {
            Some(vals) => {
                for v in vals {
                    regions.push(JoinedRegion {
                        name: name.clone(),
                        key: key.clone(),
                        value: *v,
                        polygons: feature.polygons.clone(),
                    });
                }
            }
            None => regions.push(JoinedRegion {
                name,
                key,
                value: None,
                polygons: feature.polygons.clone(),
            }),
        }
    }

    Ok(JoinOutcome {
        regions,
        invalid_values,
        duplicate_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(names: &[Option<&str>]) -> GeoLayer {
        let features: Vec<String> = names
            .iter()
            .map(|n| {
                let name = n.map_or("null".to_string(), |s| format!("\"{s}\""));
                format!(
                    r#"{{"type":"Feature","properties":{{"name":{name}}},
                        "geometry":{{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}}}"#
                )
            })
            .collect();
        let doc = format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        );
        GeoLayer::from_geojson_str(&doc).unwrap()
    }

    fn table(rows: &[(&str, &str)]) -> DataTable {
        let mut t = DataTable::new(["region", "votes"]);
        for (k, v) in rows {
            t.push_row([*k, *v]).unwrap();
        }
        t
    }

    #[test]
    fn keys_match_regardless_of_case_and_padding() {
        let out = left_join(
            &layer(&[Some("nouakchott")]),
            "name",
            &table(&[(" Nouakchott ", "42")]),
            "region",
            "votes",
        )
        .unwrap();
        assert_eq!(out.regions.len(), 1);
        assert_eq!(out.regions[0].value, Some(42.0));
        assert_eq!(out.regions[0].name.as_deref(), Some("nouakchott"));
    }

    #[test]
    fn unmatched_regions_survive() {
        let out = left_join(
            &layer(&[Some("A"), Some("B"), Some("C")]),
            "name",
            &table(&[("a", "1")]),
            "region",
            "votes",
        )
        .unwrap();
        assert_eq!(out.regions.len(), 3);
        assert_eq!(out.regions[1].value, None);
        assert_eq!(out.regions[2].value, None);
    }

    #[test]
    fn bad_cells_only_affect_their_row() {
        let out = left_join(
            &layer(&[Some("A"), Some("B")]),
            "name",
            &table(&[("a", "N/A"), ("b", "7")]),
            "region",
            "votes",
        )
        .unwrap();
        assert_eq!(out.invalid_values, 1);
        assert_eq!(out.regions[0].value, None);
        assert_eq!(out.regions[1].value, Some(7.0));
    }

    #[test]
    fn duplicate_keys_fan_out() {
        let out = left_join(
            &layer(&[Some("A")]),
            "name",
            &table(&[("a", "1"), ("A ", "2")]),
            "region",
            "votes",
        )
        .unwrap();
        assert_eq!(out.regions.len(), 2);
        assert_eq!(out.duplicate_keys, vec!["a".to_string()]);
        let values: Vec<Option<f64>> = out.regions.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn null_names_and_empty_keys_never_match() {
        let out = left_join(
            &layer(&[None, Some("")]),
            "name",
            &table(&[("", "5"), ("null", "6")]),
            "region",
            "votes",
        )
        .unwrap();
        assert_eq!(out.regions.len(), 2);
        assert!(out.regions.iter().all(|r| r.value.is_none()));
        assert_eq!(out.regions[0].key, None);
    }
}
