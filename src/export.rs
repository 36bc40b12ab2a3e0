//! GeoJSON output for a finished boundary.

use geojson::{Feature, Geometry, JsonObject, Value};
use serde_json::json;
use std::{fs, path::Path};

use crate::area::geodesic_area_acres;
use crate::controller::SessionResult;
use crate::data::{BOUNDARY_POINTS, GeoPoint};
use crate::error::ExportError;

/// Polygon feature in tap order with the area as properties.
pub fn boundary_feature(result: &SessionResult) -> Result<Feature, ExportError> {
    if result.boundary.len() != BOUNDARY_POINTS {
        return Err(ExportError::NoBoundary);
    }
    let ring: Vec<geo::Coord<f64>> = result.boundary.iter().map(|&p| p.into()).collect();
    let polygon = geo::Polygon::new(ring.into(), vec![]);

    let mut properties = JsonObject::new();
    properties.insert("area_acres".into(), json!(result.area_acres));
    properties.insert(
        "geodesic_area_acres".into(),
        json!(geodesic_area_acres(&result.boundary)),
    );
    let points: Vec<_> = result
        .boundary
        .iter()
        .enumerate()
        .map(|(i, GeoPoint { latitude, longitude })| {
            json!({ "sequence": i + 1, "latitude": latitude, "longitude": longitude })
        })
        .collect();
    properties.insert("points".into(), json!(points));

    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&polygon))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Writes the boundary feature to `path`, creating parent directories.
pub fn write_boundary<P: AsRef<Path>>(result: &SessionResult, path: P) -> Result<(), ExportError> {
    let feature = boundary_feature(result)?;
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&feature)?)?;
    log::info!("boundary written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::GeoJson;
    use std::str::FromStr;

    fn result() -> SessionResult {
        SessionResult {
            area_acres: 2.889,
            boundary: vec![
                GeoPoint::new(19.0, 73.0),
                GeoPoint::new(19.0, 73.001),
                GeoPoint::new(19.001, 73.001),
                GeoPoint::new(19.001, 73.0),
            ],
        }
    }

    #[test]
    fn test_feature_geometry_is_closed_ring() {
        let feature = boundary_feature(&result()).unwrap();
        let Some(Geometry { value: Value::Polygon(rings), .. }) = feature.geometry else {
            panic!("expected polygon geometry");
        };
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0][1], vec![73.001, 19.0]);
        assert_eq!(rings[0][0], rings[0][4]);
    }

    #[test]
    fn test_feature_properties() {
        let feature = boundary_feature(&result()).unwrap();
        let props = feature.properties.unwrap();
        assert_eq!(props["area_acres"], json!(2.889));
        assert_eq!(props["points"][2]["sequence"], json!(3));
        assert!(props["geodesic_area_acres"].as_f64().unwrap() > 2.8);
    }

    #[test]
    fn test_incomplete_boundary_rejected() {
        let mut r = result();
        r.boundary.pop();
        assert!(matches!(boundary_feature(&r), Err(ExportError::NoBoundary)));
    }

    #[test]
    fn test_write_boundary_round_trips_through_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("boundary.geojson");
        write_boundary(&result(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(matches!(GeoJson::from_str(&text).unwrap(), GeoJson::Feature(_)));
    }
}
