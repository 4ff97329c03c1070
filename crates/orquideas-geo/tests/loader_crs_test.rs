//! CRS handling when loading conservation areas

use orquideas_core::formats::occurrences::CoordinateColumns;
use orquideas_geo::GeometryLoader;
use std::fs;
use tempfile::TempDir;

fn write_layer(dir: &TempDir, crs_name: &str, ring: &str) -> std::path::PathBuf {
    let path = dir.path().join("areas_crtm05.geojson");
    let content = format!(
        r#"{{
            "type": "FeatureCollection",
            "crs": {{ "type": "name", "properties": {{ "name": "{}" }} }},
            "features": [
                {{
                    "type": "Feature",
                    "geometry": {{ "type": "Polygon", "coordinates": [{}] }},
                    "properties": {{ "nombre_ac": "Area de Conservacion Central" }}
                }}
            ]
        }}"#,
        crs_name, ring
    );
    fs::write(&path, content).unwrap();
    path
}

const CRTM05_RING: &str =
    "[[480000, 1090000], [520000, 1090000], [520000, 1130000], [480000, 1130000], [480000, 1090000]]";

#[cfg(feature = "reproject")]
#[test]
fn test_projected_layer_is_normalized_to_wgs84() {
    use geo::BoundingRect;

    let dir = TempDir::new().unwrap();
    let path = write_layer(&dir, "urn:ogc:def:crs:EPSG::5367", CRTM05_RING);

    let load = GeometryLoader::new("nombre_ac", CoordinateColumns::default()).load_areas(&path).unwrap();

    assert_eq!(load.source_crs.epsg, 5367);
    let rect = load.areas[0].geometry.bounding_rect().unwrap();
    // Around San Jose, Costa Rica
    assert!(rect.min().x > -84.3 && rect.max().x < -83.7, "{:?}", rect);
    assert!(rect.min().y > 9.7 && rect.max().y < 10.3, "{:?}", rect);
}

#[cfg(not(feature = "reproject"))]
#[test]
fn test_projected_layer_needs_reprojection() {
    let dir = TempDir::new().unwrap();
    let path = write_layer(&dir, "EPSG:5367", CRTM05_RING);

    let err = GeometryLoader::new("nombre_ac", CoordinateColumns::default()).load_areas(&path).unwrap_err();
    assert!(matches!(err, orquideas_core::OrquideaError::CrsMismatch { .. }));
}

#[test]
fn test_wgs84_layer_is_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_layer(
        &dir,
        "EPSG:4326",
        "[[-84.2, 9.8], [-83.8, 9.8], [-83.8, 10.2], [-84.2, 10.2], [-84.2, 9.8]]",
    );

    let load = GeometryLoader::new("nombre_ac", CoordinateColumns::default()).load_areas(&path).unwrap();
    let exterior = load.areas[0].geometry.0[0].exterior();
    assert_eq!(exterior.0[0].x, -84.2);
    assert_eq!(exterior.0[0].y, 9.8);
}
