// src/catalog/footprint.rs
use geojson::GeoJson;
use log::warn;
use serde_json::Value;
use std::fs;
use std::path::Path;
use wkt::ToWkt;

use crate::error::{NbrError, Result};

const DECIMALS: f64 = 1e4;

/// Read a GeoJSON file and return its area of interest as WKT
pub fn read_footprint(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    geojson_to_wkt(&value)
}

/// Convert a GeoJSON geometry, Feature or FeatureCollection to WKT, with
/// coordinates rounded to 4 decimals.
///
/// Only the first feature of a collection is used.
pub fn geojson_to_wkt(value: &Value) -> Result<String> {
    let geojson = GeoJson::from_json_value(value.clone())
        .map_err(|e| NbrError::Footprint(e.to_string()))?;

    let mut geometry = match geojson {
        GeoJson::FeatureCollection(collection) => {
            if collection.features.len() > 1 {
                warn!(
                    "Area of interest has {} features; only the first one is used",
                    collection.features.len()
                );
            }
            collection
                .features
                .into_iter()
                .next()
                .ok_or_else(|| NbrError::Footprint("feature collection is empty".to_string()))?
                .geometry
        }
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::Geometry(geometry) => Some(geometry),
    }
    .ok_or_else(|| NbrError::Footprint("feature has no geometry".to_string()))?;

    round_geometry(&mut geometry.value)?;

    let geometry = geo_types::Geometry::<f64>::try_from(geometry)
        .map_err(|e| NbrError::Footprint(e.to_string()))?;
    Ok(geometry.wkt_string())
}

fn round_geometry(value: &mut geojson::Value) -> Result<()> {
    use geojson::Value::*;

    match value {
        Point(position) => round_position(position),
        MultiPoint(positions) | LineString(positions) => {
            positions.iter_mut().try_for_each(round_position)
        }
        MultiLineString(lines) => lines.iter_mut().flatten().try_for_each(round_position),
        Polygon(rings) => round_polygon(rings),
        MultiPolygon(polygons) => polygons.iter_mut().try_for_each(round_polygon),
        GeometryCollection(geometries) => geometries
            .iter_mut()
            .try_for_each(|geometry| round_geometry(&mut geometry.value)),
    }
}

fn round_polygon(rings: &mut geojson::PolygonType) -> Result<()> {
    for ring in rings.iter_mut() {
        if ring.len() < 4 {
            return Err(NbrError::Footprint(format!(
                "linear ring needs at least 4 positions, got {}",
                ring.len()
            )));
        }
        ring.iter_mut().try_for_each(round_position)?;
    }
    Ok(())
}

fn round_position(position: &mut geojson::Position) -> Result<()> {
    if position.len() < 2 {
        return Err(NbrError::Footprint(format!(
            "position needs two coordinates, got {position:?}"
        )));
    }
    position.truncate(2);
    for coord in position.iter_mut() {
        *coord = (*coord * DECIMALS).round() / DECIMALS;
    }
    Ok(())
}
