//! JSON export of a network snapshot.

use crate::network::{Intersection, RoadNetwork, RoadSegment};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name offered for downloads.
pub const EXPORT_FILE_NAME: &str = "road-network.json";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// The exported document: both entity lists in snapshot order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDocument<'a> {
    pub intersections: Vec<&'a Intersection>,
    pub road_segments: Vec<&'a RoadSegment>,
}

impl<'a> NetworkDocument<'a> {
    pub fn new(network: &'a RoadNetwork) -> Self {
        Self {
            intersections: network.intersections().collect(),
            road_segments: network.road_segments().collect(),
        }
    }

    /// Serialize the document to pretty JSON.
    pub fn to_json(&self) -> ExportResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::Serialization(e.to_string()))
    }
}

/// Serialize a snapshot to pretty JSON.
pub fn to_json(network: &RoadNetwork) -> ExportResult<String> {
    NetworkDocument::new(network).to_json()
}

/// Write a snapshot to `path`.
pub fn write_to(network: &RoadNetwork, path: &Path) -> ExportResult<()> {
    let json = to_json(network)?;
    fs::write(path, json)
        .map_err(|e| ExportError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    log::info!("Exported road network to {}", path.display());
    Ok(())
}

/// Write a snapshot as [`EXPORT_FILE_NAME`] inside `dir`, creating the
/// directory if needed. Returns the written path.
pub fn export_to_dir(network: &RoadNetwork, dir: &Path) -> ExportResult<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            ExportError::Io(format!("Failed to create export directory: {}", e))
        })?;
    }
    let path = dir.join(EXPORT_FILE_NAME);
    write_to(network, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Direction, TrafficFlow, VehicleType};
    use serde_json::Value;
    use tempfile::tempdir;

    fn sample() -> RoadNetwork {
        let (network, a) = RoadNetwork::new().create_intersection(0.0, 0.0);
        let (network, b) = network.create_intersection(100.0, 0.0);
        let (network, road) = network.create_road_segment(a, b, "Main St").unwrap();
        network.update_road_flows(
            road,
            vec![TrafficFlow::new(VehicleType::HV, Direction::Left, 12)],
        )
    }

    #[test]
    fn test_document_shape() {
        let network = sample();
        let value: Value = serde_json::from_str(&to_json(&network).unwrap()).unwrap();

        let intersections = value["intersections"].as_array().unwrap();
        let roads = value["roadSegments"].as_array().unwrap();
        assert_eq!(intersections.len(), 2);
        assert_eq!(roads.len(), 1);

        let road = &roads[0];
        let road_id = road["id"].as_str().unwrap();
        assert_eq!(road["name"], "Main St");
        assert_eq!(road["startIntersectionId"], intersections[0]["id"]);
        assert_eq!(road["endIntersectionId"], intersections[1]["id"]);
        assert_eq!(road["trafficFlows"][0]["vehicleType"], "HV");
        assert_eq!(road["trafficFlows"][0]["direction"], "left");
        assert_eq!(road["trafficFlows"][0]["volume"], 12);

        assert_eq!(intersections[1]["x"], 100.0);
        assert_eq!(intersections[0]["connectedRoads"][0], road_id);
        assert!(intersections[0]["trafficMatrix"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_matrix_keys_serialize() {
        let network = sample();
        let hub = network.intersections().next().unwrap().id();
        let road = network.road_segments().next().unwrap().id();
        let mut matrix = crate::network::TurningMatrix::new();
        matrix
            .entry(road)
            .or_default()
            .entry(road)
            .or_default()
            .insert(VehicleType::Bus, 5);
        let network = network.update_intersection_matrix(hub, matrix);

        let value: Value = serde_json::from_str(&to_json(&network).unwrap()).unwrap();
        let key = road.to_string();
        assert_eq!(value["intersections"][0]["trafficMatrix"][&key][&key]["Bus"], 5);
    }

    #[test]
    fn test_export_to_dir() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested");

        let path = export_to_dir(&sample(), &target).unwrap();
        assert_eq!(path, target.join(EXPORT_FILE_NAME));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"roadSegments\""));
        assert!(written.contains("Main St"));
    }
}
