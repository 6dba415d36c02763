//! Edit operations producing new network snapshots.
//!
//! Every operation reads `&self` and returns the next snapshot. Structural
//! edits finish by re-deriving `connected_roads` from the segment set, so the
//! denormalized view can never drift from the segments themselves.

use super::{
    Intersection, IntersectionId, RoadId, RoadNetwork, RoadSegment, StaleTurnPolicy, TrafficFlow,
    TurningMatrix,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Rejected network edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Road endpoint not found: {0}")]
    EndpointMissing(IntersectionId),
}

/// Result type for network edits.
pub type NetworkResult<T> = Result<T, NetworkError>;

impl RoadNetwork {
    /// Add an intersection at a diagram position.
    pub fn create_intersection(&self, x: f64, y: f64) -> (Self, IntersectionId) {
        let id = Uuid::now_v7();
        log::debug!("Adding intersection {} at ({}, {})", id, x, y);

        let mut next = self.clone();
        next.intersections
            .insert(id, Arc::new(Intersection::new(id, x, y)));
        next.intersection_order.push_back(id);
        (next, id)
    }

    /// Connect two existing intersections with a named road.
    ///
    /// Equal endpoints are accepted here; refusing self-loops is up to the
    /// caller.
    pub fn create_road_segment(
        &self,
        start: IntersectionId,
        end: IntersectionId,
        name: impl Into<String>,
    ) -> NetworkResult<(Self, RoadId)> {
        for endpoint in [start, end] {
            if !self.intersections.contains_key(&endpoint) {
                log::warn!("Rejecting road: endpoint {} does not exist", endpoint);
                return Err(NetworkError::EndpointMissing(endpoint));
            }
        }

        let id = Uuid::now_v7();
        let segment = RoadSegment {
            id,
            name: name.into(),
            start_intersection_id: start,
            end_intersection_id: end,
            traffic_flows: Vec::new(),
        };
        log::debug!("Adding road {} {:?} from {} to {}", id, segment.name, start, end);

        let mut next = self.clone();
        next.road_segments.insert(id, Arc::new(segment));
        next.road_order.push_back(id);
        Ok((next.rederive_connections(), id))
    }

    /// Replace a road's flows. Unknown roads leave the snapshot as is.
    pub fn update_road_flows(&self, road: RoadId, flows: Vec<TrafficFlow>) -> Self {
        let Some(current) = self.road_segments.get(&road) else {
            log::debug!("Ignoring flow update for missing road {}", road);
            return self.clone();
        };
        log::debug!("Updating {} flows on road {}", flows.len(), road);

        let updated = RoadSegment {
            traffic_flows: flows,
            ..RoadSegment::clone(current)
        };
        let mut next = self.clone();
        next.road_segments.insert(road, Arc::new(updated));
        next
    }

    /// Replace an intersection's turning matrix. Unknown intersections leave
    /// the snapshot as is.
    pub fn update_intersection_matrix(
        &self,
        intersection: IntersectionId,
        matrix: TurningMatrix,
    ) -> Self {
        let Some(current) = self.intersections.get(&intersection) else {
            log::debug!("Ignoring matrix update for missing intersection {}", intersection);
            return self.clone();
        };
        log::debug!("Updating turning matrix on intersection {}", intersection);

        let updated = Intersection {
            traffic_matrix: matrix,
            ..Intersection::clone(current)
        };
        let mut next = self.clone();
        next.intersections.insert(intersection, Arc::new(updated));
        next
    }

    /// Remove an intersection and every road touching it.
    pub fn delete_intersection(&self, intersection: IntersectionId) -> Self {
        if !self.intersections.contains_key(&intersection) {
            log::debug!("Ignoring delete of missing intersection {}", intersection);
            return self.clone();
        }

        let removed_roads: Vec<RoadId> = self
            .road_segments()
            .filter(|road| road.touches(intersection))
            .map(|road| road.id)
            .collect();
        log::debug!(
            "Deleting intersection {} and {} connected roads",
            intersection,
            removed_roads.len()
        );

        let mut next = self.clone();
        next.intersections.remove(&intersection);
        next.intersection_order.retain(|id| *id != intersection);
        next.remove_roads(&removed_roads);
        next.rederive_connections()
    }

    /// Remove a single road.
    pub fn delete_road_segment(&self, road: RoadId) -> Self {
        if !self.road_segments.contains_key(&road) {
            log::debug!("Ignoring delete of missing road {}", road);
            return self.clone();
        }
        log::debug!("Deleting road {}", road);

        let mut next = self.clone();
        next.remove_roads(&[road]);
        next.rederive_connections()
    }

    fn remove_roads(&mut self, roads: &[RoadId]) {
        if roads.is_empty() {
            return;
        }
        for road in roads {
            self.road_segments.remove(road);
        }
        self.road_order.retain(|id| !roads.contains(id));
        if self.stale_turns == StaleTurnPolicy::Purge {
            self.purge_turns(roads);
        }
    }

    /// Drop turning movements that start or end on any of `roads`.
    fn purge_turns(&mut self, roads: &[RoadId]) {
        let purged: Vec<Arc<Intersection>> = self
            .intersections()
            .filter(|i| {
                i.traffic_matrix.iter().any(|(from, row)| {
                    roads.contains(from) || row.keys().any(|to| roads.contains(to))
                })
            })
            .map(|i| {
                let mut updated = i.clone();
                updated.traffic_matrix.retain(|from, _| !roads.contains(from));
                for row in updated.traffic_matrix.values_mut() {
                    row.retain(|to, _| !roads.contains(to));
                }
                updated.traffic_matrix.retain(|_, row| !row.is_empty());
                Arc::new(updated)
            })
            .collect();

        for intersection in purged {
            log::debug!("Purged stale turns on intersection {}", intersection.id);
            self.intersections.insert(intersection.id, intersection);
        }
    }

    /// Recompute every intersection's `connected_roads` from the segments.
    ///
    /// Intersections whose list is unchanged keep their existing `Arc`.
    fn rederive_connections(mut self) -> Self {
        let mut incident: HashMap<IntersectionId, Vec<RoadId>> = HashMap::new();
        for road in self.road_segments() {
            incident
                .entry(road.start_intersection_id)
                .or_default()
                .push(road.id);
            if road.end_intersection_id != road.start_intersection_id {
                incident
                    .entry(road.end_intersection_id)
                    .or_default()
                    .push(road.id);
            }
        }

        let changed: Vec<Arc<Intersection>> = self
            .intersections()
            .filter_map(|i| {
                let roads = incident.remove(&i.id).unwrap_or_default();
                (i.connected_roads != roads).then(|| {
                    Arc::new(Intersection {
                        connected_roads: roads,
                        ..i.clone()
                    })
                })
            })
            .collect();

        for intersection in changed {
            self.intersections.insert(intersection.id, intersection);
        }
        self
    }
}
