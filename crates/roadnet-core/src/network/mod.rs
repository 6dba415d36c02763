//! Road network graph model.
//!
//! A [`RoadNetwork`] is an immutable snapshot of intersections and the road
//! segments connecting them. Snapshots never change in place: every edit in
//! [`mutation`] returns a new snapshot and leaves the previous one valid.
//! Entities live behind [`Arc`] inside persistent `im` collections, so a new
//! snapshot shares everything it did not touch with its predecessor.

mod mutation;

pub use mutation::{NetworkError, NetworkResult};

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of an intersection.
pub type IntersectionId = Uuid;

/// Identifier of a road segment.
pub type RoadId = Uuid;

/// Identifier of either kind of element (used by selection).
pub type ElementId = Uuid;

/// Radius of an intersection marker in diagram units.
pub const INTERSECTION_RADIUS: f64 = 8.0;

/// Half the drawn width of a road segment in diagram units.
pub const ROAD_HALF_WIDTH: f64 = 1.0;

/// Vehicle classes counted in flows and turning volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Bus,
    HV,
    LV,
}

impl VehicleType {
    /// All vehicle classes, in display order.
    pub const ALL: [VehicleType; 3] = [VehicleType::Bus, VehicleType::HV, VehicleType::LV];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            VehicleType::Bus => "Bus",
            VehicleType::HV => "Heavy Vehicle",
            VehicleType::LV => "Light Vehicle",
        }
    }

    fn code(self) -> &'static str {
        match self {
            VehicleType::Bus => "Bus",
            VehicleType::HV => "HV",
            VehicleType::LV => "LV",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for VehicleType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bus" => Ok(VehicleType::Bus),
            "hv" | "heavy" => Ok(VehicleType::HV),
            "lv" | "light" => Ok(VehicleType::LV),
            _ => Err(ParseKindError::new("vehicle type", s)),
        }
    }
}

/// Movement direction of a flow along a road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    #[default]
    Through,
    Right,
}

impl Direction {
    /// All directions, in display order.
    pub const ALL: [Direction; 3] = [Direction::Left, Direction::Through, Direction::Right];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Left => "left",
            Direction::Through => "through",
            Direction::Right => "right",
        })
    }
}

impl FromStr for Direction {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "through" => Ok(Direction::Through),
            "right" => Ok(Direction::Right),
            _ => Err(ParseKindError::new("direction", s)),
        }
    }
}

/// Error returned when parsing a vehicle type or direction from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseKindError {
    kind: &'static str,
    value: String,
}

impl ParseKindError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Vehicle volume moving along a road in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficFlow {
    pub vehicle_type: VehicleType,
    pub direction: Direction,
    pub volume: u32,
}

impl TrafficFlow {
    pub fn new(vehicle_type: VehicleType, direction: Direction, volume: u32) -> Self {
        Self {
            vehicle_type,
            direction,
            volume,
        }
    }
}

impl Default for TrafficFlow {
    fn default() -> Self {
        Self::new(VehicleType::LV, Direction::Through, 0)
    }
}

/// Volumes per vehicle class for one turning movement.
pub type ClassVolumes = BTreeMap<VehicleType, u32>;

/// Turning movements at an intersection: from-road, then to-road, then class.
pub type TurningMatrix = BTreeMap<RoadId, BTreeMap<RoadId, ClassVolumes>>;

/// A node of the road graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Intersection {
    pub(crate) id: IntersectionId,
    /// Position in diagram space.
    pub x: f64,
    pub y: f64,
    /// Roads touching this intersection, derived from the segments of the
    /// snapshot that owns it.
    pub(crate) connected_roads: Vec<RoadId>,
    pub traffic_matrix: TurningMatrix,
}

impl Intersection {
    pub(crate) fn new(id: IntersectionId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            connected_roads: Vec::new(),
            traffic_matrix: TurningMatrix::new(),
        }
    }

    pub fn id(&self) -> IntersectionId {
        self.id
    }

    /// Position as a diagram point.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Roads incident to this intersection, in road insertion order.
    pub fn connected_roads(&self) -> &[RoadId] {
        &self.connected_roads
    }

    /// Whether `road` touches this intersection.
    pub fn is_connected_to(&self, road: RoadId) -> bool {
        self.connected_roads.contains(&road)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position()).hypot() <= INTERSECTION_RADIUS + tolerance
    }
}

/// An edge of the road graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadSegment {
    pub(crate) id: RoadId,
    pub name: String,
    pub(crate) start_intersection_id: IntersectionId,
    pub(crate) end_intersection_id: IntersectionId,
    /// Flows in entry order. Repeated (vehicle type, direction) pairs are kept.
    pub traffic_flows: Vec<TrafficFlow>,
}

impl RoadSegment {
    pub fn id(&self) -> RoadId {
        self.id
    }

    pub fn start_intersection_id(&self) -> IntersectionId {
        self.start_intersection_id
    }

    pub fn end_intersection_id(&self) -> IntersectionId {
        self.end_intersection_id
    }

    /// Whether either endpoint is `intersection`.
    pub fn touches(&self, intersection: IntersectionId) -> bool {
        self.start_intersection_id == intersection || self.end_intersection_id == intersection
    }
}

/// What a road deletion does to turning-matrix entries keyed by that road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleTurnPolicy {
    /// Remove rows and columns of deleted roads.
    #[default]
    Purge,
    /// Leave them in place as unreachable data.
    Retain,
}

/// The kind of element an id resolves to in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Intersection,
    Road,
}

/// What lies under a diagram point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasTarget {
    /// Empty canvas at the given diagram point.
    Background(Point),
    Intersection(IntersectionId),
    Road(RoadId),
}

/// An immutable snapshot of the road graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadNetwork {
    intersections: im::HashMap<IntersectionId, Arc<Intersection>>,
    intersection_order: im::Vector<IntersectionId>,
    road_segments: im::HashMap<RoadId, Arc<RoadSegment>>,
    road_order: im::Vector<RoadId>,
    stale_turns: StaleTurnPolicy,
}

impl RoadNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty network with the given stale turn policy.
    pub fn with_policy(stale_turns: StaleTurnPolicy) -> Self {
        Self {
            stale_turns,
            ..Self::default()
        }
    }

    pub fn stale_turn_policy(&self) -> StaleTurnPolicy {
        self.stale_turns
    }

    /// Whether two snapshots share the same storage, i.e. one is an
    /// unmodified copy of the other.
    ///
    /// Every edit touches at least one entity map, so comparing the maps is
    /// enough.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.intersections.ptr_eq(&other.intersections)
            && self.road_segments.ptr_eq(&other.road_segments)
    }

    /// Get an intersection by ID.
    pub fn intersection(&self, id: IntersectionId) -> Option<&Intersection> {
        self.intersections.get(&id).map(|i| &**i)
    }

    /// Get a road segment by ID.
    pub fn road_segment(&self, id: RoadId) -> Option<&RoadSegment> {
        self.road_segments.get(&id).map(|r| &**r)
    }

    /// All intersections in insertion order.
    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> + '_ {
        self.intersection_order
            .iter()
            .filter_map(|id| self.intersections.get(id))
            .map(|i| &**i)
    }

    /// All road segments in insertion order.
    pub fn road_segments(&self) -> impl Iterator<Item = &RoadSegment> + '_ {
        self.road_order
            .iter()
            .filter_map(|id| self.road_segments.get(id))
            .map(|r| &**r)
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    pub fn road_count(&self) -> usize {
        self.road_segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty() && self.road_segments.is_empty()
    }

    /// Resolve which kind of element `id` names, if any.
    pub fn element_kind(&self, id: ElementId) -> Option<ElementKind> {
        if self.road_segments.contains_key(&id) {
            Some(ElementKind::Road)
        } else if self.intersections.contains_key(&id) {
            Some(ElementKind::Intersection)
        } else {
            None
        }
    }

    /// Both endpoint intersections of a road.
    pub fn road_endpoints(&self, road: &RoadSegment) -> Option<(&Intersection, &Intersection)> {
        Some((
            self.intersection(road.start_intersection_id)?,
            self.intersection(road.end_intersection_id)?,
        ))
    }

    /// Bounding box of all intersection centres, or `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.intersections().map(Intersection::position);
        let first = points.next()?;
        Some(points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p)))
    }

    /// Find the element under a diagram point.
    ///
    /// Intersections are drawn above roads and win over them; within a kind
    /// the most recently added element wins.
    pub fn element_at(&self, point: Point, tolerance: f64) -> CanvasTarget {
        let intersection = self
            .intersection_order
            .iter()
            .rev()
            .filter_map(|id| self.intersections.get(id))
            .find(|i| i.hit_test(point, tolerance));
        if let Some(intersection) = intersection {
            return CanvasTarget::Intersection(intersection.id);
        }

        self.road_order
            .iter()
            .rev()
            .filter_map(|id| self.road_segments.get(id))
            .find(|road| self.road_hit_test(road, point, tolerance))
            .map(|road| CanvasTarget::Road(road.id))
            .unwrap_or(CanvasTarget::Background(point))
    }

    fn road_hit_test(&self, road: &RoadSegment, point: Point, tolerance: f64) -> bool {
        let Some((start, end)) = self.road_endpoints(road) else {
            return false;
        };
        let (start, end) = (start.position(), end.position());
        let line_vec = end - start;
        let point_vec = point - start;

        let line_len_sq = line_vec.hypot2();
        let dist = if line_len_sq < f64::EPSILON {
            point_vec.hypot()
        } else {
            // Project onto the segment, clamped to its ends
            let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
            let projection = start + line_vec * t;
            (point - projection).hypot()
        };
        dist <= tolerance + ROAD_HALF_WIDTH
    }
}
