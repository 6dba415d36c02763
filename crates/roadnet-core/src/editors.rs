//! Property editors for flows and turning volumes.
//!
//! Editors keep a working copy of one element's data. Every edit returns the
//! full replacement value to hand to the session's update entry points
//! ([`Session::update_road_flows`](crate::Session::update_road_flows) and
//! [`Session::update_intersection_matrix`](crate::Session::update_intersection_matrix)).

use crate::network::{
    Direction, Intersection, IntersectionId, RoadId, RoadSegment, TrafficFlow, TurningMatrix,
    VehicleType,
};

/// Parse a volume typed into a numeric field.
///
/// Leading digits are used (`"12 vph"` is 12); empty, malformed or negative
/// input reads as 0. Values past `u32::MAX` saturate.
pub fn parse_volume(text: &str) -> u32 {
    let text = text.trim_start();
    if text.starts_with('-') {
        return 0;
    }
    let digits: String = text
        .trim_start_matches('+')
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

/// Editor for a road's flow list.
#[derive(Debug, Clone)]
pub struct FlowListEditor {
    road: RoadId,
    flows: Vec<TrafficFlow>,
    /// Flow being composed in the "add" row.
    pub draft: TrafficFlow,
}

impl FlowListEditor {
    pub fn open(road: &RoadSegment) -> Self {
        Self {
            road: road.id(),
            flows: road.traffic_flows.clone(),
            draft: TrafficFlow::default(),
        }
    }

    pub fn road(&self) -> RoadId {
        self.road
    }

    pub fn flows(&self) -> &[TrafficFlow] {
        &self.flows
    }

    /// Append the draft and reset it.
    pub fn add_draft(&mut self) -> Vec<TrafficFlow> {
        self.flows.push(std::mem::take(&mut self.draft));
        self.flows.clone()
    }

    pub fn set_vehicle_type(&mut self, index: usize, vehicle_type: VehicleType) -> Option<Vec<TrafficFlow>> {
        self.edit(index, |flow| flow.vehicle_type = vehicle_type)
    }

    pub fn set_direction(&mut self, index: usize, direction: Direction) -> Option<Vec<TrafficFlow>> {
        self.edit(index, |flow| flow.direction = direction)
    }

    pub fn set_volume(&mut self, index: usize, volume: u32) -> Option<Vec<TrafficFlow>> {
        self.edit(index, |flow| flow.volume = volume)
    }

    pub fn set_volume_text(&mut self, index: usize, text: &str) -> Option<Vec<TrafficFlow>> {
        self.set_volume(index, parse_volume(text))
    }

    /// Replace a whole row.
    pub fn set_flow(&mut self, index: usize, flow: TrafficFlow) -> Option<Vec<TrafficFlow>> {
        self.edit(index, |existing| *existing = flow)
    }

    pub fn remove(&mut self, index: usize) -> Option<Vec<TrafficFlow>> {
        if index >= self.flows.len() {
            return None;
        }
        self.flows.remove(index);
        Some(self.flows.clone())
    }

    fn edit(&mut self, index: usize, f: impl FnOnce(&mut TrafficFlow)) -> Option<Vec<TrafficFlow>> {
        f(self.flows.get_mut(index)?);
        Some(self.flows.clone())
    }
}

/// A from/to pair of distinct roads meeting at an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub from: RoadId,
    pub to: RoadId,
}

/// Editor for an intersection's turning matrix.
#[derive(Debug, Clone)]
pub struct TurningMatrixEditor {
    intersection: IntersectionId,
    connected: Vec<RoadId>,
    matrix: TurningMatrix,
}

impl TurningMatrixEditor {
    pub fn open(intersection: &Intersection) -> Self {
        Self {
            intersection: intersection.id(),
            connected: intersection.connected_roads().to_vec(),
            matrix: intersection.traffic_matrix.clone(),
        }
    }

    pub fn intersection(&self) -> IntersectionId {
        self.intersection
    }

    /// Roads forming the rows and columns of the table.
    pub fn roads(&self) -> &[RoadId] {
        &self.connected
    }

    /// Editable movements, row by row.
    pub fn movements(&self) -> impl Iterator<Item = Movement> + '_ {
        self.connected.iter().flat_map(move |&from| {
            self.connected
                .iter()
                .filter(move |&&to| to != from)
                .map(move |&to| Movement { from, to })
        })
    }

    pub fn is_editable(&self, from: RoadId, to: RoadId) -> bool {
        from != to && self.connected.contains(&from) && self.connected.contains(&to)
    }

    /// Stored volume for a movement and class, 0 when absent.
    pub fn volume(&self, from: RoadId, to: RoadId, vehicle_type: VehicleType) -> u32 {
        self.matrix
            .get(&from)
            .and_then(|row| row.get(&to))
            .and_then(|volumes| volumes.get(&vehicle_type))
            .copied()
            .unwrap_or(0)
    }

    /// All classes for one movement, in display order.
    pub fn volumes(&self, from: RoadId, to: RoadId) -> [(VehicleType, u32); 3] {
        VehicleType::ALL.map(|vehicle_type| (vehicle_type, self.volume(from, to, vehicle_type)))
    }

    /// Set one cell. Returns `None` when the pair is not an editable movement.
    pub fn set_volume(
        &mut self,
        from: RoadId,
        to: RoadId,
        vehicle_type: VehicleType,
        volume: u32,
    ) -> Option<TurningMatrix> {
        if !self.is_editable(from, to) {
            return None;
        }
        self.matrix
            .entry(from)
            .or_default()
            .entry(to)
            .or_default()
            .insert(vehicle_type, volume);
        Some(self.matrix.clone())
    }

    pub fn set_volume_text(
        &mut self,
        from: RoadId,
        to: RoadId,
        vehicle_type: VehicleType,
        text: &str,
    ) -> Option<TurningMatrix> {
        self.set_volume(from, to, vehicle_type, parse_volume(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RoadNetwork;

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume("50"), 50);
        assert_eq!(parse_volume("  12 vph"), 12);
        assert_eq!(parse_volume("3.7"), 3);
        assert_eq!(parse_volume("+8"), 8);
        assert_eq!(parse_volume(""), 0);
        assert_eq!(parse_volume("abc"), 0);
        assert_eq!(parse_volume("-5"), 0);
        assert_eq!(parse_volume("99999999999"), u32::MAX);
    }

    fn road_network() -> (RoadNetwork, RoadId) {
        let (network, a) = RoadNetwork::new().create_intersection(0.0, 0.0);
        let (network, b) = network.create_intersection(50.0, 0.0);
        let (network, road) = network.create_road_segment(a, b, "Main St").unwrap();
        (network, road)
    }

    #[test]
    fn test_add_draft_flow() {
        let (network, road) = road_network();
        let mut editor = FlowListEditor::open(network.road_segment(road).unwrap());

        editor.draft.volume = parse_volume("50");
        let flows = editor.add_draft();

        assert_eq!(flows, vec![TrafficFlow::new(VehicleType::LV, Direction::Through, 50)]);
        assert_eq!(editor.draft, TrafficFlow::default());
    }

    #[test]
    fn test_edit_and_remove_rows() {
        let (network, road) = road_network();
        let mut editor = FlowListEditor::open(network.road_segment(road).unwrap());
        editor.add_draft();
        editor.add_draft();

        let flows = editor.set_vehicle_type(1, VehicleType::Bus).unwrap();
        assert_eq!(flows[1].vehicle_type, VehicleType::Bus);
        let flows = editor.set_direction(0, Direction::Right).unwrap();
        assert_eq!(flows[0].direction, Direction::Right);
        let flows = editor.set_volume_text(0, "oops").unwrap();
        assert_eq!(flows[0].volume, 0);

        assert!(editor.set_volume(5, 1).is_none());
        assert!(editor.remove(5).is_none());

        let flows = editor.remove(0).unwrap();
        assert_eq!(flows, vec![TrafficFlow::new(VehicleType::Bus, Direction::Through, 0)]);
    }

    #[test]
    fn test_duplicate_flows_are_kept() {
        let (network, road) = road_network();
        let mut editor = FlowListEditor::open(network.road_segment(road).unwrap());
        editor.add_draft();
        let flows = editor.add_draft();
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0], flows[1]);
    }

    fn tee_junction() -> (RoadNetwork, IntersectionId, [RoadId; 3]) {
        let (network, hub) = RoadNetwork::new().create_intersection(0.0, 0.0);
        let (network, w) = network.create_intersection(-100.0, 0.0);
        let (network, e) = network.create_intersection(100.0, 0.0);
        let (network, s) = network.create_intersection(0.0, 100.0);
        let (network, r1) = network.create_road_segment(w, hub, "West").unwrap();
        let (network, r2) = network.create_road_segment(hub, e, "East").unwrap();
        let (network, r3) = network.create_road_segment(s, hub, "South").unwrap();
        (network, hub, [r1, r2, r3])
    }

    #[test]
    fn test_movements_skip_u_turns() {
        let (network, hub, [r1, r2, r3]) = tee_junction();
        let editor = TurningMatrixEditor::open(network.intersection(hub).unwrap());

        let movements: Vec<_> = editor.movements().map(|m| (m.from, m.to)).collect();
        assert_eq!(
            movements,
            vec![(r1, r2), (r1, r3), (r2, r1), (r2, r3), (r3, r1), (r3, r2)]
        );
    }

    #[test]
    fn test_set_volume_defaults_other_classes() {
        let (network, hub, [r1, r2, _]) = tee_junction();
        let mut editor = TurningMatrixEditor::open(network.intersection(hub).unwrap());

        let matrix = editor.set_volume(r1, r2, VehicleType::Bus, 5).unwrap();
        assert_eq!(matrix[&r1][&r2].len(), 1);
        assert_eq!(matrix[&r1][&r2][&VehicleType::Bus], 5);
        assert_eq!(
            editor.volumes(r1, r2),
            [(VehicleType::Bus, 5), (VehicleType::HV, 0), (VehicleType::LV, 0)]
        );
        assert_eq!(editor.volume(r2, r1, VehicleType::Bus), 0);
    }

    #[test]
    fn test_set_volume_rejects_non_movements() {
        let (network, hub, [r1, _, _]) = tee_junction();
        let mut editor = TurningMatrixEditor::open(network.intersection(hub).unwrap());

        assert!(editor.set_volume(r1, r1, VehicleType::LV, 3).is_none());
        assert!(editor.set_volume(r1, uuid::Uuid::new_v4(), VehicleType::LV, 3).is_none());
        assert!(editor.set_volume_text(r1, r1, VehicleType::LV, "3").is_none());
    }
}
