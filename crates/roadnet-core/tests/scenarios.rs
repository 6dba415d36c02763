//! End-to-end editing scenarios driven through a [`Session`].

use kurbo::Point;
use std::collections::VecDeque;

use roadnet_core::session::{DELETE_INTERSECTION_PROMPT, ROAD_NAME_PROMPT};
use roadnet_core::{
    ClickOutcome, Direction, ElementKind, IntersectionId, Prompter, RoadId, Session, SessionConfig,
    StaleTurnPolicy, TrafficFlow, VehicleType, ZoomDirection,
};

/// Answers prompts from queued replies and records what was asked.
#[derive(Default)]
struct ScriptedPrompter {
    replies: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    fn replying(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn road_name(&mut self, message: &str) -> Option<String> {
        self.asked.push(message.to_string());
        self.replies.pop_front()
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.replies.pop_front().is_some_and(|r| r == "y")
    }
}

struct MainStreet {
    session: Session,
    i1: IntersectionId,
    i2: IntersectionId,
    road: RoadId,
}

fn main_street(config: SessionConfig) -> MainStreet {
    let mut session = Session::with_config(config);
    let mut prompter = ScriptedPrompter::replying(&["Main St"]);

    session.click_at(Point::new(0.0, 0.0), &mut prompter);
    session.click_at(Point::new(100.0, 0.0), &mut prompter);
    let ids: Vec<_> = session.network().intersections().map(|i| i.id()).collect();

    session.click_at(Point::new(0.0, 0.0), &mut prompter);
    let outcome = session.click_at(Point::new(100.0, 0.0), &mut prompter);
    assert_eq!(outcome, ClickOutcome::ConnectRoads { from: ids[0], to: ids[1] });
    assert_eq!(prompter.asked, vec![ROAD_NAME_PROMPT.to_string()]);

    let road = session.network().road_segments().next().unwrap().id();
    MainStreet {
        session,
        i1: ids[0],
        i2: ids[1],
        road,
    }
}

#[test]
fn connect_two_intersections() {
    let MainStreet { session, i1, i2, road } = main_street(SessionConfig::default());
    let network = session.network();

    let names: Vec<_> = network.road_segments().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Main St"]);
    let segment = network.road_segment(road).unwrap();
    assert_eq!((segment.start_intersection_id(), segment.end_intersection_id()), (i1, i2));
    assert_eq!(network.intersection(i1).unwrap().connected_roads(), &[road]);
    assert_eq!(network.intersection(i2).unwrap().connected_roads(), &[road]);
    assert!(!session.interaction().is_drawing());
    assert_eq!(session.selection(), None);
}

#[test]
fn add_flow_preserves_order() {
    let MainStreet { mut session, road, .. } = main_street(SessionConfig::default());

    let mut editor = session.flow_editor(road).unwrap();
    assert!(editor.flows().is_empty());
    editor.draft = TrafficFlow::new(VehicleType::LV, Direction::Through, 50);
    session.update_road_flows(road, editor.add_draft());

    let mut editor = session.flow_editor(road).unwrap();
    editor.draft = TrafficFlow::new(VehicleType::Bus, Direction::Left, 4);
    session.update_road_flows(road, editor.add_draft());

    let flows = &session.network().road_segment(road).unwrap().traffic_flows;
    assert_eq!(
        flows,
        &vec![
            TrafficFlow::new(VehicleType::LV, Direction::Through, 50),
            TrafficFlow::new(VehicleType::Bus, Direction::Left, 4),
        ]
    );
}

#[test]
fn turning_volume_reads_back_with_defaults() {
    let MainStreet { mut session, i2, road, .. } = main_street(SessionConfig::default());
    let mut prompter = ScriptedPrompter::replying(&["Cross St"]);
    session.click_at(Point::new(100.0, 100.0), &mut prompter);
    session.click_at(Point::new(100.0, 0.0), &mut prompter);
    session.click_at(Point::new(100.0, 100.0), &mut prompter);
    let cross = session.network().road_segments().nth(1).unwrap().id();

    let mut editor = session.matrix_editor(i2).unwrap();
    let matrix = editor.set_volume_text(road, cross, VehicleType::Bus, "5").unwrap();
    session.update_intersection_matrix(i2, matrix);

    let stored = &session.network().intersection(i2).unwrap().traffic_matrix;
    assert_eq!(stored[&road][&cross].len(), 1);
    assert_eq!(stored[&road][&cross][&VehicleType::Bus], 5);

    let editor = session.matrix_editor(i2).unwrap();
    assert_eq!(
        editor.volumes(road, cross),
        [(VehicleType::Bus, 5), (VehicleType::HV, 0), (VehicleType::LV, 0)]
    );
}

#[test]
fn delete_intersection_removes_its_roads() {
    let MainStreet { mut session, i1, i2, road } = main_street(SessionConfig::default());
    let before = session.snapshot();

    session.click_at(Point::new(0.0, 0.0), &mut ScriptedPrompter::default());
    assert_eq!(session.selection_kind(), Some(ElementKind::Intersection));

    let mut prompter = ScriptedPrompter::replying(&["y"]);
    assert!(session.delete_selected(&mut prompter));
    assert_eq!(prompter.asked, vec![DELETE_INTERSECTION_PROMPT.to_string()]);

    let network = session.network();
    assert!(network.intersection(i1).is_none());
    assert!(network.road_segments().all(|r| r.id() != road));
    assert!(!network.intersection(i2).unwrap().is_connected_to(road));

    // The earlier snapshot still holds the road
    assert!(before.road_segment(road).is_some());
    assert!(before.intersection(i2).unwrap().is_connected_to(road));
}

#[test]
fn retained_turns_survive_road_delete() {
    let config = SessionConfig {
        stale_turns: StaleTurnPolicy::Retain,
        ..SessionConfig::default()
    };
    let MainStreet { mut session, i2, road, .. } = main_street(config);
    let mut prompter = ScriptedPrompter::replying(&["Cross St"]);
    session.click_at(Point::new(100.0, 100.0), &mut prompter);
    session.click_at(Point::new(100.0, 0.0), &mut prompter);
    session.click_at(Point::new(100.0, 100.0), &mut prompter);
    let cross = session.network().road_segments().nth(1).unwrap().id();

    let mut editor = session.matrix_editor(i2).unwrap();
    let matrix = editor.set_volume(road, cross, VehicleType::HV, 9).unwrap();
    session.update_intersection_matrix(i2, matrix);

    session.click_at(Point::new(50.0, 0.0), &mut ScriptedPrompter::default());
    assert_eq!(session.selection(), Some(road));
    assert!(session.delete_selected(&mut ScriptedPrompter::replying(&["y"])));

    let hub = session.network().intersection(i2).unwrap();
    assert_eq!(hub.connected_roads(), &[cross]);
    assert_eq!(hub.traffic_matrix[&road][&cross][&VehicleType::HV], 9);
}

#[test]
fn zoomed_clicks_land_in_diagram_space() {
    let mut session = Session::new();
    session.zoom_step(ZoomDirection::In);
    session.zoom_step(ZoomDirection::In);
    assert!((session.viewport.scale - 1.44).abs() < 1e-9);

    session.click_at(Point::new(144.0, 72.0), &mut ScriptedPrompter::default());
    let placed = session.network().intersections().next().unwrap().position();
    assert!((placed.x - 100.0).abs() < 1e-9);
    assert!((placed.y - 50.0).abs() < 1e-9);
}

#[test]
fn export_writes_current_snapshot() {
    let MainStreet { session, .. } = main_street(SessionConfig::default());
    let dir = tempfile::tempdir().unwrap();

    let path = session.export_to_dir(dir.path()).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["intersections"].as_array().unwrap().len(), 2);
    assert_eq!(value["roadSegments"][0]["name"], "Main St");
}
