//! Text rendering of the network lists and the property panels.

use roadnet_core::{
    ElementKind, Intersection, IntersectionId, RoadId, RoadNetwork, RoadSegment, Session,
    TurningMatrixEditor,
};
use std::io::{self, Write};

/// Short label for an intersection: its 1-based position in the list.
pub fn intersection_label(network: &RoadNetwork, intersection: &Intersection) -> String {
    network
        .intersections()
        .position(|i| i.id() == intersection.id())
        .map(|n| format!("I{}", n + 1))
        .unwrap_or_else(|| "I?".to_string())
}

fn road_name(network: &RoadNetwork, road: RoadId) -> &str {
    network
        .road_segment(road)
        .map(|r| r.name.as_str())
        .unwrap_or("(deleted road)")
}

/// Write both element lists with their key properties.
pub fn write_lists(out: &mut impl Write, network: &RoadNetwork) -> io::Result<()> {
    writeln!(out, "Intersections ({})", network.intersection_count())?;
    for intersection in network.intersections() {
        let roads: Vec<&str> = intersection
            .connected_roads()
            .iter()
            .map(|&road| road_name(network, road))
            .collect();
        writeln!(
            out,
            "  {:4} ({:.1}, {:.1})  roads: {}",
            intersection_label(network, intersection),
            intersection.x,
            intersection.y,
            if roads.is_empty() { "-".to_string() } else { roads.join(", ") }
        )?;
    }

    writeln!(out, "Roads ({})", network.road_count())?;
    for road in network.road_segments() {
        writeln!(
            out,
            "  {}  {} -> {}  flows: {}",
            road.name,
            endpoint_label(network, road.start_intersection_id()),
            endpoint_label(network, road.end_intersection_id()),
            road.traffic_flows.len()
        )?;
    }
    Ok(())
}

fn endpoint_label(network: &RoadNetwork, id: IntersectionId) -> String {
    network
        .intersection(id)
        .map(|i| intersection_label(network, i))
        .unwrap_or_else(|| "?".to_string())
}

/// Write the property panel for whatever is selected.
pub fn write_selection(out: &mut impl Write, session: &Session) -> io::Result<()> {
    let network = session.network();
    let Some(id) = session.selection() else {
        return writeln!(out, "Nothing selected");
    };

    match network.element_kind(id) {
        Some(ElementKind::Road) => {
            if let Some(road) = network.road_segment(id) {
                write_road(out, road)?;
            }
        }
        Some(ElementKind::Intersection) => {
            if let Some(intersection) = network.intersection(id) {
                write_intersection(out, network, intersection)?;
            }
        }
        None => writeln!(out, "Selection no longer exists")?,
    }
    Ok(())
}

fn write_road(out: &mut impl Write, road: &RoadSegment) -> io::Result<()> {
    writeln!(out, "Road: {}", road.name)?;
    if road.traffic_flows.is_empty() {
        return writeln!(out, "  No traffic flows");
    }
    writeln!(out, "  {:>3}  {:14} {:8} {:>7}", "#", "Vehicle", "Dir", "Volume")?;
    for (row, flow) in road.traffic_flows.iter().enumerate() {
        writeln!(
            out,
            "  {:>3}  {:14} {:8} {:>7}",
            row + 1,
            flow.vehicle_type.label(),
            flow.direction.to_string(),
            flow.volume
        )?;
    }
    Ok(())
}

fn write_intersection(
    out: &mut impl Write,
    network: &RoadNetwork,
    intersection: &Intersection,
) -> io::Result<()> {
    writeln!(
        out,
        "Intersection {} at ({:.1}, {:.1})",
        intersection_label(network, intersection),
        intersection.x,
        intersection.y
    )?;

    let editor = TurningMatrixEditor::open(intersection);
    for (n, &road) in editor.roads().iter().enumerate() {
        writeln!(out, "  {}. {}", n + 1, road_name(network, road))?;
    }

    let mut movements = editor.movements().peekable();
    if movements.peek().is_none() {
        return writeln!(out, "  No turning movements");
    }
    writeln!(out, "  Turning movements:")?;
    for movement in movements {
        let volumes: Vec<String> = editor
            .volumes(movement.from, movement.to)
            .iter()
            .map(|(vehicle_type, volume)| format!("{}={}", vehicle_type, volume))
            .collect();
        writeln!(
            out,
            "    {} -> {}: {}",
            road_name(network, movement.from),
            road_name(network, movement.to),
            volumes.join(" ")
        )?;
    }
    Ok(())
}
