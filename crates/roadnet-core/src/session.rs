//! Editing session: the single owner of the current network snapshot.
//!
//! Every gesture enters through a [`Session`]. It maps screen input through
//! the [`Viewport`], lets the [`Interaction`] machine interpret it, applies
//! the resulting edit, and publishes the new snapshot to observers before
//! returning. Readers therefore only ever see whole snapshots.

use crate::config::SessionConfig;
use crate::editors::{FlowListEditor, TurningMatrixEditor};
use crate::export::{self, ExportResult};
use crate::input::{DragTracker, Gesture, PointerEvent};
use crate::interaction::{ClickOutcome, Interaction};
use crate::network::{
    CanvasTarget, ElementId, ElementKind, IntersectionId, RoadId, RoadNetwork, TrafficFlow,
    TurningMatrix,
};
use crate::viewport::{Viewport, ZoomDirection};
use kurbo::Point;
use std::path::{Path, PathBuf};

/// Prompt shown when a road connection is completed.
pub const ROAD_NAME_PROMPT: &str = "Enter road name:";

/// Confirmation for deleting an intersection.
pub const DELETE_INTERSECTION_PROMPT: &str =
    "Are you sure you want to delete this intersection? This will also remove all connected roads.";

/// Confirmation for deleting a road.
pub const DELETE_ROAD_PROMPT: &str = "Are you sure you want to delete this road?";

/// Synchronous user prompts needed by some gestures.
pub trait Prompter {
    /// Ask for a road name. `None` means the prompt was cancelled.
    fn road_name(&mut self, message: &str) -> Option<String>;

    /// Ask the user to confirm a destructive action.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Read-only consumer of committed snapshots (list views, canvases, editors).
pub trait SnapshotObserver {
    fn snapshot_changed(&mut self, network: &RoadNetwork);
}

/// An interactive editing session.
pub struct Session {
    network: RoadNetwork,
    /// View transform for the canvas.
    pub viewport: Viewport,
    interaction: Interaction,
    drag: DragTracker,
    config: SessionConfig,
    observers: Vec<Box<dyn SnapshotObserver>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with an empty network and default settings.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            network: RoadNetwork::with_policy(config.stale_turns),
            viewport: Viewport::with_config(config.viewport),
            interaction: Interaction::new(),
            drag: DragTracker::new(),
            config,
            observers: Vec::new(),
        }
    }

    /// The current snapshot.
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// A handle to the current snapshot that stays valid after later edits.
    pub fn snapshot(&self) -> RoadNetwork {
        self.network.clone()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.interaction.selection()
    }

    /// Kind of the selected element in the current snapshot.
    pub fn selection_kind(&self) -> Option<ElementKind> {
        self.selection()
            .and_then(|id| self.network.element_kind(id))
    }

    pub fn add_observer(&mut self, observer: Box<dyn SnapshotObserver>) {
        self.observers.push(observer);
    }

    /// Make `next` current and tell observers, unless nothing changed.
    fn commit(&mut self, next: RoadNetwork) {
        if next.ptr_eq(&self.network) {
            return;
        }
        self.network = next;
        for observer in &mut self.observers {
            observer.snapshot_changed(&self.network);
        }
    }

    /// Process a raw pointer event in screen coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent, prompter: &mut dyn Prompter) {
        match self.drag.handle(event, self.viewport.offset) {
            Gesture::Click(position) => {
                self.click_at(position, prompter);
            }
            Gesture::Drag { offset } => {
                self.viewport.pan_to(offset);
            }
            Gesture::Wheel { position, delta_y } => {
                self.viewport.zoom_wheel(position, delta_y);
            }
            Gesture::None => {}
        }
    }

    /// Resolve what lies under a screen point.
    pub fn target_at(&self, screen_point: Point) -> CanvasTarget {
        let diagram_point = self.viewport.screen_to_diagram(screen_point);
        let tolerance = self.config.hit_tolerance / self.viewport.scale;
        self.network.element_at(diagram_point, tolerance)
    }

    /// Click at a screen point.
    pub fn click_at(&mut self, screen_point: Point, prompter: &mut dyn Prompter) -> ClickOutcome {
        let target = self.target_at(screen_point);
        self.click_target(target, prompter)
    }

    /// Click on an already resolved diagram target.
    pub fn click_target(&mut self, target: CanvasTarget, prompter: &mut dyn Prompter) -> ClickOutcome {
        let outcome = self.interaction.click(target, self.viewport.panning);
        match outcome {
            ClickOutcome::Nothing => {}
            ClickOutcome::PlaceIntersection(point) => {
                let (next, _) = self.network.create_intersection(point.x, point.y);
                self.commit(next);
            }
            ClickOutcome::ConnectRoads { from, to } => self.connect_roads(from, to, prompter),
        }
        outcome
    }

    fn connect_roads(&mut self, from: IntersectionId, to: IntersectionId, prompter: &mut dyn Prompter) {
        let name = prompter
            .road_name(ROAD_NAME_PROMPT)
            .filter(|name| !name.is_empty());
        let Some(name) = name else {
            log::debug!("Road naming cancelled");
            return;
        };

        match self.network.create_road_segment(from, to, name) {
            Ok((next, _)) => self.commit(next),
            Err(e) => log::warn!("Could not create road: {}", e),
        }
    }

    /// Delete the selected element after confirmation.
    ///
    /// Returns true if the snapshot changed. Declining keeps both the
    /// snapshot and the selection.
    pub fn delete_selected(&mut self, prompter: &mut dyn Prompter) -> bool {
        let Some(id) = self.interaction.delete_target() else {
            return false;
        };

        let next = match self.network.element_kind(id) {
            Some(ElementKind::Road) => {
                if !prompter.confirm(DELETE_ROAD_PROMPT) {
                    return false;
                }
                self.network.delete_road_segment(id)
            }
            Some(ElementKind::Intersection) => {
                if !prompter.confirm(DELETE_INTERSECTION_PROMPT) {
                    return false;
                }
                self.network.delete_intersection(id)
            }
            None => {
                log::debug!("Selected element {} no longer exists", id);
                self.interaction.finish_delete();
                return false;
            }
        };

        self.commit(next);
        self.interaction.finish_delete();
        true
    }

    /// Abandon an in-progress road and clear selection.
    pub fn cancel(&mut self) {
        self.interaction.cancel();
    }

    /// Replace a road's flows (flow editor entry point).
    pub fn update_road_flows(&mut self, road: RoadId, flows: Vec<TrafficFlow>) {
        let next = self.network.update_road_flows(road, flows);
        self.commit(next);
    }

    /// Replace an intersection's turning matrix (matrix editor entry point).
    pub fn update_intersection_matrix(&mut self, intersection: IntersectionId, matrix: TurningMatrix) {
        let next = self.network.update_intersection_matrix(intersection, matrix);
        self.commit(next);
    }

    /// Open a flow editor on a road of the current snapshot.
    pub fn flow_editor(&self, road: RoadId) -> Option<FlowListEditor> {
        self.network.road_segment(road).map(FlowListEditor::open)
    }

    /// Open a turning matrix editor on an intersection of the current snapshot.
    pub fn matrix_editor(&self, intersection: IntersectionId) -> Option<TurningMatrixEditor> {
        self.network
            .intersection(intersection)
            .map(TurningMatrixEditor::open)
    }

    /// Zoom in or out by the button step.
    pub fn zoom_step(&mut self, direction: ZoomDirection) {
        self.viewport.zoom_step(direction);
    }

    /// Toggle panning mode. Returns the new state.
    pub fn toggle_panning(&mut self) -> bool {
        self.viewport.toggle_panning()
    }

    /// Export the current snapshot into `dir`.
    pub fn export_to_dir(&self, dir: &Path) -> ExportResult<PathBuf> {
        export::export_to_dir(&self.network, dir)
    }
}
