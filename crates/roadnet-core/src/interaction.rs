//! Road drawing interaction state machine.
//!
//! Clicks arrive already resolved to a [`CanvasTarget`] in diagram space. The
//! machine decides what each click means and reports it as a
//! [`ClickOutcome`]; the session carries out any graph edit.

use crate::network::{CanvasTarget, ElementId, IntersectionId};
use kurbo::Point;

/// State of the road drawing gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Waiting for a gesture.
    #[default]
    Idle,
    /// A road has been started at `from` and waits for its second end.
    DrawingRoad { from: IntersectionId },
}

/// What a click asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Nothing to edit; state and selection may still have changed.
    Nothing,
    /// Place a new intersection at a diagram point.
    PlaceIntersection(Point),
    /// Ask for a name and connect two distinct intersections.
    ConnectRoads {
        from: IntersectionId,
        to: IntersectionId,
    },
}

/// Interaction state plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: InteractionState,
    selection: Option<ElementId>,
}

impl Interaction {
    /// Create an idle interaction with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    /// Check if a road is being drawn.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, InteractionState::DrawingRoad { .. })
    }

    /// Interpret a click.
    ///
    /// While `panning`, clicks on empty canvas do nothing.
    pub fn click(&mut self, target: CanvasTarget, panning: bool) -> ClickOutcome {
        match (target, self.state) {
            (CanvasTarget::Background(_), _) if panning => ClickOutcome::Nothing,
            (CanvasTarget::Background(point), _) => {
                self.reset();
                ClickOutcome::PlaceIntersection(point)
            }
            (CanvasTarget::Intersection(id), InteractionState::Idle) => {
                self.state = InteractionState::DrawingRoad { from: id };
                self.selection = Some(id);
                ClickOutcome::Nothing
            }
            (CanvasTarget::Intersection(to), InteractionState::DrawingRoad { from }) => {
                self.reset();
                if from == to {
                    log::debug!("Road start clicked again, cancelling road");
                    ClickOutcome::Nothing
                } else {
                    ClickOutcome::ConnectRoads { from, to }
                }
            }
            (CanvasTarget::Road(id), _) => {
                // Picking a road abandons any road in progress
                self.state = InteractionState::Idle;
                self.selection = Some(id);
                ClickOutcome::Nothing
            }
        }
    }

    /// The element a delete request applies to, if any.
    pub fn delete_target(&self) -> Option<ElementId> {
        self.selection
    }

    /// Clear selection and return to idle after a delete went through.
    pub fn finish_delete(&mut self) {
        self.reset();
    }

    /// Abandon whatever is in progress.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.selection = None;
    }

    /// Instruction text for the current state.
    pub fn hint(&self) -> &'static str {
        match self.state {
            InteractionState::Idle => {
                "Click anywhere to add an intersection\nClick an intersection to start drawing a road"
            }
            InteractionState::DrawingRoad { .. } => "Click another intersection to create a road",
        }
    }
}
