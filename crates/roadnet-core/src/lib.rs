//! RoadNet Core Library
//!
//! Platform-agnostic core of the road network diagram editor: the network
//! graph and its snapshot edits, the pan/zoom viewport, the road-drawing
//! interaction, property editors and JSON export.

pub mod config;
pub mod editors;
pub mod export;
pub mod input;
pub mod interaction;
pub mod network;
pub mod session;
pub mod viewport;

pub use config::{ConfigError, SessionConfig};
pub use editors::{FlowListEditor, Movement, TurningMatrixEditor, parse_volume};
pub use export::{EXPORT_FILE_NAME, ExportError, ExportResult, NetworkDocument};
pub use input::{DragTracker, Gesture, PointerEvent};
pub use interaction::{ClickOutcome, Interaction, InteractionState};
pub use network::{
    CanvasTarget, ClassVolumes, Direction, ElementId, ElementKind, Intersection, IntersectionId,
    NetworkError, NetworkResult, ParseKindError, RoadId, RoadNetwork, RoadSegment, StaleTurnPolicy,
    TrafficFlow, TurningMatrix, VehicleType,
};
pub use session::{Prompter, Session, SnapshotObserver};
pub use viewport::{Viewport, ViewportConfig, ZoomDirection};
