//! Pointer input in screen coordinates.

use kurbo::{Point, Vec2};

/// Movement (in screen pixels) below which a press/release pair is a click.
pub const CLICK_SLOP: f64 = 4.0;

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    Wheel { position: Point, delta_y: f64 },
}

/// What a pointer event amounted to once the gesture is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Press and release without meaningful movement.
    Click(Point),
    /// Pointer moved while pressed; `offset` is the pan target computed from
    /// the offset at press time.
    Drag { offset: Vec2 },
    /// Wheel rotation at a pointer position.
    Wheel { position: Point, delta_y: f64 },
    None,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    position: Point,
    offset: Vec2,
    moved: bool,
}

/// Tracks a press across moves to tell clicks from drags.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    press: Option<Press>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed an event. `offset` is the viewport offset at the time of the event.
    pub fn handle(&mut self, event: PointerEvent, offset: Vec2) -> Gesture {
        match event {
            PointerEvent::Down { position } => {
                self.press = Some(Press {
                    position,
                    offset,
                    moved: false,
                });
                Gesture::None
            }
            PointerEvent::Move { position } => match &mut self.press {
                Some(press) => {
                    let delta = position - press.position;
                    if !press.moved && delta.hypot() < CLICK_SLOP {
                        return Gesture::None;
                    }
                    press.moved = true;
                    Gesture::Drag {
                        offset: press.offset + delta,
                    }
                }
                None => Gesture::None,
            },
            PointerEvent::Up { position } => match self.press.take() {
                Some(press) if !press.moved && (position - press.position).hypot() < CLICK_SLOP => {
                    Gesture::Click(position)
                }
                _ => Gesture::None,
            },
            PointerEvent::Wheel { position, delta_y } => Gesture::Wheel { position, delta_y },
        }
    }
}
