//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom bounds and step factors for a [`Viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale factor applied per mouse wheel notch.
    pub wheel_factor: f64,
    /// Scale factor applied by the zoom in/out controls.
    pub step_factor: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 5.0,
            wheel_factor: 1.1,
            step_factor: 1.2,
        }
    }
}

impl ViewportConfig {
    /// Replace unusable values with their defaults.
    ///
    /// Bounds must satisfy `0 < min_scale <= max_scale`; step factors must be
    /// finite and above 1.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let (min_scale, max_scale) = if self.min_scale > 0.0 && self.min_scale <= self.max_scale {
            (self.min_scale, self.max_scale)
        } else {
            log::warn!(
                "Ignoring invalid zoom bounds [{}, {}]",
                self.min_scale,
                self.max_scale
            );
            (defaults.min_scale, defaults.max_scale)
        };
        let factor = |value: f64, default: f64| {
            if value.is_finite() && value > 1.0 {
                value
            } else {
                log::warn!("Ignoring invalid zoom factor {}", value);
                default
            }
        };

        Self {
            min_scale,
            max_scale,
            wheel_factor: factor(self.wheel_factor, defaults.wheel_factor),
            step_factor: factor(self.step_factor, defaults.step_factor),
        }
    }
}

/// Zoom direction for wheel and button zooming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Direction for a wheel delta. Scrolling up (negative delta) zooms in.
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y < 0.0 {
            ZoomDirection::In
        } else {
            ZoomDirection::Out
        }
    }

    fn apply(self, scale: f64, factor: f64) -> f64 {
        match self {
            ZoomDirection::In => scale * factor,
            ZoomDirection::Out => scale / factor,
        }
    }
}

/// Viewport manages the mapping between screen space and diagram space.
///
/// A screen point `p` shows the diagram point `(p - offset) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Current translation offset in screen pixels.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub scale: f64,
    /// Whether drag gestures pan the view.
    pub panning: bool,
    config: ViewportConfig,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::with_config(ViewportConfig::default())
    }
}

impl Viewport {
    /// Create a viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport; invalid settings fall back to defaults.
    pub fn with_config(config: ViewportConfig) -> Self {
        let config = config.sanitized();
        Self {
            offset: Vec2::ZERO,
            scale: 1.0_f64.clamp(config.min_scale, config.max_scale),
            panning: false,
            config,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Get the affine transform for rendering (diagram to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling (screen to diagram).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to diagram coordinates.
    pub fn screen_to_diagram(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a diagram point to screen coordinates.
    pub fn diagram_to_screen(&self, diagram_point: Point) -> Point {
        self.transform() * diagram_point
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    /// Zoom one wheel notch, keeping the diagram point under `pointer` fixed.
    pub fn zoom_at(&mut self, pointer: Point, direction: ZoomDirection) {
        let old_scale = self.scale;
        let new_scale = self.clamp_scale(direction.apply(old_scale, self.config.wheel_factor));

        // Diagram point under the pointer before the change
        let anchor = (pointer.to_vec2() - self.offset) / old_scale;

        self.scale = new_scale;
        self.offset = pointer.to_vec2() - anchor * new_scale;
    }

    /// Zoom in response to a wheel event with the given vertical delta.
    pub fn zoom_wheel(&mut self, pointer: Point, delta_y: f64) {
        self.zoom_at(pointer, ZoomDirection::from_wheel_delta(delta_y));
    }

    /// Zoom by the button step factor without moving the offset.
    pub fn zoom_step(&mut self, direction: ZoomDirection) {
        self.scale = self.clamp_scale(direction.apply(self.scale, self.config.step_factor));
    }

    /// Move the view to a new offset. Ignored unless panning is active.
    pub fn pan_to(&mut self, offset: Vec2) -> bool {
        if !self.panning {
            return false;
        }
        self.offset = offset;
        true
    }

    pub fn toggle_panning(&mut self) -> bool {
        self.panning = !self.panning;
        self.panning
    }

    /// Reset to the identity view. Panning mode is left as is.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = self.clamp_scale(1.0);
    }

    /// Zoom as a percentage for display.
    pub fn zoom_percent(&self) -> f64 {
        self.scale * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9, "{a:?} != {b:?}");
        assert!((a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert_eq!(viewport.offset, Vec2::ZERO);
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
        assert!(!viewport.panning);
    }

    #[test]
    fn test_screen_to_diagram_identity() {
        let viewport = Viewport::new();
        let screen = Point::new(100.0, 200.0);
        assert_close(viewport.screen_to_diagram(screen), screen);
    }

    #[test]
    fn test_screen_to_diagram_with_offset_and_scale() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(50.0, 100.0);
        viewport.scale = 2.0;

        let diagram = viewport.screen_to_diagram(Point::new(150.0, 300.0));
        assert_close(diagram, Point::new(50.0, 100.0));
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(30.0, -20.0);
        viewport.scale = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = viewport.diagram_to_screen(viewport.screen_to_diagram(original));
        assert_close(back, original);
    }

    #[test]
    fn test_zoom_at_keeps_pointer_anchor() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(40.0, -15.0);
        viewport.scale = 1.3;
        let pointer = Point::new(321.0, 87.0);

        let before = viewport.screen_to_diagram(pointer);
        viewport.zoom_at(pointer, ZoomDirection::In);
        assert!((viewport.scale - 1.3 * 1.1).abs() < 1e-12);
        assert_close(viewport.screen_to_diagram(pointer), before);

        viewport.zoom_at(pointer, ZoomDirection::Out);
        assert!((viewport.scale - 1.3).abs() < 1e-12);
        assert_close(viewport.screen_to_diagram(pointer), before);
    }

    #[test]
    fn test_wheel_direction() {
        let mut viewport = Viewport::new();
        viewport.zoom_wheel(Point::ZERO, -120.0);
        assert!(viewport.scale > 1.0);

        viewport.reset();
        viewport.zoom_wheel(Point::ZERO, 120.0);
        assert!(viewport.scale < 1.0);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::new();
        for _ in 0..100 {
            viewport.zoom_at(Point::new(10.0, 10.0), ZoomDirection::Out);
        }
        assert!((viewport.scale - 0.1).abs() < f64::EPSILON);

        for _ in 0..100 {
            viewport.zoom_step(ZoomDirection::In);
        }
        assert!((viewport.scale - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamped_zoom_keeps_anchor() {
        let mut viewport = Viewport::new();
        viewport.scale = 5.0;
        viewport.offset = Vec2::new(12.0, 34.0);
        let pointer = Point::new(200.0, 100.0);

        let before = viewport.screen_to_diagram(pointer);
        viewport.zoom_at(pointer, ZoomDirection::In);
        assert!((viewport.scale - 5.0).abs() < f64::EPSILON);
        assert_close(viewport.offset.to_point(), Point::new(12.0, 34.0));
        assert_close(viewport.screen_to_diagram(pointer), before);
    }

    #[test]
    fn test_zoom_step_leaves_offset() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(7.0, 9.0);
        viewport.zoom_step(ZoomDirection::In);

        assert!((viewport.scale - 1.2).abs() < 1e-12);
        assert_eq!(viewport.offset, Vec2::new(7.0, 9.0));
    }

    #[test]
    fn test_inverted_bounds_fall_back_to_defaults() {
        let config = ViewportConfig {
            min_scale: 2.0,
            max_scale: 1.0,
            ..ViewportConfig::default()
        };
        let mut viewport = Viewport::with_config(config);
        assert_eq!(*viewport.config(), ViewportConfig::default());
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);

        viewport.zoom_step(ZoomDirection::In);
        assert!((viewport.scale - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_sanitized_keeps_valid_values() {
        let config = ViewportConfig {
            min_scale: 0.5,
            max_scale: 2.0,
            wheel_factor: 0.0,
            step_factor: f64::NAN,
        };
        let sanitized = config.sanitized();
        assert!((sanitized.min_scale - 0.5).abs() < f64::EPSILON);
        assert!((sanitized.max_scale - 2.0).abs() < f64::EPSILON);
        assert!((sanitized.wheel_factor - 1.1).abs() < f64::EPSILON);
        assert!((sanitized.step_factor - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan_requires_panning_mode() {
        let mut viewport = Viewport::new();
        assert!(!viewport.pan_to(Vec2::new(10.0, 20.0)));
        assert_eq!(viewport.offset, Vec2::ZERO);

        viewport.toggle_panning();
        assert!(viewport.pan_to(Vec2::new(10.0, 20.0)));
        assert_eq!(viewport.offset, Vec2::new(10.0, 20.0));
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
    }
}
