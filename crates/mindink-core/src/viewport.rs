//! Viewport transform between world (canvas) and screen coordinates.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Pan/zoom view transform owned by the rendering collaborator but consumed
/// by the interaction engine to map pointer coordinates into world space.
///
/// Screen = world * zoom + offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// Translation in screen pixels.
    pub offset: Vec2,
    /// Scale factor (1.0 = 100%).
    pub zoom: f64,
    /// Minimum allowed zoom.
    pub min_zoom: f64,
    /// Maximum allowed zoom.
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 8.0,
        }
    }
}

impl Viewport {
    /// Create a viewport with default pan/zoom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Affine transform from world to screen coordinates, for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.x) / self.zoom,
            (screen.y - self.offset.y) / self.zoom,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.zoom + self.offset.x,
            world.y * self.zoom + self.offset.y,
        )
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.screen_to_world(screen);
        self.zoom = new_zoom;
        let moved = self.world_to_screen(anchor);
        self.offset += screen - moved;
    }

    /// Reset pan and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Pan/zoom so `bounds` fills the screen of the given size with padding.
    pub fn fit_to_bounds(&mut self, bounds: Rect, screen: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let usable = Size::new(
            (screen.width - padding * 2.0).max(1.0),
            (screen.height - padding * 2.0).max(1.0),
        );
        let scale = (usable.width / bounds.width()).min(usable.height / bounds.height());
        self.zoom = scale.clamp(self.min_zoom, self.max_zoom);

        let center = bounds.center();
        self.offset = Vec2::new(
            screen.width / 2.0 - center.x * self.zoom,
            screen.height / 2.0 - center.y * self.zoom,
        );
    }
}
