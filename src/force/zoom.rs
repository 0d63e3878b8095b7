use serde::Serialize;

use crate::config::ForceLayoutConfig;
use crate::layout::Point;

/// `translate(x, y) scale(k)` from graph to screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomTransform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            k: 1.0,
        }
    }
}

impl ZoomTransform {
    pub fn apply(&self, point: Point) -> Point {
        Point::new(point.x * self.k + self.x, point.y * self.k + self.y)
    }

    pub fn invert(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
    }

    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

#[derive(Debug, Clone)]
pub struct ZoomController {
    transform: ZoomTransform,
    width: f32,
    height: f32,
    min_scale: f32,
    max_scale: f32,
    zoom_in_factor: f32,
    zoom_out_factor: f32,
    initial_scale: f32,
}

impl ZoomController {
    pub fn new(width: f32, height: f32, config: &ForceLayoutConfig) -> Self {
        let mut controller = Self {
            transform: ZoomTransform::default(),
            width,
            height,
            min_scale: config.zoom_min,
            max_scale: config.zoom_max.max(config.zoom_min),
            zoom_in_factor: config.zoom_in_factor,
            zoom_out_factor: config.zoom_out_factor,
            initial_scale: config.initial_scale,
        };
        controller.reset();
        controller
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Origin in the middle of the viewport at the initial scale.
    pub fn reset(&mut self) {
        self.transform = ZoomTransform {
            x: self.width / 2.0,
            y: self.height / 2.0,
            k: self.clamp_scale(self.initial_scale),
        };
    }

    pub fn zoom_in(&mut self) {
        self.scale_by(self.zoom_in_factor);
    }

    pub fn zoom_out(&mut self) {
        self.scale_by(self.zoom_out_factor);
    }

    /// Scales around the viewport center.
    pub fn scale_by(&mut self, factor: f32) {
        let center = Point::new(self.width / 2.0, self.height / 2.0);
        self.scale_at(center, factor);
    }

    /// Scales keeping the graph point under `screen` fixed.
    pub fn scale_at(&mut self, screen: Point, factor: f32) {
        let anchor = self.transform.invert(screen);
        let k = self.clamp_scale(self.transform.k * factor);
        self.transform = ZoomTransform {
            x: screen.x - anchor.x * k,
            y: screen.y - anchor.y * k,
            k,
        };
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.transform.x += dx;
        self.transform.y += dy;
    }

    /// Centers a graph point in the viewport, keeping the current scale.
    pub fn focus(&mut self, point: Point) {
        let k = self.transform.k;
        self.transform.x = self.width / 2.0 - point.x * k;
        self.transform.y = self.height / 2.0 - point.y * k;
    }

    fn clamp_scale(&self, k: f32) -> f32 {
        k.clamp(self.min_scale, self.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ZoomController {
        ZoomController::new(1000.0, 600.0, &ForceLayoutConfig::default())
    }

    #[test]
    fn reset_centers_origin_at_initial_scale() {
        let zoom = controller();
        assert_eq!(
            zoom.transform(),
            ZoomTransform {
                x: 500.0,
                y: 300.0,
                k: 0.85
            }
        );
        assert_eq!(zoom.transform().apply(Point::default()), Point::new(500.0, 300.0));
    }

    #[test]
    fn scale_is_clamped_to_extent() {
        let mut zoom = controller();
        for _ in 0..20 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.transform().k, 4.0);
        for _ in 0..40 {
            zoom.zoom_out();
        }
        assert!((zoom.transform().k - 0.2).abs() < 1e-6);
    }

    #[test]
    fn zoom_keeps_viewport_center_fixed() {
        let mut zoom = controller();
        zoom.pan(40.0, -25.0);
        let center = Point::new(500.0, 300.0);
        let before = zoom.transform().invert(center);
        zoom.zoom_in();
        let after = zoom.transform().invert(center);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn focus_recenters_without_rescaling() {
        let mut zoom = controller();
        zoom.zoom_in();
        let k = zoom.transform().k;
        zoom.focus(Point::new(120.0, -80.0));
        assert_eq!(zoom.transform().k, k);
        let on_screen = zoom.transform().apply(Point::new(120.0, -80.0));
        assert!((on_screen.x - 500.0).abs() < 1e-3);
        assert!((on_screen.y - 300.0).abs() < 1e-3);
    }
}
