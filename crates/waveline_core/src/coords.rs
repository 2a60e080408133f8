// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time <-> pixel coordinate engine.
//!
//! Every time value that enters the model through an interactive gesture
//! (click-to-place, drag) goes through this engine: pixel to time, snap,
//! clamp. The zoom operation keeps the time under the cursor visually fixed,
//! which is the central correctness property here.

/// Minimum zoom, in pixels per second.
pub const MIN_ZOOM: f64 = 10.0;

/// Maximum zoom, in pixels per second.
pub const MAX_ZOOM: f64 = 200.0;

/// Multiplicative step applied per zoom input.
pub const ZOOM_STEP: f64 = 1.1;

/// Zoom level a fresh engine starts at, in pixels per second.
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 50.0;

/// Maps between viewport pixels and timeline seconds under zoom and pan.
#[derive(Debug, Clone)]
pub struct CoordinateEngine {
    /// Current zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`
    pixels_per_second: f64,
    /// Horizontal scroll offset of the viewport, in pixels
    pub scroll_offset: f64,
    /// Whether snapping is applied by [`CoordinateEngine::snap_time`]
    pub snap_to_grid: bool,
}

impl CoordinateEngine {
    /// Create an engine at the default zoom, unscrolled, with snapping on.
    pub fn new() -> Self {
        Self {
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            scroll_offset: 0.0,
            snap_to_grid: true,
        }
    }

    /// Current zoom in pixels per second.
    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    /// Set the zoom directly, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_pixels_per_second(&mut self, pps: f64) {
        self.pixels_per_second = pps.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Zoom as a percentage of the default level, for display.
    pub fn zoom_percentage(&self) -> u32 {
        ((self.pixels_per_second / DEFAULT_PIXELS_PER_SECOND) * 100.0).round() as u32
    }

    /// Convert a time to a content-space x position.
    pub fn time_to_x(&self, time: f64) -> f64 {
        time * self.pixels_per_second
    }

    /// Convert a time to a viewport x position.
    pub fn time_to_viewport_x(&self, time: f64) -> f64 {
        time * self.pixels_per_second - self.scroll_offset
    }

    /// Convert a viewport x position to a time.
    pub fn x_to_time(&self, viewport_x: f64) -> f64 {
        (viewport_x + self.scroll_offset) / self.pixels_per_second
    }

    /// Apply one zoom input at a viewport position, keeping the time under
    /// the cursor fixed.
    ///
    /// `direction > 0` zooms in by [`ZOOM_STEP`], anything else zooms out.
    /// The time at the cursor is captured before the zoom changes, then the
    /// scroll offset is recomputed so that time maps back to `viewport_x`.
    pub fn zoom_about(&mut self, direction: f64, viewport_x: f64) {
        let time_at_cursor = self.x_to_time(viewport_x);
        let factor = if direction > 0.0 {
            ZOOM_STEP
        } else {
            1.0 / ZOOM_STEP
        };
        self.pixels_per_second = (self.pixels_per_second * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.scroll_offset = time_at_cursor * self.pixels_per_second - viewport_x;
    }

    /// Apply a pan gesture: the drag delta is subtracted from the offset the
    /// scroll had when the pan started.
    pub fn pan(&mut self, scroll_start: f64, pan_start_x: f64, pointer_x: f64) {
        self.scroll_offset = scroll_start - (pointer_x - pan_start_x);
    }

    /// Ruler tick interval for a timeline duration, in seconds.
    pub fn tick_interval(duration: f64) -> f64 {
        if duration <= 30.0 {
            1.0
        } else if duration <= 60.0 {
            2.0
        } else if duration <= 120.0 {
            5.0
        } else if duration <= 300.0 {
            10.0
        } else {
            30.0
        }
    }

    /// Snap granularity derived from the tick interval: half a tick when the
    /// tick is >= 2 seconds, otherwise the tick itself (never below 1s).
    pub fn snap_unit(duration: f64) -> f64 {
        let tick = Self::tick_interval(duration);
        if tick >= 2.0 {
            tick / 2.0
        } else {
            1.0
        }
    }

    /// Quantize a time to the nearest snap-unit multiple. Identity when
    /// snapping is disabled.
    pub fn snap_time(&self, time: f64, duration: f64) -> f64 {
        if !self.snap_to_grid {
            return time;
        }
        let unit = Self::snap_unit(duration);
        (time / unit).round() * unit
    }

    /// Clamp a time into `[0, duration]`.
    pub fn clamp_time(time: f64, duration: f64) -> f64 {
        time.clamp(0.0, duration)
    }
}

impl Default for CoordinateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_time_mapping() {
        let mut engine = CoordinateEngine::new();
        assert_eq!(engine.time_to_x(2.0), 100.0);
        assert_eq!(engine.x_to_time(100.0), 2.0);

        engine.scroll_offset = 25.0;
        assert_eq!(engine.x_to_time(100.0), 2.5);
        assert_eq!(engine.time_to_viewport_x(2.5), 100.0);
    }

    #[test]
    fn test_zoom_about_keeps_cursor_time_fixed() {
        // Sweep a grid of states; the time under the cursor must survive the
        // zoom within 1e-9.
        for &pps in &[10.0, 35.0, 50.0, 120.0, 200.0] {
            for &scroll in &[0.0, 40.0, 333.3] {
                for &vx in &[0.0, 100.0, 517.25] {
                    for &dir in &[1.0, -1.0] {
                        let mut engine = CoordinateEngine::new();
                        engine.set_pixels_per_second(pps);
                        engine.scroll_offset = scroll;

                        let before = engine.x_to_time(vx);
                        engine.zoom_about(dir, vx);
                        let after = engine.x_to_time(vx);
                        assert!(
                            (before - after).abs() < 1e-9,
                            "cursor time drifted: pps={pps} scroll={scroll} vx={vx} dir={dir}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_zoom_scenario_from_fifty() {
        let mut engine = CoordinateEngine::new();
        assert_eq!(engine.x_to_time(100.0), 2.0);

        engine.zoom_about(1.0, 100.0);
        assert!((engine.pixels_per_second() - 55.0).abs() < 1e-9);
        assert!((engine.scroll_offset - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamps_to_range() {
        let mut engine = CoordinateEngine::new();
        engine.set_pixels_per_second(199.0);
        engine.zoom_about(1.0, 0.0);
        assert_eq!(engine.pixels_per_second(), MAX_ZOOM);

        engine.set_pixels_per_second(10.5);
        engine.zoom_about(-1.0, 0.0);
        assert_eq!(engine.pixels_per_second(), MIN_ZOOM);
    }

    #[test]
    fn test_pan_subtracts_drag_delta() {
        let mut engine = CoordinateEngine::new();
        engine.pan(200.0, 50.0, 80.0);
        assert_eq!(engine.scroll_offset, 170.0);
        engine.pan(200.0, 50.0, 20.0);
        assert_eq!(engine.scroll_offset, 230.0);
    }

    #[test]
    fn test_tick_interval_step_function() {
        assert_eq!(CoordinateEngine::tick_interval(30.0), 1.0);
        assert_eq!(CoordinateEngine::tick_interval(60.0), 2.0);
        assert_eq!(CoordinateEngine::tick_interval(120.0), 5.0);
        assert_eq!(CoordinateEngine::tick_interval(300.0), 10.0);
        assert_eq!(CoordinateEngine::tick_interval(301.0), 30.0);
    }

    #[test]
    fn test_snap_unit_is_half_tick_above_two() {
        assert_eq!(CoordinateEngine::snap_unit(30.0), 1.0);
        assert_eq!(CoordinateEngine::snap_unit(60.0), 1.0);
        assert_eq!(CoordinateEngine::snap_unit(120.0), 2.5);
        assert_eq!(CoordinateEngine::snap_unit(300.0), 5.0);
        assert_eq!(CoordinateEngine::snap_unit(600.0), 15.0);
    }

    #[test]
    fn test_snap_is_idempotent() {
        let engine = CoordinateEngine::new();
        for &duration in &[30.0, 60.0, 120.0, 300.0, 600.0] {
            for i in 0..200 {
                let t = i as f64 * 0.37;
                let once = engine.snap_time(t, duration);
                let twice = engine.snap_time(once, duration);
                assert_eq!(once, twice, "t={t} duration={duration}");
            }
        }
    }

    #[test]
    fn test_snap_disabled_is_identity() {
        let mut engine = CoordinateEngine::new();
        engine.snap_to_grid = false;
        assert_eq!(engine.snap_time(5.03, 60.0), 5.03);
    }

    #[test]
    fn test_snap_scenario_at_unit_one() {
        // duration 60 -> tick 2 -> snap unit 1
        let engine = CoordinateEngine::new();
        assert_eq!(engine.snap_time(5.03, 60.0), 5.0);
        assert_eq!(engine.snap_time(2.01, 60.0), 2.0);
    }

    #[test]
    fn test_clamp_time_totality() {
        assert_eq!(CoordinateEngine::clamp_time(-3.0, 60.0), 0.0);
        assert_eq!(CoordinateEngine::clamp_time(30.0, 60.0), 30.0);
        assert_eq!(CoordinateEngine::clamp_time(99.0, 60.0), 60.0);
    }
}
