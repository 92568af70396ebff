//! Scroll-driven show/hide of the header bar.
//!
//! Raw per-sample deltas flicker around the threshold, so the controller
//! accumulates deltas and resets the accumulator whenever it triggers.

/// Hysteresis configuration. The threshold is derived from a UI-density
/// constant (16 dp) scaled to device pixels.
#[derive(Debug, Clone)]
pub struct VisibilityConfig {
    pub threshold_px: i32,
}

impl VisibilityConfig {
    pub fn from_density(threshold_dp: f32, pixels_per_dp: f32) -> Self {
        Self {
            threshold_px: (threshold_dp * pixels_per_dp).round() as i32,
        }
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self { threshold_px: 16 }
    }
}

#[derive(Debug)]
pub struct HeaderVisibility {
    threshold_px: i32,
    last_offset: i32,
    accumulated_delta: i32,
    visible: bool,
}

impl HeaderVisibility {
    /// Starts visible at offset 0.
    pub fn new(config: VisibilityConfig) -> Self {
        Self {
            threshold_px: config.threshold_px,
            last_offset: 0,
            accumulated_delta: 0,
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Feed one scroll-offset sample; returns the resulting visibility.
    ///
    /// Scrolling down past the threshold hides, scrolling back up past it
    /// shows, and landing at offset 0 snaps the header back regardless of
    /// the accumulator.
    pub fn on_offset(&mut self, offset: i32) -> bool {
        let delta = offset - self.last_offset;
        self.last_offset = offset;
        self.accumulated_delta += delta;

        if self.visible && self.accumulated_delta > self.threshold_px {
            self.visible = false;
            self.accumulated_delta = 0;
        } else if !self.visible && self.accumulated_delta < -self.threshold_px {
            self.visible = true;
            self.accumulated_delta = 0;
        }

        if offset == 0 && !self.visible {
            self.visible = true;
            self.accumulated_delta = 0;
        }

        self.visible
    }
}

impl Default for HeaderVisibility {
    fn default() -> Self {
        Self::new(VisibilityConfig::default())
    }
}
