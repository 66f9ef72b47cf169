//! Scroll settings derived from the `[ui]` config section

use std::time::Duration;

use signalscroll_core::config::UiConfig;
use signalscroll_core::Easing;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    pub smooth_enabled: bool,
    pub animation_duration: Duration,
    pub easing: Easing,
    /// Document pixels moved by one line step
    pub step_px: f64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}

impl ScrollSettings {
    pub fn from_config(ui: &UiConfig) -> Self {
        let easing = ui.scroll_easing().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default scroll easing");
            Easing::default()
        });
        Self {
            smooth_enabled: ui.smooth_scroll,
            animation_duration: Duration::from_millis(ui.scroll_duration_ms),
            easing,
            step_px: f64::from(ui.scroll_lines.max(1)) * ui.row_px,
        }
    }

    /// Smooth scrolling is only effective with a non-zero duration
    #[inline]
    pub fn is_smooth(&self) -> bool {
        self.smooth_enabled && !self.animation_duration.is_zero()
    }
}
