//! Smooth scrolling for the page preview
//!
//! Keyboard scrolling moves a target offset; the animator eases the visible
//! offset towards it one frame at a time and the page feeds every
//! intermediate value to the scroll engine, so scrubbed effects follow the
//! motion instead of jumping.
//!
//! - `timing` - progress and interpolation helpers
//! - `config` - settings derived from the `[ui]` section
//! - `animation` - the animator combining both
//!
//! ```ignore
//! use signalscroll_tui::scroll::{ScrollAnimator, ScrollSettings};
//!
//! let mut animator = ScrollAnimator::new(ScrollSettings::from_config(&config.ui));
//! animator.scroll_by(60.0, max_scroll);
//!
//! // every frame
//! let offset = animator.update(frame_dt, max_scroll);
//! ```

pub mod config;
pub mod timing;

pub mod animation;

pub use animation::ScrollAnimator;
pub use config::ScrollSettings;
