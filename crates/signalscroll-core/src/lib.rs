pub mod color;
pub mod config;
pub mod easing;
pub mod effects;
pub mod engine;
pub mod error;
pub mod pin;
pub mod property;
pub mod stage;
pub mod timeline;
pub mod toggle;
pub mod trigger;

pub use color::Rgba;
pub use config::{AppConfig, Palette};
pub use easing::{EaseMode, Easing};
pub use engine::{
    BindingHandle, Disposer, EngineSnapshot, PlaybackHandle, SceneSpec, ScrollEngine,
    ToggleHandle,
};
pub use error::{Error, Result};
pub use pin::{CoverEffect, PinPhase, Placement, StackSpec};
pub use property::{Property, PropertySet, PropertyValue};
pub use stage::{Bounds, TargetId, Viewport};
pub use timeline::{Position, Repeat, Timeline, Tween};
pub use toggle::{ToggleSpec, ToggleState};
pub use trigger::{Anchor, BindingMode, RangeEnd, TriggerSpec};
