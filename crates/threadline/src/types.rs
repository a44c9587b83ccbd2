use serde::{Deserialize, Serialize};

/// Default line colour (a soft grey) used when the caller omits `color`.
pub const DEFAULT_COLOR: [f64; 3] = [0.6, 0.6, 0.6];

/// Default vertical displacement strength of the lines.
pub const DEFAULT_AMPLITUDE: f64 = 1.0;

/// Default spread between neighbouring lines.
pub const DEFAULT_DISTANCE: f64 = 0.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Visual configuration consumed when a session starts.
///
/// Every field is optional when deserialised; missing keys fall back to the
/// defaults above. Two configs that compare equal describe the same shader
/// constants, which is what the lifecycle binding uses to decide whether a
/// running session can be kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Base RGB colour of the lines, each component in `[0, 1]`.
    pub color: [f64; 3],
    /// Vertical displacement strength, `>= 0`.
    pub amplitude: f64,
    /// Spread between neighbouring lines.
    pub distance: f64,
    /// When false the pointer uniform stays pinned to the surface centre.
    pub enable_mouse_interaction: bool,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            amplitude: DEFAULT_AMPLITUDE,
            distance: DEFAULT_DISTANCE,
            enable_mouse_interaction: false,
        }
    }
}

impl BackdropConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: [f64; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_mouse_interaction(mut self, enabled: bool) -> Self {
        self.enable_mouse_interaction = enabled;
        self
    }

    /// Rejects values the shader cannot meaningfully consume.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, component) in self.color.iter().enumerate() {
            if !component.is_finite() || !(0.0..=1.0).contains(component) {
                return Err(ConfigError::Invalid(format!(
                    "color component {index} must be within [0, 1], got {component}"
                )));
            }
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "amplitude must be a finite value >= 0, got {}",
                self.amplitude
            )));
        }
        if !self.distance.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "distance must be finite, got {}",
                self.distance
            )));
        }
        Ok(())
    }
}

/// Client-space rectangle of the container the backdrop is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceBounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Bounds anchored at the client origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Integer pixel size, the equivalent of `clientWidth`/`clientHeight`.
    pub fn client_size(&self) -> (u32, u32) {
        (to_pixels(self.width), to_pixels(self.height))
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Host notifications the backdrop can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Window-level resize.
    Resize,
    /// Pointer moved inside the container.
    PointerMove,
    /// Pointer left the container.
    PointerLeave,
}

/// Event delivered by the host into [`crate::Backdrop::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Resize,
    /// Pointer position in client coordinates (same space as [`SurfaceBounds`]).
    PointerMove { client_x: f64, client_y: f64 },
    PointerLeave,
}

impl HostEvent {
    pub fn kind(&self) -> ListenerKind {
        match self {
            HostEvent::Resize => ListenerKind::Resize,
            HostEvent::PointerMove { .. } => ListenerKind::PointerMove,
            HostEvent::PointerLeave => ListenerKind::PointerLeave,
        }
    }
}
