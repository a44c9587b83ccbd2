use crate::types::SurfaceBounds;
use crate::uniforms::POINTER_CENTER;

/// Fraction of the remaining distance the smoothed pointer covers per frame.
pub const POINTER_SMOOTHING: f64 = 0.05;

/// Normalises pointer positions and eases the shader's pointer toward them.
///
/// Coordinates are in `[0, 1]` with the origin at the bottom-left corner of the
/// surface, matching the shader's `gl_FragCoord` convention.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerTracker {
    current: [f64; 2],
    target: [f64; 2],
    smoothing: f64,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(POINTER_SMOOTHING)
    }
}

impl PointerTracker {
    /// `smoothing` is clamped into `(0, 1]`.
    pub fn new(smoothing: f64) -> Self {
        let smoothing = if smoothing.is_finite() && smoothing > 0.0 {
            smoothing.min(1.0)
        } else {
            POINTER_SMOOTHING
        };
        Self {
            current: POINTER_CENTER,
            target: POINTER_CENTER,
            smoothing,
        }
    }

    pub fn current(&self) -> [f64; 2] {
        self.current
    }

    pub fn target(&self) -> [f64; 2] {
        self.target
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64, bounds: SurfaceBounds) {
        if !bounds.has_area() {
            return;
        }
        let x = (client_x - bounds.left) / bounds.width;
        let y = 1.0 - (client_y - bounds.top) / bounds.height;
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.target = [x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)];
    }

    pub fn on_pointer_leave(&mut self) {
        self.target = POINTER_CENTER;
    }

    pub fn tick(&mut self) -> [f64; 2] {
        for axis in 0..2 {
            self.current[axis] += self.smoothing * (self.target[axis] - self.current[axis]);
        }
        self.current
    }

    pub fn reset(&mut self) {
        self.current = POINTER_CENTER;
        self.target = POINTER_CENTER;
    }
}
