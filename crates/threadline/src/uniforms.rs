use bytemuck::{Pod, Zeroable};

use crate::types::BackdropConfig;

/// Centre of the surface in normalised coordinates.
pub const POINTER_CENTER: [f64; 2] = [0.5, 0.5];

/// CPU-side values fed to the shader every frame.
///
/// Width and height are only written through [`UniformState::set_resolution`],
/// which also refreshes the aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformState {
    time: f64,
    resolution_width_px: u32,
    resolution_height_px: u32,
    aspect_ratio: f64,
    base_color: [f64; 3],
    amplitude: f64,
    line_distance_spread: f64,
    pointer: [f64; 2],
}

impl UniformState {
    pub fn new(config: &BackdropConfig, width: u32, height: u32) -> Self {
        let mut state = Self {
            time: 0.0,
            resolution_width_px: 0,
            resolution_height_px: 0,
            aspect_ratio: 1.0,
            base_color: config.color,
            amplitude: config.amplitude,
            line_distance_spread: config.distance,
            pointer: POINTER_CENTER,
        };
        state.set_resolution(width, height);
        state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.resolution_width_px, self.resolution_height_px)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn base_color(&self) -> [f64; 3] {
        self.base_color
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn line_distance_spread(&self) -> f64 {
        self.line_distance_spread
    }

    pub fn pointer(&self) -> [f64; 2] {
        self.pointer
    }

    pub fn set_time_ms(&mut self, timestamp_ms: f64) {
        self.time = timestamp_ms * 0.001;
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution_width_px = width;
        self.resolution_height_px = height;
        self.aspect_ratio = width as f64 / height.max(1) as f64;
    }

    pub fn set_pointer(&mut self, pointer: [f64; 2]) {
        self.pointer = pointer;
    }

    /// Packs the state into the layout the fragment shader declares.
    pub fn to_block(&self) -> UniformBlock {
        UniformBlock {
            i_resolution: [
                self.resolution_width_px as f32,
                self.resolution_height_px as f32,
                self.aspect_ratio as f32,
            ],
            i_time: self.time as f32,
            u_color: [
                self.base_color[0] as f32,
                self.base_color[1] as f32,
                self.base_color[2] as f32,
            ],
            u_amplitude: self.amplitude as f32,
            u_mouse: [self.pointer[0] as f32, self.pointer[1] as f32],
            u_distance: self.line_distance_spread as f32,
            _padding: 0.0,
        }
    }
}

/// std140 image of [`UniformState`]; must match `BackdropParams` in the
/// fragment shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformBlock {
    pub i_resolution: [f32; 3],
    pub i_time: f32,
    pub u_color: [f32; 3],
    pub u_amplitude: f32,
    pub u_mouse: [f32; 2],
    pub u_distance: f32,
    pub _padding: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_follows_resolution() {
        let mut state = UniformState::new(&BackdropConfig::default(), 100, 100);
        assert_eq!(state.aspect_ratio(), 1.0);
        state.set_resolution(800, 600);
        assert!((state.aspect_ratio() - 800.0 / 600.0).abs() < 1e-12);
        state.set_resolution(1080, 1920);
        assert!((state.aspect_ratio() - 0.5625).abs() < 1e-12);
    }

    #[test]
    fn zero_height_keeps_aspect_finite() {
        let mut state = UniformState::new(&BackdropConfig::default(), 0, 0);
        assert_eq!(state.aspect_ratio(), 0.0);
        state.set_resolution(640, 0);
        assert!(state.aspect_ratio().is_finite());
    }

    #[test]
    fn seeds_from_config_with_centered_pointer() {
        let config = BackdropConfig::new()
            .with_color([0.1, 0.2, 0.3])
            .with_amplitude(2.5)
            .with_distance(0.4);
        let state = UniformState::new(&config, 320, 240);
        assert_eq!(state.time(), 0.0);
        assert_eq!(state.base_color(), [0.1, 0.2, 0.3]);
        assert_eq!(state.amplitude(), 2.5);
        assert_eq!(state.line_distance_spread(), 0.4);
        assert_eq!(state.pointer(), POINTER_CENTER);
    }

    #[test]
    fn block_layout_is_three_vec4_rows() {
        assert_eq!(std::mem::size_of::<UniformBlock>(), 48);

        let mut state = UniformState::new(&BackdropConfig::default(), 800, 600);
        state.set_time_ms(1500.0);
        state.set_pointer([0.25, 0.75]);
        let block = state.to_block();
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&block));
        assert_eq!(floats[0], 800.0);
        assert_eq!(floats[1], 600.0);
        assert_eq!(floats[3], 1.5);
        assert_eq!(floats[7], 1.0);
        assert_eq!(&floats[8..10], &[0.25, 0.75]);
    }
}
