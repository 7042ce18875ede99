//! CPU-side scene model
//!
//! Holds what the GPU pass draws: one box per block and a perspective camera.
//! Driven through the `Renderer` trait, so it can be tested without a device.

use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::hsl_to_rgb;
use crate::present::Renderer;

/// A box in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBlock {
    pub id: u32,
    /// Center y (layer height)
    pub y: f32,
    pub x: f32,
    /// Width the block was created with
    pub base_width: f32,
    /// Horizontal scale applied to `base_width`
    pub scale_x: f32,
    pub color: [f32; 3],
}

impl SceneBlock {
    #[inline]
    pub fn width(&self) -> f32 {
        self.base_width * self.scale_x
    }
}

/// Perspective camera that only ever translates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Vec3::from_array(CAMERA_START),
            target: Vec3::ZERO,
            fov_y_deg: CAMERA_FOV_DEG,
            aspect,
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect.max(0.01),
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        proj * view
    }
}

/// All blocks plus the camera
#[derive(Debug, Clone)]
pub struct Scene {
    /// Blocks in creation order (bottom of the tower first)
    blocks: Vec<SceneBlock>,
    pub camera: Camera,
    pub block_depth: f32,
    pub block_height: f32,
    rng: Pcg32,
}

impl Scene {
    pub fn new(seed: u64, aspect: f32, block_height: f32, block_depth: f32) -> Self {
        Self {
            blocks: Vec::new(),
            camera: Camera::new(aspect),
            block_depth,
            block_height,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn blocks(&self) -> &[SceneBlock] {
        &self.blocks
    }

    pub fn get(&self, id: u32) -> Option<&SceneBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut SceneBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.camera.aspect = width as f32 / height as f32;
        }
    }

    /// hsl(random * 360, 80%, 60%)
    fn random_color(&mut self) -> [f32; 3] {
        let hue = self.rng.random::<f32>() * 360.0;
        hsl_to_rgb(hue, 0.8, 0.6)
    }
}

impl Renderer for Scene {
    fn create_block(&mut self, id: u32, layer_height: f32, width: f32) {
        let color = self.random_color();
        self.blocks.push(SceneBlock {
            id,
            y: layer_height,
            x: 0.0,
            base_width: width,
            scale_x: 1.0,
            color,
        });
    }

    fn dispose(&mut self, id: u32) {
        self.blocks.retain(|b| b.id != id);
    }

    fn set_position(&mut self, id: u32, x: f32) {
        match self.get_mut(id) {
            Some(block) => block.x = x,
            None => log::warn!("set_position on unknown block {}", id),
        }
    }

    fn set_scale(&mut self, id: u32, factor: f32) {
        match self.get_mut(id) {
            Some(block) => block.scale_x = factor,
            None => log::warn!("set_scale on unknown block {}", id),
        }
    }

    fn raise_camera(&mut self, delta_y: f32) {
        self.camera.eye.y += delta_y;
        self.camera.target.y += delta_y;
    }

    fn reset_camera(&mut self) {
        self.camera.eye = Vec3::from_array(CAMERA_START);
        self.camera.target = Vec3::ZERO;
    }
}
