//! WebGPU rendering module
//!
//! `Scene` is the CPU model fed by simulation events; `SceneRenderState`
//! ray-casts it in the fragment shader.

pub mod scene;
pub mod scene_pipeline;

pub use scene::{Camera, Scene, SceneBlock};
pub use scene_pipeline::SceneRenderState;
