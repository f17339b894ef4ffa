//! GPU-facing data layouts and the render shader source.

use bytemuck::{Pod, Zeroable};

pub const SHADER_SOURCE: &str = include_str!("shader.wgsl");

/// Per-particle vertex data, instanced over a camera-facing quad.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
}

impl ParticleVertex {
    pub fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self {
            position,
            _pad0: 0.0,
            color,
            _pad1: 0.0,
        }
    }
}

/// Per-frame uniforms. Layout mirrors the `Uniforms` struct in `shader.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub fog_color: [f32; 3],
    pub fog_near: f32,
    pub fog_far: f32,
    pub particle_size: f32,
    pub _padding: [f32; 2],
}
