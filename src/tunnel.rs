//! Tunnel effect builder and runner.

use std::sync::Arc;

use glam::Mat4;
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::camera::FlightCamera;
use crate::error::TunnelError;
use crate::gpu::GpuState;
use crate::path::{TunnelPath, DEFAULT_WAYPOINTS};
use crate::shader::ParticleVertex;
use crate::time::{Clock, FrameLimiter};
use crate::tube::{self, TubeParticle};
use crate::visuals::{Fog, Palette};

/// Log an FPS line every this many accepted frames.
const FPS_LOG_FRAMES: u64 = 300;

/// A particle tunnel flythrough, configured with method chaining.
///
/// Call [`run`](Tunnel::run) to open a window and fly until it is closed, or
/// [`build`](Tunnel::build) to get the windowless [`TunnelEffect`] core.
pub struct Tunnel {
    waypoints: Vec<[f32; 2]>,
    rings: u32,
    particles_per_ring: u32,
    radius: f32,
    particle_size: f32,
    fps: u32,
    speed: f32,
    lookahead: f32,
    palette: Palette,
    fog: Fog,
    seed: Option<u64>,
    title: String,
    window_size: (u32, u32),
}

impl Tunnel {
    /// Create a tunnel with the default circuit and look.
    pub fn new() -> Self {
        Self {
            waypoints: DEFAULT_WAYPOINTS.to_vec(),
            rings: 1600,
            particles_per_ring: 40,
            radius: 4.0,
            particle_size: 0.2,
            fps: 30,
            speed: 0.0005,
            lookahead: 0.01,
            palette: Palette::default(),
            fog: Fog::default(),
            seed: None,
            title: "tunnelfx".to_string(),
            window_size: (1280, 720),
        }
    }

    /// Replace the (x, z) ground plan the path is threaded through.
    pub fn with_waypoints(mut self, waypoints: Vec<[f32; 2]>) -> Self {
        self.waypoints = waypoints;
        self
    }

    /// Number of particle rings along the tube.
    pub fn with_ring_count(mut self, rings: u32) -> Self {
        self.rings = rings;
        self
    }

    /// Number of particles around each ring.
    pub fn with_particles_per_ring(mut self, particles: u32) -> Self {
        self.particles_per_ring = particles;
        self
    }

    /// Tube radius in world units.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Particle sprite size in world units.
    pub fn with_particle_size(mut self, size: f32) -> Self {
        self.particle_size = size;
        self
    }

    /// Target frame rate of the flight.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Fraction of the loop traveled per frame.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// How far ahead of the camera the look-at target sits.
    pub fn with_lookahead(mut self, lookahead: f32) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_fog(mut self, fog: Fog) -> Self {
        self.fog = fog;
        self
    }

    /// Fix the height jitter of the path so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Build the windowless effect core: path, geometry, camera and timing.
    pub fn build(&self) -> TunnelEffect {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let path = TunnelPath::from_waypoints(&self.waypoints, &mut rng);
        let particles = tube::sweep(
            &path,
            self.rings,
            self.particles_per_ring,
            self.radius,
            &self.palette,
        );

        let (width, height) = self.window_size;
        let mut camera = FlightCamera::new(width as f32 / height as f32);
        camera.speed = self.speed;
        camera.lookahead = self.lookahead;

        TunnelEffect {
            path,
            particles,
            camera,
            limiter: FrameLimiter::new(self.fps),
            clock: Clock::new(),
            paused: false,
        }
    }

    /// Open a window and fly the tunnel until the window is closed.
    pub fn run(self) -> Result<(), TunnelError> {
        let effect = self.build();
        log::info!(
            "tunnel built: {} particles ({} rings x {}), path length {:.1}",
            effect.particles().len(),
            self.rings,
            self.particles_per_ring,
            effect.path().length(),
        );

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = TunnelApp::new(
            effect,
            self.title,
            self.window_size,
            self.fog,
            self.particle_size,
        );
        event_loop.run_app(&mut app)?;

        match app.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Tunnel {
    fn default() -> Self {
        Self::new()
    }
}

/// The running effect, independent of any window or GPU.
///
/// Owns the path, the swept particles and the flight camera, and applies the
/// frame-rate throttle and pause flag. The windowed runner asks it for one
/// [`frame`](TunnelEffect::frame) per redraw and draws only when one is due.
pub struct TunnelEffect {
    path: TunnelPath,
    particles: Vec<TubeParticle>,
    camera: FlightCamera,
    limiter: FrameLimiter,
    clock: Clock,
    paused: bool,
}

impl TunnelEffect {
    pub fn path(&self) -> &TunnelPath {
        &self.path
    }

    pub fn particles(&self) -> &[TubeParticle] {
        &self.particles
    }

    pub fn camera(&self) -> &FlightCamera {
        &self.camera
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Resume the flight.
    pub fn play(&mut self) {
        self.paused = false;
        self.clock.resume();
    }

    /// Freeze the flight; frames are skipped until [`play`](TunnelEffect::play).
    pub fn pause(&mut self) {
        self.paused = true;
        self.clock.pause();
    }

    pub fn toggle(&mut self) {
        if self.paused {
            self.play();
        } else {
            self.pause();
        }
    }

    /// Rewind to the start of the loop and unpause.
    pub fn reset(&mut self) {
        self.camera.reset();
        self.limiter.reset();
        self.clock.reset();
        self.paused = false;
    }

    /// Track a new surface size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Produce the next frame if one is due.
    ///
    /// Returns the camera matrices to draw with, or `None` while paused or
    /// when the frame limiter holds the frame back.
    pub fn frame(&mut self) -> Option<(Mat4, Mat4)> {
        if self.paused || !self.limiter.tick() {
            return None;
        }
        Some(self.step())
    }

    /// Advance one frame unconditionally and return the camera matrices.
    pub fn step(&mut self) -> (Mat4, Mat4) {
        self.clock.update();
        self.camera.advance();
        (
            self.camera.view_matrix(&self.path),
            self.camera.projection_matrix(),
        )
    }

    /// Frames accepted so far.
    pub fn frame_count(&self) -> u64 {
        self.clock.frame()
    }

    /// Most recent FPS estimate.
    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }
}

/// winit application driving a [`TunnelEffect`] on a [`GpuState`].
struct TunnelApp {
    effect: TunnelEffect,
    title: String,
    window_size: (u32, u32),
    fog: Fog,
    particle_size: f32,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    error: Option<TunnelError>,
}

impl TunnelApp {
    fn new(
        effect: TunnelEffect,
        title: String,
        window_size: (u32, u32),
        fog: Fog,
        particle_size: f32,
    ) -> Self {
        Self {
            effect,
            title,
            window_size,
            fog,
            particle_size,
            window: None,
            gpu: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: TunnelError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for TunnelApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.window = Some(window.clone());

        let vertices: Vec<ParticleVertex> = self
            .effect
            .particles()
            .iter()
            .map(|p| ParticleVertex::new(p.position.into(), p.color.into()))
            .collect();

        match pollster::block_on(GpuState::new(
            window,
            &vertices,
            self.fog,
            self.particle_size,
        )) {
            Ok(gpu) => {
                self.effect.resize(gpu.config.width, gpu.config.height);
                self.gpu = Some(gpu);
            }
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
                self.effect.resize(physical_size.width, physical_size.height);
            }
            WindowEvent::Occluded(occluded) => {
                // The native analog of the browser tab going hidden.
                if occluded {
                    self.effect.pause();
                } else {
                    self.effect.play();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(gpu) = self.gpu.as_mut() {
                    if let Some((view, proj)) = self.effect.frame() {
                        match gpu.render(view, proj) {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => {
                                gpu.resize(winit::dpi::PhysicalSize {
                                    width: gpu.config.width,
                                    height: gpu.config.height,
                                })
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("surface out of memory");
                                event_loop.exit();
                            }
                            Err(e) => log::warn!("render error: {e:?}"),
                        }

                        if self.effect.frame_count() % FPS_LOG_FRAMES == 0 {
                            log::debug!("{:.1} fps", self.effect.fps());
                        }
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
