use rand::Rng;

use crate::behavior;
use crate::config::{ConfigError, SimulationConfig};
use crate::render::{render, Surface};
use crate::{Boid, SimulationContext, Viewport};

/// A fixed-size flock plus the host state it reacts to.
///
/// `frame` is the unit of work for one display refresh: clear, then step and
/// draw every boid in order. The flock never grows or shrinks after spawning.
#[derive(Debug, Clone)]
pub struct Flock {
    boids: Vec<Boid>,
    config: SimulationConfig,
    context: SimulationContext,
    stopped: bool,
}

impl Flock {
    /// Spawns `config.count` boids using the thread-local RNG.
    pub fn new(config: SimulationConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        Self::with_rng(config, viewport, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        config: SimulationConfig,
        viewport: Viewport,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let boids = (0..config.count)
            .map(|_| Boid::random(&mut *rng, viewport, config.initial_velocity_spread))
            .collect();

        log::debug!(
            "spawned {} boids over {}x{}",
            config.count,
            viewport.width,
            viewport.height
        );

        Ok(Self::assemble(config, viewport, boids))
    }

    /// Builds a flock from explicit boids. `config.count` is replaced by the
    /// number of boids given.
    pub fn from_boids(
        config: SimulationConfig,
        viewport: Viewport,
        boids: Vec<Boid>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, viewport, boids))
    }

    fn assemble(mut config: SimulationConfig, viewport: Viewport, boids: Vec<Boid>) -> Self {
        config.count = boids.len();
        Self {
            boids,
            config,
            context: SimulationContext::new(viewport),
            stopped: false,
        }
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn boid_count(&self) -> usize {
        self.boids.len()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.context.set_pointer(x, y);
    }

    pub fn clear_pointer(&mut self) {
        self.context.clear_pointer();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.context.resize(width, height);
        log::debug!(
            "viewport resized to {}x{}",
            self.context.viewport.width,
            self.context.viewport.height
        );
    }

    /// Advances every boid by one tick without drawing.
    pub fn step(&mut self) {
        behavior::step(&mut self.boids, &self.context, &self.config);
    }

    /// Runs one display frame. Returns whether the next frame should be
    /// scheduled; a stopped flock neither steps nor draws. A surface error
    /// stops the flock before it is returned.
    pub fn frame<S: Surface>(&mut self, surface: &mut S) -> Result<bool, S::Error> {
        if self.stopped {
            return Ok(false);
        }

        if let Err(err) = self.draw_frame(surface) {
            self.stop();
            return Err(err);
        }
        Ok(!self.stopped)
    }

    fn draw_frame<S: Surface>(&mut self, surface: &mut S) -> Result<(), S::Error> {
        let viewport = self.context.viewport;
        surface.clear(viewport)?;

        let visible = !viewport.is_empty();
        for index in 0..self.boids.len() {
            behavior::step_boid(&mut self.boids, index, &self.context, &self.config);
            if visible {
                render(surface, &self.boids[index], &self.config.color)?;
            }
        }
        Ok(())
    }

    /// Prevents any further frame from running. There is no resume.
    pub fn stop(&mut self) {
        if !self.stopped {
            log::info!("flock of {} boids stopped", self.boids.len());
        }
        self.stopped = true;
    }

    pub fn is_running(&self) -> bool {
        !self.stopped
    }
}
