#![cfg_attr(not(feature = "std"), no_std)]

pub mod config;
#[cfg(feature = "std")]
pub mod flock;
pub mod render;

pub use config::{ConfigError, Rgba, SimulationConfig};
#[cfg(feature = "std")]
pub use flock::Flock;
pub use render::{render, Surface};

/// A 2D vector used for position and velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        #[cfg(feature = "std")]
        {
            (self.x * self.x + self.y * self.y).sqrt()
        }
        #[cfg(not(feature = "std"))]
        {
            libm::sqrt(self.x * self.x + self.y * self.y)
        }
    }

    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Self::zero()
        }
    }

    /// Rescales the vector to exactly `max` when it is longer, keeping its direction.
    pub fn limit(&self, max: f64) -> Self {
        let mag = self.magnitude();
        if mag > max {
            self.normalize() * max
        } else {
            *self
        }
    }

    pub fn distance(&self, other: &Vector2D) -> f64 {
        (*self - *other).magnitude()
    }

    /// Angle of the vector in radians, measured from the positive x axis.
    pub fn heading(&self) -> f64 {
        #[cfg(feature = "std")]
        {
            self.y.atan2(self.x)
        }
        #[cfg(not(feature = "std"))]
        {
            libm::atan2(self.y, self.x)
        }
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f64> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f64> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// A single boid. Identity is its index in the flock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub position: Vector2D,
    pub velocity: Vector2D,
}

impl Boid {
    pub fn new(position: Vector2D, velocity: Vector2D) -> Self {
        Self { position, velocity }
    }

    /// Spawns a boid uniformly over the viewport with each velocity
    /// component drawn from `[-spread, spread)`.
    #[cfg(feature = "std")]
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R, viewport: Viewport, spread: f64) -> Self {
        let position = Vector2D::new(
            sample(rng, 0.0, viewport.width),
            sample(rng, 0.0, viewport.height),
        );
        let velocity = Vector2D::new(sample(rng, -spread, spread), sample(rng, -spread, spread));
        Self::new(position, velocity)
    }

    pub fn clamp_speed(&mut self, speed_limit: f64) {
        self.velocity = self.velocity.limit(speed_limit);
    }

    pub fn integrate(&mut self) {
        self.position += self.velocity;
    }

    /// Teleports to the opposite edge on each axis that left the viewport.
    pub fn wrap_edges(&mut self, width: f64, height: f64) {
        if self.position.x > width {
            self.position.x = 0.0;
        } else if self.position.x < 0.0 {
            self.position.x = width;
        }

        if self.position.y > height {
            self.position.y = 0.0;
        } else if self.position.y < 0.0 {
            self.position.y = height;
        }
    }
}

// gen_range panics on an empty range, which a zero-sized viewport produces
#[cfg(feature = "std")]
fn sample<R: rand::Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Negative and non-finite sizes collapse to zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Host-driven state read by every step: viewport size and pointer position.
///
/// Event handlers write these fields between frames; a frame never observes
/// a half-applied update because the loop is single-threaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationContext {
    pub viewport: Viewport,
    /// `None` while the pointer is outside the page.
    pub pointer: Option<Vector2D>,
}

impl SimulationContext {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pointer: None,
        }
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.pointer = if x.is_finite() && y.is_finite() {
            Some(Vector2D::new(x, y))
        } else {
            None
        };
    }

    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
    }
}

/// Flocking rules. Each agent is updated in place and in array order, so
/// later agents see the already-moved earlier ones within the same frame.
pub mod behavior {
    use super::*;

    /// Sums collected from every other boid within visual range.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Neighborhood {
        pub count: usize,
        pub velocity_sum: Vector2D,
        pub position_sum: Vector2D,
        /// Sum of `self - other` over neighbours closer than the separation distance.
        pub separation: Vector2D,
    }

    impl Neighborhood {
        pub fn empty() -> Self {
            Self {
                count: 0,
                velocity_sum: Vector2D::zero(),
                position_sum: Vector2D::zero(),
                separation: Vector2D::zero(),
            }
        }
    }

    pub fn survey(boids: &[Boid], index: usize, config: &SimulationConfig) -> Neighborhood {
        let boid = &boids[index];
        let mut hood = Neighborhood::empty();

        for (other_index, other) in boids.iter().enumerate() {
            if other_index == index {
                continue;
            }
            let distance = boid.position.distance(&other.position);
            if distance < config.visual_range {
                if distance < config.separation_distance {
                    hood.separation += boid.position - other.position;
                }
                hood.velocity_sum += other.velocity;
                hood.position_sum += other.position;
                hood.count += 1;
            }
        }

        hood
    }

    pub fn alignment(boid: &Boid, hood: &Neighborhood, config: &SimulationConfig) -> Vector2D {
        if hood.count == 0 {
            return Vector2D::zero();
        }
        let average = hood.velocity_sum / hood.count as f64;
        (average - boid.velocity) * config.alignment_factor
    }

    pub fn cohesion(boid: &Boid, hood: &Neighborhood, config: &SimulationConfig) -> Vector2D {
        if hood.count == 0 {
            return Vector2D::zero();
        }
        let center = hood.position_sum / hood.count as f64;
        (center - boid.position) * config.cohesion_factor
    }

    /// Not averaged: crowding amplifies the push.
    pub fn separation(hood: &Neighborhood, config: &SimulationConfig) -> Vector2D {
        hood.separation * config.separation_factor
    }

    /// Push away from the pointer, proportional to the raw offset.
    pub fn repulsion(
        boid: &Boid,
        pointer: Option<Vector2D>,
        config: &SimulationConfig,
    ) -> Vector2D {
        match pointer {
            Some(pointer) if boid.position.distance(&pointer) < config.mouse_repel_dist => {
                (boid.position - pointer) * config.mouse_repel_force
            }
            _ => Vector2D::zero(),
        }
    }

    /// Advances the boid at `index` by one tick.
    pub fn step_boid(
        boids: &mut [Boid],
        index: usize,
        context: &SimulationContext,
        config: &SimulationConfig,
    ) {
        let hood = survey(boids, index, config);
        let boid = &mut boids[index];

        let ali = alignment(boid, &hood, config);
        let coh = cohesion(boid, &hood, config);
        boid.velocity += ali;
        boid.velocity += coh;
        boid.velocity += separation(&hood, config);
        boid.velocity += repulsion(boid, context.pointer, config);

        boid.clamp_speed(config.speed_limit);
        boid.integrate();
        boid.wrap_edges(context.viewport.width, context.viewport.height);
    }

    /// Advances every boid by one tick without drawing.
    pub fn step(boids: &mut [Boid], context: &SimulationContext, config: &SimulationConfig) {
        for index in 0..boids.len() {
            step_boid(boids, index, context, config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector2d_magnitude() {
        let v = Vector2D::new(3.0, 4.0);
        assert_eq!(v.magnitude(), 5.0);
    }

    #[test]
    fn test_vector2d_normalize() {
        let v = Vector2D::new(3.0, 4.0);
        let normalized = v.normalize();
        assert!((normalized.magnitude() - 1.0).abs() < 1e-12);
        assert_eq!(Vector2D::zero().normalize(), Vector2D::zero());
    }

    #[test]
    fn test_vector2d_operations() {
        let v1 = Vector2D::new(1.0, 2.0);
        let v2 = Vector2D::new(3.0, 4.0);

        assert_eq!(v1 + v2, Vector2D::new(4.0, 6.0));
        assert_eq!(v2 - v1, Vector2D::new(2.0, 2.0));
        assert_eq!(v1 * 2.0, Vector2D::new(2.0, 4.0));
        assert_eq!(v2 / 2.0, Vector2D::new(1.5, 2.0));
    }

    #[test]
    fn test_vector2d_limit_keeps_direction() {
        let v = Vector2D::new(3.0, 4.0).limit(1.0);
        assert!((v.magnitude() - 1.0).abs() < 1e-12);
        assert!((v.x - 0.6).abs() < 1e-12);
        assert!((v.y - 0.8).abs() < 1e-12);

        let short = Vector2D::new(0.1, 0.1);
        assert_eq!(short.limit(1.0), short);
    }

    #[test]
    fn test_vector2d_heading() {
        assert_eq!(Vector2D::new(1.0, 0.0).heading(), 0.0);
        let up = Vector2D::new(0.0, 1.0).heading();
        assert!((up - core::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_boid_integrate() {
        let mut boid = Boid::new(Vector2D::zero(), Vector2D::new(1.0, 1.0));
        boid.integrate();
        assert_eq!(boid.position, Vector2D::new(1.0, 1.0));
    }

    #[test]
    fn test_boid_wrap_edges_past_far_edge() {
        let mut boid = Boid::new(Vector2D::new(101.0, 51.0), Vector2D::zero());
        boid.wrap_edges(100.0, 50.0);
        assert_eq!(boid.position, Vector2D::new(0.0, 0.0));
    }

    #[test]
    fn test_boid_wrap_edges_below_zero() {
        let mut boid = Boid::new(Vector2D::new(-1.0, -1.0), Vector2D::zero());
        boid.wrap_edges(100.0, 50.0);
        assert_eq!(boid.position, Vector2D::new(100.0, 50.0));
    }

    #[test]
    fn test_boid_wrap_edges_leaves_inside_alone() {
        let mut boid = Boid::new(Vector2D::new(100.0, 0.0), Vector2D::zero());
        boid.wrap_edges(100.0, 50.0);
        assert_eq!(boid.position, Vector2D::new(100.0, 0.0));
    }

    #[test]
    fn test_viewport_collapses_invalid_sizes() {
        let viewport = Viewport::new(-10.0, f64::NAN);
        assert_eq!(viewport, Viewport::new(0.0, 0.0));
        assert!(viewport.is_empty());
        assert!(!Viewport::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_context_pointer() {
        let mut context = SimulationContext::new(Viewport::new(100.0, 100.0));
        assert_eq!(context.pointer, None);

        context.set_pointer(10.0, 20.0);
        assert_eq!(context.pointer, Some(Vector2D::new(10.0, 20.0)));

        context.clear_pointer();
        assert_eq!(context.pointer, None);

        context.set_pointer(f64::NAN, 5.0);
        assert_eq!(context.pointer, None);
    }

    #[test]
    fn test_survey_skips_self_and_far_boids() {
        let config = SimulationConfig::default();
        let boids = [
            Boid::new(Vector2D::new(0.0, 0.0), Vector2D::zero()),
            Boid::new(Vector2D::new(10.0, 0.0), Vector2D::new(1.0, 0.0)),
            Boid::new(Vector2D::new(50.0, 0.0), Vector2D::new(0.0, 1.0)),
            Boid::new(Vector2D::new(500.0, 0.0), Vector2D::new(9.0, 9.0)),
        ];

        let hood = behavior::survey(&boids, 0, &config);

        assert_eq!(hood.count, 2);
        assert_eq!(hood.velocity_sum, Vector2D::new(1.0, 1.0));
        assert_eq!(hood.position_sum, Vector2D::new(60.0, 0.0));
        // only the boid at distance 10 is inside the separation distance
        assert_eq!(hood.separation, Vector2D::new(-10.0, 0.0));
    }

    #[test]
    fn test_alignment_and_cohesion_are_zero_without_neighbors() {
        let config = SimulationConfig::default();
        let boid = Boid::new(Vector2D::new(5.0, 5.0), Vector2D::new(0.3, 0.1));
        let hood = behavior::Neighborhood::empty();

        assert_eq!(behavior::alignment(&boid, &hood, &config), Vector2D::zero());
        assert_eq!(behavior::cohesion(&boid, &hood, &config), Vector2D::zero());
        assert_eq!(behavior::separation(&hood, &config), Vector2D::zero());
    }

    #[test]
    fn test_repulsion() {
        let config = SimulationConfig::default();
        let boid = Boid::new(Vector2D::new(100.0, 100.0), Vector2D::zero());

        assert_eq!(behavior::repulsion(&boid, None, &config), Vector2D::zero());

        let far = Vector2D::new(100.0 + config.mouse_repel_dist, 100.0);
        assert_eq!(
            behavior::repulsion(&boid, Some(far), &config),
            Vector2D::zero()
        );

        let near = Vector2D::new(90.0, 100.0);
        let push = behavior::repulsion(&boid, Some(near), &config);
        assert_eq!(push, Vector2D::new(10.0 * config.mouse_repel_force, 0.0));
    }

    #[test]
    fn test_step_boid_without_neighbors_only_integrates() {
        let config = SimulationConfig::default();
        let context = SimulationContext::new(Viewport::new(800.0, 600.0));
        let mut boids = [
            Boid::new(Vector2D::new(100.0, 100.0), Vector2D::new(0.25, -0.125)),
            Boid::new(Vector2D::new(700.0, 500.0), Vector2D::new(-0.5, 0.0)),
        ];

        behavior::step(&mut boids, &context, &config);

        assert_eq!(boids[0].velocity, Vector2D::new(0.25, -0.125));
        assert_eq!(boids[0].position, Vector2D::new(100.25, 99.875));
        assert_eq!(boids[1].velocity, Vector2D::new(-0.5, 0.0));
        assert_eq!(boids[1].position, Vector2D::new(699.5, 500.0));
    }

    #[test]
    fn test_step_sees_earlier_updates_in_same_frame() {
        let config = SimulationConfig::default();
        let context = SimulationContext::new(Viewport::new(800.0, 600.0));
        let initial = [
            Boid::new(Vector2D::new(100.0, 100.0), Vector2D::new(0.5, 0.0)),
            Boid::new(Vector2D::new(150.0, 100.0), Vector2D::new(-0.5, 0.0)),
        ];

        let mut boids = initial;
        behavior::step(&mut boids, &context, &config);

        // the second boid surveys the first one after it already moved
        let mut expected = initial;
        behavior::step_boid(&mut expected, 0, &context, &config);
        let hood = behavior::survey(&expected, 1, &config);
        assert_eq!(hood.position_sum, boids[0].position);
        behavior::step_boid(&mut expected, 1, &context, &config);
        assert_eq!(boids, expected);
    }
}
