use crate::{Boid, Rgba, Viewport};

/// Nose of the boid triangle, ahead of its position along the heading.
const NOSE: f64 = 10.0;
/// Distance from the position back to the base of the triangle.
const TAIL: f64 = 5.0;
const HALF_BASE: f64 = 5.0;

/// Immediate-mode 2D drawing target, modelled on the canvas 2D context.
pub trait Surface {
    type Error;

    fn clear(&mut self, viewport: Viewport) -> Result<(), Self::Error>;
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn rotate(&mut self, angle: f64) -> Result<(), Self::Error>;
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn fill(&mut self, color: &Rgba);
}

/// Draws a boid as a triangle pointing along its velocity.
pub fn render<S: Surface>(surface: &mut S, boid: &Boid, color: &Rgba) -> Result<(), S::Error> {
    let angle = boid.velocity.heading();

    surface.save();
    let drawn = draw_triangle(surface, boid, angle, color);
    // keep save/restore balanced even when a transform call fails
    surface.restore();
    drawn
}

fn draw_triangle<S: Surface>(
    surface: &mut S,
    boid: &Boid,
    angle: f64,
    color: &Rgba,
) -> Result<(), S::Error> {
    surface.translate(boid.position.x, boid.position.y)?;
    surface.rotate(angle)?;

    surface.begin_path();
    surface.move_to(NOSE, 0.0);
    surface.line_to(-TAIL, HALF_BASE);
    surface.line_to(-TAIL, -HALF_BASE);
    surface.close_path();
    surface.fill(color);

    Ok(())
}
