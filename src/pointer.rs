// Cursor / touch state shared between the input handlers and the simulation,
// plus the force field the pointer exerts on nearby particles.

use crate::config::RainConfig;
use vecmath::Vector2;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointerState {
    pub pos: Vector2<f64>,
    pub engaged: bool,
}

impl PointerState {
    pub fn new() -> Self {
        PointerState::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.pos = [x, y];
    }

    pub fn press(&mut self) {
        self.engaged = true;
    }

    pub fn release(&mut self) {
        self.engaged = false;
    }

    // Touches carry a position along with the press
    pub fn touch_at(&mut self, x: f64, y: f64) {
        self.press();
        self.move_to(x, y);
    }

    /// Velocity change the pointer applies to a particle at `pos` over `delta`
    /// seconds. Falls off linearly to zero at `mouse_radius`. Pushes the
    /// particle away while the pointer is idle and pulls it in while engaged.
    /// A particle sitting exactly on the pointer gets no force.
    pub fn force_on(&self, pos: Vector2<f64>, delta: f64, config: &RainConfig) -> Vector2<f64> {
        let away = vecmath::vec2_sub(pos, self.pos);
        let distance = vecmath::vec2_len(away);
        if distance <= 0.0 || distance >= config.mouse_radius {
            return [0.0, 0.0];
        }
        let force = (1.0 - distance / config.mouse_radius) * config.mouse_force * delta;
        let dir = vecmath::vec2_scale(away, 1.0 / distance);
        if self.engaged {
            vecmath::vec2_scale(dir, -force)
        } else {
            vecmath::vec2_scale(dir, force)
        }
    }
}
