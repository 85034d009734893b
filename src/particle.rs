// A single rain pixel: position, velocity, a short trail for the fading tail,
// and the per frame physics that moves it.

use crate::color::Color;
use crate::config::RainConfig;
use crate::obstacle::Obstacle;
use crate::pointer::PointerState;
use crate::surface::Surface;
use rand::Rng;
use std::collections::VecDeque;
use vecmath::Vector2;

/// Everything outside the particle that one update step reads.
pub struct StepContext<'a> {
    pub config: &'a RainConfig,
    pub pointer: &'a PointerState,
    pub obstacle: Option<Obstacle>,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vector2<f64>,
    pub vel: Vector2<f64>,
    size: f64,
    opacity: f64,
    trail: VecDeque<Vector2<f64>>,
}

impl Particle {
    pub fn new<R: Rng>(pos_x: f64, pos_y: f64, config: &RainConfig, rng: &mut R) -> Particle {
        let size = if rng.gen::<f64>() < 0.5 {
            config.pixel_size
        } else {
            config.pixel_size * 1.5
        };
        Particle {
            pos: [pos_x, pos_y],
            vel: [0.0, spawn_speed(config, rng)],
            size,
            opacity: rng.gen::<f64>() * 0.3 + 0.3,
            trail: VecDeque::with_capacity(RainConfig::TRAIL_LENGTH + 1),
        }
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    // Oldest position first
    pub fn trail(&self) -> impl Iterator<Item = &Vector2<f64>> {
        self.trail.iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Advances the particle by `delta` seconds. Never fails; degenerate
    /// geometry (particle exactly on the pointer or the obstacle center)
    /// just skips that force for this step.
    pub fn update<R: Rng>(&mut self, delta: f64, ctx: &StepContext, rng: &mut R) {
        let config = ctx.config;

        self.trail.push_back(self.pos);
        if self.trail.len() > RainConfig::TRAIL_LENGTH {
            self.trail.pop_front();
        }

        self.vel[1] += config.gravity * delta;

        let push = ctx.pointer.force_on(self.pos, delta, config);
        self.vel = vecmath::vec2_add(self.vel, push);

        // Damping is tuned per 60Hz tick, scale it to the real step
        let damping = config.damping.powf(delta * 60.0);
        self.vel = vecmath::vec2_scale(self.vel, damping);

        let max = config.max_velocity;
        self.vel[0] = self.vel[0].max(-max).min(max);
        self.vel[1] = self.vel[1].max(-max).min(max);

        self.pos[0] += self.vel[0] * delta;
        self.pos[1] += self.vel[1] * delta;

        if let Some(obstacle) = ctx.obstacle {
            obstacle.collide(&mut self.pos, &mut self.vel, delta, config);
        }

        if self.pos[1] > ctx.height {
            self.recycle(ctx.width, config, rng);
        }

        if self.pos[0] < 0.0 {
            self.pos[0] = ctx.width;
        }
        if self.pos[0] > ctx.width {
            self.pos[0] = 0.0;
        }
    }

    // Back to the top with fresh motion, the particle itself stays in the collection
    fn recycle<R: Rng>(&mut self, width: f64, config: &RainConfig, rng: &mut R) {
        self.pos = [rng.gen::<f64>() * width, config.respawn_y];
        self.vel = [0.0, spawn_speed(config, rng)];
        self.trail.clear();
    }

    pub fn draw<S: Surface>(&self, surface: &mut S, config: &RainConfig) {
        let trail_color = Color::from_u32(config.trail_color);
        let len = self.trail.len() as f64;
        for (i, point) in self.trail.iter().enumerate() {
            let alpha = self.opacity * config.trail_opacity_scale * (i as f64 / len);
            surface.fill_rect(point[0], point[1], self.size, self.size, trail_color, alpha);
        }

        surface.fill_rect(
            self.pos[0],
            self.pos[1],
            self.size,
            self.size,
            Color::from_u32(config.particle_color),
            self.opacity,
        );
    }
}

fn spawn_speed<R: Rng>(config: &RainConfig, rng: &mut R) -> f64 {
    rng.gen::<f64>() * (config.max_spawn_speed - config.min_spawn_speed) + config.min_spawn_speed
}
