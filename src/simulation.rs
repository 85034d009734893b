// Frame driven loop over the particle collection. The host calls `frame` once
// per display refresh and always schedules the next one, whatever the outcome.

use crate::color::Color;
use crate::config::RainConfig;
use crate::obstacle::{ObstacleProvider, ObstacleRect};
use crate::particle::{Particle, StepContext};
use crate::pointer::PointerState;
use crate::surface::Surface;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    Stepped { delta: f64 },
    // Delta was NaN, non positive or too large (e.g. a backgrounded tab)
    Skipped { delta: f64 },
}

pub struct Simulation {
    config: RainConfig,
    width: f64,
    height: f64,
    particles: Vec<Particle>,
    obstacle: Option<ObstacleRect>,
    // None until the first frame
    last_timestamp: Option<f64>,
    rng: StdRng,
}

impl Simulation {
    pub fn new(width: f64, height: f64) -> Simulation {
        let mut sim = Simulation::with_config(RainConfig::default(), StdRng::from_entropy());
        sim.initialize(width, height);
        sim
    }

    /// Builds an empty simulation. Nothing falls until `initialize` is called.
    pub fn with_config(config: RainConfig, rng: StdRng) -> Simulation {
        Simulation {
            config,
            width: 0.0,
            height: 0.0,
            particles: Vec::new(),
            obstacle: None,
            last_timestamp: None,
            rng,
        }
    }

    pub fn seeded(config: RainConfig, seed: u64) -> Simulation {
        Simulation::with_config(config, StdRng::seed_from_u64(seed))
    }

    /// Seeds floor(area / area_per_particle) particles spread over one screen
    /// height above the visible area, so the rain falls in from the top.
    pub fn initialize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        let num_particles = self.config.particle_count(width, height);
        self.particles = Vec::with_capacity(num_particles);
        for _ in 0..num_particles {
            let pos_x = self.rng.gen::<f64>() * width;
            let pos_y = self.rng.gen::<f64>() * height - height;
            let p = Particle::new(pos_x, pos_y, &self.config, &mut self.rng);
            self.particles.push(p);
        }
        debug!("initialized {} particles for {}x{}", num_particles, width, height);
    }

    pub fn resize<O: ObstacleProvider + ?Sized>(&mut self, width: f64, height: f64, provider: &O) {
        self.particles.clear();
        self.initialize(width, height);
        self.obstacle = provider.obstacle_rect();
        debug!("resized to {}x{}, obstacle {:?}", width, height, self.obstacle);
    }

    pub fn frame<O, S>(
        &mut self,
        timestamp: f64,
        pointer: &PointerState,
        provider: &O,
        surface: &mut S,
    ) -> FrameOutcome
    where
        O: ObstacleProvider + ?Sized,
        S: Surface,
    {
        let delta = match self.last_timestamp {
            None => self.config.fallback_delta,
            Some(last) => (timestamp - last) / 1000.0,
        };
        self.last_timestamp = Some(timestamp);

        if !self.config.is_valid_delta(delta) {
            trace!("skipping frame, delta {}", delta);
            return FrameOutcome::Skipped { delta };
        }

        surface.clear(Color::from_u32(self.config.background));
        self.obstacle = provider.obstacle_rect();

        let ctx = StepContext {
            config: &self.config,
            pointer,
            obstacle: self.obstacle.map(|rect| rect.to_circle()),
            width: self.width,
            height: self.height,
        };
        for particle in &mut self.particles {
            particle.update(delta, &ctx, &mut self.rng);
            particle.draw(surface, &self.config);
        }

        FrameOutcome::Stepped { delta }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn obstacle(&self) -> Option<ObstacleRect> {
        self.obstacle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelBuffer;

    const NO_OBSTACLE: Option<ObstacleRect> = None;

    fn sim(width: f64, height: f64) -> Simulation {
        let mut sim = Simulation::seeded(RainConfig::default(), 42);
        sim.initialize(width, height);
        sim
    }

    fn motion(sim: &Simulation) -> Vec<([f64; 2], [f64; 2])> {
        sim.particles().iter().map(|p| (p.pos, p.vel)).collect()
    }

    #[test]
    fn seeds_particles_above_the_surface() {
        let sim = sim(800.0, 600.0);
        assert_eq!(sim.particles().len(), 60);
        for p in sim.particles() {
            assert!(p.pos[0] >= 0.0 && p.pos[0] < 800.0);
            assert!(p.pos[1] >= -600.0 && p.pos[1] < 0.0);
        }
    }

    #[test]
    fn starts_uninitialized() {
        let sim = Simulation::seeded(RainConfig::default(), 1);
        assert!(sim.particles().is_empty());
        assert_eq!((sim.width(), sim.height()), (0.0, 0.0));
    }

    #[test]
    fn first_frame_uses_fallback_delta() {
        let mut sim = sim(800.0, 600.0);
        let mut surface = PixelBuffer::new(800, 600);
        let outcome = sim.frame(12_345.0, &PointerState::new(), &NO_OBSTACLE, &mut surface);
        assert_eq!(outcome, FrameOutcome::Stepped { delta: 0.016 });

        let outcome = sim.frame(12_345.0 + 20.0, &PointerState::new(), &NO_OBSTACLE, &mut surface);
        match outcome {
            FrameOutcome::Stepped { delta } => assert!((delta - 0.02).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_deltas_leave_particles_untouched() {
        let mut sim = sim(800.0, 600.0);
        let mut surface = PixelBuffer::new(800, 600);
        let pointer = PointerState::new();
        sim.frame(1000.0, &pointer, &NO_OBSTACLE, &mut surface);

        // same timestamp, going backwards, a long stall, then NaN
        for &ts in &[1000.0, 900.0, 5000.0, f64::NAN] {
            let before = motion(&sim);
            let outcome = sim.frame(ts, &pointer, &NO_OBSTACLE, &mut surface);
            assert!(matches!(outcome, FrameOutcome::Skipped { .. }), "{:?}", outcome);
            assert_eq!(motion(&sim), before);
        }
    }

    #[test]
    fn skipped_frame_does_not_draw() {
        let mut sim = sim(100.0, 100.0);
        let mut surface = PixelBuffer::new(100, 100);
        sim.frame(0.0, &PointerState::new(), &NO_OBSTACLE, &mut surface);
        let drawn = surface.pixels().to_vec();
        // bottom row, far below anything that fell in during one frame
        assert_eq!(surface.get_pixel(50, 99), Some(Color::from_u32(0xf0f5faff)));

        let mut fresh = PixelBuffer::new(100, 100);
        sim.frame(500.0, &PointerState::new(), &NO_OBSTACLE, &mut fresh);
        assert!(fresh.pixels().iter().all(|&b| b == 0));
        assert_ne!(drawn, fresh.pixels().to_vec());
    }

    #[test]
    fn timestamp_is_kept_after_a_skip() {
        let mut sim = sim(800.0, 600.0);
        let mut surface = PixelBuffer::new(800, 600);
        let pointer = PointerState::new();
        sim.frame(0.0, &pointer, &NO_OBSTACLE, &mut surface);
        assert!(matches!(
            sim.frame(10_000.0, &pointer, &NO_OBSTACLE, &mut surface),
            FrameOutcome::Skipped { .. }
        ));
        // measured from the skipped frame, not the last simulated one
        assert!(matches!(
            sim.frame(10_016.0, &pointer, &NO_OBSTACLE, &mut surface),
            FrameOutcome::Stepped { .. }
        ));
    }

    #[test]
    fn frames_keep_particles_in_bounds() {
        let mut sim = sim(400.0, 300.0);
        let mut surface = PixelBuffer::new(400, 300);
        let mut pointer = PointerState::new();
        let logo = ObstacleRect::new(150.0, 100.0, 100.0, 100.0);
        let mut ts = 0.0;
        for i in 0..600 {
            pointer.move_to((i % 400) as f64, 150.0);
            if i % 100 == 0 {
                pointer.engaged = !pointer.engaged;
            }
            sim.frame(ts, &pointer, &logo, &mut surface);
            ts += 16.0;
            let circle = logo.to_circle();
            for p in sim.particles() {
                assert!(p.trail_len() <= 3);
                assert!(p.pos[0] >= 0.0 && p.pos[0] <= 400.0);
                assert!(p.pos[1] <= 300.0);
                let d = vecmath::vec2_len(vecmath::vec2_sub(p.pos, circle.center));
                assert!(d >= circle.radius - 1e-6 || d == 0.0, "particle inside logo at {:?}", p.pos);
            }
        }
        assert_eq!(sim.particles().len(), 15);
        assert_eq!(sim.obstacle(), Some(logo));
    }

    #[test]
    fn frame_refreshes_obstacle() {
        let mut sim = sim(800.0, 600.0);
        let mut surface = PixelBuffer::new(800, 600);
        let logo = ObstacleRect::new(10.0, 10.0, 40.0, 40.0);
        sim.frame(0.0, &PointerState::new(), &Some(logo), &mut surface);
        assert_eq!(sim.obstacle(), Some(logo));
        sim.frame(16.0, &PointerState::new(), &NO_OBSTACLE, &mut surface);
        assert_eq!(sim.obstacle(), None);
    }

    #[test]
    fn resize_rebuilds_collection() {
        let mut sim = sim(800.0, 600.0);
        let logo = ObstacleRect::new(0.0, 0.0, 20.0, 20.0);
        sim.resize(1600.0, 1000.0, &logo);
        assert_eq!(sim.particles().len(), 200);
        assert_eq!((sim.width(), sim.height()), (1600.0, 1000.0));
        assert_eq!(sim.obstacle(), Some(logo));
        for p in sim.particles() {
            assert!(p.pos[1] >= -1000.0 && p.pos[1] < 0.0);
            assert_eq!(p.trail_len(), 0);
        }

        sim.resize(10.0, 10.0, &NO_OBSTACLE);
        assert!(sim.particles().is_empty());
        assert_eq!(sim.obstacle(), None);
    }
}
