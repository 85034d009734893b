// Tunable constants for the rain effect. Defaults give the stock look; a host
// can override any of them when building a Simulation.

#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    pub pixel_size: f64,
    pub gravity: f64,
    pub mouse_radius: f64,
    pub mouse_force: f64,
    // Per simulated 60Hz tick, see Particle::update
    pub damping: f64,
    pub max_velocity: f64,
    pub area_per_particle: f64,
    // Spawn vy is uniform in [min, max). The stock page uses random * 120 + 60,
    // so the upper bound is 180, not 120.
    pub min_spawn_speed: f64,
    pub max_spawn_speed: f64,
    pub respawn_y: f64,
    pub bounce: f64,
    pub slide_force: f64,
    pub fallback_delta: f64,
    pub max_delta: f64,
    pub trail_opacity_scale: f64,
    pub background: u32,
    pub particle_color: u32,
    pub trail_color: u32,
}

impl RainConfig {
    pub const PIXEL_SIZE: f64 = 4.0;
    pub const GRAVITY: f64 = 3.0;
    pub const MOUSE_RADIUS: f64 = 80.0;
    pub const MOUSE_FORCE: f64 = 1200.0;
    pub const DAMPING: f64 = 0.999;
    pub const MAX_VELOCITY: f64 = 480.0;
    pub const AREA_PER_PARTICLE: f64 = 8000.0;
    pub const TRAIL_LENGTH: usize = 3;

    // Number of particles that fit a surface of the given size
    pub fn particle_count(&self, width: f64, height: f64) -> usize {
        let count = (width * height / self.area_per_particle).floor();
        if count.is_finite() && count > 0.0 {
            count as usize
        } else {
            0
        }
    }

    // A frame delta outside (0, max_delta] is not simulated
    pub fn is_valid_delta(&self, delta: f64) -> bool {
        !delta.is_nan() && delta > 0.0 && delta <= self.max_delta
    }
}

impl Default for RainConfig {
    fn default() -> Self {
        RainConfig {
            pixel_size: RainConfig::PIXEL_SIZE,
            gravity: RainConfig::GRAVITY,
            mouse_radius: RainConfig::MOUSE_RADIUS,
            mouse_force: RainConfig::MOUSE_FORCE,
            damping: RainConfig::DAMPING,
            max_velocity: RainConfig::MAX_VELOCITY,
            area_per_particle: RainConfig::AREA_PER_PARTICLE,
            min_spawn_speed: 60.0,
            max_spawn_speed: 180.0,
            respawn_y: -10.0,
            bounce: 0.3,
            slide_force: 0.2,
            fallback_delta: 0.016,
            max_delta: 0.1,
            trail_opacity_scale: 0.3,
            background: 0xf0f5faff,
            particle_color: 0x4a90e2ff,
            trail_color: 0x87ceebff,
        }
    }
}
