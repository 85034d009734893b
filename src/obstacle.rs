// Circular obstacle particles slide around, approximated from the bounding box
// of a page element (the logo). The rect is re-read from an ObstacleProvider
// every frame since the element can move.

use crate::config::RainConfig;
use vecmath::Vector2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ObstacleRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ObstacleRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        ObstacleRect { x, y, width, height }
    }

    pub fn to_circle(&self) -> Obstacle {
        Obstacle {
            center: [self.x + self.width / 2.0, self.y + self.height / 2.0],
            radius: self.width / 2.0,
        }
    }
}

/// Source of the obstacle geometry, queried once per frame. `None` means there
/// is nothing to collide with right now.
pub trait ObstacleProvider {
    fn obstacle_rect(&self) -> Option<ObstacleRect>;
}

impl ObstacleProvider for Option<ObstacleRect> {
    fn obstacle_rect(&self) -> Option<ObstacleRect> {
        *self
    }
}

impl ObstacleProvider for ObstacleRect {
    fn obstacle_rect(&self) -> Option<ObstacleRect> {
        Some(*self)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub center: Vector2<f64>,
    pub radius: f64,
}

impl Obstacle {
    pub fn is_point_inside(&self, pos: Vector2<f64>) -> bool {
        vecmath::vec2_len(vecmath::vec2_sub(pos, self.center)) < self.radius
    }

    /// Pushes a particle that ended up inside the circle back onto its edge
    /// and bends its velocity along the surface. Leaves the particle alone
    /// when it is outside, or exactly on the center where no normal exists.
    pub fn collide(
        &self,
        pos: &mut Vector2<f64>,
        vel: &mut Vector2<f64>,
        delta: f64,
        config: &RainConfig,
    ) {
        if !self.is_point_inside(*pos) {
            return;
        }
        let offset = vecmath::vec2_sub(*pos, self.center);
        let distance = vecmath::vec2_len(offset);
        if distance <= 0.0 {
            return;
        }
        let normal = vecmath::vec2_scale(offset, 1.0 / distance);

        *pos = vecmath::vec2_add(self.center, vecmath::vec2_scale(normal, self.radius));

        // Damped reflection, most of the normal component is absorbed
        let dot = vecmath::vec2_dot(*vel, normal);
        *vel = vecmath::vec2_sub(*vel, vecmath::vec2_scale(normal, 2.0 * dot * config.bounce));

        let tangent_x = -normal[1];
        vel[0] += tangent_x * config.slide_force * sign(offset[0]);
        vel[1] += config.gravity * 0.5 * delta;
    }
}

// Like signum, but zero stays zero
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn logo() -> Obstacle {
        // 100x100 box at (50, 50) -> circle of radius 50 around (100, 100)
        ObstacleRect::new(50.0, 50.0, 100.0, 100.0).to_circle()
    }

    #[test]
    fn circle_from_rect() {
        let circle = ObstacleRect::new(10.0, 20.0, 60.0, 30.0).to_circle();
        assert_eq!(circle.center, [40.0, 35.0]);
        assert_eq!(circle.radius, 30.0);
    }

    #[test]
    fn pushes_particle_to_edge() {
        let config = RainConfig::default();
        let mut pos = [130.0, 100.0];
        let mut vel = [0.0, 0.0];
        logo().collide(&mut pos, &mut vel, 0.016, &config);
        assert!((pos[0] - 150.0).abs() < EPS);
        assert!((pos[1] - 100.0).abs() < EPS);
    }

    #[test]
    fn reflection_absorbs_most_of_the_impact() {
        let config = RainConfig::default();
        // Straight above the center, falling at 100 px/s
        let mut pos = [100.0, 60.0];
        let mut vel = [0.0, 100.0];
        let delta = 0.016;
        logo().collide(&mut pos, &mut vel, delta, &config);
        assert!((pos[1] - 50.0).abs() < EPS);
        // normal (0, -1), dot = -100, vy = 100 - 2 * 100 * 0.3 = 40, plus gravity slide
        assert!((vel[1] - (40.0 + 3.0 * 0.5 * delta)).abs() < EPS);
        // dx == 0 so no sideways slide
        assert!(vel[0].abs() < EPS);
    }

    #[test]
    fn slide_follows_horizontal_side() {
        let config = RainConfig::default();
        let delta = 0.016;

        let mut pos = [110.0, 90.0];
        let mut vel = [0.0, 0.0];
        logo().collide(&mut pos, &mut vel, delta, &config);
        // normal points up-right, tangent_x = -ny > 0
        assert!(vel[0] > 0.0);

        let mut pos = [90.0, 90.0];
        let mut vel = [0.0, 0.0];
        logo().collide(&mut pos, &mut vel, delta, &config);
        // normal points up-left, tangent_x > 0 but sign(dx) < 0
        assert!(vel[0] < 0.0);
    }

    #[test]
    fn center_and_outside_are_ignored() {
        let config = RainConfig::default();
        let mut pos = [100.0, 100.0];
        let mut vel = [1.0, 2.0];
        logo().collide(&mut pos, &mut vel, 0.016, &config);
        assert_eq!((pos, vel), ([100.0, 100.0], [1.0, 2.0]));

        let mut pos = [200.0, 100.0];
        logo().collide(&mut pos, &mut vel, 0.016, &config);
        assert_eq!((pos, vel), ([200.0, 100.0], [1.0, 2.0]));
    }

    #[test]
    fn particle_on_the_edge_is_not_inside() {
        let config = RainConfig::default();
        let circle = logo();
        assert!(!circle.is_point_inside([150.0, 100.0]));
        assert!(circle.is_point_inside([149.0, 100.0]));

        // already resting on the rim, so no push and no velocity change
        let mut pos = [150.0, 100.0];
        let mut vel = [-3.0, 5.0];
        circle.collide(&mut pos, &mut vel, 0.016, &config);
        assert_eq!((pos, vel), ([150.0, 100.0], [-3.0, 5.0]));

        // just inside gets pushed out to the rim
        let mut pos = [149.0, 100.0];
        circle.collide(&mut pos, &mut vel, 0.016, &config);
        assert!((pos[0] - 150.0).abs() < EPS);
        assert!(!circle.is_point_inside(pos));
    }

    #[test]
    fn providers() {
        let rect = ObstacleRect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(rect.obstacle_rect(), Some(rect));
        assert_eq!(Some(rect).obstacle_rect(), Some(rect));
        assert_eq!(None::<ObstacleRect>.obstacle_rect(), None);
        assert!(rect.to_circle().is_point_inside([2.5, 4.0]));
        assert!(!rect.to_circle().is_point_inside([10.0, 4.0]));
    }
}
