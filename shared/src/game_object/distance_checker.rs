use crate::game_object::update_state::FAR_AWAY_DISTANCE;

/// Seconds between camera distance samples
pub const DISTANCE_CHECKER_TIMEOUT: f32 = 1.3;

/// Samples the most recent camera distance on a fixed period and reports
/// when the object crosses the far-away threshold
pub struct DistanceChecker {
    timer: f32,
    camera_distance: Option<f32>,
}

impl DistanceChecker {
    pub fn new() -> Self {
        Self {
            timer: 0.0,
            camera_distance: None,
        }
    }

    pub fn set_camera_distance(&mut self, distance: f32) {
        self.camera_distance = Some(distance);
    }

    /// Advances the timer and, when a sample is due, returns whether the
    /// object is currently in range
    pub fn update(&mut self, frame_time: f32) -> Option<bool> {
        self.timer -= frame_time;
        if self.timer > 0.0 {
            return None;
        }
        self.timer = DISTANCE_CHECKER_TIMEOUT;
        self.camera_distance
            .map(|distance| distance < FAR_AWAY_DISTANCE)
    }
}

impl Default for DistanceChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_on_period() {
        let mut checker = DistanceChecker::new();
        assert_eq!(checker.update(0.1), None);

        checker.set_camera_distance(40.0);
        assert_eq!(checker.update(1.0), None);
        assert_eq!(checker.update(0.3), Some(true));

        checker.set_camera_distance(400.0);
        assert_eq!(checker.update(0.5), None);
        assert_eq!(checker.update(0.8), Some(false));
    }
}
