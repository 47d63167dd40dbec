//! Mutable scene parameters driven by the keyboard.

/// Change applied to [`SceneState`] by one key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneAction {
    RotateXPositive,
    RotateXNegative,
    RotateYPositive,
    RotateYNegative,
    RotateZPositive,
    RotateZNegative,
    SlideChairsOut,
    SlideChairsIn,
}

/// Global scene rotation and the chair slide.
///
/// Angles are in degrees and kept in (-360, 360) with a sign-preserving remainder, so
/// rotating backwards from 0 gives negative angles rather than wrapping to 357.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneState {
    x_angle: f32,
    y_angle: f32,
    z_angle: f32,
    slide_steps: i32,
}

impl SceneState {
    /// Degrees added or removed per rotation key press.
    pub const ANGLE_STEP: f32 = 3.0;
    /// Slide key presses per unit of distance (one press moves 0.1).
    const STEPS_PER_UNIT: f32 = 10.0;
    pub const MIN_SLIDE_STEPS: i32 = -3;
    pub const MAX_SLIDE_STEPS: i32 = 10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Rotation about X, in degrees.
    pub fn x_angle(&self) -> f32 {
        self.x_angle
    }

    pub fn y_angle(&self) -> f32 {
        self.y_angle
    }

    pub fn z_angle(&self) -> f32 {
        self.z_angle
    }

    /// How far the chairs have been pulled away from the table, in [-0.3, 1.0].
    pub fn chair_slide(&self) -> f32 {
        self.slide_steps as f32 / Self::STEPS_PER_UNIT
    }

    pub fn apply(&mut self, action: SceneAction) {
        match action {
            SceneAction::RotateXPositive => self.x_angle = rotate(self.x_angle, Self::ANGLE_STEP),
            SceneAction::RotateXNegative => self.x_angle = rotate(self.x_angle, -Self::ANGLE_STEP),
            SceneAction::RotateYPositive => self.y_angle = rotate(self.y_angle, Self::ANGLE_STEP),
            SceneAction::RotateYNegative => self.y_angle = rotate(self.y_angle, -Self::ANGLE_STEP),
            SceneAction::RotateZPositive => self.z_angle = rotate(self.z_angle, Self::ANGLE_STEP),
            SceneAction::RotateZNegative => self.z_angle = rotate(self.z_angle, -Self::ANGLE_STEP),
            SceneAction::SlideChairsOut => {
                if self.slide_steps < Self::MAX_SLIDE_STEPS {
                    self.slide_steps += 1;
                }
            }
            SceneAction::SlideChairsIn => {
                if self.slide_steps > Self::MIN_SLIDE_STEPS {
                    self.slide_steps -= 1;
                }
            }
        }
    }
}

fn rotate(angle: f32, delta: f32) -> f32 {
    (angle + delta) % 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_rest() {
        let state = SceneState::new();
        assert_eq!((state.x_angle(), state.y_angle(), state.z_angle()), (0.0, 0.0, 0.0));
        assert_eq!(state.chair_slide(), 0.0);
    }

    #[test]
    fn negative_rotation_keeps_sign() {
        let mut state = SceneState::new();
        state.apply(SceneAction::RotateYNegative);
        assert_eq!(state.y_angle(), -3.0);

        for _ in 0..119 {
            state.apply(SceneAction::RotateYNegative);
        }
        // -360 % 360 is -0.0, which compares equal to 0.
        assert_eq!(state.y_angle(), 0.0);
    }

    #[test]
    fn full_turn_wraps_to_zero() {
        let mut state = SceneState::new();
        for _ in 0..120 {
            state.apply(SceneAction::RotateZPositive);
        }
        assert_eq!(state.z_angle(), 0.0);
    }

    #[test]
    fn slide_is_clamped_at_both_ends() {
        let mut state = SceneState::new();
        for _ in 0..15 {
            state.apply(SceneAction::SlideChairsOut);
        }
        assert_eq!(state.chair_slide(), 1.0);

        for _ in 0..20 {
            state.apply(SceneAction::SlideChairsIn);
        }
        assert!((state.chair_slide() + 0.3).abs() < 1e-6);
    }

    #[test]
    fn slide_follows_clamped_running_sum() {
        fn expect(state: &mut SceneState, action: SceneAction, presses: u32, slide: f32) {
            for _ in 0..presses {
                state.apply(action);
            }
            assert!(
                (state.chair_slide() - slide).abs() < 1e-6,
                "expected {slide}, got {}",
                state.chair_slide()
            );
        }

        let mut state = SceneState::new();
        expect(&mut state, SceneAction::SlideChairsOut, 15, 1.0);
        expect(&mut state, SceneAction::SlideChairsIn, 2, 0.8);
        expect(&mut state, SceneAction::SlideChairsIn, 20, -0.3);
        expect(&mut state, SceneAction::SlideChairsOut, 1, -0.2);
        expect(&mut state, SceneAction::SlideChairsOut, 4, 0.2);
    }

    #[test]
    fn axes_are_independent() {
        let mut state = SceneState::new();
        state.apply(SceneAction::RotateXPositive);
        state.apply(SceneAction::RotateZNegative);
        state.apply(SceneAction::SlideChairsOut);
        assert_eq!(state.x_angle(), 3.0);
        assert_eq!(state.y_angle(), 0.0);
        assert_eq!(state.z_angle(), -3.0);
        assert!((state.chair_slide() - 0.1).abs() < 1e-6);
    }
}
