use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::state::{SceneAction, SceneState};

/// Maps a physical key to the scene change it triggers.
pub fn action_for_key(key: KeyCode) -> Option<SceneAction> {
    match key {
        KeyCode::ArrowUp => Some(SceneAction::RotateXPositive),
        KeyCode::ArrowDown => Some(SceneAction::RotateXNegative),
        KeyCode::ArrowLeft => Some(SceneAction::RotateYPositive),
        KeyCode::ArrowRight => Some(SceneAction::RotateYNegative),
        KeyCode::KeyZ => Some(SceneAction::RotateZPositive),
        KeyCode::KeyX => Some(SceneAction::RotateZNegative),
        KeyCode::KeyV => Some(SceneAction::SlideChairsOut),
        KeyCode::KeyC => Some(SceneAction::SlideChairsIn),
        _ => None,
    }
}

/// Same mapping keyed by legacy DOM `keyCode` values.
pub fn action_for_keycode(code: u32) -> Option<SceneAction> {
    match code {
        38 => Some(SceneAction::RotateXPositive),
        40 => Some(SceneAction::RotateXNegative),
        37 => Some(SceneAction::RotateYPositive),
        39 => Some(SceneAction::RotateYNegative),
        90 => Some(SceneAction::RotateZPositive),
        88 => Some(SceneAction::RotateZNegative),
        86 => Some(SceneAction::SlideChairsOut),
        67 => Some(SceneAction::SlideChairsIn),
        _ => None,
    }
}

/// Turns keyboard events into [`SceneState`] changes.
///
/// Every handler returns `true` when the state changed and a redraw is needed.
#[derive(Debug, Default)]
pub struct InputController {
    presses: u64,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a window event. Key presses (including auto-repeat) are handled,
    /// releases and every other event are ignored.
    pub fn handle_event(&mut self, event: &WindowEvent, state: &mut SceneState) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.physical_key {
                    PhysicalKey::Code(key) => self.handle_key(key, state),
                    PhysicalKey::Unidentified(_) => false,
                }
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, state: &mut SceneState) -> bool {
        self.dispatch(action_for_key(key), state)
    }

    pub fn handle_keycode(&mut self, code: u32, state: &mut SceneState) -> bool {
        self.dispatch(action_for_keycode(code), state)
    }

    /// Number of recognized key presses handled so far.
    pub fn presses(&self) -> u64 {
        self.presses
    }

    fn dispatch(&mut self, action: Option<SceneAction>, state: &mut SceneState) -> bool {
        let Some(action) = action else {
            return false;
        };
        state.apply(action);
        self.presses += 1;
        log::trace!(
            "{action:?} -> angles ({}, {}, {}), slide {}",
            state.x_angle(),
            state.y_angle(),
            state.z_angle(),
            state.chair_slide()
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_up_rotates_x() {
        let mut input = InputController::new();
        let mut state = SceneState::new();

        assert!(input.handle_keycode(38, &mut state));
        assert_eq!(state.x_angle(), 3.0);

        for _ in 1..130 {
            input.handle_key(KeyCode::ArrowUp, &mut state);
        }
        // 390 degrees wraps to 30.
        assert_eq!(state.x_angle(), 30.0);
        assert_eq!(input.presses(), 130);
    }

    #[test]
    fn slide_saturates_after_ten_presses() {
        let mut input = InputController::new();
        let mut state = SceneState::new();
        for _ in 0..15 {
            assert!(input.handle_keycode(86, &mut state));
        }
        assert_eq!(state.chair_slide(), 1.0);
    }

    #[test]
    fn angle_is_congruent_to_net_presses() {
        let mut input = InputController::new();
        let mut state = SceneState::new();
        let sequence = [
            (KeyCode::ArrowLeft, 50),
            (KeyCode::ArrowRight, 170),
            (KeyCode::ArrowLeft, 7),
        ];

        let mut net = 0i32;
        for (key, count) in sequence {
            for _ in 0..count {
                input.handle_key(key, &mut state);
                net += if key == KeyCode::ArrowLeft { 1 } else { -1 };
                let expected = (net * 3).rem_euclid(360) as f32;
                assert_eq!(state.y_angle().rem_euclid(360.0), expected);
                assert!(state.y_angle().abs() < 360.0);
            }
        }
        assert_eq!(state.x_angle(), 0.0);
        assert_eq!(state.z_angle(), 0.0);
    }

    #[test]
    fn unknown_keys_do_not_request_redraw() {
        let mut input = InputController::new();
        let mut state = SceneState::new();

        assert!(!input.handle_key(KeyCode::KeyQ, &mut state));
        assert!(!input.handle_keycode(13, &mut state));
        assert_eq!(state, SceneState::new());
        assert_eq!(input.presses(), 0);
    }

    #[test]
    fn key_codes_and_physical_keys_agree() {
        let pairs = [
            (38, KeyCode::ArrowUp),
            (40, KeyCode::ArrowDown),
            (37, KeyCode::ArrowLeft),
            (39, KeyCode::ArrowRight),
            (90, KeyCode::KeyZ),
            (88, KeyCode::KeyX),
            (86, KeyCode::KeyV),
            (67, KeyCode::KeyC),
        ];
        for (code, key) in pairs {
            assert_eq!(action_for_keycode(code), action_for_key(key));
            assert!(action_for_key(key).is_some());
        }
    }
}
