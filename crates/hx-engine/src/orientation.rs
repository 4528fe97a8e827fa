//! Listener rotation input.
//!
//! Pointer drag, a virtual joystick and held rotate keys all add into one
//! facing angle. No source owns the angle, so they compose when used at the
//! same time. Every mutating call returns the new orientation so the caller
//! can forward it to the audio graph and renderers in the same step.

use heapless::Vec as HeldKeys;
use hx_ir::Orientation;

use crate::config::EngineConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JoystickState {
    #[default]
    Idle,
    /// Deflected past the dead zone.
    Active,
    /// Released; velocity is decaying toward zero.
    Decaying,
}

/// Direction of a rotate key. Right turns clockwise seen from above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotateKey {
    Left,
    Right,
}

impl RotateKey {
    pub fn sign(self) -> f32 {
        match self {
            RotateKey::Left => -1.0,
            RotateKey::Right => 1.0,
        }
    }
}

/// One raw input event, in arrival order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// `inside` is true when the press landed in the interactive zone.
    PointerDown { inside: bool },
    /// Horizontal pointer movement in pixels.
    PointerMove { dx: f32 },
    PointerUp,
    /// Joystick deflection, each axis normalized to [-1, 1].
    JoystickMove { x: f32, y: f32 },
    JoystickRelease,
    KeyDown(RotateKey),
    KeyUp(RotateKey),
    ResetOrientation,
}

#[derive(Clone, Debug)]
pub struct OrientationController {
    angle: Orientation,
    drag: DragState,
    joystick: JoystickState,
    velocity: f32,
    held: HeldKeys<RotateKey, 2>,
    sensitivity: f32,
    key_rate: f32,
    joystick_rate: f32,
    dead_zone: f32,
    decay: f32,
    epsilon: f32,
}

impl Default for OrientationController {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl OrientationController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            angle: Orientation::default(),
            drag: DragState::Idle,
            joystick: JoystickState::Idle,
            velocity: 0.0,
            held: HeldKeys::new(),
            sensitivity: config.drag_sensitivity,
            key_rate: config.key_rate,
            joystick_rate: config.joystick_rate,
            dead_zone: config.joystick_dead_zone.clamp(0.0, 1.0),
            decay: config.joystick_decay.clamp(0.0, 0.999),
            epsilon: config.velocity_epsilon.max(f32::MIN_POSITIVE),
        }
    }

    /// Dispatch one event. Returns the new orientation if the angle changed.
    pub fn handle(&mut self, event: InputEvent) -> Option<Orientation> {
        match event {
            InputEvent::PointerDown { inside } => {
                self.pointer_down(inside);
                None
            }
            InputEvent::PointerMove { dx } => self.pointer_move(dx),
            InputEvent::PointerUp => {
                self.pointer_up();
                None
            }
            InputEvent::JoystickMove { x, y } => {
                self.joystick_move(x, y);
                None
            }
            InputEvent::JoystickRelease => {
                self.joystick_release();
                None
            }
            InputEvent::KeyDown(key) => {
                self.key_down(key);
                None
            }
            InputEvent::KeyUp(key) => {
                self.key_up(key);
                None
            }
            InputEvent::ResetOrientation => Some(self.reset()),
        }
    }

    /// Start a drag if the press landed inside the interactive zone.
    pub fn pointer_down(&mut self, inside: bool) -> bool {
        if inside {
            self.drag = DragState::Dragging;
        }
        inside
    }

    /// `angle += dx * sensitivity` while dragging.
    pub fn pointer_move(&mut self, dx: f32) -> Option<Orientation> {
        if self.drag != DragState::Dragging || !dx.is_finite() || dx == 0.0 {
            return None;
        }
        Some(self.rotate(dx * self.sensitivity))
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Update the joystick deflection. The horizontal axis sets the angular
    /// velocity; deflection inside the dead zone counts as a release.
    pub fn joystick_move(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let x = x.clamp(-1.0, 1.0);
        let y = y.clamp(-1.0, 1.0);
        let magnitude = (x * x + y * y).sqrt().min(1.0);
        if magnitude > self.dead_zone {
            self.joystick = JoystickState::Active;
            self.velocity = x * self.joystick_rate;
        } else if self.joystick == JoystickState::Active {
            self.joystick_release();
        }
    }

    /// Let go of the joystick: the last velocity decays geometrically.
    pub fn joystick_release(&mut self) {
        if self.joystick == JoystickState::Idle {
            return;
        }
        self.joystick = if self.velocity.abs() < self.epsilon {
            self.velocity = 0.0;
            JoystickState::Idle
        } else {
            JoystickState::Decaying
        };
    }

    /// Returns false if the key was already held.
    pub fn key_down(&mut self, key: RotateKey) -> bool {
        if self.held.contains(&key) {
            return false;
        }
        self.held.push(key).is_ok()
    }

    pub fn key_up(&mut self, key: RotateKey) {
        self.held.retain(|&k| k != key);
    }

    /// Advance one animation tick: apply joystick velocity (active or
    /// decaying) and held-key rotation.
    pub fn tick(&mut self) -> Option<Orientation> {
        let mut delta = 0.0;
        match self.joystick {
            JoystickState::Idle => {}
            JoystickState::Active => delta += self.velocity,
            JoystickState::Decaying => {
                self.velocity *= self.decay;
                if self.velocity.abs() < self.epsilon {
                    self.velocity = 0.0;
                    self.joystick = JoystickState::Idle;
                } else {
                    delta += self.velocity;
                }
            }
        }
        for key in &self.held {
            delta += key.sign() * self.key_rate;
        }
        if delta == 0.0 {
            return None;
        }
        Some(self.rotate(delta))
    }

    /// Face front and stop any joystick inertia.
    pub fn reset(&mut self) -> Orientation {
        self.angle = Orientation::default();
        self.velocity = 0.0;
        self.joystick = JoystickState::Idle;
        self.angle
    }

    pub fn angle(&self) -> Orientation {
        self.angle
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn joystick_state(&self) -> JoystickState {
        self.joystick
    }

    /// Joystick angular velocity in degrees per tick.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn held_keys(&self) -> &[RotateKey] {
        &self.held
    }

    /// True while some source will change the angle on the next tick.
    pub fn is_rotating(&self) -> bool {
        self.joystick != JoystickState::Idle || !self.held.is_empty()
    }

    fn rotate(&mut self, delta: f32) -> Orientation {
        self.angle = self.angle.rotated(delta);
        self.angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> OrientationController {
        OrientationController::default()
    }

    #[test]
    fn drag_only_rotates_while_dragging() {
        let mut c = controller();
        assert_eq!(c.pointer_move(100.0), None);
        assert!(!c.pointer_down(false));
        assert_eq!(c.drag_state(), DragState::Idle);
        assert!(c.pointer_down(true));
        assert_eq!(c.drag_state(), DragState::Dragging);
        let o = c.pointer_move(100.0).unwrap();
        assert!((o.degrees() - 30.0).abs() < 1e-4);
        c.pointer_up();
        assert_eq!(c.pointer_move(100.0), None);
    }

    #[test]
    fn drag_deltas_wrap() {
        let mut c = controller();
        c.pointer_down(true);
        // 1000 px * 0.3 = 300°, then -1500 px * 0.3 = -450° → -150° ≡ 210°
        c.pointer_move(1000.0);
        c.pointer_move(-1500.0);
        assert!((c.angle().degrees() - 210.0).abs() < 1e-3);
        for _ in 0..10 {
            c.pointer_move(400.0);
        }
        // 210 + 1200 = 1410 ≡ 330
        assert!((c.angle().degrees() - 330.0).abs() < 1e-2);
        assert!((0.0..360.0).contains(&c.angle().degrees()));
    }

    #[test]
    fn joystick_dead_zone() {
        let mut c = controller();
        c.joystick_move(0.1, 0.1);
        assert_eq!(c.joystick_state(), JoystickState::Idle);
        assert_eq!(c.tick(), None);
        c.joystick_move(1.0, 0.0);
        assert_eq!(c.joystick_state(), JoystickState::Active);
        let o = c.tick().unwrap();
        assert!((o.degrees() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn joystick_release_decays_within_44_ticks() {
        let config = EngineConfig {
            joystick_rate: 1.0,
            ..EngineConfig::default()
        };
        let mut c = OrientationController::new(&config);
        c.joystick_move(1.0, 0.0);
        for _ in 0..20 {
            c.tick();
        }
        c.joystick_release();
        assert_eq!(c.joystick_state(), JoystickState::Decaying);
        let mut ticks = 0;
        while c.joystick_state() == JoystickState::Decaying {
            c.tick();
            ticks += 1;
            assert!(ticks <= 44, "velocity still {} after {} ticks", c.velocity(), ticks);
        }
        assert_eq!(ticks, 44);
        assert_eq!(c.velocity(), 0.0);
        assert_eq!(c.tick(), None);
    }

    #[test]
    fn decay_keeps_turning_in_same_direction() {
        let mut c = controller();
        c.joystick_move(-1.0, 0.0);
        c.joystick_release();
        let before = c.angle().degrees();
        c.tick();
        // Turning left from 0 wraps to just under 360.
        assert!(c.angle().degrees() > 350.0 && c.angle().degrees() != before);
    }

    #[test]
    fn held_keys_rotate_each_tick() {
        let mut c = controller();
        assert!(c.key_down(RotateKey::Right));
        assert!(!c.key_down(RotateKey::Right));
        c.tick();
        c.tick();
        assert!((c.angle().degrees() - 4.0).abs() < 1e-5);
        c.key_down(RotateKey::Left);
        assert_eq!(c.tick(), None);
        c.key_up(RotateKey::Right);
        c.tick();
        assert!((c.angle().degrees() - 2.0).abs() < 1e-5);
        c.key_up(RotateKey::Left);
        assert!(!c.is_rotating());
    }

    #[test]
    fn sources_compose() {
        let mut c = controller();
        c.key_down(RotateKey::Right);
        c.joystick_move(1.0, 0.0);
        c.tick();
        assert!((c.angle().degrees() - 5.0).abs() < 1e-5);
        c.pointer_down(true);
        c.pointer_move(10.0);
        assert!((c.angle().degrees() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn reset_zeroes_angle_and_velocity() {
        let mut c = controller();
        c.joystick_move(1.0, 0.0);
        c.tick();
        let o = c.handle(InputEvent::ResetOrientation).unwrap();
        assert_eq!(o.degrees(), 0.0);
        assert_eq!(c.velocity(), 0.0);
        assert_eq!(c.joystick_state(), JoystickState::Idle);
        assert_eq!(c.tick(), None);
    }

    #[test]
    fn non_finite_input_ignored() {
        let mut c = controller();
        c.pointer_down(true);
        assert_eq!(c.pointer_move(f32::NAN), None);
        c.joystick_move(f32::INFINITY, 0.0);
        assert_eq!(c.joystick_state(), JoystickState::Idle);
        assert_eq!(c.angle().degrees(), 0.0);
    }
}
