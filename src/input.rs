//! Input aggregation
//!
//! Raw touch, joystick and button samples are folded into one [`FrameInput`]
//! per frame:
//! - joystick: deadzone around the rest value, dominant axis wins
//! - buttons: edge on release -> press only, never while held
//! - pointer: tap vs drag by total travel from touch-down, plus swipes
//! - held directions: auto-repeat for menus and steering
//!
//! The [`DebounceGate`] lives here too; whoever performs a state-changing
//! action asks it first.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::platform::InputSource;
use crate::sim::grid::Direction;

/// Touch panel reading in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: i32,
    pub y: i32,
    pub touched: bool,
}

impl PointerSample {
    pub const fn at(x: i32, y: i32) -> Self {
        Self { x, y, touched: true }
    }

    pub const fn released() -> Self {
        Self {
            x: 0,
            y: 0,
            touched: false,
        }
    }
}

/// Joystick reading relative to centre
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickSample {
    pub dx: i32,
    pub dy: i32,
    pub direction: Direction,
    /// Outside the deadzone
    pub active: bool,
}

impl StickSample {
    /// Interpret raw ADC readings (rest value [`JOYSTICK_CENTER`])
    pub fn from_raw(raw_x: i32, raw_y: i32) -> Self {
        let dx = raw_x - JOYSTICK_CENTER;
        let dy = raw_y - JOYSTICK_CENTER;
        let active = dx.abs() > JOYSTICK_DEADZONE || dy.abs() > JOYSTICK_DEADZONE;
        Self {
            dx,
            dy,
            direction: if active {
                Direction::dominant(dx, dy)
            } else {
                Direction::None
            },
            active,
        }
    }

    /// Analog deflection, each axis in [-1, 1]; zero inside the deadzone
    pub fn axis(&self) -> Vec2 {
        if !self.active {
            return Vec2::ZERO;
        }
        let scale = JOYSTICK_CENTER as f32;
        Vec2::new(self.dx as f32 / scale, self.dy as f32 / scale).clamp(Vec2::splat(-1.0), Vec2::ONE)
    }
}

/// Discrete button levels and driver-reported edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSample {
    pub a_pressed: bool,
    pub b_pressed: bool,
    pub a_just_pressed: bool,
    pub b_just_pressed: bool,
}

/// Released -> pressed detector
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    was_down: bool,
}

impl EdgeDetector {
    /// True only on the poll where the button goes down
    pub fn update(&mut self, pressed: bool, just_pressed: bool) -> bool {
        let edge = (pressed || just_pressed) && !self.was_down;
        self.was_down = pressed;
        edge
    }
}

/// One button after edge detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Button {
    pub held: bool,
    pub pressed: bool,
}

/// When a closed gate reopens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebouncePolicy {
    /// Fixed time after the trigger
    Cooldown(u64),
    /// Once nothing has touched the panel or held a button for this long
    ReleaseIdle(u64),
}

impl DebouncePolicy {
    pub const fn cooldown() -> Self {
        DebouncePolicy::Cooldown(COOLDOWN_MS)
    }

    pub const fn release_idle() -> Self {
        DebouncePolicy::ReleaseIdle(RELEASE_IDLE_MS)
    }
}

/// Global suppression of repeated triggers from one physical action
#[derive(Debug, Clone, Copy, Default)]
pub struct DebounceGate {
    lock: Option<(u64, DebouncePolicy)>,
    last_contact_ms: u64,
}

impl DebounceGate {
    /// Feed the current contact state (any touch or held button). A
    /// release-idle lock lifts here, once the panel has been quiet long enough,
    /// so the next press is accepted on the frame it lands.
    pub fn observe(&mut self, now_ms: u64, contact: bool) {
        if contact {
            self.last_contact_ms = now_ms;
            return;
        }
        if let Some((at, DebouncePolicy::ReleaseIdle(ms))) = self.lock
            && now_ms.saturating_sub(self.last_contact_ms.max(at)) >= ms
        {
            self.lock = None;
        }
    }

    pub fn is_open(&self, now_ms: u64) -> bool {
        match self.lock {
            None => true,
            Some((at, DebouncePolicy::Cooldown(ms))) => now_ms.saturating_sub(at) >= ms,
            Some((_, DebouncePolicy::ReleaseIdle(_))) => false,
        }
    }

    /// Claim the gate for an action. Returns false (and changes nothing)
    /// while a previous action still holds it.
    pub fn accept(&mut self, now_ms: u64, policy: DebouncePolicy) -> bool {
        if !self.is_open(now_ms) {
            return false;
        }
        self.lock = Some((now_ms, policy));
        true
    }
}

/// Tap vs drag classification for one touch
#[derive(Debug, Clone, Copy, Default)]
pub struct TapTracker {
    origin: Option<(i32, i32)>,
    last: (i32, i32),
    dragging: bool,
}

/// What the pointer did this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerGesture {
    /// Touch began this frame
    pub down: bool,
    /// Touch ended without leaving the slop radius; position of the touch
    pub tap: Option<(i32, i32)>,
    /// Movement since last frame while dragging
    pub drag: Option<(i32, i32)>,
}

impl TapTracker {
    pub fn update(&mut self, p: PointerSample) -> PointerGesture {
        let mut gesture = PointerGesture::default();
        match (self.origin, p.touched) {
            (None, true) => {
                self.origin = Some((p.x, p.y));
                self.last = (p.x, p.y);
                self.dragging = false;
                gesture.down = true;
            }
            (Some((ox, oy)), true) => {
                if !self.dragging && ((p.x - ox).abs() + (p.y - oy).abs()) > TAP_SLOP_PX {
                    self.dragging = true;
                }
                if self.dragging {
                    gesture.drag = Some((p.x - self.last.0, p.y - self.last.1));
                }
                self.last = (p.x, p.y);
            }
            (Some(_), false) => {
                if !self.dragging {
                    gesture.tap = Some(self.last);
                }
                self.origin = None;
                self.dragging = false;
            }
            (None, false) => {}
        }
        gesture
    }
}

/// Swipe steering: a direction each time the finger travels past the
/// threshold from the anchor; the anchor then moves to the finger
#[derive(Debug, Clone, Copy, Default)]
pub struct SwipeTracker {
    anchor: Option<(i32, i32)>,
}

impl SwipeTracker {
    pub fn update(&mut self, p: PointerSample) -> Direction {
        if !p.touched {
            self.anchor = None;
            return Direction::None;
        }
        let Some((ax, ay)) = self.anchor else {
            self.anchor = Some((p.x, p.y));
            return Direction::None;
        };
        let (dx, dy) = (p.x - ax, p.y - ay);
        if dx.abs() > SWIPE_THRESHOLD_PX || dy.abs() > SWIPE_THRESHOLD_PX {
            self.anchor = Some((p.x, p.y));
            Direction::dominant(dx, dy)
        } else {
            Direction::None
        }
    }
}

/// Emits a held direction immediately when it changes, then every `period_ms`
#[derive(Debug, Clone, Copy)]
pub struct HoldRepeat {
    period_ms: u64,
    held: Direction,
    last_emit_ms: u64,
}

impl HoldRepeat {
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            held: Direction::None,
            last_emit_ms: 0,
        }
    }

    pub fn update(&mut self, dir: Direction, now_ms: u64) -> Direction {
        if dir == Direction::None {
            self.held = Direction::None;
            return Direction::None;
        }
        if dir != self.held || now_ms.saturating_sub(self.last_emit_ms) >= self.period_ms {
            self.held = dir;
            self.last_emit_ms = now_ms;
            return dir;
        }
        Direction::None
    }
}

/// Everything the rest of the frame needs to know about input
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub now_ms: u64,
    pub stick: StickSample,
    /// Menu cursor movement (auto-repeating)
    pub nav: Direction,
    /// Steering request: swipe, else the repeating joystick direction
    pub steer: Direction,
    pub pointer: PointerSample,
    pub gesture: PointerGesture,
    pub a: Button,
    pub b: Button,
}

impl FrameInput {
    /// Any button or touch currently held
    pub fn contact(&self) -> bool {
        self.pointer.touched || self.a.held || self.b.held
    }

    /// Same frame with its edges spent; levels and the pointer remain
    pub fn consumed(&self) -> FrameInput {
        FrameInput {
            a: Button { pressed: false, ..self.a },
            b: Button { pressed: false, ..self.b },
            gesture: PointerGesture {
                down: false,
                tap: None,
                ..self.gesture
            },
            ..*self
        }
    }
}

/// Per-frame poller over an [`InputSource`]
#[derive(Debug, Clone)]
pub struct InputAggregator {
    a: EdgeDetector,
    b: EdgeDetector,
    taps: TapTracker,
    swipes: SwipeTracker,
    nav: HoldRepeat,
    steer: HoldRepeat,
    gate: DebounceGate,
}

impl Default for InputAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl InputAggregator {
    pub fn new() -> Self {
        Self {
            a: EdgeDetector::default(),
            b: EdgeDetector::default(),
            taps: TapTracker::default(),
            swipes: SwipeTracker::default(),
            nav: HoldRepeat::new(NAV_REPEAT_MS),
            steer: HoldRepeat::new(STEER_REPEAT_MS),
            gate: DebounceGate::default(),
        }
    }

    /// Read every source once. Sources report failures as "nothing held".
    pub fn poll(&mut self, source: &mut impl InputSource, now_ms: u64) -> FrameInput {
        let pointer = source.pointer(SCREEN_W, SCREEN_H);
        let stick = source.directional();
        let buttons = source.buttons();

        let a = Button {
            held: buttons.a_pressed,
            pressed: self.a.update(buttons.a_pressed, buttons.a_just_pressed),
        };
        let b = Button {
            held: buttons.b_pressed,
            pressed: self.b.update(buttons.b_pressed, buttons.b_just_pressed),
        };

        let gesture = self.taps.update(pointer);
        let swipe = self.swipes.update(pointer);
        let stick_dir = if stick.active {
            stick.direction
        } else {
            Direction::None
        };
        let steer = self.steer.update(stick_dir, now_ms);

        let input = FrameInput {
            now_ms,
            stick,
            nav: self.nav.update(stick_dir, now_ms),
            steer: if swipe != Direction::None { swipe } else { steer },
            pointer,
            gesture,
            a,
            b,
        };
        self.gate.observe(now_ms, input.contact());
        input
    }

    pub fn gate_mut(&mut self) -> &mut DebounceGate {
        &mut self.gate
    }
}
