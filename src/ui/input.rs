/// Keyboard input tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while a key is held (rate-limited by the caller)
///   - Edge-triggered dig (only fires on initial press)
///
/// Release is detected by timeout: a key counts as held until no
/// Press/Repeat event has arrived for `HOLD_TIMEOUT`.
///
/// ## Key map
///   arrows / WASD  move
///   z / q          dig left
///   c / x / e      dig right
///   Esc, Ctrl+C    quit

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use loderunner::domain::entity::{Command, Facing, MoveDir};

/// After this duration without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_DIG_L: &[KeyCode] = &[KeyCode::Char('z'), KeyCode::Char('Z'), KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_DIG_R: &[KeyCode] = &[
    KeyCode::Char('c'), KeyCode::Char('C'),
    KeyCode::Char('x'), KeyCode::Char('X'),
    KeyCode::Char('e'), KeyCode::Char('E'),
];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most
    /// recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            self.raw_events.push(key);

            if key.kind == KeyEventKind::Release {
                continue;
            }
            let was_held = self.is_held(key.code);
            self.last_active.insert(key.code, Instant::now());
            if !was_held {
                self.fresh_presses.push(key.code);
            }
        }

        // Expire keys that have timed out
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Any key at all went down this frame.
    pub fn any_key_pressed(&self) -> bool {
        !self.fresh_presses.is_empty()
    }

    fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    pub fn quit_requested(&self) -> bool {
        self.ctrl_c_pressed() || self.was_pressed(KeyCode::Esc)
    }

    /// The command for this frame, if any. Digs are edge-triggered and
    /// always allowed; movement follows held keys only when `can_move`.
    pub fn command(&self, can_move: bool) -> Option<Command> {
        if self.ctrl_c_pressed() {
            return None;
        }
        if let Some(facing) = self.dig_press() {
            return Some(Command::Dig(facing));
        }
        if can_move {
            return self.movement().map(Command::Move);
        }
        None
    }

    fn dig_press(&self) -> Option<Facing> {
        if self.any_pressed(KEYS_DIG_L) {
            Some(Facing::Left)
        } else if self.any_pressed(KEYS_DIG_R) {
            Some(Facing::Right)
        } else {
            None
        }
    }

    fn movement(&self) -> Option<MoveDir> {
        if self.any_held(KEYS_UP) || self.any_pressed(KEYS_UP) {
            Some(MoveDir::Up)
        } else if self.any_held(KEYS_DOWN) || self.any_pressed(KEYS_DOWN) {
            Some(MoveDir::Down)
        } else if self.any_held(KEYS_LEFT) || self.any_pressed(KEYS_LEFT) {
            Some(MoveDir::Left)
        } else if self.any_held(KEYS_RIGHT) || self.any_pressed(KEYS_RIGHT) {
            Some(MoveDir::Right)
        } else {
            None
        }
    }
}
