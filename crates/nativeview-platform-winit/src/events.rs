use std::time::{Duration, Instant};

use nativeview_core::input::{buttons, InputEvent};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pointer travel (px) beyond which a press no longer produces a click.
pub const CLICK_SLOP_PX: i32 = 4;

const TRACKED_BUTTONS: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
struct ButtonInfo {
    down: bool,
    down_pos: (i32, i32),
    moved: bool,
    last_press: Option<Instant>,
    last_press_pos: (i32, i32),
    count: i32,
}

/// Turns raw winit pointer events into boundary-level [`InputEvent`]s.
///
/// Tracks cursor position, held buttons and multi-click counts, which winit
/// does not report: a release without travel yields a `Click` whose count
/// grows while presses keep landing within the double-click interval.
#[derive(Debug)]
pub struct PointerTracker {
    cursor: (i32, i32),
    enter_pending: bool,
    buttons: [ButtonInfo; TRACKED_BUTTONS],
    double_click: Duration,
    pixels_per_line: f64,
}

impl PointerTracker {
    pub fn new(double_click: Duration, pixels_per_line: f64) -> Self {
        Self {
            cursor: (0, 0),
            enter_pending: false,
            buttons: [ButtonInfo::default(); TRACKED_BUTTONS],
            double_click,
            pixels_per_line: if pixels_per_line > 0.0 { pixels_per_line } else { 120.0 },
        }
    }

    #[inline]
    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    /// Translate one window event, appending zero or more input events.
    pub fn translate(&mut self, event: &WindowEvent, now: Instant, out: &mut Vec<InputEvent>) {
        match event {
            WindowEvent::CursorMoved { position, .. } => self.cursor_moved(*position, out),
            WindowEvent::CursorEntered { .. } => self.cursor_entered(),
            WindowEvent::CursorLeft { .. } => self.cursor_left(out),
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse_input(*state, *button, now, out)
            }
            WindowEvent::MouseWheel { delta, .. } => out.push(self.wheel(*delta)),
            _ => {}
        }
    }

    /// A pending `Enter` goes out first, at this position.
    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>, out: &mut Vec<InputEvent>) {
        let (x, y) = (to_px(position.x), to_px(position.y));
        self.cursor = (x, y);

        if std::mem::take(&mut self.enter_pending) {
            out.push(InputEvent::Enter { x, y });
        }

        let mut held = None;
        for (idx, info) in self.buttons.iter_mut().enumerate() {
            if !info.down {
                continue;
            }
            let (dx, dy) = (x - info.down_pos.0, y - info.down_pos.1);
            if dx.abs() > CLICK_SLOP_PX || dy.abs() > CLICK_SLOP_PX {
                info.moved = true;
            }
            held.get_or_insert(idx);
        }

        out.push(match held {
            Some(idx) => InputEvent::Drag { x, y, button: code_of_slot(idx) },
            None => InputEvent::Move { x, y },
        });
    }

    /// winit reports entry before any position; `Enter` waits for the next move.
    #[inline]
    pub fn cursor_entered(&mut self) {
        self.enter_pending = true;
    }

    /// Left without moving: the held-back `Enter` is still paired with `Exit`.
    pub fn cursor_left(&mut self, out: &mut Vec<InputEvent>) {
        let (x, y) = self.cursor;
        if std::mem::take(&mut self.enter_pending) {
            out.push(InputEvent::Enter { x, y });
        }
        out.push(InputEvent::Exit { x, y });
    }

    pub fn mouse_input(
        &mut self,
        state: ElementState,
        button: MouseButton,
        now: Instant,
        out: &mut Vec<InputEvent>,
    ) {
        let code = button_code(button);
        let (x, y) = self.cursor;
        let double_click = self.double_click;

        let Some(info) = slot_of(code).and_then(|s| self.buttons.get_mut(s)) else {
            // Untracked buttons still forward press/release, never clicks.
            out.push(match state {
                ElementState::Pressed => InputEvent::Press { x, y, button: code },
                ElementState::Released => InputEvent::Release { x, y, button: code },
            });
            return;
        };

        match state {
            ElementState::Pressed => {
                let near = (x - info.last_press_pos.0).abs() <= CLICK_SLOP_PX
                    && (y - info.last_press_pos.1).abs() <= CLICK_SLOP_PX;
                let quick = info
                    .last_press
                    .is_some_and(|t| now.saturating_duration_since(t) <= double_click);

                info.count = if near && quick { info.count + 1 } else { 1 };
                info.down = true;
                info.moved = false;
                info.down_pos = (x, y);
                info.last_press = Some(now);
                info.last_press_pos = (x, y);

                out.push(InputEvent::Press { x, y, button: code });
            }
            ElementState::Released => {
                let was_down = info.down;
                info.down = false;

                out.push(InputEvent::Release { x, y, button: code });
                if was_down && !info.moved {
                    out.push(InputEvent::Click { x, y, button: code, count: info.count });
                } else {
                    info.count = 0;
                    info.last_press = None;
                }
            }
        }
    }

    /// Wheel rotation in notches; negative when rotated away from the user.
    pub fn wheel(&self, delta: MouseScrollDelta) -> InputEvent {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => -f64::from(y),
            MouseScrollDelta::PixelDelta(p) => -p.y / self.pixels_per_line,
        };
        InputEvent::Wheel { delta: notches }
    }
}

/// Boundary button number for a winit button.
pub fn button_code(button: MouseButton) -> i32 {
    match button {
        MouseButton::Left => buttons::LEFT,
        MouseButton::Middle => buttons::MIDDLE,
        MouseButton::Right => buttons::RIGHT,
        MouseButton::Back => buttons::BACK,
        MouseButton::Forward => buttons::FORWARD,
        MouseButton::Other(n) => buttons::EXTRA_BASE + i32::from(n),
    }
}

#[inline]
fn slot_of(code: i32) -> Option<usize> {
    usize::try_from(code - 1).ok().filter(|s| *s < TRACKED_BUTTONS)
}

#[inline]
fn code_of_slot(slot: usize) -> i32 {
    // slot < TRACKED_BUTTONS, so this cannot truncate.
    slot as i32 + 1
}

#[inline]
fn to_px(v: f64) -> i32 {
    v.floor() as i32
}
