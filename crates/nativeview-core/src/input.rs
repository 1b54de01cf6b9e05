use crate::boundary::BoundaryCall;

/// Conventional pointer button numbering used on the boundary.
pub mod buttons {
    pub const LEFT: i32 = 1;
    pub const MIDDLE: i32 = 2;
    pub const RIGHT: i32 = 3;
    pub const BACK: i32 = 4;
    pub const FORWARD: i32 = 5;
    /// Extra buttons are numbered from here on.
    pub const EXTRA_BASE: i32 = 6;
}

/// One pointer event from the host toolkit.
///
/// Consumed by exactly one forwarding call; never queued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Click { x: i32, y: i32, button: i32, count: i32 },
    Move { x: i32, y: i32 },
    Drag { x: i32, y: i32, button: i32 },
    Press { x: i32, y: i32, button: i32 },
    Release { x: i32, y: i32, button: i32 },
    Enter { x: i32, y: i32 },
    Exit { x: i32, y: i32 },
    Wheel { delta: f64 },
}

impl InputEvent {
    /// The boundary call this event forwards to.
    pub fn to_call(self) -> BoundaryCall {
        match self {
            Self::Click { x, y, button, count } => BoundaryCall::MouseClick {
                x,
                y,
                button,
                click_count: count,
            },
            Self::Move { x, y } => BoundaryCall::MouseMove { x, y },
            Self::Drag { x, y, button } => BoundaryCall::MouseDrag { x, y, button },
            Self::Press { x, y, button } => BoundaryCall::MousePress { x, y, button },
            Self::Release { x, y, button } => BoundaryCall::MouseRelease { x, y, button },
            Self::Enter { x, y } => BoundaryCall::MouseEnter { x, y },
            Self::Exit { x, y } => BoundaryCall::MouseExit { x, y },
            Self::Wheel { delta } => BoundaryCall::MouseWheel { delta },
        }
    }
}
