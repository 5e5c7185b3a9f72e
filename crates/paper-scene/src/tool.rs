use kurbo::{Point, Vec2};

use crate::{Props, ToolId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolEventKind {
    MouseDown,
    MouseDrag,
    MouseUp,
    MouseMove,
    KeyDown,
    KeyUp,
}

impl ToolEventKind {
    /// Name of the handler field that receives this event.
    pub fn handler_name(self) -> &'static str {
        match self {
            ToolEventKind::MouseDown => "onMouseDown",
            ToolEventKind::MouseDrag => "onMouseDrag",
            ToolEventKind::MouseUp => "onMouseUp",
            ToolEventKind::MouseMove => "onMouseMove",
            ToolEventKind::KeyDown => "onKeyDown",
            ToolEventKind::KeyUp => "onKeyUp",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolEvent {
    pub tool: ToolId,
    pub kind: ToolEventKind,
    pub point: Point,
    /// Movement since the previous pointer event seen by the scope.
    pub delta: Vec2,
    pub key: Option<String>,
}

/// Input listener bound to the scope's surface. At most one is active.
#[derive(Clone, Debug, Default)]
pub struct Tool {
    pub(crate) fields: Props,
}

impl Tool {
    pub fn fields(&self) -> &Props {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&crate::Value> {
        self.fields.get(key)
    }
}
