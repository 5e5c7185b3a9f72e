use paper_scene::{ItemId, ToolId};

/// Handle to the engine object behind an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instance {
    /// The scope's single view. Never constructed, never removed.
    View,
    Tool(ToolId),
    Item(ItemId),
}

impl Instance {
    pub fn item(self) -> Option<ItemId> {
        match self {
            Instance::Item(id) => Some(id),
            _ => None,
        }
    }

    pub fn tool(self) -> Option<ToolId> {
        match self {
            Instance::Tool(id) => Some(id),
            _ => None,
        }
    }

    /// View and Tool are the only instances that may sit directly on the scope.
    pub fn attaches_to_scope(self) -> bool {
        matches!(self, Instance::View | Instance::Tool(_))
    }
}
