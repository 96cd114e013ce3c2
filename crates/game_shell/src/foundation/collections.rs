//! Specialized collection types

pub use slotmap::{new_key_type, SecondaryMap, SlotMap};

new_key_type! {
    /// Opaque handle to a node owned by the host scene graph
    pub struct NodeId;

    /// Handle to a scheduled timer in a [`TimerQueue`](crate::foundation::time::TimerQueue)
    pub struct TimerId;
}
