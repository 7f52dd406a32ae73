use super::pool::{Handle, Resettable};
use common::shapes::Rectangle;

/// Pooled item handle. Valid from `obtain_item` until the item is released,
/// rejected by `insert`, or swept by `clear`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemHandle(pub(crate) Handle);

impl ItemHandle {
    pub fn index(&self) -> u32 {
        self.0.index
    }

    pub fn generation(&self) -> u32 {
        self.0.generation
    }
}

/// A user payload bound to the rectangle it is indexed under. Freshly
/// obtained items carry no payload.
#[derive(Debug, Clone)]
pub struct Item<T> {
    payload: Option<T>,
    bounds: Rectangle,
    pub(crate) inserted: bool,
}

impl<T> Item<T> {
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn payload_mut(&mut self) -> Option<&mut T> {
        self.payload.as_mut()
    }

    pub fn set_payload(&mut self, payload: T) {
        self.payload = Some(payload);
    }

    pub fn take_payload(&mut self) -> Option<T> {
        self.payload.take()
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rectangle) {
        self.bounds = bounds;
    }

    /// True while the item sits in a node of the tree.
    pub fn is_inserted(&self) -> bool {
        self.inserted
    }
}

impl<T> Default for Item<T> {
    fn default() -> Self {
        Item {
            payload: None,
            bounds: Rectangle::default(),
            inserted: false,
        }
    }
}

impl<T> Resettable for Item<T> {
    fn reset(&mut self) {
        self.payload = None;
        self.bounds = Rectangle::default();
        self.inserted = false;
    }
}
