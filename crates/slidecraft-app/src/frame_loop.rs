//! Ownership slot for a self-rescheduling frame callback.
//!
//! An animation-frame callback has to reach itself to request the next
//! frame. Capturing a strong reference to its own slot forms a cycle and
//! keeps the callback (and everything it captured) alive forever. The host
//! owns the [`FrameLoopSlot`]; the callback only holds a [`LoopRef`], which
//! goes dead once the host clears or drops the slot.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Strong owner of the installed callback.
pub struct FrameLoopSlot<T> {
    slot: Rc<RefCell<Option<T>>>,
}

impl<T> Default for FrameLoopSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameLoopSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Non-owning handle for the callback to capture.
    pub fn downgrade(&self) -> LoopRef<T> {
        LoopRef {
            slot: Rc::downgrade(&self.slot),
        }
    }

    /// Install `callback`, dropping any previous one.
    pub fn install(&self, callback: T) {
        let previous = self.slot.borrow_mut().replace(callback);
        drop(previous);
    }

    /// Drop the installed callback. Returns `true` if one was installed.
    pub fn clear(&self) -> bool {
        let previous = self.slot.borrow_mut().take();
        previous.is_some()
    }

    pub fn is_installed(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

/// Weak view of a [`FrameLoopSlot`].
pub struct LoopRef<T> {
    slot: Weak<RefCell<Option<T>>>,
}

impl<T> Clone for LoopRef<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> LoopRef<T> {
    /// Run `f` on the installed callback. `None` once the slot is cleared
    /// or its owner is gone.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let slot = self.slot.upgrade()?;
        let callback = slot.borrow();
        callback.as_ref().map(f)
    }
}
