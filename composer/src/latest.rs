use std::cell::Ref;
use std::cell::RefCell;
use std::rc::Rc;

/// A render-stable cell holding the most recently rendered value of a prop.
///
/// The host rebuilds its props every pass, so closures and option values
/// change identity constantly. The composer writes each of them into a
/// `Latest` before running any effect and reads them back from event
/// handlers, which means handlers always observe the last completed render
/// while the cell itself (and anything keyed on it) stays the same object.
///
/// Clones share storage: writing through one clone is visible through all.
pub struct Latest<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> Latest<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    /// Overwrites the stored value, returning the previous one.
    pub fn set(&self, value: T) -> T {
        self.cell.replace(value)
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.cell.borrow()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    /// True when both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: Clone> Latest<T> {
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: Default> Default for Latest<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Latest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Latest").field(&*self.cell.borrow()).finish()
    }
}
