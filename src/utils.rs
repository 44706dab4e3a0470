use std::{cell::Cell, rc::Rc};

/// A shared, copyable slot. Clones alias the same value.
#[derive(Debug, Default)]
pub struct RcCell<T: Copy> {
	inner: Rc<Cell<T>>,
}

impl<T: Copy> Clone for RcCell<T> {
	fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<T: Copy> RcCell<T> {
	pub fn new(value: T) -> Self { Self { inner: Rc::new(Cell::new(value)) } }

	pub fn get(&self) -> T { self.inner.get() }

	pub fn set(&self, value: T) { self.inner.set(value) }

	/// Whether both handles alias the same slot.
	pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.inner, &other.inner) }
}
