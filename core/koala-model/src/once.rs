use std::cell::OnceCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{ModelError, Result};

/// Values that can live in a [`WriteOnce`] slot.
pub trait OnceValue {
    /// Re-assigning the held value is a no-op, anything else is rejected.
    fn is_same(&self, other: &Self) -> bool;

    fn describe(&self) -> String;
}

impl OnceValue for usize {
    fn is_same(&self, other: &Self) -> bool {
        self == other
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl OnceValue for u32 {
    fn is_same(&self, other: &Self) -> bool {
        self == other
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl<T: fmt::Display> OnceValue for Weak<T> {
    fn is_same(&self, other: &Self) -> bool {
        Weak::ptr_eq(self, other)
    }

    fn describe(&self) -> String {
        self.upgrade()
            .map(|value| format!("'{}'", value))
            .unwrap_or_else(|| "<dropped>".to_string())
    }
}

/// A late-bound field: starts empty, accepts exactly one value.
pub struct WriteOnce<T> {
    field: &'static str,
    cell: OnceCell<T>,
}

impl<T> WriteOnce<T> {
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: OnceValue> WriteOnce<T> {
    /// Fails if the slot is occupied. `new` only renders the rejected value.
    pub fn ensure_vacant(&self, new: impl FnOnce() -> String) -> Result<()> {
        match self.cell.get() {
            Some(old) => Err(ModelError::WriteOnce {
                field: self.field,
                old: old.describe(),
                new: new(),
            }),
            None => Ok(()),
        }
    }

    pub fn set(&self, value: T) -> Result<()> {
        match self.cell.get() {
            Some(old) if old.is_same(&value) => Ok(()),
            Some(old) => Err(ModelError::WriteOnce {
                field: self.field,
                old: old.describe(),
                new: value.describe(),
            }),
            None => {
                let _ = self.cell.set(value);
                Ok(())
            }
        }
    }
}

impl<T> WriteOnce<Weak<T>> {
    pub fn upgrade(&self) -> Option<Rc<T>> {
        self.cell.get().and_then(Weak::upgrade)
    }
}

impl<T: fmt::Debug> fmt::Debug for WriteOnce<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => write!(f, "{}={:?}", self.field, value),
            None => write!(f, "{}=<unset>", self.field),
        }
    }
}

/// Upgrades a back-reference list, skipping targets that were already dropped.
pub(crate) fn upgrade_all<T>(refs: &[Weak<T>]) -> Vec<Rc<T>> {
    refs.iter().filter_map(Weak::upgrade).collect()
}
