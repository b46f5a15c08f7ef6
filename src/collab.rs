//! Narrow interfaces to collaborators the controller calls out to.

use std::collections::HashMap;

use crate::error::InventoryError;

/// Pays for abilities that cost items.
pub trait Inventory {
    fn consume(&mut self, item: &str) -> Result<(), InventoryError>;
}

/// User-facing notifications.
pub trait Notifier {
    fn toast(&mut self, message: &str);
}

/// Simple in-memory item counts.
#[derive(Clone, Debug, Default)]
pub struct Stockpile {
    counts: HashMap<String, u32>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(item: &str, count: u32) -> Self {
        let mut s = Self::new();
        s.add(item, count);
        s
    }

    pub fn add(&mut self, item: &str, count: u32) {
        *self.counts.entry(item.to_string()).or_default() += count;
    }

    pub fn count(&self, item: &str) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }
}

impl Inventory for Stockpile {
    fn consume(&mut self, item: &str) -> Result<(), InventoryError> {
        match self.counts.get_mut(item) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Ok(())
            }
            _ => Err(InventoryError::OutOfStock { item: item.to_string() }),
        }
    }
}

/// Collects toasts instead of showing them.
#[derive(Clone, Debug, Default)]
pub struct ToastLog {
    pub messages: Vec<String>,
}

impl Notifier for ToastLog {
    fn toast(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Borrowed collaborators for one controller step.
pub struct Collaborators<'a> {
    pub inventory: &'a mut dyn Inventory,
    pub notifier: &'a mut dyn Notifier,
}
