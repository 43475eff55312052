//! Single-slot memo of the most recently filtered window.

use crate::domain::trade::Trade;
use crate::domain::window::Window;
use chrono::NaiveDate;
use std::rc::Rc;

/// Identity of a filter result: the window and the day it was resolved
/// against, so relative windows never outlive a date rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowKey {
    pub window: Window,
    pub today: NaiveDate,
}

impl WindowKey {
    pub fn new(window: Window, today: NaiveDate) -> Self {
        Self { window, today }
    }
}

#[derive(Debug, Default)]
pub struct FilterCache {
    slot: Option<(WindowKey, Rc<Vec<Trade>>)>,
    hits: u64,
    misses: u64,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &WindowKey) -> Option<Rc<Vec<Trade>>> {
        match &self.slot {
            Some((cached, result)) if cached == key => {
                self.hits += 1;
                Some(Rc::clone(result))
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, key: WindowKey, result: Rc<Vec<Trade>>) {
        self.slot = Some((key, result));
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn cached_key(&self) -> Option<&WindowKey> {
        self.slot.as_ref().map(|(key, _)| key)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
