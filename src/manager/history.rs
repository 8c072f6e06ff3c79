//! Change notifications.
//!
//! Every value whose content changed during a round, and every style whose
//! parameters changed, produces a [`ChangeNotice`]. Notices go to the
//! registered [`ChangeListener`]s (list views, previews) and into a bounded
//! history kept in a persistent vector, so handing out a snapshot is cheap.

use std::rc::{Rc, Weak};

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{CardId, ChangeMask, FieldIndex, StyleSheetId};
use crate::data::ValueRef;

/// Something that changed during propagation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeNotice {
    /// A value got new content.
    Value {
        value: ValueRef,
        card: Option<CardId>,
    },

    /// A style changed in the given categories.
    Style {
        stylesheet: StyleSheetId,
        field: FieldIndex,
        extra: bool,
        changes: ChangeMask,
    },
}

/// Receives change notices. Listeners must not mutate the set from inside
/// the callback; queue an event instead.
pub trait ChangeListener {
    fn on_change(&self, notice: &ChangeNotice);
}

/// History of notices plus weakly held listeners.
#[derive(Clone, Default)]
pub struct ChangeLog {
    history: Vector<ChangeNotice>,
    limit: Option<usize>,
    listeners: Vec<Weak<dyn ChangeListener>>,
}

impl std::fmt::Debug for ChangeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeLog")
            .field("history", &self.history.len())
            .field("limit", &self.limit)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ChangeLog {
    /// Create a log keeping at most `limit` notices; `None` keeps all.
    #[must_use]
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            history: Vector::new(),
            limit,
            listeners: Vec::new(),
        }
    }

    /// Register a listener. It is held weakly.
    pub fn add_listener(&mut self, listener: &Rc<dyn ChangeListener>) {
        self.listeners.push(Rc::downgrade(listener));
    }

    /// Unregister a listener.
    pub fn remove_listener(&mut self, listener: &Rc<dyn ChangeListener>) {
        let target = Rc::downgrade(listener);
        self.listeners.retain(|l| !l.ptr_eq(&target));
    }

    /// Record a notice and tell live listeners.
    pub fn tell(&mut self, notice: ChangeNotice) {
        self.listeners.retain(|l| match l.upgrade() {
            Some(listener) => {
                listener.on_change(&notice);
                true
            }
            None => false,
        });
        if self.limit == Some(0) {
            return;
        }
        self.history.push_back(notice);
        if let Some(limit) = self.limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    /// Recorded notices, oldest first.
    #[must_use]
    pub fn history(&self) -> Vector<ChangeNotice> {
        self.history.clone()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| l.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Collect {
        seen: RefCell<Vec<ChangeNotice>>,
    }

    impl ChangeListener for Collect {
        fn on_change(&self, notice: &ChangeNotice) {
            self.seen.borrow_mut().push(notice.clone());
        }
    }

    fn notice(field: u32) -> ChangeNotice {
        ChangeNotice::Value {
            value: ValueRef::Set(FieldIndex(field)),
            card: None,
        }
    }

    #[test]
    fn test_history_bounded() {
        let mut log = ChangeLog::new(Some(2));
        for i in 0..5 {
            log.tell(notice(i));
        }
        let history = log.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], notice(3));
        assert_eq!(history[1], notice(4));
    }

    #[test]
    fn test_listeners_are_weak() {
        let mut log = ChangeLog::new(None);
        let collect = Rc::new(Collect::default());
        let listener: Rc<dyn ChangeListener> = collect.clone();
        log.add_listener(&listener);
        log.tell(notice(0));
        assert_eq!(collect.seen.borrow().len(), 1);

        drop(listener);
        drop(collect);
        log.tell(notice(1));
        assert_eq!(log.listener_count(), 0);
        assert_eq!(log.history().len(), 2);
    }

    #[test]
    fn test_remove_listener() {
        let mut log = ChangeLog::new(None);
        let collect = Rc::new(Collect::default());
        let listener: Rc<dyn ChangeListener> = collect.clone();
        log.add_listener(&listener);
        log.remove_listener(&listener);
        log.tell(notice(0));
        assert!(collect.seen.borrow().is_empty());
    }
}
