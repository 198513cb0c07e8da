use std::cell::Cell;
use std::rc::Rc;

use ratatui::layout::{Position, Rect};

/// Identifier for one control's outside-click subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    region: Rc<Cell<Rect>>,
    open: Rc<Cell<bool>>,
}

/// App-level dispatcher for outside-click dismissal.
///
/// The DOM original hangs one listener on the document per widget; here
/// every mounted control registers an instance-scoped subscription instead,
/// released at teardown, so multiple instances compose without touching
/// each other's state.
#[derive(Default)]
pub struct ClickRouter {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl ClickRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(
        &mut self,
        region: Rc<Cell<Rect>>,
        open: Rc<Cell<bool>>,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, region, open });
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|s| s.id != id);
    }

    /// Route one click: every subscribed control whose region does not
    /// contain the point closes its results.
    pub fn dispatch(&mut self, column: u16, row: u16) {
        let position = Position::new(column, row);
        for subscription in &self.subscriptions {
            if !subscription.region.get().contains(position) {
                subscription.open.set(false);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.subscriptions.len()
    }
}
