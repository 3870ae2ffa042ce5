//! Tracks the meters that are active on the current thread.
//!
//! A meter becomes active when it is started and stops being active when it is resolved or
//! dropped. The innermost active meter is the default parent of meters created afterwards on
//! the same thread.

use std::cell::RefCell;

thread_local! {
    static ACTIVE_METERS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn push(full_id: String) {
    ACTIVE_METERS.with_borrow_mut(|active| active.push(full_id));
}

/// Removes the most recent activation of `full_id`.
///
/// Meters are not required to be resolved in the reverse order of starting, so the entry is
/// searched for rather than popped.
pub(crate) fn remove(full_id: &str) {
    ACTIVE_METERS.with_borrow_mut(|active| {
        if let Some(index) = active.iter().rposition(|id| id == full_id) {
            active.remove(index);
        }
    });
}

/// The full ID of the innermost meter that has been started but not yet resolved on the current
/// thread, if any.
///
/// # Examples
///
/// ```
/// use log_meter::{Session, current_meter_id};
///
/// let session = Session::new();
/// assert_eq!(current_meter_id(), None);
///
/// let mut meter = session.operation_meter("jobs", "nightly");
/// meter.start();
/// assert_eq!(current_meter_id().as_deref(), Some("jobs/nightly#1"));
///
/// meter.ok();
/// assert_eq!(current_meter_id(), None);
/// ```
#[must_use]
pub fn current_meter_id() -> Option<String> {
    ACTIVE_METERS.with_borrow(|active| active.last().cloned())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn innermost_is_current() {
        push("a#1".to_string());
        push("b#1".to_string());
        assert_eq!(current_meter_id().as_deref(), Some("b#1"));

        remove("b#1");
        assert_eq!(current_meter_id().as_deref(), Some("a#1"));

        remove("a#1");
        assert_eq!(current_meter_id(), None);
    }

    #[test]
    fn out_of_order_removal() {
        push("a#1".to_string());
        push("b#1".to_string());

        remove("a#1");
        assert_eq!(current_meter_id().as_deref(), Some("b#1"));

        remove("b#1");
        assert_eq!(current_meter_id(), None);
    }

    #[test]
    fn removing_unknown_is_ignored() {
        remove("never#1");
        assert_eq!(current_meter_id(), None);
    }

    #[test]
    fn per_thread() {
        push("main#1".to_string());

        let other = std::thread::spawn(current_meter_id).join().unwrap();
        assert_eq!(other, None);

        remove("main#1");
    }
}
