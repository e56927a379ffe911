//! Ticket status transitions
//!
//! Status is derived from assignment unless an admin sets it explicitly.
//! Every call site (create, assign, update, complete) goes through
//! [`next_status`].

use crate::models::TicketStatus;

/// Compute the status a ticket ends up in after a change.
///
/// * `explicit` - status the caller set directly; replaces `current`.
/// * `assigned` - the change set the assignee to an employee.
///
/// Assignment then moves the ticket to `in_progress`, except that a
/// `completed` ticket stays `completed`. A ticket with an assignee is never
/// `open`.
pub fn next_status(
    current: TicketStatus,
    assigned: bool,
    explicit: Option<TicketStatus>,
) -> TicketStatus {
    let base = explicit.unwrap_or(current);
    if !assigned {
        return base;
    }
    match base {
        TicketStatus::Completed => TicketStatus::Completed,
        TicketStatus::Open | TicketStatus::InProgress => TicketStatus::InProgress,
    }
}

/// Status of a freshly created ticket
pub fn initial_status(has_assignee: bool) -> TicketStatus {
    next_status(TicketStatus::Open, has_assignee, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use TicketStatus::*;

    #[test]
    fn test_initial_status() {
        assert_eq!(initial_status(false), Open);
        assert_eq!(initial_status(true), InProgress);
    }

    #[test]
    fn test_assignment_moves_to_in_progress() {
        assert_eq!(next_status(Open, true, None), InProgress);
        assert_eq!(next_status(InProgress, true, None), InProgress);
    }

    #[test]
    fn test_completion_is_sticky_under_assignment() {
        assert_eq!(next_status(Completed, true, None), Completed);
    }

    #[test]
    fn test_no_change_keeps_status() {
        for status in TicketStatus::ALL {
            assert_eq!(next_status(status, false, None), status);
        }
    }

    #[test]
    fn test_explicit_status_without_assignment_is_taken_as_given() {
        for current in TicketStatus::ALL {
            for explicit in TicketStatus::ALL {
                assert_eq!(next_status(current, false, Some(explicit)), explicit);
            }
        }
        // Reopening a completed ticket is an explicit admin action
        assert_eq!(next_status(Completed, false, Some(Open)), Open);
    }

    #[test]
    fn test_explicit_status_with_assignment() {
        for current in TicketStatus::ALL {
            assert_eq!(next_status(current, true, Some(InProgress)), InProgress);
            assert_eq!(next_status(current, true, Some(Completed)), Completed);
            // An assigned ticket cannot be open
            assert_eq!(next_status(current, true, Some(Open)), InProgress);
        }
    }
}
