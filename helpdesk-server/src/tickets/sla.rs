//! SLA derivation
//!
//! Pure functions of (status, deadline, now). Nothing here is persisted;
//! every read recomputes against the caller's clock.

use shared::models::{SlaState, TicketStatus};

/// Window before the deadline in which an open ticket is flagged
pub const WARNING_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Deadline passed while the ticket is still unfinished
pub fn is_breached(status: TicketStatus, deadline: Option<i64>, now: i64) -> bool {
    match deadline {
        Some(deadline) => !status.is_terminal() && now > deadline,
        None => false,
    }
}

/// Deadline ahead but within 24 hours, ticket unfinished
pub fn is_warning(status: TicketStatus, deadline: Option<i64>, now: i64) -> bool {
    match deadline {
        Some(deadline) if !status.is_terminal() && !is_breached(status, Some(deadline), now) => {
            let remaining = deadline - now;
            remaining > 0 && remaining <= WARNING_WINDOW_MS
        }
        _ => false,
    }
}

/// Both flags at once
pub fn evaluate(status: TicketStatus, deadline: Option<i64>, now: i64) -> SlaState {
    SlaState {
        breached: is_breached(status, deadline, now),
        warning: is_warning(status, deadline, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 60 * 60 * 1000;
    const NOW: i64 = 1_767_225_600_000;

    #[test]
    fn test_past_deadline_open_is_breached() {
        let sla = evaluate(TicketStatus::Open, Some(NOW - HOUR), NOW);
        assert!(sla.breached);
        assert!(!sla.warning);
    }

    #[test]
    fn test_near_deadline_is_warning() {
        let sla = evaluate(TicketStatus::Open, Some(NOW + 12 * HOUR), NOW);
        assert!(sla.warning);
        assert!(!sla.breached);
    }

    #[test]
    fn test_far_deadline_is_quiet() {
        assert_eq!(
            evaluate(TicketStatus::InProgress, Some(NOW + 48 * HOUR), NOW),
            SlaState::default()
        );
    }

    #[test]
    fn test_terminal_status_overrides_dates() {
        for status in [TicketStatus::Resolved, TicketStatus::Closed] {
            assert_eq!(evaluate(status, Some(NOW - HOUR), NOW), SlaState::default());
            assert_eq!(evaluate(status, Some(NOW + HOUR), NOW), SlaState::default());
        }
    }

    #[test]
    fn test_no_deadline() {
        assert_eq!(evaluate(TicketStatus::Open, None, NOW), SlaState::default());
    }

    #[test]
    fn test_window_boundaries() {
        // exactly at the deadline: neither
        assert_eq!(evaluate(TicketStatus::Open, Some(NOW), NOW), SlaState::default());
        // one millisecond past: breached
        assert!(is_breached(TicketStatus::Open, Some(NOW - 1), NOW));
        // exactly 24h ahead: warning
        assert!(is_warning(TicketStatus::Open, Some(NOW + WARNING_WINDOW_MS), NOW));
        // just beyond 24h: quiet
        assert!(!is_warning(TicketStatus::Open, Some(NOW + WARNING_WINDOW_MS + 1), NOW));
    }

    #[test]
    fn test_flags_never_both_true() {
        let statuses = [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ];
        for status in statuses {
            for offset in (-72..=72).map(|h| h * HOUR / 2) {
                let sla = evaluate(status, Some(NOW + offset), NOW);
                assert!(!(sla.breached && sla.warning), "{status} at {offset}");
            }
        }
    }
}
