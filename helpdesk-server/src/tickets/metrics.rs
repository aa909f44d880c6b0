//! Admin dashboard rollup

use shared::models::{Category, CategoryCount, DashboardMetrics, TicketStatus};
use shared::util::now_millis;

use crate::auth::CurrentUser;
use crate::db::models::TicketSnapshot;
use crate::db::repository::TicketRepository;
use crate::security_log;
use crate::tickets::sla;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct MetricsReporter {
    tickets: TicketRepository,
}

impl MetricsReporter {
    pub fn new(tickets: TicketRepository) -> Self {
        Self { tickets }
    }

    /// Counts over every ticket in the system (admin only)
    pub async fn dashboard(&self, caller: &CurrentUser) -> AppResult<DashboardMetrics> {
        if !caller.is_admin() {
            security_log!("WARN", "dashboard_denied", user_id = caller.id, role = caller.role);
            return Err(AppError::admin_required());
        }

        let snapshot = self.tickets.snapshot().await?;
        let metrics = summarize(&snapshot, now_millis());
        tracing::debug!(
            total = metrics.total_tickets,
            breached = metrics.breached_tickets,
            "Dashboard computed"
        );
        Ok(metrics)
    }
}

/// Fold ticket snapshots into dashboard counts
///
/// Categories follow the fixed category order; empty ones are omitted.
pub fn summarize(tickets: &[TicketSnapshot], now: i64) -> DashboardMetrics {
    let mut metrics = DashboardMetrics {
        total_tickets: tickets.len() as u64,
        ..Default::default()
    };
    let mut per_category = vec![0u64; Category::ALL.len()];

    for ticket in tickets {
        match ticket.status {
            TicketStatus::Open => metrics.open_tickets += 1,
            TicketStatus::InProgress => metrics.in_progress_tickets += 1,
            TicketStatus::Resolved => metrics.resolved_tickets += 1,
            TicketStatus::Closed => metrics.closed_tickets += 1,
        }
        if sla::is_breached(ticket.status, ticket.resolution_date, now) {
            metrics.breached_tickets += 1;
        }
        if let Some(slot) = Category::ALL.iter().position(|c| *c == ticket.category) {
            per_category[slot] += 1;
        }
    }

    metrics.tickets_by_category = Category::ALL
        .iter()
        .zip(per_category)
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| CategoryCount {
            category: *category,
            count,
        })
        .collect();
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 60 * 60 * 1000;
    const NOW: i64 = 1_767_225_600_000;

    fn snap(status: TicketStatus, category: Category, deadline: Option<i64>) -> TicketSnapshot {
        TicketSnapshot {
            status,
            category,
            resolution_date: deadline,
        }
    }

    #[test]
    fn test_empty_system() {
        let metrics = summarize(&[], NOW);
        assert_eq!(metrics, DashboardMetrics::default());
    }

    #[test]
    fn test_counts_by_status_and_category() {
        let tickets = vec![
            snap(TicketStatus::Open, Category::Network, Some(NOW - HOUR)),
            snap(TicketStatus::Open, Category::Hardware, None),
            snap(TicketStatus::InProgress, Category::Network, Some(NOW + HOUR)),
            snap(TicketStatus::Resolved, Category::Other, Some(NOW - HOUR)),
            snap(TicketStatus::Closed, Category::Network, None),
        ];
        let metrics = summarize(&tickets, NOW);

        assert_eq!(metrics.total_tickets, 5);
        assert_eq!(metrics.open_tickets, 2);
        assert_eq!(metrics.in_progress_tickets, 1);
        assert_eq!(metrics.resolved_tickets, 1);
        assert_eq!(metrics.closed_tickets, 1);
        // the resolved ticket past its deadline does not count
        assert_eq!(metrics.breached_tickets, 1);
        assert_eq!(
            metrics.tickets_by_category,
            vec![
                CategoryCount {
                    category: Category::Hardware,
                    count: 1
                },
                CategoryCount {
                    category: Category::Network,
                    count: 3
                },
                CategoryCount {
                    category: Category::Other,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_status_counts_sum_to_total() {
        let tickets: Vec<TicketSnapshot> = TicketStatus::ALL
            .iter()
            .cycle()
            .take(11)
            .map(|s| snap(*s, Category::Software, None))
            .collect();
        let m = summarize(&tickets, NOW);
        assert_eq!(
            m.open_tickets + m.in_progress_tickets + m.resolved_tickets + m.closed_tickets,
            m.total_tickets
        );
    }
}
