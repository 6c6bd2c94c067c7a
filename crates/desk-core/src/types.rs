//! Ticket data model.
//!
//! Tickets are ephemeral: the refresh loop replaces the whole collection on
//! every tick and no ticket changes after it is generated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// All priorities from lowest to highest.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// Short label for table display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Returns true for priorities that get highlighted in the queue.
    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ticket lifecycle status.
///
/// Generated tickets are always `Open`; nothing transitions them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    #[default]
    Open,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
        }
    }
}

/// A single service desk ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Opaque identifier, e.g. `INC104233`
    pub id: String,
    pub title: String,
    pub requester: String,
    pub department: String,
    pub priority: Priority,
    pub status: TicketStatus,
    /// Handler name; `None` means the ticket is waiting for someone
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Minutes until the SLA window closes; negative once breached
    #[serde(rename = "sla")]
    pub sla_minutes: i64,
}

impl Ticket {
    /// Returns true if nobody has picked the ticket up.
    pub fn is_unassigned(&self) -> bool {
        self.assigned_to.is_none()
    }

    /// Returns true if the SLA window has already closed.
    pub fn is_sla_breached(&self) -> bool {
        self.sla_minutes < 0
    }

    /// Minutes since the ticket was opened, relative to `now`.
    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_minutes().max(0)
    }

    /// Human-readable SLA, e.g. `45m left` or `12m over`.
    pub fn format_sla(&self) -> String {
        if self.is_sla_breached() {
            format!("{}m over", -self.sla_minutes)
        } else {
            format!("{}m left", self.sla_minutes)
        }
    }
}

/// Count tickets without a handler.
pub fn unassigned_count(tickets: &[Ticket]) -> usize {
    tickets.iter().filter(|t| t.is_unassigned()).count()
}

/// A full replacement set of tickets produced by one refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub tickets: Vec<Ticket>,
    pub refreshed_at: DateTime<Utc>,
}

impl Batch {
    /// Wrap freshly generated tickets with the current time.
    pub fn new(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets,
            refreshed_at: Utc::now(),
        }
    }

    /// Number of tickets without a handler.
    pub fn unassigned(&self) -> usize {
        unassigned_count(&self.tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ticket(assigned_to: Option<&str>, sla_minutes: i64) -> Ticket {
        Ticket {
            id: "INC000001".into(),
            title: "VPN not connecting".into(),
            requester: "Dana Whitfield".into(),
            department: "Finance".into(),
            priority: Priority::High,
            status: TicketStatus::Open,
            assigned_to: assigned_to.map(String::from),
            created_at: Utc::now() - Duration::minutes(30),
            sla_minutes,
        }
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert!(Priority::Critical.is_urgent());
        assert!(!Priority::Medium.is_urgent());
    }

    #[test]
    fn test_sla_formatting() {
        assert_eq!(ticket(None, 45).format_sla(), "45m left");
        assert_eq!(ticket(None, -12).format_sla(), "12m over");
        assert!(ticket(None, -1).is_sla_breached());
        assert!(!ticket(None, 0).is_sla_breached());
    }

    #[test]
    fn test_unassigned_count() {
        let tickets = vec![
            ticket(None, 10),
            ticket(Some("Priya Nair"), 10),
            ticket(None, 10),
        ];
        assert_eq!(unassigned_count(&tickets), 2);
        assert_eq!(Batch::new(tickets).unassigned(), 2);
    }

    #[test]
    fn test_age_minutes() {
        let t = ticket(None, 10);
        let age = t.age_minutes(Utc::now());
        assert!((29..=31).contains(&age));
    }

    #[test]
    fn test_ticket_json_field_names() {
        let json = serde_json::to_value(ticket(None, -5)).unwrap();
        assert!(json.get("assignedTo").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["sla"], -5);
        assert_eq!(json["status"], "Open");
    }
}
