//! Mock ticket generation.
//!
//! Produces batches of synthetic tickets for the queue display. Most tickets
//! come out unassigned so the alerting path is exercised constantly.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::config::GeneratorConfig;
use crate::types::{Priority, Ticket, TicketStatus};

const TITLES: &[&str] = &[
    "Cannot connect to VPN",
    "Password reset request",
    "Laptop will not boot",
    "Printer offline on 3rd floor",
    "Email not syncing on mobile",
    "Access request for shared drive",
    "Software installation request",
    "Monitor flickering",
    "Teams calls dropping",
    "Account locked out",
];

const REQUESTERS: &[&str] = &[
    "Dana Whitfield",
    "Marcus Lee",
    "Sofia Alvarez",
    "Tom Okafor",
    "Hannah Berg",
    "Ravi Menon",
    "Claire Dubois",
];

const DEPARTMENTS: &[&str] = &[
    "Finance",
    "HR",
    "Sales",
    "Engineering",
    "Marketing",
    "Operations",
];

const HANDLERS: &[&str] = &["Priya Nair", "Jonas Keller", "Aiko Tanaka", "Sam Porter"];

/// Tickets are opened at most this long ago.
const MAX_AGE_MINUTES: i64 = 120;

/// SLA range in minutes; negative values are already breached.
const SLA_MIN: i64 = -60;
const SLA_MAX: i64 = 240;

/// Random ticket source.
#[derive(Debug, Clone)]
pub struct TicketGenerator {
    rng: StdRng,
    config: GeneratorConfig,
}

impl Default for TicketGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketGenerator {
    /// Create a generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            config: GeneratorConfig::default(),
        }
    }

    /// Create a generator with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config: GeneratorConfig::default(),
        }
    }

    /// Create a generator from configuration, honoring its seed if set.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let base = match config.seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        };
        base.with_config(config.clone())
    }

    /// Replace the batch bounds and unassigned ratio.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a batch whose size is drawn from the configured bounds.
    pub fn generate_batch(&mut self) -> Vec<Ticket> {
        let min = self.config.min_batch;
        let max = self.config.max_batch.max(min);
        let count = self.rng.random_range(min..=max);
        self.generate(count)
    }

    /// Generate exactly `count` tickets, unassigned ones first.
    pub fn generate(&mut self, count: usize) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = (0..count).map(|_| self.ticket()).collect();
        // Stable: only the assigned/unassigned split is ordered.
        tickets.sort_by_key(|t| t.assigned_to.is_some());
        tickets
    }

    /// Configured ratio clamped to `[0, 1]`; non-finite values use the default.
    fn unassigned_ratio(&self) -> f64 {
        let ratio = self.config.unassigned_ratio;
        if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            GeneratorConfig::default().unassigned_ratio
        }
    }

    fn ticket(&mut self) -> Ticket {
        let now = Utc::now();
        let unassigned = self.rng.random_bool(self.unassigned_ratio());

        Ticket {
            id: format!("INC{:06}", self.rng.random_range(0..1_000_000u32)),
            title: self.pick(TITLES),
            requester: self.pick(REQUESTERS),
            department: self.pick(DEPARTMENTS),
            priority: self.priority(),
            status: TicketStatus::Open,
            assigned_to: if unassigned {
                None
            } else {
                Some(self.pick(HANDLERS))
            },
            created_at: now - Duration::minutes(self.rng.random_range(0..=MAX_AGE_MINUTES)),
            sla_minutes: self.rng.random_range(SLA_MIN..=SLA_MAX),
        }
    }

    /// ~10% Critical, ~30% High, the rest Medium.
    fn priority(&mut self) -> Priority {
        let roll: f64 = self.rng.random();
        if roll < 0.1 {
            Priority::Critical
        } else if roll < 0.4 {
            Priority::High
        } else {
            Priority::Medium
        }
    }

    fn pick(&mut self, choices: &[&str]) -> String {
        choices
            .choose(&mut self.rng)
            .map(|s| (*s).to_string())
            .unwrap_or_default()
    }
}
