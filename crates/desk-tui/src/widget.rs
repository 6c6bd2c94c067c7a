//! Ticket queue table widget.

use chrono::{DateTime, Utc};
use desk_core::Ticket;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::theme::Theme;

/// Label shown in the assignee column for tickets nobody has picked up.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Table of the current ticket batch.
pub struct TicketTable<'a> {
    tickets: &'a [Ticket],
    theme: &'a Theme,
    now: DateTime<Utc>,
    scroll: usize,
    loading: bool,
}

impl<'a> TicketTable<'a> {
    pub fn new(tickets: &'a [Ticket], theme: &'a Theme) -> Self {
        Self {
            tickets,
            theme,
            now: Utc::now(),
            scroll: 0,
            loading: false,
        }
    }

    /// Reference time for the age column.
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Number of rows skipped from the top.
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show the waiting message instead of an empty table.
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    fn block(&self) -> Block<'a> {
        let colors = &self.theme.colors;
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border))
            .title(Span::styled(
                format!(" Open Tickets ({}) ", self.tickets.len()),
                Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
            ))
    }

    fn row(&self, ticket: &Ticket) -> Row<'a> {
        let colors = &self.theme.colors;

        let assignee = match &ticket.assigned_to {
            Some(name) => Cell::from(name.clone()).style(Style::default().fg(colors.text)),
            None => Cell::from(UNASSIGNED_LABEL).style(
                Style::default()
                    .fg(colors.status_error)
                    .add_modifier(Modifier::BOLD),
            ),
        };

        let mut priority_style = Style::default().fg(self.theme.priority_color(ticket.priority));
        if ticket.priority.is_urgent() {
            priority_style = priority_style.add_modifier(Modifier::BOLD);
        }

        Row::new(vec![
            Cell::from(ticket.id.clone()).style(Style::default().fg(colors.text_dim)),
            Cell::from(ticket.title.clone()).style(Style::default().fg(colors.text)),
            Cell::from(ticket.requester.clone()),
            Cell::from(ticket.department.clone()),
            Cell::from(ticket.priority.label()).style(priority_style),
            Cell::from(ticket.status.to_string()),
            assignee,
            Cell::from(format_age(ticket.age_minutes(self.now))).style(Style::default().fg(colors.text_dim)),
            Cell::from(ticket.format_sla()).style(Style::default().fg(self.theme.sla_color(ticket.sla_minutes))),
        ])
    }
}

impl Widget for TicketTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = self.block();

        if self.tickets.is_empty() {
            let message = if self.loading {
                "Waiting for first refresh..."
            } else {
                "No open tickets"
            };
            Paragraph::new(Line::from(Span::styled(message, Style::default().fg(colors.text_dim))))
                .block(block)
                .render(area, buf);
            return;
        }

        let header = Row::new(vec![
            "ID", "Title", "Requester", "Department", "Priority", "Status", "Assigned", "Age", "SLA",
        ])
        .style(Style::default().fg(colors.header).add_modifier(Modifier::BOLD))
        .bottom_margin(0);

        let rows: Vec<Row> = self
            .tickets
            .iter()
            .skip(self.scroll)
            .map(|t| self.row(t))
            .collect();

        let widths = [
            Constraint::Length(9),
            Constraint::Min(18),
            Constraint::Length(14),
            Constraint::Length(11),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Length(9),
        ];

        Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .block(block)
            .render(area, buf);
    }
}

/// Compact age, e.g. `42m` or `1h 05m`.
pub fn format_age(minutes: i64) -> String {
    if minutes < 60 {
        format!("{minutes}m")
    } else {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}
