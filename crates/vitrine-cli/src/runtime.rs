// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::sync::{Arc, mpsc};
use std::thread;
use time::OffsetDateTime;
use time::macros::format_description;
use vitrine_app::{
    FetchTicket, ListAdapter, ListColumn, ListItem, ListOutcome, ListStrategy, ListingBackend,
    ScreenCommand, ScreenController, ScreenEvent, ScreenPhase, VenueSummary,
};

pub type SharedBackend = Arc<dyn ListingBackend + Send + Sync>;

/// Runs fetch tickets on worker threads and feeds their outcomes back to the
/// screen that issued them.
pub struct ListRuntime {
    backend: SharedBackend,
    sender: mpsc::Sender<(u64, ListOutcome)>,
    receiver: mpsc::Receiver<(u64, ListOutcome)>,
    in_flight: usize,
    redirects_left: usize,
}

impl ListRuntime {
    pub fn new(backend: SharedBackend) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            backend,
            sender,
            receiver,
            in_flight: 0,
            redirects_left: 1,
        }
    }

    /// First load of a screen. The URL venue is checked against `venues` when
    /// the directory is known; a redirect already reloads the default view.
    pub fn load(&mut self, screen: &mut ScreenController, venues: &[VenueSummary]) -> Result<()> {
        let mut events = if venues.is_empty() {
            Vec::new()
        } else {
            screen.apply_venue_directory(venues)
        };
        if !events
            .iter()
            .any(|event| matches!(event, ScreenEvent::Redirected(_)))
        {
            events.extend(screen.dispatch(ScreenCommand::Confirm));
        }
        self.drive(screen, events)
    }

    /// Handles `events` and every follow-up until no fetch is outstanding.
    pub fn drive(&mut self, screen: &mut ScreenController, events: Vec<ScreenEvent>) -> Result<()> {
        let mut pending = events;
        loop {
            for event in std::mem::take(&mut pending) {
                match event {
                    ScreenEvent::FetchRequested(ticket) => self.spawn(*screen.strategy(), ticket),
                    ScreenEvent::Redirected(url) if self.redirects_left > 0 => {
                        self.redirects_left -= 1;
                        tracing::info!(%url, "reloading default view");
                        pending.extend(screen.dispatch(ScreenCommand::Confirm));
                    }
                    ScreenEvent::Redirected(url) => {
                        tracing::warn!(%url, "redirected again, giving up");
                    }
                    ScreenEvent::FetchFailed(error) => {
                        tracing::warn!(
                            %error,
                            list = screen.list().as_str(),
                            "listing unavailable"
                        );
                    }
                    ScreenEvent::Navigate(url) => tracing::debug!(%url, "navigate"),
                    other => tracing::trace!(event = ?other, "screen event"),
                }
            }
            if !pending.is_empty() {
                continue;
            }
            if self.in_flight == 0 {
                return Ok(());
            }

            let (generation, outcome) = self
                .receiver
                .recv()
                .map_err(|error| anyhow!("fetch worker channel closed: {error}"))?;
            self.in_flight -= 1;
            pending = screen.receive(generation, outcome);
        }
    }

    fn spawn(&mut self, strategy: ListStrategy, ticket: FetchTicket) {
        let backend = Arc::clone(&self.backend);
        let sender = self.sender.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            let outcome = ListAdapter::new(&*backend, strategy).fetch(&ticket.request);
            if sender.send((ticket.generation, outcome)).is_err() {
                tracing::debug!(
                    generation = ticket.generation,
                    "screen gone before fetch finished"
                );
            }
        });
    }
}

/// The visible page as ` | `-separated text, header first.
pub fn render_page(screen: &ScreenController) -> String {
    let columns = screen.list().columns();
    let mut lines = vec![
        columns
            .iter()
            .map(|column| column.label())
            .collect::<Vec<_>>()
            .join(" | "),
    ];

    let page = screen.visible();
    for item in page.items {
        lines.push(
            columns
                .iter()
                .map(|column| cell(item, *column))
                .collect::<Vec<_>>()
                .join(" | "),
        );
    }

    match screen.phase() {
        ScreenPhase::Error => {
            if let Some(error) = screen.last_error() {
                lines.push(format!("error: {error}"));
            }
        }
        ScreenPhase::Empty => lines.push("no results".to_owned()),
        _ => {}
    }

    let mut footer = format!(
        "page {}/{}, {} rows",
        page.clamped_page,
        page.page_count,
        screen.rows().len()
    );
    if screen.truncated() {
        footer.push_str(" (truncated)");
    }
    lines.push(footer);
    lines.push(format!("url: {}", screen.url()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn cell(item: &ListItem, column: ListColumn) -> String {
    match column {
        ListColumn::Name => item.display_name.clone(),
        ListColumn::Venue => item
            .venue
            .as_ref()
            .map(|venue| venue.name.clone())
            .unwrap_or_default(),
        ListColumn::EventDate => format_timestamp(item.timestamps.event_start),
        ListColumn::BookedAt => format_timestamp(item.timestamps.booked_at),
        ListColumn::Stock => item.stock.label(),
        ListColumn::Status => item.status.label().to_owned(),
    }
}

fn format_timestamp(value: Option<OffsetDateTime>) -> String {
    value
        .and_then(|value| {
            value
                .format(&format_description!("[day]/[month]/[year] [hour]:[minute]"))
                .ok()
        })
        .unwrap_or_default()
}
