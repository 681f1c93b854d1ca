// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::Date;

use crate::adapter::{ListOutcome, ListRequest, RequestKey, prepare_request};
use crate::codec::{UrlState, encode};
use crate::error::ListError;
use crate::features::ListStrategy;
use crate::filters::{FilterKey, FilterSchema, FilterSet, FilterValue};
use crate::ids::ItemId;
use crate::listing::ListItem;
use crate::model::{ListColumn, ListKind, VenueSummary};
use crate::paging::{DEFAULT_PAGE_SIZE, Page, PaginationCursor, SortDirective, paginate, sort};
use crate::policy::{NavigationMode, Requester, is_restricted};
use crate::session::AppSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenPhase {
    Idle,
    PendingEdit,
    Loading,
    Loaded,
    Empty,
    Error,
}

impl ScreenPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PendingEdit => "pending_edit",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Empty => "empty",
            Self::Error => "error",
        }
    }
}

/// A fetch the caller must run and feed back through
/// [`ScreenController::receive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub key: RequestKey,
    pub request: ListRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenCommand {
    EditFilter(FilterKey, FilterValue),
    ResetFilters,
    Confirm,
    GotoPage(usize),
    NextPage,
    PreviousPage,
    SortBy(ListColumn),
    ToggleRow(ItemId),
    ToggleSelectAll,
    ClearSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    PhaseChanged(ScreenPhase),
    FilterRejected(ListError),
    Navigate(String),
    FetchRequested(FetchTicket),
    RowsReplaced { count: usize, truncated: bool },
    FetchFailed(ListError),
    StaleResponseDiscarded { generation: u64 },
    SortChanged(SortDirective<ListColumn>),
    PageChanged(usize),
    SelectionChanged(usize),
    SelectAllRefused,
    Redirected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenController {
    strategy: ListStrategy,
    schema: FilterSchema,
    requester: Requester,
    defaults: FilterSet,
    applied: FilterSet,
    pending: FilterSet,
    page: usize,
    page_size: usize,
    sort: SortDirective<ListColumn>,
    loaded: Vec<ListItem>,
    view: Vec<ListItem>,
    selection: BTreeSet<ItemId>,
    generation: u64,
    phase: ScreenPhase,
    settled: ScreenPhase,
    truncated: bool,
    last_error: Option<ListError>,
    url: String,
}

impl ScreenController {
    /// Opens `list` from a console URL query. Nothing is fetched until the
    /// first `Confirm`.
    pub fn open(session: &AppSession, list: ListKind, query: &str, today: Date) -> Self {
        let strategy = session.strategy(list);
        let schema = strategy.schema(today);
        let requester = session.requester();
        let defaults = scoped(schema.defaults(), &requester);
        let url_state = UrlState::from_query(query, &schema);
        let applied = scoped(url_state.filters, &requester);
        let url = UrlState {
            filters: applied.clone(),
            page: url_state.page,
        }
        .to_url(&schema);
        tracing::debug!(list = list.as_str(), %url, "screen opened");
        Self {
            strategy,
            schema,
            requester,
            defaults,
            pending: applied.clone(),
            applied,
            page: url_state.page,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortDirective::default(),
            loaded: Vec::new(),
            view: Vec::new(),
            selection: BTreeSet::new(),
            generation: 0,
            phase: ScreenPhase::Idle,
            settled: ScreenPhase::Idle,
            truncated: false,
            last_error: None,
            url,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn dispatch(&mut self, command: ScreenCommand) -> Vec<ScreenEvent> {
        match command {
            ScreenCommand::EditFilter(key, value) => self.edit_filter(key, value),
            ScreenCommand::ResetFilters => {
                self.pending = self.defaults.clone();
                self.confirm()
            }
            ScreenCommand::Confirm => self.confirm(),
            ScreenCommand::GotoPage(page) => self.goto_page(page),
            ScreenCommand::NextPage => self.goto_page(self.cursor().next()),
            ScreenCommand::PreviousPage => self.goto_page(self.cursor().previous()),
            ScreenCommand::SortBy(column) => {
                self.sort.toggle(column);
                self.rebuild_view();
                vec![ScreenEvent::SortChanged(self.sort)]
            }
            ScreenCommand::ToggleRow(id) => {
                if !self.loaded.iter().any(|item| item.id == id) {
                    return Vec::new();
                }
                if !self.selection.remove(&id) {
                    self.selection.insert(id);
                }
                vec![ScreenEvent::SelectionChanged(self.selection.len())]
            }
            ScreenCommand::ToggleSelectAll => {
                if !self.select_all_enabled() {
                    tracing::info!(list = self.list().as_str(), "select all refused");
                    return vec![ScreenEvent::SelectAllRefused];
                }
                if !self.loaded.is_empty() && self.selection.len() == self.loaded.len() {
                    self.selection.clear();
                } else {
                    self.selection = self.loaded.iter().map(|item| item.id).collect();
                }
                vec![ScreenEvent::SelectionChanged(self.selection.len())]
            }
            ScreenCommand::ClearSelection => {
                self.selection.clear();
                vec![ScreenEvent::SelectionChanged(0)]
            }
        }
    }

    /// Applies the outcome of a ticket. Outcomes from superseded tickets are
    /// dropped.
    pub fn receive(&mut self, generation: u64, outcome: ListOutcome) -> Vec<ScreenEvent> {
        if generation != self.generation || self.phase_is_settled_for(generation) {
            tracing::warn!(
                generation,
                latest = self.generation,
                "discarding stale listing response"
            );
            return vec![ScreenEvent::StaleResponseDiscarded { generation }];
        }

        let mut events = Vec::new();
        match outcome.error {
            Some(ListError::NotFound { resource }) => {
                tracing::info!(%resource, "redirecting to default view");
                return self.redirect_to_defaults();
            }
            Some(error) => {
                self.replace_rows(Vec::new(), false, &mut events);
                self.last_error = Some(error.clone());
                self.settled = ScreenPhase::Error;
                events.push(ScreenEvent::FetchFailed(error));
            }
            None => {
                let empty = outcome.items.is_empty();
                self.replace_rows(outcome.items, outcome.truncated, &mut events);
                self.last_error = None;
                self.settled = if empty {
                    ScreenPhase::Empty
                } else {
                    ScreenPhase::Loaded
                };
                let clamped = self.cursor().current_page;
                if clamped != self.page {
                    self.page = clamped;
                    events.push(ScreenEvent::PageChanged(clamped));
                    events.extend(self.sync_url());
                }
            }
        }
        events.extend(self.settle());
        events
    }

    /// Resets to the default view when the applied venue is not one of
    /// `venues`.
    pub fn apply_venue_directory(&mut self, venues: &[VenueSummary]) -> Vec<ScreenEvent> {
        match self.applied.venue() {
            Some(venue) if !venues.iter().any(|known| known.id == venue) => {
                tracing::info!(venue = venue.get(), "unknown venue, redirecting to default view");
                self.redirect_to_defaults()
            }
            _ => Vec::new(),
        }
    }

    pub fn list(&self) -> ListKind {
        self.schema.list
    }

    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    pub fn strategy(&self) -> &ListStrategy {
        &self.strategy
    }

    pub fn phase(&self) -> ScreenPhase {
        self.phase
    }

    pub fn applied(&self) -> &FilterSet {
        &self.applied
    }

    pub fn pending(&self) -> &FilterSet {
        &self.pending
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn sort_directive(&self) -> SortDirective<ListColumn> {
        self.sort
    }

    pub fn selection(&self) -> &BTreeSet<ItemId> {
        &self.selection
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn last_error(&self) -> Option<&ListError> {
        self.last_error.as_ref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Applied filters as a query string, for export links.
    pub fn export_query(&self) -> String {
        encode(&self.applied, &self.schema)
    }

    pub fn rows(&self) -> &[ListItem] {
        &self.view
    }

    pub fn visible(&self) -> Page<'_, ListItem> {
        paginate(&self.view, self.page_size, self.page)
    }

    pub fn cursor(&self) -> PaginationCursor {
        PaginationCursor::new(self.view.len(), self.page_size, self.page)
    }

    /// The status control follows the filters being edited.
    pub fn status_control_enabled(&self) -> bool {
        !is_restricted(&self.pending, &self.schema, &self.requester)
    }

    pub fn select_all_enabled(&self) -> bool {
        !is_restricted(&self.applied, &self.schema, &self.requester)
    }

    /// Controls differ from what the rows were loaded with.
    pub fn refresh_required(&self) -> bool {
        self.pending != self.applied
    }

    pub fn reset_enabled(&self) -> bool {
        self.pending.has_search_filters(&self.defaults, &[])
    }

    fn edit_filter(&mut self, key: FilterKey, value: FilterValue) -> Vec<ScreenEvent> {
        if key == FilterKey::Offerer && self.requester.navigation == NavigationMode::Unified {
            tracing::debug!("offerer follows the session in unified navigation");
            return vec![ScreenEvent::FilterRejected(ListError::Validation {
                key,
                value: format!("{value:?}"),
            })];
        }
        if key == FilterKey::Status && !self.status_control_enabled() {
            tracing::debug!(list = self.list().as_str(), "status control is disabled");
            return vec![ScreenEvent::FilterRejected(ListError::PolicyViolation { key })];
        }
        // Searching one event date drops the booking period altogether.
        let clears_booking_period =
            key == FilterKey::EventDate && matches!(value, FilterValue::Date(Some(_)));
        if let Err(error) = self.schema.apply(&mut self.pending, key, value) {
            tracing::debug!(%error, "filter edit rejected");
            return vec![ScreenEvent::FilterRejected(error)];
        }
        if clears_booking_period {
            for period in [FilterKey::BookingPeriodStart, FilterKey::BookingPeriodEnd] {
                if self.schema.contains(period) {
                    self.pending.insert(period, FilterValue::Date(None));
                }
            }
        }
        self.settle().into_iter().collect()
    }

    fn confirm(&mut self) -> Vec<ScreenEvent> {
        if self.pending != self.applied {
            self.applied = self.pending.clone();
            self.page = 1;
        }
        self.generation += 1;
        let prepared = prepare_request(&self.applied, &self.schema, &self.requester, &self.strategy);
        tracing::debug!(
            generation = self.generation,
            key = %prepared.key.canonical,
            status_withheld = prepared.status_withheld,
            "fetch requested"
        );

        let mut events: Vec<ScreenEvent> = self.sync_url().into_iter().collect();
        self.phase = ScreenPhase::Loading;
        self.settled = ScreenPhase::Loading;
        events.push(ScreenEvent::PhaseChanged(ScreenPhase::Loading));
        events.push(ScreenEvent::FetchRequested(FetchTicket {
            generation: self.generation,
            key: prepared.key,
            request: prepared.request,
        }));
        events
    }

    fn goto_page(&mut self, requested: usize) -> Vec<ScreenEvent> {
        let page = paginate(&self.view, self.page_size, requested).clamped_page;
        if page == self.page {
            return Vec::new();
        }
        self.page = page;
        let mut events = vec![ScreenEvent::PageChanged(page)];
        events.extend(self.sync_url());
        events
    }

    fn replace_rows(&mut self, items: Vec<ListItem>, truncated: bool, events: &mut Vec<ScreenEvent>) {
        self.loaded = items;
        self.truncated = truncated;
        self.rebuild_view();
        events.push(ScreenEvent::RowsReplaced {
            count: self.loaded.len(),
            truncated,
        });
        if !self.selection.is_empty() {
            self.selection.clear();
            events.push(ScreenEvent::SelectionChanged(0));
        }
    }

    fn rebuild_view(&mut self) {
        self.view = self.loaded.clone();
        sort(&mut self.view, &self.sort);
    }

    fn redirect_to_defaults(&mut self) -> Vec<ScreenEvent> {
        self.applied = self.defaults.clone();
        self.pending = self.defaults.clone();
        self.page = 1;
        // Outstanding tickets now belong to a view that no longer exists.
        self.generation += 1;
        self.settled = ScreenPhase::Idle;
        self.last_error = None;

        let mut events = Vec::new();
        self.replace_rows(Vec::new(), false, &mut events);
        self.url = UrlState {
            filters: self.applied.clone(),
            page: self.page,
        }
        .to_url(&self.schema);
        events.push(ScreenEvent::Redirected(self.url.clone()));
        events.extend(self.settle());
        events
    }

    fn sync_url(&mut self) -> Option<ScreenEvent> {
        let url = UrlState {
            filters: self.applied.clone(),
            page: self.page,
        }
        .to_url(&self.schema);
        if url == self.url {
            return None;
        }
        self.url = url.clone();
        Some(ScreenEvent::Navigate(url))
    }

    /// Moves to `PendingEdit` while controls differ from the applied filters,
    /// otherwise back to the last settled phase.
    fn settle(&mut self) -> Option<ScreenEvent> {
        let next = if self.refresh_required() {
            ScreenPhase::PendingEdit
        } else {
            self.settled
        };
        if next == self.phase {
            return None;
        }
        self.phase = next;
        Some(ScreenEvent::PhaseChanged(next))
    }

    fn phase_is_settled_for(&self, generation: u64) -> bool {
        generation == self.generation && self.settled != ScreenPhase::Loading
    }
}

/// Unified navigation pins the offerer filter to the session's offerer.
fn scoped(mut filters: FilterSet, requester: &Requester) -> FilterSet {
    if requester.navigation == NavigationMode::Unified {
        filters.insert(
            FilterKey::Offerer,
            FilterValue::Id(requester.selected_offerer.map(|offerer| offerer.get())),
        );
    }
    filters
}

#[cfg(test)]
mod tests {
    use super::{ScreenCommand, ScreenController, ScreenEvent, ScreenPhase};
    use crate::{
        AppSession, CurrentUser, FeatureFlags, FilterKey, FilterValue, ItemId, ItemStatus,
        ItemTimestamps, ListColumn, ListError, ListItem, ListKind, ListOutcome, NavigationMode,
        OfferId, OfferStatus, StockSummary, UserId,
    };
    use time::macros::date;

    fn session(is_admin: bool) -> AppSession {
        AppSession::start(
            CurrentUser {
                id: UserId::new(1),
                email: "pro@example.com".to_owned(),
                is_admin,
                navigation: NavigationMode::Legacy,
            },
            FeatureFlags::default(),
        )
    }

    fn item(id: i64, name: &str) -> ListItem {
        ListItem {
            id: ItemId::Offer(OfferId::new(id)),
            display_name: name.to_owned(),
            status: ItemStatus::Offer(OfferStatus::Active),
            venue: None,
            stock: StockSummary::Remaining(1),
            timestamps: ItemTimestamps::default(),
        }
    }

    fn loaded(items: Vec<ListItem>) -> ListOutcome {
        ListOutcome {
            total: items.len() as u64,
            items,
            ..ListOutcome::default()
        }
    }

    fn controller(query: &str) -> ScreenController {
        ScreenController::open(
            &session(false),
            ListKind::IndividualOffers,
            query,
            date!(2024 - 03 - 15),
        )
    }

    fn ticket_generation(events: &[ScreenEvent]) -> u64 {
        events
            .iter()
            .find_map(|event| match event {
                ScreenEvent::FetchRequested(ticket) => Some(ticket.generation),
                _ => None,
            })
            .unwrap_or_default()
    }

    #[test]
    fn confirm_from_idle_requests_a_fetch() {
        let mut screen = controller("");
        assert_eq!(screen.phase(), ScreenPhase::Idle);

        let events = screen.dispatch(ScreenCommand::Confirm);
        assert_eq!(screen.phase(), ScreenPhase::Loading);
        assert_eq!(events[0], ScreenEvent::PhaseChanged(ScreenPhase::Loading));
        assert_eq!(ticket_generation(&events), 1);

        let events = screen.receive(1, loaded(vec![item(1, "a")]));
        assert_eq!(screen.phase(), ScreenPhase::Loaded);
        assert!(events.contains(&ScreenEvent::RowsReplaced {
            count: 1,
            truncated: false
        }));
    }

    #[test]
    fn empty_and_failed_fetches_settle_accordingly() {
        let mut screen = controller("");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        screen.receive(generation, loaded(Vec::new()));
        assert_eq!(screen.phase(), ScreenPhase::Empty);

        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        let events = screen.receive(generation, ListOutcome::failed(ListError::transport("down")));
        assert_eq!(screen.phase(), ScreenPhase::Error);
        assert!(events.contains(&ScreenEvent::FetchFailed(ListError::transport("down"))));

        screen.dispatch(ScreenCommand::Confirm);
        assert_eq!(screen.phase(), ScreenPhase::Loading);
    }

    #[test]
    fn editing_keeps_rows_until_confirmed() {
        let mut screen = controller("");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        screen.receive(generation, loaded(vec![item(1, "a"), item(2, "b")]));

        let events = screen.dispatch(ScreenCommand::EditFilter(
            FilterKey::NameOrIsbn,
            FilterValue::Text("dune".to_owned()),
        ));
        assert_eq!(events, vec![ScreenEvent::PhaseChanged(ScreenPhase::PendingEdit)]);
        assert!(screen.refresh_required());
        assert_eq!(screen.rows().len(), 2);

        let events = screen.dispatch(ScreenCommand::EditFilter(
            FilterKey::NameOrIsbn,
            FilterValue::Text(String::new()),
        ));
        assert_eq!(events, vec![ScreenEvent::PhaseChanged(ScreenPhase::Loaded)]);
        assert!(!screen.refresh_required());
    }

    #[test]
    fn invalid_edit_is_rejected_without_phase_change() {
        let mut screen = controller("");
        let events = screen.dispatch(ScreenCommand::EditFilter(
            FilterKey::Venue,
            FilterValue::Id(Some(-3)),
        ));
        assert!(matches!(
            events.as_slice(),
            [ScreenEvent::FilterRejected(ListError::Validation { .. })]
        ));
        assert_eq!(screen.phase(), ScreenPhase::Idle);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut screen = controller("");
        let first = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        screen.dispatch(ScreenCommand::EditFilter(
            FilterKey::NameOrIsbn,
            FilterValue::Text("b".to_owned()),
        ));
        let second = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));

        screen.receive(second, loaded(vec![item(2, "b")]));
        let events = screen.receive(first, loaded(vec![item(1, "a")]));
        assert_eq!(
            events,
            vec![ScreenEvent::StaleResponseDiscarded { generation: first }]
        );
        assert_eq!(screen.rows().len(), 1);
        assert_eq!(screen.rows()[0].display_name, "b");
    }

    #[test]
    fn duplicate_delivery_of_latest_ticket_is_ignored() {
        let mut screen = controller("");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        screen.receive(generation, loaded(vec![item(1, "a")]));
        let events = screen.receive(generation, loaded(Vec::new()));
        assert_eq!(events, vec![ScreenEvent::StaleResponseDiscarded { generation }]);
        assert_eq!(screen.rows().len(), 1);
    }

    #[test]
    fn confirming_new_filters_resets_page_and_url() {
        let mut screen = controller("page=2");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        let rows = (1..=15).map(|id| item(id, "x")).collect();
        screen.receive(generation, loaded(rows));
        assert_eq!(screen.page(), 2);
        assert_eq!(screen.url(), "/offres?page=2");

        screen.dispatch(ScreenCommand::EditFilter(FilterKey::Venue, FilterValue::Id(Some(8))));
        let events = screen.dispatch(ScreenCommand::Confirm);
        assert_eq!(screen.page(), 1);
        assert_eq!(events[0], ScreenEvent::Navigate("/offres?lieu=8".to_owned()));
    }

    #[test]
    fn page_navigation_clamps_and_skips_refetch() {
        let mut screen = controller("");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        screen.receive(generation, loaded((1..=25).map(|id| item(id, "x")).collect()));

        let events = screen.dispatch(ScreenCommand::GotoPage(7));
        assert_eq!(
            events,
            vec![
                ScreenEvent::PageChanged(3),
                ScreenEvent::Navigate("/offres?page=3".to_owned())
            ]
        );
        assert_eq!(screen.visible().items.len(), 5);
        assert!(screen.dispatch(ScreenCommand::NextPage).is_empty());

        screen.dispatch(ScreenCommand::PreviousPage);
        assert_eq!(screen.page(), 2);
        assert_eq!(screen.generation(), generation);
    }

    #[test]
    fn out_of_range_url_page_clamps_after_load() {
        let mut screen = controller("page=9");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        let events = screen.receive(generation, loaded(vec![item(1, "a")]));
        assert!(events.contains(&ScreenEvent::PageChanged(1)));
        assert_eq!(screen.url(), "/offres");
    }

    #[test]
    fn sort_cycles_and_restores_backend_order() {
        let mut screen = controller("");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        screen.receive(generation, loaded(vec![item(1, "b"), item(2, "a"), item(3, "c")]));

        let names = |screen: &ScreenController| -> Vec<String> {
            screen.rows().iter().map(|row| row.display_name.clone()).collect()
        };
        screen.dispatch(ScreenCommand::SortBy(ListColumn::Name));
        assert_eq!(names(&screen), vec!["a", "b", "c"]);
        screen.dispatch(ScreenCommand::SortBy(ListColumn::Name));
        assert_eq!(names(&screen), vec!["c", "b", "a"]);
        screen.dispatch(ScreenCommand::SortBy(ListColumn::Name));
        assert_eq!(names(&screen), vec!["b", "a", "c"]);
    }

    #[test]
    fn selection_is_cleared_when_rows_are_replaced() {
        let mut screen = controller("");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        screen.receive(generation, loaded(vec![item(1, "a"), item(2, "b")]));

        let events = screen.dispatch(ScreenCommand::ToggleRow(ItemId::Offer(OfferId::new(2))));
        assert_eq!(events, vec![ScreenEvent::SelectionChanged(1)]);
        assert!(
            screen
                .dispatch(ScreenCommand::ToggleRow(ItemId::Offer(OfferId::new(99))))
                .is_empty()
        );

        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        let events = screen.receive(generation, loaded(vec![item(3, "c")]));
        assert!(events.contains(&ScreenEvent::SelectionChanged(0)));
        assert!(screen.selection().is_empty());
    }

    #[test]
    fn select_all_toggles_every_loaded_row() {
        let mut screen = controller("");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        screen.receive(generation, loaded((1..=12).map(|id| item(id, "x")).collect()));

        assert_eq!(
            screen.dispatch(ScreenCommand::ToggleSelectAll),
            vec![ScreenEvent::SelectionChanged(12)]
        );
        assert_eq!(
            screen.dispatch(ScreenCommand::ToggleSelectAll),
            vec![ScreenEvent::SelectionChanged(0)]
        );
    }

    #[test]
    fn admin_without_scope_cannot_select_all() {
        let mut screen = ScreenController::open(
            &session(true),
            ListKind::IndividualOffers,
            "statut=active",
            date!(2024 - 03 - 15),
        );
        assert!(!screen.status_control_enabled());
        assert_eq!(
            screen.dispatch(ScreenCommand::ToggleSelectAll),
            vec![ScreenEvent::SelectAllRefused]
        );

        screen.dispatch(ScreenCommand::EditFilter(FilterKey::Venue, FilterValue::Id(Some(3))));
        assert!(screen.status_control_enabled());
        assert!(!screen.select_all_enabled());
    }

    #[test]
    fn disabled_status_control_rejects_edits() {
        let mut screen = ScreenController::open(
            &session(true),
            ListKind::IndividualOffers,
            "",
            date!(2024 - 03 - 15),
        );
        let edit_status =
            || ScreenCommand::EditFilter(FilterKey::Status, FilterValue::choice("active"));

        assert_eq!(
            screen.dispatch(edit_status()),
            vec![ScreenEvent::FilterRejected(ListError::PolicyViolation {
                key: FilterKey::Status
            })]
        );
        assert_eq!(screen.phase(), ScreenPhase::Idle);
        assert_eq!(
            screen.pending().get(FilterKey::Status),
            Some(&FilterValue::choice("all"))
        );

        screen.dispatch(ScreenCommand::EditFilter(FilterKey::Venue, FilterValue::Id(Some(3))));
        let events = screen.dispatch(edit_status());
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, ScreenEvent::FilterRejected(_)))
        );
        assert_eq!(
            screen.pending().get(FilterKey::Status),
            Some(&FilterValue::choice("active"))
        );
    }

    #[test]
    fn not_found_redirects_to_default_view() {
        let mut screen = controller("lieu=404&statut=inactive");
        let generation = ticket_generation(&screen.dispatch(ScreenCommand::Confirm));
        let events = screen.receive(
            generation,
            ListOutcome::failed(ListError::http(404, "venue 404")),
        );

        assert!(events.contains(&ScreenEvent::Redirected("/offres".to_owned())));
        assert_eq!(screen.phase(), ScreenPhase::Idle);
        assert_eq!(screen.applied(), screen.pending());
        assert_eq!(screen.applied().venue(), None);
        assert!(!screen.reset_enabled());
    }

    #[test]
    fn reset_confirms_default_filters() {
        let mut screen = controller("nom-ou-isbn=dune");
        assert!(screen.reset_enabled());
        let events = screen.dispatch(ScreenCommand::ResetFilters);
        assert_eq!(events[0], ScreenEvent::Navigate("/offres".to_owned()));
        assert!(matches!(events.last(), Some(ScreenEvent::FetchRequested(_))));
        assert_eq!(screen.export_query(), "");
    }
}
