// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use time::macros::date;
use time::{Date, Duration};
use vitrine_app::{
    AppSession, CollectiveOfferStatus, CurrentUser, FeatureFlags, FetchTicket, FilterKey,
    FilterValue, ListAdapter, ListError, ListKind, ListingBackend, ListingPage, ListingRow,
    NavigationMode, OfferStatus, OffererId, ScreenCommand, ScreenController, ScreenEvent,
    ScreenPhase, UrlState, UserId,
};
use vitrine_testkit::{
    DemoCatalog, ScriptedBackend, collective_offer, individual_offer, offer_page, venue_summary,
};

const TODAY: Date = date!(2024 - 03 - 15);

fn session(is_admin: bool, navigation: NavigationMode) -> AppSession {
    AppSession::start(
        CurrentUser {
            id: UserId::new(7),
            email: "equipe@example.com".to_owned(),
            is_admin,
            navigation,
        },
        FeatureFlags::default(),
    )
}

fn ticket(events: &[ScreenEvent]) -> Result<FetchTicket> {
    events
        .iter()
        .find_map(|event| match event {
            ScreenEvent::FetchRequested(ticket) => Some(ticket.clone()),
            _ => None,
        })
        .context("no fetch requested")
}

/// Confirms the screen and feeds the backend's answer straight back.
fn confirm_and_load<B: ListingBackend>(
    screen: &mut ScreenController,
    backend: &B,
) -> Result<Vec<ScreenEvent>> {
    let ticket = ticket(&screen.dispatch(ScreenCommand::Confirm))?;
    let outcome = ListAdapter::new(backend, *screen.strategy()).fetch(&ticket.request);
    Ok(screen.receive(ticket.generation, outcome))
}

fn offers(count: i64) -> ListingPage {
    offer_page(
        (1..=count)
            .map(|id| individual_offer(id, &format!("Offre {id}"), OfferStatus::Active, 1))
            .collect(),
    )
}

#[test]
fn admin_status_filter_waits_for_a_scope() -> Result<()> {
    let collective = |id| {
        ListingPage::single(vec![ListingRow::CollectiveOffer(collective_offer(
            id,
            "Atelier d'écriture",
            CollectiveOfferStatus::Active,
            3,
        ))])
    };
    let backend = ScriptedBackend::new()
        .respond(Ok(collective(1)))
        .respond(Ok(collective(2)));
    let mut screen = ScreenController::open(
        &session(true, NavigationMode::Legacy),
        ListKind::CollectiveOffers,
        "statut=active",
        TODAY,
    );
    assert!(!screen.status_control_enabled());

    confirm_and_load(&mut screen, &backend)?;
    assert_eq!(screen.phase(), ScreenPhase::Loaded);
    assert_eq!(
        screen.applied().get(FilterKey::Status),
        Some(&FilterValue::choices(["active"]))
    );

    screen.dispatch(ScreenCommand::EditFilter(FilterKey::Venue, FilterValue::Id(Some(3))));
    assert!(screen.status_control_enabled());
    confirm_and_load(&mut screen, &backend)?;

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0.values("status"), Vec::<&str>::new());
    assert_eq!(calls[1].0.values("status"), vec!["ACTIVE"]);
    assert_eq!(calls[1].0.value("venueId"), Some("3"));
    Ok(())
}

#[test]
fn late_response_of_an_older_search_is_dropped() -> Result<()> {
    let backend = ScriptedBackend::new()
        .respond(Ok(offer_page(vec![individual_offer(
            1,
            "Dune",
            OfferStatus::Active,
            1,
        )])))
        .respond(Ok(offer_page(vec![
            individual_offer(2, "Le Petit Prince", OfferStatus::Active, 1),
            individual_offer(3, "Le Petit Nicolas", OfferStatus::Inactive, 1),
        ])));
    let mut screen = ScreenController::open(
        &session(false, NavigationMode::Legacy),
        ListKind::IndividualOffers,
        "nom-ou-isbn=dune",
        TODAY,
    );

    let first = ticket(&screen.dispatch(ScreenCommand::Confirm))?;
    screen.dispatch(ScreenCommand::EditFilter(
        FilterKey::NameOrIsbn,
        FilterValue::Text("petit".to_owned()),
    ));
    let second = ticket(&screen.dispatch(ScreenCommand::Confirm))?;
    assert_ne!(first.key, second.key);

    let adapter = ListAdapter::new(&backend, *screen.strategy());
    let first_outcome = adapter.fetch(&first.request);
    let second_outcome = adapter.fetch(&second.request);

    // The older answer lands while the newer one is still in flight.
    assert_eq!(
        screen.receive(first.generation, first_outcome),
        vec![ScreenEvent::StaleResponseDiscarded {
            generation: first.generation
        }]
    );
    assert_eq!(screen.phase(), ScreenPhase::Loading);

    screen.receive(second.generation, second_outcome);
    assert_eq!(screen.phase(), ScreenPhase::Loaded);
    let names: Vec<&str> = screen
        .rows()
        .iter()
        .map(|row| row.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Le Petit Prince", "Le Petit Nicolas"]);
    Ok(())
}

#[test]
fn out_of_range_page_clamps_to_last_page() -> Result<()> {
    let backend = ScriptedBackend::new().respond(Ok(offers(25)));
    let mut screen = ScreenController::open(
        &session(false, NavigationMode::Legacy),
        ListKind::IndividualOffers,
        "page=7",
        TODAY,
    );

    let events = confirm_and_load(&mut screen, &backend)?;
    assert!(events.contains(&ScreenEvent::PageChanged(3)));
    assert_eq!(screen.page(), 3);
    assert_eq!(screen.url(), "/offres?page=3");
    assert_eq!(screen.visible().items.len(), 5);
    Ok(())
}

#[test]
fn reload_restores_the_same_screen() -> Result<()> {
    let backend = ScriptedBackend::new().respond(Ok(offers(30)));
    let session = session(false, NavigationMode::Legacy);
    let mut screen = ScreenController::open(&session, ListKind::IndividualOffers, "", TODAY);
    screen.dispatch(ScreenCommand::EditFilter(
        FilterKey::Status,
        FilterValue::choice("epuisee"),
    ));
    screen.dispatch(ScreenCommand::EditFilter(FilterKey::Venue, FilterValue::Id(Some(2))));
    confirm_and_load(&mut screen, &backend)?;
    screen.dispatch(ScreenCommand::GotoPage(2));
    assert_eq!(screen.url(), "/offres?page=2&lieu=2&statut=epuisee");

    let query = screen
        .url()
        .split_once('?')
        .map(|(_, query)| query.to_owned())
        .unwrap_or_default();
    let reloaded = ScreenController::open(&session, ListKind::IndividualOffers, &query, TODAY);
    assert_eq!(reloaded.applied(), screen.applied());
    assert_eq!(reloaded.page(), 2);
    assert_eq!(reloaded.url(), screen.url());
    assert_eq!(
        UrlState::from_query(&query, screen.schema()).filters,
        *screen.applied()
    );
    Ok(())
}

#[test]
fn unknown_venue_in_url_redirects_to_default_view() -> Result<()> {
    let catalog = DemoCatalog::seeded(11, TODAY);
    let mut screen = ScreenController::open(
        &session(false, NavigationMode::Legacy),
        ListKind::IndividualOffers,
        "lieu=999&nom-ou-isbn=prince",
        TODAY,
    );

    let events = confirm_and_load(&mut screen, &catalog)?;
    assert!(events.contains(&ScreenEvent::Redirected("/offres".to_owned())));
    assert_eq!(screen.phase(), ScreenPhase::Idle);
    assert_eq!(screen.applied().venue(), None);
    assert_eq!(screen.last_error(), None);

    confirm_and_load(&mut screen, &catalog)?;
    assert_eq!(screen.phase(), ScreenPhase::Loaded);
    assert_eq!(screen.rows().len(), catalog.offers.len());
    Ok(())
}

#[test]
fn venue_directory_check_redirects_only_unknown_venues() {
    let catalog = DemoCatalog::seeded(11, TODAY);
    let session = session(false, NavigationMode::Legacy);

    let mut known = ScreenController::open(&session, ListKind::IndividualOffers, "lieu=5", TODAY);
    assert!(known.apply_venue_directory(&catalog.venue_summaries()).is_empty());

    let mut unknown =
        ScreenController::open(&session, ListKind::IndividualOffers, "lieu=42", TODAY);
    let events = unknown.apply_venue_directory(&[venue_summary(5, "Cinéma de Lyon")]);
    assert!(events.contains(&ScreenEvent::Redirected("/offres".to_owned())));
    assert_eq!(unknown.applied().venue(), None);
}

#[test]
fn demo_bookings_follow_the_default_period() -> Result<()> {
    let catalog = DemoCatalog::seeded(5, TODAY);
    let mut screen = ScreenController::open(
        &session(false, NavigationMode::Legacy),
        ListKind::Bookings,
        "",
        TODAY,
    );

    confirm_and_load(&mut screen, &catalog)?;
    assert_eq!(screen.phase(), ScreenPhase::Loaded);
    let start = TODAY - Duration::days(30);
    for row in screen.rows() {
        let booked = row
            .timestamps
            .booked_at
            .map(|at| at.date())
            .context("demo bookings carry a booking date")?;
        assert!((start..=TODAY).contains(&booked), "{booked}");
    }
    Ok(())
}

#[test]
fn picking_an_event_date_drops_the_booking_period() -> Result<()> {
    let session = session(false, NavigationMode::Legacy);
    let mut screen = ScreenController::open(&session, ListKind::Bookings, "", TODAY);
    screen.dispatch(ScreenCommand::EditFilter(
        FilterKey::EventDate,
        FilterValue::Date(Some(date!(2020 - 08 - 10))),
    ));

    let request = ticket(&screen.dispatch(ScreenCommand::Confirm))?.request;
    assert_eq!(request.value("eventDate"), Some("2020-08-10"));
    assert_eq!(request.value("bookingPeriodBeginningDate"), None);
    assert_eq!(request.value("bookingPeriodEndingDate"), None);
    assert_eq!(request.value("bookingStatusFilter"), Some("booked"));

    let query = screen
        .url()
        .split_once('?')
        .map(|(_, query)| query.to_owned())
        .unwrap_or_default();
    let reloaded = ScreenController::open(&session, ListKind::Bookings, &query, TODAY);
    assert_eq!(reloaded.applied(), screen.applied());
    assert_eq!(
        reloaded.applied().get(FilterKey::BookingPeriodStart),
        Some(&FilterValue::Date(None))
    );
    Ok(())
}

#[test]
fn clearing_the_event_date_keeps_the_booking_period() -> Result<()> {
    let mut screen = ScreenController::open(
        &session(false, NavigationMode::Legacy),
        ListKind::Bookings,
        "",
        TODAY,
    );
    screen.dispatch(ScreenCommand::EditFilter(
        FilterKey::EventDate,
        FilterValue::Date(None),
    ));

    let request = ticket(&screen.dispatch(ScreenCommand::Confirm))?.request;
    assert_eq!(request.value("eventDate"), None);
    assert_eq!(request.value("bookingPeriodBeginningDate"), Some("2024-02-14"));
    assert_eq!(request.value("bookingPeriodEndingDate"), Some("2024-03-15"));
    Ok(())
}

#[test]
fn template_screen_requests_showcase_offers() -> Result<()> {
    let session = AppSession::start(
        CurrentUser {
            id: UserId::new(7),
            email: "equipe@example.com".to_owned(),
            is_admin: false,
            navigation: NavigationMode::Legacy,
        },
        FeatureFlags::from_names(["WIP_ENABLE_NEW_COLLECTIVE_OFFERS_AND_BOOKINGS_STRUCTURE"]),
    );
    let mut screen = ScreenController::open(&session, ListKind::CollectiveTemplates, "", TODAY);
    assert_eq!(screen.url(), "/offres/vitrines");

    let ticket = ticket(&screen.dispatch(ScreenCommand::Confirm))?;
    assert_eq!(ticket.key.query_key, "getCollectiveOffersTemplate");
    assert_eq!(ticket.request.value("collectiveOfferType"), Some("template"));
    assert_eq!(
        ticket.request.values("status"),
        vec!["PENDING", "REJECTED", "ACTIVE", "INACTIVE", "DRAFT"]
    );
    Ok(())
}

#[test]
fn unified_navigation_scopes_requests_to_the_selected_offerer() -> Result<()> {
    let catalog = DemoCatalog::seeded(11, TODAY);
    let mut session = session(true, NavigationMode::Unified);
    session.select_offerer(Some(OffererId::new(2)));
    let mut screen = ScreenController::open(&session, ListKind::IndividualOffers, "", TODAY);

    let events = screen.dispatch(ScreenCommand::EditFilter(
        FilterKey::Offerer,
        FilterValue::Id(Some(1)),
    ));
    assert!(matches!(
        events.as_slice(),
        [ScreenEvent::FilterRejected(ListError::Validation { .. })]
    ));
    assert!(screen.status_control_enabled());

    confirm_and_load(&mut screen, &catalog)?;
    let venues = catalog.venues_of(OffererId::new(2));
    assert!(!screen.rows().is_empty());
    for row in screen.rows() {
        let venue = row.venue.as_ref().context("offer rows carry a venue")?;
        assert!(venues.iter().any(|known| known.id == venue.id));
    }
    Ok(())
}

#[test]
fn long_offer_lists_are_truncated() -> Result<()> {
    let backend = ScriptedBackend::new().respond(Ok(offers(501)));
    let mut screen = ScreenController::open(
        &session(false, NavigationMode::Legacy),
        ListKind::IndividualOffers,
        "",
        TODAY,
    );

    let events = confirm_and_load(&mut screen, &backend)?;
    assert!(events.contains(&ScreenEvent::RowsReplaced {
        count: 500,
        truncated: true
    }));
    assert!(screen.truncated());
    Ok(())
}

#[test]
fn failed_search_clears_rows_and_can_be_retried() -> Result<()> {
    let backend = ScriptedBackend::new()
        .respond(Ok(offers(3)))
        .respond(Err(ListError::http(503, "maintenance")))
        .respond(Ok(offers(2)));
    let mut screen = ScreenController::open(
        &session(false, NavigationMode::Legacy),
        ListKind::IndividualOffers,
        "",
        TODAY,
    );

    confirm_and_load(&mut screen, &backend)?;
    assert_eq!(screen.rows().len(), 3);

    confirm_and_load(&mut screen, &backend)?;
    assert_eq!(screen.phase(), ScreenPhase::Error);
    assert!(screen.rows().is_empty());
    assert!(screen.last_error().is_some_and(ListError::is_surfaced));

    confirm_and_load(&mut screen, &backend)?;
    assert_eq!(screen.phase(), ScreenPhase::Loaded);
    assert_eq!(screen.rows().len(), 2);
    Ok(())
}
