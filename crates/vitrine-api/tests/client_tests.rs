// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Request, Response, Server};
use vitrine_api::Client;
use vitrine_app::{
    ListError, ListKind, ListRequest, ListingBackend, ListingRow, OfferStatus, OffererId,
};
use vitrine_testkit::{booking, individual_offer, venue_summary};

fn mock_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());
    Ok((server, addr))
}

fn respond_json(request: Request, status: u16, body: String) {
    let response = Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        );
    request.respond(response).expect("response should succeed");
}

fn header(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_owned())
}

fn request(list: ListKind, params: Vec<(&'static str, &str)>) -> ListRequest {
    ListRequest {
        list,
        params: params
            .into_iter()
            .map(|(name, value)| (name, value.to_owned()))
            .collect(),
    }
}

#[test]
fn unreachable_backend_is_a_transport_error() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1/api", Duration::from_millis(50), None)?;
    let error = client
        .fetch_page(&request(ListKind::IndividualOffers, Vec::new()), 1)
        .expect_err("fetch should fail for unreachable backend");
    assert!(matches!(error, ListError::Transport { status: None, .. }));
    assert!(error.to_string().contains("api.base_url"));
    Ok(())
}

#[test]
fn offers_are_fetched_with_filters_and_token() -> Result<()> {
    let (server, addr) = mock_server()?;
    let rows = vec![
        individual_offer(1, "Le Petit Prince", OfferStatus::Active, 3),
        individual_offer(2, "Le Petit Nicolas", OfferStatus::SoldOut, 3),
    ];
    let body = serde_json::to_string(&rows)?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/api/offers?nameOrIsbn=petit&venueId=3&status=SOLD_OUT"
        );
        assert_eq!(
            header(&request, "Authorization").as_deref(),
            Some("Bearer s3cret")
        );
        respond_json(request, 200, body);
    });

    let client = Client::new(&addr, Duration::from_secs(1), Some("s3cret"))?;
    let page = client.fetch_page(
        &request(
            ListKind::IndividualOffers,
            vec![
                ("nameOrIsbn", "petit"),
                ("venueId", "3"),
                ("status", "SOLD_OUT"),
            ],
        ),
        1,
    )?;
    assert_eq!(page.rows.len(), 2);
    assert!(!page.has_more());
    assert!(matches!(
        &page.rows[1],
        ListingRow::IndividualOffer(offer) if offer.status == "SOLD_OUT"
    ));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn bookings_pages_are_requested_one_by_one() -> Result<()> {
    let (server, addr) = mock_server()?;
    let body = serde_json::json!({
        "bookingsRecap": [booking(10, "Dune", "validated"), booking(11, "Dune", "booked")],
        "page": 2,
        "pages": 3,
        "total": 42,
    })
    .to_string();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/api/bookings/pro?bookingStatusFilter=validated&page=2"
        );
        assert_eq!(header(&request, "Authorization"), None);
        respond_json(request, 200, body);
    });

    let client = Client::new(&addr, Duration::from_secs(1), Some("  "))?;
    let page = client.fetch_page(
        &request(ListKind::Bookings, vec![("bookingStatusFilter", "validated")]),
        2,
    )?;
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.total, 42);
    assert!(page.has_more());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn missing_venue_maps_to_not_found() -> Result<()> {
    let (server, addr) = mock_server()?;
    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        respond_json(request, 404, r#"{"global": ["lieu 999 introuvable"]}"#.to_owned());
    });

    let client = Client::new(&addr, Duration::from_secs(1), None)?;
    let error = client
        .fetch_page(
            &request(ListKind::CollectiveOffers, vec![("venueId", "999")]),
            1,
        )
        .expect_err("404 should fail");
    assert_eq!(
        error,
        ListError::NotFound {
            resource: "lieu 999 introuvable".to_owned()
        }
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn server_errors_and_bad_bodies_are_transport_errors() -> Result<()> {
    let (server, addr) = mock_server()?;
    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        respond_json(request, 500, r#"{"message": "database unavailable"}"#.to_owned());
        let request = server.recv().expect("request expected");
        respond_json(request, 200, r#"{"unexpected": true}"#.to_owned());
    });

    let client = Client::new(&addr, Duration::from_secs(1), None)?;
    let offers = request(ListKind::IndividualOffers, Vec::new());

    let error = client.fetch_page(&offers, 1).expect_err("500 should fail");
    assert_eq!(
        error,
        ListError::Transport {
            status: Some(500),
            message: "server error (500): database unavailable".to_owned()
        }
    );

    let error = client
        .fetch_page(&offers, 1)
        .expect_err("undecodable body should fail");
    assert!(matches!(error, ListError::Transport { status: None, .. }));
    assert!(error.to_string().contains("decode offers response"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn venues_are_listed_for_an_offerer() -> Result<()> {
    let (server, addr) = mock_server()?;
    let body = serde_json::json!({
        "venues": [venue_summary(3, "Cinéma de Lyon"), venue_summary(4, "Musée de Dijon")],
    })
    .to_string();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/api/venues?activeOfferersOnly=true&offererId=2"
        );
        respond_json(request, 200, body);
    });

    let client = Client::new(&addr, Duration::from_secs(1), None)?;
    let venues = client.list_venues(Some(OffererId::new(2)))?;
    let names: Vec<&str> = venues.iter().map(|venue| venue.name.as_str()).collect();
    assert_eq!(names, vec!["Cinéma de Lyon", "Musée de Dijon"]);

    handle.join().expect("server thread should join");
    Ok(())
}
