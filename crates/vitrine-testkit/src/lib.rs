// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::VecDeque;
use std::sync::Mutex;
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, OffsetDateTime, Time};
use vitrine_app::{
    BookedStock, BookingId, BookingRecapRow, COLLECTIVE_FORMATS, CollectiveOfferId,
    CollectiveOfferRow, CollectiveOfferStatus, IndividualOfferRow, ItemId, ItemStatus,
    ItemTimestamps, ListError, ListItem, ListKind, ListRequest, ListingBackend, ListingPage,
    ListingRow, OfferDates, OfferId, OfferStatus, OffererId, RemainingQuantity, RowAddress,
    RowVenue, StockRow, StockSummary, VenueId, VenueSummary, parse_date, parse_timestamp,
};

const OFFER_TITLES: [&str; 16] = [
    "Le Petit Prince",
    "Les Misérables",
    "Concert de jazz manouche",
    "Atelier de gravure",
    "Abonnement cinéma",
    "Visite du château",
    "Festival des lumières",
    "Cours de théâtre",
    "Exposition photo",
    "Lecture à voix haute",
    "Stage de danse",
    "Orchestre symphonique",
    "Ciné-concert",
    "Initiation au chant",
    "Carnet de voyage",
    "Nuit des musées",
];

const VENUE_KINDS: [&str; 8] = [
    "Librairie",
    "Cinéma",
    "Théâtre",
    "Musée",
    "Salle de concert",
    "Médiathèque",
    "Conservatoire",
    "Galerie",
];

const CITIES: [(&str, &str); 8] = [
    ("Lyon", "69001"),
    ("Nantes", "44000"),
    ("Lille", "59000"),
    ("Rennes", "35000"),
    ("Bordeaux", "33000"),
    ("Strasbourg", "67000"),
    ("Dijon", "21000"),
    ("Paris", "75011"),
];

const STREETS: [&str; 6] = [
    "rue des Arts",
    "place du Marché",
    "avenue Jean Jaurès",
    "quai Saint-Michel",
    "rue Victor Hugo",
    "boulevard Voltaire",
];

const OFFERER_NAMES: [&str; 4] = [
    "Association Culture Vive",
    "SAS Les Tréteaux",
    "Mairie de Saint-Lys",
    "SCOP L'Atelier",
];

const BOOKING_STATUSES: [&str; 5] = ["booked", "confirmed", "validated", "cancelled", "reimbursed"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, percent: usize) -> bool {
        self.int_n(100) < percent
    }
}

pub fn timestamp(value: OffsetDateTime) -> Option<String> {
    value.format(&Rfc3339).ok()
}

pub fn at_noon(date: Date) -> OffsetDateTime {
    date.with_time(Time::MIDNIGHT).assume_utc() + Duration::hours(12)
}

pub fn row_venue(id: i64, name: &str) -> RowVenue {
    RowVenue {
        id: VenueId::new(id),
        name: name.to_owned(),
        public_name: None,
        offerer_name: None,
    }
}

pub fn venue_summary(id: i64, name: &str) -> VenueSummary {
    VenueSummary {
        id: VenueId::new(id),
        name: name.to_owned(),
        public_name: None,
        offerer_name: String::new(),
        is_virtual: false,
    }
}

pub fn stock(remaining: u64, beginning: Option<OffsetDateTime>) -> StockRow {
    StockRow {
        remaining_quantity: Some(RemainingQuantity::Count(remaining)),
        beginning_datetime: beginning.and_then(timestamp),
        booking_limit_datetime: None,
    }
}

pub fn unlimited_stock() -> StockRow {
    StockRow {
        remaining_quantity: Some(RemainingQuantity::Text("unlimited".to_owned())),
        ..StockRow::default()
    }
}

pub fn individual_offer(
    id: i64,
    name: &str,
    status: OfferStatus,
    venue_id: i64,
) -> IndividualOfferRow {
    IndividualOfferRow {
        id: OfferId::new(id),
        name: name.to_owned(),
        status: status.api_value().to_owned(),
        venue: row_venue(venue_id, &format!("Lieu {venue_id}")),
        stocks: vec![stock(5, None)],
        address: None,
        is_event: false,
        date_created: None,
    }
}

pub fn collective_offer(
    id: i64,
    name: &str,
    status: CollectiveOfferStatus,
    venue_id: i64,
) -> CollectiveOfferRow {
    CollectiveOfferRow {
        id: CollectiveOfferId::new(id),
        name: name.to_owned(),
        status: status.api_value().to_owned(),
        venue: row_venue(venue_id, &format!("Lieu {venue_id}")),
        stocks: vec![stock(1, None)],
        dates: None,
        is_showcase: false,
    }
}

pub fn booking(id: i64, offer_name: &str, status: &str) -> BookingRecapRow {
    BookingRecapRow {
        id: BookingId::new(id),
        stock: BookedStock {
            offer_name: offer_name.to_owned(),
            offer_id: None,
            event_beginning_datetime: None,
            offer_is_educational: false,
        },
        booking_status: status.to_owned(),
        booking_date: None,
        booking_is_duo: false,
        venue: None,
    }
}

pub fn list_item(id: i64, name: &str) -> ListItem {
    ListItem {
        id: ItemId::Offer(OfferId::new(id)),
        display_name: name.to_owned(),
        status: ItemStatus::Offer(OfferStatus::Active),
        venue: None,
        stock: StockSummary::Remaining(1),
        timestamps: ItemTimestamps::default(),
    }
}

pub fn offer_page(rows: Vec<IndividualOfferRow>) -> ListingPage {
    ListingPage::single(rows.into_iter().map(ListingRow::IndividualOffer).collect())
}

/// Backend that replays queued responses and records every call.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<ListingPage, ListError>>>,
    calls: Mutex<Vec<(ListRequest, u32)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Result<ListingPage, ListError>) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
        self
    }

    pub fn calls(&self) -> Vec<(ListRequest, u32)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl ListingBackend for ScriptedBackend {
    fn fetch_page(&self, request: &ListRequest, page: u32) -> Result<ListingPage, ListError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((request.clone(), page));
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front())
            .unwrap_or_else(|| Err(ListError::transport("no scripted response left")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoVenue {
    pub offerer: OffererId,
    pub summary: VenueSummary,
}

/// Seeded in-memory catalog that answers listing requests like the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCatalog {
    pub offerers: Vec<(OffererId, String)>,
    pub venues: Vec<DemoVenue>,
    pub offers: Vec<IndividualOfferRow>,
    pub collective_offers: Vec<CollectiveOfferRow>,
    pub bookings: Vec<BookingRecapRow>,
    pub bookings_per_page: usize,
}

impl DemoCatalog {
    /// Dates are spread around `today` so default booking periods match.
    pub fn seeded(seed: u64, today: Date) -> Self {
        let mut rng = DeterministicRng::new(if seed == 0 { 1 } else { seed });
        let now = at_noon(today);

        let offerers: Vec<(OffererId, String)> = OFFERER_NAMES
            .iter()
            .enumerate()
            .map(|(index, name)| (OffererId::new(index as i64 + 1), (*name).to_owned()))
            .collect();

        let mut venues = Vec::new();
        for (index, kind) in VENUE_KINDS.iter().enumerate() {
            let (offerer, offerer_name) = &offerers[index % offerers.len()];
            let (city, _) = CITIES[index % CITIES.len()];
            venues.push(DemoVenue {
                offerer: *offerer,
                summary: VenueSummary {
                    id: VenueId::new(index as i64 + 1),
                    name: format!("{kind} de {city}"),
                    public_name: (index % 3 == 0).then(|| format!("Le {kind}")),
                    offerer_name: offerer_name.clone(),
                    is_virtual: false,
                },
            });
        }

        let mut offers = Vec::new();
        for id in 1..=42_i64 {
            let venue = &venues[rng.int_n(venues.len())].summary;
            let (city, postal_code) = CITIES[rng.int_n(CITIES.len())];
            let stocks = if rng.chance(15) {
                vec![unlimited_stock()]
            } else {
                (0..=rng.int_n(3))
                    .map(|_| {
                        let offset = rng.int_n(120) as i64 - 30;
                        stock(rng.int_n(40) as u64, Some(now + Duration::days(offset)))
                    })
                    .collect()
            };
            offers.push(IndividualOfferRow {
                id: OfferId::new(id),
                name: OFFER_TITLES[rng.int_n(OFFER_TITLES.len())].to_owned(),
                status: OfferStatus::ALL[rng.int_n(OfferStatus::ALL.len())]
                    .api_value()
                    .to_owned(),
                venue: RowVenue {
                    id: venue.id,
                    name: venue.name.clone(),
                    public_name: venue.public_name.clone(),
                    offerer_name: Some(venue.offerer_name.clone()),
                },
                stocks,
                address: Some(RowAddress {
                    label: None,
                    street: Some(format!(
                        "{} {}",
                        rng.int_n(90) + 1,
                        STREETS[rng.int_n(STREETS.len())]
                    )),
                    postal_code: Some(postal_code.to_owned()),
                    city: Some(city.to_owned()),
                }),
                is_event: rng.chance(60),
                date_created: timestamp(now - Duration::days(rng.int_n(365) as i64)),
            });
        }

        let mut collective_offers = Vec::new();
        for id in 1..=18_i64 {
            let venue = &venues[rng.int_n(venues.len())].summary;
            let start = now + Duration::days(rng.int_n(90) as i64 - 20);
            collective_offers.push(CollectiveOfferRow {
                id: CollectiveOfferId::new(id),
                name: format!(
                    "{} - {}",
                    COLLECTIVE_FORMATS[rng.int_n(COLLECTIVE_FORMATS.len())],
                    OFFER_TITLES[rng.int_n(OFFER_TITLES.len())]
                ),
                status: CollectiveOfferStatus::ALL[rng.int_n(CollectiveOfferStatus::ALL.len())]
                    .api_value()
                    .to_owned(),
                venue: RowVenue {
                    id: venue.id,
                    name: venue.name.clone(),
                    public_name: venue.public_name.clone(),
                    offerer_name: Some(venue.offerer_name.clone()),
                },
                stocks: vec![stock(1, Some(start))],
                dates: Some(OfferDates {
                    start: timestamp(start),
                    end: timestamp(start + Duration::hours(3)),
                }),
                is_showcase: rng.chance(30),
            });
        }

        let mut bookings = Vec::new();
        for id in 1..=57_i64 {
            let venue = &venues[rng.int_n(venues.len())].summary;
            let booked_at = now - Duration::days(rng.int_n(45) as i64);
            let event = booked_at + Duration::days(rng.int_n(30) as i64 + 1);
            bookings.push(BookingRecapRow {
                id: BookingId::new(id),
                stock: BookedStock {
                    offer_name: OFFER_TITLES[rng.int_n(OFFER_TITLES.len())].to_owned(),
                    offer_id: Some(rng.int_n(42) as i64 + 1),
                    event_beginning_datetime: timestamp(event),
                    offer_is_educational: rng.chance(25),
                },
                booking_status: BOOKING_STATUSES[rng.int_n(BOOKING_STATUSES.len())].to_owned(),
                booking_date: timestamp(booked_at),
                booking_is_duo: rng.chance(20),
                venue: Some(RowVenue {
                    id: venue.id,
                    name: venue.name.clone(),
                    public_name: venue.public_name.clone(),
                    offerer_name: Some(venue.offerer_name.clone()),
                }),
            });
        }

        Self {
            offerers,
            venues,
            offers,
            collective_offers,
            bookings,
            bookings_per_page: 20,
        }
    }

    pub fn venue_summaries(&self) -> Vec<VenueSummary> {
        self.venues.iter().map(|venue| venue.summary.clone()).collect()
    }

    pub fn venues_of(&self, offerer: OffererId) -> Vec<VenueSummary> {
        self.venues
            .iter()
            .filter(|venue| venue.offerer == offerer)
            .map(|venue| venue.summary.clone())
            .collect()
    }

    fn venue_matches(&self, request: &ListRequest, venue: VenueId) -> bool {
        if let Some(wanted) = request.value("venueId")
            && wanted != venue.to_string()
        {
            return false;
        }
        if let Some(wanted) = request.value("offererId") {
            return self
                .venues
                .iter()
                .any(|known| known.summary.id == venue && known.offerer.to_string() == wanted);
        }
        true
    }

    fn offers_page(&self, request: &ListRequest) -> ListingPage {
        let text = request.value("nameOrIsbn").map(str::to_lowercase);
        let statuses = request.values("status");
        let rows = self
            .offers
            .iter()
            .filter(|offer| self.venue_matches(request, offer.venue.id))
            .filter(|offer| {
                text.as_deref()
                    .is_none_or(|text| offer.name.to_lowercase().contains(text))
            })
            .filter(|offer| statuses.is_empty() || statuses.contains(&offer.status.as_str()))
            .cloned()
            .map(ListingRow::IndividualOffer)
            .collect();
        ListingPage::single(rows)
    }

    fn collective_page(&self, request: &ListRequest) -> ListingPage {
        let text = request.value("nameOrIsbn").map(str::to_lowercase);
        let statuses = request.values("status");
        let showcase = match request.value("collectiveOfferType") {
            Some("offer") => Some(false),
            Some("template") => Some(true),
            _ => None,
        };
        let rows = self
            .collective_offers
            .iter()
            .filter(|offer| self.venue_matches(request, offer.venue.id))
            .filter(|offer| {
                text.as_deref()
                    .is_none_or(|text| offer.name.to_lowercase().contains(text))
            })
            .filter(|offer| statuses.is_empty() || statuses.contains(&offer.status.as_str()))
            .filter(|offer| showcase.is_none_or(|showcase| offer.is_showcase == showcase))
            .cloned()
            .map(ListingRow::CollectiveOffer)
            .collect();
        ListingPage::single(rows)
    }

    fn bookings_page(&self, request: &ListRequest, page: u32) -> ListingPage {
        let from = request
            .value("bookingPeriodBeginningDate")
            .and_then(parse_date);
        let to = request
            .value("bookingPeriodEndingDate")
            .and_then(parse_date);
        let educational = match request.value("offerType") {
            Some("individual") => Some(false),
            Some("collective") => Some(true),
            _ => None,
        };
        let statuses: &[&str] = match request.value("bookingStatusFilter") {
            Some("validated") => &["validated", "reimbursed"],
            Some("reimbursed") => &["reimbursed"],
            _ => &BOOKING_STATUSES,
        };
        let matching: Vec<&BookingRecapRow> = self
            .bookings
            .iter()
            .filter(|booking| {
                booking
                    .venue
                    .as_ref()
                    .is_none_or(|venue| self.venue_matches(request, venue.id))
            })
            .filter(|booking| {
                educational.is_none_or(|wanted| booking.stock.offer_is_educational == wanted)
            })
            .filter(|booking| statuses.contains(&booking.booking_status.as_str()))
            .filter(|booking| {
                let booked = booking
                    .booking_date
                    .as_deref()
                    .and_then(parse_timestamp)
                    .map(OffsetDateTime::date);
                match booked {
                    Some(date) => {
                        from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
                    }
                    None => false,
                }
            })
            .collect();

        let per_page = self.bookings_per_page.max(1);
        let pages = matching.len().div_ceil(per_page).max(1);
        let page = (page as usize).clamp(1, pages);
        let rows = matching
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .map(|booking| ListingRow::Booking((*booking).clone()))
            .collect();
        ListingPage {
            rows,
            page: page as u32,
            pages: pages as u32,
            total: matching.len() as u64,
        }
    }
}

impl ListingBackend for DemoCatalog {
    fn fetch_page(&self, request: &ListRequest, page: u32) -> Result<ListingPage, ListError> {
        if let Some(venue) = request.value("venueId")
            && !self
                .venues
                .iter()
                .any(|known| known.summary.id.to_string() == venue)
        {
            return Err(ListError::NotFound {
                resource: format!("venue {venue}"),
            });
        }
        Ok(match request.list {
            ListKind::IndividualOffers => self.offers_page(request),
            ListKind::CollectiveOffers | ListKind::CollectiveTemplates => {
                self.collective_page(request)
            }
            ListKind::Bookings => self.bookings_page(request, page),
        })
    }
}
