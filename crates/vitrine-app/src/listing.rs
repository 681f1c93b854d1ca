// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::ListError;
use crate::features::LocationDisplay;
use crate::ids::{BookingId, CollectiveOfferId, ItemId, OfferId, VenueId};
use crate::model::{BookingStatus, CollectiveOfferStatus, ListColumn, ListKind, OfferStatus};
use crate::paging::{SortKey, Sortable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowVenue {
    pub id: VenueId,
    pub name: String,
    #[serde(default)]
    pub public_name: Option<String>,
    #[serde(default)]
    pub offerer_name: Option<String>,
}

impl RowVenue {
    fn display_name(&self) -> &str {
        match self.public_name.as_deref() {
            Some(public) if !public.trim().is_empty() => public,
            _ => &self.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowAddress {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl RowAddress {
    /// `label - street postal_code city`, skipping blank parts.
    pub fn display_name(&self) -> String {
        let place = [&self.street, &self.postal_code, &self.city]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        match self.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() && !place.is_empty() => format!("{label} - {place}"),
            Some(label) if !label.is_empty() => label.to_owned(),
            _ => place,
        }
    }
}

/// Backend stock quantity: a count, or the literal `"unlimited"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemainingQuantity {
    Count(u64),
    Text(String),
}

impl RemainingQuantity {
    fn count(&self) -> Option<u64> {
        match self {
            Self::Count(count) => Some(*count),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    fn is_unlimited(&self) -> bool {
        matches!(self, Self::Text(text) if text.eq_ignore_ascii_case("unlimited"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    #[serde(default)]
    pub remaining_quantity: Option<RemainingQuantity>,
    #[serde(default)]
    pub beginning_datetime: Option<String>,
    #[serde(default)]
    pub booking_limit_datetime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualOfferRow {
    pub id: OfferId,
    pub name: String,
    pub status: String,
    pub venue: RowVenue,
    #[serde(default)]
    pub stocks: Vec<StockRow>,
    #[serde(default)]
    pub address: Option<RowAddress>,
    #[serde(default)]
    pub is_event: bool,
    #[serde(default)]
    pub date_created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OfferDates {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectiveOfferRow {
    pub id: CollectiveOfferId,
    pub name: String,
    pub status: String,
    pub venue: RowVenue,
    #[serde(default)]
    pub stocks: Vec<StockRow>,
    #[serde(default)]
    pub dates: Option<OfferDates>,
    #[serde(default)]
    pub is_showcase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedStock {
    pub offer_name: String,
    #[serde(default)]
    pub offer_id: Option<i64>,
    #[serde(default)]
    pub event_beginning_datetime: Option<String>,
    #[serde(default)]
    pub offer_is_educational: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecapRow {
    #[serde(alias = "bookingId")]
    pub id: BookingId,
    pub stock: BookedStock,
    pub booking_status: String,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub booking_is_duo: bool,
    #[serde(default)]
    pub venue: Option<RowVenue>,
}

/// One backend row, tagged by the endpoint it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListingRow {
    IndividualOffer(IndividualOfferRow),
    CollectiveOffer(CollectiveOfferRow),
    Booking(BookingRecapRow),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingPayload<T> {
    Flat(Vec<T>),
    Envelope {
        #[serde(alias = "bookingsRecap")]
        items: Vec<T>,
        #[serde(default = "first_page")]
        page: u32,
        #[serde(default = "first_page")]
        pages: u32,
        #[serde(default)]
        total: Option<u64>,
    },
}

const fn first_page() -> u32 {
    1
}

impl<T> ListingPayload<T> {
    fn into_page(self, tag: fn(T) -> ListingRow) -> ListingPage {
        match self {
            Self::Flat(rows) => ListingPage {
                total: rows.len() as u64,
                rows: rows.into_iter().map(tag).collect(),
                page: 1,
                pages: 1,
            },
            Self::Envelope {
                items,
                page,
                pages,
                total,
            } => ListingPage {
                total: total.unwrap_or(items.len() as u64),
                rows: items.into_iter().map(tag).collect(),
                page,
                pages: pages.max(1),
            },
        }
    }
}

/// One backend response, whichever shape it came in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    pub rows: Vec<ListingRow>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

impl ListingPage {
    pub fn single(rows: Vec<ListingRow>) -> Self {
        Self {
            total: rows.len() as u64,
            rows,
            page: 1,
            pages: 1,
        }
    }

    pub const fn has_more(&self) -> bool {
        self.page < self.pages
    }
}

pub fn decode_listing(kind: ListKind, body: &str) -> Result<ListingPage, ListError> {
    let page = match kind {
        ListKind::IndividualOffers => decode_rows(body, ListingRow::IndividualOffer),
        ListKind::CollectiveOffers | ListKind::CollectiveTemplates => {
            decode_rows(body, ListingRow::CollectiveOffer)
        }
        ListKind::Bookings => decode_rows(body, ListingRow::Booking),
    };
    page.map_err(|error| {
        ListError::transport(format!("decode {} response: {error}", kind.endpoint()))
    })
}

fn decode_rows<T: DeserializeOwned>(
    body: &str,
    tag: fn(T) -> ListingRow,
) -> serde_json::Result<ListingPage> {
    serde_json::from_str::<ListingPayload<T>>(body).map(|payload| payload.into_page(tag))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Offer(OfferStatus),
    CollectiveOffer(CollectiveOfferStatus),
    Booking(BookingStatus),
    Unknown(String),
}

impl ItemStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Offer(status) => status.label(),
            Self::CollectiveOffer(status) => status.label(),
            Self::Booking(status) => status.label(),
            Self::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRef {
    pub id: VenueId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockSummary {
    Unlimited,
    Remaining(u64),
    /// Places held by a booking.
    Booked(u32),
}

impl StockSummary {
    pub fn label(&self) -> String {
        match self {
            Self::Unlimited => "illimité".to_owned(),
            Self::Remaining(count) => count.to_string(),
            Self::Booked(count) => count.to_string(),
        }
    }

    fn sort_value(&self) -> u64 {
        match self {
            Self::Unlimited => u64::MAX,
            Self::Remaining(count) => *count,
            Self::Booked(count) => u64::from(*count),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemTimestamps {
    pub created_at: Option<OffsetDateTime>,
    pub event_start: Option<OffsetDateTime>,
    pub booking_limit: Option<OffsetDateTime>,
    pub booked_at: Option<OffsetDateTime>,
}

/// Normalized row shown by every list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: ItemId,
    pub display_name: String,
    pub status: ItemStatus,
    pub venue: Option<VenueRef>,
    pub stock: StockSummary,
    pub timestamps: ItemTimestamps,
}

impl ListItem {
    pub fn from_row(row: &ListingRow, location: LocationDisplay) -> Self {
        match row {
            ListingRow::IndividualOffer(offer) => normalize_individual_offer(offer, location),
            ListingRow::CollectiveOffer(offer) => normalize_collective_offer(offer),
            ListingRow::Booking(booking) => normalize_booking(booking),
        }
    }
}

impl Sortable<ListColumn> for ListItem {
    fn sort_key(&self, column: ListColumn) -> SortKey {
        match column {
            ListColumn::Name => SortKey::text(&self.display_name),
            ListColumn::Venue => {
                SortKey::text(self.venue.as_ref().map_or("", |venue| venue.name.as_str()))
            }
            ListColumn::EventDate => SortKey::Date(self.timestamps.event_start),
            ListColumn::BookedAt => SortKey::Date(self.timestamps.booked_at),
            ListColumn::Stock => SortKey::Number(self.stock.sort_value()),
            ListColumn::Status => SortKey::text(self.status.label()),
        }
    }
}

pub fn normalize_individual_offer(
    offer: &IndividualOfferRow,
    location: LocationDisplay,
) -> ListItem {
    let venue_name = match (location, &offer.address) {
        (LocationDisplay::Address, Some(address)) if !address.display_name().is_empty() => {
            address.display_name()
        }
        _ => offer.venue.display_name().to_owned(),
    };
    ListItem {
        id: ItemId::Offer(offer.id),
        display_name: offer.name.clone(),
        status: OfferStatus::from_api(&offer.status)
            .map_or_else(|| ItemStatus::Unknown(offer.status.clone()), ItemStatus::Offer),
        venue: Some(VenueRef {
            id: offer.venue.id,
            name: venue_name,
        }),
        stock: remaining_stock(&offer.stocks),
        timestamps: ItemTimestamps {
            created_at: offer.date_created.as_deref().and_then(parse_timestamp),
            event_start: earliest(offer.stocks.iter().map(|stock| &stock.beginning_datetime)),
            booking_limit: earliest(offer.stocks.iter().map(|stock| &stock.booking_limit_datetime)),
            booked_at: None,
        },
    }
}

pub fn normalize_collective_offer(offer: &CollectiveOfferRow) -> ListItem {
    let event_start = offer
        .dates
        .as_ref()
        .and_then(|dates| dates.start.as_deref())
        .and_then(parse_timestamp)
        .or_else(|| earliest(offer.stocks.iter().map(|stock| &stock.beginning_datetime)));
    ListItem {
        id: ItemId::CollectiveOffer(offer.id),
        display_name: offer.name.clone(),
        status: CollectiveOfferStatus::from_api(&offer.status).map_or_else(
            || ItemStatus::Unknown(offer.status.clone()),
            ItemStatus::CollectiveOffer,
        ),
        venue: Some(VenueRef {
            id: offer.venue.id,
            name: offer.venue.display_name().to_owned(),
        }),
        stock: remaining_stock(&offer.stocks),
        timestamps: ItemTimestamps {
            created_at: None,
            event_start,
            booking_limit: earliest(offer.stocks.iter().map(|stock| &stock.booking_limit_datetime)),
            booked_at: None,
        },
    }
}

pub fn normalize_booking(booking: &BookingRecapRow) -> ListItem {
    ListItem {
        id: ItemId::Booking(booking.id),
        display_name: booking.stock.offer_name.clone(),
        status: BookingStatus::from_api(&booking.booking_status).map_or_else(
            || ItemStatus::Unknown(booking.booking_status.clone()),
            ItemStatus::Booking,
        ),
        venue: booking.venue.as_ref().map(|venue| VenueRef {
            id: venue.id,
            name: venue.display_name().to_owned(),
        }),
        stock: StockSummary::Booked(if booking.booking_is_duo { 2 } else { 1 }),
        timestamps: ItemTimestamps {
            created_at: None,
            event_start: booking
                .stock
                .event_beginning_datetime
                .as_deref()
                .and_then(parse_timestamp),
            booking_limit: None,
            booked_at: booking.booking_date.as_deref().and_then(parse_timestamp),
        },
    }
}

fn remaining_stock(stocks: &[StockRow]) -> StockSummary {
    let mut total = 0_u64;
    for quantity in stocks.iter().filter_map(|stock| stock.remaining_quantity.as_ref()) {
        if quantity.is_unlimited() {
            return StockSummary::Unlimited;
        }
        total = total.saturating_add(quantity.count().unwrap_or(0));
    }
    StockSummary::Remaining(total)
}

fn earliest<'a>(values: impl Iterator<Item = &'a Option<String>>) -> Option<OffsetDateTime> {
    values
        .filter_map(|value| value.as_deref().and_then(parse_timestamp))
        .min()
}

/// RFC 3339, or a naive ISO datetime read as UTC.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }
    PrimitiveDateTime::parse(
        value,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            value,
            &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
    })
    .ok()
    .map(PrimitiveDateTime::assume_utc)
}
