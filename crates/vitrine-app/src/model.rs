// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::*;

/// Status of an individual offer. `slug` is the URL form, `api_value` the
/// backend enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferStatus {
    Active,
    Inactive,
    SoldOut,
    Expired,
    Pending,
    Rejected,
    Draft,
}

impl OfferStatus {
    pub const ALL: [Self; 7] = [
        Self::Active,
        Self::Inactive,
        Self::SoldOut,
        Self::Expired,
        Self::Pending,
        Self::Rejected,
        Self::Draft,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::SoldOut => "epuisee",
            Self::Expired => "expiree",
            Self::Pending => "en-attente",
            Self::Rejected => "refusee",
            Self::Draft => "brouillon",
        }
    }

    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::SoldOut => "SOLD_OUT",
            Self::Expired => "EXPIRED",
            Self::Pending => "PENDING",
            Self::Rejected => "REJECTED",
            Self::Draft => "DRAFT",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "publiée",
            Self::Inactive => "désactivée",
            Self::SoldOut => "épuisée",
            Self::Expired => "expirée",
            Self::Pending => "en instruction",
            Self::Rejected => "refusée",
            Self::Draft => "brouillon",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.slug() == value)
    }

    pub fn from_api(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.api_value() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectiveOfferStatus {
    Pending,
    Rejected,
    Active,
    Inactive,
    Prebooked,
    Booked,
    Expired,
    Ended,
    Draft,
    Archived,
}

impl CollectiveOfferStatus {
    pub const ALL: [Self; 10] = [
        Self::Pending,
        Self::Rejected,
        Self::Active,
        Self::Inactive,
        Self::Prebooked,
        Self::Booked,
        Self::Expired,
        Self::Ended,
        Self::Draft,
        Self::Archived,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Pending => "en-attente",
            Self::Rejected => "refusee",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Prebooked => "prereservee",
            Self::Booked => "reservee",
            Self::Expired => "expiree",
            Self::Ended => "terminee",
            Self::Draft => "brouillon",
            Self::Archived => "archivee",
        }
    }

    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Rejected => "REJECTED",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Prebooked => "PREBOOKED",
            Self::Booked => "BOOKED",
            Self::Expired => "EXPIRED",
            Self::Ended => "ENDED",
            Self::Draft => "DRAFT",
            Self::Archived => "ARCHIVED",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "en instruction",
            Self::Rejected => "refusée",
            Self::Active => "publiée",
            Self::Inactive => "masquée",
            Self::Prebooked => "préréservée",
            Self::Booked => "réservée",
            Self::Expired => "expirée",
            Self::Ended => "terminée",
            Self::Draft => "brouillon",
            Self::Archived => "archivée",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.slug() == value)
    }

    pub fn from_api(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.api_value() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Booked,
    Confirmed,
    Validated,
    Cancelled,
    Reimbursed,
}

impl BookingStatus {
    pub const ALL: [Self; 5] = [
        Self::Booked,
        Self::Confirmed,
        Self::Validated,
        Self::Cancelled,
        Self::Reimbursed,
    ];

    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Confirmed => "confirmed",
            Self::Validated => "validated",
            Self::Cancelled => "cancelled",
            Self::Reimbursed => "reimbursed",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Booked => "réservé",
            Self::Confirmed => "confirmé",
            Self::Validated => "validé",
            Self::Cancelled => "annulé",
            Self::Reimbursed => "remboursé",
        }
    }

    pub fn from_api(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.api_value() == value.to_ascii_lowercase())
    }
}

/// Which date the bookings period filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatusFilter {
    Booked,
    Validated,
    Reimbursed,
}

impl BookingStatusFilter {
    pub const ALL: [Self; 3] = [Self::Booked, Self::Validated, Self::Reimbursed];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Booked => "reservees",
            Self::Validated => "validees",
            Self::Reimbursed => "remboursees",
        }
    }

    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Validated => "validated",
            Self::Reimbursed => "reimbursed",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|filter| filter.slug() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectiveOfferType {
    Offer,
    Template,
}

impl CollectiveOfferType {
    pub const ALL: [Self; 2] = [Self::Offer, Self::Template];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Offer => "offre",
            Self::Template => "vitrine",
        }
    }

    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Template => "template",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreationMode {
    Manual,
    Imported,
}

impl CreationMode {
    pub const ALL: [Self; 2] = [Self::Manual, Self::Imported];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Manual => "manuel",
            Self::Imported => "importe",
        }
    }

    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Imported => "imported",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.slug() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    Individual,
    Collective,
}

impl Audience {
    pub const ALL: [Self; 2] = [Self::Individual, Self::Collective];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Individual => "individuelle",
            Self::Collective => "collective",
        }
    }

    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Collective => "collective",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|audience| audience.slug() == value)
    }
}

/// Collective offer formats; the URL carries the label itself.
pub const COLLECTIVE_FORMATS: [&str; 8] = [
    "Atelier de pratique",
    "Concert",
    "Conférence, rencontre",
    "Festival, salon, congrès",
    "Projection audiovisuelle",
    "Représentation",
    "Visite guidée",
    "Visite libre",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ListKind {
    IndividualOffers,
    CollectiveOffers,
    CollectiveTemplates,
    Bookings,
}

impl ListKind {
    pub const ALL: [Self; 4] = [
        Self::IndividualOffers,
        Self::CollectiveOffers,
        Self::CollectiveTemplates,
        Self::Bookings,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IndividualOffers => "offers",
            Self::CollectiveOffers => "collective",
            Self::CollectiveTemplates => "templates",
            Self::Bookings => "bookings",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "offers" => Some(Self::IndividualOffers),
            "collective" => Some(Self::CollectiveOffers),
            "templates" => Some(Self::CollectiveTemplates),
            "bookings" => Some(Self::Bookings),
            _ => None,
        }
    }

    /// Console route the list lives under.
    pub const fn path(self) -> &'static str {
        match self {
            Self::IndividualOffers => "/offres",
            Self::CollectiveOffers => "/offres/collectives",
            Self::CollectiveTemplates => "/offres/vitrines",
            Self::Bookings => "/reservations",
        }
    }

    /// Backend listing endpoint, relative to the API base URL. Templates are
    /// served by the collective endpoint with a forced offer type.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::IndividualOffers => "offers",
            Self::CollectiveOffers | Self::CollectiveTemplates => "collective/offers",
            Self::Bookings => "bookings/pro",
        }
    }

    pub const fn columns(self) -> &'static [ListColumn] {
        match self {
            Self::IndividualOffers | Self::CollectiveOffers | Self::CollectiveTemplates => &[
                ListColumn::Name,
                ListColumn::Venue,
                ListColumn::EventDate,
                ListColumn::Stock,
                ListColumn::Status,
            ],
            Self::Bookings => &[
                ListColumn::Name,
                ListColumn::EventDate,
                ListColumn::BookedAt,
                ListColumn::Stock,
                ListColumn::Status,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListColumn {
    Name,
    Venue,
    EventDate,
    Stock,
    Status,
    BookedAt,
}

impl ListColumn {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Venue => "venue",
            Self::EventDate => "event_date",
            Self::Stock => "stock",
            Self::Status => "status",
            Self::BookedAt => "booked_at",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "venue" => Some(Self::Venue),
            "event_date" => Some(Self::EventDate),
            "stock" => Some(Self::Stock),
            "status" => Some(Self::Status),
            "booked_at" => Some(Self::BookedAt),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Venue => "venue",
            Self::EventDate => "event",
            Self::Stock => "stock",
            Self::Status => "status",
            Self::BookedAt => "booked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueSummary {
    pub id: VenueId,
    pub name: String,
    #[serde(default)]
    pub public_name: Option<String>,
    #[serde(default)]
    pub offerer_name: String,
    #[serde(default)]
    pub is_virtual: bool,
}

impl VenueSummary {
    pub fn display_name(&self) -> &str {
        match self.public_name.as_deref() {
            Some(public) if !public.trim().is_empty() => public,
            _ => &self.name,
        }
    }
}
