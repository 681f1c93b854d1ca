// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{Date, Duration};

use crate::error::ListError;
use crate::ids::{OffererId, VenueId};
use crate::model::ListKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterKey {
    NameOrIsbn,
    Offerer,
    Venue,
    Category,
    Format,
    CollectiveOfferType,
    CreationMode,
    Audience,
    Status,
    BookingStatus,
    EventDate,
    EventPeriodStart,
    EventPeriodEnd,
    BookingPeriodStart,
    BookingPeriodEnd,
}

impl FilterKey {
    /// Name of the query-string parameter in console URLs.
    pub const fn param(self) -> &'static str {
        match self {
            Self::NameOrIsbn => "nom-ou-isbn",
            Self::Offerer => "structure",
            Self::Venue => "lieu",
            Self::Category => "categorie",
            Self::Format => "format",
            Self::CollectiveOfferType => "type",
            Self::CreationMode => "creation",
            Self::Audience => "type-offre",
            Self::Status => "statut",
            Self::BookingStatus => "statut-reservation",
            Self::EventDate => "date-evenement",
            Self::EventPeriodStart => "periode-evenement-debut",
            Self::EventPeriodEnd => "periode-evenement-fin",
            Self::BookingPeriodStart => "periode-reservation-debut",
            Self::BookingPeriodEnd => "periode-reservation-fin",
        }
    }

    /// Name of the backend request parameter.
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::NameOrIsbn => "nameOrIsbn",
            Self::Offerer => "offererId",
            Self::Venue => "venueId",
            Self::Category => "categoryId",
            Self::Format => "format",
            Self::CollectiveOfferType => "collectiveOfferType",
            Self::CreationMode => "creationMode",
            Self::Audience => "offerType",
            Self::Status => "status",
            Self::BookingStatus => "bookingStatusFilter",
            Self::EventDate => "eventDate",
            Self::EventPeriodStart => "periodBeginningDate",
            Self::EventPeriodEnd => "periodEndingDate",
            Self::BookingPeriodStart => "bookingPeriodBeginningDate",
            Self::BookingPeriodEnd => "bookingPeriodEndingDate",
        }
    }
}

pub const ALL: &str = "all";

pub const OFFER_STATUS_OPTIONS: [&str; 8] = [
    ALL,
    "active",
    "inactive",
    "epuisee",
    "expiree",
    "en-attente",
    "refusee",
    "brouillon",
];

pub const COLLECTIVE_STATUS_OPTIONS: [&str; 10] = [
    "en-attente",
    "refusee",
    "active",
    "inactive",
    "prereservee",
    "reservee",
    "expiree",
    "terminee",
    "brouillon",
    "archivee",
];

/// Templates are never booked, so their statuses stop before the booking
/// lifecycle.
pub const TEMPLATE_STATUS_OPTIONS: [&str; 6] = [
    "en-attente",
    "refusee",
    "active",
    "inactive",
    "brouillon",
    "archivee",
];

pub const CREATION_MODE_OPTIONS: [&str; 3] = [ALL, "manuel", "importe"];
pub const COLLECTIVE_TYPE_OPTIONS: [&str; 3] = [ALL, "offre", "vitrine"];
pub const AUDIENCE_OPTIONS: [&str; 3] = [ALL, "individuelle", "collective"];
pub const BOOKING_STATUS_OPTIONS: [&str; 3] = ["reservees", "validees", "remboursees"];
pub const FORMAT_OPTIONS: [&str; 9] = [
    ALL,
    "Atelier de pratique",
    "Concert",
    "Conférence, rencontre",
    "Festival, salon, congrès",
    "Projection audiovisuelle",
    "Représentation",
    "Visite guidée",
    "Visite libre",
];

/// Days covered by the default bookings period, ending today.
pub const DEFAULT_BOOKING_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Id,
    Code,
    Choice(&'static [&'static str]),
    ChoiceSet(&'static [&'static str]),
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterValue {
    Text(String),
    /// `None` means every entity.
    Id(Option<i64>),
    Code(Option<String>),
    Choice(String),
    Choices(Vec<String>),
    Date(Option<Date>),
}

impl FilterValue {
    pub fn choice(value: &str) -> Self {
        Self::Choice(value.to_owned())
    }

    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref();
            if !out.iter().any(|existing| existing == value) {
                out.push(value.to_owned());
            }
        }
        Self::Choices(out)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<i64> {
        match self {
            Self::Id(value) => *value,
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&str> {
        match self {
            Self::Code(value) => value.as_deref(),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Choice(value) if value != ALL => Some(value),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> &[String] {
        match self {
            Self::Choices(values) => values,
            _ => &[],
        }
    }

    pub fn as_date(&self) -> Option<Date> {
        match self {
            Self::Date(value) => *value,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    pub key: FilterKey,
    pub kind: FilterKind,
    pub default: FilterValue,
}

impl FilterField {
    fn new(key: FilterKey, kind: FilterKind, default: FilterValue) -> Self {
        Self { key, kind, default }
    }

    pub fn accepts(&self, value: &FilterValue) -> bool {
        match (self.kind, value) {
            (FilterKind::Text, FilterValue::Text(_)) => true,
            (FilterKind::Id, FilterValue::Id(id)) => id.is_none_or(|id| id > 0),
            (FilterKind::Code, FilterValue::Code(code)) => {
                code.as_deref().is_none_or(is_valid_code)
            }
            (FilterKind::Choice(options), FilterValue::Choice(choice)) => {
                options.contains(&choice.as_str())
            }
            (FilterKind::ChoiceSet(options), FilterValue::Choices(choices)) => {
                choices
                    .iter()
                    .enumerate()
                    .all(|(index, choice)| {
                        options.contains(&choice.as_str()) && !choices[..index].contains(choice)
                    })
            }
            (FilterKind::Date, FilterValue::Date(_)) => true,
            _ => false,
        }
    }
}

pub(crate) fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
}

/// Declared filters of one list, in URL order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSchema {
    pub list: ListKind,
    pub fields: Vec<FilterField>,
    /// Whether the status filter is subject to the administrator guard.
    pub admin_guarded: bool,
}

impl FilterSchema {
    pub fn individual_offers() -> Self {
        Self {
            list: ListKind::IndividualOffers,
            fields: vec![
                FilterField::new(
                    FilterKey::NameOrIsbn,
                    FilterKind::Text,
                    FilterValue::Text(String::new()),
                ),
                FilterField::new(FilterKey::Offerer, FilterKind::Id, FilterValue::Id(None)),
                FilterField::new(FilterKey::Venue, FilterKind::Id, FilterValue::Id(None)),
                FilterField::new(FilterKey::Category, FilterKind::Code, FilterValue::Code(None)),
                FilterField::new(
                    FilterKey::CreationMode,
                    FilterKind::Choice(&CREATION_MODE_OPTIONS),
                    FilterValue::choice(ALL),
                ),
                FilterField::new(
                    FilterKey::Status,
                    FilterKind::Choice(&OFFER_STATUS_OPTIONS),
                    FilterValue::choice(ALL),
                ),
                FilterField::new(
                    FilterKey::EventPeriodStart,
                    FilterKind::Date,
                    FilterValue::Date(None),
                ),
                FilterField::new(FilterKey::EventPeriodEnd, FilterKind::Date, FilterValue::Date(None)),
            ],
            admin_guarded: true,
        }
    }

    /// `bookable_only` drops the offer type filter: the list is then pinned to
    /// bookable offers by the screen strategy.
    pub fn collective_offers(bookable_only: bool) -> Self {
        Self::collective(
            ListKind::CollectiveOffers,
            !bookable_only,
            &COLLECTIVE_STATUS_OPTIONS,
        )
    }

    /// Template (showcase) offers. The offer type is implied by the list.
    pub fn collective_templates() -> Self {
        Self::collective(ListKind::CollectiveTemplates, false, &TEMPLATE_STATUS_OPTIONS)
    }

    fn collective(list: ListKind, offer_type: bool, statuses: &'static [&'static str]) -> Self {
        let mut fields = vec![
            FilterField::new(
                FilterKey::NameOrIsbn,
                FilterKind::Text,
                FilterValue::Text(String::new()),
            ),
            FilterField::new(FilterKey::Offerer, FilterKind::Id, FilterValue::Id(None)),
            FilterField::new(FilterKey::Venue, FilterKind::Id, FilterValue::Id(None)),
            FilterField::new(
                FilterKey::Format,
                FilterKind::Choice(&FORMAT_OPTIONS),
                FilterValue::choice(ALL),
            ),
        ];
        if offer_type {
            fields.push(FilterField::new(
                FilterKey::CollectiveOfferType,
                FilterKind::Choice(&COLLECTIVE_TYPE_OPTIONS),
                FilterValue::choice(ALL),
            ));
        }
        fields.extend([
            FilterField::new(
                FilterKey::Status,
                FilterKind::ChoiceSet(statuses),
                FilterValue::choices(statuses.iter().filter(|status| **status != "archivee")),
            ),
            FilterField::new(
                FilterKey::EventPeriodStart,
                FilterKind::Date,
                FilterValue::Date(None),
            ),
            FilterField::new(FilterKey::EventPeriodEnd, FilterKind::Date, FilterValue::Date(None)),
        ]);
        Self {
            list,
            fields,
            admin_guarded: true,
        }
    }

    pub fn bookings(today: Date) -> Self {
        let period_start = today
            .checked_sub(Duration::days(DEFAULT_BOOKING_PERIOD_DAYS))
            .unwrap_or(today);
        Self {
            list: ListKind::Bookings,
            fields: vec![
                FilterField::new(FilterKey::Offerer, FilterKind::Id, FilterValue::Id(None)),
                FilterField::new(FilterKey::Venue, FilterKind::Id, FilterValue::Id(None)),
                FilterField::new(
                    FilterKey::Audience,
                    FilterKind::Choice(&AUDIENCE_OPTIONS),
                    FilterValue::choice(ALL),
                ),
                FilterField::new(
                    FilterKey::BookingStatus,
                    FilterKind::Choice(&BOOKING_STATUS_OPTIONS),
                    FilterValue::choice("reservees"),
                ),
                FilterField::new(FilterKey::EventDate, FilterKind::Date, FilterValue::Date(None)),
                FilterField::new(
                    FilterKey::BookingPeriodStart,
                    FilterKind::Date,
                    FilterValue::Date(Some(period_start)),
                ),
                FilterField::new(
                    FilterKey::BookingPeriodEnd,
                    FilterKind::Date,
                    FilterValue::Date(Some(today)),
                ),
            ],
            admin_guarded: false,
        }
    }

    pub fn field(&self, key: FilterKey) -> Option<&FilterField> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn contains(&self, key: FilterKey) -> bool {
        self.field(key).is_some()
    }

    pub fn defaults(&self) -> FilterSet {
        let mut set = FilterSet::default();
        for field in &self.fields {
            set.values.insert(field.key, field.default.clone());
        }
        set
    }

    /// Checks `value` against the declared domain of `key` and stores it.
    /// Rejected values leave `filters` untouched.
    pub fn apply(
        &self,
        filters: &mut FilterSet,
        key: FilterKey,
        value: FilterValue,
    ) -> Result<(), ListError> {
        let value = match value {
            FilterValue::Choices(values) => FilterValue::choices(values),
            other => other,
        };
        match self.field(key) {
            Some(field) if field.accepts(&value) => {
                filters.values.insert(key, value);
                Ok(())
            }
            _ => Err(ListError::Validation {
                key,
                value: format!("{value:?}"),
            }),
        }
    }

    /// Restores one filter to its default.
    pub fn reset(&self, filters: &mut FilterSet, key: FilterKey) {
        if let Some(field) = self.field(key) {
            filters.values.insert(key, field.default.clone());
        }
    }
}

/// Typed filter values keyed by filter; iteration order is the key order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSet {
    values: BTreeMap<FilterKey, FilterValue>,
}

impl FilterSet {
    pub fn get(&self, key: FilterKey) -> Option<&FilterValue> {
        self.values.get(&key)
    }

    pub(crate) fn insert(&mut self, key: FilterKey, value: FilterValue) {
        self.values.insert(key, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &FilterValue)> {
        self.values.iter().map(|(key, value)| (*key, value))
    }

    pub fn venue(&self) -> Option<VenueId> {
        self.get(FilterKey::Venue)
            .and_then(FilterValue::as_id)
            .map(VenueId::new)
    }

    pub fn offerer(&self) -> Option<OffererId> {
        self.get(FilterKey::Offerer)
            .and_then(FilterValue::as_id)
            .map(OffererId::new)
    }

    pub fn text(&self, key: FilterKey) -> &str {
        self.get(key).and_then(FilterValue::as_text).unwrap_or("")
    }

    /// Keys whose value differs from `defaults`, in key order.
    pub fn changed_keys(&self, defaults: &FilterSet) -> Vec<FilterKey> {
        self.values
            .iter()
            .filter(|(key, value)| defaults.get(**key) != Some(*value))
            .map(|(key, _)| *key)
            .collect()
    }

    /// True when any filter outside `ignored` differs from its default; drives
    /// whether reset controls are enabled.
    pub fn has_search_filters(&self, defaults: &FilterSet, ignored: &[FilterKey]) -> bool {
        self.changed_keys(defaults)
            .into_iter()
            .any(|key| !ignored.contains(&key))
    }
}
