// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use url::form_urlencoded;

use crate::codec::format_date;
use crate::error::ListError;
use crate::features::ListStrategy;
use crate::filters::{ALL, FilterKey, FilterSchema, FilterSet, FilterValue};
use crate::listing::{ListItem, ListingPage};
use crate::model::{
    Audience, BookingStatusFilter, CollectiveOfferStatus, CollectiveOfferType, CreationMode,
    ListKind, OfferStatus,
};
use crate::policy::{Requester, check_status_filter, is_restricted};

/// Most pages walked on paginated endpoints.
pub const MAX_PAGES: u32 = 5;
/// Most rows kept from a flat offer list.
pub const MAX_OFFERS: usize = 500;

/// Backend seam: fetch one page of a listing.
pub trait ListingBackend {
    fn fetch_page(&self, request: &ListRequest, page: u32) -> Result<ListingPage, ListError>;
}

/// Backend request parameters, in schema order, without the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListRequest {
    pub list: ListKind,
    pub params: Vec<(&'static str, String)>,
}

impl ListRequest {
    pub fn query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.params {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn values(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(param, _)| *param == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

/// Identity of a fetch: same key, same rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub query_key: &'static str,
    pub canonical: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub request: ListRequest,
    pub key: RequestKey,
    pub status_withheld: bool,
}

/// Builds the backend request for confirmed filters.
pub fn prepare_request(
    filters: &FilterSet,
    schema: &FilterSchema,
    requester: &Requester,
    strategy: &ListStrategy,
) -> PreparedRequest {
    let status_withheld = is_restricted(filters, schema, requester);
    if let Err(error) = check_status_filter(filters, schema, requester) {
        tracing::info!(%error, list = schema.list.as_str(), "status filter withheld");
    }

    let mut params = Vec::new();
    for field in &schema.fields {
        let key = field.key;
        if key == FilterKey::Status && status_withheld {
            continue;
        }
        if key == FilterKey::Offerer {
            if let Some(offerer) = requester.effective_offerer(filters) {
                params.push((key.api_name(), offerer.to_string()));
            }
            continue;
        }
        let value = filters.get(key).unwrap_or(&field.default);
        for text in api_values(schema.list, key, value) {
            params.push((key.api_name(), text));
        }
    }
    if let Some(kind) = strategy.forced_collective_type {
        params.push((FilterKey::CollectiveOfferType.api_name(), kind.api_value().to_owned()));
    }

    let request = ListRequest {
        list: schema.list,
        params,
    };
    let key = RequestKey {
        query_key: strategy.query_key,
        canonical: request.query(),
    };
    PreparedRequest {
        request,
        key,
        status_withheld,
    }
}

/// Backend forms of one filter value; unrestricted values produce nothing.
fn api_values(list: ListKind, key: FilterKey, value: &FilterValue) -> Vec<String> {
    match value {
        FilterValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_owned()]
            }
        }
        FilterValue::Id(id) => id.map(|id| id.to_string()).into_iter().collect(),
        FilterValue::Code(code) => code.clone().into_iter().collect(),
        FilterValue::Choice(choice) if choice == ALL => Vec::new(),
        FilterValue::Choice(choice) => vec![api_choice(list, key, choice)],
        FilterValue::Choices(choices) => choices
            .iter()
            .map(|choice| api_choice(list, key, choice))
            .collect(),
        FilterValue::Date(date) => date.map(format_date).into_iter().collect(),
    }
}

fn api_choice(list: ListKind, key: FilterKey, slug: &str) -> String {
    let api = match (key, list) {
        (FilterKey::Status, ListKind::CollectiveOffers | ListKind::CollectiveTemplates) => {
            CollectiveOfferStatus::from_slug(slug).map(CollectiveOfferStatus::api_value)
        }
        (FilterKey::Status, _) => OfferStatus::from_slug(slug).map(OfferStatus::api_value),
        (FilterKey::CreationMode, _) => CreationMode::from_slug(slug).map(CreationMode::api_value),
        (FilterKey::CollectiveOfferType, _) => {
            CollectiveOfferType::from_slug(slug).map(CollectiveOfferType::api_value)
        }
        (FilterKey::Audience, _) => Audience::from_slug(slug).map(Audience::api_value),
        (FilterKey::BookingStatus, _) => {
            BookingStatusFilter::from_slug(slug).map(BookingStatusFilter::api_value)
        }
        _ => None,
    };
    api.map_or_else(|| slug.to_owned(), str::to_owned)
}

/// Normalized rows of one fetch. Failures come back as an empty list with the
/// error attached.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListOutcome {
    pub items: Vec<ListItem>,
    pub error: Option<ListError>,
    pub truncated: bool,
    pub total: u64,
}

impl ListOutcome {
    pub fn failed(error: ListError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct ListAdapter<'a, B: ?Sized> {
    backend: &'a B,
    strategy: ListStrategy,
}

impl<'a, B: ListingBackend + ?Sized> ListAdapter<'a, B> {
    pub fn new(backend: &'a B, strategy: ListStrategy) -> Self {
        Self { backend, strategy }
    }

    pub fn fetch(&self, request: &ListRequest) -> ListOutcome {
        tracing::debug!(
            list = request.list.as_str(),
            query = %request.query(),
            "fetching listing"
        );
        let mut rows = Vec::new();
        let mut total = 0;
        let mut truncated = false;
        let mut page = 1;
        loop {
            let listing = match self.backend.fetch_page(request, page) {
                Ok(listing) => listing,
                Err(error) => {
                    match &error {
                        ListError::NotFound { .. } => {
                            tracing::info!(%error, list = request.list.as_str(), "listing not found");
                        }
                        _ => tracing::warn!(%error, list = request.list.as_str(), "listing failed"),
                    }
                    return ListOutcome::failed(error);
                }
            };
            total = listing.total;
            let has_more = listing.has_more();
            rows.extend(listing.rows);
            if !has_more {
                break;
            }
            if page >= MAX_PAGES {
                truncated = true;
                break;
            }
            page += 1;
        }

        if request.list != ListKind::Bookings && rows.len() > MAX_OFFERS {
            rows.truncate(MAX_OFFERS);
            truncated = true;
        }
        if truncated {
            tracing::info!(
                list = request.list.as_str(),
                kept = rows.len(),
                total,
                "listing truncated"
            );
        }

        let location = self.strategy.location;
        ListOutcome {
            items: rows
                .iter()
                .map(|row| ListItem::from_row(row, location))
                .collect(),
            error: None,
            truncated,
            total,
        }
    }
}
