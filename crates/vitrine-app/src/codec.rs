// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use time::macros::format_description;
use url::form_urlencoded;

use crate::error::ListError;
use crate::filters::{ALL, FilterKind, FilterSchema, FilterSet, FilterValue, is_valid_code};

const PAGE_PARAM: &str = "page";

/// Filters plus page, as carried by a console URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlState {
    pub filters: FilterSet,
    pub page: usize,
}

impl UrlState {
    pub fn from_query(query: &str, schema: &FilterSchema) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let page = form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == PAGE_PARAM)
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);
        Self {
            filters: decode(query, schema),
            page,
        }
    }

    /// Page comes first and is left out on page one.
    pub fn to_query(&self, schema: &FilterSchema) -> String {
        let filters = encode(&self.filters, schema);
        if self.page <= 1 {
            return filters;
        }
        let page = format!("{PAGE_PARAM}={}", self.page);
        if filters.is_empty() {
            page
        } else {
            format!("{page}&{filters}")
        }
    }

    pub fn to_url(&self, schema: &FilterSchema) -> String {
        let query = self.to_query(schema);
        if query.is_empty() {
            schema.list.path().to_owned()
        } else {
            format!("{}?{query}", schema.list.path())
        }
    }
}

/// Serializes filters that differ from their default, in schema order.
pub fn encode(filters: &FilterSet, schema: &FilterSchema) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for field in &schema.fields {
        let Some(value) = filters.get(field.key) else {
            continue;
        };
        if *value == field.default {
            continue;
        }
        for text in format_value(value) {
            serializer.append_pair(field.key.param(), &text);
        }
    }
    serializer.finish()
}

/// Parses a query string. Unknown parameters are ignored; invalid values fall
/// back to the field default.
pub fn decode(query: &str, schema: &FilterSchema) -> FilterSet {
    let (filters, rejected) = decode_reporting(query, schema);
    for error in rejected {
        tracing::debug!(%error, list = schema.list.as_str(), "filter reset to default");
    }
    filters
}

/// Like [`decode`], also returning the values that were rejected.
pub fn decode_reporting(query: &str, schema: &FilterSchema) -> (FilterSet, Vec<ListError>) {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    let mut filters = schema.defaults();
    let mut rejected = Vec::new();
    for field in &schema.fields {
        let raw: Vec<&str> = pairs
            .iter()
            .filter(|(key, _)| key == field.key.param())
            .map(|(_, value)| value.as_str())
            .collect();
        if raw.is_empty() {
            continue;
        }
        match parse_value(field.kind, &raw) {
            Some(value) if field.accepts(&value) => filters.insert(field.key, value),
            _ => rejected.push(ListError::Validation {
                key: field.key,
                value: raw.join(","),
            }),
        }
    }
    (filters, rejected)
}

/// Text forms of one value. Sets expand to one entry per member and an empty
/// set to a single empty entry.
pub fn format_value(value: &FilterValue) -> Vec<String> {
    match value {
        FilterValue::Text(text) | FilterValue::Choice(text) => vec![text.clone()],
        FilterValue::Id(id) => vec![id.map_or_else(|| ALL.to_owned(), |id| id.to_string())],
        FilterValue::Code(code) => vec![code.clone().unwrap_or_else(|| ALL.to_owned())],
        FilterValue::Choices(values) if values.is_empty() => vec![String::new()],
        FilterValue::Choices(values) => values.clone(),
        FilterValue::Date(date) => vec![date.map(format_date).unwrap_or_default()],
    }
}

pub fn format_date(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, &format_description!("[year]-[month]-[day]")).ok()
}

fn parse_value(kind: FilterKind, raw: &[&str]) -> Option<FilterValue> {
    let first = raw.first().copied().unwrap_or_default();
    match kind {
        FilterKind::Text => Some(FilterValue::Text(first.to_owned())),
        FilterKind::Id if first == ALL => Some(FilterValue::Id(None)),
        FilterKind::Id => first
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(|id| FilterValue::Id(Some(id))),
        FilterKind::Code if first == ALL => Some(FilterValue::Code(None)),
        FilterKind::Code => {
            is_valid_code(first).then(|| FilterValue::Code(Some(first.to_owned())))
        }
        FilterKind::Choice(_) => Some(FilterValue::choice(first)),
        FilterKind::ChoiceSet(_) => Some(FilterValue::choices(
            raw.iter().filter(|value| !value.is_empty()),
        )),
        FilterKind::Date if first.is_empty() => Some(FilterValue::Date(None)),
        FilterKind::Date => parse_date(first).map(|date| FilterValue::Date(Some(date))),
    }
}
