// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;
use vitrine_app::{
    ListError, ListKind, ListRequest, ListingBackend, ListingPage, OffererId, VenueSummary,
    decode_listing,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }
}

/// Download link for a list export. `query` is the console query string of the
/// applied filters, passed through untouched.
pub fn export_url(base_url: &str, list: ListKind, format: ExportFormat, query: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let query = query.trim_start_matches('?');
    let mut url = format!("{base}/{}/{}", list.endpoint(), format.as_str());
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Blocking client for the pro backend listing endpoints.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    token: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, token: Option<&str>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        Url::parse(&base_url).with_context(|| format!("api.base_url {base_url:?} is not a URL"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            token: token
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_owned),
            http,
        })
    }

    /// Venues the user can see, optionally narrowed to one offerer.
    pub fn list_venues(&self, offerer: Option<OffererId>) -> Result<Vec<VenueSummary>> {
        let mut url = self.endpoint_url("venues").map_err(|error| anyhow!(error))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("activeOfferersOnly", "true");
            if let Some(offerer) = offerer {
                pairs.append_pair("offererId", &offerer.to_string());
            }
        }

        let response = self
            .get(url)
            .send()
            .map_err(|error| anyhow!(connection_error(&self.base_url, &error)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!(clean_error_response(status, &body));
        }

        let parsed: VenuesResponse = response.json().context("decode venue list")?;
        Ok(parsed.venues)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self.http.get(url).header("Accept", "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, String> {
        let raw = format!("{}/{path}", self.base_url);
        Url::parse(&raw).map_err(|error| format!("invalid endpoint URL {raw:?}: {error}"))
    }

    fn listing_url(&self, request: &ListRequest, page: u32) -> Result<Url, ListError> {
        let mut url = self
            .endpoint_url(request.list.endpoint())
            .map_err(ListError::transport)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.params {
                pairs.append_pair(name, value);
            }
            // Offer lists come back whole; only bookings are paginated server side.
            if request.list == ListKind::Bookings {
                pairs.append_pair("page", &page.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

impl ListingBackend for Client {
    fn fetch_page(&self, request: &ListRequest, page: u32) -> Result<ListingPage, ListError> {
        let url = self.listing_url(request, page)?;
        tracing::debug!(%url, "GET listing");

        let response = self.get(url.clone()).send().map_err(|error| {
            if error.is_timeout() {
                ListError::transport(format!(
                    "{} timed out after {}ms",
                    url.path(),
                    self.timeout.as_millis()
                ))
            } else {
                ListError::transport(connection_error(&self.base_url, &error))
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().unwrap_or_default();
            let resource = error_message(&body).unwrap_or_else(|| url.path().to_owned());
            return Err(ListError::http(status.as_u16(), resource));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ListError::http(
                status.as_u16(),
                clean_error_response(status, &body),
            ));
        }

        let body = response.text().map_err(|error| {
            ListError::transport(format!("read {} response: {error}", url.path()))
        })?;
        decode_listing(request.list, &body)
    }
}

#[derive(Debug, Deserialize)]
struct VenuesResponse {
    #[serde(default)]
    venues: Vec<VenueSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Message { message: String },
    Fields(BTreeMap<String, Vec<String>>),
}

/// First human-readable message of a backend error body.
fn error_message(body: &str) -> Option<String> {
    let message = match serde_json::from_str::<ErrorEnvelope>(body).ok()? {
        ErrorEnvelope::Message { message } => message,
        ErrorEnvelope::Fields(fields) => fields
            .get("global")
            .or_else(|| fields.values().next())
            .and_then(|messages| messages.first())?
            .clone(),
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_owned())
}

fn connection_error(base_url: &str, error: &reqwest::Error) -> String {
    format!("cannot reach {base_url} -- check api.base_url and your network ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> String {
    if let Some(message) = error_message(body) {
        return format!("server error ({}): {message}", status.as_u16());
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') && !body.contains('<') {
        return format!("server error ({}): {body}", status.as_u16());
    }

    format!("server returned {}", status.as_u16())
}
