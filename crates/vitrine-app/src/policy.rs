// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::error::ListError;
use crate::filters::{FilterKey, FilterSchema, FilterSet};
use crate::ids::OffererId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Pro,
    Admin,
}

/// How the offerer filter is driven. `Unified` pins it to the offerer picked
/// in the session; `Legacy` reads it from the URL like any other filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationMode {
    Unified,
    Legacy,
}

impl NavigationMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unified => "unified",
            Self::Legacy => "legacy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unified" => Some(Self::Unified),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub role: Role,
    pub navigation: NavigationMode,
    pub selected_offerer: Option<OffererId>,
}

impl Requester {
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Offerer the request is scoped to.
    pub fn effective_offerer(&self, filters: &FilterSet) -> Option<OffererId> {
        match self.navigation {
            NavigationMode::Unified => self.selected_offerer,
            NavigationMode::Legacy => filters.offerer(),
        }
    }
}

/// Administrators may not filter by status over every venue at once: without
/// a venue or offerer the status filter is withheld from the backend.
pub fn is_restricted(filters: &FilterSet, schema: &FilterSchema, requester: &Requester) -> bool {
    requester.is_admin()
        && schema.admin_guarded
        && filters.venue().is_none()
        && requester.effective_offerer(filters).is_none()
}

/// Fails when `filters` carry a non-default status that the guard withholds.
pub fn check_status_filter(
    filters: &FilterSet,
    schema: &FilterSchema,
    requester: &Requester,
) -> Result<(), ListError> {
    if !is_restricted(filters, schema, requester) {
        return Ok(());
    }
    let status = filters.get(FilterKey::Status);
    let default = schema.field(FilterKey::Status).map(|field| &field.default);
    if status.is_some() && status != default {
        return Err(ListError::PolicyViolation {
            key: FilterKey::Status,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NavigationMode, Requester, Role, check_status_filter, is_restricted};
    use crate::{FilterKey, FilterSchema, FilterValue, ListError, OffererId};

    fn admin(navigation: NavigationMode, selected_offerer: Option<OffererId>) -> Requester {
        Requester {
            role: Role::Admin,
            navigation,
            selected_offerer,
        }
    }

    #[test]
    fn admin_without_scope_is_restricted() {
        let schema = FilterSchema::individual_offers();
        let filters = schema.defaults();
        assert!(is_restricted(&filters, &schema, &admin(NavigationMode::Legacy, None)));

        let pro = Requester {
            role: Role::Pro,
            ..admin(NavigationMode::Legacy, None)
        };
        assert!(!is_restricted(&filters, &schema, &pro));
    }

    #[test]
    fn venue_or_offerer_lifts_restriction() -> Result<(), ListError> {
        let schema = FilterSchema::individual_offers();
        let requester = admin(NavigationMode::Legacy, None);

        let mut with_venue = schema.defaults();
        schema.apply(&mut with_venue, FilterKey::Venue, FilterValue::Id(Some(5)))?;
        assert!(!is_restricted(&with_venue, &schema, &requester));

        let mut with_offerer = schema.defaults();
        schema.apply(&mut with_offerer, FilterKey::Offerer, FilterValue::Id(Some(2)))?;
        assert!(!is_restricted(&with_offerer, &schema, &requester));
        Ok(())
    }

    #[test]
    fn unified_navigation_scopes_by_selected_offerer() -> Result<(), ListError> {
        let schema = FilterSchema::collective_offers(false);
        let mut filters = schema.defaults();
        schema.apply(&mut filters, FilterKey::Offerer, FilterValue::Id(Some(2)))?;

        assert!(is_restricted(&filters, &schema, &admin(NavigationMode::Unified, None)));
        assert!(!is_restricted(
            &schema.defaults(),
            &schema,
            &admin(NavigationMode::Unified, Some(OffererId::new(9)))
        ));
        Ok(())
    }

    #[test]
    fn bookings_are_never_guarded() {
        let schema = FilterSchema::bookings(time::macros::date!(2024 - 01 - 01));
        assert!(!is_restricted(
            &schema.defaults(),
            &schema,
            &admin(NavigationMode::Legacy, None)
        ));
    }

    #[test]
    fn default_status_passes_the_guard() -> Result<(), ListError> {
        let schema = FilterSchema::individual_offers();
        let requester = admin(NavigationMode::Legacy, None);
        let mut filters = schema.defaults();
        check_status_filter(&filters, &schema, &requester)?;

        schema.apply(&mut filters, FilterKey::Status, FilterValue::choice("active"))?;
        assert_eq!(
            check_status_filter(&filters, &schema, &requester),
            Err(ListError::PolicyViolation {
                key: FilterKey::Status
            })
        );
        Ok(())
    }
}
