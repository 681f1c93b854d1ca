// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::features::{FeatureFlags, ListStrategy};
use crate::ids::{OffererId, UserId, VenueId};
use crate::model::{ListKind, VenueSummary};
use crate::policy::{NavigationMode, Requester, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub is_admin: bool,
    pub navigation: NavigationMode,
}

impl CurrentUser {
    pub const fn role(&self) -> Role {
        if self.is_admin { Role::Admin } else { Role::Pro }
    }
}

/// Per-login state handed to screens. Created at login, consumed at logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSession {
    user: CurrentUser,
    features: FeatureFlags,
    selected_offerer: Option<OffererId>,
    venues: Vec<VenueSummary>,
}

impl AppSession {
    pub fn start(user: CurrentUser, features: FeatureFlags) -> Self {
        tracing::info!(
            user = %user.id,
            admin = user.is_admin,
            navigation = user.navigation.as_str(),
            features = ?features.names(),
            "session started"
        );
        Self {
            user,
            features,
            selected_offerer: None,
            venues: Vec::new(),
        }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn features(&self) -> &FeatureFlags {
        &self.features
    }

    pub fn selected_offerer(&self) -> Option<OffererId> {
        self.selected_offerer
    }

    /// Switching offerer drops the venue directory of the previous one.
    pub fn select_offerer(&mut self, offerer: Option<OffererId>) {
        if self.selected_offerer == offerer {
            return;
        }
        tracing::info!(offerer = ?offerer.map(OffererId::get), "offerer selected");
        self.selected_offerer = offerer;
        self.venues.clear();
    }

    pub fn set_venues(&mut self, venues: Vec<VenueSummary>) {
        self.venues = venues;
    }

    pub fn venues(&self) -> &[VenueSummary] {
        &self.venues
    }

    pub fn venue(&self, id: VenueId) -> Option<&VenueSummary> {
        self.venues.iter().find(|venue| venue.id == id)
    }

    pub fn requester(&self) -> Requester {
        Requester {
            role: self.user.role(),
            navigation: self.user.navigation,
            selected_offerer: self.selected_offerer,
        }
    }

    pub fn strategy(&self, list: ListKind) -> ListStrategy {
        ListStrategy::resolve(list, &self.features)
    }

    pub fn end(self) {
        tracing::info!(user = %self.user.id, "session ended");
    }
}
