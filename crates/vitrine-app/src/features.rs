// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::Date;

use crate::filters::FilterSchema;
use crate::model::{CollectiveOfferType, ListKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureFlag {
    NewCollectiveStructure,
    OfferAddress,
}

impl FeatureFlag {
    pub const ALL: [Self; 2] = [Self::NewCollectiveStructure, Self::OfferAddress];

    pub const fn name(self) -> &'static str {
        match self {
            Self::NewCollectiveStructure => "WIP_ENABLE_NEW_COLLECTIVE_OFFERS_AND_BOOKINGS_STRUCTURE",
            Self::OfferAddress => "WIP_ENABLE_OFFER_ADDRESS",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.name() == value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    active: BTreeSet<FeatureFlag>,
}

impl FeatureFlags {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut active = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            match FeatureFlag::parse(name) {
                Some(flag) => {
                    active.insert(flag);
                }
                None => tracing::debug!(flag = name, "ignoring unknown feature flag"),
            }
        }
        Self { active }
    }

    pub fn with(mut self, flag: FeatureFlag) -> Self {
        self.active.insert(flag);
        self
    }

    pub fn is_active(&self, flag: FeatureFlag) -> bool {
        self.active.contains(&flag)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.active.iter().map(|flag| flag.name()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationDisplay {
    Venue,
    Address,
}

/// Per-screen behavior picked from the active flags when the screen opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListStrategy {
    pub list: ListKind,
    pub query_key: &'static str,
    pub forced_collective_type: Option<CollectiveOfferType>,
    pub bookable_only: bool,
    pub location: LocationDisplay,
}

impl ListStrategy {
    const fn plain(list: ListKind, query_key: &'static str) -> Self {
        Self {
            list,
            query_key,
            forced_collective_type: None,
            bookable_only: false,
            location: LocationDisplay::Venue,
        }
    }

    pub fn resolve(list: ListKind, flags: &FeatureFlags) -> Self {
        let strategy = STRATEGY_RULES
            .iter()
            .find(|rule| {
                rule.strategy.list == list
                    && rule.requires.iter().all(|flag| flags.is_active(*flag))
            })
            .map_or_else(
                || Self::plain(list, list.as_str()),
                |rule| rule.strategy,
            );
        tracing::debug!(
            list = list.as_str(),
            query_key = strategy.query_key,
            bookable_only = strategy.bookable_only,
            "resolved list strategy"
        );
        strategy
    }

    pub fn schema(&self, today: Date) -> FilterSchema {
        match self.list {
            ListKind::IndividualOffers => FilterSchema::individual_offers(),
            ListKind::CollectiveOffers => FilterSchema::collective_offers(self.bookable_only),
            ListKind::CollectiveTemplates => FilterSchema::collective_templates(),
            ListKind::Bookings => FilterSchema::bookings(today),
        }
    }
}

struct StrategyRule {
    requires: &'static [FeatureFlag],
    strategy: ListStrategy,
}

// First match wins, so each list lists its most specific rule first.
const STRATEGY_RULES: [StrategyRule; 7] = [
    StrategyRule {
        requires: &[FeatureFlag::NewCollectiveStructure],
        strategy: ListStrategy {
            forced_collective_type: Some(CollectiveOfferType::Offer),
            bookable_only: true,
            ..ListStrategy::plain(ListKind::CollectiveOffers, "getCollectiveOffersBookable")
        },
    },
    StrategyRule {
        requires: &[],
        strategy: ListStrategy::plain(ListKind::CollectiveOffers, "getCollectiveOffers"),
    },
    StrategyRule {
        requires: &[FeatureFlag::NewCollectiveStructure],
        strategy: ListStrategy {
            forced_collective_type: Some(CollectiveOfferType::Template),
            ..ListStrategy::plain(ListKind::CollectiveTemplates, "getCollectiveOffersTemplate")
        },
    },
    // Without the new structure, templates are the collective list narrowed
    // to showcase offers and share its query key.
    StrategyRule {
        requires: &[],
        strategy: ListStrategy {
            forced_collective_type: Some(CollectiveOfferType::Template),
            ..ListStrategy::plain(ListKind::CollectiveTemplates, "getCollectiveOffers")
        },
    },
    StrategyRule {
        requires: &[FeatureFlag::OfferAddress],
        strategy: ListStrategy {
            location: LocationDisplay::Address,
            ..ListStrategy::plain(ListKind::IndividualOffers, "listOffers")
        },
    },
    StrategyRule {
        requires: &[],
        strategy: ListStrategy::plain(ListKind::IndividualOffers, "listOffers"),
    },
    StrategyRule {
        requires: &[],
        strategy: ListStrategy::plain(ListKind::Bookings, "getBookingsPro"),
    },
];
