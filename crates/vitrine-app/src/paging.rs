// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::OffsetDateTime;

use crate::model::SortDirection;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Typed value a row exposes for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Text(String),
    Number(u64),
    Date(Option<OffsetDateTime>),
}

impl SortKey {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_lowercase())
    }

    fn is_missing(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Number(_) => false,
            Self::Date(date) => date.is_none(),
        }
    }
}

pub trait Sortable<C> {
    fn sort_key(&self, column: C) -> SortKey;
}

/// Missing values sort last in both directions.
pub fn compare_keys(left: &SortKey, right: &SortKey, direction: SortDirection) -> Ordering {
    match (left.is_missing(), right.is_missing()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let ordering = match (left, right) {
        (SortKey::Text(left), SortKey::Text(right)) => left.cmp(right),
        (SortKey::Number(left), SortKey::Number(right)) => left.cmp(right),
        (SortKey::Date(left), SortKey::Date(right)) => left.cmp(right),
        _ => Ordering::Equal,
    };
    match direction {
        SortDirection::Descending => ordering.reverse(),
        SortDirection::Ascending | SortDirection::None => ordering,
    }
}

/// Single-column sort. `column` is `None` exactly when `direction` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective<C> {
    column: Option<C>,
    direction: SortDirection,
}

impl<C> Default for SortDirective<C> {
    fn default() -> Self {
        Self {
            column: None,
            direction: SortDirection::None,
        }
    }
}

impl<C: Copy + PartialEq> SortDirective<C> {
    pub fn new(column: C, direction: SortDirection) -> Self {
        match direction {
            SortDirection::None => Self::default(),
            _ => Self {
                column: Some(column),
                direction,
            },
        }
    }

    pub const fn column(&self) -> Option<C> {
        self.column
    }

    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Same column cycles ascending, descending, off; a new column starts
    /// ascending.
    pub fn toggle(&mut self, column: C) {
        *self = match (self.column, self.direction) {
            (Some(current), SortDirection::Ascending) if current == column => {
                Self::new(column, SortDirection::Descending)
            }
            (Some(current), SortDirection::Descending) if current == column => Self::default(),
            _ => Self::new(column, SortDirection::Ascending),
        };
    }
}

/// Stable in-place sort; rows keep backend order when no column is active.
pub fn sort<C, T>(items: &mut [T], directive: &SortDirective<C>)
where
    C: Copy + PartialEq,
    T: Sortable<C>,
{
    let Some(column) = directive.column() else {
        return;
    };
    let direction = directive.direction();
    items.sort_by(|left, right| {
        compare_keys(&left.sort_key(column), &right.sort_key(column), direction)
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page_count: usize,
    pub clamped_page: usize,
}

/// Slices one page out of `items`. Out-of-range pages clamp to the nearest
/// bound; an empty list still has one (empty) page.
pub fn paginate<T>(items: &[T], page_size: usize, requested: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let page_count = items.len().div_ceil(page_size).max(1);
    let clamped_page = requested.clamp(1, page_count);
    let start = ((clamped_page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Page {
        items: &items[start..end],
        page_count,
        clamped_page,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl PaginationCursor {
    pub fn new(total_items: usize, page_size: usize, requested: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(page_size).max(1);
        Self {
            current_page: requested.clamp(1, total_pages),
            page_size,
            total_pages,
        }
    }

    pub fn next(&self) -> usize {
        (self.current_page + 1).min(self.total_pages)
    }

    pub fn previous(&self) -> usize {
        self.current_page.saturating_sub(1).max(1)
    }
}
