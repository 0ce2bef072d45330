//! Client-side filtering and ordering of fetched collections.

use std::cmp::Ordering;

use shared::domain::{Product, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCriteria<K> {
    pub query: String,
    pub sort_key: K,
    pub ascending: bool,
}

impl<K: Default> Default for ListCriteria<K> {
    fn default() -> Self {
        Self {
            query: String::new(),
            sort_key: K::default(),
            ascending: true,
        }
    }
}

impl<K> ListCriteria<K> {
    pub fn toggle_direction(&mut self) {
        self.ascending = !self.ascending;
    }
}

pub trait Listing {
    type SortKey: Copy;

    /// `needle` is already lowercased.
    fn matches_query(&self, needle: &str) -> bool;

    fn compare_by(&self, other: &Self, key: Self::SortKey) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSortKey {
    #[default]
    Name,
    Balance,
    Role,
    Room,
}

impl UserSortKey {
    pub const ALL: [UserSortKey; 4] = [
        UserSortKey::Name,
        UserSortKey::Balance,
        UserSortKey::Role,
        UserSortKey::Room,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UserSortKey::Name => "Name",
            UserSortKey::Balance => "Balance",
            UserSortKey::Role => "Role",
            UserSortKey::Room => "Room",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSortKey {
    #[default]
    Name,
    Quantity,
    Kind,
    Price,
}

impl ProductSortKey {
    pub const ALL: [ProductSortKey; 4] = [
        ProductSortKey::Name,
        ProductSortKey::Quantity,
        ProductSortKey::Kind,
        ProductSortKey::Price,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProductSortKey::Name => "Name",
            ProductSortKey::Quantity => "Quantity",
            ProductSortKey::Kind => "Type",
            ProductSortKey::Price => "Price",
        }
    }
}

impl Listing for User {
    type SortKey = UserSortKey;

    fn matches_query(&self, needle: &str) -> bool {
        self.full_name().to_lowercase().contains(needle)
            || self.role_label().to_lowercase().contains(needle)
    }

    fn compare_by(&self, other: &Self, key: UserSortKey) -> Ordering {
        match key {
            UserSortKey::Name => collate(&self.full_name(), &other.full_name()),
            UserSortKey::Balance => self.balance.cmp(&other.balance),
            UserSortKey::Role => collate(self.role_label(), other.role_label()),
            UserSortKey::Room => collate(&self.room, &other.room),
        }
    }
}

impl Listing for Product {
    type SortKey = ProductSortKey;

    fn matches_query(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.kind.to_lowercase().contains(needle)
    }

    fn compare_by(&self, other: &Self, key: ProductSortKey) -> Ordering {
        match key {
            ProductSortKey::Name => collate(&self.name, &other.name),
            ProductSortKey::Quantity => self.quantity.cmp(&other.quantity),
            ProductSortKey::Kind => collate(&self.kind, &other.kind),
            ProductSortKey::Price => self.price.cmp(&other.price),
        }
    }
}

/// Keeps the records whose searchable fields contain `criteria.query`
/// (case-insensitive) and orders them by the selected key. The sort is stable,
/// so ties keep their fetched order.
pub fn filter_and_sort<'a, T: Listing>(
    items: &'a [T],
    criteria: &ListCriteria<T::SortKey>,
) -> Vec<&'a T> {
    let needle = criteria.query.to_lowercase();
    let mut visible: Vec<&T> = items
        .iter()
        .filter(|item| item.matches_query(&needle))
        .collect();
    visible.sort_by(|a, b| {
        let ordering = a.compare_by(b, criteria.sort_key);
        if criteria.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    visible
}

/// Dictionary-style comparison: base letters first, then accents, then case
/// with lowercase ahead of uppercase. The raw text only breaks exact ties.
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| uppercase_marks(a).cmp(uppercase_marks(b)))
        .then_with(|| a.cmp(b))
}

fn uppercase_marks(text: &str) -> impl Iterator<Item = bool> + '_ {
    text.chars().map(char::is_uppercase)
}

fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(strip_accent)
        .collect()
}

fn strip_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
