//! Spending categories and the discretionary budget set.

use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::EngineError;

/// Spending category of a ledger entry.
///
/// The set is closed: new entries can only be logged with one of the named
/// variants. [`Category::Unrecognized`] exists only so that a hand-edited
/// ledger row with an unknown tag still decodes; such entries are never
/// discretionary.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Groceries,
    Restaurants,
    Shopping,
    BooksRecords,
    Travel,
    Stipend,
    Rent,
    Bills,
    Health,
    Transport,
    Gifts,
    Other,
    Unrecognized(String),
}

impl Category {
    /// Every category that can be selected for a new entry.
    pub const SELECTABLE: [Category; 12] = [
        Category::Groceries,
        Category::Restaurants,
        Category::Shopping,
        Category::BooksRecords,
        Category::Travel,
        Category::Stipend,
        Category::Rent,
        Category::Bills,
        Category::Health,
        Category::Transport,
        Category::Gifts,
        Category::Other,
    ];

    /// Tag written in the ledger file.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Groceries => "GROCERIES",
            Self::Restaurants => "RESTAURANTS",
            Self::Shopping => "SHOPPING",
            Self::BooksRecords => "BOOKS_RECORDS",
            Self::Travel => "TRAVEL",
            Self::Stipend => "STIPEND",
            Self::Rent => "RENT",
            Self::Bills => "BILLS",
            Self::Health => "HEALTH",
            Self::Transport => "TRANSPORT",
            Self::Gifts => "GIFTS",
            Self::Other => "OTHER",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Whether the category counts against the budget when no explicit
    /// discretionary set is configured.
    #[must_use]
    pub fn is_discretionary_by_default(&self) -> bool {
        matches!(
            self,
            Self::Groceries
                | Self::Restaurants
                | Self::Shopping
                | Self::BooksRecords
                | Self::Travel
                | Self::Stipend
        )
    }

    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Decodes a tag read from the ledger. Never fails.
    ///
    /// Tags match exactly; anything else is kept as
    /// [`Category::Unrecognized`].
    #[must_use]
    pub fn from_tag_lenient(tag: &str) -> Self {
        Self::SELECTABLE
            .iter()
            .find(|category| category.tag() == tag)
            .cloned()
            .unwrap_or_else(|| Self::Unrecognized(tag.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    /// Parses a known tag. Case-insensitive; `-` and spaces read as `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::SELECTABLE
            .iter()
            .find(|category| category.tag() == normalized)
            .cloned()
            .ok_or_else(|| EngineError::UnknownCategory(s.trim().to_string()))
    }
}

/// Categories subject to the daily target and the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscretionarySet(BTreeSet<Category>);

impl DiscretionarySet {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self(
            categories
                .into_iter()
                .filter(Category::is_selectable)
                .collect(),
        )
    }

    /// Builds the set from configured tags, rejecting unknown ones.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Result<Self, EngineError> {
        let categories = tags
            .iter()
            .map(|tag| tag.as_ref().parse::<Category>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(categories))
    }

    #[must_use]
    pub fn contains(&self, category: &Category) -> bool {
        self.0.contains(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }
}

impl Default for DiscretionarySet {
    fn default() -> Self {
        Self::new(
            Category::SELECTABLE
                .into_iter()
                .filter(Category::is_discretionary_by_default),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_str() {
        for category in Category::SELECTABLE {
            assert_eq!(category.tag().parse::<Category>().unwrap(), category);
        }
        assert_eq!("books records".parse::<Category>().unwrap(), Category::BooksRecords);
        assert_eq!("groceries".parse::<Category>().unwrap(), Category::Groceries);
    }

    #[test]
    fn unknown_tags_are_preserved_leniently() {
        let category = Category::from_tag_lenient("PETS");
        assert_eq!(category, Category::Unrecognized("PETS".to_string()));
        assert_eq!(category.tag(), "PETS");
        assert!(!category.is_selectable());
        assert!("PETS".parse::<Category>().is_err());
    }

    #[test]
    fn ledger_tags_match_exactly() {
        assert_eq!(Category::from_tag_lenient("GROCERIES"), Category::Groceries);
        assert_eq!(
            Category::from_tag_lenient("groceries"),
            Category::Unrecognized("groceries".to_string())
        );
        assert_eq!(
            Category::from_tag_lenient("BOOKS RECORDS"),
            Category::Unrecognized("BOOKS RECORDS".to_string())
        );
        assert!(!DiscretionarySet::default().contains(&Category::from_tag_lenient("groceries")));
    }

    #[test]
    fn default_discretionary_set() {
        let set = DiscretionarySet::default();
        assert!(set.contains(&Category::Groceries));
        assert!(set.contains(&Category::Stipend));
        assert!(!set.contains(&Category::Rent));
        assert!(!set.contains(&Category::Unrecognized("GROCERIES ".to_string())));
    }

    #[test]
    fn from_tags_rejects_unknown() {
        let set = DiscretionarySet::from_tags(&["TRAVEL", "health"]).unwrap();
        assert!(set.contains(&Category::Health));
        assert!(!set.contains(&Category::Groceries));
        assert_eq!(
            DiscretionarySet::from_tags(&["NOPE"]),
            Err(EngineError::UnknownCategory("NOPE".to_string()))
        );
    }
}
