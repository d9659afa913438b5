//! Read-only view of the category directory the wizard selects from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cashdesk_core::{CategoryId, DomainError, DomainResult, Entity};

use crate::pricing::CategoryPriceRule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntry {
    pub id: CategoryId,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub price_rule: CategoryPriceRule,
    #[serde(default)]
    pub sort_order: i32,
}

impl Entity for CategoryEntry {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Category lookup port. Listings come back in display order.
pub trait CategoryDirectory {
    fn category(&self, id: CategoryId) -> Option<CategoryEntry>;

    fn roots(&self) -> Vec<CategoryEntry>;

    fn children(&self, parent: CategoryId) -> Vec<CategoryEntry>;

    fn has_children(&self, id: CategoryId) -> bool {
        !self.children(id).is_empty()
    }

    fn price_rule(&self, id: CategoryId) -> Option<CategoryPriceRule> {
        self.category(id).map(|entry| entry.price_rule)
    }
}

impl<D> CategoryDirectory for Arc<D>
where
    D: CategoryDirectory + ?Sized,
{
    fn category(&self, id: CategoryId) -> Option<CategoryEntry> {
        (**self).category(id)
    }

    fn roots(&self) -> Vec<CategoryEntry> {
        (**self).roots()
    }

    fn children(&self, parent: CategoryId) -> Vec<CategoryEntry> {
        (**self).children(parent)
    }
}

/// Directory held in memory, for tests and for hosts that load the whole
/// category tree up front.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCategoryDirectory {
    entries: Vec<CategoryEntry>,
}

impl InMemoryCategoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries loaded elsewhere. Every parent must be present.
    pub fn from_entries(entries: Vec<CategoryEntry>) -> DomainResult<Self> {
        for entry in &entries {
            if let Some(parent) = entry.parent_id {
                if !entries.iter().any(|candidate| candidate.id == parent) {
                    return Err(DomainError::not_found(format!(
                        "parent {parent} of category {}",
                        entry.id
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn add_root(&mut self, name: impl Into<String>, price_rule: CategoryPriceRule) -> CategoryId {
        let id = CategoryId::new();
        self.entries.push(CategoryEntry {
            id,
            parent_id: None,
            name: name.into(),
            price_rule,
            sort_order: 0,
        });
        id
    }

    pub fn add_child(
        &mut self,
        parent: CategoryId,
        name: impl Into<String>,
        price_rule: CategoryPriceRule,
    ) -> DomainResult<CategoryId> {
        if !self.entries.iter().any(|entry| entry.id == parent) {
            return Err(DomainError::not_found(format!("category {parent}")));
        }
        let id = CategoryId::new();
        self.entries.push(CategoryEntry {
            id,
            parent_id: Some(parent),
            name: name.into(),
            price_rule,
            sort_order: 0,
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn listing(&self, parent: Option<CategoryId>) -> Vec<CategoryEntry> {
        let mut listed: Vec<CategoryEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.parent_id == parent)
            .cloned()
            .collect();
        // Stable: equal sort orders keep insertion order.
        listed.sort_by_key(|entry| entry.sort_order);
        listed
    }
}

impl CategoryDirectory for InMemoryCategoryDirectory {
    fn category(&self, id: CategoryId) -> Option<CategoryEntry> {
        self.entries.iter().find(|entry| entry.id == id).cloned()
    }

    fn roots(&self) -> Vec<CategoryEntry> {
        self.listing(None)
    }

    fn children(&self, parent: CategoryId) -> Vec<CategoryEntry> {
        self.listing(Some(parent))
    }
}
