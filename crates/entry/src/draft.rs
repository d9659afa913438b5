//! The in-progress sale line and the finished line it turns into.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cashdesk_core::{CategoryId, LineId, PresetId};

/// Sale line under construction.
///
/// Only the wizard mutates a draft; everyone else reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineDraft {
    pub(crate) category_id: Option<CategoryId>,
    pub(crate) subcategory_id: Option<CategoryId>,
    pub(crate) weight: Option<Decimal>,
    pub(crate) quantity: Option<u32>,
    pub(crate) unit_price: Option<Decimal>,
    pub(crate) preset_id: Option<PresetId>,
    pub(crate) notes: Option<String>,
}

impl SaleLineDraft {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn subcategory_id(&self) -> Option<CategoryId> {
        self.subcategory_id
    }

    pub fn weight(&self) -> Option<Decimal> {
        self.weight
    }

    pub fn quantity(&self) -> Option<u32> {
        self.quantity
    }

    pub fn unit_price(&self) -> Option<Decimal> {
        self.unit_price
    }

    pub fn preset_id(&self) -> Option<PresetId> {
        self.preset_id
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Drop everything chosen after the category.
    pub(crate) fn clear_after_category(&mut self) {
        let category_id = self.category_id;
        *self = Self {
            category_id,
            ..Self::empty()
        };
    }

    /// Drop everything chosen after the sub-category.
    pub(crate) fn clear_after_subcategory(&mut self) {
        let category_id = self.category_id;
        let subcategory_id = self.subcategory_id;
        *self = Self {
            category_id,
            subcategory_id,
            ..Self::empty()
        };
    }
}

/// A completed sale line, handed to the line sink exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedLine {
    pub line_id: LineId,
    pub category_id: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<CategoryId>,
    pub quantity: u32,
    pub weight: Decimal,
    /// Unit price; always zero for preset lines.
    pub price: Decimal,
    /// `price × quantity`, or the preset calculator's figure for preset lines.
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<PresetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}
