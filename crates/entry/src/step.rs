use serde::{Deserialize, Serialize};

/// One screen of the entry wizard, in path order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Category,
    Subcategory,
    Weight,
    Quantity,
    Price,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Category,
        WizardStep::Subcategory,
        WizardStep::Weight,
        WizardStep::Quantity,
        WizardStep::Price,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Category => "category",
            WizardStep::Subcategory => "subcategory",
            WizardStep::Weight => "weight",
            WizardStep::Quantity => "quantity",
            WizardStep::Price => "price",
        }
    }

    /// Steps that show a tile grid driven by positional shortcuts.
    pub fn is_selection(self) -> bool {
        matches!(self, WizardStep::Category | WizardStep::Subcategory)
    }

    /// Steps that read a number from the keypad.
    pub fn is_numeric(self) -> bool {
        !self.is_selection()
    }
}

impl core::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
