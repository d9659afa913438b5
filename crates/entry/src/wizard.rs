//! Entry wizard aggregate: the step state machine of one terminal.
//!
//! A rejected command comes back as a [`DomainError`] and leaves the wizard
//! untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cashdesk_core::{Aggregate, AggregateRoot, CategoryId, DomainError, LineId, PresetId, TerminalId};
use cashdesk_events::Event;

use crate::draft::{FinishedLine, SaleLineDraft};
use crate::pricing::{CategoryPriceRule, PriceVerdict, PricingMode, PricingPolicy};
use crate::quantity::validate_quantity;
use crate::step::WizardStep;

/// Why an in-progress draft was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    Inactivity,
    Cancelled,
}

/// Aggregate root: EntryWizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryWizard {
    id: TerminalId,
    step: WizardStep,
    draft: SaleLineDraft,
    category_has_children: bool,
    price_rule: CategoryPriceRule,
    version: u64,
}

impl EntryWizard {
    pub fn new(id: TerminalId) -> Self {
        Self {
            id,
            step: WizardStep::Category,
            draft: SaleLineDraft::empty(),
            category_has_children: false,
            price_rule: CategoryPriceRule::free(),
            version: 0,
        }
    }

    pub fn terminal_id(&self) -> TerminalId {
        self.id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &SaleLineDraft {
        &self.draft
    }

    pub fn category_has_children(&self) -> bool {
        self.category_has_children
    }

    /// Effective price rule of the chosen (sub-)category.
    pub fn price_rule(&self) -> CategoryPriceRule {
        self.price_rule
    }

    pub fn pricing_mode(&self) -> PricingMode {
        PricingPolicy::resolve(&self.price_rule, self.draft.preset_id.is_some())
    }

    /// True when every field of `step` is filled in.
    pub fn is_complete(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Category => self.draft.category_id.is_some(),
            WizardStep::Subcategory => {
                self.draft.category_id.is_some()
                    && (!self.category_has_children || self.draft.subcategory_id.is_some())
            }
            WizardStep::Weight => self.draft.weight.is_some(),
            WizardStep::Quantity => self.draft.quantity.is_some(),
            WizardStep::Price => self.draft.unit_price.is_some(),
        }
    }

    /// Steps whose fields are filled in, in path order.
    pub fn completed_steps(&self) -> Vec<WizardStep> {
        WizardStep::ALL
            .into_iter()
            .filter(|step| self.is_complete(*step))
            .collect()
    }

    /// Whether a jump to `step` would be accepted right now.
    pub fn can_go_to(&self, step: WizardStep) -> bool {
        self.check_jump(step).is_ok()
    }

    fn check_jump(&self, target: WizardStep) -> Result<(), DomainError> {
        match target {
            WizardStep::Category => Ok(()),
            WizardStep::Subcategory => {
                if self.draft.category_id.is_some() && self.category_has_children {
                    Ok(())
                } else {
                    Err(DomainError::invariant("sub-category step needs a category with children"))
                }
            }
            WizardStep::Weight => {
                if self.is_complete(WizardStep::Subcategory) {
                    Ok(())
                } else {
                    Err(DomainError::invariant("weight step needs a chosen category path"))
                }
            }
            WizardStep::Quantity => {
                if self.draft.weight.is_some() {
                    Ok(())
                } else {
                    Err(DomainError::invariant("quantity step needs a weight"))
                }
            }
            WizardStep::Price => {
                if self.draft.quantity.is_some() {
                    Ok(())
                } else {
                    Err(DomainError::invariant("price step needs a quantity"))
                }
            }
        }
    }

    fn ensure_step(&self, expected: WizardStep) -> Result<(), DomainError> {
        if self.step != expected {
            return Err(DomainError::conflict(format!(
                "expected {expected} step, wizard is on {} step",
                self.step
            )));
        }
        Ok(())
    }
}

impl AggregateRoot for EntryWizard {
    type Id = TerminalId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ChooseCategory.
///
/// `has_children` and `price_rule` come from the category directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooseCategory {
    pub category_id: CategoryId,
    pub has_children: bool,
    pub price_rule: CategoryPriceRule,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChooseSubcategory.
///
/// `price_rule` is the effective rule (the sub-category's own, or the
/// parent's when it has none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooseSubcategory {
    pub subcategory_id: CategoryId,
    pub price_rule: CategoryPriceRule,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CommitWeight (the aggregated total of the readings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitWeight {
    pub weight: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitQuantity {
    pub quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmPrice.
///
/// `price` is the typed price for editable modes; fixed and preset modes
/// ignore it and use the pre-filled value. `preset_total` is the line amount
/// worked out for the selected preset, if anything could work it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPrice {
    pub line_id: LineId,
    pub price: Option<Decimal>,
    pub preset_total: Option<Decimal>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: GoToStep (non-linear navigation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoToStep {
    pub step: WizardStep,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SelectPreset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectPreset {
    pub preset_id: PresetId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearPreset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearPreset {
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetNotes (blank text clears the notes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetNotes {
    pub notes: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DiscardDraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardDraft {
    pub reason: DiscardReason,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryCommand {
    ChooseCategory(ChooseCategory),
    ChooseSubcategory(ChooseSubcategory),
    CommitWeight(CommitWeight),
    SubmitQuantity(SubmitQuantity),
    ConfirmPrice(ConfirmPrice),
    GoToStep(GoToStep),
    SelectPreset(SelectPreset),
    ClearPreset(ClearPreset),
    SetNotes(SetNotes),
    DiscardDraft(DiscardDraft),
}

/// Event: CategoryChosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryChosen {
    pub category_id: CategoryId,
    pub has_children: bool,
    pub price_rule: CategoryPriceRule,
    /// A different category than before: later fields were dropped.
    pub replaced: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SubcategoryChosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryChosen {
    pub subcategory_id: CategoryId,
    pub price_rule: CategoryPriceRule,
    pub replaced: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WeightCommitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightCommitted {
    pub weight: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityAccepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityAccepted {
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StepEntered (navigation jump).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEntered {
    pub from: WizardStep,
    pub to: WizardStep,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PricePrefilled (fixed or preset price placed on the draft).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePrefilled {
    pub price: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PresetSelected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSelected {
    pub preset_id: PresetId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PresetCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetCleared {
    /// Price the category rule puts back, if any.
    pub restored_price: Option<Decimal>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: NotesUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesUpdated {
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCompleted {
    pub line: FinishedLine,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DraftDiscarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftDiscarded {
    pub reason: DiscardReason,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryEvent {
    CategoryChosen(CategoryChosen),
    SubcategoryChosen(SubcategoryChosen),
    WeightCommitted(WeightCommitted),
    QuantityAccepted(QuantityAccepted),
    StepEntered(StepEntered),
    PricePrefilled(PricePrefilled),
    PresetSelected(PresetSelected),
    PresetCleared(PresetCleared),
    NotesUpdated(NotesUpdated),
    LineCompleted(LineCompleted),
    DraftDiscarded(DraftDiscarded),
}

impl Event for EntryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EntryEvent::CategoryChosen(_) => "entry.category.chosen",
            EntryEvent::SubcategoryChosen(_) => "entry.subcategory.chosen",
            EntryEvent::WeightCommitted(_) => "entry.weight.committed",
            EntryEvent::QuantityAccepted(_) => "entry.quantity.accepted",
            EntryEvent::StepEntered(_) => "entry.step.entered",
            EntryEvent::PricePrefilled(_) => "entry.price.prefilled",
            EntryEvent::PresetSelected(_) => "entry.preset.selected",
            EntryEvent::PresetCleared(_) => "entry.preset.cleared",
            EntryEvent::NotesUpdated(_) => "entry.notes.updated",
            EntryEvent::LineCompleted(_) => "entry.line.completed",
            EntryEvent::DraftDiscarded(_) => "entry.draft.discarded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EntryEvent::CategoryChosen(e) => e.occurred_at,
            EntryEvent::SubcategoryChosen(e) => e.occurred_at,
            EntryEvent::WeightCommitted(e) => e.occurred_at,
            EntryEvent::QuantityAccepted(e) => e.occurred_at,
            EntryEvent::StepEntered(e) => e.occurred_at,
            EntryEvent::PricePrefilled(e) => e.occurred_at,
            EntryEvent::PresetSelected(e) => e.occurred_at,
            EntryEvent::PresetCleared(e) => e.occurred_at,
            EntryEvent::NotesUpdated(e) => e.occurred_at,
            EntryEvent::LineCompleted(e) => e.occurred_at,
            EntryEvent::DraftDiscarded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for EntryWizard {
    type Command = EntryCommand;
    type Event = EntryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            EntryEvent::CategoryChosen(e) => {
                self.draft.category_id = Some(e.category_id);
                if e.replaced {
                    self.draft.clear_after_category();
                }
                self.category_has_children = e.has_children;
                // A kept sub-category keeps its own effective rule.
                if e.replaced || self.draft.subcategory_id.is_none() {
                    self.price_rule = e.price_rule;
                }
                self.step = if e.has_children {
                    WizardStep::Subcategory
                } else {
                    WizardStep::Weight
                };
            }
            EntryEvent::SubcategoryChosen(e) => {
                self.draft.subcategory_id = Some(e.subcategory_id);
                if e.replaced {
                    self.draft.clear_after_subcategory();
                }
                self.price_rule = e.price_rule;
                self.step = WizardStep::Weight;
            }
            EntryEvent::WeightCommitted(e) => {
                self.draft.weight = Some(e.weight);
                self.step = WizardStep::Quantity;
            }
            EntryEvent::QuantityAccepted(e) => {
                self.draft.quantity = Some(e.quantity);
                self.step = WizardStep::Price;
            }
            EntryEvent::StepEntered(e) => {
                self.step = e.to;
            }
            EntryEvent::PricePrefilled(e) => {
                self.draft.unit_price = Some(e.price);
            }
            EntryEvent::PresetSelected(e) => {
                self.draft.preset_id = Some(e.preset_id);
                self.draft.unit_price = Some(Decimal::ZERO);
            }
            EntryEvent::PresetCleared(e) => {
                self.draft.preset_id = None;
                self.draft.unit_price = e.restored_price;
            }
            EntryEvent::NotesUpdated(e) => {
                self.draft.notes = e.notes.clone();
            }
            EntryEvent::LineCompleted(_) | EntryEvent::DraftDiscarded(_) => {
                self.draft = SaleLineDraft::empty();
                self.category_has_children = false;
                self.price_rule = CategoryPriceRule::free();
                self.step = WizardStep::Category;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            EntryCommand::ChooseCategory(cmd) => self.handle_choose_category(cmd),
            EntryCommand::ChooseSubcategory(cmd) => self.handle_choose_subcategory(cmd),
            EntryCommand::CommitWeight(cmd) => self.handle_commit_weight(cmd),
            EntryCommand::SubmitQuantity(cmd) => self.handle_submit_quantity(cmd),
            EntryCommand::ConfirmPrice(cmd) => self.handle_confirm_price(cmd),
            EntryCommand::GoToStep(cmd) => self.handle_go_to_step(cmd),
            EntryCommand::SelectPreset(cmd) => self.handle_select_preset(cmd),
            EntryCommand::ClearPreset(cmd) => self.handle_clear_preset(cmd),
            EntryCommand::SetNotes(cmd) => self.handle_set_notes(cmd),
            EntryCommand::DiscardDraft(cmd) => self.handle_discard(cmd),
        }
    }
}

impl EntryWizard {
    fn handle_choose_category(&self, cmd: &ChooseCategory) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_step(WizardStep::Category)?;

        Ok(vec![EntryEvent::CategoryChosen(CategoryChosen {
            category_id: cmd.category_id,
            has_children: cmd.has_children,
            price_rule: cmd.price_rule,
            replaced: self.draft.category_id != Some(cmd.category_id),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_choose_subcategory(
        &self,
        cmd: &ChooseSubcategory,
    ) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_step(WizardStep::Subcategory)?;
        if !self.category_has_children {
            return Err(DomainError::invariant("category has no sub-categories"));
        }

        Ok(vec![EntryEvent::SubcategoryChosen(SubcategoryChosen {
            subcategory_id: cmd.subcategory_id,
            price_rule: cmd.price_rule,
            replaced: self.draft.subcategory_id != Some(cmd.subcategory_id),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_commit_weight(&self, cmd: &CommitWeight) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_step(WizardStep::Weight)?;
        if cmd.weight <= Decimal::ZERO {
            return Err(DomainError::validation("weight must be positive"));
        }

        Ok(vec![EntryEvent::WeightCommitted(WeightCommitted {
            weight: cmd.weight,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submit_quantity(&self, cmd: &SubmitQuantity) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_step(WizardStep::Quantity)?;
        let quantity =
            validate_quantity(cmd.quantity).map_err(|e| DomainError::validation(e.to_string()))?;

        let mut events = vec![EntryEvent::QuantityAccepted(QuantityAccepted {
            quantity,
            occurred_at: cmd.occurred_at,
        })];
        events.extend(self.prefill_event(cmd.occurred_at));
        Ok(events)
    }

    fn handle_confirm_price(&self, cmd: &ConfirmPrice) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_step(WizardStep::Price)?;
        let (Some(category_id), Some(weight), Some(quantity)) =
            (self.draft.category_id, self.draft.weight, self.draft.quantity)
        else {
            return Err(DomainError::invariant("price step reached with an incomplete draft"));
        };

        let mode = self.pricing_mode();
        let price = match mode {
            PricingMode::Fixed { price } => price,
            PricingMode::PresetOverride => Decimal::ZERO,
            PricingMode::Ranged { .. } | PricingMode::Free => cmd
                .price
                .or(self.draft.unit_price)
                .ok_or_else(|| DomainError::validation("price is required"))?,
        };
        if let PriceVerdict::Rejected(reason) = PricingPolicy::validate(&mode, price) {
            return Err(DomainError::validation(reason.to_string()));
        }
        let total = match mode {
            PricingMode::PresetOverride => cmd.preset_total.unwrap_or(Decimal::ZERO),
            _ => price * Decimal::from(quantity),
        };

        let line = FinishedLine {
            line_id: cmd.line_id,
            category_id,
            subcategory_id: self.draft.subcategory_id,
            quantity,
            weight,
            price,
            total,
            preset_id: self.draft.preset_id,
            notes: self.draft.notes.clone(),
            completed_at: cmd.occurred_at,
        };

        Ok(vec![EntryEvent::LineCompleted(LineCompleted {
            line,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_go_to_step(&self, cmd: &GoToStep) -> Result<Vec<EntryEvent>, DomainError> {
        if cmd.step == self.step {
            return Ok(Vec::new());
        }
        self.check_jump(cmd.step)?;

        let mut events = vec![EntryEvent::StepEntered(StepEntered {
            from: self.step,
            to: cmd.step,
            occurred_at: cmd.occurred_at,
        })];
        if cmd.step == WizardStep::Price {
            events.extend(self.prefill_event(cmd.occurred_at));
        }
        Ok(events)
    }

    fn handle_select_preset(&self, cmd: &SelectPreset) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_step(WizardStep::Price)?;
        if self.draft.preset_id == Some(cmd.preset_id) {
            return Ok(Vec::new());
        }

        Ok(vec![EntryEvent::PresetSelected(PresetSelected {
            preset_id: cmd.preset_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear_preset(&self, cmd: &ClearPreset) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_step(WizardStep::Price)?;
        if self.draft.preset_id.is_none() {
            return Err(DomainError::conflict("no preset selected"));
        }
        let restored_price = PricingPolicy::resolve(&self.price_rule, false).prefill();

        Ok(vec![EntryEvent::PresetCleared(PresetCleared {
            restored_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_notes(&self, cmd: &SetNotes) -> Result<Vec<EntryEvent>, DomainError> {
        self.ensure_step(WizardStep::Price)?;
        let trimmed = cmd.notes.trim();
        let notes = (!trimmed.is_empty()).then(|| trimmed.to_string());
        if notes == self.draft.notes {
            return Ok(Vec::new());
        }

        Ok(vec![EntryEvent::NotesUpdated(NotesUpdated {
            notes,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_discard(&self, cmd: &DiscardDraft) -> Result<Vec<EntryEvent>, DomainError> {
        if self.step == WizardStep::Category && self.draft.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![EntryEvent::DraftDiscarded(DraftDiscarded {
            reason: cmd.reason,
            occurred_at: cmd.occurred_at,
        })])
    }

    /// Pre-fill for modes that dictate the price, unless already in place.
    fn prefill_event(&self, occurred_at: DateTime<Utc>) -> Option<EntryEvent> {
        let price = self.pricing_mode().prefill()?;
        if self.draft.unit_price == Some(price) {
            return None;
        }
        Some(EntryEvent::PricePrefilled(PricePrefilled { price, occurred_at }))
    }
}
