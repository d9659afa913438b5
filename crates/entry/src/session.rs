//! Terminal-side orchestration around the [`EntryWizard`] aggregate.
//!
//! An [`EntrySession`] owns one wizard plus everything the operator touches
//! while building a line: the keypad translator, one input mask per numeric
//! field, the weight readings, the positional shortcuts of the selection
//! grids and the inactivity timer. Every call is synchronous and takes the
//! operator's clock reading explicitly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use cashdesk_core::{AggregateRoot, CategoryId, DomainError, LineId, PresetId, TerminalId};
use cashdesk_events::{EventBus, InMemoryEventBus, Subscription, execute};
use cashdesk_keypad::{
    FocusTarget, KeyAction, KeyPress, LayoutKeyTranslator, NumericInputMask,
    PositionalShortcutMapper, ShortcutBinding,
};

use crate::config::EntryConfig;
use crate::directory::{CategoryDirectory, CategoryEntry};
use crate::draft::{FinishedLine, SaleLineDraft};
use crate::pricing::{PriceRejection, PriceVerdict, PricingMode, PricingPolicy};
use crate::quantity::{QuantityRejection, validate_quantity};
use crate::sink::{LineSink, PresetCalculator};
use crate::step::WizardStep;
use crate::timer::InactivityTimer;
use crate::weight::{WeightAggregator, WeightRejection};
use crate::wizard::{
    CategoryChosen, ChooseCategory, ChooseSubcategory, ClearPreset, CommitWeight, ConfirmPrice,
    DiscardDraft, DiscardReason, EntryCommand, EntryEvent, EntryWizard, GoToStep, SelectPreset,
    SetNotes, SubcategoryChosen, SubmitQuantity,
};

/// Message for the field the operator is editing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldMessage {
    #[error(transparent)]
    Weight(#[from] WeightRejection),
    #[error(transparent)]
    Quantity(#[from] QuantityRejection),
    #[error(transparent)]
    Price(#[from] PriceRejection),
}

/// Outcome of one operator action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Nothing happened (unmapped key, unreachable step, ...).
    Ignored,
    /// State or a field buffer changed.
    Updated,
    /// Input refused; show the message next to the field.
    Rejected(FieldMessage),
    /// A line was finished and handed to the sink.
    Completed(FinishedLine),
    /// The draft was thrown away and the wizard is back on the category step.
    Reset(DiscardReason),
}

impl Feedback {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Feedback::Ignored)
    }
}

/// Read-only snapshot for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub step: WizardStep,
    pub completed_steps: Vec<WizardStep>,
    pub draft: SaleLineDraft,
    pub readings: Vec<Decimal>,
    pub weight_total: Decimal,
    /// Buffer of the numeric field on screen, empty on selection steps.
    pub input: String,
    pub pricing_mode: PricingMode,
    pub shortcuts: Vec<ShortcutBinding>,
    pub idle_deadline: DateTime<Utc>,
}

pub struct EntrySession<D, S> {
    wizard: EntryWizard,
    directory: D,
    sink: S,
    presets: Option<Box<dyn PresetCalculator>>,
    bus: Arc<InMemoryEventBus<EntryEvent>>,
    translator: LayoutKeyTranslator,
    shortcuts: PositionalShortcutMapper,
    readings: WeightAggregator,
    weight_input: NumericInputMask,
    quantity_input: NumericInputMask,
    price_input: NumericInputMask,
    timer: InactivityTimer,
    config: EntryConfig,
}

impl<D, S> EntrySession<D, S>
where
    D: CategoryDirectory,
    S: LineSink,
{
    pub fn new(
        terminal_id: TerminalId,
        directory: D,
        sink: S,
        config: EntryConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let mut session = Self {
            wizard: EntryWizard::new(terminal_id),
            directory,
            sink,
            presets: None,
            bus: Arc::new(InMemoryEventBus::new()),
            translator: LayoutKeyTranslator::new(),
            shortcuts: PositionalShortcutMapper::new(),
            readings: WeightAggregator::new(),
            weight_input: NumericInputMask::decimal(),
            quantity_input: NumericInputMask::integer(),
            price_input: NumericInputMask::decimal(),
            timer: InactivityTimer::new(config.idle_timeout(), now),
            config,
        };
        session.enter_step(WizardStep::Category);
        session
    }

    pub fn with_preset_calculator(mut self, calculator: impl PresetCalculator + 'static) -> Self {
        self.presets = Some(Box::new(calculator));
        self
    }

    pub fn wizard(&self) -> &EntryWizard {
        &self.wizard
    }

    pub fn step(&self) -> WizardStep {
        self.wizard.step()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn config(&self) -> &EntryConfig {
        &self.config
    }

    /// Observe every event the wizard applies from now on.
    pub fn subscribe(&self) -> Subscription<EntryEvent> {
        self.bus.subscribe()
    }

    pub fn event_bus(&self) -> Arc<InMemoryEventBus<EntryEvent>> {
        Arc::clone(&self.bus)
    }

    pub fn view(&self) -> EntryView {
        let input = match self.wizard.step() {
            WizardStep::Weight => self.weight_input.as_str(),
            WizardStep::Quantity => self.quantity_input.as_str(),
            WizardStep::Price => self.price_input.as_str(),
            WizardStep::Category | WizardStep::Subcategory => "",
        };
        let shortcuts = if self.shortcuts.is_active() {
            self.shortcuts.bindings().to_vec()
        } else {
            Vec::new()
        };

        EntryView {
            step: self.wizard.step(),
            completed_steps: self.wizard.completed_steps(),
            draft: self.wizard.draft().clone(),
            readings: self.readings.readings().iter().map(|r| r.value()).collect(),
            weight_total: self.readings.total(),
            input: input.to_string(),
            pricing_mode: self.wizard.pricing_mode(),
            shortcuts,
            idle_deadline: self.timer.deadline(),
        }
    }

    /// Route one key press.
    ///
    /// Selection steps offer the press to the shortcut mapper; numeric steps
    /// translate it and feed the field's mask. Presses that do something are
    /// consumed, everything else is left for other handlers.
    pub fn handle_key(&mut self, press: &mut KeyPress, focus: FocusTarget, now: DateTime<Utc>) -> Feedback {
        if let Some(reset) = self.expire(now) {
            return reset;
        }

        let step = self.wizard.step();
        if step.is_selection() {
            return match self.shortcuts.on_key_press(press, focus) {
                Some(position) => self.select_position(position, now),
                None => Feedback::Ignored,
            };
        }

        if focus.is_text_editable() {
            tracing::debug!(key = press.key(), %step, "key left to focused text field");
            return Feedback::Ignored;
        }

        let action = self.translator.translate_press(press);
        tracing::debug!(key = press.key(), ?action, %step, "key translated");

        let feedback = match action {
            KeyAction::Unmapped => return Feedback::Ignored,
            KeyAction::Confirm => self.confirm_field(now),
            edit => {
                let Some(mask) = self.active_mask() else {
                    return Feedback::Ignored;
                };
                match edit {
                    KeyAction::Digit(d) => mask.push_digit(d),
                    KeyAction::DecimalPoint => mask.push_decimal_point(),
                    KeyAction::Backspace => mask.backspace(),
                    KeyAction::Confirm | KeyAction::Unmapped => {}
                }
                Feedback::Updated
            }
        };

        press.prevent_default();
        press.stop_propagation();
        self.timer.touch(now);
        feedback
    }

    /// Pick a category on the category step (pointer or shortcut).
    pub fn select_category(&mut self, category_id: CategoryId, now: DateTime<Utc>) -> Feedback {
        if let Some(reset) = self.expire(now) {
            return reset;
        }
        let Some(entry) = self.directory.category(category_id) else {
            tracing::debug!(%category_id, "unknown category");
            return Feedback::Ignored;
        };
        if entry.parent_id.is_some() {
            tracing::debug!(%category_id, "not a top-level category");
            return Feedback::Ignored;
        }

        let command = EntryCommand::ChooseCategory(ChooseCategory {
            category_id,
            has_children: self.directory.has_children(category_id),
            price_rule: entry.price_rule,
            occurred_at: now,
        });
        self.dispatch(command, now)
    }

    /// Pick a sub-category of the chosen category.
    pub fn select_subcategory(&mut self, subcategory_id: CategoryId, now: DateTime<Utc>) -> Feedback {
        if let Some(reset) = self.expire(now) {
            return reset;
        }
        let Some(parent_id) = self.wizard.draft().category_id() else {
            return Feedback::Ignored;
        };
        let Some(entry) = self.directory.category(subcategory_id) else {
            tracing::debug!(%subcategory_id, "unknown sub-category");
            return Feedback::Ignored;
        };
        if entry.parent_id != Some(parent_id) {
            tracing::debug!(%subcategory_id, %parent_id, "sub-category belongs to another category");
            return Feedback::Ignored;
        }

        let parent_rule = self.directory.price_rule(parent_id).unwrap_or_default();
        let command = EntryCommand::ChooseSubcategory(ChooseSubcategory {
            subcategory_id,
            price_rule: entry.price_rule.or_inherit(parent_rule),
            occurred_at: now,
        });
        self.dispatch(command, now)
    }

    /// Pick the item at a 1-based grid position of the current selection step.
    pub fn select_position(&mut self, position: usize, now: DateTime<Utc>) -> Feedback {
        let Some(index) = position.checked_sub(1) else {
            return Feedback::Ignored;
        };
        let Some(entry) = self.listing().into_iter().nth(index) else {
            tracing::debug!(position, "no item at position");
            return Feedback::Ignored;
        };

        match self.wizard.step() {
            WizardStep::Category => self.select_category(entry.id, now),
            WizardStep::Subcategory => self.select_subcategory(entry.id, now),
            _ => Feedback::Ignored,
        }
    }

    pub fn go_to_step(&mut self, step: WizardStep, now: DateTime<Utc>) -> Feedback {
        if let Some(reset) = self.expire(now) {
            return reset;
        }
        self.dispatch(EntryCommand::GoToStep(GoToStep { step, occurred_at: now }), now)
    }

    /// Drop one weight reading; later readings move up.
    pub fn remove_reading(&mut self, index: usize, now: DateTime<Utc>) -> Feedback {
        if let Some(reset) = self.expire(now) {
            return reset;
        }
        if self.wizard.step() != WizardStep::Weight {
            return Feedback::Ignored;
        }

        match self.readings.remove(index) {
            Ok(reading) => {
                tracing::debug!(index, value = %reading.value(), "weight reading removed");
                self.timer.touch(now);
                Feedback::Updated
            }
            Err(rejection) => self.reject(rejection.into()),
        }
    }

    pub fn select_preset(&mut self, preset_id: PresetId, now: DateTime<Utc>) -> Feedback {
        if let Some(reset) = self.expire(now) {
            return reset;
        }
        let feedback = self.dispatch(
            EntryCommand::SelectPreset(SelectPreset { preset_id, occurred_at: now }),
            now,
        );
        self.sync_price_input();
        feedback
    }

    pub fn clear_preset(&mut self, now: DateTime<Utc>) -> Feedback {
        if let Some(reset) = self.expire(now) {
            return reset;
        }
        let feedback = self.dispatch(EntryCommand::ClearPreset(ClearPreset { occurred_at: now }), now);
        self.sync_price_input();
        feedback
    }

    pub fn set_notes(&mut self, notes: impl Into<String>, now: DateTime<Utc>) -> Feedback {
        if let Some(reset) = self.expire(now) {
            return reset;
        }
        self.dispatch(
            EntryCommand::SetNotes(SetNotes {
                notes: notes.into(),
                occurred_at: now,
            }),
            now,
        )
    }

    /// Throw the draft away on purpose.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Feedback {
        self.discard(DiscardReason::Cancelled, now)
            .unwrap_or(Feedback::Ignored)
    }

    /// Let the inactivity timer catch up with the clock.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Feedback {
        self.expire(now).unwrap_or(Feedback::Ignored)
    }

    /// Rebuild shortcut bindings for the current grid, e.g. after the
    /// directory changed underneath the session.
    pub fn refresh_shortcuts(&mut self) {
        let step = self.wizard.step();
        if step.is_selection() {
            self.install_shortcuts();
        }
    }

    fn listing(&self) -> Vec<CategoryEntry> {
        match self.wizard.step() {
            WizardStep::Category => self.directory.roots(),
            WizardStep::Subcategory => match self.wizard.draft().category_id() {
                Some(parent) => self.directory.children(parent),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn active_mask(&mut self) -> Option<&mut NumericInputMask> {
        match self.wizard.step() {
            WizardStep::Weight => Some(&mut self.weight_input),
            WizardStep::Quantity => Some(&mut self.quantity_input),
            WizardStep::Price if self.wizard.pricing_mode().is_editable() => Some(&mut self.price_input),
            _ => None,
        }
    }

    fn confirm_field(&mut self, now: DateTime<Utc>) -> Feedback {
        match self.wizard.step() {
            WizardStep::Weight => self.confirm_weight(now),
            WizardStep::Quantity => self.confirm_quantity(now),
            WizardStep::Price => self.confirm_price(now),
            WizardStep::Category | WizardStep::Subcategory => Feedback::Ignored,
        }
    }

    /// A typed value becomes a new reading; an empty field commits the total.
    fn confirm_weight(&mut self, now: DateTime<Utc>) -> Feedback {
        if !self.weight_input.is_empty() {
            return match self.readings.confirm(self.weight_input.value()) {
                Ok(reading) => {
                    tracing::debug!(value = %reading.value(), total = %self.readings.total(), "weight reading added");
                    self.weight_input.clear();
                    Feedback::Updated
                }
                Err(rejection) => self.reject(rejection.into()),
            };
        }

        // Coming back to the weight step keeps the committed weight.
        if let Some(weight) = self.wizard.draft().weight().filter(|_| self.readings.is_empty()) {
            return self.dispatch(
                EntryCommand::CommitWeight(CommitWeight { weight, occurred_at: now }),
                now,
            );
        }

        match self.readings.commit() {
            Ok(weight) => self.dispatch(
                EntryCommand::CommitWeight(CommitWeight { weight, occurred_at: now }),
                now,
            ),
            Err(rejection) => self.reject(rejection.into()),
        }
    }

    fn confirm_quantity(&mut self, now: DateTime<Utc>) -> Feedback {
        let quantity = self.quantity_input.value();
        if let Err(rejection) = validate_quantity(quantity) {
            return self.reject(rejection.into());
        }
        self.dispatch(
            EntryCommand::SubmitQuantity(SubmitQuantity { quantity, occurred_at: now }),
            now,
        )
    }

    fn confirm_price(&mut self, now: DateTime<Utc>) -> Feedback {
        let mode = self.wizard.pricing_mode();
        let typed = mode.is_editable().then(|| self.price_input.value());
        let candidate = typed.or_else(|| mode.prefill()).unwrap_or(Decimal::ZERO);
        if let PriceVerdict::Rejected(rejection) = PricingPolicy::validate(&mode, candidate) {
            return self.reject(rejection.into());
        }

        let draft = self.wizard.draft();
        let preset_total = match (draft.preset_id(), self.presets.as_deref()) {
            (Some(preset_id), Some(calculator)) => calculator.line_total(preset_id, draft.notes()),
            _ => None,
        };

        self.dispatch(
            EntryCommand::ConfirmPrice(ConfirmPrice {
                line_id: LineId::new(),
                price: typed,
                preset_total,
                occurred_at: now,
            }),
            now,
        )
    }

    fn expire(&mut self, now: DateTime<Utc>) -> Option<Feedback> {
        if self.wizard.step() == WizardStep::Category || !self.timer.is_expired(now) {
            return None;
        }
        tracing::info!(
            terminal = %self.wizard.terminal_id(),
            step = %self.wizard.step(),
            idle_since = %self.timer.last_activity(),
            "draft discarded after inactivity"
        );
        self.discard(DiscardReason::Inactivity, now)
    }

    fn discard(&mut self, reason: DiscardReason, now: DateTime<Utc>) -> Option<Feedback> {
        match self.dispatch(
            EntryCommand::DiscardDraft(DiscardDraft { reason, occurred_at: now }),
            now,
        ) {
            Feedback::Reset(reason) => Some(Feedback::Reset(reason)),
            _ => None,
        }
    }

    /// Run a command through the wizard, publish what it applied and bring
    /// the terminal-side state in line with the new step.
    fn dispatch(&mut self, command: EntryCommand, now: DateTime<Utc>) -> Feedback {
        let from = self.wizard.step();
        let events = match execute(&mut self.wizard, &command) {
            Ok(events) => events,
            Err(err) => return self.ignore(&err),
        };
        if events.is_empty() {
            return Feedback::Ignored;
        }

        self.timer.touch(now);
        let mut feedback = Feedback::Updated;
        for event in &events {
            match event {
                EntryEvent::CategoryChosen(CategoryChosen { replaced, .. })
                | EntryEvent::SubcategoryChosen(SubcategoryChosen { replaced, .. }) => {
                    self.readings.reset();
                    if *replaced {
                        self.quantity_input.clear();
                        self.price_input.clear();
                    }
                }
                EntryEvent::LineCompleted(e) => {
                    tracing::info!(
                        terminal = %self.wizard.terminal_id(),
                        line_id = %e.line.line_id,
                        quantity = e.line.quantity,
                        weight = %e.line.weight,
                        price = %e.line.price,
                        total = %e.line.total,
                        "line completed"
                    );
                    self.sink.accept(e.line.clone());
                    self.clear_fields();
                    feedback = Feedback::Completed(e.line.clone());
                }
                EntryEvent::DraftDiscarded(e) => {
                    self.clear_fields();
                    feedback = Feedback::Reset(e.reason);
                }
                _ => {}
            }
            if let Err(err) = self.bus.publish(event.clone()) {
                tracing::warn!(error = %err, "failed to publish entry event");
            }
        }

        let to = self.wizard.step();
        if to != from || matches!(feedback, Feedback::Completed(_) | Feedback::Reset(_)) {
            tracing::debug!(%from, %to, version = self.wizard.version(), "step changed");
            self.enter_step(to);
        }
        feedback
    }

    fn ignore(&self, err: &DomainError) -> Feedback {
        tracing::debug!(step = %self.wizard.step(), error = %err, "transition ignored");
        Feedback::Ignored
    }

    fn reject(&self, message: FieldMessage) -> Feedback {
        tracing::warn!(step = %self.wizard.step(), %message, "input rejected");
        Feedback::Rejected(message)
    }

    fn clear_fields(&mut self) {
        self.readings.reset();
        self.weight_input.clear();
        self.quantity_input.clear();
        self.price_input.clear();
    }

    fn enter_step(&mut self, step: WizardStep) {
        if step.is_selection() {
            self.install_shortcuts();
            return;
        }
        self.shortcuts.deactivate();

        match step {
            WizardStep::Weight => self.weight_input.clear(),
            WizardStep::Quantity => {
                if self.quantity_input.is_empty() {
                    let current = self.wizard.draft().quantity().map(|q| q.to_string());
                    self.quantity_input.set(current.as_deref().unwrap_or_default());
                }
            }
            // A typed, unconfirmed price survives a round trip through other steps.
            WizardStep::Price => {
                if !self.wizard.pricing_mode().is_editable() || self.price_input.is_empty() {
                    self.sync_price_input();
                }
            }
            WizardStep::Category | WizardStep::Subcategory => {}
        }
    }

    fn install_shortcuts(&mut self) {
        if !self.config.shortcuts_enabled {
            self.shortcuts.deactivate();
            return;
        }
        let count = self.listing().len();
        let installed = self.shortcuts.initialize(count).len();
        tracing::debug!(step = %self.wizard.step(), items = count, installed, "shortcuts installed");
    }

    fn sync_price_input(&mut self) {
        if self.wizard.step() != WizardStep::Price {
            return;
        }
        let current = self.wizard.draft().unit_price().map(|p| p.to_string());
        self.price_input.set(current.as_deref().unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryCategoryDirectory;
    use crate::pricing::CategoryPriceRule;
    use cashdesk_keypad::Modifiers;
    use chrono::{Duration, TimeZone};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn d(units: i64) -> Decimal {
        Decimal::from(units)
    }

    struct Fixture {
        directory: InMemoryCategoryDirectory,
        fruit: CategoryId,
        books: CategoryId,
        novels: CategoryId,
        comics: CategoryId,
    }

    fn fixture() -> Fixture {
        let mut directory = InMemoryCategoryDirectory::new();
        let fruit = directory.add_root("Fruit", CategoryPriceRule::fixed(d(10)));
        let books = directory.add_root("Books", CategoryPriceRule::ranged(d(1), d(50)));
        let novels = directory.add_child(books, "Novels", CategoryPriceRule::free()).unwrap();
        let comics = directory
            .add_child(books, "Comics", CategoryPriceRule::fixed(d(2)))
            .unwrap();
        Fixture {
            directory,
            fruit,
            books,
            novels,
            comics,
        }
    }

    fn session(directory: InMemoryCategoryDirectory) -> EntrySession<InMemoryCategoryDirectory, Vec<FinishedLine>> {
        EntrySession::new(TerminalId::new(), directory, Vec::new(), EntryConfig::default(), at(0))
    }

    fn type_keys<D: CategoryDirectory, S: LineSink>(
        session: &mut EntrySession<D, S>,
        keys: &[&str],
        now: DateTime<Utc>,
    ) -> Feedback {
        let mut last = Feedback::Ignored;
        for key in keys {
            last = session.handle_key(&mut KeyPress::new(*key), FocusTarget::None, now);
        }
        last
    }

    #[test]
    fn shortcuts_follow_the_selection_steps() {
        let f = fixture();
        let mut session = session(f.directory);
        assert_eq!(session.view().shortcuts.len(), 2);

        let mut press = KeyPress::new("z");
        let feedback = session.handle_key(&mut press, FocusTarget::None, at(1));
        assert_eq!(feedback, Feedback::Updated);
        assert!(press.is_consumed());
        assert_eq!(session.step(), WizardStep::Subcategory);
        assert_eq!(session.wizard().draft().category_id(), Some(f.books));
        assert_eq!(session.view().shortcuts.len(), 2);

        session.handle_key(&mut KeyPress::new("A"), FocusTarget::None, at(2));
        assert_eq!(session.step(), WizardStep::Weight);
        assert!(session.view().shortcuts.is_empty());
    }

    #[test]
    fn shortcuts_stay_out_of_text_fields() {
        let f = fixture();
        let mut session = session(f.directory);

        let mut press = KeyPress::new("a");
        assert!(session.handle_key(&mut press, FocusTarget::TextInput, at(1)).is_ignored());
        assert!(!press.is_consumed());
        assert_eq!(session.step(), WizardStep::Category);

        let mut press = KeyPress::with_modifiers("a", Modifiers::control());
        assert!(session.handle_key(&mut press, FocusTarget::None, at(1)).is_ignored());
    }

    #[test]
    fn disabled_shortcuts_never_fire() {
        let f = fixture();
        let config = EntryConfig {
            shortcuts_enabled: false,
            ..EntryConfig::default()
        };
        let mut session = EntrySession::new(TerminalId::new(), f.directory, Vec::new(), config, at(0));
        assert!(session.handle_key(&mut KeyPress::new("a"), FocusTarget::None, at(1)).is_ignored());
        assert!(session.view().shortcuts.is_empty());
    }

    #[test]
    fn weight_readings_add_up_and_commit() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.fruit, at(1));

        type_keys(&mut session, &["1", ",", "5", "Enter"], at(2));
        type_keys(&mut session, &["é", "Enter"], at(3));
        assert_eq!(session.view().readings, vec![Decimal::new(15, 1), d(2)]);
        assert_eq!(session.view().weight_total, Decimal::new(35, 1));

        assert_eq!(session.remove_reading(0, at(4)), Feedback::Updated);
        assert_eq!(session.view().weight_total, d(2));
        assert!(matches!(
            session.remove_reading(5, at(4)),
            Feedback::Rejected(FieldMessage::Weight(WeightRejection::NoSuchReading { .. }))
        ));

        type_keys(&mut session, &["Enter"], at(5));
        assert_eq!(session.step(), WizardStep::Quantity);
        assert_eq!(session.wizard().draft().weight(), Some(d(2)));
    }

    #[test]
    fn empty_weight_cannot_be_committed() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.fruit, at(1));

        let feedback = type_keys(&mut session, &["Enter"], at(2));
        assert_eq!(
            feedback,
            Feedback::Rejected(FieldMessage::Weight(WeightRejection::NothingToCommit))
        );
        assert_eq!(session.step(), WizardStep::Weight);
    }

    #[test]
    fn quantity_takes_no_decimal_point() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.fruit, at(1));
        type_keys(&mut session, &["2", "Enter", "Enter"], at(2));

        type_keys(&mut session, &["1", ".", "5"], at(3));
        assert_eq!(session.view().input, "15");

        let feedback = type_keys(&mut session, &["0", "0", "0", "Enter"], at(4));
        assert!(matches!(
            feedback,
            Feedback::Rejected(FieldMessage::Quantity(QuantityRejection::AboveMaximum { .. }))
        ));
        assert_eq!(session.step(), WizardStep::Quantity);
    }

    #[test]
    fn ranged_price_rejects_out_of_bounds_and_accepts_inside() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.books, at(1));
        session.select_subcategory(f.novels, at(2));
        assert_eq!(
            session.view().pricing_mode,
            PricingMode::Ranged { min: d(1), max: d(50) }
        );

        type_keys(&mut session, &["1", "Enter", "Enter", "2", "Enter"], at(3));
        assert_eq!(session.step(), WizardStep::Price);

        let feedback = type_keys(&mut session, &["Enter"], at(4));
        assert!(matches!(
            feedback,
            Feedback::Rejected(FieldMessage::Price(PriceRejection::BelowMinimum { .. }))
        ));

        let feedback = type_keys(&mut session, &["4", ".", "2", "5", "Enter"], at(5));
        let Feedback::Completed(line) = feedback else {
            panic!("Expected a completed line, got {feedback:?}");
        };
        assert_eq!(line.subcategory_id, Some(f.novels));
        assert_eq!(line.total, Decimal::new(850, 2));
        assert_eq!(session.sink().len(), 1);
        assert_eq!(session.step(), WizardStep::Category);
    }

    #[test]
    fn fixed_price_field_ignores_digits() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.books, at(1));
        session.select_subcategory(f.comics, at(2));
        type_keys(&mut session, &["1", "Enter", "Enter", "3", "Enter"], at(3));

        assert_eq!(session.view().input, "2");
        let mut press = KeyPress::new("9");
        assert!(session.handle_key(&mut press, FocusTarget::None, at(4)).is_ignored());
        assert!(!press.is_consumed());

        let Feedback::Completed(line) = type_keys(&mut session, &["Enter"], at(5)) else {
            panic!("fixed price should be accepted as is");
        };
        assert_eq!(line.price, d(2));
        assert_eq!(line.total, d(6));
    }

    #[test]
    fn preset_line_uses_the_calculator() {
        struct Flat;
        impl PresetCalculator for Flat {
            fn line_total(&self, _: PresetId, notes: Option<&str>) -> Option<Decimal> {
                notes.map(|_| Decimal::new(1250, 2))
            }
        }

        let f = fixture();
        let mut session = session(f.directory).with_preset_calculator(Flat);
        session.select_category(f.fruit, at(1));
        type_keys(&mut session, &["1", "Enter", "Enter", "2", "Enter"], at(2));

        let preset_id = PresetId::new();
        assert_eq!(session.select_preset(preset_id, at(3)), Feedback::Updated);
        assert_eq!(session.view().pricing_mode, PricingMode::PresetOverride);
        assert_eq!(session.view().input, "0");
        session.set_notes("donation", at(4));

        let Feedback::Completed(line) = type_keys(&mut session, &["Enter"], at(5)) else {
            panic!("preset line should complete");
        };
        assert_eq!(line.price, Decimal::ZERO);
        assert_eq!(line.total, Decimal::new(1250, 2));
        assert_eq!(line.preset_id, Some(preset_id));
    }

    #[test]
    fn inactivity_resets_away_from_category() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.fruit, at(10));
        type_keys(&mut session, &["3"], at(20));

        assert!(session.tick(at(20 + 299)).is_ignored());
        assert_eq!(
            session.tick(at(20 + 300)),
            Feedback::Reset(DiscardReason::Inactivity)
        );
        assert_eq!(session.step(), WizardStep::Category);
        assert!(session.wizard().draft().is_empty());
        assert!(session.tick(at(10_000)).is_ignored());
    }

    #[test]
    fn a_late_key_press_finds_a_fresh_draft() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.fruit, at(0));

        let late = at(0) + Duration::minutes(6);
        let feedback = session.handle_key(&mut KeyPress::new("1"), FocusTarget::None, late);
        assert_eq!(feedback, Feedback::Reset(DiscardReason::Inactivity));
        assert_eq!(session.view().input, "");
    }

    #[test]
    fn cancel_discards_and_publishes() {
        let f = fixture();
        let mut session = session(f.directory);
        let events = session.subscribe();

        assert!(session.cancel(at(1)).is_ignored());
        session.select_category(f.fruit, at(1));
        assert_eq!(session.cancel(at(2)), Feedback::Reset(DiscardReason::Cancelled));

        let names: Vec<_> = events
            .drain()
            .iter()
            .map(cashdesk_events::Event::event_type)
            .collect();
        assert_eq!(names, vec!["entry.category.chosen", "entry.draft.discarded"]);
    }

    #[test]
    fn unreachable_jumps_are_silent() {
        let f = fixture();
        let mut session = session(f.directory);
        assert!(session.go_to_step(WizardStep::Price, at(1)).is_ignored());
        assert!(session.select_subcategory(f.novels, at(1)).is_ignored());
        assert!(session.select_category(f.novels, at(1)).is_ignored());
        assert!(session.remove_reading(0, at(1)).is_ignored());
        assert_eq!(session.wizard().version(), 0);
    }

    #[test]
    fn jumping_back_to_quantity_shows_the_entered_value() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.fruit, at(1));
        type_keys(&mut session, &["4", "Enter", "Enter", "7", "Enter"], at(2));
        assert_eq!(session.step(), WizardStep::Price);

        session.go_to_step(WizardStep::Quantity, at(3));
        assert_eq!(session.view().input, "7");

        session.go_to_step(WizardStep::Weight, at(4));
        type_keys(&mut session, &["Enter"], at(5));
        assert_eq!(session.step(), WizardStep::Quantity);
        assert_eq!(session.wizard().draft().weight(), Some(d(4)));
    }

    #[test]
    fn repicking_books_keeps_the_comics_price() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.books, at(1));
        session.select_subcategory(f.comics, at(2));
        type_keys(&mut session, &["1", "Enter", "Enter", "3", "Enter"], at(3));
        assert_eq!(session.view().pricing_mode, PricingMode::Fixed { price: d(2) });

        session.go_to_step(WizardStep::Category, at(4));
        session.select_category(f.books, at(5));
        assert_eq!(session.wizard().draft().subcategory_id(), Some(f.comics));
        assert_eq!(session.go_to_step(WizardStep::Price, at(6)), Feedback::Updated);

        assert_eq!(session.view().pricing_mode, PricingMode::Fixed { price: d(2) });
        assert_eq!(session.view().input, "2");
        let Feedback::Completed(line) = type_keys(&mut session, &["Enter"], at(7)) else {
            panic!("comics line should take its fixed price");
        };
        assert_eq!(line.total, d(6));
    }

    #[test]
    fn choosing_a_category_starts_with_no_readings() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.fruit, at(1));
        type_keys(&mut session, &["2", "Enter"], at(2));
        assert_eq!(session.view().readings, vec![d(2)]);

        session.go_to_step(WizardStep::Category, at(3));
        session.select_category(f.fruit, at(4));
        assert_eq!(session.step(), WizardStep::Weight);
        assert!(session.view().readings.is_empty());

        session.go_to_step(WizardStep::Category, at(5));
        session.select_category(f.books, at(6));
        session.select_subcategory(f.novels, at(7));
        type_keys(&mut session, &["4", "Enter"], at(8));
        session.go_to_step(WizardStep::Subcategory, at(9));
        session.select_subcategory(f.novels, at(10));
        assert!(session.view().readings.is_empty());
    }

    #[test]
    fn typed_price_survives_a_round_trip() {
        let f = fixture();
        let mut session = session(f.directory);
        session.select_category(f.books, at(1));
        session.select_subcategory(f.novels, at(2));
        type_keys(&mut session, &["1", "Enter", "Enter", "2", "Enter", "1", "5"], at(3));
        assert_eq!(session.view().input, "15");

        session.go_to_step(WizardStep::Weight, at(4));
        session.go_to_step(WizardStep::Price, at(5));
        assert_eq!(session.view().input, "15");

        let Feedback::Completed(line) = type_keys(&mut session, &["Enter"], at(6)) else {
            panic!("typed price should still be there");
        };
        assert_eq!(line.price, d(15));
    }
}
