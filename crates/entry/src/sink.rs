//! Output ports: where finished lines go, and who prices preset lines.

use rust_decimal::Decimal;

use cashdesk_core::PresetId;

use crate::draft::FinishedLine;

/// Receives every finished line exactly once, in completion order.
pub trait LineSink {
    fn accept(&mut self, line: FinishedLine);
}

impl LineSink for Vec<FinishedLine> {
    fn accept(&mut self, line: FinishedLine) {
        self.push(line);
    }
}

impl<S> LineSink for &mut S
where
    S: LineSink + ?Sized,
{
    fn accept(&mut self, line: FinishedLine) {
        (**self).accept(line);
    }
}

/// Computes the reported total of a preset line from the preset and the
/// operator's notes. Opaque to the engine.
pub trait PresetCalculator {
    fn line_total(&self, preset_id: PresetId, notes: Option<&str>) -> Option<Decimal>;
}
