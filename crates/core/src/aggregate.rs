//! Command/event state machines.

/// Something with a stable identity whose state only changes through events.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied since construction.
    fn version(&self) -> u64;
}

/// `handle` decides, `apply` evolves.
///
/// `handle` looks at the current state and a command and answers with the
/// events that command produces, or an error, without touching the state.
/// `apply` folds one event into the state and bumps the version by one.
/// Neither may block, read a clock or call out to collaborators: timestamps
/// and looked-up data arrive inside the command.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}
