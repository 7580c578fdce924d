//! Decide/evolve contract for the models SpareKeep owns transitions for
//! (requisitions). Catalog data belongs to the hosted store and is never
//! modelled as an aggregate here.

use crate::error::{DomainError, DomainResult};

/// Version a save expects the stored record to be at. Zero means the record
/// must not exist yet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedVersion(pub u64);

impl ExpectedVersion {
    pub fn check(self, stored: u64) -> DomainResult<()> {
        if self.0 == stored {
            Ok(())
        } else {
            Err(DomainError::StaleVersion {
                expected: self.0,
                actual: stored,
            })
        }
    }
}

/// Command-driven model with event-sourced state.
///
/// `decide` is pure; `evolve` bumps `version` by one per event.
pub trait Aggregate {
    type Id: Copy + Eq + core::fmt::Debug;
    type Command;
    type Event: Clone;

    fn id(&self) -> Self::Id;

    /// Number of events applied so far.
    fn version(&self) -> u64;

    fn decide(&self, command: &Self::Command) -> DomainResult<Vec<Self::Event>>;

    fn evolve(&mut self, event: &Self::Event);

    /// Decide, then evolve through every resulting event. State is left
    /// untouched when the command is rejected.
    fn execute(&mut self, command: &Self::Command) -> DomainResult<Vec<Self::Event>> {
        let events = self.decide(command)?;
        for event in &events {
            self.evolve(event);
        }
        Ok(events)
    }
}
