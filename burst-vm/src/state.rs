//! Runtime state representation for the VM

use burst_asm::Word;

mod debugger;

pub use debugger::Debugger;

/// Resulting state of a single instruction execution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecuteState {
    /// The VM should proceed normally with the execution.
    #[default]
    Proceed,
    /// The machine is halted; further steps are no-ops.
    Halted,
}

impl ExecuteState {
    /// Return true if the VM execution should continue.
    pub const fn should_continue(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Why a `run`/`resume` loop returned control to the caller.
///
/// Fatal traps are not represented here; they surface as the `Err` arm
/// of the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Execution stopped before the instruction at this address.
    Breakpoint(Word),
    /// A watched word changed between steps.
    Watchpoint {
        /// Watched address
        addr: Word,
        /// Value recorded when the watchpoint was last serviced
        old: Word,
        /// Value observed now, already recorded as the new baseline
        new: Word,
    },
    /// The machine reached `halt` or a guest exit.
    Halted,
}
