use super::{HostIo, Interpreter};
use crate::error::VmError;
use crate::state::{ExecuteState, StopReason};

use burst_asm::Word;

impl<H> Interpreter<H> {
    /// Set a breakpoint; returns `false` if it already existed.
    pub fn add_breakpoint(&mut self, addr: Word) -> bool {
        self.debugger.add_breakpoint(addr)
    }

    /// Remove a previously set breakpoint.
    pub fn remove_breakpoint(&mut self, addr: Word) -> bool {
        self.debugger.remove_breakpoint(addr)
    }

    /// Flip a breakpoint; returns `true` if it is now set.
    pub fn toggle_breakpoint(&mut self, addr: Word) -> bool {
        self.debugger.toggle_breakpoint(addr)
    }

    /// Breakpoint addresses in ascending order.
    pub fn breakpoints(&self) -> Vec<Word> {
        self.debugger.breakpoints()
    }

    /// Watch the word at `addr`, taking its current value as the
    /// baseline. Fails when the address cannot hold a word.
    pub fn add_watchpoint(&mut self, addr: Word) -> Result<bool, VmError> {
        let baseline = self.memory.read_word(addr)?;
        Ok(self.debugger.add_watchpoint(addr, baseline))
    }

    /// Stop watching `addr`.
    pub fn remove_watchpoint(&mut self, addr: Word) -> bool {
        self.debugger.remove_watchpoint(addr)
    }

    /// Flip a watchpoint; returns `Ok(true)` if it is now set.
    pub fn toggle_watchpoint(&mut self, addr: Word) -> Result<bool, VmError> {
        if self.debugger.remove_watchpoint(addr) {
            return Ok(false);
        }

        self.add_watchpoint(addr).map(|_| true)
    }

    /// Watched addresses with their last observed words.
    pub fn watchpoints(&self) -> Vec<(Word, Word)> {
        self.debugger.watchpoints().collect()
    }
}

impl<H> Interpreter<H>
where
    H: HostIo,
{
    /// Execute until a breakpoint, a watchpoint change, a halt or a
    /// fatal trap.
    ///
    /// Each iteration checks the breakpoint at `pc` first, then sweeps
    /// the watchpoints, then executes one instruction, so state changes
    /// made by a step are seen by the next iteration's checks.
    pub fn run(&mut self) -> Result<StopReason, VmError> {
        self.run_inner(false)
    }

    /// Like [`Interpreter::run`], but ignores a breakpoint at the
    /// current `pc` for the first iteration so execution can leave the
    /// instruction it stopped on.
    pub fn resume(&mut self) -> Result<StopReason, VmError> {
        self.run_inner(true)
    }

    fn run_inner(&mut self, mut skip_breakpoint: bool) -> Result<StopReason, VmError> {
        loop {
            if self.halted {
                return Ok(StopReason::Halted);
            }

            if !skip_breakpoint && self.debugger.has_breakpoint(self.pc) {
                tracing::debug!(pc = self.pc, "breakpoint hit");
                return Ok(StopReason::Breakpoint(self.pc));
            }
            skip_breakpoint = false;

            for addr in self.debugger.watch_addresses() {
                let current = self.memory.read_word(addr)?;

                if let Some(old) = self.debugger.update_watchpoint(addr, current) {
                    tracing::debug!(addr, old, new = current, "watchpoint hit");
                    return Ok(StopReason::Watchpoint {
                        addr,
                        old,
                        new: current,
                    });
                }
            }

            if let ExecuteState::Halted = self.step()? {
                return Ok(StopReason::Halted);
            }
        }
    }

    /// Execute up to `n` instructions, stopping early on halt.
    pub fn step_many(&mut self, n: u64) -> Result<ExecuteState, VmError> {
        let mut state = if self.halted {
            ExecuteState::Halted
        } else {
            ExecuteState::Proceed
        };

        for _ in 0..n {
            state = self.step()?;

            if !state.should_continue() {
                break;
            }
        }

        Ok(state)
    }
}
