use burst_asm::Word;

use std::collections::{BTreeMap, HashSet};

/// Breakpoint and watchpoint bookkeeping for the VM.
///
/// The debugger only stores locations and baselines; the run loop in
/// the interpreter decides when to consult them. Watchpoints are kept
/// in address order so sweeps and listings are deterministic.
#[derive(Debug, Default, Clone)]
pub struct Debugger {
    breakpoints: HashSet<Word>,
    watchpoints: BTreeMap<Word, Word>,
}

impl Debugger {
    /// Set a breakpoint; returns `false` if it already existed.
    pub fn add_breakpoint(&mut self, addr: Word) -> bool {
        self.breakpoints.insert(addr)
    }

    /// Remove a breakpoint, if existent.
    pub fn remove_breakpoint(&mut self, addr: Word) -> bool {
        self.breakpoints.remove(&addr)
    }

    /// Flip a breakpoint; returns `true` if it is now set.
    pub fn toggle_breakpoint(&mut self, addr: Word) -> bool {
        if self.breakpoints.remove(&addr) {
            false
        } else {
            self.breakpoints.insert(addr);
            true
        }
    }

    /// Whether execution should stop before the instruction at `addr`.
    pub fn has_breakpoint(&self, addr: Word) -> bool {
        self.breakpoints.contains(&addr)
    }

    /// Breakpoint addresses in ascending order.
    pub fn breakpoints(&self) -> Vec<Word> {
        let mut addrs: Vec<Word> = self.breakpoints.iter().copied().collect();
        addrs.sort_unstable();
        addrs
    }

    /// Watch `addr`, taking `baseline` as the last observed word.
    /// Returns `false` if the address was already watched.
    pub fn add_watchpoint(&mut self, addr: Word, baseline: Word) -> bool {
        self.watchpoints.insert(addr, baseline).is_none()
    }

    /// Stop watching `addr`.
    pub fn remove_watchpoint(&mut self, addr: Word) -> bool {
        self.watchpoints.remove(&addr).is_some()
    }

    /// Whether `addr` is watched.
    pub fn has_watchpoint(&self, addr: Word) -> bool {
        self.watchpoints.contains_key(&addr)
    }

    /// Watched addresses in ascending order.
    pub fn watch_addresses(&self) -> Vec<Word> {
        self.watchpoints.keys().copied().collect()
    }

    /// Watched addresses with their last observed values.
    pub fn watchpoints(&self) -> impl Iterator<Item = (Word, Word)> + '_ {
        self.watchpoints.iter().map(|(&addr, &value)| (addr, value))
    }

    /// Record `current` for a watched address. Returns the previous
    /// baseline when the value changed, `None` otherwise or when the
    /// address is not watched.
    pub fn update_watchpoint(&mut self, addr: Word, current: Word) -> Option<Word> {
        let baseline = self.watchpoints.get_mut(&addr)?;

        if *baseline == current {
            return None;
        }

        Some(std::mem::replace(baseline, current))
    }

    /// Drop all breakpoints and watchpoints.
    pub fn clear(&mut self) {
        self.breakpoints.clear();
        self.watchpoints.clear();
    }
}
