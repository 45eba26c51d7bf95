//! The DUT-side boundary. The real RTL/DPI object this wraps in the
//! original harness is out of scope for this crate (§1) — `Dut` names
//! exactly the three operations `DiffEngine` needs from it, and `ShadowDut`
//! is the one concrete implementation this crate ships, built by wrapping a
//! second `Interpreter` instance behind the same interface a real DPI
//! binding would present. Bus ownership stays with `DualSoc`, same as
//! `Interpreter::step` — every method here takes its bus by reference.

use crate::bus::PaddrBus;
use crate::cpu::Interpreter;

/// Architectural state the DUT exposes after a retire, compared against REF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffSnapshot {
    pub pc: u32,
    pub gpr: [u32; 32],
    pub hi: u32,
    pub lo: u32,
}

/// The DUT-side collaborator `DiffEngine` drives one retire at a time.
pub trait Dut {
    /// Advances the DUT until it retires an instruction (for a real RTL
    /// binding this may be many clock edges; for `ShadowDut` it is exactly
    /// one `Interpreter::step`).
    fn step_until_retire(&mut self, bus: &mut PaddrBus, ext_int: u8);

    fn snapshot(&self) -> DiffSnapshot;

    /// Whether the instruction that just retired took an *interrupt*
    /// (`mycpu_int` in §4.7) — not any architectural exception; a plain
    /// trap like `Bp`/`Ov`/`RI` must not set this, or `DiffEngine`'s
    /// interrupt-timing reconciliation would falsely ABORT on it.
    fn saw_exception_this_retire(&self) -> bool;

    fn restart(&mut self);
}

/// A "DUT" that is in fact the same architectural model as REF: useful for
/// exercising the harness itself, and for regression-testing the
/// interpreter against itself after a refactor.
pub struct ShadowDut {
    interp: Interpreter,
    last_pc: u32,
    saw_exception: bool,
}

impl ShadowDut {
    pub fn new() -> Self {
        ShadowDut {
            interp: Interpreter::new(),
            last_pc: 0,
            saw_exception: false,
        }
    }
}

impl Default for ShadowDut {
    fn default() -> Self {
        Self::new()
    }
}

impl Dut for ShadowDut {
    fn step_until_retire(&mut self, bus: &mut PaddrBus, ext_int: u8) {
        self.interp.tick_cp0(ext_int);
        let has_int = self.interp.pending_irq();
        let outcome = self.interp.step(bus, has_int);
        self.last_pc = outcome.pc;
        // Specifically an *interrupt* take, not any architectural exception
        // — `DiffEngine` pairs this against REF's own pending-interrupt
        // query (§4.7), which would falsely ABORT on a plain trap like
        // `Bp`/`Ov` if every exception counted here.
        self.saw_exception = matches!(outcome.exception, Some(crate::cpu::Exception::Int));
    }

    fn snapshot(&self) -> DiffSnapshot {
        DiffSnapshot {
            pc: self.last_pc,
            gpr: self.interp.arch.gpr,
            hi: self.interp.arch.hi,
            lo: self.interp.arch.lo,
        }
    }

    fn saw_exception_this_retire(&self) -> bool {
        self.saw_exception
    }

    fn restart(&mut self) {
        self.interp.restart();
        self.last_pc = 0;
        self.saw_exception = false;
    }
}
