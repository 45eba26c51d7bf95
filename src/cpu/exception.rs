//! Architectural exception codes.
//!
//! These are data the interpreter hands to CP0, not host-level errors —
//! never `thiserror`/`anyhow` types, never propagated out of `step()`.

/// MIPS32 `Cause.ExcCode` values relevant to this subset of the ISA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    /// Interrupt.
    Int,
    /// TLB modification (write to a page marked read-only).
    Mod,
    /// TLB miss on load/fetch.
    TlbL,
    /// TLB miss on store.
    TlbS,
    /// Address error, load/fetch. Carries the faulting virtual address.
    AdEL(u32),
    /// Address error, store. Carries the faulting virtual address.
    AdES(u32),
    /// Syscall.
    Sys,
    /// Breakpoint (`break`/`sdbbp`).
    Bp,
    /// Reserved instruction.
    Ri,
    /// Coprocessor unusable.
    CpU,
    /// Arithmetic overflow.
    Ov,
    /// Trap (`tne`, ...).
    Tr,
}

impl Exception {
    /// `Cause.ExcCode`, per the MIPS32 architecture manual.
    pub fn code(&self) -> u8 {
        match self {
            Exception::Int => 0,
            Exception::Mod => 1,
            Exception::TlbL => 2,
            Exception::TlbS => 3,
            Exception::AdEL(_) => 4,
            Exception::AdES(_) => 5,
            Exception::Sys => 8,
            Exception::Bp => 9,
            Exception::Ri => 10,
            Exception::CpU => 11,
            Exception::Ov => 12,
            Exception::Tr => 13,
        }
    }

    /// `BadVAddr` value, for the exceptions that set it.
    pub fn bad_vaddr(&self) -> Option<u32> {
        match self {
            Exception::AdEL(a) | Exception::AdES(a) => Some(*a),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Exception::Int => "Int",
            Exception::Mod => "Mod",
            Exception::TlbL => "TLBL",
            Exception::TlbS => "TLBS",
            Exception::AdEL(_) => "AdEL",
            Exception::AdES(_) => "AdES",
            Exception::Sys => "Sys",
            Exception::Bp => "Bp",
            Exception::Ri => "RI",
            Exception::CpU => "CpU",
            Exception::Ov => "Ov",
            Exception::Tr => "Tr",
        }
    }
}
