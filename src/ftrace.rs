//! Shadow call-stack tracer, grounded on `ftracer`/`mytrace.hpp`.
//!
//! Reporting only — a mismatch here never aborts the differential run, it
//! just degrades `callstack_info` to "???" for the frames above it.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FtraceError {
    #[error("return at {ret_at:#010x} with empty call stack")]
    EmptyStack { ret_at: u32 },
    #[error("return at {ret_at:#010x} expected {expected:#010x}, got {actual:#010x}")]
    Mismatch { ret_at: u32, expected: u32, actual: u32 },
}

/// `(start, end, name)`, sorted by `start`, non-overlapping — the thin
/// substitute for an ELF symbol table (parsed outside this crate).
pub type SymTable = Vec<(u32, u32, String)>;

pub struct Ftracer {
    symbols: SymTable,
    stack: Vec<u32>,
    unknown: &'static str,
}

impl Ftracer {
    pub fn new(mut symbols: SymTable) -> Self {
        symbols.sort_by_key(|(start, _, _)| *start);
        Ftracer {
            symbols,
            stack: Vec::new(),
            unknown: "???",
        }
    }

    fn search(&self, addr: u32) -> &str {
        let idx = match self.symbols.binary_search_by(|(start, _, _)| start.cmp(&addr)) {
            Ok(idx) => idx,
            Err(0) => return self.unknown,
            Err(idx) => idx - 1,
        };
        let (start, end, name) = &self.symbols[idx];
        if addr >= *start && addr <= *end {
            name
        } else {
            self.unknown
        }
    }

    /// `jal`/`jalr` retired at `call_at`; pushes the return address the
    /// matching `on_ret` must observe.
    pub fn on_call(&mut self, call_at: u32) {
        self.stack.push(call_at.wrapping_add(8));
    }

    /// `jr $31` retired at `ret_at`, jumping to `ret_to`.
    pub fn on_ret(&mut self, ret_at: u32, ret_to: u32) -> Result<(), FtraceError> {
        match self.stack.pop() {
            None => Err(FtraceError::EmptyStack { ret_at }),
            Some(expected) if expected != ret_to => Err(FtraceError::Mismatch {
                ret_at,
                expected,
                actual: ret_to,
            }),
            Some(_) => Ok(()),
        }
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn callstack_info(&self, pc: u32) -> String {
        let mut frames: Vec<&str> = self.stack.iter().map(|&addr| self.search(addr)).collect();
        frames.push(self.search(pc));
        frames.join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols() -> SymTable {
        vec![
            (0x1000, 0x1010, "main".to_string()),
            (0x2000, 0x2020, "helper".to_string()),
        ]
    }

    #[test]
    fn balanced_call_and_return() {
        let mut t = Ftracer::new(symbols());
        t.on_call(0x1004);
        assert!(t.on_ret(0x2010, 0x100C).is_ok());
    }

    #[test]
    fn unexpected_return_reports_mismatch_without_panicking() {
        let mut t = Ftracer::new(symbols());
        t.on_call(0x1004);
        let err = t.on_ret(0x2010, 0xDEAD).unwrap_err();
        assert!(matches!(err, FtraceError::Mismatch { .. }));
    }

    #[test]
    fn return_with_empty_stack_is_reported() {
        let mut t = Ftracer::new(symbols());
        let err = t.on_ret(0x1004, 0x2000).unwrap_err();
        assert!(matches!(err, FtraceError::EmptyStack { .. }));
    }

    #[test]
    fn callstack_info_resolves_known_and_unknown_frames() {
        let mut t = Ftracer::new(symbols());
        t.on_call(0x1004);
        let info = t.callstack_info(0x2008);
        assert_eq!(info, "main -> helper");
        assert_eq!(t.callstack_info(0x9999), "main -> ???");
    }
}
