//! Host-level error types (§1.1/§3/§7) — distinct from the architectural
//! `Exception` enum in `cpu::exception`, which is data handed to `CP0` and
//! is never a Rust `Err` once caught by `Interpreter::step`. `HarnessError`
//! is what the driver loop can encounter before a differential run even
//! starts: a bad image path, a malformed symbol table, or (in principle,
//! were the fixed SoC addresses ever made configurable) an overlapping
//! device range.

use thiserror::Error;

use crate::bus::BusError;
use crate::loader::LoaderError;

/// Unifies the module-local error enums into the one type the driver loop
/// propagates out of setup, before `main` turns it into an `anyhow::Error`
/// and a process exit code.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    /// Catch-all for a host-level fault that doesn't fit the two enums
    /// above — e.g. the §7 `Unrecoverable` category, or a failure to
    /// install the SIGINT handler.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_error_converts_via_from() {
        let bus_err = BusError::OutOfBound { addr: 0x4, size: 4 };
        let harness: HarnessError = bus_err.into();
        assert!(matches!(harness, HarnessError::Bus(_)));
    }

    #[test]
    fn other_formats_its_message_verbatim() {
        let err = HarnessError::Other("SIGINT handler already installed".to_string());
        assert_eq!(err.to_string(), "SIGINT handler already installed");
    }
}
