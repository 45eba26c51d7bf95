//! Binary image and symbol-table loading. Thin glue per §1: no ELF parsing
//! lives in this crate, only consumption of its already-decoded output.

use std::path::Path;

use thiserror::Error;

use crate::ftrace::SymTable;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read image {path}: {source}")]
    Image { path: String, #[source] source: std::io::Error },
    #[error("failed to read symbol table {path}: {source}")]
    Symbols { path: String, #[source] source: std::io::Error },
    #[error("malformed symbol table line {line}: {text:?}")]
    MalformedSymbolLine { line: usize, text: String },
}

/// Reads a raw binary image, to be copied into RAM at `RESET_VECTOR` by the
/// caller (mirrors the teacher's plain-copy `load_binary`).
pub fn load_image(path: &Path) -> Result<Vec<u8>, LoaderError> {
    std::fs::read(path).map_err(|source| LoaderError::Image {
        path: path.display().to_string(),
        source,
    })
}

/// Reads a newline-delimited `start,end,name` table (each field hex or
/// decimal, `start`/`end` accepting an optional `0x` prefix) into the
/// `(u32, u32, String)` shape `Ftracer` consumes directly.
pub fn load_symbols(path: &Path) -> Result<SymTable, LoaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoaderError::Symbols {
        path: path.display().to_string(),
        source,
    })?;

    let mut symbols = SymTable::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.splitn(3, ',').collect();
        let [start, end, name] = fields[..] else {
            return Err(LoaderError::MalformedSymbolLine { line: idx + 1, text: line.to_string() });
        };
        let parse = |s: &str| -> Option<u32> {
            let s = s.trim();
            s.strip_prefix("0x")
                .or_else(|| s.strip_prefix("0X"))
                .map(|hex| u32::from_str_radix(hex, 16).ok())
                .unwrap_or_else(|| s.parse().ok())
        };
        let (start, end) = match (parse(start), parse(end)) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(LoaderError::MalformedSymbolLine { line: idx + 1, text: line.to_string() }),
        };
        symbols.push((start, end, name.trim().to_string()));
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn scratch_file(contents: &[u8]) -> std::path::PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("hitd-loader-test-{}-{}", std::process::id(), n));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_a_raw_binary_image() {
        let path = scratch_file(&[0x01, 0x02, 0x03, 0x04]);
        let bytes = load_image(&path).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn parses_hex_and_decimal_symbol_fields() {
        let path = scratch_file(b"0xBFC00000,0xBFC00010,_start\n100,200,helper\n");
        let symbols = load_symbols(&path).unwrap();
        assert_eq!(symbols, vec![
            (0xBFC0_0000, 0xBFC0_0010, "_start".to_string()),
            (100, 200, "helper".to_string()),
        ]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let path = scratch_file(b"# comment\n\n0x0,0x4,main\n");
        let symbols = load_symbols(&path).unwrap();
        assert_eq!(symbols, vec![(0, 4, "main".to_string())]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn malformed_line_is_reported_with_its_number() {
        let path = scratch_file(b"0x0,0x4,main\nnot,a,,line\n");
        let err = load_symbols(&path).unwrap_err();
        assert!(matches!(err, LoaderError::MalformedSymbolLine { line: 2, .. }));
        std::fs::remove_file(path).ok();
    }
}
