//! Command-line surface (§1.1/§6): a `clap`-derived struct instead of a
//! hand-rolled `env::args()` loop.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::soc::SocVariant;

/// Which benchmark family to boot, selecting the SoC device map (§4.6/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageCode {
    /// Bare functional-correctness benchmark: RAM + boot ROM only, ends at a
    /// fixed terminal PC.
    Func,
    /// Performance benchmark, same device map as `func`.
    Perf,
    /// U-Boot-style image: adds the config-register switch and UART.
    Boot,
    /// A booted kernel image: `boot`'s device map with expanded RAM.
    Kernel,
}

impl ImageCode {
    pub fn soc_variant(self) -> SocVariant {
        match self {
            ImageCode::Func | ImageCode::Perf => SocVariant::Basic,
            ImageCode::Boot => SocVariant::Boot,
            ImageCode::Kernel => SocVariant::Kernel,
        }
    }

    /// `func`/`perf` benchmarks run to a fixed terminal PC; `boot`/`kernel`
    /// images have no such address and end via trap, SIGINT, or `--max-ticks`.
    pub fn terminal_pc(self) -> Option<u32> {
        match self {
            ImageCode::Func | ImageCode::Perf => Some(0xBFC0_0100),
            ImageCode::Boot | ImageCode::Kernel => None,
        }
    }
}

/// Differential co-simulation harness for a MIPS32 CPU.
#[derive(Debug, Parser)]
#[command(name = "hitd", version, about)]
pub struct Cli {
    /// Benchmark family, selecting the SoC device map.
    #[arg(long, value_enum)]
    pub image_code: ImageCode,

    /// Path to the raw binary image, loaded at the reset vector.
    pub image: PathBuf,

    /// Newline-delimited `start,end,name` symbol table for ftrace.
    #[arg(long)]
    pub symbols: Option<PathBuf>,

    /// Directory to write waveform/trace output under (falls back to
    /// `$HITD_HOME/vlogs/wave`, then `./vlogs/wave`).
    #[arg(long)]
    pub wave: Option<PathBuf>,

    /// Log verbosity; falls back to `RUST_LOG` when unset.
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Stop the run after this many retires even if neither side ended,
    /// useful for CI smoke runs on a stuck image. Exit code 0.
    #[arg(long)]
    pub max_ticks: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Resolves the wave output directory per §6's environment contract.
pub fn wave_dir(cli: &Cli) -> PathBuf {
    if let Some(dir) = &cli.wave {
        return dir.clone();
    }
    match std::env::var_os("HITD_HOME") {
        Some(home) => PathBuf::from(home).join("vlogs").join("wave"),
        None => PathBuf::from("./vlogs/wave"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn func_and_perf_share_the_basic_device_map_and_terminal_pc() {
        assert_eq!(ImageCode::Func.soc_variant(), SocVariant::Basic);
        assert_eq!(ImageCode::Perf.soc_variant(), SocVariant::Basic);
        assert_eq!(ImageCode::Func.terminal_pc(), Some(0xBFC0_0100));
    }

    #[test]
    fn boot_and_kernel_have_no_fixed_terminal_pc() {
        assert_eq!(ImageCode::Boot.terminal_pc(), None);
        assert_eq!(ImageCode::Kernel.terminal_pc(), None);
    }

    #[test]
    fn wave_dir_falls_back_through_flag_then_env_then_cwd() {
        let cli = Cli {
            image_code: ImageCode::Func,
            image: PathBuf::from("a.bin"),
            symbols: None,
            wave: Some(PathBuf::from("/tmp/explicit")),
            log_level: LogLevel::Info,
            max_ticks: None,
        };
        assert_eq!(wave_dir(&cli), PathBuf::from("/tmp/explicit"));
    }

    #[test]
    fn parses_required_flags_from_argv() {
        let cli = Cli::parse_from(["hitd", "--image-code", "boot", "image.bin"]);
        assert_eq!(cli.image_code, ImageCode::Boot);
        assert_eq!(cli.image, PathBuf::from("image.bin"));
        assert_eq!(cli.log_level, LogLevel::Info);
    }
}
