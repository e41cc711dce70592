//! Environment-variable runtime configuration.
//!
//! ## Variables
//!
//! - `TRELLIS_STACK_SIZE`: coroutine stack size in bytes, decimal or
//!   `0x`-prefixed hex (default `0x4000`, 16 KiB). Total virtual memory is
//!   stack size × concurrent coroutines; tune for handler depth.
//! - `TRELLIS_DEBUG`: `1`/`true`/`yes` exposes error cause chains in
//!   rendered error bodies. Leave off in production.

use std::env;

/// Runtime configuration loaded once at startup.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Coroutine stack size in bytes.
    pub stack_size: usize,
    /// Render error causes in response bodies.
    pub debug: bool,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let stack_size = match env::var("TRELLIS_STACK_SIZE") {
            Ok(val) => parse_size(&val).unwrap_or(0x4000),
            Err(_) => 0x4000,
        };
        let debug = env::var("TRELLIS_DEBUG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        RuntimeConfig { stack_size, debug }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_accepts_decimal_and_hex() {
        assert_eq!(parse_size("16384"), Some(16384));
        assert_eq!(parse_size("0x4000"), Some(16384));
        assert_eq!(parse_size("bogus"), None);
    }
}
