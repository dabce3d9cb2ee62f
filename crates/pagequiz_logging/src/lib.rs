#![deny(missing_docs)]
//! Shared logging utilities for the page quiz workspace.
//!
//! Every crate logs through the `quiz_*` macros below so the backend can be
//! swapped in one place. Secrets (API keys) must go through
//! [`redact_secret`] before they reach a log line.

/// Number of leading characters of a secret that may appear in logs.
pub const REDACTED_PREFIX_CHARS: usize = 4;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! quiz_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! quiz_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! quiz_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! quiz_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! quiz_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Shortens a secret to a loggable hint.
///
/// Empty secrets render as `<unset>`. Secrets no longer than
/// [`REDACTED_PREFIX_CHARS`] are hidden entirely; longer ones keep that many
/// leading characters followed by an ellipsis.
pub fn redact_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    if secret.chars().count() <= REDACTED_PREFIX_CHARS {
        return "…".to_string();
    }
    let prefix: String = secret.chars().take(REDACTED_PREFIX_CHARS).collect();
    format!("{prefix}…")
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::redact_secret;

    #[test]
    fn redaction_keeps_short_prefix_only() {
        assert_eq!(redact_secret("AIzaSyExampleKey"), "AIza…");
        assert_eq!(redact_secret("ab"), "…");
        assert_eq!(redact_secret("abcd"), "…");
        assert_eq!(redact_secret("abcde"), "abcd…");
        assert_eq!(redact_secret(""), "<unset>");
    }
}
