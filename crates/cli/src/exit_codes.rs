//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Domain    | Description                                   |
//! |------|-----------|-----------------------------------------------|
//! | 0    | Universal | Success (skipped clients do not change this)  |
//! | 1    | Universal | General error (unspecified)                   |
//! | 2    | Universal | CLI usage error (bad args, missing file)      |
//! | 3    | config    | Configuration failed to parse or validate     |
//! | 4    | run       | One or more clients failed                    |
//! | 5    | run       | Clients root missing or unreadable            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant with the next free code
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing config file, unknown client name.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Config (3)
// =============================================================================

/// TOML parse error or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

// =============================================================================
// Run (4-5)
// =============================================================================

/// At least one client failed. Every other client was still processed
/// and its reports written.
pub const EXIT_CLIENT_FAILED: u8 = 4;

/// The clients root does not exist or cannot be listed.
pub const EXIT_ROOT_UNREADABLE: u8 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let mut codes = vec![
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_INVALID_CONFIG,
            EXIT_CLIENT_FAILED,
            EXIT_ROOT_UNREADABLE,
        ];
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 6);
    }
}
