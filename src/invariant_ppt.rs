//! PPT Invariant System: runtime invariant enforcement with contract tracking.
//!
//! Pipeline stages call [`assert_invariant`] at the points where a structural
//! guarantee must hold. With the `ppt` feature the id is also recorded in a
//! process-wide log, so contract tests can prove the check actually ran.

#[cfg(feature = "ppt")]
use lazy_static::lazy_static;
#[cfg(feature = "ppt")]
use std::collections::HashSet;
#[cfg(feature = "ppt")]
use std::sync::Mutex;

pub const INPUT_BOUNDED: u32 = 1;
pub const OUTPUT_BOUNDED: u32 = 2;
pub const LEVEL_IN_RANGE: u32 = 3;
pub const EXPANSION_CONTIGUOUS: u32 = 4;
pub const SHOUT_PROMOTION: u32 = 5;
pub const MARKUP_STRIPPED: u32 = 6;
pub const TICK_SINGLE_POP: u32 = 7;
pub const BACKEND_SELECTED: u32 = 8;
pub const CONFIG_VALID: u32 = 9;
pub const RATE_WINDOW_PRUNED: u32 = 10;

#[cfg(feature = "ppt")]
lazy_static! {
    static ref INVARIANT_LOG: Mutex<HashSet<u32>> = Mutex::new(HashSet::new());
}

#[cfg(feature = "ppt")]
/// Assert an invariant: logs it and panics on failure.
pub(crate) fn assert_invariant(
    id: u32,
    condition: bool,
    message: &str,
    context: Option<&str>,
) {
    if !condition {
        let full_message = if let Some(ctx) = context {
            format!("Invariant {} failed: {} (context: {})", id, message, ctx)
        } else {
            format!("Invariant {} failed: {}", id, message)
        };
        tracing::error!(invariant = id, "{}", full_message);
        panic!("{}", full_message);
    }
    INVARIANT_LOG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(id);
}

#[cfg(not(feature = "ppt"))]
/// Assert an invariant: checks condition and panics on failure.
pub(crate) fn assert_invariant(
    _id: u32,
    condition: bool,
    message: &str,
    _context: Option<&str>,
) {
    if !condition {
        panic!("Invariant failed: {}", message);
    }
}

#[cfg(feature = "ppt")]
/// Contract test: checks that specified invariants were asserted.
pub fn contract_test(test_name: &str, required_invariants: &[u32]) {
    let log = INVARIANT_LOG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let missing: Vec<&str> = required_invariants
        .iter()
        .filter(|inv| !log.contains(inv))
        .map(|&inv| invariant_name(inv))
        .collect();
    drop(log);
    if !missing.is_empty() {
        panic!(
            "Contract test '{}' failed: invariants not enforced: {:?}",
            test_name, missing
        );
    }
}

#[cfg(not(feature = "ppt"))]
/// Contract test: no-op when PPT feature is disabled.
pub fn contract_test(_test_name: &str, _required_invariants: &[u32]) {}

#[cfg(feature = "ppt")]
/// Clear invariant log (for between test runs).
pub fn clear_invariant_log() {
    INVARIANT_LOG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clear();
}

#[cfg(not(feature = "ppt"))]
/// Clear invariant log: no-op when PPT feature is disabled.
pub fn clear_invariant_log() {}

/// Maps an invariant id to a readable name (diagnostics only).
pub const fn invariant_name(id: u32) -> &'static str {
    match id {
        INPUT_BOUNDED => "INPUT_BOUNDED",
        OUTPUT_BOUNDED => "OUTPUT_BOUNDED",
        LEVEL_IN_RANGE => "LEVEL_IN_RANGE",
        EXPANSION_CONTIGUOUS => "EXPANSION_CONTIGUOUS",
        SHOUT_PROMOTION => "SHOUT_PROMOTION",
        MARKUP_STRIPPED => "MARKUP_STRIPPED",
        TICK_SINGLE_POP => "TICK_SINGLE_POP",
        BACKEND_SELECTED => "BACKEND_SELECTED",
        CONFIG_VALID => "CONFIG_VALID",
        RATE_WINDOW_PRUNED => "RATE_WINDOW_PRUNED",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_invariant_pass() {
        assert_invariant(LEVEL_IN_RANGE, 1 + 1 == 2, "Math works", Some("basic"));
    }

    #[test]
    #[should_panic(expected = "Math broken")]
    fn test_assert_invariant_fail() {
        assert_invariant(0, 1 + 1 == 3, "Math broken", None);
    }

    #[test]
    fn test_contract_test() {
        assert_invariant(CONFIG_VALID, true, "logged", None);
        contract_test("example", &[CONFIG_VALID]);
    }

    #[cfg(feature = "ppt")]
    #[test]
    #[should_panic(expected = "invariants not enforced")]
    fn test_contract_test_reports_missing() {
        contract_test("never asserted", &[9999]);
    }

    #[test]
    fn test_invariant_names() {
        assert_eq!(invariant_name(SHOUT_PROMOTION), "SHOUT_PROMOTION");
        assert_eq!(invariant_name(LEVEL_IN_RANGE), "LEVEL_IN_RANGE");
        assert_eq!(invariant_name(9999), "UNKNOWN");
    }
}
