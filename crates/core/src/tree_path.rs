//! Materialized tree paths.
//!
//! Each page's path is its parent's path plus one fixed-width step encoded
//! in base 36 (`0001`, `0002`, ... `ZZZZ`). Lexicographic path order is
//! depth-first tree order, so a sorted path index answers ancestor,
//! descendant and sibling queries with prefix scans.

use crate::error::CoreError;

/// Characters per path step.
pub const STEP_LEN: usize = 4;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Largest step value that fits in [`STEP_LEN`] base-36 digits.
pub const MAX_STEP: u64 = 36u64.pow(STEP_LEN as u32) - 1;

/// Encode a step number (1-based) as a fixed-width base-36 string.
pub fn encode_step(n: u64) -> Result<String, CoreError> {
    if n == 0 || n > MAX_STEP {
        return Err(CoreError::ConstraintViolation(format!(
            "Path step {n} is outside 1..={MAX_STEP}"
        )));
    }
    let mut digits = [b'0'; STEP_LEN];
    let mut rest = n;
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(rest % 36) as usize];
        rest /= 36;
    }
    Ok(digits.iter().map(|&b| b as char).collect())
}

/// Decode one fixed-width step.
pub fn decode_step(step: &str) -> Result<u64, CoreError> {
    if step.len() != STEP_LEN {
        return Err(CoreError::Validation(format!(
            "Path step '{step}' must be {STEP_LEN} characters"
        )));
    }
    step.bytes().try_fold(0u64, |acc, b| {
        let digit = ALPHABET
            .iter()
            .position(|&a| a == b)
            .ok_or_else(|| CoreError::Validation(format!("Invalid path step '{step}'")))?;
        Ok(acc * 36 + digit as u64)
    })
}

/// Check that a path is a non-empty sequence of valid steps.
pub fn validate_path(path: &str) -> Result<(), CoreError> {
    if !path.is_ascii() {
        return Err(CoreError::Validation(format!(
            "Path '{path}' must contain only base-36 characters"
        )));
    }
    if path.is_empty() || path.len() % STEP_LEN != 0 {
        return Err(CoreError::Validation(format!(
            "Path '{path}' must be a non-empty multiple of {STEP_LEN} characters"
        )));
    }
    for i in (0..path.len()).step_by(STEP_LEN) {
        decode_step(&path[i..i + STEP_LEN])?;
    }
    Ok(())
}

/// Depth implied by a path (the root has depth 1).
pub fn depth_of(path: &str) -> i32 {
    (path.len() / STEP_LEN) as i32
}

/// Path of the parent, or `None` for a root path.
pub fn parent_path(path: &str) -> Option<&str> {
    if path.len() <= STEP_LEN {
        None
    } else {
        Some(&path[..path.len() - STEP_LEN])
    }
}

/// Path of the first root node.
pub fn root_path() -> String {
    "0".repeat(STEP_LEN - 1) + "1"
}

/// Path for a new last child of `parent`, after `last_child` if any.
pub fn next_child_path(parent: &str, last_child: Option<&str>) -> Result<String, CoreError> {
    let next = match last_child {
        Some(last) => decode_step(&last[last.len() - STEP_LEN..])? + 1,
        None => 1,
    };
    Ok(format!("{parent}{}", encode_step(next)?))
}

/// True when `path` lies strictly below `ancestor`.
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len() && path.starts_with(ancestor)
}

/// Replace the `old_prefix` of `path` with `new_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> String {
    format!("{new_prefix}{}", &path[old_prefix.len()..])
}
