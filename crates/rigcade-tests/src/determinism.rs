//! Determinism checks for serialized engine output.
//!
//! Rigcade promises that identical inputs give byte-identical skeletons,
//! timelines, and project documents. [`verify_determinism`] runs a producer
//! several times and reports where the outputs first diverge.

use std::fmt;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    /// First divergence, if any.
    pub diff_info: Option<DiffInfo>,
}

/// Where two runs first disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    /// Byte offset of the first difference.
    pub offset: usize,
    /// Which run (0-indexed) diverged from run 0.
    pub run_index: usize,
    /// Text around the offset in run 0.
    pub expected: String,
    /// Text around the offset in the diverging run.
    pub actual: String,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {} differs at byte {}:\n  expected: ...{}...\n  actual:   ...{}...",
            self.run_index, self.offset, self.expected, self.actual
        )
    }
}

impl DeterminismResult {
    /// Panic with the first divergence if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output after {} runs (hash {}):\n{}",
                self.runs, self.hash, diff
            );
        }
    }
}

/// BLAKE3 hex digest of some bytes.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Runs `produce` `runs` times and compares every output with the first.
pub fn verify_determinism<F, O>(produce: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = produce();
    let reference = reference.as_ref();
    let hash = compute_hash(reference);

    for run_index in 1..runs {
        let output = produce();
        if let Some(diff) = first_difference(reference, output.as_ref(), run_index) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                hash,
                diff_info: Some(diff),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        hash,
        diff_info: None,
    }
}

const EXCERPT_RADIUS: usize = 24;

fn first_difference(expected: &[u8], actual: &[u8], run_index: usize) -> Option<DiffInfo> {
    let offset = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))?;
    Some(DiffInfo {
        offset,
        run_index,
        expected: excerpt(expected, offset),
        actual: excerpt(actual, offset),
    })
}

fn excerpt(data: &[u8], offset: usize) -> String {
    let start = offset.saturating_sub(EXCERPT_RADIUS);
    let end = (offset + EXCERPT_RADIUS).min(data.len());
    String::from_utf8_lossy(&data[start.min(end)..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_identical_outputs() {
        let result = verify_determinism(|| b"{\"bones\":[]}".to_vec(), 3);
        assert!(result.is_deterministic);
        assert_eq!(result.hash, compute_hash(b"{\"bones\":[]}"));
        result.assert_deterministic();
    }

    #[test]
    fn test_reports_first_difference() {
        let counter = Cell::new(0);
        let result = verify_determinism(
            || {
                counter.set(counter.get() + 1);
                format!("{{\"run\":{}}}", counter.get().min(2))
            },
            3,
        );
        assert!(!result.is_deterministic);
        let diff = result.diff_info.unwrap();
        assert_eq!(diff.offset, 7);
        assert_eq!(diff.run_index, 1);
        assert!(diff.expected.contains("1"));
        assert!(diff.actual.contains("2"));
    }

    #[test]
    fn test_length_mismatch_is_a_difference() {
        let diff = first_difference(b"abc", b"abcd", 1).unwrap();
        assert_eq!(diff.offset, 3);
        assert_eq!(diff.expected, "abc");
        assert_eq!(diff.actual, "abcd");
    }

    #[test]
    #[should_panic(expected = "Non-deterministic")]
    fn test_assert_panics_on_difference() {
        let counter = Cell::new(0u8);
        verify_determinism(
            || {
                counter.set(counter.get() + 1);
                vec![counter.get()]
            },
            2,
        )
        .assert_deterministic();
    }
}
