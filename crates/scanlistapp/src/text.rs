use crate::model::{Candidate, PendingBatch};

pub const TEXT_SEPARATOR: &str = "\n";

/// Candidate values in capture order, one per line, no trailing newline.
pub fn joined_text(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| c.value.as_str())
        .collect::<Vec<_>>()
        .join(TEXT_SEPARATOR)
}

/// Text to insert for a drained batch, or `None` if there is nothing to type.
pub fn batch_text(batch: &PendingBatch) -> Option<String> {
    if batch.is_empty() {
        None
    } else {
        Some(joined_text(&batch.candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_in_capture_order() {
        let candidates = vec![Candidate::new("A", None), Candidate::new("B", None)];
        assert_eq!(joined_text(&candidates), "A\nB");
    }

    #[test]
    fn single_and_empty() {
        assert_eq!(joined_text(&[Candidate::new("only", None)]), "only");
        assert_eq!(joined_text(&[]), "");
        assert_eq!(batch_text(&PendingBatch::default()), None);
    }
}
