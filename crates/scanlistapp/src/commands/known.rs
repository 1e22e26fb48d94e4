use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::handoff::backend::HandoffBackend;
use crate::handoff::HandoffChannel;
use crate::model::require_non_empty;

pub fn list<H: HandoffBackend>(handoff: &HandoffChannel<H>) -> CmdResult {
    let names = handoff.known_list_ids();
    let mut result = CmdResult::default();
    if names.is_empty() {
        result.add_message(CmdMessage::info("No known lists."));
    }
    result.with_names(names)
}

pub fn add<H: HandoffBackend>(handoff: &HandoffChannel<H>, name: &str) -> Result<CmdResult> {
    let name = require_non_empty(name, "name")?;
    handoff.add_known_list_id(&name);
    let mut result = CmdResult::default().with_names(handoff.known_list_ids());
    result.add_message(CmdMessage::success(format!("'{}' is a known list", name)));
    Ok(result)
}

pub fn remove<H: HandoffBackend>(handoff: &HandoffChannel<H>, name: &str) -> CmdResult {
    handoff.remove_known_list_id(name);
    let mut result = CmdResult::default().with_names(handoff.known_list_ids());
    result.add_message(CmdMessage::success(format!("'{}' is no longer a known list", name.trim())));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::mem_handoff::MemHandoff;

    #[test]
    fn add_remove_list() {
        let handoff = HandoffChannel::new(MemHandoff::new());
        add(&handoff, "B").unwrap();
        add(&handoff, "A").unwrap();
        assert!(add(&handoff, " ").is_err());

        assert_eq!(list(&handoff).names, vec!["A", "B"]);
        assert_eq!(remove(&handoff, "A").names, vec!["B"]);
        assert_eq!(remove(&handoff, "absent").names, vec!["B"]);
    }
}
