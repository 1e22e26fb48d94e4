use crate::commands::{CmdMessage, CmdResult};
use crate::config::ScanlistConfig;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Template,
}

pub fn run(config: &ScanlistConfig, action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::ShowAll => CmdResult::default().with_config(config.clone()),
        ConfigAction::ShowKey(key) => {
            let mut result = CmdResult::default();
            match config.get(&key) {
                Some(value) => result.add_message(CmdMessage::info(value)),
                None => result.add_message(CmdMessage::warning(format!("Unknown config key: {}", key))),
            }
            result
        }
        ConfigAction::Template => CmdResult::default().with_text(ScanlistConfig::template()),
    }
}
