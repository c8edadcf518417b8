//! Discrete commands delivered from outside the page, e.g. a context-menu
//! action routed through the host messaging channel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    /// Translate `text` and splice the result over the active field's
    /// current selection.
    Replace { text: String },
    /// Translate `text` and put the result on the clipboard.
    Copy { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_host_message_shape() {
        let cmd: Command =
            serde_json::from_str(r#"{"type":"replace","text":"hello"}"#).unwrap();
        assert_eq!(cmd, Command::Replace { text: "hello".to_string() });

        let cmd: Command = serde_json::from_str(r#"{"type":"copy","text":"狐"}"#).unwrap();
        assert_eq!(cmd, Command::Copy { text: "狐".to_string() });
    }

    #[test]
    fn unknown_command_types_are_rejected() {
        assert!(serde_json::from_str::<Command>(r#"{"type":"shout","text":"hi"}"#).is_err());
    }
}
