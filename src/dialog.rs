//! Dialog overlay. The world keeps simulating underneath; the player is
//! blocked for the session's lifetime and released when the completion event
//! is consumed.

/// One running conversation. Advancing past the last line completes it.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogSession {
    /// Character index in the world, used to re-enable rotation afterwards
    pub character_index: usize,
    /// Trainer id of the speaking character
    pub trainer_id: String,
    lines: Vec<String>,
    index: usize,
}

/// Emitted exactly once, when the last line has been confirmed away.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogOutcome {
    pub character_index: usize,
    pub trainer_id: String,
}

impl DialogSession {
    pub fn new(character_index: usize, trainer_id: &str, lines: Vec<String>) -> Self {
        DialogSession {
            character_index,
            trainer_id: trainer_id.to_string(),
            lines,
            index: 0,
        }
    }

    /// The line currently on screen. Empty sessions complete on the first
    /// confirm without showing anything.
    pub fn current_line(&self) -> Option<&str> {
        self.lines.get(self.index).map(|s| s.as_str())
    }

    /// Advance on a confirm press. Returns the outcome once, when the
    /// session moves past its last line.
    pub fn advance(&mut self) -> Option<DialogOutcome> {
        self.index += 1;
        if self.index >= self.lines.len() {
            Some(DialogOutcome {
                character_index: self.character_index,
                trainer_id: self.trainer_id.clone(),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_advance_walks_lines_then_completes() {
        let mut session = DialogSession::new(
            0,
            "nurse",
            vec!["Welcome!".to_string(), "Rest up.".to_string()],
        );

        assert_eq!(session.current_line(), Some("Welcome!"));
        assert_eq!(session.advance(), None);
        assert_eq!(session.current_line(), Some("Rest up."));

        let outcome = session.advance().expect("last confirm completes");
        assert_eq!(outcome.trainer_id, "nurse");
        assert_eq!(session.current_line(), None);
    }
}
