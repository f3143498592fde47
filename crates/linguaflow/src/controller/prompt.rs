use anyhow::Result;

/// Question asked before a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    DeleteItem,
    ClearHistory,
    ClearSaved,
}

impl Confirmation {
    /// Message key for localised rendering.
    pub fn message_key(self) -> &'static str {
        match self {
            Confirmation::DeleteItem => "confirm.delete_item",
            Confirmation::ClearHistory => "confirm.clear_history",
            Confirmation::ClearSaved => "confirm.clear_saved",
        }
    }
}

/// Blocking yes/no question asked before destructive actions.
pub trait Prompt {
    fn confirm(&self, question: Confirmation) -> Result<bool>;
}

/// Answers every question the same way; backs the CLI's `--yes` flag.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Prompt for FixedAnswer {
    fn confirm(&self, _question: Confirmation) -> Result<bool> {
        Ok(self.0)
    }
}
