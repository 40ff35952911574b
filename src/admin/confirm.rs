//! Confirmation Port
//!
//! Destructive admin actions ask before they run. The dashboard shows a
//! modal; the CLI asks on stdin; tests answer directly.

use async_trait::async_trait;

/// What to ask the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub text: Option<String>,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl ConfirmPrompt {
    /// Prompt with the usual "Supprimer" / "Annuler" buttons
    pub fn delete(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: None,
            confirm_label: "Supprimer".to_string(),
            cancel_label: "Annuler".to_string(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[async_trait]
pub trait Confirm: Send + Sync {
    /// True when the user accepted
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Answers every prompt with the same value (`--yes`, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl Confirm for FixedAnswer {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        tracing::debug!(title = %prompt.title, answer = self.0, "Confirmation answered automatically");
        self.0
    }
}
