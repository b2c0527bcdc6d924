//! Form payloads posted by the screens.

use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::{PostDraft, PostValidationError};

/// Title and content of the create and edit forms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    /// Raw title as typed.
    #[serde(default)]
    pub title: String,
    /// Raw markdown body as typed.
    #[serde(default)]
    pub content: String,
}

/// Field-level messages for a rejected [`PostForm`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFormErrors {
    /// Message shown under the title field.
    pub title: Option<String>,
    /// Message shown under the content field.
    pub content: Option<String>,
}

impl PostForm {
    /// Validate into a draft, collecting a message per offending field.
    pub fn to_draft(&self) -> Result<PostDraft, PostFormErrors> {
        PostDraft::try_from_parts(&self.title, &self.content).map_err(|first| {
            let mut errors = PostFormErrors::default();
            errors.record(&first);
            // The draft constructor stops at the first problem; check the
            // other field too so both messages show at once.
            if first.field() == "title" {
                errors.content = PostDraft::try_from_parts("-", &self.content)
                    .err()
                    .map(|other| other.to_string());
            }
            errors
        })
    }
}

impl PostFormErrors {
    fn record(&mut self, error: &PostValidationError) {
        let message = Some(error.to_string());
        match error.field() {
            "title" => self.title = message,
            _ => self.content = message,
        }
    }
}

/// Sign-in form.
#[derive(Deserialize)]
pub struct LoginForm {
    /// Email as typed; echoed back when sign-in fails.
    #[serde(default)]
    pub email: String,
    /// Password, never echoed back.
    #[serde(default)]
    pub password: Zeroizing<String>,
}

/// What the sign-up form's submit button asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupIntent {
    /// Register with the entered credentials.
    #[default]
    Create,
    /// Fill the form with a generated password.
    Generate,
}

/// Sign-up form.
#[derive(Deserialize)]
pub struct SignupForm {
    /// Email as typed.
    #[serde(default)]
    pub email: String,
    /// Chosen password.
    #[serde(default)]
    pub password: Zeroizing<String>,
    /// Which submit button was pressed.
    #[serde(default)]
    pub intent: SignupIntent,
}
