use thiserror::Error;

/// Outcome of validating the recipient field of a kudos submission.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MentionError {
    #[error("no user mention found in recipient field")]
    MissingMention,
    #[error("expected exactly one user mention in recipient field, found {0}")]
    TooManyMentions(usize),
}

impl MentionError {
    /// Text shown under the recipient input when the modal is re-prompted.
    pub fn field_message(&self) -> String {
        match self {
            Self::MissingMention => "Please @mention the coworker you want to thank.".to_owned(),
            Self::TooManyMentions(count) => {
                format!("Please mention only one coworker (found {count}).")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::MentionError;

    #[test]
    fn too_many_mentions_message_states_the_count() {
        assert_eq!(
            MentionError::TooManyMentions(3).field_message(),
            "Please mention only one coworker (found 3)."
        );
        assert!(MentionError::TooManyMentions(3).to_string().contains("found 3"));
    }

    #[test]
    fn missing_mention_asks_for_a_coworker() {
        assert_eq!(
            MentionError::MissingMention.field_message(),
            "Please @mention the coworker you want to thank."
        );
    }
}
