use serde::{Deserialize, Serialize};

/// A kind of kudos, shown in the modal dropdown as `"{emoji} {title}"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recognition {
    pub key: String,
    pub title: String,
    pub emoji: String,
}

impl Recognition {
    pub fn new(key: impl Into<String>, title: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self { key: key.into(), title: title.into(), emoji: emoji.into() }
    }

    /// Used when a submission names a key the catalog does not know.
    pub fn fallback() -> Self {
        Self::new("team_member", "Team Member", "👏")
    }

    pub fn option_label(&self) -> String {
        format!("{} {}", self.emoji, self.title)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionCatalog {
    entries: Vec<Recognition>,
}

impl Default for RecognitionCatalog {
    fn default() -> Self {
        Self::new(vec![
            Recognition::new("silent_soldier", "Silent Soldier", "🥷"),
            Recognition::new("helping_hand", "Helping Hand", "🤝"),
            Recognition::new("innovation_guru", "Innovation Guru", "💡"),
            Recognition::new("fast_learner", "Fast Learner", "🚀"),
            Recognition::new("problem_solver", "Problem Solver", "🎯"),
            Recognition::new("team_player", "Team Player", "🤝"),
        ])
    }
}

impl RecognitionCatalog {
    pub fn new(entries: Vec<Recognition>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Recognition> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn lookup(&self, key: &str) -> Recognition {
        self.get(key).cloned().unwrap_or_else(Recognition::fallback)
    }

    pub fn entries(&self) -> &[Recognition] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
