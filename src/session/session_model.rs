use serde::{Deserialize, Serialize};

/// Outcome of a session mutation. Mutations that need a loaded month resolve
/// to `NoMonthLoaded` instead of failing: "nothing to mutate yet" is a
/// permissive policy of the store, not an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SessionUpdate<T> {
    /// The mutation was persisted and the working set reflects it
    Applied(T),
    /// No month is loaded; nothing was persisted
    NoMonthLoaded,
    /// The remote mutation succeeded but the id was absent from the working
    /// set, which was left unchanged
    NotFoundLocally(T),
}

impl<T> SessionUpdate<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, SessionUpdate::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            SessionUpdate::Applied(value) => Some(value),
            _ => None,
        }
    }
}
