/// Outcome of a call to an external collaborator whose failure the pipeline
/// tolerates. Failures carry the reason so they can be logged and counted
/// before a default is substituted.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Succeeded(T),
    Failed { reason: String },
}

impl<T> Attempt<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Attempt::Failed { .. })
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Attempt::Succeeded(_) => None,
            Attempt::Failed { reason } => Some(reason),
        }
    }

    /// The value, or `fallback` when the call failed.
    pub fn or_substitute(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Attempt::Succeeded(value) => value,
            Attempt::Failed { .. } => fallback(),
        }
    }
}

impl<T> From<anyhow::Result<T>> for Attempt<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => Attempt::Succeeded(value),
            Err(e) => Attempt::Failed {
                reason: format!("{:#}", e),
            },
        }
    }
}
