//! Two-state capability handle with lazy, cached acquisition.

use std::sync::OnceLock;

use super::InferenceError;

/// Whether a remote capability can be used
#[derive(Debug, Clone)]
pub enum Capability<T> {
    /// Ready to invoke
    Available(T),
    /// Not usable; the reason is kept for logs and diagnostics
    Unavailable(String),
}

impl<T> Capability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    /// Why the capability is unavailable
    pub fn reason(&self) -> Option<&str> {
        match self {
            Capability::Available(_) => None,
            Capability::Unavailable(reason) => Some(reason),
        }
    }
}

impl<T> From<Result<T, InferenceError>> for Capability<T> {
    fn from(result: Result<T, InferenceError>) -> Self {
        match result {
            Ok(handle) => Capability::Available(handle),
            Err(InferenceError::Unavailable(reason)) => Capability::Unavailable(reason),
            Err(err) => Capability::Unavailable(err.to_string()),
        }
    }
}

type Acquire<T> = Box<dyn Fn() -> Result<T, InferenceError> + Send + Sync>;

/// A capability acquired on first use and cached afterwards
///
/// Acquisition runs at most once; a failure is remembered for the lifetime of
/// the owner and is not retried.
pub struct LazyCapability<T> {
    label: &'static str,
    acquire: Option<Acquire<T>>,
    cell: OnceLock<Capability<T>>,
}

impl<T> LazyCapability<T> {
    /// Acquire with `acquire` on first use
    pub fn new<F>(label: &'static str, acquire: F) -> Self
    where
        F: Fn() -> Result<T, InferenceError> + Send + Sync + 'static,
    {
        Self {
            label,
            acquire: Some(Box::new(acquire)),
            cell: OnceLock::new(),
        }
    }

    /// Already acquired
    pub fn available(label: &'static str, handle: T) -> Self {
        Self {
            label,
            acquire: None,
            cell: OnceLock::from(Capability::Available(handle)),
        }
    }

    /// Known to be unusable
    pub fn unavailable(label: &'static str, reason: impl Into<String>) -> Self {
        Self {
            label,
            acquire: None,
            cell: OnceLock::from(Capability::Unavailable(reason.into())),
        }
    }

    /// Whether acquisition has already happened
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The cached capability, acquiring it first if needed
    pub fn get(&self) -> &Capability<T> {
        self.cell.get_or_init(|| {
            let capability: Capability<T> = match &self.acquire {
                Some(acquire) => acquire().into(),
                None => Capability::Unavailable("no acquisition configured".to_string()),
            };

            match capability.reason() {
                None => tracing::info!("{} ready", self.label),
                Some(reason) => tracing::warn!(
                    "{} unavailable ({}); using offline fallback",
                    self.label,
                    reason
                ),
            }

            capability
        })
    }
}

impl<T> std::fmt::Debug for LazyCapability<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.cell.get() {
            None => "pending",
            Some(Capability::Available(_)) => "available",
            Some(Capability::Unavailable(_)) => "unavailable",
        };
        f.debug_struct("LazyCapability")
            .field("label", &self.label)
            .field("state", &state)
            .finish()
    }
}
