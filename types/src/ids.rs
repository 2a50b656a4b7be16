use std::fmt;

/// Identifies one deferred computation for logs and orphan reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct DeferredId(u64);

impl DeferredId {
    /// Id used for deferreds created already resolved, outside any executor.
    pub const DETACHED: Self = Self(0);

    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn is_detached(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DeferredId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            f.write_str("detached")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}
