use derive_more::Display;

/// Where the index is in its lifecycle.
///
/// `NotLoaded → Loading → Loaded` on success; `Loading → NotLoaded` on
/// failure, so the next load retries from scratch.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    #[display("not loaded")]
    NotLoaded,
    #[display("loading")]
    Loading,
    #[display("loaded")]
    Loaded,
}

/// Snapshot of the index load state and the most recent load failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStatus {
    pub state: LoadState,
    /// Message of the last failed load. Cleared when a new load starts.
    pub error: Option<String>,
}

/// What a [`load_index`](crate::DocumentCache::load_index) call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// This call fetched the index; it holds this many records.
    Fetched(usize),
    /// The index was already loaded; nothing was fetched.
    AlreadyLoaded,
    /// Another call is loading the index right now; nothing was fetched.
    InProgress,
}
