//! # Item Providers
//!
//! Collaborator contract for sourcing a dispatcher's items from whatever is
//! "currently live" in the host instead of an explicit collection. The
//! provider hands back a snapshot; any filtering happens in the builder.

/// A source of all currently live items of type `T`.
///
/// Implementations return a snapshot owned by the caller; the dispatcher
/// never re-queries the provider after construction.
pub trait ItemProvider<T>: Send + Sync {
    /// All items live at the time of the call, in the provider's iteration
    /// order.
    fn live_items(&self) -> Vec<T>;
}
