// ── Reactive resource stores ──
//
// Per-endpoint CRUD state with push-based change notification.

mod resource;

pub use resource::{ResourceState, ResourceStore};
