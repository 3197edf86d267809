pub mod profile_handlers;

use std::sync::Arc;

use profiles_shared::images::KeyLayout;
use profiles_shared::queue::RelocationQueue;
use profiles_shared::store::ProfileStore;

/// Everything the profile handlers need, built once at start-up
pub struct AppState<S, Q>
where
    S: ProfileStore + ?Sized,
    Q: RelocationQueue + ?Sized,
{
    pub store: Arc<S>,
    pub queue: Arc<Q>,
    pub layout: KeyLayout,
    /// Prefix the API is mounted under, used for `Location` headers
    pub route_prefix: String,
}
