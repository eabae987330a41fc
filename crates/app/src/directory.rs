//! Device directory — the set of node names discovered at startup.
//!
//! The bridge task owns discovery and publishes an immutable snapshot over a
//! [`watch`] channel; the router only ever reads the latest snapshot.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;

/// Immutable set of known node names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDirectory(Arc<BTreeSet<String>>);

impl DeviceDirectory {
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self(Arc::new(names.into_iter().collect()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Writing half, held by the bridge task.
pub type DirectoryPublisher = watch::Sender<DeviceDirectory>;

/// Reading half, held by the router.
pub type DirectoryReader = watch::Receiver<DeviceDirectory>;

/// Create a channel whose initial snapshot is empty (every node unknown).
#[must_use]
pub fn channel() -> (DirectoryPublisher, DirectoryReader) {
    watch::channel(DeviceDirectory::default())
}
