//! Host collaborator traits.
//!
//! This module defines the narrow interfaces through which the platform
//! host feeds the core and consumes its results. The core indexing, menu and
//! search logic interacts only through these traits, so all OS-specific code
//! (package managers, icon decoding, process launching) stays in backend
//! crates.
//!
//! ## Implementing a New Backend
//!
//! 1. Create a new crate (e.g., `radial-backend-android`)
//! 2. Implement `AppSource` to enumerate launchable activities
//! 3. Implement `IconDecoder` and `Launcher` if the host can decode icons and launch apps
//! 4. Hand them to an `IndexingCoordinator`

use crate::types::{AppIdentifier, IconHandle, RawIcon};

/// One launchable activity as reported by the host.
#[derive(Debug, Clone)]
pub struct LaunchableApp {
    /// Stable key of the activity
    pub identifier: AppIdentifier,

    /// Display label as loaded by the host
    pub label: String,

    /// Undecoded icon source
    pub icon: RawIcon,
}

impl LaunchableApp {
    pub fn new(identifier: AppIdentifier, label: impl Into<String>, icon: RawIcon) -> Self {
        LaunchableApp {
            identifier,
            label: label.into(),
            icon,
        }
    }
}

/// Host enumeration of launchable activities.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync`; enumeration runs on background
/// indexing tasks, never on the caller's thread.
pub trait AppSource: Send + Sync {
    /// Enumerate launchable activities, optionally restricted to one package.
    ///
    /// Implementations exclude nothing themselves; dropping the host's own
    /// package is the coordinator's job.
    fn enumerate(&self, package: Option<&str>) -> anyhow::Result<Vec<LaunchableApp>>;

    /// The device's default apps, in bootstrap priority order.
    ///
    /// Used only to seed an empty menu. The default is none.
    fn preferred_apps(&self) -> Vec<AppIdentifier> {
        Vec::new()
    }

    /// Get the backend name (e.g., "xdg", "android")
    fn name(&self) -> &'static str;
}

/// Turns an enumerated icon source into a displayable handle.
pub trait IconDecoder: Send + Sync {
    fn decode(&self, source: RawIcon) -> IconHandle;
}

/// Decoder that hands the icon source through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughIcons;

impl IconDecoder for PassthroughIcons {
    fn decode(&self, source: RawIcon) -> IconHandle {
        source.into_handle()
    }
}

/// Platform-specific app launch.
pub trait Launcher: Send + Sync {
    fn launch(&self, identifier: &AppIdentifier) -> anyhow::Result<()>;
}

/// Observer notified once after every completed indexing or removal pass.
///
/// Carries no payload; the observer re-reads the menu and store itself.
pub trait UpdateListener: Send + Sync {
    fn on_update(&self);
}

impl<F> UpdateListener for F
where
    F: Fn() + Send + Sync,
{
    fn on_update(&self) {
        self()
    }
}

/// A channel-based listener, for hosts that poll from their own loop.
pub struct ChannelUpdateListener {
    sender: crossbeam_channel::Sender<()>,
}

impl ChannelUpdateListener {
    /// Create a new channel-based listener
    pub fn new() -> (Self, crossbeam_channel::Receiver<()>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (ChannelUpdateListener { sender }, receiver)
    }
}

impl UpdateListener for ChannelUpdateListener {
    fn on_update(&self) {
        let _ = self.sender.send(());
    }
}
