//! Opt-in process-wide registry.
//!
//! Nothing is installed implicitly. A host that wants a single well-known
//! entry point calls [`install`] once at startup; later calls fail with
//! [`EggifyError::AlreadyInstalled`] and never replace the installed registry.

use std::sync::OnceLock;

use crate::error::{EggifyError, EggifyResult};
use crate::event::KeyEvent;
use crate::options::MatchOptions;
use crate::pattern::PatternSpec;
use crate::registry::{HandlerResult, Registry, Subscription};

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Installs `registry` as the global registry.
///
/// Returns an error, leaving the existing registry in place, if one is already
/// installed.
pub fn install(registry: Registry) -> EggifyResult<&'static Registry> {
    GLOBAL
        .set(registry)
        .map_err(|_| EggifyError::AlreadyInstalled)?;
    tracing::debug!(target: "eggify::global", "global registry installed");
    GLOBAL.get().ok_or(EggifyError::AlreadyInstalled)
}

/// The installed registry, if any.
#[must_use]
pub fn get() -> Option<&'static Registry> {
    GLOBAL.get()
}

/// Whether [`install`] has succeeded in this process.
#[must_use]
pub fn is_installed() -> bool {
    GLOBAL.get().is_some()
}

/// Registers through the global registry. `None` if nothing is installed.
pub fn on_cheat_code<P, F>(pattern: P, handler: F, options: MatchOptions) -> Option<Subscription>
where
    P: Into<PatternSpec>,
    F: Fn(&KeyEvent) -> HandlerResult + Send + Sync + 'static,
{
    get().map(|registry| registry.register(pattern, handler, options))
}
