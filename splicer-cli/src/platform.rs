//! Platform-specific functionality.
//!
//! On Unix, Ctrl-C cancels the running job through its token instead of
//! killing splicer outright, so temporary files still get cleaned up.

use splicer_core::CancellationToken;
use std::sync::OnceLock;

static INTERRUPT_TOKEN: OnceLock<CancellationToken> = OnceLock::new();

#[cfg(unix)]
extern "C" fn on_interrupt(_signal: std::ffi::c_int) {
    // Only an atomic load and store happen here.
    if let Some(token) = INTERRUPT_TOKEN.get() {
        token.cancel();
    }
}

/// Routes SIGINT to `token`. Only the first call per process installs a
/// handler; later calls return `false`.
#[cfg(unix)]
pub fn install_interrupt_handler(token: &CancellationToken) -> crate::error::CliResult<bool> {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    if INTERRUPT_TOKEN.set(token.clone()).is_err() {
        return Ok(false);
    }

    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only touches an initialised OnceLock and an atomic flag.
    unsafe { sigaction(Signal::SIGINT, &action) }.map_err(|e| {
        splicer_core::CoreError::OperationFailed(format!("Failed to install SIGINT handler: {e}"))
    })?;
    log::debug!("SIGINT handler installed");
    Ok(true)
}

#[cfg(not(unix))]
pub fn install_interrupt_handler(token: &CancellationToken) -> crate::error::CliResult<bool> {
    let _ = INTERRUPT_TOKEN.set(token.clone());
    log::debug!("Interrupt handling is not available on this platform");
    Ok(false)
}
