//! Termination signals turn into a stop flag polled by the scan loop

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use nix::libc::c_int;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Signals that end the run
pub const TERMINATING: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGQUIT];

static STOP: AtomicBool = AtomicBool::new(false);

extern "C" fn request_stop(_signal: c_int) {
    STOP.store(true, Ordering::Relaxed);
}

/// Flag raised by any of the `TERMINATING` signals once handlers are installed
pub fn stop_flag() -> &'static AtomicBool {
    &STOP
}

pub fn install() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(request_stop),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for sig in TERMINATING {
        // SAFETY: the handler only stores to an atomic
        unsafe { signal::sigaction(sig, &action) }
            .with_context(|| format!("cannot install {} handler", sig))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_raises_flag() {
        request_stop(Signal::SIGTERM as c_int);
        assert!(stop_flag().load(Ordering::Relaxed));
        STOP.store(false, Ordering::Relaxed);
    }
}
