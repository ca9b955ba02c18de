use tracing::{error, warn};

/// Delivers the emergency termination request to the owning process.
pub trait Terminator: Send + Sync {
    fn terminate(&self, pid: u32);
}

/// Sends SIGTERM to the target process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalTerminator;

impl Terminator for SignalTerminator {
    #[cfg(unix)]
    fn terminate(&self, pid: u32) {
        warn!("🛑 Emergency terminate: sending SIGTERM to pid {}", pid);
        let Ok(pid) = libc::pid_t::try_from(pid) else {
            error!("pid {} does not fit the platform pid type", pid);
            return;
        };
        // SAFETY: kill(2) takes plain integers and touches no memory of ours.
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc != 0 {
            error!(
                "Failed to signal pid {}: {}",
                pid,
                std::io::Error::last_os_error()
            );
        }
    }

    #[cfg(not(unix))]
    fn terminate(&self, pid: u32) {
        warn!(
            "🛑 Emergency terminate requested for pid {}, exiting the current process",
            pid
        );
        if pid == std::process::id() {
            std::process::exit(1);
        }
        error!("Signalling foreign processes is not supported on this platform");
    }
}
