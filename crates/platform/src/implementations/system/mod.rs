//! Host operating system implementation

pub mod process;

/// Platform backed by real processes
pub struct SystemPlatform;

impl SystemPlatform {
    /// Create a new platform instance for the host
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new() -> crate::core::Platform {
        crate::core::Platform::new(Box::new(process::SystemProcessOperations::new()))
    }
}
