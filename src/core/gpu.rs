use anyhow::Result;

/// Read-only view of the CUDA driver used by the capability report.
///
/// The report performs no error handling of its own: a failing query
/// propagates and ends the run, which is acceptable for a diagnostic.
#[cfg_attr(test, mockall::automock)]
pub trait CudaRuntime {
    /// Whether GPU-accelerated compute is usable at all.
    fn is_available(&self) -> bool;

    fn device_count(&self) -> Result<u32>;

    /// Ordinal of the device subsequent queries refer to.
    fn current_device(&self) -> Result<u32>;

    fn device_name(&self, ordinal: u32) -> Result<String>;

    /// Installed driver version, when the host exposes one.
    fn driver_version(&self) -> Result<Option<String>>;

    /// Compute capability (major, minor) of a device: the acceleration
    /// feature level the driver reports.
    fn compute_capability(&self, ordinal: u32) -> Result<(i32, i32)>;

    /// Version line for the compute binding itself; printed at the end of
    /// every report regardless of availability.
    fn binding_version(&self) -> String;
}
