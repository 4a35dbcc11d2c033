use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;

use crate::core::gpu::CudaRuntime;

/// Everything the capability report prints, read once from the driver and
/// discarded after rendering.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityReport {
    pub available: bool,
    pub device_count: u32,
    pub current_device: u32,
    pub device_name: Option<String>,
    pub driver_version: Option<String>,
    pub compute_capability: Option<(i32, i32)>,
    /// Always present, available or not.
    pub binding_version: String,
}

/// Query the runtime once per field. Device metadata is only touched when the
/// runtime reports availability.
pub fn build_report(runtime: &dyn CudaRuntime) -> Result<CapabilityReport> {
    if !runtime.is_available() {
        return Ok(CapabilityReport {
            available: false,
            device_count: 0,
            current_device: 0,
            device_name: None,
            driver_version: None,
            compute_capability: None,
            binding_version: runtime.binding_version(),
        });
    }

    let device_count = runtime.device_count()?;
    let current_device = runtime.current_device()?;
    let device_name = runtime.device_name(current_device)?;
    let driver_version = runtime.driver_version()?;
    let compute_capability = runtime.compute_capability(current_device)?;

    Ok(CapabilityReport {
        available: true,
        device_count,
        current_device,
        device_name: Some(device_name),
        driver_version,
        compute_capability: Some(compute_capability),
        binding_version: runtime.binding_version(),
    })
}

pub fn render(report: &CapabilityReport) -> String {
    let divider = "=".repeat(50);
    let mut out = String::new();
    let _ = writeln!(out, "{divider}");
    let _ = writeln!(out, "CUDA Availability Check");
    let _ = writeln!(out, "{divider}");
    let _ = writeln!(out, "CUDA Available: {}", report.available);

    if report.available {
        let _ = writeln!(out, "CUDA Device Count: {}", report.device_count);
        let _ = writeln!(out, "Current CUDA Device: {}", report.current_device);
        let _ = writeln!(
            out,
            "CUDA Device Name: {}",
            report.device_name.as_deref().unwrap_or("unknown")
        );
        let _ = writeln!(
            out,
            "CUDA Driver Version: {}",
            report.driver_version.as_deref().unwrap_or("unknown")
        );
        if let Some((major, minor)) = report.compute_capability {
            let _ = writeln!(out, "Compute Capability: {major}.{minor}");
        }
    } else {
        let _ = writeln!(out, "CUDA is not available. Training will use the CPU.");
        let _ = writeln!(out, "This will be significantly slower than GPU training.");
        let _ = writeln!(out);
        let _ = writeln!(out, "To enable CUDA:");
        let _ = writeln!(out, "  1. Install the NVIDIA GPU driver");
        let _ = writeln!(out, "  2. Install the CUDA toolkit");
        let _ = writeln!(
            out,
            "  3. Make sure the driver library is loadable (check LD_LIBRARY_PATH)"
        );
    }

    let _ = writeln!(out, "{divider}");
    let _ = writeln!(out, "{}", report.binding_version);
    let _ = writeln!(out, "{divider}");
    out
}
