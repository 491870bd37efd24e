// SPDX-License-Identifier: AGPL-3.0-only

//! Device catalog — an owned snapshot of every usable compute adapter.
//!
//! Enumeration walks backends in a fixed order (Vulkan, Metal, DX12, GL),
//! then adapters within each backend, so indices are stable within a run.
//! Adapters whose downlevel capabilities cannot run compute shaders are
//! filtered out; the index a caller selects with is an index into the
//! filtered list.
//!
//! The returned [`DeviceSummary`] list owns its data and holds no
//! back-reference to wgpu state, so selection logic is testable against
//! hand-built mock lists.
//!
//! Set `STILLWATER_WGPU_BACKEND` to `vulkan`, `metal`, `dx12`, or `gl` to
//! narrow enumeration to a single backend.

use crate::error::StillwaterError;

/// Backend walk order. Determines device numbering within a run.
const BACKEND_ORDER: [wgpu::Backends; 4] = [
    wgpu::Backends::VULKAN,
    wgpu::Backends::METAL,
    wgpu::Backends::DX12,
    wgpu::Backends::GL,
];

/// Summary of one usable compute device.
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    /// Index into the filtered device list (stable within a single run).
    pub index: usize,
    /// Adapter name as reported by the driver.
    pub name: String,
    /// Driver name and version, e.g. `"NVIDIA (580.82.09)"`.
    pub driver: String,
    /// Backend that exposed the adapter, e.g. `"Vulkan"`.
    pub backend: String,
    /// Adapter device type (discrete, integrated, software, etc.).
    pub device_type: wgpu::DeviceType,
    /// Whether `SHADER_F64` is supported.
    pub has_f64: bool,
}

impl std::fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let f64_tag = if self.has_f64 { "f64" } else { "f32" };
        let kind = match self.device_type {
            wgpu::DeviceType::DiscreteGpu => "discrete",
            wgpu::DeviceType::IntegratedGpu => "integrated",
            wgpu::DeviceType::VirtualGpu => "virtual",
            wgpu::DeviceType::Cpu => "cpu",
            wgpu::DeviceType::Other => "other",
        };
        write!(
            f,
            "[{}] {} ({}, {}, {}, {})",
            self.index, self.name, self.driver, self.backend, kind, f64_tag
        )
    }
}

/// Create a wgpu instance honoring `STILLWATER_WGPU_BACKEND`.
pub(crate) fn instance() -> wgpu::Instance {
    let backends = match std::env::var("STILLWATER_WGPU_BACKEND").as_deref() {
        Ok("vulkan") => wgpu::Backends::VULKAN,
        Ok("metal") => wgpu::Backends::METAL,
        Ok("dx12") => wgpu::Backends::DX12,
        Ok("gl") => wgpu::Backends::GL,
        _ => wgpu::Backends::all(),
    };
    wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends,
        ..Default::default()
    })
}

/// Whether an adapter can run compute dispatch at all.
///
/// wgpu adapters carry no availability bit; downlevel compute-shader
/// support is the availability test for this tool.
fn usable_for_compute(adapter: &wgpu::Adapter) -> bool {
    adapter
        .get_downlevel_capabilities()
        .flags
        .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
}

/// Walk all backends in [`BACKEND_ORDER`] and collect usable adapters.
///
/// Also reports the raw (pre-filter) adapter count so callers can
/// distinguish "no platforms" from "nothing usable".
pub(crate) fn usable_adapters(instance: &wgpu::Instance) -> (usize, Vec<wgpu::Adapter>) {
    let mut raw = 0;
    let mut usable = Vec::new();
    for backend in BACKEND_ORDER {
        for adapter in instance.enumerate_adapters(backend) {
            raw += 1;
            if usable_for_compute(&adapter) {
                usable.push(adapter);
            }
        }
    }
    (raw, usable)
}

fn summarize(index: usize, adapter: &wgpu::Adapter) -> DeviceSummary {
    let info = adapter.get_info();
    let features = adapter.features();
    DeviceSummary {
        index,
        name: info.name.clone(),
        driver: format!("{} ({})", info.driver, info.driver_info),
        backend: format!("{:?}", info.backend),
        device_type: info.device_type,
        has_f64: features.contains(wgpu::Features::SHADER_F64),
    }
}

/// Enumerate all usable compute devices as an owned snapshot.
///
/// Errors: [`StillwaterError::NoAdapters`] when no backend reported any
/// adapter; [`StillwaterError::NoComputeDevices`] when adapters exist but
/// every one failed the compute filter. No side effects beyond querying
/// the runtime.
pub fn enumerate() -> Result<Vec<DeviceSummary>, StillwaterError> {
    let instance = instance();
    let (raw, usable) = usable_adapters(&instance);
    if raw == 0 {
        return Err(StillwaterError::NoAdapters);
    }
    if usable.is_empty() {
        return Err(StillwaterError::NoComputeDevices);
    }
    Ok(usable
        .iter()
        .enumerate()
        .map(|(i, adapter)| summarize(i, adapter))
        .collect())
}

/// Select a device by index, enforcing `0 ≤ index < devices.len()`.
pub fn select(devices: &[DeviceSummary], index: usize) -> Result<&DeviceSummary, StillwaterError> {
    devices.get(index).ok_or(StillwaterError::BadDeviceIndex {
        index,
        count: devices.len(),
    })
}

/// Print the device list to stdout, one line per device.
pub fn print_device_list(devices: &[DeviceSummary]) {
    for summary in devices {
        let marker = if summary.has_f64 { "✓" } else { "✗" };
        println!("  {marker} {summary}");
    }
}
