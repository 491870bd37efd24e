// SPDX-License-Identifier: AGPL-3.0-only

//! Compute context — one device, one queue, one run.
//!
//! [`GpuContext::open`] binds to the adapter at a catalog index and applies
//! the capability gate: a device without `SHADER_F64` is rejected with
//! `UnsupportedPrecision` before any compilation is attempted. The context
//! owns the wgpu device and queue exclusively for the run's duration.
//!
//! Buffer helpers follow the storage/staging discipline: inputs are
//! copy-on-create storage buffers, readback goes through a `MAP_READ`
//! staging buffer with a blocking map.

use crate::catalog;
use crate::error::{codes, StillwaterError};

/// GPU context bound to exactly one f64-capable device.
pub struct GpuContext {
    /// Adapter name as reported by the driver.
    pub adapter_name: String,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

fn f64_to_le_bytes(data: &[f64]) -> Vec<u8> {
    data.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn le_bytes_to_f64(data: &[u8]) -> Vec<f64> {
    let mut out = Vec::with_capacity(data.len() / 8);
    for chunk in data.chunks_exact(8) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        out.push(f64::from_le_bytes(bytes));
    }
    out
}

impl GpuContext {
    /// Open the device at `index` in the filtered catalog order.
    ///
    /// Walks the same backend-then-adapter order as [`catalog::enumerate`],
    /// so an index printed in the device list selects the same hardware.
    /// Fails with `BadDeviceIndex` when out of range and
    /// `UnsupportedPrecision` when the adapter lacks `SHADER_F64`.
    pub async fn open(index: usize) -> Result<Self, StillwaterError> {
        let instance = catalog::instance();
        let (raw, usable) = catalog::usable_adapters(&instance);
        if raw == 0 {
            return Err(StillwaterError::NoAdapters);
        }
        if usable.is_empty() {
            return Err(StillwaterError::NoComputeDevices);
        }

        let count = usable.len();
        let adapter = usable
            .into_iter()
            .nth(index)
            .ok_or(StillwaterError::BadDeviceIndex { index, count })?;

        let info = adapter.get_info();
        if !adapter.features().contains(wgpu::Features::SHADER_F64) {
            return Err(StillwaterError::UnsupportedPrecision { name: info.name });
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("stillwater f64 device"),
                    required_features: wgpu::Features::SHADER_F64,
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| StillwaterError::Runtime {
                message: format!("device creation: {e}"),
                code: codes::DEVICE_CREATION,
            })?;

        Ok(Self {
            adapter_name: info.name,
            device,
            queue,
        })
    }

    /// Access the underlying wgpu device.
    pub const fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Access the underlying wgpu queue.
    pub const fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Create a read-only storage buffer initialized from f64 host data.
    ///
    /// The creating call performs the host→device transfer.
    pub fn create_f64_buffer(&self, data: &[f64], label: &str) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: &f64_to_le_bytes(data),
                usage: wgpu::BufferUsages::STORAGE,
            })
    }

    /// Create an uninitialized read-write storage buffer for f64 output.
    pub fn create_f64_output_buffer(&self, count: usize, label: &str) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (count * 8) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        })
    }

    /// Create a staging buffer for reading results back to the host.
    pub fn create_staging_buffer(&self, size: usize, label: &str) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Create a uniform buffer from raw bytes.
    pub fn create_uniform_buffer(&self, data: &[u8], label: &str) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::UNIFORM,
            })
    }

    /// Create a bind group from a pipeline and ordered buffer slice.
    ///
    /// Each buffer is bound at binding index 0, 1, 2, ... in order.
    pub fn create_bind_group(
        &self,
        pipeline: &wgpu::ComputePipeline,
        buffers: &[&wgpu::Buffer],
    ) -> wgpu::BindGroup {
        let layout = pipeline.get_bind_group_layout(0);
        let entries: Vec<wgpu::BindGroupEntry> = buffers
            .iter()
            .enumerate()
            .map(|(i, buf)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: buf.as_entire_binding(),
            })
            .collect();
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bind_group"),
            layout: &layout,
            entries: &entries,
        })
    }

    /// Read back f64 data from a device buffer via a staging copy.
    ///
    /// Blocking: submits the copy, maps the staging buffer, and does not
    /// return until the transfer completes or fails.
    pub fn read_back_f64(
        &self,
        buffer: &wgpu::Buffer,
        count: usize,
    ) -> Result<Vec<f64>, StillwaterError> {
        let staging = self.create_staging_buffer(count * 8, "readback");
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback"),
            });
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, (count * 8) as u64);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| StillwaterError::Runtime {
                message: "map callback channel dropped before delivering a result".into(),
                code: codes::MAP_CHANNEL,
            })?
            .map_err(|e| StillwaterError::Runtime {
                message: format!("staging buffer mapping: {e}"),
                code: codes::BUFFER_MAP,
            })?;

        let data = slice.get_mapped_range();
        let result = le_bytes_to_f64(&data);
        drop(data);
        staging.unmap();
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn f64_byte_roundtrip() {
        let original = vec![
            0.0,
            1.0,
            -1.0,
            std::f64::consts::PI,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NAN,
        ];
        let bytes = f64_to_le_bytes(&original);
        let recovered = le_bytes_to_f64(&bytes);
        assert_eq!(original.len(), recovered.len());
        for i in 0..original.len() {
            if original[i].is_nan() {
                assert!(recovered[i].is_nan());
            } else {
                assert_eq!(original[i], recovered[i]);
            }
        }
    }

    #[test]
    fn f64_byte_conversion_sizes() {
        assert_eq!(f64_to_le_bytes(&[]).len(), 0);
        assert_eq!(f64_to_le_bytes(&[1.0]).len(), 8);
        assert_eq!(f64_to_le_bytes(&[1.0; 100]).len(), 800);
    }

    #[test]
    fn f64_byte_conversion_extremes() {
        let values = [1e-308, 1e308, f64::MIN_POSITIVE];
        let back = le_bytes_to_f64(&f64_to_le_bytes(&values));
        assert_eq!(back[0], 1e-308);
        assert_eq!(back[1], 1e308);
        assert_eq!(back[2], f64::MIN_POSITIVE);
    }

    #[test]
    fn le_bytes_ignores_trailing_partial_chunk() {
        let mut bytes = f64_to_le_bytes(&[2.5]);
        bytes.extend_from_slice(&[0, 0, 0]);
        let back = le_bytes_to_f64(&bytes);
        assert_eq!(back, vec![2.5]);
    }
}
