// SPDX-License-Identifier: AGPL-3.0-only

//! Transfer and dispatch — one synchronous kernel launch.
//!
//! [`run`] owns the whole device-side lifetime of a launch: input buffers
//! are created from host data (the creating call performs the transfer),
//! the output buffer is bound read-write, the kernel is dispatched over a
//! 1-D domain covering every element, and the result is read back through
//! a blocking staging copy. All buffers are locals, released on every
//! exit path.

use crate::error::StillwaterError;
use crate::gpu::GpuContext;
use crate::kernel;

/// Uniform parameter block for the vecadd kernel.
///
/// Padded to 16 bytes; layout must match `Params` in the shader.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Params {
    n: u32,
    pad0: u32,
    pad1: u32,
    pad2: u32,
}

/// Validate operand lengths and fit the element count to the kernel's u32
/// parameter. Pure; shared by [`run`] and its tests.
fn element_count(a_len: usize, b_len: usize) -> Result<u32, StillwaterError> {
    if a_len != b_len {
        return Err(StillwaterError::LengthMismatch { a: a_len, b: b_len });
    }
    u32::try_from(a_len).map_err(|_| StillwaterError::ProblemTooLarge { n: a_len })
}

/// Run the compiled kernel over `a` and `b`, returning the device result.
///
/// Sequencing: inputs copy-on-create → output uninitialized → bind in
/// fixed order (count, A, B, C) → one compute pass of
/// `ceil(n / WORKGROUP_SIZE)` workgroups → blocking readback. N = 0 is an
/// immediate no-op: no device calls, empty result.
pub fn run(
    ctx: &GpuContext,
    pipeline: &wgpu::ComputePipeline,
    a: &[f64],
    b: &[f64],
) -> Result<Vec<f64>, StillwaterError> {
    let n = element_count(a.len(), b.len())?;
    if n == 0 {
        return Ok(Vec::new());
    }

    let params = Params {
        n,
        pad0: 0,
        pad1: 0,
        pad2: 0,
    };
    let params_buf = ctx.create_uniform_buffer(bytemuck::bytes_of(&params), "vecadd_params");
    let a_buf = ctx.create_f64_buffer(a, "vecadd_a");
    let b_buf = ctx.create_f64_buffer(b, "vecadd_b");
    let c_buf = ctx.create_f64_output_buffer(a.len(), "vecadd_c");

    let bind_group = ctx.create_bind_group(pipeline, &[&params_buf, &a_buf, &b_buf, &c_buf]);

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("vecadd"),
        });
    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("vecadd_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(n.div_ceil(kernel::WORKGROUP_SIZE), 1, 1);
    }
    ctx.queue().submit(std::iter::once(encoder.finish()));

    ctx.read_back_f64(&c_buf, a.len())
}
