// SPDX-License-Identifier: AGPL-3.0-only

//! Kernel compilation with captured diagnostics.
//!
//! The kernel source is a named, versioned resource embedded at build time,
//! so its syntactic validity is testable independent of the dispatch
//! engine. Compilation runs inside a wgpu validation error scope: either
//! it yields a complete pipeline or the full compiler diagnostic comes
//! back in `Compile { log }` — never a partial artifact, never a swallowed
//! log.

use crate::error::StillwaterError;
use crate::gpu::GpuContext;

/// The f64 vector-add kernel, bounds-checked per work-item.
pub const VECADD_F64: &str = include_str!("shaders/vecadd_f64.wgsl");

/// Entry point exposed by [`VECADD_F64`].
pub const ENTRY_POINT: &str = "add";

/// Threads per workgroup. Must match `@workgroup_size` in the shader.
pub const WORKGROUP_SIZE: u32 = 64;

/// Compile [`VECADD_F64`] against the context's device.
///
/// Synchronous from the caller's view: the error scope is resolved before
/// returning. On failure the captured diagnostic is surfaced verbatim.
pub async fn compile(ctx: &GpuContext) -> Result<wgpu::ComputePipeline, StillwaterError> {
    let device = ctx.device();

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("vecadd_f64"),
        source: wgpu::ShaderSource::Wgsl(VECADD_F64.into()),
    });
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("vecadd_f64"),
        layout: None,
        module: &module,
        entry_point: ENTRY_POINT,
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    });

    if let Some(err) = device.pop_error_scope().await {
        return Err(StillwaterError::Compile {
            log: err.to_string(),
        });
    }
    Ok(pipeline)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn source_is_nonempty_and_names_entry_point() {
        assert!(!VECADD_F64.is_empty());
        assert!(VECADD_F64.contains(&format!("fn {ENTRY_POINT}(")));
    }

    #[test]
    fn source_workgroup_size_matches_const() {
        assert!(VECADD_F64.contains(&format!("@workgroup_size({WORKGROUP_SIZE})")));
    }

    #[test]
    fn source_binds_count_then_operands_then_output() {
        // Fixed binding order is part of the dispatch contract.
        let params = VECADD_F64.find("@binding(0)").expect("params binding");
        let a = VECADD_F64.find("@binding(1)").expect("a binding");
        let b = VECADD_F64.find("@binding(2)").expect("b binding");
        let c = VECADD_F64.find("@binding(3)").expect("c binding");
        assert!(params < a && a < b && b < c);
    }

    #[test]
    fn source_is_all_f64() {
        assert!(VECADD_F64.contains("array<f64>"));
        assert!(!VECADD_F64.contains("array<f32>"));
    }
}
