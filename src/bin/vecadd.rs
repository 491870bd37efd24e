// SPDX-License-Identifier: AGPL-3.0-only

//! GPU FP64 vector-add probe.
//!
//! Computes c = a + b in f64 on the selected device and reports the
//! host-vs-device discrepancy (sum of squared differences).
//!
//! Usage:
//!   `vecadd <device-index>`
//!
//! The device index selects from the printed device list. Problem size
//! defaults to 2^20 elements; override with `STILLWATER_N`. Narrow
//! enumeration to one backend with `STILLWATER_WGPU_BACKEND`
//! (`vulkan` / `metal` / `dx12` / `gl`).
//!
//! Exit code 0 = run completed end-to-end; 1 = argument error, no usable
//! device, unsupported precision, compile failure, or runtime error.

use std::process;
use stillwater::error::StillwaterError;
use stillwater::gpu::GpuContext;
use stillwater::{catalog, dispatch, kernel, tolerances, verify};

const DEFAULT_N: usize = 1 << 20;

fn problem_size() -> Result<usize, String> {
    match std::env::var("STILLWATER_N") {
        Err(_) => Ok(DEFAULT_N),
        Ok(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("STILLWATER_N must be a non-negative integer, got '{s}'")),
    }
}

async fn run(index: usize, n: usize) -> Result<(), StillwaterError> {
    let devices = catalog::enumerate()?;
    println!("Device list");
    catalog::print_device_list(&devices);

    let chosen = catalog::select(&devices, index)?;
    println!("Using {}: {}", chosen.index, chosen.name);
    println!();

    let ctx = GpuContext::open(index).await?;
    let pipeline = kernel::compile(&ctx).await?;

    let a: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let b: Vec<f64> = (0..n).map(|i| 2.0 * i as f64).collect();

    let c = dispatch::run(&ctx, &pipeline, &a, &b)?;
    let err = verify::discrepancy(&a, &b, &c);

    println!("  {} (N = {n})", ctx.adapter_name);
    println!("  Difference host - device = {err:.6e}");
    let marker = if err < tolerances::GPU_VS_CPU_SUM_SQ {
        "✓"
    } else {
        "✗"
    };
    println!(
        "  {marker} sum of squared differences under {:.1e}",
        tolerances::GPU_VS_CPU_SUM_SQ
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: vecadd <device-index>");
        process::exit(1);
    }
    let index: usize = match args[1].parse() {
        Ok(i) => i,
        Err(_) => {
            eprintln!("device index must be a non-negative integer, got '{}'", args[1]);
            process::exit(1);
        }
    };
    let n = match problem_size() {
        Ok(n) => n,
        Err(msg) => {
            eprintln!("{msg}");
            process::exit(1);
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("tokio runtime: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(index, n)) {
        eprintln!("{e}");
        process::exit(1);
    }
}
