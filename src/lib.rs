// SPDX-License-Identifier: AGPL-3.0-only

#![deny(clippy::expect_used, clippy::unwrap_used)]

//! stillwater — GPU FP64 vector-add probe.
//!
//! A one-shot diagnostic that answers a single question: can this machine's
//! GPU run an IEEE 754 f64 compute shader and agree with the CPU? The probe
//! enumerates every wgpu adapter, gates on `SHADER_F64`, compiles an
//! elementwise-add WGSL kernel against the chosen device, pushes two f64
//! vectors through it, and reports the host-vs-device discrepancy.
//!
//! ## Pipeline
//!
//! ```text
//!    catalog ──► gpu (capability gate) ──► kernel ──► dispatch ──► verify
//! ```
//!
//! Each stage returns `Result` and fails fast; there is no retry and no
//! fallback device. A run either completes end-to-end or terminates with a
//! typed [`error::StillwaterError`].
//!
//! ## Modules
//!   - `catalog` — adapter enumeration snapshot, backend-then-device order
//!   - `gpu` — device context with the hoisted `SHADER_F64` pre-check
//!   - `kernel` — embedded WGSL source, compile with captured diagnostics
//!   - `dispatch` — buffer transfer, 1-D launch, blocking readback
//!   - `verify` — host recompute, sum-of-squared-differences scalar
//!   - `tolerances` — documented acceptance thresholds
//!
//! The `vecadd` binary wires the stages together behind the CLI surface
//! (one positional device index, exit 0 on a completed run).

pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod gpu;
pub mod kernel;
pub mod tolerances;
pub mod verify;
