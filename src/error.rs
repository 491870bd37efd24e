// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for the probe pipeline.
//!
//! Every stage returns `Result<_, StillwaterError>` so callers can
//! pattern-match on failure modes (no adapters, missing feature, compile
//! failure) rather than parsing opaque strings. Propagation is fail-fast
//! and upward: no stage retries, no stage swallows.

use std::fmt;

/// Numeric codes attached to [`StillwaterError::Runtime`].
///
/// wgpu reports no numeric codes of its own; these distinguish which
/// device-runtime call failed.
pub mod codes {
    /// `request_device` failed.
    pub const DEVICE_CREATION: u32 = 10;
    /// Staging-buffer `map_async` reported an error.
    pub const BUFFER_MAP: u32 = 11;
    /// The map callback channel was dropped before delivering a result.
    pub const MAP_CHANNEL: u32 = 12;
}

/// Errors arising from device discovery, compilation, or dispatch.
#[derive(Debug)]
pub enum StillwaterError {
    /// No wgpu backend reported any adapter at all.
    NoAdapters,

    /// Adapters exist, but none is usable for compute dispatch.
    NoComputeDevices,

    /// Device index outside the filtered device list.
    BadDeviceIndex { index: usize, count: usize },

    /// The chosen device lacks `SHADER_F64` — cannot run f64 compute.
    UnsupportedPrecision { name: String },

    /// Shader compilation failed; carries the full compiler diagnostic.
    Compile { log: String },

    /// A device-runtime call failed (creation, mapping, readback).
    Runtime { message: String, code: u32 },

    /// Operand vectors have different lengths.
    LengthMismatch { a: usize, b: usize },

    /// Element count does not fit the kernel's u32 parameter block.
    ProblemTooLarge { n: usize },
}

impl fmt::Display for StillwaterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAdapters => write!(f, "No compute platforms found"),
            Self::NoComputeDevices => {
                write!(f, "No devices usable for compute dispatch found")
            }
            Self::BadDeviceIndex { index, count } => {
                write!(f, "Device index {index} out of range ({count} devices)")
            }
            Self::UnsupportedPrecision { name } => {
                write!(f, "Device '{name}' does not support SHADER_F64 — cannot run f64 compute")
            }
            Self::Compile { log } => {
                write!(f, "Shader compilation error\n{log}")
            }
            Self::Runtime { message, code } => {
                write!(f, "Device runtime error: {message} ({code})")
            }
            Self::LengthMismatch { a, b } => {
                write!(f, "Operand length mismatch: a has {a} elements, b has {b}")
            }
            Self::ProblemTooLarge { n } => {
                write!(f, "Problem size {n} exceeds the kernel's u32 element count")
            }
        }
    }
}

impl std::error::Error for StillwaterError {}
