//! SlideCraft Application
//!
//! Hosts for the direct-manipulation engine: a headless gesture replay
//! runner and, on WASM, the browser canvas binding.

pub mod frame_loop;
pub mod replay;

#[cfg(feature = "native")]
pub mod cli;

pub use frame_loop::{FrameLoopSlot, LoopRef};
pub use replay::{
    CommitRecord, RejectedStep, ReplayError, ReplayReport, ReplayResult, ReplayScript, ReplayStep,
};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{SlideCanvas, run_wasm};
