//! Workslate Render Library
//!
//! Renderer abstraction and implementations for Workslate.
//! The default implementation uses Vello for GPU-accelerated rendering.

pub mod paths;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, ShapeRenderer};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
