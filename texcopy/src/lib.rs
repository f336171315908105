// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Tiered texture copy and blit dispatch for gallium-style driver layers.
//!
//! # Overview
//!
//! - A [`Resource`](crate::resource::Resource) is a GPU-resident image or linear buffer. Its
//!   [`ResourceShape`](crate::resource::ResourceShape) decides which copy strategies may touch it.
//!
//! - The [`Blitter`](crate::blitter::Blitter) owns the collaborators that actually move texels:
//!   an optional [hardware blit engine](crate::blit::HardwareBlit), a
//!   [blit-emulation service](crate::blit::BlitEmulator) that copies through the 3D pipeline, and a
//!   [software copy](crate::software::SoftwareCopy) that works on host-visible memory.
//!
//! - [`Blitter::copy_region`](crate::blitter::Blitter::copy_region) tries those strategies in
//!   strict priority order and reports the [`Strategy`](crate::copy::Strategy) that handled the
//!   request. The software copy accepts everything, so a well-formed copy always completes.
//!
//! - [`Blitter::blit`](crate::blitter::Blitter::blit) is the general path: format conversion,
//!   filtering, scissoring and blending. It builds a [`SurfaceView`](crate::view::SurfaceView) and
//!   a [`SampledView`](crate::view::SampledView) for the duration of the call and hands them to the
//!   emulation service.
//!
//! - Work issued through the 3D pipeline is bracketed by a blit *stage* on the owning
//!   [`ExecutionContext`](crate::context::ExecutionContext), which lets the context invalidate the
//!   state the blitter clobbers.
//!
//! Entry points come in a validated form returning [`ValidationError`] and an `_unchecked` form
//! that trusts the caller and only asserts its preconditions.

use std::{borrow::Cow, error::Error, fmt};

pub use ash::vk::DeviceSize;


pub mod blit;
pub mod blitter;
pub mod context;
pub mod copy;
pub mod format;
mod macros;
pub mod resource;
pub mod sampler;
pub mod software;
pub mod view;

/// A caller-side contract violation found by one of the validating entry points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationError {
    /// The context in which the problem exists, usually the path of the offending field.
    pub context: Cow<'static, str>,

    /// A description of the problem.
    pub problem: Cow<'static, str>,
}

impl ValidationError {
    pub(crate) fn new(
        context: impl Into<Cow<'static, str>>,
        problem: impl Into<Cow<'static, str>>,
    ) -> Box<Self> {
        Box::new(ValidationError {
            context: context.into(),
            problem: problem.into(),
        })
    }

    /// Prepends `context` to the existing context of the error.
    pub(crate) fn add_context(
        mut self: Box<Self>,
        context: impl Into<Cow<'static, str>>,
    ) -> Box<Self> {
        let context = context.into();

        self.context = if self.context.is_empty() {
            context
        } else {
            format!("{}.{}", context, self.context).into()
        };

        self
    }
}

impl Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{}", self.problem)
        } else {
            write!(f, "{}: {}", self.context, self.problem)
        }
    }
}

/// A helper type for non-exhaustive structs.
///
/// This type cannot be constructed outside this crate. Structures with a field of this type can
/// only be constructed by calling a constructor function or `Default::default()`. The effect is
/// similar to the standard Rust `#[non_exhaustive]` attribute, except that it does not prevent
/// update syntax from being used.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NonExhaustive(());

impl fmt::Debug for NonExhaustive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("NonExhaustive")
    }
}

pub(crate) const NE: NonExhaustive = NonExhaustive(());
