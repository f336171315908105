// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The owning execution context and the stage bracket around pipeline work.
//!
//! Work issued through the 3D pipeline on behalf of a copy or a blit clobbers the state the
//! context had bound. Before issuing such work, the blitter enters a [`RenderStage::Blit`] stage on
//! the context, and leaves it once the work is issued. The bracket is a notification, not a lock.
//!
//! The bracket is held as a [`StageGuard`], which ends the stage when it is dropped, so the
//! context sees a matching `stage_end` on every exit path.

use bitflags::bitflags;
use std::ops::{Deref, DerefMut};

/// What the owning context is doing at the moment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderStage {
    /// Outside of any stage.
    #[default]
    Null,
    /// Regular draw calls.
    Draw,
    /// Clears.
    Clear,
    /// Copies and blits emulated through the 3D pipeline.
    Blit,
}

/// Parameters passed to [`ExecutionContext::stage_begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StageInfo {
    /// Whether the active render condition, if any, gates the work of this stage.
    pub render_condition: bool,

    /// Whether the previous contents of the destination may be discarded, meaning they don't
    /// need to be loaded before being overwritten.
    pub discard: bool,

    /// The stage that is entered.
    pub stage: RenderStage,
}

impl StageInfo {
    /// Returns a `StageInfo` for a blit stage.
    #[inline]
    pub fn blit(render_condition: bool, discard: bool) -> Self {
        StageInfo {
            render_condition,
            discard,
            stage: RenderStage::Blit,
        }
    }
}

/// The context that owns the pipeline state the blitter borrows.
pub trait ExecutionContext {
    /// Called before pipeline work is issued on behalf of a stage.
    fn stage_begin(&mut self, info: StageInfo);

    /// Called once the work of the current stage has been issued.
    fn stage_end(&mut self);
}

impl<C> ExecutionContext for &mut C
where
    C: ExecutionContext + ?Sized,
{
    #[inline]
    fn stage_begin(&mut self, info: StageInfo) {
        (**self).stage_begin(info)
    }

    #[inline]
    fn stage_end(&mut self) {
        (**self).stage_end()
    }
}

/// A stage that is active on a context. The stage ends when the guard is dropped.
#[must_use = "the stage ends as soon as the guard is dropped"]
pub struct StageGuard<'a, C>
where
    C: ExecutionContext + ?Sized,
{
    context: &'a mut C,
}

impl<'a, C> StageGuard<'a, C>
where
    C: ExecutionContext + ?Sized,
{
    /// Begins a stage on `context`.
    pub fn begin(context: &'a mut C, info: StageInfo) -> Self {
        tracing::trace!(
            stage = ?info.stage,
            discard = info.discard,
            render_condition = info.render_condition,
            "stage begin",
        );
        context.stage_begin(info);

        StageGuard { context }
    }
}

impl<C> Deref for StageGuard<'_, C>
where
    C: ExecutionContext + ?Sized,
{
    type Target = C;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl<C> DerefMut for StageGuard<'_, C>
where
    C: ExecutionContext + ?Sized,
{
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl<C> Drop for StageGuard<'_, C>
where
    C: ExecutionContext + ?Sized,
{
    fn drop(&mut self) {
        self.context.stage_end();
        tracing::trace!("stage end");
    }
}

bitflags! {
    /// Groups of pipeline state that need to be re-emitted before the next draw.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct DirtyState: u32 {
        const FRAMEBUFFER = 1 << 0;
        const ZSA = 1 << 1;
        const BLEND = 1 << 2;
        const RASTERIZER = 1 << 3;
        const VIEWPORT = 1 << 4;
        const SCISSOR = 1 << 5;
        const PROG = 1 << 6;
        const VTXSTATE = 1 << 7;
        const VTXBUF = 1 << 8;
        const TEX = 1 << 9;
        const CONST = 1 << 10;
        const STREAMOUT = 1 << 11;
        const SAMPLE_MASK = 1 << 12;
        const MIN_SAMPLES = 1 << 13;
    }
}

impl DirtyState {
    /// The state that pipeline-emulated blits overwrite.
    pub const BLIT: Self = Self::all();
}

/// A basic execution context that keeps track of the active stage and of the pipeline state that
/// needs re-emitting.
#[derive(Debug, Default)]
pub struct ContextState {
    stage: RenderStage,
    discard: bool,
    render_condition: bool,
    dirty: DirtyState,
    stages_completed: u64,
}

impl ContextState {
    /// Creates a new `ContextState` outside of any stage, with nothing dirty.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active stage.
    #[inline]
    pub fn stage(&self) -> RenderStage {
        self.stage
    }

    /// Returns whether the active stage may discard the previous contents of its destination.
    #[inline]
    pub fn discard(&self) -> bool {
        self.discard
    }

    /// Returns whether the active stage is gated by the render condition.
    #[inline]
    pub fn render_condition(&self) -> bool {
        self.render_condition
    }

    /// Returns the state that needs re-emitting.
    #[inline]
    pub fn dirty(&self) -> DirtyState {
        self.dirty
    }

    /// Marks `state` as needing re-emitting.
    #[inline]
    pub fn mark_dirty(&mut self, state: DirtyState) {
        self.dirty |= state;
    }

    /// Returns the state that needs re-emitting, and marks everything clean.
    #[inline]
    pub fn take_dirty(&mut self) -> DirtyState {
        std::mem::replace(&mut self.dirty, DirtyState::empty())
    }

    /// Returns the number of stages that have ended.
    #[inline]
    pub fn stages_completed(&self) -> u64 {
        self.stages_completed
    }
}

impl ExecutionContext for ContextState {
    fn stage_begin(&mut self, info: StageInfo) {
        assert_ne!(info.stage, RenderStage::Null, "cannot begin the null stage");
        assert_eq!(
            self.stage,
            RenderStage::Null,
            "a stage cannot begin while another one is active",
        );

        self.stage = info.stage;
        self.discard = info.discard;
        self.render_condition = info.render_condition;
    }

    fn stage_end(&mut self) {
        assert_ne!(self.stage, RenderStage::Null, "no stage is active");

        if self.stage == RenderStage::Blit {
            self.dirty |= DirtyState::BLIT;
        }

        self.stage = RenderStage::Null;
        self.discard = false;
        self.render_condition = false;
        self.stages_completed += 1;
    }
}
