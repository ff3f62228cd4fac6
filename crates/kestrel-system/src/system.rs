//! The [`System`] trait.
//!
//! A system owns the update rules for one gameplay collection (the player,
//! the camera, blasters, missiles...). Every system exposes the same six
//! phase hooks with the same signature, and the [`Pipeline`](crate::Pipeline)
//! calls them phase-major: all systems' `global`, then all systems'
//! `interpolate`, and so on down to `destroy`.

use crate::context::StepContext;
use crate::phase::Phase;

/// A stateless update rule set over frames of type `F` driven by input `I`.
///
/// # Contract
///
/// - Every hook MUST be deterministic: the same `previous`, `next` and
///   `input` produce bit-identical writes.
/// - `&self`: systems carry no mutable state; anything that must persist
///   between ticks lives in the frame.
/// - Hooks default to no-ops; a system overrides only the phases it uses.
///
/// # Object safety
///
/// The pipeline stores systems as `Vec<Box<dyn System<F, I>>>`.
///
/// # Examples
///
/// ```
/// use kestrel_system::{Phase, StepContext, System};
///
/// struct Counter;
///
/// impl System<u64, ()> for Counter {
///     fn name(&self) -> &str { "counter" }
///
///     fn interpolate(&self, ctx: &mut StepContext<'_, u64, ()>) {
///         *ctx.next = *ctx.previous + 1;
///     }
/// }
///
/// assert_eq!(Counter.name(), "counter");
/// ```
pub trait System<F, I>: Send + 'static {
    /// Human-readable name for validation errors and logs.
    fn name(&self) -> &str;

    /// Cheap frame-wide work. Also runs on estimate ticks.
    fn global(&self, _ctx: &mut StepContext<'_, F, I>) {}

    /// Advance continuous state from `previous` into `next`.
    fn interpolate(&self, _ctx: &mut StepContext<'_, F, I>) {}

    /// Per-object logic on this tick's positions.
    fn post_render(&self, _ctx: &mut StepContext<'_, F, I>) {}

    /// Collision and damage resolution.
    fn collide(&self, _ctx: &mut StepContext<'_, F, I>) {}

    /// Commit entities queued earlier this tick.
    fn spawn(&self, _ctx: &mut StepContext<'_, F, I>) {}

    /// Remove dead or expired entities.
    fn destroy(&self, _ctx: &mut StepContext<'_, F, I>) {}

    /// Dispatch one phase to the matching hook.
    fn run_phase(&self, phase: Phase, ctx: &mut StepContext<'_, F, I>) {
        match phase {
            Phase::Global => self.global(ctx),
            Phase::Interpolate => self.interpolate(ctx),
            Phase::PostRender => self.post_render(ctx),
            Phase::Collide => self.collide(ctx),
            Phase::Spawn => self.spawn(ctx),
            Phase::Destroy => self.destroy(ctx),
        }
    }
}
