//! Tick phases and tick kinds.

use std::fmt;

/// One stage of the per-tick update pipeline.
///
/// Phases run strictly in declaration order; the derived `Ord` matches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Cheap frame-wide work. Runs on every kind of tick, including estimates.
    Global,
    /// Advance continuous state (positions, velocities) from previous to next.
    Interpolate,
    /// Per-object logic that depends on this tick's positions.
    PostRender,
    /// Cross-collection collision and damage. Positions are final.
    Collide,
    /// Commit entities queued earlier in the tick.
    Spawn,
    /// Remove dead or expired entities. Always last.
    Destroy,
}

impl Phase {
    /// Every phase in execution order.
    pub const ALL: [Phase; 6] = [
        Phase::Global,
        Phase::Interpolate,
        Phase::PostRender,
        Phase::Collide,
        Phase::Spawn,
        Phase::Destroy,
    ];

    /// Short lowercase name for logs and metrics.
    pub fn name(self) -> &'static str {
        match self {
            Phase::Global => "global",
            Phase::Interpolate => "interpolate",
            Phase::PostRender => "post_render",
            Phase::Collide => "collide",
            Phase::Spawn => "spawn",
            Phase::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a tick is for, which decides the phases it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickKind {
    /// Authoritative fixed-step tick. Runs every phase and advances the
    /// tick counter; its output becomes the current frame.
    Full,
    /// Render interpolation over the leftover accumulator fraction.
    /// Output is discarded after rendering.
    Main,
    /// Estimate-only tick run before input is final, so the renderer can
    /// precompute visibility one step early. Output is discarded.
    Global,
}

impl TickKind {
    /// Phases this kind of tick runs, in order.
    pub fn phases(self) -> &'static [Phase] {
        match self {
            TickKind::Full => &Phase::ALL,
            TickKind::Main => &Phase::ALL[..2],
            TickKind::Global => &Phase::ALL[..1],
        }
    }

    /// Whether this tick's output becomes authoritative state.
    pub fn is_authoritative(self) -> bool {
        matches!(self, TickKind::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_order_matches_ord() {
        let mut sorted = Phase::ALL;
        sorted.sort();
        assert_eq!(sorted, Phase::ALL);
        assert_eq!(Phase::ALL.first(), Some(&Phase::Global));
        assert_eq!(Phase::ALL.last(), Some(&Phase::Destroy));
    }

    #[test]
    fn tick_kinds_select_prefixes() {
        assert_eq!(TickKind::Full.phases().len(), 6);
        assert_eq!(TickKind::Main.phases(), &[Phase::Global, Phase::Interpolate]);
        assert_eq!(TickKind::Global.phases(), &[Phase::Global]);
        assert!(TickKind::Full.is_authoritative());
        assert!(!TickKind::Main.is_authoritative());
    }

    #[test]
    fn display_uses_names() {
        assert_eq!(Phase::PostRender.to_string(), "post_render");
    }
}
