//! Visible rectangle, recomputed every tick in the Global phase.
//!
//! Global runs on estimate-only ticks too, which lets the renderer learn
//! next frame's visibility bounds before input is final.

use kestrel_system::{StepContext, System};

use crate::frame::{Camera, Frame, FrameInput};

/// Centres the input's view rectangle on the player.
#[derive(Debug, Default)]
pub struct CameraSystem;

impl System<Frame, FrameInput> for CameraSystem {
    fn name(&self) -> &str {
        "camera"
    }

    fn global(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let centre = ctx.previous.player.position;
        let (a, b) = (centre + ctx.input.view_min, centre + ctx.input.view_max);
        ctx.next.camera = Camera {
            min: a.min(b),
            max: a.max(b),
        };
    }
}
