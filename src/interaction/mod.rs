//! Pointer interaction: picking registered nodes and gating the transitions
//! they trigger

mod carousel;
mod picking;
mod registry;
mod sequencer;

pub use carousel::CarouselRing;
pub use picking::{Hit, HitFilter, HitTester};
pub use registry::{NodeTag, PickEntry, PickShape, PickableRegistry};
pub use sequencer::{InteractionState, Sequencer, Trigger};
