pub use crate::ConfettiPlugin;

pub use crate::behavior::{AttractorBehavior, BehaviorSet, DragBehavior, WaveBehavior};
pub use crate::burst::{BURST_DURATION, BurstController, BurstRecipe, ConfettiError};
pub use crate::catalog::{
    DepthLayer, PALETTE, ParticleCatalog, ParticleColor, ParticleShape, ParticleVariant,
    VariantId,
};
pub use crate::emitter::{EmissionLayer, LayerStyle};
pub use crate::overlay::{ConfettiOverlay, ConfettiTrigger, HostSurface, SafeAreaInsets};
pub use crate::runtime::{BurstLayer, ConfettiParticle};
pub use crate::timeline::{AnimationTarget, AnimationTimeline, TimelineEntry, TimingFunction};
