use crate::{
    decider::{should_inject, Draw, SharedRng},
    error::Error,
    threshold::ThresholdProvider,
};
use std::{fmt, sync::Arc};

/// Takes one injection decision: fetch the threshold, draw, compare.
///
/// Cloning is cheap and every clone shares the same random source.
#[derive(Clone)]
pub struct Resolver {
    provider: ThresholdProvider,
    rng: Arc<dyn Draw>,
}

impl Resolver {
    /// Create a resolver drawing from a process-wide [`SharedRng`].
    pub fn new(provider: ThresholdProvider) -> Self {
        Self::with_draw(provider, Arc::new(SharedRng::from_entropy()))
    }

    /// Create a resolver with a custom draw source.
    pub fn with_draw(provider: ThresholdProvider, rng: Arc<dyn Draw>) -> Self {
        Self { provider, rng }
    }

    pub fn provider(&self) -> &ThresholdProvider {
        &self.provider
    }

    /// Fetch the current threshold and take a fresh decision.
    pub async fn decide(&self) -> Result<bool, Error> {
        let threshold = self.provider.fetch().await?;
        let draw = self.rng.draw();
        let inject = should_inject(threshold, draw);

        tracing::debug!(
            key = self.provider.key(),
            threshold = threshold.percent(),
            draw,
            inject,
            "injection decision taken"
        );

        Ok(inject)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}
