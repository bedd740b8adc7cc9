use std::sync::Arc;

use crate::activation::cache::ActivationCache;
use crate::activation::{Context, InstanceReference};
use crate::error::DiResult;

use super::ActivationStrategy;

/// Records instances in the activation cache as they are activated and deactivated.
pub struct ActivationCacheStrategy {
    cache: Arc<ActivationCache>,
}

impl ActivationCacheStrategy {
    pub fn new(cache: Arc<ActivationCache>) -> Self {
        Self { cache }
    }
}

impl ActivationStrategy for ActivationCacheStrategy {
    fn activate(&self, _context: &Context, reference: &InstanceReference) -> DiResult<()> {
        self.cache.add_activated_instance(reference.instance());
        Ok(())
    }

    fn deactivate(&self, _context: &Context, reference: &InstanceReference) -> DiResult<()> {
        self.cache.add_deactivated_instance(reference.instance());
        Ok(())
    }
}
