use std::sync::Arc;

use super::store::StoreError;
use super::ScoringConfig;

/// Source of the configuration a scoring run reads. Injected into the engine
/// instead of reaching for a global.
pub trait ConfigProvider: Send + Sync {
    fn active_config(&self) -> Result<Arc<ScoringConfig>, StoreError>;
}

/// Pinned configuration for what-if runs and tests.
#[derive(Debug, Clone)]
pub struct FixedConfig {
    config: Arc<ScoringConfig>,
}

impl FixedConfig {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl ConfigProvider for FixedConfig {
    fn active_config(&self) -> Result<Arc<ScoringConfig>, StoreError> {
        Ok(Arc::clone(&self.config))
    }
}

impl<P> ConfigProvider for Arc<P>
where
    P: ConfigProvider + ?Sized,
{
    fn active_config(&self) -> Result<Arc<ScoringConfig>, StoreError> {
        (**self).active_config()
    }
}
