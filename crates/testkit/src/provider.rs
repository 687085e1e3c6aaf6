//! Fake implementation of [`agents::ModelProvider`]

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use agents::{BoxError, Model, ModelInput, ModelProvider};
use config::FakeModelConfig;
use tracing::debug;

use crate::{
    model::{FakeModel, DEFAULT_DELAY},
    response::{self, SharedResponseFactory},
};

/// Hands out one [`FakeModel`] per model name
///
/// Models are created lazily with the provider's delay and response factory
/// and cached, so every lookup of the same name returns the same instance
/// until [`FakeModelProvider::clear`] is called. Each provider owns its own
/// cache; nothing is shared between providers.
pub struct FakeModelProvider {
    delay: Duration,
    /// `None` leaves each model on its own default factory
    response_factory: Option<SharedResponseFactory>,
    models: RwLock<HashMap<String, Arc<FakeModel>>>,
}

impl FakeModelProvider {
    pub fn new(delay: Duration) -> Self {
        Self::builder().delay(delay).build()
    }

    pub fn builder() -> FakeModelProviderBuilder {
        FakeModelProviderBuilder::default()
    }

    pub fn from_config(config: &FakeModelConfig) -> Self {
        Self::new(config.delay())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Get or create the fake model registered under `name`
    pub fn get_model(&self, name: &str) -> Arc<FakeModel> {
        if let Some(model) = self.read_models().get(name) {
            return model.clone();
        }

        // Re-checked under the write lock: another caller may have inserted
        // the same name in between.
        self.write_models()
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(model = %name, delay = ?self.delay, "Creating fake model");
                Arc::new(self.create_model(name))
            })
            .clone()
    }

    /// Snapshot of every model created so far, keyed by name
    pub fn get_all_models(&self) -> HashMap<String, Arc<FakeModel>> {
        self.read_models().clone()
    }

    /// Reset call tracking on every cached model, keeping the models cached
    pub fn reset_all(&self) {
        for model in self.read_models().values() {
            model.reset();
        }
    }

    /// Drop every cached model
    ///
    /// Handles callers already hold stay valid but are no longer returned by
    /// [`FakeModelProvider::get_model`].
    pub fn clear(&self) {
        let mut models = self.write_models();
        debug!(count = models.len(), "Clearing fake models");
        models.clear();
    }

    fn create_model(&self, name: &str) -> FakeModel {
        let builder = FakeModel::builder().name(name).delay(self.delay);
        let builder = match &self.response_factory {
            Some(factory) => builder.shared_response_factory(factory.clone()),
            None => builder,
        };
        builder.build()
    }

    // Map operations cannot panic halfway, so poisoning is ignored.
    fn read_models(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<FakeModel>>> {
        self.models.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_models(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<FakeModel>>> {
        self.models.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FakeModelProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl std::fmt::Debug for FakeModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.read_models().keys().cloned().collect();
        names.sort();
        f.debug_struct("FakeModelProvider")
            .field("delay", &self.delay)
            .field("models", &names)
            .finish_non_exhaustive()
    }
}

impl ModelProvider for FakeModelProvider {
    fn get_model(&self, model_name: &str) -> Arc<dyn Model> {
        FakeModelProvider::get_model(self, model_name)
    }
}

/// Builder for [`FakeModelProvider`]
pub struct FakeModelProviderBuilder {
    delay: Duration,
    response_factory: Option<SharedResponseFactory>,
}

impl Default for FakeModelProviderBuilder {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            response_factory: None,
        }
    }
}

impl FakeModelProviderBuilder {
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn response_factory<F>(mut self, f: F) -> Self
    where
        F: Fn(u64, &ModelInput) -> String + Send + Sync + 'static,
    {
        self.response_factory = Some(response::from_fn(f));
        self
    }

    pub fn try_response_factory<F, E>(mut self, f: F) -> Self
    where
        F: Fn(u64, &ModelInput) -> Result<String, E> + Send + Sync + 'static,
        E: Into<BoxError> + 'static,
    {
        self.response_factory = Some(response::try_from_fn(f));
        self
    }

    pub fn shared_response_factory(mut self, factory: SharedResponseFactory) -> Self {
        self.response_factory = Some(factory);
        self
    }

    pub fn build(self) -> FakeModelProvider {
        FakeModelProvider {
            delay: self.delay,
            response_factory: self.response_factory,
            models: RwLock::new(HashMap::new()),
        }
    }
}
