//! Ready-made fakes for test cases
//!
//! Each fixture hands out a fresh instance and undoes its state when it goes
//! out of scope: models are reset, providers are cleared.

use std::{
    ops::Deref,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use agents::ModelProvider;
use config::LoggingConfig;
use tracing_subscriber::EnvFilter;

use crate::{
    model::DEFAULT_DELAY, provider::FakeModelProviderBuilder, FakeModel, FakeModelProvider,
};

/// Install a test-friendly tracing subscriber using the default logging config
pub fn init_test_tracing() {
    init_test_tracing_with(&LoggingConfig::default());
}

/// Install a test-friendly tracing subscriber
///
/// Output goes through the test writer so it is captured per test. Only the
/// first call in a process installs anything.
pub fn init_test_tracing_with(logging_config: &LoggingConfig) {
    let filter = EnvFilter::try_new(logging_config.filter_directive())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter);

    let _ = match logging_config.format.as_str() {
        "json" => builder.json().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.pretty().try_init(),
    };
}

/// A [`FakeModel`] that is reset when dropped
pub struct ModelFixture {
    model: Arc<FakeModel>,
}

impl ModelFixture {
    pub fn new(model: FakeModel) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    /// Shared handle to the underlying model
    pub fn shared(&self) -> Arc<FakeModel> {
        self.model.clone()
    }
}

impl Deref for ModelFixture {
    type Target = FakeModel;

    fn deref(&self) -> &FakeModel {
        &self.model
    }
}

impl Drop for ModelFixture {
    fn drop(&mut self) {
        self.model.reset();
    }
}

/// A [`FakeModelProvider`] that is cleared when dropped
pub struct ProviderFixture {
    provider: Arc<FakeModelProvider>,
}

impl ProviderFixture {
    pub fn new(provider: FakeModelProvider) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    pub fn shared(&self) -> Arc<FakeModelProvider> {
        self.provider.clone()
    }

    /// The provider as the trait object a runner expects
    pub fn model_provider(&self) -> Arc<dyn ModelProvider> {
        self.provider.clone()
    }
}

impl Deref for ProviderFixture {
    type Target = FakeModelProvider;

    fn deref(&self) -> &FakeModelProvider {
        &self.provider
    }
}

impl Drop for ProviderFixture {
    fn drop(&mut self) {
        self.provider.clear();
    }
}

/// Fake model with the default 100 ms delay
pub fn fake_model() -> ModelFixture {
    ModelFixture::new(FakeModel::new(DEFAULT_DELAY))
}

/// Fake model provider with the default 100 ms delay
pub fn fake_model_provider() -> ProviderFixture {
    ProviderFixture::new(FakeModelProvider::new(DEFAULT_DELAY))
}

/// Fake model provider with zero delay for fast tests
pub fn no_delay_provider() -> ProviderFixture {
    ProviderFixture::new(FakeModelProvider::new(Duration::ZERO))
}

/// Creates customized providers and clears all of them when dropped
///
/// ```rust,ignore
/// let factory = FakeModelProviderFactory::new();
/// let slow = factory.create(Duration::from_secs(2));
/// let custom = factory.create_with(
///     FakeModelProvider::builder().response_factory(|_i, input| format!("Custom: {input}")),
/// );
/// ```
#[derive(Default)]
pub struct FakeModelProviderFactory {
    providers: Mutex<Vec<Arc<FakeModelProvider>>>,
}

impl FakeModelProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, delay: Duration) -> Arc<FakeModelProvider> {
        self.track(FakeModelProvider::new(delay))
    }

    pub fn create_with(&self, builder: FakeModelProviderBuilder) -> Arc<FakeModelProvider> {
        self.track(builder.build())
    }

    /// Number of providers created so far
    pub fn len(&self) -> usize {
        self.providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn track(&self, provider: FakeModelProvider) -> Arc<FakeModelProvider> {
        let provider = Arc::new(provider);
        self.providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(provider.clone());
        provider
    }
}

impl Drop for FakeModelProviderFactory {
    fn drop(&mut self) {
        let providers = self
            .providers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for provider in providers.drain(..) {
            provider.clear();
        }
    }
}
