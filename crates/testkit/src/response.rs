//! Response factories: how a fake model turns a call into text

use std::sync::Arc;

use agents::{BoxError, ModelInput};

/// Computes a fake model's output text from the 1-based call index and input
///
/// Errors are handed back to the caller of the model unchanged, wrapped in
/// [`agents::ModelError::ResponseFactory`].
pub trait ResponseFactory: Send + Sync {
    fn respond(&self, call_index: u64, input: &ModelInput) -> Result<String, BoxError>;
}

pub type SharedResponseFactory = Arc<dyn ResponseFactory>;

/// Default response text: `"Fake response #{call_index}"`
pub fn default_response_factory(call_index: u64, _input: &ModelInput) -> String {
    format!("Fake response #{call_index}")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResponseFactory;

impl ResponseFactory for DefaultResponseFactory {
    fn respond(&self, call_index: u64, input: &ModelInput) -> Result<String, BoxError> {
        Ok(default_response_factory(call_index, input))
    }
}

/// Adapter for infallible closures
pub struct FnResponseFactory<F>(pub F);

impl<F> ResponseFactory for FnResponseFactory<F>
where
    F: Fn(u64, &ModelInput) -> String + Send + Sync,
{
    fn respond(&self, call_index: u64, input: &ModelInput) -> Result<String, BoxError> {
        Ok((self.0)(call_index, input))
    }
}

/// Adapter for closures that can fail
pub struct TryFnResponseFactory<F>(pub F);

impl<F, E> ResponseFactory for TryFnResponseFactory<F>
where
    F: Fn(u64, &ModelInput) -> Result<String, E> + Send + Sync,
    E: Into<BoxError>,
{
    fn respond(&self, call_index: u64, input: &ModelInput) -> Result<String, BoxError> {
        (self.0)(call_index, input).map_err(Into::into)
    }
}

pub fn from_fn<F>(f: F) -> SharedResponseFactory
where
    F: Fn(u64, &ModelInput) -> String + Send + Sync + 'static,
{
    Arc::new(FnResponseFactory(f))
}

pub fn try_from_fn<F, E>(f: F) -> SharedResponseFactory
where
    F: Fn(u64, &ModelInput) -> Result<String, E> + Send + Sync + 'static,
    E: Into<BoxError> + 'static,
{
    Arc::new(TryFnResponseFactory(f))
}
