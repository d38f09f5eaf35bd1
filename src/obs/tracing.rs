// crates.io
use tracing::{Span, instrument::Instrumented};
use tracing_subscriber::{
	EnvFilter,
	layer::SubscriberExt,
	util::{SubscriberInitExt, TryInitError},
};
// self
use crate::{_prelude::*, auth::AuthType};

/// Span wrapper used by the dispatcher.
#[derive(Clone, Debug)]
pub struct TokenSpan {
	span: Span,
}
impl TokenSpan {
	/// Creates a new span tagged with the provided auth type + stage.
	pub fn new(auth_type: AuthType, stage: &'static str) -> Self {
		let span = tracing::info_span!("autodoc.token", auth_type = auth_type.as_str(), stage);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}

/// Installs the global formatting subscriber.
///
/// `RUST_LOG` takes precedence; `default_filter` applies when it is unset or invalid.
pub fn init_subscriber(default_filter: &str) -> Result<(), TryInitError> {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

	tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).try_init()
}
