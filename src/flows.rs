//! High-level operations of the ESIA client.

pub mod authorization;
pub mod exchange;

pub(crate) mod common;

pub use authorization::*;
pub use exchange::*;

// self
use crate::{
	_prelude::*, config::EsiaConfig, http::ProviderHttpClient, sign::Signer,
	transport::TransportErrorMapper,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, transport::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestEsiaClient = EsiaClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Talks to a single ESIA portal on behalf of one registered information system.
///
/// The client owns the HTTP transport, the error mapper, the immutable configuration, and
/// the signer built from the configured certificate and key. Every operation generates its
/// own timestamp, state, and signature, so a client can be shared freely between tasks.
pub struct EsiaClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Configuration the client was built from.
	pub config: Arc<EsiaConfig>,
	signer: Arc<Signer>,
}
impl<C, M> EsiaClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	///
	/// Fails when the configured certificate or key cannot be loaded.
	pub fn with_http_client(
		config: EsiaConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let signer = Signer::new(&config.certificate, config.key())?;

		Ok(Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			config: Arc::new(config),
			signer: Arc::new(signer),
		})
	}

	/// Signer built from the configured certificate and key.
	pub fn signer(&self) -> &Signer {
		&self.signer
	}
}
#[cfg(feature = "reqwest")]
impl EsiaClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new client that provisions its own reqwest-backed transport.
	pub fn new(config: EsiaConfig) -> Result<Self> {
		Self::with_http_client(config, ReqwestHttpClient::default(), ReqwestTransportErrorMapper)
	}
}
impl<C, M> Clone for EsiaClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
			config: Arc::clone(&self.config),
			signer: Arc::clone(&self.signer),
		}
	}
}
impl<C, M> Debug for EsiaClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("EsiaClient")
			.field("config", &self.config)
			.field("signer", &self.signer)
			.finish()
	}
}
