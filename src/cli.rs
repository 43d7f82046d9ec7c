//! Command-line entry point: read configuration, initialize logging, print the participant
//! report.
//!
//! Every documented failure of the two flows ends in a printed report and a zero exit status;
//! only configuration problems (unparsable arguments, an unusable base URI, an HTTP client that
//! cannot be built) surface as errors.

// std
use std::time::Duration as StdDuration;
// crates.io
use clap::{Parser, ValueEnum};
use tokio::runtime::Builder as RuntimeBuilder;
use tracing_subscriber::{
	EnvFilter, fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt,
};
// self
use crate::{
	_prelude::*,
	auth::{PrivateKeyPem, ProjectId, ServiceAccountId, ServiceIdentity},
	config::ClientConfig,
	endpoint::DEFAULT_BASE_URI,
	flows::{ApiClient, ParticipantReport, TokenIssuer},
	http::ReqwestHttpClient,
};

/// Log line format written to stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
	/// Human-readable single-line events.
	#[default]
	Compact,
	/// One JSON object per event.
	Json,
}

/// Prints the participant count of an RKStudio project.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
	/// Project whose participants are counted.
	#[arg(long, env = "RKS_PROJECT_ID")]
	pub project_id: ProjectId,
	/// Service account that signs the client assertion.
	#[arg(long, env = "RKS_SERVICE_ACCOUNT")]
	pub service_account: ServiceAccountId,
	/// PEM-encoded RSA private key of the service account.
	#[arg(long, env = "RKS_PRIVATE_KEY", hide_env_values = true, allow_hyphen_values = true)]
	pub private_key: PrivateKeyPem,
	/// Base URI of the API.
	#[arg(long, env = "RKS_BASE_URI", default_value = DEFAULT_BASE_URI)]
	pub base_uri: Url,
	/// Per-request timeout in seconds; 0 disables it.
	#[arg(long, env = "RKS_TIMEOUT_SECS", default_value_t = 30)]
	pub timeout_secs: u64,
	/// Log filter directive, e.g. `info` or `rkstudio_client=debug`.
	#[arg(long, env = "LOG_LEVEL", default_value = "info")]
	pub log_level: String,
	/// Log line format.
	#[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
	pub log_format: LogFormat,
}
impl Args {
	/// Assembles the validated client configuration.
	pub fn client_config(&self) -> Result<ClientConfig> {
		let identity = ServiceIdentity::from_parts(
			self.project_id.clone(),
			self.service_account.clone(),
			self.private_key.clone(),
		);
		let builder = ClientConfig::builder(identity).base_uri(self.base_uri.clone());
		let builder = match self.timeout_secs {
			0 => builder.no_timeout(),
			secs => builder.timeout(StdDuration::from_secs(secs)),
		};

		Ok(builder.build()?)
	}
}

/// Installs the global tracing subscriber writing to stderr.
///
/// An unparsable filter falls back to `info`; a subscriber that is already installed is kept.
pub fn init_logging(level: &str, format: LogFormat) {
	let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
	let registry = tracing_subscriber::registry().with(filter);

	match format {
		LogFormat::Json => {
			let layer = fmt::layer()
				.json()
				.with_timer(UtcTime::rfc_3339())
				.flatten_event(true)
				.with_ansi(false)
				.with_writer(std::io::stderr);

			let _ = registry.with(layer).try_init();
		},
		LogFormat::Compact => {
			let layer = fmt::layer()
				.compact()
				.with_timer(UtcTime::rfc_3339())
				.with_writer(std::io::stderr);

			let _ = registry.with(layer).try_init();
		},
	}
}

/// Runs both flows for `config` over its default transport.
pub async fn run(config: &ClientConfig) -> Result<ParticipantReport> {
	let http_client = Arc::new(config.http_client()?);
	let issuer: TokenIssuer<ReqwestHttpClient> =
		TokenIssuer::from_config(config, http_client.clone());
	let api: ApiClient<ReqwestHttpClient> = ApiClient::from_config(config, http_client);

	tracing::debug!(
		base_uri = %config.endpoints.base(),
		project_id = %config.identity.project_id(),
		service_account = %config.identity.service_account(),
		key_fingerprint = %config.identity.private_key().fingerprint(),
		"Client configured."
	);

	Ok(ParticipantReport::collect(&issuer, &api, &config.identity).await)
}

/// Process entry point used by the `rks-participants` binary.
pub fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	init_logging(&args.log_level, args.log_format);

	let config = args.client_config()?;
	let runtime = RuntimeBuilder::new_current_thread().enable_all().build()?;
	let report = runtime.block_on(run(&config))?;

	println!("{report}");

	Ok(())
}
