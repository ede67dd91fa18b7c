pub mod age;
pub mod certificate;
pub mod domain_age;
pub mod registry;
pub mod torrent;
pub mod types;

use std::sync::Arc;

pub use certificate::CertificateVerifier;
pub use domain_age::DomainAgeVerifier;
pub use registry::RegistryVerifier;
pub use torrent::TorrentVerifier;
pub use types::{Verifier, VerifierKind, VerifierResult};

use crate::config::ServiceConfig;
use crate::http_client::build_verifier_client;

/// The fixed set of checks the aggregator runs, one slot per signal.
///
/// Slots hold trait objects so tests can substitute instrumented fakes; the
/// set itself is closed because the escalation order depends on it.
#[derive(Clone)]
pub struct VerifierSet {
    pub registry: Arc<dyn Verifier>,
    pub torrent: Arc<dyn Verifier>,
    pub certificate: Arc<dyn Verifier>,
    pub domain_age: Arc<dyn Verifier>,
}

impl VerifierSet {
    /// Production verifiers sharing one pooled HTTP client.
    pub fn from_services(services: &ServiceConfig) -> Self {
        let client = build_verifier_client(services);
        Self {
            registry: Arc::new(RegistryVerifier::new(client.clone())),
            torrent: Arc::new(TorrentVerifier::new(client.clone())),
            certificate: Arc::new(CertificateVerifier::new(
                client.clone(),
                services.certificate_service_url.clone(),
            )),
            domain_age: Arc::new(DomainAgeVerifier::new(
                client,
                services.whois_service_url.clone(),
                services.whois_api_key.clone(),
            )),
        }
    }
}
