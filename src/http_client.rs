use reqwest::Client;
use std::time::Duration;

use crate::config::ServiceConfig;

/// Client for verifier calls: short timeout, bounded redirects.
pub fn build_verifier_client(services: &ServiceConfig) -> Client {
    build_client(&services.user_agent, services.request_timeout_secs)
}

/// Client for the completion service, which is allowed to think for longer.
pub fn build_completion_client(services: &ServiceConfig) -> Client {
    build_client(&services.user_agent, services.completion_timeout_secs)
}

pub fn build_client(user_agent: &str, timeout_secs: u64) -> Client {
    let timeout = Duration::from_secs(timeout_secs.max(1));
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default HTTP client");
            Client::new()
        })
}
