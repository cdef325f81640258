//! Credential resolution.
//!
//! Secrets come from the config file's `api_key` or from the environment
//! variable named by `api_key_env`. They are handed to the session and never
//! written anywhere.

use bookwright_domain::{CredentialSet, ProviderConfig, ProviderCredential, ProviderKind};
use tracing::debug;

/// Resolve a credential for every provider that has a usable key.
pub fn resolve_credentials(config: &ProviderConfig) -> CredentialSet {
    resolve_with(config, |name| std::env::var(name).ok())
}

/// Same as [`resolve_credentials`] with an injectable environment lookup.
pub fn resolve_with<F>(config: &ProviderConfig, lookup: F) -> CredentialSet
where
    F: Fn(&str) -> Option<String>,
{
    let sources = [
        (ProviderKind::OpenAi, &config.openai.api_key, &config.openai.api_key_env),
        (ProviderKind::Anthropic, &config.anthropic.api_key, &config.anthropic.api_key_env),
        (ProviderKind::Gemini, &config.gemini.api_key, &config.gemini.api_key_env),
    ];

    let mut set = CredentialSet::new();
    for (kind, direct, env_var) in sources {
        // A key in the config file wins over the environment.
        let secret = direct
            .clone()
            .filter(|s| !s.trim().is_empty())
            .map(|s| (s, "config"))
            .or_else(|| {
                lookup(env_var.as_str())
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| (s, "env"))
            });
        match secret {
            Some((secret, source)) => {
                debug!(provider = %kind, source, "Resolved API key");
                set.insert(ProviderCredential::new(kind, secret));
            }
            None => debug!(provider = %kind, env_var = %env_var, "No API key configured"),
        }
    }
    set
}

/// Environment variable consulted for `provider`.
pub fn api_key_env(config: &ProviderConfig, provider: ProviderKind) -> &str {
    match provider {
        ProviderKind::OpenAi => &config.openai.api_key_env,
        ProviderKind::Anthropic => &config.anthropic.api_key_env,
        ProviderKind::Gemini => &config.gemini.api_key_env,
    }
}
