use secrecy::SecretString;

/// Server wiring parsed from the CLI/environment.
#[derive(Debug, Clone)]
pub struct ServerArgs {
    pub base_url: String,
    pub endpoints: Vec<String>,
    pub credential_store_url: String,
    pub delivery_token: Option<SecretString>,
    pub token_ttl_hours: u64,
    pub purge_interval_seconds: u64,
    pub min_secret_length: usize,
    pub max_attempts_per_endpoint: u32,
    pub base_delay_seconds: u64,
    pub max_delay_seconds: u64,
    pub attempt_timeout_seconds: u64,
    pub expose_diagnostics: bool,
}

impl ServerArgs {
    #[must_use]
    pub fn new(base_url: String, credential_store_url: String) -> Self {
        Self {
            base_url,
            endpoints: Vec::new(),
            credential_store_url,
            delivery_token: None,
            token_ttl_hours: 24,
            purge_interval_seconds: 900,
            min_secret_length: 12,
            max_attempts_per_endpoint: 3,
            base_delay_seconds: 1,
            max_delay_seconds: 3,
            attempt_timeout_seconds: 10,
            expose_diagnostics: false,
        }
    }
}
