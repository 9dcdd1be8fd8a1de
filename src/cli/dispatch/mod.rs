use crate::cli::{actions::Action, globals::ServerArgs};
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let base_url = matches
        .get_one::<String>("base-url")
        .map(String::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --base-url"))?;

    let credential_store_url = matches
        .get_one::<String>("credential-store-url")
        .map(String::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --credential-store-url"))?;

    let mut args = ServerArgs::new(base_url, credential_store_url);

    // Ordered, comma-separated; order is the fallback order.
    args.endpoints = matches
        .get_one::<String>("endpoints")
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    args.delivery_token = matches
        .get_one::<String>("delivery-token")
        .map(|token| SecretString::from(token.to_string()));

    if let Some(hours) = matches.get_one::<u64>("token-ttl-hours") {
        args.token_ttl_hours = *hours;
    }
    if let Some(seconds) = matches.get_one::<u64>("purge-interval-seconds") {
        args.purge_interval_seconds = *seconds;
    }
    if let Some(length) = matches.get_one::<u64>("min-secret-length") {
        args.min_secret_length = usize::try_from(*length).unwrap_or(usize::MAX);
    }
    if let Some(attempts) = matches.get_one::<u32>("max-attempts") {
        args.max_attempts_per_endpoint = *attempts;
    }
    if let Some(seconds) = matches.get_one::<u64>("base-delay-seconds") {
        args.base_delay_seconds = *seconds;
    }
    if let Some(seconds) = matches.get_one::<u64>("max-delay-seconds") {
        args.max_delay_seconds = *seconds;
    }
    if let Some(seconds) = matches.get_one::<u64>("attempt-timeout-seconds") {
        args.attempt_timeout_seconds = *seconds;
    }
    args.expose_diagnostics = matches.get_flag("expose-diagnostics");

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        args: Box::new(args),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn handler_builds_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "recupero",
            "--base-url",
            "https://portal.tld",
            "--credential-store-url",
            "https://accounts.tld",
            "--endpoints",
            "https://mail-1.tld/hook, https://mail-2.tld/hook,",
            "--max-attempts",
            "5",
            "--expose-diagnostics",
        ]);

        let action = handler(&matches);
        let Ok(Action::Server { port, args }) = action else {
            panic!("expected server action");
        };
        assert_eq!(port, 8080);
        assert_eq!(args.base_url, "https://portal.tld");
        assert_eq!(
            args.endpoints,
            vec![
                "https://mail-1.tld/hook".to_string(),
                "https://mail-2.tld/hook".to_string()
            ]
        );
        assert_eq!(args.max_attempts_per_endpoint, 5);
        assert!(args.expose_diagnostics);
    }

    #[test]
    fn handler_defaults_without_endpoints() {
        let matches = commands::new().get_matches_from(vec![
            "recupero",
            "--base-url",
            "https://portal.tld",
            "--credential-store-url",
            "https://accounts.tld",
        ]);

        let action = handler(&matches);
        let Ok(Action::Server { args, .. }) = action else {
            panic!("expected server action");
        };
        assert!(args.endpoints.is_empty());
        assert_eq!(args.token_ttl_hours, 24);
        assert!(!args.expose_diagnostics);
    }
}
