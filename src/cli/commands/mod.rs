use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("recupero")
        .about("Credential recovery service")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("RECUPERO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("base-url")
                .short('b')
                .long("base-url")
                .help("Portal base URL used to build recovery links, example: https://portal.tld")
                .env("RECUPERO_BASE_URL")
                .required(true),
        )
        .arg(
            Arg::new("credential-store-url")
                .long("credential-store-url")
                .help("Credential store base URL, the service that stores secrets")
                .env("RECUPERO_CREDENTIAL_STORE_URL")
                .required(true),
        )
        .arg(
            Arg::new("endpoints")
                .short('e')
                .long("endpoints")
                .help("Comma-separated ordered list of notification webhook URLs; empty logs instead of sending")
                .env("RECUPERO_ENDPOINTS"),
        )
        .arg(
            Arg::new("delivery-token")
                .long("delivery-token")
                .help("Bearer token presented to notification endpoints")
                .env("RECUPERO_DELIVERY_TOKEN"),
        )
        .arg(
            Arg::new("token-ttl-hours")
                .long("token-ttl-hours")
                .help("Recovery token validity window in hours")
                .default_value("24")
                .env("RECUPERO_TOKEN_TTL_HOURS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("purge-interval-seconds")
                .long("purge-interval-seconds")
                .help("How often expired tokens are purged")
                .default_value("900")
                .env("RECUPERO_PURGE_INTERVAL_SECONDS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("min-secret-length")
                .long("min-secret-length")
                .help("Minimum accepted length for a new secret")
                .default_value("12")
                .env("RECUPERO_MIN_SECRET_LENGTH")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("max-attempts")
                .long("max-attempts")
                .help("Delivery attempts per endpoint before falling back to the next one")
                .default_value("3")
                .env("RECUPERO_MAX_ATTEMPTS")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("base-delay-seconds")
                .long("base-delay-seconds")
                .help("Initial backoff delay between delivery attempts")
                .default_value("1")
                .env("RECUPERO_BASE_DELAY_SECONDS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("max-delay-seconds")
                .long("max-delay-seconds")
                .help("Backoff delay cap")
                .default_value("3")
                .env("RECUPERO_MAX_DELAY_SECONDS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("attempt-timeout-seconds")
                .long("attempt-timeout-seconds")
                .help("Deadline per delivery attempt; expiry counts as a transient failure")
                .default_value("10")
                .env("RECUPERO_ATTEMPT_TIMEOUT_SECONDS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("expose-diagnostics")
                .long("expose-diagnostics")
                .help("Attach delivery diagnostics to /recover responses (operator/debug use only)")
                .env("RECUPERO_EXPOSE_DIAGNOSTICS")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("RECUPERO_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
