use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use provider_auth::providers::{
    ProviderConfig, ProviderEndpoints, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL,
};
use provider_auth::Error;
use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;

/// Default scopes: the signed-in user's email address and basic profile.
pub const DEFAULT_SCOPES: &str =
    "https://www.googleapis.com/auth/userinfo.email,https://www.googleapis.com/auth/userinfo.profile";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The OAuth client ID registered with the identity provider.
    #[arg(long, env)]
    client_id: Option<String>,

    /// The OAuth client secret registered with the identity provider.
    #[arg(long, env, hide_env_values = true)]
    client_secret: Option<String>,

    /// The callback URL, exactly as registered with the identity provider.
    #[arg(long, env, default_value = "http://localhost:8080/callback")]
    redirect_uri: String,

    /// The scopes requested during login.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = DEFAULT_SCOPES
    )]
    pub scopes: Vec<String>,

    /// The provider's authorization endpoint.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = GOOGLE_AUTH_URL)]
    auth_url: String,

    /// The provider's token endpoint. Must be https outside of loopback hosts.
    #[arg(long, env, default_value = GOOGLE_TOKEN_URL)]
    token_url: String,

    /// The provider's userinfo endpoint used to resolve bearer tokens.
    #[arg(long, env, default_value = GOOGLE_USERINFO_URL)]
    userinfo_url: String,

    /// Seconds a login attempt may take before its state token expires
    #[arg(long, env, default_value_t = 600)]
    pub state_ttl_seconds: u64,

    /// Seconds between sweeps removing abandoned login attempts
    #[arg(long, env, default_value_t = 60)]
    pub state_sweep_interval_seconds: u64,

    /// Timeout in seconds for each call to the identity provider
    #[arg(long, env, default_value_t = 30)]
    pub provider_timeout_seconds: u64,

    /// Retries with exponential backoff for token validation calls. Token exchange is never retried.
    #[arg(long, env, default_value_t = 0)]
    pub validate_max_retries: u32,

    /// Path of the neutral page browsers are sent to when a login does not complete
    #[arg(long, env, default_value = "/")]
    landing_path: String,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 8080)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Parse configuration from an explicit argument list, skipping the `.env` file.
    ///
    /// Flags absent from `args` still fall back to exported environment variables, so
    /// callers that must not depend on the environment pass every flag they read.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Config::parse_from(args)
    }

    pub fn set_provider_urls(
        mut self,
        auth_url: String,
        token_url: String,
        userinfo_url: String,
    ) -> Self {
        self.auth_url = auth_url;
        self.token_url = token_url;
        self.userinfo_url = userinfo_url;
        self
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the configured provider endpoints.
    pub fn provider_endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints {
            auth_url: self.auth_url.clone(),
            token_url: self.token_url.clone(),
            userinfo_url: self.userinfo_url.clone(),
        }
    }

    /// Returns the path of the neutral page unfinished logins are redirected to.
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    /// Builds the validated provider configuration.
    ///
    /// Fails when credentials are missing or placeholders, or when an endpoint is malformed
    /// or not reached over TLS. Intended to run once at startup.
    pub fn provider_config(&self) -> Result<ProviderConfig, Error> {
        ProviderConfig::new(
            self.client_id.as_deref().unwrap_or_default(),
            SecretString::new(self.client_secret.clone().unwrap_or_default()),
            &self.redirect_uri,
            self.scopes.iter().cloned(),
            &self.provider_endpoints(),
        )
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
