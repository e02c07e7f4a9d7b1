use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::workflows::screening::{CommunicationStyle, ExportFormat, Language, QuestionDifficulty};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application, read once at process start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub screening: ScreeningConfig,
    pub questions: QuestionServiceConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&env_or("APP_ENV", "development"));

        let host = env_or("APP_HOST", "127.0.0.1");
        let port = env_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env_or("APP_LOG_LEVEL", "info");

        let screening = ScreeningConfig {
            max_experience_years: parse_env("MAX_EXPERIENCE_YEARS", 60)?,
            questions_per_technology: parse_env("QUESTIONS_PER_TECHNOLOGY", 3)?,
            communication_style: choice_env(
                "COMMUNICATION_STYLE",
                CommunicationStyle::Professional,
                CommunicationStyle::parse,
            )?,
            difficulty: choice_env(
                "QUESTION_DIFFICULTY",
                QuestionDifficulty::Adaptive,
                QuestionDifficulty::parse,
            )?,
            language: choice_env("APP_LANGUAGE", Language::English, Language::parse)?,
            detect_language: parse_flag("LANGUAGE_DETECTION", true)?,
        };
        if screening.questions_per_technology == 0 {
            return Err(ConfigError::InvalidValue {
                variable: "QUESTIONS_PER_TECHNOLOGY",
                value: "0".to_string(),
            });
        }

        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_API_KEY);

        let questions = QuestionServiceConfig {
            api_key,
            base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            model: env_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            ai_enabled: parse_flag("AI_QUESTIONS_ENABLED", true)?,
            timeout: Duration::from_secs(parse_env("QUESTION_TIMEOUT_SECS", 8)?),
            cache_ttl: Duration::from_secs(parse_env("QUESTION_CACHE_TTL_SECS", 300)?),
        };

        let export = ExportConfig {
            directory: PathBuf::from(env_or("EXPORT_DIR", "candidate_data")),
            format: choice_env("EXPORT_FORMAT", ExportFormat::Json, ExportFormat::parse)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            screening,
            questions,
            export,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the conversation itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningConfig {
    pub max_experience_years: u32,
    pub questions_per_technology: usize,
    pub communication_style: CommunicationStyle,
    pub difficulty: QuestionDifficulty,
    /// Language a session starts in and returns to on reset.
    pub language: Language,
    /// Switch an English session to the candidate's language when they write in it.
    pub detect_language: bool,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            max_experience_years: 60,
            questions_per_technology: 3,
            communication_style: CommunicationStyle::Professional,
            difficulty: QuestionDifficulty::Adaptive,
            language: Language::English,
            detect_language: true,
        }
    }
}

/// Connection settings for the text-generation backend.
#[derive(Debug, Clone)]
pub struct QuestionServiceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub ai_enabled: bool,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl QuestionServiceConfig {
    /// The AI provider only joins the chain when switched on and a key is present.
    pub fn ai_available(&self) -> bool {
        self.ai_enabled && self.api_key.is_some()
    }
}

impl Default for QuestionServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            ai_enabled: false,
            timeout: Duration::from_secs(8),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Where and how completed sessions are written.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("candidate_data"),
            format: ExportFormat::Json,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue {
                variable,
                value: raw,
            }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(variable: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(variable) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                variable,
                value: raw,
            }),
        },
        Err(_) => Ok(default),
    }
}

fn choice_env<T>(
    variable: &'static str,
    default: T,
    parse: fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => parse(&raw).ok_or(ConfigError::InvalidValue {
            variable,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { variable: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { variable, value } => {
                write!(f, "{variable} has an unsupported value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidValue { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
