//! Configuration module
//!
//! Settings are read from the process environment (after loading an optional `.env` file)
//! with typed parsing and defaults. [`Config::validate`] rejects values the server cannot
//! start with.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const SERVER_PORT: u16 = 8091;
const S3_REGION: &str = "us-east-1";
const PROBE_TIMEOUT_SECS: u64 = 30;
const REMUX_TIMEOUT_SECS: u64 = 300;
const STORAGE_TIMEOUT_SECS: u64 = 600;
const SIGNED_URL_TTL_SECS: u64 = 15 * 60;
const MAX_VIDEO_SIZE_BYTES: u64 = 1 << 30;
const MAX_THUMBNAIL_SIZE_BYTES: u64 = 10 << 20;
const RECONCILE_INTERVAL_SECS: u64 = 300;
const MP4_CONTENT_TYPE: &str = "video/mp4";

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid LOG_FORMAT: {}", s)),
        }
    }
}

/// Object storage configuration
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub s3_bucket: String,
    pub s3_region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub s3_endpoint: Option<String>,
    /// Deadline applied to every put/sign/delete call
    pub timeout: Duration,
    /// Lifetime of signed GET URLs handed to clients
    pub signed_url_ttl: Duration,
}

/// Media processing configuration
#[derive(Clone, Debug)]
pub struct MediaConfig {
    /// Root directory under which each upload gets its own staging directory
    pub staging_dir: PathBuf,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub probe_timeout: Duration,
    pub remux_timeout: Duration,
    pub max_video_size_bytes: u64,
    pub video_allowed_content_types: Vec<String>,
    pub max_thumbnail_size_bytes: u64,
    pub thumbnail_allowed_content_types: Vec<String>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    pub jwt_secret: String,
    /// Base URL used to build thumbnail retrieval URLs
    pub public_base_url: String,
    pub storage: StorageConfig,
    pub media: MediaConfig,
    /// Interval of the pending-upload sweep; `None` disables it
    pub reconcile_interval: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            log_format: LogFormat::Text,
            jwt_secret: String::new(),
            public_base_url: format!("http://localhost:{}", SERVER_PORT),
            storage: StorageConfig {
                s3_bucket: String::new(),
                s3_region: S3_REGION.to_string(),
                s3_endpoint: None,
                timeout: Duration::from_secs(STORAGE_TIMEOUT_SECS),
                signed_url_ttl: Duration::from_secs(SIGNED_URL_TTL_SECS),
            },
            media: MediaConfig {
                staging_dir: env::temp_dir(),
                ffprobe_path: "ffprobe".to_string(),
                ffmpeg_path: "ffmpeg".to_string(),
                probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
                remux_timeout: Duration::from_secs(REMUX_TIMEOUT_SECS),
                max_video_size_bytes: MAX_VIDEO_SIZE_BYTES,
                video_allowed_content_types: vec![MP4_CONTENT_TYPE.to_string()],
                max_thumbnail_size_bytes: MAX_THUMBNAIL_SIZE_BYTES,
                thumbnail_allowed_content_types: vec![
                    "image/jpeg".to_string(),
                    "image/png".to_string(),
                ],
            },
            reconcile_interval: Some(Duration::from_secs(RECONCILE_INTERVAL_SECS)),
        }
    }
}

fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, anyhow::Error> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", name, raw)),
        _ => Ok(default),
    }
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or(defaults.environment);

        let server_port = parse_env("PORT", SERVER_PORT)?;

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or(defaults.cors_origins);

        let log_format = parse_env("LOG_FORMAT", LogFormat::Text)?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_default();

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", server_port));

        let storage = StorageConfig {
            s3_bucket: env::var("S3_BUCKET").unwrap_or_default(),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| S3_REGION.to_string()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.trim().is_empty()),
            timeout: Duration::from_secs(parse_env("STORAGE_TIMEOUT_SECS", STORAGE_TIMEOUT_SECS)?),
            signed_url_ttl: Duration::from_secs(parse_env(
                "SIGNED_URL_TTL_SECS",
                SIGNED_URL_TTL_SECS,
            )?),
        };

        let media = MediaConfig {
            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.media.staging_dir),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or(defaults.media.ffprobe_path),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or(defaults.media.ffmpeg_path),
            probe_timeout: Duration::from_secs(parse_env("PROBE_TIMEOUT_SECS", PROBE_TIMEOUT_SECS)?),
            remux_timeout: Duration::from_secs(parse_env("REMUX_TIMEOUT_SECS", REMUX_TIMEOUT_SECS)?),
            max_video_size_bytes: parse_env("MAX_VIDEO_SIZE_BYTES", MAX_VIDEO_SIZE_BYTES)?,
            video_allowed_content_types: defaults.media.video_allowed_content_types,
            max_thumbnail_size_bytes: parse_env(
                "MAX_THUMBNAIL_SIZE_BYTES",
                MAX_THUMBNAIL_SIZE_BYTES,
            )?,
            thumbnail_allowed_content_types: defaults.media.thumbnail_allowed_content_types,
        };

        let reconcile_secs = parse_env("RECONCILE_INTERVAL_SECS", RECONCILE_INTERVAL_SECS)?;
        let reconcile_interval = (reconcile_secs > 0).then(|| Duration::from_secs(reconcile_secs));

        let config = Config {
            server_port,
            environment,
            cors_origins,
            log_format,
            jwt_secret,
            public_base_url,
            storage,
            media,
            reconcile_interval,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow::anyhow!("JWT_SECRET must be set"));
        }
        if self.storage.s3_bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("S3_BUCKET must be set"));
        }
        if self.is_production() && self.cors_origins.iter().any(|o| o.trim() == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        // The remuxer always writes an mp4 container.
        if self.media.video_allowed_content_types != [MP4_CONTENT_TYPE] {
            return Err(anyhow::anyhow!(
                "Video uploads only accept {}",
                MP4_CONTENT_TYPE
            ));
        }
        if self.media.thumbnail_allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("Allowed thumbnail types must not be empty"));
        }
        for (name, value) in [
            ("PROBE_TIMEOUT_SECS", self.media.probe_timeout),
            ("REMUX_TIMEOUT_SECS", self.media.remux_timeout),
            ("STORAGE_TIMEOUT_SECS", self.storage.timeout),
            ("SIGNED_URL_TTL_SECS", self.storage.signed_url_ttl),
        ] {
            if value.is_zero() {
                return Err(anyhow::anyhow!("{} must be greater than zero", name));
            }
        }
        Ok(())
    }
}
