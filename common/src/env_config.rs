use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds everything needed to initialize and run the service:
/// database connection, JWT configuration, server binding, CORS,
/// logging preferences and the payment gateway credentials.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Configuration for JWT (JSON Web Token) authentication.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Maximum requests per second accepted by the global limiter.
    pub global_rate_limit: u32,
    /// Public base URL of this deployment, used to build gateway
    /// return/result URLs.
    pub app_base_url: String,
    /// Credentials for the ECPay payment gateway.
    pub ecpay: EcpayConfig,
}

#[derive(Clone, Debug)]
/// Credentials and mode for the ECPay payment gateway.
///
/// `hash_key` and `hash_iv` are the shared secret pair used to compute
/// and verify CheckMacValue signatures. `test_mode` selects the staging
/// endpoints instead of production.
pub struct EcpayConfig {
    pub merchant_id: String,
    pub hash_key: String,
    pub hash_iv: String,
    pub test_mode: bool,
}

#[derive(Clone, Debug)]
/// Configuration for JSON Web Token (JWT) authentication.
pub struct JwtConfig {
    /// The secret key used to sign and verify JWTs.
    pub secret: String,
    /// The expiration time for JWTs in hours.
    pub expiration_hours: i64,
}

impl JwtConfig {
    /// Creates a new `JwtConfig` instance from environment variables.
    ///
    /// - `JWT_SECRET`: Required. The secret key for JWT signing.
    /// - `JWT_EXPIRATION_HOURS`: Optional. Defaults to 24 hours.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or `JWT_EXPIRATION_HOURS` is set
    /// but not a valid number.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        JwtConfig {
            secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a valid number"),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`: "development" or "production"
    /// - `DATABASE_URL`: Connection string for the database
    /// - `JWT_SECRET`: Secret key for JWT signing (via `JwtConfig::from_env()`)
    /// - `ECPAY_MERCHANT_ID`, `ECPAY_HASH_KEY`, `ECPAY_HASH_IV`: gateway
    ///   credentials
    ///
    /// Optional (with defaults):
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `GLOBAL_RATE_LIMIT`: Requests per second (default: 10)
    /// - `APP_BASE_URL`: Public base URL (default: "http://localhost:8080")
    /// - `ECPAY_TEST_MODE`: Use the gateway staging environment (default: true)
    ///
    /// # Panics
    ///
    /// Panics if required environment variables are missing.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_config: JwtConfig::from_env(),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            global_rate_limit: env::var("GLOBAL_RATE_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            ecpay: EcpayConfig {
                merchant_id: env::var("ECPAY_MERCHANT_ID")
                    .expect("ECPAY_MERCHANT_ID must be set"),
                hash_key: env::var("ECPAY_HASH_KEY").expect("ECPAY_HASH_KEY must be set"),
                hash_iv: env::var("ECPAY_HASH_IV").expect("ECPAY_HASH_IV must be set"),
                test_mode: env::var("ECPAY_TEST_MODE")
                    .unwrap_or_else(|_| "true".to_string())
                    .to_lowercase()
                    == "true",
            },
        })
    }
}
