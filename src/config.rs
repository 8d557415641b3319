use std::fmt;

use anyhow::Context;

const ENV_PREFIX: &str = "ECOM_ACCOUNT_SERVICE_";

#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub test_name: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
}

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Clone)]
pub struct AppConfig {
    pub db: DbConfig,
    pub jwt: JwtConfig,
    pub server_url: String,
    pub frontend_url: String,
    pub product_service_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db = DbConfig {
            host: optional("DB_HOST").unwrap_or_else(|| "localhost".into()),
            port: optional("DB_PORT")
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("ECOM_ACCOUNT_SERVICE_DB_PORT is not a valid port")?
                .unwrap_or(5432),
            name: required("DB_NAME")?,
            test_name: required("DB_TEST_NAME")?,
            username: required("DB_USERNAME")?,
            password: required("DB_PASSWORD")?,
            max_connections: optional("DB_MAX_CONNECTIONS")
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("ECOM_ACCOUNT_SERVICE_DB_MAX_CONNECTIONS is not a number")?
                .unwrap_or(10),
        };
        let jwt = JwtConfig {
            secret: required("JWT_SECRET_KEY")?,
        };
        let config = Self {
            db,
            jwt,
            server_url: required("URL")?,
            frontend_url: required("FRONTEND_URL")?,
            product_service_url: required("PRODUCT_SERVICE_URL")?,
        };
        // fail at startup rather than at bind time
        config.listen_addr()?;
        Ok(config)
    }

    /// `host:port` to bind, taken from the service URL.
    pub fn listen_addr(&self) -> anyhow::Result<String> {
        listen_addr_from_url(&self.server_url)
    }
}

fn listen_addr_from_url(url: &str) -> anyhow::Result<String> {
    let without_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    let authority = without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .trim();

    let (host, port) = authority
        .rsplit_once(':')
        .with_context(|| format!("service url {url:?} has no port"))?;
    port.parse::<u16>()
        .with_context(|| format!("service url {url:?} has an invalid port"))?;
    let host = if host.is_empty() { "0.0.0.0" } else { host };
    Ok(format!("{host}:{port}"))
}

fn required(key: &str) -> anyhow::Result<String> {
    optional(key).with_context(|| format!("{ENV_PREFIX}{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("test_name", &self.test_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("db", &self.db)
            .field("jwt", &self.jwt)
            .field("server_url", &self.server_url)
            .field("frontend_url", &self.frontend_url)
            .field("product_service_url", &self.product_service_url)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        db: DbConfig {
            host: "localhost".into(),
            port: 5432,
            name: "ecom_account".into(),
            test_name: "ecom_account_test".into(),
            username: "postgres".into(),
            password: "postgres".into(),
            max_connections: 2,
        },
        jwt: JwtConfig {
            secret: "test-secret".into(),
        },
        server_url: "http://localhost:8010".into(),
        frontend_url: "http://localhost:3000".into(),
        product_service_url: "http://localhost:8020".into(),
    }
}
