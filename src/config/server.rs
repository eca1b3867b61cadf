use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;
use url::Url;

use super::ParseError;
use crate::util::figment::FigmentErrorAttachable;
use crate::util::Sensitive;

#[derive(Debug, Deserialize)]
pub struct Server {
    /// Listener settings for the HTTP entry point.
    #[serde(default)]
    pub http: Http,
    pub db: super::Database,
    pub auth: Auth,
    /// Key-addressed object storage for uploads. Leaving this section
    /// out runs the server with the blob store unbound; uploads then
    /// fail with a configuration error instead of a crash.
    #[serde(default)]
    pub blob: Option<super::Blob>,
    #[serde(default)]
    pub assets: Assets,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    /// **Environment variables**:
    /// - `AGORA_HTTP_IP`
    #[serde(default = "Http::default_ip")]
    pub ip: IpAddr,
    /// **Environment variables**:
    /// - `AGORA_HTTP_PORT`
    #[serde(default = "Http::default_port")]
    pub port: u16,
    /// Actix worker count; defaults to one worker per core when unset.
    ///
    /// **Environment variables**:
    /// - `AGORA_HTTP_WORKERS`
    #[serde(default)]
    pub workers: Option<NonZeroUsize>,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    /// Secret key used for signing and verifying bearer tokens.
    ///
    /// **Environment variables**:
    /// - `AGORA_AUTH_JWT_SECRET`
    pub jwt_secret: Sensitive<String>,
    /// How long an issued token stays valid.
    ///
    /// **Environment variables**:
    /// - `AGORA_AUTH_TOKEN_TTL_SECS`
    #[serde(default = "Auth::default_token_ttl_secs")]
    pub token_ttl_secs: NonZeroU64,
}

/// Where the static-asset collaborator takes over for non-`/api` paths.
#[derive(Debug, Deserialize)]
pub struct Assets {
    /// **Environment variables**:
    /// - `AGORA_ASSETS_DIR`
    #[serde(default = "Assets::default_dir")]
    pub dir: PathBuf,
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ParseError> {
        let secret_len = self.auth.jwt_secret.as_str().len();
        if !(12..=1024).contains(&secret_len) {
            return Err(Report::new(ParseError)
                .attach_printable("auth.jwt_secret must be between 12 and 1024 bytes long"));
        }

        Url::parse(self.db.primary.url.as_str())
            .change_context(ParseError)
            .attach_printable("db.primary.url is not a valid Postgres connection URL")?;

        if let Some(replica) = self.db.replica.as_ref() {
            Url::parse(replica.url.as_str())
                .change_context(ParseError)
                .attach_printable("db.replica.url is not a valid Postgres connection URL")?;
        }

        Ok(())
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "agora.toml";

    /// Creates a default [`figment::Figment`] object to load server
    /// configuration. This function is there for implementing
    /// [`Server::load`] and testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // One big con about figment (env provider to be specific) especially
            // these fields with underscore in it.
            .merge(Env::prefixed("AGORA_").map(|v| match v.as_str() {
                "DB_PRIMARY_URL" => "db.primary.url".into(),
                "DB_PRIMARY_MIN_IDLE" => "db.primary.min_idle".into(),
                "DB_PRIMARY_POOL_SIZE" => "db.primary.pool_size".into(),

                "DB_REPLICA_URL" => "db.replica.url".into(),
                "DB_REPLICA_MIN_IDLE" => "db.replica.min_idle".into(),
                "DB_REPLICA_POOL_SIZE" => "db.replica.pool_size".into(),

                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                "AUTH_JWT_SECRET" => "auth.jwt_secret".into(),
                "AUTH_TOKEN_TTL_SECS" => "auth.token_ttl_secs".into(),

                "BLOB_ROOT" => "blob.root".into(),
                "BLOB_PUBLIC_PREFIX" => "blob.public_prefix".into(),

                "ASSETS_DIR" => "assets.dir".into(),

                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str() {
                "DATABASE_URL" => "db.primary.url".into(),
                _ => v.into(),
            }))
    }
}

impl Http {
    const fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        3000
    }
}

impl Default for Http {
    fn default() -> Self {
        Self {
            ip: Self::default_ip(),
            port: Self::default_port(),
            workers: None,
        }
    }
}

impl Auth {
    const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

    // Required by serde
    const fn default_token_ttl_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_TOKEN_TTL_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_TOKEN_TTL_SECS is accidentally set to 0"),
        }
    }
}

impl Assets {
    fn default_dir() -> PathBuf {
        PathBuf::from("./public")
    }
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::NonZeroU32;

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://forum@localhost/forum");

            jail.set_env("AGORA_DB_PRIMARY_MIN_IDLE", "100");
            jail.set_env("AGORA_DB_PRIMARY_POOL_SIZE", "100");

            jail.set_env("AGORA_DB_REPLICA_URL", "postgres://forum@replica/forum");
            jail.set_env("AGORA_DB_REPLICA_MIN_IDLE", "589");
            jail.set_env("AGORA_DB_REPLICA_POOL_SIZE", "589");

            jail.set_env("AGORA_DB_ENFORCE_TLS", "false");
            jail.set_env("AGORA_DB_TIMEOUT_SECS", "3030");

            jail.set_env("AGORA_AUTH_JWT_SECRET", "do-not-use-in-production");
            jail.set_env("AGORA_AUTH_TOKEN_TTL_SECS", "600");

            jail.set_env("AGORA_HTTP_PORT", "8088");
            jail.set_env("AGORA_BLOB_ROOT", "/var/lib/agora/blobs");

            let config: Server = Server::figment().extract()?;
            assert_eq!(
                config.db.primary.url.as_str(),
                "postgres://forum@localhost/forum"
            );
            assert_eq!(
                config.db.primary.min_idle,
                Some(NonZeroU32::new(100).expect("nonzero"))
            );
            assert_eq!(
                config.db.primary.pool_size,
                NonZeroU32::new(100).expect("nonzero")
            );

            let replica = config.db.replica.as_ref().expect("replica configured");
            assert_eq!(replica.url.as_str(), "postgres://forum@replica/forum");
            assert_eq!(replica.min_idle, Some(NonZeroU32::new(589).expect("nonzero")));
            assert_eq!(replica.pool_size, NonZeroU32::new(589).expect("nonzero"));

            assert!(!config.db.enforce_tls);
            assert_eq!(config.db.timeout_secs.get(), 3030);

            assert_eq!(config.auth.jwt_secret.as_str(), "do-not-use-in-production");
            assert_eq!(config.auth.token_ttl_secs.get(), 600);

            assert_eq!(config.http.port, 8088);
            assert_eq!(
                config.blob.as_ref().map(|b| b.root.clone()),
                Some(PathBuf::from("/var/lib/agora/blobs"))
            );

            Ok(())
        });
    }

    #[test]
    fn rejects_short_jwt_secret() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://forum@localhost/forum");
            jail.set_env("AGORA_AUTH_JWT_SECRET", "short");

            let config: Server = Server::figment().extract()?;
            assert!(config.validate().is_err());

            Ok(())
        });
    }
}
