//! Command-line and environment configuration.

use clap::Parser;
use meshgate_account::ManagerConfig;
use meshgate_db::DbConfig;

#[derive(Parser, Debug)]
#[command(name = "meshgate", version, about = "Mesh network management service")]
pub struct Cli {
    /// SurrealDB endpoint (host:port).
    #[arg(long, env = "MESHGATE_DB_URL", default_value = "127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "MESHGATE_DB_NAMESPACE", default_value = "meshgate")]
    pub db_namespace: String,

    #[arg(long, env = "MESHGATE_DB_DATABASE", default_value = "management")]
    pub db_database: String,

    #[arg(long, env = "MESHGATE_DB_USER", default_value = "root")]
    pub db_user: String,

    #[arg(long, env = "MESHGATE_DB_PASSWORD", default_value = "root", hide_env_values = true)]
    pub db_password: String,

    /// Domain appended to peer DNS labels in activity metadata.
    #[arg(long, env = "MESHGATE_DNS_DOMAIN", default_value = "")]
    pub dns_domain: String,

    /// Give up waiting for an account lock after this many seconds.
    /// Unset waits indefinitely.
    #[arg(long, env = "MESHGATE_LOCK_TIMEOUT_SECS")]
    pub lock_timeout_secs: Option<u64>,

    /// Buffered network map updates per subscriber.
    #[arg(long, env = "MESHGATE_UPDATE_CHANNEL_CAPACITY", default_value_t = 1024)]
    pub update_channel_capacity: usize,
}

impl Cli {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }

    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            lock_timeout_secs: self.lock_timeout_secs,
        }
    }
}
