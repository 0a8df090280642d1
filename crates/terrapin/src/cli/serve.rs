//! the `serve` subcommand - runs the controller

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use color_eyre::eyre::{Context, Result, bail};
use terrapin_db::TerrapinDb;
use terrapin_types::Config;
use tokio::net::TcpListener;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::bus::AgentBus;
use crate::keys::JwtKeys;

/// run the terrapin controller
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// database url (sqlite:// or postgres://)
    #[arg(long, env = "TERRAPIN_DATABASE_URL")]
    database_url: Option<String>,

    /// listen port for the internal http surface
    #[arg(long, default_value_t = 3003, env = "TERRAPIN_INTERNAL_PORT")]
    internal_port: u16,

    /// public url of the controller dashboard
    #[arg(long, env = "TERRAPIN_DASHBOARD_URL")]
    dashboard_url: Option<String>,

    /// hmac secret for auxiliary signing
    #[arg(long, env = "TERRAPIN_SERVER_SECRET")]
    secret: Option<String>,

    /// base relay port announced to olms
    #[arg(long, default_value_t = 51820, env = "TERRAPIN_CLIENTS_START_PORT")]
    clients_start_port: u16,

    /// directory for persistent controller state
    #[arg(long, default_value = "/var/lib/terrapin", env = "TERRAPIN_DATA_DIR")]
    data_dir: PathBuf,

    /// log level
    #[arg(long, default_value = "info", env = "TERRAPIN_LOG_LEVEL")]
    log_level: String,
}

impl ServeCommand {
    /// convert cli arguments into a Config struct
    fn into_config(self) -> Result<Config> {
        let mut config = Config {
            data_dir: self.data_dir,
            ..Default::default()
        };

        config.server.internal_port = self.internal_port;
        config.server.secret = self.secret;
        config.gerbil.clients_start_port = self.clients_start_port;
        if let Some(url) = self.dashboard_url {
            config.app.dashboard_url = url;
        }

        config.database = if let Some(db_url) = self.database_url {
            if db_url.starts_with("postgres://") {
                terrapin_types::DatabaseConfig::Postgres { url: db_url }
            } else if let Some(path) = db_url.strip_prefix("sqlite://") {
                terrapin_types::DatabaseConfig::Sqlite {
                    path: PathBuf::from(path),
                }
            } else {
                bail!("database URL must start with sqlite:// or postgres://");
            }
        } else {
            terrapin_types::DatabaseConfig::Sqlite {
                path: config.data_dir.join("db.sqlite"),
            }
        };

        Ok(config)
    }

    /// run the serve command
    pub async fn run(self) -> Result<()> {
        // initialize logging; unrecognized levels fall back to info
        let log_level = self.log_level.parse().unwrap_or(Level::INFO);
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_max_level(log_level).finish(),
        )?;

        info!("starting terrapin...");

        let config = self.into_config()?;
        info!("Database: {}", config.database.summary());
        info!("Internal port: {}", config.server.internal_port);
        if config.app.dashboard_url.is_empty() {
            warn!("No dashboard URL configured; auth-proxy pushes will be skipped");
        } else {
            info!("Dashboard url: {}", config.app.dashboard_url);
        }

        // ensure the data directory exists for sqlite and the keypair
        if !config.data_dir.exists() {
            info!("Creating data directory: {:?}", config.data_dir);
            std::fs::create_dir_all(&config.data_dir)
                .with_context(|| format!("failed to create data directory: {:?}", config.data_dir))?;
        }

        // initialize database and run migrations
        let db = TerrapinDb::new(&config)
            .await
            .context("failed to initialize database")?;
        info!("Database initialized successfully");

        // load or generate the controller keypair
        let keys = JwtKeys::load_or_generate(&config.data_dir)
            .context("failed to load/generate controller keypair")?;
        info!("Controller keypair loaded");

        // build router and wire the bus
        let bus = AgentBus::new();
        let app = crate::create_app(db, bus, config.clone(), Arc::new(keys)).await;

        let addr: SocketAddr = ([0, 0, 0, 0], config.server.internal_port).into();
        info!("starting http server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await.context("server error")?;

        Ok(())
    }
}
