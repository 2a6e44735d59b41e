use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dashboard_core::{
    App, Config, FileStore, GatewayMode, PersistenceStore, gateway_from_config,
    proxy::{self, Proxy},
};
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::view::{CardView, DashboardView, StripView};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Direct,
    Proxy,
}

impl From<ModeArg> for GatewayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direct => GatewayMode::Direct,
            ModeArg::Proxy => GatewayMode::Proxy,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure how the dashboard reaches the weather service.
    Configure {
        /// OpenWeather API key; prompted for in direct mode when omitted.
        #[arg(long)]
        api_key: Option<String>,

        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Proxy endpoint, e.g. http://127.0.0.1:8888/
        #[arg(long)]
        proxy_url: Option<String>,
    },

    /// Refresh every saved city and show the full dashboard.
    Dashboard,

    /// Look up a city, show its card and save it.
    Search {
        /// City name.
        city: String,
    },

    /// Look up weather for a coordinate pair.
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// List saved cities.
    Favorites {
        /// Fetch a "Temp | description" preview for each city.
        #[arg(long)]
        preview: bool,
    },

    /// Remove a saved city.
    Remove { city: String },

    /// Remove every saved city.
    Clear,

    /// Switch between the light and dark theme.
    Theme,

    /// Switch between Celsius and Fahrenheit.
    Units,

    /// Run the pass-through proxy (reads OPENWEATHER_KEY).
    Serve {
        #[arg(long, default_value = "127.0.0.1:8888")]
        addr: SocketAddr,
    },
}

impl Cli {
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key, mode, proxy_url } => {
                configure(config, api_key, mode, proxy_url)
            }
            Command::Serve { addr } => {
                info!(%addr, "starting weather proxy");
                proxy::serve(Proxy::from_env(), addr).await;
                Ok(())
            }
            command => run_dashboard(command, &config).await,
        }
    }
}

fn configure(
    mut config: Config,
    api_key: Option<String>,
    mode: Option<ModeArg>,
    proxy_url: Option<String>,
) -> anyhow::Result<()> {
    if let Some(mode) = mode {
        config.mode = mode.into();
    }
    if let Some(url) = proxy_url {
        config.proxy_url = Some(url);
    }

    match api_key {
        Some(key) => config.api_key = Some(key),
        None if config.mode == GatewayMode::Direct && config.api_key.is_none() => {
            let key = inquire::Password::new("OpenWeather API key:")
                .without_confirmation()
                .prompt()
                .context("Failed to read API key")?;
            config.api_key = Some(key);
        }
        None => {}
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn open_app(config: &Config) -> anyhow::Result<App> {
    let gateway = gateway_from_config(config)?;
    info!(mode = ?config.mode, "opening dashboard");
    let store = FileStore::open(FileStore::default_path()?)?;
    Ok(App::new(gateway, PersistenceStore::new(store), config.preview_ttl()))
}

async fn run_dashboard(command: Command, config: &Config) -> anyhow::Result<()> {
    let mut app = open_app(config)?;

    match command {
        Command::Dashboard => {
            app.init().await;
            print!("{}", DashboardView(&app));
        }
        Command::Search { city } => {
            app.restore();
            if let Some(card) = app.submit(&city).await.and_then(|c| app.renderer().card(&c)) {
                print!("{}", CardView(card));
            }
        }
        Command::Locate { lat, lon } => {
            app.restore();
            if let Some(card) = app.locate(lat, lon).await.and_then(|c| app.renderer().card(&c)) {
                print!("{}", CardView(card));
            }
        }
        Command::Favorites { preview } => {
            app.restore();
            if preview {
                for city in app.favorites().to_vec() {
                    app.hover_favorite(&city).await;
                }
            }
            print!("{}", StripView(&app));
        }
        Command::Remove { city } => {
            app.restore();
            app.remove_city(&city);
            print!("{}", StripView(&app));
        }
        Command::Clear => {
            app.restore();
            app.delete_all();
            println!("Removed all saved cities.");
        }
        Command::Theme => {
            app.restore();
            println!("Theme: {}", app.toggle_theme());
        }
        Command::Units => {
            app.restore();
            println!("Units: {}", app.toggle_unit().toggle_caption());
        }
        Command::Configure { .. } | Command::Serve { .. } => {}
    }

    if let Some(message) = app.banner() {
        warn!(%message, "dashboard command finished with an error banner");
        anyhow::bail!("{message}");
    }
    Ok(())
}
