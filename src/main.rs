#[macro_use]
extern crate rocket;

use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};
use odinbot::api;
use odinbot::cache::FloofMajestyStore;
use odinbot::config::AppConfig;
use odinbot::fetcher::OdinFetcher;
use odinbot::floof::{FloofMajestyEvaluator, FLOOF_ALGORITHM_VERSION};
use odinbot::images::ImageFetcher;
use rocket::{
    figment::{
        providers::{Format, Toml},
        Figment, Profile,
    },
    Config,
};

#[launch]
async fn rocket() -> _ {
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Load config
    let mut figment = Figment::from(Config::default())
        .merge(Toml::file("App.toml").nested());

    if let Ok(target_url) = env::var("ODINBOT_TARGET_URL") {
        figment = figment.merge(("target_url", target_url));
    }

    if let Ok(floof_store) = env::var("ODINBOT_FLOOF_STORE") {
        figment = figment.merge(("floof_store", floof_store));
    }

    if let Ok(interval) = env::var("ODINBOT_FETCH_INTERVAL") {
        match interval.trim().parse::<u64>() {
            Ok(seconds) => figment = figment.merge(("fetch_interval", seconds)),
            Err(_) => warn!("Unable to parse ODINBOT_FETCH_INTERVAL={:?}, using configured default", interval),
        }
    }

    figment = figment.select(Profile::from_env_or("APP_PROFILE", "default"));

    // App config
    let config = match figment.extract::<AppConfig>() {
        Ok(config) => config,
        Err(e) => panic!("Invalid configuration: {}", e),
    };
    info!("Configuration loaded successfully");

    let store = config.floof_store.as_ref().and_then(|path| match FloofMajestyStore::new(path) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            error!("Failed to initialise Floof Majesty store at {}: {}", path, e);
            None
        }
    });
    if store.is_none() {
        warn!("Floof Majesty store unavailable, scoring requests will be rejected");
    }

    let image_fetcher = match ImageFetcher::new(config.timeout, &config.user_agent) {
        Ok(fetcher) => fetcher,
        Err(e) => panic!("Failed to build image HTTP client: {}", e),
    };
    let evaluator = Arc::new(FloofMajestyEvaluator::new(store, image_fetcher));
    info!("Floof Majesty evaluator ready (algorithm version {})", FLOOF_ALGORITHM_VERSION);

    match &config.target_url {
        Some(target_url) => {
            match OdinFetcher::new(target_url.clone(), config.fetch_interval, &config.user_agent, evaluator.clone()) {
                Ok(fetcher) => {
                    tokio::spawn(fetcher.run());
                }
                Err(e) => error!("Failed to start Odin fetcher: {}", e),
            }
        }
        None => info!("No target URL configured - periodic fetching disabled"),
    }

    info!(
        "Starting odinbot on {}:{}",
        config.address, config.port
    );

    rocket::custom(figment)
        .manage(evaluator)
        .mount("/floof", api::routes())
}
