//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load preferences and the configured book, seeding sample data on a
//!   first run.
//! - Print the current client and delivery views.

use foodbook_core::{
    init_logging, read_user_prefs, sample_food_book, FoodBookSnapshot, ModelManager, UserPrefs,
};
use log::{error, info};
use std::error::Error;
use std::process::ExitCode;

const DEFAULT_PREFS_PATH: &str = "preferences.json";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("foodbook: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let prefs_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PREFS_PATH.to_string());
    let prefs = read_user_prefs(&prefs_path)?;
    if let Some(log_dir) = &prefs.log_dir {
        init_logging(&prefs.log_level, log_dir)?;
    }

    let snapshot = load_or_seed(&prefs)?;
    let manager = ModelManager::from_snapshot(&snapshot, prefs.history_limit())?;
    info!(
        "event=cli_start module=cli status=ok clients={} deliveries={}",
        manager.food_book().clients().len(),
        manager.food_book().deliveries().len()
    );

    println!("foodbook_core version={}", foodbook_core::core_version());
    println!("Clients:");
    for (index, client) in manager.current_client_view().iter().enumerate() {
        println!("  {}. {client}", index + 1);
    }
    println!("Deliveries:");
    for delivery in manager.current_delivery_view() {
        println!("  {delivery}");
    }
    Ok(())
}

fn load_or_seed(prefs: &UserPrefs) -> Result<FoodBookSnapshot, Box<dyn Error>> {
    let storage = prefs.open_storage()?;
    if let Some(snapshot) = storage.read_food_book()? {
        return Ok(snapshot);
    }

    let snapshot = sample_food_book();
    storage.save_food_book(&snapshot)?;
    info!(
        "event=sample_seed module=cli status=ok location={}",
        storage.location()
    );
    Ok(snapshot)
}
