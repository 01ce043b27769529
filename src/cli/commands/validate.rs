//! Validate configuration command.

use anyhow::Result;
use portfolio_config::load_config;
use std::path::Path;

pub fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Initial value: ${}", config.engine.initial_value);
            println!("Fixed stake: ${}", config.engine.fixed_stake);
            println!("Leverage: {}x", config.engine.leverage);
            println!(
                "Stop-loss / take-profit offsets: {}% / {}%",
                config.engine.base_stop_loss_pct, config.engine.base_take_profit_pct
            );
            println!("Tick interval: {}s", config.schedule.interval_secs);
            println!();
            println!("Effective configuration:");
            println!("{}", config.to_toml()?);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
