//! Configuration commands for CLI.

use clap::Subcommand;
use studbud_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "planner.min_session_minutes", "generator.model")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dot-separated key
        key: String,
        /// New value, parsed as the key's current type
        value: String,
    },
    /// Show planner, generator and logging settings
    List {
        /// Print as JSON (the API key is shown as stored)
        #[arg(long)]
        json: bool,
    },
    /// Restore default planner, generator and logging settings
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let Some(value) = config.get(&key) else {
                return Err(format!("unknown key: {key}").into());
            };
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_settings(&config);
            }
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
            print_settings(&config);
        }
    }
    Ok(())
}

fn print_settings(config: &Config) {
    let generator = &config.generator;
    let key_status = match (generator.resolved_api_key(), &generator.api_key) {
        (None, _) => "not set (AI plans fall back to the built-in allocator)",
        (Some(_), Some(stored)) if !stored.trim().is_empty() => "set",
        (Some(_), _) => "set via GEMINI_API_KEY",
    };

    println!("Planner");
    println!(
        "  minimum session:  {} min",
        config.planner.min_session_minutes
    );
    println!("Generator");
    println!("  endpoint:         {}", generator.endpoint);
    println!("  model:            {}", generator.model);
    println!("  API key:          {key_status}");
    println!("  timeout:          {}s", generator.timeout_secs);
    println!("Logging");
    println!("  level:            {}", config.logging.level);
}
