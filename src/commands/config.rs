use anyhow::Result;
use cares_core::config::CaresConfig;
use owo_colors::OwoColorize;

pub fn run(config: &CaresConfig) -> Result<()> {
    let config_path = CaresConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Events:  {}", config.data_file_path().display());

    println!();
    println!("{}", "Signup confirmations".bold());
    match &config.smtp {
        Some(smtp) => println!("  Sent via {}:{} as {}", smtp.host, smtp.port, smtp.from_email),
        None => println!("  {}", "No [smtp] relay configured, confirmations are only logged".dimmed()),
    }

    Ok(())
}
