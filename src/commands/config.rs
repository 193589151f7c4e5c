use anyhow::Result;
use cal_invite_core::config::CalInviteConfig;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let config_path = CalInviteConfig::config_path()?;

    if !config_path.exists() {
        CalInviteConfig::create_default_config(&config_path)?;
        println!("{}", format!("  Created {}", config_path.display()).green());
        println!();
    }

    let config = CalInviteConfig::load_from(&config_path)?;
    let ttl = config.cache_ttl()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!();
    println!("{}", "Settings".bold());
    println!("  Timezone:   {}", config.timezone);
    println!("  Cache:      {}", config.cache_prefix);
    println!("  Cache TTL:  {}", humantime::format_duration(ttl));

    Ok(())
}
