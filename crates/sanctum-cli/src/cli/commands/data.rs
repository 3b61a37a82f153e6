//! Read-only listings for scripts.

use anyhow::Result;
use sanctum_core::config::Config;
use sanctum_core::interrupt;

use super::services;

pub async fn list_entities(config: &Config, mine: bool, limit: Option<usize>) -> Result<()> {
    let (auth, db) = services(config);
    let user = interrupt::interruptible(auth.current_session()).await?;
    let owner = match (mine, user) {
        (false, _) => None,
        (true, Some(user)) => Some(user.id),
        (true, None) => anyhow::bail!("--mine requires a signed-in session; run `sanctum login`."),
    };

    let limit = limit.unwrap_or(config.ui.list_limit);
    let entities = interrupt::interruptible(db.list_entities(owner, Some(limit))).await?;
    if entities.is_empty() {
        println!("No entities found.");
        return Ok(());
    }
    for entity in entities {
        println!(
            "{}\t{}\t{}\t{}\t{} -> {}",
            entity.id,
            entity.name,
            entity.status.as_str(),
            entity.chamber,
            entity.original_form,
            entity.current_form,
        );
    }
    Ok(())
}

pub async fn list_events(config: &Config, limit: Option<usize>) -> Result<()> {
    let (auth, db) = services(config);
    interrupt::interruptible(auth.current_session()).await?;

    let limit = limit.unwrap_or(config.ui.list_limit);
    let events = interrupt::interruptible(db.list_system_events(Some(limit))).await?;
    if events.is_empty() {
        println!("No events found.");
        return Ok(());
    }
    for event in events {
        println!(
            "{}\t{}\t{}",
            event.created_at.format("%Y-%m-%d %H:%M:%S"),
            event.event_type.as_str(),
            event.title,
        );
    }
    Ok(())
}
