use anyhow::Result;

use gator_core::{
    storage::{Database, UserRepository},
    Error, Session,
};

pub async fn register(db: &Database, session: &mut Session, name: &str) -> Result<()> {
    let user = UserRepository::new(db).create(name).await?;
    session.set_user(&user.name)?;

    println!("User {} created and logged in.", user.name);
    println!("  ID: {}", user.id);
    println!("  Created: {}", user.created_at.format("%Y-%m-%d %H:%M"));

    Ok(())
}

pub async fn login(db: &Database, session: &mut Session, name: &str) -> Result<()> {
    let user = UserRepository::new(db)
        .find_by_name(name)
        .await?
        .ok_or_else(|| Error::UserNotFound(name.to_string()))?;

    session.set_user(&user.name)?;
    println!("Logged in as {}.", user.name);

    Ok(())
}

pub async fn reset(db: &Database, session: &mut Session) -> Result<()> {
    let deleted = UserRepository::new(db).delete_all().await?;
    session.clear()?;

    println!("Database reset: {} users removed along with their feeds and posts.", deleted);

    Ok(())
}

pub async fn list(db: &Database, session: &Session) -> Result<()> {
    let users = UserRepository::new(db).list_all().await?;

    if users.is_empty() {
        println!("No users yet.");
        println!("\nTo create one, run:");
        println!("  gator register <name>");
        return Ok(());
    }

    let current = session.current_user.as_deref();
    for user in &users {
        if Some(user.name.as_str()) == current {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }

    Ok(())
}
