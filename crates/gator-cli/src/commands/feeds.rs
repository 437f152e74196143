use anyhow::Result;

use gator_core::{
    feed::{normalize_feed_url, NewFeed},
    storage::{Database, FeedRepository, FollowRepository, PostRepository},
    User,
};

pub async fn add(db: &Database, user: &User, name: &str, url: &str) -> Result<()> {
    let url = normalize_feed_url(url)?;

    let feed_repo = FeedRepository::new(db);
    let feed = feed_repo
        .create(&NewFeed {
            url,
            name: name.to_string(),
            user_id: user.id,
        })
        .await?;

    FollowRepository::new(db).create(user.id, feed.id).await?;

    println!("Added feed: {} ({})", feed.name, feed.id);
    println!("  URL: {}", feed.url);
    println!("  Following as {}", user.name);

    Ok(())
}

pub async fn list(db: &Database) -> Result<()> {
    let feeds = FeedRepository::new(db).list_with_owners().await?;

    if feeds.is_empty() {
        println!("No feeds yet.");
        println!("\nTo add a feed, run:");
        println!("  gator addfeed <name> <url>");
        return Ok(());
    }

    println!("Feeds ({}):\n", feeds.len());

    let posts = PostRepository::new(db);

    for entry in &feeds {
        println!("  {}", entry.feed.name);
        println!("    URL: {}", entry.feed.url);
        println!("    Added by: {}", entry.owner_name);
        println!("    Posts: {}", posts.count_for_feed(entry.feed.id).await?);
        match entry.feed.last_fetched_at {
            Some(last) => println!("    Last fetched: {}", last.format("%Y-%m-%d %H:%M")),
            None => println!("    Last fetched: never"),
        }
        println!();
    }

    Ok(())
}
