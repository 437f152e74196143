use anyhow::Result;

use gator_core::{
    feed::normalize_feed_url,
    storage::{Database, FeedRepository, FollowRepository},
    Error, User,
};

pub async fn follow(db: &Database, user: &User, url: &str) -> Result<()> {
    let url = normalize_feed_url(url)?;
    let feed = FeedRepository::new(db)
        .find_by_url(&url)
        .await?
        .ok_or_else(|| Error::FeedNotFound(url.clone()))?;

    let follow = FollowRepository::new(db).create(user.id, feed.id).await?;
    println!("{} now follows {}.", follow.user_name, follow.feed_name);

    Ok(())
}

pub async fn following(db: &Database, user: &User) -> Result<()> {
    let follows = FollowRepository::new(db).list_for_user(user.id).await?;

    if follows.is_empty() {
        println!("{} does not follow any feeds.", user.name);
        return Ok(());
    }

    println!("{} follows ({}):", user.name, follows.len());
    for follow in &follows {
        println!("  - {} ({})", follow.feed_name, follow.feed_url);
    }

    Ok(())
}

pub async fn unfollow(db: &Database, user: &User, url: &str) -> Result<()> {
    let url = normalize_feed_url(url)?;

    if FollowRepository::new(db).delete_by_url(user.id, &url).await? {
        println!("{} unfollowed {}.", user.name, url);
    } else {
        println!("{} was not following {}.", user.name, url);
    }

    Ok(())
}
