use anyhow::Result;

use gator_core::{
    storage::{Database, PostRepository},
    User,
};

pub async fn run(db: &Database, user: &User, limit: u32) -> Result<()> {
    let posts = PostRepository::new(db).list_for_user(user.id, limit).await?;

    if posts.is_empty() {
        println!("No posts yet. Follow some feeds and run `gator agg <interval>`.");
        return Ok(());
    }

    for post in &posts {
        let published = post
            .published_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "N/A".to_string());

        println!("{}", post.title);
        println!("  URL: {}", post.url);
        println!("  Published: {}", published);
        if let Some(description) = &post.description {
            println!("  {}", preview(description, 160));
        }
        println!();
    }

    Ok(())
}

/// First `max_chars` characters of a single-line rendering of `text`
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        format!("{}...", flat.chars().take(max_chars).collect::<String>())
    }
}
