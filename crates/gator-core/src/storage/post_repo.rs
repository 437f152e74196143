use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::database::is_unique_violation_on;
use super::Database;
use crate::feed::{NewPost, Post};
use crate::{Error, Result};

/// Repository for ingested posts
pub struct PostRepository<'a> {
    db: &'a Database,
}

#[derive(FromRow)]
struct PostRow {
    id: String,
    feed_id: String,
    title: String,
    url: String,
    description: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            feed_id: Uuid::parse_str(&row.feed_id).unwrap_or_default(),
            title: row.title,
            url: row.url,
            description: row.description,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl<'a> PostRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a post
    ///
    /// The URL is the post's identity: a second insert with a known URL leaves
    /// the stored row untouched and fails with [`Error::DuplicatePost`]. Any
    /// other failure comes back as [`Error::Database`].
    pub async fn create(&self, new_post: &NewPost) -> Result<Post> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO posts (id, feed_id, title, url, description, published_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(new_post.feed_id.to_string())
        .bind(&new_post.title)
        .bind(&new_post.url)
        .bind(&new_post.description)
        .bind(new_post.published_at)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, "posts.url") {
                Error::DuplicatePost(new_post.url.clone())
            } else {
                Error::Database(e)
            }
        })?;

        Ok(Post {
            id,
            feed_id: new_post.feed_id,
            title: new_post.title.clone(),
            url: new_post.url.clone(),
            description: new_post.description.clone(),
            published_at: new_post.published_at,
            created_at: now,
            updated_at: now,
        })
    }

    /// Find a post by its canonical URL
    #[cfg(test)]
    pub async fn find_by_url(&self, url: &str) -> Result<Option<Post>> {
        let row: Option<PostRow> = sqlx::query_as(
            r#"
            SELECT id, feed_id, title, url, description, published_at, created_at, updated_at
            FROM posts
            WHERE url = ?
            "#,
        )
        .bind(url)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(Post::from))
    }

    /// Newest posts from the feeds a user follows
    ///
    /// Posts without a publish date sort after dated ones.
    pub async fn list_for_user(&self, user_id: Uuid, limit: u32) -> Result<Vec<Post>> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.feed_id, p.title, p.url, p.description, p.published_at,
                   p.created_at, p.updated_at
            FROM posts p
            JOIN feed_follows ff ON ff.feed_id = p.feed_id
            WHERE ff.user_id = ?
            ORDER BY p.published_at IS NULL, p.published_at DESC, p.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Count posts stored for a feed
    pub async fn count_for_feed(&self, feed_id: Uuid) -> Result<u32> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE feed_id = ?")
            .bind(feed_id.to_string())
            .fetch_one(self.db.pool())
            .await?;

        Ok(count.0 as u32)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::feed::{Feed, NewFeed};
    use crate::storage::{FeedRepository, FollowRepository, UserRepository};
    use crate::user::User;

    async fn setup(db: &Database) -> (User, Feed) {
        let user = UserRepository::new(db).create("lane").await.unwrap();
        let feed = FeedRepository::new(db)
            .create(&NewFeed {
                url: "https://x/rss".to_string(),
                name: "x".to_string(),
                user_id: user.id,
            })
            .await
            .unwrap();
        (user, feed)
    }

    fn post(feed_id: Uuid, title: &str, url: &str) -> NewPost {
        NewPost {
            feed_id,
            title: title.to_string(),
            url: url.to_string(),
            description: None,
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_url_keeps_first_post() {
        let db = Database::new_in_memory().await.unwrap();
        let (_, feed) = setup(&db).await;
        let repo = PostRepository::new(&db);

        repo.create(&post(feed.id, "First", "https://x/a")).await.unwrap();
        let second = repo.create(&post(feed.id, "Second", "https://x/a")).await;

        assert!(matches!(second, Err(Error::DuplicatePost(ref url)) if url == "https://x/a"));
        assert!(second.unwrap_err().is_duplicate_post());

        let stored = repo.find_by_url("https://x/a").await.unwrap().unwrap();
        assert_eq!(stored.title, "First");
        assert_eq!(repo.count_for_feed(feed.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_id_collision_is_not_a_duplicate_post() {
        let db = Database::new_in_memory().await.unwrap();
        let (_, feed) = setup(&db).await;
        let first = PostRepository::new(&db)
            .create(&post(feed.id, "First", "https://x/a"))
            .await
            .unwrap();

        let now = Utc::now();
        let err = sqlx::query(
            "INSERT INTO posts (id, feed_id, title, url, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(first.id.to_string())
        .bind(feed.id.to_string())
        .bind("Other")
        .bind("https://x/b")
        .bind(now)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap_err();

        assert!(!is_unique_violation_on(&err, "posts.url"));
        assert!(is_unique_violation_on(&err, "posts.id"));
    }

    #[tokio::test]
    async fn test_missing_feed_is_a_real_error() {
        let db = Database::new_in_memory().await.unwrap();
        let repo = PostRepository::new(&db);

        let result = repo.create(&post(Uuid::new_v4(), "Orphan", "https://x/orphan")).await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_list_for_user_only_followed_and_newest_first() {
        let db = Database::new_in_memory().await.unwrap();
        let (user, feed) = setup(&db).await;
        let repo = PostRepository::new(&db);

        let mut old = post(feed.id, "Old", "https://x/old");
        old.published_at = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let mut new = post(feed.id, "New", "https://x/new");
        new.published_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let undated = post(feed.id, "Undated", "https://x/undated");

        repo.create(&old).await.unwrap();
        repo.create(&undated).await.unwrap();
        repo.create(&new).await.unwrap();

        // Not following yet
        assert!(repo.list_for_user(user.id, 10).await.unwrap().is_empty());

        FollowRepository::new(&db).create(user.id, feed.id).await.unwrap();

        let titles: Vec<String> = repo
            .list_for_user(user.id, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["New", "Old", "Undated"]);

        assert_eq!(repo.list_for_user(user.id, 2).await.unwrap().len(), 2);
    }
}
