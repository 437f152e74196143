use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::database::is_unique_violation_on;
use super::Database;
use crate::feed::FeedFollow;
use crate::{Error, Result};

/// Repository for user-to-feed follows
pub struct FollowRepository<'a> {
    db: &'a Database,
}

#[derive(FromRow)]
struct FollowRow {
    id: String,
    user_id: String,
    feed_id: String,
    user_name: String,
    feed_name: String,
    feed_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FollowRow> for FeedFollow {
    fn from(row: FollowRow) -> Self {
        FeedFollow {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            user_id: Uuid::parse_str(&row.user_id).unwrap_or_default(),
            feed_id: Uuid::parse_str(&row.feed_id).unwrap_or_default(),
            user_name: row.user_name,
            feed_name: row.feed_name,
            feed_url: row.feed_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_FOLLOWS: &str = r#"
    SELECT ff.id, ff.user_id, ff.feed_id, u.name AS user_name, f.name AS feed_name,
           f.url AS feed_url, ff.created_at, ff.updated_at
    FROM feed_follows ff
    JOIN users u ON u.id = ff.user_id
    JOIN feeds f ON f.id = ff.feed_id
"#;

impl<'a> FollowRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Make a user follow a feed; following twice is rejected
    pub async fn create(&self, user_id: Uuid, feed_id: Uuid) -> Result<FeedFollow> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO feed_follows (id, user_id, feed_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(feed_id.to_string())
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, "feed_follows.feed_id") {
                Error::AlreadyFollowing(feed_id.to_string())
            } else {
                Error::Database(e)
            }
        })?;

        let row: FollowRow = sqlx::query_as(&format!("{} WHERE ff.id = ?", SELECT_FOLLOWS))
            .bind(id.to_string())
            .fetch_one(self.db.pool())
            .await?;

        Ok(FeedFollow::from(row))
    }

    /// Get every follow of a user, oldest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FeedFollow>> {
        let rows: Vec<FollowRow> = sqlx::query_as(&format!(
            "{} WHERE ff.user_id = ? ORDER BY ff.created_at ASC",
            SELECT_FOLLOWS
        ))
        .bind(user_id.to_string())
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(FeedFollow::from).collect())
    }

    /// Remove a user's follow of the feed at `url`, returning whether one existed
    pub async fn delete_by_url(&self, user_id: Uuid, url: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM feed_follows
            WHERE user_id = ?
              AND feed_id IN (SELECT id FROM feeds WHERE url = ?)
            "#,
        )
        .bind(user_id.to_string())
        .bind(url)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
