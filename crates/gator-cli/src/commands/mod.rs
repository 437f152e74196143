pub mod agg;
pub mod browse;
pub mod feeds;
pub mod follows;
pub mod users;

use gator_core::{
    storage::{Database, UserRepository},
    Error, Session, User,
};

/// Resolve the session's current user, for commands that act on behalf of one
pub async fn logged_in(db: &Database, session: &Session) -> Result<User, Error> {
    let name = session.current_user.as_deref().ok_or(Error::NotLoggedIn)?;

    UserRepository::new(db)
        .find_by_name(name)
        .await?
        .ok_or_else(|| Error::UserNotFound(name.to_string()))
}
