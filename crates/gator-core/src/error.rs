use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed fetch error: {0}")]
    Fetch(String),

    #[error("Failed to fetch feed '{feed}': {source}")]
    FeedFetch {
        feed: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Post already exists: {0}")]
    DuplicatePost(String),

    #[error("Feed already exists: {0}")]
    DuplicateFeed(String),

    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("Already following feed: {0}")]
    AlreadyFollowing(String),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Not logged in, run `gator login <name>` first")]
    NotLoggedIn,
}

impl Error {
    /// True for the benign "post URL already stored" outcome
    pub fn is_duplicate_post(&self) -> bool {
        matches!(self, Error::DuplicatePost(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
