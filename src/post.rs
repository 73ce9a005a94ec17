use serde::{Deserialize, Deserializer, Serialize};

use chrono::{DateTime, Utc};

use crate::text_utils::parse_timestamp;

/// Publication timestamp exactly as the backend assigned it. This side never
/// creates or mutates one; it is parsed only to derive display order and the
/// formatted date.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PostDate(pub DateTime<Utc>);

impl<'de> Deserialize<'de> for PostDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
    {
        use serde::de::Error;
        let value = String::deserialize(deserializer)?;
        let date_time = parse_timestamp(&value).map_err(Error::custom)?;
        Ok(PostDate(date_time))
    }
}

/// A blog post as the list endpoint returns it. Owned by the backend,
/// read-only here.
#[derive(Clone, Debug, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub author_name: String,
    pub author_email: String,
    pub created_at: PostDate,
}

/// Body of the create request. All values come verbatim from the form.
#[derive(Clone, Debug, Serialize)]
pub struct NewPost {
    pub author_name: String,
    pub author_email: String,
    pub title: String,
    pub content: String,
}

/// Display order: newest first, full timestamp comparison. The sort is
/// stable, so exact-timestamp ties keep their backend order.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.created_at.cmp(&a.created_at)
    });
}
