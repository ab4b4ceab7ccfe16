use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::{Album, Comment, Post, User};

/// The four upstream collections. Selects both the endpoint and the record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Users,
    Posts,
    Comments,
    Albums,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Users,
        ResourceKind::Posts,
        ResourceKind::Comments,
        ResourceKind::Albums,
    ];

    /// URL path segment, also used as the collection cache key.
    pub fn segment(&self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Posts => "posts",
            ResourceKind::Comments => "comments",
            ResourceKind::Albums => "albums",
        }
    }

    /// Singular name, used as the prefix of item cache keys (`post-5`).
    pub fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Users => "user",
            ResourceKind::Posts => "post",
            ResourceKind::Comments => "comment",
            ResourceKind::Albums => "album",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::Users => "Users",
            ResourceKind::Posts => "Posts",
            ResourceKind::Comments => "Comments",
            ResourceKind::Albums => "Albums",
        }
    }

    /// Parse a path segment. Unknown segments are `None`.
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.segment() == segment)
    }

    /// Get the next kind (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            ResourceKind::Users => ResourceKind::Posts,
            ResourceKind::Posts => ResourceKind::Comments,
            ResourceKind::Comments => ResourceKind::Albums,
            ResourceKind::Albums => ResourceKind::Users,
        }
    }

    /// Get the previous kind (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            ResourceKind::Users => ResourceKind::Albums,
            ResourceKind::Posts => ResourceKind::Users,
            ResourceKind::Comments => ResourceKind::Posts,
            ResourceKind::Albums => ResourceKind::Comments,
        }
    }

    pub fn collection_key(&self) -> String {
        self.segment().to_string()
    }

    pub fn item_key(&self, id: i64) -> String {
        format!("{}-{}", self.singular(), id)
    }

    /// Decode one upstream JSON object as a record of this kind.
    pub fn parse_item(&self, value: Value) -> serde_json::Result<Record> {
        Ok(match self {
            ResourceKind::Users => Record::User(serde_json::from_value(value)?),
            ResourceKind::Posts => Record::Post(serde_json::from_value(value)?),
            ResourceKind::Comments => Record::Comment(serde_json::from_value(value)?),
            ResourceKind::Albums => Record::Album(serde_json::from_value(value)?),
        })
    }

    /// Decode an upstream collection body. Anything other than a JSON array
    /// is treated as an empty collection.
    pub fn parse_collection(&self, value: Value) -> serde_json::Result<Vec<Record>> {
        match value {
            Value::Array(items) => items.into_iter().map(|item| self.parse_item(item)).collect(),
            _ => Ok(Vec::new()),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// A fetched record of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    User(User),
    Post(Post),
    Comment(Comment),
    Album(Album),
}

impl Record {
    pub fn id(&self) -> i64 {
        match self {
            Record::User(u) => u.id,
            Record::Post(p) => p.id,
            Record::Comment(c) => c.id,
            Record::Album(a) => a.id,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Record::User(_) => ResourceKind::Users,
            Record::Post(_) => ResourceKind::Posts,
            Record::Comment(_) => ResourceKind::Comments,
            Record::Album(_) => ResourceKind::Albums,
        }
    }

    /// Owning user, by convention only. Users have no owner.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Record::User(_) => None,
            Record::Post(p) => Some(p.user_id),
            Record::Comment(c) => Some(c.user_id),
            Record::Album(a) => Some(a.user_id),
        }
    }
}
