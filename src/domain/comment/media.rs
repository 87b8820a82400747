use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Media embedded in a comment, tagged by provider.
///
/// The tag is carried in the serialized form (`"type"`); an unknown tag
/// fails deserialization instead of falling through to a default case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export)]
pub enum CommentMedia {
    Giphy {
        url: String,
        still: String,
        video: String,
        title: Option<String>,
    },
    Youtube {
        url: String,
        still: String,
    },
    Twitter {
        url: String,
    },
    External {
        url: String,
    },
}

impl CommentMedia {
    pub fn url(&self) -> &str {
        match self {
            CommentMedia::Giphy { url, .. } => url,
            CommentMedia::Youtube { url, .. } => url,
            CommentMedia::Twitter { url } => url,
            CommentMedia::External { url } => url,
        }
    }
}
