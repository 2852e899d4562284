use serde::{Deserialize, Serialize};

/// Substring marking a thumbnail sprite sheet instead of a playable asset.
pub const SPRITE_MARKER: &str = "imageSprite";
/// Filename of the playable rendition next to the sprite sheet.
pub const SPRITE_VIDEO_SUFFIX: &str = "v.f1484071.mp4";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(rename = "creatorID")]
    pub creator_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub web_vtt_url: String,
}

//==============================================================================
// Review decision
//==============================================================================

/// Review state of a single post. Approved and Rejected are terminal; a
/// failed submission leaves the post Pending and resubmittable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewDecision {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewDecision {
    /// Server-side status code. -1 is the unreviewed sentinel.
    pub const fn code(self) -> i32 {
        match self {
            Self::Pending => -1,
            Self::Approved => 2,
            Self::Rejected => 3,
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Swap a sprite-sheet preview URL for its playable rendition. URLs without
/// the marker pass through unchanged.
pub fn playable_url(url: &str) -> String {
    match url.find(SPRITE_MARKER) {
        Some(index) => format!("{}{}", &url[..index], SPRITE_VIDEO_SUFFIX),
        None => url.to_string(),
    }
}
