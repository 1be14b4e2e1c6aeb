//! Friend activity feed

use chrono::{DateTime, Duration, Utc};

use crate::error::ApiResult;
use crate::models::activity::{FriendActivity, FriendActivityRow};
use crate::repositories::ListeningHistoryRepository;

/// Users active within this window appear in the feed
const ACTIVE_WINDOW_DAYS: i64 = 7;

const FEED_LIMIT: i64 = 10;

pub const PLACEHOLDER_AVATAR: &str = "/placeholder.svg?height=40&width=40";

#[derive(Clone)]
pub struct FriendActivityService {
    history: ListeningHistoryRepository,
}

impl FriendActivityService {
    pub fn new(history: ListeningHistoryRepository) -> Self {
        Self { history }
    }

    /// Latest play of other recently active users, most recently active first
    pub async fn feed(&self, user_id: &str) -> ApiResult<Vec<FriendActivity>> {
        let now = Utc::now();
        let rows = self
            .history
            .friend_activity(user_id, now - Duration::days(ACTIVE_WINDOW_DAYS), FEED_LIMIT)
            .await?;

        Ok(rows.into_iter().map(|row| to_activity(row, now)).collect())
    }
}

fn to_activity(row: FriendActivityRow, now: DateTime<Utc>) -> FriendActivity {
    FriendActivity {
        time: format_time_ago(row.played_at, now),
        id: row.user_id,
        name: row.display_name,
        avatar: row
            .image_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string()),
        song: row.track_name,
        artist: row.artist_name,
    }
}

/// "42s ago", "5m ago", "3h ago" or "2d ago"
pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let mins = secs / 60;
    let hours = mins / 60;

    if secs < 60 {
        format!("{}s ago", secs)
    } else if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", hours / 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_ago() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::seconds(42), now), "42s ago");
        assert_eq!(format_time_ago(now - Duration::seconds(59), now), "59s ago");
        assert_eq!(format_time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_time_ago(now - Duration::minutes(90), now), "1h ago");
        assert_eq!(format_time_ago(now - Duration::hours(23), now), "23h ago");
        assert_eq!(format_time_ago(now - Duration::hours(50), now), "2d ago");
    }

    #[test]
    fn test_future_timestamps_clamp_to_zero() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now + Duration::seconds(30), now), "0s ago");
    }

    #[test]
    fn test_missing_avatar_uses_placeholder() {
        let now = Utc::now();
        let row = FriendActivityRow {
            user_id: "friend".to_string(),
            display_name: "Friend".to_string(),
            image_url: None,
            track_name: "Teardrop".to_string(),
            artist_name: "Massive Attack".to_string(),
            played_at: now - Duration::minutes(3),
        };

        let activity = to_activity(row, now);
        assert_eq!(activity.avatar, PLACEHOLDER_AVATAR);
        assert_eq!(activity.song, "Teardrop");
        assert_eq!(activity.time, "3m ago");
    }
}
