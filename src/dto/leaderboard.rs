use serde::Deserialize;

/// Leaderboard payload returned by `GET /events/{id}/leaderboard` and pushed in realtime frames.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardDto {
    /// Ranked rows, best first.
    #[serde(default)]
    pub entries: Vec<LeaderboardEntryDto>,
    /// Rank of the calling fan.
    #[serde(default)]
    pub user_rank: Option<u32>,
}

/// One ranked row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryDto {
    /// 1-based rank.
    pub rank: u32,
    /// Ranked fan.
    pub user_id: String,
    /// Name shown on the board; empty when the backend omits it.
    #[serde(default)]
    pub display_name: String,
    /// Points for this event.
    pub points: i64,
}
