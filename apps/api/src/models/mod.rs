//! Database models and API payload types for Museboxd

pub mod activity;
pub mod diary;
pub mod recommendation;
pub mod user;

pub use activity::{FriendActivity, FriendActivityRow, NewPlay};
pub use diary::{
    CreateDiaryEntryRequest, DiaryEntry, DiaryItemType, NewDiaryEntry, UpdateDiaryEntryRequest,
};
pub use recommendation::{
    AiSuggestion, ListenedTrack, RecommendationsResponse, RecommendedTrack, TrackFeatures,
};
pub use user::{Claims, Session, SessionToken, UpsertUser, User};
