pub mod models;

pub use models::{
    ChannelSummary, Comment, Like, LikeTarget, Playlist, Subscription, TargetKind, ToggleOutcome,
    Tweet, User, Video, View,
};
