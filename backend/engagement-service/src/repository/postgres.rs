use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::{EntityStore, VideoFilter};
use crate::domain::{
    Comment, Like, LikeTarget, Playlist, Subscription, TargetKind, ToggleOutcome, Tweet, User,
    Video,
};
use crate::error::{AppError, Result};
use crate::pagination::PageRequest;

const USER_COLUMNS: &str = "id, username, email, display_name, avatar_ref, created_at";
const VIDEO_COLUMNS: &str = "id, owner_id, title, description, media_ref, thumbnail_ref, \
     duration_seconds, view_count, is_published, created_at";

/// PostgreSQL entity store (source of truth in production).
///
/// Natural-key uniqueness lives in the schema; toggles are single
/// data-modifying statements and view recording runs in one transaction, so
/// concurrent identical requests cannot create duplicates or double count.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct LikeRow {
    id: Uuid,
    liked_by: Uuid,
    target_kind: String,
    target_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<LikeRow> for Like {
    type Error = AppError;

    fn try_from(row: LikeRow) -> Result<Self> {
        let kind: TargetKind = row
            .target_kind
            .parse()
            .map_err(|_| AppError::Internal(format!("corrupt like kind '{}'", row.target_kind)))?;
        Ok(Like {
            id: row.id,
            liked_by: row.liked_by,
            target: LikeTarget::new(kind, row.target_id),
            created_at: row.created_at,
        })
    }
}

fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

/// Escape LIKE wildcards so a title search matches the text literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn attach_watch_history(&self, users: &mut [User]) -> Result<()> {
        if users.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT user_id, video_id
            FROM watch_history
            WHERE user_id = ANY($1)
            ORDER BY watched_at DESC, video_id DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut history: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (user_id, video_id) in rows {
            history.entry(user_id).or_default().push(video_id);
        }
        for user in users.iter_mut() {
            user.watch_history = history.remove(&user.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn attach_playlist_videos(&self, playlists: &mut [Playlist]) -> Result<()> {
        if playlists.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = playlists.iter().map(|p| p.id).collect();
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT playlist_id, video_id
            FROM playlist_videos
            WHERE playlist_id = ANY($1)
            ORDER BY position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut videos: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (playlist_id, video_id) in rows {
            videos.entry(playlist_id).or_default().push(video_id);
        }
        for playlist in playlists.iter_mut() {
            playlist.videos = videos.remove(&playlist.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn playlist_exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM playlists WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait::async_trait]
impl EntityStore for PgEntityStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, display_name, avatar_ref, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.avatar_ref)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match user {
            Some(user) => {
                let mut users = [user];
                self.attach_watch_history(&mut users).await?;
                let [user] = users;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1) \
             ORDER BY LOWER(username) = LOWER($1) DESC LIMIT 1",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;

        match user {
            Some(user) => self.get_user(user.id).await,
            None => Ok(None),
        }
    }

    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        let mut users = sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        self.attach_watch_history(&mut users).await?;
        Ok(users)
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_video(&self, video: Video) -> Result<Video> {
        sqlx::query(
            r#"
            INSERT INTO videos (id, owner_id, title, description, media_ref, thumbnail_ref,
                                duration_seconds, view_count, is_published, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(video.id)
        .bind(video.owner_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.media_ref)
        .bind(&video.thumbnail_ref)
        .bind(video.duration_seconds)
        .bind(video.view_count)
        .bind(video.is_published)
        .bind(video.created_at)
        .execute(&self.pool)
        .await?;

        Ok(video)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        let sql = format!("SELECT {} FROM videos WHERE id = $1", VIDEO_COLUMNS);
        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn get_videos(&self, ids: &[Uuid]) -> Result<Vec<Video>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM videos WHERE id = ANY($1)", VIDEO_COLUMNS);
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(videos)
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn list_videos(
        &self,
        filter: &VideoFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Video>, u64)> {
        let owners = filter.owner_ids.as_deref();
        let title = filter.title_contains.as_deref().map(like_pattern);
        let where_clause = "($1::uuid[] IS NULL OR owner_id = ANY($1)) \
             AND ($2::text IS NULL OR title ILIKE $2)";

        // Sort column and direction come from closed enums, never from input text.
        let sql = format!(
            "SELECT {cols} FROM videos WHERE {filter} \
             ORDER BY {col} {dir}, id {dir} LIMIT $3 OFFSET $4",
            cols = VIDEO_COLUMNS,
            filter = where_clause,
            col = page.sort.column(),
            dir = page.order.as_sql(),
        );
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(owners)
            .bind(title.as_deref())
            .bind(i64::from(page.limit))
            .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM videos WHERE {}", where_clause);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(owners)
            .bind(title.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok((videos, to_count(total)))
    }

    async fn video_ids_by_owner(&self, owner_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM videos WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn insert_tweet(&self, tweet: Tweet) -> Result<Tweet> {
        sqlx::query(
            "INSERT INTO tweets (id, owner_id, content, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(tweet.id)
        .bind(tweet.owner_id)
        .bind(&tweet.content)
        .bind(tweet.created_at)
        .execute(&self.pool)
        .await?;
        Ok(tweet)
    }

    async fn tweets_by_owners(&self, owner_ids: &[Uuid]) -> Result<Vec<Tweet>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }
        let tweets = sqlx::query_as::<_, Tweet>(
            "SELECT id, owner_id, content, created_at FROM tweets WHERE owner_id = ANY($1)",
        )
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(tweets)
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, video_id, owner_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(comment.video_id)
        .bind(comment.owner_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn like_target_exists(&self, target: &LikeTarget) -> Result<bool> {
        let sql = match target {
            LikeTarget::Video(_) => "SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)",
            LikeTarget::Comment(_) => "SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)",
            LikeTarget::Tweet(_) => "SELECT EXISTS(SELECT 1 FROM tweets WHERE id = $1)",
        };
        let exists: bool = sqlx::query_scalar(sql)
            .bind(target.id())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_subscription(&self, subscription: Subscription) -> Result<Subscription> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, subscriber_id, channel_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.subscriber_id)
        .bind(subscription.channel_id)
        .bind(subscription.created_at)
        .execute(&self.pool)
        .await?;
        Ok(subscription)
    }

    async fn toggle_subscription(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<ToggleOutcome> {
        // A concurrent toggle that inserted first makes our INSERT a no-op;
        // the pair is then active either way.
        let (removed,): (bool,) = sqlx::query_as(
            r#"
            WITH removed AS (
                DELETE FROM subscriptions
                WHERE subscriber_id = $1 AND channel_id = $2
                RETURNING id
            ), inserted AS (
                INSERT INTO subscriptions (id, subscriber_id, channel_id, created_at)
                SELECT $3, $1, $2, NOW()
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT (subscriber_id, channel_id) DO NOTHING
                RETURNING id
            )
            SELECT EXISTS(SELECT 1 FROM removed)
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await?;

        let outcome = if removed {
            ToggleOutcome::deactivated()
        } else {
            ToggleOutcome::activated()
        };
        debug!(%subscriber_id, %channel_id, ?outcome, "toggled subscription");
        Ok(outcome)
    }

    async fn subscriptions_of(&self, subscriber_id: Uuid) -> Result<Vec<Subscription>> {
        let subs = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, subscriber_id, channel_id, created_at
            FROM subscriptions
            WHERE subscriber_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(subs)
    }

    async fn subscribers_of(&self, channel_id: Uuid) -> Result<Vec<Subscription>> {
        let subs = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, subscriber_id, channel_id, created_at
            FROM subscriptions
            WHERE channel_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(subs)
    }

    async fn count_subscribers(&self, channel_id: Uuid) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(to_count(count))
    }

    async fn is_subscribed(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE subscriber_id = $1 AND channel_id = $2
            )
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn toggle_like(&self, actor_id: Uuid, target: LikeTarget) -> Result<ToggleOutcome> {
        let (removed,): (bool,) = sqlx::query_as(
            r#"
            WITH removed AS (
                DELETE FROM likes
                WHERE liked_by = $1 AND target_kind = $2 AND target_id = $3
                RETURNING id
            ), inserted AS (
                INSERT INTO likes (id, liked_by, target_kind, target_id, created_at)
                SELECT $4, $1, $2, $3, NOW()
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT (liked_by, target_kind, target_id) DO NOTHING
                RETURNING id
            )
            SELECT EXISTS(SELECT 1 FROM removed)
            "#,
        )
        .bind(actor_id)
        .bind(target.kind().as_str())
        .bind(target.id())
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await?;

        let outcome = if removed {
            ToggleOutcome::deactivated()
        } else {
            ToggleOutcome::activated()
        };
        debug!(%actor_id, ?target, ?outcome, "toggled like");
        Ok(outcome)
    }

    async fn has_liked(&self, actor_id: Uuid, target: &LikeTarget) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE liked_by = $1 AND target_kind = $2 AND target_id = $3
            )
            "#,
        )
        .bind(actor_id)
        .bind(target.kind().as_str())
        .bind(target.id())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count_likes(&self, target: &LikeTarget) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM likes WHERE target_kind = $1 AND target_id = $2",
        )
        .bind(target.kind().as_str())
        .bind(target.id())
        .fetch_one(&self.pool)
        .await?;
        Ok(to_count(count))
    }

    async fn count_likes_on_videos(&self, video_ids: &[Uuid]) -> Result<u64> {
        if video_ids.is_empty() {
            return Ok(0);
        }
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM likes WHERE target_kind = 'video' AND target_id = ANY($1)",
        )
        .bind(video_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(to_count(count))
    }

    async fn likes_by_user(&self, actor_id: Uuid, kind: TargetKind) -> Result<Vec<Like>> {
        let rows = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT id, liked_by, target_kind, target_id, created_at
            FROM likes
            WHERE liked_by = $1 AND target_kind = $2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(actor_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Like::try_from).collect()
    }

    async fn record_view(&self, viewer_id: Uuid, video_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO views (id, viewer_id, video_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (viewer_id, video_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(viewer_id)
        .bind(video_id)
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_some() {
            sqlx::query("UPDATE videos SET view_count = view_count + 1 WHERE id = $1")
                .bind(video_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO watch_history (user_id, video_id, watched_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (user_id, video_id) DO UPDATE SET watched_at = EXCLUDED.watched_at
                "#,
            )
            .bind(viewer_id)
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(inserted.is_some())
    }

    async fn remove_view(&self, viewer_id: Uuid, video_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let removed: Option<(Uuid,)> = sqlx::query_as(
            "DELETE FROM views WHERE viewer_id = $1 AND video_id = $2 RETURNING id",
        )
        .bind(viewer_id)
        .bind(video_id)
        .fetch_optional(&mut *tx)
        .await?;

        if removed.is_some() {
            sqlx::query(
                "UPDATE videos SET view_count = GREATEST(view_count - 1, 0) WHERE id = $1",
            )
            .bind(video_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM watch_history WHERE user_id = $1 AND video_id = $2")
                .bind(viewer_id)
                .bind(video_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(removed.is_some())
    }

    async fn count_views(&self, video_id: Uuid) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM views WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(count))
    }

    async fn count_views_on_videos(&self, video_ids: &[Uuid]) -> Result<u64> {
        if video_ids.is_empty() {
            return Ok(0);
        }
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM views WHERE video_id = ANY($1)")
                .bind(video_ids)
                .fetch_one(&self.pool)
                .await?;
        Ok(to_count(count))
    }

    async fn insert_playlist(&self, playlist: Playlist) -> Result<Playlist> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO playlists (id, owner_id, name, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(playlist.id)
        .bind(playlist.owner_id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.created_at)
        .execute(&mut *tx)
        .await?;

        for video_id in &playlist.videos {
            sqlx::query(
                "INSERT INTO playlist_videos (playlist_id, video_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(playlist.id)
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(playlist)
    }

    async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            "SELECT id, owner_id, name, description, created_at FROM playlists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match playlist {
            Some(playlist) => {
                let mut playlists = [playlist];
                self.attach_playlist_videos(&mut playlists).await?;
                let [playlist] = playlists;
                Ok(Some(playlist))
            }
            None => Ok(None),
        }
    }

    async fn playlists_by_owner(&self, owner_id: Uuid) -> Result<Vec<Playlist>> {
        let mut playlists = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, owner_id, name, description, created_at
            FROM playlists
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_playlist_videos(&mut playlists).await?;
        Ok(playlists)
    }

    async fn add_video_to_playlist(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO playlist_videos (playlist_id, video_id)
            SELECT $1, $2
            WHERE EXISTS (SELECT 1 FROM playlists WHERE id = $1)
            ON CONFLICT (playlist_id, video_id) DO NOTHING
            RETURNING video_id
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        if inserted.is_some() {
            return Ok(true);
        }
        if !self.playlist_exists(playlist_id).await? {
            return Err(AppError::NotFound("Playlist".to_string()));
        }
        Ok(false)
    }

    async fn remove_video_from_playlist(
        &self,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<bool> {
        let affected = sqlx::query(
            "DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2",
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected > 0 {
            return Ok(true);
        }
        if !self.playlist_exists(playlist_id).await? {
            return Err(AppError::NotFound("Playlist".to_string()));
        }
        Ok(false)
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        let Some(playlist) = self.get_playlist(id).await? else {
            return Ok(None);
        };

        let affected = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok((affected > 0).then_some(playlist))
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
