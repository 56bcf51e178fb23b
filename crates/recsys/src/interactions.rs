//! User interaction store
//!
//! Read queries over the feedback, impression and authorship history that
//! the rest of the platform writes, plus the thin write operations the
//! event handlers call through this service.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use plateful_core::Result;
use sqlx::{PgPool, Row};

use crate::types::FeedbackKind;

/// Access to a user's interaction history
#[async_trait]
pub trait InteractionStore: Send + Sync {
    async fn liked_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>>;
    async fn disliked_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>>;
    async fn viewed_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>>;
    async fn detail_viewed_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>>;
    async fn authored_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>>;

    async fn add_feedback(&self, user_id: i64, recipe_id: i64, kind: FeedbackKind) -> Result<()>;
    async fn remove_feedback(&self, user_id: i64, recipe_id: i64) -> Result<()>;
    async fn add_impression(
        &self,
        user_id: i64,
        recipe_id: i64,
        source: &str,
        is_detail: bool,
    ) -> Result<()>;
}

/// One user's interaction history, loaded once per request and shared by
/// the preference builder and the exclusion-set computation.
#[derive(Debug, Clone, Default)]
pub struct InteractionSnapshot {
    pub liked: HashSet<i64>,
    pub disliked: HashSet<i64>,
    pub viewed: HashSet<i64>,
    pub detail_viewed: HashSet<i64>,
    pub authored: HashSet<i64>,
}

impl InteractionSnapshot {
    pub async fn load(store: &dyn InteractionStore, user_id: i64) -> Result<Self> {
        let liked = store.liked_recipe_ids(user_id).await?;
        let disliked = store.disliked_recipe_ids(user_id).await?;
        let viewed = store.viewed_recipe_ids(user_id).await?;
        let detail_viewed = store.detail_viewed_recipe_ids(user_id).await?;
        let authored = store.authored_recipe_ids(user_id).await?;

        Ok(Self {
            liked,
            disliked,
            viewed,
            detail_viewed,
            authored,
        })
    }

    /// Ids never recommended back to the user. Liked, disliked and
    /// authored recipes are always excluded; `exclude_seen` additionally
    /// removes plain and detail views.
    pub fn exclusion_set(&self, exclude_seen: bool) -> HashSet<i64> {
        let mut exclude: HashSet<i64> = self.liked.union(&self.disliked).copied().collect();
        exclude.extend(&self.authored);

        if exclude_seen {
            exclude.extend(&self.viewed);
            exclude.extend(&self.detail_viewed);
        }

        exclude
    }
}

/// Postgres-backed interaction store
pub struct PostgresInteractionStore {
    pool: PgPool,
}

impl PostgresInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn feedback_ids(&self, user_id: i64, kind: FeedbackKind) -> Result<HashSet<i64>> {
        let rows = sqlx::query(
            r#"
            SELECT recipe_id
            FROM recipe_feedback
            WHERE user_id = $1 AND kind = $2
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get("recipe_id")).collect())
    }

    async fn impression_ids(&self, user_id: i64, is_detail: bool) -> Result<HashSet<i64>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT recipe_id
            FROM recipe_impressions
            WHERE user_id = $1 AND is_detail = $2
            "#,
        )
        .bind(user_id)
        .bind(is_detail)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get("recipe_id")).collect())
    }
}

#[async_trait]
impl InteractionStore for PostgresInteractionStore {
    async fn liked_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        self.feedback_ids(user_id, FeedbackKind::Like).await
    }

    async fn disliked_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        self.feedback_ids(user_id, FeedbackKind::Dislike).await
    }

    async fn viewed_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        self.impression_ids(user_id, false).await
    }

    async fn detail_viewed_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        self.impression_ids(user_id, true).await
    }

    async fn authored_recipe_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        let rows = sqlx::query(
            r#"
            SELECT id
            FROM recipes
            WHERE author_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get("id")).collect())
    }

    async fn add_feedback(&self, user_id: i64, recipe_id: i64, kind: FeedbackKind) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_feedback (user_id, recipe_id, kind, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, recipe_id)
            DO UPDATE SET kind = EXCLUDED.kind, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .bind(kind.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_feedback(&self, user_id: i64, recipe_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM recipe_feedback
            WHERE user_id = $1 AND recipe_id = $2
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn add_impression(
        &self,
        user_id: i64,
        recipe_id: i64,
        source: &str,
        is_detail: bool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_impressions (user_id, recipe_id, source, is_detail, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .bind(source)
        .bind(is_detail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
