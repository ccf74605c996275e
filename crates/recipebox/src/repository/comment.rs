//! Cached comment repository.

use std::sync::Arc;

use recipebox_core::cache::{comment_key, list_pattern, Cache};
use recipebox_core::repository::CommentRepository;
use recipebox_core::resource::ResourceStream;
use recipebox_core::social::{validate_comment, Comment, Post};
use recipebox_core::storage::{Direction, DocumentStore, Filter, Query, RepositoryError, Result};

use super::once;
use super::read_through::ReadThrough;
use crate::remote::EntitySource;

fn comments_scope(post_id: &str) -> String {
    format!("comments_{}", post_id)
}

/// Comment repository with read-through caching.
///
/// Adding or deleting a comment also adjusts the parent post's
/// `comment_count`. The comment write and the counter update are separate
/// remote calls; a failed counter update is reported as a partial failure.
pub struct CachedCommentRepository<S, C> {
    comments: EntitySource<S, Comment>,
    posts: EntitySource<S, Post>,
    layer: ReadThrough<C>,
}

impl<S, C> CachedCommentRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>) -> Self {
        Self {
            comments: EntitySource::new(Arc::clone(&store)),
            posts: EntitySource::new(store),
            layer,
        }
    }
}

async fn adjust_comment_count<S: DocumentStore>(
    posts: &EntitySource<S, Post>,
    post_id: &str,
    delta: i64,
    completed: &str,
) -> Result<()> {
    posts
        .increment(post_id, "comment_count", delta)
        .await
        .map_err(|err| RepositoryError::PartialFailure {
            completed: completed.to_string(),
            failed: format!("comment_count update failed: {}", err),
        })
}

impl<S, C> CommentRepository for CachedCommentRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn add_comment(&self, comment: Comment) -> ResourceStream<Comment> {
        let comments = self.comments.clone();
        let posts = self.posts.clone();
        let layer = self.layer.clone();
        once("Failed to add comment", async move {
            validate_comment(&comment.content)?;
            posts.require(&comment.post_id).await?;
            comments.create(&comment).await?;

            layer.store(&comment_key(&comment.id), &comment).await;
            layer
                .evict_pattern(&list_pattern(&comments_scope(&comment.post_id)))
                .await;

            adjust_comment_count(&posts, &comment.post_id, 1, "Comment write").await?;

            tracing::debug!(comment_id = %comment.id, post_id = %comment.post_id, "Comment added");
            Ok(comment)
        })
    }

    fn get_comments(
        &self,
        post_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Comment>> {
        let comments = self.comments.clone();
        let query = Query::new()
            .filter(Filter::eq("post_id", post_id))
            .order_by("created_at", Direction::Ascending)
            .limit(limit)
            .start_after(cursor);
        self.layer
            .fetch_page(&comments_scope(post_id), limit, cursor, async move {
                comments.list(&query).await
            })
    }

    fn update_comment(&self, comment: Comment) -> ResourceStream<Comment> {
        let comments = self.comments.clone();
        let layer = self.layer.clone();
        once("Failed to update comment", async move {
            validate_comment(&comment.content)?;
            comments.replace(&comment).await?;

            layer.store(&comment_key(&comment.id), &comment).await;
            layer
                .evict_pattern(&list_pattern(&comments_scope(&comment.post_id)))
                .await;
            Ok(comment)
        })
    }

    fn delete_comment(&self, post_id: &str, comment_id: &str) -> ResourceStream<()> {
        let comments = self.comments.clone();
        let posts = self.posts.clone();
        let layer = self.layer.clone();
        let post_id = post_id.to_string();
        let comment_id = comment_id.to_string();
        once("Failed to delete comment", async move {
            // Deleting an absent comment is a no-op and leaves the counter alone.
            if comments.get(&comment_id).await?.is_none() {
                return Ok(());
            }
            comments.delete(&comment_id).await?;

            layer.evict(&comment_key(&comment_id)).await;
            layer
                .evict_pattern(&list_pattern(&comments_scope(&post_id)))
                .await;

            adjust_comment_count(&posts, &post_id, -1, "Comment delete").await?;

            tracing::debug!(%comment_id, %post_id, "Comment deleted");
            Ok(())
        })
    }
}
