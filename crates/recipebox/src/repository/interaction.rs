//! Optimistic post and comment interactions.

use std::sync::Arc;

use recipebox_core::cache::Cache;
use recipebox_core::repository::InteractionRepository;
use recipebox_core::resource::ResourceStream;
use recipebox_core::social::{Edge, EdgeKind, LikeType, TargetKind};
use recipebox_core::storage::DocumentStore;

use super::optimistic::{EdgeState, OptimisticEdges};
use super::read_through::ReadThrough;
use crate::remote::EdgeSource;

/// Likes, shares and saves on posts and comments.
///
/// Each toggle is applied to the cache before the remote write and reverted
/// if the write fails.
pub struct CachedInteractionRepository<S, C> {
    edges: OptimisticEdges<S, C>,
}

impl<S, C> CachedInteractionRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>) -> Self {
        Self {
            edges: OptimisticEdges::new(EdgeSource::new(store), layer),
        }
    }

    fn toggle(
        &self,
        kind: EdgeKind,
        target_kind: TargetKind,
        user_id: &str,
        target_id: &str,
        desired: EdgeState,
        fallback: &'static str,
    ) -> ResourceStream<()> {
        let edge = Edge::new(kind, target_kind, user_id, target_id);
        self.edges.apply(edge, desired, fallback)
    }
}

impl<S, C> InteractionRepository for CachedInteractionRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn like_post(&self, user_id: &str, post_id: &str, like_type: LikeType) -> ResourceStream<()> {
        let edge = Edge::new(EdgeKind::Like, TargetKind::Post, user_id, post_id)
            .with_metadata(like_type.as_str());
        self.edges
            .apply(edge, EdgeState::Present, "Failed to like post")
    }

    fn unlike_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.toggle(
            EdgeKind::Like,
            TargetKind::Post,
            user_id,
            post_id,
            EdgeState::Absent,
            "Failed to unlike post",
        )
    }

    fn is_post_liked_by_user(&self, user_id: &str, post_id: &str) -> ResourceStream<bool> {
        self.edges
            .exists(EdgeKind::Like, TargetKind::Post, user_id, post_id)
    }

    fn share_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.toggle(
            EdgeKind::Share,
            TargetKind::Post,
            user_id,
            post_id,
            EdgeState::Present,
            "Failed to share post",
        )
    }

    fn unshare_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.toggle(
            EdgeKind::Share,
            TargetKind::Post,
            user_id,
            post_id,
            EdgeState::Absent,
            "Failed to unshare post",
        )
    }

    fn save_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.toggle(
            EdgeKind::Save,
            TargetKind::Post,
            user_id,
            post_id,
            EdgeState::Present,
            "Failed to save post",
        )
    }

    fn unsave_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.toggle(
            EdgeKind::Save,
            TargetKind::Post,
            user_id,
            post_id,
            EdgeState::Absent,
            "Failed to unsave post",
        )
    }

    fn is_post_saved(&self, user_id: &str, post_id: &str) -> ResourceStream<bool> {
        self.edges
            .exists(EdgeKind::Save, TargetKind::Post, user_id, post_id)
    }

    fn like_comment(&self, user_id: &str, comment_id: &str) -> ResourceStream<()> {
        self.toggle(
            EdgeKind::Like,
            TargetKind::Comment,
            user_id,
            comment_id,
            EdgeState::Present,
            "Failed to like comment",
        )
    }

    fn unlike_comment(&self, user_id: &str, comment_id: &str) -> ResourceStream<()> {
        self.toggle(
            EdgeKind::Like,
            TargetKind::Comment,
            user_id,
            comment_id,
            EdgeState::Absent,
            "Failed to unlike comment",
        )
    }

    fn get_post_likes(
        &self,
        post_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Edge>> {
        self.edges
            .by_target(EdgeKind::Like, TargetKind::Post, post_id, limit, cursor)
    }
}
