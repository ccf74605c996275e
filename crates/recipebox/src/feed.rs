//! The wide feed facade.

use std::sync::Arc;

use recipebox_core::repository::{
    AggregationRepository, AnalyticsRepository, CommentRepository, InteractionRepository,
    PostRepository, ReferenceRepository,
};
use recipebox_core::resource::ResourceStream;
use recipebox_core::social::{Comment, Edge, LikeType, Post, PostListItem, Recipe};

/// Implements every feed capability by forwarding to one narrow repository.
///
/// Holds no state of its own and never combines results.
#[derive(Clone)]
pub struct FeedFacade {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    interactions: Arc<dyn InteractionRepository>,
    analytics: Arc<dyn AnalyticsRepository>,
    references: Arc<dyn ReferenceRepository>,
    aggregation: Arc<dyn AggregationRepository>,
}

impl FeedFacade {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        interactions: Arc<dyn InteractionRepository>,
        analytics: Arc<dyn AnalyticsRepository>,
        references: Arc<dyn ReferenceRepository>,
        aggregation: Arc<dyn AggregationRepository>,
    ) -> Self {
        Self {
            posts,
            comments,
            interactions,
            analytics,
            references,
            aggregation,
        }
    }
}

impl PostRepository for FeedFacade {
    fn create_post(&self, post: Post) -> ResourceStream<Post> {
        self.posts.create_post(post)
    }

    fn get_post(&self, post_id: &str) -> ResourceStream<Post> {
        self.posts.get_post(post_id)
    }

    fn update_post(&self, post: Post) -> ResourceStream<Post> {
        self.posts.update_post(post)
    }

    fn delete_post(&self, post_id: &str) -> ResourceStream<()> {
        self.posts.delete_post(post_id)
    }

    fn get_user_posts(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>> {
        self.posts.get_user_posts(user_id, limit, cursor)
    }

    fn get_public_posts(
        &self,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>> {
        self.posts.get_public_posts(limit, cursor)
    }
}

impl CommentRepository for FeedFacade {
    fn add_comment(&self, comment: Comment) -> ResourceStream<Comment> {
        self.comments.add_comment(comment)
    }

    fn get_comments(
        &self,
        post_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Comment>> {
        self.comments.get_comments(post_id, limit, cursor)
    }

    fn update_comment(&self, comment: Comment) -> ResourceStream<Comment> {
        self.comments.update_comment(comment)
    }

    fn delete_comment(&self, post_id: &str, comment_id: &str) -> ResourceStream<()> {
        self.comments.delete_comment(post_id, comment_id)
    }
}

impl InteractionRepository for FeedFacade {
    fn like_post(&self, user_id: &str, post_id: &str, like_type: LikeType) -> ResourceStream<()> {
        self.interactions.like_post(user_id, post_id, like_type)
    }

    fn unlike_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.interactions.unlike_post(user_id, post_id)
    }

    fn is_post_liked_by_user(&self, user_id: &str, post_id: &str) -> ResourceStream<bool> {
        self.interactions.is_post_liked_by_user(user_id, post_id)
    }

    fn share_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.interactions.share_post(user_id, post_id)
    }

    fn unshare_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.interactions.unshare_post(user_id, post_id)
    }

    fn save_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.interactions.save_post(user_id, post_id)
    }

    fn unsave_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()> {
        self.interactions.unsave_post(user_id, post_id)
    }

    fn is_post_saved(&self, user_id: &str, post_id: &str) -> ResourceStream<bool> {
        self.interactions.is_post_saved(user_id, post_id)
    }

    fn like_comment(&self, user_id: &str, comment_id: &str) -> ResourceStream<()> {
        self.interactions.like_comment(user_id, comment_id)
    }

    fn unlike_comment(&self, user_id: &str, comment_id: &str) -> ResourceStream<()> {
        self.interactions.unlike_comment(user_id, comment_id)
    }

    fn get_post_likes(
        &self,
        post_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Edge>> {
        self.interactions.get_post_likes(post_id, limit, cursor)
    }
}

impl AnalyticsRepository for FeedFacade {
    fn record_post_view(&self, post_id: &str, viewer_id: Option<&str>) -> ResourceStream<()> {
        self.analytics.record_post_view(post_id, viewer_id)
    }
}

impl ReferenceRepository for FeedFacade {
    fn attach_recipe(&self, post_id: &str, recipe_id: &str) -> ResourceStream<()> {
        self.references.attach_recipe(post_id, recipe_id)
    }

    fn detach_recipe(&self, post_id: &str, recipe_id: &str) -> ResourceStream<()> {
        self.references.detach_recipe(post_id, recipe_id)
    }

    fn get_post_recipes(&self, post_id: &str) -> ResourceStream<Vec<Recipe>> {
        self.references.get_post_recipes(post_id)
    }
}

impl AggregationRepository for FeedFacade {
    fn get_home_feed(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>> {
        self.aggregation.get_home_feed(user_id, limit, cursor)
    }

    fn get_saved_posts(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>> {
        self.aggregation.get_saved_posts(user_id, limit, cursor)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_stream::stream;

    use super::*;
    use crate::testing::collect;
    use recipebox_core::repository::FeedRepository;
    use recipebox_core::resource::Resource;

    /// Records which narrow repository received each call.
    #[derive(Default)]
    struct Recorder {
        calls: AtomicUsize,
    }

    impl Recorder {
        fn hit<T: Send + 'static>(&self) -> ResourceStream<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(stream! {
                yield Resource::Failure("recorded".to_string());
            })
        }
    }

    impl PostRepository for Recorder {
        fn create_post(&self, _: Post) -> ResourceStream<Post> {
            self.hit()
        }
        fn get_post(&self, _: &str) -> ResourceStream<Post> {
            self.hit()
        }
        fn update_post(&self, _: Post) -> ResourceStream<Post> {
            self.hit()
        }
        fn delete_post(&self, _: &str) -> ResourceStream<()> {
            self.hit()
        }
        fn get_user_posts(&self, _: &str, _: usize, _: Option<&str>) -> ResourceStream<Vec<PostListItem>> {
            self.hit()
        }
        fn get_public_posts(&self, _: usize, _: Option<&str>) -> ResourceStream<Vec<PostListItem>> {
            self.hit()
        }
    }

    impl AnalyticsRepository for Recorder {
        fn record_post_view(&self, _: &str, _: Option<&str>) -> ResourceStream<()> {
            self.hit()
        }
    }

    fn facade_with(posts: Arc<Recorder>, analytics: Arc<Recorder>) -> FeedFacade {
        let state = crate::state::AppState::in_memory(&crate::config::Config {
            cache_ttl_seconds: 60,
            cache_max_entries: 100,
            default_page_size: 20,
            seed_demo_data: false,
        });
        FeedFacade {
            posts,
            analytics,
            ..state.feed
        }
    }

    fn as_feed(facade: FeedFacade) -> Arc<dyn FeedRepository> {
        Arc::new(facade)
    }

    #[tokio::test]
    async fn test_forwards_to_exactly_one_repository() {
        let posts = Arc::new(Recorder::default());
        let analytics = Arc::new(Recorder::default());
        let feed = as_feed(facade_with(Arc::clone(&posts), Arc::clone(&analytics)));

        collect(feed.get_post("p1")).await;
        collect(feed.get_public_posts(10, None)).await;
        collect(feed.record_post_view("p1", None)).await;

        assert_eq!(posts.calls.load(Ordering::SeqCst), 2);
        assert_eq!(analytics.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_passes_results_through_unchanged() {
        let posts = Arc::new(Recorder::default());
        let feed = facade_with(Arc::clone(&posts), Arc::new(Recorder::default()));

        let items = collect(feed.delete_post("p1")).await;

        assert_eq!(items, vec![Resource::failure("recorded")]);
    }
}
