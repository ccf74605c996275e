use crate::resource::ResourceStream;
use crate::social::{
    AccountStatus, CollaboratorRole, Comment, Cookbook, DashboardStats, Edge, LikeType,
    ModerationStatus, Post, PostListItem, Recipe, User,
};

/// Posts and post listings.
pub trait PostRepository: Send + Sync {
    fn create_post(&self, post: Post) -> ResourceStream<Post>;

    fn get_post(&self, post_id: &str) -> ResourceStream<Post>;

    fn update_post(&self, post: Post) -> ResourceStream<Post>;

    fn delete_post(&self, post_id: &str) -> ResourceStream<()>;

    /// Newest-first posts by one author.
    fn get_user_posts(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>>;

    /// Newest-first public posts by everyone.
    fn get_public_posts(
        &self,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>>;
}

/// Comments on posts.
pub trait CommentRepository: Send + Sync {
    fn add_comment(&self, comment: Comment) -> ResourceStream<Comment>;

    /// Oldest-first comments of a post.
    fn get_comments(
        &self,
        post_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Comment>>;

    fn update_comment(&self, comment: Comment) -> ResourceStream<Comment>;

    fn delete_comment(&self, post_id: &str, comment_id: &str) -> ResourceStream<()>;
}

/// Toggle-style interactions with posts and comments, applied optimistically.
pub trait InteractionRepository: Send + Sync {
    fn like_post(&self, user_id: &str, post_id: &str, like_type: LikeType) -> ResourceStream<()>;

    fn unlike_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()>;

    fn is_post_liked_by_user(&self, user_id: &str, post_id: &str) -> ResourceStream<bool>;

    fn share_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()>;

    fn unshare_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()>;

    fn save_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()>;

    fn unsave_post(&self, user_id: &str, post_id: &str) -> ResourceStream<()>;

    fn is_post_saved(&self, user_id: &str, post_id: &str) -> ResourceStream<bool>;

    fn like_comment(&self, user_id: &str, comment_id: &str) -> ResourceStream<()>;

    fn unlike_comment(&self, user_id: &str, comment_id: &str) -> ResourceStream<()>;

    fn get_post_likes(
        &self,
        post_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Edge>>;
}

/// Non-critical tracking calls. Failures are reported as success.
pub trait AnalyticsRepository: Send + Sync {
    fn record_post_view(&self, post_id: &str, viewer_id: Option<&str>) -> ResourceStream<()>;
}

/// Recipes referenced from posts.
pub trait ReferenceRepository: Send + Sync {
    fn attach_recipe(&self, post_id: &str, recipe_id: &str) -> ResourceStream<()>;

    fn detach_recipe(&self, post_id: &str, recipe_id: &str) -> ResourceStream<()>;

    fn get_post_recipes(&self, post_id: &str) -> ResourceStream<Vec<Recipe>>;
}

/// Listings assembled from more than one collection.
pub trait AggregationRepository: Send + Sync {
    /// Newest-first posts by the authors a user follows.
    fn get_home_feed(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>>;

    /// Posts a user has saved, most recently saved first.
    fn get_saved_posts(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<PostListItem>>;
}

/// The wide feed interface, covering every feed-domain capability.
pub trait FeedRepository:
    PostRepository
    + CommentRepository
    + InteractionRepository
    + AnalyticsRepository
    + ReferenceRepository
    + AggregationRepository
{
}

impl<T> FeedRepository for T where
    T: PostRepository
        + CommentRepository
        + InteractionRepository
        + AnalyticsRepository
        + ReferenceRepository
        + AggregationRepository
{
}

/// Cookbooks, their recipes and collaborators.
pub trait CookbookRepository: Send + Sync {
    fn create_cookbook(&self, cookbook: Cookbook) -> ResourceStream<Cookbook>;

    fn get_cookbook(&self, cookbook_id: &str) -> ResourceStream<Cookbook>;

    fn update_cookbook(&self, cookbook: Cookbook) -> ResourceStream<Cookbook>;

    fn delete_cookbook(&self, cookbook_id: &str) -> ResourceStream<()>;

    fn get_user_cookbooks(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Cookbook>>;

    fn add_recipe(&self, cookbook_id: &str, recipe_id: &str) -> ResourceStream<Cookbook>;

    fn remove_recipe(&self, cookbook_id: &str, recipe_id: &str) -> ResourceStream<Cookbook>;

    fn add_collaborator(
        &self,
        cookbook_id: &str,
        user_id: &str,
        role: CollaboratorRole,
    ) -> ResourceStream<()>;

    fn remove_collaborator(&self, cookbook_id: &str, user_id: &str) -> ResourceStream<()>;

    fn get_collaborators(&self, cookbook_id: &str) -> ResourceStream<Vec<Edge>>;

    fn save_cookbook(&self, user_id: &str, cookbook_id: &str) -> ResourceStream<()>;

    fn unsave_cookbook(&self, user_id: &str, cookbook_id: &str) -> ResourceStream<()>;
}

/// Recipes and recipe interactions.
pub trait RecipeRepository: Send + Sync {
    fn create_recipe(&self, recipe: Recipe) -> ResourceStream<Recipe>;

    fn get_recipe(&self, recipe_id: &str) -> ResourceStream<Recipe>;

    fn update_recipe(&self, recipe: Recipe) -> ResourceStream<Recipe>;

    fn delete_recipe(&self, recipe_id: &str) -> ResourceStream<()>;

    fn get_user_recipes(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Recipe>>;

    fn like_recipe(&self, user_id: &str, recipe_id: &str) -> ResourceStream<()>;

    fn unlike_recipe(&self, user_id: &str, recipe_id: &str) -> ResourceStream<()>;

    fn save_recipe(&self, user_id: &str, recipe_id: &str) -> ResourceStream<()>;

    fn unsave_recipe(&self, user_id: &str, recipe_id: &str) -> ResourceStream<()>;

    fn is_recipe_saved(&self, user_id: &str, recipe_id: &str) -> ResourceStream<bool>;
}

/// Text search. Blank queries fail before any I/O.
pub trait SearchRepository: Send + Sync {
    fn search_recipes(&self, query: &str, limit: usize) -> ResourceStream<Vec<Recipe>>;

    fn search_users(&self, query: &str, limit: usize) -> ResourceStream<Vec<User>>;

    fn search_posts(&self, query: &str, limit: usize) -> ResourceStream<Vec<PostListItem>>;
}

/// Profiles and the follow graph.
pub trait UserRepository: Send + Sync {
    /// The profile of the signed-in user.
    fn current_user(&self) -> ResourceStream<User>;

    fn get_user(&self, user_id: &str) -> ResourceStream<User>;

    fn create_user(&self, user: User) -> ResourceStream<User>;

    fn update_profile(&self, user: User) -> ResourceStream<User>;

    fn follow_user(&self, actor_id: &str, target_id: &str) -> ResourceStream<()>;

    fn unfollow_user(&self, actor_id: &str, target_id: &str) -> ResourceStream<()>;

    fn is_following(&self, actor_id: &str, target_id: &str) -> ResourceStream<bool>;

    fn get_followers(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Edge>>;

    fn get_following(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Edge>>;
}

/// Moderation and account administration. Writes require an admin session.
pub trait AdminRepository: Send + Sync {
    fn get_dashboard_stats(&self) -> ResourceStream<DashboardStats>;

    fn get_flagged_posts(&self, limit: usize, cursor: Option<&str>) -> ResourceStream<Vec<Post>>;

    fn moderate_post(&self, post_id: &str, status: ModerationStatus) -> ResourceStream<()>;

    fn moderate_recipe(&self, recipe_id: &str, status: ModerationStatus) -> ResourceStream<()>;

    fn set_user_status(&self, user_id: &str, status: AccountStatus) -> ResourceStream<()>;
}

/// Uploaded images. No caching and no retries.
pub trait MediaRepository: Send + Sync {
    fn upload_image(&self, path: &str, bytes: Vec<u8>) -> ResourceStream<String>;

    fn delete_image(&self, url: &str) -> ResourceStream<()>;
}
