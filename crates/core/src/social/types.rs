use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters kept in a [`PostListItem`] excerpt.
pub const EXCERPT_LEN: usize = 140;

/// Returns a fresh identifier for a new entity.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns the current time at the precision stored by the remote store.
///
/// Timestamps round-trip through documents and cache entries as epoch
/// milliseconds; truncating here keeps a freshly built entity equal to its
/// stored copy.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Who can see a post, recipe or cookbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Followers,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Followers => "followers",
            Visibility::Private => "private",
        }
    }
}

/// Moderation state of user content. Admins write it directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    #[default]
    Visible,
    Flagged,
    Hidden,
    Removed,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Visible => "visible",
            ModerationStatus::Flagged => "flagged",
            ModerationStatus::Hidden => "hidden",
            ModerationStatus::Removed => "removed",
        }
    }

    /// Returns true if content in this state may appear in feeds and search.
    pub fn is_listed(&self) -> bool {
        matches!(self, ModerationStatus::Visible | ModerationStatus::Flagged)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Member,
    Admin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
    Banned,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Banned => "banned",
        }
    }
}

/// A registered user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub follower_count: i64,
    #[serde(default)]
    pub following_count: i64,
    #[serde(default)]
    pub post_count: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            email: email.into(),
            display_name: display_name.into(),
            bio: None,
            avatar_url: None,
            role: UserRole::Member,
            status: AccountStatus::Active,
            follower_count: 0,
            following_count: 0,
            post_count: 0,
            created_at: now(),
        }
    }

    /// Sets a specific ID for this user (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// A social feed post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub share_count: i64,
    #[serde(default)]
    pub save_count: i64,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub moderation: ModerationStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author_id: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: new_id(),
            author_id: author_id.into(),
            content: content.into(),
            image_urls: Vec::new(),
            visibility: Visibility::Public,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
            save_count: 0,
            view_count: 0,
            moderation: ModerationStatus::Visible,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific ID for this post (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_urls.push(url.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }
}

/// Reduced view of a [`Post`] used by list screens.
///
/// Always derived from a post via `From<&Post>`, never edited on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostListItem {
    pub id: String,
    pub author_id: String,
    pub excerpt: String,
    pub thumbnail_url: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for PostListItem {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            author_id: post.author_id.clone(),
            excerpt: post.content.chars().take(EXCERPT_LEN).collect(),
            thumbnail_url: post.image_urls.first().cloned(),
            like_count: post.like_count,
            comment_count: post.comment_count,
            created_at: post.created_at,
        }
    }
}

/// A comment on a post, optionally replying to another comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub like_count: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        post_id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            post_id: post_id.into(),
            author_id: author_id.into(),
            content: content.into(),
            parent_id: None,
            like_count: 0,
            created_at: now(),
        }
    }

    /// Sets a specific ID for this comment (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn replying_to(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }
}

/// A recipe authored by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub prep_minutes: u32,
    pub cook_minutes: u32,
    pub servings: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub save_count: i64,
    #[serde(default)]
    pub moderation: ModerationStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    pub fn new(author_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: new_id(),
            author_id: author_id.into(),
            title: title.into(),
            description: None,
            ingredients: Vec::new(),
            steps: Vec::new(),
            prep_minutes: 0,
            cook_minutes: 0,
            servings: 1,
            tags: Vec::new(),
            image_url: None,
            visibility: Visibility::Public,
            like_count: 0,
            save_count: 0,
            moderation: ModerationStatus::Visible,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific ID for this recipe (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_ingredient(mut self, name: impl Into<String>, quantity: impl Into<String>) -> Self {
        self.ingredients.push(Ingredient::new(name, quantity));
        self
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_times(mut self, prep_minutes: u32, cook_minutes: u32) -> Self {
        self.prep_minutes = prep_minutes;
        self.cook_minutes = cook_minutes;
        self
    }

    pub fn total_minutes(&self) -> u32 {
        self.prep_minutes + self.cook_minutes
    }
}

/// A named collection of recipes, optionally shared with collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookbook {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub recipe_ids: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub save_count: i64,
    #[serde(default)]
    pub collaborator_count: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Cookbook {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: new_id(),
            owner_id: owner_id.into(),
            title: title.into(),
            description: None,
            recipe_ids: Vec::new(),
            visibility: Visibility::Public,
            save_count: 0,
            collaborator_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific ID for this cookbook (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_recipe(mut self, recipe_id: impl Into<String>) -> Self {
        self.recipe_ids.push(recipe_id.into());
        self
    }
}

/// Totals shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_posts: usize,
    pub total_recipes: usize,
    pub total_cookbooks: usize,
    pub flagged_posts: usize,
    pub suspended_users: usize,
}

/// The signed-in identity reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub email_verified: bool,
    /// Sign-in method, e.g. `"password"` or `"google"`.
    pub provider: String,
}
