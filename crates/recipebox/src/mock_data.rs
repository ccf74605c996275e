//! Demo content for seeding the in-memory store.
//!
//! The `generate_*` functions are pure and deterministic given a reference
//! time; [`seed`] writes their output through the remote sources so that
//! edge counters line up with the edges that exist.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use recipebox_core::social::{
    now, Comment, Cookbook, Edge, EdgeKind, LikeType, Post, Recipe, TargetKind, User, UserRole,
    Visibility,
};
use recipebox_core::storage::{DocumentStore, Result};

use crate::remote::{EdgeSource, EntitySource};

/// Administrator account in the demo data.
pub const DEMO_ADMIN_ID: &str = "user-ana";
/// Regular account the CLI acts as by default.
pub const DEMO_USER_ID: &str = "user-ben";

const COOKS: [(&str, &str, &str); 4] = [
    ("user-ana", "ana@recipebox.dev", "Ana"),
    ("user-ben", "ben@recipebox.dev", "Ben"),
    ("user-chloe", "chloe@recipebox.dev", "Chloe"),
    ("user-dev", "dev@recipebox.dev", "Dev"),
];

/// Generate the demo user accounts. The first one is an administrator.
pub fn generate_users() -> Vec<User> {
    COOKS
        .iter()
        .map(|(id, email, name)| {
            let user = User::new(*email, *name)
                .with_id(*id)
                .with_bio(format!("{} cooks mostly on weekends.", name));
            if *id == DEMO_ADMIN_ID {
                user.with_role(UserRole::Admin)
            } else {
                user
            }
        })
        .collect()
}

/// Generate recipes, one per title, cycling through the demo cooks.
pub fn generate_recipes() -> Vec<Recipe> {
    let recipes = [
        (
            "Weeknight Tomato Soup",
            "soup",
            vec![("tomatoes", "800 g"), ("onion", "1"), ("stock", "500 ml")],
            (10, 25),
        ),
        (
            "Sourdough Pancakes",
            "breakfast",
            vec![("starter", "200 g"), ("flour", "150 g"), ("egg", "1")],
            (5, 15),
        ),
        (
            "Green Curry",
            "dinner",
            vec![("curry paste", "3 tbsp"), ("coconut milk", "400 ml")],
            (15, 30),
        ),
        (
            "Lemon Tart",
            "dessert",
            vec![("lemons", "4"), ("butter", "120 g"), ("sugar", "150 g")],
            (40, 35),
        ),
    ];

    recipes
        .into_iter()
        .enumerate()
        .map(|(i, (title, tag, ingredients, (prep, cook)))| {
            let author = COOKS[i % COOKS.len()].0;
            let recipe = Recipe::new(author, title)
                .with_id(format!("recipe-{}", i + 1))
                .with_description(format!("A {} favourite.", tag))
                .with_tag(tag)
                .with_times(prep, cook)
                .with_step("Prepare the ingredients.")
                .with_step("Cook and serve.");
            ingredients
                .into_iter()
                .fold(recipe, |recipe, (name, quantity)| {
                    recipe.with_ingredient(name, quantity)
                })
        })
        .collect()
}

/// Generate posts spread over the hours before `reference`.
///
/// Every third post is followers-only so home feeds and the public feed
/// differ.
pub fn generate_posts(reference: DateTime<Utc>, count: usize) -> Vec<Post> {
    let lines = [
        "Finally nailed the crust on this one.",
        "Market haul: tomatoes everywhere.",
        "Trying a new curry paste tonight.",
        "Pancake Sunday again.",
        "Who else meal-preps on Mondays?",
    ];

    (0..count)
        .map(|i| {
            let author = COOKS[i % COOKS.len()].0;
            let visibility = if i % 3 == 2 {
                Visibility::Followers
            } else {
                Visibility::Public
            };
            Post::new(author, lines[i % lines.len()])
                .with_id(format!("post-{}", i + 1))
                .with_visibility(visibility)
                .with_created_at(reference - Duration::hours(i as i64))
        })
        .collect()
}

/// Generate a cookbook owned by the admin holding the first two recipes.
pub fn generate_cookbooks(recipes: &[Recipe]) -> Vec<Cookbook> {
    let cookbook = recipes.iter().take(2).fold(
        Cookbook::new(DEMO_ADMIN_ID, "Comfort Food")
            .with_id("cookbook-1")
            .with_description("Things to cook when it rains."),
        |cookbook, recipe| cookbook.with_recipe(recipe.id.clone()),
    );
    vec![cookbook]
}

/// Generate follow, like and reference edges between the generated content.
pub fn generate_edges(posts: &[Post], recipes: &[Recipe]) -> Vec<Edge> {
    let mut edges = vec![
        Edge::new(EdgeKind::Follow, TargetKind::User, DEMO_USER_ID, "user-ana"),
        Edge::new(EdgeKind::Follow, TargetKind::User, DEMO_USER_ID, "user-chloe"),
        Edge::new(EdgeKind::Follow, TargetKind::User, "user-chloe", DEMO_USER_ID),
        Edge::new(EdgeKind::Follow, TargetKind::User, "user-dev", "user-ana"),
        Edge::new(
            EdgeKind::Collaborator,
            TargetKind::Cookbook,
            "user-chloe",
            "cookbook-1",
        )
        .with_metadata("editor"),
    ];

    for (i, post) in posts.iter().enumerate() {
        for (liker, _, _) in COOKS.iter().take(i % COOKS.len()) {
            if *liker != post.author_id {
                edges.push(
                    Edge::new(EdgeKind::Like, TargetKind::Post, *liker, &post.id)
                        .with_metadata(LikeType::Yum.as_str()),
                );
            }
        }
    }

    for (post, recipe) in posts.iter().zip(recipes) {
        edges.push(Edge::new(
            EdgeKind::RecipeReference,
            TargetKind::Recipe,
            &post.id,
            &recipe.id,
        ));
    }

    edges
}

/// Writes the demo data set into `store`.
pub async fn seed<S: DocumentStore>(store: &Arc<S>) -> Result<()> {
    let users_source = EntitySource::<S, User>::new(Arc::clone(store));
    let posts_source = EntitySource::<S, Post>::new(Arc::clone(store));
    let comments_source = EntitySource::<S, Comment>::new(Arc::clone(store));
    let recipes_source = EntitySource::<S, Recipe>::new(Arc::clone(store));
    let cookbooks_source = EntitySource::<S, Cookbook>::new(Arc::clone(store));
    let edges = EdgeSource::new(Arc::clone(store));

    let users = generate_users();
    let recipes = generate_recipes();
    let posts = generate_posts(now(), 12);
    let cookbooks = generate_cookbooks(&recipes);

    for user in &users {
        users_source.create(user).await?;
    }
    for recipe in &recipes {
        recipes_source.create(recipe).await?;
    }
    for cookbook in &cookbooks {
        cookbooks_source.create(cookbook).await?;
    }
    for post in &posts {
        posts_source.create(post).await?;
        users_source.increment(&post.author_id, "post_count", 1).await?;
    }

    if let Some(first) = posts.first() {
        let comment = Comment::new(&first.id, DEMO_USER_ID, "Looks great!").with_id("comment-1");
        comments_source.create(&comment).await?;
        posts_source.increment(&first.id, "comment_count", 1).await?;
    }

    let generated = generate_edges(&posts, &recipes);
    for edge in &generated {
        edges.create(edge).await?;
    }

    tracing::info!(
        users = users.len(),
        posts = posts.len(),
        recipes = recipes.len(),
        edges = generated.len(),
        "Seeded demo data"
    );
    Ok(())
}
