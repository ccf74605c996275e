//! Cached recipe repository.

use std::sync::Arc;

use recipebox_core::cache::{list_pattern, recipe_key, Cache};
use recipebox_core::repository::RecipeRepository;
use recipebox_core::resource::ResourceStream;
use recipebox_core::social::{now, validate_recipe, Edge, EdgeKind, Recipe, TargetKind};
use recipebox_core::storage::{DocumentStore, Filter, Query};

use super::optimistic::{EdgeState, OptimisticEdges};
use super::read_through::ReadThrough;
use super::{listed, once};
use crate::remote::{EdgeSource, EntitySource};

pub fn user_recipes_scope(user_id: &str) -> String {
    format!("user_recipes_{}", user_id)
}

/// Recipe repository with read-through caching and optimistic likes/saves.
pub struct CachedRecipeRepository<S, C> {
    recipes: EntitySource<S, Recipe>,
    edges: OptimisticEdges<S, C>,
    layer: ReadThrough<C>,
}

impl<S, C> CachedRecipeRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>) -> Self {
        Self {
            recipes: EntitySource::new(Arc::clone(&store)),
            edges: OptimisticEdges::new(EdgeSource::new(store), layer.clone()),
            layer,
        }
    }

    fn toggle(
        &self,
        kind: EdgeKind,
        user_id: &str,
        recipe_id: &str,
        desired: EdgeState,
        fallback: &'static str,
    ) -> ResourceStream<()> {
        let edge = Edge::new(kind, TargetKind::Recipe, user_id, recipe_id);
        self.edges.apply(edge, desired, fallback)
    }
}

async fn evict_recipe_listings<C: Cache + 'static>(layer: &ReadThrough<C>, author_id: &str) {
    layer
        .evict_pattern(&list_pattern(&user_recipes_scope(author_id)))
        .await;
    layer.evict_pattern("search_recipes_*").await;
}

impl<S, C> RecipeRepository for CachedRecipeRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn create_recipe(&self, recipe: Recipe) -> ResourceStream<Recipe> {
        let recipes = self.recipes.clone();
        let layer = self.layer.clone();
        once("Failed to create recipe", async move {
            validate_recipe(&recipe)?;
            recipes.create(&recipe).await?;

            layer.store(&recipe_key(&recipe.id), &recipe).await;
            evict_recipe_listings(&layer, &recipe.author_id).await;

            tracing::debug!(recipe_id = %recipe.id, title = %recipe.title, "Recipe created");
            Ok(recipe)
        })
    }

    fn get_recipe(&self, recipe_id: &str) -> ResourceStream<Recipe> {
        let recipes = self.recipes.clone();
        let id = recipe_id.to_string();
        self.layer
            .fetch(recipe_key(recipe_id), async move { recipes.require(&id).await })
    }

    fn update_recipe(&self, mut recipe: Recipe) -> ResourceStream<Recipe> {
        let recipes = self.recipes.clone();
        let layer = self.layer.clone();
        once("Failed to update recipe", async move {
            validate_recipe(&recipe)?;
            recipe.updated_at = now();
            recipes.replace(&recipe).await?;

            layer.store(&recipe_key(&recipe.id), &recipe).await;
            evict_recipe_listings(&layer, &recipe.author_id).await;
            Ok(recipe)
        })
    }

    fn delete_recipe(&self, recipe_id: &str) -> ResourceStream<()> {
        let recipes = self.recipes.clone();
        let layer = self.layer.clone();
        let id = recipe_id.to_string();
        once("Failed to delete recipe", async move {
            let recipe = recipes.require(&id).await?;
            recipes.delete(&id).await?;

            layer.evict(&recipe_key(&id)).await;
            evict_recipe_listings(&layer, &recipe.author_id).await;

            tracing::debug!(recipe_id = %id, "Recipe deleted");
            Ok(())
        })
    }

    fn get_user_recipes(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Recipe>> {
        let recipes = self.recipes.clone();
        let query = Query::newest_first(limit, cursor)
            .filter(Filter::eq("author_id", user_id))
            .filter(listed());
        self.layer
            .fetch_page(&user_recipes_scope(user_id), limit, cursor, async move {
                recipes.list(&query).await
            })
    }

    fn like_recipe(&self, user_id: &str, recipe_id: &str) -> ResourceStream<()> {
        self.toggle(EdgeKind::Like, user_id, recipe_id, EdgeState::Present, "Failed to like recipe")
    }

    fn unlike_recipe(&self, user_id: &str, recipe_id: &str) -> ResourceStream<()> {
        self.toggle(EdgeKind::Like, user_id, recipe_id, EdgeState::Absent, "Failed to unlike recipe")
    }

    fn save_recipe(&self, user_id: &str, recipe_id: &str) -> ResourceStream<()> {
        self.toggle(EdgeKind::Save, user_id, recipe_id, EdgeState::Present, "Failed to save recipe")
    }

    fn unsave_recipe(&self, user_id: &str, recipe_id: &str) -> ResourceStream<()> {
        self.toggle(EdgeKind::Save, user_id, recipe_id, EdgeState::Absent, "Failed to unsave recipe")
    }

    fn is_recipe_saved(&self, user_id: &str, recipe_id: &str) -> ResourceStream<bool> {
        self.edges
            .exists(EdgeKind::Save, TargetKind::Recipe, user_id, recipe_id)
    }
}
