//! Cached cookbook repository.

use std::sync::Arc;

use serde_json::{Map, Value};

use recipebox_core::cache::{cookbook_key, list_pattern, Cache};
use recipebox_core::repository::CookbookRepository;
use recipebox_core::resource::ResourceStream;
use recipebox_core::social::{
    now, validate_cookbook, CollaboratorRole, Cookbook, Edge, EdgeKind, Recipe, TargetKind,
};
use recipebox_core::storage::{DocumentStore, Filter, Query, Result};

use super::optimistic::{EdgeState, OptimisticEdges};
use super::read_through::ReadThrough;
use super::{field_value, once};
use crate::remote::{EdgeSource, EntitySource};

fn user_cookbooks_scope(user_id: &str) -> String {
    format!("user_cookbooks_{}", user_id)
}

fn collaborators_key(cookbook_id: &str) -> String {
    format!("collaborators_{}", cookbook_id)
}

/// Cookbook repository with read-through caching.
///
/// Collaborator and save toggles are optimistic; recipe membership changes
/// are plain writes that return the updated cookbook.
pub struct CachedCookbookRepository<S, C> {
    cookbooks: EntitySource<S, Cookbook>,
    recipes: EntitySource<S, Recipe>,
    edges: EdgeSource<S>,
    optimistic: OptimisticEdges<S, C>,
    layer: ReadThrough<C>,
}

impl<S, C> CachedCookbookRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>) -> Self {
        let edges = EdgeSource::new(Arc::clone(&store));
        Self {
            cookbooks: EntitySource::new(Arc::clone(&store)),
            recipes: EntitySource::new(store),
            optimistic: OptimisticEdges::new(edges.clone(), layer.clone()),
            edges,
            layer,
        }
    }

    /// Rewrites the recipe list of a cookbook with `change` applied.
    fn edit_recipes(
        &self,
        cookbook_id: &str,
        recipe_id: &str,
        fallback: &'static str,
        change: fn(&mut Vec<String>, &str) -> bool,
    ) -> ResourceStream<Cookbook> {
        let cookbooks = self.cookbooks.clone();
        let recipes = self.recipes.clone();
        let layer = self.layer.clone();
        let cookbook_id = cookbook_id.to_string();
        let recipe_id = recipe_id.to_string();
        once(fallback, async move {
            let mut cookbook = cookbooks.require(&cookbook_id).await?;
            recipes.require(&recipe_id).await?;

            if change(&mut cookbook.recipe_ids, &recipe_id) {
                cookbook.updated_at = now();
                let mut fields = Map::new();
                fields.insert("recipe_ids".to_string(), field_value(&cookbook.recipe_ids)?);
                fields.insert(
                    "updated_at".to_string(),
                    Value::from(cookbook.updated_at.timestamp_millis()),
                );
                cookbooks.update_fields(&cookbook_id, fields).await?;
                tracing::debug!(%cookbook_id, %recipe_id, "Cookbook recipes changed");
            }

            layer.store(&cookbook_key(&cookbook_id), &cookbook).await;
            Ok(cookbook)
        })
    }
}

fn insert_recipe(ids: &mut Vec<String>, recipe_id: &str) -> bool {
    if ids.iter().any(|id| id == recipe_id) {
        return false;
    }
    ids.push(recipe_id.to_string());
    true
}

fn drop_recipe(ids: &mut Vec<String>, recipe_id: &str) -> bool {
    let before = ids.len();
    ids.retain(|id| id != recipe_id);
    ids.len() != before
}

async fn all_collaborators<S: DocumentStore>(
    edges: &EdgeSource<S>,
    cookbook_id: &str,
) -> Result<Vec<Edge>> {
    edges
        .by_target(EdgeKind::Collaborator, TargetKind::Cookbook, cookbook_id, None, None)
        .await
}

impl<S, C> CookbookRepository for CachedCookbookRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn create_cookbook(&self, cookbook: Cookbook) -> ResourceStream<Cookbook> {
        let cookbooks = self.cookbooks.clone();
        let layer = self.layer.clone();
        once("Failed to create cookbook", async move {
            validate_cookbook(&cookbook)?;
            cookbooks.create(&cookbook).await?;

            layer.store(&cookbook_key(&cookbook.id), &cookbook).await;
            layer
                .evict_pattern(&list_pattern(&user_cookbooks_scope(&cookbook.owner_id)))
                .await;

            tracing::debug!(cookbook_id = %cookbook.id, title = %cookbook.title, "Cookbook created");
            Ok(cookbook)
        })
    }

    fn get_cookbook(&self, cookbook_id: &str) -> ResourceStream<Cookbook> {
        let cookbooks = self.cookbooks.clone();
        let id = cookbook_id.to_string();
        self.layer
            .fetch(cookbook_key(cookbook_id), async move { cookbooks.require(&id).await })
    }

    fn update_cookbook(&self, mut cookbook: Cookbook) -> ResourceStream<Cookbook> {
        let cookbooks = self.cookbooks.clone();
        let layer = self.layer.clone();
        once("Failed to update cookbook", async move {
            validate_cookbook(&cookbook)?;
            cookbook.updated_at = now();
            cookbooks.replace(&cookbook).await?;

            layer.store(&cookbook_key(&cookbook.id), &cookbook).await;
            layer
                .evict_pattern(&list_pattern(&user_cookbooks_scope(&cookbook.owner_id)))
                .await;
            Ok(cookbook)
        })
    }

    fn delete_cookbook(&self, cookbook_id: &str) -> ResourceStream<()> {
        let cookbooks = self.cookbooks.clone();
        let layer = self.layer.clone();
        let id = cookbook_id.to_string();
        once("Failed to delete cookbook", async move {
            let cookbook = cookbooks.require(&id).await?;
            cookbooks.delete(&id).await?;

            layer.evict(&cookbook_key(&id)).await;
            layer.evict(&collaborators_key(&id)).await;
            layer
                .evict_pattern(&list_pattern(&user_cookbooks_scope(&cookbook.owner_id)))
                .await;

            tracing::debug!(cookbook_id = %id, "Cookbook deleted");
            Ok(())
        })
    }

    fn get_user_cookbooks(
        &self,
        user_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> ResourceStream<Vec<Cookbook>> {
        let cookbooks = self.cookbooks.clone();
        let query = Query::newest_first(limit, cursor).filter(Filter::eq("owner_id", user_id));
        self.layer
            .fetch_page(&user_cookbooks_scope(user_id), limit, cursor, async move {
                cookbooks.list(&query).await
            })
    }

    fn add_recipe(&self, cookbook_id: &str, recipe_id: &str) -> ResourceStream<Cookbook> {
        self.edit_recipes(cookbook_id, recipe_id, "Failed to add recipe", insert_recipe)
    }

    fn remove_recipe(&self, cookbook_id: &str, recipe_id: &str) -> ResourceStream<Cookbook> {
        self.edit_recipes(cookbook_id, recipe_id, "Failed to remove recipe", drop_recipe)
    }

    fn add_collaborator(
        &self,
        cookbook_id: &str,
        user_id: &str,
        role: CollaboratorRole,
    ) -> ResourceStream<()> {
        let edge = Edge::new(EdgeKind::Collaborator, TargetKind::Cookbook, user_id, cookbook_id)
            .with_metadata(role.as_str());
        self.optimistic
            .apply(edge, EdgeState::Present, "Failed to add collaborator")
    }

    fn remove_collaborator(&self, cookbook_id: &str, user_id: &str) -> ResourceStream<()> {
        let edge = Edge::new(EdgeKind::Collaborator, TargetKind::Cookbook, user_id, cookbook_id);
        self.optimistic
            .apply(edge, EdgeState::Absent, "Failed to remove collaborator")
    }

    fn get_collaborators(&self, cookbook_id: &str) -> ResourceStream<Vec<Edge>> {
        let edges = self.edges.clone();
        let id = cookbook_id.to_string();
        self.layer.fetch(collaborators_key(cookbook_id), async move {
            all_collaborators(&edges, &id).await
        })
    }

    fn save_cookbook(&self, user_id: &str, cookbook_id: &str) -> ResourceStream<()> {
        let edge = Edge::new(EdgeKind::Save, TargetKind::Cookbook, user_id, cookbook_id);
        self.optimistic
            .apply(edge, EdgeState::Present, "Failed to save cookbook")
    }

    fn unsave_cookbook(&self, user_id: &str, cookbook_id: &str) -> ResourceStream<()> {
        let edge = Edge::new(EdgeKind::Save, TargetKind::Cookbook, user_id, cookbook_id);
        self.optimistic
            .apply(edge, EdgeState::Absent, "Failed to unsave cookbook")
    }
}
