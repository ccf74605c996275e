//! Recipes referenced from posts.

use std::sync::Arc;

use recipebox_core::cache::Cache;
use recipebox_core::repository::ReferenceRepository;
use recipebox_core::resource::ResourceStream;
use recipebox_core::social::{Edge, EdgeKind, Post, Recipe, TargetKind};
use recipebox_core::storage::{DocumentStore, Result};

use super::once;
use super::read_through::ReadThrough;
use crate::remote::{EdgeSource, EntitySource};

fn post_recipes_key(post_id: &str) -> String {
    format!("post_recipes_{}", post_id)
}

/// Links between posts and the recipes they mention.
///
/// A reference is a `RecipeReference` edge whose actor is the post.
pub struct CachedReferenceRepository<S, C> {
    edges: EdgeSource<S>,
    posts: EntitySource<S, Post>,
    recipes: EntitySource<S, Recipe>,
    layer: ReadThrough<C>,
}

impl<S, C> CachedReferenceRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    pub fn new(store: Arc<S>, layer: ReadThrough<C>) -> Self {
        Self {
            edges: EdgeSource::new(Arc::clone(&store)),
            posts: EntitySource::new(Arc::clone(&store)),
            recipes: EntitySource::new(store),
            layer,
        }
    }
}

async fn referenced_recipes<S: DocumentStore>(
    edges: &EdgeSource<S>,
    recipes: &EntitySource<S, Recipe>,
    post_id: &str,
) -> Result<Vec<Recipe>> {
    let references = edges
        .by_actor(EdgeKind::RecipeReference, TargetKind::Recipe, post_id, None, None)
        .await?;

    let mut found = Vec::with_capacity(references.len());
    for reference in references {
        // Deleted or moderated recipes drop out of the post silently.
        match recipes.get(&reference.target_id).await? {
            Some(recipe) if recipe.moderation.is_listed() => found.push(recipe),
            _ => {}
        }
    }
    Ok(found)
}

impl<S, C> ReferenceRepository for CachedReferenceRepository<S, C>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
{
    fn attach_recipe(&self, post_id: &str, recipe_id: &str) -> ResourceStream<()> {
        let edges = self.edges.clone();
        let posts = self.posts.clone();
        let recipes = self.recipes.clone();
        let layer = self.layer.clone();
        let edge = Edge::new(EdgeKind::RecipeReference, TargetKind::Recipe, post_id, recipe_id);
        once("Failed to attach recipe", async move {
            posts.require(&edge.actor_id).await?;
            recipes.require(&edge.target_id).await?;
            edges.create(&edge).await?;
            layer.evict(&post_recipes_key(&edge.actor_id)).await;
            Ok(())
        })
    }

    fn detach_recipe(&self, post_id: &str, recipe_id: &str) -> ResourceStream<()> {
        let edges = self.edges.clone();
        let layer = self.layer.clone();
        let post_id = post_id.to_string();
        let recipe_id = recipe_id.to_string();
        once("Failed to detach recipe", async move {
            edges
                .remove(EdgeKind::RecipeReference, TargetKind::Recipe, &post_id, &recipe_id)
                .await?;
            layer.evict(&post_recipes_key(&post_id)).await;
            Ok(())
        })
    }

    fn get_post_recipes(&self, post_id: &str) -> ResourceStream<Vec<Recipe>> {
        let edges = self.edges.clone();
        let recipes = self.recipes.clone();
        let id = post_id.to_string();
        self.layer.fetch(post_recipes_key(post_id), async move {
            referenced_recipes(&edges, &recipes, &id).await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::storage::InMemoryDocumentStore;
    use crate::testing::{collect, CountingCache};
    use recipebox_core::resource::Resource;
    use recipebox_core::social::ModerationStatus;

    async fn setup() -> (
        Arc<InMemoryDocumentStore>,
        CachedReferenceRepository<InMemoryDocumentStore, CountingCache>,
    ) {
        let store = Arc::new(InMemoryDocumentStore::new());
        EntitySource::<_, Post>::new(Arc::clone(&store))
            .create(&Post::new("u1", "Tonight's dinner").with_id("p1"))
            .await
            .unwrap();
        let recipes = EntitySource::<_, Recipe>::new(Arc::clone(&store));
        recipes.create(&Recipe::new("u1", "Risotto").with_id("r1")).await.unwrap();
        recipes.create(&Recipe::new("u1", "Salad").with_id("r2")).await.unwrap();
        let layer = ReadThrough::new(Arc::new(CountingCache::new()), Duration::from_secs(60));
        (Arc::clone(&store), CachedReferenceRepository::new(store, layer))
    }

    fn titles(items: &[Resource<Vec<Recipe>>]) -> Vec<String> {
        items
            .last()
            .and_then(Resource::value)
            .map(|recipes| recipes.iter().map(|r| r.title.clone()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_attach_and_list() {
        let (_, repo) = setup().await;

        let items = collect(repo.attach_recipe("p1", "r1")).await;
        assert_eq!(items, vec![Resource::Loading, Resource::Success(())]);
        collect(repo.attach_recipe("p1", "r2")).await;

        let mut listed = titles(&collect(repo.get_post_recipes("p1")).await);
        listed.sort();
        assert_eq!(listed, vec!["Risotto", "Salad"]);
    }

    #[tokio::test]
    async fn test_attach_unknown_recipe() {
        let (_, repo) = setup().await;

        let items = collect(repo.attach_recipe("p1", "r404")).await;

        assert_eq!(
            items,
            vec![Resource::Loading, Resource::failure("Recipe not found: r404")]
        );
    }

    #[tokio::test]
    async fn test_detach_refreshes_listing() {
        let (_, repo) = setup().await;
        collect(repo.attach_recipe("p1", "r1")).await;
        collect(repo.get_post_recipes("p1")).await;

        collect(repo.detach_recipe("p1", "r1")).await;

        let items = collect(repo.get_post_recipes("p1")).await;
        assert_eq!(items, vec![Resource::Loading, Resource::Success(Vec::new())]);
    }

    #[tokio::test]
    async fn test_hidden_recipes_are_skipped() {
        let (store, repo) = setup().await;
        collect(repo.attach_recipe("p1", "r1")).await;
        collect(repo.attach_recipe("p1", "r2")).await;
        let recipes = EntitySource::<_, Recipe>::new(store);
        let mut hidden = recipes.require("r2").await.unwrap();
        hidden.moderation = ModerationStatus::Removed;
        recipes.replace(&hidden).await.unwrap();

        let listed = titles(&collect(repo.get_post_recipes("p1")).await);

        assert_eq!(listed, vec!["Risotto"]);
    }
}
