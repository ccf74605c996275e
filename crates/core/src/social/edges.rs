use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::now;

/// Collection names in the remote store.
pub mod collections {
    pub const USERS: &str = "users";
    pub const POSTS: &str = "posts";
    pub const COMMENTS: &str = "comments";
    pub const RECIPES: &str = "recipes";
    pub const COOKBOOKS: &str = "cookbooks";
}

/// The relationship an [`Edge`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Like,
    Share,
    Save,
    Follow,
    Collaborator,
    RecipeReference,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Like => "like",
            EdgeKind::Share => "share",
            EdgeKind::Save => "save",
            EdgeKind::Follow => "follow",
            EdgeKind::Collaborator => "collaborator",
            EdgeKind::RecipeReference => "recipe_reference",
        }
    }

    /// Remote collection holding edges of this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            EdgeKind::Like => "likes",
            EdgeKind::Share => "shares",
            EdgeKind::Save => "saves",
            EdgeKind::Follow => "follows",
            EdgeKind::Collaborator => "collaborators",
            EdgeKind::RecipeReference => "recipe_references",
        }
    }

    /// Counter on the target maintained alongside edges of this kind.
    pub fn target_counter(&self) -> Option<&'static str> {
        match self {
            EdgeKind::Like => Some("like_count"),
            EdgeKind::Share => Some("share_count"),
            EdgeKind::Save => Some("save_count"),
            EdgeKind::Follow => Some("follower_count"),
            EdgeKind::Collaborator => Some("collaborator_count"),
            EdgeKind::RecipeReference => None,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity family an edge points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Post,
    Comment,
    Recipe,
    Cookbook,
    User,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Post => "post",
            TargetKind::Comment => "comment",
            TargetKind::Recipe => "recipe",
            TargetKind::Cookbook => "cookbook",
            TargetKind::User => "user",
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            TargetKind::Post => collections::POSTS,
            TargetKind::Comment => collections::COMMENTS,
            TargetKind::Recipe => collections::RECIPES,
            TargetKind::Cookbook => collections::COOKBOOKS,
            TargetKind::User => collections::USERS,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeType {
    #[default]
    Like,
    Love,
    Yum,
}

impl LikeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeType::Like => "like",
            LikeType::Love => "love",
            LikeType::Yum => "yum",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorRole {
    #[default]
    Editor,
    Viewer,
}

impl CollaboratorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorRole::Editor => "editor",
            CollaboratorRole::Viewer => "viewer",
        }
    }
}

/// A numeric field adjusted when an edge is created or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRef {
    pub collection: &'static str,
    pub id: String,
    pub field: &'static str,
}

/// A relationship between an actor and a target.
///
/// The existence of the edge *is* the relationship: liking creates a `Like`
/// edge, unliking deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub target_kind: TargetKind,
    pub actor_id: String,
    pub target_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Extra data such as the like type or collaborator role.
    pub metadata: Option<String>,
}

impl Edge {
    pub fn new(
        kind: EdgeKind,
        target_kind: TargetKind,
        actor_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            target_kind,
            actor_id: actor_id.into(),
            target_id: target_id.into(),
            created_at: now(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Document id of this edge within its kind's collection.
    pub fn document_id(&self) -> String {
        edge_document_id(&self.actor_id, self.target_kind, &self.target_id)
    }

    /// Counters to adjust when this edge is created (+1) or removed (-1).
    ///
    /// # Examples
    ///
    /// ```
    /// use recipebox_core::social::{Edge, EdgeKind, TargetKind};
    ///
    /// let follow = Edge::new(EdgeKind::Follow, TargetKind::User, "alice", "bob");
    /// let fields: Vec<_> = follow.counters().into_iter().map(|c| (c.id, c.field)).collect();
    /// assert_eq!(
    ///     fields,
    ///     vec![
    ///         ("bob".to_string(), "follower_count"),
    ///         ("alice".to_string(), "following_count"),
    ///     ]
    /// );
    /// ```
    pub fn counters(&self) -> Vec<CounterRef> {
        let mut counters = Vec::new();
        if let Some(field) = self.kind.target_counter() {
            counters.push(CounterRef {
                collection: self.target_kind.collection(),
                id: self.target_id.clone(),
                field,
            });
        }
        if self.kind == EdgeKind::Follow {
            counters.push(CounterRef {
                collection: collections::USERS,
                id: self.actor_id.clone(),
                field: "following_count",
            });
        }
        counters
    }
}

/// Document id of the edge between an actor and a target.
///
/// Edges of one kind can point at different entity families, so the target
/// kind is part of the id.
pub fn edge_document_id(actor_id: &str, target_kind: TargetKind, target_id: &str) -> String {
    format!("{}_{}_{}", actor_id, target_kind, target_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_counts_on_target() {
        let edge = Edge::new(EdgeKind::Like, TargetKind::Comment, "u1", "c1");
        assert_eq!(
            edge.counters(),
            vec![CounterRef {
                collection: "comments",
                id: "c1".to_string(),
                field: "like_count",
            }]
        );
    }

    #[test]
    fn test_recipe_reference_has_no_counter() {
        let edge = Edge::new(EdgeKind::RecipeReference, TargetKind::Recipe, "p1", "r1");
        assert!(edge.counters().is_empty());
    }

    #[test]
    fn test_document_id() {
        let edge = Edge::new(EdgeKind::Save, TargetKind::Post, "u1", "p1");
        assert_eq!(edge.document_id(), "u1_post_p1");
        assert_eq!(edge.kind.collection(), "saves");
    }

    #[test]
    fn test_same_ids_different_target_kinds() {
        let post_save = Edge::new(EdgeKind::Save, TargetKind::Post, "u1", "x1");
        let recipe_save = Edge::new(EdgeKind::Save, TargetKind::Recipe, "u1", "x1");
        assert_ne!(post_save.document_id(), recipe_save.document_id());
    }

    #[test]
    fn test_target_kind_display_matches_serde() {
        for kind in [
            TargetKind::Post,
            TargetKind::Comment,
            TargetKind::Recipe,
            TargetKind::Cookbook,
            TargetKind::User,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_kind_display_matches_serde() {
        let json = serde_json::to_string(&EdgeKind::RecipeReference).unwrap();
        assert_eq!(json, format!("\"{}\"", EdgeKind::RecipeReference));
    }
}
