use super::Post;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        PoisonError, RwLock,
    },
};

/// In-memory post storage.
///
/// Ids come from a counter starting at 1 and are never reused.
#[derive(Debug, Default)]
pub struct PostRepository {
    posts: RwLock<HashMap<u64, Post>>,
    next_id: AtomicU64,
}

impl PostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All posts, ordered by id.
    pub fn list(&self) -> Vec<Post> {
        let posts = self.posts.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by_key(|post| post.id);
        all
    }

    pub fn get(&self, id: u64) -> Option<Post> {
        self.posts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Store `post` under a new id and return it.
    pub fn create(&self, mut post: Post) -> Post {
        post.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.posts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(post.id, post.clone());
        post
    }

    /// Replace the post stored under `id`. Returns `None` if there is none.
    pub fn replace(&self, id: u64, mut post: Post) -> Option<Post> {
        let mut posts = self.posts.write().unwrap_or_else(PoisonError::into_inner);
        let slot = posts.get_mut(&id)?;
        post.id = id;
        *slot = post.clone();
        Some(post)
    }

    pub fn delete(&self, id: u64) -> Option<Post> {
        self.posts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }
}
