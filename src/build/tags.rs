//! Grouping posts by tag.

use std::collections::{HashMap, HashSet};

use super::post::Post;
use crate::util::tag_slug;

/// All posts carrying one tag, in the order they were indexed.
#[derive(Debug, Clone)]
pub struct TagBucket<'a> {
    pub name: String,
    pub posts: Vec<&'a Post>,
}

impl TagBucket<'_> {
    pub fn slug(&self) -> String {
        tag_slug(&self.name)
    }
}

/// Tag name to posts. Buckets keep first-seen order across the input.
#[derive(Debug, Default)]
pub struct TagIndex<'a> {
    buckets: Vec<TagBucket<'a>>,
    positions: HashMap<String, usize>,
}

impl<'a> TagIndex<'a> {
    /// Index `posts`. Feed sorted posts and every bucket comes out sorted
    /// the same way. A tag repeated on one post counts once.
    pub fn build(posts: &'a [Post]) -> Self {
        let mut index = TagIndex::default();
        for post in posts {
            let mut seen = HashSet::new();
            for tag in &post.tags {
                if seen.insert(tag.as_str()) {
                    index.push(tag, post);
                }
            }
        }
        index
    }

    fn push(&mut self, tag: &str, post: &'a Post) {
        match self.positions.get(tag) {
            Some(&position) => self.buckets[position].posts.push(post),
            None => {
                self.positions.insert(tag.to_string(), self.buckets.len());
                self.buckets.push(TagBucket {
                    name: tag.to_string(),
                    posts: vec![post],
                });
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, tag: &str) -> Option<&TagBucket<'a>> {
        self.positions.get(tag).map(|&position| &self.buckets[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagBucket<'a>> {
        self.buckets.iter()
    }

    #[cfg(test)]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::post::tests::post;

    #[test]
    fn test_repeated_tag_counts_once() {
        let posts = vec![post("P", "01.01.2024", &["a", "a", "b"])];
        let index = TagIndex::build(&posts);
        assert_eq!(index.get("a").unwrap().posts.len(), 1);
        assert_eq!(index.get("b").unwrap().posts.len(), 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_buckets_follow_input_order() {
        let posts = vec![
            post("Newest", "03.01.2024", &["web"]),
            post("Middle", "02.01.2024", &["rust", "web"]),
            post("Oldest", "01.01.2024", &["rust"]),
        ];
        let index = TagIndex::build(&posts);

        assert_eq!(index.names().collect::<Vec<_>>(), vec!["web", "rust"]);
        let web: Vec<_> = index.get("web").unwrap().posts.iter().map(|p| &p.title).collect();
        assert_eq!(web, vec!["Newest", "Middle"]);
        let rust: Vec<_> = index.get("rust").unwrap().posts.iter().map(|p| &p.title).collect();
        assert_eq!(rust, vec!["Middle", "Oldest"]);
    }

    #[test]
    fn test_slug_and_empty_index() {
        let posts = vec![post("P", "01.01.2024", &["open source"])];
        let index = TagIndex::build(&posts);
        assert_eq!(index.iter().next().unwrap().slug(), "open-source");

        let none: Vec<Post> = Vec::new();
        assert!(TagIndex::build(&none).is_empty());
    }
}
