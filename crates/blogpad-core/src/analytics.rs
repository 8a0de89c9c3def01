//! Data behind the analytics view: per-author counts and table paging.

use serde::Serialize;

use crate::models::Post;

/// Number of posts written by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub name: String,
    pub posts: usize,
}

/// Count posts per author in order of first appearance.
///
/// Blank authors are grouped under "Unknown".
pub fn posts_per_author(posts: &[Post]) -> Vec<AuthorCount> {
    let mut counts: Vec<AuthorCount> = Vec::new();
    for post in posts {
        let name = match post.author.trim() {
            "" => "Unknown",
            author => author,
        };
        match counts.iter_mut().find(|count| count.name == name) {
            Some(count) => count.posts += 1,
            None => counts.push(AuthorCount {
                name: name.to_string(),
                posts: 1,
            }),
        }
    }
    counts
}

/// One page of a longer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number, clamped into range
    pub number: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// Slice `items` into pages of `per_page` and return page `page` (1-based).
///
/// Out-of-range pages clamp to the first or last page; an empty list has a
/// single empty page.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);
    let number = page.clamp(1, total_pages);
    let start = ((number - 1) * per_page).min(items.len());
    let end = (start + per_page).min(items.len());

    Page {
        items: items.get(start..end).unwrap_or_default(),
        number,
        total_pages,
    }
}
