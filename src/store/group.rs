//! Grouping of items by originating post.

use std::collections::HashMap;

use crate::store::item::ContentItem;

/// Items of one post, as indices into the loaded sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostGroup {
    pub post_id: Option<String>,
    pub members: Vec<usize>,
}

/// Stable partition of `items` by post identifier.
///
/// Groups appear in first-seen order and keep the original item order.
/// Items without a post identifier each form their own group.
pub fn group_by_post(items: &[ContentItem]) -> Vec<PostGroup> {
    let mut groups: Vec<PostGroup> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();

    for (idx, item) in items.iter().enumerate() {
        match item.post_id.as_deref() {
            Some(post_id) => {
                if let Some(&group_idx) = index_of.get(post_id) {
                    groups[group_idx].members.push(idx);
                } else {
                    index_of.insert(post_id, groups.len());
                    groups.push(PostGroup {
                        post_id: Some(post_id.to_string()),
                        members: vec![idx],
                    });
                }
            }
            None => {
                tracing::warn!("Item {} has no post id, relaying on its own", item.file_name);
                groups.push(PostGroup {
                    post_id: None,
                    members: vec![idx],
                });
            }
        }
    }

    groups
}
