//! Catalogue fixtures shared by unit tests.

use super::introspection::{Attribute, Catalogue, Constraint, Table};

pub const POSTS: u32 = 1;
pub const TAGS: u32 = 2;
pub const POSTS_TAGS: u32 = 3;

pub fn posts_table() -> Table {
    Table::new(
        POSTS,
        "public",
        "posts",
        vec![
            Attribute::new(1, "id", "int4"),
            Attribute::new(2, "title", "text"),
        ],
    )
}

pub fn tags_table() -> Table {
    Table::new(
        TAGS,
        "public",
        "tags",
        vec![
            Attribute::new(1, "id", "int4"),
            Attribute::new(2, "name", "text"),
        ],
    )
}

pub fn posts_tags_table() -> Table {
    Table::new(
        POSTS_TAGS,
        "public",
        "posts_tags",
        vec![
            Attribute::new(1, "post_id", "int4"),
            Attribute::new(2, "tag_id", "int4"),
            Attribute::new(3, "created_at", "timestamptz"),
            Attribute::new(4, "weight", "int4"),
        ],
    )
}

/// The junction table's foreign keys plus primary keys on both ends.
pub fn blog_constraints() -> Vec<Constraint> {
    vec![
        Constraint::primary(100, "posts_pkey", POSTS, vec![1]),
        Constraint::primary(101, "tags_pkey", TAGS, vec![1]),
        Constraint::foreign(102, "posts_tags_post_id_fkey", POSTS_TAGS, vec![1], POSTS, vec![1]),
        Constraint::foreign(103, "posts_tags_tag_id_fkey", POSTS_TAGS, vec![2], TAGS, vec![1]),
    ]
}

/// posts <- posts_tags -> tags, no uniqueness on the junction columns
pub fn blog_catalogue() -> Catalogue {
    blog_catalogue_with(blog_constraints())
}

pub fn blog_catalogue_with(constraints: Vec<Constraint>) -> Catalogue {
    Catalogue::new(vec![posts_table(), tags_table(), posts_tags_table()], constraints)
        .expect("fixture catalogue is consistent")
}
