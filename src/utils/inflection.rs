//! Naming of generated schema elements.
//!
//! All names produced for many-to-many fields and their condition types go
//! through a [`NamingStrategy`], so hosts can swap the conventions without
//! touching the field builders. [`DefaultInflector`] implements the usual
//! convention:
//!
//! ```text
//! posts <- posts_tags(post_id, tag_id) -> tags
//!
//! connection field   tagsByPostsTagPostIdAndTagId
//! simple field       tagsByPostsTagPostIdAndTagIdList
//! condition type     TagsByPostsTagPostIdAndTagIdCondition
//! ```

use crate::pg_catalog::{Attribute, Table};
use crate::relation_inference::RelationDescriptor;

pub trait NamingStrategy: Send + Sync {
    /// Output type name of a table, e.g. `posts` -> `Post`
    fn table_type_name(&self, table: &Table) -> String;

    /// Connection type for an output type, e.g. `Tag` -> `TagsConnection`
    fn connection_type_name(&self, type_name: &str) -> String;

    /// Ordering enum for an output type, e.g. `Tag` -> `TagsOrderBy`
    fn order_by_type_name(&self, type_name: &str) -> String;

    /// Schema name of a column, e.g. `created_at` -> `createdAt`
    fn column_name(&self, attr: &Attribute) -> String;

    fn relation_field_name(&self, relation: &RelationDescriptor) -> String;

    fn relation_field_name_simple(&self, relation: &RelationDescriptor) -> String;

    /// Condition input type for a relation field name
    fn condition_type_name(&self, relation_field_name: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInflector;

impl DefaultInflector {
    fn relation_stem(&self, relation: &RelationDescriptor) -> String {
        let keys: Vec<String> = relation
            .junction_left_key_attributes()
            .iter()
            .chain(relation.junction_right_key_attributes())
            .map(|attr| self.column_name(attr))
            .collect();
        format!(
            "{}-by-{}-{}",
            pluralize(&singularize(&relation.right_table().name)),
            singularize(&relation.junction_table().name),
            keys.join("-and-")
        )
    }
}

impl NamingStrategy for DefaultInflector {
    fn table_type_name(&self, table: &Table) -> String {
        upper_camel_case(&singularize(&table.name))
    }

    fn connection_type_name(&self, type_name: &str) -> String {
        upper_camel_case(&format!("{}-connection", pluralize(type_name)))
    }

    fn order_by_type_name(&self, type_name: &str) -> String {
        upper_camel_case(&format!("{}-order-by", pluralize(type_name)))
    }

    fn column_name(&self, attr: &Attribute) -> String {
        lower_camel_case(&attr.name)
    }

    fn relation_field_name(&self, relation: &RelationDescriptor) -> String {
        if let Some(name) = relation.junction_right_constraint().tags.many_to_many_field_name() {
            return name.to_string();
        }
        lower_camel_case(&self.relation_stem(relation))
    }

    fn relation_field_name_simple(&self, relation: &RelationDescriptor) -> String {
        if let Some(name) = relation
            .junction_right_constraint()
            .tags
            .many_to_many_simple_field_name()
        {
            return name.to_string();
        }
        lower_camel_case(&format!("{}-list", self.relation_stem(relation)))
    }

    fn condition_type_name(&self, relation_field_name: &str) -> String {
        upper_camel_case(&format!("{}-condition", relation_field_name))
    }
}

/// Join `_`/`-` separated words into camel case. Letters inside a word keep
/// their case, so already camel-cased words pass through.
fn camel_case(s: &str, upper_first: bool) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = upper_first;

    for c in s.chars() {
        if c == '_' || c == '-' {
            capitalize_next = upper_first || !result.is_empty();
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else if result.is_empty() {
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

pub fn lower_camel_case(s: &str) -> String {
    camel_case(s, false)
}

pub fn upper_camel_case(s: &str) -> String {
    camel_case(s, true)
}

/// Split `word` into everything before its last `_`-separated segment and
/// the segment itself, so only the final word is inflected.
fn split_last_word(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    }
}

pub fn singularize(word: &str) -> String {
    let (head, last) = split_last_word(word);
    let lower = last.to_ascii_lowercase();
    let singular = if lower.len() > 3 && lower.ends_with("ies") {
        format!("{}y", &last[..last.len() - 3])
    } else if ["sses", "shes", "ches", "xes", "zes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        last[..last.len() - 2].to_string()
    } else if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        last.to_string()
    } else if lower.len() > 1 && lower.ends_with('s') {
        last[..last.len() - 1].to_string()
    } else {
        last.to_string()
    };
    format!("{}{}", head, singular)
}

pub fn pluralize(word: &str) -> String {
    let (head, last) = split_last_word(word);
    let lower = last.to_ascii_lowercase();
    let ends_with_consonant_y = lower.len() > 1
        && lower.ends_with('y')
        && !matches!(lower.as_bytes()[lower.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u');
    let plural = if ends_with_consonant_y {
        format!("{}ies", &last[..last.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        format!("{}es", last)
    } else {
        format!("{}s", last)
    };
    format!("{}{}", head, plural)
}
