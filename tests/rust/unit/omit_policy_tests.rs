//! Unit tests for permission predicates plugged into schema builds

#[cfg(test)]
mod omit_policy_tests {
    use junctiongraph::pg_catalog::{Action, Catalogue, Entity};
    use junctiongraph::schema::SchemaBuilder;
    use junctiongraph::ManyToManyPlugin;

    fn fixture() -> Catalogue {
        Catalogue::from_yaml_file(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/blog_catalogue.yaml"
        ))
        .unwrap()
    }

    /// Hiding a junction key column removes the relation without failing the build
    #[test]
    fn test_unreadable_junction_key_drops_relation() {
        let catalogue = fixture();
        let policy = |entity: Entity<'_>, action: Action| {
            action == Action::Read && matches!(entity, Entity::Attribute(a) if a.name == "tag_id")
        };
        let schema = SchemaBuilder::new(&catalogue)
            .omit_policy(policy)
            .plugin(ManyToManyPlugin)
            .build()
            .unwrap();

        assert!(schema.object_type("Post").unwrap().fields.is_empty());
        assert!(schema.object_type("Tag").unwrap().fields.is_empty());
        assert!(!schema.object_type("User").unwrap().fields.is_empty());
    }

    #[test]
    fn test_filter_only_omission_keeps_field_but_not_condition() {
        let catalogue = fixture();
        let policy = |entity: Entity<'_>, action: Action| {
            action == Action::Filter
                && matches!(entity, Entity::Attribute(a) if a.name == "created_at" || a.name == "weight")
        };
        let schema = SchemaBuilder::new(&catalogue)
            .omit_policy(policy)
            .plugin(ManyToManyPlugin)
            .build()
            .unwrap();

        let field = schema
            .object_type("Post")
            .unwrap()
            .field("tagsByPostsTagPostIdAndTagId")
            .unwrap();
        assert!(field.arg("condition").is_none());
        assert!(schema
            .input_type("TagsByPostsTagPostIdAndTagIdCondition")
            .is_none());
    }

    #[test]
    fn test_entity_descriptions() {
        let catalogue = fixture();
        let posts = catalogue.table_by_name("public", "posts").unwrap();
        assert_eq!(Entity::Table(posts).to_string(), "table \"public\".\"posts\"");
        assert_eq!(
            Entity::Attribute(&posts.attributes[1]).to_string(),
            "column \"title\" (#2)"
        );
    }
}
