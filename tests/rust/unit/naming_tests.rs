//! Unit tests for the default inflector and custom naming strategies

#[cfg(test)]
mod naming_tests {
    use junctiongraph::pg_catalog::{Attribute, Catalogue, Table};
    use junctiongraph::relation_inference::RelationDescriptor;
    use junctiongraph::schema::SchemaBuilder;
    use junctiongraph::utils::{pluralize, singularize, DefaultInflector, NamingStrategy};
    use junctiongraph::ManyToManyPlugin;
    use test_case::test_case;

    #[test_case("people_groups", "people_group")]
    #[test_case("companies", "company")]
    #[test_case("watches", "watch")]
    fn test_singularize_last_word(input: &str, expected: &str) {
        assert_eq!(singularize(input), expected);
    }

    #[test_case("company", "companies")]
    #[test_case("key", "keys")]
    #[test_case("church", "churches")]
    fn test_pluralize_last_word(input: &str, expected: &str) {
        assert_eq!(pluralize(input), expected);
    }

    /// Snake-case field names, everything else delegated to the default
    struct SnakeCase;

    impl NamingStrategy for SnakeCase {
        fn table_type_name(&self, table: &Table) -> String {
            DefaultInflector.table_type_name(table)
        }
        fn connection_type_name(&self, type_name: &str) -> String {
            DefaultInflector.connection_type_name(type_name)
        }
        fn order_by_type_name(&self, type_name: &str) -> String {
            DefaultInflector.order_by_type_name(type_name)
        }
        fn column_name(&self, attr: &Attribute) -> String {
            attr.name.clone()
        }
        fn relation_field_name(&self, relation: &RelationDescriptor) -> String {
            format!("{}_via_{}", relation.right_table().name, relation.junction_table().name)
        }
        fn relation_field_name_simple(&self, relation: &RelationDescriptor) -> String {
            format!("{}_list", self.relation_field_name(relation))
        }
        fn condition_type_name(&self, relation_field_name: &str) -> String {
            format!("{}_condition", relation_field_name)
        }
    }

    #[test]
    fn test_custom_naming_strategy_is_used_everywhere() {
        let catalogue = Catalogue::from_yaml_file(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/blog_catalogue.yaml"
        ))
        .unwrap();
        let schema = SchemaBuilder::new(&catalogue)
            .naming(SnakeCase)
            .plugin(ManyToManyPlugin)
            .build()
            .unwrap();

        let post = schema.object_type("Post").unwrap();
        assert!(post.field("tags_via_posts_tags").is_some());
        let condition = schema.input_type("tags_via_posts_tags_condition").unwrap();
        assert!(condition.field("created_at").is_some());
    }
}
