//! Integration tests for connection pagination and cursor round trips

#[cfg(test)]
mod pagination_tests {
    use junctiongraph::config::SchemaConfig;
    use junctiongraph::pg_catalog::Catalogue;
    use junctiongraph::schema::{FieldSpec, OrderSpec, Schema, SchemaBuilder};
    use junctiongraph::sql::{Alias, Cursor, Fragment, QueryBuilder, QueryError, ToSql};
    use junctiongraph::{FieldArgs, ManyToManyPlugin};
    use serde_json::json;

    fn schema(config: SchemaConfig) -> anyhow::Result<Schema> {
        let catalogue = Catalogue::from_yaml_file(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/blog_catalogue.yaml"
        ))?;
        Ok(SchemaBuilder::new(&catalogue)
            .config(config)
            .plugin(ManyToManyPlugin)
            .build()?)
    }

    fn post_tags(schema: &Schema) -> &FieldSpec {
        schema
            .object_type("Post")
            .and_then(|t| t.field("tagsByPostsTagPostIdAndTagId"))
            .expect("tags connection on Post")
    }

    fn posts_root() -> QueryBuilder {
        QueryBuilder::new(Fragment::identifier(&["public", "posts"]), Alias::new("p"))
    }

    /// Cursors produced by `shape` are accepted back as `after`
    #[test]
    fn test_shaped_cursor_feeds_next_page() -> anyhow::Result<()> {
        let schema = schema(SchemaConfig::default())?;
        let field = post_tags(&schema);

        let raw = json!({
            "data": [
                {"__cursor": ["primary_key_asc", [3]], "id": 3, "name": "db"},
                {"__cursor": ["primary_key_asc", [8]], "id": 8, "name": "rust"}
            ],
            "hasNextPage": true,
            "hasPreviousPage": false
        });
        let page = field.resolver.shape(raw);
        let end_cursor = page["endCursor"].as_str().expect("end cursor").to_string();
        assert_eq!(page["data"][1]["__cursor"], json!(end_cursor));

        let args = FieldArgs {
            first: Some(2),
            after: Some(end_cursor),
            ..Default::default()
        };
        let compiled = field.resolver.select(&posts_root(), &args)?.compile();
        assert!(compiled
            .text
            .contains("WHERE ((\"__m2m_right_1__\".\"id\" > $1::int4))"));
        assert_eq!(compiled.values, vec![json!(8)]);
        assert!(compiled.text.contains("'hasPreviousPage', true"));
        Ok(())
    }

    #[test]
    fn test_cursor_for_different_ordering_is_rejected() -> anyhow::Result<()> {
        let schema = schema(SchemaConfig::default())?;
        let field = post_tags(&schema);
        let cursor = Cursor::new(vec!["primary_key_asc".into()], vec![json!(8)]).encode();

        let args = FieldArgs {
            order_by: vec![OrderSpec::desc("name")],
            after: Some(cursor),
            ..Default::default()
        };
        let err = field.resolver.select(&posts_root(), &args).unwrap_err();
        assert!(matches!(err, QueryError::CursorOrderingMismatch { .. }));
        Ok(())
    }

    #[test]
    fn test_page_size_limit_from_config() -> anyhow::Result<()> {
        let schema = schema(SchemaConfig {
            max_page_size: 3,
            ..Default::default()
        })?;
        let field = post_tags(&schema);

        let unbounded = field
            .resolver
            .select(&posts_root(), &FieldArgs::default())?
            .to_sql();
        assert!(unbounded.contains("\nLIMIT 4"));
        assert!(unbounded.contains("count(*) > 3"));
        Ok(())
    }

    #[test]
    fn test_empty_page_shape() -> anyhow::Result<()> {
        let schema = schema(SchemaConfig::default())?;
        let field = post_tags(&schema);
        let page = field.resolver.shape(json!({
            "data": [],
            "hasNextPage": false,
            "hasPreviousPage": false
        }));
        assert_eq!(page["startCursor"], serde_json::Value::Null);
        assert_eq!(page["endCursor"], serde_json::Value::Null);
        Ok(())
    }
}
