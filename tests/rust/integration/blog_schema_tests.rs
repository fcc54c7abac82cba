//! Integration tests for schema generation over the blog fixture

#[cfg(test)]
mod blog_schema_tests {
    use std::io::Write;

    use junctiongraph::config::{SchemaConfig, SimpleCollections};
    use junctiongraph::pg_catalog::Catalogue;
    use junctiongraph::schema::SchemaBuilder;
    use junctiongraph::sql::{Alias, Fragment, QueryBuilder, ToSql};
    use junctiongraph::{FieldArgs, ManyToManyPlugin};
    use serde_json::json;

    fn fixture() -> anyhow::Result<Catalogue> {
        Ok(Catalogue::from_yaml_file(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/blog_catalogue.yaml"
        ))?)
    }

    fn root(table: &str) -> QueryBuilder {
        QueryBuilder::new(Fragment::identifier(&["public", table]), Alias::new("__local_0__"))
    }

    /// Post gets a `tags` connection filterable by createdAt and weight only
    #[test]
    fn test_post_tags_connection_with_condition() -> anyhow::Result<()> {
        let catalogue = fixture()?;
        let schema = SchemaBuilder::new(&catalogue)
            .plugin(ManyToManyPlugin)
            .build()?;

        let post = schema.object_type("Post").expect("Post type");
        let field = post
            .field("tagsByPostsTagPostIdAndTagId")
            .expect("many-to-many field on Post");
        assert_eq!(field.ty.to_string(), "TagsConnection!");

        let condition = schema
            .input_type("TagsByPostsTagPostIdAndTagIdCondition")
            .expect("condition type");
        let names: Vec<&str> = condition.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["createdAt", "weight"]);

        let args = FieldArgs::from_json(json!({
            "condition": {"createdAt": "2024-01-01T00:00:00Z", "weight": null},
            "first": 2
        }))?;
        let compiled = field.resolver.select(&root("posts"), &args)?.compile();
        assert!(compiled.text.contains(
            "\nWHERE (\"__m2m_junction_2__\".\"created_at\" = $1::timestamptz) AND (\"__m2m_junction_2__\".\"weight\" IS NULL)"
        ));
        assert_eq!(compiled.values, vec![json!("2024-01-01T00:00:00Z")]);

        let bad = FieldArgs::from_json(json!({"condition": {"postId": 1}}))?;
        assert!(field.resolver.select(&root("posts"), &bad).is_err());
        Ok(())
    }

    #[test]
    fn test_tags_reach_posts_through_same_junction() -> anyhow::Result<()> {
        let catalogue = fixture()?;
        let schema = SchemaBuilder::new(&catalogue)
            .plugin(ManyToManyPlugin)
            .build()?;

        let tag = schema.object_type("Tag").expect("Tag type");
        let field = tag
            .field("postsByPostsTagTagIdAndPostId")
            .expect("reverse field");
        let sql = field
            .resolver
            .select(&root("tags"), &FieldArgs::default())?
            .to_sql();
        assert!(sql.contains(
            "INNER JOIN \"public\".\"posts_tags\" AS \"__m2m_junction_2__\" ON (\"__m2m_right_1__\".\"id\" = \"__m2m_junction_2__\".\"post_id\")"
        ));
        assert!(sql.contains("= \"__local_0__\".\"id\")"));
        Ok(())
    }

    /// memberships: the right constraint renames the field and the teams
    /// table asks for simple collections too
    #[test]
    fn test_tags_drive_names_and_cardinality() -> anyhow::Result<()> {
        let catalogue = fixture()?;
        let schema = SchemaBuilder::new(&catalogue)
            .plugin(ManyToManyPlugin)
            .build()?;

        let user = schema.object_type("User").expect("User type");
        let names: Vec<&str> = user.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["teams", "teamsByMembershipUserIdAndTeamIdList"]);
        assert_eq!(user.fields[1].ty.to_string(), "[Team!]!");

        // role is omitted for filtering
        let condition = schema.input_type("TeamsCondition").expect("condition type");
        let names: Vec<&str> = condition.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["joinedOn"]);

        let team = schema.object_type("Team").expect("Team type");
        let names: Vec<&str> = team.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["usersByMembershipTeamIdAndUserId"]);
        Ok(())
    }

    #[test]
    fn test_omitted_columns_are_not_selected() -> anyhow::Result<()> {
        let catalogue = fixture()?;
        let schema = SchemaBuilder::new(&catalogue)
            .plugin(ManyToManyPlugin)
            .build()?;

        let field = schema
            .object_type("Team")
            .and_then(|t| t.field("usersByMembershipTeamIdAndUserId"))
            .expect("users field");
        let sql = field
            .resolver
            .select(&root("teams"), &FieldArgs::default())?
            .to_sql();
        assert!(sql.contains("'username'"));
        assert!(!sql.contains("password_hash"));
        Ok(())
    }

    #[test]
    fn test_config_file_sets_default_cardinality() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "simple_collections: only\nmax_page_size: 50")?;
        let mut config = SchemaConfig::default();
        config.merge(SchemaConfig::from_yaml_file(file.path())?);
        assert_eq!(config.simple_collections, SimpleCollections::Only);

        let catalogue = fixture()?;
        let schema = SchemaBuilder::new(&catalogue)
            .config(config)
            .plugin(ManyToManyPlugin)
            .build()?;

        let post = schema.object_type("Post").expect("Post type");
        let names: Vec<&str> = post.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["tagsByPostsTagPostIdAndTagIdList"]);

        // tags on the catalogue still win over the file
        let user = schema.object_type("User").expect("User type");
        assert_eq!(user.fields.len(), 2);
        Ok(())
    }
}
