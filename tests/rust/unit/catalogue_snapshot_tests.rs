//! Unit tests for catalogue snapshot loading and relation inference edge cases

#[cfg(test)]
mod catalogue_snapshot_tests {
    use junctiongraph::pg_catalog::{AllowAll, CatalogError, Catalogue, TableId};
    use junctiongraph::relation_inference::infer_many_to_many;

    const SELF_REFERENCE: &str = r#"
tables:
  - id: 1
    namespace: public
    name: people
    attributes:
      - { num: 1, name: id, type: int4 }
  - id: 2
    namespace: public
    name: friendships
    attributes:
      - { num: 1, name: person_id, type: int4 }
      - { num: 2, name: friend_id, type: int4 }
constraints:
  - { id: 10, name: people_pkey, table_id: 1, kind: primary, key_attribute_nums: [1] }
  - { id: 11, name: friendships_person_id_fkey, table_id: 2, kind: foreign, key_attribute_nums: [1], foreign_table_id: 1, foreign_key_attribute_nums: [1] }
  - { id: 12, name: friendships_friend_id_fkey, table_id: 2, kind: foreign, key_attribute_nums: [2], foreign_table_id: 1, foreign_key_attribute_nums: [1] }
"#;

    /// Both foreign keys point back at the left table, so there is no right side
    #[test]
    fn test_self_referencing_junction_yields_nothing() {
        let catalogue = Catalogue::from_yaml_str(SELF_REFERENCE).unwrap();
        let people = catalogue.table(TableId(1)).unwrap();
        let relations = infer_many_to_many(people, &catalogue, &AllowAll).unwrap();
        assert!(relations.is_empty());
    }

    #[test]
    fn test_missing_right_table_is_fatal() {
        let snapshot = r#"
tables:
  - { id: 1, namespace: public, name: posts, attributes: [{ num: 1, name: id, type: int4 }] }
  - id: 3
    namespace: public
    name: posts_tags
    attributes:
      - { num: 1, name: post_id, type: int4 }
      - { num: 2, name: tag_id, type: int4 }
constraints:
  - { id: 11, name: posts_tags_post_id_fkey, table_id: 3, kind: foreign, key_attribute_nums: [1], foreign_table_id: 1, foreign_key_attribute_nums: [1] }
  - { id: 12, name: posts_tags_tag_id_fkey, table_id: 3, kind: foreign, key_attribute_nums: [2], foreign_table_id: 2, foreign_key_attribute_nums: [1] }
"#;
        let catalogue = Catalogue::from_yaml_str(snapshot).unwrap();
        let posts = catalogue.table(TableId(1)).unwrap();
        let err = infer_many_to_many(posts, &catalogue, &AllowAll).unwrap_err();
        assert_eq!(
            err,
            CatalogError::MissingForeignTable {
                constraint: "posts_tags_tag_id_fkey".to_string(),
                table_id: 2,
            }
        );
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Catalogue::from_yaml_file("/nonexistent/catalogue.yaml").unwrap_err();
        match err {
            CatalogError::SnapshotRead { error } => assert!(error.contains("/nonexistent/catalogue.yaml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
