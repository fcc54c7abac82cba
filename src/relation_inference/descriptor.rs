use crate::pg_catalog::{Attribute, Constraint, Table};

/// Everything needed to materialise one many-to-many relation
/// `left <- junction -> right`.
///
/// Only [`infer_many_to_many`](super::infer_many_to_many) builds descriptors,
/// so the key lists always hold exactly one column each and the junction side
/// of either constraint is never a primary or unique key.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDescriptor {
    left_table: Table,
    left_key_attributes: Vec<Attribute>,
    junction_left_key_attributes: Vec<Attribute>,
    junction_right_key_attributes: Vec<Attribute>,
    right_key_attributes: Vec<Attribute>,
    junction_table: Table,
    right_table: Table,
    junction_left_constraint: Constraint,
    junction_right_constraint: Constraint,
}

/// Key columns of a relation, grouped for [`RelationDescriptor::new`]
pub(crate) struct RelationKeys {
    pub left: Vec<Attribute>,
    pub junction_left: Vec<Attribute>,
    pub junction_right: Vec<Attribute>,
    pub right: Vec<Attribute>,
}

impl RelationKeys {
    pub fn all(&self) -> impl Iterator<Item = &Attribute> {
        self.left
            .iter()
            .chain(&self.junction_left)
            .chain(&self.junction_right)
            .chain(&self.right)
    }

    pub fn is_single_column(&self) -> bool {
        [
            &self.left,
            &self.junction_left,
            &self.junction_right,
            &self.right,
        ]
        .iter()
        .all(|keys| keys.len() == 1)
    }
}

impl RelationDescriptor {
    pub(crate) fn new(
        left_table: &Table,
        junction_table: &Table,
        right_table: &Table,
        junction_left_constraint: &Constraint,
        junction_right_constraint: &Constraint,
        keys: RelationKeys,
    ) -> Self {
        debug_assert!(keys.is_single_column());
        Self {
            left_table: left_table.clone(),
            left_key_attributes: keys.left,
            junction_left_key_attributes: keys.junction_left,
            junction_right_key_attributes: keys.junction_right,
            right_key_attributes: keys.right,
            junction_table: junction_table.clone(),
            right_table: right_table.clone(),
            junction_left_constraint: junction_left_constraint.clone(),
            junction_right_constraint: junction_right_constraint.clone(),
        }
    }

    pub fn left_table(&self) -> &Table {
        &self.left_table
    }

    pub fn junction_table(&self) -> &Table {
        &self.junction_table
    }

    pub fn right_table(&self) -> &Table {
        &self.right_table
    }

    pub fn junction_left_constraint(&self) -> &Constraint {
        &self.junction_left_constraint
    }

    pub fn junction_right_constraint(&self) -> &Constraint {
        &self.junction_right_constraint
    }

    pub fn left_key_attributes(&self) -> &[Attribute] {
        &self.left_key_attributes
    }

    pub fn junction_left_key_attributes(&self) -> &[Attribute] {
        &self.junction_left_key_attributes
    }

    pub fn junction_right_key_attributes(&self) -> &[Attribute] {
        &self.junction_right_key_attributes
    }

    pub fn right_key_attributes(&self) -> &[Attribute] {
        &self.right_key_attributes
    }

    // Composite keys are never inferred, so each list has exactly one column.

    pub fn left_key(&self) -> &Attribute {
        &self.left_key_attributes[0]
    }

    pub fn junction_left_key(&self) -> &Attribute {
        &self.junction_left_key_attributes[0]
    }

    pub fn junction_right_key(&self) -> &Attribute {
        &self.junction_right_key_attributes[0]
    }

    pub fn right_key(&self) -> &Attribute {
        &self.right_key_attributes[0]
    }

    /// Whether `attr` is one of the junction table's join columns
    pub fn is_junction_key(&self, attr: &Attribute) -> bool {
        self.junction_left_key_attributes
            .iter()
            .chain(&self.junction_right_key_attributes)
            .any(|key| key.table_id == attr.table_id && key.num == attr.num)
    }
}
