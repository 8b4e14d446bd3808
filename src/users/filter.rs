use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::users::dto::FindUsersQuery;

/// Columns a filter may constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Id,
    Email,
    Name,
    Status,
    UpdatedAt,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Email => "email",
            Field::Name => "name",
            Field::Status => "status",
            Field::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals(Scalar),
    Contains(String),
    LessThan(OffsetDateTime),
    GreaterThan(OffsetDateTime),
}

/// Typed filter over the users collection: at most one predicate per field.
/// Inserting a second predicate for the same field replaces the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    preds: BTreeMap<Field, Predicate>,
}

impl UserFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: i64) -> Self {
        self.preds.insert(Field::Id, Predicate::Equals(Scalar::Int(id)));
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.preds
            .insert(Field::Email, Predicate::Equals(Scalar::Text(email.to_string())));
        self
    }

    pub fn status(mut self, active: bool) -> Self {
        self.preds
            .insert(Field::Status, Predicate::Equals(Scalar::Bool(active)));
        self
    }

    pub fn name_contains(mut self, fragment: &str) -> Self {
        self.preds
            .insert(Field::Name, Predicate::Contains(fragment.to_string()));
        self
    }

    pub fn updated_before(mut self, bound: OffsetDateTime) -> Self {
        self.preds.insert(Field::UpdatedAt, Predicate::LessThan(bound));
        self
    }

    pub fn updated_after(mut self, bound: OffsetDateTime) -> Self {
        self.preds.insert(Field::UpdatedAt, Predicate::GreaterThan(bound));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.preds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Predicate)> {
        self.preds.iter().map(|(field, pred)| (*field, pred))
    }

    /// Boundary between the raw search query and typed predicates.
    ///
    /// `status` is matched against the literal string `"true"`; any other
    /// present value filters for inactive rows. A blank `name` is treated as
    /// absent. Both date bounds target `updated_at`, so supplying both keeps
    /// only the `created_after` bound (the later-assigned key).
    pub fn from_query(query: &FindUsersQuery) -> Self {
        let mut filter = UserFilter::new();
        if let Some(status) = &query.status {
            filter = filter.status(status == "true");
        }
        if let Some(name) = &query.name {
            if !name.is_empty() {
                filter = filter.name_contains(name);
            }
        }
        if let Some(bound) = query.created_before {
            filter = filter.updated_before(bound);
        }
        if let Some(bound) = query.created_after {
            filter = filter.updated_after(bound);
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn query() -> FindUsersQuery {
        FindUsersQuery {
            status: None,
            name: None,
            created_before: None,
            created_after: None,
        }
    }

    #[test]
    fn status_matches_literal_true_only() {
        let active = UserFilter::from_query(&FindUsersQuery {
            status: Some("true".into()),
            ..query()
        });
        assert_eq!(active, UserFilter::new().status(true));

        for other in ["false", "TRUE", "1", ""] {
            let inactive = UserFilter::from_query(&FindUsersQuery {
                status: Some(other.into()),
                ..query()
            });
            assert_eq!(inactive, UserFilter::new().status(false), "status={other:?}");
        }
    }

    #[test]
    fn omitted_status_leaves_filter_empty() {
        assert!(UserFilter::from_query(&query()).is_empty());
    }

    #[test]
    fn blank_name_is_ignored() {
        let filter = UserFilter::from_query(&FindUsersQuery {
            name: Some(String::new()),
            ..query()
        });
        assert!(filter.is_empty());

        let filter = UserFilter::from_query(&FindUsersQuery {
            name: Some("ana".into()),
            ..query()
        });
        assert_eq!(filter, UserFilter::new().name_contains("ana"));
    }

    #[test]
    fn both_date_bounds_keep_only_created_after() {
        let before = datetime!(2024-01-01 00:00 UTC);
        let after = datetime!(2024-06-01 00:00 UTC);
        let filter = UserFilter::from_query(&FindUsersQuery {
            created_before: Some(before),
            created_after: Some(after),
            ..query()
        });

        let preds: Vec<_> = filter.iter().collect();
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].0, Field::UpdatedAt);
        assert_eq!(*preds[0].1, Predicate::GreaterThan(after));
    }
}
