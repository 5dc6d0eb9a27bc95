use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The store answered with an error. `message` is what it said, if anything.
    #[error("Upstream error: {}", .message.as_deref().unwrap_or("<no message>"))]
    Upstream { message: Option<String> },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl StoreError {
    /// Message that may be shown to an admin caller, if the failure carried one.
    pub fn upstream_message(&self) -> Option<String> {
        match self {
            StoreError::Upstream { message } => message.clone().filter(|m| !m.is_empty()),
            StoreError::InvalidIdentifier(_) => Some(self.to_string()),
            StoreError::Connection(msg) => Some(msg.clone()),
            StoreError::Sqlx(err) => match err {
                sqlx::Error::Database(db) => Some(db.message().to_string()),
                other => Some(other.to_string()),
            },
            StoreError::Http(err) => Some(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

impl Projection {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Columns(columns.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    pub fn as_rest(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// A single-table read: `SELECT <projection> FROM <table> ORDER BY <order>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub table: String,
    pub projection: Projection,
    pub order: OrderBy,
}

impl ListQuery {
    pub fn newest_first(table: impl Into<String>, projection: Projection) -> Self {
        Self {
            table: table.into(),
            projection,
            order: OrderBy {
                column: "created_at".to_string(),
                direction: Direction::Desc,
            },
        }
    }

    /// Reject any table or column name that is not a plain identifier.
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_identifier(&self.table)?;
        validate_identifier(&self.order.column)?;
        if let Projection::Columns(columns) = &self.projection {
            if columns.is_empty() {
                return Err(StoreError::InvalidIdentifier("empty projection".to_string()));
            }
            for column in columns {
                validate_identifier(column)?;
            }
        }
        Ok(())
    }
}

pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid && name.len() <= 63 {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Read-only access to the hosted data store.
///
/// Implementations return rows verbatim as JSON objects. Zero matches is an
/// empty vector, never an absent value.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn select(&self, query: &ListQuery) -> Result<Vec<Value>, StoreError>;

    /// Cheap connectivity probe used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        for ok in ["documents", "created_at", "_private", "t1"] {
            assert!(validate_identifier(ok).is_ok(), "{ok}");
        }
        let too_long = "x".repeat(64);
        for bad in ["", "1table", "docs;drop", "a b", "\"quoted\"", "name-with-dash", too_long.as_str()] {
            assert!(validate_identifier(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn newest_first_orders_by_created_at_desc() {
        let query = ListQuery::newest_first("documents", Projection::All);
        assert_eq!(query.order.column, "created_at");
        assert_eq!(query.order.direction, Direction::Desc);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn projection_is_validated() {
        let bad = ListQuery::newest_first("workspaces", Projection::columns(["id", "name; --"]));
        assert!(bad.validate().is_err());

        let empty = ListQuery::newest_first("workspaces", Projection::Columns(Vec::new()));
        assert!(empty.validate().is_err());
    }

    #[test]
    fn upstream_message_falls_back_to_none() {
        assert_eq!(StoreError::Upstream { message: None }.upstream_message(), None);
        assert_eq!(StoreError::Upstream { message: Some(String::new()) }.upstream_message(), None);
        assert_eq!(
            StoreError::Upstream { message: Some("permission denied".to_string()) }.upstream_message(),
            Some("permission denied".to_string())
        );
    }
}
