use uuid::Uuid;

use crate::domain::cart::CartError;
use crate::domain::catalog::CatalogError;
use crate::domain::order::OrderError;
use crate::store::RepositoryError;

// ============================================================================
// Service Errors
// ============================================================================
//
// Every failure a service can return, with a coarse `ErrorKind` the HTTP
// layer maps to a status code. Nothing here is retried.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvalidState,
    InsufficientStock,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InsufficientStock => "insufficient_stock",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid {entity} id: {raw}")]
    InvalidId { entity: &'static str, raw: String },

    #[error("insufficient stock for variation {variation_id}: requested {requested}, available {available}")]
    InsufficientStock {
        variation_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("cart is empty")]
    EmptyCart,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::InvalidId { .. } | ServiceError::InvalidArgument(_) => {
                ErrorKind::InvalidArgument
            }
            ServiceError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            ServiceError::EmptyCart => ErrorKind::InvalidState,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::Order(e) => match e {
                OrderError::ItemNotFound { .. } => ErrorKind::NotFound,
                OrderError::InvalidQuantity(_)
                | OrderError::AmountOverflow
                | OrderError::UnknownStatus(_) => ErrorKind::InvalidArgument,
                OrderError::NotPending(_)
                | OrderError::InvalidTransition { .. }
                | OrderError::TerminalState(_)
                | OrderError::InvalidState(_) => ErrorKind::InvalidState,
            },
            ServiceError::Cart(e) => match e {
                CartError::ItemNotFound(_) => ErrorKind::NotFound,
                CartError::InvalidQuantity(_) | CartError::AmountOverflow => {
                    ErrorKind::InvalidArgument
                }
            },
            ServiceError::Catalog(e) => match e {
                CatalogError::ProductNotFound(_)
                | CatalogError::VariationNotFound(_)
                | CatalogError::CategoryNotFound(_) => ErrorKind::NotFound,
                CatalogError::DuplicateSku(_) | CatalogError::DuplicateSlug(_) => {
                    ErrorKind::Conflict
                }
                CatalogError::EmptyName
                | CatalogError::EmptySku
                | CatalogError::InvalidSlug(_)
                | CatalogError::InvalidPrice(_)
                | CatalogError::InvalidStock(_) => ErrorKind::InvalidArgument,
            },
            ServiceError::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::Storage(source) => ServiceError::Storage(source),
        }
    }
}

/// Parse a path identifier, reporting which entity it was meant to name.
pub fn parse_id(raw: &str, entity: &'static str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::InvalidId {
        entity,
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "order").unwrap(), id);

        let err = parse_id("not-a-uuid", "order").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "invalid order id: not-a-uuid");
    }

    #[test]
    fn test_domain_errors_map_to_kinds() {
        let cases = [
            (ServiceError::from(OrderError::NotPending(OrderStatus::Paid)), ErrorKind::InvalidState),
            (
                ServiceError::from(OrderError::InvalidTransition {
                    from: OrderStatus::Pending,
                    to: OrderStatus::Delivered,
                }),
                ErrorKind::InvalidState,
            ),
            (ServiceError::from(OrderError::TerminalState(OrderStatus::Cancelled)), ErrorKind::InvalidState),
            (
                ServiceError::from(OrderError::ItemNotFound {
                    product_id: Uuid::nil(),
                    variation_id: Uuid::nil(),
                }),
                ErrorKind::NotFound,
            ),
            (ServiceError::from(CartError::InvalidQuantity(0)), ErrorKind::InvalidArgument),
            (ServiceError::from(CartError::AmountOverflow), ErrorKind::InvalidArgument),
            (ServiceError::from(OrderError::AmountOverflow), ErrorKind::InvalidArgument),
            (ServiceError::from(CatalogError::DuplicateSlug("x".into())), ErrorKind::Conflict),
            (ServiceError::EmptyCart, ErrorKind::InvalidState),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error}");
        }
    }

    #[test]
    fn test_repository_errors_convert() {
        let not_found = ServiceError::from(RepositoryError::not_found("order", "abc"));
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.to_string(), "order not found: abc");

        let storage = ServiceError::from(RepositoryError::Storage(anyhow::anyhow!("timeout")));
        assert_eq!(storage.kind(), ErrorKind::Internal);
    }
}
