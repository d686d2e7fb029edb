use thiserror::Error;

use crate::connection::throttle::ThrottleCategory;

/// Errors that can occur while updating throttle rates
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThrottleError {
    /// A requested rate that is not a finite, non-negative number
    #[error("Requested rate {rate} for the {} category is not a valid byte rate", .category.name())]
    InvalidRate { category: ThrottleCategory, rate: f32 },
}
