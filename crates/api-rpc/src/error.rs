//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jobdock_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const DUPLICATE_NAME: i32 = 4002;
    pub const QUEUE_LOCKED: i32 = 4003;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
    pub const STORAGE_ERROR: i32 = 5002;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let message = err.to_string();
    match err {
        AppError::FormValidation(fields) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, message, Some(fields))
        }
        AppError::Domain(_) | AppError::Serialization(_) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, message, None::<()>)
        }
        AppError::QueueDoesNotExist(_) | AppError::JobDoesNotExist(_) => {
            ErrorObjectOwned::owned(code::NOT_FOUND, message, None::<()>)
        }
        AppError::DuplicateName(_) => {
            ErrorObjectOwned::owned(code::DUPLICATE_NAME, message, None::<()>)
        }
        AppError::QueueLocked(_) => {
            ErrorObjectOwned::owned(code::QUEUE_LOCKED, message, None::<()>)
        }
        AppError::Database(_) => ErrorObjectOwned::owned(code::DB_ERROR, message, None::<()>),
        AppError::Storage(_) | AppError::Io(_) => {
            ErrorObjectOwned::owned(code::STORAGE_ERROR, message, None::<()>)
        }
        AppError::Config(_) | AppError::Internal(_) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, message, None::<()>)
        }
    }
}
