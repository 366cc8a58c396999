//! Customer 360 Dashboard Library
//!
//! Server-rendered back-office dashboard over the customer REST backend:
//! customer list with filtering and pagination, the Customer 360 profile
//! view, and KPI / sync-health metrics.
//!
//! # Modules
//!
//! - `backend_client`: REST backend client and query-string building.
//! - `cancel`: Request cancellation tokens.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `format`: Number, currency and HTML formatting helpers.
//! - `handlers`: HTTP request handlers.
//! - `models`: Backend data models.
//! - `pages`: HTML page rendering.
//! - `server`: Router assembly.
//! - `views`: Per-page view state and controllers.

pub mod backend_client;
pub mod cancel;
pub mod config;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod server;
pub mod views;
