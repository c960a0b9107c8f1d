// Car-rental availability lookup: form validation, availability service client and result rendering

pub mod api;
pub mod availability;
pub mod config;
pub mod controller;
pub mod form;
pub mod render;
pub mod reservation;
pub mod validation;

// Re-export key types for convenience
pub use api::{ApiError, AvailabilityApi, ClientError, HttpAvailabilityClient};
pub use availability::{AvailabilityResult, BreakdownItem, Inventory, PricingInfo};
pub use config::{AppConfig, ConfigError};
pub use controller::{FormController, PageHandles};
pub use form::{AvailabilityQuery, FormField, FormInput};
pub use render::{render, DisplayState, Outcome, ResultView};
pub use reservation::{strip_leading_zero, ReservationForm};
pub use validation::{validate, validate_at, ValidationError};
