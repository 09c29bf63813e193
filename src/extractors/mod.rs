//! Request extractors that reject with `AppError` so failures share the `{message}` body.

mod json;
mod workshop_id;

pub use json::JsonBody;
pub use workshop_id::WorkshopId;
