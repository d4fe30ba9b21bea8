pub mod itinerary;
pub use itinerary::{Challenge, InvalidInput, Sampler, Solution, VariationalParameters};
