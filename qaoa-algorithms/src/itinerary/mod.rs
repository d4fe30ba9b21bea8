pub mod qaoa;
pub use qaoa::QaoaSampler;
pub mod uniform;
pub use uniform::UniformSampler;
