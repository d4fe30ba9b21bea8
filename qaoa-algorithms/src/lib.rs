use anyhow::{anyhow, Result};
use qaoa_challenges::Sampler;

pub mod itinerary;

pub const SAMPLER_NAMES: [&str; 2] = ["qaoa", "uniform"];

pub fn sampler_from_name(name: &str) -> Result<Box<dyn Sampler>> {
    match name {
        "qaoa" => Ok(Box::new(itinerary::QaoaSampler)),
        "uniform" => Ok(Box::new(itinerary::UniformSampler)),
        _ => Err(anyhow!(
            "Unknown sampler '{}'. Expected one of: {}",
            name,
            SAMPLER_NAMES.join(", ")
        )),
    }
}
