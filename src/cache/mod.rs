pub mod inference_cache;

pub use inference_cache::InferenceCache;
