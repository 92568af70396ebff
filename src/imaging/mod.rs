mod data_uri;
mod normalize;

pub use data_uri::{display_image, ensure_data_uri};
pub use normalize::{decode_data_uri, normalize, NormalizeOptions, NormalizedPayload};
