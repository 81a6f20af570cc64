// Perception collaborator seam
//
// The classifier is an opaque function from image bytes to a class index;
// its model architecture and training live outside this crate.

#[derive(Debug, thiserror::Error)]
pub enum PerceptionError {
    #[error("classification failed: {0}")]
    Classify(String),
}

pub trait Perception {
    /// Classify one encoded image, returning a class index.
    fn classify(&mut self, image: &[u8]) -> Result<u8, PerceptionError>;
}

/// Always answers with the same class. Lets the server run end-to-end
/// without a model attached (wiring checks, throughput measurements).
pub struct FixedPerception {
    pub class: u8,
}

impl Perception for FixedPerception {
    fn classify(&mut self, _image: &[u8]) -> Result<u8, PerceptionError> {
        Ok(self.class)
    }
}
