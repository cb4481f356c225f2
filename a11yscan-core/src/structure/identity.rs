//! Content-based identity for embedded images

use crate::graph::EmbeddedImage;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable key for one embedded image.
///
/// Two occurrences with identical encoded stream bytes and identical
/// dimensions are the same image, regardless of the resource name or page
/// they were found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageIdentity {
    digest: [u8; 32],
    width: u32,
    height: u32,
}

impl ImageIdentity {
    pub fn new(data: &[u8], width: u32, height: u32) -> Self {
        let digest: [u8; 32] = Sha256::digest(data).into();
        Self {
            digest,
            width,
            height,
        }
    }

    pub fn of(image: &EmbeddedImage<'_>) -> Self {
        Self::new(image.stream.raw_data(), image.width(), image.height())
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}x{}",
            hex::encode(self.digest),
            self.width,
            self.height
        )
    }
}

// Serialized as its display form so it can key JSON maps
impl Serialize for ImageIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_same_bytes_same_identity() {
        let a = ImageIdentity::new(b"\x89PNG...", 10, 20);
        let b = ImageIdentity::new(b"\x89PNG...", 10, 20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_dimensions_are_part_of_identity() {
        let a = ImageIdentity::new(b"pixels", 10, 20);
        let b = ImageIdentity::new(b"pixels", 20, 10);
        assert_ne!(a, b);
    }

    #[test]
    fn test_content_is_part_of_identity() {
        // Same length and dimensions must not collide
        let a = ImageIdentity::new(b"aaaa", 2, 2);
        let b = ImageIdentity::new(b"bbbb", 2, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_and_json_key() {
        let id = ImageIdentity::new(b"", 1, 2);
        assert_eq!(
            id.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855@1x2"
        );

        let mut map = BTreeMap::new();
        map.insert(id, true);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.starts_with("{\"e3b0c442"));
        assert!(json.ends_with("@1x2\":true}"));
    }
}
