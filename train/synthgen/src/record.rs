use board::{Square, SquareBoxMap};
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::request::RenderRequest;

/// Flat metadata written next to every sample.
#[derive(Serialize, Debug)]
pub struct SampleMetadata<'a> {
    #[serde(flatten)]
    pub request: &'a RenderRequest,
    pub background: &'a str,
    pub seed: u64,
}

/// Square name -> `[x_min, y_min, x_max, y_max]`, in a1..h8 order.
pub struct SquareLabels<'a>(pub &'a SquareBoxMap);

impl Serialize for SquareLabels<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Square::COUNT))?;
        for (sq, b) in self.0.iter() {
            map.serialize_entry(&sq.to_string(), &b.to_array())?;
        }
        map.end()
    }
}
