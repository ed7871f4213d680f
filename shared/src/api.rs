use rkyv::rancor::Error;
use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, from_bytes, to_bytes};

/// Behavioral mode of an agent as seen by a renderer.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AgentStateTag {
    Idle,
    Exploring,
    Returning,
    Dead,
}

#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AgentView {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub heading: f32, // radians, 0.0 when not yet initialized
    pub state: AgentStateTag,
}

#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FoodView {
    pub x: f32,
    pub y: f32,
    pub energy: u32,
    pub depleted: bool,
}

/// Row-major pheromone intensities, one cell per tile.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FieldView {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<f32>,
}

impl FieldView {
    pub fn intensity_at(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            self.cells.get((y * self.width + x) as usize).copied()
        } else {
            None
        }
    }
}

/// Read-only picture of a colony after a completed tick.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColonySnapshot {
    pub tick: u64,
    pub nest: (f32, f32),
    pub food_collected: u32,
    pub agents: Vec<AgentView>,
    pub food: Vec<FoodView>,
    pub field: FieldView,
}

/// Encode a snapshot with rkyv.
pub fn encode_snapshot(snapshot: &ColonySnapshot) -> Result<Vec<u8>, Error> {
    let bytes = to_bytes::<Error>(snapshot)?;
    Ok(bytes.to_vec())
}

/// Decode a snapshot previously produced by [`encode_snapshot`].
/// The input does not need to be aligned.
pub fn decode_snapshot(bytes: &[u8]) -> Result<ColonySnapshot, Error> {
    let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);
    from_bytes::<ColonySnapshot, Error>(&aligned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> ColonySnapshot {
        ColonySnapshot {
            tick: 42,
            nest: (400.0, 300.0),
            food_collected: 3,
            agents: vec![
                AgentView {
                    id: 1,
                    x: 10.5,
                    y: 20.25,
                    heading: 1.5,
                    state: AgentStateTag::Exploring,
                },
                AgentView {
                    id: 7,
                    x: 0.0,
                    y: 600.0,
                    heading: 0.0,
                    state: AgentStateTag::Idle,
                },
            ],
            food: vec![FoodView {
                x: 240.0,
                y: 200.0,
                energy: 0,
                depleted: true,
            }],
            field: FieldView {
                width: 2,
                height: 2,
                cells: vec![0.0, 1.0, 2.5, 255.0],
            },
        }
    }

    #[test]
    fn test_snapshot_survives_encoding() {
        let snapshot = sample_snapshot();
        let bytes = encode_snapshot(&snapshot).unwrap();
        let decoded = decode_snapshot(&bytes).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_decode_from_unaligned_slice() {
        let snapshot = sample_snapshot();
        let bytes = encode_snapshot(&snapshot).unwrap();
        let mut shifted = vec![0u8];
        shifted.extend_from_slice(&bytes);
        let decoded = decode_snapshot(&shifted[1..]).unwrap();
        assert_eq!(decoded.agents.len(), 2);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_snapshot(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_field_view_lookup() {
        let field = sample_snapshot().field;
        assert_eq!(field.intensity_at(0, 1), Some(2.5));
        assert_eq!(field.intensity_at(1, 1), Some(255.0));
        assert_eq!(field.intensity_at(2, 0), None);
    }
}
