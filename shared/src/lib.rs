pub mod api;
pub mod util;

pub use api::{
    AgentStateTag, AgentView, ColonySnapshot, FieldView, FoodView, decode_snapshot,
    encode_snapshot,
};
pub use util::{angle_distance, bearing, wrap_angle};
