use glam::Vec2;
use slotmap::new_key_type;

new_key_type! {
    /// Key for the food slotmap.
    pub struct FoodKey;
}

/// Passive energy store an ant can eat from.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodSource {
    pub pos: Vec2,
    pub energy: u32,
    pub depleted: bool,
}

impl FoodSource {
    pub fn new(pos: Vec2, energy: u32) -> Self {
        Self {
            pos,
            energy,
            depleted: energy == 0,
        }
    }

    #[inline(always)]
    pub fn is_within(&self, pos: Vec2, radius: f32) -> bool {
        self.pos.distance_squared(pos) <= radius * radius
    }

    /// Empty the source and return the energy it held.
    pub fn take(&mut self) -> u32 {
        let energy = self.energy;
        self.energy = 0;
        self.depleted = true;
        energy
    }
}
