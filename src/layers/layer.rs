//! Layer numbering.
//!
//! Continuous effects apply in seven layers; layer 7 is split into four
//! sublayers. A [`LayerSlot`] names one step of that sequence and orders
//! naturally, so iterating [`LayerSlot::ALL`] is the application order.

use serde::{Deserialize, Serialize};

/// The seven layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Copy = 1,
    Control = 2,
    Text = 3,
    Type = 4,
    Color = 5,
    Ability = 6,
    PowerToughness = 7,
}

/// Sublayers of layer 7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PtSublayer {
    /// 7a: characteristic-defining abilities.
    CharacteristicDefining,
    /// 7b: effects that set power and/or toughness.
    Set,
    /// 7c: effects and counters that modify power and/or toughness.
    Modify,
    /// 7d: switching power and toughness.
    Switch,
}

/// One step of the application sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerSlot {
    pub layer: Layer,
    pub sublayer: Option<PtSublayer>,
}

impl LayerSlot {
    #[must_use]
    pub const fn layer(layer: Layer) -> Self {
        Self {
            layer,
            sublayer: None,
        }
    }

    #[must_use]
    pub const fn pt(sublayer: PtSublayer) -> Self {
        Self {
            layer: Layer::PowerToughness,
            sublayer: Some(sublayer),
        }
    }

    /// Every slot, in application order.
    pub const ALL: [LayerSlot; 10] = [
        LayerSlot::layer(Layer::Copy),
        LayerSlot::layer(Layer::Control),
        LayerSlot::layer(Layer::Text),
        LayerSlot::layer(Layer::Type),
        LayerSlot::layer(Layer::Color),
        LayerSlot::layer(Layer::Ability),
        LayerSlot::pt(PtSublayer::CharacteristicDefining),
        LayerSlot::pt(PtSublayer::Set),
        LayerSlot::pt(PtSublayer::Modify),
        LayerSlot::pt(PtSublayer::Switch),
    ];
}

impl std::fmt::Display for LayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.layer as u8;
        match self.sublayer {
            None => write!(f, "{}", n),
            Some(PtSublayer::CharacteristicDefining) => write!(f, "{}a", n),
            Some(PtSublayer::Set) => write!(f, "{}b", n),
            Some(PtSublayer::Modify) => write!(f, "{}c", n),
            Some(PtSublayer::Switch) => write!(f, "{}d", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_sorted() {
        let mut sorted = LayerSlot::ALL;
        sorted.sort();
        assert_eq!(sorted, LayerSlot::ALL);
    }

    #[test]
    fn test_display() {
        assert_eq!(LayerSlot::layer(Layer::Type).to_string(), "4");
        assert_eq!(LayerSlot::pt(PtSublayer::Modify).to_string(), "7c");
    }
}
