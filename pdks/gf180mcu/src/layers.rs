use pcell::error::{ErrorSource, Result};
use pcell::layout::layers::selector::Selector;
use pcell::layout::layers::{LayerInfo, LayerKey, LayerType, Layers, LayersRef};

use crate::Gf180Pdk;

/// The number of routing metals, excluding metaltop.
pub const NUM_METALS: usize = 5;

impl Gf180Pdk {
    pub(crate) fn layer_table() -> Result<Layers> {
        Layers::from_csv(
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/layers.csv")),
            |name| {
                let builder = LayerInfo::builder();
                let builder = if let Some(num) = index_suffix(name, "metal") {
                    builder.metal_idx(num).layer_type(LayerType::Metal)
                } else if name == "contact" {
                    builder.via_idx(0).layer_type(LayerType::Via)
                } else if let Some(num) = index_suffix(name, "via") {
                    builder.via_idx(num).layer_type(LayerType::Via)
                } else {
                    let layer_type = match name {
                        "comp" => LayerType::Diffusion,
                        "nwell" | "dnwell" | "lvpwell" => LayerType::Well,
                        "nplus" | "pplus" => LayerType::Implant,
                        "poly2" => LayerType::Gate,
                        "dualgate" | "diode_mk" | "schottky_diode" | "sab" | "esd"
                        | "pr_bndry" | "border" => LayerType::Marker,
                        _ => LayerType::Other,
                    };
                    builder.layer_type(layer_type)
                };
                Ok(builder.build()?)
            },
        )
    }
}

/// Parses names such as `metal2` into their numeric suffix.
fn index_suffix(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?.parse().ok()
}

/// Resolved keys for the layers the generators draw on.
#[derive(Debug, Clone, Copy)]
pub struct Gf180Layers {
    pub comp: LayerKey,
    pub dnwell: LayerKey,
    pub nwell: LayerKey,
    pub lvpwell: LayerKey,
    pub dualgate: LayerKey,
    pub poly2: LayerKey,
    pub nplus: LayerKey,
    pub pplus: LayerKey,
    pub contact: LayerKey,
    pub diode_mk: LayerKey,
    pub schottky_diode: LayerKey,
    pub border: LayerKey,
    metals: [LayerKey; NUM_METALS],
    vias: [LayerKey; NUM_METALS - 1],
}

impl Gf180Layers {
    pub fn new(layers: &LayersRef) -> Result<Self> {
        let named = |name: &str| layers.get(Selector::Name(name));
        let mut metals = [LayerKey::default(); NUM_METALS];
        for (i, key) in metals.iter_mut().enumerate() {
            *key = layers.get(Selector::Metal(i + 1))?;
        }
        let mut vias = [LayerKey::default(); NUM_METALS - 1];
        for (i, key) in vias.iter_mut().enumerate() {
            *key = layers.get(Selector::Via(i + 1))?;
        }
        Ok(Self {
            comp: named("comp")?,
            dnwell: named("dnwell")?,
            nwell: named("nwell")?,
            lvpwell: named("lvpwell")?,
            dualgate: named("dualgate")?,
            poly2: named("poly2")?,
            nplus: named("nplus")?,
            pplus: named("pplus")?,
            contact: layers.get(Selector::Via(0))?,
            diode_mk: named("diode_mk")?,
            schottky_diode: named("schottky_diode")?,
            border: named("border")?,
            metals,
            vias,
        })
    }

    #[inline]
    pub fn metal1(&self) -> LayerKey {
        self.metals[0]
    }

    /// The `n`th routing metal, starting from 1.
    pub fn metal(&self, n: usize) -> Result<LayerKey> {
        n.checked_sub(1)
            .and_then(|i| self.metals.get(i))
            .copied()
            .ok_or_else(|| ErrorSource::LayerNotFound(format!("metal{n}")).into())
    }

    /// The via connecting metal `n` to metal `n + 1`.
    pub fn via(&self, n: usize) -> Result<LayerKey> {
        n.checked_sub(1)
            .and_then(|i| self.vias.get(i))
            .copied()
            .ok_or_else(|| ErrorSource::LayerNotFound(format!("via{n}")).into())
    }
}

#[cfg(test)]
mod tests {
    use pcell::layout::layers::{GdsLayerSpec, LayerPurpose};

    use super::*;

    #[test]
    fn test_layer_table() {
        let layers = Gf180Pdk::layer_table().unwrap();
        assert_eq!(layers.len(), 25);

        let metal1 = layers.get_key("metal1").unwrap();
        let info = &layers.get(metal1).unwrap().info;
        assert_eq!(info.metal_idx, Some(1));
        assert_eq!(info.spec(&LayerPurpose::Drawing), Some(GdsLayerSpec(34, 0)));
        assert_eq!(info.label_spec(), Some(GdsLayerSpec(34, 10)));

        let metaltop = layers.get_key("metaltop").unwrap();
        assert_eq!(layers.get(metaltop).unwrap().info.metal_idx, None);

        let contact = layers.get_key("contact").unwrap();
        assert_eq!(layers.get(contact).unwrap().info.via_idx, Some(0));

        let diode_mk = layers.get_key("diode_mk").unwrap();
        assert_eq!(
            layers.get(diode_mk).unwrap().info.spec(&LayerPurpose::Drawing),
            Some(GdsLayerSpec(115, 5))
        );
    }
}
