//! Utilities and types for managing layers in a PDK.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use arcstr::ArcStr;
use derive_builder::Builder;
use pcgeom::bbox::{Bbox, BoundBox};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use self::selector::Selector;
use crate::error::{ErrorSource, Result as PcResult};

pub mod selector;

new_key_type! {
    /// A unique identifier for a layer in a PDK.
    pub struct LayerKey;
}

/// A GDS layer specification: layer number and datatype.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct GdsLayerSpec(pub i16, pub i16);

#[derive(Deserialize)]
struct CsvLayerRecord {
    layernum: i16,
    datatype: i16,
    name: String,
    purpose: String,
}

/// An enumeration of layer purposes.
///
/// Includes the common use-cases for each shape,
/// and two "escape hatches", one named and one not.
#[derive(Debug, Clone, Serialize, Deserialize, Ord, PartialOrd, PartialEq, Eq, Hash)]
pub enum LayerPurpose {
    // First-class enumerated purposes
    Drawing,
    Pin,
    Label,
    Outline,
    /// Named purpose, not first-class supported
    Named(ArcStr),
    /// Other purpose, not first-class supported nor named
    Other(i16),
}

impl LayerPurpose {
    /// Parses a purpose name as it appears in a layer table.
    ///
    /// Unrecognized names become [`LayerPurpose::Other`] if numeric
    /// and [`LayerPurpose::Named`] otherwise.
    pub fn parse(purp: &str) -> Self {
        match purp {
            "drawing" => Self::Drawing,
            "pin" => Self::Pin,
            "label" => Self::Label,
            "outline" => Self::Outline,
            _ => match purp.parse::<i16>() {
                Ok(other) => Self::Other(other),
                Err(_) => Self::Named(ArcStr::from(purp)),
            },
        }
    }
}

impl FromStr for LayerPurpose {
    type Err = std::convert::Infallible;
    fn from_str(purp: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(purp))
    }
}

/// A unique identifier for a specific GDS layer based on its definition in a PDK.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct LayerSpec(LayerKey, LayerPurpose);

impl LayerSpec {
    /// Creates a new [`LayerSpec`].
    #[inline]
    pub fn new(key: LayerKey, purpose: LayerPurpose) -> Self {
        Self(key, purpose)
    }

    /// Returns the spec for the drawing purpose of the layer associated with key `key`.
    pub fn drawing(key: LayerKey) -> Self {
        Self(key, LayerPurpose::Drawing)
    }

    /// Returns the spec for the label purpose of the layer associated with key `key`.
    pub fn label(key: LayerKey) -> Self {
        Self(key, LayerPurpose::Label)
    }

    /// Returns the layer key of a [`LayerSpec`].
    #[inline]
    pub fn layer(&self) -> LayerKey {
        self.0
    }

    /// Returns the purpose of a [`LayerSpec`].
    #[inline]
    pub fn purpose(&self) -> &LayerPurpose {
        &self.1
    }
}

/// A manager for layers in a PDK.
///
/// Keeps track of active layers and indexes them by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layers {
    slots: SlotMap<LayerKey, Layer>,
    names: HashMap<ArcStr, LayerKey>,
    gds_to_layout: HashMap<GdsLayerSpec, LayerSpec>,
    metal_idxs: HashMap<usize, LayerKey>,
    via_idxs: HashMap<usize, LayerKey>,
}

impl Layers {
    /// Creates an empty [`Layers`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`Layers`] from a vector of [`LayerInfo`]s.
    pub fn from_layer_infos(layer_infos: Vec<LayerInfo>) -> Self {
        let mut layers = Self::new();
        for info in layer_infos {
            layers.add(info);
        }
        layers
    }

    /// Creates a [`Layers`] from purposes specified in a CSV file.
    ///
    /// The CSV must have the columns `layernum,datatype,name,purpose`.
    /// Rows sharing a name are merged into one layer with several purposes.
    /// Uses the provided `base` closure to fill out the remaining metadata
    /// for each layer. Layers are added in order of first appearance.
    pub fn from_csv(
        csv: &str,
        mut base: impl FnMut(&str) -> PcResult<LayerInfo>,
    ) -> PcResult<Self> {
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let mut layer_infos: Vec<LayerInfo> = Vec::new();
        let mut idxs: HashMap<String, usize> = HashMap::new();

        for record in reader.deserialize() {
            let record: CsvLayerRecord = record?;
            let purp = LayerPurpose::parse(record.purpose.trim());
            let gds_spec = GdsLayerSpec(record.layernum, record.datatype);
            if let Some(&idx) = idxs.get(&record.name) {
                layer_infos[idx].add_purpose(purp, gds_spec);
            } else {
                let mut layer_info = base(&record.name)?;
                layer_info.name = ArcStr::from(record.name.as_str());
                layer_info.add_purpose(purp, gds_spec);
                idxs.insert(record.name, layer_infos.len());
                layer_infos.push(layer_info);
            }
        }

        Ok(Self::from_layer_infos(layer_infos))
    }

    /// Adds a [`Layer`] to our slot-map and number-map, and name-map.
    pub fn add(&mut self, layer: LayerInfo) -> LayerKey {
        // Layer names should be unique
        let name = layer.name.clone();
        let key = self.slots.insert_with_key(|k| Layer::new(k, layer));
        for (purp, gds_spec) in self.slots[key].purps() {
            self.gds_to_layout
                .insert(*gds_spec, LayerSpec::new(key, purp.clone()));
        }
        self.names.insert(name, key);

        if let Some(via_idx) = self.slots[key].info.via_idx {
            self.via_idxs.insert(via_idx, key);
        }
        if let Some(metal_idx) = self.slots[key].info.metal_idx {
            self.metal_idxs.insert(metal_idx, key);
        }

        key
    }

    /// Gets the [`LayerKey`] with layer name `name`.
    pub fn get_key<Q>(&self, name: &Q) -> Option<LayerKey>
    where
        Q: Hash + Eq + ?Sized,
        ArcStr: Borrow<Q>,
    {
        self.names.get(name).cloned()
    }

    /// Gets the name of `key`.
    pub fn get_name(&self, key: LayerKey) -> PcResult<&ArcStr> {
        let layer = self
            .slots
            .get(key)
            .ok_or(ErrorSource::LayerNotFound(format!("{key:?}")))?;
        Ok(&layer.info.name)
    }

    /// Gets a reference to the [`Layer`] from [`LayerKey`] `key`.
    pub fn get(&self, key: LayerKey) -> Option<&Layer> {
        self.slots.get(key)
    }

    /// Gets a reference to [`Layer`] from [`GdsLayerSpec`] `spec`.
    pub fn get_layer_from_spec(&self, spec: GdsLayerSpec) -> Option<&Layer> {
        let &LayerSpec(key, _) = self.gds_to_layout.get(&spec)?;
        self.get(key)
    }

    /// Converts a [`LayerSpec`] into its corresponding [`GdsLayerSpec`].
    pub fn to_gds_spec(&self, spec: &LayerSpec) -> Option<GdsLayerSpec> {
        self.get(spec.layer())
            .and_then(|layer| layer.info.spec(spec.purpose()))
    }

    /// Converts a [`LayerKey`] to a [`GdsLayerSpec`] corresponding to labels for that layer.
    ///
    /// Falls back to the drawing purpose for layers without a label purpose.
    pub fn to_label_gds_spec(&self, key: LayerKey) -> Option<GdsLayerSpec> {
        self.get(key).and_then(|layer| {
            layer
                .info
                .label_spec()
                .or_else(|| layer.info.spec(&LayerPurpose::Drawing))
        })
    }

    /// Returns the number of layers in the layer manager.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if there are no layers.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// A layer in a PDK.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layer {
    /// A unique identifier.
    pub id: LayerKey,
    /// Information associated with the layer.
    pub info: LayerInfo,
}

/// Metadata associated with a layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
#[builder(pattern = "owned")]
pub struct LayerInfo {
    /// The layer name.
    #[builder(setter(into), default)]
    pub name: ArcStr,
    /// A layer purpose to GDS spec lookup table.
    #[builder(setter(into), default)]
    pub purps: HashMap<LayerPurpose, GdsLayerSpec>,
    /// Indicates if this layer is a metal layer, and which one.
    #[builder(setter(strip_option), default)]
    pub metal_idx: Option<usize>,
    /// Indicates if this layer should be used as a via layer.
    ///
    /// See [`Selector::Via`] for more information.
    #[builder(setter(strip_option), default)]
    pub via_idx: Option<usize>,
    /// The type of the layer.
    #[builder(default)]
    pub layer_type: LayerType,
    /// The purpose with which labels should be emitted.
    #[builder(default = "LayerPurpose::Label")]
    pub label_purpose: LayerPurpose,
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            name: Default::default(),
            purps: Default::default(),
            metal_idx: Default::default(),
            via_idx: Default::default(),
            layer_type: Default::default(),
            label_purpose: LayerPurpose::Label,
        }
    }
}

/// An enumeraton of layer types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug, Serialize, Deserialize)]
pub enum LayerType {
    Metal,
    Via,
    Diffusion,
    Gate,
    Well,
    Implant,
    Marker,
    #[default]
    Other,
}

impl Layer {
    pub(crate) fn new(id: LayerKey, info: LayerInfo) -> Self {
        Self { id, info }
    }

    /// Retrieves a list of [`LayerPurpose`]-[`GdsLayerSpec`] tuples.
    pub fn purps(&self) -> Vec<(&LayerPurpose, &GdsLayerSpec)> {
        self.info.purps()
    }
}

impl LayerInfo {
    /// Creates a new [`LayerInfoBuilder`].
    #[inline]
    pub fn builder() -> LayerInfoBuilder {
        LayerInfoBuilder::default()
    }

    /// Adds a new [`LayerPurpose`].
    #[inline]
    pub fn add_purpose(&mut self, purp: LayerPurpose, spec: GdsLayerSpec) {
        self.purps.insert(purp, spec);
    }

    /// Retrieves the spec for this layer and [`purpose`](LayerPurpose).
    pub fn spec(&self, purpose: &LayerPurpose) -> Option<GdsLayerSpec> {
        self.purps.get(purpose).copied()
    }

    /// Retrieves the label spec for this layer.
    pub fn label_spec(&self) -> Option<GdsLayerSpec> {
        self.purps.get(&self.label_purpose).copied()
    }

    /// Retrieves a list of [`LayerPurpose`]-[`GdsLayerSpec`] tuples.
    pub fn purps(&self) -> Vec<(&LayerPurpose, &GdsLayerSpec)> {
        self.purps.iter().collect()
    }
}

/// A cheaply-clonable reference to [`Layers`].
#[derive(Clone)]
pub struct LayersRef {
    inner: Arc<RwLock<Layers>>,
}

impl LayersRef {
    /// Creates a new [`LayersRef`].
    #[inline]
    pub(crate) fn new(inner: Arc<RwLock<Layers>>) -> Self {
        Self { inner }
    }

    /// Gets a [`LayerKey`] based on the provided [`Selector`].
    pub fn get(&self, sel: Selector) -> PcResult<LayerKey> {
        let inner = self.inner.read().unwrap();
        let key = match sel {
            Selector::Metal(n) => inner.metal_idxs.get(&n).copied(),
            Selector::Via(n) => inner.via_idxs.get(&n).copied(),
            Selector::Name(n) => inner.names.get(n).copied(),
            Selector::Gds(spec) => inner.get_layer_from_spec(spec).map(|l| l.id),
        };
        key.ok_or(ErrorSource::LayerNotFound(format!("{sel:?}")).into())
    }

    /// Gets the [`LayerInfo`] associated with [`LayerKey`] `layer`.
    pub fn info(&self, layer: LayerKey) -> PcResult<LayerInfo> {
        let inner = self.inner.read().unwrap();
        let info = inner
            .slots
            .get(layer)
            .map(|l| l.info.clone())
            .ok_or(ErrorSource::LayerNotFound(format!("{layer:?}")))?;
        Ok(info)
    }

    /// Returns the name associated with [`LayerKey`] `layer`.
    pub fn name(&self, layer: LayerKey) -> PcResult<ArcStr> {
        let inner = self.inner.read().unwrap();
        Ok(inner.get_name(layer)?.clone())
    }

    /// Gets the metal index corresponding to this layer.
    ///
    /// Returns an error if this layer is not a metal layer.
    pub fn which_metal(&self, layer: LayerKey) -> PcResult<usize> {
        let info = self.info(layer)?;
        let idx = info
            .metal_idx
            .ok_or_else(|| ErrorSource::LayerNotFound(format!("{} is not a metal", info.name)))?;
        Ok(idx)
    }
}

/// Options by which users can name a layer.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum UserLayer {
    /// Use the given [`LayerKey`], with the purpose chosen by the caller.
    Key(LayerKey),
    /// Use the given [`LayerSpec`] as-is.
    Spec(LayerSpec),
}

impl From<LayerKey> for UserLayer {
    #[inline]
    fn from(value: LayerKey) -> Self {
        Self::Key(value)
    }
}

impl From<LayerSpec> for UserLayer {
    #[inline]
    fn from(value: LayerSpec) -> Self {
        Self::Spec(value)
    }
}

impl UserLayer {
    /// Converts the user's layer selection to a [`LayerSpec`].
    ///
    /// If the user did not specify a purpose, the `default_purpose` will be used.
    pub fn to_spec(self, default_purpose: LayerPurpose) -> LayerSpec {
        match self {
            Self::Key(key) => LayerSpec::new(key, default_purpose),
            Self::Spec(spec) => spec,
        }
    }
}

/// A trait representing functions available for multi-layered objects with bounding boxes.
pub trait LayerBoundBox: BoundBox {
    fn layer_bbox(&self, layer: LayerKey) -> Bbox;
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "layernum,datatype,name,purpose
22,0,comp,drawing
34,0,metal1,drawing
34,10,metal1,label
33,0,contact,drawing
";

    fn base(name: &str) -> PcResult<LayerInfo> {
        let builder = LayerInfo::builder();
        let builder = match name {
            "metal1" => builder.metal_idx(1).layer_type(LayerType::Metal),
            "contact" => builder.via_idx(0).layer_type(LayerType::Via),
            _ => builder.layer_type(LayerType::Diffusion),
        };
        Ok(builder.build()?)
    }

    #[test]
    fn test_layers_from_csv() {
        let layers = Layers::from_csv(CSV, base).expect("failed to parse layer table");
        assert_eq!(layers.len(), 3);

        let metal1 = layers.get_key("metal1").expect("metal1 should exist");
        assert_eq!(
            layers.to_gds_spec(&LayerSpec::drawing(metal1)),
            Some(GdsLayerSpec(34, 0))
        );
        assert_eq!(layers.to_label_gds_spec(metal1), Some(GdsLayerSpec(34, 10)));

        let comp = layers.get_key("comp").expect("comp should exist");
        assert_eq!(layers.to_label_gds_spec(comp), Some(GdsLayerSpec(22, 0)));
        assert_eq!(
            layers.get_layer_from_spec(GdsLayerSpec(34, 10)).map(|l| l.id),
            Some(metal1)
        );
    }

    #[test]
    fn test_layers_ref_selectors() {
        let layers = Layers::from_csv(CSV, base).expect("failed to parse layer table");
        let layers = LayersRef::new(Arc::new(RwLock::new(layers)));
        let metal1 = layers.get(Selector::Metal(1)).expect("metal 1 should exist");
        assert_eq!(layers.get(Selector::Name("metal1")).ok(), Some(metal1));
        assert_eq!(layers.which_metal(metal1).ok(), Some(1));
        assert_eq!(layers.name(metal1).expect("metal1 has a name"), "metal1");

        let contact = layers.get(Selector::Via(0)).expect("contact should exist");
        assert!(layers.which_metal(contact).is_err());
        assert!(layers.get(Selector::Metal(7)).is_err());
    }

    #[test]
    fn test_layer_purpose_parse() {
        assert_eq!(LayerPurpose::parse("label"), LayerPurpose::Label);
        assert_eq!(LayerPurpose::parse("5"), LayerPurpose::Other(5));
        assert_eq!(
            LayerPurpose::parse("marker"),
            LayerPurpose::Named(arcstr::literal!("marker"))
        );
    }
}
