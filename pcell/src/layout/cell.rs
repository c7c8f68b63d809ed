//! Types related to the creation and instantiation of [`Cell`]s.

use std::fmt;
use std::sync::Arc;

use arcstr::ArcStr;
use derive_builder::Builder;
use pcgeom::bbox::{Bbox, BoundBox};
use pcgeom::transform::{Translate, TranslateOwned};
use pcgeom::units::nm_to_um;
use pcgeom::{Point, Rect, Shape};
use serde::{Deserialize, Serialize};
use serde_json::json;
use slotmap::new_key_type;
use state::Container;
use thiserror::Error;

use super::group::Group;
use super::layers::{LayerBoundBox, LayerKey, LayerSpec, LayersRef};
use super::validation::validate_cell;
use super::{Draw, DrawRef};
use crate::error::ErrorSource;
use crate::vlsir::VlsirInfo;

/// The layout view of a cell.
#[derive(Debug, Default)]
pub struct Cell {
    /// The cell's identifier.
    id: CellKey,
    /// The cell's name.
    name: ArcStr,
    /// A list of instances contained in the cell.
    insts: Vec<Instance>,
    /// A list of primitive/geometric elements.
    elems: Vec<Element>,
    /// A list of text annotations.
    annotations: Vec<TextElement>,
    /// Ports, in the order they were added.
    ports: Vec<Port>,
    /// The parameters the cell was generated with.
    settings: serde_json::Value,

    /// Cache of values that are frequently used
    /// after a cell is done being generated.
    ///
    /// Cached values are computed after the cell is [frozen](Cell::freeze).
    cache: Option<Cache>,

    /// User-defined metadata.
    metadata: Container![Send + Sync],
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub(crate) struct Cache {
    bbox: Bbox,
}

new_key_type! {
    /// A unique identifier for cells.
    pub struct CellKey;
}

/// An instance of a cell in a layout.
///
/// Instances are only ever translated.
#[derive(Debug, Clone, Builder)]
pub struct Instance {
    /// The instance name.
    #[builder(default, setter(into))]
    pub(crate) name: ArcStr,
    /// A pointer to the reference cell.
    pub(crate) cell: Arc<Cell>,
    /// The location of the cell's origin in the parent.
    #[builder(default)]
    pub(crate) loc: Point,
}

impl DrawRef for Instance {
    fn draw_ref(&self) -> crate::error::Result<Group> {
        Ok(self.clone().into())
    }
}

impl Draw for Instance {
    fn draw(self) -> crate::error::Result<Group> {
        Ok(self.into())
    }
}

/// A primitive geometric element.
///
/// Combines a geometric [`Shape`] with a [`LayerSpec`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Element {
    /// The layer spec where the element is located.
    pub layer: LayerSpec,
    /// The element's shape.
    pub inner: Shape,
}

impl Element {
    /// Creates a new [`Element`].
    pub fn new(layer: LayerSpec, shape: impl Into<Shape>) -> Self {
        Self {
            layer,
            inner: shape.into(),
        }
    }
}

impl BoundBox for Element {
    fn bbox(&self) -> Bbox {
        self.inner.bbox()
    }
}

impl Draw for Element {
    fn draw(self) -> crate::error::Result<Group> {
        let mut grp = Group::new();
        grp.add_element(self);
        Ok(grp)
    }
}

impl DrawRef for Element {
    fn draw_ref(&self) -> crate::error::Result<Group> {
        self.clone().draw()
    }
}

impl Translate for Element {
    fn translate(&mut self, p: Point) {
        self.inner.translate(p);
    }
}

impl TranslateOwned for Element {
    fn translate_owned(mut self, p: Point) -> Self {
        self.translate(p);
        self
    }
}

/// A text annotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextElement {
    /// The string value of the annotation.
    pub string: ArcStr,
    /// The location of the annotation
    pub loc: Point,
    /// The layer on which the annotation resides.
    pub layer: LayerSpec,
}

impl Translate for TextElement {
    fn translate(&mut self, p: Point) {
        self.loc.translate(p);
    }
}

impl TranslateOwned for TextElement {
    fn translate_owned(mut self, p: Point) -> Self {
        self.translate(p);
        self
    }
}

/// The direction a port faces, counter-clockwise from east.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Faces east (0°).
    #[default]
    R0,
    /// Faces north (90°).
    R90,
    /// Faces west (180°).
    R180,
    /// Faces south (270°).
    R270,
}

impl Orientation {
    /// The orientation in degrees.
    pub fn degrees(&self) -> u16 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }
}

impl TryFrom<u16> for Orientation {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::R0,
            90 => Self::R90,
            180 => Self::R180,
            270 => Self::R270,
            _ => return Err(PortError::InvalidOrientation(value)),
        })
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// The electrical kind of a port.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PortType {
    #[default]
    Electrical,
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Electrical => write!(f, "electrical"),
        }
    }
}

/// A named, directional terminal of a cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Port {
    name: ArcStr,
    center: Point,
    width: i64,
    orientation: Orientation,
    layer: LayerKey,
    port_type: PortType,
}

impl Port {
    /// Creates a new electrical [`Port`].
    pub fn new(
        name: impl Into<ArcStr>,
        center: Point,
        width: i64,
        orientation: Orientation,
        layer: LayerKey,
    ) -> Self {
        Self {
            name: name.into(),
            center,
            width,
            orientation,
            layer,
            port_type: PortType::Electrical,
        }
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.center
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.width
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline]
    pub fn layer(&self) -> LayerKey {
        self.layer
    }

    #[inline]
    pub fn port_type(&self) -> PortType {
        self.port_type
    }

    /// Returns a copy of this port with a different name.
    pub fn named(mut self, name: impl Into<ArcStr>) -> Self {
        self.name = name.into();
        self
    }
}

impl Translate for Port {
    fn translate(&mut self, p: Point) {
        self.center.translate(p);
    }
}

impl TranslateOwned for Port {
    fn translate_owned(mut self, p: Point) -> Self {
        self.translate(p);
        self
    }
}

/// An enumeration of port-related errors.
#[derive(Debug, Error)]
pub enum PortError {
    /// The desired port was not found.
    #[error("port not found: {0}")]
    PortNotFound(ArcStr),

    /// Port already exists.
    #[error("port already exists: {0}")]
    PortAlreadyExists(ArcStr),

    /// Orientations must be a multiple of 90 degrees.
    #[error("invalid port orientation: {0} degrees")]
    InvalidOrientation(u16),
}

impl Cell {
    /// Create a new and empty Cell with ID `id`.
    pub fn new(id: CellKey) -> Self {
        Self {
            id,
            name: arcstr::literal!("unnamed"),
            ..Default::default()
        }
    }

    /// Returns the ID of the cell.
    #[inline]
    pub fn id(&self) -> CellKey {
        self.id
    }

    /// Returns the name of the cell.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Sets the name of the cell.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// Returns an iterator over the instances in the cell.
    #[inline]
    pub fn insts(&self) -> impl Iterator<Item = &Instance> {
        self.insts.iter()
    }

    /// Adds an instance to the cell.
    pub fn add_inst(&mut self, inst: impl Into<Instance>) {
        debug_assert!(!self.is_frozen());
        self.insts.push(inst.into());
    }

    /// Returns an iterator over the elements in the cell.
    #[inline]
    pub fn elems(&self) -> impl Iterator<Item = &Element> {
        self.elems.iter()
    }

    pub fn add_elements(&mut self, elems: impl IntoIterator<Item = Element>) {
        debug_assert!(!self.is_frozen());
        self.elems.extend(elems);
    }

    pub fn add_instances(&mut self, insts: impl IntoIterator<Item = Instance>) {
        debug_assert!(!self.is_frozen());
        self.insts.extend(insts);
    }

    pub fn add_annotations(&mut self, annotations: impl IntoIterator<Item = TextElement>) {
        debug_assert!(!self.is_frozen());
        self.annotations.extend(annotations);
    }

    /// Draws a shape on the given layer.
    pub fn draw_shape(&mut self, layer: LayerSpec, shape: impl Into<Shape>) {
        debug_assert!(!self.is_frozen());
        self.elems.push(Element::new(layer, shape));
    }

    /// Returns an iterator over the text annotations in the cell.
    #[inline]
    pub fn annotations(&self) -> impl Iterator<Item = &TextElement> {
        self.annotations.iter()
    }

    pub fn add_annotation(&mut self, text_elem: impl Into<TextElement>) {
        debug_assert!(!self.is_frozen());
        self.annotations.push(text_elem.into());
    }

    /// Returns the port named `name`.
    pub fn port(&self, name: &str) -> Result<&Port, PortError> {
        self.ports
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PortError::PortNotFound(ArcStr::from(name)))
    }

    /// Returns the ports of the cell, in the order they were added.
    #[inline]
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    /// Adds a port to the cell.
    ///
    /// Fails if a port with the same name already exists.
    pub fn add_port(&mut self, port: Port) -> Result<(), PortError> {
        debug_assert!(!self.is_frozen());
        if self.ports.iter().any(|p| p.name == port.name) {
            return Err(PortError::PortAlreadyExists(port.name));
        }
        self.ports.push(port);
        Ok(())
    }

    /// The parameters this cell was generated with.
    #[inline]
    pub fn settings(&self) -> &serde_json::Value {
        &self.settings
    }

    pub(crate) fn set_settings(&mut self, settings: serde_json::Value) {
        self.settings = settings;
    }

    /// Creates a rectangular [`Bbox`] surrounding all elements in the layout.
    pub fn bbox(&self) -> Bbox {
        // The cache is only populated once the cell is frozen.
        if let Some(ref cache) = self.cache {
            return cache.bbox;
        }
        let mut bbox = Bbox::empty();
        for elem in &self.elems {
            bbox = elem.inner.union(bbox);
        }
        for inst in &self.insts {
            bbox = inst.bbox().union(bbox);
        }
        bbox
    }

    /// Freezes the cell, caching useful values and preventing further modification.
    #[inline]
    pub(crate) fn freeze(&mut self) {
        self.metadata.freeze();
        self.compute_cache();
    }

    /// Returns true if the cell is frozen.
    ///
    /// See [`Cell::freeze`] for more information.
    #[inline]
    fn is_frozen(&self) -> bool {
        self.cache.is_some()
    }

    /// (Re)computes cached values and updates the cache.
    fn compute_cache(&mut self) {
        let cache = Cache { bbox: self.bbox() };
        self.cache = Some(cache);
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        let validation = validate_cell(self);
        validation.log();
        if validation.has_errors() {
            return Err(ErrorSource::InvalidLayout(validation.first_error()).into());
        }
        Ok(())
    }

    pub fn set_metadata<T: Send + Sync + 'static>(&mut self, data: T) -> bool {
        self.metadata.set(data)
    }

    pub fn get_metadata<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.metadata.try_get::<T>()
    }

    /// The circuit-simulation metadata attached to this cell, if any.
    #[inline]
    pub fn vlsir(&self) -> Option<&VlsirInfo> {
        self.get_metadata::<VlsirInfo>()
    }

    /// Returns all shapes on `layer`, including those inside instances.
    pub fn shapes_on(&self, layer: LayerKey) -> Box<dyn Iterator<Item = Shape> + '_> {
        let recur = self.insts().flat_map(move |inst| inst.shapes_on(layer));
        let curr = self
            .elems()
            .filter(move |&elem| elem.layer.layer() == layer)
            .map(|elem| elem.inner.clone());
        Box::new(curr.chain(recur))
    }

    /// Returns the settings, ports and metadata of this cell as JSON.
    ///
    /// Lengths are reported in micrometres.
    pub fn to_dict(&self, layers: &LayersRef) -> crate::error::Result<serde_json::Value> {
        let mut ports = serde_json::Map::new();
        for port in self.ports() {
            ports.insert(
                port.name().to_string(),
                json!({
                    "center": [nm_to_um(port.center().x), nm_to_um(port.center().y)],
                    "width": nm_to_um(port.width()),
                    "orientation": port.orientation().degrees(),
                    "layer": layers.name(port.layer())?.as_str(),
                    "port_type": port.port_type().to_string(),
                }),
            );
        }
        let mut info = serde_json::Map::new();
        if let Some(vlsir) = self.vlsir() {
            info.insert("vlsir".to_string(), vlsir.to_json());
        }
        Ok(json!({
            "name": self.name().as_str(),
            "settings": self.settings(),
            "ports": ports,
            "info": info,
        }))
    }
}

impl BoundBox for Cell {
    fn bbox(&self) -> Bbox {
        Cell::bbox(self)
    }
}

impl LayerBoundBox for Cell {
    fn layer_bbox(&self, layer: LayerKey) -> Bbox {
        let mut bbox = Bbox::empty();
        for elem in &self.elems {
            if elem.layer.layer() == layer {
                bbox = elem.inner.union(bbox);
            }
        }
        for inst in &self.insts {
            bbox = inst.layer_bbox(layer).union(bbox);
        }
        bbox
    }
}

impl Instance {
    /// Creates a new [`Instance`] of `cell`, placed at the origin.
    pub fn new(cell: impl Into<Arc<Cell>>) -> Self {
        let cell = cell.into();
        Self {
            name: cell.name.clone(),
            cell,
            loc: Point::new(0, 0),
        }
    }

    /// Returns the name of the instance.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Returns a pointer to the instance's reference cell.
    #[inline]
    pub fn cell(&self) -> &Arc<Cell> {
        &self.cell
    }

    /// Creates a new [`InstanceBuilder`].
    #[inline]
    pub fn builder() -> InstanceBuilder {
        InstanceBuilder::default()
    }

    /// Returns the location of the instance.
    #[inline]
    pub fn loc(&self) -> Point {
        self.loc
    }

    /// Sets the location of the instance.
    #[inline]
    pub fn set_loc(&mut self, p: impl Into<Point>) {
        self.loc = p.into();
    }

    /// Returns the port named `name`, in the coordinates of the parent.
    pub fn port(&self, name: &str) -> Result<Port, PortError> {
        Ok(self.cell.port(name)?.clone().translate_owned(self.loc))
    }

    /// Returns the ports of the reference cell, in the coordinates of the parent.
    pub fn ports(&self) -> impl Iterator<Item = Port> + '_ {
        self.cell
            .ports()
            .map(move |port| port.clone().translate_owned(self.loc))
    }

    pub fn shapes_on(&self, layer: LayerKey) -> impl Iterator<Item = Shape> + '_ {
        let loc = self.loc;
        self.cell().shapes_on(layer).map(move |s| s.translate_owned(loc))
    }

    /// Returns the bounding rectangle of the instance.
    ///
    /// Returns [`None`] if the reference cell is empty.
    #[inline]
    pub fn brect(&self) -> Option<Rect> {
        self.bbox().into_rect()
    }
}

impl Translate for Instance {
    fn translate(&mut self, p: Point) {
        self.loc.translate(p);
    }
}

impl TranslateOwned for Instance {
    fn translate_owned(mut self, p: Point) -> Self {
        self.translate(p);
        self
    }
}

impl BoundBox for Instance {
    fn bbox(&self) -> Bbox {
        self.cell.bbox().translate_owned(self.loc)
    }
}

impl LayerBoundBox for Instance {
    fn layer_bbox(&self, layer: LayerKey) -> Bbox {
        self.cell.layer_bbox(layer).translate_owned(self.loc)
    }
}
