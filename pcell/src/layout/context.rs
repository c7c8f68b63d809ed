//! Context methods for instantiating component layouts.

use std::sync::Arc;

use arcstr::ArcStr;
use pcgeom::bbox::Bbox;
use pcgeom::ring::Ring;
use pcgeom::{Point, Rect};

use super::cell::{Cell, CellKey, Element, Instance, Port, PortError, TextElement};
use super::group::Group;
use super::layers::{LayerKey, LayerPurpose, LayerSpec, LayersRef, UserLayer};
use super::Draw;
use crate::component::Component;
use crate::data::PcellCtx;
use crate::error::Result as PcResult;
use crate::generation::{GeneratedCheck, GenerationMap, ParamKey};
use crate::pdk::Pdk;
use crate::vlsir::VlsirInfo;

/// Context for creating the layout view of a [`Component`].
pub struct LayoutCtx {
    /// The global [`PcellCtx`].
    pub(crate) inner: PcellCtx,
    /// The layout view of the cell being created.
    pub(crate) cell: Cell,
}

/// Cell data for a generated layout library.
#[derive(Debug, Default)]
pub(crate) struct LayoutData {
    /// A map of generated cells.
    cells: GenerationMap<ParamKey, CellKey, Cell>,
}

impl LayoutData {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            cells: GenerationMap::new(),
        }
    }

    /// Returns the generated cell if it already exists or generates a new ID.
    pub(crate) fn get_generated_cell<T>(
        &mut self,
        params: &T::Params,
    ) -> PcResult<GeneratedCheck<Arc<Cell>, CellKey>>
    where
        T: Component,
    {
        Ok(self.cells.get(ParamKey::from_params::<T>(params)?))
    }

    /// Adds a cell to the map based on its [`CellKey`].
    pub(crate) fn set_cell(&mut self, cell: Cell) -> Arc<Cell> {
        self.cells.set(cell.id(), cell)
    }

    /// Allocates an unused name derived from the given base name.
    pub(crate) fn alloc_name(&mut self, base_name: impl Into<ArcStr>) -> ArcStr {
        self.cells.alloc_name(base_name)
    }

    pub(crate) fn release_name(&mut self, name: &ArcStr) {
        self.cells.release_name(name)
    }

    /// Returns an iterator over the cells in the map.
    pub(crate) fn cells(&self) -> impl Iterator<Item = &Arc<Cell>> {
        self.cells.values()
    }
}

impl LayoutCtx {
    /// Returns a reference to the global [`PcellCtx`].
    #[inline]
    pub fn inner(&self) -> &PcellCtx {
        &self.inner
    }

    /// Returns an iterator over the [`Element`]s in the current cell.
    pub fn elems(&self) -> impl Iterator<Item = &Element> {
        self.cell.elems()
    }

    /// Returns an iterator over the [`Instance`]s in the current cell.
    pub fn insts(&self) -> impl Iterator<Item = &Instance> {
        self.cell.insts()
    }

    /// Returns an iterator over the [`Port`]s of the current cell.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.cell.ports()
    }

    /// Returns a reference to the underlying [`Pdk`].
    #[inline]
    pub fn pdk(&self) -> Arc<dyn Pdk> {
        self.inner.pdk()
    }

    /// Returns a reference to the underlying PDK's layer manager as a [`LayersRef`].
    #[inline]
    pub fn layers(&self) -> LayersRef {
        LayersRef::new(self.inner.read().layers())
    }

    /// Instantiates a layout instance of component `T` with params `params`.
    #[inline]
    pub fn instantiate<T>(&mut self, params: &T::Params) -> PcResult<Instance>
    where
        T: Component,
    {
        self.inner.instantiate_layout::<T>(params)
    }

    /// Adds an instance to the current cell.
    #[inline]
    pub fn add_instance(&mut self, inst: impl Into<Instance>) {
        self.cell.add_inst(inst);
    }

    /// Draws a rectangle on layer `layer` of the layout.
    pub fn draw_rect<L>(&mut self, layer: L, rect: Rect)
    where
        L: Into<UserLayer>,
    {
        self.cell
            .draw_shape(layer.into().to_spec(LayerPurpose::Drawing), rect)
    }

    /// Draws a ring on layer `layer` of the layout.
    pub fn draw_ring<L>(&mut self, layer: L, ring: Ring)
    where
        L: Into<UserLayer>,
    {
        self.cell
            .draw_shape(layer.into().to_spec(LayerPurpose::Drawing), ring)
    }

    /// Places a text label at `loc` on the label purpose of `layer`.
    pub fn add_label(&mut self, text: impl Into<ArcStr>, loc: Point, layer: LayerKey) {
        self.cell.add_annotation(TextElement {
            string: text.into(),
            loc,
            layer: LayerSpec::label(layer),
        });
    }

    pub fn bbox(&self) -> Bbox {
        self.cell.bbox()
    }

    pub fn draw<T>(&mut self, value: T) -> PcResult<()>
    where
        T: Draw,
    {
        let group = value.draw()?;
        self.add_group(group);
        Ok(())
    }

    pub(crate) fn add_group(&mut self, group: Group) {
        self.cell.add_elements(group.elements());
        self.cell.add_instances(group.instances());
        self.cell.add_annotations(group.annotations());
    }

    /// Adds a [`Port`] to the cell.
    pub fn add_port(&mut self, port: Port) -> Result<(), PortError> {
        self.cell.add_port(port)
    }

    /// Attaches circuit-simulation metadata to the cell.
    ///
    /// Returns `false` if metadata was already attached.
    pub fn set_vlsir(&mut self, info: VlsirInfo) -> bool {
        self.cell.set_metadata(info)
    }

    pub fn set_metadata<T: Send + Sync + 'static>(&mut self, data: T) -> bool {
        self.cell.set_metadata(data)
    }

    pub fn get_metadata<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.cell.get_metadata()
    }
}
