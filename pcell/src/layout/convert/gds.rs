//! Utilities for GDS conversion.
//!
//! Converts generated layouts to [`gds21`] structures.

use std::collections::{HashSet, VecDeque};
use std::convert::TryInto;
use std::path::Path;
use std::sync::{Arc, RwLock};

use arcstr::ArcStr;
use derivative::Derivative;
use pcgeom::{Point, Rect, Shape};
use slotmap::SecondaryMap;

use super::error::{ErrorContext, ErrorHelper};
use crate::data::{PcellCtx, PcellData};
use crate::error::{with_err_context, ErrorContext as PcErrorContext, ErrorSource, Result};
use crate::layout::cell::{Cell, CellKey, Element, Instance, TextElement};
use crate::layout::error::{LayoutError, LayoutResult};
use crate::layout::layers::{GdsLayerSpec, LayerSpec, Layers};
use crate::log::debug;

#[derive(Debug, Clone, Default)]
enum ExportSet {
    #[default]
    All,
    Set(HashSet<CellKey>),
}

/// A GDSII exporter.
///
/// Converts generated cells to a GDSII library ([`gds21::GdsLibrary`]).
/// Database units are nanometres; user units are micrometres.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct GdsExporter<'a> {
    #[derivative(Debug = "ignore")]
    data: &'a PcellData,
    layers: Arc<RwLock<Layers>>,
    backtrace: Vec<ErrorContext>,
    names_used: HashSet<ArcStr>,
    /// The top level cell.
    ///
    /// The name of this cell will be preserved.
    top: Option<Arc<Cell>>,
    export_set: ExportSet,
    names: SecondaryMap<CellKey, ArcStr>,
}

impl PcellCtx {
    /// Converts every cell generated in this context to a GDSII library.
    pub fn to_gds_lib(&self) -> Result<gds21::GdsLibrary> {
        let data = self.read();
        let inner = || -> Result<gds21::GdsLibrary> {
            Ok(GdsExporter::new(&data, None)
                .export_lib()
                .map_err(ErrorSource::Layout)?)
        };
        with_err_context(inner(), || {
            PcErrorContext::Task(arcstr::literal!(
                "converting cells in context to GDS library"
            ))
        })
    }

    /// Converts `top` and the cells it instantiates to a GDSII library.
    pub fn to_gds_lib_with_top(&self, top: Arc<Cell>) -> Result<gds21::GdsLibrary> {
        let data = self.read();
        let inner = || -> Result<gds21::GdsLibrary> {
            Ok(GdsExporter::new(&data, Some(top))
                .export_lib()
                .map_err(ErrorSource::Layout)?)
        };
        with_err_context(inner(), || {
            PcErrorContext::Task(arcstr::literal!("converting top cell to GDS library"))
        })
    }

    /// Saves every cell generated in this context to a GDS file.
    pub fn to_gds(&self, path: impl AsRef<Path>) -> Result<()> {
        let inner = || -> Result<()> {
            self.to_gds_lib()?
                .save(path)
                .map_err(LayoutError::from)
                .map_err(ErrorSource::Layout)?;
            Ok(())
        };
        with_err_context(inner(), || {
            PcErrorContext::Task(arcstr::literal!("converting cells in context to GDS"))
        })
    }

    /// Saves `top` and the cells it instantiates to a GDS file.
    pub fn to_gds_with_top(&self, top: Arc<Cell>, path: impl AsRef<Path>) -> Result<()> {
        let inner = || -> Result<()> {
            self.to_gds_lib_with_top(top)?
                .save(path)
                .map_err(LayoutError::from)
                .map_err(ErrorSource::Layout)?;
            Ok(())
        };
        with_err_context(inner(), || {
            PcErrorContext::Task(arcstr::literal!("converting top cell to GDS"))
        })
    }
}

impl<'a> GdsExporter<'a> {
    fn new(data: &'a PcellData, top: Option<Arc<Cell>>) -> Self {
        let export_set = match top {
            Some(ref top) => ExportSet::for_top(top),
            None => ExportSet::All,
        };
        Self {
            data,
            layers: data.layers(),
            backtrace: Vec::new(),
            names_used: HashSet::with_capacity(data.layouts().cells().count()),
            top,
            export_set,
            names: SecondaryMap::new(),
        }
    }

    /// Runs basic preprocessing before export.
    fn prepare(&mut self) {
        if let Some(ref top) = self.top {
            self.names_used.insert(top.name().to_owned());
        }
        let layouts = self.data.layouts();
        for cell in layouts.cells() {
            if !self.export_set.contains(&cell.id()) {
                continue;
            }
            let name = self.get_cell_name(cell);
            self.names.insert(cell.id(), name);
        }
    }

    /// Exports to a [`gds21::GdsLibrary`].
    fn export_lib(&mut self) -> LayoutResult<gds21::GdsLibrary> {
        self.prepare();

        self.backtrace.push(ErrorContext::Library);
        let libname = match self.top {
            Some(ref top) => top.name().to_string(),
            None => "TOP".to_string(),
        };
        let mut gdslib = gds21::GdsLibrary::new(libname);
        gdslib.units = gds21::GdsUnits::new(1e-3, 1e-9);

        let layouts = self.data.layouts();
        for cell in layouts.cells() {
            if !self.export_set.contains(&cell.id()) {
                continue;
            }
            let strukt = self.export_cell(cell)?;
            gdslib.structs.push(strukt);
        }
        self.backtrace.pop();
        debug!("exported {} cells to GDS", gdslib.structs.len());
        Ok(gdslib)
    }

    /// Converts a [`Cell`] to a [`gds21::GdsStruct`] cell definition.
    fn export_cell(&mut self, cell: &Arc<Cell>) -> LayoutResult<gds21::GdsStruct> {
        self.backtrace.push(ErrorContext::Cell(cell.name().clone()));

        let mut elems = Vec::new();

        for inst in cell.insts() {
            elems.push(self.export_instance(inst)?.into());
        }

        // A ring becomes several boundaries.
        self.backtrace.push(ErrorContext::Geometry);
        for elem in cell.elems() {
            elems.extend(self.export_element(elem)?);
        }
        self.backtrace.pop();

        self.backtrace.push(ErrorContext::Annotations);
        for annotation in cell.annotations() {
            elems.push(self.export_annotation(annotation)?);
        }
        self.backtrace.pop();

        let name = self.unwrap(
            self.names.get(cell.id()).cloned(),
            format!("cell {} was not prepared for export", cell.name()),
        )?;
        let mut strukt = gds21::GdsStruct::new(name.to_string());
        strukt.elems = elems;

        self.backtrace.pop();
        Ok(strukt)
    }

    /// Converts an [`Instance`] to a GDS instance ([`gds21::GdsStructRef`]).
    fn export_instance(&mut self, inst: &Instance) -> LayoutResult<gds21::GdsStructRef> {
        self.backtrace
            .push(ErrorContext::Instance(inst.name().clone()));
        let cell = inst.cell();
        let name = self.unwrap(
            self.names.get(cell.id()).cloned(),
            format!("instance of unexported cell {}", cell.name()),
        )?;
        let gdsinst = gds21::GdsStructRef {
            name: name.to_string(),
            xy: self.export_point(&inst.loc())?,
            ..Default::default()
        };
        self.backtrace.pop();
        Ok(gdsinst)
    }

    /// Converts a [`LayerSpec`] to its GDS layer and datatype.
    pub fn export_layerspec(&mut self, spec: &LayerSpec) -> LayoutResult<GdsLayerSpec> {
        let layers = self.layers.read().unwrap();
        self.unwrap(
            layers.to_gds_spec(spec),
            format!("no GDS spec found for layer spec {spec:?}"),
        )
    }

    /// Converts an [`Element`] into one or more [`gds21::GdsElement`]s.
    pub fn export_element(&mut self, elem: &Element) -> LayoutResult<Vec<gds21::GdsElement>> {
        let layerspec = self.export_layerspec(&elem.layer)?;
        self.export_shape(&elem.inner, layerspec)
    }

    /// Converts a [`Shape`] to [`gds21::GdsBoundary`] elements.
    ///
    /// GDS boundaries include an explicit repetition of their origin for closure,
    /// so each rectangle is described by a 5-point vector.
    pub fn export_shape(
        &mut self,
        shape: &Shape,
        layerspec: GdsLayerSpec,
    ) -> LayoutResult<Vec<gds21::GdsElement>> {
        shape
            .rects()
            .iter()
            .map(|r| self.export_rect(r, layerspec))
            .collect()
    }

    fn export_rect(
        &mut self,
        r: &Rect,
        GdsLayerSpec(layer, datatype): GdsLayerSpec,
    ) -> LayoutResult<gds21::GdsElement> {
        let x0 = r.p0.x.try_into()?;
        let y0 = r.p0.y.try_into()?;
        let x1 = r.p1.x.try_into()?;
        let y1 = r.p1.y.try_into()?;
        let xy = gds21::GdsPoint::vec(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]);
        Ok(gds21::GdsBoundary {
            layer,
            datatype,
            xy,
            ..Default::default()
        }
        .into())
    }

    /// Converts a [`TextElement`] to a [`gds21::GdsElement`].
    pub fn export_annotation(
        &mut self,
        text_elem: &TextElement,
    ) -> LayoutResult<gds21::GdsElement> {
        let GdsLayerSpec(layer, texttype) = {
            let layers = self.layers.read().unwrap();
            let spec = layers
                .to_gds_spec(&text_elem.layer)
                .or_else(|| layers.to_label_gds_spec(text_elem.layer.layer()));
            self.unwrap(
                spec,
                format!("no label layer found for {:?}", text_elem.layer),
            )?
        };

        Ok(gds21::GdsTextElem {
            string: text_elem.string.to_string(),
            layer,
            texttype,
            xy: self.export_point(&text_elem.loc)?,
            ..Default::default()
        }
        .into())
    }

    /// Convert a [`Point`] to a GDS21 [`gds21::GdsPoint`].
    pub fn export_point(&mut self, pt: &Point) -> LayoutResult<gds21::GdsPoint> {
        let x = pt.x.try_into()?;
        let y = pt.y.try_into()?;
        Ok(gds21::GdsPoint::new(x, y))
    }

    /// Renames the cell with the given name to avoid duplicate cell names.
    ///
    /// Does not rename the top cell. However, to ensure no other cell takes
    /// the top cell's name, the top cell name must be inserted into the
    /// `names_used` map prior to calling this function.
    fn get_cell_name(&mut self, cell: &Arc<Cell>) -> ArcStr {
        let name = cell.name();
        let name = if self.names_used.contains(name) && !self.is_top(cell) {
            let mut i = 1;
            loop {
                let newname = arcstr::format!("{}_{}", name, i);
                if !self.names_used.contains(&newname) {
                    break newname;
                }
                i += 1;
            }
        } else {
            name.clone()
        };

        self.names_used.insert(name.clone());
        name
    }

    /// Checks if `cell`'s ID matches the top cell's ID.
    fn is_top(&self, cell: &Arc<Cell>) -> bool {
        match self.top {
            Some(ref top) => top.id() == cell.id(),
            None => false,
        }
    }
}

impl ErrorHelper for GdsExporter<'_> {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Export {
            message: msg.into(),
            stack: self.backtrace.clone(),
        }
    }
}

impl ExportSet {
    #[inline]
    fn contains(&self, key: &CellKey) -> bool {
        match self {
            Self::All => true,
            Self::Set(s) => s.contains(key),
        }
    }

    /// Collects `top` and every cell reachable from it.
    fn for_top(top: &Arc<Cell>) -> Self {
        let mut set = HashSet::new();
        let mut stack = VecDeque::new();
        stack.push_front(top);
        set.insert(top.id());

        while let Some(cell) = stack.pop_front() {
            for inst in cell.insts() {
                let cell = inst.cell();
                if set.insert(cell.id()) {
                    stack.push_front(cell);
                }
            }
        }

        Self::Set(set)
    }
}
