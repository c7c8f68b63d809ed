use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::component::{Component, View};
use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::generation::GeneratedCheck;
use crate::io::create_dir_all;
use crate::layout::cell::{Cell, CellKey, Instance};
use crate::layout::context::{LayoutCtx, LayoutData};
use crate::layout::layers::{Layers, LayersRef};
use crate::log::{debug, info};
use crate::pdk::Pdk;

pub(crate) struct PcellData {
    layouts: LayoutData,
    pdk: Arc<dyn Pdk>,
    layers: Arc<RwLock<Layers>>,
}

pub struct PcellConfig {
    pub pdk: Arc<dyn Pdk>,
}

#[derive(Default)]
pub struct PcellConfigBuilder {
    pub pdk: Option<Arc<dyn Pdk>>,
}

impl PcellData {
    #[inline]
    pub(crate) fn from_config(cfg: PcellConfig) -> Result<Self> {
        let layers = cfg.pdk.layers()?;
        Ok(Self {
            layouts: LayoutData::new(),
            pdk: cfg.pdk,
            layers: Arc::new(RwLock::new(layers)),
        })
    }

    #[inline]
    pub(crate) fn pdk(&self) -> Arc<dyn Pdk> {
        self.pdk.clone()
    }

    #[inline]
    pub(crate) fn layers(&self) -> Arc<RwLock<Layers>> {
        self.layers.clone()
    }

    #[inline]
    pub(crate) fn layouts(&self) -> &LayoutData {
        &self.layouts
    }
}

/// A cheaply clonable handle to the shared generation state.
///
/// Holds the PDK, its layer table, and every cell generated so far.
#[derive(Clone)]
pub struct PcellCtx {
    inner: Arc<RwLock<PcellData>>,
}

impl PcellConfig {
    #[inline]
    pub fn builder() -> PcellConfigBuilder {
        PcellConfigBuilder::default()
    }
}

impl PcellConfigBuilder {
    pub fn pdk<T>(&mut self, pdk: T) -> &mut Self
    where
        T: Pdk + 'static,
    {
        self.pdk = Some(Arc::new(pdk));
        self
    }

    pub fn build(&self) -> Result<PcellConfig> {
        let pdk = self
            .pdk
            .clone()
            .ok_or_else(|| ErrorSource::InvalidPdk("no PDK was specified".to_string()))?;
        Ok(PcellConfig { pdk })
    }
}

impl PcellCtx {
    #[inline]
    pub(crate) fn read(&self) -> RwLockReadGuard<PcellData> {
        self.inner.read().unwrap()
    }

    #[inline]
    pub(crate) fn write(&self) -> RwLockWriteGuard<PcellData> {
        self.inner.write().unwrap()
    }

    #[inline]
    pub fn from_config(cfg: PcellConfig) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(RwLock::new(PcellData::from_config(cfg)?)),
        })
    }

    pub fn pdk(&self) -> Arc<dyn Pdk> {
        self.read().pdk()
    }

    pub fn raw_layers(&self) -> Arc<RwLock<Layers>> {
        self.read().layers()
    }

    pub fn layers(&self) -> LayersRef {
        LayersRef::new(self.raw_layers())
    }

    /// Returns every cell generated so far, in generation order.
    pub fn cells(&self) -> Vec<Arc<Cell>> {
        self.read().layouts().cells().cloned().collect()
    }

    /// Generates the layout of `T` with the given parameters, or reuses
    /// the cell generated earlier with identical parameters.
    pub fn instantiate_layout<T>(&self, params: &T::Params) -> Result<Instance>
    where
        T: Component,
    {
        let check = {
            let mut inner = self.write();
            inner.layouts.get_generated_cell::<T>(params)?
        };

        Ok(match check {
            GeneratedCheck::Exists(cell) => Instance::new(cell),
            GeneratedCheck::MustGenerate(id) => {
                let cell = self.generate_layout::<T>(params, id)?;
                Instance::new(cell)
            }
        })
    }

    /// Writes a GDS library whose top cell is the layout of `T` with the given parameters.
    pub fn write_layout<T>(&self, params: &T::Params, path: impl AsRef<Path>) -> Result<()>
    where
        T: Component,
    {
        let path = path.as_ref();

        let inner = || -> Result<()> {
            let inst = self.instantiate_layout::<T>(params)?;
            let top = inst.cell().clone();
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            self.to_gds_with_top(top, path)?;
            Ok(())
        };

        with_err_context(inner(), || {
            ErrorContext::Task(arcstr::format!("writing layout to file {:?}", path))
        })
    }

    fn init_component<T>(&self, params: &T::Params) -> Result<T>
    where
        T: Component,
    {
        let component = with_err_context(T::new(params, self), || ErrorContext::InitComponent {
            type_name: std::any::type_name::<T>().into(),
        })?;
        Ok(component)
    }

    pub(crate) fn generate_layout<T>(&self, params: &T::Params, id: CellKey) -> Result<Arc<Cell>>
    where
        T: Component,
    {
        let component = self.init_component::<T>(params)?;
        let settings = serde_json::to_value(params)?;
        let name = {
            let mut inner = self.write();
            inner.layouts.alloc_name(component.name())
        };
        debug!("generating layout of {}", name);

        let mut ctx = LayoutCtx {
            inner: self.clone(),
            cell: Cell::new(id),
        };
        ctx.cell.set_name(name.clone());
        ctx.cell.set_settings(settings);
        let generated = with_err_context(component.layout(&mut ctx), || {
            ErrorContext::GenComponent {
                name: name.clone(),
                type_name: std::any::type_name::<T>().into(),
                view: View::Layout,
            }
        })
        .and_then(|()| {
            ctx.cell.freeze();
            ctx.cell.validate()
        });
        if let Err(err) = generated {
            self.write().layouts.release_name(&name);
            return Err(err);
        }

        // The cell is frozen; nothing may modify it from here on.
        let ctx = ctx;

        let cell = {
            let mut inner = self.write();
            inner.layouts.set_cell(ctx.cell)
        };
        info!("generated cell {}", name);

        Ok(cell)
    }
}
