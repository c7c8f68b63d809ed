use arcstr::ArcStr;
use log::{info, warn};
use pcell::component::Component;
use pcell::data::PcellCtx;
use pcell::error::Result;
use pcell::layout::context::LayoutCtx;
use pcell::layout::placement::pack::GridPacker;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{ALL_CELLS_BORDER_MARGIN, ALL_CELLS_SPACING};
use crate::layers::Gf180Layers;
use crate::registry::Registry;

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllCellsParams {
    /// Label every port of every packed cell with its name.
    pub draw_ports: bool,
}

/// Every registered cell at its default parameters, packed into a grid
/// and framed by a border rectangle.
pub struct AllCells {
    draw_ports: bool,
}

impl AllCells {
    const NAME: &'static str = "all_cells";
}

impl Component for AllCells {
    type Params = AllCellsParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        Ok(Self {
            draw_ports: params.draw_ports,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("all_cells")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = Gf180Layers::new(&ctx.layers())?;

        let mut insts = Vec::new();
        for name in Registry::names().filter(|&name| name != Self::NAME) {
            match Registry::instantiate(ctx.inner(), name, &Value::Null) {
                Ok(inst) => insts.push(inst),
                Err(err) => warn!("skipping cell {name}: {err}"),
            }
        }
        info!("packing {} cells", insts.len());

        let packer = GridPacker::new(insts, ALL_CELLS_SPACING);
        let placed = packer.placed();
        let border = packer.brect().expand(ALL_CELLS_BORDER_MARGIN / 2);
        ctx.draw(packer)?;
        ctx.draw_rect(layers.border, border);

        if self.draw_ports {
            for inst in &placed {
                for port in inst.ports() {
                    ctx.add_label(port.name().clone(), port.center(), port.layer());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pcell::layout::layers::LayerBoundBox;

    use super::*;
    use crate::tests::{setup_ctx, setup_layers};

    #[test]
    fn test_all_cells_packs_every_generator() {
        let ctx = setup_ctx();
        let layers = setup_layers();
        let inst = ctx
            .instantiate_layout::<AllCells>(&AllCellsParams::default())
            .unwrap();
        let cell = inst.cell();

        assert_eq!(cell.insts().count(), Registry::names().count() - 1);
        assert_eq!(cell.annotations().count(), 0);

        let border = cell.layer_bbox(layers.border).into_rect().unwrap();
        for child in cell.insts() {
            let brect = child.brect().unwrap();
            assert!(border.left() <= brect.left() - ALL_CELLS_SPACING);
            assert!(border.bottom() <= brect.bottom() - ALL_CELLS_SPACING);
            assert!(border.right() >= brect.right() + ALL_CELLS_SPACING);
            assert!(border.top() >= brect.top() + ALL_CELLS_SPACING);
        }
        assert_eq!(cell.bbox().into_rect(), Some(border));
    }

    #[test]
    fn test_all_cells_draws_port_labels() {
        let ctx = setup_ctx();
        let inst = ctx
            .instantiate_layout::<AllCells>(&AllCellsParams { draw_ports: true })
            .unwrap();
        let cell = inst.cell();
        let ports: usize = cell.insts().map(|child| child.ports().count()).sum();
        assert!(ports > 0);
        assert_eq!(cell.annotations().count(), ports);
    }
}
