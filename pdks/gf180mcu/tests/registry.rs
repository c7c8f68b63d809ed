use gf180mcu::all_cells::{AllCells, AllCellsParams};
use gf180mcu::constants::ALL_CELLS_SPACING;
use gf180mcu::registry::Registry;
use pcell::layout::layers::LayerBoundBox;
use serde_json::{json, Value};

mod common;
use common::{layers, setup_ctx};

#[test]
fn test_every_cell_generates_at_defaults() {
    let ctx = setup_ctx();
    for name in Registry::names() {
        let inst = Registry::instantiate(&ctx, name, &Value::Null)
            .unwrap_or_else(|err| panic!("failed to generate {name}: {err}"));
        assert_eq!(inst.cell().name(), name);
        assert!(inst.brect().is_some(), "{name} is empty");
    }
}

#[test]
fn test_diode_ports() {
    let ctx = setup_ctx();
    for name in Registry::names().filter(|name| name.contains("diode")) {
        let inst = Registry::instantiate(&ctx, name, &json!({})).unwrap();
        let mut ports: Vec<_> = inst.cell().ports().map(|p| p.name().to_string()).collect();
        ports.sort();
        if name == "diode_dw2ps" {
            assert_eq!(ports, ["anode"]);
        } else {
            assert_eq!(ports, ["anode", "cathode"], "unexpected ports on {name}");
        }

        let vlsir = inst.cell().vlsir().unwrap();
        assert_eq!(vlsir.spice_type(), "DIODE");
        assert_eq!(vlsir.port_order, ["anode", "cathode"]);
    }

    let inst = Registry::instantiate(&ctx, "diode_dw2ps", &json!({ "pcmpgr": true })).unwrap();
    assert!(inst.cell().port("cathode").is_ok());
}

#[test]
fn test_guard_ring_port() {
    let ctx = setup_ctx();
    let inst = Registry::instantiate(&ctx, "pcmpgr_gen", &json!({ "grw": 0.5 })).unwrap();
    let ports: Vec<_> = inst.cell().ports().collect();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].name(), "guardring");
    assert_eq!(ports[0].width(), 4_000 + 2 * (2_500 + 500));
    assert!(inst.cell().vlsir().is_none());
}

#[test]
fn test_all_cells_border() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let inst = ctx
        .instantiate_layout::<AllCells>(&AllCellsParams::default())
        .unwrap();
    let cell = inst.cell();

    let names: Vec<_> = cell.insts().map(|inst| inst.cell().name().to_string()).collect();
    let expected: Vec<_> = Registry::names()
        .filter(|&name| name != "all_cells")
        .map(str::to_string)
        .collect();
    assert_eq!(names, expected);

    let border = cell.layer_bbox(layers.border).into_rect().unwrap();
    for child in cell.insts() {
        let brect = child.brect().unwrap();
        assert!(border.contains_rect(&brect.expand(ALL_CELLS_SPACING)));
    }
    for (i, a) in cell.insts().enumerate() {
        for b in cell.insts().skip(i + 1) {
            let (a, b) = (a.brect().unwrap(), b.brect().unwrap());
            let apart = a.right() <= b.left()
                || b.right() <= a.left()
                || a.top() <= b.bottom()
                || b.top() <= a.bottom();
            assert!(apart, "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn test_all_cells_from_registry() {
    let ctx = setup_ctx();
    let inst = Registry::instantiate(&ctx, "all_cells", &json!({ "draw_ports": true })).unwrap();
    let ports: usize = inst.cell().insts().map(|child| child.ports().count()).sum();
    assert_eq!(inst.cell().annotations().count(), ports);
}
