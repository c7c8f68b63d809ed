use std::sync::Arc;

use gds21::{GdsElement, GdsLibrary};
use gf180mcu::diode::dw2ps::TapShape;
use gf180mcu::diode::*;
use gf180mcu::Voltage;
use pcell::error::ErrorSource;
use pcell::layout::cell::Orientation;
use pcell::layout::layers::LayerBoundBox;
use pcgeom::ring::Ring;
use pcgeom::{Point, Rect};
use tempdir::TempDir;

mod common;
use common::{layers, rects, rings, setup_ctx};

fn port_names(cell: &pcell::layout::cell::Cell) -> Vec<&str> {
    cell.ports().map(|port| port.name().as_str()).collect()
}

fn in_ring(ring: Ring, p: Point) -> bool {
    let (outer, inner) = (ring.outer(), ring.inner());
    let inside = |r: Rect| r.left() < p.x && p.x < r.right() && r.bottom() < p.y && p.y < r.top();
    inside(outer) && !inside(inner)
}

#[test]
fn test_nd2ps_default() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let inst = ctx
        .instantiate_layout::<DiodeNd2ps>(&DiodeNd2psParams::default())
        .unwrap();
    let cell = inst.cell();

    let comps = rects(cell.shapes_on(layers.comp));
    assert_eq!(comps.len(), 2);
    assert!(comps.contains(&Rect::new(Point::zero(), Point::new(100, 100))));
    assert!(comps.contains(&Rect::new(Point::new(-580, 0), Point::new(-480, 100))));

    assert_eq!(
        cell.layer_bbox(layers.diode_mk).into_rect(),
        Some(Rect::new(Point::zero(), Point::new(100, 100)))
    );
    assert!(cell.layer_bbox(layers.dualgate).is_empty());
    assert!(cell.layer_bbox(layers.dnwell).is_empty());

    assert_eq!(port_names(cell), ["anode", "cathode"]);
    let anode = cell.port("anode").unwrap();
    assert_eq!(anode.center(), Point::new(50, 50));
    assert_eq!(anode.width(), 100);
    assert_eq!(anode.orientation(), Orientation::R0);
    let cathode = cell.port("cathode").unwrap();
    assert_eq!(cathode.center(), Point::new(-530, 50));
    assert_eq!(cathode.orientation(), Orientation::R180);

    let vlsir = cell.vlsir().unwrap();
    assert_eq!(vlsir.model, "np_3p3");
    assert_eq!(vlsir.port_order, ["anode", "cathode"]);
    assert_eq!(vlsir.spice_type(), "DIODE");
}

#[test]
fn test_nd2ps_high_voltage() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = DiodeNd2psParams {
        volt: Voltage::V5p6,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<DiodeNd2ps>(&params).unwrap();
    let cell = inst.cell();

    assert_eq!(
        cell.layer_bbox(layers.dualgate).into_rect(),
        Some(Rect::new(Point::new(-820, -240), Point::new(340, 340)))
    );
    assert_eq!(cell.vlsir().unwrap().model, "np_6p0");
}

#[test]
fn test_nd2ps_guarded_deep_nwell() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = DiodeNd2psParams {
        deepnwell: true,
        pcmpgr: true,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<DiodeNd2ps>(&params).unwrap();
    let cell = inst.cell();

    let lvpwell = cell.layer_bbox(layers.lvpwell).into_rect().unwrap();
    assert_eq!(
        lvpwell,
        Rect::new(Point::new(-740, -600), Point::new(700, 700))
    );
    let dnwell = cell.layer_bbox(layers.dnwell).into_rect().unwrap();
    assert_eq!(dnwell, lvpwell.expand(2_500));

    let comp_rings = rings(cell.shapes_on(layers.comp));
    assert_eq!(comp_rings.len(), 1);
    assert_eq!(comp_rings[0].inner(), dnwell.expand(2_500));
    assert_eq!(comp_rings[0].outer(), dnwell.expand(2_600));
    assert_eq!(rings(cell.shapes_on(layers.pplus)).len(), 1);
    assert_eq!(rings(cell.shapes_on(layers.metal1())).len(), 1);

    // Contacts are centred in the ring on all four sides.
    let ring = comp_rings[0];
    let inner = ring.inner();
    let centres: Vec<Point> = rects(cell.shapes_on(layers.contact))
        .into_iter()
        .map(|cut| cut.center())
        .filter(|&p| in_ring(ring, p))
        .collect();
    let sides = [
        centres.iter().any(|p| p.y < inner.bottom()),
        centres.iter().any(|p| p.y > inner.top()),
        centres.iter().any(|p| p.x < inner.left()),
        centres.iter().any(|p| p.x > inner.right()),
    ];
    assert_eq!(sides, [true; 4]);

    assert_eq!(port_names(cell), ["anode", "cathode"]);
}

#[test]
fn test_guard_ring_needs_deep_nwell() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = DiodeNd2psParams {
        pcmpgr: true,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<DiodeNd2ps>(&params).unwrap();
    assert!(rings(inst.cell().shapes_on(layers.comp)).is_empty());
    assert!(inst.cell().layer_bbox(layers.dnwell).is_empty());
}

#[test]
fn test_pd2nw_wells() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = DiodePd2nwParams {
        deepnwell: true,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<DiodePd2nw>(&params).unwrap();
    let cell = inst.cell();

    let nwell = cell.layer_bbox(layers.nwell).into_rect().unwrap();
    assert_eq!(nwell, Rect::new(Point::new(-700, -430), Point::new(530, 530)));
    assert_eq!(
        cell.layer_bbox(layers.dnwell).into_rect(),
        Some(nwell.expand(500))
    );
    assert_eq!(cell.port("anode").unwrap().center(), Point::new(50, 50));
    assert_eq!(cell.port("cathode").unwrap().center(), Point::new(-530, 50));
    assert_eq!(cell.vlsir().unwrap().model, "pn_3p3");
}

#[test]
fn test_nw2ps_and_pw2dw_models() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);

    let params = DiodeNw2psParams {
        volt: Voltage::V5p6,
        ..Default::default()
    };
    let nw2ps = ctx.instantiate_layout::<DiodeNw2ps>(&params).unwrap();
    assert_eq!(nw2ps.cell().vlsir().unwrap().model, "nwp_6p0");
    assert_eq!(
        nw2ps.cell().layer_bbox(layers.nwell).into_rect(),
        Some(Rect::new(Point::new(-160, -160), Point::new(260, 260)))
    );

    let pw2dw = ctx
        .instantiate_layout::<DiodePw2dw>(&DiodePw2dwParams::default())
        .unwrap();
    let cell = pw2dw.cell();
    assert_eq!(cell.vlsir().unwrap().model, "dnwpw");
    let lvpwell = cell.layer_bbox(layers.lvpwell).into_rect().unwrap();
    assert_eq!(
        cell.layer_bbox(layers.dnwell).into_rect(),
        Some(lvpwell.expand(2_500))
    );
    assert_eq!(port_names(cell), ["anode", "cathode"]);
}

#[test]
fn test_dw2ps_small_tap() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = DiodeDw2psParams {
        wa: 0.05,
        la: 0.05,
        cw: 0.1,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<DiodeDw2ps>(&params).unwrap();
    let cell = inst.cell();

    assert!(rings(cell.shapes_on(layers.comp)).is_empty());
    assert_eq!(
        rects(cell.shapes_on(layers.comp)),
        [Rect::new(Point::zero(), Point::new(50, 50))]
    );
    assert_eq!(
        cell.layer_bbox(layers.dnwell).into_rect(),
        Some(Rect::new(Point::new(-620, -620), Point::new(670, 670)))
    );

    // The substrate terminal is only reachable through a guard ring.
    assert_eq!(port_names(cell), ["anode"]);
    assert_eq!(cell.vlsir().unwrap().port_order, ["anode", "cathode"]);
}

#[test]
fn test_dw2ps_ring_tap() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = DiodeDw2psParams {
        wa: 1.0,
        la: 1.0,
        cw: 0.1,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<DiodeDw2ps>(&params).unwrap();
    let cell = inst.cell();

    let comp_rings = rings(cell.shapes_on(layers.comp));
    assert_eq!(comp_rings.len(), 1);
    let ring = comp_rings[0];
    assert_eq!(ring.outer().width(), 1_000);
    assert_eq!(ring.outer().height(), 1_000);
    assert_eq!(ring.inner().width(), 800);
    assert_eq!(ring.inner().height(), 800);
    assert!(rects(cell.shapes_on(layers.comp)).is_empty());
    assert_eq!(rings(cell.shapes_on(layers.nplus)).len(), 1);

    let cuts = rects(cell.shapes_on(layers.contact));
    assert!(cuts.len() >= 4);
    for cut in &cuts {
        assert!(in_ring(ring, cut.center()), "contact {cut:?} is off the ring");
    }

    let anode = cell.port("anode").unwrap();
    assert!(anode.center().x < ring.inner().left());
}

#[test]
fn test_dw2ps_guard_ring_adds_cathode() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = DiodeDw2psParams {
        pcmpgr: true,
        volt: Voltage::V5p6,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<DiodeDw2ps>(&params).unwrap();
    let cell = inst.cell();

    assert_eq!(port_names(cell), ["anode", "cathode"]);
    let dnwell = cell.layer_bbox(layers.dnwell).into_rect().unwrap();
    assert_eq!(dnwell, Rect::new(Point::new(-660, -660), Point::new(760, 760)));
    assert_eq!(
        cell.layer_bbox(layers.dualgate).into_rect(),
        Some(dnwell.expand(500))
    );
    let cathode = cell.port("cathode").unwrap();
    assert!(cathode.center().x < dnwell.left() - 2_500);
    assert_eq!(cathode.width(), 100);
}

#[test]
fn test_dw2ps_ring_threshold_fills_implant() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = DiodeDw2psParams {
        wa: 0.52,
        la: 0.52,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<DiodeDw2ps>(&params).unwrap();
    let cell = inst.cell();

    let comp_rings = rings(cell.shapes_on(layers.comp));
    assert_eq!(comp_rings.len(), 1);
    let ring = comp_rings[0];
    assert_eq!(ring.inner().width(), 320);
    assert!(rings(cell.shapes_on(layers.nplus)).is_empty());
    assert!(rects(cell.shapes_on(layers.nplus)).contains(&ring.outer().expand(160)));

    let dir = TempDir::new("gf180mcu").unwrap();
    let path = dir.path().join("dw2ps_threshold.gds");
    ctx.write_layout::<DiodeDw2ps>(&params, &path).unwrap();
    let lib = GdsLibrary::load(&path).unwrap();
    for strukt in &lib.structs {
        for elem in &strukt.elems {
            if let GdsElement::GdsBoundary(b) = elem {
                let (p0, p1) = (&b.xy[0], &b.xy[2]);
                assert!(
                    p0.x != p1.x && p0.y != p1.y,
                    "zero-area boundary on layer {} in {}",
                    b.layer,
                    strukt.name
                );
            }
        }
    }
}

#[test]
fn test_dw2ps_tap_shape_accessor() {
    let ctx = setup_ctx();
    let params = DiodeDw2psParams {
        wa: 0.52,
        la: 0.52,
        ..Default::default()
    };
    let diode = <DiodeDw2ps as pcell::component::Component>::new(&params, &ctx).unwrap();
    assert_eq!(diode.tap_shape(), TapShape::Ring);
}

#[test]
fn test_sc_diode_fingers() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = ScDiodeParams {
        m: 3,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<ScDiode>(&params).unwrap();
    let cell = inst.cell();

    let children: Vec<_> = cell.insts().collect();
    let cathodes: Vec<_> = children
        .iter()
        .filter(|inst| inst.cell().name() == "sc_cathode_strap")
        .collect();
    let anodes: Vec<_> = children
        .iter()
        .filter(|inst| inst.cell().name() == "sc_anode_strap")
        .collect();
    assert_eq!(cathodes.len(), 4);
    assert_eq!(anodes.len(), 3);
    assert!(cathodes
        .windows(2)
        .all(|w| Arc::ptr_eq(w[0].cell(), w[1].cell())));

    // Fingers alternate at a fixed pitch.
    let pitch = 100 + 100 + 2 * 280;
    for (i, inst) in cathodes.iter().enumerate() {
        assert_eq!(inst.loc(), Point::new(i as i64 * pitch, 0));
    }

    let cathode = cell.port("cathode").unwrap();
    assert!(cathode.center().y > cell.layer_bbox(layers.comp).into_rect().unwrap().top());
    let anode = cell.port("anode").unwrap();
    assert!(anode.center().y < 0);
    assert_eq!(port_names(cell), ["anode", "cathode"]);

    let vlsir = cell.vlsir().unwrap();
    assert_eq!(vlsir.to_json()["params"]["m"], 3);
}

#[test]
fn test_sc_diode_guard_ring() {
    let ctx = setup_ctx();
    let layers = layers(&ctx);
    let params = ScDiodeParams {
        pcmpgr: true,
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<ScDiode>(&params).unwrap();
    let cell = inst.cell();
    let dnwell = cell.layer_bbox(layers.dnwell).into_rect().unwrap();
    let comp_rings = rings(cell.shapes_on(layers.comp));
    assert_eq!(comp_rings.len(), 1);
    assert_eq!(comp_rings[0].inner(), dnwell.expand(2_500));
}

#[test]
fn test_labels() {
    let ctx = setup_ctx();
    let params = DiodePd2nwParams {
        label: true,
        p_label: "vp".to_string(),
        n_label: "vn".to_string(),
        ..Default::default()
    };
    let inst = ctx.instantiate_layout::<DiodePd2nw>(&params).unwrap();
    let cell = inst.cell();
    let texts: Vec<_> = cell.annotations().map(|a| a.string.as_str()).collect();
    assert_eq!(texts.len(), 2);
    assert!(texts.contains(&"vp"));
    assert!(texts.contains(&"vn"));

    let unlabelled = ctx
        .instantiate_layout::<DiodePd2nw>(&DiodePd2nwParams {
            p_label: "vp".to_string(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(unlabelled.cell().annotations().count(), 0);
}

#[test]
fn test_deterministic() {
    let params = DiodeNd2psParams {
        deepnwell: true,
        pcmpgr: true,
        volt: Voltage::V5p6,
        ..Default::default()
    };
    let ctx_a = setup_ctx();
    let ctx_b = setup_ctx();
    let a = ctx_a.instantiate_layout::<DiodeNd2ps>(&params).unwrap();
    let b = ctx_b.instantiate_layout::<DiodeNd2ps>(&params).unwrap();

    let la = layers(&ctx_a);
    let lb = layers(&ctx_b);
    for (ka, kb) in [
        (la.comp, lb.comp),
        (la.contact, lb.contact),
        (la.metal1(), lb.metal1()),
        (la.pplus, lb.pplus),
        (la.dnwell, lb.dnwell),
        (la.dualgate, lb.dualgate),
    ] {
        let sa: Vec<_> = a.cell().shapes_on(ka).collect();
        let sb: Vec<_> = b.cell().shapes_on(kb).collect();
        assert_eq!(sa, sb);
    }
    assert_eq!(
        a.cell().to_dict(&ctx_a.layers()).unwrap(),
        b.cell().to_dict(&ctx_b.layers()).unwrap()
    );
}

#[test]
fn test_invalid_params_rejected() {
    let ctx = setup_ctx();

    let la_zero = DiodeNd2psParams {
        la: 0.0,
        ..Default::default()
    };
    let err = ctx.instantiate_layout::<DiodeNd2ps>(&la_zero).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::Component(_)));

    let wa_negative = DiodePd2nwParams {
        wa: -0.2,
        ..Default::default()
    };
    assert!(ctx.instantiate_layout::<DiodePd2nw>(&wa_negative).is_err());

    let cw_nan = DiodeNw2psParams {
        cw: f64::NAN,
        ..Default::default()
    };
    assert!(ctx.instantiate_layout::<DiodeNw2ps>(&cw_nan).is_err());

    let no_fingers = ScDiodeParams {
        m: 0,
        ..Default::default()
    };
    let err = ctx.instantiate_layout::<ScDiode>(&no_fingers).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::Component(_)));
}
