//! Design-rule constants, in nanometres.

pub const CONTACT_SIZE: i64 = 220;
pub const CONTACT_SPACE: i64 = 280;
pub const CONTACT_COMP_ENCLOSURE: i64 = 70;
pub const M1_CONTACT_ENCLOSURE: i64 = 60;
pub const M1_MIN_WIDTH: i64 = 230;

pub const VIA_SIZE: i64 = 260;
pub const VIA_SPACE: i64 = 260;
pub const METAL_VIA_ENCLOSURE: i64 = 60;

/// Enclosure of comp by the nplus/pplus implants.
pub const COMP_IMPLANT_ENCLOSURE: i64 = 160;
/// Spacing between the anode and cathode comp of a junction diode.
pub const COMP_SPACE: i64 = 480;
pub const DUALGATE_COMP_ENCLOSURE: i64 = 240;
pub const DUALGATE_DNWELL_ENCLOSURE: i64 = 500;

pub const PCMPGR_DNWELL_ENCLOSURE: i64 = 2_500;
pub const GUARD_RING_WIDTH: i64 = 360;

pub const LVPWELL_PCMP_ENCLOSURE: i64 = 160;
pub const LVPWELL_NCMP_ENCLOSURE: i64 = 600;
pub const DNWELL_LVPWELL_ENCLOSURE: i64 = 2_500;

pub const NWELL_NCMP_ENCLOSURE: i64 = 120;
pub const NWELL_PCMP_ENCLOSURE: i64 = 430;
pub const DNWELL_NWELL_ENCLOSURE: i64 = 500;

/// Enclosure of the anode comp by its well in the well diodes.
pub const WELL_COMP_ENCLOSURE: i64 = 160;

/// Below `2 * cw` plus this margin, the dnwell diode draws its cathode as a plain rectangle.
pub const DW2PS_RING_MARGIN: i64 = 320;
pub const DNWELL_NCMP_ENCLOSURE: i64 = 620;
pub const DNWELL_NCMP_ENCLOSURE_HV: i64 = 660;

pub const SC_COMP_SPACE: i64 = 280;
pub const SC_MARKER_ENCLOSURE: i64 = 160;
pub const SC_NPLUS_ENCLOSURE: i64 = 30;
pub const DNWELL_SC_ANODE_ENCLOSURE: i64 = 1_400;
pub const SC_BAR_WIDTH: i64 = 230;

/// Spacing between cells placed by `all_cells`.
pub const ALL_CELLS_SPACING: i64 = 10_000;
/// Margin added to the packed matrix to size the border.
pub const ALL_CELLS_BORDER_MARGIN: i64 = 20_000;
