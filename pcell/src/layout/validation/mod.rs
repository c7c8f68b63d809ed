//! Consistency checks run on every generated cell.

use std::collections::HashSet;
use std::fmt::Display;

use arcstr::ArcStr;

use super::cell::{Cell, CellKey};
use crate::log::Log;
use crate::validation::{Empty, ValidatorOutput};
use crate::vlsir::VlsirError;

/// Validates a layout cell.
pub fn validate_cell(cell: &Cell) -> LayoutValidatorOutput {
    LayoutValidator { cell }.validate()
}

pub struct LayoutValidator<'a> {
    cell: &'a Cell,
}

pub type LayoutValidatorOutput = ValidatorOutput<Empty, Finding, Finding, Empty>;

/// The cell a finding refers to.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Location {
    cell: CellKey,
    cell_name: ArcStr,
}

impl Location {
    pub fn new(cell: CellKey, cell_name: impl Into<ArcStr>) -> Self {
        Self {
            cell,
            cell_name: cell_name.into(),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell {}", self.cell_name)
    }
}

/// A warning or error raised while validating a cell.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Finding {
    loc: Location,
    cause: Cause,
    severity: Severity,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
enum Severity {
    Warning,
    Error,
}

/// What a finding is about.
#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Cause {
    /// Two ports share a name.
    DuplicatePort(ArcStr),
    /// A port has a non-positive width.
    InvalidPortWidth(ArcStr),
    /// The circuit metadata does not match the cell's ports.
    Vlsir(VlsirError),
}

impl Finding {
    pub fn cause(&self) -> &Cause {
        &self.cause
    }
}

impl Log for Finding {
    fn log(&self) {
        use crate::log::{error, warn};
        match self.severity {
            Severity::Warning => warn!("{self}"),
            Severity::Error => error!("{self}"),
        }
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Cause::DuplicatePort(name) => write!(f, "duplicate port {name} in {}", self.loc),
            Cause::InvalidPortWidth(name) => {
                write!(f, "port {name} has non-positive width in {}", self.loc)
            }
            Cause::Vlsir(err) => write!(f, "inconsistent circuit metadata in {}: {err}", self.loc),
        }
    }
}

impl<'a> LayoutValidator<'a> {
    fn validate(&self) -> LayoutValidatorOutput {
        let mut output = LayoutValidatorOutput::default();
        self.validate_ports(&mut output);
        self.validate_vlsir(&mut output);
        output
    }

    fn loc(&self) -> Location {
        Location::new(self.cell.id(), self.cell.name())
    }

    fn push(&self, output: &mut LayoutValidatorOutput, cause: Cause, severity: Severity) {
        let finding = Finding {
            loc: self.loc(),
            cause,
            severity,
        };
        match severity {
            Severity::Warning => output.warnings.push(finding),
            Severity::Error => output.errors.push(finding),
        }
    }

    fn validate_ports(&self, output: &mut LayoutValidatorOutput) {
        let mut seen = HashSet::new();
        for port in self.cell.ports() {
            if !seen.insert(port.name()) {
                self.push(output, Cause::DuplicatePort(port.name().clone()), Severity::Error);
            }
            if port.width() <= 0 {
                self.push(
                    output,
                    Cause::InvalidPortWidth(port.name().clone()),
                    Severity::Error,
                );
            }
        }
    }

    /// Checks `port_order` and `port_map` against the cell's ports.
    fn validate_vlsir(&self, output: &mut LayoutValidatorOutput) {
        let Some(info) = self.cell.vlsir() else {
            return;
        };
        for issue in info.validate(self.cell.ports().map(|p| p.name().as_str())) {
            let severity = if issue.is_warning() {
                Severity::Warning
            } else {
                Severity::Error
            };
            self.push(output, Cause::Vlsir(issue), severity);
        }
    }
}

#[cfg(test)]
mod tests {
    use pcgeom::Point;

    use super::*;
    use crate::layout::cell::{Orientation, Port};
    use crate::layout::layers::LayerKey;
    use crate::vlsir::VlsirInfo;

    fn port(name: &str) -> Port {
        Port::new(name, Point::zero(), 100, Orientation::R0, LayerKey::default())
    }

    #[test]
    fn test_dangling_port_order_is_a_warning() {
        let mut cell = Cell::new(CellKey::default());
        cell.add_port(port("anode")).expect("failed to add port");
        cell.set_metadata(VlsirInfo::diode("dnwps", 0.1, 0.1));

        let output = validate_cell(&cell);
        assert!(!output.has_errors());
        assert_eq!(output.warnings().len(), 1);
        assert_eq!(
            output.warnings()[0].cause(),
            &Cause::Vlsir(VlsirError::DanglingPortOrder(arcstr::literal!("cathode")))
        );
    }

    #[test]
    fn test_empty_port_order_is_an_error() {
        let mut cell = Cell::new(CellKey::default());
        cell.add_port(port("anode")).expect("failed to add port");
        let mut info = VlsirInfo::diode("np_3p3", 0.1, 0.1);
        info.port_order.clear();
        cell.set_metadata(info);

        let output = validate_cell(&cell);
        assert!(output.has_errors());
        assert!(output.first_error().contains("port_order"));
    }

    #[test]
    fn test_consistent_cell_passes() {
        let mut cell = Cell::new(CellKey::default());
        cell.add_port(port("anode")).expect("failed to add port");
        cell.add_port(port("cathode")).expect("failed to add port");
        cell.set_metadata(VlsirInfo::diode("np_3p3", 0.1, 0.1));

        let output = validate_cell(&cell);
        assert!(!output.has_errors());
        assert!(output.warnings().is_empty());
    }
}
