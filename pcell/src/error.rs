use std::fmt::{Debug, Display};
use std::path::PathBuf;

use arcstr::ArcStr;
use pcgeom::ring::RingError;
use thiserror::Error;

use crate::component::{self, View};
use crate::layout::cell::PortError;
use crate::layout::error::LayoutError;
use crate::layout::layers::LayerInfoBuilderError;
use crate::vlsir::VlsirError;

pub type Result<T> = std::result::Result<T, PcellError>;

pub struct PcellError {
    pub(crate) source: ErrorSource,
    pub(crate) context: Vec<ErrorContext>,
}

impl PcellError {
    pub fn source(&self) -> &ErrorSource {
        &self.source
    }

    /// The chain of tasks that were running when the error occurred, innermost first.
    pub fn context(&self) -> &[ErrorContext] {
        &self.context
    }
}

impl std::error::Error for PcellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Display for PcellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Error:\n{}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for item in self.context.iter() {
                writeln!(f, "\twhile {}", item)?;
            }
        }
        Ok(())
    }
}

impl Debug for PcellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for (i, item) in self.context.iter().enumerate() {
                writeln!(f, "\t{}: {:?}", i, item)?;
            }
        }
        Ok(())
    }
}

impl<T> From<T> for PcellError
where
    T: Into<ErrorSource>,
{
    fn from(value: T) -> Self {
        Self {
            source: value.into(),
            context: Vec::new(),
        }
    }
}

impl PcellError {
    pub fn new(source: impl Into<ErrorSource>) -> Self {
        Self {
            source: source.into(),
            context: Vec::new(),
        }
    }

    pub fn from_context(source: impl Into<ErrorSource>, ctx: impl Into<ErrorContext>) -> Self {
        Self {
            source: source.into(),
            context: vec![ctx.into()],
        }
    }

    pub fn with_context(mut self, ctx: impl Into<ErrorContext>) -> Self {
        self.context.push(ctx.into());
        self
    }

    #[inline]
    pub fn into_inner(self) -> ErrorSource {
        self.source
    }
}

#[inline]
pub fn with_err_context<T, E, C>(result: std::result::Result<T, E>, ctx: C) -> Result<T>
where
    C: FnOnce() -> ErrorContext,
    E: Into<PcellError>,
{
    result.map_err(|err| err.into().with_context(ctx()))
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorContext {
    GenComponent {
        name: ArcStr,
        type_name: ArcStr,
        view: View,
    },
    InitComponent {
        type_name: ArcStr,
    },
    CreateDir(PathBuf),
    CreateFile(PathBuf),
    ReadFile(PathBuf),
    Task(ArcStr),
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorContext::*;
        match self {
            GenComponent {
                name,
                type_name,
                view,
            } => write!(
                f,
                "generating {view} view of component {type_name} ({name})"
            ),
            InitComponent { type_name } => write!(f, "initializing component {type_name}"),
            CreateDir(path) => write!(f, "creating directory {path:?}"),
            CreateFile(path) => write!(f, "creating file {path:?}"),
            ReadFile(path) => write!(f, "reading file {path:?}"),
            Task(task) => write!(f, "{task}"),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorSource {
    #[error("error generating component: {0}")]
    Component(#[from] component::error::Error),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("invalid layout (enable logging for details): {0}")]
    InvalidLayout(String),

    #[error("error while generating layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("no such layer: {0}")]
    LayerNotFound(String),

    #[error("invalid layer metadata: {0}")]
    LayerInfo(#[from] LayerInfoBuilderError),

    #[error("no such cell: {0}")]
    CellNotFound(ArcStr),

    #[error("no such port: {0}")]
    PortNotFound(ArcStr),

    #[error("invalid pdk: {0}")]
    InvalidPdk(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing layer table: {0}")]
    CsvParsing(#[from] csv::Error),

    #[error("error parsing JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("error serializing parameters: {0}")]
    ParamSerialization(#[from] flexbuffers::SerializationError),

    #[error("error accessing layout port: {0}")]
    LayoutPort(#[from] PortError),

    #[error("invalid ring geometry: {0}")]
    Ring(#[from] RingError),

    #[error("invalid circuit metadata: {0}")]
    Vlsir(#[from] VlsirError),

    #[error("unexpected error: {0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("unexpected error: {0}")]
    Anyhow(#[from] anyhow::Error),
}
