pub mod error;
pub mod hash;
pub mod model;
pub mod package;
pub mod util;
pub mod wml;
pub mod xml;

pub use error::{Result, SdtError};

pub use model::{ContentElement, Image, Paragraph, PartTarget, Run, RunFormat, Table, TableCell, TableRow, Title};
pub use wml::{
    FallbackPolicy, InjectionPair, InjectionReport, InjectionSettings, LockType, SdtConfig, SdtDocument, SdtInfo,
    SdtType,
};
