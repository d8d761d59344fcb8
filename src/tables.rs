//! Process-wide tables.

use crate::decoder::{DispatchConfig, DispatchTable};
use crate::error::Error;
use crate::formatter::{TemplateConfig, TemplateTable};
use log::error;
use once_cell::sync::OnceCell;

/// Both tables built from one pair of payloads.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Tables {
    pub dispatch: DispatchTable,
    pub templates: TemplateTable,
}

impl Tables {
    pub fn build(
        decoder: &[u8],
        dispatch: DispatchConfig,
        formatter: &[u8],
        templates: TemplateConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            dispatch: DispatchTable::from_bytes(decoder, dispatch)?,
            templates: TemplateTable::from_bytes(formatter, templates)?,
        })
    }
}

/// Tables built on first use.
///
/// Concurrent first uses are serialized and the payloads are deserialized exactly once.
/// A failed build is not cached, the next call builds again and fails the same way.
///
/// # Examples
///
/// ```
/// # use x86_tables::decoder::DispatchConfig;
/// # use x86_tables::formatter::TemplateConfig;
/// # use x86_tables::LazyTables;
/// static DECODER: &[u8] = &[0x01, 0x00, 0xed, 0x1c, 0x00, 0x00, 0x00];
/// static FORMATTER: &[u8] = &[0x01, 0x01, 0xed, 0x1c, 0x05, 0x01, 0x00];
/// static TABLES: LazyTables = LazyTables::new(
///     DECODER,
///     DispatchConfig::new(1, 1),
///     FORMATTER,
///     TemplateConfig::new(1),
/// );
///
/// let tables = TABLES.get()?;
/// assert_eq!(tables.dispatch.slot_count(), 1);
/// assert_eq!(tables.templates.len(), 1);
/// # Ok::<(), x86_tables::Error>(())
/// ```
pub struct LazyTables {
    decoder: &'static [u8],
    dispatch: DispatchConfig,
    formatter: &'static [u8],
    templates: TemplateConfig,
    cell: OnceCell<Tables>,
}

impl LazyTables {
    pub const fn new(
        decoder: &'static [u8],
        dispatch: DispatchConfig,
        formatter: &'static [u8],
        templates: TemplateConfig,
    ) -> Self {
        Self {
            decoder,
            dispatch,
            formatter,
            templates,
            cell: OnceCell::new(),
        }
    }

    /// Returns the tables, building them if this is the first use.
    pub fn get(&self) -> Result<&Tables, Error> {
        self.cell.get_or_try_init(|| {
            Tables::build(self.decoder, self.dispatch, self.formatter, self.templates)
                .map_err(|err| {
                    error!("failed to build x86 tables: {}", err);
                    err
                })
        })
    }

    /// Returns the tables if they are already built.
    pub fn get_built(&self) -> Option<&Tables> {
        self.cell.get()
    }
}
