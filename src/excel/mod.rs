//! Excel report export
//!
//! One styled worksheet per channel with live formulas, conditional
//! formatting on KPI gaps and a chained action plan.

mod cell_refs;
mod exporter;
mod formulas;
mod styles;

pub use cell_refs::{column_index_to_letter, CellAddress, CellKey, CellRefs};
pub use exporter::{build_report, report_file_name, ReportExporter, WORKBOOK_AUTHOR};
pub use styles::ReportFormats;
