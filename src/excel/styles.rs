//! Report cell formats

use crate::core::MetricUnit;
use rust_xlsxwriter::{Format, FormatAlign};

pub const CURRENCY_FORMAT: &str = "$#,##0";
pub const NUMBER_FORMAT: &str = "#,##0";
pub const PERCENT_FORMAT: &str = "0.00%";
/// Unrounded plan requirements
pub const EXACT_FORMAT: &str = "#,##0.00";

const TITLE_FILL: u32 = 0x2563EB;
const SECTION_FILL: u32 = 0x374151;
const TABLE_HEADER_FILL: u32 = 0x4B5563;
const BASE_FILL: u32 = 0x1F2937;
const STRIPE_FILL: u32 = 0x2D3748;
const LIGHT_TEXT: u32 = 0xE5E7EB;
const KEY_TEXT: u32 = 0xD1D5DB;
const ACCENT_TEXT: u32 = 0x60A5FA;
const GOOD_TEXT: u32 = 0x10B981;
const BAD_TEXT: u32 = 0xEF4444;
const NEUTRAL_TEXT: u32 = 0x6B7280;

pub fn num_format(unit: MetricUnit) -> &'static str {
    match unit {
        MetricUnit::Percent => PERCENT_FORMAT,
        MetricUnit::Currency => CURRENCY_FORMAT,
        MetricUnit::Days => NUMBER_FORMAT,
    }
}

/// Reusable formats for one workbook
pub struct ReportFormats {
    pub title: Format,
    pub section_header: Format,
    pub table_header: Format,
    pub final_label: Format,
    pub final_value: Format,
    /// Conditional formats for gap cells
    pub good_gap: Format,
    pub bad_gap: Format,
    pub neutral_gap: Format,
}

impl ReportFormats {
    pub fn new() -> Self {
        let title = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_font_color(0xFFFFFF)
            .set_background_color(TITLE_FILL)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let section_header = Format::new()
            .set_bold()
            .set_font_size(12)
            .set_font_color(0xFFFFFF)
            .set_background_color(SECTION_FILL)
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter);

        let table_header = Format::new()
            .set_bold()
            .set_font_color(LIGHT_TEXT)
            .set_background_color(TABLE_HEADER_FILL)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let final_label = Format::new()
            .set_bold()
            .set_font_size(12)
            .set_font_color(ACCENT_TEXT)
            .set_background_color(BASE_FILL)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let final_value = Format::new()
            .set_bold()
            .set_font_size(24)
            .set_font_color(0xFFFFFF)
            .set_background_color(BASE_FILL)
            .set_num_format(NUMBER_FORMAT)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        Self {
            title,
            section_header,
            table_header,
            final_label,
            final_value,
            good_gap: Format::new().set_bold().set_font_color(GOOD_TEXT),
            bad_gap: Format::new().set_bold().set_font_color(BAD_TEXT),
            neutral_gap: Format::new().set_font_color(NEUTRAL_TEXT),
        }
    }

    /// Bold label in column A; odd rows are striped
    pub fn key_cell(&self, index: usize) -> Format {
        Self::row_base(index).set_bold().set_font_color(KEY_TEXT)
    }

    pub fn value_cell(&self, index: usize, num_format: Option<&str>) -> Format {
        let format = Self::row_base(index).set_font_color(LIGHT_TEXT);
        match num_format {
            Some(num_format) => format.set_num_format(num_format),
            None => format,
        }
    }

    fn row_base(index: usize) -> Format {
        let fill = if index % 2 == 1 { STRIPE_FILL } else { BASE_FILL };
        Format::new()
            .set_background_color(fill)
            .set_align(FormatAlign::VerticalCenter)
    }
}

impl Default for ReportFormats {
    fn default() -> Self {
        Self::new()
    }
}
