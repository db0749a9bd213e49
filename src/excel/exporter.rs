//! Styled multi-sheet workbook with live formulas
//!
//! One worksheet per channel. Inputs are written as plain values, every
//! derived cell is a formula over those inputs, and each formula also
//! carries the engine's result so viewers that never recalculate still
//! show the right numbers.

use super::cell_refs::{CellAddress, CellKey, CellRefs};
use super::formulas;
use super::styles::{self, ReportFormats, CURRENCY_FORMAT, EXACT_FORMAT, NUMBER_FORMAT};
use crate::core::{
    compute_kpis, gap_analysis, plan_from_revenue_goal, plan_steps, round_up_count, ActionPlan,
    MetricUnit,
};
use crate::error::{RoadmapError, RoadmapResult};
use crate::types::{AppState, Channel, PerformanceField, SettingsField, Stage, TargetField};
use chrono::NaiveDate;
use rust_xlsxwriter::{
    ConditionalFormatCell, ConditionalFormatCellRule, DocProperties, Format, Formula, Note,
    Workbook, Worksheet, XlsxError,
};
use std::path::Path;
use tracing::{debug, info};

pub const WORKBOOK_AUTHOR: &str = "Outreach Roadmap";
const PERCENT_NOTE: &str = "Enter as a whole number (e.g., 35 for 35%)";
const COLUMN_WIDTHS: [f64; 4] = [35.0, 20.0, 20.0, 20.0];
const LAST_COL: u16 = 3;

/// `OutreachRoadmap_FullPlan_YYYY-MM-DD.xlsx`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("OutreachRoadmap_FullPlan_{}.xlsx", date.format("%Y-%m-%d"))
}

/// Assemble the report on a blocking task.
///
/// The snapshot is moved in, so later edits to the caller's state cannot
/// leak into a report that is already being built.
pub async fn build_report(state: AppState) -> RoadmapResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || ReportExporter::new(state).to_buffer())
        .await
        .map_err(|e| RoadmapError::Export(format!("report task failed: {}", e)))?
}

fn xlsx_err(action: &'static str) -> impl Fn(XlsxError) -> RoadmapError {
    move |e| RoadmapError::Export(format!("Failed to {}: {}", action, e))
}

pub struct ReportExporter {
    state: AppState,
}

impl ReportExporter {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Workbook bytes (xlsx)
    pub fn to_buffer(&self) -> RoadmapResult<Vec<u8>> {
        let mut workbook = self.build_workbook()?;
        workbook
            .save_to_buffer()
            .map_err(xlsx_err("serialize workbook"))
    }

    pub fn export(&self, output_path: &Path) -> RoadmapResult<()> {
        let mut workbook = self.build_workbook()?;
        workbook
            .save(output_path)
            .map_err(xlsx_err("save Excel file"))?;
        info!(path = %output_path.display(), "exported report");
        Ok(())
    }

    fn build_workbook(&self) -> RoadmapResult<Workbook> {
        let mut workbook = Workbook::new();
        workbook.set_properties(&DocProperties::new().set_author(WORKBOOK_AUTHOR));
        let formats = ReportFormats::new();

        for channel in Channel::ALL {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(channel.sheet_name())
                .map_err(xlsx_err("set worksheet name"))?;
            let refs = SheetWriter::new(worksheet, &formats, &self.state, channel).write()?;
            debug!(sheet = %channel.sheet_name(), cells = refs.len(), "wrote channel sheet");
        }

        Ok(workbook)
    }
}

/// Writes one channel sheet top to bottom, tracking referenced cells
struct SheetWriter<'a> {
    ws: &'a mut Worksheet,
    formats: &'a ReportFormats,
    state: &'a AppState,
    channel: Channel,
    refs: CellRefs,
    row: u32,
}

impl<'a> SheetWriter<'a> {
    fn new(
        ws: &'a mut Worksheet,
        formats: &'a ReportFormats,
        state: &'a AppState,
        channel: Channel,
    ) -> Self {
        Self {
            ws,
            formats,
            state,
            channel,
            refs: CellRefs::new(),
            row: 0,
        }
    }

    fn write(mut self) -> RoadmapResult<CellRefs> {
        self.title()?;
        self.settings()?;
        self.performance()?;
        self.targets()?;
        self.gap_analysis()?;
        let (plan, final_exact) = self.action_plan()?;
        self.final_action(&plan, &final_exact)?;

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            self.ws
                .set_column_width(col as u16, *width)
                .map_err(xlsx_err("set column width"))?;
        }
        Ok(self.refs)
    }

    fn title(&mut self) -> RoadmapResult<()> {
        self.ws
            .merge_range(self.row, 0, self.row, LAST_COL, self.channel.name(), &self.formats.title)
            .map_err(xlsx_err("write title"))?;
        self.ws
            .set_row_height(self.row, 30)
            .map_err(xlsx_err("set row height"))?;
        self.row += 2;
        Ok(())
    }

    fn section(&mut self, heading: &str) -> RoadmapResult<()> {
        self.ws
            .merge_range(
                self.row,
                0,
                self.row,
                LAST_COL,
                heading,
                &self.formats.section_header,
            )
            .map_err(xlsx_err("write section header"))?;
        self.row += 1;
        Ok(())
    }

    fn table_header(&mut self, labels: &[&str]) -> RoadmapResult<()> {
        for (col, label) in labels.iter().enumerate() {
            self.ws
                .write_string_with_format(self.row, col as u16, *label, &self.formats.table_header)
                .map_err(xlsx_err("write table header"))?;
        }
        self.row += 1;
        Ok(())
    }

    fn label(&mut self, index: usize, text: &str) -> RoadmapResult<()> {
        self.ws
            .write_string_with_format(self.row, 0, text, &self.formats.key_cell(index))
            .map_err(xlsx_err("write label"))?;
        Ok(())
    }

    /// Label in A, number in B; registers B under `key`
    fn input_row(
        &mut self,
        index: usize,
        key: CellKey,
        text: &str,
        value: f64,
        num_format: &str,
    ) -> RoadmapResult<()> {
        self.label(index, text)?;
        self.ws
            .write_number_with_format(
                self.row,
                1,
                value,
                &self.formats.value_cell(index, Some(num_format)),
            )
            .map_err(xlsx_err("write value"))?;
        self.refs.insert(key, CellAddress::new(self.row, 1));
        self.row += 1;
        Ok(())
    }

    fn formula_cell(
        &mut self,
        col: u16,
        formula: &str,
        cached: f64,
        format: &Format,
    ) -> RoadmapResult<()> {
        let formula = Formula::new(formula).set_result(cached.to_string());
        self.ws
            .write_formula_with_format(self.row, col, formula, format)
            .map_err(xlsx_err("write formula"))?;
        Ok(())
    }

    fn settings(&mut self) -> RoadmapResult<()> {
        self.section("Global Settings")?;
        let state = self.state;
        let settings = &state.program_settings;

        self.label(0, SettingsField::OfferName.label())?;
        self.ws
            .write_string_with_format(
                self.row,
                1,
                &settings.offer_name,
                &self.formats.value_cell(0, None),
            )
            .map_err(xlsx_err("write offer name"))?;
        self.refs.insert(
            CellKey::Setting(SettingsField::OfferName),
            CellAddress::new(self.row, 1),
        );
        self.row += 1;

        let (price, goal) = (settings.offer_price, settings.target_revenue_goal);
        self.input_row(
            1,
            CellKey::Setting(SettingsField::OfferPrice),
            SettingsField::OfferPrice.label(),
            price,
            CURRENCY_FORMAT,
        )?;
        self.input_row(
            2,
            CellKey::Setting(SettingsField::TargetRevenueGoal),
            SettingsField::TargetRevenueGoal.label(),
            goal,
            CURRENCY_FORMAT,
        )?;
        self.row += 1;
        Ok(())
    }

    fn performance(&mut self) -> RoadmapResult<()> {
        self.section("Current Performance Data")?;
        let perf = self.state.channel(self.channel).current_performance.clone();

        for (index, field) in PerformanceField::for_channel(self.channel).into_iter().enumerate() {
            self.input_row(
                index,
                CellKey::Performance(field),
                field.label(self.channel),
                field.get(&perf),
                NUMBER_FORMAT,
            )?;
        }
        self.row += 1;
        Ok(())
    }

    fn targets(&mut self) -> RoadmapResult<()> {
        self.section("Reference KPI Targets")?;
        let targets = self.state.channel(self.channel).reference_targets.clone();

        for (index, field) in TargetField::for_channel(self.channel).iter().enumerate() {
            let num_format = if *field == TargetField::AvgDealValue {
                CURRENCY_FORMAT
            } else {
                NUMBER_FORMAT
            };
            if field.is_percent() {
                let note = Note::new(PERCENT_NOTE).set_author(WORKBOOK_AUTHOR);
                self.ws
                    .insert_note(self.row, 1, &note)
                    .map_err(xlsx_err("add note"))?;
            }
            self.input_row(
                index,
                CellKey::Target(*field),
                field.label(),
                field.get(&targets),
                num_format,
            )?;
        }
        self.row += 1;
        Ok(())
    }

    fn gap_analysis(&mut self) -> RoadmapResult<()> {
        self.section("KPI Gap Analysis")?;
        self.table_header(&["Metric", "Current", "Target", "Gap"])?;

        let data = self.state.channel(self.channel);
        let kpis = compute_kpis(&self.state.program_settings, &data.current_performance, self.channel);
        let gaps = gap_analysis(&kpis, &data.reference_targets, self.channel);

        for (index, row) in gaps.iter().enumerate() {
            let unit = row.metric.unit();
            // sheet rates are fractions, engine rates are percentages
            let scale = match unit {
                MetricUnit::Percent => 100.0,
                _ => 1.0,
            };
            let value_format = self
                .formats
                .value_cell(index, Some(styles::num_format(unit)));

            let current = formulas::kpi_current(row.metric, self.channel, &self.refs)?;
            let target = formulas::kpi_target(row.metric, &self.refs)?;
            let current_cell = CellAddress::new(self.row, 1).to_string();
            let target_cell = CellAddress::new(self.row, 2).to_string();

            self.label(index, row.metric.label())?;
            self.formula_cell(1, &current, row.current / scale, &value_format)?;
            self.formula_cell(2, &target, row.target / scale, &value_format)?;
            self.formula_cell(
                3,
                &formulas::gap(&current_cell, &target_cell),
                row.current / scale - row.target / scale,
                &value_format,
            )?;
            self.gap_colouring(row.metric.shorter_is_better())?;
            self.row += 1;
        }
        self.row += 1;
        Ok(())
    }

    /// Red when behind target, green when ahead, grey when level
    fn gap_colouring(&mut self, shorter_is_better: bool) -> RoadmapResult<()> {
        let (below, above) = if shorter_is_better {
            (&self.formats.good_gap, &self.formats.bad_gap)
        } else {
            (&self.formats.bad_gap, &self.formats.good_gap)
        };
        let rules = [
            ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::LessThan(0))
                .set_format(below.clone()),
            ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::GreaterThan(0))
                .set_format(above.clone()),
            ConditionalFormatCell::new()
                .set_rule(ConditionalFormatCellRule::EqualTo(0))
                .set_format(self.formats.neutral_gap.clone()),
        ];
        for rule in &rules {
            self.ws
                .add_conditional_format(self.row, 3, self.row, 3, rule)
                .map_err(xlsx_err("add conditional format"))?;
        }
        Ok(())
    }

    /// Plan rows chained off each other; returns the plan and the exact
    /// final-action formula
    fn action_plan(&mut self) -> RoadmapResult<(ActionPlan, String)> {
        self.section("Final Action Plan")?;
        self.table_header(&["Step", "Count", "Exact"])?;

        let data = self.state.channel(self.channel);
        let plan = plan_from_revenue_goal(&data.reference_targets, &self.state.program_settings, self.channel);
        let mut steps = plan_steps(self.channel);
        let final_step = steps.pop();

        let mut previous = self
            .refs
            .get(CellKey::Setting(SettingsField::TargetRevenueGoal))?;

        for (index, step) in steps.into_iter().enumerate() {
            let exact = plan.value(step.stage).unwrap_or(0.0);
            let exact_formula = formulas::plan_step(step, &previous, &self.refs)?;
            let exact_cell = CellAddress::new(self.row, 2);

            self.label(index, step.stage.plan_label(self.channel))?;
            self.formula_cell(
                1,
                &formulas::round_up(&exact_cell.to_string()),
                round_up_count(exact),
                &self.formats.value_cell(index, Some(NUMBER_FORMAT)),
            )?;
            self.formula_cell(
                2,
                &exact_formula,
                exact,
                &self.formats.value_cell(index, Some(EXACT_FORMAT)),
            )?;
            self.refs.insert(CellKey::Plan(step.stage), exact_cell);
            previous = exact_cell.to_string();
            self.row += 1;
        }
        self.row += 1;

        let final_formula = match final_step {
            Some(step) => formulas::plan_step(step, &previous, &self.refs)?,
            None => "0".to_string(),
        };
        Ok((plan, final_formula))
    }

    fn final_action(&mut self, plan: &ActionPlan, exact_formula: &str) -> RoadmapResult<()> {
        self.ws
            .merge_range(
                self.row,
                0,
                self.row,
                LAST_COL,
                Stage::OutreachSent.plan_label(self.channel),
                &self.formats.final_label,
            )
            .map_err(xlsx_err("write final action label"))?;
        self.row += 1;

        self.ws
            .merge_range(self.row, 0, self.row, LAST_COL, "", &self.formats.final_value)
            .map_err(xlsx_err("merge final action"))?;
        self.ws
            .set_row_height(self.row, 40)
            .map_err(xlsx_err("set row height"))?;
        let formats = self.formats;
        self.formula_cell(
            0,
            &formulas::round_up(exact_formula),
            plan.final_action_count(),
            &formats.final_value,
        )?;
        self.row += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(report_file_name(date), "OutreachRoadmap_FullPlan_2024-03-07.xlsx");
    }

    #[test]
    fn test_buffer_is_zip() {
        let bytes = ReportExporter::new(AppState::default()).to_buffer().unwrap();
        assert!(bytes.len() > 1000);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_refs_cover_every_input() {
        let mut workbook = Workbook::new();
        let formats = ReportFormats::new();
        let state = AppState::default();
        let ws = workbook.add_worksheet();
        let refs = SheetWriter::new(ws, &formats, &state, Channel::LinkedIn)
            .write()
            .unwrap();
        // 3 settings, 7 performance, 7 targets, 5 plan rows
        assert_eq!(refs.len(), 22);
        assert_eq!(refs.get(CellKey::Setting(SettingsField::OfferPrice)).unwrap(), "B5");
        assert_eq!(
            refs.get(CellKey::Performance(PerformanceField::ConnectionRequestsSent)).unwrap(),
            "B9"
        );
        assert_eq!(refs.get(CellKey::Plan(Stage::DealsClosed)).unwrap(), "C38");
    }

    #[tokio::test]
    async fn test_build_report_on_blocking_task() {
        let bytes = build_report(AppState::default()).await.unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
