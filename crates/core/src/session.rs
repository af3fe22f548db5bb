//! Per-file session: the current table, the column selection and the log
//! of applied steps.
//!
//! Every user action goes through [`Session::apply`], which computes the
//! next table from the current one and commits it only on success.

use crate::error::SweepResult;
use crate::export::{export, ExportArtifact};
use crate::loader::load;
use crate::upload::{FileFormat, FileInfo, UploadedFile};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sweeper_sheet::{CellValue, ColumnType, Table};
use sweeper_viz::ChartSpec;

/// A user action on a loaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    RemoveDuplicates,
    FillMissing,
    SelectColumns { columns: Vec<String> },
    Visualize,
    Export { format: FileFormat },
}

/// What an action produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    Message(String),
    Chart(ChartSpec),
    Artifact(ExportArtifact),
}

impl Outcome {
    /// User-facing acknowledgement.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Message(message) => message.clone(),
            Self::Chart(chart) if chart.is_empty() => "No numeric columns to chart".to_string(),
            Self::Chart(_) => "Chart ready".to_string(),
            Self::Artifact(artifact) => format!("Exported {}", artifact.file_name),
        }
    }
}

/// Most recent transition of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Loaded,
    Cleaned,
    Selected,
    Visualized,
    Exported,
}

/// One applied action.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    pub applied_at: DateTime<Utc>,
}

/// Column name, inferred type and whether it is in the selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub column_type: ColumnType,
    pub selected: bool,
}

/// Preview state of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub file: FileInfo,
    pub stage: Stage,
    pub columns: Vec<ColumnSummary>,
    pub row_count: usize,
    pub rows: Vec<IndexMap<String, CellValue>>,
    pub history: Vec<Step>,
}

/// State of one uploaded file.
#[derive(Debug, Clone)]
pub struct Session {
    info: FileInfo,
    table: Table,
    selection: Option<Vec<String>>,
    stage: Stage,
    history: Vec<Step>,
}

impl Session {
    /// Load an upload into a new session.
    ///
    /// # Errors
    ///
    /// Fails for unsupported formats and unparseable content.
    pub fn open(upload: &UploadedFile) -> SweepResult<Self> {
        let table = load(upload)?;
        Ok(Self {
            info: upload.info(),
            table,
            selection: None,
            stage: Stage::Loaded,
            history: Vec::new(),
        })
    }

    #[must_use]
    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn history(&self) -> &[Step] {
        &self.history
    }

    /// The cleaned table with every column.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Names of the selected columns (all columns by default).
    #[must_use]
    pub fn selected_columns(&self) -> Vec<String> {
        match &self.selection {
            Some(columns) => self
                .table
                .column_names()
                .iter()
                .filter(|name| columns.contains(name))
                .cloned()
                .collect(),
            None => self.table.column_names().to_vec(),
        }
    }

    /// The table narrowed to the current selection.
    pub fn current(&self) -> SweepResult<Table> {
        match &self.selection {
            Some(columns) => Ok(self.table.selected(columns)?),
            None => Ok(self.table.clone()),
        }
    }

    /// Apply one action.
    ///
    /// Cleaning actions work on every column of the table; visualize and
    /// export see the selected columns only. On error the session is left
    /// as it was.
    ///
    /// # Errors
    ///
    /// Fails for unknown column names and serialization errors.
    pub fn apply(&mut self, action: Action) -> SweepResult<Outcome> {
        let outcome = match &action {
            Action::RemoveDuplicates => {
                let mut next = self.table.clone();
                let removed = next.remove_duplicates();
                tracing::debug!("{}: removed {} duplicate rows", self.info.name, removed);
                self.table = next;
                self.stage = Stage::Cleaned;
                Outcome::Message("Duplicates removed".to_string())
            }
            Action::FillMissing => {
                let mut next = self.table.clone();
                let filled = next.fill_missing_with_mean();
                tracing::debug!("{}: filled {} missing cells", self.info.name, filled);
                self.table = next;
                self.stage = Stage::Cleaned;
                Outcome::Message("Missing values filled".to_string())
            }
            Action::SelectColumns { columns } => {
                // validates every name
                self.table.selected(columns)?;
                self.selection = Some(columns.clone());
                self.stage = Stage::Selected;
                Outcome::Message("Columns selected".to_string())
            }
            Action::Visualize => {
                let chart = ChartSpec::bar_from_table(self.info.name.clone(), &self.current()?);
                self.stage = Stage::Visualized;
                Outcome::Chart(chart)
            }
            Action::Export { format } => {
                let artifact = export(&self.current()?, &self.info.name, *format)?;
                self.stage = Stage::Exported;
                Outcome::Artifact(artifact)
            }
        };

        self.history.push(Step {
            action,
            applied_at: Utc::now(),
        });
        Ok(outcome)
    }

    /// Preview of the selected table, up to `limit` rows.
    pub fn view(&self, limit: usize) -> SweepResult<SessionView> {
        let current = self.current()?;
        let selected = self.selected_columns();
        let columns = self
            .table
            .column_names()
            .iter()
            .zip(self.table.column_types())
            .map(|(name, column_type)| ColumnSummary {
                name: name.clone(),
                column_type,
                selected: selected.contains(name),
            })
            .collect();

        Ok(SessionView {
            file: self.info.clone(),
            stage: self.stage,
            columns,
            row_count: current.row_count(),
            rows: current.to_records(limit),
            history: self.history.clone(),
        })
    }
}
