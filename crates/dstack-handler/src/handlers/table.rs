use std::any::Any;

use serde_json::Value;

use crate::data::FrameData;
use crate::error::{HandlerError, Result};
use crate::handler::Handler;

/// Default number of rows kept in a table preview.
const DEFAULT_PREVIEW_ROWS: usize = 10;

/// A rectangular table of JSON scalars with named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the header.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(HandlerError::Invalid(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Render as CSV (RFC 4180 quoting), keeping at most `limit` rows.
    pub fn to_csv(&self, limit: Option<usize>) -> String {
        let mut out = String::new();
        write_record(&mut out, self.headers.iter().map(String::as_str));
        let take = limit.unwrap_or(self.rows.len());
        for row in self.rows.iter().take(take) {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            write_record(&mut out, cells.iter().map(String::as_str));
        }
        out
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push_str("\r\n");
}

/// Encodes [`Table`] as `text/csv` with a truncated CSV preview.
#[derive(Debug, Clone, Copy)]
pub struct TableHandler {
    preview_rows: usize,
}

impl TableHandler {
    pub const CONTENT_TYPE: &'static str = "text/csv";

    pub fn with_preview_rows(preview_rows: usize) -> Self {
        Self { preview_rows }
    }
}

impl Default for TableHandler {
    fn default() -> Self {
        Self::with_preview_rows(DEFAULT_PREVIEW_ROWS)
    }
}

impl Handler for TableHandler {
    fn name(&self) -> &'static str {
        "table"
    }

    fn is_capable(&self, obj: &dyn Any) -> bool {
        obj.is::<Table>()
    }

    fn as_frame_data(&self, obj: &dyn Any) -> Result<FrameData> {
        let table = obj
            .downcast_ref::<Table>()
            .ok_or(HandlerError::Mismatch(self.name()))?;
        let data = table.to_csv(None);
        let preview = table.to_csv(Some(self.preview_rows));
        Ok(FrameData::new(Self::CONTENT_TYPE, data.into_bytes()).with_preview(preview.into_bytes()))
    }
}
