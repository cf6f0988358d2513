//! Custom handlebars helpers for SQL templates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason,
};
use serde_json::Value;
use std::fmt::Write as _;

/// Format used by `strftime` when none is given.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// `{{sql_escape value}}`: doubles single quotes so the value can sit inside
/// a SQL string literal.
pub fn sql_escape_helper(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("sql_escape", 0))?;
    out.write(&sql_escape(value.value()))?;
    Ok(())
}

/// `{{strftime value "%d/%m/%Y"}}`: reformats an RFC 3339, `YYYY-MM-DD HH:MM:SS`
/// or `YYYY-MM-DD` value. Anything else is written unchanged.
pub fn strftime_helper(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("strftime", 0))?;
    let format = h
        .param(1)
        .and_then(|p| p.value().as_str())
        .unwrap_or(DEFAULT_DATE_FORMAT);

    let raw = stringify(value.value());
    let rendered = match format_date(&raw, format) {
        Some(Ok(formatted)) => formatted,
        Some(Err(_)) => {
            return Err(RenderErrorReason::Other(format!(
                "strftime: invalid format string '{format}'"
            ))
            .into())
        }
        None => raw,
    };
    out.write(&rendered)?;
    Ok(())
}

pub(crate) fn sql_escape(value: &Value) -> String {
    stringify(value).replace('\'', "''")
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_date(raw: &str, format: &str) -> Option<Result<String, std::fmt::Error>> {
    let mut out = String::new();
    let written = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        write!(out, "{}", dt.format(format))
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
    {
        write!(out, "{}", dt.format(format))
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        write!(out, "{}", date.format(format))
    } else {
        return None;
    };
    Some(written.map(|()| out))
}
