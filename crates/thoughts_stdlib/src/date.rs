//! `#date`: formats today's or a given date.

use std::fmt::Write as _;

use chrono::{Days, Local, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use thoughts_engine::{Command, CommandInput, KnowledgeBase};
use thoughts_foundation::{Result, Term};

/// Format used when the directive gives none, e.g. `March 04, 2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%B %d, %Y";

/// `#date`: renders `@today`, `@yesterday`, `@tomorrow`, or an ISO date
/// with a strftime `format`.
///
/// `timezone` is an hour offset from UTC applied to the relative dates;
/// without it the local clock is used.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateCommand;

impl Command for DateCommand {
    fn name(&self) -> &str {
        "#date"
    }

    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        let base = input.require_text(input.name())?;
        let offset = match input.arg("timezone") {
            None | Some(Term::Nil) => None,
            Some(term) => Some(hours(term).ok_or_else(|| {
                input.error(format!("timezone must be an hour offset, got {term}"))
            })?),
        };

        let date = match base {
            "@today" => now(offset),
            "@yesterday" => now(offset).and_then(|d| d.checked_sub_days(Days::new(1))),
            "@tomorrow" => now(offset).and_then(|d| d.checked_add_days(Days::new(1))),
            other => Some(parse_date(other).ok_or_else(|| {
                input.error(format!("cannot read {other:?} as a date"))
            })?),
        }
        .ok_or_else(|| input.error("date out of range"))?;

        let format = match input.arg("format") {
            Some(term) => term
                .as_text()
                .ok_or_else(|| input.error("format must be text"))?,
            None => DEFAULT_DATE_FORMAT,
        };

        let mut rendered = String::new();
        write!(rendered, "{}", date.format(format))
            .map_err(|_| input.error(format!("invalid date format {format:?}")))?;

        let value = Term::from_text(rendered);
        input.store(kb, &value);
        Ok(value)
    }

    fn inline(&self) -> bool {
        true
    }
}

fn hours(term: &Term) -> Option<i64> {
    term.as_int()
        .or_else(|| term.as_text().and_then(|t| t.trim().parse().ok()))
}

fn now(offset: Option<i64>) -> Option<NaiveDateTime> {
    match offset {
        None | Some(0) => Some(Local::now().naive_local()),
        Some(hours) => {
            let delta = TimeDelta::try_hours(hours)?;
            Utc::now().naive_utc().checked_add_signed(delta)
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    text.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| text.parse::<NaiveDate>().ok().map(|d| d.and_time(chrono::NaiveTime::MIN)))
}
