//! Human readable cooking durations.
//!
//! Durations are whole minutes. A recipe without its own duration borrows
//! the sum of its steps, and falls back to an empty string when nothing is
//! known.

/// Formats minutes as `"{h}h {m}min"` above one hour, `"{n}min"` otherwise.
///
/// Exactly sixty minutes stays `"60min"`.
pub fn humanize_duration(duration_minutes: u64) -> String {
    if duration_minutes > 60 {
        let hours = duration_minutes / 60;
        let minutes = duration_minutes % 60;
        format!("{hours}h {minutes}min")
    } else {
        format!("{duration_minutes}min")
    }
}

pub fn step_duration_display(duration_minutes: Option<u64>) -> String {
    duration_minutes.map(humanize_duration).unwrap_or_default()
}

/// Display string for a recipe.
///
/// The recipe's own duration wins. Otherwise the step durations that are set
/// are summed; with no steps, or no step carrying a duration, the result is
/// empty.
pub fn recipe_duration_display<I>(duration_minutes: Option<u64>, step_durations: I) -> String
where
    I: IntoIterator<Item = Option<u64>>,
{
    if let Some(own) = duration_minutes {
        return humanize_duration(own);
    }

    let total = step_durations
        .into_iter()
        .flatten()
        .fold(None, |acc: Option<u64>, minutes| {
            Some(acc.unwrap_or(0).saturating_add(minutes))
        });

    total.map(humanize_duration).unwrap_or_default()
}
