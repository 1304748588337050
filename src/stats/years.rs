use crate::model::PlaybackEvent;
use std::collections::BTreeSet;

pub fn available_years<'a, I>(events: I) -> Vec<i32>
where
    I: IntoIterator<Item = &'a PlaybackEvent>,
{
    events
        .into_iter()
        .filter_map(|event| event.timestamp)
        .map(|timestamp| timestamp.year())
        .collect::<BTreeSet<i32>>()
        .into_iter()
        .collect()
}
