#![no_main]

use libfuzzer_sys::fuzz_target;
use time::UtcOffset;
use tunestats::history::parse_export;
use tunestats::model::GroupingKey;
use tunestats::report::ListeningReport;
use tunestats::stats::{DateRange, rank};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(batch) = parse_export(raw, UtcOffset::UTC) else {
        return;
    };

    for grouping in GroupingKey::ALL {
        let report = ListeningReport::build(&batch.events, DateRange::all(), grouping, 10);
        assert!(report.ranking.len() <= 10);
        assert_eq!(report.hourly.total_ms(), report.kpis.total_ms);

        let counted: u64 = rank(&batch.events, grouping, usize::MAX)
            .iter()
            .map(|row| row.event_count)
            .sum();
        assert_eq!(counted, batch.events.len() as u64);
    }
});
