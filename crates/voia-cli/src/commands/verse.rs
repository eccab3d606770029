use chrono::Local;
use voia_core::verses::{verse_for_date, verse_for_day};

pub fn run_verse(day: Option<u32>) {
    let verse = day.map_or_else(|| verse_for_date(Local::now().date_naive()), verse_for_day);
    println!("{verse}");
}
