//! Daily prayer verse

use chrono::{Datelike, NaiveDate};

/// A scripture verse with its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verse {
    pub text: &'static str,
    pub reference: &'static str,
}

pub static VERSES: [Verse; 8] = [
    Verse {
        text: "Rugați-vă neîncetat.",
        reference: "1 Tesaloniceni 5:17",
    },
    Verse {
        text: "Nu vă îngrijorați de nimic, ci în orice împrejurare, prin rugăciune și cerere, cu mulțumire, să fie făcute cunoscute cererile voastre înaintea lui Dumnezeu.",
        reference: "Filipeni 4:6",
    },
    Verse {
        text: "Căci oriunde sunt doi sau trei adunați în Numele Meu, sunt și Eu în mijlocul lor.",
        reference: "Matei 18:20",
    },
    Verse {
        text: "Rugăciunea omului neprihănit lucrează cu putere.",
        reference: "Iacov 5:16",
    },
    Verse {
        text: "Și orice veți cere în rugăciune, cu credință, veți primi.",
        reference: "Matei 21:22",
    },
    Verse {
        text: "Domnul este aproape de toți cei ce Îl cheamă, de toți cei ce Îl cheamă cu adevărat.",
        reference: "Psalmul 145:18",
    },
    Verse {
        text: "Aruncați asupra Lui toată îngrijorarea voastră, căci El Însuși îngrijește de voi.",
        reference: "1 Petru 5:7",
    },
    Verse {
        text: "Cereți, și vi se va da; căutați, și veți afla; bateți, și vi se va deschide.",
        reference: "Matei 7:7",
    },
];

/// Verse for a day of the month (1-31).
#[must_use]
pub fn verse_for_day(day: u32) -> &'static Verse {
    &VERSES[day as usize % VERSES.len()]
}

/// Verse shown on `date`.
#[must_use]
pub fn verse_for_date(date: NaiveDate) -> &'static Verse {
    verse_for_day(date.day())
}

impl std::fmt::Display for Verse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"\n- {}", self.text, self.reference)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn day_selects_modulo_list() {
        assert_eq!(verse_for_day(8).reference, "1 Tesaloniceni 5:17");
        assert_eq!(verse_for_day(1).reference, "Filipeni 4:6");
        assert_eq!(verse_for_day(31).reference, "1 Petru 5:7");
    }

    #[test]
    fn date_uses_day_of_month() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        assert_eq!(verse_for_date(date), verse_for_day(16));
        assert_eq!(verse_for_date(date).reference, "1 Tesaloniceni 5:17");
    }
}
