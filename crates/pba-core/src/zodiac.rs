use std::fmt;

use crate::numerology::life_path;
use crate::time::CalendarDate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WesternSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

/// (sign, first month, first day, last month, last day), inclusive.
/// Capricorn is the only range crossing the year boundary.
const WESTERN_RANGES: [(WesternSign, u32, u32, u32, u32); 12] = [
    (WesternSign::Aries, 3, 21, 4, 19),
    (WesternSign::Taurus, 4, 20, 5, 20),
    (WesternSign::Gemini, 5, 21, 6, 20),
    (WesternSign::Cancer, 6, 21, 7, 22),
    (WesternSign::Leo, 7, 23, 8, 22),
    (WesternSign::Virgo, 8, 23, 9, 22),
    (WesternSign::Libra, 9, 23, 10, 22),
    (WesternSign::Scorpio, 10, 23, 11, 21),
    (WesternSign::Sagittarius, 11, 22, 12, 21),
    (WesternSign::Capricorn, 12, 22, 1, 19),
    (WesternSign::Aquarius, 1, 20, 2, 18),
    (WesternSign::Pisces, 2, 19, 3, 20),
];

impl WesternSign {
    pub fn name(self) -> &'static str {
        match self {
            WesternSign::Aries => "Aries",
            WesternSign::Taurus => "Taurus",
            WesternSign::Gemini => "Gemini",
            WesternSign::Cancer => "Cancer",
            WesternSign::Leo => "Leo",
            WesternSign::Virgo => "Virgo",
            WesternSign::Libra => "Libra",
            WesternSign::Scorpio => "Scorpio",
            WesternSign::Sagittarius => "Sagittarius",
            WesternSign::Capricorn => "Capricorn",
            WesternSign::Aquarius => "Aquarius",
            WesternSign::Pisces => "Pisces",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            WesternSign::Aries => '♈',
            WesternSign::Taurus => '♉',
            WesternSign::Gemini => '♊',
            WesternSign::Cancer => '♋',
            WesternSign::Leo => '♌',
            WesternSign::Virgo => '♍',
            WesternSign::Libra => '♎',
            WesternSign::Scorpio => '♏',
            WesternSign::Sagittarius => '♐',
            WesternSign::Capricorn => '♑',
            WesternSign::Aquarius => '♒',
            WesternSign::Pisces => '♓',
        }
    }

    /// Sign for a month/day pair. Out-of-range input falls through to Pisces,
    /// the same way the table lookup would for any unmatched day.
    pub fn for_month_day(month: u32, day: u32) -> Self {
        for (sign, m1, d1, m2, d2) in WESTERN_RANGES {
            if (month == m1 && day >= d1) || (month == m2 && day <= d2) {
                return sign;
            }
        }
        WesternSign::Pisces
    }
}

impl fmt::Display for WesternSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.name())
    }
}

/// Western sign for a `YYYY-MM-DD` date of birth. None if the date is invalid.
pub fn western_zodiac(dob: &str) -> Option<WesternSign> {
    let date = CalendarDate::parse(dob).ok()?;
    Some(WesternSign::for_month_day(date.month, date.day))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EarthSign {
    Rat,
    Ox,
    Tiger,
    Rabbit,
    Dragon,
    Snake,
    Horse,
    Goat,
    Monkey,
    Rooster,
    Dog,
    Pig,
}

/// The 12-animal cycle, starting from the year-4 epoch.
pub const EARTH_CYCLE: [EarthSign; 12] = [
    EarthSign::Rat,
    EarthSign::Ox,
    EarthSign::Tiger,
    EarthSign::Rabbit,
    EarthSign::Dragon,
    EarthSign::Snake,
    EarthSign::Horse,
    EarthSign::Goat,
    EarthSign::Monkey,
    EarthSign::Rooster,
    EarthSign::Dog,
    EarthSign::Pig,
];

impl EarthSign {
    pub fn name(self) -> &'static str {
        match self {
            EarthSign::Rat => "Rat",
            EarthSign::Ox => "Ox",
            EarthSign::Tiger => "Tiger",
            EarthSign::Rabbit => "Rabbit",
            EarthSign::Dragon => "Dragon",
            EarthSign::Snake => "Snake",
            EarthSign::Horse => "Horse",
            EarthSign::Goat => "Goat",
            EarthSign::Monkey => "Monkey",
            EarthSign::Rooster => "Rooster",
            EarthSign::Dog => "Dog",
            EarthSign::Pig => "Pig",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            EarthSign::Rat => "🐀",
            EarthSign::Ox => "🐂",
            EarthSign::Tiger => "🐅",
            EarthSign::Rabbit => "🐇",
            EarthSign::Dragon => "🐉",
            EarthSign::Snake => "🐍",
            EarthSign::Horse => "🐎",
            EarthSign::Goat => "🐐",
            EarthSign::Monkey => "🐒",
            EarthSign::Rooster => "🐓",
            EarthSign::Dog => "🐕",
            EarthSign::Pig => "🐖",
        }
    }

    pub fn for_year(year: i64) -> Self {
        EARTH_CYCLE[earth_zodiac_index(year)]
    }
}

impl fmt::Display for EarthSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.name())
    }
}

/// `(year - 4) mod 12`, always in `0..12` (years before 4 included).
pub fn earth_zodiac_index(year: i64) -> usize {
    (year - 4).rem_euclid(12) as usize
}

/// The locally computed metrics shown on the dossier panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileReadout {
    pub life_path: u32,
    pub western: Option<WesternSign>,
    pub earth: Option<EarthSign>,
}

impl ProfileReadout {
    pub fn from_dob(dob: &str) -> Self {
        let date = CalendarDate::parse(dob).ok();
        Self {
            life_path: life_path(dob),
            western: date.map(|d| WesternSign::for_month_day(d.month, d.day)),
            earth: date.map(|d| EarthSign::for_year(d.year)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aquarius_boundary_inclusive() {
        assert_eq!(western_zodiac("2000-01-20"), Some(WesternSign::Aquarius));
        assert_eq!(western_zodiac("2000-01-19"), Some(WesternSign::Capricorn));
    }

    #[test]
    fn test_capricorn_wraps_year_end() {
        assert_eq!(western_zodiac("1999-12-22"), Some(WesternSign::Capricorn));
        assert_eq!(western_zodiac("1999-12-31"), Some(WesternSign::Capricorn));
        assert_eq!(western_zodiac("2000-01-01"), Some(WesternSign::Capricorn));
        assert_eq!(western_zodiac("1999-12-21"), Some(WesternSign::Sagittarius));
    }

    #[test]
    fn test_every_boundary() {
        for (sign, m1, d1, m2, d2) in WESTERN_RANGES {
            assert_eq!(WesternSign::for_month_day(m1, d1), sign, "start of {sign:?}");
            assert_eq!(WesternSign::for_month_day(m2, d2), sign, "end of {sign:?}");
        }
    }

    #[test]
    fn test_pisces_leap_day() {
        assert_eq!(western_zodiac("2000-02-29"), Some(WesternSign::Pisces));
        assert_eq!(western_zodiac("2000-03-20"), Some(WesternSign::Pisces));
        assert_eq!(western_zodiac("2000-03-21"), Some(WesternSign::Aries));
    }

    #[test]
    fn test_invalid_dob() {
        assert_eq!(western_zodiac(""), None);
        assert_eq!(western_zodiac("1990-02-30"), None);
    }

    #[test]
    fn test_earth_index() {
        assert_eq!(earth_zodiac_index(1996), 0);
        assert_eq!(EarthSign::for_year(1996), EarthSign::Rat);
        assert_eq!(EarthSign::for_year(2024), EarthSign::Dragon);
        assert_eq!(EarthSign::for_year(1990), EarthSign::Horse);
    }

    #[test]
    fn test_earth_index_before_epoch() {
        assert_eq!(earth_zodiac_index(4), 0);
        assert_eq!(earth_zodiac_index(3), 11);
        assert_eq!(earth_zodiac_index(0), 8);
        assert_eq!(earth_zodiac_index(-8), 0);
    }

    #[test]
    fn test_readout() {
        let r = ProfileReadout::from_dob("1990-05-15");
        assert_eq!(r.life_path, 3);
        assert_eq!(r.western, Some(WesternSign::Taurus));
        assert_eq!(r.earth, Some(EarthSign::Horse));
        assert_eq!(WesternSign::Taurus.to_string(), "♉ Taurus");

        let bad = ProfileReadout::from_dob("garbage");
        assert_eq!(bad.life_path, 0);
        assert_eq!(bad.western, None);
        assert_eq!(bad.earth, None);
    }
}
