//! French national and regional holidays.
//!
//! Every region observes the eleven national holidays (eight fixed dates
//! plus three Easter-derived ones). The Alsace-Moselle departments
//! additionally observe Good Friday and St. Stephen's Day.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::easter::easter_sunday;

/// Holiday region. Unknown codes map to the national calendar.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum HolidayRegion {
    /// Metropolitan France, national holidays only (`FR`).
    #[default]
    France,
    /// Bas-Rhin (`FR-67`).
    BasRhin,
    /// Haut-Rhin (`FR-68`).
    HautRhin,
    /// Moselle (`FR-57`).
    Moselle,
}

impl HolidayRegion {
    /// Parse a region code. Unrecognized codes fall back to `France`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "FR-67" => HolidayRegion::BasRhin,
            "FR-68" => HolidayRegion::HautRhin,
            "FR-57" => HolidayRegion::Moselle,
            _ => HolidayRegion::France,
        }
    }

    /// ISO 3166-2 style region code.
    pub fn code(&self) -> &'static str {
        match self {
            HolidayRegion::France => "FR",
            HolidayRegion::BasRhin => "FR-67",
            HolidayRegion::HautRhin => "FR-68",
            HolidayRegion::Moselle => "FR-57",
        }
    }

    /// Check if the region observes the Alsace-Moselle addenda.
    pub fn observes_alsace_moselle_days(&self) -> bool {
        !matches!(self, HolidayRegion::France)
    }
}

impl From<String> for HolidayRegion {
    fn from(code: String) -> Self {
        HolidayRegion::from_code(&code)
    }
}

impl From<HolidayRegion> for String {
    fn from(region: HolidayRegion) -> Self {
        region.code().to_string()
    }
}

/// A holiday date with its French display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: &'static str,
}

fn fixed(year: i32, month: u32, day: u32, name: &'static str) -> Holiday {
    Holiday {
        // All fixed French holidays fall on day/month pairs valid every year.
        date: NaiveDate::from_ymd_opt(year, month, day).expect("fixed holiday date is valid"),
        name,
    }
}

/// Compute the holidays for a year and region, sorted by date.
pub fn holidays(year: i32, region: HolidayRegion) -> Vec<Holiday> {
    let easter = easter_sunday(year);
    let mut days = vec![
        fixed(year, 1, 1, "Jour de l'An"),
        fixed(year, 5, 1, "Fête du Travail"),
        fixed(year, 5, 8, "Victoire 1945"),
        fixed(year, 7, 14, "Fête Nationale"),
        fixed(year, 8, 15, "Assomption"),
        fixed(year, 11, 1, "Toussaint"),
        fixed(year, 11, 11, "Armistice 1918"),
        fixed(year, 12, 25, "Noël"),
        Holiday {
            date: easter + Days::new(1),
            name: "Lundi de Pâques",
        },
        Holiday {
            date: easter + Days::new(39),
            name: "Ascension",
        },
        Holiday {
            date: easter + Days::new(50),
            name: "Lundi de Pentecôte",
        },
    ];

    if region.observes_alsace_moselle_days() {
        days.push(Holiday {
            date: easter - Days::new(2),
            name: "Vendredi Saint",
        });
        days.push(fixed(year, 12, 26, "Saint Étienne"));
    }

    days.sort_by_key(|h| h.date);
    days
}

/// Compute the holiday date set for a year and region.
pub fn holiday_set(year: i32, region: HolidayRegion) -> BTreeSet<NaiveDate> {
    holidays(year, region).into_iter().map(|h| h.date).collect()
}

/// Default capacity of the holiday memo cache.
const CACHE_CAPACITY: usize = 64;

/// Memoizing holiday calendar.
///
/// `(year, region)` sets are immutable once computed and shared via `Arc`.
/// The cache is a bounded LRU so callers probing many years cannot grow it
/// without limit.
#[derive(Debug)]
pub struct HolidayCalendar {
    cache: Mutex<HolidayCache>,
}

#[derive(Debug)]
struct HolidayCache {
    capacity: usize,
    sets: HashMap<(i32, HolidayRegion), Arc<BTreeSet<NaiveDate>>>,
    recency: VecDeque<(i32, HolidayRegion)>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(HolidayCache {
                capacity: capacity.max(1),
                sets: HashMap::new(),
                recency: VecDeque::new(),
            }),
        }
    }

    /// Get the holiday set for a year and region, computing it on first use.
    pub fn holiday_dates(&self, year: i32, region: HolidayRegion) -> Arc<BTreeSet<NaiveDate>> {
        let key = (year, region);
        let mut cache = self.cache.lock().expect("holiday cache lock poisoned");

        if let Some(set) = cache.sets.get(&key) {
            let set = Arc::clone(set);
            cache.touch(key);
            return set;
        }

        let set = Arc::new(holiday_set(year, region));
        cache.insert(key, Arc::clone(&set));
        set
    }

    /// Check whether a date is a holiday in the given region.
    pub fn is_holiday(&self, date: NaiveDate, region: HolidayRegion) -> bool {
        use chrono::Datelike;
        self.holiday_dates(date.year(), region).contains(&date)
    }

    /// Number of cached `(year, region)` sets.
    pub fn cached_sets(&self) -> usize {
        self.cache.lock().expect("holiday cache lock poisoned").sets.len()
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl HolidayCache {
    fn touch(&mut self, key: (i32, HolidayRegion)) {
        if let Some(pos) = self.recency.iter().position(|k| *k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(key);
    }

    fn insert(&mut self, key: (i32, HolidayRegion), set: Arc<BTreeSet<NaiveDate>>) {
        while self.sets.len() >= self.capacity {
            match self.recency.pop_front() {
                Some(oldest) => {
                    self.sets.remove(&oldest);
                }
                None => break,
            }
        }
        self.sets.insert(key, set);
        self.recency.push_back(key);
    }
}

/// Process-wide shared calendar instance.
pub fn shared_calendar() -> &'static HolidayCalendar {
    static CALENDAR: OnceLock<HolidayCalendar> = OnceLock::new();
    CALENDAR.get_or_init(HolidayCalendar::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn national_set_has_eleven_days() {
        let set = holiday_set(2024, HolidayRegion::France);
        assert_eq!(set.len(), 11);
        assert!(set.contains(&date(2024, 1, 1)));
        assert!(set.contains(&date(2024, 5, 1)));
        assert!(set.contains(&date(2024, 5, 8)));
        assert!(set.contains(&date(2024, 7, 14)));
        assert!(set.contains(&date(2024, 8, 15)));
        assert!(set.contains(&date(2024, 11, 1)));
        assert!(set.contains(&date(2024, 11, 11)));
        assert!(set.contains(&date(2024, 12, 25)));
    }

    #[test]
    fn easter_derived_days_2024() {
        // Easter Sunday 2024 is March 31.
        let set = holiday_set(2024, HolidayRegion::France);
        assert!(set.contains(&date(2024, 4, 1)), "Easter Monday");
        assert!(set.contains(&date(2024, 5, 9)), "Ascension");
        assert!(set.contains(&date(2024, 5, 20)), "Whit Monday");
    }

    #[test]
    fn alsace_moselle_addenda() {
        for region in [
            HolidayRegion::BasRhin,
            HolidayRegion::HautRhin,
            HolidayRegion::Moselle,
        ] {
            let set = holiday_set(2024, region);
            assert_eq!(set.len(), 13);
            assert!(set.contains(&date(2024, 3, 29)), "Good Friday");
            assert!(set.contains(&date(2024, 12, 26)), "St. Stephen");
        }
    }

    #[test]
    fn unknown_region_code_falls_back_to_national() {
        assert_eq!(HolidayRegion::from_code("FR"), HolidayRegion::France);
        assert_eq!(HolidayRegion::from_code("DE"), HolidayRegion::France);
        assert_eq!(HolidayRegion::from_code(""), HolidayRegion::France);
        assert_eq!(HolidayRegion::from_code("FR-67"), HolidayRegion::BasRhin);
    }

    #[test]
    fn region_serde_round_trip() {
        let json = serde_json::to_string(&HolidayRegion::Moselle).unwrap();
        assert_eq!(json, "\"FR-57\"");
        let back: HolidayRegion = serde_json::from_str("\"XX-99\"").unwrap();
        assert_eq!(back, HolidayRegion::France);
    }

    #[test]
    fn holidays_are_sorted_and_named() {
        let days = holidays(2025, HolidayRegion::Moselle);
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
        assert!(days.iter().any(|h| h.name == "Vendredi Saint"));
    }

    #[test]
    fn calendar_memoizes_and_bounds_cache() {
        let calendar = HolidayCalendar::with_capacity(3);
        for year in 2020..2030 {
            let first = calendar.holiday_dates(year, HolidayRegion::France);
            let second = calendar.holiday_dates(year, HolidayRegion::France);
            assert!(Arc::ptr_eq(&first, &second));
        }
        assert!(calendar.cached_sets() <= 3);
    }

    #[test]
    fn calendar_is_holiday() {
        let calendar = HolidayCalendar::new();
        assert!(calendar.is_holiday(date(2024, 5, 1), HolidayRegion::France));
        assert!(!calendar.is_holiday(date(2024, 5, 2), HolidayRegion::France));
        // Good Friday is regional only.
        assert!(!calendar.is_holiday(date(2024, 3, 29), HolidayRegion::France));
        assert!(calendar.is_holiday(date(2024, 3, 29), HolidayRegion::Moselle));
    }
}
