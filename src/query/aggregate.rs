use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;

use crate::data::{month_name, Geography, Record};

/// One month of the monthly chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCount {
    /// `YYYY-MM`
    pub key: String,
    /// `<Ay> <Yıl>`, e.g. `Mart 2024`
    pub label: String,
    pub count: usize,
}

/// Count records per calendar month, ascending. Undated records are skipped.
pub fn by_month<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<MonthCount> {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for date in records.into_iter().filter_map(Record::parsed_date) {
        *counts.entry((date.year(), date.month())).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((year, month), count)| MonthCount {
            key: format!("{year}-{month:02}"),
            label: format!("{} {year}", month_name(month).unwrap_or("?")),
            count,
        })
        .collect()
}

/// Count records per sector label, largest first. Ties keep first-seen order.
pub fn by_sector<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let label = record.sector_label();
        match index.get(label) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                index.insert(label.to_string(), order.len());
                order.push((label.to_string(), 1));
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

/// A fixed, inclusive age interval of the age chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBucket {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

pub const AGE_BUCKETS: [AgeBucket; 6] = [
    AgeBucket { label: "0-18 (Çocuk)", min: 0.0, max: 17.0 },
    AgeBucket { label: "18-25", min: 18.0, max: 24.0 },
    AgeBucket { label: "25-35", min: 25.0, max: 34.0 },
    AgeBucket { label: "35-45", min: 35.0, max: 44.0 },
    AgeBucket { label: "45-55", min: 45.0, max: 54.0 },
    AgeBucket { label: "55+", min: 55.0, max: 150.0 },
];

/// Index of the first bucket containing `age`
pub fn age_bucket_index(age: f64) -> Option<usize> {
    AGE_BUCKETS
        .iter()
        .position(|b| age >= b.min && age <= b.max)
}

/// Count records per age bucket using `Record::bucket_age`. Ages outside
/// every bucket are not counted.
pub fn by_age_bucket<'a>(records: impl IntoIterator<Item = &'a Record>) -> [usize; 6] {
    let mut counts = [0usize; 6];
    for record in records {
        if let Some(idx) = age_bucket_index(record.bucket_age()) {
            counts[idx] += 1;
        }
    }
    counts
}

/// Monthly counts (index 0 = January) for every year present, ascending
pub fn by_year_month<'a>(records: impl IntoIterator<Item = &'a Record>) -> BTreeMap<i32, [usize; 12]> {
    let mut years: BTreeMap<i32, [usize; 12]> = BTreeMap::new();
    for date in records.into_iter().filter_map(Record::parsed_date) {
        years.entry(date.year()).or_insert([0; 12])[date.month0() as usize] += 1;
    }
    years
}

/// Count records per trimmed city name
pub fn by_city<'a>(records: impl IntoIterator<Item = &'a Record>) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for city in records.into_iter().filter_map(Record::city_key) {
        *counts.entry(city.to_string()).or_default() += 1;
    }
    counts
}

/// Shading tier of a province, darkest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Top,
    High,
    Upper,
    Middle,
    Lower,
    Low,
    Zero,
}

impl Tier {
    pub const ALL: [Tier; 7] = [
        Tier::Top,
        Tier::High,
        Tier::Upper,
        Tier::Middle,
        Tier::Lower,
        Tier::Low,
        Tier::Zero,
    ];

    /// Hex fill colour
    pub fn color(self) -> &'static str {
        match self {
            Tier::Top => "#7f0000",
            Tier::High => "#b71c1c",
            Tier::Upper => "#c62828",
            Tier::Middle => "#e53935",
            Tier::Lower => "#ef5350",
            Tier::Low => "#ef9a9a",
            Tier::Zero => "#2d2d2d",
        }
    }

    /// Ratio threshold the count must exceed; `None` for the zero tier
    fn threshold(self) -> Option<f64> {
        match self {
            Tier::Top => Some(0.8),
            Tier::High => Some(0.6),
            Tier::Upper => Some(0.4),
            Tier::Middle => Some(0.2),
            Tier::Lower => Some(0.1),
            Tier::Low => Some(0.0),
            Tier::Zero => None,
        }
    }
}

/// One row of the choropleth legend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub tier: Tier,
    pub label: String,
}

/// Colour scale relative to the busiest province
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoroplethScale {
    pub max: usize,
}

impl ChoroplethScale {
    /// Scale for a set of city counts; the maximum is at least 1
    pub fn from_counts(counts: &HashMap<String, usize>) -> Self {
        Self {
            max: counts.values().copied().max().unwrap_or(0).max(1),
        }
    }

    pub fn tier(&self, count: usize) -> Tier {
        if count == 0 {
            return Tier::Zero;
        }
        let ratio = count as f64 / self.max as f64;
        Tier::ALL
            .into_iter()
            .find(|t| t.threshold().is_some_and(|th| ratio > th))
            .unwrap_or(Tier::Zero)
    }

    /// Legend rows from the zero tier up to the darkest
    pub fn legend(&self) -> Vec<LegendEntry> {
        let at = |fraction: f64| (self.max as f64 * fraction).floor() as usize;
        let entry = |tier, label: String| LegendEntry { tier, label };
        vec![
            entry(Tier::Zero, "0".to_string()),
            entry(Tier::Low, format!("1-{}", at(0.1))),
            entry(Tier::Lower, format!("{}-{}", at(0.1) + 1, at(0.2))),
            entry(Tier::Middle, format!("{}-{}", at(0.2) + 1, at(0.4))),
            entry(Tier::Upper, format!("{}-{}", at(0.4) + 1, at(0.6))),
            entry(Tier::High, format!("{}-{}", at(0.6) + 1, at(0.8))),
            entry(Tier::Top, format!("{}+", at(0.8) + 1)),
        ]
    }
}

/// Count and tier for every province of the reference geography, joined by
/// exact name
pub fn province_counts(
    geography: &Geography,
    counts: &HashMap<String, usize>,
    scale: &ChoroplethScale,
) -> Vec<(String, usize, Tier)> {
    geography
        .provinces
        .iter()
        .map(|p| {
            let count = counts.get(&p.name).copied().unwrap_or(0);
            (p.name.clone(), count, scale.tier(count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: Option<&str>) -> Record {
        Record {
            id: "x".into(),
            date: date.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_month_bucket_and_label() {
        let records = vec![
            rec(Some("05.03.2024")),
            rec(Some("20.03.2024")),
            rec(Some("01.12.2023")),
            rec(None),
        ];
        let months = by_month(&records);
        assert_eq!(
            months,
            vec![
                MonthCount { key: "2023-12".into(), label: "Aralık 2023".into(), count: 1 },
                MonthCount { key: "2024-03".into(), label: "Mart 2024".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_sector_sorted_by_count_with_fallback() {
        let mk = |s: Option<&str>| Record {
            sector: s.map(str::to_string),
            ..rec(None)
        };
        let records = vec![
            mk(Some("Metal")),
            mk(None),
            mk(Some("Madencilik")),
            mk(Some("Madencilik")),
            mk(Some("")),
        ];
        assert_eq!(
            by_sector(&records),
            vec![
                ("Bilinmiyor".to_string(), 2),
                ("Madencilik".to_string(), 2),
                ("Metal".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_age_bucket_edges() {
        assert_eq!(age_bucket_index(17.0), Some(0));
        assert_eq!(age_bucket_index(18.0), Some(1));
        assert_eq!(age_bucket_index(24.0), Some(1));
        assert_eq!(age_bucket_index(25.0), Some(2));
        assert_eq!(age_bucket_index(55.0), Some(5));
        assert_eq!(age_bucket_index(17.5), None);
        assert_eq!(age_bucket_index(151.0), None);
        assert_eq!(AGE_BUCKETS[0].label, "0-18 (Çocuk)");
        assert_eq!(AGE_BUCKETS[1].label, "18-25");
    }

    #[test]
    fn test_age_buckets_count_unknown_as_adult() {
        let mut child = rec(None);
        child.age = Some(17.0);
        let mut young = rec(None);
        young.age = Some(18.0);
        let unknown = rec(None);
        let counts = by_age_bucket(&[child, young, unknown]);
        assert_eq!(counts, [1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_year_month_vectors() {
        let records = vec![
            rec(Some("05.01.2024")),
            rec(Some("06.01.2024")),
            rec(Some("30.12.2025")),
            rec(Some("tarih yok")),
        ];
        let years = by_year_month(&records);
        assert_eq!(years.keys().copied().collect::<Vec<_>>(), vec![2024, 2025]);
        assert_eq!(years[&2024][0], 2);
        assert_eq!(years[&2025][11], 1);
        assert_eq!(years[&2025].iter().sum::<usize>(), 1);
    }

    #[test]
    fn test_city_counts_trim() {
        let mk = |c: &str| Record {
            city: Some(c.to_string()),
            ..rec(None)
        };
        let counts = by_city(&[mk("Ankara "), mk("Ankara"), mk("  "), rec(None)]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["Ankara"], 2);
    }

    #[test]
    fn test_choropleth_tiers() {
        let scale = ChoroplethScale { max: 50 };
        assert_eq!(scale.tier(0), Tier::Zero);
        assert_eq!(scale.tier(1), Tier::Low);
        assert_eq!(scale.tier(5), Tier::Low);
        assert_eq!(scale.tier(6), Tier::Lower);
        assert_eq!(scale.tier(41), Tier::Top);
        assert_eq!(scale.tier(40), Tier::High);
        assert_eq!(scale.tier(50), Tier::Top);
    }

    #[test]
    fn test_choropleth_legend_for_max_50() {
        let legend = ChoroplethScale { max: 50 }.legend();
        let labels: Vec<&str> = legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["0", "1-5", "6-10", "11-20", "21-30", "31-40", "41+"]);
        assert_eq!(legend[1].tier.color(), "#ef9a9a");
    }

    #[test]
    fn test_scale_max_at_least_one() {
        assert_eq!(ChoroplethScale::from_counts(&HashMap::new()).max, 1);
    }
}
