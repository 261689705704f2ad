use chrono::{DateTime, NaiveDate};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Label shown for records without a name
pub const UNNAMED_WORKER: &str = "İsimsiz İşçi";

/// Label used when grouping records without a sector
pub const UNKNOWN_SECTOR: &str = "Bilinmiyor";

/// Age assumed for bucketed charts when a record carries no age at all
pub const DEFAULT_BUCKET_AGE: f64 = 25.0;

/// Turkish month names, indexed 0..12
pub const TURKISH_MONTHS: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran",
    "Temmuz", "Ağustos", "Eylül", "Ekim", "Kasım", "Aralık",
];

/// The fixed sector vocabulary offered by the filter controls.
/// Records are not validated against it.
pub const SECTOR_OPTIONS: [&str; 11] = [
    "İnşaat, Yol",
    "Taşımacılık",
    "Diğer İşkolları",
    "Tarım, Orman (İşçi)",
    "Tarım, Orman (Çiftçi)",
    "Ticaret, Büro",
    "Madencilik",
    "Belediye, Genel İşler",
    "Kimya",
    "Metal",
    "Konaklama",
];

/// A memorial message attached to a record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Message {
    pub name: String,
    pub date: String,
    pub text: String,
}

/// One fatality entry from the dataset.
///
/// Every field except `id` is optional by convention. The fallback rules for
/// missing or malformed values live in the accessor methods below rather than
/// at the call sites.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub person_name: Option<String>,
    pub date: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub age: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub age_min: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub age_max: Option<f64>,
    pub cause: Option<String>,
    pub details: Option<String>,
    pub company: Option<String>,
    /// Raw `[lat, lon]`; non-numeric entries are kept as NaN so validation rejects them
    #[serde(deserialize_with = "lenient_coords")]
    pub coords: Option<Vec<f64>>,
    #[serde(rename = "tweetUrl")]
    pub tweet_url: Option<String>,
    pub image: Option<String>,
    pub multi_victim: Option<bool>,
    pub messages: Option<Vec<Message>>,
}

/// Treat empty strings the same as missing ones
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl Record {
    /// Person name, or the unnamed-worker placeholder
    pub fn display_name(&self) -> &str {
        non_empty(&self.person_name).unwrap_or(UNNAMED_WORKER)
    }

    /// Strictly parsed `DD.MM.YYYY` date
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_dotted_date)
    }

    /// Date used for newest-first ordering. Accepts more shapes than
    /// `parsed_date`; `None` sorts after every dated record.
    pub fn sort_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_lenient_date)
    }

    /// Effective `[lo, hi]` age interval, `None` when nothing is known
    pub fn age_interval(&self) -> Option<(f64, f64)> {
        match (self.age_min, self.age_max) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            (Some(lo), None) => Some((lo, lo)),
            (None, Some(hi)) => Some((hi, hi)),
            (None, None) => self.age.map(|a| (a, a)),
        }
    }

    /// Single age used by the age-bucket chart: range bounds first, then the
    /// exact age, then an adult default
    pub fn bucket_age(&self) -> f64 {
        self.age_min
            .or(self.age_max)
            .or(self.age)
            .unwrap_or(DEFAULT_BUCKET_AGE)
    }

    /// Human-readable age: exact value, else the range, else empty
    pub fn age_display(&self) -> String {
        if let Some(age) = self.age {
            return format_number(age);
        }
        match (self.age_min, self.age_max) {
            (Some(lo), Some(hi)) if lo != hi => format!("{}-{}", format_number(lo), format_number(hi)),
            (Some(v), _) | (None, Some(v)) => format_number(v),
            (None, None) => String::new(),
        }
    }

    /// Valid `(lat, lon)` pair: exactly two finite numbers
    pub fn coords(&self) -> Option<(f64, f64)> {
        match self.coords.as_deref() {
            Some(&[lat, lon]) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    /// Sector, or the unknown-sector label
    pub fn sector_label(&self) -> &str {
        non_empty(&self.sector).unwrap_or(UNKNOWN_SECTOR)
    }

    /// Trimmed city name used for province matching
    pub fn city_key(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Whether the record belongs to a worker younger than 18
    pub fn is_child(&self) -> bool {
        self.age_interval().is_some_and(|(_, hi)| hi < 18.0)
    }

    pub fn is_multi_victim(&self) -> bool {
        self.multi_victim.unwrap_or(false)
    }

    pub fn messages(&self) -> &[Message] {
        self.messages.as_deref().unwrap_or(&[])
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Parse `DD.MM.YYYY`. All three parts must be integers that form a real
/// calendar date.
pub fn parse_dotted_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('.');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse `DD.MM.YYYY`, falling back to day/month-name/year text such as
/// `15 Ocak 2024`, then to ISO `YYYY-MM-DD` or RFC 3339 timestamps
pub fn parse_lenient_date(text: &str) -> Option<NaiveDate> {
    parse_dotted_date(text)
        .or_else(|| parse_month_name_date(text))
        .or_else(|| parse_iso_date(text.trim()))
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

fn parse_month_name_date(text: &str) -> Option<NaiveDate> {
    let month = TURKISH_MONTHS
        .iter()
        .position(|name| text.contains(name))
        .map(|idx| idx as u32 + 1)?;

    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|t| !t.is_empty())
        .collect();
    let year = tokens.iter().find(|t| t.len() == 4)?.parse::<i32>().ok()?;
    let day = tokens.iter().find(|t| t.len() <= 2)?.parse::<u32>().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Short Turkish label for a month number 1..=12
pub fn month_name(month: u32) -> Option<&'static str> {
    TURKISH_MONTHS.get(month.checked_sub(1)? as usize).copied()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseCoords {
    Pair(Vec<LooseNumber>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseId {
    Text(String),
    Integer(i64),
    Other(IgnoredAny),
}

fn lenient_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<LooseNumber>::deserialize(de)? {
        Some(LooseNumber::Number(n)) => Some(n),
        Some(LooseNumber::Other(_)) | None => None,
    })
}

fn lenient_coords<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Vec<f64>>, D::Error> {
    Ok(match Option::<LooseCoords>::deserialize(de)? {
        Some(LooseCoords::Pair(values)) => Some(
            values
                .into_iter()
                .map(|v| match v {
                    LooseNumber::Number(n) => n,
                    LooseNumber::Other(_) => f64::NAN,
                })
                .collect(),
        ),
        Some(LooseCoords::Other(_)) | None => None,
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Option::<LooseId>::deserialize(de)? {
        Some(LooseId::Text(s)) => s,
        Some(LooseId::Integer(n)) => n.to_string(),
        Some(LooseId::Other(_)) | None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            id: "r1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_name_placeholder() {
        let mut r = record();
        assert_eq!(r.display_name(), UNNAMED_WORKER);
        r.person_name = Some(String::new());
        assert_eq!(r.display_name(), UNNAMED_WORKER);
        r.person_name = Some("Ali Yılmaz".into());
        assert_eq!(r.display_name(), "Ali Yılmaz");
    }

    #[test]
    fn test_parse_dotted_date() {
        assert_eq!(parse_dotted_date("05.03.2024"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_dotted_date("5.3.2024"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_dotted_date("31.02.2024"), None);
        assert_eq!(parse_dotted_date("2024-03-05"), None);
        assert_eq!(parse_dotted_date("05.03.2024.1"), None);
        assert_eq!(parse_dotted_date(""), None);
    }

    #[test]
    fn test_lenient_date_month_names() {
        assert_eq!(parse_lenient_date("15 Ocak 2024"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_lenient_date("3 Ağustos 2025"), NaiveDate::from_ymd_opt(2025, 8, 3));
        assert_eq!(parse_lenient_date("geçen hafta"), None);
    }

    #[test]
    fn test_lenient_date_iso_fallback() {
        assert_eq!(parse_lenient_date("2025-06-01"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(
            parse_lenient_date(" 2024-02-29T08:30:00+03:00 "),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_lenient_date("2025-13-01"), None);

        let mut old = record();
        old.date = Some("01.01.2020".into());
        let mut iso = record();
        iso.date = Some("2025-06-01".into());
        assert!(iso.sort_date() > old.sort_date());
    }

    #[test]
    fn test_age_interval_rules() {
        let mut r = record();
        assert_eq!(r.age_interval(), None);

        r.age = Some(30.0);
        assert_eq!(r.age_interval(), Some((30.0, 30.0)));

        r.age_min = Some(16.0);
        r.age_max = Some(17.0);
        assert_eq!(r.age_interval(), Some((16.0, 17.0)));

        r.age_max = None;
        assert_eq!(r.age_interval(), Some((16.0, 16.0)));
    }

    #[test]
    fn test_bucket_age_defaults_to_adult() {
        let mut r = record();
        assert_eq!(r.bucket_age(), DEFAULT_BUCKET_AGE);
        r.age = Some(40.0);
        r.age_max = Some(19.0);
        assert_eq!(r.bucket_age(), 19.0);
        r.age_min = Some(15.0);
        assert_eq!(r.bucket_age(), 15.0);
    }

    #[test]
    fn test_coords_validation() {
        let mut r = record();
        assert_eq!(r.coords(), None);
        r.coords = Some(vec![39.9, 32.8]);
        assert_eq!(r.coords(), Some((39.9, 32.8)));
        r.coords = Some(vec![39.9]);
        assert_eq!(r.coords(), None);
        r.coords = Some(vec![f64::NAN, 32.8]);
        assert_eq!(r.coords(), None);
    }

    #[test]
    fn test_age_display() {
        let mut r = record();
        assert_eq!(r.age_display(), "");
        r.age_min = Some(16.0);
        r.age_max = Some(17.0);
        assert_eq!(r.age_display(), "16-17");
        r.age = Some(42.0);
        assert_eq!(r.age_display(), "42");
    }

    #[test]
    fn test_deserialize_tolerates_loose_fields() {
        let mut json = r#"[{"id": 7, "age": "bilinmiyor", "age_min": 16, "coords": [41.0, "x"],
            "tweetUrl": "https://example.org/1", "messages": [{"name": "A", "text": "Unutmayacağız"}]}]"#
            .as_bytes()
            .to_vec();
        let records: Vec<Record> = simd_json::serde::from_slice(&mut json).unwrap();
        let r = &records[0];
        assert_eq!(r.id, "7");
        assert_eq!(r.age, None);
        assert_eq!(r.age_min, Some(16.0));
        assert_eq!(r.coords(), None);
        assert_eq!(r.tweet_url.as_deref(), Some("https://example.org/1"));
        assert_eq!(r.messages()[0].text, "Unutmayacağız");
        assert_eq!(r.messages()[0].date, "");
    }
}
