use crate::data::{Message, Record, TURKISH_MONTHS};

pub const COMPANY_PLACEHOLDER: &str = "Belirtilmemiş";
pub const NO_MESSAGES: &str = "Henüz bir mesaj eklenmemiş.";

/// `05.03.2024` -> `5 Mart 2024`. Text that does not split into three parts
/// or has an out-of-range month is returned unchanged.
pub fn format_long_date(text: &str) -> String {
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() != 3 {
        return text.to_string();
    }
    let day = parts[0].trim().parse::<u32>();
    let month = parts[1].trim().parse::<usize>();
    match (day, month) {
        (Ok(day), Ok(month)) if (1..=12).contains(&month) => {
            format!("{day} {} {}", TURKISH_MONTHS[month - 1], parts[2])
        }
        _ => text.to_string(),
    }
}

/// Display-ready profile fields
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCard {
    pub title: String,
    pub name: String,
    pub date: String,
    pub city: String,
    pub district: String,
    pub age: String,
    pub gender: String,
    pub sector: String,
    pub company: String,
    pub cause: String,
    pub details: String,
    pub source: Option<String>,
    pub image: Option<String>,
    pub multi_victim: bool,
    pub messages: Vec<Message>,
    pub coords: Option<(f64, f64)>,
}

fn dash(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("-")
        .to_string()
}

impl ProfileCard {
    pub fn from_record(record: &Record) -> Self {
        let name = record.display_name().to_string();
        let age = record.age_display();
        Self {
            title: format!("{name} - Türkiye İş Cinayetleri Haritası"),
            date: record
                .date
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(format_long_date)
                .unwrap_or_else(|| "-".to_string()),
            city: dash(&record.city),
            district: dash(&record.district),
            age: if age.is_empty() { "-".to_string() } else { age },
            gender: dash(&record.gender),
            sector: dash(&record.sector),
            company: record
                .company
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| COMPANY_PLACEHOLDER.to_string()),
            cause: dash(&record.cause),
            details: dash(&record.details),
            source: record.tweet_url.clone().filter(|s| !s.is_empty()),
            image: record.image.clone().filter(|s| !s.is_empty()),
            multi_victim: record.is_multi_victim(),
            messages: record.messages().to_vec(),
            coords: record.coords(),
            name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_long_date() {
        assert_eq!(format_long_date("05.03.2024"), "5 Mart 2024");
        assert_eq!(format_long_date("1.12.2023"), "1 Aralık 2023");
        assert_eq!(format_long_date("05.13.2024"), "05.13.2024");
        assert_eq!(format_long_date("geçen ay"), "geçen ay");
    }

    #[test]
    fn test_profile_card_fallbacks() {
        let record = Record {
            id: "x".into(),
            date: Some("05.03.2024".into()),
            multi_victim: Some(true),
            ..Default::default()
        };
        let card = ProfileCard::from_record(&record);
        assert_eq!(card.name, "İsimsiz İşçi");
        assert_eq!(card.title, "İsimsiz İşçi - Türkiye İş Cinayetleri Haritası");
        assert_eq!(card.date, "5 Mart 2024");
        assert_eq!(card.company, COMPANY_PLACEHOLDER);
        assert_eq!(card.city, "-");
        assert!(card.multi_victim);
        assert!(card.messages.is_empty());
        assert!(card.source.is_none());
    }
}
