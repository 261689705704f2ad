use crate::data::Record;

/// Escape text for embedding in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Text content of a marker popup, with placeholders already applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub id: String,
    pub name: String,
    pub date: String,
    pub city: String,
    pub age: String,
    pub sector: String,
    pub cause: String,
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

impl Popup {
    pub fn from_record(record: &Record) -> Self {
        let age = record.age_display();
        Self {
            id: record.id.clone(),
            name: record.display_name().to_string(),
            date: or_placeholder(record.date.as_deref(), "Tarih bilinmiyor"),
            city: or_placeholder(record.city.as_deref(), "Bilinmiyor"),
            age: if age.is_empty() { "-".to_string() } else { age },
            sector: or_placeholder(record.sector.as_deref(), "-"),
            cause: or_placeholder(record.cause.as_deref(), "-"),
        }
    }

    /// Popup markup for web map consumers. Every field is escaped.
    pub fn to_html(&self) -> String {
        let row = |label: &str, value: &str| {
            format!(
                "<div class=\"popup-row\"><span class=\"popup-label\">{label}</span><span class=\"popup-value\">{}</span></div>",
                escape_html(value)
            )
        };
        format!(
            concat!(
                "<div class=\"popup-header\"><div class=\"popup-name\">{name}</div>",
                "<div class=\"popup-date\">{date}</div></div>",
                "<div class=\"popup-body\">{city}{age}{sector}",
                "<div class=\"popup-cause\"><div class=\"popup-label\">Ölüm Nedeni</div>",
                "<div class=\"popup-cause-text\">{cause}</div></div></div>",
                "<div class=\"popup-footer\"><a href=\"profile.html?id={id}\" class=\"profile-link-btn\">Daha Çok Bilgi</a></div>"
            ),
            name = escape_html(&self.name),
            date = escape_html(&self.date),
            city = row("Konum", &self.city),
            age = row("Yaş", &self.age),
            sector = row("Sektör", &self.sector),
            cause = escape_html(&self.cause),
            id = escape_html(&self.id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape_html("Şırnak"), "Şırnak");
    }

    #[test]
    fn test_popup_placeholders() {
        let record = Record {
            id: "1".into(),
            ..Default::default()
        };
        let popup = Popup::from_record(&record);
        assert_eq!(popup.name, "İsimsiz İşçi");
        assert_eq!(popup.date, "Tarih bilinmiyor");
        assert_eq!(popup.city, "Bilinmiyor");
        assert_eq!(popup.age, "-");
        assert_eq!(popup.cause, "-");
    }

    #[test]
    fn test_popup_html_escapes_user_fields() {
        let record = Record {
            id: "a\"b".into(),
            person_name: Some("<b>Ali</b>".into()),
            city: Some("Kocaeli & Gebze".into()),
            sector: Some("<i>Metal</i>".into()),
            cause: Some("<img src=x onerror=alert(1)>".into()),
            ..Default::default()
        };
        let html = Popup::from_record(&record).to_html();
        assert!(html.contains("&lt;b&gt;Ali&lt;/b&gt;"));
        assert!(html.contains("Kocaeli &amp; Gebze"));
        assert!(html.contains("&lt;i&gt;Metal&lt;/i&gt;"));
        assert!(!html.contains("<img"));
        assert!(html.contains("profile.html?id=a&quot;b"));
    }
}
