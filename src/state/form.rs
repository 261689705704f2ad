use crate::data::SECTOR_OPTIONS;
use crate::query::{parse_date_input, AgeFilter, Criteria};

pub const GENDER_OPTIONS: [&str; 2] = ["Erkek", "Kadın"];

/// A filter input offered by a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Gender,
    Sector,
    City,
    DateStart,
    DateEnd,
    AgeMin,
    AgeMax,
}

impl Control {
    /// Controls of the explorer's filter panel
    pub const EXPLORER: [Control; 5] = [
        Control::AgeMin,
        Control::AgeMax,
        Control::Gender,
        Control::Sector,
        Control::City,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Control::Gender => "Cinsiyet",
            Control::Sector => "Sektör",
            Control::City => "Şehir",
            Control::DateStart => "Başlangıç",
            Control::DateEnd => "Bitiş",
            Control::AgeMin => "Min. yaş",
            Control::AgeMax => "Maks. yaş",
        }
    }

    /// Select controls cycle through options; the rest take typed input
    pub fn is_select(self) -> bool {
        matches!(self, Control::Gender | Control::Sector | Control::City)
    }

    fn accepts_char(self, c: char) -> bool {
        match self {
            Control::AgeMin | Control::AgeMax => c.is_ascii_digit(),
            Control::DateStart | Control::DateEnd => c.is_ascii_digit() || c == '-' || c == '.',
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub control: Control,
    pub value: String,
}

/// Editable snapshot of a criteria set. Nothing is applied until
/// `to_criteria` succeeds.
#[derive(Debug, Clone)]
pub struct FilterForm {
    fields: Vec<Field>,
    focus: usize,
    cities: Vec<String>,
}

fn date_text(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

impl FilterForm {
    pub fn new(controls: &[Control], current: &Criteria, cities: Vec<String>) -> Self {
        let fields = controls
            .iter()
            .map(|&control| {
                let value = match control {
                    Control::Gender => current.gender.clone().unwrap_or_default(),
                    Control::Sector => current.sector.clone().unwrap_or_default(),
                    Control::City => current.city.clone().unwrap_or_default(),
                    Control::DateStart => date_text(current.date_start),
                    Control::DateEnd => date_text(current.date_end),
                    Control::AgeMin => current.age.min.map(|v| v.to_string()).unwrap_or_default(),
                    Control::AgeMax => current.age.max.map(|v| v.to_string()).unwrap_or_default(),
                };
                Field { control, value }
            })
            .collect();
        Self {
            fields,
            focus: 0,
            cities,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    fn options(&self, control: Control) -> Vec<&str> {
        let mut options = vec![""];
        match control {
            Control::Gender => options.extend(GENDER_OPTIONS),
            Control::Sector => options.extend(SECTOR_OPTIONS),
            Control::City => options.extend(self.cities.iter().map(String::as_str)),
            _ => {}
        }
        options
    }

    /// Move a select control's value by `delta` options, wrapping; the
    /// empty option means "all"
    pub fn cycle(&mut self, delta: isize) {
        let Some(field) = self.fields.get(self.focus) else {
            return;
        };
        if !field.control.is_select() {
            return;
        }
        let options = self.options(field.control);
        let current = options
            .iter()
            .position(|o| *o == field.value)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(options.len() as isize) as usize;
        let value = options[next].to_string();
        self.fields[self.focus].value = value;
    }

    pub fn input(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if field.control.accepts_char(c) {
                field.value.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if field.control.is_select() {
                field.value.clear();
            } else {
                field.value.pop();
            }
        }
    }

    pub fn clear(&mut self) {
        self.fields.iter_mut().for_each(|f| f.value.clear());
    }

    /// Build criteria from the field values on top of `base`. Controls not
    /// present in the form keep the base value.
    pub fn to_criteria(&self, base: &Criteria) -> Result<Criteria, String> {
        let mut criteria = base.clone();
        let text = |v: &str| Some(v.to_string()).filter(|s| !s.is_empty());
        let mut age = AgeFilter::default();
        let mut age_seen = false;

        for field in &self.fields {
            let value = field.value.trim();
            match field.control {
                Control::Gender => criteria.gender = text(value),
                Control::Sector => criteria.sector = text(value),
                Control::City => criteria.city = text(value),
                Control::DateStart | Control::DateEnd => {
                    let date = if value.is_empty() {
                        None
                    } else {
                        Some(parse_date_input(value).ok_or_else(|| {
                            format!("{}: geçersiz tarih `{value}`", field.control.label())
                        })?)
                    };
                    if field.control == Control::DateStart {
                        criteria.date_start = date;
                    } else {
                        criteria.date_end = date;
                    }
                }
                Control::AgeMin | Control::AgeMax => {
                    age_seen = true;
                    let parsed = if value.is_empty() {
                        None
                    } else {
                        Some(value.parse::<u32>().map_err(|_| {
                            format!("{}: geçersiz yaş `{value}`", field.control.label())
                        })?)
                    };
                    if field.control == Control::AgeMin {
                        age.min = parsed;
                    } else {
                        age.max = parsed;
                    }
                }
            }
        }
        if age_seen {
            criteria.age = age;
        }
        Ok(criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explorer_form() -> FilterForm {
        FilterForm::new(
            &Control::EXPLORER,
            &Criteria::default(),
            vec!["Ankara".into(), "İzmir".into()],
        )
    }

    #[test]
    fn test_typed_age_inputs() {
        let mut form = explorer_form();
        form.input('1');
        form.input('x');
        form.input('8');
        form.focus_next();
        form.input('6');
        form.input('5');
        form.backspace();
        let criteria = form.to_criteria(&Criteria::default()).unwrap();
        assert_eq!(criteria.age, AgeFilter::new(Some(18), Some(6)));
    }

    #[test]
    fn test_select_cycles_through_all() {
        let mut form = explorer_form();
        form.focus_prev();
        assert_eq!(form.fields()[form.focus()].control, Control::City);
        form.cycle(1);
        assert_eq!(form.fields()[4].value, "Ankara");
        form.cycle(2);
        assert_eq!(form.fields()[4].value, "");
        form.cycle(-1);
        assert_eq!(form.fields()[4].value, "İzmir");
        let criteria = form.to_criteria(&Criteria::default()).unwrap();
        assert_eq!(criteria.city.as_deref(), Some("İzmir"));
    }

    #[test]
    fn test_invalid_date_is_reported() {
        let mut form = FilterForm::new(&[Control::DateStart], &Criteria::default(), Vec::new());
        for c in "2024-13-01".chars() {
            form.input(c);
        }
        assert!(form.to_criteria(&Criteria::default()).is_err());

        form.clear();
        for c in "01.03.2024".chars() {
            form.input(c);
        }
        let criteria = form.to_criteria(&Criteria::default()).unwrap();
        assert_eq!(criteria.date_start, parse_date_input("2024-03-01"));
    }

    #[test]
    fn test_form_round_trips_current_values() {
        let current = Criteria {
            gender: Some("Kadın".into()),
            age: AgeFilter::new(Some(20), None),
            ..Default::default()
        };
        let form = FilterForm::new(&Control::EXPLORER, &current, Vec::new());
        assert_eq!(form.to_criteria(&Criteria::default()).unwrap(), current);
    }
}
