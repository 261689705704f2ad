/// Which half of the explorer is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Map,
    Table,
}

impl View {
    /// Resolve a location fragment (`#table`, `table`, ...). Anything
    /// unrecognised, including an empty fragment, selects the map.
    pub fn from_fragment(fragment: &str) -> Self {
        match fragment.trim().trim_start_matches('#') {
            "table" => View::Table,
            _ => View::Map,
        }
    }

    pub fn fragment(self) -> &'static str {
        match self {
            View::Map => "#map",
            View::Table => "#table",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            View::Map => View::Table,
            View::Table => View::Map,
        }
    }
}

/// Fragment history with back/forward, like a browser location
#[derive(Debug, Clone)]
pub struct Navigation {
    entries: Vec<String>,
    cursor: usize,
}

impl Navigation {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_string()],
            cursor: 0,
        }
    }

    pub fn fragment(&self) -> &str {
        &self.entries[self.cursor]
    }

    pub fn view(&self) -> View {
        View::from_fragment(self.fragment())
    }

    /// Move to `fragment`. Returns false when it is already the current
    /// location, in which case no history entry is added.
    pub fn navigate(&mut self, fragment: &str) -> bool {
        if self.fragment() == fragment {
            return false;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment.to_string());
        self.cursor += 1;
        true
    }

    pub fn back(&mut self) -> Option<View> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.view())
    }

    pub fn forward(&mut self) -> Option<View> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_defaults_to_map() {
        assert_eq!(View::from_fragment(""), View::Map);
        assert_eq!(View::from_fragment("#table"), View::Table);
        assert_eq!(View::from_fragment("table"), View::Table);
        assert_eq!(View::from_fragment("#charts"), View::Map);
    }

    #[test]
    fn test_back_and_forward() {
        let mut nav = Navigation::new("");
        assert_eq!(nav.view(), View::Map);

        assert!(nav.navigate("#table"));
        assert!(!nav.navigate("#table"));
        assert!(nav.navigate("#map"));

        assert_eq!(nav.back(), Some(View::Table));
        assert_eq!(nav.back(), Some(View::Map));
        assert_eq!(nav.back(), None);
        assert_eq!(nav.forward(), Some(View::Table));

        // navigating after going back drops the forward entries
        assert!(nav.navigate("#map"));
        assert_eq!(nav.forward(), None);
    }
}
