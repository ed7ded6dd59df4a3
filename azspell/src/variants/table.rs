//! Keyboard and phonetic confusions used to respell a query.
use smol_str::SmolStr;

/// Fixed mapping from an input unit to the units it is commonly typed
/// instead of.
///
/// Two-character keys double as the digraphs recognised when a query is
/// split into units.
#[derive(Debug, Clone, Copy)]
pub struct SubstitutionTable {
    entries: &'static [(&'static str, &'static [&'static str])],
}

/// Azerbaijani written on a Latin (English) keyboard.
pub static AZERBAIJANI: SubstitutionTable = SubstitutionTable {
    entries: &[
        // digraphs
        ("ch", &["ç"]),
        ("sh", &["ş"]),
        ("gh", &["ğ"]),
        // single letters
        ("c", &["ç"]),
        ("s", &["ş"]),
        ("e", &["ə"]),
        ("o", &["ö"]),
        ("u", &["ü"]),
        ("g", &["ğ"]),
        ("i", &["ı"]),
        ("w", &["v"]),
    ],
};

impl SubstitutionTable {
    /// Builds a table from static entries.
    pub const fn new(entries: &'static [(&'static str, &'static [&'static str])]) -> SubstitutionTable {
        SubstitutionTable { entries }
    }

    /// Alternatives for `unit`, in table order.
    pub fn alternatives(&self, unit: &str) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(key, _)| *key == unit)
            .map(|(_, alternatives)| *alternatives)
            .unwrap_or(&[])
    }

    /// Whether `candidate` is a two-character key of this table.
    pub fn is_digraph(&self, candidate: &str) -> bool {
        candidate.chars().count() == 2 && self.entries.iter().any(|(key, _)| *key == candidate)
    }

    /// Splits `word` into units left to right, taking a digraph whenever the
    /// next two characters form one.
    pub fn units(&self, word: &str) -> Vec<SmolStr> {
        let chars: Vec<char> = word.chars().collect();
        let mut units = Vec::with_capacity(chars.len());
        let mut i = 0;

        while i < chars.len() {
            if i + 1 < chars.len() {
                let pair: SmolStr = chars[i..i + 2].iter().copied().collect();
                if self.is_digraph(&pair) {
                    units.push(pair);
                    i += 2;
                    continue;
                }
            }

            units.push(SmolStr::from(chars[i].to_string()));
            i += 1;
        }

        units
    }
}
