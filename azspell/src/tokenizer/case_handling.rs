//! Case normalization of queries and re-casing of suggestions.
use smol_str::SmolStr;

/// Lowercases `s`. Dotted capital `İ` becomes plain `i`, as Azerbaijani
/// spells it, instead of `i` followed by a combining dot.
#[inline(always)]
pub fn lower_case(s: &str) -> SmolStr {
    s.chars()
        .map(|c| match c {
            'İ' => "i".to_string(),
            c => c.to_lowercase().collect::<String>(),
        })
        .collect::<SmolStr>()
}

#[inline(always)]
fn upper_char(c: char) -> String {
    match c {
        'i' => "İ".to_string(),
        c => c.to_uppercase().collect::<String>(),
    }
}

/// Uppercases `s`, turning dotted `i` into `İ` so it stays distinct from `ı`.
#[inline(always)]
pub fn upper_case(s: &str) -> SmolStr {
    s.chars().map(upper_char).collect::<SmolStr>()
}

/// Uppercases the first character of `s` the way [`upper_case`] does.
#[inline(always)]
pub fn upper_first(s: &str) -> SmolStr {
    let mut c = s.chars();
    match c.next() {
        None => SmolStr::new(""),
        Some(f) => SmolStr::from(upper_char(f) + c.as_str()),
    }
}

/// Share of uppercase characters in `word`; 0 for the empty word.
pub fn upper_ratio(word: &str) -> f32 {
    let (upper, total) = word.chars().fold((0usize, 0usize), |(upper, total), ch| {
        (upper + usize::from(ch.is_uppercase()), total + 1)
    });

    if total == 0 {
        return 0.0;
    }
    upper as f32 / total as f32
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Case {
    Upper,
    Lower,
    Neither,
}

impl Case {
    #[inline(always)]
    fn new(ch: char) -> Case {
        if ch.is_lowercase() {
            Case::Lower
        } else if ch.is_uppercase() {
            Case::Upper
        } else {
            Case::Neither
        }
    }
}

/// Whether `word` has uppercase letters after the first one while not being
/// all caps, as in `McDonald`. Any non-letter makes the word not mixed.
pub fn is_mixed_case(word: &str) -> bool {
    let mut chars = word.chars();
    let first = match chars.next() {
        Some(ch) => Case::new(ch),
        None => return false,
    };

    if first == Case::Neither {
        return false;
    }

    let mut has_lower = first == Case::Lower;
    let mut has_inner_upper = false;

    for ch in chars {
        match Case::new(ch) {
            Case::Neither => return false,
            Case::Upper => has_inner_upper = true,
            Case::Lower => has_lower = true,
        }
    }

    has_inner_upper && has_lower
}

/// Whether `word` has uppercase letters and no lowercase ones.
pub fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && upper_case(word) == word
}

/// Whether `word` starts with an uppercase letter.
pub fn is_first_caps(word: &str) -> bool {
    word.chars().next().map(char::is_uppercase).unwrap_or(false) && upper_first(word) == word
}

/// Casing of a query that can be carried over to its suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMutation {
    /// `Çay`
    FirstCaps,
    /// `ÇAY`
    AllCaps,
    /// left as suggested
    None,
}

impl CaseMutation {
    /// Detects the casing of `word`. Mixed case words (`McDonald`) are left
    /// alone.
    pub fn of(word: &str) -> CaseMutation {
        if is_mixed_case(word) {
            CaseMutation::None
        } else if word.chars().count() > 1 && is_all_caps(word) {
            CaseMutation::AllCaps
        } else if is_first_caps(word) {
            CaseMutation::FirstCaps
        } else {
            CaseMutation::None
        }
    }

    /// Applies this casing to a lowercase suggestion.
    pub fn apply(self, value: &str) -> SmolStr {
        match self {
            CaseMutation::FirstCaps => upper_first(value),
            CaseMutation::AllCaps => upper_case(value),
            CaseMutation::None => SmolStr::from(value),
        }
    }
}
