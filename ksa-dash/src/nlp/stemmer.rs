//! Indonesian stemming
//!
//! `IndonesianStemmer` is a rule-based affix stripper in the Tala style: it
//! needs no root dictionary and works on the vowel count ("measure") of the
//! word. Each removal costs one from the measure and no step runs once the
//! measure drops to two. Affixes are stripped in this order:
//!
//! 1. Particle: `-kah`, `-lah`, `-pun`
//! 2. Possessive pronoun: `-ku`, `-mu`, `-nya`
//! 3. First-order prefix (`meng-`, `di-`, `ter-`, `peng-`, `ke-` and the
//!    nasal variants), then derivational suffix, then second-order prefix;
//!    or, when no first-order prefix matched, second-order prefix
//!    (`ber-`, `per-`, `pe-`, `be-`) then derivational suffix.
//!
//! Derivational suffixes (`-kan`, `-an`, `-i`) are only removed when they
//! are compatible with the prefix already stripped.

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    /// Stem a single word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;

    /// Stem every whitespace-separated word and join with single spaces.
    fn stem_text(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| self.stem(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Stemmer that returns words unchanged.
#[derive(Debug, Clone, Default)]
pub struct IdentityStemmer;

impl IdentityStemmer {
    pub fn new() -> Self {
        IdentityStemmer
    }
}

impl Stemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Rule-based Indonesian stemmer.
#[derive(Debug, Clone, Default)]
pub struct IndonesianStemmer;

impl IndonesianStemmer {
    pub fn new() -> Self {
        IndonesianStemmer
    }
}

impl Stemmer for IndonesianStemmer {
    fn stem(&self, word: &str) -> String {
        // Rules index by byte; the preprocessor only hands over ASCII letters
        if !word.is_ascii() {
            return word.to_string();
        }

        let mut word = Word::new(&word.to_ascii_lowercase());
        if word.measure <= 2 {
            return word.text;
        }

        word.remove_particle();
        if word.measure > 2 {
            word.remove_possessive_pronoun();
        }
        if word.measure <= 2 {
            return word.text;
        }

        if word.remove_first_order_prefix() {
            if word.measure > 2 {
                word.remove_suffix();
            }
            if word.measure > 2 {
                word.remove_second_order_prefix();
            }
        } else {
            word.remove_second_order_prefix();
            if word.measure > 2 {
                word.remove_suffix();
            }
        }

        word.text
    }

    fn name(&self) -> &'static str {
        "indonesian"
    }
}

/// Prefix family stripped so far; decides which suffixes may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixKind {
    None,
    /// `di-`, `meng-`, `ter-` and their nasal variants
    DiMengTer,
    /// `per-`, `pe-`
    Per,
    /// `ke-`, `peng-` and its nasal variants
    KePeng,
    /// `ber-`, `be-`
    Ber,
}

struct Word {
    text: String,
    measure: usize,
    prefix: PrefixKind,
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

impl Word {
    fn new(text: &str) -> Self {
        Word {
            measure: text.bytes().filter(|b| is_vowel(*b)).count(),
            text: text.to_string(),
            prefix: PrefixKind::None,
        }
    }

    fn byte_at(&self, index: usize) -> Option<u8> {
        self.text.as_bytes().get(index).copied()
    }

    fn vowel_at(&self, index: usize) -> bool {
        self.byte_at(index).map(is_vowel).unwrap_or(false)
    }

    fn strip_suffix(&mut self, suffix: &str) {
        self.text.truncate(self.text.len() - suffix.len());
        self.measure -= 1;
    }

    /// Drop `len` leading bytes and put `replacement` in their place.
    fn replace_prefix(&mut self, len: usize, replacement: &str) {
        self.text.replace_range(..len, replacement);
        self.measure -= 1;
    }

    fn remove_particle(&mut self) {
        for particle in ["kah", "lah", "pun"] {
            if self.text.ends_with(particle) {
                self.strip_suffix(particle);
                return;
            }
        }
    }

    fn remove_possessive_pronoun(&mut self) {
        for pronoun in ["nya", "ku", "mu"] {
            if self.text.ends_with(pronoun) {
                self.strip_suffix(pronoun);
                return;
            }
        }
    }

    fn remove_suffix(&mut self) {
        if self.text.ends_with("kan")
            && !matches!(self.prefix, PrefixKind::KePeng | PrefixKind::Per)
        {
            self.strip_suffix("kan");
        } else if self.text.ends_with("an") && self.prefix != PrefixKind::DiMengTer {
            self.strip_suffix("an");
        } else if self.text.ends_with('i')
            && !self.text.ends_with("si")
            && matches!(
                self.prefix,
                PrefixKind::None | PrefixKind::DiMengTer | PrefixKind::Per
            )
        {
            self.strip_suffix("i");
        }
    }

    /// Returns true when a prefix was removed.
    fn remove_first_order_prefix(&mut self) -> bool {
        let starts = |p: &str| self.text.starts_with(p);

        let (len, replacement, kind) = if starts("meng") {
            (4, "", PrefixKind::DiMengTer)
        } else if starts("meny") && self.vowel_at(4) {
            (4, "s", PrefixKind::DiMengTer)
        } else if starts("men") {
            (3, "", PrefixKind::DiMengTer)
        } else if starts("mem") {
            let recoded = if self.vowel_at(3) { "p" } else { "" };
            (3, recoded, PrefixKind::DiMengTer)
        } else if starts("me") {
            (2, "", PrefixKind::DiMengTer)
        } else if starts("di") {
            (2, "", PrefixKind::DiMengTer)
        } else if starts("ter") {
            (3, "", PrefixKind::DiMengTer)
        } else if starts("peng") {
            (4, "", PrefixKind::KePeng)
        } else if starts("peny") && self.vowel_at(4) {
            (4, "s", PrefixKind::KePeng)
        } else if starts("pen") {
            (3, "", PrefixKind::KePeng)
        } else if starts("pem") {
            let recoded = if self.vowel_at(3) { "p" } else { "" };
            (3, recoded, PrefixKind::KePeng)
        } else if starts("ke") {
            (2, "", PrefixKind::KePeng)
        } else {
            return false;
        };

        self.replace_prefix(len, replacement);
        self.prefix = kind;
        true
    }

    fn remove_second_order_prefix(&mut self) {
        let starts = |p: &str| self.text.starts_with(p);

        let (len, replacement, kind) = if starts("pelajar") {
            (7, "ajar", PrefixKind::Per)
        } else if starts("per") {
            (3, "", PrefixKind::Per)
        } else if starts("pe") {
            (2, "", PrefixKind::Per)
        } else if starts("belajar") {
            (7, "ajar", PrefixKind::Ber)
        } else if starts("ber") {
            (3, "", PrefixKind::Ber)
        } else if starts("be")
            && self.byte_at(2).map(|b| !is_vowel(b)).unwrap_or(false)
            && self.text[2..].get(1..3) == Some("er")
        {
            (2, "", PrefixKind::Ber)
        } else {
            return;
        };

        self.replace_prefix(len, replacement);
        self.prefix = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(word: &str) -> String {
        IndonesianStemmer::new().stem(word)
    }

    #[test]
    fn test_short_words_unchanged() {
        assert_eq!(stem("makan"), "makan");
        assert_eq!(stem("buku"), "buku");
        assert_eq!(stem("dia"), "dia");
    }

    #[test]
    fn test_first_order_prefixes() {
        assert_eq!(stem("membaca"), "baca");
        assert_eq!(stem("menyapu"), "sapu");
        assert_eq!(stem("memukul"), "pukul");
        assert_eq!(stem("mengambil"), "ambil");
        assert_eq!(stem("dimakan"), "makan");
    }

    #[test]
    fn test_possessive_and_particle() {
        assert_eq!(stem("bukunya"), "buku");
        assert_eq!(stem("bukumu"), "buku");
        assert_eq!(stem("apakah"), "apa");
    }

    #[test]
    fn test_second_order_prefixes() {
        assert_eq!(stem("bermain"), "main");
        assert_eq!(stem("bekerja"), "kerja");
        assert_eq!(stem("belajar"), "ajar");
        assert_eq!(stem("perbaikan"), "baik");
    }

    #[test]
    fn test_suffix_after_prefix() {
        assert_eq!(stem("pembacaan"), "baca");
        assert_eq!(stem("keadilan"), "adil");
        assert_eq!(stem("bersepeda"), "sepeda");
    }

    #[test]
    fn test_non_ascii_passthrough() {
        assert_eq!(stem("méngambil"), "méngambil");
    }

    #[test]
    fn test_stem_text_splits_on_whitespace() {
        let stemmer = IndonesianStemmer::new();
        assert_eq!(stemmer.stem_text("  membaca   bukunya "), "baca buku");
        assert_eq!(stemmer.stem_text(""), "");
    }

    #[test]
    fn test_identity_stemmer() {
        let stemmer = IdentityStemmer::new();
        assert_eq!(stemmer.stem("membaca"), "membaca");
        assert_eq!(stemmer.name(), "identity");
    }
}
