//! Symbol table: which strings name a currency and what replaces them.
//!
//! A [`SymbolTable`] holds one [`CurrencySymbol`] per canonical currency plus
//! the shared list of trailing-noise suffixes. Construction validates the
//! invariants the substitution engine depends on:
//!
//! - no variant is empty;
//! - no variant contains another variant, within a set or across sets, so the
//!   order in which sets are applied never decides which currency wins;
//! - every fragment class is a single, quote-free CSS class.

use crate::error::TableError;
use once_cell::sync::Lazy;

/// Right-to-left mark. Arabic currency text is frequently followed by one.
pub const RLM: char = '\u{200F}';

/// Private-use code point rendered by the storefront's symbol font.
pub const SAR_GLYPH: char = '\u{E900}';

pub const SAR_CODE: &str = "SAR";
pub const SAR_FRAGMENT_CLASS: &str = "saudi-riyal-symbol";
pub const SAR_CONTAINER_CLASS: &str = "saudi-riyal-currency";

/// Standard renderings of the riyal: the Unicode rial sign, the ISO code and
/// the Arabic abbreviation.
pub const SAR_VARIANTS: &[&str] = &["\u{FDFC}", "SAR", "ر.س"];

/// Noise that may trail a variant and has to be absorbed with it.
pub const DEFAULT_NOISE: &[&str] = &["&nbsp;.", ".\u{200F}", "\u{00A0}.", " .", ".", "\u{200F}"];

static SAUDI_RIYAL: Lazy<SymbolTable> = Lazy::new(|| SymbolTable {
    currencies: vec![CurrencySymbol {
        code: SAR_CODE.to_string(),
        variants: SAR_VARIANTS.iter().map(|v| v.to_string()).collect(),
        fragment: CanonicalFragment { class: SAR_FRAGMENT_CLASS.to_string(), glyph: SAR_GLYPH },
    }],
    noise: DEFAULT_NOISE.iter().map(|n| n.to_string()).collect(),
});

/// The single markup shape every variant of one currency resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFragment {
    class: String,
    glyph: char,
}

impl CanonicalFragment {
    pub fn new(class: impl Into<String>, glyph: char) -> Result<Self, TableError> {
        let class = class.into();
        let valid = !class.is_empty()
            && !class.chars().any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '&'));
        if !valid {
            return Err(TableError::InvalidClass(class));
        }
        Ok(Self { class, glyph })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn glyph(&self) -> char {
        self.glyph
    }

    /// Glyph as a hex character reference, e.g. `&#xE900;`.
    pub fn glyph_entity(&self) -> String {
        format!("&#x{:X};", self.glyph as u32)
    }

    /// Opening tag, byte for byte as emitted.
    pub fn open_tag(&self) -> String {
        format!("<span class=\"{}\">", self.class)
    }

    pub fn html(&self) -> String {
        format!("{}{}</span>", self.open_tag(), self.glyph_entity())
    }
}

/// A canonical currency and the variant strings that denote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencySymbol {
    pub code: String,
    pub variants: Vec<String>,
    pub fragment: CanonicalFragment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    currencies: Vec<CurrencySymbol>,
    noise: Vec<String>,
}

impl SymbolTable {
    /// Build a table, rejecting anything that would make substitution
    /// order-dependent.
    pub fn new(currencies: Vec<CurrencySymbol>, noise: Vec<String>) -> Result<Self, TableError> {
        if currencies.is_empty() {
            return Err(TableError::NoCurrencies);
        }
        for (idx, n) in noise.iter().enumerate() {
            if n.is_empty() {
                return Err(TableError::EmptyNoise(idx));
            }
        }

        for (idx, currency) in currencies.iter().enumerate() {
            if currencies[..idx].iter().any(|c| c.code == currency.code) {
                return Err(TableError::DuplicateCurrency(currency.code.clone()));
            }
            if currency.variants.is_empty() {
                return Err(TableError::NoVariants { code: currency.code.clone() });
            }
            if currency.variants.iter().any(|v| v.is_empty()) {
                return Err(TableError::EmptyVariant { code: currency.code.clone() });
            }
        }

        let all: Vec<&str> = currencies.iter().flat_map(|c| c.variants.iter().map(String::as_str)).collect();
        for (i, outer) in all.iter().enumerate() {
            for (j, inner) in all.iter().enumerate() {
                if i != j && outer.contains(inner) {
                    return Err(TableError::OverlappingVariants {
                        outer: outer.to_string(),
                        inner: inner.to_string(),
                    });
                }
            }
        }

        Ok(Self { currencies, noise })
    }

    /// The built-in Saudi Riyal table.
    pub fn saudi_riyal() -> Self {
        SAUDI_RIYAL.clone()
    }

    pub fn currencies(&self) -> &[CurrencySymbol] {
        &self.currencies
    }

    pub fn noise(&self) -> &[String] {
        &self.noise
    }

    pub fn currency(&self, code: &str) -> Option<&CurrencySymbol> {
        self.currencies.iter().find(|c| c.code == code)
    }

    pub(crate) fn fragment(&self, idx: usize) -> &CanonicalFragment {
        &self.currencies[idx].fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sar_fragment() -> CanonicalFragment {
        CanonicalFragment::new(SAR_FRAGMENT_CLASS, SAR_GLYPH).unwrap()
    }

    #[test]
    fn builtin_table_passes_validation() {
        let builtin = SymbolTable::saudi_riyal();
        let rebuilt = SymbolTable::new(builtin.currencies().to_vec(), builtin.noise().to_vec()).unwrap();
        assert_eq!(builtin, rebuilt);
    }

    #[test]
    fn fragment_markup_is_exact() {
        assert_eq!(sar_fragment().html(), "<span class=\"saudi-riyal-symbol\">&#xE900;</span>");
        assert_eq!(sar_fragment().glyph_entity(), "&#xE900;");
    }

    #[test]
    fn rejects_bad_classes() {
        for class in ["", "two words", "q\"uote", "<b>"] {
            assert!(matches!(CanonicalFragment::new(class, SAR_GLYPH), Err(TableError::InvalidClass(_))));
        }
    }

    #[test]
    fn rejects_overlapping_variants_across_sets() {
        let sar = CurrencySymbol { code: "SAR".into(), variants: vec!["SAR".into()], fragment: sar_fragment() };
        let other = CurrencySymbol {
            code: "XSAR".into(),
            variants: vec!["XSAR".into()],
            fragment: CanonicalFragment::new("x-symbol", 'x').unwrap(),
        };
        let err = SymbolTable::new(vec![sar, other], vec![".".into()]).unwrap_err();
        assert_eq!(err, TableError::OverlappingVariants { outer: "XSAR".into(), inner: "SAR".into() });
    }

    #[test]
    fn rejects_duplicates_and_empties() {
        let sar = CurrencySymbol { code: "SAR".into(), variants: vec!["SAR".into()], fragment: sar_fragment() };
        let err = SymbolTable::new(vec![sar.clone(), sar.clone()], vec![]).unwrap_err();
        assert_eq!(err, TableError::DuplicateCurrency("SAR".into()));

        let empty = CurrencySymbol { variants: vec![String::new()], ..sar.clone() };
        assert!(matches!(SymbolTable::new(vec![empty], vec![]), Err(TableError::EmptyVariant { .. })));

        assert_eq!(SymbolTable::new(vec![sar], vec![String::new()]).unwrap_err(), TableError::EmptyNoise(0));
        assert_eq!(SymbolTable::new(vec![], vec![]).unwrap_err(), TableError::NoCurrencies);
    }
}
