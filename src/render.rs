//! Server-side rendering helpers.
//!
//! [`PriceRenderer`] is the string adapter around the shared [`Substituter`]:
//! it applies the [`ActivationGate`] and otherwise treats the formatter's output
//! as opaque text.

use crate::engine::Substituter;
use crate::gate::{ActivationGate, CurrencyConfig};
use crate::symbols::{SAR_CODE, SAR_CONTAINER_CLASS};
use std::collections::HashMap;

/// Price-formatting collaborator.
pub trait PriceFormatter {
    /// Format `amount` with the currency's standard symbol.
    fn format(&self, amount: f64, include_container: bool, precision: Option<usize>) -> String;

    /// Standard symbol for `code`, if known.
    fn currency_symbol(&self, code: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    Before,
    After,
}

/// Minimal formatter: thousands grouping, fixed precision, one symbol.
#[derive(Debug, Clone)]
pub struct SymbolFormatter {
    pub symbol: String,
    pub position: SymbolPosition,
    pub precision: usize,
    /// Symbols reported for other currency codes.
    pub symbols: HashMap<String, String>,
}

impl SymbolFormatter {
    pub fn new(symbol: impl Into<String>, position: SymbolPosition) -> Self {
        SymbolFormatter { symbol: symbol.into(), position, precision: 2, symbols: HashMap::new() }
    }

    pub fn with_symbol(mut self, code: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.symbols.insert(code.into(), symbol.into());
        self
    }
}

impl PriceFormatter for SymbolFormatter {
    fn format(&self, amount: f64, include_container: bool, precision: Option<usize>) -> String {
        let digits = format!("{:.*}", precision.unwrap_or(self.precision), amount.abs());
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits.as_str(), None),
        };

        let mut number = group_thousands(int_part);
        if let Some(frac) = frac_part {
            number.push('.');
            number.push_str(frac);
        }
        let sign = if amount < 0.0 { "-" } else { "" };

        let text = match self.position {
            SymbolPosition::Before => format!("{sign}{}{number}", self.symbol),
            SymbolPosition::After => format!("{sign}{number} {}", self.symbol),
        };
        if include_container { format!("<span class=\"price\">{text}</span>") } else { text }
    }

    fn currency_symbol(&self, code: &str) -> Option<String> {
        self.symbols.get(code).cloned()
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub struct PriceRenderer<'a, C, F> {
    engine: &'a Substituter,
    gate: ActivationGate<C>,
    formatter: F,
    target_currency: String,
    container_class: String,
}

impl<'a, C: CurrencyConfig, F: PriceFormatter> PriceRenderer<'a, C, F> {
    pub fn new(engine: &'a Substituter, gate: ActivationGate<C>, formatter: F) -> Self {
        PriceRenderer {
            engine,
            gate,
            formatter,
            target_currency: SAR_CODE.to_string(),
            container_class: SAR_CONTAINER_CLASS.to_string(),
        }
    }

    pub fn target_currency(mut self, code: impl Into<String>) -> Self {
        self.target_currency = code.into();
        self
    }

    pub fn container_class_name(mut self, class: impl Into<String>) -> Self {
        self.container_class = class.into();
        self
    }

    pub fn gate(&self) -> &ActivationGate<C> {
        &self.gate
    }

    /// Rewrite variants in a block of price HTML; unchanged when inactive.
    pub fn convert_price_html(&self, html: &str) -> String {
        if html.is_empty() || !self.gate.should_substitute() {
            return html.to_string();
        }
        self.engine.substitute(html)
    }

    pub fn format_currency(&self, amount: f64, include_container: bool, precision: Option<usize>) -> String {
        let formatted = self.formatter.format(amount, include_container, precision);
        if !self.gate.should_substitute() {
            return formatted;
        }
        self.engine.substitute(&formatted)
    }

    /// Fragment markup for the target currency, the formatter's symbol for
    /// anything else.
    pub fn currency_symbol(&self, code: &str) -> Option<String> {
        if code == self.target_currency {
            if let Some(html) = self.engine.fragment_html(code) {
                return Some(html);
            }
        }
        self.formatter.currency_symbol(code)
    }

    /// Append the container class to `original` while the target is active.
    pub fn container_class(&self, original: &str) -> String {
        if !self.gate.should_substitute() {
            return original.to_string();
        }
        if original.is_empty() {
            return self.container_class.clone();
        }
        format!("{original} {}", self.container_class)
    }

    /// Render a block only when the target currency is active.
    pub fn render_if_active(&self, body: impl FnOnce() -> String) -> String {
        if self.gate.is_target_active() { body() } else { String::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StaticStore;

    const FRAG: &str = "<span class=\"saudi-riyal-symbol\">&#xE900;</span>";

    fn formatter() -> SymbolFormatter {
        SymbolFormatter::new("\u{FDFC}", SymbolPosition::After).with_symbol("USD", "$")
    }

    fn renderer(current: &str, enabled: bool) -> PriceRenderer<'static, StaticStore, SymbolFormatter> {
        let gate = ActivationGate::new(StaticStore::new("SAR", current, enabled));
        PriceRenderer::new(Substituter::saudi_riyal(), gate, formatter())
    }

    #[test]
    fn formatter_groups_and_rounds() {
        let f = formatter();
        assert_eq!(f.format(1234567.891, false, None), "1,234,567.89 \u{FDFC}");
        assert_eq!(f.format(-12.4, false, Some(0)), "-12 \u{FDFC}");
        assert_eq!(f.format(999.0, true, None), "<span class=\"price\">999.00 \u{FDFC}</span>");
        assert_eq!(SymbolFormatter::new("SAR ", SymbolPosition::Before).format(1000.0, false, Some(1)), "SAR 1,000.0");
    }

    #[test]
    fn scenario_a_and_c() {
        let r = renderer("SAR", true);
        let once = r.convert_price_html("100 \u{FDFC}.");
        assert_eq!(once, format!("100 {FRAG}"));
        assert_eq!(r.convert_price_html(&once), once);
    }

    #[test]
    fn scenario_b_inactive_currency_is_untouched() {
        let r = renderer("USD", true);
        assert_eq!(r.convert_price_html("50 SAR"), "50 SAR");
        assert_eq!(r.format_currency(50.0, false, None), "50.00 \u{FDFC}");
        assert_eq!(r.container_class("price"), "price");
        assert_eq!(r.render_if_active(|| "block".into()), "");
    }

    #[test]
    fn disabled_feature_is_untouched() {
        let r = renderer("SAR", false);
        assert_eq!(r.convert_price_html("50 SAR"), "50 SAR");
        assert_eq!(r.render_if_active(|| "block".into()), "block");
    }

    #[test]
    fn formats_with_custom_symbol() {
        let r = renderer("SAR", true);
        assert_eq!(r.format_currency(1500.0, true, None), format!("<span class=\"price\">1,500.00 {FRAG}</span>"));
        assert_eq!(r.convert_price_html(""), "");
    }

    #[test]
    fn symbols_and_classes() {
        let r = renderer("SAR", true);
        assert_eq!(r.currency_symbol("SAR").as_deref(), Some(FRAG));
        assert_eq!(r.currency_symbol("USD").as_deref(), Some("$"));
        assert_eq!(r.currency_symbol("EUR"), None);
        assert_eq!(r.container_class(""), "saudi-riyal-currency");
        assert_eq!(r.container_class("price-box"), "price-box saudi-riyal-currency");
    }
}
