//! Localization of storefront messages and multilingual entity fields.
//!
//! # Resolution order
//!
//! Message keys resolve through a static table: the active language, then
//! English, then the raw key. Resolution never fails, so an unknown key shows
//! up on screen as itself rather than as an empty string.
//!
//! Entity fields (restaurant and menu names, descriptions) come from the API
//! as [`LocalizedText`] and resolve with [`resolve_localized_field`].

mod context;

pub use context::LanguageContext;

use std::collections::HashMap;

use grubline_core::{Language, LocalizedText};

/// Message keys used by the storefront services.
pub mod keys {
    pub const CART_SWITCHED_RESTAURANT: &str = "cart.switched_restaurant";
    pub const CART_REPLACE_PROMPT: &str = "cart.replace_prompt";
    pub const CART_EMPTY: &str = "cart.empty";
    pub const CART_TOTAL: &str = "cart.total";
    pub const CART_ITEM_COUNT: &str = "cart.item_count";
    pub const CART_MIN_ORDER_REMAINING: &str = "cart.min_order_remaining";
    pub const DELIVERY_AVAILABLE: &str = "delivery.available";
    pub const LOAD_FAILED: &str = "error.load_failed";
    pub const ADDRESS_REQUIRED: &str = "address.required";
    pub const ADDRESS_INVALID: &str = "address.invalid";
    pub const ADDRESS_SAVED: &str = "address.saved";
    pub const EMAIL_INVALID: &str = "email.invalid";
    pub const CHECKOUT_BELOW_MIN_ORDER: &str = "checkout.below_min_order";
    pub const CHECKOUT_PAYMENT_FAILED: &str = "checkout.payment_failed";
    pub const ORDER_PLACED: &str = "order.placed";
}

use Language::{En, Ja, Ko, Zh};

/// Built-in message table.
///
/// Not every key is translated into every language; missing entries fall
/// back to English.
const MESSAGES: &[(&str, &[(Language, &str)])] = &[
    (
        keys::CART_SWITCHED_RESTAURANT,
        &[
            (En, "Switched to {restaurant}"),
            (Ko, "{restaurant}(으)로 장바구니를 변경했어요"),
            (Ja, "{restaurant}に切り替えました"),
            (Zh, "已切换到{restaurant}"),
        ],
    ),
    (
        keys::CART_REPLACE_PROMPT,
        &[
            (
                En,
                "Your cart has items from {current}. Start a new cart from {restaurant}?",
            ),
            (
                Ko,
                "장바구니에 {current}의 메뉴가 있어요. {restaurant}의 메뉴로 새로 담을까요?",
            ),
        ],
    ),
    (
        keys::CART_EMPTY,
        &[
            (En, "Your cart is empty"),
            (Ko, "장바구니가 비어 있어요"),
            (Ja, "カートは空です"),
            (Zh, "购物车是空的"),
        ],
    ),
    (
        keys::CART_TOTAL,
        &[(En, "Total"), (Ko, "합계"), (Ja, "合計"), (Zh, "合计")],
    ),
    (
        keys::CART_ITEM_COUNT,
        &[(En, "{count} items"), (Ko, "{count}개"), (Ja, "{count}点")],
    ),
    (
        keys::CART_MIN_ORDER_REMAINING,
        &[
            (En, "Add {amount} more to order for delivery"),
            (Ko, "배달 주문까지 {amount} 남았어요"),
        ],
    ),
    (
        keys::DELIVERY_AVAILABLE,
        &[(En, "Delivery available"), (Ko, "배달 가능")],
    ),
    (
        keys::LOAD_FAILED,
        &[
            (En, "Failed to load. Please try again."),
            (Ko, "불러오지 못했어요. 다시 시도해 주세요."),
            (Ja, "読み込みに失敗しました。もう一度お試しください。"),
        ],
    ),
    (
        keys::ADDRESS_REQUIRED,
        &[
            (En, "Please set a delivery address"),
            (Ko, "배달 주소를 설정해 주세요"),
        ],
    ),
    (
        keys::ADDRESS_INVALID,
        &[
            (En, "Please check the address"),
            (Ko, "주소를 확인해 주세요"),
        ],
    ),
    (
        keys::ADDRESS_SAVED,
        &[(En, "Address saved"), (Ko, "주소를 저장했어요")],
    ),
    (
        keys::EMAIL_INVALID,
        &[
            (En, "Please enter a valid email address"),
            (Ko, "올바른 이메일 주소를 입력해 주세요"),
        ],
    ),
    (
        keys::CHECKOUT_BELOW_MIN_ORDER,
        &[
            (En, "The minimum order amount has not been reached"),
            (Ko, "최소 주문 금액을 채워 주세요"),
        ],
    ),
    (
        keys::CHECKOUT_PAYMENT_FAILED,
        &[
            (En, "Payment failed: {reason}"),
            (Ko, "결제에 실패했어요: {reason}"),
        ],
    ),
    (
        keys::ORDER_PLACED,
        &[(En, "Order placed"), (Ko, "주문이 접수되었어요")],
    ),
];

/// Resolves message keys to display text.
#[derive(Debug, Clone)]
pub struct Localizer {
    table: HashMap<String, HashMap<Language, String>>,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizer {
    /// Localizer over the built-in message table.
    #[must_use]
    pub fn new() -> Self {
        Self::from_entries(MESSAGES.iter().map(|(key, texts)| {
            (
                (*key).to_owned(),
                texts.iter().map(|(lang, text)| (*lang, (*text).to_owned())),
            )
        }))
    }

    /// Localizer over a custom table.
    pub fn from_entries<K, T, I>(entries: I) -> Self
    where
        K: Into<String>,
        T: IntoIterator<Item = (Language, String)>,
        I: IntoIterator<Item = (K, T)>,
    {
        Self {
            table: entries
                .into_iter()
                .map(|(key, texts)| (key.into(), texts.into_iter().collect()))
                .collect(),
        }
    }

    /// Text for `key` in `language`, falling back to English, then to `key`.
    #[must_use]
    pub fn resolve<'a>(&'a self, key: &'a str, language: Language) -> &'a str {
        let Some(texts) = self.table.get(key) else {
            return key;
        };
        texts
            .get(&language)
            .or_else(|| texts.get(&Language::En))
            .map_or(key, String::as_str)
    }

    /// Resolve `key` and substitute `{name}` placeholders from `args`.
    ///
    /// Placeholders without a matching argument are left in place.
    #[must_use]
    pub fn format(&self, key: &str, language: Language, args: &[(&str, &str)]) -> String {
        args.iter().fold(
            self.resolve(key, language).to_owned(),
            |text, (name, value)| text.replace(&format!("{{{name}}}"), value),
        )
    }
}

/// Pick the display value of a multilingual entity field.
///
/// Prefers the non-empty value for `language`; otherwise the English value
/// when `language` is not English; otherwise `default`.
#[must_use]
pub fn resolve_localized_field<'a>(
    default: &'a str,
    translations: &'a LocalizedText,
    language: Language,
) -> &'a str {
    if let Some(text) = translations.get(language) {
        return text;
    }
    if !language.is_fallback()
        && let Some(text) = translations.get(Language::En)
    {
        return text;
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_active_language() {
        let localizer = Localizer::new();
        assert_eq!(localizer.resolve(keys::CART_TOTAL, Ko), "합계");
    }

    #[test]
    fn test_resolve_falls_back_to_english() {
        let localizer = Localizer::new();
        assert_eq!(
            localizer.resolve(keys::DELIVERY_AVAILABLE, Zh),
            "Delivery available"
        );
    }

    #[test]
    fn test_resolve_unknown_key_returns_key() {
        let localizer = Localizer::new();
        assert_eq!(localizer.resolve("nope.missing", Ko), "nope.missing");
    }

    #[test]
    fn test_resolve_key_without_english_returns_key() {
        let localizer =
            Localizer::from_entries([("only.korean", [(Ko, "한국어".to_string())])]);
        assert_eq!(localizer.resolve("only.korean", Ko), "한국어");
        assert_eq!(localizer.resolve("only.korean", Ja), "only.korean");
    }

    #[test]
    fn test_format_substitutes_args() {
        let localizer = Localizer::new();
        assert_eq!(
            localizer.format(keys::CART_SWITCHED_RESTAURANT, En, &[("restaurant", "Kyochon")]),
            "Switched to Kyochon"
        );
        assert_eq!(
            localizer.format(keys::CART_ITEM_COUNT, En, &[]),
            "{count} items"
        );
    }

    #[test]
    fn test_every_message_has_english() {
        for (key, texts) in MESSAGES {
            assert!(
                texts.iter().any(|(lang, _)| *lang == En),
                "{key} has no English text"
            );
        }
    }

    #[test]
    fn test_localized_field_prefers_active_language() {
        let name = LocalizedText::new().with(En, "Bibimbap").with(Ko, "비빔밥");
        assert_eq!(resolve_localized_field("default", &name, Ko), "비빔밥");
    }

    #[test]
    fn test_localized_field_falls_back_to_english() {
        let name = LocalizedText::new().with(En, "Bibimbap").with(Ja, "");
        assert_eq!(resolve_localized_field("default", &name, Ja), "Bibimbap");
    }

    #[test]
    fn test_localized_field_falls_back_to_default() {
        let name = LocalizedText::new().with(Ko, "비빔밥");
        assert_eq!(resolve_localized_field("default", &name, En), "default");
        assert_eq!(
            resolve_localized_field("default", &LocalizedText::new(), Zh),
            "default"
        );
    }
}
