//! Outbound WhatsApp links.
//!
//! Links open a chat with the store number and a prefilled message. Nothing
//! is sent by the server.

use essence_arabe_core::validate::digits_only;

/// Items named in the cart-abandonment message before "e mais itens".
const CART_ITEMS_NAMED: usize = 3;

/// `https://wa.me/<digits>?text=<encoded message>`.
#[must_use]
pub fn link(number: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        digits_only(number),
        urlencoding::encode(message)
    )
}

/// Nudge for a visitor who left items in the cart.
#[must_use]
pub fn cart_abandoned_message(item_names: &[&str]) -> String {
    let named = item_names
        .iter()
        .take(CART_ITEMS_NAMED)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    let more = if item_names.len() > CART_ITEMS_NAMED {
        " e mais itens"
    } else {
        ""
    };
    format!(
        "Oi! Vi que você quase finalizou seu pedido com {named}{more}. Quer que eu gere um cupom especial para você? 🎁"
    )
}

/// Follow-up offer after a confirmed order.
#[must_use]
pub fn post_purchase_message(order_code: &str) -> String {
    format!(
        "Seu pedido {order_code} foi confirmado ✅ Quer aproveitar uma oferta complementar com desconto hoje? Temos uma promoção especial para você! 🎉"
    )
}

/// Pitch for a single discounted product.
#[must_use]
pub fn custom_upsell_message(product_name: &str, discount: &str) -> String {
    format!(
        "Oi! Que tal adicionar {product_name} ao seu pedido com {discount} de desconto? É uma oferta exclusiva! 💎"
    )
}

/// Customer asking for an order status update.
#[must_use]
pub fn order_inquiry_message(order_code: &str) -> String {
    format!("Oi! Meu pedido {order_code} foi confirmado. Pode me atualizar o status?")
}

/// Generic contact message used in the footer.
#[must_use]
pub fn contact_message() -> &'static str {
    "Oi! Gostaria de tirar uma dúvida sobre os perfumes."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_strips_non_digits_and_encodes() {
        let url = link("+55 (11) 99999-9999", "Oi! Tudo bem?");
        assert!(url.starts_with("https://wa.me/5511999999999?text="));
        assert!(url.contains("Oi%21%20Tudo%20bem%3F"));
    }

    #[test]
    fn test_cart_abandoned_names_three_items() {
        let short = cart_abandoned_message(&["Khamrah", "Asad"]);
        assert!(short.contains("com Khamrah, Asad. Quer"));

        let long = cart_abandoned_message(&["A", "B", "C", "D"]);
        assert!(long.contains("com A, B, C e mais itens."));
    }

    #[test]
    fn test_order_messages_include_code() {
        assert!(post_purchase_message("EA-20260301-1234").starts_with("Seu pedido EA-20260301-1234 foi confirmado"));
        assert!(order_inquiry_message("EA-20260301-1234").contains("EA-20260301-1234"));
        assert!(custom_upsell_message("Khamrah", "10%").contains("adicionar Khamrah ao seu pedido com 10% de desconto"));
    }
}
