// mercado/src/order/message.rs

use crate::config::HandoffConfig;
use crate::error::{MercadoError, MercadoResult};
use crate::order::cart::Cart;
use crate::order::delivery::DeliveryZone;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInfo {
  pub name: String,
  pub phone: String,
  pub address: String,
  pub notes: String,
}

/// The plain-text order handed to the seller's chat.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderMessage {
  text: String,
  total: f64,
}

fn format_amount(amount: f64) -> String {
  if amount.fract() == 0.0 {
    format!("{:.0}", amount)
  } else {
    format!("{:.2}", amount)
  }
}

// Keeps each field on its own line of the message.
fn single_line(value: &str) -> String {
  value.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl OrderMessage {
  pub fn compose(
    cart: &Cart,
    customer: &CustomerInfo,
    delivery: Option<&DeliveryZone>,
    config: &HandoffConfig,
  ) -> MercadoResult<Self> {
    if cart.is_empty() {
      return Err(MercadoError::IncompleteOrder {
        message: "the cart is empty".to_string(),
      });
    }
    let missing: Vec<&str> = [
      ("name", &customer.name),
      ("phone", &customer.phone),
      ("address", &customer.address),
    ]
    .iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| *field)
    .collect();
    if !missing.is_empty() {
      return Err(MercadoError::IncompleteOrder {
        message: format!("missing {}", missing.join(", ")),
      });
    }

    let currency = &config.currency_label;
    let subtotal = cart.subtotal();
    let total = subtotal + delivery.map_or(0.0, |zone| zone.price);

    let mut lines = vec![
      format!("*NEW ORDER - {}*", config.store_name),
      String::new(),
      format!("*Customer:* {}", single_line(&customer.name)),
      format!("*Phone:* {}", single_line(&customer.phone)),
      format!("*Address:* {}", single_line(&customer.address)),
      String::new(),
      "*PRODUCTS:*".to_string(),
    ];
    lines.extend(cart.items().iter().map(|item| {
      format!(
        "• {} x{} = {} {}",
        item.name,
        item.quantity,
        format_amount(item.line_total()),
        currency
      )
    }));
    lines.push(format!("*Subtotal:* {} {}", format_amount(subtotal), currency));
    if let Some(zone) = delivery {
      lines.push(format!("*DELIVERY:* {} (+{} {})", zone.name, format_amount(zone.price), currency));
    }
    lines.push(String::new());
    lines.push(format!("*TOTAL: {} {}*", format_amount(total), currency));
    lines.push(String::new());
    let notes = single_line(&customer.notes);
    lines.push(format!(
      "*Notes:* {}",
      if notes.is_empty() { "No additional notes" } else { notes.as_str() }
    ));

    Ok(Self {
      text: lines.join("\n"),
      total,
    })
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn total(&self) -> f64 {
    self.total
  }

  /// `https://wa.me/<digits>?text=<encoded message>`.
  pub fn whatsapp_link(&self, config: &HandoffConfig) -> MercadoResult<Url> {
    let digits: String = config.whatsapp_number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
      return Err(MercadoError::Configuration(format!(
        "'{}' is not a phone number",
        config.whatsapp_number
      )));
    }
    Url::parse_with_params(&format!("https://wa.me/{}", digits), [("text", self.text.as_str())])
      .map_err(|e| MercadoError::Configuration(format!("invalid handoff link: {}", e)))
  }
}
